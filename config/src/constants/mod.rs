//! # Configuration Constants
//!
//! Centralized values shared by the transform core. Each public item documents
//! its purpose and provides a minimal usage example so that the transform
//! modes can remain declarative and avoid scattering literals.
//!
//! ## Categories
//!
//! - **Precision**: Floating-point comparison tolerances
//! - **Proportional Editing**: Falloff radius limits and step factors
//! - **Snapping**: Per-mode increments
//! - **Slide**: Edge/vertex slide thresholds

use std::fmt;

// =============================================================================
// PRECISION CONSTANTS
// =============================================================================

/// Epsilon for general floating-point comparisons.
///
/// # Examples
/// ```
/// use config::constants::EPSILON;
/// assert!((1.0_f64 - (1.0 + 1e-11)).abs() < EPSILON);
/// ```
pub const EPSILON: f64 = 1e-10;

/// Single precision machine epsilon.
///
/// Several thresholds of the interactive tools were tuned against single
/// precision storage, so they stay at this magnitude even though all math
/// runs in `f64`.
///
/// # Examples
/// ```
/// use config::constants::FLT_EPSILON;
/// assert!(FLT_EPSILON > 1e-8 && FLT_EPSILON < 1e-6);
/// ```
pub const FLT_EPSILON: f64 = f32::EPSILON as f64;

/// Distance from the mirror plane under which a vertex counts as lying on it.
///
/// Such vertices are pinned to the plane during mirrored editing.
///
/// # Examples
/// ```
/// use config::constants::MIRROR_TOLERANCE;
/// let x = 5e-6_f64;
/// assert!(x.abs() <= MIRROR_TOLERANCE);
/// ```
pub const MIRROR_TOLERANCE: f64 = 1e-5;

// =============================================================================
// PROPORTIONAL EDITING
// =============================================================================

/// Smallest proportional editing radius.
///
/// # Examples
/// ```
/// use config::constants::PROP_SIZE_MIN;
/// assert!(PROP_SIZE_MIN > 0.0);
/// ```
pub const PROP_SIZE_MIN: f64 = 1e-6;

/// Largest proportional editing radius.
///
/// # Examples
/// ```
/// use config::constants::{PROP_SIZE_MAX, PROP_SIZE_MIN};
/// assert!(PROP_SIZE_MAX > PROP_SIZE_MIN);
/// ```
pub const PROP_SIZE_MAX: f64 = 1e12;

/// Radius used when no usable radius is supplied.
///
/// # Examples
/// ```
/// use config::constants::DEFAULT_PROP_SIZE;
/// assert_eq!(DEFAULT_PROP_SIZE, 1.0);
/// ```
pub const DEFAULT_PROP_SIZE: f64 = 1.0;

/// Radii at or below this value are considered unusable and reset to
/// [`DEFAULT_PROP_SIZE`].
///
/// # Examples
/// ```
/// use config::constants::{PROP_SIZE_RESET_THRESHOLD, PROP_SIZE_MIN};
/// assert!(PROP_SIZE_RESET_THRESHOLD > PROP_SIZE_MIN);
/// ```
pub const PROP_SIZE_RESET_THRESHOLD: f64 = 1e-5;

/// Multiplicative step applied by the grow/shrink radius keys.
///
/// # Examples
/// ```
/// use config::constants::PROP_SIZE_STEP;
/// assert!(PROP_SIZE_STEP > 1.0);
/// ```
pub const PROP_SIZE_STEP: f64 = 1.1;

/// Multiplicative step used while the precision modifier is held.
///
/// # Examples
/// ```
/// use config::constants::{PROP_SIZE_STEP, PROP_SIZE_STEP_PRECISION};
/// assert!(PROP_SIZE_STEP_PRECISION < PROP_SIZE_STEP);
/// ```
pub const PROP_SIZE_STEP_PRECISION: f64 = 1.01;

/// Radius change per pixel of vertical mouse-pan movement.
///
/// # Examples
/// ```
/// use config::constants::PROP_SIZE_PAN_FACTOR;
/// let factor = 1.0 + PROP_SIZE_PAN_FACTOR * 10.0;
/// assert!(factor > 1.0);
/// ```
pub const PROP_SIZE_PAN_FACTOR: f64 = 0.005;

// =============================================================================
// SNAPPING INCREMENTS
// =============================================================================

/// Grid step used when incrementally snapping translations.
///
/// # Examples
/// ```
/// use config::constants::TRANSLATE_SNAP_INCREMENT;
/// assert_eq!(TRANSLATE_SNAP_INCREMENT, 1.0);
/// ```
pub const TRANSLATE_SNAP_INCREMENT: f64 = 1.0;

/// Grid step for translations while the precision modifier is held.
///
/// # Examples
/// ```
/// use config::constants::TRANSLATE_SNAP_PRECISION;
/// assert!(TRANSLATE_SNAP_PRECISION < 1.0);
/// ```
pub const TRANSLATE_SNAP_PRECISION: f64 = 0.1;

/// Rotation snap step in degrees.
///
/// # Examples
/// ```
/// use config::constants::ROTATION_SNAP_DEGREES;
/// assert_eq!(360.0 % ROTATION_SNAP_DEGREES, 0.0);
/// ```
pub const ROTATION_SNAP_DEGREES: f64 = 5.0;

/// Rotation snap step in degrees while the precision modifier is held.
///
/// # Examples
/// ```
/// use config::constants::ROTATION_SNAP_PRECISION_DEGREES;
/// assert_eq!(ROTATION_SNAP_PRECISION_DEGREES, 1.0);
/// ```
pub const ROTATION_SNAP_PRECISION_DEGREES: f64 = 1.0;

/// Snap step of scale factors and other ratio-driven modes.
///
/// # Examples
/// ```
/// use config::constants::RATIO_SNAP_INCREMENT;
/// assert_eq!(RATIO_SNAP_INCREMENT, 0.1);
/// ```
pub const RATIO_SNAP_INCREMENT: f64 = 0.1;

/// Snap step of ratio-driven modes while the precision modifier is held.
///
/// # Examples
/// ```
/// use config::constants::{RATIO_SNAP_INCREMENT, RATIO_SNAP_PRECISION};
/// assert!(RATIO_SNAP_PRECISION < RATIO_SNAP_INCREMENT);
/// ```
pub const RATIO_SNAP_PRECISION: f64 = 0.01;

// =============================================================================
// INPUT
// =============================================================================

/// Scale applied to mouse deltas while the precision modifier is held.
///
/// # Examples
/// ```
/// use config::constants::PRECISION_FACTOR;
/// assert!(PRECISION_FACTOR < 1.0);
/// ```
pub const PRECISION_FACTOR: f64 = 0.1;

/// Radians per pixel of trackball mouse movement.
///
/// # Examples
/// ```
/// use config::constants::TRACKBALL_FACTOR;
/// assert_eq!(TRACKBALL_FACTOR, 0.01);
/// ```
pub const TRACKBALL_FACTOR: f64 = 0.01;

/// Number of region-width tenths that map to a ratio of 1.0 for the
/// horizontal and vertical ratio inputs.
///
/// # Examples
/// ```
/// use config::constants::RATIO_INPUT_DIVISIONS;
/// let pad = 800.0 / RATIO_INPUT_DIVISIONS;
/// assert_eq!(pad, 80.0);
/// ```
pub const RATIO_INPUT_DIVISIONS: f64 = 10.0;

/// Maximum number of characters accepted by numeric input per axis.
///
/// # Examples
/// ```
/// use config::constants::NUM_INPUT_MAX_CHARS;
/// assert!(NUM_INPUT_MAX_CHARS >= 8);
/// ```
pub const NUM_INPUT_MAX_CHARS: usize = 32;

// =============================================================================
// SLIDE
// =============================================================================

/// Squared screen-space length under which a slide direction is treated as
/// degenerate and replaced by a fixed vertical direction.
///
/// # Examples
/// ```
/// use config::constants::SLIDE_MIN_SCREEN_DIR_SQ;
/// assert!(SLIDE_MIN_SCREEN_DIR_SQ > 0.0);
/// ```
pub const SLIDE_MIN_SCREEN_DIR_SQ: f64 = 0.1;

/// Screen-space length used for the fallback slide direction.
///
/// # Examples
/// ```
/// use config::constants::SLIDE_FALLBACK_SCREEN_LEN;
/// assert_eq!(SLIDE_FALLBACK_SCREEN_LEN, 100.0);
/// ```
pub const SLIDE_FALLBACK_SCREEN_LEN: f64 = 100.0;

/// Width of the ramp used to weight corner attributes of a sliding vertex.
///
/// # Examples
/// ```
/// use config::constants::SLIDE_CORNER_WEIGHT_EPSILON;
/// assert!(SLIDE_CORNER_WEIGHT_EPSILON < 1e-6);
/// ```
pub const SLIDE_CORNER_WEIGHT_EPSILON: f64 = 1e-8;

/// Smallest curve radius produced by the curve shrink/fatten mode.
///
/// # Examples
/// ```
/// use config::constants::CURVE_RADIUS_MIN;
/// assert!(CURVE_RADIUS_MIN > 0.0);
/// ```
pub const CURVE_RADIUS_MIN: f64 = 0.001;

// =============================================================================
// HELPERS
// =============================================================================

/// Clamps a proportional editing radius into the supported range.
///
/// # Examples
/// ```
/// use config::constants::{clamp_prop_size, PROP_SIZE_MIN};
/// assert_eq!(clamp_prop_size(2.0), 2.0);
/// assert_eq!(clamp_prop_size(-1.0), PROP_SIZE_MIN);
/// ```
pub fn clamp_prop_size(size: f64) -> f64 {
    if size.is_nan() {
        return DEFAULT_PROP_SIZE;
    }
    size.clamp(PROP_SIZE_MIN, PROP_SIZE_MAX)
}

/// Grows or shrinks a proportional radius by one key step.
///
/// # Examples
/// ```
/// use config::constants::step_prop_size;
/// let grown = step_prop_size(1.0, true, false);
/// assert!((grown - 1.1).abs() < 1e-12);
/// let shrunk = step_prop_size(grown, false, false);
/// assert!((shrunk - 1.0).abs() < 1e-12);
/// ```
pub fn step_prop_size(size: f64, grow: bool, precision: bool) -> f64 {
    let step = if precision {
        PROP_SIZE_STEP_PRECISION
    } else {
        PROP_SIZE_STEP
    };
    let next = if grow { size * step } else { size / step };
    clamp_prop_size(next)
}

// =============================================================================
// RUNTIME CONFIGURATION
// =============================================================================

/// Validated snapshot of the user-tunable transform settings.
///
/// # Examples
/// ```
/// use config::constants::TransformConfig;
/// let config = TransformConfig::default();
/// assert!(config.prop_size > 0.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformConfig {
    /// Proportional editing radius.
    pub prop_size: f64,
    /// Grid step used by incremental translation snapping.
    pub snap_increment: f64,
    /// Rotation snap step in degrees.
    pub rotation_snap_degrees: f64,
}

impl TransformConfig {
    /// Builds a configuration, rejecting non-positive or non-finite values.
    ///
    /// # Examples
    /// ```
    /// use config::constants::TransformConfig;
    /// let cfg = TransformConfig::new(2.0, 0.5, 15.0).expect("valid config");
    /// assert_eq!(cfg.prop_size, 2.0);
    /// ```
    pub fn new(
        prop_size: f64,
        snap_increment: f64,
        rotation_snap_degrees: f64,
    ) -> Result<Self, ConfigError> {
        if !prop_size.is_finite() || prop_size < PROP_SIZE_MIN || prop_size > PROP_SIZE_MAX {
            return Err(ConfigError::InvalidPropSize(prop_size));
        }
        if !snap_increment.is_finite() || snap_increment <= 0.0 {
            return Err(ConfigError::InvalidSnapIncrement(snap_increment));
        }
        if !rotation_snap_degrees.is_finite()
            || rotation_snap_degrees <= 0.0
            || rotation_snap_degrees > 360.0
        {
            return Err(ConfigError::InvalidRotationSnap(rotation_snap_degrees));
        }
        Ok(Self {
            prop_size,
            snap_increment,
            rotation_snap_degrees,
        })
    }
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            prop_size: DEFAULT_PROP_SIZE,
            snap_increment: TRANSLATE_SNAP_INCREMENT,
            rotation_snap_degrees: ROTATION_SNAP_DEGREES,
        }
    }
}

/// Error returned when invalid configuration values are provided.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    /// Raised when the proportional radius is outside the supported range.
    InvalidPropSize(f64),
    /// Raised when the snapping grid step is zero, negative or not finite.
    InvalidSnapIncrement(f64),
    /// Raised when the rotation snap step is not within (0, 360].
    InvalidRotationSnap(f64),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPropSize(value) => {
                write!(
                    f,
                    "prop_size must be within [{PROP_SIZE_MIN}, {PROP_SIZE_MAX}]: {value}"
                )
            }
            ConfigError::InvalidSnapIncrement(value) => {
                write!(f, "snap_increment must be positive: {value}")
            }
            ConfigError::InvalidRotationSnap(value) => {
                write!(f, "rotation_snap_degrees must be within (0, 360]: {value}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
