//! # Config Crate
//!
//! Centralized configuration constants for the interactive transform core.
//! Every tolerance, snapping increment and proportional-editing limit is
//! defined here so the transform modes never scatter literals.
//!
//! ## Usage
//!
//! ```rust
//! use config::constants::{clamp_prop_size, PROP_SIZE_MAX, PROP_SIZE_MIN, RATIO_SNAP_INCREMENT};
//!
//! // Proportional radius is always kept inside the supported range
//! assert_eq!(clamp_prop_size(0.0), PROP_SIZE_MIN);
//! assert_eq!(clamp_prop_size(f64::INFINITY), PROP_SIZE_MAX);
//!
//! // Ratio factors snap to tenths
//! let snapped = (0.47_f64 / RATIO_SNAP_INCREMENT).round() * RATIO_SNAP_INCREMENT;
//! assert!((snapped - 0.5).abs() < 1e-12);
//! ```
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All constants defined once, used everywhere
//! - **No Globals**: Runtime settings travel in an explicit [`constants::TransformConfig`]
//! - **Well-Documented**: Every constant has clear documentation

pub mod constants;
