//! # Transform Modes
//!
//! One variant per interactive mode. Every mode follows the same shape:
//!
//! - `init` configures mouse and numeric input and caches what the mode
//!   needs from the elements as they are at that moment
//! - `apply` maps the current values to new element values, always starting
//!   from the originals, and returns the header text
//! - `handle_event` reacts to the keys a mode owns (even, flip, clamp, ...)
//!
//! ## Pass Rules
//!
//! Elements are visited in array order. The first element flagged
//! [`ElementFlags::NOACTION`] ends the pass (the array is sorted by
//! distance), [`ElementFlags::SKIP`] elements are stepped over.
//!
//! ## Modes
//!
//! | Mode | Input | Edits |
//! |------|-------|-------|
//! | Translate | Vector | location |
//! | Rotate | Angle | location, object rotation |
//! | Resize | SpringFlip | location, object scale |
//! | ToSphere | HorizontalRatio | location |
//! | Shear | HorizontalRatio | location |
//! | Bend | AngleSpring | location |
//! | ShrinkFatten | VerticalAbsolute | location along normals |
//! | Tilt | Angle | curve tilt |
//! | Trackball | Trackball | location, object rotation |
//! | PushPull | VerticalAbsolute | location |
//! | Crease | SpringDelta | edge crease |
//! | Mirror | None | location, object scale |
//! | CurveShrinkFatten | Spring | curve radius |
//! | EdgeSlide | CustomRatioFlip | location along rails |
//! | VertSlide | CustomRatio | location along edges |
//! | Align | None | object rotation |

mod affine;
mod object;
mod scalar;
mod warp;

pub use object::{element_resize, element_rotation, mat3_to_size_signed};
pub use warp::BendState;

use crate::center::{PivotMode, TransformCenter};
use crate::constraint::Constraint;
use crate::element::{EditTarget, ElementFlags, TransformData, TransformElement};
use crate::error::TransformResult;
use crate::event::{Event, Key, KeyState};
use crate::input::{InputMode, MouseInput, NumericInput};
use crate::mesh::EditMesh;
use crate::slide::{EdgeSlide, SlideOptions, VertSlide};
use crate::snap::{apply_increment, Snapping};
use crate::view::ViewContext;
use config::constants::TransformConfig;
use glam::{DMat4, DVec2, DVec3};
use tracing::debug;

// =============================================================================
// MODE KINDS
// =============================================================================

/// Identifier of a transform mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ModeKind {
    /// Move
    #[default]
    Translate,
    /// Rotate around the pivot
    Rotate,
    /// Scale around the pivot
    Resize,
    /// Blend towards a sphere around the pivot
    ToSphere,
    /// Shear in the view plane
    Shear,
    /// Bend around the cursor
    Bend,
    /// Move along vertex normals
    ShrinkFatten,
    /// Curve point tilt
    Tilt,
    /// Free rotation from two angles
    Trackball,
    /// Move towards or away from the pivot
    PushPull,
    /// Edge crease weight
    Crease,
    /// Mirror through the pivot
    Mirror,
    /// Curve point radius
    CurveShrinkFatten,
    /// Slide vertices along the faces next to selected edge loops
    EdgeSlide,
    /// Slide vertices along one of their edges
    VertSlide,
    /// Align object rotations with the world axes
    Align,
}

impl ModeKind {
    /// Every mode.
    pub const ALL: [Self; 16] = [
        Self::Translate,
        Self::Rotate,
        Self::Resize,
        Self::ToSphere,
        Self::Shear,
        Self::Bend,
        Self::ShrinkFatten,
        Self::Tilt,
        Self::Trackball,
        Self::PushPull,
        Self::Crease,
        Self::Mirror,
        Self::CurveShrinkFatten,
        Self::EdgeSlide,
        Self::VertSlide,
        Self::Align,
    ];

    /// Display name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Translate => "Translate",
            Self::Rotate => "Rotate",
            Self::Resize => "Resize",
            Self::ToSphere => "To Sphere",
            Self::Shear => "Shear",
            Self::Bend => "Bend",
            Self::ShrinkFatten => "Shrink/Fatten",
            Self::Tilt => "Tilt",
            Self::Trackball => "Trackball",
            Self::PushPull => "Push/Pull",
            Self::Crease => "Crease",
            Self::Mirror => "Mirror",
            Self::CurveShrinkFatten => "Curve Shrink/Fatten",
            Self::EdgeSlide => "Edge Slide",
            Self::VertSlide => "Vert Slide",
            Self::Align => "Align",
        }
    }

    /// Whether axis constraints act on this mode.
    pub fn allows_constraint(self) -> bool {
        matches!(
            self,
            Self::Translate | Self::Rotate | Self::Resize | Self::PushPull | Self::Mirror
        )
    }

    /// Slide modes keep their own per-vertex state and mesh scratch data.
    pub fn is_slide(self) -> bool {
        matches!(self, Self::EdgeSlide | Self::VertSlide)
    }
}

// =============================================================================
// CONTEXTS
// =============================================================================

/// What a mode may read and configure while initializing.
pub struct ModeSetup<'a> {
    /// Edited entity, as it was when the operation began
    pub target: &'a EditTarget,
    /// Elements; modes may cache per-element values
    pub data: &'a mut TransformData,
    /// Viewport
    pub view: &'a ViewContext,
    /// Pivot
    pub center: &'a TransformCenter,
    /// Mouse mapping, configured by the mode
    pub mouse: &'a mut MouseInput,
    /// Numeric entry, configured by the mode
    pub numeric: &'a mut NumericInput,
    /// Current mouse position
    pub mval: DVec2,
    /// Slide options for the slide modes
    pub slide: SlideOptions,
}

impl ModeSetup<'_> {
    pub(crate) fn input(&mut self, mode: InputMode, numeric: NumericInput) {
        self.mouse.set_mode(mode);
        *self.numeric = numeric;
    }

    fn mesh(&self) -> Option<&EditMesh> {
        self.target.mesh()
    }
}

/// Shared state every `apply` reads.
pub struct ModeContext<'a> {
    /// Viewport
    pub view: &'a ViewContext,
    /// Pivot
    pub center: &'a TransformCenter,
    /// Pivot mode in effect
    pub pivot: PivotMode,
    /// Axis constraint
    pub constraint: &'a Constraint,
    /// Snapping state
    pub snapping: &'a Snapping,
    /// Typed values
    pub numeric: &'a NumericInput,
    /// Precision modifier held
    pub precision: bool,
    /// Values were preset by the caller and bypass snapping and typing
    pub preset: bool,
    /// Increments and limits
    pub config: &'a TransformConfig,
}

impl ModeContext<'_> {
    /// Rounds `values` to the mode increment while increment snapping is in
    /// effect (snapping on and no target point).
    pub(crate) fn snap_increment(&self, values: &mut [f64], coarse: f64, fine: f64) {
        if self.snapping.is_active() && self.snapping.target.is_none() {
            apply_increment(values, coarse, fine, self.precision);
        }
    }

    fn rotation_increments(&self) -> (f64, f64) {
        (
            self.config.rotation_snap_degrees.to_radians(),
            config::constants::ROTATION_SNAP_PRECISION_DEGREES.to_radians(),
        )
    }

    fn constrained(&self) -> bool {
        self.constraint.dimension() > 0
    }

    /// Unit vector from the pivot towards the viewer.
    fn view_dir(&self) -> DVec3 {
        self.view.view_vector(self.center.global)
    }
}

/// What a mode may touch while handling an event.
pub struct ModeEventContext<'a> {
    /// Viewport
    pub view: &'a ViewContext,
    /// Mouse mapping; slide modes move their custom segment
    pub mouse: &'a mut MouseInput,
    /// Current mouse position
    pub mval: DVec2,
    /// World matrix of the edited object
    pub obmat: DMat4,
}

// =============================================================================
// ELEMENT PASSES
// =============================================================================

/// Runs `f` over the elements a mode may change.
pub(crate) fn for_each_active(data: &mut TransformData, mut f: impl FnMut(&mut TransformElement)) {
    for td in &mut data.elements {
        if td.flags.contains(ElementFlags::NOACTION) {
            break;
        }
        if td.flags.contains(ElementFlags::SKIP) {
            continue;
        }
        f(td);
    }
}

/// Zeroes the locked components of a location delta.
pub(crate) fn protected_loc(td: &TransformElement, v: DVec3) -> DVec3 {
    let mut out = v;
    for axis in 0..3 {
        if td.locks.location[axis] {
            out[axis] = 0.0;
        }
    }
    out
}

// =============================================================================
// MODE STATE
// =============================================================================

/// Running mode with its state.
#[derive(Debug, Clone, PartialEq)]
pub enum TransformMode {
    /// Move
    Translate,
    /// Rotate around the pivot
    Rotate,
    /// Scale around the pivot
    Resize,
    /// Blend towards a sphere
    ToSphere {
        /// Mean distance of the selection to the pivot
        radius: f64,
    },
    /// Shear in the view plane
    Shear {
        /// Shear along the vertical screen axis
        vertical: bool,
    },
    /// Bend around the cursor
    Bend(BendState),
    /// Move along normals
    ShrinkFatten {
        /// Keep shell thickness even
        even: bool,
    },
    /// Curve tilt
    Tilt,
    /// Trackball rotation
    Trackball,
    /// Push towards the pivot
    PushPull,
    /// Edge crease
    Crease,
    /// Mirror through the pivot
    Mirror {
        /// An axis was chosen and the result is final
        done: bool,
    },
    /// Curve radius
    CurveShrinkFatten,
    /// Edge slide
    EdgeSlide(Box<EdgeSlide>),
    /// Vertex slide
    VertSlide(Box<VertSlide>),
    /// Align objects with the world
    Align,
}

impl TransformMode {
    /// Initializes `kind` on the current elements.
    ///
    /// Shrink/fatten only works on meshes and falls back to resize
    /// elsewhere, so the returned mode may differ from `kind`.
    ///
    /// # Errors
    ///
    /// [`crate::error::TransformError::SlideUnavailable`] when a slide mode
    /// cannot use the selection, which makes the caller fall back to a
    /// simpler mode.
    pub fn init(kind: ModeKind, setup: &mut ModeSetup<'_>) -> TransformResult<Self> {
        let mode = match kind {
            ModeKind::Translate => affine::init_translate(setup),
            ModeKind::Rotate => affine::init_rotate(setup),
            ModeKind::Resize => affine::init_resize(setup),
            ModeKind::Trackball => affine::init_trackball(setup),
            ModeKind::Mirror => affine::init_mirror(setup),
            ModeKind::Align => affine::init_align(setup),
            ModeKind::ToSphere => warp::init_to_sphere(setup),
            ModeKind::Shear => warp::init_shear(setup),
            ModeKind::Bend => warp::init_bend(setup),
            ModeKind::ShrinkFatten => {
                if setup.mesh().is_some() {
                    warp::init_shrink_fatten(setup)
                } else {
                    debug!("shrink/fatten needs a mesh, using resize");
                    affine::init_resize(setup)
                }
            }
            ModeKind::PushPull => warp::init_push_pull(setup),
            ModeKind::Tilt => scalar::init_tilt(setup),
            ModeKind::Crease => scalar::init_crease(setup),
            ModeKind::CurveShrinkFatten => scalar::init_curve_shrink_fatten(setup),
            ModeKind::EdgeSlide => {
                let slide = EdgeSlide::init(setup)?;
                Self::EdgeSlide(Box::new(slide))
            }
            ModeKind::VertSlide => {
                let slide = VertSlide::init(setup)?;
                Self::VertSlide(Box::new(slide))
            }
        };
        debug!(mode = mode.kind().name(), "mode initialized");
        Ok(mode)
    }

    /// Kind of the running mode.
    pub fn kind(&self) -> ModeKind {
        match self {
            Self::Translate => ModeKind::Translate,
            Self::Rotate => ModeKind::Rotate,
            Self::Resize => ModeKind::Resize,
            Self::ToSphere { .. } => ModeKind::ToSphere,
            Self::Shear { .. } => ModeKind::Shear,
            Self::Bend(_) => ModeKind::Bend,
            Self::ShrinkFatten { .. } => ModeKind::ShrinkFatten,
            Self::Tilt => ModeKind::Tilt,
            Self::Trackball => ModeKind::Trackball,
            Self::PushPull => ModeKind::PushPull,
            Self::Crease => ModeKind::Crease,
            Self::Mirror { .. } => ModeKind::Mirror,
            Self::CurveShrinkFatten => ModeKind::CurveShrinkFatten,
            Self::EdgeSlide(_) => ModeKind::EdgeSlide,
            Self::VertSlide(_) => ModeKind::VertSlide,
            Self::Align => ModeKind::Align,
        }
    }

    /// Computes new element values from `values` and returns the header.
    ///
    /// `values` are the raw mouse (or preset) values; snapping and numeric
    /// input are applied here. Calling this twice with the same values
    /// gives the same elements.
    pub fn apply(&mut self, data: &mut TransformData, values: [f64; 3], ctx: &ModeContext<'_>) -> String {
        match self {
            Self::Translate => affine::apply_translate(data, values, ctx),
            Self::Rotate => affine::apply_rotate(data, values, ctx),
            Self::Resize => affine::apply_resize(data, values, ctx),
            Self::Trackball => affine::apply_trackball(data, values, ctx),
            Self::Mirror { done } => affine::apply_mirror(data, done, ctx),
            Self::Align => affine::apply_align(data, ctx),
            Self::ToSphere { radius } => warp::apply_to_sphere(data, *radius, values, ctx),
            Self::Shear { vertical } => warp::apply_shear(data, *vertical, values, ctx),
            Self::Bend(state) => warp::apply_bend(data, state, values, ctx),
            Self::ShrinkFatten { even } => warp::apply_shrink_fatten(data, *even, values, ctx),
            Self::PushPull => warp::apply_push_pull(data, values, ctx),
            Self::Tilt => scalar::apply_tilt(data, values, ctx),
            Self::Crease => scalar::apply_crease(data, values, ctx),
            Self::CurveShrinkFatten => scalar::apply_curve_shrink_fatten(data, values, ctx),
            Self::EdgeSlide(slide) => slide.apply(data, values[0], ctx),
            Self::VertSlide(slide) => slide.apply(data, values[0], ctx),
        }
    }

    /// Offers an event to the mode. Returns true when the mode consumed it
    /// and the values need to be applied again.
    pub fn handle_event(&mut self, event: &Event, ctx: &mut ModeEventContext<'_>) -> bool {
        match self {
            Self::EdgeSlide(slide) => slide.handle_event(event, ctx),
            Self::VertSlide(slide) => slide.handle_event(event, ctx),
            Self::ShrinkFatten { even } => match event {
                Event::Key {
                    key: Key::S,
                    state: KeyState::Press,
                    ..
                } => {
                    *even = !*even;
                    true
                }
                Event::Key {
                    key: Key::Alt,
                    state: key_state,
                    ..
                } => {
                    *even = *key_state == KeyState::Press;
                    true
                }
                _ => false,
            },
            Self::Shear { vertical } => {
                let Event::Key {
                    key,
                    state: KeyState::Press,
                    ..
                } = event
                else {
                    return false;
                };
                let next = match key {
                    Key::X => false,
                    Key::Y => true,
                    Key::MiddleMouse => !*vertical,
                    _ => return false,
                };
                *vertical = next;
                let input = if next {
                    InputMode::VerticalRatio
                } else {
                    InputMode::HorizontalRatio
                };
                ctx.mouse.set_mode(input);
                true
            }
            Self::Bend(state) => match event {
                Event::Key {
                    key: Key::Alt,
                    state: key_state,
                    ..
                } => {
                    state.unclamped = *key_state == KeyState::Press;
                    true
                }
                Event::Key {
                    key: Key::C,
                    state: KeyState::Press,
                    ..
                } => {
                    state.unclamped = !state.unclamped;
                    true
                }
                _ => false,
            },
            _ => false,
        }
    }

    /// True once the mode has produced its final result and the operation
    /// should confirm on its own.
    pub fn requests_confirm(&self) -> bool {
        matches!(self, Self::Mirror { done: true })
    }

    /// The slide engine behind a slide mode.
    pub fn slide_mut(&mut self) -> Option<&mut dyn SlideMode> {
        match self {
            Self::EdgeSlide(slide) => Some(slide.as_mut()),
            Self::VertSlide(slide) => Some(slide.as_mut()),
            _ => None,
        }
    }
}

/// Custom data upkeep shared by the slide modes.
pub trait SlideMode {
    /// Re-interpolates corner UVs of the slid vertices from their current
    /// positions. `final_pass` is the last projection before the scratch
    /// data is dropped.
    fn project_custom_data(&mut self, mesh: &mut EditMesh, final_pass: bool);

    /// Drops the scratch data.
    fn finish(&mut self);
}
