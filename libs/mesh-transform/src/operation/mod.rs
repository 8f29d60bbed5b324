//! # Transform Operation
//!
//! The modal state machine the host drives with events.
//!
//! ## Lifecycle
//!
//! ```text
//! begin ──► Starting ──► Running ──┬──► Confirmed
//!                         ▲    │   └──► Cancelled
//!                         └────┘
//! ```
//!
//! [`begin`] converts the selection and initializes the requested mode, or
//! refuses when there is nothing to transform. Every event is fully
//! processed before [`TransformOperation::feed_event`] returns: the state
//! transition, the constraint and snapping filters, the mode apply, the
//! writeback into the edited entity and the redraw request.
//!
//! Apply always recomputes from the original values, so feeding the same
//! mouse position twice gives the same result. Cancel restores every
//! element bit for bit. Once confirmed or cancelled the operation only
//! answers with [`TransformError::OperationFinished`].
//!
//! ## Event Routing
//!
//! 1. Release of the launching button confirms when release-confirm is set
//! 2. The running mode sees raw keys first (slide toggles, shear axis, ...)
//! 3. The keymap turns the rest into [`ModalEvent`]s
//! 4. Unbound keys reach numeric input, proportional keys and precision

use crate::center::{calculate_center, PivotMode, TransformCenter};
use crate::constraint::{Constraint, ConstraintAxes, Orientation, OrientationFrames};
use crate::convert::{create_trans_data, sort_trans_data_dist, ConvertOptions};
use crate::element::{DataKind, EditTarget, ElementFlags, ElementHandle, Symmetry, TransformData, TransformElement};
use crate::error::{TransformError, TransformResult};
use crate::event::{Event, Key, KeyState, Keymap, ModalEvent, Modifiers};
use crate::host::{EntityRef, TransformHost};
use crate::input::{MouseInput, NumericInput};
use crate::math::{normalize_columns, space_from_normal};
use crate::mesh::EditMesh;
use crate::modes::{ModeContext, ModeEventContext, ModeKind, ModeSetup, TransformMode};
use crate::proportional::{calculate_prop_ratio, mesh_connectivity_distance, ProportionalSettings};
use crate::slide::SlideOptions;
use crate::snap::Snapping;
use crate::view::ViewContext;
use config::constants::{TransformConfig, PROP_SIZE_RESET_THRESHOLD};
use glam::{DMat3, DVec2, DVec3};
use thiserror::Error;
use tracing::{debug, warn};

// =============================================================================
// PUBLIC TYPES
// =============================================================================

/// Settings of one operation, fixed when it begins.
#[derive(Debug, Clone, Default)]
pub struct TransformOptions {
    /// Mode to start in
    pub mode: ModeKind,
    /// Pivot placement
    pub pivot: PivotMode,
    /// Proportional editing; keys may change it while running
    pub proportional: ProportionalSettings,
    /// Mesh symmetry
    pub symmetry: Symmetry,
    /// Snapping state at the start
    pub snapping: Snapping,
    /// Raw key translation
    pub keymap: Keymap,
    /// Increments and defaults
    pub config: TransformConfig,
    /// Mode values applied right away instead of waiting for the mouse
    pub values: Option<[f64; 3]>,
    /// Confirm after the first apply
    pub auto_confirm: bool,
    /// Pivot in element space, replacing the computed one
    pub center_override: Option<DVec3>,
    /// Orientation for the second press of an axis key and for
    /// `constraint_axis`
    pub orientation: Orientation,
    /// Constraint in effect from the start
    pub constraint_axis: Option<ConstraintAxes>,
    /// Button whose release confirms, usually the one that started a drag
    pub release_confirm: Option<Key>,
    /// Options of the slide modes
    pub slide: SlideOptions,
}

/// Why an operation did not start. Meant for a status message, the host
/// treats it as a no-op.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RefuseReason {
    /// Nothing selected
    #[error("Nothing selected")]
    NothingSelected,
    /// The mode cannot edit this kind of entity
    #[error("{} does not support this data", .mode.name())]
    UnsupportedTarget {
        /// Requested mode
        mode: ModeKind,
    },
    /// The selection could not be converted
    #[error("Invalid selection: {message}")]
    InvalidSelection {
        /// Conversion error
        message: String,
    },
}

/// Outcome of [`begin`].
#[derive(Debug)]
pub enum Begin<'h> {
    /// The operation runs and waits for events
    Handle(Box<TransformOperation<'h>>),
    /// The operation never started
    Refused(RefuseReason),
}

impl<'h> Begin<'h> {
    /// The running operation, if it started.
    pub fn into_operation(self) -> Option<Box<TransformOperation<'h>>> {
        match self {
            Self::Handle(op) => Some(op),
            Self::Refused(_) => None,
        }
    }
}

/// What feeding one event led to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventStatus {
    /// Still running
    Continue,
    /// The result was kept; the operation is over
    Confirmed,
    /// The entity was restored; the operation is over
    Cancelled,
}

/// State of the modal state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationState {
    /// Set up, no event fed yet
    Starting,
    /// Accepting events
    Running,
    /// Ended by confirm
    Confirmed,
    /// Ended by cancel
    Cancelled,
}

impl OperationState {
    /// Confirmed or cancelled.
    pub fn is_finished(self) -> bool {
        matches!(self, Self::Confirmed | Self::Cancelled)
    }
}

/// Result of routing one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Ignore,
    Apply,
    Confirm,
    Cancel,
}

// =============================================================================
// BEGIN
// =============================================================================

/// Starts an operation on `target` with the mouse at `mval`.
///
/// The operation owns the target until it ends; get it back with
/// [`TransformOperation::into_target`]. With preset `values` they are
/// applied right away, and with `auto_confirm` the returned operation is
/// already confirmed.
pub fn begin<'h>(
    target: EditTarget,
    host: &'h mut dyn TransformHost,
    view: ViewContext,
    mval: DVec2,
    options: TransformOptions,
) -> Begin<'h> {
    let mode = options.mode;
    if !mode_supports(mode, &target) {
        debug!(mode = mode.name(), "mode does not support the edit target, refusing");
        return Begin::Refused(RefuseReason::UnsupportedTarget { mode });
    }

    let mut proportional = options.proportional;
    if proportional.enabled
        && (!proportional.size.is_finite() || proportional.size <= PROP_SIZE_RESET_THRESHOLD)
    {
        proportional.size = options.config.prop_size;
    }

    let convert = ConvertOptions {
        mode,
        pivot: options.pivot,
        proportional,
        symmetry: options.symmetry,
    };
    let data = match create_trans_data(&target, &*host, &view, &convert) {
        Ok(data) => data,
        Err(TransformError::NothingToTransform) => {
            debug!(mode = mode.name(), "nothing to transform, refusing");
            return Begin::Refused(RefuseReason::NothingSelected);
        }
        Err(err) => {
            warn!(mode = mode.name(), %err, "selection conversion failed, refusing");
            return Begin::Refused(RefuseReason::InvalidSelection {
                message: err.to_string(),
            });
        }
    };

    let pivot = options.pivot.resolve(mode, data.len());
    let active = active_center(&target);
    let center = calculate_center(&data, pivot, &view, active, options.center_override);
    let frames = orientation_frames(&data, &view);
    let mouse = MouseInput::new(mval, center.screen);

    let mut op = TransformOperation {
        target,
        host,
        view,
        data,
        mode: TransformMode::Translate,
        center,
        pivot,
        frames,
        constraint: Constraint::default(),
        snapping: options.snapping.clone(),
        numeric: NumericInput::default(),
        mouse,
        mval,
        proportional,
        prop_data: proportional.enabled,
        prop_dirty: true,
        preset: None,
        header: String::new(),
        state: OperationState::Starting,
        options,
    };

    match op.init_mode(mode) {
        Ok(mode) => op.mode = mode,
        Err(err) => {
            warn!(%err, "no mode could start on the selection, refusing");
            return Begin::Refused(RefuseReason::InvalidSelection {
                message: err.to_string(),
            });
        }
    }

    if let Some(axes) = op.options.constraint_axis {
        if op.mode.kind().allows_constraint() {
            op.constraint.set(axes, op.options.orientation, &op.frames);
        }
    }

    debug!(
        mode = op.mode.kind().name(),
        elements = op.data.len(),
        selected = op.data.selected_count(),
        pivot = ?op.pivot,
        "transform started"
    );

    if let Some(values) = op.options.values {
        op.preset = Some(values);
        op.state = OperationState::Running;
        op.apply();
        op.after_apply();
    }
    Begin::Handle(Box::new(op))
}

fn mode_supports(mode: ModeKind, target: &EditTarget) -> bool {
    match mode {
        ModeKind::Crease => matches!(target, EditTarget::Mesh(_)),
        ModeKind::Tilt | ModeKind::CurveShrinkFatten => matches!(target, EditTarget::Curve(_)),
        _ => true,
    }
}

/// Center of the active element in element space.
fn active_center(target: &EditTarget) -> Option<DVec3> {
    let mesh = target.mesh()?;
    mesh.active_vertex()
        .filter(|v| mesh.get_vertex(*v).is_some_and(|vert| !vert.hidden))
        .map(|v| mesh.position(v))
}

/// Constraint frames for the selection: object axes, view axes and a frame
/// around the summed selection normal.
fn orientation_frames(data: &TransformData, view: &ViewContext) -> OrientationFrames {
    let local = if data.is_edit_mode() {
        normalize_columns(DMat3::from_mat4(data.obmat))
    } else {
        data.elements.first().map_or(DMat3::IDENTITY, |td| td.axismtx)
    };
    let normal: DVec3 = data
        .elements
        .iter()
        .filter(|td| td.is_selected())
        .map(|td| td.axismtx.z_axis)
        .sum();
    let normal = if data.is_edit_mode() {
        DMat3::from_mat4(data.obmat) * normal
    } else {
        normal
    };
    OrientationFrames {
        local,
        view: view.view_rotation_inv(),
        normal: space_from_normal(normal).unwrap_or(local),
    }
}

/// Modes tried after `kind` fails to initialize.
fn fallback_chain(kind: ModeKind) -> &'static [ModeKind] {
    match kind {
        ModeKind::EdgeSlide => &[ModeKind::VertSlide, ModeKind::Translate],
        ModeKind::VertSlide => &[ModeKind::Translate],
        _ => &[],
    }
}

// =============================================================================
// OPERATION
// =============================================================================

/// A running transform.
pub struct TransformOperation<'h> {
    target: EditTarget,
    host: &'h mut dyn TransformHost,
    view: ViewContext,
    data: TransformData,
    mode: TransformMode,
    center: TransformCenter,
    pivot: PivotMode,
    frames: OrientationFrames,
    constraint: Constraint,
    snapping: Snapping,
    numeric: NumericInput,
    mouse: MouseInput,
    mval: DVec2,
    proportional: ProportionalSettings,
    /// The element array holds unselected elements
    prop_data: bool,
    prop_dirty: bool,
    preset: Option<[f64; 3]>,
    header: String,
    state: OperationState,
    options: TransformOptions,
}

impl std::fmt::Debug for TransformOperation<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransformOperation")
            .field("mode", &self.mode.kind())
            .field("state", &self.state)
            .field("elements", &self.data.len())
            .field("header", &self.header)
            .finish_non_exhaustive()
    }
}

impl TransformOperation<'_> {
    /// Current state.
    pub fn state(&self) -> OperationState {
        self.state
    }

    /// Elements in array order, selected first.
    pub fn elements(&self) -> &[TransformElement] {
        &self.data.elements
    }

    /// Running mode, after any fallback.
    pub fn mode(&self) -> ModeKind {
        self.mode.kind()
    }

    /// Header text of the last apply.
    pub fn header(&self) -> &str {
        &self.header
    }

    /// Pivot in use.
    pub fn center(&self) -> &TransformCenter {
        &self.center
    }

    /// Axis constraint in effect.
    pub fn constraint(&self) -> &Constraint {
        &self.constraint
    }

    /// Proportional settings in effect.
    pub fn proportional(&self) -> &ProportionalSettings {
        &self.proportional
    }

    /// The edited entity as it currently is.
    pub fn target(&self) -> &EditTarget {
        &self.target
    }

    /// Hands the edited entity back.
    pub fn into_target(self) -> EditTarget {
        self.target
    }

    /// Processes one event.
    ///
    /// # Errors
    ///
    /// [`TransformError::OperationFinished`] once the operation was
    /// confirmed or cancelled.
    pub fn feed_event(&mut self, event: &Event) -> TransformResult<EventStatus> {
        if self.state.is_finished() {
            return Err(TransformError::OperationFinished);
        }
        self.state = OperationState::Running;

        let step = self.route(event);
        Ok(match step {
            Step::Ignore => EventStatus::Continue,
            Step::Apply => {
                self.apply();
                self.after_apply()
            }
            Step::Confirm => {
                self.confirm();
                EventStatus::Confirmed
            }
            Step::Cancel => {
                self.cancel();
                EventStatus::Cancelled
            }
        })
    }

    /// Applies `values` as the mode values, bypassing the mouse, snapping
    /// and numeric input, and returns the header. They stay in effect until
    /// the mouse moves.
    ///
    /// # Errors
    ///
    /// [`TransformError::OperationFinished`] once the operation was
    /// confirmed or cancelled.
    pub fn apply_values(&mut self, values: [f64; 3]) -> TransformResult<&str> {
        if self.state.is_finished() {
            return Err(TransformError::OperationFinished);
        }
        self.state = OperationState::Running;
        self.preset = Some(values);
        self.apply();
        Ok(&self.header)
    }

    // =========================================================================
    // EVENT ROUTING
    // =========================================================================

    fn route(&mut self, event: &Event) -> Step {
        match *event {
            Event::MouseMove(mval) => {
                self.mval = mval;
                self.preset = None;
                self.offer_to_mode(event);
                Step::Apply
            }
            Event::SnapTarget(target) => {
                self.snapping.target = target;
                Step::Apply
            }
            Event::Modal(modal) => self.handle_modal(modal),
            Event::Key { key, state, modifiers } => {
                if state == KeyState::Release && self.options.release_confirm == Some(key) {
                    return Step::Confirm;
                }
                if self.offer_to_mode(event) {
                    return Step::Apply;
                }
                match self.options.keymap.lookup(key, state, modifiers) {
                    Some(modal) => self.handle_modal(modal),
                    None => self.handle_key(key, state, modifiers),
                }
            }
        }
    }

    fn offer_to_mode(&mut self, event: &Event) -> bool {
        let mut ctx = ModeEventContext {
            view: &self.view,
            mouse: &mut self.mouse,
            mval: self.mval,
            obmat: self.data.obmat,
        };
        self.mode.handle_event(event, &mut ctx)
    }

    fn handle_modal(&mut self, modal: ModalEvent) -> Step {
        match modal {
            ModalEvent::Cancel => Step::Cancel,
            ModalEvent::Confirm => Step::Confirm,
            ModalEvent::Translate => {
                let current = self.mode.kind();
                let next = if current.is_slide() {
                    ModeKind::Translate
                } else if current == ModeKind::Translate && self.data.kind == DataKind::Mesh {
                    ModeKind::EdgeSlide
                } else {
                    ModeKind::Translate
                };
                self.switch_mode(next)
            }
            ModalEvent::Rotate => {
                let next = if self.mode.kind() == ModeKind::Rotate {
                    ModeKind::Trackball
                } else {
                    ModeKind::Rotate
                };
                self.switch_mode(next)
            }
            ModalEvent::Resize => self.switch_mode(ModeKind::Resize),
            ModalEvent::SnapInvOn => {
                self.snapping.invert = true;
                Step::Apply
            }
            ModalEvent::SnapInvOff => {
                self.snapping.invert = false;
                Step::Apply
            }
            ModalEvent::SnapToggle => {
                self.snapping.enabled = !self.snapping.enabled;
                Step::Apply
            }
            ModalEvent::AxisX => self.cycle_axis(0, false),
            ModalEvent::AxisY => self.cycle_axis(1, false),
            ModalEvent::AxisZ => self.cycle_axis(2, false),
            ModalEvent::PlaneX => self.cycle_axis(0, true),
            ModalEvent::PlaneY => self.cycle_axis(1, true),
            ModalEvent::PlaneZ => self.cycle_axis(2, true),
            ModalEvent::ConsOff => {
                self.constraint.clear();
                Step::Apply
            }
            ModalEvent::PropSizeUp => self.change_prop_size(|p, precision| p.grow(precision)),
            ModalEvent::PropSizeDown => self.change_prop_size(|p, precision| p.shrink(precision)),
            ModalEvent::PropSize(delta_y) => self.change_prop_size(|p, _| p.pan(delta_y)),
        }
    }

    fn handle_key(&mut self, key: Key, state: KeyState, modifiers: Modifiers) -> Step {
        if state == KeyState::Release {
            return match key {
                Key::Shift => {
                    self.mouse.set_precision(false, self.mval);
                    Step::Apply
                }
                _ => Step::Ignore,
            };
        }

        match key {
            Key::Digit(_) | Key::Period | Key::Minus | Key::Backspace | Key::Tab => {
                if self.numeric.handle_key(key) {
                    Step::Apply
                } else {
                    Step::Ignore
                }
            }
            Key::Shift => {
                self.mouse.set_precision(true, self.mval);
                Step::Apply
            }
            Key::LeftMouse | Key::Space => Step::Confirm,
            Key::RightMouse => Step::Cancel,
            Key::MiddleMouse => self.constraint_from_drag(),
            Key::O if modifiers.shift => self.cycle_falloff(),
            Key::O => self.toggle_proportional(),
            Key::C if modifiers.alt => self.toggle_connected(),
            _ => Step::Ignore,
        }
    }

    fn cycle_axis(&mut self, axis: usize, plane: bool) -> Step {
        if !self.mode.kind().allows_constraint() {
            return Step::Ignore;
        }
        self.constraint
            .cycle_axis(axis, plane, self.options.orientation, &self.frames);
        Step::Apply
    }

    /// Middle mouse: constrains to the axis closest to the drag so far, or
    /// drops the constraint.
    fn constraint_from_drag(&mut self) -> Step {
        if !self.mode.kind().allows_constraint() {
            return Step::Ignore;
        }
        if self.constraint.active {
            self.constraint.clear();
            return Step::Apply;
        }
        let view = &self.view;
        let center = self.center.global;
        let screen = self.center.screen;
        let orientation = self.options.orientation;
        self.constraint.select_from_drag(
            self.mval - self.mouse.imval,
            orientation,
            &self.frames,
            |dir| view.project(center + dir) - screen,
        );
        Step::Apply
    }

    // =========================================================================
    // PROPORTIONAL
    // =========================================================================

    fn change_prop_size(&mut self, change: impl FnOnce(&mut ProportionalSettings, bool)) -> Step {
        if !self.proportional.enabled {
            return Step::Ignore;
        }
        change(&mut self.proportional, self.mouse.precision);
        self.prop_dirty = true;
        Step::Apply
    }

    fn cycle_falloff(&mut self) -> Step {
        if !self.proportional.enabled {
            return Step::Ignore;
        }
        self.proportional.curve = self.proportional.curve.next();
        self.prop_dirty = true;
        Step::Apply
    }

    fn toggle_proportional(&mut self) -> Step {
        if !self.prop_data {
            debug!("proportional editing needs the unselected elements, ignoring toggle");
            return Step::Ignore;
        }
        self.proportional.enabled = !self.proportional.enabled;
        self.prop_dirty = true;
        Step::Apply
    }

    fn toggle_connected(&mut self) -> Step {
        if !self.proportional.enabled {
            return Step::Ignore;
        }
        self.proportional.connected = !self.proportional.connected;
        if self.proportional.connected && self.data.kind == DataKind::Mesh {
            if let Some(mesh) = self.target.mesh() {
                connect_mesh_elements(mesh, &mut self.data.elements);
            }
        }
        sort_trans_data_dist(&mut self.data.elements, self.proportional.connected);
        self.prop_dirty = true;
        Step::Apply
    }

    /// Recomputes the falloff weights; with proportional editing off the
    /// unselected elements stay where they were.
    fn update_falloff(&mut self) {
        if self.proportional.enabled || !self.prop_data {
            calculate_prop_ratio(&mut self.data.elements, &self.proportional, self.data.mirror_side);
        } else {
            for td in &mut self.data.elements {
                if td.is_selected() {
                    td.factor = 1.0;
                } else {
                    td.flags.insert(ElementFlags::NOACTION);
                    td.factor = 0.0;
                    td.restore();
                }
            }
        }
        if self.prop_data {
            debug!(
                enabled = self.proportional.enabled,
                prop_size = self.proportional.size,
                curve = self.proportional.curve.label(),
                connected = self.proportional.connected,
                "proportional weights recomputed"
            );
        }
        self.prop_dirty = false;
    }

    // =========================================================================
    // MODES
    // =========================================================================

    /// Initializes `kind`, walking the slide fallback chain on failure.
    fn init_mode(&mut self, kind: ModeKind) -> TransformResult<TransformMode> {
        let mut last_err = None;
        let candidates = std::iter::once(kind).chain(fallback_chain(kind).iter().copied());
        for candidate in candidates {
            let mut setup = ModeSetup {
                target: &self.target,
                data: &mut self.data,
                view: &self.view,
                center: &self.center,
                mouse: &mut self.mouse,
                numeric: &mut self.numeric,
                mval: self.mval,
                slide: self.options.slide,
            };
            match TransformMode::init(candidate, &mut setup) {
                Ok(mode) => return Ok(mode),
                Err(err) => {
                    debug!(mode = candidate.name(), %err, "mode unavailable, falling back");
                    last_err = Some(err);
                }
            }
        }
        Err(last_err.unwrap_or_else(|| TransformError::unsupported(kind.name())))
    }

    /// Restores the originals and restarts in `kind` on the same elements.
    fn switch_mode(&mut self, kind: ModeKind) -> Step {
        let from = self.mode.kind();
        self.restore_target(true);
        if let Some(slide) = self.mode.slide_mut() {
            slide.finish();
        }
        self.constraint.clear();
        self.preset = None;

        self.pivot = self.options.pivot.resolve(kind, self.data.len());
        let active = active_center(&self.target);
        self.center = calculate_center(&self.data, self.pivot, &self.view, active, self.options.center_override);
        self.mouse.center = self.center.screen;

        match self.init_mode(kind) {
            Ok(mode) => {
                debug!(from = from.name(), to = mode.kind().name(), "mode switched");
                self.mode = mode;
            }
            Err(err) => {
                warn!(to = kind.name(), %err, "mode switch failed, keeping translate");
                self.mode = TransformMode::Translate;
            }
        }
        Step::Apply
    }

    // =========================================================================
    // APPLY
    // =========================================================================

    /// Recomputes every element from the current values and writes back.
    fn apply(&mut self) {
        if self.prop_dirty {
            self.update_falloff();
        }

        let (values, preset) = match self.preset {
            Some(values) => (values, true),
            None => (self.mouse.apply(&self.view, self.mval, self.center.global), false),
        };
        let ctx = ModeContext {
            view: &self.view,
            center: &self.center,
            pivot: self.pivot,
            constraint: &self.constraint,
            snapping: &self.snapping,
            numeric: &self.numeric,
            precision: self.mouse.precision,
            preset,
            config: &self.options.config,
        };
        self.header = self.mode.apply(&mut self.data, values, &ctx);

        self.target
            .recalc(&mut self.data, false, &self.options.symmetry, true);
        if let (Some(slide), Some(mesh)) = (self.mode.slide_mut(), self.target.mesh_mut()) {
            slide.project_custom_data(mesh, false);
        }
        self.host.notify_redraw(self.view.region);
    }

    fn after_apply(&mut self) -> EventStatus {
        if self.mode.requests_confirm() || self.options.auto_confirm {
            self.confirm();
            EventStatus::Confirmed
        } else {
            EventStatus::Continue
        }
    }

    /// Writes the original values back; slide modes also get their corner
    /// data re-projected at the original positions.
    fn restore_target(&mut self, final_pass: bool) {
        self.data.restore();
        self.target
            .recalc(&mut self.data, true, &self.options.symmetry, false);
        if let (Some(slide), Some(mesh)) = (self.mode.slide_mut(), self.target.mesh_mut()) {
            slide.project_custom_data(mesh, final_pass);
        }
    }

    // =========================================================================
    // END
    // =========================================================================

    fn confirm(&mut self) {
        if let (Some(slide), Some(mesh)) = (self.mode.slide_mut(), self.target.mesh_mut()) {
            slide.project_custom_data(mesh, true);
        }
        debug!(mode = self.mode.kind().name(), header = %self.header, "transform confirmed");
        self.finish(OperationState::Confirmed);
    }

    fn cancel(&mut self) {
        self.restore_target(true);
        debug!(mode = self.mode.kind().name(), "transform cancelled");
        self.finish(OperationState::Cancelled);
    }

    fn finish(&mut self, state: OperationState) {
        if let Some(slide) = self.mode.slide_mut() {
            slide.finish();
        }
        for entity in self.touched_entities() {
            self.host.invalidate_derived_caches(entity);
        }
        self.host.notify_redraw(self.view.region);
        self.state = state;
    }

    /// Entities whose derived caches the operation invalidated.
    fn touched_entities(&self) -> Vec<EntityRef> {
        if self.data.is_edit_mode() {
            return vec![EntityRef::EditObject];
        }
        let mut entities: Vec<EntityRef> = Vec::new();
        for td in &self.data.elements {
            if let ElementHandle::Object(id) = td.handle {
                let entity = EntityRef::Object(id);
                if !entities.contains(&entity) {
                    entities.push(entity);
                }
            }
        }
        entities
    }
}

/// Fills connectivity distances of mesh vertex elements, measured on the
/// original positions.
fn connect_mesh_elements(mesh: &EditMesh, elements: &mut [TransformElement]) {
    let mut orig = mesh.clone();
    for td in elements.iter() {
        if let ElementHandle::MeshVertex(v) = td.handle {
            orig.set_position(v, td.iloc);
        }
    }
    let mtx = elements.first().map_or(DMat3::IDENTITY, |td| td.mtx);
    let dists = mesh_connectivity_distance(&orig, mtx);
    for td in elements.iter_mut() {
        if td.is_selected() {
            continue;
        }
        if let ElementHandle::MeshVertex(v) = td.handle {
            td.dist = dists.get(v.index()).copied().unwrap_or(f64::MAX);
            td.flags.set(ElementFlags::NOTCONNECTED, td.dist == f64::MAX);
        }
    }
}

#[cfg(test)]
mod tests;
