//! # Mesh Transform
//!
//! Interactive transform core for edit-mode meshes, curves and scene
//! objects: the modal grab, rotate, scale, slide and warp operations of a
//! 3D editor, driven one input event at a time.
//!
//! ## Architecture
//!
//! ```text
//! EditTarget (mesh / curve / objects)
//!       ↓
//! convert → TransformData (elements, falloff weights, mirror partners)
//!       ↓
//! Event → operation → keymap / numeric / constraint / snap → mode.apply
//!       ↓
//! writeback through element handles → TransformHost (caches, redraw)
//! ```
//!
//! ## Modules
//!
//! - **Data**: [`mesh`] (half-edge mesh), [`curve`], [`scene`]
//! - **Elements**: [`element`], [`convert`], [`proportional`], [`mirror`]
//! - **Input**: [`event`], [`input`], [`constraint`], [`snap`], [`view`]
//! - **Modes**: [`modes`], [`slide`], [`center`]
//! - **Driver**: [`operation`], [`host`]
//!
//! ## Usage
//!
//! ```rust,ignore
//! use mesh_transform::{begin, Begin, EditTarget, Event, SimpleHost, TransformOptions};
//!
//! let mut host = SimpleHost::new(DMat4::IDENTITY);
//! if let Begin::Handle(mut op) = begin(EditTarget::Mesh(mesh), &mut host, view, mval, TransformOptions::default()) {
//!     op.feed_event(&Event::MouseMove(DVec2::new(120.0, 80.0)))?;
//!     op.feed_event(&Event::press(Key::Return))?;
//!     let mesh = op.into_target();
//! }
//! ```

pub mod center;
pub mod constraint;
pub mod convert;
pub mod curve;
pub mod element;
pub mod error;
pub mod event;
pub mod host;
pub mod input;
pub mod math;
pub mod mesh;
pub mod mirror;
pub mod modes;
pub mod operation;
pub mod proportional;
pub mod scene;
pub mod slide;
pub mod snap;
pub mod view;

#[cfg(test)]
mod test_support;

pub use element::{EditTarget, TransformElement};
pub use error::{TransformError, TransformResult};
pub use event::{Event, Key, KeyState, Keymap, ModalEvent, Modifiers};
pub use host::{EntityRef, SimpleHost, TransformHost};
pub use mesh::EditMesh;
pub use modes::ModeKind;
pub use operation::{begin, Begin, EventStatus, OperationState, RefuseReason, TransformOperation, TransformOptions};
pub use view::ViewContext;
