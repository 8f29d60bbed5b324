//! # Slide Engine
//!
//! Edge slide and vertex slide move selected vertices along rails derived
//! from the surrounding mesh topology instead of along a free vector.
//!
//! ## Edge Slide
//!
//! Every selected vertex of a selected edge loop gets up to two rails, one
//! per side of the loop. A single factor in `[-1, 1]` picks the side by its
//! sign and the distance along the rail by its magnitude. Multiple loops
//! are analysed independently and oriented so that dragging the mouse the
//! same way moves every loop towards the same screen side.
//!
//! ## Vertex Slide
//!
//! Every selected vertex may slide along any of its visible edges. The edge
//! best aligned with the mouse drag is chosen per vertex and a factor in
//! `[0, 1]` moves the vertex towards the far end of that edge.
//!
//! ## Corner Data
//!
//! [`SlideOrigData`] keeps copies of the faces around the slid vertices so
//! corner UVs can be re-interpolated from the original layout after every
//! step, keeping textures in place while the geometry moves.

mod edge;
mod origdata;
mod vert;

pub use edge::{EdgeSlide, EdgeSlideVert};
pub use origdata::SlideOrigData;
pub use vert::{VertSlide, VertSlideVert};

use crate::element::{ElementHandle, TransformData};
use crate::mesh::VertexId;
use crate::view::ViewContext;
use glam::{DMat4, DVec2, DVec3};
use std::collections::HashMap;

/// Options shared by both slide modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlideOptions {
    /// Edge slide uses rails on both sides of the loop; otherwise every
    /// vertex slides along its longest unselected edge
    pub double_sided: bool,
    /// Move every vertex the same distance as the vertex under the mouse
    pub even: bool,
    /// Measure even sliding from the other rail end
    pub flipped: bool,
    /// Keep the factor inside its natural range
    pub clamp: bool,
    /// Re-interpolate corner UVs while sliding
    pub correct_uvs: bool,
}

impl Default for SlideOptions {
    fn default() -> Self {
        Self {
            double_sided: true,
            even: false,
            flipped: false,
            clamp: true,
            correct_uvs: true,
        }
    }
}

/// Element index of every mesh vertex element.
fn element_lookup(data: &TransformData) -> HashMap<VertexId, usize> {
    data.elements
        .iter()
        .enumerate()
        .filter_map(|(i, td)| match td.handle {
            ElementHandle::MeshVertex(v) => Some((v, i)),
            _ => None,
        })
        .collect()
}

/// Mirror partners of the elements, which also need their corners kept.
fn mirror_partners(data: &TransformData) -> impl Iterator<Item = VertexId> + '_ {
    data.elements.iter().filter_map(|td| td.mirror)
}

/// Window position of a point given in the edited object's space.
fn project_local(view: &ViewContext, obmat: DMat4, p: DVec3) -> DVec2 {
    view.project(obmat.transform_point3(p))
}

fn on_off(value: bool) -> &'static str {
    if value {
        "ON"
    } else {
        "OFF"
    }
}

/// Header shared by both slide modes.
fn slide_header(label: &str, value: &str, even: bool, flipped: bool, clamp: bool) -> String {
    let mut header = format!("{label}: {value} (E)ven: {}, ", on_off(even));
    if even {
        header.push_str(&format!("(F)lipped: {}, ", on_off(flipped)));
    }
    header.push_str(&format!("Alt or (C)lamp: {}", on_off(clamp)));
    header
}
