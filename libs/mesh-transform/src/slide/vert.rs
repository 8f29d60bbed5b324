//! Vertex slide: every selected vertex slides along one of its edges.

use super::{
    element_lookup, mirror_partners, project_local, slide_header, SlideOptions, SlideOrigData,
};
use crate::element::{ElementFlags, TransformData};
use crate::error::{TransformError, TransformResult};
use crate::event::{Event, Key, KeyState};
use crate::input::{InputMode, NumericInput};
use crate::math::project_plane;
use crate::mesh::{EditMesh, VertexId};
use crate::modes::{ModeContext, ModeEventContext, ModeSetup, SlideMode};
use crate::view::ViewContext;
use config::constants::{FLT_EPSILON, RATIO_SNAP_INCREMENT, RATIO_SNAP_PRECISION};
use glam::{DMat3, DMat4, DVec2, DVec3};
use tracing::debug;

/// One slid vertex with the far ends of its visible edges.
#[derive(Debug, Clone, PartialEq)]
pub struct VertSlideVert {
    /// Slid vertex
    pub vertex: VertexId,
    /// Position when the slide started
    pub orig: DVec3,
    /// Far end of every visible edge
    pub links: Vec<DVec3>,
    /// Link the vertex currently slides towards
    pub link_curr: usize,
    /// Position for the current factor
    pub co: DVec3,
    element: Option<usize>,
}

impl VertSlideVert {
    /// Far end of the active edge.
    pub fn target(&self) -> DVec3 {
        self.links.get(self.link_curr).copied().unwrap_or(self.orig)
    }
}

/// Vertex slide state of a running operation.
#[derive(Debug, Clone, PartialEq)]
pub struct VertSlide {
    /// Slid vertices
    pub verts: Vec<VertSlideVert>,
    /// Vertex closest to the mouse; its edge defines the screen segment
    pub curr_sv_index: usize,
    even: bool,
    flipped: bool,
    clamp: bool,
    obmat: DMat4,
    orig_data: Option<SlideOrigData>,
}

impl VertSlide {
    /// Collects the selected vertices that have a visible edge and picks
    /// for each the edge best aligned with the drag from `mval`.
    ///
    /// # Errors
    ///
    /// [`TransformError::SlideUnavailable`] when no selected vertex has a
    /// visible edge.
    pub fn build(
        mesh: &EditMesh,
        view: &ViewContext,
        obmat: DMat4,
        mval: DVec2,
        options: &SlideOptions,
    ) -> TransformResult<Self> {
        let mut verts = Vec::new();
        for v in mesh.vertex_ids() {
            let vert = mesh.vertex(v);
            if !vert.selected || vert.hidden {
                continue;
            }
            let links: Vec<DVec3> = mesh
                .vertex_edges(v)
                .iter()
                .filter(|e| !mesh.edge(**e).hidden)
                .map(|e| mesh.position(mesh.edge_other_vertex(*e, v)))
                .collect();
            if links.is_empty() {
                continue;
            }
            let orig = mesh.position(v);
            verts.push(VertSlideVert {
                vertex: v,
                orig,
                links,
                link_curr: 0,
                co: orig,
                element: None,
            });
        }

        if verts.is_empty() {
            return Err(TransformError::slide_unavailable(
                "no selected vertex has a visible edge",
            ));
        }

        let mut curr_sv_index = 0;
        let mut dist_min_sq = f64::MAX;
        for (i, sv) in verts.iter().enumerate() {
            let dist_sq = mval.distance_squared(project_local(view, obmat, sv.orig));
            if dist_sq < dist_min_sq {
                dist_min_sq = dist_sq;
                curr_sv_index = i;
            }
        }

        debug!(verts = verts.len(), "vertex slide built");

        let mut slide = Self {
            verts,
            curr_sv_index,
            even: options.even,
            flipped: options.flipped,
            clamp: options.clamp,
            obmat,
            orig_data: None,
        };
        slide.update_active_edges(view, mval, mval);
        Ok(slide)
    }

    /// Picks per vertex the edge whose direction on screen best matches the
    /// drag from `mval` to `imval`.
    fn update_active_edges(&mut self, view: &ViewContext, imval: DVec2, mval: DVec2) {
        let Some(curr) = self.verts.get(self.curr_sv_index) else {
            return;
        };
        let depth = self.obmat.transform_point3(curr.orig);
        let dir = view.win_to_delta(imval - mval, depth).normalize_or_zero();
        let view_axis = view.viewinv.z_axis.truncate();
        let obmat3 = DMat3::from_mat4(self.obmat);

        for sv in &mut self.verts {
            if sv.links.len() < 2 {
                continue;
            }
            let mut dot_best = -f64::MAX;
            for (j, link) in sv.links.iter().enumerate() {
                let tdir = project_plane(obmat3 * (sv.orig - *link), view_axis).normalize_or_zero();
                let dot = dir.dot(tdir);
                if dot > dot_best {
                    dot_best = dot;
                    sv.link_curr = j;
                }
            }
        }
    }

    /// Screen segment of the active edge of the vertex under the mouse,
    /// offset to start at the mouse press.
    fn custom_points(&self, view: &ViewContext, imval: DVec2) -> Option<(DVec2, DVec2)> {
        let curr = self.verts.get(self.curr_sv_index)?;
        let co_orig = project_local(view, self.obmat, curr.orig);
        let co_curr = project_local(view, self.obmat, curr.target());
        let offset = imval - co_orig;
        let start = co_orig + offset;
        let end = co_curr + offset;
        Some(if self.flipped && self.even {
            (start, end)
        } else {
            (end, start)
        })
    }

    /// Builds the slide for the running operation.
    ///
    /// # Errors
    ///
    /// [`TransformError::SlideUnavailable`] when the edit target is not a
    /// mesh or no selected vertex can slide.
    pub fn init(setup: &mut ModeSetup<'_>) -> TransformResult<Self> {
        let target = setup.target;
        let mesh = target
            .mesh()
            .ok_or_else(|| TransformError::slide_unavailable("vertex slide needs a mesh"))?;
        let mut slide = Self::build(mesh, setup.view, setup.data.obmat, setup.mval, &setup.slide)?;

        let lookup = element_lookup(setup.data);
        for sv in &mut slide.verts {
            sv.element = lookup.get(&sv.vertex).copied();
        }

        if setup.slide.correct_uvs {
            let mut moved: Vec<(VertexId, DVec3)> =
                slide.verts.iter().map(|sv| (sv.vertex, sv.orig)).collect();
            moved.extend(mirror_partners(setup.data).map(|v| (v, mesh.position(v))));
            slide.orig_data = SlideOrigData::build(mesh, &moved);
        }

        setup.mouse.custom = slide.custom_points(setup.view, setup.mouse.imval);
        setup.input(InputMode::CustomRatio, NumericInput::new(0));
        Ok(slide)
    }

    /// Even sliding on or off.
    pub fn set_even(&mut self, even: bool) {
        self.even = even;
    }

    /// Flips which end even sliding measures from.
    pub fn set_flipped(&mut self, flipped: bool) {
        self.flipped = flipped;
    }

    /// Clamping of the factor to `[0, 1]`.
    pub fn set_clamp(&mut self, clamp: bool) {
        self.clamp = clamp;
    }

    /// Clamping in effect.
    pub fn is_clamped(&self) -> bool {
        self.clamp
    }

    /// Moves every vertex for factor `perc`, filling [`VertSlideVert::co`].
    pub fn slide_to(&mut self, perc: f64) {
        if !self.even {
            for sv in &mut self.verts {
                sv.co = sv.orig.lerp(sv.target(), perc);
            }
            return;
        }

        let Some(curr) = self.verts.get(self.curr_sv_index) else {
            return;
        };
        let edge_len_curr = curr.orig.distance(curr.target());
        let tperc = perc * edge_len_curr;
        let flipped = self.flipped;
        for sv in &mut self.verts {
            let target = sv.target();
            let edge_len = sv.orig.distance(target);
            if edge_len <= FLT_EPSILON {
                sv.co = sv.orig;
                continue;
            }
            let dir = (target - sv.orig) / edge_len;
            sv.co = if flipped {
                target - dir * tperc
            } else {
                sv.orig + dir * tperc
            };
        }
    }

    /// Slides to `value` after snapping, clamping and typed input, writes
    /// the element locations and returns the header.
    pub fn apply(&mut self, data: &mut TransformData, value: f64, ctx: &ModeContext<'_>) -> String {
        let mut v = [value];
        let typed = !ctx.preset && ctx.numeric.is_active();
        if !ctx.preset {
            ctx.snap_increment(&mut v, RATIO_SNAP_INCREMENT, RATIO_SNAP_PRECISION);
        }
        if self.clamp && !typed {
            v[0] = v[0].clamp(0.0, 1.0);
        }
        if !ctx.preset {
            ctx.numeric.apply(&mut v);
        }
        let perc = v[0];

        self.slide_to(perc);
        for sv in &self.verts {
            let Some(td) = sv.element.and_then(|i| data.elements.get_mut(i)) else {
                continue;
            };
            if !td.flags.contains(ElementFlags::SKIP) {
                td.loc = sv.co;
            }
        }

        let value = if typed {
            ctx.numeric.text()
        } else {
            format!("{perc:.4}")
        };
        slide_header("Vert Slide", &value, self.even, self.flipped, self.clamp)
    }

    /// Option toggles; while clamped, mouse moves re-pick the active edges.
    pub fn handle_event(&mut self, event: &Event, ctx: &mut ModeEventContext<'_>) -> bool {
        match event {
            Event::MouseMove(mval) => {
                if self.clamp {
                    self.update_active_edges(ctx.view, ctx.mouse.imval, *mval);
                    ctx.mouse.custom = self.custom_points(ctx.view, ctx.mouse.imval);
                }
                // the operation applies again after every move anyway
                false
            }
            Event::Key { key, state, .. } => {
                match (key, state) {
                    (Key::E, KeyState::Press) => self.even = !self.even,
                    (Key::F, KeyState::Press) => self.flipped = !self.flipped,
                    (Key::C, KeyState::Press) => self.clamp = !self.clamp,
                    (Key::Alt, KeyState::Press) => self.clamp = false,
                    (Key::Alt, KeyState::Release) => self.clamp = true,
                    _ => return false,
                }
                ctx.mouse.custom = self.custom_points(ctx.view, ctx.mouse.imval);
                true
            }
            _ => false,
        }
    }
}

impl SlideMode for VertSlide {
    fn project_custom_data(&mut self, mesh: &mut EditMesh, final_pass: bool) {
        if let Some(orig_data) = &self.orig_data {
            orig_data.project(mesh, final_pass);
        }
    }

    fn finish(&mut self) {
        if let Some(mut orig_data) = self.orig_data.take() {
            orig_data.finish();
        }
    }
}
