//! # View Context
//!
//! The viewport a transform runs in: view and projection matrices, region
//! size and the 3D cursor. Window coordinates have their origin at the
//! bottom-left corner with Y pointing up.

use glam::{DMat3, DMat4, DVec2, DVec3, DVec4};

/// Identifier of the drawing region to redraw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RegionId(pub u32);

/// Matrices and region size of the viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewContext {
    /// World to view
    pub viewmat: DMat4,
    /// View to world
    pub viewinv: DMat4,
    /// World to clip space
    pub persmat: DMat4,
    /// Clip space to world
    pub persinv: DMat4,
    /// Region width in pixels
    pub winx: f64,
    /// Region height in pixels
    pub winy: f64,
    /// Orthographic projection
    pub is_ortho: bool,
    /// 3D cursor in world space
    pub cursor: DVec3,
    /// Region notified after each apply step
    pub region: RegionId,
    /// Grid spacing scale for increment snapping
    pub grid_scale: f64,
}

impl ViewContext {
    /// Builds a view from its view and projection matrices.
    pub fn new(viewmat: DMat4, winmat: DMat4, size: DVec2) -> Self {
        let persmat = winmat * viewmat;
        Self {
            viewmat,
            viewinv: viewmat.inverse(),
            persmat,
            persinv: persmat.inverse(),
            winx: size.x.max(1.0),
            winy: size.y.max(1.0),
            is_ortho: winmat.w_axis.w == 1.0,
            cursor: DVec3::ZERO,
            region: RegionId::default(),
            grid_scale: 1.0,
        }
    }

    /// Orthographic view looking down the negative Z axis, showing
    /// `half_extent` world units on either side of the region center
    /// horizontally.
    pub fn orthographic_top(size: DVec2, half_extent: f64) -> Self {
        let aspect = size.y.max(1.0) / size.x.max(1.0);
        let viewmat = DMat4::look_at_rh(DVec3::new(0.0, 0.0, 10.0), DVec3::ZERO, DVec3::Y);
        let winmat = DMat4::orthographic_rh(
            -half_extent,
            half_extent,
            -half_extent * aspect,
            half_extent * aspect,
            0.1,
            100.0,
        );
        Self::new(viewmat, winmat, size)
    }

    /// Perspective view from `eye` towards `target`.
    pub fn perspective(eye: DVec3, target: DVec3, fov_y: f64, size: DVec2) -> Self {
        let viewmat = DMat4::look_at_rh(eye, target, DVec3::Z);
        let winmat = DMat4::perspective_rh(fov_y, size.x.max(1.0) / size.y.max(1.0), 0.1, 1000.0);
        Self::new(viewmat, winmat, size)
    }

    /// Sets the 3D cursor.
    pub fn with_cursor(mut self, cursor: DVec3) -> Self {
        self.cursor = cursor;
        self
    }

    /// Projects a world point to window coordinates.
    pub fn project(&self, p: DVec3) -> DVec2 {
        let clip = self.persmat * p.extend(1.0);
        let w = if clip.w.abs() < 1e-12 { 1e-12 } else { clip.w };
        let ndc = DVec2::new(clip.x, clip.y) / w;
        DVec2::new((ndc.x + 1.0) * 0.5 * self.winx, (ndc.y + 1.0) * 0.5 * self.winy)
    }

    /// Depth factor converting pixel offsets at `p` to world offsets.
    pub fn zfac(&self, p: DVec3) -> f64 {
        let w = (self.persmat * p.extend(1.0)).w;
        if w.abs() < 1e-6 {
            1.0
        } else {
            w
        }
    }

    /// World offset parallel to the view plane matching a pixel offset at
    /// the depth of `depth_pt`.
    pub fn win_to_delta(&self, delta: DVec2, depth_pt: DVec3) -> DVec3 {
        let zfac = self.zfac(depth_pt);
        let dx = 2.0 * delta.x * zfac / self.winx;
        let dy = 2.0 * delta.y * zfac / self.winy;
        self.persinv.x_axis.truncate() * dx + self.persinv.y_axis.truncate() * dy
    }

    /// World point under window position `mval` at the depth of `depth_pt`.
    pub fn win_to_3d(&self, depth_pt: DVec3, mval: DVec2) -> DVec3 {
        depth_pt + self.win_to_delta(mval - self.project(depth_pt), depth_pt)
    }

    /// Unit vector from `coord` towards the viewer.
    pub fn view_vector(&self, coord: DVec3) -> DVec3 {
        if self.is_ortho {
            self.view_axis()
        } else {
            (self.viewinv.w_axis.truncate() - coord).normalize_or_zero()
        }
    }

    /// View Z axis in world space, pointing towards the viewer.
    pub fn view_axis(&self) -> DVec3 {
        self.viewinv.z_axis.truncate().normalize_or_zero()
    }

    /// Rotation part of the view matrix.
    pub fn view_rotation(&self) -> DMat3 {
        DMat3::from_mat4(self.viewmat)
    }

    /// Rotation part of the inverse view matrix.
    pub fn view_rotation_inv(&self) -> DMat3 {
        DMat3::from_mat4(self.viewinv)
    }

    /// Homogeneous clip coordinates of a point.
    pub fn clip(&self, p: DVec3) -> DVec4 {
        self.persmat * p.extend(1.0)
    }
}
