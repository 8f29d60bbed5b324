//! # Mirror Cache
//!
//! Maps each vertex to its counterpart across the local X = 0 plane.
//! Lookups are spatial: positions are bucketed on a grid of the match
//! tolerance and each vertex searches the neighbouring buckets of its
//! mirrored position.

use crate::mesh::{EditMesh, VertexId};
use glam::DVec3;
use rayon::prelude::*;
use std::collections::HashMap;

/// Vertex to mirror vertex table built once per operation.
#[derive(Debug, Clone, Default)]
pub struct MirrorCache {
    partners: Vec<Option<VertexId>>,
}

impl MirrorCache {
    /// Builds the table by matching `(-x, y, z)` within `tolerance`.
    pub fn spatial(mesh: &EditMesh, tolerance: f64) -> Self {
        let cell = tolerance.max(f64::EPSILON);
        let key = |p: DVec3| {
            (
                (p.x / cell).floor() as i64,
                (p.y / cell).floor() as i64,
                (p.z / cell).floor() as i64,
            )
        };

        let mut buckets: HashMap<(i64, i64, i64), Vec<VertexId>> = HashMap::new();
        for v in mesh.vertex_ids() {
            buckets.entry(key(mesh.position(v))).or_default().push(v);
        }

        let tol_sq = tolerance * tolerance;
        let partners = (0..mesh.vertex_count() as u32)
            .into_par_iter()
            .map(|i| {
                let v = VertexId(i);
                let p = mesh.position(v);
                let target = DVec3::new(-p.x, p.y, p.z);
                let (kx, ky, kz) = key(target);
                let mut best: Option<(f64, VertexId)> = None;
                for dx in -1..=1 {
                    for dy in -1..=1 {
                        for dz in -1..=1 {
                            let Some(bucket) = buckets.get(&(kx + dx, ky + dy, kz + dz)) else {
                                continue;
                            };
                            for &other in bucket {
                                let d = mesh.position(other).distance_squared(target);
                                if d <= tol_sq && best.map_or(true, |(bd, _)| d < bd) {
                                    best = Some((d, other));
                                }
                            }
                        }
                    }
                }
                best.map(|(_, other)| other)
            })
            .collect();
        Self { partners }
    }

    /// Mirror vertex of `v`, if one was found.
    pub fn lookup(&self, v: VertexId) -> Option<VertexId> {
        self.partners.get(v.index()).copied().flatten()
    }
}

#[cfg(test)]
mod tests;
