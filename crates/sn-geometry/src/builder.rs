//! Coarse/fine mesh builder.

use crate::error::{GeometryError, GeometryResult};
use crate::mesh::{Axis, Dimension, Mesh};
use crate::validate;

#[derive(Debug, Clone)]
struct CoarseAxis {
    edges: Vec<f64>,
    fine: Vec<usize>,
}

/// Builder for a structured mesh.
///
/// Each active axis is described by coarse region edges and the number of
/// uniform fine cells per region. Materials are assigned per coarse cell,
/// x fastest, then y, then z.
#[derive(Debug, Clone)]
pub struct MeshBuilder {
    dimension: Dimension,
    axes: [Option<CoarseAxis>; 3],
    materials: Vec<usize>,
}

impl MeshBuilder {
    pub fn new(dimension: Dimension) -> Self {
        Self {
            dimension,
            axes: [None, None, None],
            materials: Vec::new(),
        }
    }

    pub fn axis(mut self, axis: Axis, edges: Vec<f64>, fine_counts: Vec<usize>) -> Self {
        self.axes[axis.index()] = Some(CoarseAxis {
            edges,
            fine: fine_counts,
        });
        self
    }

    pub fn materials(mut self, coarse_materials: Vec<usize>) -> Self {
        self.materials = coarse_materials;
        self
    }

    /// Validate the description and expand it into a fine mesh.
    pub fn build(self) -> GeometryResult<Mesh> {
        let active = self.dimension.axes();
        let mut widths: [Vec<f64>; 3] = [vec![1.0], vec![1.0], vec![1.0]];
        // Coarse region of every fine cell, per axis.
        let mut regions: [Vec<usize>; 3] = [vec![0], vec![0], vec![0]];
        let mut coarse_counts = [1usize; 3];

        for axis in Axis::ALL {
            let a = axis.index();
            match (&self.axes[a], a < active) {
                (Some(coarse), true) => {
                    validate::validate_axis(axis, &coarse.edges, &coarse.fine)?;
                    let (w, r) = expand_axis(coarse);
                    widths[a] = w;
                    regions[a] = r;
                    coarse_counts[a] = coarse.fine.len();
                }
                (None, true) => return Err(GeometryError::MissingAxis { axis: axis.name() }),
                (Some(_), false) => return Err(GeometryError::UnusedAxis { axis: axis.name() }),
                (None, false) => {}
            }
        }

        let coarse_cells = coarse_counts.iter().product();
        validate::validate_materials(coarse_cells, &self.materials)?;

        let mut material_map = Vec::with_capacity(widths.iter().map(Vec::len).product());
        for &ck in &regions[2] {
            for &cj in &regions[1] {
                for &ci in &regions[0] {
                    let coarse = ci + cj * coarse_counts[0] + ck * coarse_counts[0] * coarse_counts[1];
                    material_map.push(self.materials[coarse]);
                }
            }
        }

        Ok(Mesh {
            dimension: self.dimension,
            widths,
            material_map,
        })
    }
}

fn expand_axis(coarse: &CoarseAxis) -> (Vec<f64>, Vec<usize>) {
    let mut widths = Vec::new();
    let mut regions = Vec::new();
    for (region, (pair, &n)) in coarse.edges.windows(2).zip(&coarse.fine).enumerate() {
        let w = (pair[1] - pair[0]) / n as f64;
        widths.extend(std::iter::repeat_n(w, n));
        regions.extend(std::iter::repeat_n(region, n));
    }
    (widths, regions)
}
