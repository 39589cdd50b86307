//! Cartesian mesh and the axis/side conventions used by sweeps.

use serde::{Deserialize, Serialize};

/// Spatial dimension of a problem.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    One,
    Two,
    Three,
}

impl Dimension {
    pub fn axes(self) -> usize {
        match self {
            Dimension::One => 1,
            Dimension::Two => 2,
            Dimension::Three => 3,
        }
    }

    /// Octants of the unit sphere that carry independent directions.
    pub fn number_octants(self) -> usize {
        1 << self.axes()
    }

    pub fn number_sides(self) -> usize {
        2 * self.axes()
    }
}

/// Coordinate axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        }
    }
}

/// Domain boundary side. Low sides face the negative axis direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    West,
    East,
    South,
    North,
    Bottom,
    Top,
}

impl Side {
    pub const ALL: [Side; 6] = [
        Side::West,
        Side::East,
        Side::South,
        Side::North,
        Side::Bottom,
        Side::Top,
    ];

    /// Sides present in a problem of the given dimension, in index order.
    pub fn all(dim: Dimension) -> &'static [Side] {
        &Self::ALL[..dim.number_sides()]
    }

    pub fn index(self) -> usize {
        match self {
            Side::West => 0,
            Side::East => 1,
            Side::South => 2,
            Side::North => 3,
            Side::Bottom => 4,
            Side::Top => 5,
        }
    }

    pub fn axis(self) -> Axis {
        match self {
            Side::West | Side::East => Axis::X,
            Side::South | Side::North => Axis::Y,
            Side::Bottom | Side::Top => Axis::Z,
        }
    }

    pub fn is_low(self) -> bool {
        matches!(self, Side::West | Side::South | Side::Bottom)
    }

    /// The side on the low or high end of `axis`.
    pub fn of(axis: Axis, low: bool) -> Side {
        Self::ALL[2 * axis.index() + usize::from(!low)]
    }
}

/// Immutable structured mesh.
///
/// Axes beyond the mesh dimension hold a single cell of unit width, so
/// volumes and face sizes need no special cases.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub(crate) dimension: Dimension,
    pub(crate) widths: [Vec<f64>; 3],
    pub(crate) material_map: Vec<usize>,
}

impl Mesh {
    /// Uniform mesh with `cells` cells of width `width` along every active
    /// axis, filled with one material.
    pub fn uniform(dimension: Dimension, cells: usize, width: f64, material: usize) -> Self {
        let axis = |a: usize| {
            if a < dimension.axes() {
                vec![width; cells]
            } else {
                vec![1.0]
            }
        };
        let widths = [axis(0), axis(1), axis(2)];
        let n = widths.iter().map(Vec::len).product();
        Self {
            dimension,
            widths,
            material_map: vec![material; n],
        }
    }

    pub fn dimension(&self) -> Dimension {
        self.dimension
    }

    pub fn number_cells(&self) -> usize {
        self.material_map.len()
    }

    pub fn number_cells_axis(&self, axis: Axis) -> usize {
        self.widths[axis.index()].len()
    }

    pub fn widths(&self, axis: Axis) -> &[f64] {
        &self.widths[axis.index()]
    }

    pub fn width(&self, axis: Axis, n: usize) -> f64 {
        self.widths[axis.index()][n]
    }

    pub fn total_width(&self, axis: Axis) -> f64 {
        self.widths[axis.index()].iter().sum()
    }

    /// Flat cell index of `(i, j, k)`.
    pub fn index(&self, i: usize, j: usize, k: usize) -> usize {
        let nx = self.widths[0].len();
        let ny = self.widths[1].len();
        i + j * nx + k * nx * ny
    }

    /// Inverse of [`Mesh::index`].
    pub fn ijk(&self, cell: usize) -> [usize; 3] {
        let nx = self.widths[0].len();
        let ny = self.widths[1].len();
        [cell % nx, (cell / nx) % ny, cell / (nx * ny)]
    }

    pub fn material(&self, cell: usize) -> usize {
        self.material_map[cell]
    }

    pub fn material_map(&self) -> &[usize] {
        &self.material_map
    }

    pub fn volume(&self, cell: usize) -> f64 {
        let [i, j, k] = self.ijk(cell);
        self.widths[0][i] * self.widths[1][j] * self.widths[2][k]
    }

    /// Number of cell faces on a domain side.
    pub fn face_size(&self, side: Side) -> usize {
        let n = |a: usize| self.widths[a].len();
        match side.axis() {
            Axis::X => n(1) * n(2),
            Axis::Y => n(0) * n(2),
            Axis::Z => n(0) * n(1),
        }
    }

    /// Position of the face of cell `(i, j, k)` within a side's face list.
    pub fn face_index(&self, axis: Axis, ijk: [usize; 3]) -> usize {
        let [i, j, k] = ijk;
        let nx = self.widths[0].len();
        let ny = self.widths[1].len();
        match axis {
            Axis::X => j + k * ny,
            Axis::Y => i + k * nx,
            Axis::Z => i + j * nx,
        }
    }
}
