//! Axis-aligned box split into hexahedral cells
//!
//! Cells are numbered `i + nx * (j + ny * k)`. When the grid is partitioned, each
//! rank owns a contiguous block of cell indices. Sides are numbered
//! `2 * axis` (lower face) and `2 * axis + 1` (upper face).
use crate::quadrature::{gauss_rule, NumericalQuadratureDefinition};
use crate::traits::{MeshTopology, SpatialSearch};
use crate::types::{Face, Point, RealScalar, Result};
use std::ops::Range;

/// A uniform grid of hexahedral cells
#[derive(Debug, Clone)]
pub struct UniformGrid<T: RealScalar> {
    origin: Point<T>,
    extent: Point<T>,
    cells: [usize; 3],
    rank: usize,
    size: usize,
    owned: Range<usize>,
    generation: u64,
}

fn block(cell_count: usize, rank: usize, size: usize) -> Range<usize> {
    rank * cell_count / size..(rank + 1) * cell_count / size
}

impl<T: RealScalar> UniformGrid<T> {
    /// Create a grid owned entirely by one process
    pub fn new(origin: Point<T>, extent: Point<T>, cells: [usize; 3]) -> Self {
        Self::partitioned(origin, extent, cells, 0, 1)
    }

    /// Create the part of a grid owned by `rank` out of `size` ranks
    pub fn partitioned(
        origin: Point<T>,
        extent: Point<T>,
        cells: [usize; 3],
        rank: usize,
        size: usize,
    ) -> Self {
        if cells.iter().any(|n| *n == 0) {
            panic!("A grid needs at least one cell in each direction");
        }
        if rank >= size {
            panic!("Rank {rank} is not part of a group of {size} ranks");
        }
        let cell_count = cells.iter().product();
        Self {
            origin,
            extent,
            cells,
            rank,
            size,
            owned: block(cell_count, rank, size),
            generation: 0,
        }
    }

    /// Create a grid on the unit cube with `n` cells in each direction
    pub fn unit_cube(n: usize, rank: usize, size: usize) -> Self {
        let zero = T::zero();
        let one = T::one();
        Self::partitioned([zero, zero, zero], [one, one, one], [n, n, n], rank, size)
    }

    /// The number of cells on all processes
    pub fn cell_count(&self) -> usize {
        self.cells.iter().product()
    }

    /// The number of cells in each direction
    pub fn cells(&self) -> [usize; 3] {
        self.cells
    }

    /// Mesh spacing in each direction
    pub fn spacing(&self) -> Point<T> {
        [0, 1, 2].map(|d| self.extent[d] / num::cast::<usize, T>(self.cells[d]).unwrap())
    }

    /// The index of the cell at a position in the lattice of cells
    pub fn cell_index(&self, position: [usize; 3]) -> usize {
        position[0] + self.cells[0] * (position[1] + self.cells[1] * position[2])
    }

    /// The position of a cell in the lattice of cells
    pub fn cell_position(&self, cell: usize) -> [usize; 3] {
        [
            cell % self.cells[0],
            (cell / self.cells[0]) % self.cells[1],
            cell / (self.cells[0] * self.cells[1]),
        ]
    }

    /// The lower and upper corners of a cell
    pub fn cell_bounds(&self, cell: usize) -> (Point<T>, Point<T>) {
        let h = self.spacing();
        let position = self.cell_position(cell);
        let lower = [0, 1, 2]
            .map(|d| self.origin[d] + h[d] * num::cast::<usize, T>(position[d]).unwrap());
        let upper = [0, 1, 2].map(|d| lower[d] + h[d]);
        (lower, upper)
    }

    /// The midpoint of a cell
    pub fn midpoint(&self, cell: usize) -> Point<T> {
        let (lower, upper) = self.cell_bounds(cell);
        let half = num::cast::<f64, T>(0.5).unwrap();
        [0, 1, 2].map(|d| half * (lower[d] + upper[d]))
    }

    /// Split every cell into eight
    ///
    /// This changes the mesh generation, so cached lookups become stale.
    pub fn refine(&mut self) {
        for n in self.cells.iter_mut() {
            *n *= 2;
        }
        self.owned = block(self.cell_count(), self.rank, self.size);
        self.generation += 1;
    }

    /// The cell whose half-open box `[lower, upper)` contains a point, ignoring ownership
    ///
    /// Points on the upper boundary of the grid belong to the last cell in that direction.
    pub fn cell_containing(&self, point: &Point<T>) -> Option<usize> {
        let h = self.spacing();
        let mut position = [0; 3];
        for d in 0..3 {
            let offset = point[d] - self.origin[d];
            if !(offset >= T::zero() && offset <= self.extent[d]) {
                return None;
            }
            let i = num::cast::<T, usize>((offset / h[d]).floor()).unwrap_or(self.cells[d]);
            position[d] = std::cmp::min(i, self.cells[d] - 1);
        }
        Some(self.cell_index(position))
    }

    fn face(&self, cell: usize, side: usize, rule: &NumericalQuadratureDefinition) -> Face<T> {
        let axis = side / 2;
        let upper_side = side % 2 == 1;
        let (lower, upper) = self.cell_bounds(cell);
        let h = self.spacing();
        let tangents = [(axis + 1) % 3, (axis + 2) % 3];
        let area = h[tangents[0]] * h[tangents[1]];

        let mut normal = [T::zero(); 3];
        normal[axis] = if upper_side { T::one() } else { -T::one() };

        let mut points = Vec::with_capacity(rule.npoints);
        let mut weights = Vec::with_capacity(rule.npoints);
        for (i, w) in rule.weights.iter().enumerate() {
            let mut p = [T::zero(); 3];
            p[axis] = if upper_side { upper[axis] } else { lower[axis] };
            for (x, t) in rule.point(i).iter().zip(&tangents) {
                let x = num::cast::<f64, T>(*x).unwrap();
                p[*t] = lower[*t] + x * h[*t];
            }
            points.push(p);
            weights.push(num::cast::<f64, T>(*w).unwrap() * area);
        }
        Face {
            element: cell,
            neighbour: self.neighbour(cell, side),
            points,
            normals: vec![normal; rule.npoints],
            weights,
        }
    }

    /// The interior faces this process is responsible for
    ///
    /// Every face between two cells is seen from the cell with the lower index,
    /// and belongs to the rank that owns that cell, so each face appears on
    /// exactly one process.
    pub fn interior_faces(&self, npoints_1d: usize) -> Result<Vec<Face<T>>> {
        let rule = gauss_rule(npoints_1d)?;
        Ok(self
            .owned
            .clone()
            .flat_map(|cell| [1, 3, 5].into_iter().map(move |side| (cell, side)))
            .filter(|(cell, side)| self.neighbour(*cell, *side).is_some())
            .map(|(cell, side)| self.face(cell, side, &rule))
            .collect())
    }

    /// The sides of owned cells that lie on the boundary of the grid
    pub fn boundary_sides(&self, npoints_1d: usize) -> Result<Vec<Face<T>>> {
        let rule = gauss_rule(npoints_1d)?;
        Ok(self
            .owned
            .clone()
            .flat_map(|cell| (0..6).map(move |side| (cell, side)))
            .filter(|(cell, side)| self.neighbour(*cell, *side).is_none())
            .map(|(cell, side)| self.face(cell, side, &rule))
            .collect())
    }
}

impl<T: RealScalar> SpatialSearch for UniformGrid<T> {
    type T = T;

    fn find_region_containing(&self, point: &Point<T>) -> Option<usize> {
        self.cell_containing(point)
            .filter(|cell| self.owned.contains(cell))
    }

    fn contains(&self, region: usize, point: &Point<T>) -> bool {
        self.cell_containing(point) == Some(region)
    }

    fn generation(&self) -> u64 {
        self.generation
    }
}

impl<T: RealScalar> MeshTopology for UniformGrid<T> {
    type T = T;
    type RegionIter<'a> = Range<usize> where Self: 'a;

    fn region_count(&self) -> usize {
        self.cell_count()
    }

    fn owned_regions(&self) -> Range<usize> {
        self.owned.clone()
    }

    fn side_count(&self, _region: usize) -> usize {
        6
    }

    fn neighbour(&self, region: usize, side: usize) -> Option<usize> {
        let axis = side / 2;
        let mut position = self.cell_position(region);
        if side % 2 == 0 {
            position[axis] = position[axis].checked_sub(1)?;
        } else if position[axis] + 1 < self.cells[axis] {
            position[axis] += 1;
        } else {
            return None;
        }
        Some(self.cell_index(position))
    }

    fn characteristic_size(&self, _region: usize) -> T {
        self.spacing()
            .iter()
            .map(|h| *h * *h)
            .fold(T::zero(), |a, b| a + b)
            .sqrt()
    }
}
