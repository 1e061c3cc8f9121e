//! Uniform-grid bucketing for neighbor search along the simulated axis.
//!
//! Uses sorted-index + cell-offset arrays rather than a `HashMap` so a query
//! only touches the three cells around the query position.

/// Upper bound on the number of cells; smaller support radii share wider cells.
pub const MAX_CELLS: usize = 1 << 20;

/// Uniform 1D grid over `[x_min, x_max]` for kernel-support lookups.
///
/// The cell size equals the kernel support radius (2h) so that for any query
/// position the cell it falls in plus its two neighbors contain every particle
/// within distance 2h. Positions outside the covered interval are clamped into
/// the first or last cell, so particles that temporarily left the domain are
/// still found. Very small support radii are binned into at most
/// [`MAX_CELLS`] cells, each at least as wide as the radius.
#[derive(Debug, Clone, PartialEq)]
pub struct NeighborGrid {
    cell_size: f64,
    /// Width actually used for binning, never below `cell_size`.
    cell_width: f64,
    grid_min: f64,
    num_cells: usize,
    /// Cell index for each particle (parallel to particle arrays).
    cell_indices: Vec<u32>,
    /// Particle indices sorted by cell index.
    sorted_indices: Vec<u32>,
    /// Start offset in `sorted_indices` for each cell.
    cell_offsets: Vec<u32>,
    /// Number of particles in each cell.
    cell_counts: Vec<u32>,
}

impl NeighborGrid {
    /// Create an empty grid covering `[x_min, x_max]` with cells of `cell_size`.
    ///
    /// `cell_size` should be the kernel support radius. Callers guarantee a
    /// positive cell size and a non-empty interval.
    pub fn new(cell_size: f64, x_min: f64, x_max: f64) -> Self {
        debug_assert!(cell_size > 0.0, "cell_size must be positive");
        let width = x_max - x_min;
        let cell_width = cell_size.max(width / MAX_CELLS as f64);
        let num_cells = ((width / cell_width).ceil().max(1.0) as usize).min(MAX_CELLS);
        Self {
            cell_size,
            cell_width,
            grid_min: x_min,
            num_cells,
            cell_indices: Vec::new(),
            sorted_indices: Vec::new(),
            cell_offsets: vec![0; num_cells],
            cell_counts: vec![0; num_cells],
        }
    }

    /// Cell size the grid was built with.
    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Number of cells along the axis.
    pub fn num_cells(&self) -> usize {
        self.num_cells
    }

    /// Map a position to its cell, clamped to the grid.
    #[inline]
    fn pos_to_cell(&self, x: f64) -> usize {
        let c = ((x - self.grid_min) / self.cell_width).floor();
        if c.is_nan() || c <= 0.0 {
            0
        } else {
            (c as usize).min(self.num_cells - 1)
        }
    }

    /// Rebuild the grid from current particle positions.
    pub fn update(&mut self, x: &[f64]) {
        let n = x.len();

        // --- 1. Compute cell index for each particle ---
        self.cell_indices.clear();
        self.cell_indices.resize(n, 0);
        for i in 0..n {
            self.cell_indices[i] = self.pos_to_cell(x[i]) as u32;
        }

        // --- 2. Count particles per cell ---
        self.cell_counts.clear();
        self.cell_counts.resize(self.num_cells, 0);
        for &ci in &self.cell_indices {
            self.cell_counts[ci as usize] += 1;
        }

        // --- 3. Prefix-sum to get cell offsets ---
        self.cell_offsets.clear();
        let mut running = 0u32;
        for &count in &self.cell_counts {
            self.cell_offsets.push(running);
            running += count;
        }

        // --- 4. Scatter particle indices into sorted order ---
        self.sorted_indices.clear();
        self.sorted_indices.resize(n, 0);
        let mut write_heads = self.cell_offsets.clone();
        for (i, &ci) in self.cell_indices.iter().enumerate() {
            let head = &mut write_heads[ci as usize];
            self.sorted_indices[*head as usize] = i as u32;
            *head += 1;
        }
    }

    /// Visit every particle within `radius` of `x_query`.
    ///
    /// `positions` must be the slice the grid was last updated with. The
    /// closure receives the particle index; a particle sitting exactly at the
    /// query position is included.
    pub fn for_each_within<F>(&self, x_query: f64, positions: &[f64], radius: f64, mut f: F)
    where
        F: FnMut(usize),
    {
        if self.sorted_indices.is_empty() {
            return;
        }
        let c = self.pos_to_cell(x_query);
        let first = c.saturating_sub(1);
        let last = (c + 1).min(self.num_cells - 1);

        for cell in first..=last {
            let start = self.cell_offsets[cell] as usize;
            let count = self.cell_counts[cell] as usize;
            for &j in &self.sorted_indices[start..start + count] {
                let j = j as usize;
                if (positions[j] - x_query).abs() <= radius {
                    f(j);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(grid: &NeighborGrid, x: f64, positions: &[f64], radius: f64) -> Vec<usize> {
        let mut found = Vec::new();
        grid.for_each_within(x, positions, radius, |j| found.push(j));
        found.sort_unstable();
        found
    }

    #[test]
    fn tiny_support_radius_caps_cell_count() {
        let grid = NeighborGrid::new(1.0e-9, 0.0, 10.0);
        assert_eq!(grid.num_cells(), MAX_CELLS);
        assert_eq!(grid.cell_size(), 1.0e-9);

        // Wider cells still find exactly the particles within the radius.
        let positions = [5.0, 5.0 + 5.0e-10, 5.0 + 2.0e-9, 5.0 + 1.0e-5];
        let mut grid = grid;
        grid.update(&positions);
        assert_eq!(collect(&grid, 5.0, &positions, 1.0e-9), vec![0, 1]);
    }

    #[test]
    fn cell_count_covers_domain() {
        let grid = NeighborGrid::new(0.2, 0.0, 1.0);
        assert_eq!(grid.num_cells(), 5);
        let grid = NeighborGrid::new(3.0, 0.0, 1.0);
        assert_eq!(grid.num_cells(), 1);
    }

    #[test]
    fn empty_grid_finds_nothing() {
        let grid = NeighborGrid::new(0.2, 0.0, 1.0);
        assert!(collect(&grid, 0.5, &[], 0.2).is_empty());
    }

    #[test]
    fn query_includes_coincident_particle() {
        let mut grid = NeighborGrid::new(0.2, 0.0, 1.0);
        let x = [0.5];
        grid.update(&x);
        assert_eq!(collect(&grid, 0.5, &x, 0.2), vec![0]);
    }

    #[test]
    fn particles_across_cell_boundary() {
        let mut grid = NeighborGrid::new(0.2, 0.0, 1.0);
        let x = [0.19, 0.21, 0.7];
        grid.update(&x);
        assert_eq!(collect(&grid, 0.19, &x, 0.2), vec![0, 1]);
        assert_eq!(collect(&grid, 0.7, &x, 0.2), vec![2]);
    }

    #[test]
    fn out_of_domain_particles_are_clamped() {
        let mut grid = NeighborGrid::new(0.2, 0.0, 1.0);
        let x = [-0.05, 1.04, 0.5];
        grid.update(&x);
        assert_eq!(collect(&grid, 0.05, &x, 0.2), vec![0]);
        assert_eq!(collect(&grid, 0.95, &x, 0.2), vec![1]);
        assert_eq!(collect(&grid, -0.1, &x, 0.2), vec![0]);
    }

    #[test]
    fn matches_brute_force() {
        let cell = 0.15;
        let mut grid = NeighborGrid::new(cell, 0.0, 3.0);
        let x: Vec<f64> = (0..200).map(|i| (i as f64 * 0.618_033_988_7).fract() * 3.0).collect();
        grid.update(&x);
        for q in 0..60 {
            let xq = q as f64 * 0.05;
            let expected: Vec<usize> = (0..x.len())
                .filter(|&j| (x[j] - xq).abs() <= cell)
                .collect();
            assert_eq!(collect(&grid, xq, &x, cell), expected, "query at {xq}");
        }
    }
}
