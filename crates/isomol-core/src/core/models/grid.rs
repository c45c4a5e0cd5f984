use nalgebra::{Point3, Vector3};

/// Element-wise combination of two density grids sharing one geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CombineOp {
    /// `a + b`
    Add,
    /// `a - b`
    SubAB,
    /// `b - a`
    SubBA,
}

/// A regular, axis-aligned 3-D scalar field.
///
/// Samples live on lattice points; the flat value array is addressed by
/// `idx = x + nx * (y + ny * z)`. A grid is immutable once populated and is
/// replaced wholesale on reload, never patched in place.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarGrid {
    origin: Point3<f64>,
    spacing: Vector3<f64>,
    counts: [usize; 3],
    values: Vec<f64>,
}

impl ScalarGrid {
    /// Creates a grid from its geometry and a fully populated value array.
    ///
    /// # Arguments
    ///
    /// * `origin` - World position of lattice point (0, 0, 0).
    /// * `spacing` - Lattice step along each axis; every component must be
    ///   positive.
    /// * `counts` - Number of lattice points along each axis.
    /// * `values` - `counts[0] * counts[1] * counts[2]` samples in
    ///   x-fastest order.
    ///
    /// # Panics
    ///
    /// Panics if a spacing component is not positive or the value array
    /// length does not match the point counts. Both are contract
    /// violations, not data conditions.
    pub fn new(
        origin: Point3<f64>,
        spacing: Vector3<f64>,
        counts: [usize; 3],
        values: Vec<f64>,
    ) -> Self {
        assert!(
            spacing.x > 0.0 && spacing.y > 0.0 && spacing.z > 0.0,
            "grid spacing must be positive in every axis"
        );
        assert_eq!(
            values.len(),
            counts[0] * counts[1] * counts[2],
            "grid value array length must equal nx * ny * nz"
        );
        Self {
            origin,
            spacing,
            counts,
            values,
        }
    }

    pub fn origin(&self) -> Point3<f64> {
        self.origin
    }

    pub fn spacing(&self) -> Vector3<f64> {
        self.spacing
    }

    pub fn counts(&self) -> [usize; 3] {
        self.counts
    }

    /// Total number of lattice points.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Flat index of lattice point `(x, y, z)`.
    #[inline]
    pub fn index(&self, x: usize, y: usize, z: usize) -> usize {
        x + self.counts[0] * (y + self.counts[1] * z)
    }

    /// Sample value at lattice point `(x, y, z)`.
    #[inline]
    pub fn value(&self, x: usize, y: usize, z: usize) -> f64 {
        self.values[self.index(x, y, z)]
    }

    /// World position of lattice point `(x, y, z)`.
    #[inline]
    pub fn position(&self, x: usize, y: usize, z: usize) -> Point3<f64> {
        Point3::new(
            self.origin.x + x as f64 * self.spacing.x,
            self.origin.y + y as f64 * self.spacing.y,
            self.origin.z + z as f64 * self.spacing.z,
        )
    }

    /// Minimum and maximum sample values, or `None` for an empty grid.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        let mut iter = self.values.iter().copied();
        let first = iter.next()?;
        let mut min = first;
        let mut max = first;
        for v in iter {
            if v < min {
                min = v;
            }
            if v > max {
                max = v;
            }
        }
        Some((min, max))
    }

    /// Finite-difference gradient of the field at lattice point `(x, y, z)`.
    ///
    /// Uses central differences in the interior and one-sided differences
    /// on the boundary. Axes with a single lattice point contribute zero.
    pub fn gradient(&self, x: usize, y: usize, z: usize) -> Vector3<f64> {
        let diff = |lo: f64, hi: f64, span: f64| (hi - lo) / span;

        let gx = if self.counts[0] < 2 {
            0.0
        } else if x == 0 {
            diff(self.value(0, y, z), self.value(1, y, z), self.spacing.x)
        } else if x == self.counts[0] - 1 {
            diff(
                self.value(x - 1, y, z),
                self.value(x, y, z),
                self.spacing.x,
            )
        } else {
            diff(
                self.value(x - 1, y, z),
                self.value(x + 1, y, z),
                2.0 * self.spacing.x,
            )
        };

        let gy = if self.counts[1] < 2 {
            0.0
        } else if y == 0 {
            diff(self.value(x, 0, z), self.value(x, 1, z), self.spacing.y)
        } else if y == self.counts[1] - 1 {
            diff(
                self.value(x, y - 1, z),
                self.value(x, y, z),
                self.spacing.y,
            )
        } else {
            diff(
                self.value(x, y - 1, z),
                self.value(x, y + 1, z),
                2.0 * self.spacing.y,
            )
        };

        let gz = if self.counts[2] < 2 {
            0.0
        } else if z == 0 {
            diff(self.value(x, y, 0), self.value(x, y, 1), self.spacing.z)
        } else if z == self.counts[2] - 1 {
            diff(
                self.value(x, y, z - 1),
                self.value(x, y, z),
                self.spacing.z,
            )
        } else {
            diff(
                self.value(x, y, z - 1),
                self.value(x, y, z + 1),
                2.0 * self.spacing.z,
            )
        };

        Vector3::new(gx, gy, gz)
    }

    /// Whether `other` has bit-for-bit identical origin, spacing, and
    /// point counts. Combined density channels are only offered while this
    /// holds.
    pub fn same_geometry(&self, other: &ScalarGrid) -> bool {
        self.counts == other.counts
            && self.origin == other.origin
            && self.spacing == other.spacing
    }

    /// Element-wise combination with another grid of identical geometry.
    ///
    /// # Return
    ///
    /// Returns the combined grid, or `None` when the geometries differ in
    /// any component.
    pub fn combine(&self, op: CombineOp, other: &ScalarGrid) -> Option<ScalarGrid> {
        if !self.same_geometry(other) {
            return None;
        }
        let values = self
            .values
            .iter()
            .zip(other.values.iter())
            .map(|(&a, &b)| match op {
                CombineOp::Add => a + b,
                CombineOp::SubAB => a - b,
                CombineOp::SubBA => b - a,
            })
            .collect();
        Some(ScalarGrid {
            origin: self.origin,
            spacing: self.spacing,
            counts: self.counts,
            values,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_2x2x2(values: Vec<f64>) -> ScalarGrid {
        ScalarGrid::new(
            Point3::new(0.0, 0.0, 0.0),
            Vector3::new(1.0, 1.0, 1.0),
            [2, 2, 2],
            values,
        )
    }

    #[test]
    fn index_formula_is_x_fastest() {
        let grid = ScalarGrid::new(
            Point3::origin(),
            Vector3::new(1.0, 1.0, 1.0),
            [3, 4, 5],
            vec![0.0; 60],
        );
        assert_eq!(grid.index(0, 0, 0), 0);
        assert_eq!(grid.index(1, 0, 0), 1);
        assert_eq!(grid.index(0, 1, 0), 3);
        assert_eq!(grid.index(0, 0, 1), 12);
        assert_eq!(grid.index(2, 3, 4), 2 + 3 * (3 + 4 * 4));
    }

    #[test]
    fn position_applies_origin_and_spacing() {
        let grid = ScalarGrid::new(
            Point3::new(-1.0, 2.0, 0.5),
            Vector3::new(0.5, 1.0, 2.0),
            [2, 2, 2],
            vec![0.0; 8],
        );
        assert_eq!(grid.position(0, 0, 0), Point3::new(-1.0, 2.0, 0.5));
        assert_eq!(grid.position(1, 1, 1), Point3::new(-0.5, 3.0, 2.5));
    }

    #[test]
    fn value_range_spans_data() {
        let grid = grid_2x2x2(vec![0.0, -3.0, 1.0, 7.5, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(grid.value_range(), Some((-3.0, 7.5)));
    }

    #[test]
    fn gradient_of_linear_field_is_constant() {
        // f(x, y, z) = 2x + 3y - z on a 3x3x3 unit lattice.
        let mut values = Vec::with_capacity(27);
        for z in 0..3 {
            for y in 0..3 {
                for x in 0..3 {
                    values.push(2.0 * x as f64 + 3.0 * y as f64 - z as f64);
                }
            }
        }
        let grid = ScalarGrid::new(
            Point3::origin(),
            Vector3::new(1.0, 1.0, 1.0),
            [3, 3, 3],
            values,
        );
        for &(x, y, z) in &[(0, 0, 0), (1, 1, 1), (2, 2, 2), (0, 2, 1)] {
            let g = grid.gradient(x, y, z);
            assert!((g.x - 2.0).abs() < 1e-12);
            assert!((g.y - 3.0).abs() < 1e-12);
            assert!((g.z + 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn combine_requires_identical_geometry() {
        let a = grid_2x2x2(vec![1.0; 8]);
        let b = grid_2x2x2(vec![2.0; 8]);
        let sum = a.combine(CombineOp::Add, &b).unwrap();
        assert!(sum.values().iter().all(|&v| v == 3.0));
        let diff = a.combine(CombineOp::SubBA, &b).unwrap();
        assert!(diff.values().iter().all(|&v| v == 1.0));

        let shifted = ScalarGrid::new(
            Point3::new(0.1, 0.0, 0.0),
            Vector3::new(1.0, 1.0, 1.0),
            [2, 2, 2],
            vec![2.0; 8],
        );
        assert!(a.combine(CombineOp::Add, &shifted).is_none());
        assert!(!a.same_geometry(&shifted));
    }

    #[test]
    #[should_panic(expected = "grid spacing must be positive")]
    fn non_positive_spacing_is_a_contract_violation() {
        let _ = ScalarGrid::new(
            Point3::origin(),
            Vector3::new(1.0, 0.0, 1.0),
            [2, 2, 2],
            vec![0.0; 8],
        );
    }
}
