//! Log-spaced bracketing scan.

use super::{BrentSolver, SolverConfig};

/// Finds every sign change of a function on a positive range.
///
/// The range `[min, max]` is sampled at `samples` log-spaced points, which
/// suits prices spanning several orders of magnitude. Each adjacent pair
/// whose values change sign is refined with [`BrentSolver`]. Points where the
/// function is not finite are skipped, so a bracket never straddles a pole.
///
/// Roots closer together than the solver tolerance are reported once. A root
/// between two samples of equal sign (a tangency, or two roots inside one
/// cell) is not detected.
#[derive(Debug, Clone)]
pub struct GridScanner {
    min: f64,
    max: f64,
    samples: usize,
    solver: BrentSolver<f64>,
}

impl GridScanner {
    /// Create a scanner over `[min, max]` with `samples` grid points.
    pub fn new(min: f64, max: f64, samples: usize, config: SolverConfig<f64>) -> Self {
        Self {
            min,
            max,
            samples,
            solver: BrentSolver::new(config),
        }
    }

    /// Returns true if the range is positive and non-empty and there are at
    /// least two samples.
    pub fn is_valid(&self) -> bool {
        self.min > 0.0 && self.max > self.min && self.max.is_finite() && self.samples >= 2
    }

    /// The sampled grid, ascending. Empty for an invalid scanner.
    pub fn points(&self) -> Vec<f64> {
        if !self.is_valid() {
            return Vec::new();
        }
        let (lo, hi) = (self.min.ln(), self.max.ln());
        let last = (self.samples - 1) as f64;
        (0..self.samples)
            .map(|i| (lo + (hi - lo) * i as f64 / last).exp())
            .collect()
    }

    /// Every root found on the grid, ascending.
    pub fn find_roots<F>(&self, f: F) -> Vec<f64>
    where
        F: Fn(f64) -> f64,
    {
        let samples: Vec<(f64, f64)> = self
            .points()
            .into_iter()
            .map(|x| (x, f(x)))
            .filter(|(_, y)| y.is_finite())
            .collect();

        let tolerance = self.solver.config().tolerance;
        let mut roots: Vec<f64> = Vec::new();
        let mut push = |root: f64| {
            let duplicate = roots
                .last()
                .is_some_and(|last| (root - last).abs() <= tolerance.max(1e-12 * root.abs()));
            if !duplicate {
                roots.push(root);
            }
        };

        for window in samples.windows(2) {
            let ((x0, y0), (x1, y1)) = (window[0], window[1]);
            if y0 == 0.0 {
                push(x0);
            } else if y0 * y1 < 0.0 {
                // A sign change across a pole converges onto the pole
                let bound = y0.abs().max(y1.abs());
                match self.solver.find_root(&f, x0, x1) {
                    Ok(root) if (x0..=x1).contains(&root) && f(root).abs() <= bound => {
                        push(root)
                    }
                    _ => {}
                }
            }
        }
        if let Some(&(x, y)) = samples.last() {
            if y == 0.0 {
                push(x);
            }
        }
        roots
    }
}
