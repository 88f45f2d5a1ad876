//! Non-uniform 1D grid, ghost-padded centers, and stencil machinery.
//!
//! Builds everything that only depends on the bin boundaries and the
//! stencil width: bin centers, reflective/interpolating ghost centers,
//! the per-bin stencil left-bound index, the padded-center-to-bin map,
//! and the Fornberg finite-difference weights for the second derivative
//! (geometry- and log-x-corrected). None of this depends on `y`, so it
//! is computed once at construction and never touched again.

use crate::error::{ReactorError, ReactorResult};
use crate::geom::Geometry;

/// Precomputed grid and stencil state for a non-uniform 1D mesh.
#[derive(Debug, Clone)]
pub struct Grid {
    /// Bin boundaries, length `N+1`, strictly increasing.
    pub x: Vec<f64>,
    /// Bin count.
    pub n_bins: usize,
    /// Odd stencil width.
    pub nstencil: usize,
    /// `(nstencil - 1) / 2`.
    pub nsidep: usize,
    pub lrefl: bool,
    pub rrefl: bool,
    pub logx: bool,
    pub geom: Geometry,
    /// Ghost-padded bin centers, length `N + 2*nsidep`.
    pub xc: Vec<f64>,
    /// Per-bin stencil left-bound index into `xc`.
    pub lb: Vec<usize>,
    /// Maps a padded-center slot back to a real bin index (mirrored at
    /// the boundaries).
    pub pxci_to_bi: Vec<usize>,
    /// Per-bin second-derivative weights, row-major `[bin][stencil_slot]`.
    pub weights: Vec<Vec<f64>>,
}

impl Grid {
    pub fn new(
        x: Vec<f64>,
        nstencil: usize,
        lrefl: bool,
        rrefl: bool,
        logx: bool,
        geom: Geometry,
    ) -> ReactorResult<Self> {
        if x.len() < 2 {
            return Err(ReactorError::invalid_grid("need at least 2 boundaries"));
        }
        for w in x.windows(2) {
            if !(w[1] > w[0]) {
                return Err(ReactorError::invalid_grid(
                    "bin boundaries must be strictly increasing",
                ));
            }
        }
        if nstencil % 2 == 0 || nstencil == 0 {
            return Err(ReactorError::invalid_stencil(
                "nstencil must be a positive odd integer",
            ));
        }
        let n_bins = x.len() - 1;
        if n_bins < nstencil {
            return Err(ReactorError::invalid_stencil(format!(
                "N ({n_bins}) must be >= nstencil ({nstencil})"
            )));
        }
        let nsidep = (nstencil - 1) / 2;

        let centers: Vec<f64> = (0..n_bins).map(|i| 0.5 * (x[i] + x[i + 1])).collect();
        // Local spacing used to linearly extrapolate interpolating ghosts;
        // falls back to 0 for a single-bin grid (then lrefl/rrefl must be
        // true, since N >= nstencil >= 1 and nsidep > 0 requires N > 1).
        let left_slope = if n_bins > 1 {
            centers[1] - centers[0]
        } else {
            0.0
        };
        let right_slope = if n_bins > 1 {
            centers[n_bins - 1] - centers[n_bins - 2]
        } else {
            0.0
        };

        let mut xc = vec![0.0; n_bins + 2 * nsidep];
        for k in 0..nsidep {
            xc[nsidep - 1 - k] = if lrefl {
                2.0 * x[0] - centers[k]
            } else {
                centers[0] - (k as f64 + 1.0) * left_slope
            };
        }
        xc[nsidep..nsidep + n_bins].copy_from_slice(&centers);
        for k in 0..nsidep {
            let j = nsidep + n_bins + k;
            xc[j] = if rrefl {
                2.0 * x[n_bins] - centers[n_bins - 1 - k]
            } else {
                centers[n_bins - 1] + (k as f64 + 1.0) * right_slope
            };
        }
        for w in xc.windows(2) {
            if !(w[1] > w[0]) {
                return Err(ReactorError::invalid_grid(
                    "ghost-padded centers are not strictly increasing; check boundary policy",
                ));
            }
        }

        let lower = if lrefl { 0 } else { nsidep };
        let upper = if rrefl {
            n_bins + 2 * nsidep - nstencil
        } else {
            n_bins + nsidep - nstencil
        };
        let lb: Vec<usize> = (0..n_bins)
            .map(|i| (i as isize).clamp(lower as isize, upper as isize) as usize)
            .collect();

        let mut pxci_to_bi = vec![0usize; n_bins + 2 * nsidep];
        for j in 0..nsidep {
            pxci_to_bi[j] = nsidep - 1 - j;
        }
        for bi in 0..n_bins {
            pxci_to_bi[nsidep + bi] = bi;
        }
        for k in 0..nsidep {
            pxci_to_bi[nsidep + n_bins + k] = n_bins - 1 - k;
        }

        let mut weights = Vec::with_capacity(n_bins);
        for i in 0..n_bins {
            let nodes = &xc[lb[i]..lb[i] + nstencil];
            let x_eval = xc[nsidep + i];
            weights.push(stencil_weights(x_eval, nodes, geom, logx));
        }

        Ok(Grid {
            x,
            n_bins,
            nstencil,
            nsidep,
            lrefl,
            rrefl,
            logx,
            geom,
            xc,
            lb,
            pxci_to_bi,
            weights,
        })
    }
}

/// Fornberg finite-difference weights for derivative orders `0..=max_order`
/// at evaluation point `z` given arbitrary (not necessarily uniform) node
/// positions `x`. Returns `coeffs[order][node_index]`.
///
/// This is the classic O(n^2) recurrence from Fornberg (1988),
/// "Generation of Finite Difference Formulas on Arbitrarily Spaced
/// Grids", used here for derivative orders 1 and 2 only.
pub(crate) fn fornberg_weights(z: f64, x: &[f64], max_order: usize) -> Vec<Vec<f64>> {
    let n = x.len();
    let mut c = vec![vec![0.0; n]; max_order + 1];
    let mut c1 = 1.0;
    let mut c4 = x[0] - z;
    c[0][0] = 1.0;
    for i in 1..n {
        let mn = max_order.min(i);
        let mut c2 = 1.0;
        let c5 = c4;
        c4 = x[i] - z;
        for j in 0..i {
            let c3 = x[i] - x[j];
            c2 *= c3;
            if j == i - 1 {
                for k in (1..=mn).rev() {
                    c[k][i] = c1 * (k as f64 * c[k - 1][i - 1] - c5 * c[k][i - 1]) / c2;
                }
                c[0][i] = -c1 * c5 * c[0][i - 1] / c2;
            }
            for k in (1..=mn).rev() {
                c[k][j] = (c4 * c[k][j] - k as f64 * c[k - 1][j]) / c3;
            }
            c[0][j] = c4 * c[0][j] / c3;
        }
        c1 = c2;
    }
    c
}

/// Geometry- and (optionally) log-x-corrected second-derivative weights
/// for one bin, per spec.md §4.1.
fn stencil_weights(x_eval: f64, nodes: &[f64], geom: Geometry, logx: bool) -> Vec<f64> {
    if logx {
        let u_nodes: Vec<f64> = nodes.iter().map(|&xi| xi.ln()).collect();
        let u_eval = x_eval.ln();
        let c = fornberg_weights(u_eval, &u_nodes, 2);
        // L[f] = (1/x^2) [ d2f/du2 + (g(x)*x - 1) df/du ], where g(x) is
        // the linear-space geometry correction factor.
        let gx = match geom {
            Geometry::Flat => -1.0,
            Geometry::Cylindrical => 0.0,
            Geometry::Spherical => 1.0,
        };
        let inv_x2 = 1.0 / (x_eval * x_eval);
        (0..nodes.len())
            .map(|k| (c[2][k] + gx * c[1][k]) * inv_x2)
            .collect()
    } else {
        let c = fornberg_weights(x_eval, nodes, 2);
        let g = geom.first_derivative_factor(x_eval);
        (0..nodes.len()).map(|k| c[2][k] + g * c[1][k]).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-12, "{a} != {b}");
    }

    #[test]
    fn three_bin_lrefl_weights() {
        let x = vec![5.0, 9.0, 13.0, 15.0];
        let g = Grid::new(x, 3, true, false, false, Geometry::Flat).unwrap();
        let expect = [
            [1.0 / 16.0, -1.0 / 8.0, 1.0 / 16.0],
            [1.0 / 14.0, -1.0 / 6.0, 2.0 / 21.0],
            [1.0 / 14.0, -1.0 / 6.0, 2.0 / 21.0],
        ];
        for (row, erow) in g.weights.iter().zip(expect.iter()) {
            for (w, e) in row.iter().zip(erow.iter()) {
                approx(*w, *e);
            }
        }
    }

    #[test]
    fn three_bin_rrefl_weights() {
        let x = vec![5.0, 9.0, 13.0, 15.0];
        let g = Grid::new(x, 3, false, true, false, Geometry::Flat).unwrap();
        let expect = [
            [1.0 / 14.0, -1.0 / 6.0, 2.0 / 21.0],
            [1.0 / 14.0, -1.0 / 6.0, 2.0 / 21.0],
            [2.0 / 15.0, -1.0 / 3.0, 1.0 / 5.0],
        ];
        for (row, erow) in g.weights.iter().zip(expect.iter()) {
            for (w, e) in row.iter().zip(erow.iter()) {
                approx(*w, *e);
            }
        }
    }

    #[test]
    fn uniform_grid_interior_weights() {
        let x: Vec<f64> = (0..=7).map(|i| 2.0 + 2.0 * i as f64).collect();
        let g = Grid::new(x, 5, false, false, false, Geometry::Flat).unwrap();
        let expect = [-1.0 / 48.0, 1.0 / 3.0, -5.0 / 8.0, 1.0 / 3.0, -1.0 / 48.0];
        for i in 2..=4 {
            for (w, e) in g.weights[i].iter().zip(expect.iter()) {
                approx(*w, *e);
            }
        }
    }

    #[test]
    fn weights_sum_to_zero() {
        let x: Vec<f64> = (0..=9).map(|i| 1.0 + 0.7 * i as f64).collect();
        let g = Grid::new(x, 5, true, true, false, Geometry::Flat).unwrap();
        for row in &g.weights {
            let s: f64 = row.iter().sum();
            assert!(s.abs() < 1e-10, "row sum {s}");
        }
    }

    #[test]
    fn rejects_non_monotone_grid() {
        let x = vec![0.0, 1.0, 0.5, 2.0];
        assert!(Grid::new(x, 3, false, false, false, Geometry::Flat).is_err());
    }

    #[test]
    fn rejects_even_stencil() {
        let x = vec![0.0, 1.0, 2.0, 3.0];
        assert!(Grid::new(x, 2, false, false, false, Geometry::Flat).is_err());
    }

    #[test]
    fn rejects_too_few_bins() {
        let x = vec![0.0, 1.0];
        assert!(Grid::new(x, 3, false, false, false, Geometry::Flat).is_err());
    }
}
