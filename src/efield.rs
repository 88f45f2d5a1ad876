//! Electric field solver (spec.md §4.5): integrates signed charge
//! density along the grid against the geometry-appropriate shell volume
//! to produce `E[bi]`, given fixed surface charges at both ends.

use log::{debug, warn};

use crate::error::{ReactorError, ReactorResult};
use crate::geom::Geometry;
use crate::grid::Grid;

/// Electric-field configuration and cached state, owned by the system
/// descriptor. `xscale` is a pure numerical-conditioning device (see
/// SPEC_FULL.md §4): the Poisson-like quadrature is evaluated against
/// `x / xscale`, then the resulting field is rescaled back, which keeps
/// the accumulated charge sums well-conditioned when the physical grid
/// spans many decades.
#[derive(Debug, Clone)]
pub struct ElectricField {
    pub surf_chg: (f64, f64),
    pub eps: f64,
    pub xscale: f64,
    /// Cached field at bin centers, recomputed by [`ElectricField::recompute`].
    pub e: Vec<f64>,
}

impl ElectricField {
    pub fn new(n_bins: usize, surf_chg: (f64, f64), eps: f64, xscale: f64) -> ReactorResult<Self> {
        if eps <= 0.0 {
            return Err(ReactorError::invalid_grid("eps must be positive"));
        }
        if xscale <= 0.0 {
            return Err(ReactorError::invalid_grid("xscale must be positive"));
        }
        Ok(ElectricField {
            surf_chg,
            eps,
            xscale,
            e: vec![0.0; n_bins],
        })
    }

    /// Recomputes `E[bi]` from the current concentration field. `z_chg`
    /// is per-species charge number, `conc` is the full `N*n` state.
    pub fn recompute(
        &mut self,
        grid: &Grid,
        n: usize,
        z_chg: &[f64],
        conc: &[f64],
    ) -> ReactorResult<()> {
        let geom = grid.geom;
        let n_bins = grid.n_bins;
        let xs = self.xscale;

        let mut q = vec![0.0; n_bins];
        for bi in 0..n_bins {
            let x0 = grid.x[bi] / xs;
            let x1 = grid.x[bi + 1] / xs;
            let vol = geom.shell_volume(x0, x1);
            let base = bi * n;
            let mut rho = 0.0;
            for (s, &z) in z_chg.iter().enumerate() {
                if z != 0.0 {
                    rho += z * conc[base + s];
                }
            }
            q[bi] = rho * vol;
        }

        let (ql, qr) = self.surf_chg;
        let total_q: f64 = q.iter().sum();
        let imbalance = (total_q + ql + qr).abs();
        // spec.md §4.5: fatal as soon as |imbalance| > 1e-9 * sum(|q|).
        let scale: f64 = q.iter().map(|v| v.abs()).sum();
        let tolerance = 1e-9 * scale;
        if imbalance > tolerance {
            warn!(
                "charge imbalance {imbalance} exceeds tolerance {tolerance}; surface charges are inconsistent"
            );
            return Err(ReactorError::ChargeImbalance {
                imbalance,
                tolerance,
            });
        }

        let mut enclosed = ql;
        for bi in 0..n_bins {
            let xc = grid.xc[grid.nsidep + bi] / xs;
            let area = geom.area_element(xc);
            self.e[bi] = enclosed / (self.eps * area) / xs;
            enclosed += q[bi];
        }
        debug!("recomputed electric field over {n_bins} bins");
        Ok(())
    }
}

/// Shell-volume-weighted quadrature of a scalar bin-indexed field
/// (spec.md §4.6's `integrated_conc`).
pub fn integrated_conc(grid: &Grid, geom: Geometry, values: &[f64]) -> f64 {
    let mut total = 0.0;
    for bi in 0..grid.n_bins {
        let vol = geom.shell_volume(grid.x[bi], grid.x[bi + 1]);
        total += values[bi] * vol;
    }
    total
}
