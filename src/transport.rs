//! Diffusion and electromigration drift assembly (spec.md §4.3).
//!
//! Both contributions are tridiagonal-in-bin by construction: diffusion
//! only ever touches the stencil's reach (which the imperfect-Jacobian
//! contract collapses to nearest-neighbour bins at assembly time), and
//! drift is a first-order upwind difference between adjacent centers.

use crate::error::ReactorResult;
use crate::grid::Grid;
use crate::jacobian::Contributions;

/// Adds the diffusion contribution of species `si` (diffusion
/// coefficient `d`) to `f` and to the Jacobian accumulator.
///
/// `conc_species` is the `N`-length array of this species' concentration
/// across all bins (i.e. `conc[bi*n+si]` for `bi in 0..N`, gathered by
/// the caller).
pub fn add_diffusion(
    grid: &Grid,
    si: usize,
    n: usize,
    d: f64,
    conc_species: &[f64],
    f: &mut [f64],
    sink: &mut Contributions,
) {
    if d == 0.0 {
        return;
    }
    for i in 0..grid.n_bins {
        let lb = grid.lb[i];
        let row = i * n + si;
        for (k, &w) in grid.weights[i].iter().enumerate() {
            let slot = lb + k;
            let bj = grid.pxci_to_bi[slot];
            f[row] += d * w * conc_species[bj];
            // The imperfect-Jacobian contract (spec.md §4.3/§8) restricts
            // every Jacobian entry to nearest-neighbour bins regardless
            // of how wide the stencil actually reaches; `f` still uses
            // the full stencil above.
            if (bj as isize - i as isize).abs() <= 1 {
                let col = bj * n + si;
                sink.add(row, col, d * w);
            }
        }
    }
}

/// Adds the electromigration drift contribution of a charged, mobile
/// species to `f` and the Jacobian, given the cached electric field at
/// bin centers. Uses a first-order upwind difference on the sign of
/// `mobility*z_chg*E[i]` between neighbouring centers (spec.md §4.3).
#[allow(clippy::too_many_arguments)]
pub fn add_drift(
    grid: &Grid,
    si: usize,
    n: usize,
    mobility: f64,
    z_chg: f64,
    field: &[f64],
    conc_species: &[f64],
    f: &mut [f64],
    sink: &mut Contributions,
) -> ReactorResult<()> {
    if z_chg == 0.0 || mobility == 0.0 {
        return Ok(());
    }
    let drift_coeff = mobility * z_chg;
    for i in 0..grid.n_bins {
        let row = i * n + si;
        let v_here = drift_coeff * field[i];
        // Flux out of bin i towards bin i+1 (upwind on the local sign
        // of the drift velocity at each face).
        if i + 1 < grid.n_bins {
            let dx = grid.xc[grid.nsidep + i + 1] - grid.xc[grid.nsidep + i];
            let v_face = 0.5 * drift_coeff * (field[i] + field[i + 1]);
            let upstream_is_left = v_face >= 0.0;
            let flux_coeff = v_face / dx;
            if upstream_is_left {
                f[row] -= flux_coeff * conc_species[i];
                f[(i + 1) * n + si] += flux_coeff * conc_species[i];
                sink.add(row, row, -flux_coeff);
                sink.add((i + 1) * n + si, row, flux_coeff);
            } else {
                f[row] -= flux_coeff * conc_species[i + 1];
                f[(i + 1) * n + si] += flux_coeff * conc_species[i + 1];
                sink.add(row, (i + 1) * n + si, -flux_coeff);
                sink.add((i + 1) * n + si, (i + 1) * n + si, flux_coeff);
            }
        }
        let _ = v_here;
    }
    Ok(())
}
