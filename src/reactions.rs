//! Reaction evaluator: per-bin, per-reaction rate law and its
//! contribution to `f` and to the block-diagonal-by-bin Jacobian.

use crate::error::{ReactorError, ReactorResult};
use crate::jacobian::Contributions;

/// A validated chemical reaction network over `n` species.
///
/// `stoich_actv[r] == []` is taken to mean "active species = full
/// reactant multiset", per spec.md §9's recommended resolution of the
/// open question.
#[derive(Debug, Clone)]
pub struct ReactionSet {
    n: usize,
    nr: usize,
    /// `net[r][s] = prod.count(s) - reac.count(s)`.
    net: Vec<Vec<f64>>,
    /// Active species and their multiplicity, per reaction.
    active_counts: Vec<Vec<(usize, u32)>>,
    k: Vec<f64>,
    k_err: Vec<Option<f64>>,
    bin_k_factor: Vec<Vec<f64>>,
    bin_k_factor_span: Vec<usize>,
}

fn counts(multiset: &[usize], n: usize) -> ReactorResult<Vec<u32>> {
    let mut c = vec![0u32; n];
    for &s in multiset {
        if s >= n {
            return Err(ReactorError::invalid_grid(format!(
                "species index {s} out of range [0,{n})"
            )));
        }
        c[s] += 1;
    }
    Ok(c)
}

impl ReactionSet {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        n: usize,
        stoich_reac: Vec<Vec<usize>>,
        stoich_prod: Vec<Vec<usize>>,
        stoich_actv: Vec<Vec<usize>>,
        k: Vec<f64>,
        k_err: Vec<Option<f64>>,
        n_bins: usize,
        bin_k_factor: Vec<Vec<f64>>,
        bin_k_factor_span: Vec<usize>,
    ) -> ReactorResult<Self> {
        let nr = stoich_reac.len();
        if stoich_prod.len() != nr || k.len() != nr {
            return Err(ReactorError::invalid_grid(
                "stoich_reac, stoich_prod and k must have equal length",
            ));
        }
        if !stoich_actv.is_empty() && stoich_actv.len() != nr {
            return Err(ReactorError::invalid_grid(
                "stoich_actv must be empty or have one entry per reaction",
            ));
        }
        let k_err = if k_err.is_empty() {
            vec![None; nr]
        } else {
            k_err
        };
        if k_err.len() != nr {
            return Err(ReactorError::invalid_grid(
                "k_err must be empty or have one entry per reaction",
            ));
        }

        let mut net = Vec::with_capacity(nr);
        let mut active_counts = Vec::with_capacity(nr);
        for r in 0..nr {
            let reac_counts = counts(&stoich_reac[r], n)?;
            let prod_counts = counts(&stoich_prod[r], n)?;
            let actv_multiset: &[usize] = if stoich_actv.is_empty() || stoich_actv[r].is_empty() {
                &stoich_reac[r]
            } else {
                &stoich_actv[r]
            };
            let actv_counts = counts(actv_multiset, n)?;
            for s in 0..n {
                if actv_counts[s] > reac_counts[s] {
                    return Err(ReactorError::invalid_grid(format!(
                        "reaction {r}: active count of species {s} exceeds reactant count"
                    )));
                }
            }
            let row: Vec<f64> = (0..n)
                .map(|s| prod_counts[s] as f64 - reac_counts[s] as f64)
                .collect();
            net.push(row);
            active_counts.push(
                (0..n)
                    .filter_map(|s| {
                        if actv_counts[s] > 0 {
                            Some((s, actv_counts[s]))
                        } else {
                            None
                        }
                    })
                    .collect(),
            );
        }

        if bin_k_factor_span.iter().sum::<usize>() > nr {
            return Err(ReactorError::invalid_grid(
                "bin_k_factor_span sums to more than the number of reactions",
            ));
        }
        if !bin_k_factor.is_empty() {
            if bin_k_factor.len() != n_bins {
                return Err(ReactorError::invalid_grid(
                    "bin_k_factor must have one row per bin",
                ));
            }
            for row in &bin_k_factor {
                if row.len() != bin_k_factor_span.len() {
                    return Err(ReactorError::invalid_grid(
                        "bin_k_factor row width must match bin_k_factor_span length",
                    ));
                }
            }
        }

        Ok(ReactionSet {
            n,
            nr,
            net,
            active_counts,
            k,
            k_err,
            bin_k_factor,
            bin_k_factor_span,
        })
    }

    pub fn n_reactions(&self) -> usize {
        self.nr
    }

    pub fn k_err(&self, r: usize) -> Option<f64> {
        self.k_err[r]
    }

    fn modulation(&self, r: usize, bi: usize) -> f64 {
        let mut boundary = 0usize;
        for (m, &span) in self.bin_k_factor_span.iter().enumerate() {
            if r < boundary + span {
                return self.bin_k_factor[bi][m];
            }
            boundary += span;
        }
        1.0
    }

    fn rate(&self, r: usize, bi: usize, bin_conc: &[f64]) -> f64 {
        let mut result = self.k[r] * self.modulation(r, bi);
        for &(s, cnt) in &self.active_counts[r] {
            result *= bin_conc[s].powi(cnt as i32);
        }
        result
    }

    /// `d(rate(r,bi))/dC[sp]`, computed without ever dividing by a
    /// concentration (so a zero active-species concentration never
    /// produces a `0/0`).
    fn rate_derivative(&self, r: usize, bi: usize, sp: usize, bin_conc: &[f64]) -> f64 {
        let mut result = self.k[r] * self.modulation(r, bi);
        let mut found = false;
        for &(s2, cnt2) in &self.active_counts[r] {
            if s2 == sp {
                found = true;
                result *= cnt2 as f64;
                if cnt2 > 1 {
                    result *= bin_conc[s2].powi(cnt2 as i32 - 1);
                }
            } else {
                result *= bin_conc[s2].powi(cnt2 as i32);
            }
        }
        if found {
            result
        } else {
            0.0
        }
    }

    /// Adds this reaction network's contribution to `f` and to the
    /// Jacobian accumulator, for every bin. `conc` is the full `N*n`
    /// concentration vector (already converted out of log-space).
    pub fn contribute(
        &self,
        conc: &[f64],
        n_bins: usize,
        f: &mut [f64],
        sink: &mut Contributions,
    ) -> ReactorResult<()> {
        for bi in 0..n_bins {
            let base = bi * self.n;
            let bin_conc = &conc[base..base + self.n];
            for r in 0..self.nr {
                let rate_val = self.rate(r, bi, bin_conc);
                if !rate_val.is_finite() {
                    return Err(ReactorError::numeric_overflow(format!(
                        "reaction {r} rate is not finite at bin {bi}"
                    )));
                }
                for s in 0..self.n {
                    let net = self.net[r][s];
                    if net != 0.0 {
                        f[base + s] += net * rate_val;
                    }
                }
                for &(sp, _) in &self.active_counts[r] {
                    let deriv = self.rate_derivative(r, bi, sp, bin_conc);
                    if deriv == 0.0 {
                        continue;
                    }
                    for s in 0..self.n {
                        let net = self.net[r][s];
                        if net != 0.0 {
                            sink.add(base + s, base + sp, net * deriv);
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Per-reaction contribution to `f[bi, si]`, used for diagnostic
    /// decomposition (spec.md §4.6's `per_rxn_contrib_to_fi`).
    pub fn per_rxn_contrib(&self, conc: &[f64], bi: usize, si: usize, out: &mut [f64]) {
        let base = bi * self.n;
        let bin_conc = &conc[base..base + self.n];
        for r in 0..self.nr {
            let net = self.net[r][si];
            out[r] = if net != 0.0 {
                net * self.rate(r, bi, bin_conc)
            } else {
                0.0
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-12, "{a} != {b}");
    }

    #[test]
    fn single_reaction_matches_scenario_a() {
        let rs = ReactionSet::new(
            2,
            vec![vec![0]],
            vec![vec![1]],
            vec![],
            vec![5.0],
            vec![],
            1,
            vec![],
            vec![],
        )
        .unwrap();
        let conc = vec![2.0, 3.0];
        let mut f = vec![0.0; 2];
        let mut sink = Contributions::new();
        rs.contribute(&conc, 1, &mut f, &mut sink).unwrap();
        approx(f[0], -10.0);
        approx(f[1], 10.0);
        approx(sink.get(0, 0), -5.0);
        approx(sink.get(1, 0), 5.0);
    }

    #[test]
    fn ternary_active_reaction() {
        // A + C --(active A,C)--> B + C, k=5, C=[2,3,7]
        let rs = ReactionSet::new(
            3,
            vec![vec![0, 2]],
            vec![vec![1, 2]],
            vec![vec![0, 2]],
            vec![5.0],
            vec![],
            1,
            vec![],
            vec![],
        )
        .unwrap();
        let conc = vec![2.0, 3.0, 7.0];
        let mut f = vec![0.0; 3];
        let mut sink = Contributions::new();
        rs.contribute(&conc, 1, &mut f, &mut sink).unwrap();
        let rate = 5.0 * 2.0 * 7.0;
        approx(f[0], -rate);
        approx(f[1], rate);
        approx(f[2], 0.0);
        // d rate / dC_A = 5*7 = 35, d rate / dC_C = 5*2 = 10
        approx(sink.get(0, 0), -35.0);
        approx(sink.get(1, 0), 35.0);
        approx(sink.get(0, 2), -10.0);
        approx(sink.get(1, 2), 10.0);
    }

    #[test]
    fn empty_active_defaults_to_reactants() {
        let rs = ReactionSet::new(
            2,
            vec![vec![0, 0]],
            vec![vec![1]],
            vec![],
            vec![3.0],
            vec![],
            1,
            vec![],
            vec![],
        )
        .unwrap();
        let conc = vec![2.0, 0.0];
        let mut f = vec![0.0; 2];
        let mut sink = Contributions::new();
        rs.contribute(&conc, 1, &mut f, &mut sink).unwrap();
        // rate = 3 * C_A^2 = 12
        approx(f[0], -24.0);
        approx(f[1], 12.0);
    }

    #[test]
    fn rejects_active_exceeding_reactant_count() {
        let err = ReactionSet::new(
            1,
            vec![vec![0]],
            vec![vec![0]],
            vec![vec![0, 0]],
            vec![1.0],
            vec![],
            1,
            vec![],
            vec![],
        );
        assert!(err.is_err());
    }

    #[test]
    fn bin_k_factor_modulates_only_covered_reactions() {
        // Two identical A->B reactions; bin_k_factor_span covers only
        // the first, so its rate is doubled while the second is not.
        let rs = ReactionSet::new(
            2,
            vec![vec![0], vec![0]],
            vec![vec![1], vec![1]],
            vec![],
            vec![1.0, 1.0],
            vec![],
            1,
            vec![vec![2.0]],
            vec![1],
        )
        .unwrap();
        let conc = vec![1.0, 0.0];
        let mut f = vec![0.0; 2];
        let mut sink = Contributions::new();
        rs.contribute(&conc, 1, &mut f, &mut sink).unwrap();
        approx(f[0], -3.0);
        approx(f[1], 3.0);
        approx(sink.get(0, 0), -3.0);
        approx(sink.get(1, 0), 3.0);
    }
}
