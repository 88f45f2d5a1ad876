//! The five Jacobian layouts of spec.md §4.4, all built from one shared
//! sparse contribution accumulator so the reaction, transport, and
//! electric-field modules never need to know about storage layout.

pub mod banded;
pub mod compressed;
pub mod dense;

use std::collections::HashMap;

use crate::error::ReactorResult;
use crate::variables::{ConcVariant, TimeVariant};

/// Sparse `(row, col) -> value` accumulator. Reaction and transport
/// contributions are summed here (duplicate `(row, col)` pairs add),
/// then the log-variable chain rule is applied once, uniformly, before
/// any layout-specific writer consumes the result.
#[derive(Debug, Default, Clone)]
pub struct Contributions {
    entries: HashMap<(usize, usize), f64>,
}

impl Contributions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, row: usize, col: usize, value: f64) {
        if value == 0.0 {
            return;
        }
        *self.entries.entry((row, col)).or_insert(0.0) += value;
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.entries.get(&(row, col)).copied().unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        self.entries.iter().map(|(&(r, c), &v)| (r, c, v))
    }

    pub fn check_finite(&self) -> ReactorResult<()> {
        for (&(r, c), &v) in self.entries.iter() {
            if !v.is_finite() {
                return Err(crate::error::ReactorError::numeric_overflow(format!(
                    "Jacobian entry ({r},{c}) is not finite"
                )));
            }
        }
        Ok(())
    }

    /// Applies spec.md §4.2/§4.3's logy chain rule and §4.2's logt
    /// scaling in one place, given the already-assembled linear-space
    /// Jacobian and RHS. `conc` is the full concentration vector in the
    /// same units the contributions were computed against.
    pub(crate) fn apply_variable_transform(
        &mut self,
        f: &mut [f64],
        conc: &[f64],
        concvar: ConcVariant,
        timevar: TimeVariant,
        t_arg: f64,
    ) -> ReactorResult<()> {
        if concvar.is_log() {
            // Diagonal needs f_linear[i] *before* f is overwritten, so
            // snapshot it first.
            let f_linear = f.to_vec();
            for ((row, col), value) in self.entries.iter_mut() {
                if *row == *col {
                    *value -= f_linear[*row] / conc[*row];
                } else {
                    *value *= conc[*col] / conc[*row];
                }
            }
            for (i, fi) in f.iter_mut().enumerate() {
                *fi /= conc[i];
            }
        }
        if timevar.is_log() {
            let t_phys = timevar.physical_time(t_arg);
            for value in self.entries.values_mut() {
                *value *= t_phys;
            }
            for fi in f.iter_mut() {
                *fi *= t_phys;
            }
        }
        self.check_finite()?;
        for fi in f.iter() {
            if !fi.is_finite() {
                return Err(crate::error::ReactorError::numeric_overflow(
                    "f contains a non-finite entry",
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulates_duplicates() {
        let mut c = Contributions::new();
        c.add(0, 0, 1.0);
        c.add(0, 0, 2.5);
        assert_eq!(c.get(0, 0), 3.5);
        assert_eq!(c.get(1, 1), 0.0);
    }

    #[test]
    fn logy_diagonal_matches_hand_derivation() {
        // Single bin, single species, f = -C (pure decay), J_linear = -1.
        let mut c = Contributions::new();
        c.add(0, 0, -1.0);
        let mut f = vec![-2.0]; // C=2
        let conc = vec![2.0];
        c.apply_variable_transform(
            &mut f,
            &conc,
            ConcVariant::Log,
            TimeVariant::Linear,
            0.0,
        )
        .unwrap();
        // f' = f/C = -1
        assert!((f[0] - (-1.0)).abs() < 1e-12);
        // J' = J - f_linear/C = -1 - (-2/2) = -1 + 1 = 0
        assert!((c.get(0, 0) - 0.0).abs() < 1e-12);
    }

    #[test]
    fn logt_scales_by_physical_time() {
        let mut c = Contributions::new();
        c.add(0, 0, -1.0);
        let mut f = vec![-2.0];
        let conc = vec![2.0];
        let tau = 1.0_f64.ln() + 1.0; // physical t = e^1
        c.apply_variable_transform(
            &mut f,
            &conc,
            ConcVariant::Linear,
            TimeVariant::Log,
            tau,
        )
        .unwrap();
        let t_phys = tau.exp();
        assert!((f[0] - (-2.0 * t_phys)).abs() < 1e-9);
        assert!((c.get(0, 0) - (-1.0 * t_phys)).abs() < 1e-9);
    }
}
