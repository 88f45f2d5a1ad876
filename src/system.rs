//! The reaction-diffusion-drift system descriptor (spec.md §3/§4.6):
//! owns the grid, reaction network, transport parameters and cached
//! electric field, and exposes the `f(t,y)` and five Jacobian-layout
//! callbacks a stiff ODE integrator drives.

use crate::efield::{integrated_conc, ElectricField};
use crate::error::{ReactorError, ReactorResult};
use crate::geom::Geometry;
use crate::grid::Grid;
use crate::jacobian::{banded, compressed, dense, Contributions};
use crate::reactions::ReactionSet;
use crate::transport::{add_diffusion, add_drift};
use crate::variables::{ConcVariant, TimeVariant};

/// One of the five physical layouts spec.md §4.4 requires the Jacobian
/// to be assembled into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JacobianLayout {
    DenseRowMajor,
    DenseColMajor,
    BandedPacked,
    BandedPadded,
    Compressed,
}

/// Immutable-after-construction descriptor of a single reactor. Built
/// only via [`crate::builder::SystemBuilder`].
#[derive(Debug, Clone)]
pub struct ReactionDiffusionSystem {
    pub(crate) grid: Grid,
    pub(crate) n: usize,
    pub(crate) reactions: ReactionSet,
    pub(crate) diffusion: Vec<f64>,
    pub(crate) mobility: Vec<f64>,
    pub(crate) z_chg: Vec<f64>,
    pub(crate) efield: Option<ElectricField>,
    pub(crate) concvar: ConcVariant,
    pub(crate) timevar: TimeVariant,
    pub(crate) substance_names: Vec<Option<String>>,
    pub(crate) substance_tex_names: Vec<Option<String>>,
    pub(crate) d_err: Option<Vec<f64>>,
}

impl ReactionDiffusionSystem {
    pub fn n_species(&self) -> usize {
        self.n
    }

    pub fn n_bins(&self) -> usize {
        self.grid.n_bins
    }

    pub fn dim(&self) -> usize {
        self.n * self.grid.n_bins
    }

    pub fn geometry(&self) -> Geometry {
        self.grid.geom
    }

    /// Ghost-padded bin centers (spec.md §6's observable `xc`).
    pub fn xc(&self) -> &[f64] {
        &self.grid.xc
    }

    /// Per-bin second-derivative stencil weights (spec.md §6's
    /// observable `W`), row-major `[bin][stencil_slot]`.
    pub fn weights(&self) -> &[Vec<f64>] {
        &self.grid.weights
    }

    /// Cached electric field at bin centers, or `None` if this system
    /// has no charged/mobile species (spec.md §6's observable `E`).
    /// Reflects the field as of the most recent `f`/Jacobian call.
    pub fn cached_field(&self) -> Option<&[f64]> {
        self.efield.as_ref().map(|ef| ef.e.as_slice())
    }

    fn decode_conc(&self, y: &[f64]) -> ReactorResult<Vec<f64>> {
        if y.len() != self.dim() {
            return Err(ReactorError::shape_mismatch(self.dim(), y.len()));
        }
        y.iter().map(|&yi| self.concvar.conc(yi)).collect()
    }

    /// Recomputes the electric field (if this system has one) against
    /// the current concentration state. Must be called before `f`/
    /// Jacobian evaluation whenever drift-relevant species moved.
    fn refresh_field(&mut self, conc: &[f64]) -> ReactorResult<()> {
        if let Some(ef) = self.efield.as_mut() {
            ef.recompute(&self.grid, self.n, &self.z_chg, conc)?;
        }
        Ok(())
    }

    fn assemble(&mut self, t: f64, y: &[f64]) -> ReactorResult<(Vec<f64>, Contributions)> {
        let conc = self.decode_conc(y)?;
        self.refresh_field(&conc)?;

        let dim = self.dim();
        let mut f = vec![0.0; dim];
        let mut sink = Contributions::new();

        self.reactions.contribute(&conc, self.grid.n_bins, &mut f, &mut sink)?;

        let n = self.n;
        let n_bins = self.grid.n_bins;
        let field_buf;
        let field: &[f64] = if let Some(ef) = &self.efield {
            &ef.e
        } else {
            field_buf = vec![0.0; n_bins];
            &field_buf
        };

        for si in 0..n {
            let species_conc: Vec<f64> = (0..n_bins).map(|bi| conc[bi * n + si]).collect();
            let d = self.diffusion.get(si).copied().unwrap_or(0.0);
            add_diffusion(&self.grid, si, n, d, &species_conc, &mut f, &mut sink);
            let mu = self.mobility.get(si).copied().unwrap_or(0.0);
            let z = self.z_chg.get(si).copied().unwrap_or(0.0);
            add_drift(&self.grid, si, n, mu, z, field, &species_conc, &mut f, &mut sink)?;
        }

        sink.apply_variable_transform(&mut f, &conc, self.concvar, self.timevar, t)?;
        Ok((f, sink))
    }

    /// Evaluates `f(t,y)` into `out` (spec.md §4.6).
    pub fn f(&mut self, t: f64, y: &[f64], out: &mut [f64]) -> ReactorResult<()> {
        if out.len() != self.dim() {
            return Err(ReactorError::shape_mismatch(self.dim(), out.len()));
        }
        let (f, _) = self.assemble(t, y)?;
        out.copy_from_slice(&f);
        Ok(())
    }

    /// Assembles the Jacobian in the requested layout and writes it
    /// into `out` (spec.md §4.4). `out` must already be sized for the
    /// layout (see the per-layout `*_len` helpers on this type).
    pub fn jacobian(
        &mut self,
        t: f64,
        y: &[f64],
        layout: JacobianLayout,
        out: &mut [f64],
    ) -> ReactorResult<()> {
        let expected = self.jacobian_len(layout);
        if out.len() != expected {
            return Err(ReactorError::shape_mismatch(expected, out.len()));
        }
        let (_, sink) = self.assemble(t, y)?;
        let dim = self.dim();
        let n = self.n;
        match layout {
            JacobianLayout::DenseRowMajor => dense::write_row_major(&sink, dim, out),
            JacobianLayout::DenseColMajor => dense::write_col_major(&sink, dim, out),
            JacobianLayout::BandedPacked => banded::write_packed(&sink, n, dim, out),
            JacobianLayout::BandedPadded => banded::write_padded(&sink, n, dim, out),
            JacobianLayout::Compressed => {
                compressed::write(&sink, n, self.grid.nsidep, self.grid.n_bins, out)
            }
        }
        Ok(())
    }

    /// Required output buffer length for a given layout.
    pub fn jacobian_len(&self, layout: JacobianLayout) -> usize {
        let dim = self.dim();
        let n = self.n;
        match layout {
            JacobianLayout::DenseRowMajor | JacobianLayout::DenseColMajor => dim * dim,
            JacobianLayout::BandedPacked => (2 * n + 1) * dim,
            JacobianLayout::BandedPadded => (3 * n + 1) * dim,
            JacobianLayout::Compressed => {
                compressed::n_phys_rows(n, self.grid.nsidep)
                    * compressed::n_phys_cols(dim, self.grid.nsidep)
            }
        }
    }

    /// Convenience builder returning an owned dense column-major
    /// `nalgebra::DMatrix<f64>` (spec.md §4.4's dense layout).
    pub fn jacobian_dense(&mut self, t: f64, y: &[f64]) -> ReactorResult<nalgebra::DMatrix<f64>> {
        let (_, sink) = self.assemble(t, y)?;
        Ok(dense::to_nalgebra(&sink, self.dim()))
    }

    /// Per-reaction decomposition of `f[bi*n+si]` (spec.md §4.6's
    /// `per_rxn_contrib_to_fi`), in linear concentration space
    /// regardless of `logy`/`logt` (diagnostic output is not subject to
    /// the change-of-variables transform).
    pub fn per_rxn_contrib_to_fi(&self, y: &[f64], bi: usize, si: usize) -> ReactorResult<Vec<f64>> {
        let conc = self.decode_conc(y)?;
        let mut out = vec![0.0; self.reactions.n_reactions()];
        self.reactions.per_rxn_contrib(&conc, bi, si, &mut out);
        Ok(out)
    }

    /// Shell-volume-weighted spatial integral of one species' bin-wise
    /// concentration profile (spec.md §4.6's `integrated_conc`).
    pub fn integrated_conc(&self, y: &[f64], si: usize) -> ReactorResult<f64> {
        let conc = self.decode_conc(y)?;
        let n = self.n;
        let values: Vec<f64> = (0..self.grid.n_bins).map(|bi| conc[bi * n + si]).collect();
        Ok(integrated_conc(&self.grid, self.grid.geom, &values))
    }

    pub fn substance_names(&self) -> &[Option<String>] {
        &self.substance_names
    }

    pub fn substance_tex_names(&self) -> &[Option<String>] {
        &self.substance_tex_names
    }

    pub fn d_err(&self) -> Option<&[f64]> {
        self.d_err.as_deref()
    }
}
