//! Constructor-input record and fallible builder (spec.md §6), modeled
//! the way `diffsol`'s `robertson_ode.rs` assembles a validated problem
//! struct from loosely-structured inputs.

use serde::{Deserialize, Serialize};

use crate::efield::ElectricField;
use crate::error::{ReactorError, ReactorResult};
use crate::geom::Geometry;
use crate::grid::Grid;
use crate::reactions::ReactionSet;
use crate::system::ReactionDiffusionSystem;
use crate::variables::{ConcVariant, TimeVariant};

/// Plain, `serde`-round-trippable description of a reactor, matching
/// spec.md §6's constructor-input record. Every field has a sensible
/// default so callers only set what departs from the common case.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct SystemConfig {
    /// Bin boundaries. A single value is treated as "infer a uniform
    /// grid of `n_bins` bins spanning `[1, 2]`" (spec.md §9's resolution
    /// for the scalar-`x` shorthand) — a literal unit interval the
    /// caller is expected to rescale downstream, matching the
    /// `xscale`-conditioning convention already used for the electric
    /// field.
    pub x: Vec<f64>,
    /// `0` means "infer from `x.len() - 1`"; only meaningful together
    /// with a scalar `x`.
    pub n_bins: usize,
    pub n_species: usize,

    pub nstencil: usize,
    pub lrefl: bool,
    pub rrefl: bool,
    pub logx: bool,
    pub logy: bool,
    pub logt: bool,
    pub geom: Geometry,

    pub stoich_reac: Vec<Vec<usize>>,
    pub stoich_prod: Vec<Vec<usize>>,
    pub stoich_actv: Vec<Vec<usize>>,
    pub k: Vec<f64>,
    pub k_err: Vec<Option<f64>>,
    pub bin_k_factor: Vec<Vec<f64>>,
    pub bin_k_factor_span: Vec<usize>,

    /// Per-species diffusion coefficient. Empty means "zero for every
    /// species" (inert transport), the natural default for `n_bins ==
    /// 1` where diffusion has no meaning anyway.
    pub diffusion: Vec<f64>,
    pub diffusion_err: Option<Vec<f64>>,
    pub mobility: Vec<f64>,
    pub z_chg: Vec<f64>,

    /// `None` disables the electric-field solver entirely (no charged,
    /// mobile species). `Some` supplies the fixed surface charges.
    pub surf_chg: Option<(f64, f64)>,
    pub eps: f64,
    pub xscale: f64,

    pub substance_names: Vec<Option<String>>,
    pub substance_tex_names: Vec<Option<String>>,
}

impl Default for SystemConfig {
    fn default() -> Self {
        SystemConfig {
            x: vec![0.0, 1.0],
            n_bins: 0,
            n_species: 0,
            nstencil: 3,
            lrefl: false,
            rrefl: false,
            logx: false,
            logy: false,
            logt: false,
            geom: Geometry::Flat,
            stoich_reac: vec![],
            stoich_prod: vec![],
            stoich_actv: vec![],
            k: vec![],
            k_err: vec![],
            bin_k_factor: vec![],
            bin_k_factor_span: vec![],
            diffusion: vec![],
            diffusion_err: None,
            mobility: vec![],
            z_chg: vec![],
            surf_chg: None,
            eps: 1.0,
            xscale: 1.0,
            substance_names: vec![],
            substance_tex_names: vec![],
        }
    }
}

impl SystemConfig {
    /// Parses a JSON-encoded constructor input record, rejecting any
    /// option this crate does not recognize (spec.md §6: "Unknown
    /// options → `UnknownOption` failure"). This is the entry point an
    /// external front end (out of core scope per spec.md §1) would use
    /// to hand in a raw, untrusted configuration record rather than a
    /// pre-validated Rust struct.
    pub fn from_json(json: &str) -> ReactorResult<Self> {
        serde_json::from_str(json).map_err(|e| {
            let msg = e.to_string();
            ReactorError::UnknownOption {
                name: unknown_field_name(&msg).unwrap_or(msg),
            }
        })
    }
}

/// Extracts the field name out of serde's `deny_unknown_fields` message
/// (`` unknown field `foo`, expected one of ... ``), falling back to the
/// full message for any other deserialization failure.
fn unknown_field_name(msg: &str) -> Option<String> {
    let rest = msg.strip_prefix("unknown field `")?;
    let end = rest.find('`')?;
    Some(rest[..end].to_string())
}

/// Stateless fallible constructor: turns a [`SystemConfig`] into a
/// validated [`ReactionDiffusionSystem`], rejecting any shape mismatch
/// up front instead of deferring it to the first `f`/Jacobian call.
pub struct SystemBuilder;

impl SystemBuilder {
    pub fn build(cfg: SystemConfig) -> ReactorResult<ReactionDiffusionSystem> {
        let n = cfg.n_species;
        if n == 0 {
            return Err(ReactorError::invalid_grid("n_species must be positive"));
        }

        let x = if cfg.x.len() == 1 {
            let n_bins = if cfg.n_bins == 0 { 1 } else { cfg.n_bins };
            (0..=n_bins)
                .map(|i| 1.0 + i as f64 / n_bins as f64)
                .collect()
        } else {
            cfg.x.clone()
        };

        let grid = Grid::new(x, cfg.nstencil, cfg.lrefl, cfg.rrefl, cfg.logx, cfg.geom)?;
        let n_bins = grid.n_bins;

        let reactions = ReactionSet::new(
            n,
            cfg.stoich_reac,
            cfg.stoich_prod,
            cfg.stoich_actv,
            cfg.k,
            cfg.k_err,
            n_bins,
            cfg.bin_k_factor,
            cfg.bin_k_factor_span,
        )?;

        let diffusion = expand_per_species(cfg.diffusion, n)?;
        let mobility = expand_per_species(cfg.mobility, n)?;
        let z_chg = expand_per_species(cfg.z_chg, n)?;

        let efield = match cfg.surf_chg {
            Some(surf_chg) => Some(ElectricField::new(n_bins, surf_chg, cfg.eps, cfg.xscale)?),
            None => None,
        };

        if !cfg.substance_names.is_empty() && cfg.substance_names.len() != n {
            return Err(ReactorError::shape_mismatch(n, cfg.substance_names.len()));
        }
        if !cfg.substance_tex_names.is_empty() && cfg.substance_tex_names.len() != n {
            return Err(ReactorError::shape_mismatch(n, cfg.substance_tex_names.len()));
        }
        if let Some(d_err) = &cfg.diffusion_err {
            if d_err.len() != n {
                return Err(ReactorError::shape_mismatch(n, d_err.len()));
            }
        }

        let substance_names = if cfg.substance_names.is_empty() {
            vec![None; n]
        } else {
            cfg.substance_names
        };
        let substance_tex_names = if cfg.substance_tex_names.is_empty() {
            vec![None; n]
        } else {
            cfg.substance_tex_names
        };

        Ok(ReactionDiffusionSystem {
            grid,
            n,
            reactions,
            diffusion,
            mobility,
            z_chg,
            efield,
            concvar: ConcVariant::from_flag(cfg.logy),
            timevar: TimeVariant::from_flag(cfg.logt),
            substance_names,
            substance_tex_names,
            d_err: cfg.diffusion_err,
        })
    }
}

fn expand_per_species(v: Vec<f64>, n: usize) -> ReactorResult<Vec<f64>> {
    if v.is_empty() {
        Ok(vec![0.0; n])
    } else if v.len() == n {
        Ok(v)
    } else {
        Err(ReactorError::shape_mismatch(n, v.len()))
    }
}
