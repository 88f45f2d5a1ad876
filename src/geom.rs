use serde::{Deserialize, Serialize};

use crate::error::{ReactorError, ReactorResult};

/// The three 1D geometries the engine discretizes. Determines the
/// shell-volume and area-element prefactors used by the diffusion
/// operator's geometry correction and by the electric field solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Geometry {
    Flat,
    Cylindrical,
    Spherical,
}

impl<'de> Deserialize<'de> for Geometry {
    /// Accepts the derived tag names (`"Flat"`, ...) case-insensitively,
    /// so a config round-tripped from an external front end (spec.md
    /// §6's `geom` option) does not have to match the enum's Rust
    /// spelling exactly.
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Geometry::from_str_opt(&s).map_err(serde::de::Error::custom)
    }
}

impl Geometry {
    pub(crate) fn from_str_opt(s: &str) -> ReactorResult<Self> {
        match s {
            "Flat" | "flat" => Ok(Geometry::Flat),
            "Cylindrical" | "cylindrical" => Ok(Geometry::Cylindrical),
            "Spherical" | "spherical" => Ok(Geometry::Spherical),
            other => Err(ReactorError::invalid_geometry(format!(
                "unknown geometry: {other}"
            ))),
        }
    }

    /// Shell volume of the bin spanning `[x0, x1)`.
    pub fn shell_volume(&self, x0: f64, x1: f64) -> f64 {
        match self {
            Geometry::Flat => x1 - x0,
            Geometry::Cylindrical => std::f64::consts::PI * (x1 * x1 - x0 * x0),
            Geometry::Spherical => {
                (4.0 / 3.0) * std::f64::consts::PI * (x1.powi(3) - x0.powi(3))
            }
        }
    }

    /// Area element at radius/coordinate `x`.
    pub fn area_element(&self, x: f64) -> f64 {
        match self {
            Geometry::Flat => 1.0,
            Geometry::Cylindrical => 2.0 * std::f64::consts::PI * x,
            Geometry::Spherical => 4.0 * std::f64::consts::PI * x * x,
        }
    }

    /// First-derivative geometry-correction factor applied to the
    /// second-derivative stencil weights (spec.md §4.1): `0` for `Flat`,
    /// `1/xc` for `Cylindrical`, `2/xc` for `Spherical`.
    pub(crate) fn first_derivative_factor(&self, xc: f64) -> f64 {
        match self {
            Geometry::Flat => 0.0,
            Geometry::Cylindrical => 1.0 / xc,
            Geometry::Spherical => 2.0 / xc,
        }
    }
}
