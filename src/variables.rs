//! Tagged variants for the log/linear change of variables (spec.md §9's
//! REDESIGN FLAG: replace the boolean matrix of `logy x logt x logx` with
//! a sum-of-variants over concentration- and time-space, each
//! implementing the same small operator trait, so the chain rule lives
//! in one place instead of being re-derived at every call site).
//!
//! `logx` does not appear here: its chain rule is folded directly into
//! the stencil weights at grid construction (`grid::stencil_weights`),
//! so by the time anything in this module runs, `logx` is already
//! transparent to the rest of the engine.

use crate::error::{ReactorError, ReactorResult};

/// Threshold above which `exp(y)` in log-concentration mode is treated
/// as a `NumericOverflow` rather than propagated as `inf`/`NaN`.
const LOGY_OVERFLOW_THRESHOLD: f64 = 700.0;

/// How concentration is encoded in the state vector `y`.
pub trait ConcSpace {
    /// Recovers the physical concentration `C` from the raw state `y`.
    fn conc(y: f64) -> ReactorResult<f64>;

    /// `true` if this is the logarithmic encoding (`y = ln C`).
    fn is_log() -> bool;
}

pub struct LinearConc;
pub struct LogConc;

impl ConcSpace for LinearConc {
    fn conc(y: f64) -> ReactorResult<f64> {
        Ok(y)
    }
    fn is_log() -> bool {
        false
    }
}

impl ConcSpace for LogConc {
    fn conc(y: f64) -> ReactorResult<f64> {
        if y.abs() > LOGY_OVERFLOW_THRESHOLD {
            return Err(ReactorError::numeric_overflow(format!(
                "logy state {y} exceeds safe exp() range"
            )));
        }
        Ok(y.exp())
    }
    fn is_log() -> bool {
        true
    }
}

/// Runtime selector wrapping the two [`ConcSpace`] variants, since the
/// descriptor's `logy` flag is only known at construction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConcVariant {
    Linear,
    Log,
}

impl ConcVariant {
    pub fn from_flag(logy: bool) -> Self {
        if logy {
            ConcVariant::Log
        } else {
            ConcVariant::Linear
        }
    }

    pub fn conc(&self, y: f64) -> ReactorResult<f64> {
        match self {
            ConcVariant::Linear => LinearConc::conc(y),
            ConcVariant::Log => LogConc::conc(y),
        }
    }

    pub fn is_log(&self) -> bool {
        match self {
            ConcVariant::Linear => LinearConc::is_log(),
            ConcVariant::Log => LogConc::is_log(),
        }
    }
}

/// How time is encoded in the scalar `t` argument passed to the
/// callback surface.
pub trait TimeSpace {
    /// Recovers physical time from the raw scalar argument.
    fn physical_time(t_arg: f64) -> f64;
    fn is_log() -> bool;
}

pub struct LinearTime;
pub struct LogTime;

impl TimeSpace for LinearTime {
    fn physical_time(t_arg: f64) -> f64 {
        t_arg
    }
    fn is_log() -> bool {
        false
    }
}

impl TimeSpace for LogTime {
    fn physical_time(t_arg: f64) -> f64 {
        t_arg.exp()
    }
    fn is_log() -> bool {
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeVariant {
    Linear,
    Log,
}

impl TimeVariant {
    pub fn from_flag(logt: bool) -> Self {
        if logt {
            TimeVariant::Log
        } else {
            TimeVariant::Linear
        }
    }

    pub fn physical_time(&self, t_arg: f64) -> f64 {
        match self {
            TimeVariant::Linear => LinearTime::physical_time(t_arg),
            TimeVariant::Log => LogTime::physical_time(t_arg),
        }
    }

    pub fn is_log(&self) -> bool {
        match self {
            TimeVariant::Linear => LinearTime::is_log(),
            TimeVariant::Log => LogTime::is_log(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_conc_is_identity() {
        assert_eq!(ConcVariant::Linear.conc(3.0).unwrap(), 3.0);
    }

    #[test]
    fn log_conc_exponentiates() {
        let c = ConcVariant::Log.conc(2.0_f64.ln()).unwrap();
        assert!((c - 2.0).abs() < 1e-12);
    }

    #[test]
    fn log_conc_overflow_detected() {
        assert!(ConcVariant::Log.conc(1000.0).is_err());
    }

    #[test]
    fn log_time_exponentiates() {
        let t = TimeVariant::Log.physical_time(1.0_f64.ln());
        assert!((t - 1.0).abs() < 1e-12);
    }
}
