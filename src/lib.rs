//! Method-of-lines discretization of a 1D reaction-diffusion-drift
//! system on a non-uniform grid, with electric-field coupling between
//! charged species.
//!
//! This crate computes `f(t, y)` and its Jacobian in five physical
//! layouts for an external stiff ODE integrator; it does not itself
//! integrate anything. See [`builder::SystemBuilder`] for construction
//! and [`system::ReactionDiffusionSystem`] for the callback surface.

pub mod builder;
pub mod efield;
pub mod error;
pub mod geom;
pub mod grid;
pub mod jacobian;
pub mod reactions;
pub mod system;
pub mod transport;
pub mod variables;

pub use builder::{SystemBuilder, SystemConfig};
pub use error::{ReactorError, ReactorResult};
pub use geom::Geometry;
pub use system::{JacobianLayout, ReactionDiffusionSystem};
