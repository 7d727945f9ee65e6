//! The `landscape_core` crate provides the numerical engine behind loss surface exploration.
//! It samples an arbitrary bivariate function with central finite differences, classifies
//! the local curvature from the Hessian spectrum, and replays simple optimizers across it.
//!
//! Key components:
//! - **Traits**: `Surface` (the bound function handle).
//! - **Differential**: `DifferentialEstimator` (gradient and Hessian by central differences).
//! - **Curvature**: `CurvatureAnalyzer` (eigendecomposition, ranking, classification).
//! - **Trajectory**: `TrajectorySimulator` (plain descent and momentum paths).
//! - **Grid**: value and gradient sampling over rectangular grids for renderers.
//! - **Surface**: `LossSurface`, the facade that binds one function and exposes all of the above.
pub mod curvature;
pub mod differential;
pub mod error;
pub mod grid;
pub mod surface;
pub mod traits;
pub mod trajectory;

pub use curvature::{analyze_hessian, CurvatureAnalyzer, CurvatureReport, PointType};
pub use differential::{DifferentialEstimator, EstimatorSettings, Gradient, Hessian, Point};
pub use error::{LandscapeError, Result};
pub use grid::{GradientField, GridAxis, SurfaceGrid};
pub use surface::LossSurface;
pub use traits::{Fallible, Surface};
pub use trajectory::{
    OptimizerKind, SimulationSettings, Termination, Trajectory, TrajectorySimulator,
};
