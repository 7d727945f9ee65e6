//! The `LossSurface` facade: one bound function, every analysis.

use crate::curvature::{CurvatureAnalyzer, CurvatureReport};
use crate::differential::{DifferentialEstimator, EstimatorSettings, Gradient, Hessian, Point};
use crate::error::Result;
use crate::grid::{self, GradientField, GridAxis, SurfaceGrid};
use crate::traits::Surface;
use crate::trajectory::{OptimizerKind, SimulationSettings, Trajectory, TrajectorySimulator};
#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// A bivariate function bound for analysis.
///
/// The function is the only state held. Every call takes its own point or start
/// and returns a fresh value, so repeated calls with the same input agree exactly
/// provided the function is pure.
#[derive(Debug, Clone)]
pub struct LossSurface<F> {
    estimator: DifferentialEstimator<F>,
}

impl<F: Surface> LossSurface<F> {
    pub fn new(function: F) -> Self {
        Self {
            estimator: DifferentialEstimator::new(function),
        }
    }

    pub fn with_settings(function: F, settings: EstimatorSettings) -> Result<Self> {
        Ok(Self {
            estimator: DifferentialEstimator::with_settings(function, settings)?,
        })
    }

    pub fn estimator(&self) -> &DifferentialEstimator<F> {
        &self.estimator
    }

    pub fn function(&self) -> &F {
        self.estimator.function()
    }

    pub fn value_at(&self, point: Point) -> Result<f64> {
        self.estimator.value_at(point)
    }

    pub fn gradient_at(&self, point: Point) -> Result<Gradient> {
        self.estimator.gradient_at(point)
    }

    pub fn hessian_at(&self, point: Point) -> Result<Hessian> {
        self.estimator.hessian_at(point)
    }

    pub fn analyze_at(&self, point: Point) -> Result<CurvatureReport> {
        CurvatureAnalyzer::new(&self.estimator).analyze_at(point)
    }

    pub fn run(
        &self,
        start: Point,
        kind: OptimizerKind,
        settings: SimulationSettings,
    ) -> Result<Trajectory> {
        TrajectorySimulator::new(&self.estimator).run(start, kind, settings)
    }

    pub fn run_named(
        &self,
        start: Point,
        optimizer: &str,
        settings: SimulationSettings,
    ) -> Result<Trajectory> {
        TrajectorySimulator::new(&self.estimator).run_named(start, optimizer, settings)
    }

    pub fn sample_grid(&self, x_axis: &GridAxis, y_axis: &GridAxis) -> Result<SurfaceGrid> {
        grid::sample_grid(&self.estimator, x_axis, y_axis)
    }

    pub fn gradient_field(&self, x_axis: &GridAxis, y_axis: &GridAxis) -> Result<GradientField> {
        grid::gradient_field(&self.estimator, x_axis, y_axis)
    }
}

#[cfg(feature = "parallel")]
impl<F: Surface + Sync> LossSurface<F> {
    /// Runs one independent simulation per start point across the rayon pool.
    pub fn run_many(
        &self,
        starts: &[Point],
        kind: OptimizerKind,
        settings: SimulationSettings,
    ) -> Result<Vec<Trajectory>> {
        settings.validate()?;
        starts
            .par_iter()
            .map(|&start| self.run(start, kind, settings))
            .collect()
    }

    pub fn analyze_many(&self, points: &[Point]) -> Result<Vec<CurvatureReport>> {
        points
            .par_iter()
            .map(|&point| self.analyze_at(point))
            .collect()
    }
}

#[cfg(not(feature = "parallel"))]
impl<F: Surface + Sync> LossSurface<F> {
    pub fn run_many(
        &self,
        starts: &[Point],
        kind: OptimizerKind,
        settings: SimulationSettings,
    ) -> Result<Vec<Trajectory>> {
        settings.validate()?;
        starts
            .iter()
            .map(|&start| self.run(start, kind, settings))
            .collect()
    }

    pub fn analyze_many(&self, points: &[Point]) -> Result<Vec<CurvatureReport>> {
        points.iter().map(|&point| self.analyze_at(point)).collect()
    }
}
