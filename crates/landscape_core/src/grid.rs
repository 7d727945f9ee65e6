use crate::differential::{DifferentialEstimator, Point};
use crate::error::{LandscapeError, Result};
use crate::traits::Surface;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Evenly spaced samples over `[min, max]`, endpoints included.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GridAxis {
    pub min: f64,
    pub max: f64,
    pub samples: usize,
}

impl GridAxis {
    pub fn new(min: f64, max: f64, samples: usize) -> Self {
        Self { min, max, samples }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.min.is_finite() || !self.max.is_finite() || self.max <= self.min {
            return Err(LandscapeError::InvalidSettings(format!(
                "grid axis range must be finite with max > min, got [{}, {}]",
                self.min, self.max
            )));
        }
        if self.samples < 2 {
            return Err(LandscapeError::InvalidSettings(format!(
                "grid axis needs at least 2 samples, got {}",
                self.samples
            )));
        }
        Ok(())
    }

    pub fn coordinates(&self) -> Result<Vec<f64>> {
        self.validate()?;
        let step = (self.max - self.min) / (self.samples - 1) as f64;
        Ok((0..self.samples)
            .map(|i| {
                if i + 1 == self.samples {
                    self.max
                } else {
                    self.min + step * i as f64
                }
            })
            .collect())
    }
}

/// Function values on a rectangular grid.
/// `values[iy * xs.len() + ix]` is `f(xs[ix], ys[iy])`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SurfaceGrid {
    pub xs: Vec<f64>,
    pub ys: Vec<f64>,
    pub values: Vec<f64>,
}

impl SurfaceGrid {
    pub fn value(&self, ix: usize, iy: usize) -> f64 {
        self.values[iy * self.xs.len() + ix]
    }

    /// Rows of constant `y`, ready for contour or heat-map renderers.
    /// Yields nothing when `xs` is empty.
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        let width = self.xs.len();
        let count = if width == 0 { 0 } else { self.values.len() / width };
        self.values.chunks(width.max(1)).take(count)
    }
}

/// Gradients on a rectangular grid, same layout as `SurfaceGrid`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradientField {
    pub xs: Vec<f64>,
    pub ys: Vec<f64>,
    pub gradients: Vec<[f64; 2]>,
}

impl GradientField {
    pub fn gradient(&self, ix: usize, iy: usize) -> [f64; 2] {
        self.gradients[iy * self.xs.len() + ix]
    }
}

pub(crate) fn sample_grid<F: Surface>(
    estimator: &DifferentialEstimator<F>,
    x_axis: &GridAxis,
    y_axis: &GridAxis,
) -> Result<SurfaceGrid> {
    let xs = x_axis.coordinates()?;
    let ys = y_axis.coordinates()?;

    let mut values = Vec::with_capacity(xs.len() * ys.len());
    for &y in &ys {
        for &x in &xs {
            values.push(estimator.value_at(Point::new(x, y))?);
        }
    }
    trace!(nx = xs.len(), ny = ys.len(), "sampled surface grid");

    Ok(SurfaceGrid { xs, ys, values })
}

pub(crate) fn gradient_field<F: Surface>(
    estimator: &DifferentialEstimator<F>,
    x_axis: &GridAxis,
    y_axis: &GridAxis,
) -> Result<GradientField> {
    let xs = x_axis.coordinates()?;
    let ys = y_axis.coordinates()?;

    let mut gradients = Vec::with_capacity(xs.len() * ys.len());
    for &y in &ys {
        for &x in &xs {
            let g = estimator.gradient_at(Point::new(x, y))?;
            gradients.push([g.x, g.y]);
        }
    }
    trace!(nx = xs.len(), ny = ys.len(), "sampled gradient field");

    Ok(GradientField { xs, ys, gradients })
}
