use crate::error::{LandscapeError, Result};
use crate::traits::Surface;
use nalgebra::{Matrix2, Vector2};
use serde::{Deserialize, Serialize};

/// A location `(x, y)` on the surface.
pub type Point = Vector2<f64>;

/// First partial derivatives `(df/dx, df/dy)` at a point.
pub type Gradient = Vector2<f64>;

/// Matrix of second partial derivatives at a point.
///
/// Only one mixed partial is estimated and it fills both off-diagonal slots,
/// so every `Hessian` is exactly symmetric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[[f64; 2]; 2]", into = "[[f64; 2]; 2]")]
pub struct Hessian(Matrix2<f64>);

impl Hessian {
    pub fn from_partials(f_xx: f64, f_xy: f64, f_yy: f64) -> Self {
        Self(Matrix2::new(f_xx, f_xy, f_xy, f_yy))
    }

    pub fn f_xx(&self) -> f64 {
        self.0[(0, 0)]
    }

    pub fn f_xy(&self) -> f64 {
        self.0[(0, 1)]
    }

    pub fn f_yy(&self) -> f64 {
        self.0[(1, 1)]
    }

    pub fn matrix(&self) -> &Matrix2<f64> {
        &self.0
    }

    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|v| v.is_finite())
    }

    /// Row-major `[[f_xx, f_xy], [f_xy, f_yy]]`.
    pub fn to_array(&self) -> [[f64; 2]; 2] {
        [[self.f_xx(), self.f_xy()], [self.f_xy(), self.f_yy()]]
    }
}

impl TryFrom<[[f64; 2]; 2]> for Hessian {
    type Error = LandscapeError;

    /// Accepts only row-major matrices whose off-diagonal entries agree exactly.
    fn try_from(rows: [[f64; 2]; 2]) -> Result<Self> {
        let [[f_xx, f_xy], [f_yx, f_yy]] = rows;
        if f_xy != f_yx {
            return Err(LandscapeError::InvalidSettings(format!(
                "Hessian must be symmetric, got off-diagonal entries {f_xy} and {f_yx}"
            )));
        }
        Ok(Self::from_partials(f_xx, f_xy, f_yy))
    }
}

impl From<Hessian> for [[f64; 2]; 2] {
    fn from(hessian: Hessian) -> Self {
        hessian.to_array()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EstimatorSettings {
    /// Finite-difference offset `h`.
    pub step: f64,
}

impl Default for EstimatorSettings {
    fn default() -> Self {
        Self { step: 1e-6 }
    }
}

impl EstimatorSettings {
    pub fn validate(&self) -> Result<()> {
        if !self.step.is_finite() || self.step <= 0.0 {
            return Err(LandscapeError::InvalidSettings(format!(
                "finite-difference step must be finite and positive, got {}",
                self.step
            )));
        }
        Ok(())
    }
}

/// Central finite-difference derivatives of a bound surface.
///
/// The step `h` is fixed for the lifetime of the estimator. Truncation error is
/// O(h^2); for large function values or extreme curvature the cancellation error
/// of the second differences dominates, and that is accepted rather than corrected.
#[derive(Debug, Clone)]
pub struct DifferentialEstimator<F> {
    function: F,
    step: f64,
}

impl<F: Surface> DifferentialEstimator<F> {
    pub fn new(function: F) -> Self {
        Self {
            function,
            step: EstimatorSettings::default().step,
        }
    }

    pub fn with_settings(function: F, settings: EstimatorSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            function,
            step: settings.step,
        })
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn function(&self) -> &F {
        &self.function
    }

    /// Evaluates the bound function, rejecting non-finite results.
    pub fn value_at(&self, point: Point) -> Result<f64> {
        self.sample(point.x, point.y)
    }

    /// Four evaluations: `(x +- h, y)` and `(x, y +- h)`.
    pub fn gradient_at(&self, point: Point) -> Result<Gradient> {
        let (x, y) = (point.x, point.y);
        let h = self.step;

        let f_xp = self.sample(x + h, y)?;
        let f_xm = self.sample(x - h, y)?;
        let f_yp = self.sample(x, y + h)?;
        let f_ym = self.sample(x, y - h)?;

        Ok(Gradient::new(
            (f_xp - f_xm) / (2.0 * h),
            (f_yp - f_ym) / (2.0 * h),
        ))
    }

    pub fn hessian_at(&self, point: Point) -> Result<Hessian> {
        let (x, y) = (point.x, point.y);
        let h = self.step;
        let h2 = h * h;

        let f_00 = self.sample(x, y)?;

        // f_xx = (f(x+h,y) - 2f(x,y) + f(x-h,y)) / h^2
        let f_xp = self.sample(x + h, y)?;
        let f_xm = self.sample(x - h, y)?;
        let f_xx = (f_xp - 2.0 * f_00 + f_xm) / h2;

        // f_yy = (f(x,y+h) - 2f(x,y) + f(x,y-h)) / h^2
        let f_yp = self.sample(x, y + h)?;
        let f_ym = self.sample(x, y - h)?;
        let f_yy = (f_yp - 2.0 * f_00 + f_ym) / h2;

        // f_xy = (f(x+h,y+h) - f(x+h,y-h) - f(x-h,y+h) + f(x-h,y-h)) / 4h^2
        let f_pp = self.sample(x + h, y + h)?;
        let f_pm = self.sample(x + h, y - h)?;
        let f_mp = self.sample(x - h, y + h)?;
        let f_mm = self.sample(x - h, y - h)?;
        let f_xy = (f_pp - f_pm - f_mp + f_mm) / (4.0 * h2);

        Ok(Hessian::from_partials(f_xx, f_xy, f_yy))
    }

    fn sample(&self, x: f64, y: f64) -> Result<f64> {
        let value = self
            .function
            .evaluate(x, y)
            .map_err(LandscapeError::Function)?;
        if !value.is_finite() {
            return Err(LandscapeError::NonFinite { x, y, value });
        }
        Ok(value)
    }
}
