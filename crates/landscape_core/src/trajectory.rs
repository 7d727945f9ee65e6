use crate::differential::{DifferentialEstimator, Gradient, Point};
use crate::error::{LandscapeError, Result};
use crate::traits::Surface;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// A run stops once the position norm exceeds this.
const DIVERGENCE_RADIUS: f64 = 1000.0;

/// A run stops once two consecutive points are closer than this.
const STAGNATION_DISTANCE: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizerKind {
    /// `p <- p - lr * g`
    Sgd,
    /// `v <- momentum * v - lr * g; p <- p + v`
    Momentum,
}

impl OptimizerKind {
    pub fn name(&self) -> &'static str {
        match self {
            OptimizerKind::Sgd => "sgd",
            OptimizerKind::Momentum => "momentum",
        }
    }

    fn build(self) -> OptimizerState {
        match self {
            OptimizerKind::Sgd => OptimizerState::Sgd,
            OptimizerKind::Momentum => OptimizerState::Momentum {
                velocity: Gradient::zeros(),
            },
        }
    }
}

impl FromStr for OptimizerKind {
    type Err = LandscapeError;

    fn from_str(name: &str) -> Result<Self> {
        match name {
            "sgd" => Ok(OptimizerKind::Sgd),
            "momentum" => Ok(OptimizerKind::Momentum),
            other => Err(LandscapeError::UnsupportedOptimizer(other.to_string())),
        }
    }
}

impl fmt::Display for OptimizerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-run optimizer state. Momentum keeps its velocity between steps.
enum OptimizerState {
    Sgd,
    Momentum { velocity: Gradient },
}

impl OptimizerState {
    fn step(&mut self, position: &mut Point, gradient: &Gradient, settings: &SimulationSettings) {
        match self {
            OptimizerState::Sgd => {
                *position -= gradient * settings.learning_rate;
            }
            OptimizerState::Momentum { velocity } => {
                *velocity = *velocity * settings.momentum - gradient * settings.learning_rate;
                *position += *velocity;
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationSettings {
    pub learning_rate: f64,
    /// Only read by `OptimizerKind::Momentum`.
    pub momentum: f64,
    pub max_steps: usize,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            learning_rate: 0.001,
            momentum: 0.9,
            max_steps: 5000,
        }
    }
}

impl SimulationSettings {
    pub fn validate(&self) -> Result<()> {
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(LandscapeError::InvalidSettings(format!(
                "learning_rate must be finite and positive, got {}",
                self.learning_rate
            )));
        }
        if !self.momentum.is_finite() || self.momentum < 0.0 {
            return Err(LandscapeError::InvalidSettings(format!(
                "momentum must be finite and non-negative, got {}",
                self.momentum
            )));
        }
        Ok(())
    }
}

/// Why a simulated run stopped. None of these are failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// Consecutive points closer than `1e-9`.
    Converged,
    /// Position norm above `1000`.
    Diverged,
    /// `max_steps` steps taken without either guard firing.
    MaxSteps,
}

/// Path of an optimizer run. Always holds at least the start point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trajectory {
    points: Vec<Point>,
    termination: Termination,
}

impl Trajectory {
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn into_points(self) -> Vec<Point> {
        self.points
    }

    pub fn termination(&self) -> Termination {
        self.termination
    }

    /// Number of points, start included. Never zero.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always `false`: every run records its start point before stepping.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of optimizer steps taken.
    pub fn steps(&self) -> usize {
        self.points.len().saturating_sub(1)
    }

    pub fn start(&self) -> Point {
        self.points[0]
    }

    pub fn end(&self) -> Point {
        self.points[self.points.len() - 1]
    }

    /// `[x, y]` rows for plotting layers.
    pub fn to_array(&self) -> Vec<[f64; 2]> {
        self.points.iter().map(|p| [p.x, p.y]).collect()
    }
}

/// Replays an optimizer over gradients from a `DifferentialEstimator`.
pub struct TrajectorySimulator<'a, F> {
    estimator: &'a DifferentialEstimator<F>,
}

impl<'a, F: Surface> TrajectorySimulator<'a, F> {
    pub fn new(estimator: &'a DifferentialEstimator<F>) -> Self {
        Self { estimator }
    }

    pub fn run(
        &self,
        start: Point,
        kind: OptimizerKind,
        settings: SimulationSettings,
    ) -> Result<Trajectory> {
        settings.validate()?;

        let mut optimizer = kind.build();
        let mut position = start;
        let mut points = Vec::with_capacity(settings.max_steps.min(1024) + 1);
        points.push(position);
        let mut termination = Termination::MaxSteps;

        for _ in 0..settings.max_steps {
            let gradient = self.estimator.gradient_at(position)?;
            let previous = position;
            optimizer.step(&mut position, &gradient, &settings);
            points.push(position);

            if position.norm() > DIVERGENCE_RADIUS {
                termination = Termination::Diverged;
                break;
            }
            if (position - previous).norm() < STAGNATION_DISTANCE {
                termination = Termination::Converged;
                break;
            }
        }

        debug!(
            optimizer = %kind,
            steps = points.len() - 1,
            ?termination,
            end_x = position.x,
            end_y = position.y,
            "trajectory finished"
        );

        Ok(Trajectory {
            points,
            termination,
        })
    }

    /// Same as `run`, with the optimizer given by name ("sgd" or "momentum").
    /// Unknown names fail before any gradient is evaluated.
    pub fn run_named(
        &self,
        start: Point,
        optimizer: &str,
        settings: SimulationSettings,
    ) -> Result<Trajectory> {
        let kind = optimizer.parse::<OptimizerKind>()?;
        self.run(start, kind, settings)
    }
}
