use crate::differential::{DifferentialEstimator, Hessian, Point};
use crate::error::{LandscapeError, Result};
use crate::traits::Surface;
use nalgebra::linalg::SymmetricEigen;
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use tracing::trace;

/// Added to the minor eigenvalue magnitude so a flat direction does not divide by zero.
const CONDITION_EPSILON: f64 = 1e-8;

/// Both eigenvalues above this count as steep curvature.
const STEEP_THRESHOLD: f64 = 0.1;

const EIGEN_MAX_ITERATIONS: usize = 1000;

/// Local shape of the surface as read off the Hessian spectrum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointType {
    #[serde(rename = "Steep Valley")]
    SteepValley,
    #[serde(rename = "Flat Basin (Minimum)")]
    FlatBasin,
    #[serde(rename = "Ridge (Maximum)")]
    Ridge,
    #[serde(rename = "Saddle Point")]
    SaddlePoint,
    #[serde(rename = "Undetermined")]
    Undetermined,
}

impl PointType {
    pub fn label(&self) -> &'static str {
        match self {
            PointType::SteepValley => "Steep Valley",
            PointType::FlatBasin => "Flat Basin (Minimum)",
            PointType::Ridge => "Ridge (Maximum)",
            PointType::SaddlePoint => "Saddle Point",
            PointType::Undetermined => "Undetermined",
        }
    }

    /// First matching rule wins. A zero eigenvalue alongside a positive one is
    /// deliberately left as `Undetermined`.
    pub fn classify(eigenvalues: [f64; 2]) -> Self {
        let [a, b] = eigenvalues;
        if a > STEEP_THRESHOLD && b > STEEP_THRESHOLD {
            PointType::SteepValley
        } else if a > 0.0 && b > 0.0 {
            PointType::FlatBasin
        } else if a < 0.0 && b < 0.0 {
            PointType::Ridge
        } else if a * b < 0.0 {
            PointType::SaddlePoint
        } else {
            PointType::Undetermined
        }
    }
}

impl fmt::Display for PointType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Eigen-analysis of the Hessian at one point.
///
/// Index 0 is the dominant curvature direction. `eigenvectors[i]` is the unit
/// eigenvector belonging to `eigenvalues[i]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurvatureReport {
    pub eigenvalues: [f64; 2],
    pub eigenvectors: [Vector2<f64>; 2],
    pub condition_number: f64,
    pub point_type: PointType,
}

impl CurvatureReport {
    pub fn eigenpairs(&self) -> impl Iterator<Item = (f64, Vector2<f64>)> + '_ {
        self.eigenvalues
            .iter()
            .copied()
            .zip(self.eigenvectors.iter().copied())
    }
}

/// Classifies local geometry from Hessians supplied by a `DifferentialEstimator`.
pub struct CurvatureAnalyzer<'a, F> {
    estimator: &'a DifferentialEstimator<F>,
}

impl<'a, F: Surface> CurvatureAnalyzer<'a, F> {
    pub fn new(estimator: &'a DifferentialEstimator<F>) -> Self {
        Self { estimator }
    }

    pub fn analyze_at(&self, point: Point) -> Result<CurvatureReport> {
        let hessian = self.estimator.hessian_at(point)?;
        let report = analyze_hessian(&hessian)?;
        trace!(
            x = point.x,
            y = point.y,
            point_type = %report.point_type,
            condition_number = report.condition_number,
            "analyzed curvature"
        );
        Ok(report)
    }
}

/// Eigendecomposes `hessian`, ranks the pairs by descending eigenvalue magnitude
/// and classifies the result.
pub fn analyze_hessian(hessian: &Hessian) -> Result<CurvatureReport> {
    let (values, vectors) = eigenpairs(hessian)?;

    let mut order = [0usize, 1];
    order.sort_by(|&a, &b| {
        values[b]
            .abs()
            .partial_cmp(&values[a].abs())
            .unwrap_or(Ordering::Equal)
    });

    let eigenvalues = order.map(|idx| values[idx]);
    let eigenvectors = order.map(|idx| vectors[idx]);
    let condition_number = eigenvalues[0].abs() / (eigenvalues[1].abs() + CONDITION_EPSILON);

    Ok(CurvatureReport {
        eigenvalues,
        eigenvectors,
        condition_number,
        point_type: PointType::classify(eigenvalues),
    })
}

fn eigenpairs(hessian: &Hessian) -> Result<([f64; 2], [Vector2<f64>; 2])> {
    if !hessian.is_finite() {
        return Err(LandscapeError::Decomposition(format!(
            "Hessian contains non-finite entries: {:?}",
            hessian.to_array()
        )));
    }

    let eigen = SymmetricEigen::try_new(*hessian.matrix(), f64::EPSILON, EIGEN_MAX_ITERATIONS)
        .ok_or_else(|| {
            LandscapeError::Decomposition(
                "symmetric eigen solver failed to converge".to_string(),
            )
        })?;

    let values = [eigen.eigenvalues[0], eigen.eigenvalues[1]];
    let mut vectors = [
        eigen.eigenvectors.column(0).into_owned(),
        eigen.eigenvectors.column(1).into_owned(),
    ];
    for vector in &mut vectors {
        let norm = vector.norm();
        if norm > 0.0 {
            *vector /= norm;
        }
    }
    Ok((values, vectors))
}

#[cfg(test)]
mod tests {
    use super::{analyze_hessian, CurvatureAnalyzer, CurvatureReport, PointType};
    use crate::differential::{DifferentialEstimator, Hessian, Point};
    use crate::error::LandscapeError;

    fn assert_pairs_consistent(hessian: &Hessian, report: &CurvatureReport) {
        for (lambda, vector) in report.eigenpairs() {
            let residual = hessian.matrix() * vector - vector * lambda;
            assert!(
                residual.norm() < 1e-9,
                "pair ({lambda}, {vector:?}) is not an eigenpair"
            );
            assert!((vector.norm() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn bowl_is_steep_valley() {
        let estimator = DifferentialEstimator::new(|x: f64, y: f64| x * x + y * y);
        let report = CurvatureAnalyzer::new(&estimator)
            .analyze_at(Point::new(0.0, 0.0))
            .expect("analysis should succeed");
        assert!((report.eigenvalues[0] - 2.0).abs() < 1e-3);
        assert!((report.eigenvalues[1] - 2.0).abs() < 1e-3);
        assert!((report.condition_number - 1.0).abs() < 1e-3);
        assert_eq!(report.point_type, PointType::SteepValley);
    }

    #[test]
    fn hyperbolic_paraboloid_is_saddle() {
        let estimator = DifferentialEstimator::new(|x: f64, y: f64| x * x - y * y);
        let report = CurvatureAnalyzer::new(&estimator)
            .analyze_at(Point::new(0.0, 0.0))
            .expect("analysis should succeed");
        assert!(report.eigenvalues[0] * report.eigenvalues[1] < 0.0);
        assert_eq!(report.point_type, PointType::SaddlePoint);
        assert_eq!(report.point_type.to_string(), "Saddle Point");
    }

    #[test]
    fn inverted_bowl_is_ridge() {
        let estimator = DifferentialEstimator::new(|x: f64, y: f64| -(x * x) - 3.0 * y * y);
        let report = CurvatureAnalyzer::new(&estimator)
            .analyze_at(Point::new(0.0, 0.0))
            .expect("analysis should succeed");
        assert!((report.eigenvalues[0] + 6.0).abs() < 1e-3);
        assert!((report.eigenvalues[1] + 2.0).abs() < 1e-3);
        assert_eq!(report.point_type, PointType::Ridge);
    }

    #[test]
    fn reordering_keeps_pairs_together() {
        let hessians = [
            Hessian::from_partials(0.5, 0.0, -4.0),
            Hessian::from_partials(3.0, 1.0, -2.0),
            Hessian::from_partials(-0.2, 0.7, 5.0),
            Hessian::from_partials(1.0, 0.0, 1.0),
        ];
        for hessian in &hessians {
            let report = analyze_hessian(hessian).expect("decomposition should succeed");
            assert!(report.eigenvalues[0].abs() >= report.eigenvalues[1].abs());
            assert_pairs_consistent(hessian, &report);
        }

        let report = analyze_hessian(&hessians[0]).unwrap();
        assert!((report.eigenvalues[0] + 4.0).abs() < 1e-12);
        assert!(report.eigenvectors[0].x.abs() < 1e-12);
        assert!((report.eigenvectors[0].y.abs() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn classification_follows_rule_order() {
        assert_eq!(PointType::classify([2.0, 2.0]), PointType::SteepValley);
        assert_eq!(PointType::classify([0.2, 0.05]), PointType::FlatBasin);
        assert_eq!(PointType::classify([0.1, 0.1]), PointType::FlatBasin);
        assert_eq!(PointType::classify([-1.0, -0.5]), PointType::Ridge);
        assert_eq!(PointType::classify([2.0, -2.0]), PointType::SaddlePoint);
        assert_eq!(PointType::classify([1.0, 0.0]), PointType::Undetermined);
        assert_eq!(PointType::classify([-1.0, 0.0]), PointType::Undetermined);
        assert_eq!(PointType::classify([0.0, 0.0]), PointType::Undetermined);
    }

    #[test]
    fn flat_direction_yields_large_condition_number() {
        let report = analyze_hessian(&Hessian::from_partials(4.0, 0.0, 0.0)).unwrap();
        assert!((report.condition_number - 4.0e8).abs() < 1.0);
        assert_eq!(report.point_type, PointType::Undetermined);
        assert!(report.eigenvectors[1].x.abs() < 1e-12);
        assert!((report.eigenvectors[1].y.abs() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn non_finite_hessian_is_a_decomposition_error() {
        let result = analyze_hessian(&Hessian::from_partials(f64::INFINITY, 0.0, 1.0));
        assert!(matches!(result, Err(LandscapeError::Decomposition(_))));
    }

    #[test]
    fn analysis_is_repeatable() {
        let estimator = DifferentialEstimator::new(|x: f64, y: f64| (x - y).sin() * y.exp());
        let analyzer = CurvatureAnalyzer::new(&estimator);
        let point = Point::new(0.2, -0.4);
        assert_eq!(
            analyzer.analyze_at(point).unwrap(),
            analyzer.analyze_at(point).unwrap()
        );
    }

    #[test]
    fn point_type_serializes_to_label() {
        let json = serde_json::to_string(&PointType::FlatBasin).unwrap();
        assert_eq!(json, "\"Flat Basin (Minimum)\"");
        let parsed: PointType = serde_json::from_str("\"Ridge (Maximum)\"").unwrap();
        assert_eq!(parsed, PointType::Ridge);
    }
}
