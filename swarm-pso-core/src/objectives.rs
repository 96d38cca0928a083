//! Built-in benchmark objectives
//!
//! All three are generic over [`Numeric`] and use saturating arithmetic, so a
//! score outside the representable range becomes `N::MAX` rather than
//! wrapping around to a small value.

use crate::numeric::Numeric;
use crate::traits::Objective;
use crate::EvaluationError;

/// `f(x) = Σ xᵢ²`, minimum 0 at the origin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sphere;

impl<N: Numeric> Objective<N> for Sphere {
    fn evaluate(&self, position: &[N]) -> Result<N, EvaluationError> {
        Ok(position
            .iter()
            .fold(N::ZERO, |acc, &x| acc.saturating_add(square(x))))
    }
}

/// `f(x) = Σ 100(xᵢ₊₁ − xᵢ²)² + (1 − xᵢ)²`, minimum 0 at `(1, …, 1)`.
///
/// A single axis has no terms and scores 0 everywhere.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rosenbrock;

impl<N: Numeric> Objective<N> for Rosenbrock {
    fn evaluate(&self, position: &[N]) -> Result<N, EvaluationError> {
        let hundred = N::from_f64(100.0);
        Ok(position.windows(2).fold(N::ZERO, |acc, pair| {
            let (x, next) = (pair[0], pair[1]);
            let valley = square(next.saturating_sub(square(x))).saturating_mul(hundred);
            let slope = square(N::ONE.saturating_sub(x));
            acc.saturating_add(valley).saturating_add(slope)
        }))
    }
}

/// `f(x, y) = 0.26(x² + y²) − 0.48xy`, minimum 0 at the origin.
///
/// Only the first two axes are scored; fewer than two is an error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Matyas;

impl<N: Numeric> Objective<N> for Matyas {
    fn evaluate(&self, position: &[N]) -> Result<N, EvaluationError> {
        let (x, y) = match position {
            [x, y, ..] => (*x, *y),
            _ => {
                return Err(EvaluationError::DimensionMismatch {
                    expected: 2,
                    actual: position.len(),
                })
            }
        };
        let bowl = square(x)
            .saturating_add(square(y))
            .saturating_mul(N::from_f64(0.26));
        let twist = x.saturating_mul(y).saturating_mul(N::from_f64(0.48));
        Ok(bowl.saturating_sub(twist))
    }
}

fn square<N: Numeric>(x: N) -> N {
    x.saturating_mul(x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numeric::Fix16;

    fn fix(values: &[f64]) -> alloc::vec::Vec<Fix16> {
        values.iter().map(|&v| Fix16::from_f64(v)).collect()
    }

    #[test]
    fn sphere_values() {
        assert_eq!(Sphere.evaluate(&[0.0, 0.0]), Ok(0.0));
        assert_eq!(Sphere.evaluate(&[1.0, -2.0, 3.0]), Ok(14.0));
        assert_eq!(Sphere.evaluate(&fix(&[1.5, -2.0])), Ok(Fix16::from_f64(6.25)));
    }

    #[test]
    fn rosenbrock_values() {
        assert_eq!(Rosenbrock.evaluate(&[1.0, 1.0, 1.0]), Ok(0.0));
        assert_eq!(Rosenbrock.evaluate(&[0.0, 0.0]), Ok(1.0));
        // 100 * (2 - 1)^2 + (1 - (-1))^2
        assert_eq!(Rosenbrock.evaluate(&[-1.0, 2.0]), Ok(104.0));
        assert_eq!(Rosenbrock.evaluate(&[7.0]), Ok(0.0));
    }

    #[test]
    fn matyas_values() {
        assert_eq!(Matyas.evaluate(&[0.0, 0.0]), Ok(0.0));
        let score: f64 = Matyas.evaluate(&[1.0, 1.0]).unwrap();
        assert!((score - 0.04).abs() < 1e-12);
        assert_eq!(
            Matyas.evaluate(&[1.0]),
            Err(EvaluationError::DimensionMismatch {
                expected: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn fixed_point_scores_saturate_instead_of_wrapping() {
        // 100 * (5 - 25)^2 = 40000 exceeds the Q16.16 range.
        let score = Rosenbrock.evaluate(&fix(&[-5.0, 5.0])).unwrap();
        assert_eq!(score, Fix16::MAX);

        let score = Sphere.evaluate(&fix(&[200.0, 200.0])).unwrap();
        assert_eq!(score, Fix16::MAX);
    }
}
