//! Linear predictors over covariate tables.

use super::{CovariateError, CovariateTable};

/// Fixed coefficient vector `beta` producing `lp_i = sum_j beta_j * x_ij`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinearPredictor {
    coefficients: Vec<f64>,
}

impl LinearPredictor {
    /// Create a predictor, rejecting non-finite coefficients.
    pub fn new(coefficients: Vec<f64>) -> Result<Self, CovariateError> {
        if let Some((index, &value)) = coefficients
            .iter()
            .enumerate()
            .find(|(_, c)| !c.is_finite())
        {
            return Err(CovariateError::NonFiniteCoefficient { index, value });
        }
        Ok(Self { coefficients })
    }

    /// Coefficient vector.
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    /// Number of coefficients.
    pub fn len(&self) -> usize {
        self.coefficients.len()
    }

    /// True if there are no coefficients.
    pub fn is_empty(&self) -> bool {
        self.coefficients.is_empty()
    }

    /// Evaluate the predictor for every row of `table`.
    ///
    /// # Errors
    ///
    /// `CoefficientMismatch` if the coefficient count differs from the table
    /// width.
    pub fn evaluate(&self, table: &CovariateTable) -> Result<Vec<f64>, CovariateError> {
        if table.n_vars() != self.coefficients.len() {
            return Err(CovariateError::CoefficientMismatch {
                expected: table.n_vars(),
                got: self.coefficients.len(),
            });
        }

        Ok(table
            .rows()
            .take(table.n_obs())
            .map(|row| row.iter().zip(&self.coefficients).map(|(x, b)| x * b).sum())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_evaluate() {
        let table = CovariateTable::from_rows(vec![1.0, 2.0, -1.0, 0.5], 2).unwrap();
        let lp = LinearPredictor::new(vec![0.5, -1.0]).unwrap();
        let values = lp.evaluate(&table).unwrap();
        assert_relative_eq!(values[0], -1.5);
        assert_relative_eq!(values[1], -1.0);
    }

    #[test]
    fn test_mismatch() {
        let table = CovariateTable::from_rows(vec![1.0, 2.0], 2).unwrap();
        let lp = LinearPredictor::new(vec![1.0]).unwrap();
        assert_eq!(
            lp.evaluate(&table).unwrap_err(),
            CovariateError::CoefficientMismatch {
                expected: 2,
                got: 1
            }
        );
    }

    #[test]
    fn test_non_finite_coefficient() {
        assert!(matches!(
            LinearPredictor::new(vec![0.0, f64::INFINITY]),
            Err(CovariateError::NonFiniteCoefficient { index: 1, .. })
        ));
    }
}
