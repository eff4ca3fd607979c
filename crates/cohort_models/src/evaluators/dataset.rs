//! Simulated datasets shared by the evaluators.

use crate::covariates::{CovariateError, CovariateGenerator, CovariateTable, LinearPredictor};
use crate::rng::SeededSource;

/// Observation-level data an evaluator is built on.
///
/// Holds the linear predictor `lp_i` that stays fixed while the calibrated
/// parameter varies, and optionally the covariates it was derived from.
#[derive(Clone, Debug, PartialEq)]
pub struct SimulationDataset {
    linear_predictor: Vec<f64>,
    covariates: Option<CovariateTable>,
}

impl SimulationDataset {
    /// Build from an explicit linear predictor.
    ///
    /// # Errors
    ///
    /// `EmptyDataset` for an empty slice and `NonFiniteLinearPredictor` for
    /// NaN or infinite entries.
    pub fn from_linear_predictor(linear_predictor: Vec<f64>) -> Result<Self, CovariateError> {
        validate(&linear_predictor)?;
        Ok(Self {
            linear_predictor,
            covariates: None,
        })
    }

    /// `n_obs` observations with `lp_i = 0`.
    pub fn intercept_only(n_obs: usize) -> Result<Self, CovariateError> {
        Self::from_linear_predictor(vec![0.0; n_obs])
    }

    /// Derive the linear predictor from generated covariates.
    pub fn from_covariates(
        covariates: CovariateTable,
        predictor: &LinearPredictor,
    ) -> Result<Self, CovariateError> {
        let linear_predictor = predictor.evaluate(&covariates)?;
        validate(&linear_predictor)?;
        Ok(Self {
            linear_predictor,
            covariates: Some(covariates),
        })
    }

    /// Number of observations.
    pub fn n_obs(&self) -> usize {
        self.linear_predictor.len()
    }

    /// Per-observation linear predictor.
    pub fn linear_predictor(&self) -> &[f64] {
        &self.linear_predictor
    }

    /// Covariates, if the dataset was generated from them.
    pub fn covariates(&self) -> Option<&CovariateTable> {
        self.covariates.as_ref()
    }
}

fn validate(linear_predictor: &[f64]) -> Result<(), CovariateError> {
    if linear_predictor.is_empty() {
        return Err(CovariateError::EmptyDataset);
    }
    if let Some((row, &value)) = linear_predictor
        .iter()
        .enumerate()
        .find(|(_, v)| !v.is_finite())
    {
        return Err(CovariateError::NonFiniteLinearPredictor { row, value });
    }
    Ok(())
}

/// Recipe for a simulated cohort: size, covariate structure and coefficients.
///
/// A design without a generator is intercept-only (`lp_i = 0`).
///
/// # Example
///
/// ```
/// use cohort_models::covariates::{CorrelationMatrix, CovariateGenerator, LinearPredictor};
/// use cohort_models::evaluators::CohortDesign;
/// use cohort_models::rng::SeededSource;
///
/// let generator = CovariateGenerator::new(&CorrelationMatrix::identity(2)).unwrap();
/// let predictor = LinearPredictor::new(vec![0.5, -0.5]).unwrap();
/// let design = CohortDesign::with_covariates(1_000, generator, predictor).unwrap();
///
/// let dataset = design.simulate(&SeededSource::new(3)).unwrap();
/// assert_eq!(dataset.n_obs(), 1_000);
/// ```
#[derive(Clone, Debug)]
pub struct CohortDesign {
    n_obs: usize,
    covariates: Option<(CovariateGenerator, LinearPredictor)>,
}

impl CohortDesign {
    /// Intercept-only design.
    pub fn intercept_only(n_obs: usize) -> Self {
        Self {
            n_obs,
            covariates: None,
        }
    }

    /// Design with generated covariates.
    ///
    /// # Errors
    ///
    /// `CoefficientMismatch` if the predictor width differs from the
    /// generator's.
    pub fn with_covariates(
        n_obs: usize,
        generator: CovariateGenerator,
        predictor: LinearPredictor,
    ) -> Result<Self, CovariateError> {
        if generator.n_vars() != predictor.len() {
            return Err(CovariateError::CoefficientMismatch {
                expected: generator.n_vars(),
                got: predictor.len(),
            });
        }
        Ok(Self {
            n_obs,
            covariates: Some((generator, predictor)),
        })
    }

    /// Number of observations.
    pub fn n_obs(&self) -> usize {
        self.n_obs
    }

    /// Generate the dataset from `source`.
    pub fn simulate(&self, source: &SeededSource) -> Result<SimulationDataset, CovariateError> {
        match &self.covariates {
            None => SimulationDataset::intercept_only(self.n_obs),
            Some((generator, predictor)) => {
                let table = generator.generate(self.n_obs, source);
                SimulationDataset::from_covariates(table, predictor)
            }
        }
    }
}
