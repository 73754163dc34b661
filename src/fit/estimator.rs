//! Per-respondent part-worth estimation.
//!
//! Given:
//! - the shared survey profiles (attribute indicators)
//! - one respondent's preference scores
//!
//! we regress the scores on an intercept plus the five indicators (no
//! interactions) and return a `UtilityModel`.
//!
//! Degenerate designs are not papered over:
//! - an indicator that never varies is dropped from the regression, its
//!   part-worth stays `None` and a `FitWarning::ConstantIndicator` is recorded
//! - a rank-deficient design leaves every estimate `None`
//! - no varying indicator at all is a hard `DataError`

use std::collections::BTreeMap;

use nalgebra::{DMatrix, DVector};
use tracing::debug;

use crate::domain::{
    AttributeKey, AttributeProfile, Coefficient, FitDiagnostics, FitWarning, PreferenceColumn, UtilityModel,
};
use crate::error::{AnalysisError, ComputationError, DataError};
use crate::math::{fit_ols, rank_and_condition};
use crate::models::fill_design_row;

/// Condition number above which a full-rank fit is flagged as fragile.
const ILL_CONDITIONED: f64 = 1e8;

/// Fit one respondent's utility model.
///
/// Pure function of its inputs; safe to call concurrently for different
/// respondents over the same profiles.
pub fn estimate_utility(
    profiles: &[AttributeProfile],
    column: &PreferenceColumn,
) -> Result<UtilityModel, AnalysisError> {
    let respondent = column.respondent.as_str();
    if profiles.is_empty() {
        return Err(DataError::EmptySurvey.into());
    }
    if column.scores.len() != profiles.len() {
        return Err(DataError::LengthMismatch {
            column: respondent.to_string(),
            expected: profiles.len(),
            found: column.scores.len(),
        }
        .into());
    }

    let y = preference_vector(column)?;

    let mut warnings = Vec::new();
    let mut keys = Vec::with_capacity(AttributeKey::ALL.len());
    for key in AttributeKey::ALL {
        if varies(profiles, key) {
            keys.push(key);
        } else {
            warnings.push(FitWarning::ConstantIndicator { key });
        }
    }
    if keys.is_empty() {
        return Err(DataError::NoAttributeVariation {
            respondent: respondent.to_string(),
        }
        .into());
    }

    let n = profiles.len();
    let p = keys.len() + 1;
    if n < p {
        return Err(DataError::InsufficientObservations {
            respondent: respondent.to_string(),
            observations: n,
            parameters: p,
        }
        .into());
    }

    let x = design_matrix(profiles, &keys);
    let (rank, condition_number) = rank_and_condition(&x);

    let mut part_worths: BTreeMap<AttributeKey, Coefficient> = AttributeKey::ALL
        .iter()
        .map(|&k| (k, Coefficient::undefined()))
        .collect();

    if rank < p {
        warnings.push(FitWarning::RankDeficient { rank, columns: p });
        debug!(respondent, rank, columns = p, "rank-deficient design; estimates left undefined");
        return Ok(UtilityModel {
            respondent: respondent.to_string(),
            intercept: Coefficient::undefined(),
            part_worths,
            diagnostics: FitDiagnostics {
                observations: n,
                parameters: p,
                residual_df: n - p,
                sse: f64::NAN,
                r_squared: None,
                adj_r_squared: None,
                residual_std_error: None,
                f_statistic: None,
                condition_number,
                warnings,
            },
        });
    }
    if condition_number > ILL_CONDITIONED {
        warnings.push(FitWarning::IllConditioned { condition_number });
    }

    let fit = fit_ols(&x, &y).ok_or(ComputationError::SolveFailed)?;
    if fit.residual_df == 0 {
        warnings.push(FitWarning::NoResidualDegreesOfFreedom);
    }

    let coefficient = |j: usize| {
        let estimate = fit.beta[j];
        let std_error = fit.std_errors.as_ref().map(|se| se[j]);
        let t_stat = std_error.filter(|&se| se > 0.0).map(|se| estimate / se);
        Coefficient {
            estimate: Some(estimate),
            std_error,
            t_stat,
        }
    };

    let intercept = coefficient(0);
    for (j, &key) in keys.iter().enumerate() {
        part_worths.insert(key, coefficient(j + 1));
    }

    debug!(
        respondent,
        sse = fit.sse,
        r_squared = fit.r_squared().unwrap_or(f64::NAN),
        "fitted part-worths"
    );

    Ok(UtilityModel {
        respondent: respondent.to_string(),
        intercept,
        part_worths,
        diagnostics: FitDiagnostics {
            observations: n,
            parameters: p,
            residual_df: fit.residual_df,
            sse: fit.sse,
            r_squared: fit.r_squared(),
            adj_r_squared: fit.adj_r_squared(),
            residual_std_error: fit.residual_std_error(),
            f_statistic: fit.f_statistic(),
            condition_number,
            warnings,
        },
    })
}

fn preference_vector(column: &PreferenceColumn) -> Result<DVector<f64>, DataError> {
    let mut values = Vec::with_capacity(column.scores.len());
    for (i, score) in column.scores.iter().enumerate() {
        match score {
            Some(v) if v.is_finite() => values.push(*v),
            _ => {
                return Err(DataError::MissingPreference {
                    respondent: column.respondent.clone(),
                    row: i + 1,
                });
            }
        }
    }
    Ok(DVector::from_vec(values))
}

fn varies(profiles: &[AttributeProfile], key: AttributeKey) -> bool {
    let first = profiles[0].has(key);
    profiles.iter().any(|p| p.has(key) != first)
}

fn design_matrix(profiles: &[AttributeProfile], keys: &[AttributeKey]) -> DMatrix<f64> {
    let p = keys.len() + 1;
    let mut x = DMatrix::<f64>::zeros(profiles.len(), p);
    let mut row = vec![0.0; p];
    for (i, profile) in profiles.iter().enumerate() {
        fill_design_row(profile, keys, &mut row);
        for (j, &v) in row.iter().enumerate() {
            x[(i, j)] = v;
        }
    }
    x
}
