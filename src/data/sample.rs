//! Synthetic conjoint surveys.
//!
//! Every respondent rates the full factorial of 3 screen sizes x 2
//! resolutions x 2 brands x 2 price levels (24 profiles). Their "true"
//! part-worths are drawn once per respondent; each score is the resulting
//! utility plus Gaussian noise, rounded to two decimals.

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;
use tracing::debug;

use crate::domain::{AttributeKey, AttributeProfile, NonPriceAttributes, PreferenceColumn, SurveyTable};
use crate::error::AppError;

/// Baseline utility of the 65" / HD / no-brand / low-price profile.
const BASE_UTILITY: f64 = 10.0;

/// Mean and standard deviation of each respondent's part-worths.
const PART_WORTH_PRIORS: [(AttributeKey, f64, f64); 5] = [
    (AttributeKey::Screen75, 1.5, 0.8),
    (AttributeKey::Screen85, 2.0, 1.2),
    (AttributeKey::Resolution4k, 1.0, 0.5),
    (AttributeKey::Brand, 0.5, 0.5),
    (AttributeKey::PriceHigh, -2.0, 0.7),
];

const SCORE_NOISE: f64 = 0.5;

/// The 24 profiles of the full factorial design, in a fixed order.
pub fn full_factorial_profiles() -> Vec<AttributeProfile> {
    let mut profiles = Vec::with_capacity(24);
    for screen in 0..3 {
        for resolution_4k in [false, true] {
            for brand in [false, true] {
                for price_high in [false, true] {
                    profiles.push(AttributeProfile {
                        attributes: NonPriceAttributes {
                            screen_75: screen == 1,
                            screen_85: screen == 2,
                            resolution_4k,
                            brand,
                        },
                        price_high,
                    });
                }
            }
        }
    }
    profiles
}

/// Generate a survey of `respondents` columns named `Rank 1`, `Rank 2`, ...
///
/// Deterministic for a given `seed`.
pub fn generate_survey(respondents: usize, seed: u64) -> Result<SurveyTable, AppError> {
    if respondents == 0 {
        return Err(AppError::new(2, "Respondent count must be > 0."));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let noise = Normal::new(0.0, SCORE_NOISE)
        .map_err(|e| AppError::new(4, format!("Noise distribution error: {e}")))?;
    let priors = PART_WORTH_PRIORS
        .iter()
        .map(|&(key, mean, sd)| {
            Normal::new(mean, sd)
                .map(|d| (key, d))
                .map_err(|e| AppError::new(4, format!("Part-worth distribution error: {e}")))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let profiles = full_factorial_profiles();
    let mut preferences = Vec::with_capacity(respondents);

    for i in 0..respondents {
        let mut part_worths: Vec<(AttributeKey, f64)> =
            priors.iter().map(|(key, dist)| (*key, dist.sample(&mut rng))).collect();
        // Nobody prefers paying more.
        for (key, value) in part_worths.iter_mut() {
            if *key == AttributeKey::PriceHigh {
                *value = -value.abs();
            }
        }

        let scores = profiles
            .iter()
            .map(|p| {
                let utility: f64 =
                    BASE_UTILITY + part_worths.iter().map(|&(key, b)| b * p.indicator(key)).sum::<f64>();
                let score = utility + noise.sample(&mut rng);
                Some((score * 100.0).round() / 100.0)
            })
            .collect();

        debug!(respondent = i + 1, ?part_worths, "drew respondent part-worths");
        preferences.push(PreferenceColumn {
            respondent: format!("Rank {}", i + 1),
            scores,
        });
    }

    Ok(SurveyTable { profiles, preferences })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fit::estimate_utility;

    #[test]
    fn factorial_design_is_complete_and_consistent() {
        let profiles = full_factorial_profiles();
        assert_eq!(profiles.len(), 24);
        assert!(profiles.iter().all(|p| p.attributes.is_consistent()));
        for key in AttributeKey::ALL {
            let n = profiles.iter().filter(|p| p.has(key)).count();
            let expected = match key {
                AttributeKey::Screen75 | AttributeKey::Screen85 => 8,
                _ => 12,
            };
            assert_eq!(n, expected, "{key}");
        }
    }

    #[test]
    fn same_seed_same_survey() {
        let a = generate_survey(3, 7).unwrap();
        let b = generate_survey(3, 7).unwrap();
        let c = generate_survey(3, 8).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.preferences[2].respondent, "Rank 3");
        assert!(a.validate().is_ok());
    }

    #[test]
    fn generated_respondents_are_estimable() {
        let table = generate_survey(5, 42).unwrap();
        for column in &table.preferences {
            let model = estimate_utility(&table.profiles, column).unwrap();
            assert!(!model.is_degenerate());
            assert!(model.diagnostics.warnings.is_empty());
            assert!(model.diagnostics.r_squared.is_some());
        }
    }

    #[test]
    fn zero_respondents_is_rejected() {
        assert_eq!(generate_survey(0, 1).unwrap_err().exit_code(), 2);
    }
}
