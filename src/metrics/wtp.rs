//! Willingness to pay.
//!
//! The price indicator's part-worth is the utility of a `reference_price_differential`
//! price increase, so one unit of utility is worth `differential / |b_price|`
//! dollars. Each non-price part-worth times that factor is its WTP. Signs are
//! kept: a disliked level has negative WTP.

use std::collections::BTreeMap;

use crate::domain::{AttributeKey, UtilityModel, WtpVector};
use crate::error::{AnalysisError, ComputationError, ConfigError};

/// Price coefficients with magnitude at or below this are treated as zero
/// (regression round-off on a price-insensitive respondent).
const MIN_PRICE_COEFFICIENT: f64 = 1e-9;

pub fn compute_wtp(model: &UtilityModel, reference_price_differential: f64) -> Result<WtpVector, AnalysisError> {
    let d = reference_price_differential;
    if !(d.is_finite() && d > 0.0) {
        return Err(ConfigError::InvalidReferenceDifferential(d).into());
    }

    let price = model.part_worth(AttributeKey::PriceHigh)?;
    if price.abs() <= MIN_PRICE_COEFFICIENT {
        return Err(ConfigError::ZeroPriceCoefficient.into());
    }
    let one_util_value = d / price.abs();

    let mut values = BTreeMap::new();
    for key in AttributeKey::NON_PRICE {
        let wtp = model.part_worth(key)? * one_util_value;
        if !wtp.is_finite() {
            return Err(ComputationError::NonFinite("willingness to pay").into());
        }
        values.insert(key, wtp);
    }

    Ok(WtpVector { one_util_value, values })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_utility_to_dollars() {
        let model = UtilityModel::from_part_worths(
            "r",
            0.0,
            &[(AttributeKey::PriceHigh, -0.004), (AttributeKey::Resolution4k, 0.002)],
        );
        let wtp = compute_wtp(&model, 500.0).unwrap();
        assert!((wtp.one_util_value - 125_000.0).abs() < 1e-6);
        assert!((wtp.value(AttributeKey::Resolution4k).unwrap() - 250.0).abs() < 1e-9);
        assert_eq!(wtp.value(AttributeKey::PriceHigh), None);
    }

    #[test]
    fn keeps_sign_of_disliked_levels() {
        let model = UtilityModel::from_part_worths(
            "r",
            0.0,
            &[(AttributeKey::PriceHigh, -2.0), (AttributeKey::Screen85, -1.0), (AttributeKey::Brand, 0.5)],
        );
        let wtp = compute_wtp(&model, 500.0).unwrap();
        assert!((wtp.value(AttributeKey::Screen85).unwrap() + 250.0).abs() < 1e-9);
        assert!((wtp.value(AttributeKey::Brand).unwrap() - 125.0).abs() < 1e-9);
    }

    #[test]
    fn positive_price_coefficient_uses_magnitude() {
        let model = UtilityModel::from_part_worths(
            "r",
            0.0,
            &[(AttributeKey::PriceHigh, 4.0), (AttributeKey::Brand, 2.0)],
        );
        let wtp = compute_wtp(&model, 500.0).unwrap();
        assert!((wtp.value(AttributeKey::Brand).unwrap() - 250.0).abs() < 1e-9);
    }

    #[test]
    fn zero_price_coefficient_fails_explicitly() {
        let model = UtilityModel::from_part_worths("r", 0.0, &[(AttributeKey::Brand, 1.0)]);
        let err = compute_wtp(&model, 500.0).unwrap_err();
        assert_eq!(err, AnalysisError::Config(ConfigError::ZeroPriceCoefficient));
    }

    #[test]
    fn rejects_non_positive_differential() {
        let model = UtilityModel::from_part_worths("r", 0.0, &[(AttributeKey::PriceHigh, -1.0)]);
        assert!(matches!(
            compute_wtp(&model, 0.0),
            Err(AnalysisError::Config(ConfigError::InvalidReferenceDifferential(_)))
        ));
    }
}
