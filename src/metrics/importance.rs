//! Attribute importance from part-worth ranges.
//!
//! Range per family:
//! - screen size: spread of `{intercept, intercept + b75, intercept + b85}`
//!   (the intercept stands in for the 65" baseline)
//! - resolution, brand, price: `|b|` of the single indicator
//!
//! Importance is each range over the sum of all four.

use std::collections::BTreeMap;

use crate::domain::{AttributeFamily, AttributeKey, ImportanceVector, UtilityModel};
use crate::error::{AnalysisError, ComputationError};

/// Total range at or below this counts as no attribute sensitivity. OLS on a
/// constant response returns round-off, not exact zeros.
const ZERO_RANGE: f64 = 1e-9;

pub fn compute_importance(model: &UtilityModel) -> Result<ImportanceVector, AnalysisError> {
    let intercept = model.intercept()?;
    let screen = [
        intercept,
        intercept + model.part_worth(AttributeKey::Screen75)?,
        intercept + model.part_worth(AttributeKey::Screen85)?,
    ];
    let screen_max = screen.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let screen_min = screen.iter().copied().fold(f64::INFINITY, f64::min);

    let ranges = BTreeMap::from([
        (AttributeFamily::ScreenSize, screen_max - screen_min),
        (AttributeFamily::Resolution, model.part_worth(AttributeKey::Resolution4k)?.abs()),
        (AttributeFamily::Brand, model.part_worth(AttributeKey::Brand)?.abs()),
        (AttributeFamily::Price, model.part_worth(AttributeKey::PriceHigh)?.abs()),
    ]);

    let total: f64 = ranges.values().sum();
    if !total.is_finite() {
        return Err(ComputationError::NonFinite("utility range").into());
    }
    if total <= ZERO_RANGE {
        return Err(ComputationError::ZeroUtilityRange.into());
    }

    let shares = ranges.iter().map(|(&family, &r)| (family, r / total)).collect();
    Ok(ImportanceVector { ranges, shares })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DataError;

    #[test]
    fn shares_are_non_negative_and_sum_to_one() {
        let model = UtilityModel::from_part_worths(
            "r",
            7.0,
            &[
                (AttributeKey::Screen75, 2.0),
                (AttributeKey::Screen85, -1.0),
                (AttributeKey::Resolution4k, 1.5),
                (AttributeKey::Brand, -0.5),
                (AttributeKey::PriceHigh, -3.0),
            ],
        );
        let imp = compute_importance(&model).unwrap();

        // Screen: {7, 9, 6} -> range 3. Total = 3 + 1.5 + 0.5 + 3 = 8.
        assert!((imp.ranges[&AttributeFamily::ScreenSize] - 3.0).abs() < 1e-12);
        assert!((imp.share(AttributeFamily::Price) - 3.0 / 8.0).abs() < 1e-12);
        assert!((imp.share(AttributeFamily::Brand) - 0.5 / 8.0).abs() < 1e-12);

        let sum: f64 = imp.shares.values().sum();
        assert!((sum - 1.0).abs() < 1e-9);
        assert!(imp.shares.values().all(|&s| s >= 0.0));
    }

    #[test]
    fn screen_range_includes_baseline() {
        // Both larger sizes are better than 65", so the baseline is the minimum.
        let model = UtilityModel::from_part_worths(
            "r",
            1.0,
            &[(AttributeKey::Screen75, 2.0), (AttributeKey::Screen85, 3.0), (AttributeKey::PriceHigh, -1.0)],
        );
        let imp = compute_importance(&model).unwrap();
        assert!((imp.ranges[&AttributeFamily::ScreenSize] - 3.0).abs() < 1e-12);
        assert!((imp.share(AttributeFamily::ScreenSize) - 0.75).abs() < 1e-12);
    }

    #[test]
    fn zero_sensitivity_fails_explicitly() {
        let model = UtilityModel::from_part_worths("flat", 5.0, &[]);
        let err = compute_importance(&model).unwrap_err();
        assert_eq!(err, AnalysisError::Computation(ComputationError::ZeroUtilityRange));
    }

    #[test]
    fn degenerate_part_worth_is_not_treated_as_zero() {
        let mut model = UtilityModel::from_part_worths("r", 1.0, &[(AttributeKey::PriceHigh, -1.0)]);
        model
            .part_worths
            .insert(AttributeKey::Brand, crate::domain::Coefficient::undefined());
        let err = compute_importance(&model).unwrap_err();
        assert_eq!(err, AnalysisError::Data(DataError::UndefinedPartWorth(AttributeKey::Brand)));
    }
}
