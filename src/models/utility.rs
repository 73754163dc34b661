//! Utility evaluation for survey profiles and product designs.
//!
//! Estimation and simulation rely on two primitive operations:
//! - build a design row for a survey profile (for OLS)
//! - evaluate the total utility of a priced product design (for logit shares)

use crate::domain::{AttributeKey, AttributeProfile, ProductDesign, UtilityModel};
use crate::error::{ConfigError, DataError};

/// Fill a design row for a survey profile.
///
/// The row includes the constant term first (intercept), then one column per
/// key in `keys`, in order.
///
/// # Panics
/// Panics if `out.len() != keys.len() + 1`. Callers should size the row correctly.
pub fn fill_design_row(profile: &AttributeProfile, keys: &[AttributeKey], out: &mut [f64]) {
    out[0] = 1.0;
    for (slot, &key) in out[1..].iter_mut().zip(keys) {
        *slot = profile.indicator(key);
    }
}

/// Linear price-utility scale anchored at two reference prices.
///
/// `reference_low` maps to 0 and `reference_high` maps to 1 times the price
/// coefficient. Prices outside the anchors extrapolate along the same line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceScale {
    pub reference_low: f64,
    pub reference_high: f64,
}

impl PriceScale {
    pub fn new(reference_low: f64, reference_high: f64) -> Result<Self, ConfigError> {
        if !(reference_low.is_finite() && reference_high.is_finite()) {
            return Err(ConfigError::MissingCompetitorPrice {
                name: "reference".to_string(),
                price: if reference_low.is_finite() { reference_high } else { reference_low },
            });
        }
        if reference_high <= reference_low {
            return Err(ConfigError::CoincidentCompetitorPrices(reference_low));
        }
        Ok(Self {
            reference_low,
            reference_high,
        })
    }

    /// Position of `price` on the scale (0 at the low anchor, 1 at the high one).
    pub fn position(&self, price: f64) -> f64 {
        (price - self.reference_low) / (self.reference_high - self.reference_low)
    }

    pub fn contains(&self, price: f64) -> bool {
        price >= self.reference_low && price <= self.reference_high
    }

    pub fn price_utility(&self, price_coefficient: f64, price: f64) -> f64 {
        price_coefficient * self.position(price)
    }
}

/// Total utility of a product design for one respondent.
///
/// `intercept + Σ part_worth(k) · indicator(k) + price term`, where the price
/// term comes from `scale` instead of the binary price indicator.
pub fn design_utility(
    model: &UtilityModel,
    design: &ProductDesign,
    scale: &PriceScale,
) -> Result<f64, DataError> {
    let mut u = model.intercept()?;
    for key in AttributeKey::NON_PRICE {
        if design.attributes.has(key) {
            u += model.part_worth(key)?;
        }
    }
    let price_coefficient = model.part_worth(AttributeKey::PriceHigh)?;
    Ok(u + scale.price_utility(price_coefficient, design.price))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NonPriceAttributes;

    fn design(price: f64) -> ProductDesign {
        ProductDesign {
            name: "X".to_string(),
            attributes: NonPriceAttributes {
                screen_85: true,
                brand: true,
                ..NonPriceAttributes::default()
            },
            price,
        }
    }

    #[test]
    fn design_row_puts_intercept_first() {
        let profile = AttributeProfile {
            attributes: NonPriceAttributes { resolution_4k: true, ..NonPriceAttributes::default() },
            price_high: true,
        };
        let keys = [AttributeKey::Resolution4k, AttributeKey::Brand, AttributeKey::PriceHigh];
        let mut row = [0.0; 4];
        fill_design_row(&profile, &keys, &mut row);
        assert_eq!(row, [1.0, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn reference_prices_reproduce_anchor_utilities() {
        let model = UtilityModel::from_part_worths(
            "r",
            2.0,
            &[
                (AttributeKey::Screen85, 1.5),
                (AttributeKey::Brand, 0.75),
                (AttributeKey::PriceHigh, -0.8),
            ],
        );
        let scale = PriceScale::new(2000.0, 2500.0).unwrap();

        let at_low = design_utility(&model, &design(2000.0), &scale).unwrap();
        let at_high = design_utility(&model, &design(2500.0), &scale).unwrap();

        assert!((at_low - (2.0 + 1.5 + 0.75)).abs() < 1e-12);
        assert!((at_high - at_low - (-0.8)).abs() < 1e-12);
        assert_eq!(scale.price_utility(-0.8, 2000.0), 0.0);
        assert!((scale.price_utility(-0.8, 2500.0) + 0.8).abs() < 1e-12);
    }

    #[test]
    fn prices_outside_anchors_extrapolate_linearly() {
        let scale = PriceScale::new(2000.0, 2500.0).unwrap();
        assert!((scale.position(1500.0) + 1.0).abs() < 1e-12);
        assert!((scale.position(2600.0) - 1.2).abs() < 1e-12);
        assert!(!scale.contains(1500.0));
        assert!(scale.contains(2250.0));
    }

    #[test]
    fn scale_requires_distinct_anchors() {
        assert!(PriceScale::new(2000.0, 2000.0).is_err());
        assert!(PriceScale::new(f64::NAN, 2000.0).is_err());
    }

    #[test]
    fn undefined_price_coefficient_propagates() {
        let mut model = UtilityModel::from_part_worths("r", 0.0, &[]);
        model
            .part_worths
            .insert(AttributeKey::PriceHigh, crate::domain::Coefficient::undefined());
        let scale = PriceScale::new(2000.0, 2500.0).unwrap();
        assert_eq!(
            design_utility(&model, &design(2000.0), &scale),
            Err(DataError::UndefinedPartWorth(AttributeKey::PriceHigh))
        );
    }
}
