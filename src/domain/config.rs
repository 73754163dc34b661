//! Study configuration.
//!
//! Every number that shapes the pricing analysis lives here and is passed
//! explicitly into the calculators. `StudyConfig::default()` reproduces the
//! TV study the tool was built for; a JSON file can override any field.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{AttributeKey, FocalDesign, NonPriceAttributes, ProductDesign};
use crate::error::ConfigError;

/// Inclusive price range swept for the focal design.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceGrid {
    pub low: f64,
    pub high: f64,
    pub step: f64,
}

/// Upper bound on the number of swept prices.
pub const MAX_GRID_POINTS: usize = 1_000_000;

/// Slack for `(high - low) / step` landing just below an integer.
const STEP_EPS: f64 = 1e-9;

impl PriceGrid {
    /// Number of grid points, `floor((high - low) / step) + 1`.
    ///
    /// Fails for non-finite bounds, a non-positive step, `low > high`, or a
    /// span that would need more than `MAX_GRID_POINTS` points.
    pub fn point_count(&self) -> Result<usize, ConfigError> {
        let invalid = || ConfigError::InvalidPriceGrid {
            low: self.low,
            high: self.high,
            step: self.step,
        };
        let (low, high, step) = (self.low, self.high, self.step);
        if !(low.is_finite() && high.is_finite() && step.is_finite() && step > 0.0 && low <= high) {
            return Err(invalid());
        }
        let steps = ((high - low) / step + STEP_EPS).floor();
        if !steps.is_finite() || steps >= MAX_GRID_POINTS as f64 {
            return Err(invalid());
        }
        Ok(steps as usize + 1)
    }
}

impl Default for PriceGrid {
    fn default() -> Self {
        Self {
            low: 1500.0,
            high: 2600.0,
            step: 100.0,
        }
    }
}

/// Unit cost of the focal product: a base cost plus per-level additions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitCostTable {
    pub base: f64,
    pub additions: BTreeMap<AttributeKey, f64>,
}

impl Default for UnitCostTable {
    fn default() -> Self {
        Self {
            base: 1000.0,
            additions: BTreeMap::from([
                (AttributeKey::Screen75, 500.0),
                (AttributeKey::Screen85, 1000.0),
                (AttributeKey::Resolution4k, 250.0),
                (AttributeKey::Brand, 250.0),
            ]),
        }
    }
}

impl UnitCostTable {
    /// Cost of building one unit with the given attributes.
    pub fn unit_cost(&self, attributes: &NonPriceAttributes) -> f64 {
        self.base
            + AttributeKey::NON_PRICE
                .iter()
                .filter(|&&k| attributes.has(k))
                .map(|k| self.additions.get(k).copied().unwrap_or(0.0))
                .sum::<f64>()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !self.base.is_finite() {
            return Err(ConfigError::InvalidUnitCost {
                item: "base".to_string(),
                value: self.base,
            });
        }
        for (key, &value) in &self.additions {
            if !value.is_finite() {
                return Err(ConfigError::InvalidUnitCost {
                    item: key.to_string(),
                    value,
                });
            }
        }
        Ok(())
    }
}

/// All recognized options of a study run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudyConfig {
    /// Dollar gap assumed to match the low→high price-indicator swing.
    pub reference_price_differential: f64,
    pub unit_costs: UnitCostTable,
    /// Total addressable buyers.
    pub market_size: f64,
    pub price_grid: PriceGrid,
    pub focal: FocalDesign,
    /// Exactly two competitors; their prices anchor the price-utility scale.
    pub competitors: [ProductDesign; 2],
    /// Substring (case-insensitive) identifying preference-rank columns.
    pub preference_marker: String,
}

impl Default for StudyConfig {
    fn default() -> Self {
        Self {
            reference_price_differential: 500.0,
            unit_costs: UnitCostTable::default(),
            market_size: 100.0,
            price_grid: PriceGrid::default(),
            focal: FocalDesign {
                name: "Focal".to_string(),
                attributes: NonPriceAttributes {
                    screen_75: true,
                    resolution_4k: true,
                    ..NonPriceAttributes::default()
                },
            },
            competitors: [
                ProductDesign {
                    name: "Sony".to_string(),
                    attributes: NonPriceAttributes {
                        screen_75: true,
                        resolution_4k: true,
                        brand: true,
                        ..NonPriceAttributes::default()
                    },
                    price: 2500.0,
                },
                ProductDesign {
                    name: "Sharp".to_string(),
                    attributes: NonPriceAttributes {
                        screen_75: true,
                        resolution_4k: true,
                        ..NonPriceAttributes::default()
                    },
                    price: 2000.0,
                },
            ],
            preference_marker: "rank".to_string(),
        }
    }
}

impl StudyConfig {
    /// Run-wide checks. A failure here makes every respondent's output invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let d = self.reference_price_differential;
        if !(d.is_finite() && d > 0.0) {
            return Err(ConfigError::InvalidReferenceDifferential(d));
        }
        if !(self.market_size.is_finite() && self.market_size > 0.0) {
            return Err(ConfigError::InvalidMarketSize(self.market_size));
        }
        self.price_grid.point_count()?;
        self.unit_costs.validate()?;

        if !self.focal.attributes.is_consistent() {
            return Err(ConfigError::InvalidDesign(self.focal.name.clone()));
        }
        for c in &self.competitors {
            if !c.attributes.is_consistent() {
                return Err(ConfigError::InvalidDesign(c.name.clone()));
            }
            if !(c.price.is_finite() && c.price > 0.0) {
                return Err(ConfigError::MissingCompetitorPrice {
                    name: c.name.clone(),
                    price: c.price,
                });
            }
        }
        if self.competitors[0].price == self.competitors[1].price {
            return Err(ConfigError::CoincidentCompetitorPrices(self.competitors[0].price));
        }
        Ok(())
    }

    pub fn focal_unit_cost(&self) -> f64 {
        self.unit_costs.unit_cost(&self.focal.attributes)
    }
}
