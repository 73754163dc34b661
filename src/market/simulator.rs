//! Logit market simulation and price optimization.
//!
//! For each candidate focal price:
//! 1. utility of the focal design and both competitors (`design_utility`)
//! 2. logit shares over the three alternatives (no outside good)
//! 3. sales = share × market size, profit = (price − unit cost) × sales
//!
//! The optimum is the strictly highest profit; ties keep the first (lowest)
//! price.

use tracing::debug;

use crate::domain::{FocalDesign, MarketOutcome, OptimalPricePoint, ProductDesign, StudyConfig, UtilityModel};
use crate::error::{AnalysisError, ComputationError, ConfigError};
use crate::market::price_points;
use crate::math::logit_shares;
use crate::models::{PriceScale, design_utility};

/// Validated market scenario shared by every respondent.
#[derive(Debug, Clone)]
pub struct MarketSimulator {
    focal: FocalDesign,
    competitors: [ProductDesign; 2],
    market_size: f64,
    unit_cost: f64,
    scale: PriceScale,
    prices: Vec<f64>,
}

impl MarketSimulator {
    pub fn new(
        focal: FocalDesign,
        competitors: [ProductDesign; 2],
        market_size: f64,
        unit_cost: f64,
        prices: Vec<f64>,
    ) -> Result<Self, ConfigError> {
        if !(market_size.is_finite() && market_size > 0.0) {
            return Err(ConfigError::InvalidMarketSize(market_size));
        }
        if !unit_cost.is_finite() {
            return Err(ConfigError::InvalidUnitCost {
                item: focal.name.clone(),
                value: unit_cost,
            });
        }
        if prices.is_empty() || prices.iter().any(|p| !p.is_finite()) {
            return Err(ConfigError::InvalidPriceGrid {
                low: prices.first().copied().unwrap_or(f64::NAN),
                high: prices.last().copied().unwrap_or(f64::NAN),
                step: f64::NAN,
            });
        }
        for c in &competitors {
            if !c.price.is_finite() {
                return Err(ConfigError::MissingCompetitorPrice {
                    name: c.name.clone(),
                    price: c.price,
                });
            }
        }
        let a = competitors[0].price;
        let b = competitors[1].price;
        let scale = PriceScale::new(a.min(b), a.max(b))?;

        Ok(Self {
            focal,
            competitors,
            market_size,
            unit_cost,
            scale,
            prices,
        })
    }

    /// Build the scenario described by a study configuration.
    pub fn from_config(config: &StudyConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let prices = price_points(&config.price_grid)?;
        Self::new(
            config.focal.clone(),
            config.competitors.clone(),
            config.market_size,
            config.focal_unit_cost(),
            prices,
        )
    }

    pub fn prices(&self) -> &[f64] {
        &self.prices
    }

    pub fn scale(&self) -> PriceScale {
        self.scale
    }

    /// Grid prices that fall outside the competitor anchors (price utility is
    /// extrapolated there).
    pub fn extrapolated_prices(&self) -> Vec<f64> {
        self.prices.iter().copied().filter(|&p| !self.scale.contains(p)).collect()
    }

    /// Market outcome for one respondent at one focal price.
    pub fn outcome_at(&self, model: &UtilityModel, price: f64) -> Result<MarketOutcome, AnalysisError> {
        let focal = self.focal.at_price(price);
        let utilities = [
            design_utility(model, &focal, &self.scale)?,
            design_utility(model, &self.competitors[0], &self.scale)?,
            design_utility(model, &self.competitors[1], &self.scale)?,
        ];
        let shares = logit_shares(&utilities).ok_or(ComputationError::NonFiniteShare { price })?;

        let share = shares[0];
        let sales = share * self.market_size;
        let profit = (price - self.unit_cost) * sales;
        if !profit.is_finite() {
            return Err(ComputationError::NonFinite("profit").into());
        }

        Ok(MarketOutcome {
            price,
            share,
            competitor_shares: shares[1..].to_vec(),
            sales,
            profit,
        })
    }

    /// Sweep the price grid and pick the profit-maximizing price.
    pub fn optimize(&self, model: &UtilityModel) -> Result<OptimalPricePoint, AnalysisError> {
        let series = self
            .prices
            .iter()
            .map(|&price| self.outcome_at(model, price))
            .collect::<Result<Vec<_>, _>>()?;

        let best = select_optimal(&series).ok_or(ConfigError::InvalidPriceGrid {
            low: f64::NAN,
            high: f64::NAN,
            step: f64::NAN,
        })?;
        let optimal = series[best].clone();
        debug!(
            respondent = model.respondent.as_str(),
            price = optimal.price,
            share = optimal.share,
            profit = optimal.profit,
            "optimal price"
        );

        Ok(OptimalPricePoint {
            unit_cost: self.unit_cost,
            optimal,
            series,
        })
    }
}

/// Index of the strictly highest profit; the first one wins ties.
pub fn select_optimal(series: &[MarketOutcome]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, outcome) in series.iter().enumerate() {
        match best {
            Some(b) if outcome.profit <= series[b].profit => {}
            _ => best = Some(i),
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AttributeKey, NonPriceAttributes, PriceGrid};

    fn baseline_competitors() -> [ProductDesign; 2] {
        [
            ProductDesign {
                name: "Low".to_string(),
                attributes: NonPriceAttributes::default(),
                price: 2000.0,
            },
            ProductDesign {
                name: "High".to_string(),
                attributes: NonPriceAttributes::default(),
                price: 2500.0,
            },
        ]
    }

    fn focal_85() -> FocalDesign {
        FocalDesign {
            name: "Focal".to_string(),
            attributes: NonPriceAttributes {
                screen_85: true,
                ..NonPriceAttributes::default()
            },
        }
    }

    fn grid() -> Vec<f64> {
        price_points(&PriceGrid { low: 1500.0, high: 2600.0, step: 100.0 }).unwrap()
    }

    #[test]
    fn shares_sum_to_one_at_every_price() {
        let sim = MarketSimulator::new(focal_85(), baseline_competitors(), 100.0, 1000.0, grid()).unwrap();
        let model = UtilityModel::from_part_worths(
            "r",
            3.0,
            &[(AttributeKey::Screen85, 0.7), (AttributeKey::PriceHigh, -1.3)],
        );
        let result = sim.optimize(&model).unwrap();
        assert_eq!(result.series.len(), 12);
        for o in &result.series {
            let total = o.share + o.competitor_shares.iter().sum::<f64>();
            assert!((total - 1.0).abs() < 1e-9);
            assert!((0.0..=1.0).contains(&o.share));
            assert!((o.sales - o.share * 100.0).abs() < 1e-9);
            assert!((o.profit - (o.price - 1000.0) * o.sales).abs() < 1e-9);
        }
    }

    #[test]
    fn share_is_non_increasing_when_price_hurts() {
        let sim = MarketSimulator::new(focal_85(), baseline_competitors(), 100.0, 1000.0, grid()).unwrap();
        let model = UtilityModel::from_part_worths(
            "r",
            0.0,
            &[(AttributeKey::Screen85, 0.4), (AttributeKey::PriceHigh, -2.0)],
        );
        let result = sim.optimize(&model).unwrap();
        for pair in result.series.windows(2) {
            assert!(pair[1].share <= pair[0].share);
        }
    }

    #[test]
    fn picks_interior_profit_peak() {
        // With b_price = -1 and unit cost 1000, the first-order condition
        // 1 + (p - c) * (b / 500) * (1 - s) = 0 holds at p = 2000 when s = 1/2,
        // i.e. exp(b85) = 1 + exp(-1).
        let b85 = (1.0 + (-1.0_f64).exp()).ln();
        let model = UtilityModel::from_part_worths(
            "synthetic",
            0.0,
            &[(AttributeKey::Screen85, b85), (AttributeKey::PriceHigh, -1.0)],
        );
        let sim = MarketSimulator::new(focal_85(), baseline_competitors(), 100.0, 1000.0, grid()).unwrap();

        let result = sim.optimize(&model).unwrap();
        assert_eq!(result.optimal.price, 2000.0);
        assert!((result.optimal.share - 0.5).abs() < 1e-12);
        assert!((result.optimal.profit - 1000.0 * 100.0 * 0.5).abs() < 1e-9);

        let max = result.series.iter().map(|o| o.profit).fold(f64::NEG_INFINITY, f64::max);
        assert_eq!(max, result.optimal.profit);
    }

    #[test]
    fn ties_keep_the_lowest_price() {
        let outcome = |price: f64, profit: f64| MarketOutcome {
            price,
            share: 0.5,
            competitor_shares: vec![0.25, 0.25],
            sales: 50.0,
            profit,
        };
        let series = vec![
            outcome(1500.0, 10.0),
            outcome(1600.0, 30.0),
            outcome(1700.0, 30.0),
            outcome(1800.0, 20.0),
        ];
        assert_eq!(select_optimal(&series), Some(1));
        assert_eq!(select_optimal(&[]), None);
    }

    #[test]
    fn from_config_rejects_invalid_grid() {
        let mut config = StudyConfig::default();
        config.price_grid.low = 3000.0;
        assert!(matches!(
            MarketSimulator::from_config(&config),
            Err(ConfigError::InvalidPriceGrid { .. })
        ));
    }

    #[test]
    fn default_grid_extrapolates_beyond_competitor_anchors() {
        let sim = MarketSimulator::from_config(&StudyConfig::default()).unwrap();
        assert_eq!(sim.extrapolated_prices(), vec![1500.0, 1600.0, 1700.0, 1800.0, 1900.0, 2600.0]);
    }

    #[test]
    fn degenerate_model_is_rejected() {
        let sim = MarketSimulator::from_config(&StudyConfig::default()).unwrap();
        let mut model = UtilityModel::from_part_worths("r", 0.0, &[(AttributeKey::PriceHigh, -1.0)]);
        model
            .part_worths
            .insert(AttributeKey::Screen75, crate::domain::Coefficient::undefined());
        assert!(matches!(sim.optimize(&model), Err(AnalysisError::Data(_))));
    }
}
