//! Reporting: the result records of a study run, cross-respondent
//! aggregation and formatted output.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::{
    AttributeFamily, AttributeKey, FitWarning, ImportanceVector, OptimalPricePoint, UtilityModel, WtpVector,
};
use crate::error::ErrorKind;

pub mod format;

pub use format::*;

/// Pipeline step at which a respondent failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Estimation,
    Importance,
    Wtp,
    Market,
}

impl Stage {
    pub fn label(self) -> &'static str {
        match self {
            Stage::Estimation => "estimation",
            Stage::Importance => "importance",
            Stage::Wtp => "wtp",
            Stage::Market => "market",
        }
    }
}

/// Every derived result for one respondent.
#[derive(Debug, Clone, Serialize)]
pub struct RespondentAnalysis {
    pub model: UtilityModel,
    pub importance: ImportanceVector,
    pub wtp: WtpVector,
    pub pricing: OptimalPricePoint,
}

/// Why a respondent is missing from the aggregate output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedRespondent {
    pub respondent: String,
    pub stage: Stage,
    pub kind: ErrorKind,
    pub reason: String,
    /// Fit warnings of the model, when estimation got that far.
    pub warnings: Vec<FitWarning>,
}

/// All computed outputs of a single study run.
#[derive(Debug, Clone, Serialize)]
pub struct StudyReport {
    pub respondents: BTreeMap<String, RespondentAnalysis>,
    pub skipped: Vec<SkippedRespondent>,
    pub summary: StudySummary,
    /// Run-level caveats (e.g. price extrapolation).
    pub notes: Vec<String>,
}

/// Spread of per-respondent optimal prices.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceStats {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

/// Market curve summed over analyzed respondents at one grid price.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatePoint {
    pub price: f64,
    pub mean_share: f64,
    pub total_sales: f64,
    pub total_profit: f64,
}

/// Cross-respondent summary of a study run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudySummary {
    pub respondents_analyzed: usize,
    pub respondents_skipped: usize,
    pub mean_importance: BTreeMap<AttributeFamily, f64>,
    pub mean_wtp: BTreeMap<AttributeKey, f64>,
    pub optimal_price: Option<PriceStats>,
    pub market: Vec<AggregatePoint>,
    /// Highest total profit on the aggregate curve (first-seen on ties).
    pub market_optimum: Option<AggregatePoint>,
}

/// Aggregate per-respondent results over the shared price grid.
pub fn summarize(
    respondents: &BTreeMap<String, RespondentAnalysis>,
    skipped: usize,
    prices: &[f64],
) -> StudySummary {
    let n = respondents.len();

    let mut mean_importance = BTreeMap::new();
    let mut mean_wtp = BTreeMap::new();
    let mut optimal_price = None;
    let mut market = Vec::new();

    if n > 0 {
        let nf = n as f64;
        for family in AttributeFamily::ALL {
            let total: f64 = respondents.values().map(|r| r.importance.share(family)).sum();
            mean_importance.insert(family, total / nf);
        }
        for key in AttributeKey::NON_PRICE {
            let total: f64 = respondents.values().filter_map(|r| r.wtp.value(key)).sum();
            mean_wtp.insert(key, total / nf);
        }

        let optima: Vec<f64> = respondents.values().map(|r| r.pricing.optimal.price).collect();
        optimal_price = Some(PriceStats {
            mean: optima.iter().sum::<f64>() / nf,
            min: optima.iter().copied().fold(f64::INFINITY, f64::min),
            max: optima.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        });

        for (i, &price) in prices.iter().enumerate() {
            let mut share = 0.0;
            let mut sales = 0.0;
            let mut profit = 0.0;
            for r in respondents.values() {
                if let Some(o) = r.pricing.series.get(i) {
                    share += o.share;
                    sales += o.sales;
                    profit += o.profit;
                }
            }
            market.push(AggregatePoint {
                price,
                mean_share: share / nf,
                total_sales: sales,
                total_profit: profit,
            });
        }
    }

    let mut market_optimum: Option<&AggregatePoint> = None;
    for point in &market {
        match market_optimum {
            Some(best) if point.total_profit <= best.total_profit => {}
            _ => market_optimum = Some(point),
        }
    }
    let market_optimum = market_optimum.cloned();

    StudySummary {
        respondents_analyzed: n,
        respondents_skipped: skipped,
        mean_importance,
        mean_wtp,
        optimal_price,
        market,
        market_optimum,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{StudyConfig, UtilityModel};
    use crate::market::MarketSimulator;
    use crate::metrics::{compute_importance, compute_wtp};

    fn analysis(id: &str, brand: f64, price: f64, sim: &MarketSimulator) -> RespondentAnalysis {
        let model = UtilityModel::from_part_worths(
            id,
            5.0,
            &[
                (AttributeKey::Screen75, 1.0),
                (AttributeKey::Resolution4k, 0.5),
                (AttributeKey::Brand, brand),
                (AttributeKey::PriceHigh, price),
            ],
        );
        RespondentAnalysis {
            importance: compute_importance(&model).unwrap(),
            wtp: compute_wtp(&model, 500.0).unwrap(),
            pricing: sim.optimize(&model).unwrap(),
            model,
        }
    }

    #[test]
    fn summary_averages_over_respondents() {
        let sim = MarketSimulator::from_config(&StudyConfig::default()).unwrap();
        let mut respondents = BTreeMap::new();
        respondents.insert("a".to_string(), analysis("a", 1.0, -1.0, &sim));
        respondents.insert("b".to_string(), analysis("b", 0.0, -2.0, &sim));

        let s = summarize(&respondents, 1, sim.prices());
        assert_eq!(s.respondents_analyzed, 2);
        assert_eq!(s.respondents_skipped, 1);

        // Brand WTP: a = 1 * 500 = 500, b = 0.
        assert!((s.mean_wtp[&AttributeKey::Brand] - 250.0).abs() < 1e-9);
        let imp_sum: f64 = s.mean_importance.values().sum();
        assert!((imp_sum - 1.0).abs() < 1e-9);

        assert_eq!(s.market.len(), sim.prices().len());
        let first = &s.market[0];
        let expected: f64 = respondents.values().map(|r| r.pricing.series[0].profit).sum();
        assert!((first.total_profit - expected).abs() < 1e-9);

        let best = s.market_optimum.as_ref().unwrap();
        assert!(s.market.iter().all(|p| p.total_profit <= best.total_profit));
        let stats = s.optimal_price.unwrap();
        assert!(stats.min <= stats.mean && stats.mean <= stats.max);
    }

    #[test]
    fn empty_study_has_no_curve() {
        let s = summarize(&BTreeMap::new(), 4, &[1.0, 2.0]);
        assert_eq!(s.respondents_analyzed, 0);
        assert!(s.market.is_empty());
        assert!(s.market_optimum.is_none());
        assert!(s.optimal_price.is_none());
    }
}
