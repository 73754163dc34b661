//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during estimation and simulation
//! - exported to JSON/CSV
//! - handed to presentation code without re-deriving anything

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::DataError;

/// One binary attribute indicator of the study.
///
/// Every join between part-worths, product designs and cost tables goes through
/// this key; nothing downstream of ingest looks attributes up by column name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeKey {
    /// 75" screen, relative to the 65" baseline.
    Screen75,
    /// 85" screen, relative to the 65" baseline.
    Screen85,
    Resolution4k,
    Brand,
    /// High price tier, relative to low.
    PriceHigh,
}

impl AttributeKey {
    pub const ALL: [AttributeKey; 5] = [
        AttributeKey::Screen75,
        AttributeKey::Screen85,
        AttributeKey::Resolution4k,
        AttributeKey::Brand,
        AttributeKey::PriceHigh,
    ];

    /// Keys that carry a willingness-to-pay value.
    pub const NON_PRICE: [AttributeKey; 4] = [
        AttributeKey::Screen75,
        AttributeKey::Screen85,
        AttributeKey::Resolution4k,
        AttributeKey::Brand,
    ];

    /// Fixed survey column name.
    pub fn column_name(self) -> &'static str {
        match self {
            AttributeKey::Screen75 => "screen_75",
            AttributeKey::Screen85 => "screen_85",
            AttributeKey::Resolution4k => "resolution_4k",
            AttributeKey::Brand => "brand",
            AttributeKey::PriceHigh => "price_high",
        }
    }

    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            AttributeKey::Screen75 => "75\" screen",
            AttributeKey::Screen85 => "85\" screen",
            AttributeKey::Resolution4k => "4K resolution",
            AttributeKey::Brand => "Brand",
            AttributeKey::PriceHigh => "High price",
        }
    }
}

impl fmt::Display for AttributeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

/// Attribute family used for importance scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeFamily {
    ScreenSize,
    Resolution,
    Brand,
    Price,
}

impl AttributeFamily {
    pub const ALL: [AttributeFamily; 4] = [
        AttributeFamily::ScreenSize,
        AttributeFamily::Resolution,
        AttributeFamily::Brand,
        AttributeFamily::Price,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            AttributeFamily::ScreenSize => "Screen size",
            AttributeFamily::Resolution => "Resolution",
            AttributeFamily::Brand => "Brand",
            AttributeFamily::Price => "Price",
        }
    }
}

/// Non-price attribute bundle of a product.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NonPriceAttributes {
    pub screen_75: bool,
    pub screen_85: bool,
    pub resolution_4k: bool,
    pub brand: bool,
}

impl NonPriceAttributes {
    /// Indicator value for a non-price key. `PriceHigh` is not part of this bundle.
    pub fn has(&self, key: AttributeKey) -> bool {
        match key {
            AttributeKey::Screen75 => self.screen_75,
            AttributeKey::Screen85 => self.screen_85,
            AttributeKey::Resolution4k => self.resolution_4k,
            AttributeKey::Brand => self.brand,
            AttributeKey::PriceHigh => false,
        }
    }

    /// At most one non-baseline screen size may be set.
    pub fn is_consistent(&self) -> bool {
        !(self.screen_75 && self.screen_85)
    }
}

/// One product profile shown to respondents (one survey row).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeProfile {
    #[serde(flatten)]
    pub attributes: NonPriceAttributes,
    pub price_high: bool,
}

impl AttributeProfile {
    pub fn has(&self, key: AttributeKey) -> bool {
        match key {
            AttributeKey::PriceHigh => self.price_high,
            other => self.attributes.has(other),
        }
    }

    pub fn indicator(&self, key: AttributeKey) -> f64 {
        if self.has(key) { 1.0 } else { 0.0 }
    }
}

/// Stated preferences of one respondent, aligned with the survey profiles.
///
/// `None` marks a missing or non-numeric cell; the estimator rejects the
/// respondent rather than guessing a value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreferenceColumn {
    pub respondent: String,
    pub scores: Vec<Option<f64>>,
}

/// The rectangular survey dataset: shared profiles plus one preference column
/// per respondent. Never mutated by the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SurveyTable {
    pub profiles: Vec<AttributeProfile>,
    pub preferences: Vec<PreferenceColumn>,
}

impl SurveyTable {
    /// Table-wide checks. Failures here affect every respondent.
    pub fn validate(&self) -> Result<(), DataError> {
        if self.profiles.is_empty() {
            return Err(DataError::EmptySurvey);
        }
        if let Some(row) = self.profiles.iter().position(|p| !p.attributes.is_consistent()) {
            return Err(DataError::ScreenSizeConflict { row: row + 1 });
        }
        for column in &self.preferences {
            if column.scores.len() != self.profiles.len() {
                return Err(DataError::LengthMismatch {
                    column: column.respondent.clone(),
                    expected: self.profiles.len(),
                    found: column.scores.len(),
                });
            }
        }
        Ok(())
    }
}

/// Non-fatal fit-quality finding for one respondent.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FitWarning {
    /// Indicator never varies; its part-worth is left undefined.
    ConstantIndicator { key: AttributeKey },
    /// Design matrix is singular; every estimate is left undefined.
    RankDeficient { rank: usize, columns: usize },
    /// Full rank but numerically fragile.
    IllConditioned { condition_number: f64 },
    /// As many parameters as observations: exact fit, no standard errors.
    NoResidualDegreesOfFreedom,
}

impl fmt::Display for FitWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FitWarning::ConstantIndicator { key } => {
                write!(f, "indicator `{key}` is constant; part-worth undefined")
            }
            FitWarning::RankDeficient { rank, columns } => {
                write!(f, "design matrix rank {rank} < {columns} columns; estimates undefined")
            }
            FitWarning::IllConditioned { condition_number } => {
                write!(f, "design matrix is ill-conditioned (condition number {condition_number:.3e})")
            }
            FitWarning::NoResidualDegreesOfFreedom => {
                write!(f, "no residual degrees of freedom; standard errors undefined")
            }
        }
    }
}

/// One estimated regression coefficient.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Coefficient {
    /// `None` when the fit could not identify this term.
    pub estimate: Option<f64>,
    pub std_error: Option<f64>,
    pub t_stat: Option<f64>,
}

impl Coefficient {
    pub fn undefined() -> Self {
        Self::default()
    }
}

/// Goodness-of-fit diagnostics of one respondent's regression.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FitDiagnostics {
    pub observations: usize,
    pub parameters: usize,
    pub residual_df: usize,
    pub sse: f64,
    pub r_squared: Option<f64>,
    pub adj_r_squared: Option<f64>,
    pub residual_std_error: Option<f64>,
    pub f_statistic: Option<f64>,
    pub condition_number: f64,
    pub warnings: Vec<FitWarning>,
}

impl FitDiagnostics {
    /// Diagnostics for a model that was never fitted from data.
    pub fn empty() -> Self {
        Self {
            observations: 0,
            parameters: 0,
            residual_df: 0,
            sse: 0.0,
            r_squared: None,
            adj_r_squared: None,
            residual_std_error: None,
            f_statistic: None,
            condition_number: 1.0,
            warnings: Vec::new(),
        }
    }
}

/// Fitted part-worths of one respondent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UtilityModel {
    pub respondent: String,
    /// Utility of the all-baseline profile (65", non-4K, no brand, low price).
    pub intercept: Coefficient,
    pub part_worths: BTreeMap<AttributeKey, Coefficient>,
    pub diagnostics: FitDiagnostics,
}

impl UtilityModel {
    /// Build a model from known part-worths (synthetic respondents, tests).
    ///
    /// Keys not listed get an estimate of zero.
    pub fn from_part_worths(
        respondent: impl Into<String>,
        intercept: f64,
        part_worths: &[(AttributeKey, f64)],
    ) -> Self {
        let mut map: BTreeMap<AttributeKey, Coefficient> = AttributeKey::ALL
            .iter()
            .map(|&k| (k, Coefficient { estimate: Some(0.0), ..Coefficient::default() }))
            .collect();
        for &(key, value) in part_worths {
            map.insert(key, Coefficient { estimate: Some(value), ..Coefficient::default() });
        }
        Self {
            respondent: respondent.into(),
            intercept: Coefficient { estimate: Some(intercept), ..Coefficient::default() },
            part_worths: map,
            diagnostics: FitDiagnostics::empty(),
        }
    }

    /// Estimated part-worth, or a data error if the fit left it undefined.
    pub fn part_worth(&self, key: AttributeKey) -> Result<f64, DataError> {
        self.part_worths
            .get(&key)
            .and_then(|c| c.estimate)
            .ok_or(DataError::UndefinedPartWorth(key))
    }

    pub fn intercept(&self) -> Result<f64, DataError> {
        self.intercept.estimate.ok_or(DataError::UndefinedIntercept)
    }

    /// True if any term could not be estimated.
    pub fn is_degenerate(&self) -> bool {
        self.intercept.estimate.is_none() || self.part_worths.values().any(|c| c.estimate.is_none())
    }
}

/// Normalized importance per attribute family. Shares sum to 1.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportanceVector {
    pub ranges: BTreeMap<AttributeFamily, f64>,
    pub shares: BTreeMap<AttributeFamily, f64>,
}

impl ImportanceVector {
    pub fn share(&self, family: AttributeFamily) -> f64 {
        self.shares.get(&family).copied().unwrap_or(0.0)
    }
}

/// Dollar willingness to pay per non-price attribute level.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WtpVector {
    /// Dollars per unit of utility.
    pub one_util_value: f64,
    pub values: BTreeMap<AttributeKey, f64>,
}

impl WtpVector {
    pub fn value(&self, key: AttributeKey) -> Option<f64> {
        self.values.get(&key).copied()
    }
}

/// A named product with fixed attributes and a price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDesign {
    pub name: String,
    #[serde(flatten)]
    pub attributes: NonPriceAttributes,
    pub price: f64,
}

/// The product being priced: fixed attributes, swept price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FocalDesign {
    pub name: String,
    #[serde(flatten)]
    pub attributes: NonPriceAttributes,
}

impl FocalDesign {
    pub fn at_price(&self, price: f64) -> ProductDesign {
        ProductDesign {
            name: self.name.clone(),
            attributes: self.attributes,
            price,
        }
    }
}

/// Simulated market result for one candidate focal price.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketOutcome {
    pub price: f64,
    /// Focal logit share in `[0, 1]`.
    pub share: f64,
    /// Shares of the competitors, in catalog order.
    pub competitor_shares: Vec<f64>,
    pub sales: f64,
    pub profit: f64,
}

/// Full price sweep for one respondent and its profit-maximizing point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptimalPricePoint {
    pub unit_cost: f64,
    pub optimal: MarketOutcome,
    pub series: Vec<MarketOutcome>,
}
