//! Error types.
//!
//! Two layers:
//!
//! - [`AnalysisError`]: what the analytical pipeline returns. Split into data,
//!   configuration and computation failures so the orchestrator can decide what
//!   is per-respondent (skip and report) and what is fatal (abort the run).
//! - [`AppError`]: what the binary returns. Carries an exit code and a message.

use crate::domain::AttributeKey;

/// Failures in the input survey data or in a respondent's fitted model.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DataError {
    #[error("missing required column `{0}`")]
    MissingColumn(String),

    #[error("no preference columns match marker `{0}`")]
    NoPreferenceColumns(String),

    #[error("line {line}: {message}")]
    Csv { line: usize, message: String },

    #[error("survey has no product profiles")]
    EmptySurvey,

    #[error("line {line}: column `{column}` must be 0 or 1, found `{value}`")]
    InvalidIndicator {
        line: usize,
        column: String,
        value: String,
    },

    #[error("profile {row}: `screen_75` and `screen_85` are both set")]
    ScreenSizeConflict { row: usize },

    #[error("preference column `{column}` has {found} values for {expected} profiles")]
    LengthMismatch {
        column: String,
        expected: usize,
        found: usize,
    },

    #[error("respondent `{respondent}`: missing or non-numeric preference at profile {row}")]
    MissingPreference { respondent: String, row: usize },

    #[error(
        "respondent `{respondent}`: {observations} observations cannot identify {parameters} parameters"
    )]
    InsufficientObservations {
        respondent: String,
        observations: usize,
        parameters: usize,
    },

    #[error("respondent `{respondent}`: no attribute indicator varies across profiles")]
    NoAttributeVariation { respondent: String },

    #[error("duplicate respondent `{0}`")]
    DuplicateRespondent(String),

    #[error("part-worth for `{0}` is undefined (degenerate fit)")]
    UndefinedPartWorth(AttributeKey),

    #[error("intercept is undefined (degenerate fit)")]
    UndefinedIntercept,
}

/// Invalid run configuration, or a respondent whose model makes a configured
/// conversion undefined.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid price grid: low={low}, high={high}, step={step} (need finite, step > 0, low <= high)")]
    InvalidPriceGrid { low: f64, high: f64, step: f64 },

    #[error("price coefficient is zero; willingness to pay is undefined")]
    ZeroPriceCoefficient,

    #[error("reference price differential must be finite and > 0, got {0}")]
    InvalidReferenceDifferential(f64),

    #[error("market size must be finite and > 0, got {0}")]
    InvalidMarketSize(f64),

    #[error("competitor `{name}` has no usable price ({price})")]
    MissingCompetitorPrice { name: String, price: f64 },

    #[error("competitor prices must differ to anchor the price scale (both {0})")]
    CoincidentCompetitorPrices(f64),

    #[error("unit cost for `{item}` must be finite, got {value}")]
    InvalidUnitCost { item: String, value: f64 },

    #[error("design `{0}` sets both `screen_75` and `screen_85`")]
    InvalidDesign(String),
}

/// Numerical failures not covered by the other kinds.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ComputationError {
    #[error("sum of attribute utility ranges is zero; importance is undefined")]
    ZeroUtilityRange,

    #[error("least-squares solve failed")]
    SolveFailed,

    #[error("non-finite logit share at price {price}")]
    NonFiniteShare { price: f64 },

    #[error("non-finite {0}")]
    NonFinite(&'static str),
}

/// Error returned by every pipeline stage.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AnalysisError {
    #[error("data error: {0}")]
    Data(#[from] DataError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("computation error: {0}")]
    Computation(#[from] ComputationError),
}

/// Coarse error classification used in reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    Data,
    Config,
    Computation,
}

impl AnalysisError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AnalysisError::Data(_) => ErrorKind::Data,
            AnalysisError::Config(_) => ErrorKind::Config,
            AnalysisError::Computation(_) => ErrorKind::Computation,
        }
    }
}

impl ErrorKind {
    pub fn label(self) -> &'static str {
        match self {
            ErrorKind::Data => "data",
            ErrorKind::Config => "config",
            ErrorKind::Computation => "computation",
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

impl From<AnalysisError> for AppError {
    fn from(err: AnalysisError) -> Self {
        let exit_code = match err.kind() {
            ErrorKind::Config => 2,
            ErrorKind::Data => 3,
            ErrorKind::Computation => 4,
        };
        AppError::new(exit_code, err.to_string())
    }
}

impl From<DataError> for AppError {
    fn from(err: DataError) -> Self {
        AnalysisError::from(err).into()
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AnalysisError::from(err).into()
    }
}
