//! Shared analysis pipeline used by every front-end.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! validate -> estimate part-worths -> importance / WTP / market sweep -> summary
//!
//! Respondents are independent units of work. A failure for one respondent is
//! logged, recorded in `StudyReport::skipped` with the stage and reason, and
//! does not stop the batch. Only problems with the shared inputs (configuration
//! or survey-wide data) abort the run, before any respondent is processed.

use std::collections::{BTreeMap, HashSet};

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::domain::{AttributeProfile, FitWarning, PreferenceColumn, StudyConfig, SurveyTable};
use crate::error::{AnalysisError, DataError};
use crate::fit::estimate_utility;
use crate::market::MarketSimulator;
use crate::metrics::{compute_importance, compute_wtp};
use crate::report::{RespondentAnalysis, SkippedRespondent, Stage, StudyReport, summarize};

/// Run every respondent of `table` through the pipeline.
pub fn analyze_study(table: &SurveyTable, config: &StudyConfig) -> Result<StudyReport, AnalysisError> {
    // Shared inputs first: anything wrong here would invalidate every respondent.
    let simulator = MarketSimulator::from_config(config)?;
    table.validate()?;
    if table.preferences.is_empty() {
        return Err(DataError::NoPreferenceColumns(config.preference_marker.clone()).into());
    }

    let mut notes = Vec::new();
    let extrapolated = simulator.extrapolated_prices();
    if !extrapolated.is_empty() {
        let scale = simulator.scale();
        let note = format!(
            "{} of {} grid prices lie outside the competitor anchors [{:.2}, {:.2}]; price utility is extrapolated linearly there",
            extrapolated.len(),
            simulator.prices().len(),
            scale.reference_low,
            scale.reference_high,
        );
        warn!("{note}");
        notes.push(note);
    }

    info!(
        respondents = table.preferences.len(),
        profiles = table.profiles.len(),
        grid_points = simulator.prices().len(),
        "analyzing study"
    );

    let outcomes: Vec<(String, Result<RespondentAnalysis, SkippedRespondent>)> = table
        .preferences
        .par_iter()
        .map(|column| {
            let result = analyze_respondent(&table.profiles, column, config, &simulator);
            (column.respondent.clone(), result)
        })
        .collect();

    let mut respondents = BTreeMap::new();
    let mut skipped = Vec::new();
    let mut seen = HashSet::new();

    for (id, result) in outcomes {
        if !seen.insert(id.clone()) {
            let err = AnalysisError::from(DataError::DuplicateRespondent(id.clone()));
            warn!(respondent = id.as_str(), "{err}");
            skipped.push(SkippedRespondent {
                respondent: id,
                stage: Stage::Estimation,
                kind: err.kind(),
                reason: err.to_string(),
                warnings: Vec::new(),
            });
            continue;
        }
        match result {
            Ok(analysis) => {
                respondents.insert(id, analysis);
            }
            Err(skip) => {
                warn!(
                    respondent = skip.respondent.as_str(),
                    stage = skip.stage.label(),
                    kind = skip.kind.label(),
                    "skipping respondent: {}",
                    skip.reason
                );
                skipped.push(skip);
            }
        }
    }

    let summary = summarize(&respondents, skipped.len(), simulator.prices());
    info!(
        analyzed = respondents.len(),
        skipped = skipped.len(),
        "study complete"
    );

    Ok(StudyReport {
        respondents,
        skipped,
        summary,
        notes,
    })
}

/// Run one respondent through estimation and the three calculators.
///
/// Fails at the first stage that errors, identifying the respondent and stage.
pub fn analyze_respondent(
    profiles: &[AttributeProfile],
    column: &PreferenceColumn,
    config: &StudyConfig,
    simulator: &MarketSimulator,
) -> Result<RespondentAnalysis, SkippedRespondent> {
    let skip = |stage: Stage, err: AnalysisError, warnings: &[FitWarning]| SkippedRespondent {
        respondent: column.respondent.clone(),
        stage,
        kind: err.kind(),
        reason: err.to_string(),
        warnings: warnings.to_vec(),
    };

    let model = estimate_utility(profiles, column).map_err(|e| skip(Stage::Estimation, e, &[]))?;
    let warnings = model.diagnostics.warnings.clone();
    for w in &warnings {
        warn!(respondent = column.respondent.as_str(), "fit warning: {w}");
    }
    if model.is_degenerate() {
        debug!(
            respondent = column.respondent.as_str(),
            "model has undefined terms; calculators that need them will reject it"
        );
    }

    let importance = compute_importance(&model).map_err(|e| skip(Stage::Importance, e, &warnings))?;
    let wtp = compute_wtp(&model, config.reference_price_differential)
        .map_err(|e| skip(Stage::Wtp, e, &warnings))?;
    let pricing = simulator
        .optimize(&model)
        .map_err(|e| skip(Stage::Market, e, &warnings))?;

    Ok(RespondentAnalysis {
        model,
        importance,
        wtp,
        pricing,
    })
}
