//! Export study results to CSV/JSON, and write survey CSVs.
//!
//! The CSV export is meant to be easy to consume in spreadsheets or downstream
//! scripts: one row per respondent, skipped respondents included with their
//! stage and reason so the file accounts for every input column.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::report::StudyReport;
use crate::domain::{AttributeFamily, AttributeKey, StudyConfig, SurveyTable};
use crate::error::AppError;

/// Write per-respondent results to a CSV file.
pub fn write_results_csv(path: &Path, report: &StudyReport) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write_results(file, report)
}

/// Write per-respondent results as CSV to any writer.
pub fn write_results<W: Write>(writer: W, report: &StudyReport) -> Result<(), AppError> {
    let mut out = csv::Writer::from_writer(writer);
    let csv_err = |e: csv::Error| AppError::new(2, format!("Failed to write export CSV row: {e}"));

    let mut header = vec!["respondent".to_string(), "status".to_string(), "stage".to_string(), "reason".to_string()];
    header.push("r_squared".to_string());
    header.push("intercept".to_string());
    header.extend(AttributeKey::ALL.iter().map(|k| format!("pw_{}", k.column_name())));
    header.extend(AttributeFamily::ALL.iter().map(|f| format!("imp_{}", family_column(*f))));
    header.extend(AttributeKey::NON_PRICE.iter().map(|k| format!("wtp_{}", k.column_name())));
    header.extend(["optimal_price", "share", "sales", "profit"].map(String::from));
    out.write_record(&header).map_err(csv_err)?;
    let width = header.len();

    for (id, r) in &report.respondents {
        let mut row = vec![id.clone(), "ok".to_string(), String::new(), String::new()];
        row.push(opt(r.model.diagnostics.r_squared));
        row.push(opt(r.model.intercept.estimate));
        for key in AttributeKey::ALL {
            row.push(opt(r.model.part_worth(key).ok()));
        }
        for family in AttributeFamily::ALL {
            row.push(format!("{:.6}", r.importance.share(family)));
        }
        for key in AttributeKey::NON_PRICE {
            row.push(opt(r.wtp.value(key)));
        }
        let o = &r.pricing.optimal;
        row.push(format!("{:.2}", o.price));
        row.push(format!("{:.6}", o.share));
        row.push(format!("{:.6}", o.sales));
        row.push(format!("{:.2}", o.profit));
        out.write_record(&row).map_err(csv_err)?;
    }

    for skip in &report.skipped {
        let mut row = vec![
            skip.respondent.clone(),
            "skipped".to_string(),
            skip.stage.label().to_string(),
            skip.reason.clone(),
        ];
        row.resize(width, String::new());
        out.write_record(&row).map_err(csv_err)?;
    }

    out.flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}

/// JSON export envelope.
#[derive(Debug, Serialize)]
struct ReportFile<'a> {
    tool: &'static str,
    generated_at: DateTime<Utc>,
    config: &'a StudyConfig,
    report: &'a StudyReport,
}

/// Write the full report (config, per-respondent results, summary) as JSON.
pub fn write_report_json(path: &Path, report: &StudyReport, config: &StudyConfig) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create report JSON '{}': {e}", path.display())))?;

    let envelope = ReportFile {
        tool: "cj",
        generated_at: Utc::now(),
        config,
        report,
    };
    serde_json::to_writer_pretty(file, &envelope)
        .map_err(|e| AppError::new(2, format!("Failed to write report JSON: {e}")))?;
    Ok(())
}

/// Write a survey in the same layout `load_survey_csv` reads.
pub fn write_survey_csv(path: &Path, table: &SurveyTable) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create survey CSV '{}': {e}", path.display())))?;
    write_survey(file, table)
}

pub fn write_survey<W: Write>(writer: W, table: &SurveyTable) -> Result<(), AppError> {
    let mut out = csv::Writer::from_writer(writer);
    let csv_err = |e: csv::Error| AppError::new(2, format!("Failed to write survey CSV row: {e}"));

    let mut header: Vec<String> = AttributeKey::ALL.iter().map(|k| k.column_name().to_string()).collect();
    header.extend(table.preferences.iter().map(|c| c.respondent.clone()));
    out.write_record(&header).map_err(csv_err)?;

    for (i, profile) in table.profiles.iter().enumerate() {
        let mut row: Vec<String> = AttributeKey::ALL
            .iter()
            .map(|&k| if profile.has(k) { "1" } else { "0" }.to_string())
            .collect();
        for column in &table.preferences {
            row.push(column.scores.get(i).copied().flatten().map(|v| format!("{v}")).unwrap_or_default());
        }
        out.write_record(&row).map_err(csv_err)?;
    }

    out.flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush survey CSV: {e}")))?;
    Ok(())
}

fn family_column(family: AttributeFamily) -> &'static str {
    match family {
        AttributeFamily::ScreenSize => "screen_size",
        AttributeFamily::Resolution => "resolution",
        AttributeFamily::Brand => "brand",
        AttributeFamily::Price => "price",
    }
}

fn opt(v: Option<f64>) -> String {
    v.map(|v| format!("{v:.6}")).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use crate::app::pipeline::analyze_study;
    use crate::data::full_factorial_profiles;
    use crate::domain::PreferenceColumn;
    use crate::error::ErrorKind;
    use crate::io::ingest::read_survey;
    use crate::report::{SkippedRespondent, Stage, summarize};

    fn small_table() -> SurveyTable {
        let profiles = full_factorial_profiles();
        let scores = profiles
            .iter()
            .map(|p| {
                let u = 10.0 + 2.0 * p.indicator(AttributeKey::Screen75) + 3.0 * p.indicator(AttributeKey::Screen85)
                    + 1.0 * p.indicator(AttributeKey::Resolution4k)
                    + 0.5 * p.indicator(AttributeKey::Brand)
                    - 2.0 * p.indicator(AttributeKey::PriceHigh);
                Some(u)
            })
            .collect();
        SurveyTable {
            profiles,
            preferences: vec![
                PreferenceColumn {
                    respondent: "Rank, Ann".to_string(),
                    scores,
                },
                PreferenceColumn {
                    respondent: "Rank Bob".to_string(),
                    scores: vec![None; 24],
                },
            ],
        }
    }

    #[test]
    fn results_csv_has_one_row_per_respondent() {
        let report = analyze_study(&small_table(), &StudyConfig::default()).unwrap();
        let mut buf = Vec::new();
        write_results(&mut buf, &report).unwrap();

        let mut reader = csv::Reader::from_reader(buf.as_slice());
        let headers = reader.headers().unwrap().clone();
        assert_eq!(&headers[0], "respondent");
        assert!(headers.iter().any(|h| h == "wtp_brand"));

        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][0], "Rank, Ann");
        assert_eq!(&rows[0][1], "ok");
        assert_eq!(&rows[1][0], "Rank Bob");
        assert_eq!(&rows[1][1], "skipped");
        assert_eq!(&rows[1][2], "estimation");
        assert_eq!(rows[1].len(), headers.len());
    }

    #[test]
    fn report_json_contains_summary_and_timestamp() {
        let report = StudyReport {
            respondents: BTreeMap::new(),
            skipped: vec![SkippedRespondent {
                respondent: "Rank 1".to_string(),
                stage: Stage::Importance,
                kind: ErrorKind::Computation,
                reason: "flat".to_string(),
                warnings: vec![],
            }],
            summary: summarize(&BTreeMap::new(), 1, &[]),
            notes: vec![],
        };
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        write_report_json(&path, &report, &StudyConfig::default()).unwrap();

        let value: serde_json::Value = serde_json::from_reader(File::open(&path).unwrap()).unwrap();
        assert_eq!(value["tool"], "cj");
        assert!(value["generated_at"].is_string());
        assert_eq!(value["report"]["summary"]["respondents_skipped"], 1);
        assert_eq!(value["report"]["skipped"][0]["stage"], "importance");
        assert_eq!(value["config"]["market_size"], 100.0);
    }

    #[test]
    fn written_survey_reads_back() {
        let table = small_table();
        let mut buf = Vec::new();
        write_survey(&mut buf, &table).unwrap();

        let parsed = read_survey(buf.as_slice(), "rank").unwrap();
        assert_eq!(parsed, table);
    }
}
