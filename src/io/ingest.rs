//! Survey CSV ingest.
//!
//! Turns a conjoint export into a `SurveyTable`:
//! - one row per product profile
//! - the five indicator columns under their fixed names
//! - every column whose header contains the preference marker becomes one
//!   respondent, keyed by the original header text
//!
//! Design goals:
//! - **Strict schema** for indicator columns (clear errors, no guessing)
//! - **Per-respondent tolerance** for preference cells: a blank or non-numeric
//!   score is kept as missing so only that respondent is rejected later
//! - **Separation of concerns**: no fitting logic here

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use tracing::info;

use crate::domain::{AttributeKey, AttributeProfile, NonPriceAttributes, PreferenceColumn, SurveyTable};
use crate::error::{AppError, DataError};

/// Load a survey CSV from disk.
pub fn load_survey_csv(path: &Path, marker: &str) -> Result<SurveyTable, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open survey CSV '{}': {e}", path.display())))?;
    let table = read_survey(file, marker)?;
    info!(
        path = %path.display(),
        profiles = table.profiles.len(),
        respondents = table.preferences.len(),
        "loaded survey"
    );
    Ok(table)
}

/// Parse a survey CSV from any reader.
pub fn read_survey<R: Read>(reader: R, marker: &str) -> Result<SurveyTable, DataError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| DataError::Csv {
            line: 1,
            message: format!("failed to read headers: {e}"),
        })?
        .clone();

    let header_map = build_header_map(&headers);
    let mut indicator_idx = Vec::with_capacity(AttributeKey::ALL.len());
    for key in AttributeKey::ALL {
        let idx = header_map
            .get(key.column_name())
            .copied()
            .ok_or_else(|| DataError::MissingColumn(key.column_name().to_string()))?;
        indicator_idx.push((key, idx));
    }

    let marker = marker.to_ascii_lowercase();
    let preference_idx: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .filter(|(idx, _)| !indicator_idx.iter().any(|(_, i)| i == idx))
        .map(|(idx, name)| (idx, clean_header_name(name).to_string()))
        .filter(|(_, name)| name.to_ascii_lowercase().contains(&marker))
        .collect();
    if preference_idx.is_empty() {
        return Err(DataError::NoPreferenceColumns(marker));
    }

    let mut profiles = Vec::new();
    let mut preferences: Vec<PreferenceColumn> = preference_idx
        .iter()
        .map(|(_, name)| PreferenceColumn {
            respondent: name.clone(),
            scores: Vec::new(),
        })
        .collect();

    for (i, result) in reader.records().enumerate() {
        // +2: records start after the header line, and lines are 1-based.
        let line = i + 2;
        let record = result.map_err(|e| DataError::Csv {
            line,
            message: format!("CSV parse error: {e}"),
        })?;

        profiles.push(parse_profile(&record, &indicator_idx, line)?);
        for (column, (idx, _)) in preferences.iter_mut().zip(preference_idx.iter()) {
            column.scores.push(parse_opt_f64(record.get(*idx)));
        }
    }

    let table = SurveyTable { profiles, preferences };
    table.validate()?;
    Ok(table)
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (clean_header_name(name).to_ascii_lowercase(), idx))
        .collect()
}

fn clean_header_name(name: &str) -> &str {
    // Spreadsheet exports sometimes prefix the first header with a UTF-8 BOM.
    name.trim().trim_start_matches('\u{feff}')
}

fn parse_profile(
    record: &StringRecord,
    indicator_idx: &[(AttributeKey, usize)],
    line: usize,
) -> Result<AttributeProfile, DataError> {
    let mut profile = AttributeProfile {
        attributes: NonPriceAttributes::default(),
        price_high: false,
    };
    for &(key, idx) in indicator_idx {
        let raw = record.get(idx).unwrap_or("");
        let value = parse_indicator(raw).ok_or_else(|| DataError::InvalidIndicator {
            line,
            column: key.column_name().to_string(),
            value: raw.to_string(),
        })?;
        match key {
            AttributeKey::Screen75 => profile.attributes.screen_75 = value,
            AttributeKey::Screen85 => profile.attributes.screen_85 = value,
            AttributeKey::Resolution4k => profile.attributes.resolution_4k = value,
            AttributeKey::Brand => profile.attributes.brand = value,
            AttributeKey::PriceHigh => profile.price_high = value,
        }
    }
    Ok(profile)
}

fn parse_indicator(s: &str) -> Option<bool> {
    let v = s.trim().parse::<f64>().ok()?;
    if v == 0.0 {
        Some(false)
    } else if v == 1.0 {
        Some(true)
    } else {
        None
    }
}

fn parse_opt_f64(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    let v = s.parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\u{feff}screen_75,screen_85,resolution_4k,brand,price_high,Rank Alice,Rank Bob,notes\n\
        0,0,0,0,0,3,4,a\n\
        1,0,1,0,1,1,x,b\n\
        0,1,1,1,0,2,,c\n";

    #[test]
    fn reads_profiles_and_preference_columns() {
        let table = read_survey(CSV.as_bytes(), "rank").unwrap();
        assert_eq!(table.profiles.len(), 3);
        assert!(table.profiles[1].attributes.screen_75);
        assert!(table.profiles[1].price_high);
        assert!(table.profiles[2].attributes.brand);

        let names: Vec<&str> = table.preferences.iter().map(|c| c.respondent.as_str()).collect();
        assert_eq!(names, vec!["Rank Alice", "Rank Bob"]);
        assert_eq!(table.preferences[0].scores, vec![Some(3.0), Some(1.0), Some(2.0)]);
        // Non-numeric and blank cells are kept as missing.
        assert_eq!(table.preferences[1].scores, vec![Some(4.0), None, None]);
    }

    #[test]
    fn missing_indicator_column_is_an_error() {
        let csv = "screen_75,screen_85,resolution_4k,brand,Rank 1\n0,0,0,0,1\n";
        assert_eq!(
            read_survey(csv.as_bytes(), "rank"),
            Err(DataError::MissingColumn("price_high".to_string()))
        );
    }

    #[test]
    fn non_binary_indicator_is_an_error() {
        let csv = "screen_75,screen_85,resolution_4k,brand,price_high,Rank 1\n0,0,2,0,0,1\n";
        let err = read_survey(csv.as_bytes(), "rank").unwrap_err();
        assert_eq!(
            err,
            DataError::InvalidIndicator {
                line: 2,
                column: "resolution_4k".to_string(),
                value: "2".to_string(),
            }
        );
    }

    #[test]
    fn conflicting_screen_sizes_are_rejected() {
        let csv = "screen_75,screen_85,resolution_4k,brand,price_high,Rank 1\n1,1,0,0,0,1\n";
        assert_eq!(
            read_survey(csv.as_bytes(), "rank"),
            Err(DataError::ScreenSizeConflict { row: 1 })
        );
    }

    #[test]
    fn marker_must_match_some_column() {
        let csv = "screen_75,screen_85,resolution_4k,brand,price_high,score\n0,0,0,0,0,1\n";
        assert_eq!(
            read_survey(csv.as_bytes(), "rank"),
            Err(DataError::NoPreferenceColumns("rank".to_string()))
        );
    }
}
