use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::Context;
use tracing::info;

use crate::error::PipelineError;
use crate::models::{
    LoadSummary, SurveyRecord, COL_AGE, COL_ANXIETY, COL_CGPA, COL_DEPRESSION, COL_GENDER,
    COL_MARITAL, COL_PANIC, COL_TREATMENT, COL_YEAR, REQUIRED_COLUMNS,
};
use crate::risk;

#[derive(Debug, Clone)]
pub struct SurveyData {
    pub records: Vec<SurveyRecord>,
    pub summary: LoadSummary,
}

enum DropReason {
    Missing,
    UnmappedCgpa,
    BadAge,
}

pub fn load_survey(path: &Path) -> anyhow::Result<SurveyData> {
    let file = File::open(path)
        .with_context(|| format!("failed to open survey file {}", path.display()))?;
    read_survey(file).with_context(|| format!("failed to read survey file {}", path.display()))
}

/// Reads survey rows, forward-filling empty cells column by column, then
/// keeps only the rows that are complete and carry a known CGPA bracket.
pub fn read_survey<R: Read>(source: R) -> anyhow::Result<SurveyData> {
    // Short rows are kept; their trailing cells count as empty and get filled.
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(source);
    let headers = reader.headers()?.clone();

    let mut positions = Vec::with_capacity(REQUIRED_COLUMNS.len());
    for column in REQUIRED_COLUMNS {
        let position = headers
            .iter()
            .position(|header| header == column)
            .ok_or_else(|| PipelineError::MissingColumn(column.to_string()))?;
        positions.push(position);
    }

    let mut last_seen: Vec<Option<String>> = vec![None; REQUIRED_COLUMNS.len()];
    let mut records = Vec::new();
    let mut summary = LoadSummary::default();

    for result in reader.records() {
        let row = result?;
        summary.rows_read += 1;

        for (slot, &position) in last_seen.iter_mut().zip(&positions) {
            if let Some(value) = row.get(position).filter(|value| !value.is_empty()) {
                *slot = Some(value.to_string());
            }
        }

        match build_record(&last_seen) {
            Ok(record) => records.push(record),
            Err(DropReason::Missing) => summary.dropped_missing += 1,
            Err(DropReason::UnmappedCgpa) => summary.dropped_unmapped_cgpa += 1,
            Err(DropReason::BadAge) => summary.dropped_bad_age += 1,
        }
    }

    summary.rows_kept = records.len();
    info!(
        "Loaded {} of {} survey rows ({} dropped)",
        summary.rows_kept,
        summary.rows_read,
        summary.rows_dropped()
    );
    info!(
        "Dropped rows: missing={}, unmapped_cgpa={}, bad_age={}",
        summary.dropped_missing, summary.dropped_unmapped_cgpa, summary.dropped_bad_age
    );

    if records.is_empty() {
        return Err(PipelineError::EmptyDataset.into());
    }

    Ok(SurveyData { records, summary })
}

fn filled_value<'a>(filled: &'a [Option<String>], column: &str) -> Result<&'a str, DropReason> {
    REQUIRED_COLUMNS
        .iter()
        .position(|&name| name == column)
        .and_then(|index| filled.get(index))
        .and_then(|value| value.as_deref())
        .ok_or(DropReason::Missing)
}

fn build_record(filled: &[Option<String>]) -> Result<SurveyRecord, DropReason> {
    let field = |column| filled_value(filled, column);

    let gender = field(COL_GENDER)?;
    let age = field(COL_AGE)?;
    let year_of_study = field(COL_YEAR)?;
    let cgpa = field(COL_CGPA)?;
    let marital_status = field(COL_MARITAL)?;
    let depression = field(COL_DEPRESSION)?;
    let anxiety = field(COL_ANXIETY)?;
    let panic_attack = field(COL_PANIC)?;
    let sought_treatment = field(COL_TREATMENT)?;

    let cgpa = risk::cgpa_midpoint(cgpa).ok_or(DropReason::UnmappedCgpa)?;
    let age = age
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|age| age.is_finite())
        .ok_or(DropReason::BadAge)?;

    Ok(SurveyRecord {
        gender: gender.to_string(),
        age,
        year_of_study: year_of_study.to_string(),
        cgpa,
        marital_status: marital_status.to_string(),
        depression: depression.to_string(),
        anxiety: anxiety.to_string(),
        panic_attack: panic_attack.to_string(),
        sought_treatment: sought_treatment.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const HEADER: &str = "Timestamp,Choose your gender,Age,What is your course?,Your current year of Study,What is your CGPA?,Marital status,Do you have Depression?,Do you have Anxiety?,Do you have Panic attack?,Did you seek any specialist for a treatment?";

    fn csv_with(rows: &[&str]) -> String {
        let mut text = String::from(HEADER);
        for row in rows {
            text.push('\n');
            text.push_str(row);
        }
        text.push('\n');
        text
    }

    #[test]
    fn reads_complete_rows() {
        let text = csv_with(&[
            "8/7/2020 12:02,Female,18,Engineering,year 1,3.00 - 3.49,No,Yes,No,Yes,No",
            "8/7/2020 12:04,Male,21,Islamic education,year 2,3.50 - 4.00,No,No,Yes,No,No",
        ]);
        let data = read_survey(text.as_bytes()).unwrap();

        assert_eq!(data.records.len(), 2);
        assert_eq!(data.summary.rows_read, 2);
        assert_eq!(data.summary.rows_kept, 2);

        let first = &data.records[0];
        assert_eq!(first.gender, "Female");
        assert_eq!(first.age, 18.0);
        assert_eq!(first.cgpa, 3.25);
        assert_eq!(first.depression, "Yes");
        assert_eq!(first.panic_attack, "Yes");
        assert_eq!(data.records[1].cgpa, 3.75);
    }

    #[test]
    fn forward_fills_missing_cells_from_previous_row() {
        let text = csv_with(&[
            "8/7/2020 12:02,Female,18,Engineering,year 1,3.00 - 3.49,No,Yes,No,Yes,No",
            "8/7/2020 12:05,Male,,,year 3,3.00 - 3.49,,No,No,No,Yes",
        ]);
        let data = read_survey(text.as_bytes()).unwrap();

        assert_eq!(data.records.len(), 2);
        let filled = &data.records[1];
        assert_eq!(filled.age, 18.0);
        assert_eq!(filled.marital_status, "No");
        assert_eq!(filled.gender, "Male");
        assert_eq!(filled.sought_treatment, "Yes");
    }

    #[test]
    fn short_rows_are_filled_from_previous_row() {
        let text = csv_with(&[
            "8/7/2020 12:02,Female,18,Engineering,year 1,3.00 - 3.49,No,Yes,No,Yes,No",
            "8/7/2020 12:05,Male,20,Law,year 2,3.50 - 4.00,Yes,No,Yes",
        ]);
        let data = read_survey(text.as_bytes()).unwrap();

        assert_eq!(data.records.len(), 2);
        assert_eq!(data.summary.rows_dropped(), 0);
        let short = &data.records[1];
        assert_eq!(short.gender, "Male");
        assert_eq!(short.cgpa, 3.75);
        assert_eq!(short.anxiety, "Yes");
        assert_eq!(short.panic_attack, "Yes");
        assert_eq!(short.sought_treatment, "No");
    }

    #[test]
    fn leading_gap_with_nothing_to_fill_drops_the_row() {
        let text = csv_with(&[
            "8/7/2020 12:02,Female,,Engineering,year 1,3.00 - 3.49,No,Yes,No,Yes,No",
            "8/7/2020 12:04,Male,21,Law,year 2,3.00 - 3.49,No,No,No,No,No",
        ]);
        let data = read_survey(text.as_bytes()).unwrap();

        assert_eq!(data.records.len(), 1);
        assert_eq!(data.summary.dropped_missing, 1);
        assert_eq!(data.records[0].gender, "Male");
    }

    #[test]
    fn unmapped_cgpa_and_bad_age_are_dropped() {
        let text = csv_with(&[
            "t1,Female,18,Engineering,year 1,3.50 - 4.00 ,No,Yes,No,Yes,No",
            "t2,Male,twenty,Law,year 2,3.00 - 3.49,No,No,No,No,No",
            "t3,Male,22,Law,year 2,2.50 - 2.99,No,No,No,No,No",
        ]);
        let data = read_survey(text.as_bytes()).unwrap();

        assert_eq!(data.records.len(), 1);
        assert_eq!(data.summary.dropped_unmapped_cgpa, 1);
        assert_eq!(data.summary.dropped_bad_age, 1);
        assert_eq!(data.summary.rows_dropped(), 2);
        assert_eq!(data.records[0].cgpa, 2.75);
    }

    #[test]
    fn missing_required_column_is_fatal() {
        let text = "Timestamp,Choose your gender,Age\nt1,Female,18\n";
        let err = read_survey(text.as_bytes()).unwrap_err();
        match err.downcast_ref::<PipelineError>() {
            Some(PipelineError::MissingColumn(column)) => {
                assert_eq!(column, "What is your course?")
            }
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }

    #[test]
    fn all_rows_dropped_is_an_error() {
        let text = csv_with(&["t1,Female,18,Engineering,year 1,4.00,No,Yes,No,Yes,No"]);
        let err = read_survey(text.as_bytes()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::EmptyDataset)
        ));
    }

    #[test]
    fn loads_from_disk_and_reports_missing_files() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "{}",
            csv_with(&["t1,Female,18,Engineering,year 1,0 - 1.99,No,No,No,No,No"])
        )
        .unwrap();

        let data = load_survey(file.path()).unwrap();
        assert_eq!(data.records[0].cgpa, 1.5);

        let missing = file.path().with_extension("does-not-exist");
        assert!(load_survey(&missing).is_err());
    }
}
