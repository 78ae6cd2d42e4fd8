use std::collections::HashMap;

use crate::error::PipelineError;
use crate::models::{
    Respondent, RiskLevel, SurveyRecord, COL_ANXIETY, COL_GENDER, COL_MARITAL, COL_PANIC,
    COL_RISK, COL_TREATMENT, COL_YEAR, N_FEATURES,
};

/// Maps the distinct values of one nominal column to integer codes,
/// numbered in the order they are first seen during fit.
#[derive(Debug, Clone)]
pub struct LabelEncoder {
    column: String,
    classes: Vec<String>,
    codes: HashMap<String, usize>,
}

impl LabelEncoder {
    pub fn fit<'a, I>(column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut classes = Vec::new();
        let mut codes = HashMap::new();

        for value in values {
            if !codes.contains_key(value) {
                codes.insert(value.to_string(), classes.len());
                classes.push(value.to_string());
            }
        }

        Self {
            column: column.to_string(),
            classes,
            codes,
        }
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn encode(&self, value: &str) -> Result<usize, PipelineError> {
        self.codes
            .get(value)
            .copied()
            .ok_or_else(|| PipelineError::UnseenCategory {
                column: self.column.clone(),
                value: value.to_string(),
            })
    }

    pub fn decode(&self, code: usize) -> Result<&str, PipelineError> {
        self.classes
            .get(code)
            .map(String::as_str)
            .ok_or_else(|| PipelineError::UnknownCode {
                column: self.column.clone(),
                code,
            })
    }
}

/// Fitted encoders for every nominal survey column plus the risk label.
#[derive(Debug, Clone)]
pub struct SurveyEncoders {
    pub gender: LabelEncoder,
    pub year_of_study: LabelEncoder,
    pub marital_status: LabelEncoder,
    pub anxiety: LabelEncoder,
    pub panic_attack: LabelEncoder,
    pub sought_treatment: LabelEncoder,
    pub risk_level: LabelEncoder,
}

impl SurveyEncoders {
    pub fn fit(records: &[SurveyRecord], risk_levels: &[RiskLevel]) -> Self {
        let column = |name: &str, pick: fn(&SurveyRecord) -> &str| {
            LabelEncoder::fit(name, records.iter().map(pick))
        };

        Self {
            gender: column(COL_GENDER, |r| r.gender.as_str()),
            year_of_study: column(COL_YEAR, |r| r.year_of_study.as_str()),
            marital_status: column(COL_MARITAL, |r| r.marital_status.as_str()),
            anxiety: column(COL_ANXIETY, |r| r.anxiety.as_str()),
            panic_attack: column(COL_PANIC, |r| r.panic_attack.as_str()),
            sought_treatment: column(COL_TREATMENT, |r| r.sought_treatment.as_str()),
            risk_level: LabelEncoder::fit(COL_RISK, risk_levels.iter().map(RiskLevel::as_str)),
        }
    }

    /// Unscaled feature vector, in `FEATURE_COLUMNS` order.
    pub fn feature_row(
        &self,
        respondent: &Respondent<'_>,
    ) -> Result<[f64; N_FEATURES], PipelineError> {
        Ok([
            self.gender.encode(respondent.gender)? as f64,
            respondent.age,
            self.year_of_study.encode(respondent.year_of_study)? as f64,
            respondent.cgpa,
            self.marital_status.encode(respondent.marital_status)? as f64,
            self.anxiety.encode(respondent.anxiety)? as f64,
            self.panic_attack.encode(respondent.panic_attack)? as f64,
            self.sought_treatment.encode(respondent.sought_treatment)? as f64,
        ])
    }
}
