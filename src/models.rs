use serde::Serialize;

use crate::config::PipelineConfig;

pub const COL_TIMESTAMP: &str = "Timestamp";
pub const COL_GENDER: &str = "Choose your gender";
pub const COL_AGE: &str = "Age";
pub const COL_COURSE: &str = "What is your course?";
pub const COL_YEAR: &str = "Your current year of Study";
pub const COL_CGPA: &str = "What is your CGPA?";
pub const COL_MARITAL: &str = "Marital status";
pub const COL_DEPRESSION: &str = "Do you have Depression?";
pub const COL_ANXIETY: &str = "Do you have Anxiety?";
pub const COL_PANIC: &str = "Do you have Panic attack?";
pub const COL_TREATMENT: &str = "Did you seek any specialist for a treatment?";
pub const COL_RISK: &str = "Risk_Level";

/// Columns the survey file must carry, in source order.
pub const REQUIRED_COLUMNS: [&str; 11] = [
    COL_TIMESTAMP,
    COL_GENDER,
    COL_AGE,
    COL_COURSE,
    COL_YEAR,
    COL_CGPA,
    COL_MARITAL,
    COL_DEPRESSION,
    COL_ANXIETY,
    COL_PANIC,
    COL_TREATMENT,
];

pub const N_FEATURES: usize = 8;

/// Model inputs, in feature-vector order. Depression is left out on purpose:
/// it drives the label directly.
pub const FEATURE_COLUMNS: [&str; N_FEATURES] = [
    COL_GENDER,
    COL_AGE,
    COL_YEAR,
    COL_CGPA,
    COL_MARITAL,
    COL_ANXIETY,
    COL_PANIC,
    COL_TREATMENT,
];

#[derive(Debug, Clone, PartialEq)]
pub struct SurveyRecord {
    pub gender: String,
    pub age: f64,
    pub year_of_study: String,
    pub cgpa: f64,
    pub marital_status: String,
    pub depression: String,
    pub anxiety: String,
    pub panic_attack: String,
    pub sought_treatment: String,
}

impl SurveyRecord {
    pub fn respondent(&self) -> Respondent<'_> {
        Respondent {
            gender: &self.gender,
            age: self.age,
            year_of_study: &self.year_of_study,
            cgpa: self.cgpa,
            marital_status: &self.marital_status,
            anxiety: &self.anxiety,
            panic_attack: &self.panic_attack,
            sought_treatment: &self.sought_treatment,
        }
    }
}

/// The answers that feed the model, before encoding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Respondent<'a> {
    pub gender: &'a str,
    pub age: f64,
    pub year_of_study: &'a str,
    pub cgpa: f64,
    pub marital_status: &'a str,
    pub anxiety: &'a str,
    pub panic_attack: &'a str,
    pub sought_treatment: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct LoadSummary {
    pub rows_read: usize,
    pub rows_kept: usize,
    pub dropped_missing: usize,
    pub dropped_unmapped_cgpa: usize,
    pub dropped_bad_age: usize,
}

impl LoadSummary {
    pub fn rows_dropped(&self) -> usize {
        self.dropped_missing + self.dropped_unmapped_cgpa + self.dropped_bad_age
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ClassMetrics {
    pub code: usize,
    pub label: String,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AverageMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SamplePrediction {
    pub features: Vec<f64>,
    pub risk_label: String,
    pub probability: f64,
    pub recommendation: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrainingSummary {
    pub iterations: usize,
    pub final_loss: f64,
    pub converged: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct EvaluationSummary {
    pub run_id: uuid::Uuid,
    pub generated_at: chrono::DateTime<chrono::Utc>,
    pub config: PipelineConfig,
    pub data: LoadSummary,
    pub class_mix: Vec<(String, usize)>,
    pub feature_names: Vec<String>,
    pub train_rows: usize,
    pub test_rows: usize,
    pub training: TrainingSummary,
    pub accuracy: f64,
    pub classes: Vec<ClassMetrics>,
    pub macro_avg: AverageMetrics,
    pub weighted_avg: AverageMetrics,
    pub confusion_matrix: Vec<Vec<usize>>,
    pub sample: SamplePrediction,
}
