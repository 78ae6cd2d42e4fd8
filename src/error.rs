use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("required column `{0}` is missing from the header")]
    MissingColumn(String),

    #[error("no usable rows left after cleaning the survey data")]
    EmptyDataset,

    #[error("value `{value}` was not seen in column `{column}` during fit")]
    UnseenCategory { column: String, value: String },

    #[error("code {code} is out of range for column `{column}`")]
    UnknownCode { column: String, code: usize },

    #[error("CGPA bracket `{0}` is not one of the known brackets")]
    UnmappedCgpa(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("cannot split {rows} rows with test fraction {test_fraction}")]
    TooFewRows { rows: usize, test_fraction: f64 },

    #[error("training labels contain {0} distinct class(es); at least 2 are required")]
    TooFewClasses(usize),

    #[error("{rows} feature rows but {labels} labels")]
    LabelCountMismatch { rows: usize, labels: usize },

    #[error("label {label} is out of range for {n_classes} classes")]
    LabelOutOfRange { label: usize, n_classes: usize },

    #[error("expected {expected} features, got {actual}")]
    FeatureMismatch { expected: usize, actual: usize },
}
