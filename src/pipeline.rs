use anyhow::Context;
use chrono::Utc;
use ndarray::{Array2, ArrayView1, Axis};
use tracing::{debug, info};
use uuid::Uuid;

use crate::classifier::{argmax, FitReport, LogisticRegression};
use crate::config::{PipelineConfig, SAMPLE_FEATURES};
use crate::encoder::SurveyEncoders;
use crate::error::PipelineError;
use crate::loader::{self, SurveyData};
use crate::metrics;
use crate::models::{
    EvaluationSummary, LoadSummary, Respondent, RiskLevel, SamplePrediction, TrainingSummary,
    FEATURE_COLUMNS, N_FEATURES,
};
use crate::risk;
use crate::scaler::StandardScaler;
use crate::split::train_test_split;

/// Everything fitted during training that is needed to score new rows.
#[derive(Debug, Clone)]
pub struct FittedPipeline {
    pub encoders: SurveyEncoders,
    pub scaler: StandardScaler,
    pub model: LogisticRegression,
    pub fit_report: FitReport,
}

#[derive(Debug, Clone)]
pub struct TrainingRun {
    pub fitted: FittedPipeline,
    pub load: LoadSummary,
    pub class_mix: Vec<(String, usize)>,
    pub train_rows: usize,
    pub y_test: Vec<usize>,
    pub y_pred: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub risk_label: String,
    pub probability: f64,
    pub recommendation: &'static str,
}

impl FittedPipeline {
    /// Scores an already-encoded feature vector.
    pub fn predict_encoded(&self, features: &[f64]) -> Result<Prediction, PipelineError> {
        if features.len() != N_FEATURES {
            return Err(PipelineError::FeatureMismatch {
                expected: N_FEATURES,
                actual: features.len(),
            });
        }

        let scaled = self.scaler.transform_row(ArrayView1::from(features))?;
        let probs = self.model.predict_proba_row(scaled.view())?;
        let (class, probability) = argmax(probs.view());
        let risk_label = self.encoders.risk_level.decode(class)?.to_string();
        let recommendation = risk::recommendation_for(&risk_label);

        Ok(Prediction {
            risk_label,
            probability,
            recommendation,
        })
    }

    /// Encodes raw survey answers with the fitted encoders, then scores them.
    /// Answers never seen during training are rejected.
    pub fn predict_respondent(
        &self,
        respondent: &Respondent<'_>,
    ) -> Result<Prediction, PipelineError> {
        let row = self.encoders.feature_row(respondent)?;
        self.predict_encoded(&row)
    }
}

pub fn train(config: &PipelineConfig) -> anyhow::Result<TrainingRun> {
    config.validate()?;

    let data = loader::load_survey(&config.csv_path)?;
    train_on(data, config)
}

pub fn train_on(data: SurveyData, config: &PipelineConfig) -> anyhow::Result<TrainingRun> {
    let SurveyData { records, summary } = data;

    let risk_levels: Vec<RiskLevel> = records.iter().map(risk::risk_for_record).collect();
    let encoders = SurveyEncoders::fit(&records, &risk_levels);

    let mut raw = Array2::zeros((records.len(), N_FEATURES));
    for (mut row, record) in raw.axis_iter_mut(Axis(0)).zip(&records) {
        let encoded = encoders.feature_row(&record.respondent())?;
        row.assign(&ArrayView1::from(&encoded[..]));
    }

    let labels = risk_levels
        .iter()
        .map(|level| encoders.risk_level.encode(level.as_str()))
        .collect::<Result<Vec<_>, _>>()?;

    let class_mix = encoders
        .risk_level
        .classes()
        .iter()
        .enumerate()
        .map(|(code, name)| (name.clone(), labels.iter().filter(|&&l| l == code).count()))
        .collect::<Vec<_>>();
    info!("Risk label mix: {:?}", class_mix);

    let scaler = StandardScaler::fit(&raw)?;
    let features = scaler.transform(&raw)?;
    debug!(
        "Scaler fitted: means={:?} stds={:?}",
        scaler.means().to_vec(),
        scaler.stds().to_vec()
    );

    let split = train_test_split(records.len(), config.test_fraction, config.seed)?;
    let x_train = features.select(Axis(0), &split.train);
    let x_test = features.select(Axis(0), &split.test);
    let y_train: Vec<usize> = split.train.iter().map(|&i| labels[i]).collect();
    let y_test: Vec<usize> = split.test.iter().map(|&i| labels[i]).collect();

    info!("Training classifier on {} rows", y_train.len());
    let (model, fit_report) = LogisticRegression::fit(
        x_train.view(),
        &y_train,
        encoders.risk_level.len(),
        &config.solver,
    )
    .context("failed to fit the risk classifier")?;
    info!(
        "Classifier fitted on {} features and {} classes ({} iterations, converged: {})",
        model.n_features(),
        model.n_classes(),
        fit_report.iterations,
        fit_report.converged
    );

    let y_pred = model.predict(x_test.view())?;

    Ok(TrainingRun {
        fitted: FittedPipeline {
            encoders,
            scaler,
            model,
            fit_report,
        },
        load: summary,
        class_mix,
        train_rows: y_train.len(),
        y_test,
        y_pred,
    })
}

/// Test-set metrics plus the fixed sample prediction.
pub fn evaluate(run: &TrainingRun, config: &PipelineConfig) -> anyhow::Result<EvaluationSummary> {
    let risk_encoder = &run.fitted.encoders.risk_level;
    let labels = metrics::class_labels(&run.y_test, &run.y_pred);
    let names = labels
        .iter()
        .map(|&code| risk_encoder.decode(code).map(str::to_string))
        .collect::<Result<Vec<_>, _>>()
        .context("test labels do not match the fitted risk levels")?;
    let classes = metrics::per_class_metrics(&run.y_test, &run.y_pred, &labels, &names);

    let prediction = run
        .fitted
        .predict_encoded(&SAMPLE_FEATURES)
        .context("failed to score the sample respondent")?;

    Ok(EvaluationSummary {
        run_id: Uuid::new_v4(),
        generated_at: Utc::now(),
        config: config.clone(),
        data: run.load.clone(),
        class_mix: run.class_mix.clone(),
        feature_names: FEATURE_COLUMNS.iter().map(|name| name.to_string()).collect(),
        train_rows: run.train_rows,
        test_rows: run.y_test.len(),
        training: TrainingSummary {
            iterations: run.fitted.fit_report.iterations,
            final_loss: run.fitted.fit_report.final_loss,
            converged: run.fitted.fit_report.converged,
        },
        accuracy: metrics::accuracy(&run.y_test, &run.y_pred),
        macro_avg: metrics::macro_average(&classes),
        weighted_avg: metrics::weighted_average(&classes),
        confusion_matrix: metrics::confusion_matrix(&run.y_test, &run.y_pred, &labels),
        classes,
        sample: SamplePrediction {
            features: SAMPLE_FEATURES.to_vec(),
            risk_label: prediction.risk_label,
            probability: prediction.probability,
            recommendation: prediction.recommendation.to_string(),
        },
    })
}
