//! Prediction model

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crime_core::logic::features::{observation::WEEKDAYS, AlignmentReport, Observation, UnknownCategory};
use crime_core::logic::model::Prediction;

fn validate_weekday(day: &str) -> Result<(), ValidationError> {
    if WEEKDAYS.contains(&day) {
        Ok(())
    } else {
        let mut err = ValidationError::new("weekday");
        err.message = Some(format!("`{}` is not a day of the week", day).into());
        Err(err)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct PredictRequest {
    #[validate(length(min = 1, message = "district is required"))]
    pub district: String,

    #[validate(custom(function = "validate_weekday"))]
    pub day_of_week: String,

    #[validate(range(min = 0, max = 23, message = "hour must be between 0 and 23"))]
    pub hour: i64,
}

impl PredictRequest {
    pub fn observation(&self) -> Observation {
        Observation::crime(self.district.trim(), &self.day_of_week, self.hour)
    }
}

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub prediction: String,
    pub confidence: Option<f32>,
    /// Input categories the model never saw during training
    pub unknown_categories: Vec<UnknownCategory>,
    pub zero_filled: usize,
    pub inference_time_us: u64,
}

impl From<Prediction> for PredictResponse {
    fn from(p: Prediction) -> Self {
        let AlignmentReport { zero_filled, unknown_categories, .. } = p.report;
        Self {
            prediction: p.label,
            confidence: p.confidence,
            unknown_categories,
            zero_filled,
            inference_time_us: p.inference_time_us,
        }
    }
}
