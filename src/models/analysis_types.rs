use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Labels the inference service is trained on.
pub const KNOWN_CLASSES: [&str; 4] = ["Abnormal", "HMI", "MI", "Normal"];

/// Diagnosis returned by the inference service.
///
/// `confidence` and `distribution[predicted_class]` both come straight from
/// the response and are never derived from one another. Probabilities are
/// kept as given, with no normalization.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub predicted_class: String,
    pub confidence: f64,
    pub distribution: BTreeMap<String, f64>,
}

/// Body of a successful `POST /predict`.
#[derive(Debug, Deserialize)]
pub struct PredictResponse {
    pub class: String,
    pub confidence: f64,
    pub predictions: BTreeMap<String, f64>,
}

/// Body of `GET /`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceHealth {
    pub message: String,
}

impl TryFrom<PredictResponse> for AnalysisResult {
    type Error = AppError;

    fn try_from(response: PredictResponse) -> Result<Self, Self::Error> {
        check_probability("confidence", response.confidence)?;
        for (label, probability) in &response.predictions {
            check_probability(&format!("predictions[{:?}]", label), *probability)?;
        }

        // Labels compare as exact strings.
        if !response.predictions.contains_key(&response.class) {
            return Err(AppError::MalformedResponse(format!(
                "predictions has no entry for predicted class {:?}",
                response.class
            )));
        }

        Ok(AnalysisResult {
            predicted_class: response.class,
            confidence: response.confidence,
            distribution: response.predictions,
        })
    }
}

/// Decode and validate a `/predict` response body.
pub fn parse_predict_response(body: &[u8]) -> Result<AnalysisResult, AppError> {
    let response: PredictResponse = serde_json::from_slice(body)?;
    AnalysisResult::try_from(response)
}

fn check_probability(field: &str, value: f64) -> Result<(), AppError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(AppError::MalformedResponse(format!(
            "{} = {} is outside [0, 1]",
            field, value
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn parses_well_formed_response() {
        let body = br#"{"class":"Normal","confidence":0.93,"predictions":{"Normal":0.93,"MI":0.04,"HMI":0.02,"Abnormal":0.01}}"#;
        let result = parse_predict_response(body).expect("valid body should parse");

        assert_eq!(result.predicted_class, "Normal");
        assert_eq!(result.confidence, 0.93);
        assert_eq!(result.distribution.len(), 4);
        assert_eq!(result.distribution["MI"], 0.04);
    }

    #[test]
    fn keeps_confidence_and_distribution_independent() {
        let body = br#"{"class":"MI","confidence":0.7,"predictions":{"MI":0.65,"Normal":0.5}}"#;
        let result = parse_predict_response(body).expect("body should parse");

        assert_eq!(result.confidence, 0.7);
        assert_eq!(result.distribution["MI"], 0.65);
    }

    #[test]
    fn rejects_confidence_out_of_range() {
        let body = br#"{"class":"MI","confidence":1.4,"predictions":{"MI":0.9}}"#;
        let err = parse_predict_response(body).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedResponse);
    }

    #[test]
    fn rejects_negative_probability() {
        let body = br#"{"class":"MI","confidence":0.9,"predictions":{"MI":0.9,"HMI":-0.1}}"#;
        let err = parse_predict_response(body).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedResponse);
    }

    #[test]
    fn rejects_missing_fields() {
        let body = br#"{"class":"MI","predictions":{"MI":0.9}}"#;
        let err = parse_predict_response(body).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedResponse);
    }

    #[test]
    fn rejects_predicted_class_absent_from_predictions() {
        let body = br#"{"class":"MI","confidence":0.9,"predictions":{"Normal":0.1}}"#;
        let err = parse_predict_response(body).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedResponse);
    }

    #[test]
    fn label_lookup_is_case_sensitive() {
        let body = br#"{"class":"normal","confidence":0.9,"predictions":{"Normal":0.9}}"#;
        let err = parse_predict_response(body).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedResponse);
    }

    #[test]
    fn does_not_require_probabilities_to_sum_to_one() {
        let body = br#"{"class":"HMI","confidence":0.8,"predictions":{"HMI":0.8,"MI":0.7}}"#;
        let result = parse_predict_response(body).expect("unnormalized body should parse");
        let total: f64 = result.distribution.values().sum();
        assert!(total > 1.0);
    }
}
