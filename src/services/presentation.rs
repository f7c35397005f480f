//! Pure shaping of an [`AnalysisResult`] for display.
//!
//! Nothing here touches session state; identical input always yields
//! identical output.

use crate::models::analysis_types::{AnalysisResult, KNOWN_CLASSES};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Benign,
    Concerning,
    Unknown,
}

/// Exact-string categorisation of a class label. Every known class other
/// than `Normal` is concerning.
pub fn categorize(label: &str) -> Severity {
    match label {
        "Normal" => Severity::Benign,
        known if KNOWN_CLASSES.contains(&known) => Severity::Concerning,
        _ => Severity::Unknown,
    }
}

pub fn condition_description(label: &str) -> Option<&'static str> {
    match label {
        "Normal" => Some("No signs of cardiac abnormalities detected in the heart scan image."),
        "MI" => Some("Myocardial Infarction (heart attack) with damaged heart muscle tissue."),
        "HMI" => Some("Hypertrophic Myocardial Infarction with thickened heart wall."),
        "Abnormal" => {
            Some("Other cardiac abnormalities detected that require medical attention.")
        }
        _ => None,
    }
}

/// `0.934` -> `"93.4%"`.
pub fn format_percent(probability: f64) -> String {
    format!("{:.1}%", probability * 100.0)
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RankedEntry {
    pub label: String,
    pub probability: f64,
    pub severity: Severity,
    pub is_predicted: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResultView {
    pub predicted_class: String,
    pub severity: Severity,
    pub confidence: f64,
    pub description: Option<&'static str>,
    pub ranked: Vec<RankedEntry>,
}

/// Entries by descending probability, ties by ascending label.
pub fn rank_distribution(distribution: &BTreeMap<String, f64>) -> Vec<(&str, f64)> {
    let mut entries: Vec<(&str, f64)> = distribution
        .iter()
        .map(|(label, probability)| (label.as_str(), *probability))
        .collect();
    entries.sort_by(|a, b| compare_entries(*a, *b));
    entries
}

fn compare_entries(a: (&str, f64), b: (&str, f64)) -> Ordering {
    // Validated probabilities are never NaN; -0.0 and 0.0 tie
    b.1.partial_cmp(&a.1)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.0.cmp(b.0))
}

pub fn shape_result(result: &AnalysisResult) -> ResultView {
    let ranked = rank_distribution(&result.distribution)
        .into_iter()
        .map(|(label, probability)| RankedEntry {
            label: label.to_string(),
            probability,
            severity: categorize(label),
            is_predicted: label == result.predicted_class,
        })
        .collect();

    ResultView {
        predicted_class: result.predicted_class.clone(),
        severity: categorize(&result.predicted_class),
        confidence: result.confidence,
        description: condition_description(&result.predicted_class),
        ranked,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn distribution(entries: &[(&str, f64)]) -> BTreeMap<String, f64> {
        entries
            .iter()
            .map(|(label, p)| (label.to_string(), *p))
            .collect()
    }

    #[test]
    fn categorizes_known_and_unknown_labels() {
        assert_eq!(categorize("Normal"), Severity::Benign);
        assert_eq!(categorize("MI"), Severity::Concerning);
        assert_eq!(categorize("HMI"), Severity::Concerning);
        assert_eq!(categorize("Abnormal"), Severity::Concerning);
        assert_eq!(categorize("normal"), Severity::Unknown);
        assert_eq!(categorize(""), Severity::Unknown);
        assert_eq!(categorize("Arrhythmia"), Severity::Unknown);
    }

    #[test]
    fn ranks_by_descending_probability() {
        let dist = distribution(&[("Normal", 0.93), ("MI", 0.04), ("HMI", 0.02), ("Abnormal", 0.01)]);
        let labels: Vec<&str> = rank_distribution(&dist).into_iter().map(|(l, _)| l).collect();
        assert_eq!(labels, vec!["Normal", "MI", "HMI", "Abnormal"]);
    }

    #[test]
    fn breaks_ties_by_ascending_label() {
        let dist = distribution(&[("MI", 0.25), ("Normal", 0.25), ("Abnormal", 0.25), ("HMI", 0.25)]);
        let labels: Vec<&str> = rank_distribution(&dist).into_iter().map(|(l, _)| l).collect();
        assert_eq!(labels, vec!["Abnormal", "HMI", "MI", "Normal"]);
    }

    #[test]
    fn signed_zeros_tie_and_fall_back_to_label_order() {
        let body = br#"{"class":"A","confidence":0.0,"predictions":{"A":-0.0,"B":0.0}}"#;
        let result = crate::models::analysis_types::parse_predict_response(body)
            .expect("zero probabilities are in range");
        let labels: Vec<&str> = rank_distribution(&result.distribution)
            .into_iter()
            .map(|(l, _)| l)
            .collect();
        assert_eq!(labels, vec!["A", "B"]);

        let dist = distribution(&[("B", -0.0), ("A", 0.0), ("C", 0.5)]);
        let labels: Vec<&str> = rank_distribution(&dist).into_iter().map(|(l, _)| l).collect();
        assert_eq!(labels, vec!["C", "A", "B"]);
    }

    #[test]
    fn every_known_class_has_a_severity_and_description() {
        for label in KNOWN_CLASSES {
            assert_ne!(categorize(label), Severity::Unknown, "{}", label);
            assert!(condition_description(label).is_some(), "{}", label);
        }
    }

    #[test]
    fn ranking_is_repeatable() {
        let dist = distribution(&[("b", 0.5), ("a", 0.5), ("c", 0.9), ("d", 0.1)]);
        let first = rank_distribution(&dist);
        for _ in 0..10 {
            assert_eq!(rank_distribution(&dist), first);
        }
    }

    #[test]
    fn shapes_result_with_predicted_flag() {
        let result = AnalysisResult {
            predicted_class: "MI".to_string(),
            confidence: 0.81,
            distribution: distribution(&[("MI", 0.8), ("Normal", 0.15), ("HMI", 0.05)]),
        };

        let view = shape_result(&result);
        assert_eq!(view.severity, Severity::Concerning);
        assert_eq!(view.confidence, 0.81);
        assert!(view.description.is_some());
        assert_eq!(view.ranked.len(), 3);
        assert!(view.ranked[0].is_predicted);
        assert_eq!(view.ranked[0].probability, 0.8);
        assert!(view.ranked[1..].iter().all(|entry| !entry.is_predicted));
        assert_eq!(view.ranked[1].severity, Severity::Benign);
    }

    #[test]
    fn formats_one_decimal_percent() {
        assert_eq!(format_percent(0.934), "93.4%");
        assert_eq!(format_percent(1.0), "100.0%");
        assert_eq!(format_percent(0.0), "0.0%");
    }

    #[test]
    fn unknown_label_has_no_description() {
        assert!(condition_description("Unknown").is_none());
        assert!(condition_description("Normal").is_some());
    }
}
