//! Structured fragments sliced out of an analysis report.

use serde::{Deserialize, Serialize};

/// One dated entry from the report's case timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEvent {
    pub date: String,
    pub title: String,
    pub details: String,
}

/// The argument strength score, e.g. `82/100`, with the text that follows it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreResult {
    /// Fraction in `N/M` form, exactly as written after `SCORE:`.
    pub score: String,
    pub justification: String,
}

/// A report split into timeline, score, and everything else.
///
/// Derived fresh from each API response; never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedReport {
    pub timeline: Vec<TimelineEvent>,
    pub score: Option<ScoreResult>,
    pub main_analysis: String,
}

impl ParsedReport {
    pub fn has_timeline(&self) -> bool {
        !self.timeline.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parsed_report_json_shape() {
        let report = ParsedReport {
            timeline: vec![TimelineEvent {
                date: "12 March 2019".into(),
                title: "FIR registered".into(),
                details: "Complaint lodged at the local police station.".into(),
            }],
            score: Some(ScoreResult {
                score: "82/100".into(),
                justification: "Strong reasoning.".into(),
            }),
            main_analysis: "### 1. Case Docket".into(),
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["timeline"][0]["date"], "12 March 2019");
        assert_eq!(json["score"]["score"], "82/100");
        assert_eq!(json["main_analysis"], "### 1. Case Docket");
    }

    #[test]
    fn absent_score_serialises_as_null() {
        let report = ParsedReport::default();
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"score\":null"));
        let parsed: ParsedReport = serde_json::from_str(&json).unwrap();
        assert!(parsed.score.is_none());
        assert!(!parsed.has_timeline());
    }
}
