//! Terminal rendering of the three front-end views.
//!
//! Rendering builds a `String` so views can be checked without a terminal;
//! callers print the result.

use std::fmt::Write;
use std::path::PathBuf;

use autocase_core::{ParsedReport, Session, ViewState};

const INDENT: &str = "    ";

/// Which timeline entries show their details.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimelineView {
    Collapsed,
    Open(usize),
    All,
}

impl TimelineView {
    fn is_open(self, index: usize) -> bool {
        match self {
            TimelineView::Collapsed => false,
            TimelineView::Open(i) => i == index,
            TimelineView::All => true,
        }
    }
}

impl From<Option<usize>> for TimelineView {
    fn from(expanded: Option<usize>) -> Self {
        expanded.map_or(TimelineView::Collapsed, TimelineView::Open)
    }
}

/// Render whatever the session currently shows.
pub fn render_session(session: &Session) -> String {
    match session.state() {
        ViewState::Upload { files, error } => render_upload(files, error.as_deref()),
        ViewState::Loading { .. } => render_loading(),
        ViewState::Results { report, expanded } => {
            render_report(report, TimelineView::from(*expanded))
        }
    }
}

pub fn render_upload(files: &[PathBuf], error: Option<&str>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== Upload Legal Documents ===");
    if files.is_empty() {
        let _ = writeln!(out, "No files selected. Use `add <path>...` to choose documents.");
    } else {
        let _ = writeln!(out, "Selected: {} file(s)", files.len());
        for file in files {
            let _ = writeln!(out, "  {}", file.display());
        }
    }
    if let Some(error) = error {
        let _ = writeln!(out, "Error: {error}");
    }
    out
}

pub fn render_loading() -> String {
    "Analyzing...\n".to_string()
}

/// Render a parsed report: score card, timeline, then the main analysis.
pub fn render_report(report: &ParsedReport, timeline: TimelineView) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== Analysis Complete ===");

    if let Some(score) = &report.score {
        let _ = writeln!(out);
        let _ = writeln!(out, "--- Argument Strength Score ---");
        let _ = writeln!(out, "  {}", score.score);
        for line in score.justification.lines() {
            let _ = writeln!(out, "  {line}");
        }
    }

    if report.has_timeline() {
        let _ = writeln!(out);
        let _ = writeln!(out, "--- Case Timeline ---");
        let width = report.timeline.len().to_string().len();
        for (i, event) in report.timeline.iter().enumerate() {
            let open = timeline.is_open(i);
            let marker = if open { '-' } else { '+' };
            let _ = writeln!(
                out,
                "  [{:>width$}] {marker} {}: {}",
                i + 1,
                event.date,
                event.title
            );
            if open {
                for line in event.details.lines() {
                    let _ = writeln!(out, "{INDENT}{}", line.trim_start());
                }
            }
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "--- Analysis ---");
    let _ = writeln!(out, "{}", report.main_analysis);
    out
}

pub fn render_json(report: &ParsedReport) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use autocase_core::{ScoreResult, TimelineEvent};

    fn sample() -> ParsedReport {
        ParsedReport {
            timeline: vec![
                TimelineEvent {
                    date: "12 March 2019".into(),
                    title: "FIR registered".into(),
                    details: "Complaint lodged.".into(),
                },
                TimelineEvent {
                    date: "3 June 2019".into(),
                    title: "Charge sheet filed".into(),
                    details: "Filed under s.173 CrPC.\n  Cognisance taken.".into(),
                },
            ],
            score: Some(ScoreResult {
                score: "82/100".into(),
                justification: "- Precedent: 21/25\nStrong reasoning.".into(),
            }),
            main_analysis: "### 1. Case Docket\nState v. Sharma".into(),
        }
    }

    #[test]
    fn collapsed_timeline_hides_details() {
        let out = render_report(&sample(), TimelineView::Collapsed);
        assert!(out.contains("  [1] + 12 March 2019: FIR registered"));
        assert!(out.contains("  [2] + 3 June 2019: Charge sheet filed"));
        assert!(!out.contains("Complaint lodged."));
    }

    #[test]
    fn open_entry_shows_only_its_details() {
        let out = render_report(&sample(), TimelineView::Open(1));
        assert!(out.contains("  [2] - 3 June 2019: Charge sheet filed"));
        assert!(out.contains("    Filed under s.173 CrPC.\n    Cognisance taken."));
        assert!(!out.contains("Complaint lodged."));
    }

    #[test]
    fn score_precedes_timeline_precedes_analysis() {
        let out = render_report(&sample(), TimelineView::All);
        let score = out.find("--- Argument Strength Score ---").unwrap();
        let timeline = out.find("--- Case Timeline ---").unwrap();
        let analysis = out.find("--- Analysis ---").unwrap();
        assert!(score < timeline && timeline < analysis);
        assert!(out.contains("  82/100\n  - Precedent: 21/25\n  Strong reasoning."));
        assert!(out.contains("Complaint lodged."));
    }

    #[test]
    fn bare_report_has_no_score_or_timeline_sections() {
        let report = ParsedReport {
            main_analysis: "Just text.".into(),
            ..Default::default()
        };
        let out = render_report(&report, TimelineView::All);
        assert!(!out.contains("Argument Strength Score"));
        assert!(!out.contains("Case Timeline"));
        assert!(out.ends_with("--- Analysis ---\nJust text.\n"));
    }

    #[test]
    fn upload_view_counts_files_and_shows_error() {
        let files = vec![PathBuf::from("a.pdf"), PathBuf::from("b.pdf")];
        let out = render_upload(&files, Some("Backend server error."));
        assert!(out.contains("Selected: 2 file(s)"));
        assert!(out.contains("Error: Backend server error."));

        let empty = render_upload(&[], None);
        assert!(empty.contains("No files selected."));
        assert!(!empty.contains("Error:"));
    }

    #[test]
    fn fresh_session_renders_upload_view() {
        let out = render_session(&Session::new());
        assert!(out.starts_with("=== Upload Legal Documents ==="));
    }

    #[test]
    fn json_output_has_report_fields() {
        let json = render_json(&sample()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["timeline"].as_array().unwrap().len(), 2);
        assert_eq!(value["score"]["score"], "82/100");
    }
}
