//! View state machine for one front-end instance.
//!
//! ```text
//! Upload --submit--> Loading --ok--> Results --another--> Upload
//!                       \--err--> Upload (with error)
//! ```
//!
//! `submit` holds `&mut self` across the request, so at most one analysis is
//! ever in flight.

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::error::{AnalyzeError, SessionError};
use crate::parser::parse_report;
use crate::report::ParsedReport;

/// Sends documents to the analysis API and returns the markdown report.
#[async_trait]
pub trait Analyzer: Send + Sync {
    async fn analyze(&self, files: &[PathBuf]) -> Result<String, AnalyzeError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState {
    /// Idle: choosing files, possibly showing the last failure.
    Upload {
        files: Vec<PathBuf>,
        error: Option<String>,
    },
    /// A request is in flight.
    Loading { files: Vec<PathBuf> },
    /// A parsed report is on screen. `expanded` is the open timeline entry.
    Results {
        report: ParsedReport,
        expanded: Option<usize>,
    },
}

impl Default for ViewState {
    fn default() -> Self {
        ViewState::Upload {
            files: Vec::new(),
            error: None,
        }
    }
}

#[derive(Debug, Default)]
pub struct Session {
    state: ViewState,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// Replace the selection. Clears any error on display.
    pub fn select_files<I>(&mut self, paths: I) -> Result<(), SessionError>
    where
        I: IntoIterator<Item = PathBuf>,
    {
        match &mut self.state {
            ViewState::Upload { files, error } => {
                *files = paths.into_iter().collect();
                *error = None;
                Ok(())
            }
            ViewState::Loading { .. } => Err(SessionError::Busy),
            ViewState::Results { .. } => Err(SessionError::NotInUpload),
        }
    }

    pub fn clear_selection(&mut self) -> Result<(), SessionError> {
        self.select_files(Vec::new())
    }

    pub fn selected_files(&self) -> &[PathBuf] {
        match &self.state {
            ViewState::Upload { files, .. } | ViewState::Loading { files } => files.as_slice(),
            ViewState::Results { .. } => &[],
        }
    }

    /// Submission is enabled only while idle with at least one file chosen.
    pub fn can_submit(&self) -> bool {
        matches!(&self.state, ViewState::Upload { files, .. } if !files.is_empty())
    }

    /// Run one analysis: Upload → Loading → Results, or back to Upload with
    /// the failure message.
    ///
    /// Returns `Err` only when the submission is refused outright; in that case
    /// `analyzer` is never called. An analysis failure is reported through the
    /// resulting Upload state.
    ///
    /// Loading is only observable if this future is dropped mid-request. There
    /// is no cancellation path, so the session then stays in Loading and
    /// refuses further submissions and selections with [`SessionError::Busy`].
    pub async fn submit(&mut self, analyzer: &dyn Analyzer) -> Result<(), SessionError> {
        let files = match &mut self.state {
            ViewState::Upload { files, .. } if files.is_empty() => {
                return Err(SessionError::NoFiles);
            }
            ViewState::Upload { files, .. } => std::mem::take(files),
            ViewState::Loading { .. } => return Err(SessionError::Busy),
            ViewState::Results { .. } => return Err(SessionError::NotInUpload),
        };

        info!(files = files.len(), "submitting documents for analysis");
        self.state = ViewState::Loading {
            files: files.clone(),
        };

        self.state = match analyzer.analyze(&files).await {
            Ok(markdown) => {
                let report = parse_report(&markdown);
                info!(
                    events = report.timeline.len(),
                    scored = report.score.is_some(),
                    "analysis complete"
                );
                ViewState::Results {
                    report,
                    expanded: None,
                }
            }
            Err(err) => {
                warn!(error = %err, "analysis failed");
                ViewState::Upload {
                    files: Vec::new(),
                    error: Some(err.user_message()),
                }
            }
        };
        Ok(())
    }

    /// Accordion behaviour: open entry `index`, or close it if already open.
    /// Out-of-range indices are ignored.
    pub fn toggle_event(&mut self, index: usize) -> Result<(), SessionError> {
        let ViewState::Results { report, expanded } = &mut self.state else {
            return Err(SessionError::NotInResults);
        };
        if index >= report.timeline.len() {
            return Ok(());
        }
        *expanded = if *expanded == Some(index) {
            None
        } else {
            Some(index)
        };
        Ok(())
    }

    /// Results → Upload, dropping every trace of the previous analysis.
    pub fn analyze_another(&mut self) -> Result<(), SessionError> {
        if !matches!(self.state, ViewState::Results { .. }) {
            return Err(SessionError::NotInResults);
        }
        self.state = ViewState::default();
        Ok(())
    }

    pub fn report(&self) -> Option<&ParsedReport> {
        match &self.state {
            ViewState::Results { report, .. } => Some(report),
            _ => None,
        }
    }

    pub fn expanded(&self) -> Option<usize> {
        match &self.state {
            ViewState::Results { expanded, .. } => *expanded,
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            ViewState::Upload { error, .. } => error.as_deref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    const REPORT: &str = "\
### 1. Case Docket
Bench of three judges.
### 3. Case Timeline
- **2019:** Trial
  - **Details:** Conviction recorded.
- **2021:** Appeal
  - **Details:** Conviction reversed.
### 4. Critical Analysis
- **Argument Strength Score:**
SCORE: 75/100
Balanced reasoning.
";

    struct FakeAnalyzer {
        calls: AtomicUsize,
        seen: Mutex<Vec<PathBuf>>,
        response: Result<String, AnalyzeError>,
    }

    impl FakeAnalyzer {
        fn new(response: Result<String, AnalyzeError>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                seen: Mutex::new(Vec::new()),
                response,
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Analyzer for FakeAnalyzer {
        async fn analyze(&self, files: &[PathBuf]) -> Result<String, AnalyzeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().unwrap().extend_from_slice(files);
            self.response.clone()
        }
    }

    /// Never answers.
    struct StalledAnalyzer;

    #[async_trait]
    impl Analyzer for StalledAnalyzer {
        async fn analyze(&self, _files: &[PathBuf]) -> Result<String, AnalyzeError> {
            std::future::pending().await
        }
    }

    fn files(names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(PathBuf::from).collect()
    }

    #[tokio::test]
    async fn zero_files_never_calls_analyzer() {
        let analyzer = FakeAnalyzer::new(Ok(REPORT.into()));
        let mut session = Session::new();

        assert!(!session.can_submit());
        assert_eq!(session.submit(&analyzer).await, Err(SessionError::NoFiles));
        assert_eq!(analyzer.calls(), 0);
        assert_eq!(session.state(), &ViewState::default());
        assert!(session.error().is_none());
    }

    #[tokio::test]
    async fn success_moves_to_results() {
        let analyzer = FakeAnalyzer::new(Ok(REPORT.into()));
        let mut session = Session::new();
        session.select_files(files(&["a.pdf", "b.pdf"])).unwrap();
        assert!(session.can_submit());

        session.submit(&analyzer).await.unwrap();

        assert_eq!(analyzer.calls(), 1);
        assert_eq!(*analyzer.seen.lock().unwrap(), files(&["a.pdf", "b.pdf"]));
        let report = session.report().expect("results state");
        assert_eq!(report.timeline.len(), 2);
        assert_eq!(report.score.as_ref().unwrap().score, "75/100");
        assert!(report.main_analysis.starts_with("### 1. Case Docket"));
        assert_eq!(session.expanded(), None);
        assert!(!session.can_submit());
    }

    #[tokio::test]
    async fn failure_returns_to_upload_with_detail() {
        let analyzer = FakeAnalyzer::new(Err(AnalyzeError::Server {
            status: 500,
            detail: Some("AI model error: quota exceeded".into()),
        }));
        let mut session = Session::new();
        session.select_files(files(&["a.pdf"])).unwrap();

        session.submit(&analyzer).await.unwrap();

        assert_eq!(session.error(), Some("AI model error: quota exceeded"));
        assert!(session.selected_files().is_empty());
        assert!(session.report().is_none());
        assert!(!session.can_submit());
    }

    #[tokio::test]
    async fn transport_failure_shows_generic_message() {
        let analyzer =
            FakeAnalyzer::new(Err(AnalyzeError::Transport("connection refused".into())));
        let mut session = Session::new();
        session.select_files(files(&["a.pdf"])).unwrap();

        session.submit(&analyzer).await.unwrap();

        assert_eq!(session.error(), Some(crate::GENERIC_FAILURE));
    }

    #[tokio::test]
    async fn selecting_files_clears_error() {
        let analyzer = FakeAnalyzer::new(Err(AnalyzeError::Transport("down".into())));
        let mut session = Session::new();
        session.select_files(files(&["a.pdf"])).unwrap();
        session.submit(&analyzer).await.unwrap();
        assert!(session.error().is_some());

        session.select_files(files(&["c.pdf"])).unwrap();
        assert!(session.error().is_none());
        assert_eq!(session.selected_files(), files(&["c.pdf"]).as_slice());
    }

    #[tokio::test]
    async fn results_refuse_submit_and_selection() {
        let analyzer = FakeAnalyzer::new(Ok(REPORT.into()));
        let mut session = Session::new();
        session.select_files(files(&["a.pdf"])).unwrap();
        session.submit(&analyzer).await.unwrap();

        assert_eq!(
            session.submit(&analyzer).await,
            Err(SessionError::NotInUpload)
        );
        assert_eq!(
            session.select_files(files(&["b.pdf"])),
            Err(SessionError::NotInUpload)
        );
        assert_eq!(analyzer.calls(), 1);
    }

    #[tokio::test]
    async fn accordion_keeps_at_most_one_open() {
        let analyzer = FakeAnalyzer::new(Ok(REPORT.into()));
        let mut session = Session::new();
        session.select_files(files(&["a.pdf"])).unwrap();
        session.submit(&analyzer).await.unwrap();

        session.toggle_event(0).unwrap();
        assert_eq!(session.expanded(), Some(0));
        session.toggle_event(1).unwrap();
        assert_eq!(session.expanded(), Some(1));
        session.toggle_event(1).unwrap();
        assert_eq!(session.expanded(), None);
        session.toggle_event(7).unwrap();
        assert_eq!(session.expanded(), None);
    }

    #[tokio::test]
    async fn analyze_another_resets_everything() {
        let analyzer = FakeAnalyzer::new(Ok(REPORT.into()));
        let mut session = Session::new();
        session.select_files(files(&["a.pdf"])).unwrap();
        session.submit(&analyzer).await.unwrap();
        session.toggle_event(0).unwrap();

        session.analyze_another().unwrap();

        assert_eq!(session.state(), &ViewState::default());
        assert_eq!(session.analyze_another(), Err(SessionError::NotInResults));
    }

    #[tokio::test]
    async fn dropped_submit_leaves_session_loading() {
        let mut session = Session::new();
        session.select_files(files(&["a.pdf"])).unwrap();

        let attempt =
            tokio::time::timeout(Duration::from_millis(20), session.submit(&StalledAnalyzer)).await;
        assert!(attempt.is_err());

        assert_eq!(
            session.state(),
            &ViewState::Loading {
                files: files(&["a.pdf"])
            }
        );
        assert!(!session.can_submit());
        assert_eq!(session.submit(&StalledAnalyzer).await, Err(SessionError::Busy));
        assert_eq!(
            session.select_files(files(&["b.pdf"])),
            Err(SessionError::Busy)
        );
        assert_eq!(session.selected_files(), files(&["a.pdf"]).as_slice());
    }

    #[test]
    fn toggle_outside_results_is_refused() {
        let mut session = Session::new();
        assert_eq!(session.toggle_event(0), Err(SessionError::NotInResults));
    }
}
