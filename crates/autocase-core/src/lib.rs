pub mod error;
pub mod parser;
pub mod report;
pub mod session;

pub use error::{AnalyzeError, GENERIC_FAILURE, SessionError};
pub use parser::parse_report;
pub use report::{ParsedReport, ScoreResult, TimelineEvent};
pub use session::{Analyzer, Session, ViewState};
