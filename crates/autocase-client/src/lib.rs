//! Client side of the analysis API: multipart upload of case documents.

#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "http")]
pub use http::{AnalyzeClient, ClientError};
