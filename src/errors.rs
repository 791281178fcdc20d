//! The errors a remote can run into.
//!
//! Operations return a plain `failure::Error`; these are the causes attached
//! to it, so callers can use `downcast_ref()` to tell them apart.

/// The request never produced a complete response body.
///
/// Connection failures, DNS failures, timeouts and interrupted body reads all
/// end up here.
#[derive(Debug, Fail)]
#[fail(display = "Request to {} failed", url)]
pub struct TransportError {
    pub url: String,
    #[cause]
    pub inner: reqwest::Error,
}

/// A response body wasn't valid JSON, or didn't have the expected shape.
#[derive(Debug, Fail)]
#[fail(display = "Unable to decode the {}", what)]
pub struct DecodeError {
    pub what: &'static str,
    #[cause]
    pub inner: serde_json::Error,
}

impl DecodeError {
    pub(crate) fn new(what: &'static str, inner: serde_json::Error) -> DecodeError {
        DecodeError { what, inner }
    }
}
