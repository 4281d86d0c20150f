// Copyright (c) rpc_server_policy contributors.
// Licensed under the MIT License.

//! The response an application hands back once command execution
//! completes.

use bytes::Bytes;

/// Lower bound (inclusive) of the HTTP-style success range.
pub const SUCCESS_STATUS_LOW: u16 = 200;
/// Upper bound (exclusive) of the HTTP-style success range.
pub const SUCCESS_STATUS_HIGH: u16 = 300;

/// The application's outcome for a previously dispatched command request.
///
/// Correlation between this and its triggering [`crate::request::ExecutionRequest`]
/// is carried end-to-end by the application: this policy does not track
/// per-request state, so `correlation_id`, `response_topic`, and
/// `request_topic` here must be echoed from the request.
#[derive(Debug, Clone)]
pub struct ExecutionResponse {
    /// Echoed from the triggering request.
    pub correlation_id: Bytes,
    /// Echoed from the triggering request; where the reply is published.
    pub response_topic: String,
    /// Echoed from the triggering request; used to route the response to
    /// the server whose subscription it belongs to.
    pub request_topic: String,
    /// HTTP-style status. `200..300` is success.
    pub status: u16,
    /// Content type of `response`, used only on the success path.
    pub content_type: String,
    /// Response payload, used only on the success path.
    pub response: Bytes,
    /// Human-readable failure detail, used only on the failure path. Must
    /// be a valid (possibly empty) byte span.
    pub error_message: Bytes,
}

impl ExecutionResponse {
    /// Returns true if `status` falls in `200..300`.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (SUCCESS_STATUS_LOW..SUCCESS_STATUS_HIGH).contains(&self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_200_is_success() {
        let resp = sample_response(200);
        assert!(resp.is_success());
    }

    #[test]
    fn status_299_is_success() {
        assert!(sample_response(299).is_success());
    }

    #[test]
    fn status_300_is_failure() {
        assert!(!sample_response(300).is_success());
    }

    #[test]
    fn status_199_is_failure() {
        assert!(!sample_response(199).is_success());
    }

    fn sample_response(status: u16) -> ExecutionResponse {
        ExecutionResponse {
            correlation_id: Bytes::from_static(b"corr"),
            response_topic: "r/1".to_string(),
            request_topic: "vehicles/m1/commands/c1/get".to_string(),
            status,
            content_type: "text/plain".to_string(),
            response: Bytes::from_static(b"OK"),
            error_message: Bytes::new(),
        }
    }
}
