// Copyright (c) rpc_server_policy contributors.
// Licensed under the MIT License.

//! The request assembled per inbound publication and handed to the
//! application's callback.

/// A command request assembled from a matching inbound publication.
///
/// Borrows into the bytes of the triggering publish; valid only for the
/// duration of the callback that receives it. An application that needs to
/// retain any of these fields beyond the callback must copy them first.
#[derive(Debug, Clone, Copy)]
pub struct ExecutionRequest<'a> {
    /// Opaque correlation bytes to echo back in the response.
    pub correlation_id: &'a [u8],
    /// Topic the response publish must be sent to.
    pub response_topic: &'a str,
    /// The concrete topic the request arrived on.
    pub request_topic: &'a str,
    /// The request payload.
    pub request_data: &'a [u8],
    /// The `CONTENT_TYPE` property of the request. Required: a missing
    /// content type is a protocol error that drops the event before an
    /// `ExecutionRequest` is ever assembled.
    pub content_type: &'a str,
}
