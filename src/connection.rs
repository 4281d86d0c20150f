// Copyright (c) rpc_server_policy contributors.
// Licensed under the MIT License.

//! The boundary to the enclosing MQTT connection: subscribe, unsubscribe,
//! publish, the up-call that delivers a validated request to the
//! application, and the error-forwarding hook used for unrecoverable
//! internal failures.
//!
//! Every method here is synchronous. The policy itself never suspends, so
//! any asynchrony a real transport needs lives behind these methods, not in
//! the state machine that calls them.

use bytes::Bytes;

use crate::properties::PropertyBag;
use crate::request::ExecutionRequest;

/// MQTT Quality of Service, restricted to the levels this policy assigns to
/// its own subscribe/publish traffic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Qos {
    /// QoS 0.
    AtMostOnce,
    /// QoS 1.
    AtLeastOnce,
    /// QoS 2.
    ExactlyOnce,
}

/// Identifier assigned by the transport when a subscribe is submitted.
/// Monotonic per MQTT session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u32);

/// The outbound edge of the policy.
pub trait Connection {
    /// Submits a subscribe for `topic_filter` at `qos` and returns the
    /// subscription id the transport assigned.
    fn submit_subscribe(&mut self, topic_filter: &str, qos: Qos) -> SubscriptionId;

    /// Submits an unsubscribe for `topic_filter`. Called once, when the
    /// server is shut down.
    fn submit_unsubscribe(&mut self, topic_filter: &str);

    /// Submits a publish.
    fn submit_publish(&mut self, topic: &str, qos: Qos, payload: Bytes, properties: &PropertyBag);

    /// Invokes the connection's application callback with a validated
    /// request. Synchronous; the application may queue the work and return
    /// immediately.
    fn on_execute_command_req(&mut self, request: &ExecutionRequest<'_>);

    /// Forwards an unrecoverable internal error to the inbound policy edge.
    /// Returns `Err` if the forward itself fails, which the caller treats
    /// as a critical error and halts.
    fn forward_error(&mut self, message: &str) -> Result<(), ()>;
}
