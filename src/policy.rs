// Copyright (c) rpc_server_policy contributors.
// Licensed under the MIT License.

//! The public operations and the `RpcServer` state machine they drive.

use std::time::Duration;

use crate::connection::{Connection, Qos, SubscriptionId};
use crate::error::{critical_error, PolicyError, ProtocolError};
use crate::hfsm::{Event, PolicyState};
use crate::properties::{PropertyBag, STATUS_MESSAGE_PROPERTY, STATUS_PROPERTY};
use crate::request::ExecutionRequest;
use crate::response::ExecutionResponse;
use crate::timer::{SubscriptionTimer, TimerId};
use crate::topic::{build_subscription_topic, topic_matches};

/// Default QoS assigned to both the subscribe and response-publish traffic
/// this policy emits.
pub const RPC_QOS: Qos = Qos::AtLeastOnce;
/// Default bound, in seconds, on the subscribe handshake.
pub const DEFAULT_SUBSCRIBE_TIMEOUT_SECONDS: u64 = 10;

/// Construction-time options for an [`RpcServer`].
#[derive(derive_builder::Builder, Debug, Clone, Copy, PartialEq, Eq)]
#[builder(setter(into))]
pub struct RpcServerOptions {
    /// QoS used for the subscribe.
    #[builder(default = "RPC_QOS")]
    pub subscribe_qos: Qos,
    /// QoS used for response publishes.
    #[builder(default = "RPC_QOS")]
    pub response_qos: Qos,
    /// Bound, in seconds, on the subscribe handshake.
    #[builder(default = "DEFAULT_SUBSCRIBE_TIMEOUT_SECONDS")]
    pub subscribe_timeout_seconds: u64,
}

impl Default for RpcServerOptions {
    fn default() -> Self {
        RpcServerOptionsBuilder::default()
            .build()
            .expect("every field has a default")
    }
}

/// The options an [`RpcServer`] uses when none are supplied to
/// [`RpcServer::init`].
#[must_use]
pub fn options_default() -> RpcServerOptions {
    RpcServerOptions::default()
}

/// A command-endpoint state machine built on top of a single MQTT5
/// subscription.
///
/// Generic over its two external collaborators so tests can substitute
/// in-memory fakes without any dynamic dispatch.
pub struct RpcServer<C: Connection, T: SubscriptionTimer> {
    connection: Option<C>,
    timer: T,
    subscription_topic: Box<str>,
    property_bag: PropertyBag,
    options: RpcServerOptions,
    pending_subscription_id: Option<SubscriptionId>,
    rpc_server_timer: Option<TimerId>,
    state: PolicyState,
}

impl<C: Connection, T: SubscriptionTimer> RpcServer<C, T> {
    /// Builds the subscription filter from `model_id`, `client_id`, and
    /// `command_name`, and returns a server in the `waiting` state.
    ///
    /// `connection` may be `None`; it can be attached later by constructing
    /// a fresh server once the connection exists.
    ///
    /// # Errors
    /// Returns [`PolicyError::ArgumentInvalid`] if the topic cannot be
    /// built.
    pub fn init(
        connection: Option<C>,
        timer: T,
        model_id: &str,
        client_id: &str,
        command_name: &str,
        options: Option<RpcServerOptions>,
    ) -> Result<Self, PolicyError> {
        let subscription_topic = build_subscription_topic(model_id, client_id, command_name)?;
        Ok(RpcServer {
            connection,
            timer,
            subscription_topic,
            property_bag: PropertyBag::default(),
            options: options.unwrap_or_default(),
            pending_subscription_id: None,
            rpc_server_timer: None,
            state: PolicyState::Waiting,
        })
    }

    /// The current state.
    #[must_use]
    pub fn state(&self) -> PolicyState {
        self.state
    }

    /// The subscription filter this server was built with.
    #[must_use]
    pub fn subscription_topic(&self) -> &str {
        &self.subscription_topic
    }

    /// Submits the subscribe and starts the handshake timer.
    ///
    /// # Errors
    /// [`PolicyError::NotSupported`] if no connection is attached, or if a
    /// subscribe is already outstanding — concurrent registrations are
    /// rejected rather than silently coalesced or restarted.
    pub fn register(&mut self) -> Result<(), PolicyError> {
        if self.pending_subscription_id.is_some() {
            return Err(PolicyError::not_supported(
                "a subscribe is already in flight for this server",
            ));
        }
        let Some(connection) = self.connection.as_mut() else {
            return Err(PolicyError::not_supported("register requires an attached connection"));
        };

        let timer_id = self
            .timer
            .start(Duration::from_secs(self.options.subscribe_timeout_seconds));
        let subscription_id = connection.submit_subscribe(&self.subscription_topic, self.options.subscribe_qos);

        self.rpc_server_timer = Some(timer_id);
        self.pending_subscription_id = Some(subscription_id);
        Ok(())
    }

    /// The application hands back a completed [`ExecutionResponse`], which
    /// this feeds through the state machine.
    ///
    /// # Errors
    /// [`PolicyError::ArgumentInvalid`] if `correlation_id` or
    /// `response_topic` is empty. [`PolicyError::StateInvalid`] if the
    /// policy is faulted.
    pub fn execution_finish(&mut self, response: ExecutionResponse) -> Result<(), PolicyError> {
        if response.correlation_id.is_empty() {
            return Err(PolicyError::argument_invalid(
                "correlation_id",
                "must be non-empty",
            ));
        }
        if response.response_topic.is_empty() {
            return Err(PolicyError::argument_invalid(
                "response_topic",
                "must be non-empty",
            ));
        }
        self.handle_event(Event::ExecuteCommandRsp(response))
    }

    /// Unsubscribes, stops any pending handshake timer, and transitions
    /// directly to `faulted`, blocking all further events. A no-op if the
    /// server is already faulted.
    pub fn shutdown(&mut self) {
        if self.state == PolicyState::Faulted {
            return;
        }
        self.stop_pending_timer();
        if let Some(connection) = self.connection.as_mut() {
            connection.submit_unsubscribe(&self.subscription_topic);
        }
        self.transition_to_faulted("shutdown requested");
    }

    /// Feeds one event through the dispatch loop: `waiting` first,
    /// escalating to `root` only for what `waiting` doesn't handle.
    pub fn handle_event(&mut self, event: Event<'_>) -> Result<(), PolicyError> {
        match self.state {
            PolicyState::Faulted => {
                log::debug!("faulted: dropping event {event:?}");
                Err(PolicyError::StateInvalid)
            }
            PolicyState::Waiting => {
                if let Some(escalated) = self.handle_waiting(event) {
                    self.handle_root(escalated);
                }
                Ok(())
            }
        }
    }

    /// Handles one event while in `waiting`. Returns `Some(event)` to
    /// escalate to `root`, or `None` if fully handled here.
    fn handle_waiting<'a>(&mut self, event: Event<'a>) -> Option<Event<'a>> {
        match event {
            Event::SubackRsp { id } => {
                if self.pending_subscription_id == Some(id) {
                    self.stop_pending_timer();
                    self.pending_subscription_id = None;
                } else {
                    log::debug!("ignoring suback for unrelated subscription {id:?}");
                }
                None
            }
            Event::Timeout { timer_id } => {
                if self.rpc_server_timer == Some(timer_id) {
                    self.rpc_server_timer = None;
                    self.transition_to_faulted("subscribe handshake timed out");
                } else {
                    log::debug!("ignoring timeout for unrelated timer {timer_id:?}");
                }
                None
            }
            Event::PubRecvInd { topic, payload, properties } => {
                if topic_matches(&self.subscription_topic, topic) {
                    if self.pending_subscription_id.is_some() {
                        self.stop_pending_timer();
                        self.pending_subscription_id = None;
                    }
                    self.dispatch_request(topic, payload, properties);
                } else {
                    log::debug!("ignoring publication on non-matching topic '{topic}'");
                }
                None
            }
            Event::ExecuteCommandRsp(response) => {
                if topic_matches(&self.subscription_topic, &response.request_topic) {
                    self.assemble_and_publish_response(response);
                } else {
                    log::debug!(
                        "ignoring execute_command_rsp for sibling server's topic '{}'",
                        response.request_topic
                    );
                }
                None
            }
            Event::ConnectionOpenReq
            | Event::ConnectRsp
            | Event::ConnectionCloseReq
            | Event::DisconnectRsp
            | Event::PubAckRsp => {
                // Lifecycle noise, absorbed.
                None
            }
            internal_error @ Event::InternalError(_) => Some(internal_error),
        }
    }

    /// Handles an event escalated from `waiting`.
    fn handle_root(&mut self, event: Event<'_>) {
        match event {
            Event::InternalError(message) => {
                let Some(connection) = self.connection.as_mut() else {
                    critical_error!("internal error with no attached connection: {message}");
                };
                if connection.forward_error(&message).is_err() {
                    critical_error!("failed to forward internal error to inbound policy edge: {message}");
                }
            }
            other => {
                log::debug!("root: absorbing unhandled event {other:?}");
            }
        }
    }

    fn stop_pending_timer(&mut self) {
        if let Some(timer_id) = self.rpc_server_timer.take() {
            self.timer.stop(timer_id);
        }
    }

    fn transition_to_faulted(&mut self, reason: &str) {
        self.state = PolicyState::Faulted;
        log::error!("policy transitioning to faulted: {reason}");
    }

    /// Validates the MQTT5 properties a request needs, dropping the event
    /// on any protocol error rather than returning one to a caller.
    fn dispatch_request(&mut self, topic: &str, payload: &[u8], properties: crate::properties::InboundProperties<'_>) {
        let Some(response_topic) = properties.response_topic.filter(|rt| !rt.is_empty()) else {
            log::warn!("dropping request on '{topic}': {}", ProtocolError::MissingResponseTopic);
            return;
        };
        let Some(correlation_data) = properties.correlation_data else {
            log::warn!("dropping request on '{topic}': {}", ProtocolError::MissingCorrelationData);
            return;
        };
        let Some(content_type) = properties.content_type else {
            log::warn!("dropping request on '{topic}': {}", ProtocolError::MissingContentType);
            return;
        };

        let Some(connection) = self.connection.as_mut() else {
            critical_error!("inbound publication processed with no attached connection");
        };

        let request = ExecutionRequest {
            correlation_id: correlation_data,
            response_topic,
            request_topic: topic,
            request_data: payload,
            content_type,
        };
        connection.on_execute_command_req(&request);
    }

    /// Assembles the status/statusMessage/content-type/correlation-data
    /// properties, publishes, then clears the bag for reuse.
    fn assemble_and_publish_response(&mut self, response: ExecutionResponse) {
        debug_assert!(
            self.property_bag.is_empty(),
            "property bag must be empty before a response is assembled"
        );

        let payload = if response.is_success() {
            self.property_bag.set_content_type(response.content_type.clone());
            response.response.clone()
        } else {
            let message = String::from_utf8_lossy(&response.error_message).into_owned();
            self.property_bag.push_user_property(STATUS_MESSAGE_PROPERTY, message);
            bytes::Bytes::new()
        };
        self.property_bag
            .push_user_property(STATUS_PROPERTY, response.status.to_string());
        self.property_bag.set_correlation_data(response.correlation_id.clone());

        let Some(connection) = self.connection.as_mut() else {
            critical_error!("command response processed with no attached connection");
        };
        connection.submit_publish(
            &response.response_topic,
            self.options.response_qos,
            payload,
            &self.property_bag,
        );

        self.property_bag.clear();
    }
}
