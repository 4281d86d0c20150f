// Copyright (c) rpc_server_policy contributors.
// Licensed under the MIT License.

//! The state machine's shape: the tagged-variant state, the events it
//! consumes, and the parent lookup. Dispatch itself lives on
//! [`crate::policy::RpcServer`], which is the only place that has the
//! fields (`pending_subscription_id`, the timer, the connection) the
//! handlers need to mutate.

use crate::connection::SubscriptionId;
use crate::properties::InboundProperties;
use crate::response::ExecutionResponse;
use crate::timer::TimerId;

/// The policy's current substate. `root` is not a variant here — it is
/// never the *current* state, only the superstate every substate escalates
/// to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyState {
    /// Awaiting (or having completed) the subscription handshake; the only
    /// state in which requests are dispatched.
    Waiting,
    /// Terminal. Entered once, on subscribe timeout or shutdown, and never
    /// left.
    Faulted,
}

/// State handlers, used only for the parent lookup. Unlike a
/// function-pointer state table, Rust's enum exhaustiveness makes "any
/// other handler is a programming error" unrepresentable rather than a
/// runtime check: there is no value of this type the lookup can receive
/// that isn't one of these three.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateHandler {
    /// The superstate.
    Root,
    /// Mirrors [`PolicyState::Waiting`].
    Waiting,
    /// Mirrors [`PolicyState::Faulted`].
    Faulted,
}

impl StateHandler {
    /// `root → None`; `waiting, faulted → root`.
    #[must_use]
    pub fn parent(self) -> Option<StateHandler> {
        match self {
            StateHandler::Root => None,
            StateHandler::Waiting | StateHandler::Faulted => Some(StateHandler::Root),
        }
    }
}

impl From<PolicyState> for StateHandler {
    fn from(state: PolicyState) -> Self {
        match state {
            PolicyState::Waiting => StateHandler::Waiting,
            PolicyState::Faulted => StateHandler::Faulted,
        }
    }
}

/// Inbound events the policy consumes.
#[derive(Debug)]
pub enum Event<'a> {
    /// Acknowledgment of a previously submitted subscribe.
    SubackRsp {
        /// The subscription id the ack acknowledges.
        id: SubscriptionId,
    },
    /// An inbound publication delivered by the connection.
    PubRecvInd {
        /// The concrete topic the publication arrived on.
        topic: &'a str,
        /// The publication payload.
        payload: &'a [u8],
        /// The publication's MQTT5 properties.
        properties: InboundProperties<'a>,
    },
    /// The application's outcome for a previously dispatched request.
    ExecuteCommandRsp(ExecutionResponse),
    /// A previously started timer firing.
    Timeout {
        /// The timer that fired.
        timer_id: TimerId,
    },
    /// An unrecoverable internal error to be forwarded to the inbound
    /// policy edge.
    InternalError(String),
    /// Connection lifecycle noise absorbed as a no-op.
    ConnectionOpenReq,
    /// Connection lifecycle noise; see [`Event::ConnectionOpenReq`].
    ConnectRsp,
    /// Connection lifecycle noise; see [`Event::ConnectionOpenReq`].
    ConnectionCloseReq,
    /// Connection lifecycle noise; see [`Event::ConnectionOpenReq`].
    DisconnectRsp,
    /// Connection lifecycle noise; see [`Event::ConnectionOpenReq`].
    PubAckRsp,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_has_no_parent() {
        assert_eq!(StateHandler::Root.parent(), None);
    }

    #[test]
    fn waiting_and_faulted_parent_is_root() {
        assert_eq!(StateHandler::Waiting.parent(), Some(StateHandler::Root));
        assert_eq!(StateHandler::Faulted.parent(), Some(StateHandler::Root));
    }

    #[test]
    fn policy_state_maps_onto_its_handler() {
        assert_eq!(StateHandler::from(PolicyState::Waiting), StateHandler::Waiting);
        assert_eq!(StateHandler::from(PolicyState::Faulted), StateHandler::Faulted);
    }
}
