// Copyright (c) rpc_server_policy contributors.
// Licensed under the MIT License.

//! Error taxonomy for the RPC server policy.

use std::fmt;

/// Errors returned synchronously from the public operations.
///
/// Protocol errors detected while processing an inbound publication never
/// surface through this type — they cause the event to be dropped and are
/// only observable via logs.
#[derive(thiserror::Error, Debug)]
pub enum PolicyError {
    /// A precondition on a function argument was violated.
    #[error("invalid argument '{property_name}': {message}")]
    ArgumentInvalid {
        /// Name of the offending argument.
        property_name: &'static str,
        /// Human-readable explanation.
        message: String,
    },

    /// The operation is not supported given the policy's current internal
    /// bookkeeping (e.g. a connection is missing, or a subscribe is already
    /// in flight).
    #[error("operation not supported in current state: {message}")]
    NotSupported {
        /// Human-readable explanation.
        message: String,
    },

    /// The faulted state returns this for every event it receives: a fixed
    /// error, no side effects, no outbound events.
    #[error("policy is faulted; event dropped")]
    StateInvalid,
}

impl PolicyError {
    pub(crate) fn argument_invalid(property_name: &'static str, message: impl Into<String>) -> Self {
        PolicyError::ArgumentInvalid {
            property_name,
            message: message.into(),
        }
    }

    pub(crate) fn not_supported(message: impl Into<String>) -> Self {
        PolicyError::NotSupported {
            message: message.into(),
        }
    }
}

/// Reason an inbound publication's request intake was abandoned. Never
/// returned to a caller; only logged and used to decide that the event is
/// dropped.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum ProtocolError {
    MissingResponseTopic,
    MissingCorrelationData,
    MissingContentType,
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::MissingResponseTopic => write!(f, "response_topic property missing"),
            ProtocolError::MissingCorrelationData => {
                write!(f, "correlation_data property missing")
            }
            ProtocolError::MissingContentType => write!(f, "content_type property missing"),
        }
    }
}

/// Halts the process for an invariant violation. Stands in for a platform
/// critical-error hook, reserved for states that a correct implementation
/// can never reach.
macro_rules! critical_error {
    ($($arg:tt)*) => {{
        log::error!($($arg)*);
        unreachable!($($arg)*)
    }};
}

pub(crate) use critical_error;
