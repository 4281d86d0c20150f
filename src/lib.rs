// Copyright (c) rpc_server_policy contributors.
// Licensed under the MIT License.

//! A hierarchical state machine that turns an MQTT5 connection into an RPC
//! command endpoint: subscribes to a command topic filter, validates and
//! forwards matching requests to an application callback, and assembles
//! MQTT5-property-bearing responses once the application finishes.
//!
//! The policy itself never suspends — every public operation here runs to
//! completion and returns. Asynchrony, if any, belongs to the
//! [`connection::Connection`] and [`timer::SubscriptionTimer`]
//! implementations this crate is generic over.

pub mod connection;
pub mod error;
pub mod hfsm;
pub mod policy;
pub mod properties;
pub mod request;
pub mod response;
pub mod timer;
pub mod topic;

pub use connection::{Connection, Qos, SubscriptionId};
pub use error::PolicyError;
pub use hfsm::{Event, PolicyState};
pub use policy::{options_default, RpcServer, RpcServerOptions, RpcServerOptionsBuilder};
pub use properties::{InboundProperties, PropertyBag};
pub use request::ExecutionRequest;
pub use response::ExecutionResponse;
pub use timer::{SubscriptionTimer, TimerId};
pub use topic::{build_subscription_topic, topic_matches};
