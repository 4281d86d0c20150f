// Copyright (c) rpc_server_policy contributors.
// Licensed under the MIT License.

//! MQTT5 property assembly for inbound requests and outbound responses.

use bytes::Bytes;

/// User property name carrying the response status.
pub const STATUS_PROPERTY: &str = "status";
/// User property written only on the failure path.
pub const STATUS_MESSAGE_PROPERTY: &str = "statusMessage";

/// The MQTT5 properties read from an inbound publication.
///
/// Borrows from the triggering publication; valid only for the duration of
/// the handler that produced it.
#[derive(Debug, Clone, Copy)]
pub struct InboundProperties<'a> {
    /// `RESPONSE_TOPIC` property.
    pub response_topic: Option<&'a str>,
    /// `CORRELATION_DATA` property.
    pub correlation_data: Option<&'a [u8]>,
    /// `CONTENT_TYPE` property.
    pub content_type: Option<&'a str>,
}

/// A reusable container for the MQTT5 properties of an outbound publish.
///
/// Owned directly by [`crate::policy::RpcServer`] rather than handed in by
/// an external owner — see DESIGN.md's Open Question resolution on
/// property-bag ownership. [`PropertyBag::clear`] is what makes the single
/// allocation safe to reuse across every response.
#[derive(Debug, Clone, Default)]
pub struct PropertyBag {
    content_type: Option<String>,
    correlation_data: Option<Bytes>,
    user_properties: Vec<(String, String)>,
}

impl PropertyBag {
    /// Returns true if the bag holds no properties.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.content_type.is_none()
            && self.correlation_data.is_none()
            && self.user_properties.is_empty()
    }

    /// Sets the `CONTENT_TYPE` property.
    pub fn set_content_type(&mut self, content_type: impl Into<String>) {
        self.content_type = Some(content_type.into());
    }

    /// Sets the `CORRELATION_DATA` property.
    pub fn set_correlation_data(&mut self, correlation_data: impl Into<Bytes>) {
        self.correlation_data = Some(correlation_data.into());
    }

    /// Appends a user property, e.g. `("status", "200")`.
    pub fn push_user_property(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.user_properties.push((key.into(), value.into()));
    }

    /// Returns the `CONTENT_TYPE` property, if set.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Returns the `CORRELATION_DATA` property, if set.
    #[must_use]
    pub fn correlation_data(&self) -> Option<&Bytes> {
        self.correlation_data.as_ref()
    }

    /// Returns the appended user properties in append order. Order is not
    /// observable by the receiver; this is for test assertions.
    #[must_use]
    pub fn user_properties(&self) -> &[(String, String)] {
        &self.user_properties
    }

    /// Looks up the first user property with the given key.
    #[must_use]
    pub fn user_property(&self, key: &str) -> Option<&str> {
        self.user_properties
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Empties the bag so it may be reused for the next response.
    pub fn clear(&mut self) {
        self.content_type = None;
        self.correlation_data = None;
        self.user_properties.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty() {
        assert!(PropertyBag::default().is_empty());
    }

    #[test]
    fn clear_restores_empty_invariant() {
        let mut bag = PropertyBag::default();
        bag.set_content_type("text/plain");
        bag.set_correlation_data(Bytes::from_static(b"corr"));
        bag.push_user_property(STATUS_PROPERTY, "200");
        assert!(!bag.is_empty());

        bag.clear();

        assert!(bag.is_empty());
        assert_eq!(bag.content_type(), None);
        assert_eq!(bag.correlation_data(), None);
        assert!(bag.user_properties().is_empty());
    }

    #[test]
    fn user_property_lookup_finds_first_match() {
        let mut bag = PropertyBag::default();
        bag.push_user_property(STATUS_PROPERTY, "200");
        bag.push_user_property(STATUS_MESSAGE_PROPERTY, "boom");
        assert_eq!(bag.user_property(STATUS_PROPERTY), Some("200"));
        assert_eq!(bag.user_property(STATUS_MESSAGE_PROPERTY), Some("boom"));
        assert_eq!(bag.user_property("missing"), None);
    }
}
