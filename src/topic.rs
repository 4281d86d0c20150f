// Copyright (c) rpc_server_policy contributors.
// Licensed under the MIT License.

//! Building and matching the command subscription filter.

use crate::error::PolicyError;

/// Single-level wildcard.
const SINGLE_LEVEL_WILDCARD: &str = "+";
/// Multi-level wildcard.
const MULTI_LEVEL_WILDCARD: &str = "#";

/// Check a topic-grammar component for characters that would break the
/// `vehicles/<model_id>/commands/<client_id>/<command_name|+>` grammar:
/// an empty component, a path separator, or an MQTT wildcard/NUL character
/// appearing where a literal level is expected.
fn contains_invalid_char(s: &str) -> bool {
    s.chars().any(|c| c == '/' || c == '+' || c == '#' || c == '\0')
}

/// Builds the subscription filter `vehicles/<model_id>/commands/<client_id>/<command_name|+>`.
///
/// `command_name` of `""` is replaced by the single-level wildcard `+`.
///
/// # Errors
/// Returns [`PolicyError::ArgumentInvalid`] if `model_id` or `client_id` is
/// empty or contains `/`, `+`, `#`, or NUL, or if `command_name` is
/// non-empty and contains any of those characters.
pub fn build_subscription_topic(
    model_id: &str,
    client_id: &str,
    command_name: &str,
) -> Result<Box<str>, PolicyError> {
    if model_id.is_empty() || contains_invalid_char(model_id) {
        return Err(PolicyError::argument_invalid(
            "model_id",
            format!("'{model_id}' is empty or contains an invalid character"),
        ));
    }
    if client_id.is_empty() || contains_invalid_char(client_id) {
        return Err(PolicyError::argument_invalid(
            "client_id",
            format!("'{client_id}' is empty or contains an invalid character"),
        ));
    }
    if !command_name.is_empty() && contains_invalid_char(command_name) {
        return Err(PolicyError::argument_invalid(
            "command_name",
            format!("'{command_name}' contains an invalid character"),
        ));
    }

    let command_level = if command_name.is_empty() {
        SINGLE_LEVEL_WILDCARD
    } else {
        command_name
    };

    let mut topic = String::with_capacity(
        "vehicles/".len() + model_id.len() + "/commands/".len() + client_id.len() + 1 + command_level.len(),
    );
    topic.push_str("vehicles/");
    topic.push_str(model_id);
    topic.push_str("/commands/");
    topic.push_str(client_id);
    topic.push('/');
    topic.push_str(command_level);

    Ok(topic.into_boxed_str())
}

/// Returns true iff `topic` (a concrete publication topic) conforms to
/// `filter` under MQTT5 topic-matching semantics: `+` matches exactly one
/// level, `#` matches any suffix of levels.
///
/// Matching is purely textual on UTF-8 bytes with `/` as the level
/// separator. The server only ever builds filters containing `+`, but this
/// matcher is fully compliant since brokers may rewrite subscriptions.
/// There is no intermediate parsed `Filter` type since filters are only
/// ever produced by [`build_subscription_topic`].
#[must_use]
pub fn topic_matches(filter: &str, topic: &str) -> bool {
    let mut filter_levels = filter.split('/');
    let mut topic_levels = topic.split('/');

    loop {
        match filter_levels.next() {
            Some(MULTI_LEVEL_WILDCARD) => return true,
            Some(SINGLE_LEVEL_WILDCARD) => {
                if topic_levels.next().is_none() {
                    return false;
                }
            }
            Some(level) => match topic_levels.next() {
                Some(topic_level) if topic_level == level => {}
                _ => return false,
            },
            None => return topic_levels.next().is_none(),
        }
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test]
    fn builds_named_command_topic() {
        let topic = build_subscription_topic("m1", "c1", "get").unwrap();
        assert_eq!(&*topic, "vehicles/m1/commands/c1/get");
    }

    #[test]
    fn empty_command_name_yields_wildcard() {
        let topic = build_subscription_topic("m1", "c1", "").unwrap();
        assert_eq!(&*topic, "vehicles/m1/commands/c1/+");
    }

    #[test_case(""; "empty model id")]
    #[test_case("m/1"; "model id with slash")]
    #[test_case("m+1"; "model id with wildcard")]
    fn rejects_invalid_model_id(model_id: &str) {
        let err = build_subscription_topic(model_id, "c1", "get").unwrap_err();
        assert!(matches!(err, PolicyError::ArgumentInvalid { property_name: "model_id", .. }));
    }

    #[test_case(""; "empty client id")]
    #[test_case("c#1"; "client id with hash")]
    fn rejects_invalid_client_id(client_id: &str) {
        let err = build_subscription_topic("m1", client_id, "get").unwrap_err();
        assert!(matches!(err, PolicyError::ArgumentInvalid { property_name: "client_id", .. }));
    }

    #[test_case("vehicles/m1/commands/c1/get", "vehicles/m1/commands/c1/get", true; "exact match")]
    #[test_case("vehicles/m1/commands/c1/+", "vehicles/m1/commands/c1/get", true; "single wildcard matches one level")]
    #[test_case("vehicles/m1/commands/c1/+", "vehicles/m1/commands/c1/get/extra", false; "single wildcard does not match two levels")]
    #[test_case("vehicles/m1/commands/c1/+", "vehicles/m1/commands/c1", false; "single wildcard requires a level to be present")]
    #[test_case("vehicles/m1/commands/c1/#", "vehicles/m1/commands/c1/get", true; "multi wildcard matches suffix")]
    #[test_case("vehicles/m1/commands/c1/#", "vehicles/m1/commands/c1", true; "multi wildcard matches zero levels")]
    #[test_case("vehicles/m1/commands/c1/get", "vehicles/m1/commands/c2/get", false; "literal mismatch")]
    #[test_case("vehicles/m1/commands/c1/get", "vehicles/m1/commands/c1/get/extra", false; "literal filter is not a prefix match")]
    #[test_case("+/+/+/+/+", "vehicles/m1/commands/c1/get", true; "all single wildcards")]
    fn matches_per_mqtt5_semantics(filter: &str, topic: &str, expected: bool) {
        assert_eq!(topic_matches(filter, topic), expected);
    }
}
