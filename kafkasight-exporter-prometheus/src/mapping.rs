//! Mapping from flat Kafka client metric names to Prometheus identities.
//!
//! The client library has no label concept: per-broker and per-topic metrics
//! encode their dimension as a marker substring inside the flat name
//! (`requests-in-flight_for_broker_3`). This module is the decoding grammar
//! that recovers the structure.

/// Marker that precedes an embedded broker id.
pub const BROKER_MARKER: &str = "_for_broker_";

/// Marker that precedes an embedded topic name.
pub const TOPIC_MARKER: &str = "_for_topic_";

/// A flat metric name decoded into its base name and embedded dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedName {
    /// The name with all marker segments stripped.
    pub name: String,
    /// Broker id, if the name carried a broker segment.
    pub broker: Option<String>,
    /// Topic name, if the name carried a topic segment.
    pub topic: Option<String>,
}

/// Decode a flat metric name.
///
/// If a marker occurs, the name is split at every occurrence and only the
/// first two parts are used: the prefix becomes the name, the following
/// segment becomes the dimension value. Additional occurrences of the same
/// marker are silently discarded; names may carry one broker and one topic
/// segment simultaneously.
pub fn decode_name(raw: &str) -> DecodedName {
    let (name, broker) = split_marker(raw, BROKER_MARKER);
    let (name, topic) = split_marker(&name, TOPIC_MARKER);
    DecodedName { name, broker, topic }
}

fn split_marker(name: &str, marker: &str) -> (String, Option<String>) {
    if !name.contains(marker) {
        return (name.to_string(), None);
    }
    let mut parts = name.split(marker);
    let prefix = parts.next().unwrap_or_default().to_string();
    let value = parts.next().map(str::to_string);
    (prefix, value)
}

/// Sanitize a key for use in a Prometheus identifier.
///
/// Replaces each of space, period, hyphen, equals and slash with an
/// underscore. Idempotent; characters the Prometheus grammar already accepts
/// pass through unchanged.
pub fn flatten_key(key: &str) -> String {
    key.chars()
        .map(|c| match c {
            ' ' | '.' | '-' | '=' | '/' => '_',
            other => other,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_plain_name() {
        let decoded = decode_name("batch_size");
        assert_eq!(decoded.name, "batch_size");
        assert_eq!(decoded.broker, None);
        assert_eq!(decoded.topic, None);
    }

    #[test]
    fn test_decode_broker_segment() {
        let decoded = decode_name("request_latency_in_ms_for_broker_3");
        assert_eq!(decoded.name, "request_latency_in_ms");
        assert_eq!(decoded.broker.as_deref(), Some("3"));
        assert_eq!(decoded.topic, None);
    }

    #[test]
    fn test_decode_topic_segment() {
        let decoded = decode_name("records_consumed_for_topic_orders");
        assert_eq!(decoded.name, "records_consumed");
        assert_eq!(decoded.broker, None);
        assert_eq!(decoded.topic.as_deref(), Some("orders"));
    }

    #[test]
    fn test_decode_broker_and_topic_segments() {
        // Broker extraction runs first, so both dimensions decode when the
        // topic segment precedes the broker segment: it stays attached to
        // the prefix until the second pass strips it.
        let decoded = decode_name("compression_ratio_for_topic_orders_for_broker_2");
        assert_eq!(decoded.name, "compression_ratio");
        assert_eq!(decoded.broker.as_deref(), Some("2"));
        assert_eq!(decoded.topic.as_deref(), Some("orders"));
    }

    #[test]
    fn test_decode_topic_segment_after_broker_stays_in_broker_value() {
        // With the broker segment first, everything after its marker becomes
        // the broker value; the topic pass never sees its marker.
        let decoded = decode_name("fetch_rate_for_broker_1_for_topic_orders");
        assert_eq!(decoded.name, "fetch_rate");
        assert_eq!(decoded.broker.as_deref(), Some("1_for_topic_orders"));
        assert_eq!(decoded.topic, None);
    }

    #[test]
    fn test_decode_repeated_marker_discards_extra_segments() {
        // Accepted limitation: only the first two split parts are used.
        let decoded = decode_name("m_for_broker_1_for_broker_2");
        assert_eq!(decoded.name, "m");
        assert_eq!(decoded.broker.as_deref(), Some("1"));
        assert_eq!(decoded.topic, None);
    }

    #[test]
    fn test_decode_marker_at_end_yields_empty_value() {
        let decoded = decode_name("m_for_broker_");
        assert_eq!(decoded.name, "m");
        assert_eq!(decoded.broker.as_deref(), Some(""));
    }

    #[test]
    fn test_flatten_key_replaces_disallowed_chars() {
        assert_eq!(flatten_key("request-latency-in-ms"), "request_latency_in_ms");
        assert_eq!(flatten_key("a.b c=d/e"), "a_b_c_d_e");
    }

    #[test]
    fn test_flatten_key_keeps_valid_chars() {
        assert_eq!(flatten_key("already_valid_123"), "already_valid_123");
        assert_eq!(flatten_key(""), "");
    }

    #[test]
    fn test_flatten_key_idempotent() {
        for s in ["request-latency.in ms", "a=b/c", "plain", "_x_", "1-2.3"] {
            let once = flatten_key(s);
            assert_eq!(flatten_key(&once), once);
        }
    }

    #[test]
    fn test_flatten_then_decode() {
        // Flattening happens before decoding; markers are made of characters
        // the sanitizer leaves alone.
        let decoded = decode_name(&flatten_key("request-latency-in-ms_for_broker_3"));
        assert_eq!(decoded.name, "request_latency_in_ms");
        assert_eq!(decoded.broker.as_deref(), Some("3"));
    }
}
