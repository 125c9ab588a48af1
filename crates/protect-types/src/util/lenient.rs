//! Serde helpers for wire fields that arrive in more than one JSON shape.
//!
//! Servers in the field emit numeric ids both as JSON numbers and as decimal
//! strings; these helpers accept either so DTOs do not fork per deployment.

use serde::{Deserialize, Deserializer};

/// Deserializes a `u64` from a JSON number or a decimal string.
pub fn u64_from_number_or_string<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Wire {
        Number(u64),
        Text(String),
    }
    match Wire::deserialize(deserializer)? {
        Wire::Number(n) => Ok(n),
        Wire::Text(s) => s
            .parse::<u64>()
            .map_err(|_| serde::de::Error::custom("expected a non-negative integer")),
    }
}

/// Deserializes a `String` from a JSON string or number.
pub fn string_from_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Wire {
        Text(String),
        Number(i64),
    }
    Ok(match Wire::deserialize(deserializer)? {
        Wire::Text(s) => s,
        Wire::Number(n) => n.to_string(),
    })
}

/// Deserializes an optional `i64`, dropping values that are neither a JSON
/// number nor a decimal string.
pub fn opt_i64_lenient<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        serde_json::Value::Number(n) => n.as_i64(),
        serde_json::Value::String(s) => s.parse::<i64>().ok(),
        _ => None,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Sample {
        #[serde(deserialize_with = "u64_from_number_or_string")]
        id: u64,
        #[serde(default, deserialize_with = "opt_i64_lenient")]
        account: Option<i64>,
    }

    #[test]
    fn numeric_and_string_ids() {
        let a: Sample = serde_json::from_str(r#"{"id": 7}"#).expect("number id");
        let b: Sample = serde_json::from_str(r#"{"id": "7"}"#).expect("string id");
        assert_eq!(a.id, 7);
        assert_eq!(b.id, 7);
    }

    #[test]
    fn non_numeric_account_dropped() {
        let s: Sample =
            serde_json::from_str(r#"{"id": 1, "account": "acct-77"}"#).expect("parses");
        assert_eq!(s.account, None);
        let s: Sample = serde_json::from_str(r#"{"id": 1, "account": "42"}"#).expect("parses");
        assert_eq!(s.account, Some(42));
    }
}
