//! Tolerant field deserializers for language-model output
//!
//! Models return `null` for empty lists, a bare string instead of a one-element
//! list, or numbers as strings with a percent sign. These helpers accept those
//! shapes and still reject values of an unrelated type.

use std::collections::BTreeSet;

use serde::de::Error;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::entity::{finite, normalize_tag, normalize_text};

pub fn tag_set<'de, D>(deserializer: D) -> Result<BTreeSet<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let mut tags = BTreeSet::new();

    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => {}
        Some(Value::String(tag)) => tags.extend(normalize_tag(&tag)),
        Some(Value::Array(items)) => {
            for item in items {
                match item {
                    Value::String(tag) => tags.extend(normalize_tag(&tag)),
                    Value::Null => {}
                    other => {
                        return Err(D::Error::custom(format!(
                            "expected a string tag, found {}",
                            kind(&other)
                        )));
                    }
                }
            }
        }
        Some(other) => {
            return Err(D::Error::custom(format!(
                "expected a list of strings, found {}",
                kind(&other)
            )));
        }
    }

    Ok(tags)
}

pub fn finite_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(number)) => Ok(number.as_f64().and_then(finite)),
        Some(Value::String(text)) => {
            let text = text.trim().trim_end_matches('%').trim();

            if text.is_empty() {
                return Ok(None);
            }

            text.parse::<f64>()
                .map(finite)
                .map_err(|_| D::Error::custom(format!("'{}' is not a number", text)))
        }
        Some(other) => Err(D::Error::custom(format!(
            "expected a number, found {}",
            kind(&other)
        ))),
    }
}

/// Floats that convert to `i64` without saturating
const I64_RANGE: std::ops::Range<f64> = i64::MIN as f64..i64::MAX as f64;

pub fn integer<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(number)) => {
            if let Some(value) = number.as_i64() {
                return Ok(Some(value));
            }

            match number.as_f64() {
                Some(value) if value.fract() == 0.0 && I64_RANGE.contains(&value) => {
                    Ok(Some(value as i64))
                }
                _ => Err(D::Error::custom(format!("{} is not an integer", number))),
            }
        }
        Some(Value::String(text)) => {
            let text = text.trim();

            if text.is_empty() {
                return Ok(None);
            }

            text.parse::<i64>()
                .map(Some)
                .map_err(|_| D::Error::custom(format!("'{}' is not an integer", text)))
        }
        Some(other) => Err(D::Error::custom(format!(
            "expected an integer, found {}",
            kind(&other)
        ))),
    }
}

pub fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => Ok(normalize_text(&text)),
        Some(other) => Err(D::Error::custom(format!(
            "expected a string, found {}",
            kind(&other)
        ))),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::criteria::InvestmentCriteria;

    fn parse(json: &str) -> Result<InvestmentCriteria, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[test]
    fn test_subset_of_fields_uses_defaults() {
        let criteria = parse(r#"{"sectors": ["technologie"], "fees_max": 0.5}"#).unwrap();

        assert!(criteria.sectors().contains("technologie"));
        assert_eq!(criteria.fees_max(), Some(0.5));
        assert_eq!(criteria.min_performance(), None);
        assert!(criteria.region().is_empty());
        assert!(criteria.product_type().is_empty());
        assert_eq!(criteria.replication(), None);
        assert_eq!(criteria.esg(), None);
    }

    #[test]
    fn test_nulls_are_defaults() {
        let criteria = parse(
            r#"{
                "sectors": null, "fees_max": null, "min_performance": null,
                "region": null, "type": null, "replication": null,
                "availability": null, "risk": null, "strategy": null,
                "esg": null, "emetteur": null
            }"#,
        )
        .unwrap();

        assert!(criteria.is_empty());
    }

    #[test]
    fn test_single_string_becomes_set() {
        let criteria = parse(r#"{"region": "Europe"}"#).unwrap();
        assert_eq!(criteria.region().iter().collect::<Vec<_>>(), vec!["europe"]);
    }

    #[test]
    fn test_percent_string_number() {
        let criteria = parse(r#"{"fees_max": "0.5%", "min_performance": " 3 "}"#).unwrap();

        assert_eq!(criteria.fees_max(), Some(0.5));
        assert_eq!(criteria.min_performance(), Some(3.0));
    }

    #[test]
    fn test_integral_esg() {
        assert_eq!(parse(r#"{"esg": 80}"#).unwrap().esg(), Some(80));
        assert_eq!(parse(r#"{"esg": 80.0}"#).unwrap().esg(), Some(80));
        assert_eq!(parse(r#"{"esg": "75"}"#).unwrap().esg(), Some(75));
        assert!(parse(r#"{"esg": 80.5}"#).is_err());
    }

    #[test]
    fn test_out_of_range_esg_is_rejected() {
        let err = parse(r#"{"esg": 1e300}"#).unwrap_err();
        assert!(err.to_string().contains("is not an integer"));

        assert!(parse(r#"{"esg": -1e19}"#).is_err());
        assert!(parse(r#"{"esg": 9223372036854775808.0}"#).is_err());
        assert_eq!(parse(r#"{"esg": 1e3}"#).unwrap().esg(), Some(1000));
    }

    #[test]
    fn test_type_field_name() {
        let criteria = parse(r#"{"type": ["Capitalisant"]}"#).unwrap();
        assert!(criteria.product_type().contains("capitalisant"));
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let criteria = parse(r#"{"sectors": ["esg"], "confidence": 0.9}"#).unwrap();
        assert!(criteria.sectors().contains("esg"));
    }

    #[test]
    fn test_wrong_types_are_rejected() {
        assert!(parse(r#"{"sectors": 5}"#).is_err());
        assert!(parse(r#"{"sectors": [1, 2]}"#).is_err());
        assert!(parse(r#"{"fees_max": "cheap"}"#).is_err());
        assert!(parse(r#"{"fees_max": [0.5]}"#).is_err());
        assert!(parse(r#"{"strategy": 3}"#).is_err());
    }
}
