//! Lenient field parsers shared by the schema validators.
//!
//! Ingested cells usually arrive as strings, so every parser accepts both
//! the native JSON shape and its textual form.

use serde_json::Value;

/// Result of [`parse_phases`].
///
/// `Malformed` is distinct from an empty list: blank input parses to
/// `Phases(vec![])`, while non-blank input that matches none of the accepted
/// shapes is `Malformed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhaseList {
    Phases(Vec<i64>),
    Malformed,
}

/// Widest inclusive range `parse_phases` will expand.
pub const MAX_PHASE_SPAN: i64 = 1_000;

/// Whether a field counts as present for optional-field checks.
///
/// Absent, `null`, `false`, `0` and `""` all count as not provided, which
/// matches how spreadsheet imports represent empty cells.
pub fn is_present(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Number(n)) => n.as_f64() != Some(0.0),
        Some(_) => true,
    }
}

/// Split a comma-separated cell into trimmed, non-empty tokens.
///
/// Non-string and blank input yields an empty list.
pub fn parse_comma_separated(value: &Value) -> Vec<String> {
    let Some(text) = value.as_str() else {
        return Vec::new();
    };
    text.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse a base-10 integer from trimmed text.
pub fn parse_int_str(text: &str) -> Option<i64> {
    text.trim().parse::<i64>().ok()
}

/// Parse an integer from a JSON number (integral values only) or a string.
pub fn parse_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.fract() == 0.0)
                .map(|f| f as i64)
        }),
        Value::String(s) => parse_int_str(s),
        _ => None,
    }
}

/// Parse a phase list.
///
/// Accepted shapes, tried in order (first success wins):
///
/// 1. a JSON array of integers: `"[1,3,5]"`
/// 2. an inclusive range: `"1-3"` (requires `start <= end` and at most
///    [`MAX_PHASE_SPAN`] steps between the bounds)
/// 3. a comma list: `"1,2,3"` (non-numeric tokens are dropped, at least one
///    number must remain)
pub fn parse_phases(value: &Value) -> PhaseList {
    let Some(text) = value.as_str() else {
        return PhaseList::Phases(Vec::new());
    };
    if text.trim().is_empty() {
        return PhaseList::Phases(Vec::new());
    }

    if let Some(phases) = parse_json_phases(text) {
        return PhaseList::Phases(phases);
    }

    if let Some((start, end)) = text.split_once('-') {
        if let (Some(start), Some(end)) = (parse_int_str(start), parse_int_str(end)) {
            if start <= end {
                return match end.checked_sub(start) {
                    Some(span) if span <= MAX_PHASE_SPAN => {
                        PhaseList::Phases((start..=end).collect())
                    }
                    _ => PhaseList::Malformed,
                };
            }
        }
    }

    let listed: Vec<i64> = text.split(',').filter_map(parse_int_str).collect();
    if listed.is_empty() {
        PhaseList::Malformed
    } else {
        PhaseList::Phases(listed)
    }
}

fn parse_json_phases(text: &str) -> Option<Vec<i64>> {
    match serde_json::from_str::<Value>(text).ok()? {
        Value::Array(items) => items.iter().map(Value::as_i64).collect(),
        _ => None,
    }
}

/// Whether `text` parses as any JSON value.
pub fn is_json(text: &str) -> bool {
    serde_json::from_str::<serde::de::IgnoredAny>(text).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn phases(text: &str) -> PhaseList {
        parse_phases(&json!(text))
    }

    #[test]
    fn phases_range() {
        assert_eq!(phases("1-3"), PhaseList::Phases(vec![1, 2, 3]));
        assert_eq!(phases(" 2 - 2 "), PhaseList::Phases(vec![2]));
    }

    #[test]
    fn phases_comma_list() {
        assert_eq!(phases("1,2,3"), PhaseList::Phases(vec![1, 2, 3]));
    }

    #[test]
    fn phases_json_array() {
        assert_eq!(phases("[1,2,3]"), PhaseList::Phases(vec![1, 2, 3]));
        assert_eq!(phases("[4, 1]"), PhaseList::Phases(vec![4, 1]));
    }

    #[test]
    fn phases_descending_range_is_malformed() {
        assert_eq!(phases("5-3"), PhaseList::Malformed);
    }

    #[test]
    fn phases_oversized_range_is_malformed() {
        assert_eq!(phases("1-9223372036854775807"), PhaseList::Malformed);
        assert_eq!(phases("0-100000000000"), PhaseList::Malformed);
        assert_eq!(phases("0-1001"), PhaseList::Malformed);
        match phases("0-1000") {
            PhaseList::Phases(list) => assert_eq!(list.len(), 1001),
            other => panic!("expected phases, got {other:?}"),
        }
    }

    #[test]
    fn phases_garbage_is_malformed() {
        assert_eq!(phases("abc"), PhaseList::Malformed);
        assert_eq!(phases("[\"a\"]"), PhaseList::Malformed);
    }

    #[test]
    fn phases_blank_or_non_string_is_empty() {
        assert_eq!(phases(""), PhaseList::Phases(vec![]));
        assert_eq!(phases("   "), PhaseList::Phases(vec![]));
        assert_eq!(parse_phases(&json!(3)), PhaseList::Phases(vec![]));
        assert_eq!(parse_phases(&Value::Null), PhaseList::Phases(vec![]));
    }

    #[test]
    fn phases_comma_list_drops_non_numeric_tokens() {
        assert_eq!(phases("1, x, 3"), PhaseList::Phases(vec![1, 3]));
    }

    #[test]
    fn comma_separated_trims_and_drops_empty() {
        assert_eq!(
            parse_comma_separated(&json!(" T1, ,T2 ,")),
            vec!["T1".to_string(), "T2".to_string()]
        );
        assert!(parse_comma_separated(&json!("  ")).is_empty());
        assert!(parse_comma_separated(&json!(["T1"])).is_empty());
    }

    #[test]
    fn integers_from_numbers_and_strings() {
        assert_eq!(parse_integer(&json!(3)), Some(3));
        assert_eq!(parse_integer(&json!(3.0)), Some(3));
        assert_eq!(parse_integer(&json!(3.5)), None);
        assert_eq!(parse_integer(&json!(" 42 ")), Some(42));
        assert_eq!(parse_integer(&json!("4x")), None);
        assert_eq!(parse_integer(&json!(true)), None);
    }

    #[test]
    fn presence_follows_empty_cell_semantics() {
        assert!(!is_present(None));
        assert!(!is_present(Some(&Value::Null)));
        assert!(!is_present(Some(&json!(""))));
        assert!(!is_present(Some(&json!(0))));
        assert!(is_present(Some(&json!(" "))));
        assert!(is_present(Some(&json!({}))));
    }

    #[test]
    fn json_detection() {
        assert!(is_json("{\"a\":1}"));
        assert!(is_json("123"));
        assert!(is_json("\"quoted\""));
        assert!(!is_json("plain text"));
        assert!(!is_json(""));
    }
}
