//! Condition evaluator: pure logic, no database access.
//!
//! Cells imported from spreadsheets are mostly strings while rule values
//! are often typed, so comparisons coerce scalar pairs first: a
//! numeric-looking string against a number compares as a number, and
//! `"true"` / `"false"` (any case) against a boolean compares as a boolean.
//! Rule authors rely on exactly this behaviour.

use std::borrow::Cow;
use std::cmp::Ordering;

use serde_json::{Number, Value};

use super::model::{Condition, Operator};
use crate::path::get_path;
use crate::record::Fields;
use crate::validation::parsing::is_json;

/// Whether `fields` satisfies every condition (logical AND).
///
/// An empty condition list always matches.
pub fn evaluate_all(fields: &Fields, conditions: &[Condition]) -> bool {
    conditions.iter().all(|c| evaluate(fields, c))
}

/// Whether `fields` satisfies a single condition.
pub fn evaluate(fields: &Fields, condition: &Condition) -> bool {
    let resolved = get_path(fields, &condition.field);
    let wanted = condition.value.as_ref().unwrap_or(&Value::Null);

    match &condition.operator {
        Operator::Exists => {
            let present = resolved.is_some_and(|v| !v.is_null());
            *wanted == Value::Bool(present)
        }
        Operator::IsString => {
            matches!(resolved, Some(Value::String(_))) && *wanted == Value::Bool(true)
        }
        Operator::IsNotJson => {
            matches!(resolved, Some(Value::String(s)) if !is_json(s))
                && *wanted == Value::Bool(true)
        }
        op => match resolved {
            Some(actual) if !actual.is_null() => compare(op, actual, wanted),
            _ => false,
        },
    }
}

fn compare(op: &Operator, actual: &Value, wanted: &Value) -> bool {
    let (left, right) = coerce(actual, wanted);
    let (left, right) = (left.as_ref(), right.as_ref());

    match op {
        Operator::Eq => loose_eq(left, right),
        Operator::Ne => !loose_eq(left, right),
        Operator::Gt => order(left, right) == Some(Ordering::Greater),
        Operator::Lt => order(left, right) == Some(Ordering::Less),
        Operator::Gte => matches!(
            order(left, right),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        Operator::Lte => matches!(order(left, right), Some(Ordering::Less | Ordering::Equal)),
        Operator::Contains => match (left, right) {
            (Value::String(haystack), Value::String(needle)) => haystack.contains(needle.as_str()),
            (Value::String(haystack), Value::Number(n)) => haystack.contains(&n.to_string()),
            (Value::Array(items), needle) => member_of(needle, items),
            _ => false,
        },
        Operator::StartsWith => match (left, right) {
            (Value::String(s), Value::String(prefix)) => s.starts_with(prefix.as_str()),
            _ => false,
        },
        Operator::EndsWith => match (left, right) {
            (Value::String(s), Value::String(suffix)) => s.ends_with(suffix.as_str()),
            _ => false,
        },
        Operator::In => match wanted {
            Value::Array(items) => member_of(actual, items),
            _ => false,
        },
        Operator::Nin => match wanted {
            Value::Array(items) => !member_of(actual, items),
            _ => false,
        },
        Operator::Exists | Operator::IsString | Operator::IsNotJson | Operator::Unknown(_) => {
            false
        }
    }
}

/// Coerce a scalar pair for comparison. Applied symmetrically.
fn coerce<'a>(a: &'a Value, b: &'a Value) -> (Cow<'a, Value>, Cow<'a, Value>) {
    match (a, b) {
        (Value::String(s), Value::Number(_)) => {
            if let Some(n) = numeric_string(s) {
                return (Cow::Owned(n), Cow::Borrowed(b));
            }
        }
        (Value::Number(_), Value::String(s)) => {
            if let Some(n) = numeric_string(s) {
                return (Cow::Borrowed(a), Cow::Owned(n));
            }
        }
        (Value::String(s), Value::Bool(_)) => {
            if let Some(flag) = boolean_string(s) {
                return (Cow::Owned(Value::Bool(flag)), Cow::Borrowed(b));
            }
        }
        (Value::Bool(_), Value::String(s)) => {
            if let Some(flag) = boolean_string(s) {
                return (Cow::Borrowed(a), Cow::Owned(Value::Bool(flag)));
            }
        }
        _ => {}
    }
    (Cow::Borrowed(a), Cow::Borrowed(b))
}

fn numeric_string(s: &str) -> Option<Value> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    let parsed = trimmed.parse::<f64>().ok().filter(|f| f.is_finite())?;
    Number::from_f64(parsed).map(Value::Number)
}

fn boolean_string(s: &str) -> Option<bool> {
    if s.eq_ignore_ascii_case("true") {
        Some(true)
    } else if s.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// List membership with the same coercion `eq` applies to each item.
fn member_of(actual: &Value, items: &[Value]) -> bool {
    items.iter().any(|item| {
        let (left, right) = coerce(actual, item);
        loose_eq(&left, &right)
    })
}

fn loose_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

fn order(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Fields {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    fn cond(field: &str, operator: &str, value: Value) -> Condition {
        Condition::new(field, Operator::from(operator.to_string()), value)
    }

    fn check(r: &Fields, field: &str, operator: &str, value: Value) -> bool {
        evaluate(r, &cond(field, operator, value))
    }

    #[test]
    fn eq_with_numeric_string_coercion() {
        let r = record(json!({"PriorityLevel": "3", "Duration": 2}));
        assert!(check(&r, "PriorityLevel", "eq", json!(3)));
        assert!(check(&r, "Duration", "eq", json!("2")));
        assert!(check(&r, "Duration", "eq", json!(2.0)));
        assert!(!check(&r, "PriorityLevel", "eq", json!(4)));
        assert!(check(&r, "PriorityLevel", "ne", json!(4)));
    }

    #[test]
    fn eq_with_boolean_string_coercion() {
        let r = record(json!({"Active": "TRUE", "Flag": false}));
        assert!(check(&r, "Active", "eq", json!(true)));
        assert!(check(&r, "Flag", "eq", json!("False")));
        assert!(!check(&r, "Active", "eq", json!("true")));
    }

    #[test]
    fn relational_operators() {
        let r = record(json!({"Duration": "5", "Name": "beta"}));
        assert!(check(&r, "Duration", "gt", json!(4)));
        assert!(check(&r, "Duration", "gte", json!(5)));
        assert!(check(&r, "Duration", "lt", json!(6)));
        assert!(check(&r, "Duration", "lte", json!(5)));
        assert!(!check(&r, "Duration", "gt", json!(5)));
        assert!(check(&r, "Name", "gt", json!("alpha")));
        assert!(!check(&r, "Name", "gt", json!(1)));
    }

    #[test]
    fn contains_substring_and_membership() {
        let r = record(json!({"Skills": "coding,ml", "Tags": ["a", "b"]}));
        assert!(check(&r, "Skills", "contains", json!("ml")));
        assert!(!check(&r, "Skills", "contains", json!("ui")));
        assert!(check(&r, "Tags", "contains", json!("b")));
        assert!(!check(&r, "Tags", "contains", json!("c")));

        let r = record(json!({"Phases": [1, 2.0, "3"]}));
        assert!(check(&r, "Phases", "contains", json!(2)));
        assert!(check(&r, "Phases", "contains", json!(3)));
    }

    #[test]
    fn starts_and_ends_with() {
        let r = record(json!({"ClientID": "C-100"}));
        assert!(check(&r, "ClientID", "startsWith", json!("C-")));
        assert!(check(&r, "ClientID", "endsWith", json!("00")));
        assert!(!check(&r, "ClientID", "endsWith", json!("C")));
    }

    #[test]
    fn in_and_nin() {
        let r = record(json!({"GroupTag": "VIP"}));
        assert!(check(&r, "GroupTag", "in", json!(["VIP", "Gold"])));
        assert!(!check(&r, "GroupTag", "nin", json!(["VIP", "Gold"])));
        assert!(check(&r, "GroupTag", "nin", json!(["Basic"])));
        assert!(!check(&r, "GroupTag", "in", json!("VIP")));
        assert!(!check(&r, "GroupTag", "nin", json!("Basic")));
    }

    #[test]
    fn in_and_nin_compare_like_eq() {
        let r = record(json!({"Duration": 3, "PriorityLevel": "4", "Active": "true"}));
        assert!(check(&r, "Duration", "in", json!([3.0])));
        assert!(!check(&r, "Duration", "nin", json!([3.0])));
        assert!(check(&r, "PriorityLevel", "in", json!([1, 4])));
        assert!(check(&r, "Active", "in", json!([true])));
        assert!(check(&r, "Duration", "nin", json!([3.5, "x"])));
    }

    #[test]
    fn absent_value_behaves_as_null() {
        let r = record(json!({"ClientID": "C1"}));
        let mut condition = cond("ClientID", "exists", Value::Null);
        condition.value = None;
        assert!(!evaluate(&r, &condition));
        condition.field = "Missing".into();
        assert!(!evaluate(&r, &condition));
    }

    #[test]
    fn nested_lookup() {
        let r = record(json!({"AttributesJSON": {"meta": {"level": 2}}}));
        assert!(check(&r, "AttributesJSON.meta.level", "eq", json!(2)));
        assert!(!check(&r, "AttributesJSON.missing.level", "eq", json!(2)));
    }

    #[test]
    fn missing_or_null_value_fails_generic_operators() {
        let r = record(json!({"Empty": null}));
        assert!(!check(&r, "Empty", "ne", json!("x")));
        assert!(!check(&r, "Missing", "ne", json!("x")));
        assert!(!check(&r, "Missing", "nin", json!(["x"])));
    }

    #[test]
    fn exists_operator() {
        let r = record(json!({"A": 1, "B": null}));
        assert!(check(&r, "A", "exists", json!(true)));
        assert!(check(&r, "B", "exists", json!(false)));
        assert!(check(&r, "C", "exists", json!(false)));
        assert!(!check(&r, "C", "exists", json!(true)));
        assert!(!check(&r, "A", "exists", json!("true")));
    }

    #[test]
    fn is_string_operator() {
        let r = record(json!({"S": "x", "N": 1}));
        assert!(check(&r, "S", "is_string", json!(true)));
        assert!(!check(&r, "S", "is_string", json!(false)));
        assert!(!check(&r, "N", "is_string", json!(true)));
    }

    #[test]
    fn is_not_json_operator() {
        let r = record(json!({"Plain": "hello", "Json": "{\"a\":1}", "Obj": {"a": 1}}));
        assert!(check(&r, "Plain", "is_not_json", json!(true)));
        assert!(!check(&r, "Json", "is_not_json", json!(true)));
        assert!(!check(&r, "Obj", "is_not_json", json!(true)));
        assert!(!check(&r, "Plain", "is_not_json", json!(false)));
    }

    #[test]
    fn unknown_operator_never_matches() {
        let r = record(json!({"A": "x"}));
        assert!(!check(&r, "A", "matches", json!("x")));
    }

    #[test]
    fn evaluate_all_is_logical_and() {
        let r = record(json!({"A": 1, "B": 2}));
        let conditions = vec![cond("A", "eq", json!(1)), cond("B", "eq", json!(2))];
        assert!(evaluate_all(&r, &conditions));
        let conditions = vec![cond("A", "eq", json!(1)), cond("B", "eq", json!(3))];
        assert!(!evaluate_all(&r, &conditions));
        assert!(evaluate_all(&r, &[]));
    }
}
