//! Filtering, sorting and pagination over cached records.
//!
//! All functions are pure: they take records already copied out of the cache
//! and never touch it.

use mirrorstack_model::{Fields, ListParams, Record, Sort, SortOrder, ID_FIELD};
use serde_json::Value;
use std::borrow::Cow;
use std::cmp::Ordering;

/// Filter key that matches a substring of any string field.
pub const FULL_TEXT_FILTER: &str = "q";

/// Runs a list query. Returns the requested page and the filtered total.
pub fn list(records: Vec<Record>, params: &ListParams) -> (Vec<Record>, usize) {
    let mut records: Vec<Record> = records
        .into_iter()
        .filter(|record| matches_filter(record, &params.filter))
        .collect();
    let total = records.len();

    if let Some(sort) = &params.sort {
        sort_records(&mut records, sort);
    }

    let page = match params.pagination {
        Some(pagination) => {
            let range = pagination.range(records.len());
            records.drain(range).collect()
        }
        None => records,
    };
    (page, total)
}

/// Whether a record satisfies every key of a filter.
pub fn matches_filter(record: &Record, filter: &Fields) -> bool {
    filter.iter().all(|(key, expected)| {
        if key == FULL_TEXT_FILTER {
            return matches_text(record, expected);
        }
        let Some(actual) = field_value(record, key) else {
            return false;
        };
        match expected {
            Value::Array(members) => members.iter().any(|m| loose_eq(&actual, m)),
            other => loose_eq(&actual, other),
        }
    })
}

/// Stable sort by one field. Records without the field go last in either order.
pub fn sort_records(records: &mut [Record], sort: &Sort) {
    records.sort_by(|a, b| {
        match (field_value(a, &sort.field), field_value(b, &sort.field)) {
            (Some(x), Some(y)) => {
                let ordering = compare_values(&x, &y);
                match sort.order {
                    SortOrder::Asc => ordering,
                    SortOrder::Desc => ordering.reverse(),
                }
            }
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    });
}

fn field_value<'a>(record: &'a Record, field: &str) -> Option<Cow<'a, Value>> {
    if field == ID_FIELD {
        return Some(Cow::Owned(Value::String(record.id.clone())));
    }
    record
        .get(field)
        .filter(|v| !v.is_null())
        .map(Cow::Borrowed)
}

fn matches_text(record: &Record, needle: &Value) -> bool {
    let Some(needle) = scalar_string(needle).filter(|s| !s.is_empty()) else {
        return true;
    };
    let needle = needle.to_lowercase();
    record
        .fields
        .values()
        .filter_map(Value::as_str)
        .any(|s| s.to_lowercase().contains(&needle))
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn loose_eq(actual: &Value, expected: &Value) -> bool {
    if actual == expected {
        return true;
    }
    match (actual, expected) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        (Value::String(_), _) | (_, Value::String(_)) => {
            matches!((scalar_string(actual), scalar_string(expected)), (Some(a), Some(b)) if a == b)
        }
        _ => false,
    }
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}
