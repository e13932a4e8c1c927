use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::employee::Employee;

/// Canonical `{ success, data }` wrapper of a list response.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: Vec<T>,
}

impl<T> Envelope<T> {
    pub fn ok(data: Vec<T>) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Folds every accepted list shape into an [`Envelope`].
///
/// A bare array and `{ data }` are successful; `{ success, data }` keeps its
/// flag; anything else is an empty success. Items that do not decode as an
/// employee are dropped.
pub fn normalize(body: Value) -> Envelope<Employee> {
    let (success, items) = match body {
        Value::Array(items) => (true, items),
        Value::Object(mut map) => {
            let items = match map.remove("data") {
                Some(Value::Array(items)) => items,
                _ => Vec::new(),
            };
            let success = map.get("success").and_then(Value::as_bool).unwrap_or(true);
            (success, items)
        }
        _ => (true, Vec::new()),
    };

    let data = items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value::<Employee>(item) {
            Ok(employee) => Some(employee),
            Err(err) => {
                warn!(index, error = %err, "skipping undecodable employee record");
                None
            }
        })
        .collect();

    Envelope { success, data }
}

/// Extracts the created record from a write acknowledgment, which is either
/// the record itself or an object wrapping it under `data`.
pub fn decode_acknowledgment(body: Value) -> Option<Employee> {
    if let Ok(employee) = serde_json::from_value::<Employee>(body.clone()) {
        return Some(employee);
    }
    match body {
        Value::Object(mut map) => match map.remove("data")? {
            Value::Array(mut items) if items.len() == 1 => {
                serde_json::from_value(items.remove(0)).ok()
            }
            inner => serde_json::from_value(inner).ok(),
        },
        _ => None,
    }
}
