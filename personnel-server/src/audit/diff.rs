//! Audit detail builders.
//!
//! Creates store a filtered snapshot of the new document, updates store the
//! field-level differences between the before and after documents. Nested
//! objects compare recursively under dotted paths; floats compare with a
//! tolerance so serialization round trips do not show up as phantom changes.

use serde::Serialize;
use serde_json::{Value, json};

/// Tolerance for float comparison across serialization round trips
const FLOAT_EPSILON: f64 = 1e-9;

/// One changed field in an update diff
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct FieldChange {
    pub field: String,
    pub from: Value,
    pub to: Value,
}

/// Fields never written into audit details for a resource type.
///
/// The id duplicates the entry's resource_id, so it is always dropped.
/// Credential hashes are dropped as well even though the models already
/// skip them on serialization.
fn excluded_fields(resource_type: &str) -> &'static [&'static str] {
    match resource_type {
        "admin" | "employee" => &["id", "password_hash"],
        _ => &["id"],
    }
}

fn numbers_equal(a: &serde_json::Number, b: &serde_json::Number) -> bool {
    match (a.as_f64(), b.as_f64()) {
        (Some(fa), Some(fb)) => (fa - fb).abs() < FLOAT_EPSILON,
        _ => a == b,
    }
}

/// Deep equality with float tolerance. Used for whole-array comparison.
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => numbers_equal(a, b),
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(va, vb)| values_equal(va, vb))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a.iter()
                    .all(|(key, va)| b.get(key).is_some_and(|vb| values_equal(va, vb)))
        }
        _ => a == b,
    }
}

fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", prefix, key)
    }
}

fn walk(prefix: &str, before: &Value, after: &Value, changes: &mut Vec<FieldChange>) {
    match (before, after) {
        (Value::Object(before_obj), Value::Object(after_obj)) => {
            for (key, old) in before_obj {
                let path = join_path(prefix, key);
                match after_obj.get(key) {
                    Some(new) => walk(&path, old, new, changes),
                    None => changes.push(FieldChange {
                        field: path,
                        from: old.clone(),
                        to: Value::Null,
                    }),
                }
            }
            for (key, new) in after_obj {
                if !before_obj.contains_key(key) {
                    changes.push(FieldChange {
                        field: join_path(prefix, key),
                        from: Value::Null,
                        to: new.clone(),
                    });
                }
            }
        }

        // Arrays are reported as a whole; attendance and leave arrays can
        // reorder internally and element-wise paths would be meaningless
        _ => {
            if !values_equal(before, after) {
                changes.push(FieldChange {
                    field: prefix.to_string(),
                    from: before.clone(),
                    to: after.clone(),
                });
            }
        }
    }
}

/// Serialize and strip excluded fields. None on serialization failure.
fn sanitized<T: Serialize>(value: &T, resource_type: &str) -> Option<Value> {
    match serde_json::to_value(value) {
        Ok(mut json) => {
            if let Value::Object(obj) = &mut json {
                for field in excluded_fields(resource_type) {
                    obj.remove(*field);
                }
            }
            Some(json)
        }
        Err(e) => {
            tracing::error!("Failed to serialize audit details: {:?}", e);
            None
        }
    }
}

/// Audit details for a create: the filtered snapshot of the new document
pub fn create_snapshot<T: Serialize>(value: &T, resource_type: &str) -> Value {
    sanitized(value, resource_type).unwrap_or_else(|| json!({"error": "serialization_failed"}))
}

/// Audit details for an update: `{"changes": [{field, from, to}, ...]}`
pub fn create_diff<T: Serialize>(from: &T, to: &T, resource_type: &str) -> Value {
    let (Some(before), Some(after)) = (
        sanitized(from, resource_type),
        sanitized(to, resource_type),
    ) else {
        return json!({"error": "serialization_failed"});
    };

    let mut changes = Vec::new();
    walk("", &before, &after, &mut changes);

    if changes.is_empty() {
        json!({"changes": [], "note": "no_changes_detected"})
    } else {
        json!({"changes": changes})
    }
}

/// Audit details for a delete: just the display identifier
pub fn create_delete_details(name: &str) -> Value {
    json!({"name": name})
}
