//! Payload transforms attached to permission rules.
//!
//! Field paths are dot-separated and resolved through nested JSON objects.
//! Paths that do not resolve are tolerated; a transform never fails.

use peridot_odrl::Transform;
use serde_json::Value;

const REDACTED: &str = "***";

/// Applies every transform to the payload, in rule order.
pub fn apply<'a>(
    mut data: Value,
    transforms: impl IntoIterator<Item = &'a Transform>,
) -> Value {
    for transform in transforms {
        match transform {
            Transform::Redact { fields } => {
                for path in fields {
                    if let Some(slot) = resolve_path(&mut data, path) {
                        *slot = Value::String(REDACTED.to_string());
                    }
                }
            }
            Transform::Remove { fields } => {
                for path in fields {
                    remove_path(&mut data, path);
                }
            }
        }
    }
    data
}

/// Walks a dot-separated path through nested objects to the addressed slot.
fn resolve_path<'a>(data: &'a mut Value, path: &str) -> Option<&'a mut Value> {
    let mut current = data;
    for segment in path.split('.') {
        current = current.as_object_mut()?.get_mut(segment)?;
    }
    Some(current)
}

fn remove_path(data: &mut Value, path: &str) {
    let Some((parent_path, leaf)) = path.rsplit_once('.') else {
        if let Some(object) = data.as_object_mut() {
            object.remove(path);
        }
        return;
    };
    if let Some(parent) = resolve_path(data, parent_path) {
        if let Some(object) = parent.as_object_mut() {
            object.remove(leaf);
        }
    }
}
