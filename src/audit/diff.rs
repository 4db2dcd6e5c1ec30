//! Change summaries for audit entries

use serde_json::Value;

/// Bookkeeping fields that change on every write and are left out of summaries
const IGNORED_FIELDS: &[&str] = &["updated_at"];

/// Summarize top-level field changes between two JSON states
///
/// Returns `None` when nothing but bookkeeping fields changed.
pub fn generate_diff(before: &Value, after: &Value) -> Option<String> {
    let (Value::Object(before_obj), Value::Object(after_obj)) = (before, after) else {
        if before == after {
            return None;
        }
        return Some(format!("{} -> {}", format_value(before), format_value(after)));
    };

    let mut changes = Vec::new();

    for (key, before_val) in before_obj {
        if IGNORED_FIELDS.contains(&key.as_str()) {
            continue;
        }
        match after_obj.get(key) {
            Some(after_val) if after_val != before_val => changes.push(format!(
                "{}: {} -> {}",
                key,
                format_value(before_val),
                format_value(after_val)
            )),
            Some(_) => {}
            None => changes.push(format!("{}: {} -> (removed)", key, format_value(before_val))),
        }
    }

    for (key, after_val) in after_obj {
        if !before_obj.contains_key(key) && !IGNORED_FIELDS.contains(&key.as_str()) {
            changes.push(format!("{}: (added) -> {}", key, format_value(after_val)));
        }
    }

    if changes.is_empty() {
        None
    } else {
        Some(changes.join(", "))
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) if s.chars().count() > 50 => {
            let head: String = s.chars().take(47).collect();
            format!("\"{}...\"", head)
        }
        Value::Array(arr) => format!("[{} items]", arr.len()),
        Value::Object(obj) => format!("{{{} fields}}", obj.len()),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_changed_added_and_removed_fields() {
        let before = json!({"category": "food", "receipt": "r1"});
        let after = json!({"category": "transport", "owner": "ana"});

        let diff = generate_diff(&before, &after).unwrap();
        assert!(diff.contains("category: \"food\" -> \"transport\""));
        assert!(diff.contains("receipt: \"r1\" -> (removed)"));
        assert!(diff.contains("owner: (added) -> \"ana\""));
    }

    #[test]
    fn test_timestamp_only_change_is_not_a_diff() {
        let before = json!({"category": "food", "updated_at": "2024-01-01T00:00:00Z"});
        let after = json!({"category": "food", "updated_at": "2024-02-01T00:00:00Z"});
        assert_eq!(generate_diff(&before, &after), None);
    }

    #[test]
    fn test_long_strings_are_truncated() {
        let long = "x".repeat(80);
        let diff = generate_diff(&json!({"d": ""}), &json!({"d": long})).unwrap();
        assert!(diff.ends_with("...\""));
    }
}
