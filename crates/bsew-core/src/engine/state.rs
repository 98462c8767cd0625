//! Path addressing and update rules for the composite's JSON state tree.

use serde_json::map::Entry;
use serde_json::{Map, Value};

/// A location in the state tree, as a sequence of object keys from the root.
pub type StatePath = Vec<String>;

/// Renders a path for logs, errors, and emitter result keys.
pub fn path_label(path: &[String]) -> String {
    if path.is_empty() {
        "<root>".to_string()
    } else {
        path.join("/")
    }
}

/// Resolves a wire (a key or list of keys) relative to `parent`. `".."` steps up
/// one level.
pub fn resolve_wire(parent: &[String], wire: &Value) -> Result<StatePath, String> {
    let segments: Vec<&str> = match wire {
        Value::String(key) => vec![key.as_str()],
        Value::Array(items) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .ok_or_else(|| format!("wire segment {item} is not a string"))
            })
            .collect::<Result<_, _>>()?,
        other => return Err(format!("wire {other} must be a string or a list of strings")),
    };

    let mut path = parent.to_vec();
    for segment in segments {
        if segment == ".." {
            if path.pop().is_none() {
                return Err("wire climbs above the root of the state tree".to_string());
            }
        } else {
            path.push(segment.to_string());
        }
    }
    Ok(path)
}

pub fn get_path<'a>(root: &'a Value, path: &[String]) -> Option<&'a Value> {
    path.iter().try_fold(root, |node, key| node.get(key))
}

/// Stores `value` at `path`, creating (or replacing non-object) intermediate nodes.
pub fn set_path(root: &mut Value, path: &[String], value: Value) {
    let Some((last, parents)) = path.split_last() else {
        *root = value;
        return;
    };
    let mut node = root;
    for key in parents {
        node = object_mut(node)
            .entry(key.clone())
            .or_insert_with(|| Value::Object(Map::new()));
    }
    object_mut(node).insert(last.clone(), value);
}

/// Applies a process update at `path`: numbers are added, objects are merged key by
/// key, and anything else replaces the stored value.
pub fn apply_delta(root: &mut Value, path: &[String], delta: Value) {
    let Some((last, parents)) = path.split_last() else {
        merge_delta(root, delta);
        return;
    };
    let mut node = root;
    for key in parents {
        node = object_mut(node)
            .entry(key.clone())
            .or_insert_with(|| Value::Object(Map::new()));
    }
    match object_mut(node).entry(last.clone()) {
        Entry::Occupied(mut existing) => merge_delta(existing.get_mut(), delta),
        Entry::Vacant(slot) => {
            slot.insert(delta);
        }
    }
}

fn merge_delta(target: &mut Value, delta: Value) {
    match (target, delta) {
        (Value::Number(current), Value::Number(change)) => {
            if let (Some(a), Some(b)) = (current.as_f64(), change.as_f64()) {
                if let Some(sum) = serde_json::Number::from_f64(a + b) {
                    *current = sum;
                }
            }
        }
        (Value::Object(current), Value::Object(changes)) => {
            for (key, change) in changes {
                match current.entry(key) {
                    Entry::Occupied(mut existing) => merge_delta(existing.get_mut(), change),
                    Entry::Vacant(slot) => {
                        slot.insert(change);
                    }
                }
            }
        }
        (target, delta) => *target = delta,
    }
}

fn object_mut(node: &mut Value) -> &mut Map<String, Value> {
    if !node.is_object() {
        *node = Value::Object(Map::new());
    }
    match node {
        Value::Object(map) => map,
        _ => unreachable!("node was just replaced by an object"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn path(keys: &[&str]) -> StatePath {
        keys.iter().map(|k| k.to_string()).collect()
    }

    #[test]
    fn wires_resolve_relative_to_parent() {
        let parent = path(&["cell"]);
        assert_eq!(
            resolve_wire(&parent, &json!(["species", "A"])).unwrap(),
            path(&["cell", "species", "A"])
        );
        assert_eq!(
            resolve_wire(&parent, &json!("species")).unwrap(),
            path(&["cell", "species"])
        );
        assert_eq!(
            resolve_wire(&parent, &json!(["..", "global_time"])).unwrap(),
            path(&["global_time"])
        );
    }

    #[test]
    fn malformed_wires_are_rejected() {
        assert!(resolve_wire(&[], &json!([".."])).is_err());
        assert!(resolve_wire(&[], &json!(3)).is_err());
        assert!(resolve_wire(&[], &json!(["a", 1])).is_err());
    }

    #[test]
    fn set_and_get_create_intermediate_nodes() {
        let mut root = json!({"a": 1});
        set_path(&mut root, &path(&["b", "c"]), json!(2));
        assert_eq!(get_path(&root, &path(&["b", "c"])), Some(&json!(2)));
        assert_eq!(get_path(&root, &path(&["a"])), Some(&json!(1)));
        assert_eq!(get_path(&root, &path(&["missing"])), None);
    }

    #[test]
    fn deltas_add_numbers_and_merge_objects() {
        let mut root = json!({"species": {"A": 10.0, "B": 1.0}, "label": "x"});
        apply_delta(&mut root, &path(&["species"]), json!({"A": -2.5, "C": 4.0}));
        apply_delta(&mut root, &path(&["label"]), json!("y"));

        assert_eq!(root["species"]["A"], json!(7.5));
        assert_eq!(root["species"]["B"], json!(1.0));
        assert_eq!(root["species"]["C"], json!(4.0));
        assert_eq!(root["label"], json!("y"));
    }

    #[test]
    fn labels_join_keys() {
        assert_eq!(path_label(&path(&["cell", "emitter"])), "cell/emitter");
        assert_eq!(path_label(&[]), "<root>");
    }
}
