//! Pure transforms over raw definition documents.
//!
//! These back editing tools that work on the JSON as stored, before it is
//! parsed into a [`ScreenDefinition`](super::ScreenDefinition). Every
//! function takes its input by reference and returns a new value.

use regex::RegexBuilder;
use serde_json::Value;

/// A `text` string found in a document, with the dotted path that reaches it.
#[derive(Debug, Clone, PartialEq)]
pub struct TextEntry {
    pub path: String,
    pub value: String,
}

/// Every string stored under a `text` key, depth first.
pub fn find_all_texts(document: &Value) -> Vec<TextEntry> {
    let mut found = Vec::new();
    collect_texts(document, String::new(), &mut found);
    found
}

fn child_path(prefix: &str, segment: &str) -> String {
    if prefix.is_empty() {
        segment.to_string()
    } else {
        format!("{}.{}", prefix, segment)
    }
}

fn collect_texts(node: &Value, prefix: String, found: &mut Vec<TextEntry>) {
    match node {
        Value::Object(map) => {
            for (key, value) in map {
                let path = child_path(&prefix, key);
                match value {
                    Value::String(text) if key == "text" => found.push(TextEntry {
                        path,
                        value: text.clone(),
                    }),
                    _ => collect_texts(value, path, found),
                }
            }
        }
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                collect_texts(item, child_path(&prefix, &index.to_string()), found);
            }
        }
        _ => {}
    }
}

/// Replace `search` with `replacement` in every `text` string.
///
/// Matching is literal and case-insensitive; an empty `search` leaves the
/// document unchanged.
pub fn replace_text(document: &Value, search: &str, replacement: &str) -> Value {
    if search.is_empty() {
        return document.clone();
    }
    let pattern = match RegexBuilder::new(&regex::escape(search))
        .case_insensitive(true)
        .build()
    {
        Ok(pattern) => pattern,
        Err(_) => return document.clone(),
    };
    map_texts(document, &|text| {
        pattern.replace_all(text, regex::NoExpand(replacement)).into_owned()
    })
}

fn map_texts(node: &Value, f: &dyn Fn(&str) -> String) -> Value {
    match node {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, value)| {
                    let value = match value {
                        Value::String(text) if key == "text" => Value::String(f(text)),
                        other => map_texts(other, f),
                    };
                    (key.clone(), value)
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(|item| map_texts(item, f)).collect()),
        other => other.clone(),
    }
}

/// Set the string at an existing dotted `path` (as returned by
/// [`find_all_texts`]). Returns `None` when any segment is missing.
pub fn update_text_at_path(document: &Value, path: &str, text: &str) -> Option<Value> {
    let mut updated = document.clone();
    let mut current = &mut updated;
    for segment in path.split('.') {
        current = match current {
            Value::Object(map) => map.get_mut(segment)?,
            Value::Array(items) => items.get_mut(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    *current = Value::String(text.to_string());
    Some(updated)
}

/// Components whose `type` equals `kind`, walking `children` and
/// `props.children`.
pub fn find_components_by_type<'a>(component: &'a Value, kind: &str) -> Vec<&'a Value> {
    let mut found = Vec::new();
    collect_components(component, kind, &mut found);
    found
}

fn collect_components<'a>(node: &'a Value, kind: &str, found: &mut Vec<&'a Value>) {
    let Some(map) = node.as_object() else {
        return;
    };
    if map.get("type").and_then(Value::as_str) == Some(kind) {
        found.push(node);
    }
    let children = map
        .get("children")
        .and_then(Value::as_array)
        .filter(|children| !children.is_empty())
        .or_else(|| {
            map.get("props")
                .and_then(|props| props.get("children"))
                .and_then(Value::as_array)
        });
    for child in children.into_iter().flatten() {
        collect_components(child, kind, found);
    }
}

/// Structural problems that make a document unusable as a definition.
/// An empty list means the document is acceptable.
pub fn validate_definition(document: &Value) -> Vec<String> {
    let mut problems = Vec::new();
    let Some(map) = document.as_object() else {
        problems.push("definition must be a JSON object".to_string());
        return problems;
    };
    match map.get("layout") {
        None | Some(Value::Null) => problems.push("definition must include \"layout\"".to_string()),
        Some(layout) => {
            if layout.get("type").and_then(Value::as_str).is_none() {
                problems.push("layout must have a \"type\"".to_string());
            }
        }
    }
    for key in ["actions", "hooks"] {
        if let Some(value) = map.get(key) {
            if !value.is_array() && !value.is_null() {
                problems.push(format!("\"{}\" must be an array", key));
            }
        }
    }
    problems
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document() -> Value {
        json!({
            "id": "LinkingStep1",
            "layout": {
                "type": "container",
                "children": [
                    {"type": "text", "props": {"text": "Vincular POS"}},
                    {"type": "container", "props": {"children": [
                        {"type": "button", "props": {"title": "Continuar"}},
                        {"type": "text", "props": {"text": "Paso 1 de 3 - vincular"}}
                    ]}}
                ]
            }
        })
    }

    #[test]
    fn test_find_all_texts_paths() {
        let texts = find_all_texts(&document());
        assert_eq!(texts.len(), 2);
        assert_eq!(texts[0].path, "layout.children.0.props.text");
        assert_eq!(texts[0].value, "Vincular POS");
        assert_eq!(
            texts[1].path,
            "layout.children.1.props.children.1.props.text"
        );
    }

    #[test]
    fn test_replace_text_is_pure_and_case_insensitive() {
        let original = document();
        let replaced = replace_text(&original, "VINCULAR", "Conectar");

        let texts = find_all_texts(&replaced);
        assert_eq!(texts[0].value, "Conectar POS");
        assert_eq!(texts[1].value, "Paso 1 de 3 - Conectar");
        assert_eq!(find_all_texts(&original)[0].value, "Vincular POS");
    }

    #[test]
    fn test_replace_text_literal_pattern() {
        let doc = json!({"text": "a.b a+b"});
        let replaced = replace_text(&doc, "a.b", "$1");
        assert_eq!(replaced, json!({"text": "$1 a+b"}));
    }

    #[test]
    fn test_update_text_at_path() {
        let doc = document();
        let updated = update_text_at_path(&doc, "layout.children.0.props.text", "Hola").unwrap();
        assert_eq!(find_all_texts(&updated)[0].value, "Hola");
        assert!(update_text_at_path(&doc, "layout.children.9.props.text", "x").is_none());
        assert!(update_text_at_path(&doc, "layout.missing", "x").is_none());
    }

    #[test]
    fn test_find_components_by_type() {
        let doc = document();
        let layout = &doc["layout"];
        assert_eq!(find_components_by_type(layout, "text").len(), 2);
        assert_eq!(find_components_by_type(layout, "button").len(), 1);
        assert_eq!(find_components_by_type(layout, "container").len(), 2);
    }

    #[test]
    fn test_validate_definition() {
        assert!(validate_definition(&document()).is_empty());
        assert_eq!(validate_definition(&json!({"id": "x"})).len(), 1);
        assert_eq!(
            validate_definition(&json!({"layout": {}, "actions": {}})),
            vec![
                "layout must have a \"type\"".to_string(),
                "\"actions\" must be an array".to_string()
            ]
        );
        assert_eq!(validate_definition(&json!([])).len(), 1);
    }
}
