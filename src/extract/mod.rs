//! Extraction engine
//!
//! Applies a declarative field schema to a parsed HTML document, producing a
//! record. Failures are isolated per field and per element: a bad selector or
//! a faulting processor nulls or omits the affected field without aborting
//! extraction of the rest.

use crate::schema::{FieldSpec, Record, Schema, StructuredField, Value};
use scraper::{ElementRef, Html, Selector};

/// Parses an HTML body and extracts a record from it.
///
/// Convenience wrapper for callers that hold the raw body; parsing and
/// extraction both happen synchronously so the non-Send document never lives
/// across an await point.
pub fn extract_from_html(html: &str, schema: &Schema) -> Record {
    let document = Html::parse_document(html);
    extract(&document, schema)
}

/// Extracts a record from a parsed document.
///
/// Field semantics:
/// - plain selector: no match -> null, one match -> text, several -> sequence
/// - structured spec: per-node attribute or text, processor pipeline applied
///   in order, collapsed to the first value unless `multiple`
/// - a spec with no usable selector is logged and omitted from the record
pub fn extract(document: &Html, schema: &Schema) -> Record {
    let mut record = Record::new();

    for (name, spec) in schema {
        match spec {
            FieldSpec::Selector(selector) => {
                if let Some(value) = extract_plain(document, name, selector) {
                    record.insert(name.clone(), value);
                }
            }
            FieldSpec::Structured(field) => {
                if let Some(value) = extract_structured(document, name, field) {
                    record.insert(name.clone(), value);
                }
            }
            FieldSpec::Malformed(spec) => {
                tracing::warn!(
                    "Field '{}' has a malformed spec ({}), skipping",
                    name,
                    spec
                );
            }
        }
    }

    record
}

/// Extracts a plain-selector field; None means the field is omitted
fn extract_plain(document: &Html, name: &str, selector: &str) -> Option<Value> {
    let parsed = parse_selector(name, selector)?;
    let mut texts: Vec<String> = document
        .select(&parsed)
        .map(|el| clean_text(&el))
        .collect();

    match texts.len() {
        0 => Some(Value::Null),
        1 => Some(Value::Text(texts.remove(0))),
        _ => Some(Value::Many(texts.into_iter().map(Value::Text).collect())),
    }
}

/// Extracts a structured field; None means the field is omitted
fn extract_structured(document: &Html, name: &str, field: &StructuredField) -> Option<Value> {
    let selector = match field.selector.as_deref() {
        Some(s) if !s.is_empty() => s,
        _ => {
            tracing::warn!("No selector provided for field '{}', skipping", name);
            return None;
        }
    };

    let parsed = parse_selector(name, selector)?;
    let elements: Vec<ElementRef> = document.select(&parsed).collect();

    if elements.is_empty() {
        return Some(if field.multiple {
            Value::Many(Vec::new())
        } else {
            Value::Null
        });
    }

    let mut values = Vec::with_capacity(elements.len());
    for element in &elements {
        let raw = match field.attribute.as_deref() {
            Some(attr) => element
                .value()
                .attr(attr)
                .map(|v| Value::Text(v.to_string()))
                .unwrap_or(Value::Null),
            None => Value::Text(clean_text(element)),
        };

        values.push(run_processors(name, field, raw));
    }

    if field.multiple {
        Some(Value::Many(values))
    } else {
        // elements is non-empty, so values has a first entry
        Some(values.remove(0))
    }
}

/// Runs the field's processor pipeline over one extracted value.
///
/// A null intermediate short-circuits the remaining steps; a faulting
/// processor is logged and nulls this element only.
fn run_processors(name: &str, field: &StructuredField, mut value: Value) -> Value {
    for processor in &field.processors {
        if value.is_null() {
            break;
        }
        match processor.apply(value) {
            Ok(next) => value = next,
            Err(fault) => {
                tracing::warn!("Processor fault for field '{}': {}", name, fault);
                return Value::Null;
            }
        }
    }
    value
}

/// Parses a CSS selector, logging and skipping the field on failure
fn parse_selector(name: &str, selector: &str) -> Option<Selector> {
    match Selector::parse(selector) {
        Ok(s) => Some(s),
        Err(e) => {
            tracing::warn!("Invalid selector '{}' for field '{}': {}", selector, name, e);
            None
        }
    }
}

/// Collects an element's text, trimmed, with internal whitespace runs
/// collapsed to single spaces
fn clean_text(element: &ElementRef) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Processor;

    fn schema_from_json(json: &str) -> Schema {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_title_and_links_scenario() {
        let html = r#"<html><body><h1>Hi</h1><a href="/a">A</a><a href="/b">B</a></body></html>"#;
        let schema = schema_from_json(
            r#"{"title": "h1", "links": {"selector": "a", "attribute": "href", "multiple": true}}"#,
        );

        let record = extract_from_html(html, &schema);

        assert_eq!(record.get("title"), Some(&Value::Text("Hi".to_string())));
        assert_eq!(
            record.get("links"),
            Some(&Value::Many(vec![
                Value::Text("/a".to_string()),
                Value::Text("/b".to_string()),
            ]))
        );
    }

    #[test]
    fn test_all_selectors_match_nothing() {
        let html = "<html><body><p>text</p></body></html>";
        let schema = schema_from_json(
            r#"{"title": "h1", "images": {"selector": "img", "attribute": "src", "multiple": true}}"#,
        );

        let record = extract_from_html(html, &schema);

        assert_eq!(record.get("title"), Some(&Value::Null));
        assert_eq!(record.get("images"), Some(&Value::Many(vec![])));
    }

    #[test]
    fn test_plain_selector_multiple_matches_become_sequence() {
        let html = "<html><body><p>one</p><p>two</p></body></html>";
        let schema = schema_from_json(r#"{"paragraphs": "p"}"#);

        let record = extract_from_html(html, &schema);
        assert_eq!(
            record.get("paragraphs"),
            Some(&Value::Many(vec![
                Value::Text("one".to_string()),
                Value::Text("two".to_string()),
            ]))
        );
    }

    #[test]
    fn test_text_is_trimmed_and_squeezed() {
        let html = "<html><body><h1>  Hello\n   world  </h1></body></html>";
        let schema = schema_from_json(r#"{"title": "h1"}"#);

        let record = extract_from_html(html, &schema);
        assert_eq!(
            record.get("title"),
            Some(&Value::Text("Hello world".to_string()))
        );
    }

    #[test]
    fn test_missing_attribute_yields_null_element() {
        let html = r#"<html><body><a href="/a">A</a><a>no-href</a></body></html>"#;
        let schema = schema_from_json(
            r#"{"links": {"selector": "a", "attribute": "href", "multiple": true}}"#,
        );

        let record = extract_from_html(html, &schema);
        assert_eq!(
            record.get("links"),
            Some(&Value::Many(vec![
                Value::Text("/a".to_string()),
                Value::Null,
            ]))
        );
    }

    #[test]
    fn test_processor_chain_applies_in_order() {
        let html = r#"<html><body><span class="price">$1,299.99</span></body></html>"#;
        let schema = schema_from_json(
            r#"{"price": {"selector": ".price", "processors": ["strip-currency", "parse-float"]}}"#,
        );

        let record = extract_from_html(html, &schema);
        assert_eq!(record.get("price"), Some(&Value::Float(1299.99)));
    }

    #[test]
    fn test_processor_fault_nulls_element_not_record() {
        let html = r#"<html><body>
            <span class="price">$10</span>
            <span class="price">call us</span>
            <h1>Title</h1>
        </body></html>"#;
        let schema = schema_from_json(
            r#"{
                "prices": {"selector": ".price", "multiple": true,
                           "processors": ["strip-currency", "parse-float"]},
                "title": "h1"
            }"#,
        );

        let record = extract_from_html(html, &schema);
        assert_eq!(
            record.get("prices"),
            Some(&Value::Many(vec![Value::Float(10.0), Value::Null]))
        );
        // The faulting element did not disturb the sibling field
        assert_eq!(record.get("title"), Some(&Value::Text("Title".to_string())));
    }

    #[test]
    fn test_single_value_collapses_to_first_match() {
        let html = "<html><body><p>first</p><p>second</p></body></html>";
        let mut schema = Schema::new();
        schema.insert(
            "p".to_string(),
            FieldSpec::Structured(StructuredField {
                selector: Some("p".to_string()),
                ..Default::default()
            }),
        );

        let record = extract_from_html(html, &schema);
        assert_eq!(record.get("p"), Some(&Value::Text("first".to_string())));
    }

    #[test]
    fn test_spec_without_selector_is_omitted() {
        let html = "<html><body><p>x</p></body></html>";
        let schema = schema_from_json(r#"{"broken": {"multiple": true}, "ok": "p"}"#);

        let record = extract_from_html(html, &schema);
        assert!(!record.contains_key("broken"));
        assert_eq!(record.get("ok"), Some(&Value::Text("x".to_string())));
    }

    #[test]
    fn test_non_string_non_mapping_spec_is_omitted() {
        let html = "<html><body><p>x</p></body></html>";
        let schema = schema_from_json(r#"{"odd": 42, "ok": "p"}"#);

        let record = extract_from_html(html, &schema);
        assert!(!record.contains_key("odd"));
        assert_eq!(record.get("ok"), Some(&Value::Text("x".to_string())));
    }

    #[test]
    fn test_invalid_css_selector_is_omitted() {
        let html = "<html><body><p>x</p></body></html>";
        let schema = schema_from_json(r#"{"bad": "p[", "ok": "p"}"#);

        let record = extract_from_html(html, &schema);
        assert!(!record.contains_key("bad"));
        assert!(record.contains_key("ok"));
    }

    #[test]
    fn test_null_short_circuits_remaining_processors() {
        // href missing -> Null before the pipeline; parse-float never runs
        let html = "<html><body><a>x</a></body></html>";
        let mut schema = Schema::new();
        schema.insert(
            "link".to_string(),
            FieldSpec::Structured(StructuredField {
                selector: Some("a".to_string()),
                attribute: Some("href".to_string()),
                multiple: false,
                processors: vec![Processor::ParseFloat],
            }),
        );

        let record = extract_from_html(html, &schema);
        assert_eq!(record.get("link"), Some(&Value::Null));
    }
}
