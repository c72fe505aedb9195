use std::collections::HashSet;

use serde_json::{Map, Value};
use tracing::debug;

use crate::util::current_year;

use super::graph::{PaperGraph, PaperRecord, Relation, RelationKind};

pub(super) fn assemble_graph(root: &Map<String, Value>) -> PaperGraph {
    let fallback_year = current_year();

    let mut nodes = Vec::new();
    let mut known_ids = HashSet::new();
    let mut skipped_nodes = 0usize;
    for raw in list_field(root, "nodes") {
        let Some(paper) = paper_from_value(raw, fallback_year) else {
            skipped_nodes += 1;
            continue;
        };
        if !known_ids.insert(paper.id.clone()) {
            skipped_nodes += 1;
            continue;
        }
        nodes.push(paper);
    }

    let mut links = Vec::new();
    let mut dropped_links = 0usize;
    for raw in list_field(root, "links") {
        match relation_from_value(raw) {
            Some(relation)
                if known_ids.contains(&relation.source) && known_ids.contains(&relation.target) =>
            {
                links.push(relation);
            }
            _ => dropped_links += 1,
        }
    }

    if skipped_nodes > 0 || dropped_links > 0 {
        debug!(skipped_nodes, dropped_links, "dropped unusable payload entries");
    }

    PaperGraph { nodes, links }
}

fn list_field<'a>(root: &'a Map<String, Value>, key: &str) -> &'a [Value] {
    root.get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn paper_from_value(value: &Value, fallback_year: i32) -> Option<PaperRecord> {
    let object = value.as_object()?;
    let id = coerce_identity(object.get("id")?)?;

    let title = object
        .get("title")
        .and_then(scalar_text)
        .filter(|title| !title.trim().is_empty())
        .unwrap_or_else(|| id.clone());

    Some(PaperRecord {
        year: coerce_year(object.get("year"), fallback_year),
        authors: coerce_authors(object.get("authors")),
        novelty: text_field(object, &["novelty"]).unwrap_or_default(),
        summary: text_field(object, &["summary"]).unwrap_or_default(),
        evolution_summary: text_field(object, &["evolutionSummary", "evolution_summary"]),
        comparison: text_field(object, &["comparison"]),
        category: text_field(object, &["category"]),
        url: text_field(object, &["url"]),
        dataset: text_field(object, &["dataset"]),
        benchmark: text_field(object, &["benchmark"]),
        methodology: text_field(object, &["methodology"]),
        id,
        title,
    })
}

fn relation_from_value(value: &Value) -> Option<Relation> {
    let object = value.as_object()?;
    let source = coerce_endpoint(object.get("source")?)?;
    let target = coerce_endpoint(object.get("target")?)?;
    let kind = object
        .get("type")
        .and_then(Value::as_str)
        .map(RelationKind::parse_loose)
        .unwrap_or(RelationKind::Citation);

    Some(Relation {
        source,
        target,
        kind,
        description: text_field(object, &["description"]).unwrap_or_default(),
    })
}

fn coerce_identity(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => {
            let text = text.trim();
            (!text.is_empty()).then(|| text.to_owned())
        }
        Value::Number(number) => Some(match number.as_f64() {
            Some(float) if number.is_f64() && float.fract() == 0.0 && float.abs() < 1e15 => {
                format!("{}", float as i64)
            }
            _ => number.to_string(),
        }),
        _ => None,
    }
}

/// Graphs cached after a layout pass may carry whole node objects as
/// endpoints instead of identities.
fn coerce_endpoint(value: &Value) -> Option<String> {
    match value {
        Value::Object(object) => object.get("id").and_then(coerce_identity),
        other => coerce_identity(other),
    }
}

fn coerce_year(value: Option<&Value>, fallback_year: i32) -> i32 {
    let parsed = match value {
        Some(Value::Number(number)) => number
            .as_i64()
            .or_else(|| {
                number
                    .as_f64()
                    .filter(|year| year.is_finite())
                    .map(|year| year.trunc() as i64)
            })
            .and_then(|year| i32::try_from(year).ok()),
        Some(Value::String(text)) => leading_integer(text),
        _ => None,
    };
    parsed.unwrap_or(fallback_year)
}

/// Accepts an optional sign and the leading run of digits, ignoring any tail
/// such as `"2019 (preprint)"`.
fn leading_integer(text: &str) -> Option<i32> {
    let text = text.trim_start();
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };

    let end = digits
        .find(|ch: char| !ch.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }

    let magnitude = digits[..end].parse::<i64>().ok()?;
    i32::try_from(if negative { -magnitude } else { magnitude }).ok()
}

fn coerce_authors(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items.iter().filter_map(scalar_text).collect(),
        Some(Value::String(name)) => vec![name.clone()],
        _ => Vec::new(),
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn text_field(object: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| object.get(*key))
        .and_then(scalar_text)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn assemble(value: Value) -> PaperGraph {
        let Value::Object(root) = value else {
            panic!("test payload must be an object");
        };
        assemble_graph(&root)
    }

    #[test]
    fn year_accepts_numbers_strings_and_falls_back() {
        assert_eq!(coerce_year(Some(&json!(2017)), 1), 2017);
        assert_eq!(coerce_year(Some(&json!(2017.9)), 1), 2017);
        assert_eq!(coerce_year(Some(&json!("2019 (preprint)")), 1), 2019);
        assert_eq!(coerce_year(Some(&json!("  -44")), 1), -44);
        assert_eq!(coerce_year(Some(&json!("circa 2019")), 1), 1);
        assert_eq!(coerce_year(Some(&json!(null)), 1), 1);
        assert_eq!(coerce_year(Some(&json!("99999999999")), 1), 1);
        assert_eq!(coerce_year(None, 1), 1);
    }

    #[test]
    fn missing_year_uses_current_calendar_year() {
        let graph = assemble(json!({"nodes": [{"id": "a", "title": "A"}]}));
        assert_eq!(graph.nodes[0].year, current_year());
    }

    #[test]
    fn authors_are_normalized_to_a_sequence() {
        assert_eq!(
            coerce_authors(Some(&json!(["Ada", "Alan", 7, null]))),
            vec!["Ada".to_owned(), "Alan".to_owned(), "7".to_owned()]
        );
        assert_eq!(coerce_authors(Some(&json!("Grace"))), vec!["Grace".to_owned()]);
        assert!(coerce_authors(Some(&json!({"name": "x"}))).is_empty());
        assert!(coerce_authors(None).is_empty());
    }

    #[test]
    fn unusable_and_duplicate_nodes_are_skipped() {
        let graph = assemble(json!({
            "nodes": [
                {"id": "a", "title": "First"},
                {"id": "a", "title": "Second"},
                {"title": "No id"},
                "not a node",
                {"id": 7, "title": "   "},
            ],
        }));

        let ids = graph.nodes.iter().map(|paper| paper.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, vec!["a", "7"]);
        assert_eq!(graph.nodes[0].title, "First");
        assert_eq!(graph.nodes[1].title, "7");
    }

    #[test]
    fn integral_float_ids_match_integer_endpoints() {
        assert_eq!(coerce_identity(&json!(1.0)).as_deref(), Some("1"));
        assert_eq!(coerce_identity(&json!(1.5)).as_deref(), Some("1.5"));

        let graph = assemble(json!({
            "nodes": [{"id": 1.0}, {"id": 2}],
            "links": [{"source": 1, "target": 2.0, "type": "Citation"}],
        }));
        let ids: Vec<&str> = graph.nodes.iter().map(|paper| paper.id.as_str()).collect();
        assert_eq!(ids, ["1", "2"]);
        assert_eq!(graph.links.len(), 1);
    }

    #[test]
    fn endpoint_objects_resolve_through_their_id() {
        let graph = assemble(json!({
            "nodes": [{"id": "a"}, {"id": "b"}],
            "links": [
                {"source": {"id": "a", "x": 10.0}, "target": "b", "type": "conflict"},
                {"source": "a", "type": "Citation"},
            ],
        }));

        assert_eq!(graph.links.len(), 1);
        assert_eq!(graph.links[0].source, "a");
        assert_eq!(graph.links[0].kind, RelationKind::Conflict);
    }

    #[test]
    fn optional_text_fields_accept_alternate_spelling() {
        let graph = assemble(json!({
            "nodes": [{"id": "a", "evolution_summary": "grew", "url": "https://x", "novelty": 3}],
        }));
        let paper = &graph.nodes[0];
        assert_eq!(paper.evolution_summary.as_deref(), Some("grew"));
        assert_eq!(paper.url.as_deref(), Some("https://x"));
        assert_eq!(paper.novelty, "3");
        assert_eq!(paper.dataset, None);
    }
}
