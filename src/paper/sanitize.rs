use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use super::graph::PaperGraph;
use super::normalize::assemble_graph;

static CODE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```[A-Za-z0-9_+-]*").expect("code fence pattern"));
static TRAILING_COMMA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",(\s*[}\]])").expect("trailing comma pattern"));
static BARE_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([{,]\s*)([A-Za-z_$][A-Za-z0-9_$]*)(\s*:)").expect("bare key pattern")
});
static SINGLE_QUOTED_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"'([^'\n]*)'(\s*:)").expect("single quoted key pattern"));

/// Every variant renders the same message: callers surface it verbatim.
#[derive(Debug, Error)]
pub enum SanitizeError {
    #[error("invalid analysis result")]
    Malformed(#[source] serde_json::Error),
    #[error("invalid analysis result")]
    NotAnObject,
}

pub fn sanitize_payload(raw: &str) -> Result<PaperGraph, SanitizeError> {
    let repaired = repair_payload(raw);
    let value: Value = serde_json::from_str(&repaired).map_err(|error| {
        warn!(%error, bytes = raw.len(), "analysis payload rejected after repair");
        SanitizeError::Malformed(error)
    })?;

    let Value::Object(root) = value else {
        warn!("analysis payload is not an object");
        return Err(SanitizeError::NotAnObject);
    };

    let graph = assemble_graph(&root);
    debug!(
        nodes = graph.nodes.len(),
        links = graph.links.len(),
        "analysis payload sanitized"
    );
    Ok(graph)
}

/// Fixed textual repair pass. Runs once; there is no retry loop.
pub fn repair_payload(raw: &str) -> String {
    let span = payload_span(strip_enclosing_fence(raw.trim()));

    let mut repaired = String::with_capacity(span.len() + 16);
    for segment in split_string_literals(span) {
        match segment {
            Segment::Literal(text) => repaired.push_str(text),
            Segment::Code(text) => {
                let text = CODE_FENCE.replace_all(text, "");
                let text = TRAILING_COMMA.replace_all(&text, "$1");
                let text = BARE_KEY.replace_all(&text, "${1}\"${2}\"${3}");
                let text = SINGLE_QUOTED_KEY.replace_all(&text, "\"${1}\"${2}");
                repaired.push_str(&text);
            }
        }
    }
    repaired
}

/// Drops an opening fence marker and a closing fence around the payload.
fn strip_enclosing_fence(text: &str) -> &str {
    let mut text = text;
    if let Some(opening) = CODE_FENCE.find(text)
        && opening.start() == 0
    {
        text = &text[opening.end()..];
    }
    if let Some(body) = text.trim_end().strip_suffix("```") {
        text = body;
    }
    text.trim()
}

fn payload_span(text: &str) -> &str {
    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start < end => &text[start..=end],
        _ => text,
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Segment<'a> {
    Code(&'a str),
    Literal(&'a str),
}

/// Splits on double-quoted literals so rewrites never touch free text.
fn split_string_literals(text: &str) -> Vec<Segment<'_>> {
    let bytes = text.as_bytes();
    let mut segments = Vec::new();
    let mut code_start = 0usize;
    let mut index = 0usize;

    while index < bytes.len() {
        if bytes[index] != b'"' {
            index += 1;
            continue;
        }

        if code_start < index {
            segments.push(Segment::Code(&text[code_start..index]));
        }

        let literal_start = index;
        index += 1;
        while index < bytes.len() {
            match bytes[index] {
                b'\\' => index += 2,
                b'"' => {
                    index += 1;
                    break;
                }
                _ => index += 1,
            }
        }

        let literal_end = index.min(bytes.len());
        segments.push(Segment::Literal(&text[literal_start..literal_end]));
        index = literal_end;
        code_start = literal_end;
    }

    if code_start < bytes.len() {
        segments.push(Segment::Code(&text[code_start..]));
    }
    segments
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use proptest::prelude::*;

    use super::*;
    use crate::paper::graph::{PaperRecord, Relation, RelationKind};
    use crate::util::current_year;

    #[test]
    fn bare_keys_numeric_ids_and_string_years_are_repaired() {
        let graph = sanitize_payload(r#"{"nodes":[{id:1,title:"X",year:"2020"}],"links":[]}"#)
            .expect("repairable payload");

        assert_eq!(graph.nodes.len(), 1);
        assert_eq!(graph.nodes[0].id, "1");
        assert_eq!(graph.nodes[0].title, "X");
        assert_eq!(graph.nodes[0].year, 2020);
        assert!(graph.links.is_empty());
    }

    #[test]
    fn fenced_payload_with_trailing_commas_parses() {
        let raw = "```json\n{\n  \"nodes\": [\n    {\"id\": \"a\", \"title\": \"A\", \"year\": 2018},\n    {\"id\": \"b\", \"title\": \"B\", \"year\": 2021},\n  ],\n  \"links\": [{\"source\": \"a\", \"target\": \"b\", \"type\": \"Inheritance\",}],\n}\n```";
        let graph = sanitize_payload(raw).expect("fenced payload");

        assert_eq!(graph.nodes.len(), 2);
        assert_eq!(graph.links.len(), 1);
        assert_eq!(graph.links[0].kind, RelationKind::Inheritance);
    }

    #[test]
    fn commentary_around_the_payload_is_discarded() {
        let raw = "Sure! Here is the graph you asked for:\n{\"nodes\": [], \"links\": []}\nLet me know if you need more.";
        let graph = sanitize_payload(raw).expect("payload with commentary");
        assert!(graph.is_empty());
    }

    #[test]
    fn single_quoted_keys_become_double_quoted() {
        let graph = sanitize_payload(r#"{'nodes': [{'id': "p", 'title': "Paper", 'year': 1999}]}"#)
            .expect("single quoted keys");
        assert_eq!(graph.nodes[0].id, "p");
        assert_eq!(graph.nodes[0].year, 1999);
    }

    #[test]
    fn free_text_that_looks_like_syntax_is_left_alone() {
        let raw = r#"{"nodes":[{"id":"p","title":"Graphs, revisited: a survey,]","year":2001,"summary":"uses {a, b: c}"}],"links":[]}"#;
        let graph = sanitize_payload(raw).expect("payload with tricky strings");
        assert_eq!(graph.nodes[0].title, "Graphs, revisited: a survey,]");
        assert_eq!(graph.nodes[0].summary, "uses {a, b: c}");
    }

    #[test]
    fn fences_inside_free_text_survive() {
        let raw = "```json\n{\"nodes\":[{\"id\":\"p\",\"title\":\"P\",\"year\":2001,\"summary\":\"Ships a ```python snippet``` for reuse\"}],\"links\":[]}\n```";
        let graph = sanitize_payload(raw).expect("fenced payload with fenced text");
        assert_eq!(graph.nodes[0].summary, "Ships a ```python snippet``` for reuse");
    }

    #[test]
    fn single_line_fence_is_stripped() {
        let graph = sanitize_payload("```json {\"nodes\": [{\"id\": \"a\"}]}```")
            .expect("single line fence");
        assert_eq!(graph.nodes[0].id, "a");
    }

    #[test]
    fn escaped_quotes_inside_literals_do_not_end_the_literal() {
        let raw = r#"{"nodes":[{"id":"p","title":"The \"Big\" one, x: y","year":2001}]}"#;
        let graph = sanitize_payload(raw).expect("escaped quotes");
        assert_eq!(graph.nodes[0].title, "The \"Big\" one, x: y");
    }

    #[test]
    fn unparseable_payload_reports_single_message() {
        let error = sanitize_payload("I could not find any related papers.").unwrap_err();
        assert_eq!(error.to_string(), "invalid analysis result");

        let error = sanitize_payload("{\"nodes\": [ {\"id\": }").unwrap_err();
        assert!(matches!(error, SanitizeError::Malformed(_)));
        assert_eq!(error.to_string(), "invalid analysis result");
    }

    #[test]
    fn non_object_payload_is_rejected() {
        let error = sanitize_payload("[1, 2, 3]").unwrap_err();
        assert!(matches!(error, SanitizeError::NotAnObject));
    }

    #[test]
    fn missing_lists_become_empty() {
        let graph = sanitize_payload("{}").expect("empty object");
        assert!(graph.nodes.is_empty());
        assert!(graph.links.is_empty());
    }

    #[test]
    fn links_without_nodes_are_all_filtered() {
        let graph = sanitize_payload(
            r#"{"nodes": [], "links": [{"source": "a", "target": "b", "type": "Conflict"}]}"#,
        )
        .expect("links without nodes");
        assert!(graph.nodes.is_empty());
        assert!(graph.links.is_empty());
    }

    #[test]
    fn numeric_link_endpoints_match_coerced_ids() {
        let graph = sanitize_payload(
            r#"{"nodes":[{"id":1,"title":"A","year":2018},{"id":"2","title":"B","year":2019}],
                "links":[{"source":1,"target":2,"type":"Citation"},{"source":1,"target":3,"type":"Citation"}]}"#,
        )
        .expect("numeric endpoints");
        assert_eq!(graph.links.len(), 1);
        assert_eq!(graph.links[0].source, "1");
        assert_eq!(graph.links[0].target, "2");
    }

    #[test]
    fn literal_splitting_keeps_unterminated_tail_as_literal() {
        let segments = split_string_literals(r#"{a: "open"#);
        assert_eq!(
            segments,
            vec![Segment::Code("{a: "), Segment::Literal("\"open")]
        );
    }

    fn paper_strategy(index: usize) -> impl Strategy<Value = PaperRecord> {
        (
            "[A-Z][A-Za-z ,:]{0,16}",
            1950i32..2030,
            prop::collection::vec("[A-Z][a-z]{1,8}", 0..3),
            prop::option::of("[A-Za-z]{1,10}"),
        )
            .prop_map(move |(title, year, authors, category)| {
                let mut paper = PaperRecord::new(format!("p{index}"), title, year);
                paper.authors = authors;
                paper.category = category;
                paper
            })
    }

    fn graph_strategy() -> impl Strategy<Value = PaperGraph> {
        (1usize..8)
            .prop_flat_map(|count| {
                let papers = (0..count).map(paper_strategy).collect::<Vec<_>>();
                let links = prop::collection::vec(
                    (
                        0..count,
                        0..count,
                        prop::sample::select(RelationKind::ALL.to_vec()),
                        "[a-z ,:]{0,12}",
                    ),
                    0..10,
                );
                (papers, links)
            })
            .prop_map(|(nodes, links)| {
                let links = links
                    .into_iter()
                    .map(|(source, target, kind, description)| {
                        let mut relation =
                            Relation::new(format!("p{source}"), format!("p{target}"), kind);
                        relation.description = description;
                        relation
                    })
                    .collect();
                PaperGraph { nodes, links }
            })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn every_surviving_link_resolves(
            ids in prop::collection::vec("[a-e]", 0..6),
            endpoints in prop::collection::vec(("[a-h]", "[a-h]"), 0..12),
        ) {
            let nodes = ids
                .iter()
                .map(|id| format!(r#"{{"id":"{id}","title":"T","year":2000}}"#))
                .collect::<Vec<_>>()
                .join(",");
            let links = endpoints
                .iter()
                .map(|(source, target)| {
                    format!(r#"{{"source":"{source}","target":"{target}","type":"Citation"}}"#)
                })
                .collect::<Vec<_>>()
                .join(",");
            let raw = format!(r#"{{"nodes":[{nodes}],"links":[{links}]}}"#);

            let graph = sanitize_payload(&raw).expect("well-formed payload");
            let known = graph.nodes.iter().map(|paper| paper.id.as_str()).collect::<HashSet<_>>();
            for link in &graph.links {
                prop_assert!(known.contains(link.source.as_str()));
                prop_assert!(known.contains(link.target.as_str()));
            }

            let expected = endpoints
                .iter()
                .filter(|(source, target)| ids.contains(source) && ids.contains(target))
                .count();
            prop_assert_eq!(graph.links.len(), expected);
        }

        #[test]
        fn any_year_text_yields_an_integer_year(year_text in ".{0,12}") {
            let raw = serde_json::json!({
                "nodes": [{"id": "p", "title": "T", "year": year_text}],
                "links": [],
            })
            .to_string();
            let graph = sanitize_payload(&raw).expect("well-formed payload");
            let year = graph.nodes[0].year;
            let starts_numeric = year_text
                .trim_start()
                .trim_start_matches(['+', '-'])
                .starts_with(|ch: char| ch.is_ascii_digit());
            prop_assert!(starts_numeric || year == current_year());
        }

        #[test]
        fn sanitizing_a_serialized_graph_is_identity(graph in graph_strategy()) {
            let payload = graph.to_payload().expect("serializes");
            let reparsed = sanitize_payload(&payload).expect("round trip");
            prop_assert_eq!(reparsed, graph);
        }
    }
}
