use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use serde::Serialize;

use super::graph::{PaperGraph, RelationKind};

const FILE_EXTENSIONS: [&str; 9] = [
    "pdf", "txt", "md", "tex", "doc", "docx", "html", "htm", "bib",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FocusReason {
    TitleMatch,
    FileReference,
    FirstPaper,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Focus {
    pub core: Option<String>,
    pub reason: Option<FocusReason>,
    pub neighbors: BTreeMap<String, RelationKind>,
}

impl Focus {
    pub fn is_core(&self, id: &str) -> bool {
        self.core.as_deref() == Some(id)
    }

    pub fn neighbor_kind(&self, id: &str) -> Option<RelationKind> {
        self.neighbors.get(id).copied()
    }
}

/// Resolves the subject paper of `query` and its direct neighbors. Holds no
/// state; call it again whenever the graph or the query changes.
pub fn resolve_focus(graph: &PaperGraph, query: &str) -> Focus {
    let query = query.trim();
    if query.is_empty() {
        return Focus::default();
    }

    let needle = query.to_lowercase();
    let title_match = graph
        .nodes
        .iter()
        .find(|paper| paper.title.to_lowercase().contains(&needle));

    let (core, reason) = if let Some(paper) = title_match {
        (paper, FocusReason::TitleMatch)
    } else if let Some(first) = graph.nodes.first() {
        let reason = if looks_like_file_reference(query) {
            FocusReason::FileReference
        } else {
            FocusReason::FirstPaper
        };
        (first, reason)
    } else {
        return Focus::default();
    };

    let mut neighbors: BTreeMap<String, RelationKind> = BTreeMap::new();
    for relation in &graph.links {
        let Some(other) = relation.other_end(&core.id) else {
            continue;
        };
        if other == core.id {
            continue;
        }

        match neighbors.entry(other.to_owned()) {
            Entry::Vacant(slot) => {
                slot.insert(relation.kind);
            }
            Entry::Occupied(mut slot) => {
                if relation.kind.focus_priority() > slot.get().focus_priority() {
                    slot.insert(relation.kind);
                }
            }
        }
    }

    Focus {
        core: Some(core.id.clone()),
        reason: Some(reason),
        neighbors,
    }
}

pub fn looks_like_file_reference(query: &str) -> bool {
    let Some((stem, extension)) = query.trim().rsplit_once('.') else {
        return false;
    };
    !stem.is_empty()
        && FILE_EXTENSIONS
            .iter()
            .any(|known| extension.eq_ignore_ascii_case(known))
}
