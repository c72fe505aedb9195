use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum RelationKind {
    Inheritance,
    Conflict,
    Inspiration,
    Citation,
}

impl RelationKind {
    pub const ALL: [Self; 4] = [
        Self::Inheritance,
        Self::Conflict,
        Self::Inspiration,
        Self::Citation,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Inheritance => "Inheritance",
            Self::Conflict => "Conflict",
            Self::Inspiration => "Inspiration",
            Self::Citation => "Citation",
        }
    }

    /// Maps producer wording onto the closed vocabulary. Unknown wording
    /// degrades to `Citation`, the weakest relation.
    pub fn parse_loose(raw: &str) -> Self {
        let normalized = raw.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "inheritance" | "improvement" | "inherit" | "inherits" | "extends" | "builds on" => {
                Self::Inheritance
            }
            "conflict" | "contradiction" | "contradicts" | "refutes" => Self::Conflict,
            "inspiration" | "inspired" | "inspires" => Self::Inspiration,
            _ => Self::Citation,
        }
    }

    /// Higher wins when several relations connect the same pair of papers.
    pub fn focus_priority(self) -> u8 {
        match self {
            Self::Conflict => 3,
            Self::Inheritance => 2,
            Self::Inspiration => 1,
            Self::Citation => 0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaperRecord {
    pub id: String,
    pub title: String,
    pub year: i32,
    pub authors: Vec<String>,
    pub novelty: String,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evolution_summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparison: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dataset: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub benchmark: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub methodology: Option<String>,
}

impl PaperRecord {
    pub fn new(id: impl Into<String>, title: impl Into<String>, year: i32) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            year,
            authors: Vec::new(),
            novelty: String::new(),
            summary: String::new(),
            evolution_summary: None,
            comparison: None,
            category: None,
            url: None,
            dataset: None,
            benchmark: None,
            methodology: None,
        }
    }

    pub fn category_label(&self) -> &str {
        self.category
            .as_deref()
            .map(str::trim)
            .filter(|category| !category.is_empty())
            .unwrap_or("Other")
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Relation {
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub kind: RelationKind,
    pub description: String,
}

impl Relation {
    pub fn new(source: impl Into<String>, target: impl Into<String>, kind: RelationKind) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            kind,
            description: String::new(),
        }
    }

    /// The endpoint across from `id`, if `id` is one of the endpoints.
    pub fn other_end(&self, id: &str) -> Option<&str> {
        if self.source == id {
            Some(self.target.as_str())
        } else if self.target == id {
            Some(self.source.as_str())
        } else {
            None
        }
    }
}

/// Every relation endpoint names a paper in `nodes`. Only the sanitizer
/// builds graphs from untrusted text, and it restores that invariant.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PaperGraph {
    pub nodes: Vec<PaperRecord>,
    pub links: Vec<Relation>,
}

impl PaperGraph {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn paper(&self, id: &str) -> Option<&PaperRecord> {
        self.nodes.iter().find(|paper| paper.id == id)
    }

    pub fn year_span(&self) -> Option<(i32, i32)> {
        let min = self.nodes.iter().map(|paper| paper.year).min()?;
        let max = self.nodes.iter().map(|paper| paper.year).max()?;
        Some((min, max))
    }

    pub fn to_payload(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
