use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::paper::{PaperGraph, sanitize_payload};

/// Where the analysis payload comes from. Standard input can only be read
/// once, so it is captured up front and replayed on reload.
#[derive(Clone, Debug)]
pub enum PayloadSource {
    File(PathBuf),
    Captured { label: String, text: String },
}

impl PayloadSource {
    pub fn from_arg(arg: &str) -> Result<Self> {
        if arg == "-" {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("failed to read analysis payload from stdin")?;
            return Ok(Self::Captured {
                label: "stdin".to_owned(),
                text,
            });
        }

        Ok(Self::File(PathBuf::from(arg)))
    }

    pub fn describe(&self) -> String {
        match self {
            Self::File(path) => path.display().to_string(),
            Self::Captured { label, .. } => label.clone(),
        }
    }

    pub fn fetch(&self) -> Result<String> {
        match self {
            Self::File(path) => fs::read_to_string(path)
                .with_context(|| format!("failed to read analysis payload {}", path.display())),
            Self::Captured { text, .. } => Ok(text.clone()),
        }
    }

    /// Reads and sanitizes the payload. A sanitizer failure is returned
    /// without extra context so its message reaches the user unchanged.
    pub fn load_graph(&self) -> Result<PaperGraph> {
        let raw = self.fetch()?;
        Ok(sanitize_payload(&raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn captured(text: &str) -> PayloadSource {
        PayloadSource::Captured {
            label: "test".to_owned(),
            text: text.to_owned(),
        }
    }

    #[test]
    fn captured_payload_is_replayed() {
        let source = captured(r#"{"nodes":[{"id":"a","title":"A","year":2019}],"links":[]}"#);
        assert_eq!(source.load_graph().expect("valid").node_count(), 1);
        assert_eq!(source.load_graph().expect("valid").node_count(), 1);
        assert_eq!(source.describe(), "test");
    }

    #[test]
    fn sanitizer_message_is_surfaced_verbatim() {
        let error = captured("not json at all").load_graph().expect_err("invalid");
        assert_eq!(error.to_string(), "invalid analysis result");
    }

    #[test]
    fn missing_file_names_the_path() {
        let source = PayloadSource::File(PathBuf::from("/definitely/not/here.json"));
        let error = source.fetch().expect_err("missing");
        assert!(error.to_string().contains("/definitely/not/here.json"));
    }
}
