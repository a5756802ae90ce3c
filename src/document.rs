//! Document structure
//!
//! The parts of a manuscript the arrangement planner needs: codex entries
//! with their category, and chapters grouped into ordered sections.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentStructure {
    #[serde(default)]
    pub codex_entries: Vec<CodexEntry>,
    #[serde(default)]
    pub sections: Vec<Section>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodexEntry {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub category: Option<String>,
}

/// Structural grouping of chapters (act, part)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub chapters: Vec<ChapterRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChapterRef {
    pub id: String,
    pub title: String,
}
