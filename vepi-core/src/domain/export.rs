//! Exported model data

use serde::{Deserialize, Serialize};

use crate::dto::export::IntersectionsPage;

/// Intersections aggregated across every page of an export
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IntersectionTable {
    /// Column names, taken from the most recently absorbed page
    pub headers: Vec<String>,
    /// Data records, header rows excluded
    pub rows: Vec<Vec<serde_json::Value>>,
}

impl IntersectionTable {
    /// Absorb one page: drop its leading header row and keep its headers
    pub fn absorb(&mut self, page: IntersectionsPage) {
        self.rows.extend(page.data.into_iter().skip(1));
        self.headers = page.metadata.headers;
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of a column by name
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }
}

impl FromIterator<IntersectionsPage> for IntersectionTable {
    fn from_iter<I: IntoIterator<Item = IntersectionsPage>>(pages: I) -> Self {
        let mut table = IntersectionTable::default();
        for page in pages {
            table.absorb(page);
        }
        table
    }
}

/// One member of a dimension hierarchy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyMember {
    #[serde(default)]
    pub dimension: Option<String>,
    pub name: String,
    #[serde(default)]
    pub alias: Option<String>,
    #[serde(default)]
    pub parent: Option<String>,
    /// Consolidation operator, `+` or `-`
    #[serde(default)]
    pub operator: Option<String>,
}

/// Plain-text rendering of one cell: strings unquoted, null as empty
pub fn cell_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(text) => text.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Distinct dimension names in first-seen order
pub fn distinct_dimensions(members: &[HierarchyMember]) -> Vec<&str> {
    let mut seen: Vec<&str> = Vec::new();
    for dimension in members.iter().filter_map(|m| m.dimension.as_deref()) {
        if !seen.contains(&dimension) {
            seen.push(dimension);
        }
    }
    seen
}
