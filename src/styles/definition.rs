use serde::{Deserialize, Serialize};
use std::fmt;

use crate::styles::LayerOp;

/// Catalog grouping used for display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    Classic,
    Modern,
    Anime,
    Traditional,
    ThreeD,
    Fantasy,
    Minimal,
}

impl Category {
    /// Display order of the catalog
    pub const ORDER: [Category; 7] = [
        Category::Classic,
        Category::Modern,
        Category::Anime,
        Category::Traditional,
        Category::ThreeD,
        Category::Fantasy,
        Category::Minimal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Classic => "classic",
            Category::Modern => "modern",
            Category::Anime => "anime",
            Category::Traditional => "traditional",
            Category::ThreeD => "threeD",
            Category::Fantasy => "fantasy",
            Category::Minimal => "minimal",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named, fixed recipe that turns a sketch into artwork
#[derive(Debug, Clone, PartialEq)]
pub struct StyleDefinition {
    pub id: &'static str,
    pub display_name: &'static str,
    pub icon: &'static str,
    pub description: &'static str,
    pub category: Category,
    pub pipeline: Vec<LayerOp>,
}

impl StyleDefinition {
    pub fn summary(&self) -> StyleSummary {
        StyleSummary {
            id: self.id,
            display_name: self.display_name,
            icon: self.icon,
            description: self.description,
            category: self.category,
        }
    }
}

/// Display metadata of a style, without its pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleSummary {
    pub id: &'static str,
    pub display_name: &'static str,
    pub icon: &'static str,
    pub description: &'static str,
    pub category: Category,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_serializes_camel_case() {
        #[derive(Serialize)]
        struct Wrapper {
            category: Category,
        }
        let text = toml::to_string(&Wrapper {
            category: Category::ThreeD,
        })
        .unwrap();
        assert_eq!(text.trim(), "category = \"threeD\"");
        assert_eq!(Category::ThreeD.to_string(), "threeD");
    }

    #[test]
    fn test_category_order_is_complete() {
        let mut seen = Category::ORDER.to_vec();
        seen.dedup();
        assert_eq!(seen.len(), 7);
        assert_eq!(Category::ORDER[0], Category::Classic);
        assert_eq!(Category::ORDER[6], Category::Minimal);
    }
}
