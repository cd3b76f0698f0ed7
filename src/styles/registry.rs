use std::collections::HashMap;
use std::sync::OnceLock;

use tracing::warn;

use crate::{
    error::{Result, StyleError},
    styles::{catalog, Category, StyleDefinition, StyleSummary},
};

/// Registry of the built-in style catalog
///
/// The registry is the one place styles are resolved by id. Definitions are
/// built once and kept in declaration order; lookups go through an id index.
pub struct StyleRegistry {
    styles: Vec<StyleDefinition>,
    index: HashMap<&'static str, usize>,
}

impl StyleRegistry {
    /// Create a registry with all built-in styles
    pub fn new() -> Self {
        let mut registry = Self {
            styles: Vec::new(),
            index: HashMap::new(),
        };

        registry.register_builtin_styles();
        registry
    }

    /// Shared built-in catalog
    pub fn builtin() -> &'static StyleRegistry {
        static REGISTRY: OnceLock<StyleRegistry> = OnceLock::new();
        REGISTRY.get_or_init(StyleRegistry::new)
    }

    /// Register all built-in styles
    fn register_builtin_styles(&mut self) {
        for style in catalog::builtin_styles() {
            self.register(style);
        }
    }

    /// Register a style; a duplicate id keeps the first definition
    fn register(&mut self, style: StyleDefinition) {
        if self.index.contains_key(style.id) {
            warn!("Duplicate style id {} ignored", style.id);
            return;
        }
        self.index.insert(style.id, self.styles.len());
        self.styles.push(style);
    }

    /// Get a style by id
    pub fn get(&self, id: &str) -> Result<&StyleDefinition> {
        self.index
            .get(id)
            .and_then(|&i| self.styles.get(i))
            .ok_or_else(|| StyleError::UnknownStyle { id: id.to_string() }.into())
    }

    /// Every style, grouped by category in display order
    ///
    /// Within a category styles keep their declaration order.
    pub fn list_all(&self) -> Vec<&StyleDefinition> {
        Category::ORDER
            .iter()
            .flat_map(|category| self.styles.iter().filter(move |s| s.category == *category))
            .collect()
    }

    /// Display metadata for the catalog, in `list_all` order
    pub fn summaries(&self) -> Vec<StyleSummary> {
        self.list_all().into_iter().map(StyleDefinition::summary).collect()
    }

    /// Get all available style ids, in `list_all` order
    pub fn available_styles(&self) -> Vec<&'static str> {
        self.list_all().into_iter().map(|s| s.id).collect()
    }

    /// Check if a style is available
    pub fn has_style(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Get the number of registered styles
    pub fn len(&self) -> usize {
        self.styles.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }
}

impl Default for StyleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StylizerError;
    use std::collections::HashSet;

    #[test]
    fn test_builtin_styles_available() {
        let registry = StyleRegistry::new();

        assert!(registry.has_style("watercolor"));
        assert!(registry.has_style("3drender"));
        assert!(registry.has_style("papercut"));
        assert!(!registry.has_style("vhs"));

        assert_eq!(registry.len(), 24);
        assert!(!registry.is_empty());
    }

    #[test]
    fn test_get_style() {
        let registry = StyleRegistry::builtin();

        let ink = registry.get("ink").unwrap();
        assert_eq!(ink.id, "ink");
        assert_eq!(ink.category, Category::Traditional);

        let err = registry.get("unknown").unwrap_err();
        assert!(matches!(
            err,
            StylizerError::Style(StyleError::UnknownStyle { ref id }) if id == "unknown"
        ));
    }

    #[test]
    fn test_ids_are_distinct_and_resolvable() {
        let registry = StyleRegistry::builtin();
        let ids = registry.available_styles();
        let unique: HashSet<_> = ids.iter().collect();
        assert_eq!(unique.len(), ids.len());
        for id in ids {
            assert!(registry.get(id).is_ok());
        }
    }

    #[test]
    fn test_list_all_grouped_by_category_order() {
        let registry = StyleRegistry::builtin();
        let positions: Vec<usize> = registry
            .list_all()
            .iter()
            .map(|s| Category::ORDER.iter().position(|c| *c == s.category).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(registry.list_all()[0].id, "watercolor");
        assert_eq!(registry.list_all().last().unwrap().id, "papercut");
    }

    #[test]
    fn test_listing_is_stable() {
        let registry = StyleRegistry::builtin();
        assert_eq!(registry.available_styles(), StyleRegistry::new().available_styles());
        assert_eq!(registry.summaries().len(), registry.len());
    }

    #[test]
    fn test_every_pipeline_starts_opaque_and_validates() {
        use crate::styles::LayerOp;

        for style in StyleRegistry::builtin().list_all() {
            match style.pipeline.first() {
                Some(LayerOp::FillSolid { color }) => assert_eq!(color.alpha, 1.0, "{}", style.id),
                Some(LayerOp::FillGradient { alpha, .. }) => assert_eq!(*alpha, 1.0, "{}", style.id),
                other => panic!("{} starts with {:?}", style.id, other),
            }
            for op in &style.pipeline {
                assert!(op.validate().is_ok(), "{}: {}", style.id, op.kind());
            }
        }
    }
}
