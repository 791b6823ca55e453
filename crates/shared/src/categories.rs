//! Normalization of the `GET /api/categories` body.
//!
//! The server answers with a nested object: each top-level key is a
//! category1 name and its value is an object keyed by category2 names.
//! Key order is the server's order.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::CategoryDescriptor;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryTree(pub Map<String, Value>);

pub fn normalize_categories(raw: &CategoryTree) -> Vec<CategoryDescriptor> {
    raw.0
        .iter()
        .filter(|(name, _)| !name.trim().is_empty())
        .map(|(name, children)| {
            let children = match children {
                Value::Object(map) => map
                    .keys()
                    .filter(|child| !child.trim().is_empty())
                    .cloned()
                    .collect(),
                Value::Array(items) => items
                    .iter()
                    .filter_map(Value::as_str)
                    .filter(|child| !child.trim().is_empty())
                    .map(str::to_string)
                    .collect(),
                _ => Vec::new(),
            };
            CategoryDescriptor::new(name.clone(), children)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree(json: &str) -> CategoryTree {
        serde_json::from_str(json).expect("category json")
    }

    #[test]
    fn keeps_server_order_for_both_levels() {
        let raw = tree(
            r#"{
                "생활/건강": {"생활용품": {}, "주방용품": {}, "문구/사무용품": {}},
                "디지털/가전": {"태블릿PC": {}, "노트북": {}}
            }"#,
        );

        let categories = normalize_categories(&raw);

        assert_eq!(
            categories,
            vec![
                CategoryDescriptor::new(
                    "생활/건강",
                    vec!["생활용품".into(), "주방용품".into(), "문구/사무용품".into()]
                ),
                CategoryDescriptor::new("디지털/가전", vec!["태블릿PC".into(), "노트북".into()]),
            ]
        );
    }

    #[test]
    fn accepts_array_children_and_skips_blank_names() {
        let raw = tree(r#"{"": {"x": {}}, "a": ["b", " ", "c"], "d": null}"#);

        let categories = normalize_categories(&raw);

        assert_eq!(
            categories,
            vec![
                CategoryDescriptor::new("a", vec!["b".into(), "c".into()]),
                CategoryDescriptor::new("d", Vec::new()),
            ]
        );
    }
}
