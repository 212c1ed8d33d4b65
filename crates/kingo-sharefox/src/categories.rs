//! Category lists: normalized from the categories endpoint, or synthesized
//! by grouping product records on their category/type field.

use std::collections::HashSet;

use kingo_core::Category;
use serde_json::Value;

use crate::normalize::{category_from_name, category_label, normalize_category};

/// Normalizes category records, dropping duplicates.
///
/// Records are deduplicated on their explicit id when they carry one and on
/// their lower-cased display name otherwise. The first occurrence wins.
#[must_use]
pub fn normalize_categories(records: &[Value]) -> Vec<Category> {
    let mut seen = HashSet::new();
    records
        .iter()
        .filter_map(|record| {
            let category = normalize_category(record);
            let key = explicit_id(record)
                .unwrap_or_else(|| category.display_name.to_lowercase());
            seen.insert(key).then_some(category)
        })
        .collect()
}

/// Synthesizes categories from product records.
///
/// Groups on the category's explicit id when the record nests one
/// (`{"category": {"id": 3, "name": "SUV"}}`), else on the lower-cased label,
/// so `"SUV"` and `"suv"` collapse into one category that keeps the first
/// spelling seen. Records without a category are ignored.
#[must_use]
pub fn group_categories(products: &[Value]) -> Vec<Category> {
    let mut seen = HashSet::new();
    let mut categories = Vec::new();

    for record in products {
        let Some(label) = category_label(record) else {
            continue;
        };
        let nested_id = nested_category_id(record);
        let key = nested_id
            .clone()
            .unwrap_or_else(|| label.to_lowercase());
        if !seen.insert(key) {
            continue;
        }

        let mut category = category_from_name(&label);
        if let Some(id) = nested_id {
            category.id = id;
        }
        categories.push(category);
    }

    tracing::debug!(
        products = products.len(),
        categories = categories.len(),
        "grouped categories from products"
    );
    categories
}

fn explicit_id(record: &Value) -> Option<String> {
    ["id", "category_id", "categoryId"]
        .iter()
        .find_map(|key| match record.get(*key)? {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
}

fn nested_category_id(record: &Value) -> Option<String> {
    match record.get("category") {
        Some(category @ Value::Object(_)) => explicit_id(category),
        _ => record
            .get("category_id")
            .or_else(|| record.get("categoryId"))
            .and_then(|v| match v {
                Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            }),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn grouping_is_case_insensitive_and_keeps_first_spelling() {
        let products = [
            json!({"id": 1, "category": "SUV"}),
            json!({"id": 2, "category": "suv"}),
            json!({"id": 3, "category": "Sedan"}),
        ];
        let categories = group_categories(&products);
        assert_eq!(categories.len(), 2);
        assert_eq!(categories[0].display_name, "SUV");
        assert_eq!(categories[0].id, "suv");
        assert_eq!(categories[1].display_name, "Sedan");
    }

    #[test]
    fn grouping_reads_type_field_and_skips_uncategorized() {
        let products = [
            json!({"id": 1, "type": "Van"}),
            json!({"id": 2}),
            json!({"id": 3, "vehicle_type": "Convertible"}),
        ];
        let names: Vec<_> = group_categories(&products)
            .into_iter()
            .map(|c| c.display_name)
            .collect();
        assert_eq!(names, ["Van", "Convertible"]);
    }

    #[test]
    fn grouping_prefers_nested_category_id() {
        let products = [
            json!({"id": 1, "category": {"id": 7, "name": "Luxury"}}),
            json!({"id": 2, "category": {"id": 7, "name": "Luxury cars"}}),
        ];
        let categories = group_categories(&products);
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].id, "7");
        assert_eq!(categories[0].display_name, "Luxury");
    }

    #[test]
    fn grouping_is_stable_across_runs() {
        let products = [json!({"category": "SUV"}), json!({"category": "Sedan"})];
        assert_eq!(group_categories(&products), group_categories(&products));
    }

    #[test]
    fn endpoint_categories_are_deduplicated() {
        let records = [
            json!({"id": 1, "name": "SUV"}),
            json!({"id": 1, "name": "SUV (dup)"}),
            json!({"name": "Sedan"}),
            json!({"name": "sedan"}),
            json!({"id": 2, "name": "Van"}),
        ];
        let categories = normalize_categories(&records);
        let names: Vec<_> = categories.iter().map(|c| c.display_name.as_str()).collect();
        assert_eq!(names, ["SUV", "Sedan", "Van"]);
    }
}
