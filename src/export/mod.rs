//! Export of transaction subsets to CSV and PDF.

mod csv;
mod handlers;
mod pdf;

pub use csv::transactions_to_csv;
pub use handlers::{export_csv_endpoint, export_pdf_endpoint};
pub use pdf::transactions_to_pdf;

use std::collections::HashMap;

use crate::category::{Category, CategoryId};

/// The label used when a transaction has no category reference.
const UNCATEGORIZED_LABEL: &str = "Uncategorized";
/// The label used when a category reference cannot be resolved.
const UNRESOLVED_CATEGORY_LABEL: &str = "Unknown";

fn category_name_index(categories: &[Category]) -> HashMap<CategoryId, &str> {
    categories
        .iter()
        .map(|category| (category.id, category.name.as_ref()))
        .collect()
}

fn resolve_category_name<'a>(
    category_id: Option<CategoryId>,
    names: &HashMap<CategoryId, &'a str>,
) -> &'a str {
    match category_id {
        Some(category_id) => names
            .get(&category_id)
            .copied()
            .unwrap_or(UNRESOLVED_CATEGORY_LABEL),
        None => UNCATEGORIZED_LABEL,
    }
}
