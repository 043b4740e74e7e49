// csv_filter.rs
use crate::csv_table::CsvTable;
use std::collections::HashSet;

pub struct HandleFilterOutcome {
    /// Product rows whose Handle appears in the filtered inventory, original
    /// order, whole-row deduplicated. Empty when a Handle column is missing.
    pub filtered: CsvTable,
    /// True when either side lacks a "Handle" column. Advisory, never fatal.
    pub missing_handle: bool,
}

/// Keep the product rows that share a grouping key with the filtered
/// inventory. Handle values are opaque strings; comparison is exact.
pub fn filter_by_handle(products: &CsvTable, inventory: &CsvTable) -> HandleFilterOutcome {
    let product_idx = products.column_index("Handle");
    let inventory_idx = inventory.column_index("Handle");

    let (product_idx, inventory_idx) = match (product_idx, inventory_idx) {
        (Some(p), Some(i)) => (p, i),
        _ => {
            return HandleFilterOutcome {
                filtered: CsvTable::with_headers(products.headers().to_vec()),
                missing_handle: true,
            }
        }
    };

    let wanted: HashSet<&String> = inventory.rows().iter().map(|row| &row[inventory_idx]).collect();

    let mut filtered = CsvTable::with_headers(products.headers().to_vec());
    for row in products.rows() {
        if wanted.contains(&row[product_idx]) {
            filtered.push_row(row.clone());
        }
    }
    filtered.drop_duplicates();

    HandleFilterOutcome {
        filtered,
        missing_handle: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(headers: &[&str], rows: &[&[&str]]) -> CsvTable {
        let mut t = CsvTable::with_headers(headers.iter().map(|h| h.to_string()).collect());
        for row in rows {
            t.push_row(row.iter().map(|c| c.to_string()).collect());
        }
        t
    }

    #[test]
    fn keeps_only_rows_with_matching_handles_in_order() {
        let products = table(
            &["Handle", "Title"],
            &[&["h1", "Mug"], &["h2", "Bowl"], &["h3", "Plate"], &["h1", "Mug Variant"]],
        );
        let inventory = table(&["Handle", "SKU"], &[&["h1", "s1"], &["h3", "s3"]]);

        let outcome = filter_by_handle(&products, &inventory);

        assert!(!outcome.missing_handle);
        let titles: Vec<&str> = outcome
            .filtered
            .rows()
            .iter()
            .map(|r| r[1].as_str())
            .collect();
        assert_eq!(titles, vec!["Mug", "Plate", "Mug Variant"]);
    }

    #[test]
    fn exact_duplicate_product_rows_collapse() {
        let products = table(&["Handle", "Title"], &[&["h1", "Mug"], &["h1", "Mug"]]);
        let inventory = table(&["Handle"], &[&["h1"]]);

        let outcome = filter_by_handle(&products, &inventory);
        assert_eq!(outcome.filtered.row_count(), 1);
    }

    #[test]
    fn missing_handle_on_product_side_degrades_to_empty() {
        let products = table(&["Title"], &[&["Mug"]]);
        let inventory = table(&["Handle"], &[&["h1"]]);

        let outcome = filter_by_handle(&products, &inventory);
        assert!(outcome.missing_handle);
        assert!(!outcome.filtered.has_data());
    }

    #[test]
    fn missing_handle_on_inventory_side_degrades_to_empty() {
        let products = table(&["Handle", "Title"], &[&["h1", "Mug"]]);
        let inventory = table(&["SKU"], &[&["s1"]]);

        let outcome = filter_by_handle(&products, &inventory);
        assert!(outcome.missing_handle);
        assert!(!outcome.filtered.has_data());
    }

    #[test]
    fn empty_inventory_filters_everything_out() {
        let products = table(&["Handle", "Title"], &[&["h1", "Mug"]]);
        let inventory = table(&["Handle"], &[]);

        let outcome = filter_by_handle(&products, &inventory);
        assert!(!outcome.missing_handle);
        assert!(!outcome.filtered.has_data());
    }
}
