// csv_scanner.rs
use crate::csv_table::CsvTable;
use crate::user_interaction::{print_insight, print_insight_level_2};
use regex::Regex;
use std::collections::HashSet;

/// Anything outside letters, digits, underscore, whitespace, apostrophe and
/// hyphen counts as special. These are the characters that tend to wreck a
/// title match after a copy-paste round through a spreadsheet.
pub fn contains_special_characters(text: &str) -> bool {
    let special = Regex::new(r"[^\w\s'-]").unwrap();
    special.is_match(text)
}

/// Distinct non-empty "Title" values containing special characters, in
/// first-seen order. A table without a Title column reports nothing.
pub fn titles_with_special_chars(table: &CsvTable) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut flagged = Vec::new();

    if let Some(idx) = table.column_index("Title") {
        for row in table.rows() {
            let title = &row[idx];
            if !title.is_empty()
                && contains_special_characters(title)
                && seen.insert(title.clone())
            {
                flagged.push(title.clone());
            }
        }
    }
    flagged
}

/// Row/column counts plus a short head preview, in the insight voice.
pub fn summarize_table(table: &CsvTable, name: &str, preview_rows: usize) {
    println!();
    print_insight(&format!("Summary: {}", name));
    print_insight_level_2(&format!(
        "Rows: {} | Columns: {}",
        table.row_count(),
        table.column_count()
    ));
    table.print_table_with_limit(preview_rows);
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
    fn plain_titles_are_not_special() {
        assert!(!contains_special_characters("Blue Mug"));
        assert!(!contains_special_characters("Kids' T-Shirt"));
        assert!(!contains_special_characters("Mug_2 large"));
    }

    #[test]
    fn punctuation_and_symbols_are_special() {
        assert!(contains_special_characters("Blue Mug!"));
        assert!(contains_special_characters("Mug (large)"));
        assert!(contains_special_characters("Mug \u{2013} large"));
    }

    #[test]
    fn scan_reports_distinct_flagged_titles_in_order() {
        let t = table(
            &["Title"],
            &[
                &["Blue Mug!"],
                &["Plain Bowl"],
                &["Mug (large)"],
                &["Blue Mug!"],
                &[""],
            ],
        );
        assert_eq!(
            titles_with_special_chars(&t),
            vec!["Blue Mug!", "Mug (large)"]
        );
    }

    #[test]
    fn table_without_title_column_reports_nothing() {
        let t = table(&["Handle"], &[&["h1!"]]);
        assert!(titles_with_special_chars(&t).is_empty());
    }
}
