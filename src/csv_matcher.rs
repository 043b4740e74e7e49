// csv_matcher.rs
use crate::csv_table::CsvTable;
use crate::user_interaction::{
    determine_action_as_number, get_user_input_level_2, print_insight_level_2,
    print_list_level_2,
};
use fuzzywuzzy::fuzz;
use std::collections::HashSet;

/// Acceptance threshold for a title match, on the 0-100 ratio scale.
/// Fixed by design; tune it here, not in stock.config.
pub const MATCH_THRESHOLD: u8 = 95;

/// Decides ambiguous matches. Handed the selected title and the distinct
/// candidate title strings; answers with the chosen candidate, or None to
/// skip the selected title entirely.
pub trait ConflictResolver {
    fn resolve(&mut self, selected_title: &str, candidates: &[String]) -> Option<String>;
}

/// Interactive resolver: numbered candidate list plus a SKIP entry, answered
/// by serial number or a fuzzy slice of the title.
pub struct PromptResolver;

impl ConflictResolver for PromptResolver {
    fn resolve(&mut self, selected_title: &str, candidates: &[String]) -> Option<String> {
        println!();
        print_insight_level_2(&format!(
            "Multiple matches found for '{}'. Choose one or skip:",
            selected_title
        ));

        let mut options: Vec<&str> = candidates.iter().map(AsRef::as_ref).collect();
        options.push("SKIP");
        print_list_level_2(&options);

        let choice =
            get_user_input_level_2("Punch in the serial number or a slice of the title: ");

        match determine_action_as_number(&options, &choice) {
            Some(serial) if serial == options.len() => None,
            Some(serial) => Some(candidates[serial - 1].clone()),
            None => None,
        }
    }
}

pub struct MatchOutcome {
    /// Inventory rows that survived matching, whole-row deduplicated.
    pub filtered: CsvTable,
    /// Selected titles with no candidate at or above the threshold,
    /// first-seen order. Skipped conflicts do not land here.
    pub unmatched: Vec<String>,
    /// True when either table lacks a "Title" column; the outcome is then a
    /// no-op and the caller should warn rather than fail.
    pub missing_title: bool,
}

/// Distinct non-empty values of the "Title" column, first-seen order.
pub fn distinct_titles(table: &CsvTable) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut titles = Vec::new();

    if let Some(idx) = table.column_index("Title") {
        for row in table.rows() {
            let title = &row[idx];
            if !title.is_empty() && seen.insert(title.clone()) {
                titles.push(title.clone());
            }
        }
    }
    titles
}

/// Filter the inventory table down to rows whose title matches the selected
/// list. Per distinct selected title: score every inventory title with
/// fuzz::ratio; no candidate at the threshold marks the title unmatched, a
/// single candidate row goes straight through, and several candidate rows go
/// to the resolver. A resolved choice emits every row whose title exactly
/// equals the chosen string, since rows sharing one title string cannot be
/// told apart by the prompt.
pub fn match_titles(
    selected: &CsvTable,
    inventory: &CsvTable,
    resolver: &mut dyn ConflictResolver,
) -> MatchOutcome {
    if selected.column_index("Title").is_none() || inventory.column_index("Title").is_none() {
        return MatchOutcome {
            filtered: CsvTable::with_headers(inventory.headers().to_vec()),
            unmatched: Vec::new(),
            missing_title: true,
        };
    }

    let title_idx = inventory.column_index("Title").unwrap();
    let mut filtered = CsvTable::with_headers(inventory.headers().to_vec());
    let mut unmatched = Vec::new();

    for selected_title in distinct_titles(selected) {
        let candidates: Vec<usize> = inventory
            .rows()
            .iter()
            .enumerate()
            .filter(|(_, row)| {
                let target = &row[title_idx];
                !target.is_empty() && fuzz::ratio(&selected_title, target) >= MATCH_THRESHOLD
            })
            .map(|(i, _)| i)
            .collect();

        match candidates.len() {
            0 => unmatched.push(selected_title),
            1 => filtered.push_row(inventory.rows()[candidates[0]].clone()),
            _ => {
                let mut candidate_titles: Vec<String> = Vec::new();
                for &i in &candidates {
                    let title = &inventory.rows()[i][title_idx];
                    if !candidate_titles.contains(title) {
                        candidate_titles.push(title.clone());
                    }
                }

                if let Some(chosen) = resolver.resolve(&selected_title, &candidate_titles) {
                    for &i in &candidates {
                        if inventory.rows()[i][title_idx] == chosen {
                            filtered.push_row(inventory.rows()[i].clone());
                        }
                    }
                }
                // None means the user skipped; the title is not unmatched
            }
        }
    }

    filtered.drop_duplicates();

    MatchOutcome {
        filtered,
        unmatched,
        missing_title: false,
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

    /// Resolver that panics if consulted. For cases that must not be ambiguous.
    struct NoConflicts;
    impl ConflictResolver for NoConflicts {
        fn resolve(&mut self, title: &str, _: &[String]) -> Option<String> {
            panic!("unexpected conflict for '{}'", title);
        }
    }

    /// Resolver with a scripted answer, recording what it was asked.
    struct Scripted {
        answer: Option<String>,
        asked: Vec<(String, Vec<String>)>,
    }
    impl Scripted {
        fn choose(title: &str) -> Self {
            Scripted {
                answer: Some(title.to_string()),
                asked: Vec::new(),
            }
        }
        fn skip() -> Self {
            Scripted {
                answer: None,
                asked: Vec::new(),
            }
        }
    }
    impl ConflictResolver for Scripted {
        fn resolve(&mut self, selected_title: &str, candidates: &[String]) -> Option<String> {
            self.asked
                .push((selected_title.to_string(), candidates.to_vec()));
            self.answer.clone()
        }
    }

    #[test]
    fn distinct_titles_dedupes_and_skips_empties() {
        let t = table(
            &["Title"],
            &[&["Blue Mug"], &[""], &["Red Bowl"], &["Blue Mug"]],
        );
        assert_eq!(distinct_titles(&t), vec!["Blue Mug", "Red Bowl"]);
    }

    #[test]
    fn exact_unique_match_is_emitted_and_not_unmatched() {
        let selected = table(&["Title"], &[&["Blue Ceramic Mug"]]);
        let inventory = table(
            &["Title", "Handle"],
            &[&["Blue Ceramic Mug", "h1"], &["Something Else", "h2"]],
        );

        let outcome = match_titles(&selected, &inventory, &mut NoConflicts);

        assert!(!outcome.missing_title);
        assert!(outcome.unmatched.is_empty());
        assert_eq!(outcome.filtered.row_count(), 1);
        assert_eq!(outcome.filtered.rows()[0], vec!["Blue Ceramic Mug", "h1"]);
    }

    #[test]
    fn no_candidate_above_threshold_lands_in_unmatched() {
        let selected = table(&["Title"], &[&["Nonexistent Item"]]);
        let inventory = table(&["Title", "Handle"], &[&["Other", "h1"]]);

        let outcome = match_titles(&selected, &inventory, &mut NoConflicts);

        assert_eq!(outcome.unmatched, vec!["Nonexistent Item"]);
        assert!(!outcome.filtered.has_data());
    }

    #[test]
    fn unmatched_titles_keep_first_seen_order() {
        let selected = table(&["Title"], &[&["Zeta Gadget"], &["Alpha Widget"]]);
        let inventory = table(&["Title", "Handle"], &[&["Unrelated", "h1"]]);

        let outcome = match_titles(&selected, &inventory, &mut NoConflicts);
        assert_eq!(outcome.unmatched, vec!["Zeta Gadget", "Alpha Widget"]);
    }

    #[test]
    fn near_miss_below_threshold_does_not_match() {
        // "Blue Mug" vs "Blue Mug!" scores 94 on the ratio scale
        let selected = table(&["Title"], &[&["Blue Mug"]]);
        let inventory = table(&["Title", "Handle"], &[&["Blue Mug!", "h1"]]);

        let outcome = match_titles(&selected, &inventory, &mut NoConflicts);
        assert_eq!(outcome.unmatched, vec!["Blue Mug"]);
        assert!(!outcome.filtered.has_data());
    }

    #[test]
    fn two_selected_titles_hitting_one_row_emit_it_once() {
        let selected = table(
            &["Title"],
            &[&["Blue Ceramic Coffee Mug"], &["Blue Ceramic Coffee Mug."]],
        );
        let inventory = table(&["Title", "Handle"], &[&["Blue Ceramic Coffee Mug", "h1"]]);

        let outcome = match_titles(&selected, &inventory, &mut NoConflicts);

        assert!(outcome.unmatched.is_empty());
        assert_eq!(outcome.filtered.row_count(), 1);
    }

    #[test]
    fn conflict_is_resolved_by_choice() {
        let selected = table(&["Title"], &[&["Blue Ceramic Coffee Mug"]]);
        let inventory = table(
            &["Title", "Handle"],
            &[
                &["Blue Ceramic Coffee Mug", "h1"],
                &["Blue Ceramic Coffee Mug!", "h1"],
            ],
        );

        let mut resolver = Scripted::choose("Blue Ceramic Coffee Mug");
        let outcome = match_titles(&selected, &inventory, &mut resolver);

        assert_eq!(resolver.asked.len(), 1);
        assert_eq!(resolver.asked[0].0, "Blue Ceramic Coffee Mug");
        assert_eq!(
            resolver.asked[0].1,
            vec!["Blue Ceramic Coffee Mug", "Blue Ceramic Coffee Mug!"]
        );
        assert_eq!(outcome.filtered.row_count(), 1);
        assert_eq!(
            outcome.filtered.rows()[0],
            vec!["Blue Ceramic Coffee Mug", "h1"]
        );
        assert!(outcome.unmatched.is_empty());
    }

    #[test]
    fn skipped_conflict_emits_nothing_and_is_not_unmatched() {
        let selected = table(&["Title"], &[&["Blue Ceramic Coffee Mug"]]);
        let inventory = table(
            &["Title", "Handle"],
            &[
                &["Blue Ceramic Coffee Mug", "h1"],
                &["Blue Ceramic Coffee Mug!", "h2"],
            ],
        );

        let mut resolver = Scripted::skip();
        let outcome = match_titles(&selected, &inventory, &mut resolver);

        assert!(!outcome.filtered.has_data());
        assert!(outcome.unmatched.is_empty());
    }

    #[test]
    fn shared_title_string_emits_every_matching_row() {
        // Two rows carry the identical title; the prompt cannot tell them
        // apart, so choosing it emits both.
        let selected = table(&["Title"], &[&["Blue Ceramic Mug"]]);
        let inventory = table(
            &["Title", "Handle"],
            &[&["Blue Ceramic Mug", "h1"], &["Blue Ceramic Mug", "h2"]],
        );

        let mut resolver = Scripted::choose("Blue Ceramic Mug");
        let outcome = match_titles(&selected, &inventory, &mut resolver);

        // Resolver still consulted, with the title listed once
        assert_eq!(resolver.asked[0].1, vec!["Blue Ceramic Mug"]);
        assert_eq!(outcome.filtered.row_count(), 2);
    }

    #[test]
    fn exact_duplicate_rows_collapse_in_the_output() {
        let selected = table(&["Title"], &[&["Blue Ceramic Mug"]]);
        let inventory = table(
            &["Title", "Handle"],
            &[&["Blue Ceramic Mug", "h1"], &["Blue Ceramic Mug", "h1"]],
        );

        let mut resolver = Scripted::choose("Blue Ceramic Mug");
        let outcome = match_titles(&selected, &inventory, &mut resolver);
        assert_eq!(outcome.filtered.row_count(), 1);
    }

    #[test]
    fn empty_inventory_titles_never_match() {
        let selected = table(&["Title"], &[&["Blue Ceramic Mug"]]);
        let inventory = table(
            &["Title", "Handle"],
            &[&["", "h1"], &["Blue Ceramic Mug", "h2"]],
        );

        let outcome = match_titles(&selected, &inventory, &mut NoConflicts);
        assert_eq!(outcome.filtered.row_count(), 1);
        assert_eq!(outcome.filtered.rows()[0], vec!["Blue Ceramic Mug", "h2"]);
    }

    #[test]
    fn missing_title_column_is_a_warned_noop() {
        let selected = table(&["Name"], &[&["Blue Ceramic Mug"]]);
        let inventory = table(&["Title", "Handle"], &[&["Blue Ceramic Mug", "h1"]]);

        let outcome = match_titles(&selected, &inventory, &mut NoConflicts);
        assert!(outcome.missing_title);
        assert!(!outcome.filtered.has_data());
        assert!(outcome.unmatched.is_empty());
    }
}
