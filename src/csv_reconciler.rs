// csv_reconciler.rs
use crate::csv_filter::filter_by_handle;
use crate::csv_loader::{load_category, select_csv_file, select_csv_files};
use crate::csv_matcher::{match_titles, PromptResolver};
use crate::csv_scanner::{summarize_table, titles_with_special_chars};
use crate::settings::Config;
use crate::user_interaction::{
    get_user_input, print_insight, print_insight_level_2, print_list,
};
use std::error::Error;
use std::path::Path;

/// The whole guided run: pick the three exports, load them, surface the
/// advisory scans, fuzzy-match inventory titles against the selected list,
/// filter products by handle, and write both artifacts back into stock_db.
pub fn handle_reconcile(stock_db_path: &Path, config: &Config) -> Result<(), Box<dyn Error>> {
    let product_paths =
        match select_csv_files(stock_db_path, "Step 1 of 3: pick the PRODUCT export file(s).") {
            Some(paths) => paths,
            None => return Ok(()),
        };
    let inventory_paths = match select_csv_files(
        stock_db_path,
        "Step 2 of 3: pick the INVENTORY export file(s).",
    ) {
        Some(paths) => paths,
        None => return Ok(()),
    };
    let selected_path = match select_csv_file(
        stock_db_path,
        "Step 3 of 3: pick the SELECTED PRODUCTS file.",
    ) {
        Some(path) => path,
        None => return Ok(()),
    };

    let product_table = load_category(&product_paths);
    let inventory_table = load_category(&inventory_paths);
    let selected_table = load_category(&[selected_path]);

    if !selected_table.has_data() {
        print_insight("The selected products file came up empty. Nothing to match, bro.");
        return Ok(());
    }

    summarize_table(&product_table, "Product File", config.preview_rows);
    summarize_table(&inventory_table, "Inventory File", config.preview_rows);
    summarize_table(&selected_table, "Selected Products", config.preview_rows);

    let mut special_titles = titles_with_special_chars(&product_table);
    for title in titles_with_special_chars(&inventory_table) {
        if !special_titles.contains(&title) {
            special_titles.push(title);
        }
    }

    println!();
    if special_titles.is_empty() {
        print_insight("No special characters found in titles.");
    } else {
        print_insight("Special characters found in Titles:");
        let slices: Vec<&str> = special_titles.iter().map(AsRef::as_ref).collect();
        print_list(&slices);
    }

    println!();
    let choice = get_user_input("Proceed with matching? (yes/no): ").to_lowercase();
    if !choice.starts_with('y') {
        print_insight("Bailed on that. Heading back to the last menu, bro.");
        return Ok(());
    }

    let outcome = match_titles(&selected_table, &inventory_table, &mut PromptResolver);

    if outcome.missing_title {
        print_insight(
            "Title column missing in the selected or inventory file. Skipping the match, bro.",
        );
        return Ok(());
    }

    println!();
    if outcome.unmatched.is_empty() {
        print_insight("Every selected title found a match.");
    } else {
        print_insight("Titles with no acceptable match:");
        let slices: Vec<&str> = outcome.unmatched.iter().map(AsRef::as_ref).collect();
        print_list(&slices);
    }

    print_insight("Inventory filtering complete.");
    summarize_table(&outcome.filtered, "Filtered Inventory", config.preview_rows);

    let handle_outcome = filter_by_handle(&product_table, &outcome.filtered);
    if handle_outcome.missing_handle {
        print_insight(
            "Handle column missing in one of the datasets. The filtered product file will be empty.",
        );
    } else {
        print_insight("Filtered product file created.");
        summarize_table(&handle_outcome.filtered, "Filtered Products", config.preview_rows);
    }

    let inventory_out = stock_db_path.join(&config.inventory_output);
    outcome.filtered.save_as(&inventory_out)?;
    print_insight_level_2(&format!("Filtered inventory saved at {}", inventory_out.display()));

    let product_out = stock_db_path.join(&config.product_output);
    handle_outcome.filtered.save_as(&product_out)?;
    print_insight_level_2(&format!("Filtered products saved at {}", product_out.display()));

    Ok(())
}
