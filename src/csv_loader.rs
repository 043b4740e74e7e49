// csv_loader.rs
use crate::csv_table::CsvTable;
use crate::user_experience::handle_back_flag;
use crate::user_interaction::{
    get_user_input_level_2, print_insight, print_insight_level_2, print_list,
};
use fuzzywuzzy::fuzz;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Parse every file in the list and stack the survivors into one table.
/// A file that will not parse is reported and dropped; it never takes the
/// other files down with it. If nothing parses, the table is empty.
pub fn load_category(paths: &[PathBuf]) -> CsvTable {
    let mut combined = CsvTable::new();

    for path in paths {
        match CsvTable::from_csv(path) {
            Ok(table) => combined.append_table(&table),
            Err(e) => {
                let name = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("<unnamed>");
                print_insight_level_2(&format!(
                    "Could not read {}: {}. Skipping it.",
                    name, e
                ));
            }
        }
    }

    combined
}

pub fn list_csv_files(path: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(path)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("csv") {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Resolve one user token against the listed files: serial number first,
/// then a fuzzy match on the file name with the usual >60 acceptance.
fn resolve_file_token(files: &[PathBuf], token: &str) -> Option<PathBuf> {
    if let Ok(serial) = token.parse::<usize>() {
        if serial > 0 && serial <= files.len() {
            return Some(files[serial - 1].clone());
        }
    }

    let best_match_result = files
        .iter()
        .filter_map(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .map(|name| (path, fuzz::ratio(token, name)))
        })
        .max_by_key(|&(_, score)| score);

    if let Some((best_match, score)) = best_match_result {
        if score > 60 {
            return Some(best_match.clone());
        }
    }
    None
}

fn print_file_list(files: &[PathBuf]) {
    let file_names: Vec<String> = files
        .iter()
        .filter_map(|file| file.file_name()?.to_str().map(String::from))
        .collect();
    let file_name_slices: Vec<&str> = file_names.iter().map(AsRef::as_ref).collect();
    print_list(&file_name_slices);
}

/// Pick exactly one CSV from stock_db. None means the user bailed or nothing
/// usable was there.
pub fn select_csv_file(stock_db_path: &Path, prompt: &str) -> Option<PathBuf> {
    let files = match list_csv_files(stock_db_path) {
        Ok(files) => files,
        Err(_) => {
            print_insight("Failed to read the stock_db directory.");
            return None;
        }
    };
    if files.is_empty() {
        print_insight("No files in sight, bro.");
        return None;
    }

    print_insight(prompt);
    print_file_list(&files);

    let choice = get_user_input_level_2(
        "Punch in the serial number or a slice of the file name, or hit 'back' to bail: ",
    )
    .trim()
    .to_lowercase();

    if choice == "back" || handle_back_flag(&choice) || choice.is_empty() {
        print_insight("Bailed on that. Heading back to the last menu, bro.");
        return None;
    }

    match resolve_file_token(&files, &choice) {
        Some(path) => {
            if let Some(file_name) = path.file_name().and_then(|n| n.to_str()) {
                print_insight_level_2(&format!("Taking {}", file_name));
            }
            Some(path)
        }
        None => {
            print_insight("No matching file found.");
            None
        }
    }
}

/// Pick one or more CSVs from stock_db with a comma-separated answer, e.g.
/// "1,3" or "products_may, products_june". None means the user bailed.
pub fn select_csv_files(stock_db_path: &Path, prompt: &str) -> Option<Vec<PathBuf>> {
    let files = match list_csv_files(stock_db_path) {
        Ok(files) => files,
        Err(_) => {
            print_insight("Failed to read the stock_db directory.");
            return None;
        }
    };
    if files.is_empty() {
        print_insight("No files in sight, bro.");
        return None;
    }

    print_insight(prompt);
    print_file_list(&files);

    let choice = get_user_input_level_2(
        "Punch in serial numbers or slices of file names (comma separated), or hit 'back' to bail: ",
    )
    .trim()
    .to_lowercase();

    if choice == "back" || handle_back_flag(&choice) || choice.is_empty() {
        print_insight("Bailed on that. Heading back to the last menu, bro.");
        return None;
    }

    let mut picked: Vec<PathBuf> = Vec::new();
    for token in choice.split(',') {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        match resolve_file_token(&files, token) {
            Some(path) => {
                if !picked.contains(&path) {
                    picked.push(path);
                }
            }
            None => print_insight_level_2(&format!("No file matched '{}'.", token)),
        }
    }

    if picked.is_empty() {
        print_insight("Nothing matched. Heading back, bro.");
        return None;
    }

    let picked_names: Vec<String> = picked
        .iter()
        .filter_map(|p| p.file_name()?.to_str().map(String::from))
        .collect();
    print_insight_level_2(&format!("Taking: {}", picked_names.join(", ")));

    Some(picked)
}
