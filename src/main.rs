mod csv_filter;
mod csv_loader;
mod csv_manager;
mod csv_matcher;
mod csv_reconciler;
mod csv_scanner;
mod csv_table;
mod settings;
mod user_experience;
mod user_interaction;

use crate::csv_manager::{delete_csv_file, import, inspect_csv_file};
use crate::csv_reconciler::handle_reconcile;
use crate::settings::{edit_config, load_config, stock_db_path};
use crate::user_experience::{handle_quit_flag, handle_special_flag};
use crate::user_interaction::{
    determine_action_as_text, get_user_input, print_insight, print_list,
};
use std::env;
use std::fs;
use std::path::Path;

const STOCK_VERSION: &str = "0.4.1";

fn main() {
    if env::args().any(|arg| arg == "--version") {
        print_insight(STOCK_VERSION);
        std::process::exit(0);
    }

    let home_dir = env::var("HOME")
        .or_else(|_| env::var("USERPROFILE"))
        .expect("Unable to determine user home directory");
    let desktop_path = Path::new(&home_dir).join("Desktop");
    let downloads_path = Path::new(&home_dir).join("Downloads");

    let stock_db = stock_db_path();
    if !stock_db.exists() {
        if let Err(e) = fs::create_dir_all(&stock_db) {
            eprintln!("Could not create {}: {}", stock_db.display(), e);
            std::process::exit(1);
        }
    }

    println!(
        r#"

 _______  _______  _______  _______  ___   _  _______  ______    _______
|       ||       ||       ||       ||   | | ||  _    ||    _ |  |       |
|  _____||_     _||   _   ||       ||   |_| || |_|   ||   | ||  |   _   |
| |_____   |   |  |  | |  ||       ||      _||       ||   |_||_ |  | |  |
|_____  |  |   |  |  |_|  ||      _||     |_ |  _   | |    __  ||  |_|  |
 _____| |  |   |  |       ||     |_ |    _  || |_|   ||   |  | ||       |
|_______|  |___|  |_______||_______||___| |_||_______||___|  |_||_______|

==========================================================================
  Fuzzy-matches your INVENTORY against your SELECTED list, filters your
  PRODUCTS by Handle, and drops the clean CSVs back in stock_db. Bro.
==========================================================================

"#
    );

    let menu_options = vec![
        "RECONCILE",
        "INSPECT (FROM STOCK_DB)",
        "IMPORT (FROM LOCAL FILE SYSTEM)",
        "DELETE",
        "CONFIG",
    ];

    loop {
        print_list(&menu_options);
        let choice = get_user_input("Your move, bro: ").to_lowercase();
        let _ = handle_quit_flag(&choice);

        if handle_special_flag(&choice, &stock_db) {
            continue;
        }

        let selected_option = determine_action_as_text(&menu_options, &choice);

        match selected_option {
            Some(ref action) if action == "RECONCILE" => {
                let config = load_config();
                if let Err(e) = handle_reconcile(&stock_db, &config) {
                    println!("Error during reconcile: {}", e);
                }
            }
            Some(ref action) if action == "INSPECT (FROM STOCK_DB)" => {
                let config = load_config();
                inspect_csv_file(&stock_db, config.preview_rows);
            }
            Some(ref action) if action == "IMPORT (FROM LOCAL FILE SYSTEM)" => {
                import(&desktop_path, &downloads_path, &stock_db);
            }
            Some(ref action) if action == "DELETE" => {
                delete_csv_file(&stock_db);
            }
            Some(ref action) if action == "CONFIG" => {
                let _ = edit_config(&stock_db);
            }
            _ => {
                print_insight("Dude, that action's a no-go. Give it another whirl, alright?");
            }
        }

        println!();
    }
}
