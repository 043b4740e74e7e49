// src/user_experience.rs
use crate::csv_manager::delete_csv_file;
use crate::settings::edit_config;
use crate::user_interaction::{print_insight, print_list};
use std::path::Path;

pub fn handle_special_flag(flag: &str, stock_db_path: &Path) -> bool {
    match flag {
        "@f" | "@flags" => {
            let flags = vec![
                "@b           : Secondary menus => Back",
                "@c           : In vim edit => Cancel action",
                "@config      : Primary menu => Edit stock.config",
                "@d / @delete : Primary menu => Delete files from stock_db",
                "@f / @flags  : Primary menu => View all flags",
                "@q           : Anywhere => Quit stockbro",
            ];

            print_insight("Serving your flags ...");
            print_list(&flags);
            println!();
            true
        }
        "@d" | "@delete" => {
            delete_csv_file(stock_db_path);
            true
        }
        "@config" => {
            let _ = edit_config(stock_db_path);
            true
        }
        _ => false,
    }
}

pub fn handle_back_flag(flag: &str) -> bool {
    flag == "@b"
}

pub fn handle_quit_flag(flag: &str) {
    if flag == "@q" {
        std::process::exit(0);
    }
}

pub fn handle_cancel_flag(flag: &str) -> bool {
    let trimmed = flag.trim();
    match trimmed {
        f if f == "@c" => true,
        f if f.starts_with("@c") => true,
        _ => false,
    }
}
