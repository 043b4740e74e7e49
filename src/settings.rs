// settings.rs
use serde::{Deserialize, Serialize};
use std::env;
use std::error::Error;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use crate::user_experience::handle_cancel_flag;
use crate::user_interaction::{get_edited_user_config_input, print_insight_level_2};

/// Operator-tunable knobs. The match threshold is deliberately absent; it is
/// a design constant in csv_matcher, not a setting.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Config {
    #[serde(default = "default_inventory_output")]
    pub inventory_output: String,
    #[serde(default = "default_product_output")]
    pub product_output: String,
    #[serde(default = "default_preview_rows")]
    pub preview_rows: usize,
}

fn default_inventory_output() -> String {
    "filtered_inventory.csv".to_string()
}

fn default_product_output() -> String {
    "filtered_products.csv".to_string()
}

fn default_preview_rows() -> usize {
    10
}

impl Default for Config {
    fn default() -> Self {
        Config {
            inventory_output: default_inventory_output(),
            product_output: default_product_output(),
            preview_rows: default_preview_rows(),
        }
    }
}

/// All inputs and outputs live in ~/Desktop/stock_db.
pub fn stock_db_path() -> PathBuf {
    let home_dir = match env::var("HOME") {
        Ok(home) => home,
        Err(_) => match env::var("USERPROFILE") {
            Ok(userprofile) => userprofile,
            Err(_) => {
                eprintln!("Unable to determine user home directory.");
                std::process::exit(1);
            }
        },
    };

    Path::new(&home_dir).join("Desktop").join("stock_db")
}

/// Read-modify-write on stock.config. Creates the directory and a default
/// config on first touch.
pub fn manage_config_file<F: FnOnce(&mut Config) -> Result<(), Box<dyn Error>>>(
    op: F,
) -> Result<Config, Box<dyn Error>> {
    let mut path = stock_db_path();

    if !path.exists() {
        println!("Path does not exist, creating directory.");
        fs::create_dir_all(&path)?;
    }
    path.push("stock.config");

    let mut config = if path.exists() {
        let contents = fs::read_to_string(&path)?;
        let json_part = contents.split("SYNTAX").next().unwrap_or_default();
        if json_part.trim().is_empty() {
            Config::default()
        } else {
            serde_json::from_str(json_part)?
        }
    } else {
        Config::default()
    };

    op(&mut config)?;

    let serialized = serde_json::to_string_pretty(&config)?;
    fs::write(path, format!("{}\n\n{}", serialized, config_syntax_footer()))?;

    Ok(config)
}

pub fn load_config() -> Config {
    manage_config_file(|_| Ok(())).unwrap_or_default()
}

fn config_syntax_footer() -> &'static str {
    r#"SYNTAX
======
{
  "inventory_output": "filtered_inventory.csv",
  "product_output": "filtered_products.csv",
  "preview_rows": 10
}
"#
}

/// Open stock.config in vim, validate the JSON half on the way back, and
/// rewrite the file with a fresh SYNTAX footer.
pub fn edit_config(stock_db: &Path) -> Result<(), Box<dyn Error>> {
    let config_path = stock_db.join("stock.config");

    if !config_path.exists() {
        let default_text = format!(
            "{}\n\n{}",
            serde_json::to_string_pretty(&Config::default())?,
            config_syntax_footer()
        );
        let mut file = File::create(&config_path)?;
        file.write_all(default_text.as_bytes())?;
    }

    let mut current_config_text = String::new();
    File::open(&config_path)?.read_to_string(&mut current_config_text)?;

    let edited_config_text = get_edited_user_config_input(current_config_text);

    if handle_cancel_flag(&edited_config_text) {
        return Ok(());
    }

    match serde_json::from_str::<Config>(&edited_config_text) {
        Ok(_) => {
            print_insight_level_2("Config's all good, bro!");
        }
        Err(e) => {
            println!();
            print_insight_level_2(&format!(
                "Whoops, hit a snag with that JSON: {}. Mind tweaking the config and trying again?",
                e
            ));
            return Err(e.into());
        }
    }

    let new_config_content = format!("{}\n\n{}", edited_config_text, config_syntax_footer());

    let mut file = OpenOptions::new()
        .write(true)
        .truncate(true)
        .open(&config_path)?;
    file.write_all(new_config_content.as_bytes())?;

    Ok(())
}
