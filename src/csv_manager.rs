// csv_manager.rs
use crate::csv_loader::select_csv_file;
use crate::csv_table::CsvTable;
use crate::user_interaction::{
    get_user_input, get_user_input_level_2, print_insight, print_insight_level_2, print_list,
};
use calamine::{open_workbook_auto, Reader};
use chrono::{DateTime, Local};
use fuzzywuzzy::fuzz;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Open one CSV from stock_db and dump a preview.
pub fn inspect_csv_file(stock_db_path: &Path, preview_rows: usize) {
    let path = match select_csv_file(stock_db_path, "Pick a file to INSPECT:") {
        Some(path) => path,
        None => return,
    };

    match CsvTable::from_csv(&path) {
        Ok(table) => {
            println!();
            table.print_table_with_limit(preview_rows);
            println!();
        }
        Err(e) => print_insight(&format!("Could not read that one: {}", e)),
    }
}

pub fn delete_csv_file(stock_db_path: &Path) {
    let path = match select_csv_file(stock_db_path, "Pick a file to DELETE:") {
        Some(path) => path,
        None => return,
    };

    if let Some(file_name) = path.file_name().and_then(|n| n.to_str()) {
        print_insight_level_2(&format!("Deleting {}", file_name));
    }
    if let Err(e) = fs::remove_file(&path) {
        print_insight(&format!("Failed to delete file: {}", e));
    } else {
        print_insight("File deleted successfully.");
    }
}

/// Pull a fresh export into stock_db. Lists CSV and spreadsheet files from
/// Desktop and Downloads, newest first; spreadsheets are converted to CSV on
/// the way in (with a sheet prompt when the workbook has several).
pub fn import(desktop_path: &Path, downloads_path: &Path, stock_db_path: &Path) {
    fn system_time_to_date_time(system_time: SystemTime) -> DateTime<Local> {
        system_time.into()
    }

    fn list_files(path: &Path) -> io::Result<Vec<(PathBuf, SystemTime)>> {
        let mut files = Vec::new();
        for entry in fs::read_dir(path)? {
            let entry = entry?;
            let path = entry.path();
            if path.is_file() {
                if let Some(extension) = path.extension().and_then(|s| s.to_str()) {
                    if extension == "csv" || extension == "xls" || extension == "xlsx" {
                        if let Ok(metadata) = entry.metadata() {
                            if let Ok(modified) = metadata.modified() {
                                files.push((path, modified));
                            }
                        }
                    }
                }
            }
        }
        Ok(files)
    }

    let mut files = list_files(desktop_path).unwrap_or_default();
    files.extend(list_files(downloads_path).unwrap_or_default());
    files.sort_by(|a, b| b.1.cmp(&a.1));

    if files.is_empty() {
        print_insight("No importable files on Desktop or in Downloads, bro.");
        return;
    }

    let mut file_infos: Vec<String> = Vec::new();
    for (file, modified_date) in files.iter() {
        let formatted_date = system_time_to_date_time(*modified_date)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string();
        if let Some(file_name) = file.file_name().and_then(|n| n.to_str()) {
            file_infos.push(format!("{} (Modified: {})", file_name, formatted_date));
        }
    }

    let mut file_info_slices: Vec<&str> = file_infos.iter().map(AsRef::as_ref).collect();
    file_info_slices.push("BACK");
    print_list(&file_info_slices);

    let choice = get_user_input("Enter the serial number of the file to import: ");

    let back_option_serial = file_info_slices.len();
    if choice
        .parse::<usize>()
        .ok()
        .map_or(false, |num| num == back_option_serial)
    {
        print_insight("Bailed on that. Heading back to the last menu, bro.");
        return;
    }
    if fuzz::ratio(&choice.to_lowercase(), "back") > 60 {
        print_insight("Bailed on that. Heading back to the last menu, bro.");
        return;
    }

    let (file_path, _) = match choice.parse::<usize>() {
        Ok(serial) if serial > 0 && serial <= files.len() => &files[serial - 1],
        _ => {
            print_insight("Invalid choice or file not accessible.");
            return;
        }
    };

    let stem = match file_path.file_stem().and_then(|s| s.to_str()) {
        Some(stem) => stem.to_string(),
        None => {
            print_insight("Could not make sense of that file name.");
            return;
        }
    };
    let destination = stock_db_path.join(format!("{}.csv", stem));

    let is_csv = file_path.extension().and_then(|s| s.to_str()) == Some("csv");
    let result = if is_csv {
        fs::copy(file_path, &destination).map(|_| ()).map_err(Into::into)
    } else {
        import_spreadsheet(file_path, &destination)
    };

    match result {
        Ok(()) => print_insight(&format!("Imported to {}", destination.display())),
        Err(e) => print_insight(&format!("Import failed: {}", e)),
    }
}

fn import_spreadsheet(
    file_path: &Path,
    destination: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let workbook = open_workbook_auto(file_path)?;
    let sheet_names = workbook.sheet_names().to_owned();

    let sheet_index = if sheet_names.len() > 1 {
        print_insight("Multiple sheets found. Please select one:");
        for (index, name) in sheet_names.iter().enumerate() {
            print_insight_level_2(&format!("{}: {}", index + 1, name));
        }
        let sheet_choice = get_user_input_level_2("Enter the sheet number: ");
        match sheet_choice.parse::<usize>() {
            Ok(n) if n > 0 && n <= sheet_names.len() => n - 1,
            _ => return Err("that's not one of the sheets".into()),
        }
    } else {
        0
    };

    let table = CsvTable::from_spreadsheet(file_path, sheet_index)?;
    table.save_as(destination)?;
    Ok(())
}
