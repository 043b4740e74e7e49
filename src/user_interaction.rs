// user_interaction.rs
use fuzzywuzzy::fuzz;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use vim_edit::vim_edit;

pub fn get_user_input(prompt: &str) -> String {
    let mut rl = match DefaultEditor::new() {
        Ok(editor) => editor,
        Err(err) => {
            println!("Failed to initialize editor: {:?}", err);
            return String::new();
        }
    };

    // ANSI escape codes for styling
    let bold_orange = "\x1b[1;38;5;208m";
    let reset = "\x1b[0m";

    let custom_prompt = format!("{}@BIGstock: {}{}{}", bold_orange, bold_orange, prompt, reset);

    loop {
        match rl.readline(&custom_prompt) {
            Ok(line) => {
                let _ = rl.add_history_entry(line.as_str());
                return line;
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                println!("Input interrupted or end of file reached.");
                return String::new();
            }
            Err(err) => {
                println!("Error reading line: {:?}", err);
                return String::new();
            }
        }
    }
}

pub fn get_user_input_level_2(prompt: &str) -> String {
    let mut rl = match DefaultEditor::new() {
        Ok(editor) => editor,
        Err(err) => {
            println!("Failed to initialize editor: {:?}", err);
            return String::new();
        }
    };

    let orange = "\x1b[0;38;5;208m";
    let reset = "\x1b[0m";

    let custom_prompt = format!("  {}@LILstock: {}{}{}", orange, orange, prompt, reset);

    loop {
        match rl.readline(&custom_prompt) {
            Ok(line) => {
                let _ = rl.add_history_entry(line.as_str());
                return line;
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                println!("Input interrupted or end of file reached.");
                return String::new();
            }
            Err(err) => {
                println!("Error reading line: {:?}", err);
                return String::new();
            }
        }
    }
}

/// Open the current config text in vim and hand back whatever the user left
/// behind, trimmed. Everything from the SYNTAX footer onwards is chopped off.
pub fn get_edited_user_config_input(last_config: String) -> String {
    let edited_config = vim_edit(last_config);

    let truncated_config = if let Some(index) = edited_config.find("SYNTAX\n======") {
        &edited_config[..index]
    } else {
        &edited_config[..]
    };

    truncated_config.trim().to_string()
}

pub fn print_list(options: &[&str]) {
    // ANSI escape code for bold yellow font
    let bold_yellow = "\x1b[1;33m";
    let reset = "\x1b[0m";

    // Calculate the length of the longest index to ensure neat indentation
    let max_digits = options.len().to_string().len();

    for (index, option) in options.iter().enumerate() {
        let padded_index = format!("{:width$}:", index + 1, width = max_digits);
        println!("  {}{} {}{}", bold_yellow, padded_index, option, reset);
    }
}

pub fn print_list_level_2(options: &[&str]) {
    let yellow = "\x1b[0;33m";
    let reset = "\x1b[0m";

    let max_digits = options.len().to_string().len();

    for (index, option) in options.iter().enumerate() {
        let padded_index = format!("{:width$}:", index + 1, width = max_digits);
        println!("    {}{} {}{}", yellow, padded_index, option, reset);
    }
}

/// Resolve a menu choice to the option text: direct serial number first, then
/// a fuzzy match against the lowercased option labels.
pub fn determine_action_as_text(menu_options: &[&str], choice: &str) -> Option<String> {
    let choice = choice.to_lowercase();
    let mut selected_option: Option<String> = None;

    // Check for direct numeric input
    if let Ok(index) = choice.parse::<usize>() {
        if index > 0 && index <= menu_options.len() {
            selected_option = Some(menu_options[index - 1].to_string());
        }
    }

    // If no direct numeric input, use fuzzy matching
    if selected_option.is_none() {
        let (best_match_index, _) = menu_options
            .iter()
            .enumerate()
            .map(|(index, option)| (index + 1, fuzz::ratio(&choice, &option.to_lowercase())))
            .max_by_key(|&(_, score)| score)
            .unwrap_or((0, 0));

        if best_match_index > 0 && best_match_index <= menu_options.len() {
            selected_option = Some(menu_options[best_match_index - 1].to_string());
        }
    }

    selected_option
}

pub fn determine_action_as_number(menu_options: &[&str], choice: &str) -> Option<usize> {
    let choice = choice.to_lowercase();
    let mut selected_option = None;

    // Check for direct numeric input
    if let Ok(index) = choice.parse::<usize>() {
        if index > 0 && index <= menu_options.len() {
            selected_option = Some(index);
        }
    }

    // If no direct numeric input, use fuzzy matching
    if selected_option.is_none() {
        let (best_match_index, _) = menu_options
            .iter()
            .enumerate()
            .map(|(index, option)| (index + 1, fuzz::ratio(&choice, &option.to_lowercase())))
            .max_by_key(|&(_, score)| score)
            .unwrap_or((0, 0));

        if best_match_index > 0 && best_match_index <= menu_options.len() {
            selected_option = Some(best_match_index);
        }
    }

    selected_option
}

/// Prints a top-level message in bold orange font.
pub fn print_insight(message: &str) {
    let bold_orange = "\x1b[1;38;5;208m";
    let reset = "\x1b[0m";

    println!("{}@BIGstock: {}{}", bold_orange, message, reset);
}

/// Prints an indented second-level message.
pub fn print_insight_level_2(message: &str) {
    let orange = "\x1b[0;38;5;208m";
    let reset = "\x1b[0m";

    println!("  {}@LILstock: {}{}", orange, message, reset);
}
