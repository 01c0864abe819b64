//! The interactive command loop.
//!
//! Commands start with `!`; any other non-empty input is a search. File
//! boundary errors are printed and the loop keeps going, so a mistyped
//! path never kills the session.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::Context;
use tracing::warn;

use textfreq_core::{Capabilities, TextAnalysis};

/// Description of every command, shown for `!help`.
fn help_text() -> &'static str {
    "1. '!help' to show information about commands;\n\
     2. '!enter_file' for enter new file;\n\
     3. '!list_words' to show all unique words;\n\
     4. '!case_sens' to show the status case sensitive;\n\
     5. '!case_sens_on' to turn on case sensitive;\n\
     6. '!case_sens_off' to turn off case sensitive;\n\
     7. '!smart_mode' to show the status smart mode;\n\
     8. '!smart_mode_on' to enable smart mode;\n\
     9. '!smart_mode_off' to disable smart mode;\n\
     10. '!root_mode' to show the status root mode;\n\
     11. '!root_mode_on' to enable root mode;\n\
     12. '!root_mode_off' to disable root mode;\n\
     13. '!restart_text' to restart the text;\n\
     14. '!text' to show the current text;\n\
     15. '!result' to show analysis results;\n\
     16. '!remove_words' to remove words from the text;\n\
     17. '!replace_words' to replace words in the text;\n\
     18. '!undo' to undo the last text modification;\n\
     19. '!redo' to redo the last undone modification;\n\
     20. '!save_to_json' to save the session to a JSON file;\n\
     21. '!save_to_bin' to save the session to a binary file;\n\
     22. '!close' to close the program."
}

/// What the command handler asks the loop to do next.
enum Flow {
    Continue,
    EnterFile,
    Quit,
}

/// Run the loop, optionally starting with a file given on the command
/// line.
pub fn run(initial: Option<PathBuf>) -> anyhow::Result<()> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut pending = initial;

    loop {
        let mut analysis = match open_next_file(&mut input, pending.take())? {
            Some(analysis) => analysis,
            None => return Ok(()),
        };
        match analysis.summary() {
            Ok(summary) => println!("{summary}"),
            Err(err) => println!("{err}"),
        }

        loop {
            let Some(line) = prompt(&mut input, "Enter word for search or command:")? else {
                return Ok(());
            };
            match handle_command(&line, &mut analysis, &mut input)? {
                Flow::Continue => {}
                Flow::EnterFile => break,
                Flow::Quit => return Ok(()),
            }
        }
    }
}

/// Keep asking for a path until a file loads or input ends.
fn open_next_file(
    input: &mut impl BufRead,
    mut pending: Option<PathBuf>,
) -> anyhow::Result<Option<TextAnalysis>> {
    loop {
        let path = match pending.take() {
            Some(path) => path,
            None => match prompt(input, "Enter path to file:")? {
                Some(line) if !line.is_empty() => PathBuf::from(line),
                Some(_) => continue,
                None => return Ok(None),
            },
        };
        match TextAnalysis::load(&path, Capabilities::default()) {
            Ok(analysis) => return Ok(Some(analysis)),
            Err(err) => {
                warn!(path = %path.display(), %err, "failed to load file");
                println!("{err}");
            }
        }
    }
}

fn handle_command(
    command: &str,
    analysis: &mut TextAnalysis,
    input: &mut impl BufRead,
) -> anyhow::Result<Flow> {
    match command {
        "" => println!("Print word or command."),
        "!help" => println!("{}", help_text()),
        "!enter_file" => return Ok(Flow::EnterFile),
        "!close" => return Ok(Flow::Quit),
        "!list_words" => match analysis.word_list() {
            Ok(words) => println!("{}", words.join(", ")),
            Err(err) => println!("{err}"),
        },
        "!result" => match analysis.summary() {
            Ok(summary) => println!("{summary}"),
            Err(err) => println!("{err}"),
        },
        "!text" => println!("{}", analysis.text()),
        "!case_sens" => println!("{}", analysis.show_case_sens()),
        "!case_sens_on" => println!("{}", analysis.case_sens_on()),
        "!case_sens_off" => println!("{}", analysis.case_sens_off()),
        "!smart_mode" => println!("{}", analysis.show_smart_mode()),
        "!smart_mode_on" => println!("{}", analysis.smart_mode_on()),
        "!smart_mode_off" => println!("{}", analysis.smart_mode_off()),
        "!root_mode" => println!("{}", analysis.show_root_mode()),
        "!root_mode_on" => println!("{}", analysis.root_mode_on()),
        "!root_mode_off" => println!("{}", analysis.root_mode_off()),
        "!restart_text" => println!("{}", analysis.restart()),
        "!undo" => println!("{}", analysis.undo()),
        "!redo" => println!("{}", analysis.redo()),
        "!remove_words" => println!("{}", analysis.remove_or_replace("")),
        "!replace_words" => {
            let Some(replacement) = prompt(input, "Enter replacement word:")? else {
                return Ok(Flow::Quit);
            };
            println!("{}", analysis.remove_or_replace(&replacement));
        }
        "!save_to_json" => match analysis.save_to_json() {
            Ok(message) => println!("{message}"),
            Err(err) => println!("{err}"),
        },
        "!save_to_bin" => match analysis.save_to_binary() {
            Ok(message) => println!("{message}"),
            Err(err) => println!("{err}"),
        },
        word => println!("{}", analysis.search(word, false).message()),
    }
    Ok(Flow::Continue)
}

/// Print a prompt and read one trimmed line; `None` on end of input.
fn prompt(input: &mut impl BufRead, message: &str) -> anyhow::Result<Option<String>> {
    print!("{message} ");
    io::stdout().flush().context("failed to flush stdout")?;
    let mut line = String::new();
    let read = input
        .read_line(&mut line)
        .context("failed to read from stdin")?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn sample_analysis(dir: &TempDir) -> TextAnalysis {
        let path = dir.path().join("sample.txt");
        fs::write(&path, "cat sat on the mat").unwrap();
        TextAnalysis::load(&path, Capabilities::default()).unwrap()
    }

    #[test]
    fn enter_file_and_close_change_the_flow() {
        let dir = TempDir::new().unwrap();
        let mut analysis = sample_analysis(&dir);
        let mut input = Cursor::new("");
        assert!(matches!(
            handle_command("!enter_file", &mut analysis, &mut input).unwrap(),
            Flow::EnterFile
        ));
        assert!(matches!(
            handle_command("!close", &mut analysis, &mut input).unwrap(),
            Flow::Quit
        ));
        assert!(matches!(
            handle_command("!help", &mut analysis, &mut input).unwrap(),
            Flow::Continue
        ));
    }

    #[test]
    fn replace_words_reads_the_replacement_from_input() {
        let dir = TempDir::new().unwrap();
        let mut analysis = sample_analysis(&dir);
        let mut input = Cursor::new("dog\n");
        handle_command("cat", &mut analysis, &mut input).unwrap();
        handle_command("!replace_words", &mut analysis, &mut input).unwrap();
        assert_eq!(analysis.text(), "dog sat on the mat");
    }

    #[test]
    fn mode_commands_toggle_engine_flags() {
        let dir = TempDir::new().unwrap();
        let mut analysis = sample_analysis(&dir);
        let mut input = Cursor::new("");
        handle_command("!case_sens_on", &mut analysis, &mut input).unwrap();
        assert!(analysis.flags().case_sensitive);
        handle_command("!case_sens_off", &mut analysis, &mut input).unwrap();
        assert!(!analysis.flags().case_sensitive);
    }

    #[test]
    fn open_next_file_retries_after_a_bad_path() {
        let dir = TempDir::new().unwrap();
        let good = dir.path().join("good.txt");
        fs::write(&good, "cat sat").unwrap();
        let lines = format!("{}\n{}\n", dir.path().join("missing.txt").display(), good.display());
        let mut input = Cursor::new(lines);
        let analysis = open_next_file(&mut input, None).unwrap();
        assert_eq!(analysis.unwrap().text(), "cat sat");
    }
}
