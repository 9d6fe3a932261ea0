use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rummage::Engine;
use rustyline::{error::ReadlineError, history::DefaultHistory, Editor};

const VERSION: &str = env!("CARGO_PKG_VERSION");

const HELP: &str = r#"Statements:
  u = find(User, 42)          look up a record and bind it
  u                           show a bound variable
  u.Name                      read a field
  u.Orders[1].ID              walk fields and list indexes
  u.Greet(true)               call a method with literal arguments
  u.Profile.Fits(`{"width": 3, "height": 4}`)
                              pass JSON to a custom converter
  u.Name = "Ada"              write a field back

Commands:
  help                        show this message
  quit, exit                  leave (Ctrl-D works too)
"#;

pub fn default_history_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|dirs| dirs.data_dir().join("rummage").join("history.txt"))
}

fn save_history(editor: &mut Editor<(), DefaultHistory>, path: Option<&Path>) {
    let Some(path) = path else {
        return;
    };
    if let Some(parent) = path.parent() {
        if let Err(error) = std::fs::create_dir_all(parent) {
            tracing::warn!("failed to create history directory: {}", error);
        }
    }
    if let Err(error) = editor.save_history(path) {
        tracing::warn!("failed to save history: {}", error);
    }
}

pub fn start(engine: &mut dyn Engine, history: Option<PathBuf>, quiet: bool) -> Result<()> {
    if !quiet {
        println!("Welcome to rummage v{}", VERSION);
        println!("Type help for examples, quit to leave.");
    }

    let mut editor: Editor<(), DefaultHistory> =
        Editor::new().context("failed to create line editor")?;

    if let Some(path) = &history {
        if let Err(error) = editor.load_history(path) {
            let missing = matches!(&error, ReadlineError::Io(io) if io.kind() == std::io::ErrorKind::NotFound);
            if !missing {
                tracing::warn!("failed to load history: {}", error);
            }
        }
    }

    let prompt = format!("rummage v{} >> ", VERSION);
    loop {
        match editor.readline(&prompt) {
            Ok(line) => {
                let input = line.trim();
                if input.is_empty() {
                    continue;
                }
                if let Err(error) = editor.add_history_entry(input) {
                    tracing::warn!("failed to add history entry: {}", error);
                }

                match input {
                    "help" => print!("{}", HELP),
                    "quit" | "exit" => break,
                    _ => match engine.run(input) {
                        Ok(output) => println!("{}", output),
                        Err(error) => println!("error: {}", error),
                    },
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => break,
            Err(error) => {
                eprintln!("error: {}", error);
                break;
            }
        }
    }

    save_history(&mut editor, history.as_deref());
    Ok(())
}
