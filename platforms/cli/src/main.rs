mod logging;
mod workspace;

use clap::{Parser, Subcommand};
use std::error::Error;
use std::io::{self, Read};
use std::path::PathBuf;
use std::time::Duration;
use tmedit::engine::DEFAULT_ENGINE_URL;
use tmedit::samples::slug;
use tmedit::{
    render, ConfigLoader, Configuration, Editor, EngineClient, EngineError, EngineSettings, Field,
    SampleLibrary, SaveOutcome, SAMPLES,
};
use tracing::{info, warn};
use workspace::Workspace;

/// Edit Turing machine definitions and run them on an external engine.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None, arg_required_else_help = true)]
#[clap(after_help = "EXAMPLES:
  tmedit-cli new 01 --name Flipper
  tmedit-cli add-state --final
  tmedit-cli set q0 0 --next q1 --write 1 --dir R
  tmedit-cli show
  tmedit-cli run 0110")]
struct Cli {
    /// Workspace file holding the machine being edited
    #[clap(short, long, env = "TMEDIT_FILE", default_value = "machine.json")]
    file: PathBuf,

    /// Base URL of the execution engine
    #[clap(long, env = "TMEDIT_ENGINE_URL", default_value = DEFAULT_ENGINE_URL)]
    engine: String,

    /// Engine request timeout in seconds
    #[clap(long, env = "TMEDIT_TIMEOUT_SECS", default_value_t = 10)]
    timeout: u64,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[clap(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start a new machine from an input alphabet
    New {
        /// Input alphabet, one symbol per character
        input: String,
        /// Auxiliary tape symbols
        #[clap(long, default_value = "")]
        aux: String,
        #[clap(long)]
        name: Option<String>,
        #[clap(long)]
        description: Option<String>,
    },
    /// List the built-in sample machines, or copy one into the workspace
    Sample { name: Option<String> },
    /// Replace the workspace with a configuration file (or JSON piped on stdin)
    Import { path: Option<PathBuf> },
    /// Change the alphabets and resynchronize the transition table
    Alphabet {
        input: String,
        #[clap(long, default_value = "")]
        aux: String,
    },
    /// Set or clear the machine name and description
    Meta {
        #[clap(long)]
        name: Option<String>,
        #[clap(long)]
        description: Option<String>,
    },
    /// Add a state
    AddState {
        /// Mark the new state as final
        #[clap(long = "final")]
        is_final: bool,
    },
    /// Delete the most recently added state
    DeleteState,
    /// Edit one transition cell; pass an empty string to clear a field
    Set {
        state: String,
        symbol: char,
        #[clap(long)]
        next: Option<String>,
        #[clap(long)]
        write: Option<String>,
        /// L, R or S
        #[clap(long)]
        dir: Option<String>,
    },
    /// Print the transition table and the matrix view
    Show,
    /// Print the configuration JSON
    Export,
    /// Check whether the engine is reachable
    Status,
    /// List configurations stored on the engine
    Files,
    /// Save the machine on the engine (falls back to a local file when unreachable)
    Save { name: String },
    /// Load a configuration from the engine into the workspace
    Load { name: String },
    /// Delete a configuration stored on the engine
    Delete { name: String },
    /// Run the machine on the engine and print the trace
    Run { input: String },
    /// Run the machine on the engine's display
    Display {
        input: String,
        /// Pause between steps in milliseconds
        #[clap(long)]
        delay: Option<u64>,
    },
    /// Start step-by-step mode on the engine's display
    StepMode { input: String },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let workspace = Workspace::new(&cli.file);
    let settings = EngineSettings {
        base_url: cli.engine.clone(),
        timeout: Duration::from_secs(cli.timeout),
        ..EngineSettings::default()
    };

    match cli.command {
        Command::New {
            input,
            aux,
            name,
            description,
        } => {
            let mut editor = Editor::new();
            editor.set_metadata(name.as_deref(), description.as_deref());
            editor.set_alphabets(&input, &aux)?;
            workspace.store(&editor)?;
            println!("{}", editor.table()?);
        }
        Command::Sample { name: None } => {
            for config in SAMPLES.iter() {
                println!(
                    "{:<20} {}",
                    config.name.as_deref().map(slug).unwrap_or_default(),
                    config.description.as_deref().unwrap_or("")
                );
            }
        }
        Command::Sample { name: Some(name) } => {
            let editor = Editor::adopt(SampleLibrary::by_name(&name)?)?;
            workspace.store(&editor)?;
            println!("{}", editor.matrix());
        }
        Command::Import { path } => {
            let config = match path {
                Some(path) => ConfigLoader::load_file(&path)?,
                None if atty::isnt(atty::Stream::Stdin) => {
                    let mut buffer = String::new();
                    io::stdin().read_to_string(&mut buffer)?;
                    ConfigLoader::load_str(&buffer)?
                }
                None => return Err("Pass a file or pipe a configuration on stdin".into()),
            };
            let editor = Editor::adopt(config)?;
            workspace.store(&editor)?;
            println!("{}", editor.matrix());
        }
        Command::Alphabet { input, aux } => {
            let (editor, outcome) = workspace.update(|editor| editor.set_alphabets(&input, &aux))?;
            info!(
                inserted = outcome.inserted,
                removed = outcome.removed,
                "alphabets updated"
            );
            println!("{}", editor.table()?);
        }
        Command::Meta { name, description } => {
            workspace.update(|editor| {
                editor.set_metadata(name.as_deref(), description.as_deref());
                Ok(())
            })?;
        }
        Command::AddState { is_final } => {
            let (_, state) = workspace.update(|editor| Ok(editor.add_state(is_final)))?;
            println!("Added state {}", state);
        }
        Command::DeleteState => {
            let (_, state) = workspace.update(|editor| editor.delete_last_state())?;
            println!("Deleted state {}", state);
        }
        Command::Set {
            state,
            symbol,
            next,
            write,
            dir,
        } => {
            let edits = [
                (Field::NextState, next),
                (Field::WriteSymbol, write),
                (Field::Direction, dir),
            ];
            let (editor, _) = workspace.update(|editor| {
                for (field, value) in edits {
                    if let Some(value) = value {
                        editor.set_field(&state, symbol, field, value)?;
                    }
                }
                Ok(())
            })?;
            println!("{}", editor.matrix());
        }
        Command::Show => {
            let editor = workspace.open()?;
            if let Some(name) = editor.name() {
                println!("{}", name);
            }
            if let Some(description) = editor.description() {
                println!("{}", description);
            }
            println!("{}", editor.table()?);
            println!("{}", editor.matrix());
        }
        Command::Export => {
            let config = workspace.open()?.export()?;
            println!("{}", tmedit::to_json(&config)?);
        }
        Command::Status => {
            let client = EngineClient::new(&settings)?;
            if client.status().await {
                println!("Connected to {}", client.base_url());
            } else {
                println!("Disconnected: {} is not answering", client.base_url());
            }
        }
        Command::Files => {
            let files = EngineClient::new(&settings)?.files().await?;
            if files.is_empty() {
                println!("No saved machines");
            }
            for file in files {
                println!("{:<24} {} bytes", file.stem(), file.size);
            }
        }
        Command::Save { name } => {
            let config = workspace.open()?.export()?;
            let client = EngineClient::new(&settings)?;
            match client
                .save_with_fallback(&name, &config, workspace.directory())
                .await?
            {
                SaveOutcome::Remote(file) => println!("Saved as {}", file),
                SaveOutcome::Local(path) => {
                    println!("Engine unreachable; saved locally to {}", path.display())
                }
            }
        }
        Command::Load { name } => {
            let config = EngineClient::new(&settings)?.load(&name).await?;
            let editor = Editor::adopt(config)?;
            workspace.store(&editor)?;
            println!("{}", editor.matrix());
        }
        Command::Delete { name } => {
            EngineClient::new(&settings)?.delete(&name).await?;
            println!("Deleted {}", name);
        }
        Command::Run { input } => {
            let (input, config) = prepare_run(&workspace, &input)?;
            let result = EngineClient::new(&settings)?
                .execute(&input, &config)
                .await?;
            print!("{}", render(&result));
        }
        Command::Display { input, delay } => {
            let (input, config) = prepare_run(&workspace, &input)?;
            let client = EngineClient::new(&settings)?;
            match client.execute_on_display(&input, &config, delay).await {
                Ok(()) => println!("Running on the display"),
                Err(EngineError::DisplayUnavailable) => {
                    return Err("The engine has no active display".into())
                }
                Err(e) => return Err(e.into()),
            }
        }
        Command::StepMode { input } => {
            let (input, config) = prepare_run(&workspace, &input)?;
            let message = EngineClient::new(&settings)?
                .start_step_mode(&input, &config)
                .await?;
            println!("{}", message);
        }
    }

    Ok(())
}

/// Loads the machine and filters the tape input down to input-alphabet symbols.
fn prepare_run(
    workspace: &Workspace,
    raw: &str,
) -> Result<(String, Configuration), Box<dyn Error>> {
    let editor = workspace.open()?;
    let config = editor.export()?;

    let input = editor.sanitize_input(raw.trim());
    if !input.rejected.is_empty() {
        let removed: Vec<String> = input.rejected.iter().map(char::to_string).collect();
        warn!(removed = %removed.join(", "), "removed symbols outside the input alphabet");
    }
    if input.accepted.is_empty() {
        return Err("Input is empty after removing invalid symbols".into());
    }

    Ok((input.accepted, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use tempfile::tempdir;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_set() {
        let cli = Cli::try_parse_from([
            "tmedit-cli", "set", "q0", "0", "--next", "q1", "--dir", "R",
        ])
        .unwrap();

        match cli.command {
            Command::Set {
                state,
                symbol,
                next,
                write,
                dir,
            } => {
                assert_eq!(state, "q0");
                assert_eq!(symbol, '0');
                assert_eq!(next.as_deref(), Some("q1"));
                assert_eq!(write, None);
                assert_eq!(dir.as_deref(), Some("R"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_add_final_state() {
        let cli = Cli::try_parse_from(["tmedit-cli", "-vv", "add-state", "--final"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Command::AddState { is_final: true }));
    }

    #[test]
    fn test_prepare_run_filters_input() {
        let dir = tempdir().unwrap();
        let workspace = Workspace::new(dir.path().join("machine.json"));
        let mut editor = Editor::new();
        editor.set_alphabets("01", "").unwrap();
        workspace.store(&editor).unwrap();

        let (input, config) = prepare_run(&workspace, " 0a1 ").unwrap();
        assert_eq!(input, "01");
        assert_eq!(config.input_alphabet, vec!['0', '1']);

        assert!(prepare_run(&workspace, "abc").is_err());
    }
}
