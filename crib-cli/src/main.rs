#![deny(missing_docs)]
//! A command-line interface for crib dragging against many-time pad ciphertexts.

use clap::{Parser, Subcommand};
use crib_core::classifier::ByteClassifier;
use crib_core::drag::{DragSessions, Interaction};
use crib_core::matching::{Match, MatchId, MatchStatus};
use crib_core::sample;
use crib_core::session::{self, SessionState};
use crib_core::workspace::Workspace;
use log::{error, info};
use std::fs;
use std::path::{Path, PathBuf};

mod view;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(
    after_help = "EXAMPLES:\n  \n# Start a session from a file of hex/base64 ciphertexts, one per line\ncrib-cli --session ./s.json init --ciphertexts ./ciphertexts.txt\n\n# Drag a crib across every ciphertext\ncrib-cli --session ./s.json crib \" the \"\n\n# Accept the second possible match, or all of them\ncrib-cli --session ./s.json confirm 2\ncrib-cli --session ./s.json confirm --all\n\n# Put the crib somewhere by hand\ncrib-cli --session ./s.json place --start 17 --ciphertext 3\n\n# Look at what the recovered key decrypts to\ncrib-cli --session ./s.json show"
)]
struct Cli {
    /// The path to the session file.
    #[arg(
        long,
        global = true,
        env = "CRIB_SESSION",
        default_value = ".crib_session.json"
    )]
    session: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a new session from a file of ciphertexts
    Init {
        /// File with one hex or base64 ciphertext per line (or comma separated)
        #[arg(short, long, value_name = "FILE")]
        ciphertexts: PathBuf,

        /// Regex for bytes that look like plaintext. Empty selects the default.
        #[arg(long, default_value = "")]
        valid: String,

        /// Regex for bytes that are rare but tolerated. Empty selects the default.
        #[arg(long, default_value = "")]
        acceptable: String,
    },
    /// Show a summary of the session
    Status,
    /// Set the crib and list where it fits
    Crib {
        /// The crib text, or hex bytes with --hex
        #[arg(allow_hyphen_values = true)]
        crib: String,

        /// Interpret the crib as hex bytes
        #[arg(long)]
        hex: bool,
    },
    /// Confirm a possible match for the current crib
    Confirm {
        /// Number of the possible match as listed by 'crib' (numbers stay fixed until the crib changes)
        #[arg(required_unless_present = "all")]
        number: Option<usize>,

        /// Confirm every possible match and clear the crib
        #[arg(long, conflicts_with = "number")]
        all: bool,
    },
    /// Place the current crib by hand and confirm it
    Place {
        /// Offset to place the crib at
        #[arg(long, allow_hyphen_values = true)]
        start: i64,

        /// Ciphertext to align the crib against
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        ciphertext: i64,
    },
    /// Move a confirmed match to an absolute position
    Move {
        /// Number of the confirmed match as listed by 'status'
        number: usize,

        /// New offset (clamped to the key length)
        #[arg(long, allow_hyphen_values = true)]
        start: i64,

        /// New ciphertext (clamped to the available ones)
        #[arg(long, allow_hyphen_values = true)]
        ciphertext: i64,
    },
    /// Shift a confirmed match relative to where it is
    Nudge {
        /// Number of the confirmed match as listed by 'status'
        number: usize,

        /// Offsets to shift right (negative shifts left)
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        offsets: i64,

        /// Ciphertexts to shift down (negative shifts up)
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        rows: i64,
    },
    /// Remove a confirmed match
    Remove {
        /// Number of the confirmed match as listed by 'status'
        number: usize,
    },
    /// Remove every match
    Clear,
    /// Print the recovered key and every ciphertext decrypted with it
    Show,
    /// Change the byte classification patterns
    Patterns {
        /// Regex for bytes that look like plaintext
        #[arg(long)]
        valid: Option<String>,

        /// Regex for bytes that are rare but tolerated
        #[arg(long)]
        acceptable: Option<String>,
    },
    /// Generate many-time pad sample sets from plaintexts
    Sample {
        /// Text file of '%%'-separated blocks: a name line, then one plaintext per line
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Where to write the JSON result. Prints to stdout if omitted.
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

/// Possible matches still pending for the current crib, in listing order.
/// Each keeps the number it was listed under until the crib changes.
pub(crate) fn possible_matches(workspace: &Workspace) -> Vec<&Match> {
    workspace
        .pending()
        .iter()
        .filter(|m| m.status == MatchStatus::Possible)
        .collect()
}

fn load_workspace(path: &Path) -> Workspace {
    let state = session::load_state(path).unwrap_or_else(|e| {
        error!("Failed to load session: {e}");
        std::process::exit(1);
    });
    let mut workspace = state.restore().unwrap_or_else(|e| {
        error!("Failed to restore session: {e}");
        std::process::exit(1);
    });
    if let Err(e) = workspace.refresh() {
        error!("Failed to search for matches: {e}");
        std::process::exit(1);
    }
    workspace
}

fn save_workspace(path: &Path, workspace: &Workspace) {
    if let Err(e) = session::save_state(path, &SessionState::capture(workspace)) {
        error!("Failed to save session: {e}");
        std::process::exit(1);
    }
}

fn confirmed_id(workspace: &Workspace, number: usize) -> MatchId {
    number
        .checked_sub(1)
        .and_then(|i| workspace.confirmed().get(i))
        .map_or_else(
            || {
                error!(
                    "There is no confirmed match {number} ({} confirmed).",
                    workspace.confirmed().len()
                );
                std::process::exit(1);
            },
            |m| m.id,
        )
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    let session_path = cli.session;

    match &cli.command {
        Commands::Init { .. } | Commands::Sample { .. } => {}
        _ => {
            if !session_path.exists() {
                error!(
                    "Session file '{}' does not exist. Please create it with 'init'.",
                    session_path.display()
                );
                std::process::exit(1);
            }
        }
    }

    match cli.command {
        Commands::Init {
            ciphertexts,
            valid,
            acceptable,
        } => {
            let text = fs::read_to_string(&ciphertexts).unwrap_or_else(|e| {
                error!("Failed to read ciphertexts file: {e}");
                std::process::exit(1);
            });
            let classifier = ByteClassifier::from_patterns(&valid, &acceptable).unwrap_or_else(|e| {
                error!("{e}");
                std::process::exit(1);
            });
            let workspace = Workspace::from_text(&text, classifier).unwrap_or_else(|e| {
                error!("Failed to parse ciphertexts: {e}");
                std::process::exit(1);
            });
            if workspace.ciphertexts().is_empty() {
                error!("No ciphertexts found in '{}'.", ciphertexts.display());
                std::process::exit(1);
            }
            info!("Initializing session at '{}'", session_path.display());
            save_workspace(&session_path, &workspace);
            println!(
                "Session initialized with {} ciphertexts (key length {}).",
                workspace.ciphertexts().len(),
                workspace.key_length()
            );
        }
        Commands::Status => {
            let workspace = load_workspace(&session_path);
            let key = workspace.confirmed_key();
            let known = key.iter().filter(|&&b| b != 0).count();

            println!("Session: {}", session_path.display());
            println!("{:-<40}", "");
            println!("Ciphertexts: {}", workspace.ciphertexts().len());
            println!("Key length: {}", workspace.key_length());
            println!(
                "Crib: {:?} ({} bytes)",
                String::from_utf8_lossy(workspace.crib()),
                workspace.crib().len()
            );
            println!("Known key bytes: {known}/{}", workspace.key_length());
            println!("Confirmed matches: {}", workspace.confirmed().len());
            for (i, m) in workspace.confirmed().iter().enumerate() {
                println!("  {}", view::describe_match(i + 1, m));
            }
            println!("Possible matches: {}", possible_matches(&workspace).len());
        }
        Commands::Crib { crib, hex } => {
            let mut workspace = load_workspace(&session_path);
            let bytes = if hex {
                hex::decode(crib.trim()).unwrap_or_else(|e| {
                    error!("Crib is not valid hex: {e}");
                    std::process::exit(1);
                })
            } else {
                crib.into_bytes()
            };
            workspace.set_crib(bytes);
            if let Err(e) = workspace.refresh() {
                error!("Failed to search for matches: {e}");
                std::process::exit(1);
            }
            save_workspace(&session_path, &workspace);
            view::print_pending(&workspace);
        }
        Commands::Confirm { number, all } => {
            let mut workspace = load_workspace(&session_path);
            if all {
                match workspace.confirm_all() {
                    Ok(0) => println!("No possible matches to confirm."),
                    Ok(count) => println!("Confirmed {count} match(es); crib cleared."),
                    Err(e) => {
                        error!("Failed to confirm matches: {e}");
                        std::process::exit(1);
                    }
                }
            } else {
                let number = number.unwrap_or_default();
                let id = possible_matches(&workspace)
                    .iter()
                    .find(|m| m.rank == number)
                    .map(|m| m.id)
                    .unwrap_or_else(|| {
                        error!(
                            "Possible match {number} is not pending for the current crib (already confirmed, absorbed or never listed)."
                        );
                        std::process::exit(1);
                    });
                if let Err(e) = workspace.confirm(id) {
                    error!("Failed to confirm match: {e}");
                    std::process::exit(1);
                }
                println!("Confirmed match {number}.");
            }
            save_workspace(&session_path, &workspace);
        }
        Commands::Place { start, ciphertext } => {
            let mut workspace = load_workspace(&session_path);
            let Some(id) = workspace.placeholder() else {
                error!("Set a crib before placing it.");
                std::process::exit(1);
            };
            let placed = workspace
                .confirm(id)
                .and_then(|()| workspace.reposition(id, start, ciphertext));
            if let Err(e) = placed {
                error!("Failed to place crib: {e}");
                std::process::exit(1);
            }
            if let Some(m) = workspace.get(id) {
                println!(
                    "Placed crib on ciphertext {} at {}.",
                    m.ciphertext_index, m.start
                );
            }
            save_workspace(&session_path, &workspace);
        }
        Commands::Move {
            number,
            start,
            ciphertext,
        } => {
            let mut workspace = load_workspace(&session_path);
            let id = confirmed_id(&workspace, number);
            match workspace.reposition(id, start, ciphertext) {
                Ok(true) => println!("Moved match {number}."),
                Ok(false) => println!("Match {number} is already there."),
                Err(e) => {
                    error!("Failed to move match: {e}");
                    std::process::exit(1);
                }
            }
            save_workspace(&session_path, &workspace);
        }
        Commands::Nudge {
            number,
            offsets,
            rows,
        } => {
            let mut workspace = load_workspace(&session_path);
            let id = confirmed_id(&workspace, number);
            let mut drags = DragSessions::default();
            let moved = drags
                .begin(&mut workspace, Interaction::Mouse, id)
                .and_then(|()| drags.drag_to(&mut workspace, Interaction::Mouse, offsets, rows));
            drags.end(Interaction::Mouse);
            match moved {
                Ok(true) => {
                    if let Some(m) = workspace.get(id) {
                        println!(
                            "Moved match {number} to ciphertext {} at {}.",
                            m.ciphertext_index, m.start
                        );
                    }
                }
                Ok(false) => println!("Match {number} did not move."),
                Err(e) => {
                    error!("Failed to move match: {e}");
                    std::process::exit(1);
                }
            }
            save_workspace(&session_path, &workspace);
        }
        Commands::Remove { number } => {
            let mut workspace = load_workspace(&session_path);
            let id = confirmed_id(&workspace, number);
            match workspace.remove(id) {
                Ok(m) => println!(
                    "Removed match {number} ({:?} at {}).",
                    String::from_utf8_lossy(&m.crib),
                    m.start
                ),
                Err(e) => {
                    error!("Failed to remove match: {e}");
                    std::process::exit(1);
                }
            }
            save_workspace(&session_path, &workspace);
        }
        Commands::Clear => {
            let mut workspace = load_workspace(&session_path);
            workspace.clear_matches();
            save_workspace(&session_path, &workspace);
            println!("All matches removed.");
        }
        Commands::Show => {
            let workspace = load_workspace(&session_path);
            view::print_decoded(&workspace);
        }
        Commands::Patterns { valid, acceptable } => {
            let mut workspace = load_workspace(&session_path);
            if let Some(pattern) = valid {
                if let Err(e) = workspace.set_valid_pattern(&pattern) {
                    error!("{e}");
                    std::process::exit(1);
                }
            }
            if let Some(pattern) = acceptable {
                if let Err(e) = workspace.set_acceptable_pattern(&pattern) {
                    error!("{e}");
                    std::process::exit(1);
                }
            }
            save_workspace(&session_path, &workspace);
            println!(
                "valid: {:?}\nacceptable: {:?}",
                workspace.classifier().valid_pattern(),
                workspace.classifier().acceptable_pattern()
            );
        }
        Commands::Sample { input, output } => {
            let text = fs::read_to_string(&input).unwrap_or_else(|e| {
                error!("Failed to read sample file: {e}");
                std::process::exit(1);
            });
            let samples = sample::generate_samples(&text).unwrap_or_else(|e| {
                error!("Failed to generate samples: {e}");
                std::process::exit(1);
            });
            let json = serde_json::to_string_pretty(&samples).unwrap_or_else(|e| {
                error!("Failed to serialize samples: {e}");
                std::process::exit(1);
            });
            match output {
                Some(path) => {
                    if let Err(e) = fs::write(&path, json) {
                        error!("Failed to write samples: {e}");
                        std::process::exit(1);
                    }
                    info!("Wrote {} sample set(s) to '{}'", samples.len(), path.display());
                }
                None => println!("{json}"),
            }
        }
    }
}
