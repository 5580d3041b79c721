// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! CLI tool for interacting with deferred lists

use clap::{ArgAction, CommandFactory, Parser, Subcommand};
use deferred_list::DeferredList;
use rustyline::DefaultEditor;
use std::io::{self, BufRead, IsTerminal, Write};
use tracing_subscriber::{
    filter::{EnvFilter, LevelFilter},
    prelude::*,
    registry::Registry,
};

macro_rules! die {
    ($fmt:literal, $($arg:tt)*) => {{
        eprintln!($fmt, $($arg)*);
        std::process::exit(1);
    }};

    ($msg:literal) => {{
        eprintln!($msg);
        std::process::exit(1);
    }};

    () => {{
        eprintln!("Program terminated unexpectedly");
        std::process::exit(1);
    }};
}

#[allow(unused_imports)]
use tracing::{debug, error, info, trace, warn};

pub fn init_tracing(quiet: bool, verbose: u8) -> LevelFilter {
    let level_filter = if quiet {
        LevelFilter::ERROR
    } else {
        match verbose {
            0 => LevelFilter::WARN,
            1 => LevelFilter::INFO,
            2 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    };

    // Bridge log crate macros to tracing (the library logs through log::*)
    tracing_log::LogTracer::init().expect("Failed to set log tracer");

    let registry = Registry::default();

    let env_filter = EnvFilter::builder()
        .with_default_directive(level_filter.into())
        .with_env_var("DLIST_LOG")
        .from_env_lossy()
        .add_directive(
            "rustyline=warn"
                .parse()
                .expect("Failed to parse rustyline directive"),
        );

    let subscriber = registry.with(env_filter).with(
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .compact(),
    );

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        die!("INTERNAL ERROR: setting default tracing::subscriber failed");
    }

    level_filter
}

/// CLI tool for interacting with deferred lists
#[derive(Parser, Debug)]
#[command(name = "dlist")]
#[command(about = "CLI tool for interacting with deferred lists")]
struct ToolArgs {
    /// Suppress all output except for errors. This overrides the -v flag.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Turn on verbose output. Supply -v multiple times to increase verbosity.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Auto-commit threshold on the pending tree's height bound
    #[arg(short = 'a', long, value_name = "BOUND")]
    auto_commit_height: Option<usize>,

    /// Initial elements of the list
    #[arg(short, long, value_name = "VALUE", num_args = 0..)]
    items: Vec<String>,

    /// Command to run (if omitted, starts interactive shell)
    #[command(subcommand)]
    command: Option<ToolCommand>,
}

#[derive(Subcommand, Debug, Clone)]
enum ToolCommand {
    /// Get the element at an index
    Get {
        /// The index to look up
        index: usize,
    },
    /// Insert a value before the element at an index
    Ins {
        /// The target index
        index: usize,
        /// The value to insert
        value: String,
    },
    /// Overwrite the element at an index
    Set {
        /// The target index
        index: usize,
        /// The new value
        value: String,
    },
    /// Remove the element at an index
    Rm {
        /// The target index
        index: usize,
    },
    /// Append a value to the back of the list
    Push {
        /// The value to append
        value: String,
    },
    /// Remove the last element
    Pop,
    /// List all elements (settles pending edits)
    #[command(visible_alias = "list", visible_alias = "ls")]
    Scan,
    /// Print the current length
    Len,
    /// Settle all pending edits into the backing array
    Commit,
    /// Show list statistics
    Info,
}

// Internal shell commands, include all external tool commands
#[derive(Parser, Debug)]
#[command(name = "")]
#[command(no_binary_name = true)]
#[command(disable_version_flag = true)]
#[command(help_template = "
{version}

Available Commands:

{subcommands}

Use `help COMMAND` or `COMMAND --help` for more details.

")]
struct ShellArgs {
    #[command(subcommand)]
    command: ShellCommand,
}

// Shell commands (including ones not available from CLI)
#[derive(Subcommand, Debug, Clone)]
enum ShellCommand {
    #[command(flatten)]
    ToolCmd(ToolCommand),

    /// Exit the current shell
    #[command(visible_alias = "quit")]
    Exit,
}

enum CommandResult {
    Continue,
    Exit,
}

fn print_info(list: &DeferredList<String>) {
    println!("Length: {}", list.len());
    println!("Pending edit sites: {}", list.pending_edits());
}

fn execute_command(list: &mut DeferredList<String>, cmd: ToolCommand) -> CommandResult {
    match cmd {
        ToolCommand::Get { index } => match list.get(index) {
            Ok(value) => println!("{value}"),
            Err(e) => eprintln!("Error: {e}"),
        },
        ToolCommand::Ins { index, value } => match list.insert(index, value) {
            Ok(()) => println!("OK"),
            Err(e) => eprintln!("Error: {e}"),
        },
        ToolCommand::Set { index, value } => match list.set(index, value) {
            Ok(()) => println!("OK"),
            Err(e) => eprintln!("Error: {e}"),
        },
        ToolCommand::Rm { index } => match list.remove(index) {
            Ok(value) => println!("{value}"),
            Err(e) => eprintln!("Error: {e}"),
        },
        ToolCommand::Push { value } => match list.push(value) {
            Ok(()) => println!("OK"),
            Err(e) => eprintln!("Error: {e}"),
        },
        ToolCommand::Pop => match list.pop() {
            Ok(Some(value)) => println!("{value}"),
            Ok(None) => eprintln!("Error: list is empty"),
            Err(e) => eprintln!("Error: {e}"),
        },
        ToolCommand::Scan => match list.iter() {
            Ok(iter) => {
                for (index, value) in iter.enumerate() {
                    println!("{index}: {value}");
                }
            }
            Err(e) => eprintln!("Error: {e}"),
        },
        ToolCommand::Len => println!("{}", list.len()),
        ToolCommand::Commit => match list.commit() {
            Ok(()) => println!("OK"),
            Err(e) => eprintln!("Error: {e}"),
        },
        ToolCommand::Info => print_info(list),
    }
    CommandResult::Continue
}

fn execute_shell_command(list: &mut DeferredList<String>, cmd: ShellCommand) -> CommandResult {
    match cmd {
        ShellCommand::ToolCmd(cmd) => execute_command(list, cmd),
        ShellCommand::Exit => CommandResult::Exit,
    }
}

/// Parse and run a shell command line
fn run_shell_command(list: &mut DeferredList<String>, line: &str) -> CommandResult {
    let line = line.trim();
    if line.is_empty() {
        return CommandResult::Continue;
    }

    let tokens = match shlex::split(line) {
        Some(t) if !t.is_empty() => t,
        Some(_) => return CommandResult::Continue,
        None => {
            eprintln!("error: unclosed quote");
            return CommandResult::Continue;
        }
    };

    match ShellArgs::try_parse_from(&tokens) {
        Ok(args) => execute_shell_command(list, args.command),
        Err(e) => {
            // Print clap's error message
            eprintln!("{e}");
            CommandResult::Continue
        }
    }
}

fn run_shell(list: &mut DeferredList<String>) {
    if io::stdin().is_terminal() {
        run_shell_interactive(list);
    } else {
        run_shell_non_interactive(list);
    }
}

fn run_shell_interactive(list: &mut DeferredList<String>) {
    println!("Welcome to the deferred-list shell");
    println!("Type 'help' for available commands, 'exit' to quit.\n");

    let mut rl = match DefaultEditor::new() {
        Ok(editor) => editor,
        Err(e) => {
            eprintln!("Error initializing line editor: {e}");
            return;
        }
    };

    loop {
        match rl.readline("dlist> ") {
            Ok(line) => {
                let _ = rl.add_history_entry(&line);
                if let CommandResult::Exit = run_shell_command(list, &line) {
                    break;
                }
            }
            Err(rustyline::error::ReadlineError::Interrupted) => {
                // Ignore Ctrl+C, just show a new prompt
                continue;
            }
            Err(rustyline::error::ReadlineError::Eof) => {
                println!();
                break;
            }
            Err(e) => {
                eprintln!("Error reading input: {e}");
                break;
            }
        }
    }
}

fn run_shell_non_interactive(list: &mut DeferredList<String>) {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        if stdout.flush().is_err() {
            die!("can't flush stdout");
        }

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => {
                // EOF
                break;
            }
            Ok(_) => {
                if let CommandResult::Exit = run_shell_command(list, &line) {
                    break;
                }
            }
            Err(e) => {
                die!("Error reading input: {}", e);
            }
        }
    }
}

fn main() {
    let args = ToolArgs::parse();
    let level_filter = init_tracing(args.quiet, args.verbose);

    let cmd = ToolArgs::command();

    info!(
        "starting {} ({} {}), log level: {level_filter}",
        cmd.get_name(),
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );

    let mut list = DeferredList::from(args.items);
    if let Some(bound) = args.auto_commit_height {
        list = list.with_auto_commit_height(bound);
    }

    match args.command {
        Some(cmd) => {
            execute_command(&mut list, cmd);
        }
        None => run_shell(&mut list),
    }
}
