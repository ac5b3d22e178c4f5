//! # Chicklet
//! A small, statically typed language which can be embedded in Rust programs.
//!
//! The command line runs programs from files or package directories, and has a REPL.

#![allow(clippy::print_stdout)]

mod commands;
mod diagnostics;
mod resolver;

use chicklet_interpreter::Config;
use clap::builder::styling::{AnsiColor, Style, Styles};
use clap::{Parser, Subcommand};
use commands::Options;
use owo_colors::*;
use std::{io, path::PathBuf, process};
use tracing_subscriber::EnvFilter;

const STYLES: Styles = Styles::styled()
  .usage(Style::new().italic())
  .header(AnsiColor::BrightYellow.on_default().bold());

fn coloured_header() -> String {
  format!(
    "{} {}",
    "Chicklet".fg::<owo_colors::colors::css::Gold>().bold(),
    "(v0.1.0)".italic().dimmed()
  )
}

fn about() -> String {
  format!(
    "{}\nA small, statically typed language to embed in Rust programs.",
    coloured_header()
  )
}

#[derive(Parser)]
#[clap(
  name = "chicklet",
  version,
  about = about(),
  styles = STYLES,
  disable_help_subcommand = true,
)]
struct App {
  #[command(subcommand)]
  command: Command,

  /// The number of nested function calls allowed before a stack overflow
  #[clap(long, global = true, default_value_t = Config::default().max_call_depth)]
  max_call_depth: usize,

  /// Where imported packages are found [default: the directory being run]
  #[clap(long, global = true)]
  package_root: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
  /// Runs a file, or the `main` package in a directory
  Run {
    /// The file or directory to run
    path: String,
  },

  /// Start an interactive Read-Eval-Print Loop (REPL)
  Repl,

  /// Prints debugging information
  Print {
    #[command(subcommand)]
    command: PrintCommand,
  },
}

#[derive(Subcommand)]
enum PrintCommand {
  /// Displays the tokens in the file
  Tokens {
    /// The file to print
    file: String,
  },
  /// Displays the Abstract Syntax Tree
  Ast {
    /// The file to print
    file: String,
  },
}

fn install_tracing() {
  let filter = EnvFilter::try_from_env("CHICKLET_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(io::stderr)
    .init();
}

fn main() -> process::ExitCode {
  install_tracing();
  let args = App::parse();

  let options = Options {
    config: Config {
      max_call_depth: args.max_call_depth,
    },
    package_root: args.package_root,
  };

  let result = match args.command {
    Command::Run { path } => commands::run(&path, &options),
    Command::Repl => commands::repl(&options),
    Command::Print { command } => match command {
      PrintCommand::Tokens { file } => commands::print_tokens(&file),
      PrintCommand::Ast { file } => commands::print_ast(&file),
    },
  };

  match result {
    Ok(()) => process::ExitCode::SUCCESS,
    Err(()) => process::ExitCode::FAILURE,
  }
}
