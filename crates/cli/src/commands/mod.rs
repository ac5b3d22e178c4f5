use super::diagnostics::{CodeFrame, Diagnostic, Message};
use super::resolver::{DirectoryResolver, read_package};

use chicklet_interpreter::{Config, Error, World};
use chicklet_syntax::{LineIndex, TokenKind, tokenise};

use anstream::{eprint, eprintln, print, println};
use std::{
  fs,
  path::{Path, PathBuf},
};

pub struct Options {
  pub config: Config,
  pub package_root: Option<PathBuf>,
}
impl Options {
  fn world(&self, default_root: &Path) -> World {
    let root = self.package_root.as_deref().unwrap_or(default_root);
    World::with_config(self.config).with_resolver(DirectoryResolver::new(root))
  }
}

/// A source file, used to show where errors happened
struct Source<'a> {
  name: &'a str,
  text: &'a str,
}

fn read_file(filename: &str) -> Result<String, ()> {
  if filename == "-" {
    return read_stdin();
  }

  match fs::read_to_string(filename) {
    Ok(file) if file.is_empty() => {
      eprintln!("{}", Message::warning(format!("Empty file `{filename}`")));
      Err(())
    }
    Ok(file) if file.len() >= u32::MAX as usize => {
      eprintln!("{}", Message::error("File too large - max size 4GB".into()));
      Err(())
    }
    Ok(file) => Ok(file),
    Err(_) => {
      eprintln!("{}", Message::error(format!("File not found `{filename}`")));
      Err(())
    }
  }
}

fn read_stdin() -> Result<String, ()> {
  use std::io::{self, Read};

  let mut buffer = String::new();
  let mut stdin = io::stdin().lock();

  match stdin.read_to_string(&mut buffer) {
    Ok(_) if buffer.len() >= u32::MAX as usize => {
      eprintln!("{}", Message::error("File too large - max size 4GB".into()));
      Err(())
    }
    Ok(_) => Ok(buffer),
    Err(_) => {
      eprintln!("{}", Message::error("Problem Reading from STDIN".into()));
      Err(())
    }
  }
}

fn show<T: Diagnostic>(error: &T, source: Option<&Source>) {
  eprintln!("{}", Message::from(error));
  if let Some(source) = source {
    eprintln!("{}", CodeFrame::new(source.name, source.text, error.span()));
  }
}

fn report(error: &Error, source: Option<&Source>) {
  match error {
    Error::Parse(errors) => errors.iter().for_each(|error| show(error, source)),
    Error::Compile(errors) => errors.iter().for_each(|error| show(error, source)),
    Error::Runtime(error) => {
      show(error, source);

      if let Some(source) = source
        && let Some(traceback) = error.traceback(&LineIndex::from_source(source.text))
      {
        eprint!("\n{traceback}");
      }
    }
    error @ (Error::Convert(_) | Error::Call(_)) => {
      eprintln!("{}", Message::error(error.to_string()));
    }
  }
}

pub fn run(path: &str, options: &Options) -> Result<(), ()> {
  if Path::new(path).is_dir() {
    return run_package(Path::new(path), options);
  }

  let source = read_file(path)?;
  let source = Source {
    name: path,
    text: &source,
  };

  let directory = match Path::new(path).parent() {
    Some(parent) if path != "-" => parent,
    _ => Path::new("."),
  };
  let mut world = options.world(directory);

  match world.eval(source.text) {
    Ok(_) => Ok(()),
    Err(error) => {
      report(&error, Some(&source));
      Err(())
    }
  }
}

fn run_package(directory: &Path, options: &Options) -> Result<(), ()> {
  let files = match read_package(directory) {
    Ok(files) if files.is_empty() => {
      let message = format!("No source files in `{}`", directory.display());
      eprintln!("{}", Message::error(message));
      return Err(());
    }
    Ok(files) => files,
    Err(_) => {
      let message = format!("Unable to read directory `{}`", directory.display());
      eprintln!("{}", Message::error(message));
      return Err(());
    }
  };

  // spans are relative to a single file, so frames are only shown when there is one
  let name = files[0].0.display().to_string();
  let source = match files.as_slice() {
    [(_, text)] => Some(Source { name: &name, text }),
    _ => None,
  };

  let mut world = options.world(directory);
  let sources = files.iter().map(|(_, text)| text.clone()).collect();

  let result = world
    .compile_package(sources, "main")
    .and_then(|code| world.run(&code))
    .and_then(|_| world.eval("main()"));

  match result {
    Ok(_) => Ok(()),
    Err(error) => {
      report(&error, source.as_ref());
      Err(())
    }
  }
}

pub fn print_tokens(filename: &str) -> Result<(), ()> {
  let source = read_file(filename)?;
  let filename = if filename == "-" { "STDIN" } else { filename };

  println!("    ╭─[Tokens: {filename}]");
  for token in tokenise(&source) {
    print!("{:>3} │ {}", token.start, token.kind);
    if has_variable_length(token.kind) {
      print!(" (length: {})", token.length);
    }
    println!();
  }
  println!("────╯");

  Ok(())
}

fn has_variable_length(kind: TokenKind) -> bool {
  matches!(
    kind,
    TokenKind::Identifier
      | TokenKind::Integer
      | TokenKind::Float
      | TokenKind::String
      | TokenKind::RawString
      | TokenKind::Comment
      | TokenKind::UnterminatedString
      | TokenKind::UnterminatedComment
  )
}

pub fn print_ast(filename: &str) -> Result<(), ()> {
  let source = read_file(filename)?;
  let ast = chicklet_syntax::parse(source);

  if !ast.is_valid() {
    let source = Source {
      name: filename,
      text: &ast.source,
    };
    ast.errors.iter().for_each(|error| show(error, Some(&source)));
    println!();
  }

  let filename = if filename == "-" { "STDIN" } else { filename };
  println!("╭─[Abstract Syntax Tree: {filename}]");
  print!("{ast}");
  println!("╯");

  Ok(())
}

mod repl;
pub use repl::repl;
