use super::{Options, Source, report};
use crate::diagnostics::Message;

use chicklet_interpreter::{CodeKind, HostValue, World};

use anstream::{eprintln, println};
use owo_colors::OwoColorize;
use std::path::Path;

pub fn repl(options: &Options) -> Result<(), ()> {
  println!("{}", crate::coloured_header());
  println!("{}", "exit using ctrl+d, or ctrl+c".dimmed());

  let mut world = options.world(Path::new("."));

  let mut rl = match rustyline::DefaultEditor::new() {
    Ok(editor) => editor,
    Err(error) => {
      eprintln!("{}", Message::error(format!("Unable to start REPL: {error}")));
      return Err(());
    }
  };

  while let Ok(line) = rl.readline(">> ") {
    _ = rl.add_history_entry(line.as_str());
    run_repl_entry(&mut world, &line);
  }

  Ok(())
}

/// Runs a line, printing the result if it is an expression
fn run_repl_entry(world: &mut World, line: &str) {
  let source = Source {
    name: "REPL",
    text: line,
  };

  let code = match world.compile(line) {
    Ok(code) => code,
    Err(error) => return report(&error, Some(&source)),
  };

  match world.run(&code) {
    Ok(values) if values.is_empty() => {}
    Ok(values) if matches!(code.kind(), CodeKind::Expression(_) | CodeKind::Constant(..)) => {
      println!("{}", display_values(&values));
    }
    Ok(_) => {}
    Err(error) => report(&error, Some(&source)),
  }
}

fn display_values(values: &[HostValue]) -> String {
  let values = values.iter().map(ToString::to_string).collect::<Vec<_>>();
  values.join(", ")
}
