//! # UI Tests for Debug Print Commands
#![cfg(not(miri))]

use assert_cmd::Command;
use indoc::indoc;

fn print(kind: &str, source: &str) -> (bool, String, String) {
  let output = Command::cargo_bin(env!("CARGO_PKG_NAME"))
    .unwrap()
    .args(["print", kind, "-"])
    .write_stdin(source)
    .output()
    .unwrap();

  (
    output.status.success(),
    String::from_utf8(output.stdout).unwrap(),
    String::from_utf8(output.stderr).unwrap(),
  )
}

#[test]
fn tokens() {
  let (success, stdout, stderr) = print("tokens", "x := 5 + y\nprintln(\"hi\")");

  assert!(success);
  assert!(stderr.is_empty());
  assert_eq!(stdout, indoc! {r#"
        ╭─[Tokens: STDIN]
      0 │ Identifier (length: 1)
      2 │ :=
      5 │ Integer (length: 1)
      7 │ +
      9 │ Identifier (length: 1)
     10 │ New Line
     11 │ Identifier (length: 7)
     18 │ (
     19 │ String (length: 4)
     23 │ )
    ────╯
  "#});
}

#[test]
fn tokens_fibonacci_example() {
  let output = Command::cargo_bin(env!("CARGO_PKG_NAME"))
    .unwrap()
    .args(["print", "tokens", "../../demos/fibonacci.chk"])
    .output()
    .unwrap();

  assert!(output.status.success());
  assert!(output.stderr.is_empty());

  let stdout = String::from_utf8(output.stdout).unwrap();
  let mut lines = stdout.lines();
  assert_eq!(lines.next(), Some("    ╭─[Tokens: ../../demos/fibonacci.chk]"));
  assert_eq!(lines.next(), Some("  0 │ Comment (length: 35)"));
  assert_eq!(lines.next(), Some(" 37 │ func"));
  assert_eq!(lines.next(), Some(" 42 │ Identifier (length: 9)"));
  assert!(stdout.ends_with("────╯\n"));
}

#[test]
fn ast() {
  let (success, stdout, stderr) = print("ast", "x := 5");

  assert!(success);
  assert!(stderr.is_empty());
  assert!(stdout.starts_with("╭─[Abstract Syntax Tree: STDIN]\n"));
  assert!(stdout.ends_with("╯\n"));
}

#[test]
fn ast_with_errors() {
  let (success, stdout, stderr) = print("ast", "x := ");

  assert!(success);
  assert!(stderr.starts_with("✕ Error: "));
  assert!(stdout.contains("╭─[Abstract Syntax Tree: STDIN]"));
}
