//! # UI Tests for Running Programs
#![cfg(not(miri))]

use assert_cmd::Command;
use indoc::indoc;

fn run(source: &str) -> (bool, String, String) {
  let output = Command::cargo_bin(env!("CARGO_PKG_NAME"))
    .unwrap()
    .args(["run", "-"])
    .write_stdin(source)
    .output()
    .unwrap();

  (
    output.status.success(),
    String::from_utf8(output.stdout).unwrap(),
    String::from_utf8(output.stderr).unwrap(),
  )
}

fn run_error(source: &str) -> String {
  let (success, _, stderr) = run(source);
  assert!(!success);
  stderr
}

#[test]
fn fibonacci_example() {
  let output = Command::cargo_bin(env!("CARGO_PKG_NAME"))
    .unwrap()
    .args(["run", "../../demos/fibonacci.chk"])
    .output()
    .unwrap();

  assert!(output.status.success());
  assert!(output.stderr.is_empty());

  let stdout = String::from_utf8(output.stdout).unwrap();
  assert_eq!(stdout, "75025\n");
}

#[test]
fn package_directory() {
  let output = Command::cargo_bin(env!("CARGO_PKG_NAME"))
    .unwrap()
    .args(["run", "../../demos/shapes"])
    .output()
    .unwrap();

  assert!(output.status.success());
  assert!(output.stderr.is_empty());

  let stdout = String::from_utf8(output.stdout).unwrap();
  assert_eq!(stdout, "loading geometry\narea 12\ncalls 1\n");
}

#[test]
fn package_root() {
  let output = Command::cargo_bin(env!("CARGO_PKG_NAME"))
    .unwrap()
    .args(["run", "-", "--package-root", "../../demos/shapes"])
    .write_stdin("import \"geometry\"\n\nprintln(geometry.Rectangle(2, 5))")
    .output()
    .unwrap();

  assert!(output.status.success());

  let stdout = String::from_utf8(output.stdout).unwrap();
  assert_eq!(stdout, "loading geometry\n10\n");
}

#[test]
fn println() {
  let (success, stdout, stderr) = run(indoc! {r#"
    x := 5
    name := "chicklet"
    println(name, x, x > 2)
  "#});

  assert!(success);
  assert!(stderr.is_empty());
  assert_eq!(stdout, "chicklet 5 true\n");
}

#[test]
fn missing_file() {
  let output = Command::cargo_bin(env!("CARGO_PKG_NAME"))
    .unwrap()
    .args(["run", "does-not-exist.chk"])
    .output()
    .unwrap();

  assert!(!output.status.success());
  let stderr = String::from_utf8(output.stderr).unwrap();
  assert_eq!(stderr, "✕ Error: File not found `does-not-exist.chk`\n\n");
}

#[test]
fn missing_package() {
  let stderr = run_error("import \"nowhere\"");
  assert_eq!(stderr, indoc! {r#"
    ✕ Error: Package Not Found
    package `nowhere` not found

        ╭─[STDIN:1]
      1 │ import "nowhere"
    ────╯
  "#});
}

#[test]
fn undefined_identifier() {
  let stderr = run_error("a");
  assert_eq!(stderr, indoc! {"
    ✕ Error: Undefined Identifier
    undefined: `a`

        ╭─[STDIN:1]
      1 │ a
    ────╯
  "});
}

#[test]
fn type_mismatch() {
  let stderr = run_error("var x int = \"hello\"");
  assert_eq!(stderr, indoc! {r#"
    ✕ Error: Type Mismatch
    cannot use value of type `string` as `int`

        ╭─[STDIN:1]
      1 │ var x int = "hello"
    ────╯
  "#});
}

#[test]
fn many_compile_errors() {
  let stderr = run_error("a := x\nb := y");

  assert_eq!(stderr.matches("✕ Error: Undefined Identifier").count(), 2);
  assert!(stderr.find("`x`") < stderr.find("`y`"));
}

#[test]
fn parse_error() {
  let stderr = run_error("x := ");
  assert!(stderr.starts_with("✕ Error: "));
  assert!(stderr.contains("╭─[STDIN:1]"));
}

#[test]
fn division_by_zero() {
  let stderr = run_error(indoc! {"
    zero := 0
    println(1 / zero)
  "});

  assert!(stderr.starts_with("✕ Error: Division by Zero\ninteger divide by zero\n"));
  assert!(stderr.ends_with("at line 2\n"));
}

#[test]
fn panic_traceback() {
  let (success, stdout, stderr) = run(indoc! {r#"
    func explode(message string) {
      panic(message)
    }

    println("before")
    explode("oh no")
    println("after")
  "#});

  assert!(!success);
  assert_eq!(stdout, "before\n");
  assert!(stderr.starts_with("✕ Error: Panic\npanic: oh no\n"));
  assert!(stderr.ends_with("in function 'explode' at line 2\nat line 6\n"));
}

#[test]
fn max_call_depth() {
  let source = indoc! {"
    func down(n int) int {
      if n == 0 {
        return 0
      }
      return down(n - 1)
    }
    println(down(50))
  "};

  let output = Command::cargo_bin(env!("CARGO_PKG_NAME"))
    .unwrap()
    .args(["run", "-", "--max-call-depth", "20"])
    .write_stdin(source)
    .output()
    .unwrap();
  assert!(!output.status.success());

  let stderr = String::from_utf8(output.stderr).unwrap();
  assert!(stderr.contains("stack overflow, more than 20 nested calls"));

  let (success, stdout, _) = run(source);
  assert!(success);
  assert_eq!(stdout, "0\n");
}

#[test]
fn log_level() {
  let output = Command::cargo_bin(env!("CARGO_PKG_NAME"))
    .unwrap()
    .args(["run", "../../demos/shapes"])
    .env("CHICKLET_LOG", "debug")
    .output()
    .unwrap();

  assert!(output.status.success());

  let stderr = String::from_utf8(output.stderr).unwrap();
  assert!(stderr.contains("draining init queue"));
}
