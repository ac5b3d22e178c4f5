use crate::{TokenKind, ast::AST, tokenise};
use indoc::indoc;

fn parse(source: &str) -> AST {
  crate::parse(source.to_owned())
}
impl AST {
  fn is_ok(&self) -> bool {
    self.errors.is_empty()
  }

  fn is_err(&self) -> bool {
    !self.is_ok()
  }
}

fn parse_to_string(source: &str) -> String {
  crate::parse(source.to_owned()).to_string()
}

fn token_kinds(source: &str) -> Vec<TokenKind> {
  tokenise(source).map(|token| token.kind).collect()
}

#[test]
fn space_at_end() {
  assert!(parse("22 + 44 ").is_ok());
  assert!(parse("22 + 44    ").is_ok());
  assert!(parse("22 + 44  \t  ").is_ok());
  assert!(parse("22 + 44\n\n\n").is_ok());
  assert!(parse("import \"maths\"\n\n\n").is_ok());
}

#[test]
fn empty_string() {
  assert!(parse("\n\n\n").is_ok());
  assert!(parse("    ").is_ok());
  assert!(parse("").is_ok());
  assert!(parse("  \n    \n   \n ").is_ok());
}

#[test]
fn terminators_are_inserted_at_line_ends() {
  assert_eq!(
    token_kinds("x := 1\ny++\n"),
    [
      TokenKind::Identifier,
      TokenKind::ColonEqual,
      TokenKind::Integer,
      TokenKind::EndOfLine,
      TokenKind::Identifier,
      TokenKind::PlusPlus,
      TokenKind::EndOfLine,
    ]
  );

  // a line ending in an operator continues onto the next line
  assert_eq!(
    token_kinds("1 +\n2"),
    [TokenKind::Integer, TokenKind::Plus, TokenKind::Integer]
  );

  // comments don't change whether a terminator is needed
  assert_eq!(
    token_kinds("return // done\n"),
    [TokenKind::Return, TokenKind::Comment, TokenKind::EndOfLine]
  );
}

#[test]
fn number_literals() {
  assert_eq!(token_kinds("42"), [TokenKind::Integer]);
  assert_eq!(token_kinds("0xff"), [TokenKind::Integer]);
  assert_eq!(token_kinds("1_000"), [TokenKind::Integer]);
  assert_eq!(token_kinds("2.5"), [TokenKind::Float]);
  assert_eq!(token_kinds(".5"), [TokenKind::Float]);
  assert_eq!(token_kinds("1e9"), [TokenKind::Float]);
  assert_eq!(token_kinds("6.02e-23"), [TokenKind::Float]);

  let ast = parse_to_string("1_000");
  assert_eq!(ast, "├─ Integer (1000)\n");
}

#[test]
fn keywords() {
  assert_eq!(
    token_kinds("func var const type import package return"),
    [
      TokenKind::Func,
      TokenKind::Var,
      TokenKind::Const,
      TokenKind::Type,
      TokenKind::Import,
      TokenKind::Package,
      TokenKind::Return,
    ]
  );

  // literals for the predeclared values are ordinary identifiers
  assert_eq!(
    token_kinds("true false nil"),
    [
      TokenKind::Identifier,
      TokenKind::Identifier,
      TokenKind::Identifier
    ]
  );
}

#[test]
fn unterminated_string() {
  assert!(parse("\"unterminated string").is_err());
  assert!(parse("\"un\nx := 2").is_err());
  assert!(parse("`").is_err());

  assert!(parse("``").is_ok());
  assert!(parse("`hello world`").is_ok());
  assert!(parse("`multi\nline`").is_ok());
}

#[test]
fn unterminated_comment() {
  assert!(parse("/* never closed").is_err());

  assert!(parse("/* closed */ 5").is_ok());
  assert!(parse("x := 5 /* spans\nlines */\ny := 2").is_ok());
}

#[test]
fn unknown_character() {
  assert!(parse("3 $ 4").is_err());
  assert!(parse("3 ¬ 4").is_err());
  assert!(parse("🤗").is_err());
  assert!(parse("&").is_err());
  assert!(parse("a | b").is_err());

  // Having unknown characters in strings are fine
  assert!(parse("\"¬\"").is_ok());
  assert!(parse("\"🤗\"").is_ok());
}

#[test]
fn string_escapes() {
  let ast = parse_to_string(r#""tab\there\n""#);
  assert_eq!(ast, "├─ String \"tab\\there\\n\"\n");

  let ast = parse_to_string(r#""\x41é""#);
  assert_eq!(ast, "├─ String \"Aé\"\n");

  let ast = parse_to_string(r"`raw\n`");
  assert_eq!(ast, "├─ String \"raw\\\\n\"\n");

  assert!(parse(r#""\q""#).is_err());
  assert!(parse(r#""\x4""#).is_err());
}

#[test]
fn binary() {
  let ast = parse_to_string("4 + 23");
  let expected = indoc! {"
    ├─ Binary (+)
    │  ├─ Integer (4)
    │  ╰─ Integer (23)
  "};
  assert_eq!(ast, expected);

  let ast = parse_to_string("5 % 2 == 1 && 3 / 1");
  let expected = indoc! {"
    ├─ Binary (&&)
    │  ├─ Binary (==)
    │  │  ├─ Binary (%)
    │  │  │  ├─ Integer (5)
    │  │  │  ╰─ Integer (2)
    │  │  ╰─ Integer (1)
    │  ╰─ Binary (/)
    │     ├─ Integer (3)
    │     ╰─ Integer (1)
  "};
  assert_eq!(ast, expected);
}

#[test]
fn binary_precedence() {
  let ast = parse_to_string("1 + 2 * 3");
  let expected = indoc! {"
    ├─ Binary (+)
    │  ├─ Integer (1)
    │  ╰─ Binary (*)
    │     ├─ Integer (2)
    │     ╰─ Integer (3)
  "};
  assert_eq!(ast, expected);

  let ast = parse_to_string("a || b && c == d");
  let expected = indoc! {"
    ├─ Binary (||)
    │  ├─ Variable (a)
    │  ╰─ Binary (&&)
    │     ├─ Variable (b)
    │     ╰─ Binary (==)
    │        ├─ Variable (c)
    │        ╰─ Variable (d)
  "};
  assert_eq!(ast, expected);

  let ast = parse_to_string("1 - 2 - 3");
  let expected = indoc! {"
    ├─ Binary (-)
    │  ├─ Binary (-)
    │  │  ├─ Integer (1)
    │  │  ╰─ Integer (2)
    │  ╰─ Integer (3)
  "};
  assert_eq!(ast, expected);
}

#[test]
fn binary_missing_operand() {
  assert!(parse("* 5").is_err());
  assert!(parse("5 *").is_err());
  assert!(parse(" || 7").is_err());
  assert!(parse("5 <=").is_err());
}

#[test]
fn unary() {
  let ast = parse_to_string("-x * 2");
  let expected = indoc! {"
    ├─ Binary (*)
    │  ├─ Unary (-)
    │  │  ╰─ Variable (x)
    │  ╰─ Integer (2)
  "};
  assert_eq!(ast, expected);

  let ast = parse_to_string("!!ok");
  let expected = indoc! {"
    ├─ Unary (!)
    │  ╰─ Unary (!)
    │     ╰─ Variable (ok)
  "};
  assert_eq!(ast, expected);
}

#[test]
fn group() {
  let ast = parse_to_string("(1 + 2) * 3");
  let expected = indoc! {"
    ├─ Binary (*)
    │  ├─ Group
    │  │  ╰─ Binary (+)
    │  │     ├─ Integer (1)
    │  │     ╰─ Integer (2)
    │  ╰─ Integer (3)
  "};
  assert_eq!(ast, expected);

  assert!(parse("(1 + 2").is_err());
}

#[test]
fn call() {
  let ast = parse_to_string("println(1, \"a\")");
  let expected = indoc! {r#"
    ├─ Call
    │  ├─ Callee
    │  │  ╰─ Variable (println)
    │  ╰─ Arguments
    │     ├─ Integer (1)
    │     ╰─ String "a"
  "#};
  assert_eq!(ast, expected);

  let ast = parse_to_string("f()");
  let expected = indoc! {"
    ├─ Call
    │  ╰─ Callee
    │     ╰─ Variable (f)
  "};
  assert_eq!(ast, expected);

  assert!(parse("f(1, 2,)").is_ok());
  assert!(parse("f(1 2)").is_err());
  assert!(parse("f(1, 2").is_err());
}

#[test]
fn selector() {
  let ast = parse_to_string("maths.Double(x)");
  let expected = indoc! {"
    ├─ Call
    │  ├─ Callee
    │  │  ╰─ Selector (.Double)
    │  │     ╰─ Variable (maths)
    │  ╰─ Arguments
    │     ╰─ Variable (x)
  "};
  assert_eq!(ast, expected);

  assert!(parse("maths.").is_err());
  assert!(parse("maths.5").is_err());
}

#[test]
fn assignment() {
  let ast = parse_to_string("x := 5");
  let expected = indoc! {"
    ├─ Assignment (:=)
    │  ├─ Targets
    │  │  ╰─ Variable (x)
    │  ╰─ Values
    │     ╰─ Integer (5)
  "};
  assert_eq!(ast, expected);

  let ast = parse_to_string("a, b = b, a");
  let expected = indoc! {"
    ├─ Assignment (=)
    │  ├─ Targets
    │  │  ├─ Variable (a)
    │  │  ╰─ Variable (b)
    │  ╰─ Values
    │     ├─ Variable (b)
    │     ╰─ Variable (a)
  "};
  assert_eq!(ast, expected);

  let ast = parse_to_string("total += 2");
  let expected = indoc! {"
    ├─ Assignment (+=)
    │  ├─ Targets
    │  │  ╰─ Variable (total)
    │  ╰─ Values
    │     ╰─ Integer (2)
  "};
  assert_eq!(ast, expected);

  assert!(parse("a, b").is_err());
  assert!(parse("x :=").is_err());
}

#[test]
fn increment_decrement() {
  let ast = parse_to_string("count++\ncount--");
  let expected = indoc! {"
    ├─ IncrementDecrement (++)
    │  ╰─ Variable (count)
    ├─ IncrementDecrement (--)
    │  ╰─ Variable (count)
  "};
  assert_eq!(ast, expected);
}

#[test]
fn statements_separated_by_semicolons() {
  let ast = parse("x := 1; y := 2; z := 3");
  assert!(ast.is_ok());
  assert_eq!(ast.root_statements.len(), 3);

  assert!(parse("x := 1 y := 2").is_err());
}

#[test]
fn var_declaration() {
  let ast = parse_to_string("var x, y int = 1, 2");
  let expected = indoc! {"
    ├─ Var (x, y): int
    │  ├─ Integer (1)
    │  ╰─ Integer (2)
  "};
  assert_eq!(ast, expected);

  let ast = parse_to_string("var s string");
  assert_eq!(ast, "├─ Var (s): string\n");

  let ast = parse_to_string("var handler func(int) (int, bool)");
  assert_eq!(ast, "├─ Var (handler): func(int) (int, bool)\n");

  let ast = parse_to_string("var distance geometry.Metres");
  assert_eq!(ast, "├─ Var (distance): geometry.Metres\n");

  assert!(parse("var x").is_err());
  assert!(parse("var = 5").is_err());
}

#[test]
fn const_declaration() {
  let ast = parse_to_string("const limit = 100");
  let expected = indoc! {"
    ├─ Const (limit)
    │  ╰─ Integer (100)
  "};
  assert_eq!(ast, expected);

  let ast = parse_to_string("const pi float64 = 3.14");
  let expected = indoc! {"
    ├─ Const (pi): float64
    │  ╰─ Float (3.14)
  "};
  assert_eq!(ast, expected);
}

#[test]
fn type_declaration() {
  let ast = parse_to_string("type Celsius float64");
  assert_eq!(ast, "├─ Type (Celsius = float64)\n");

  let ast = parse_to_string("type Handler func(string) error");
  assert_eq!(ast, "├─ Type (Handler = func(string) error)\n");

  assert!(parse("type Celsius").is_err());
  assert!(parse("type 5 int").is_err());
}

#[test]
fn function_declaration() {
  let ast = parse_to_string(indoc! {"
    func add(a, b int) int {
      return a + b
    }
  "});
  let expected = indoc! {"
    ├─ Function (add) (a int, b int) int
    │  ╰─ Block
    │     ╰─ Return
    │        ╰─ Binary (+)
    │           ├─ Variable (a)
    │           ╰─ Variable (b)
  "};
  assert_eq!(ast, expected);

  let ast = parse_to_string(indoc! {"
    func divmod(a, b int) (int, int) {
      return a / b, a % b
    }
  "});
  assert!(ast.starts_with("├─ Function (divmod) (a int, b int) (int, int)\n"));

  let ast = parse_to_string("func hello() {}");
  assert_eq!(ast, "├─ Function (hello) ()\n│  ╰─ Block\n");
}

#[test]
fn function_literal() {
  let ast = parse_to_string("f := func(x int) int { return x }");
  let expected = indoc! {"
    ├─ Assignment (:=)
    │  ├─ Targets
    │  │  ╰─ Variable (f)
    │  ╰─ Values
    │     ╰─ Function (x int) int
    │        ╰─ Block
    │           ╰─ Return
    │              ╰─ Variable (x)
  "};
  assert_eq!(ast, expected);
}

#[test]
fn parameters() {
  assert!(parse("func f(int, string) {}").is_ok());
  assert!(parse("func f(a int, b string) {}").is_ok());
  assert!(parse("func f(a, b, c int) {}").is_ok());
  assert!(parse("func f() (result int) { return 1 }").is_ok());

  // either every parameter has a name, or none do
  assert!(parse("func f(a int, geometry.Metres) {}").is_err());
  assert!(parse("func f(a int, b) {}").is_err());
}

#[test]
fn unnamed_parameters_are_types() {
  let ast = parse_to_string("f := func(int, string) (float64, bool) {}");
  let expected = indoc! {"
    ├─ Assignment (:=)
    │  ├─ Targets
    │  │  ╰─ Variable (f)
    │  ╰─ Values
    │     ╰─ Function (int, string) (float64, bool)
    │        ╰─ Block
  "};
  assert_eq!(ast, expected);
}

#[test]
fn nested_function_declaration() {
  let source = indoc! {"
    func outer() {
      func inner() {}
    }
  "};
  assert!(parse(source).is_err());

  // a function literal is fine
  let source = indoc! {"
    func outer() {
      inner := func() {}
      inner()
    }
  "};
  assert!(parse(source).is_ok());
}

#[test]
fn return_outside_function() {
  assert!(parse("return 5").is_err());
  assert!(parse("func f() { return }").is_ok());
}

#[test]
fn if_statement() {
  let ast = parse_to_string(indoc! {"
    if x := 1; x > 0 {
      println(x)
    } else {
      println(0)
    }
  "});
  let expected = indoc! {"
    ├─ If
    │  ├─ Initialiser
    │  │  ╰─ Assignment (:=)
    │  │     ├─ Targets
    │  │     │  ╰─ Variable (x)
    │  │     ╰─ Values
    │  │        ╰─ Integer (1)
    │  ├─ Condition
    │  │  ╰─ Binary (>)
    │  │     ├─ Variable (x)
    │  │     ╰─ Integer (0)
    │  ├─ Then
    │  │  ╰─ Block
    │  │     ╰─ Call
    │  │        ├─ Callee
    │  │        │  ╰─ Variable (println)
    │  │        ╰─ Arguments
    │  │           ╰─ Variable (x)
    │  ╰─ Otherwise
    │     ╰─ Block
    │        ╰─ Call
    │           ├─ Callee
    │           │  ╰─ Variable (println)
    │           ╰─ Arguments
    │              ╰─ Integer (0)
  "};
  assert_eq!(ast, expected);

  assert!(parse("if a { } else if b { } else { }").is_ok());
  assert!(parse("if a { }\nelse { }").is_err());
  assert!(parse("if { }").is_err());
  assert!(parse("if x := 1 { }").is_err());
}

#[test]
fn for_statement() {
  let ast = parse_to_string(indoc! {"
    for i := 0; i < 3; i++ {
      println(i)
    }
  "});
  let expected = indoc! {"
    ├─ For
    │  ├─ Initialiser
    │  │  ╰─ Assignment (:=)
    │  │     ├─ Targets
    │  │     │  ╰─ Variable (i)
    │  │     ╰─ Values
    │  │        ╰─ Integer (0)
    │  ├─ Condition
    │  │  ╰─ Binary (<)
    │  │     ├─ Variable (i)
    │  │     ╰─ Integer (3)
    │  ├─ Post
    │  │  ╰─ IncrementDecrement (++)
    │  │     ╰─ Variable (i)
    │  ╰─ Block
    │     ╰─ Call
    │        ├─ Callee
    │        │  ╰─ Variable (println)
    │        ╰─ Arguments
    │           ╰─ Variable (i)
  "};
  assert_eq!(ast, expected);

  let ast = parse_to_string("for { break }");
  assert_eq!(ast, "├─ For\n│  ╰─ Block\n│     ╰─ Break\n");

  let ast = parse_to_string("for x < 3 { continue }");
  let expected = indoc! {"
    ├─ For
    │  ├─ Condition
    │  │  ╰─ Binary (<)
    │  │     ├─ Variable (x)
    │  │     ╰─ Integer (3)
    │  ╰─ Block
    │     ╰─ Continue
  "};
  assert_eq!(ast, expected);

  assert!(parse("for ;; { }").is_ok());
  assert!(parse("for i := 0; i < 3 { }").is_err());
}

#[test]
fn imports_and_packages() {
  let ast = parse_to_string("package main\nimport \"maths\"");
  assert_eq!(ast, "├─ Package (main)\n├─ Import (\"maths\")\n");

  let ast = parse_to_string(indoc! {r#"
    import (
      "strings"
      `geometry/shapes`
    )
  "#});
  assert_eq!(ast, "├─ Import (\"strings\", \"geometry/shapes\")\n");

  assert!(parse("import maths").is_err());
  assert!(parse("func f() {\n  import \"maths\"\n}").is_err());
  assert!(parse("{\n  package main\n}").is_err());
}

#[test]
fn import_helpers() {
  let ast = parse("import \"maths\"\nmaths.Double(2)");
  assert!(ast.starts_with_import());
  assert_eq!(ast.package_name(), None);

  let ast = parse("package shapes\n\nfunc Area() int { return 1 }");
  assert!(!ast.starts_with_import());
  assert_eq!(ast.package_name(), Some("shapes"));
}

#[test]
fn block_statement() {
  let ast = parse_to_string("{\n  x := 1\n}");
  let expected = indoc! {"
    ├─ Block
    │  ╰─ Assignment (:=)
    │     ├─ Targets
    │     │  ╰─ Variable (x)
    │     ╰─ Values
    │        ╰─ Integer (1)
  "};
  assert_eq!(ast, expected);

  assert!(parse("{\n  x := 1\n").is_err());
}

#[test]
fn recovers_after_errors() {
  let ast = parse("x := )\ny := 2\n$");

  assert_eq!(ast.errors.len(), 2);
  assert_eq!(ast.root_statements.len(), 1);
  assert_eq!(ast.errors[0].title(), "Expected Expression");
  assert_eq!(ast.errors[1].title(), "Unknown Character");
}

#[test]
fn error_spans() {
  let ast = parse("x := 1 +");
  let error = &ast.errors[0];
  assert_eq!(error.title(), "Expected Expression");
  assert_eq!(error.span().start, 8);

  let ast = parse("y := \"abc");
  let error = &ast.errors[0];
  assert_eq!(error.title(), "Unterminated String");
  assert_eq!(error.span(), crate::Span::new(5, 9));
  assert_eq!(error.full_message(), "Unterminated String\nmissing closing quote for string");
}
