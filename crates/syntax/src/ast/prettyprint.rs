//! Pretty-print the AST into a human readable format.
//!
//! Based upon this [blog post](https://www.georgevreilly.com/blog/2023/01/24/TreeInRust2PrintingTrees.html)

use super::{AST, expression::*, statement::*, types::*};
use std::fmt;

impl fmt::Display for AST {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    for statement in &self.root_statements {
      statement.pretty(f, self, "", false)?;
    }

    Ok(())
  }
}

const OTHER_CHILD: &str = "│  ";
const OTHER_ENTRY: &str = "├─ ";
const FINAL_CHILD: &str = "   ";
const FINAL_ENTRY: &str = "╰─ ";

pub trait PrettyPrint {
  fn pretty(&self, f: &mut fmt::Formatter, ast: &AST, prefix: &str, last: bool) -> fmt::Result;
}

fn connector(last: bool) -> &'static str {
  if last { FINAL_ENTRY } else { OTHER_ENTRY }
}

fn child_prefix(prefix: &str, last: bool) -> String {
  format!("{prefix}{}", if last { FINAL_CHILD } else { OTHER_CHILD })
}

/// Print a list of children, marking the final one
fn pretty_list<'a, T: PrettyPrint + 'a>(
  f: &mut fmt::Formatter,
  ast: &AST,
  prefix: &str,
  items: impl ExactSizeIterator<Item = &'a T>,
) -> fmt::Result {
  let length = items.len();
  for (index, item) in items.enumerate() {
    item.pretty(f, ast, prefix, index + 1 == length)?;
  }

  Ok(())
}

/// Print a labelled section, with its children indented beneath
fn pretty_section<'a, T: PrettyPrint + 'a>(
  f: &mut fmt::Formatter,
  ast: &AST,
  prefix: &str,
  last: bool,
  label: &str,
  items: impl ExactSizeIterator<Item = &'a T>,
) -> fmt::Result {
  writeln!(f, "{prefix}{}{label}", connector(last))?;
  pretty_list(f, ast, &child_prefix(prefix, last), items)
}

impl PrettyPrint for Expression {
  fn pretty(&self, f: &mut fmt::Formatter, ast: &AST, prefix: &str, last: bool) -> fmt::Result {
    match self {
      Self::Binary(x) => x.pretty(f, ast, prefix, last),
      Self::Call(x) => x.pretty(f, ast, prefix, last),
      Self::Function(x) => x.pretty(f, ast, prefix, last),
      Self::Group(x) => x.pretty(f, ast, prefix, last),
      Self::Literal(x) => x.pretty(f, ast, prefix, last),
      Self::Selector(x) => x.pretty(f, ast, prefix, last),
      Self::String(x) => x.pretty(f, ast, prefix, last),
      Self::Unary(x) => x.pretty(f, ast, prefix, last),
      Self::Variable(x) => x.pretty(f, ast, prefix, last),
    }
  }
}
impl PrettyPrint for Binary {
  fn pretty(&self, f: &mut fmt::Formatter, ast: &AST, prefix: &str, last: bool) -> fmt::Result {
    writeln!(f, "{prefix}{}Binary ({})", connector(last), self.operator(ast))?;

    let new_prefix = child_prefix(prefix, last);
    self.left(ast).pretty(f, ast, &new_prefix, false)?;
    self.right(ast).pretty(f, ast, &new_prefix, true)
  }
}
impl PrettyPrint for Call {
  fn pretty(&self, f: &mut fmt::Formatter, ast: &AST, prefix: &str, last: bool) -> fmt::Result {
    writeln!(f, "{prefix}{}Call", connector(last))?;

    let prefix = child_prefix(prefix, last);
    let has_arguments = self.arguments(ast).len() > 0;

    writeln!(f, "{prefix}{}Callee", connector(!has_arguments))?;
    let callee_prefix = child_prefix(&prefix, !has_arguments);
    self.callee(ast).pretty(f, ast, &callee_prefix, true)?;

    if has_arguments {
      pretty_section(f, ast, &prefix, true, "Arguments", self.arguments(ast))?;
    }

    Ok(())
  }
}
impl PrettyPrint for Function {
  fn pretty(&self, f: &mut fmt::Formatter, ast: &AST, prefix: &str, last: bool) -> fmt::Result {
    writeln!(
      f,
      "{prefix}{}Function {}",
      connector(last),
      SignatureDisplay(&self.signature, ast)
    )?;

    self.body.pretty(f, ast, &child_prefix(prefix, last), true)
  }
}
impl PrettyPrint for Group {
  fn pretty(&self, f: &mut fmt::Formatter, ast: &AST, prefix: &str, last: bool) -> fmt::Result {
    writeln!(f, "{prefix}{}Group", connector(last))?;

    self
      .expression(ast)
      .pretty(f, ast, &child_prefix(prefix, last), true)
  }
}
impl PrettyPrint for Literal {
  fn pretty(&self, f: &mut fmt::Formatter, ast: &AST, prefix: &str, last: bool) -> fmt::Result {
    let kind = match self.kind(ast) {
      LiteralKind::Integer => "Integer",
      LiteralKind::Float => "Float",
    };

    writeln!(f, "{prefix}{}{kind} ({})", connector(last), self.text(ast))
  }
}
impl PrettyPrint for Selector {
  fn pretty(&self, f: &mut fmt::Formatter, ast: &AST, prefix: &str, last: bool) -> fmt::Result {
    writeln!(f, "{prefix}{}Selector (.{})", connector(last), self.member(ast))?;

    self
      .expression(ast)
      .pretty(f, ast, &child_prefix(prefix, last), true)
  }
}
impl PrettyPrint for StringLiteral {
  fn pretty(&self, f: &mut fmt::Formatter, _: &AST, prefix: &str, last: bool) -> fmt::Result {
    writeln!(f, "{prefix}{}String {:?}", connector(last), self.value())
  }
}
impl PrettyPrint for Unary {
  fn pretty(&self, f: &mut fmt::Formatter, ast: &AST, prefix: &str, last: bool) -> fmt::Result {
    writeln!(f, "{prefix}{}Unary ({})", connector(last), self.operator(ast))?;

    self
      .expression(ast)
      .pretty(f, ast, &child_prefix(prefix, last), true)
  }
}
impl PrettyPrint for Variable {
  fn pretty(&self, f: &mut fmt::Formatter, ast: &AST, prefix: &str, last: bool) -> fmt::Result {
    writeln!(f, "{prefix}{}Variable ({})", connector(last), self.name(ast))
  }
}

impl PrettyPrint for Statement {
  fn pretty(&self, f: &mut fmt::Formatter, ast: &AST, prefix: &str, last: bool) -> fmt::Result {
    match self {
      Self::Assignment(x) => x.pretty(f, ast, prefix, last),
      Self::Block(x) => x.pretty(f, ast, prefix, last),
      Self::Break(_) => writeln!(f, "{prefix}{}Break", connector(last)),
      Self::Const(x) => x.pretty_declaration(f, ast, prefix, last, "Const"),
      Self::Continue(_) => writeln!(f, "{prefix}{}Continue", connector(last)),
      Self::Expression(x) => x.expression(ast).pretty(f, ast, prefix, last),
      Self::For(x) => x.pretty(f, ast, prefix, last),
      Self::Function(x) => x.pretty(f, ast, prefix, last),
      Self::If(x) => x.pretty(f, ast, prefix, last),
      Self::Import(x) => x.pretty(f, ast, prefix, last),
      Self::IncrementDecrement(x) => x.pretty(f, ast, prefix, last),
      Self::Package(x) => writeln!(f, "{prefix}{}Package ({})", connector(last), x.name(ast)),
      Self::Return(x) => x.pretty(f, ast, prefix, last),
      Self::Type(x) => writeln!(
        f,
        "{prefix}{}Type ({} = {})",
        connector(last),
        x.name(ast),
        TypeDisplay(x.type_(ast), ast)
      ),
      Self::Var(x) => x.pretty_declaration(f, ast, prefix, last, "Var"),
    }
  }
}
impl PrettyPrint for Assignment {
  fn pretty(&self, f: &mut fmt::Formatter, ast: &AST, prefix: &str, last: bool) -> fmt::Result {
    let operator = ast.get_token_text(self.operator);
    writeln!(f, "{prefix}{}Assignment ({operator})", connector(last))?;

    let prefix = child_prefix(prefix, last);
    pretty_section(f, ast, &prefix, false, "Targets", self.targets(ast))?;
    pretty_section(f, ast, &prefix, true, "Values", self.values(ast))
  }
}
impl PrettyPrint for Block {
  fn pretty(&self, f: &mut fmt::Formatter, ast: &AST, prefix: &str, last: bool) -> fmt::Result {
    pretty_section(f, ast, prefix, last, "Block", self.statements(ast))
  }
}
impl ValueDeclaration {
  fn pretty_declaration(
    &self,
    f: &mut fmt::Formatter,
    ast: &AST,
    prefix: &str,
    last: bool,
    keyword: &str,
  ) -> fmt::Result {
    let names: Vec<_> = self.names(ast).map(|(name, _)| name).collect();
    write!(f, "{prefix}{}{keyword} ({})", connector(last), names.join(", "))?;
    if let Some(type_) = self.type_(ast) {
      write!(f, ": {}", TypeDisplay(type_, ast))?;
    }
    writeln!(f)?;

    pretty_list(f, ast, &child_prefix(prefix, last), self.values(ast))
  }
}
impl PrettyPrint for For {
  fn pretty(&self, f: &mut fmt::Formatter, ast: &AST, prefix: &str, last: bool) -> fmt::Result {
    writeln!(f, "{prefix}{}For", connector(last))?;

    let prefix = child_prefix(prefix, last);
    let section_prefix = child_prefix(&prefix, false);

    if let Some(initialiser) = self.initialiser(ast) {
      writeln!(f, "{prefix}{OTHER_ENTRY}Initialiser")?;
      initialiser.pretty(f, ast, &section_prefix, true)?;
    }
    if let Some(condition) = self.condition(ast) {
      writeln!(f, "{prefix}{OTHER_ENTRY}Condition")?;
      condition.pretty(f, ast, &section_prefix, true)?;
    }
    if let Some(post) = self.post(ast) {
      writeln!(f, "{prefix}{OTHER_ENTRY}Post")?;
      post.pretty(f, ast, &section_prefix, true)?;
    }

    self.body.pretty(f, ast, &prefix, true)
  }
}
impl PrettyPrint for FunctionDeclaration {
  fn pretty(&self, f: &mut fmt::Formatter, ast: &AST, prefix: &str, last: bool) -> fmt::Result {
    writeln!(
      f,
      "{prefix}{}Function ({}) {}",
      connector(last),
      self.name(ast),
      SignatureDisplay(&self.signature, ast)
    )?;

    self.body.pretty(f, ast, &child_prefix(prefix, last), true)
  }
}
impl PrettyPrint for If {
  fn pretty(&self, f: &mut fmt::Formatter, ast: &AST, prefix: &str, last: bool) -> fmt::Result {
    writeln!(f, "{prefix}{}If", connector(last))?;

    let prefix = child_prefix(prefix, last);
    let section_prefix = child_prefix(&prefix, false);
    let final_section_prefix = child_prefix(&prefix, true);

    if let Some(initialiser) = self.initialiser(ast) {
      writeln!(f, "{prefix}{OTHER_ENTRY}Initialiser")?;
      initialiser.pretty(f, ast, &section_prefix, true)?;
    }

    writeln!(f, "{prefix}{OTHER_ENTRY}Condition")?;
    self.condition(ast).pretty(f, ast, &section_prefix, true)?;

    if let Some(otherwise) = self.otherwise(ast) {
      writeln!(f, "{prefix}{OTHER_ENTRY}Then")?;
      self.then.pretty(f, ast, &section_prefix, true)?;

      writeln!(f, "{prefix}{FINAL_ENTRY}Otherwise")?;
      otherwise.pretty(f, ast, &final_section_prefix, true)
    } else {
      writeln!(f, "{prefix}{FINAL_ENTRY}Then")?;
      self.then.pretty(f, ast, &final_section_prefix, true)
    }
  }
}
impl PrettyPrint for Import {
  fn pretty(&self, f: &mut fmt::Formatter, ast: &AST, prefix: &str, last: bool) -> fmt::Result {
    let paths: Vec<_> = self.paths(ast).map(|(path, _)| format!("{path:?}")).collect();
    writeln!(f, "{prefix}{}Import ({})", connector(last), paths.join(", "))
  }
}
impl PrettyPrint for IncrementDecrement {
  fn pretty(&self, f: &mut fmt::Formatter, ast: &AST, prefix: &str, last: bool) -> fmt::Result {
    let operator = if self.is_increment(ast) { "++" } else { "--" };
    writeln!(f, "{prefix}{}IncrementDecrement ({operator})", connector(last))?;

    self
      .target(ast)
      .pretty(f, ast, &child_prefix(prefix, last), true)
  }
}
impl PrettyPrint for Return {
  fn pretty(&self, f: &mut fmt::Formatter, ast: &AST, prefix: &str, last: bool) -> fmt::Result {
    pretty_section(f, ast, prefix, last, "Return", self.values(ast))
  }
}

/// Display a type annotation on a single line
struct TypeDisplay<'a>(&'a Type, &'a AST);
impl fmt::Display for TypeDisplay<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let Self(type_, ast) = *self;

    match type_ {
      Type::Named(named) => write!(f, "{}", named.name(ast)),
      Type::Qualified(qualified) => write!(f, "{}.{}", qualified.package(ast), qualified.name(ast)),
      Type::Function(function) => write!(f, "func{}", SignatureDisplay(&function.signature, ast)),
      Type::Group(group) => write!(f, "({})", TypeDisplay(group.type_(ast), ast)),
    }
  }
}

/// Display a function signature on a single line
struct SignatureDisplay<'a>(&'a Signature, &'a AST);
impl fmt::Display for SignatureDisplay<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let Self(signature, ast) = *self;

    let write_parameters = |f: &mut fmt::Formatter<'_>, parameters: &[Parameter]| -> fmt::Result {
      for (index, parameter) in parameters.iter().enumerate() {
        if index > 0 {
          write!(f, ", ")?;
        }
        if let Some(name) = parameter.name(ast) {
          write!(f, "{name} ")?;
        }
        write!(f, "{}", TypeDisplay(parameter.type_(ast), ast))?;
      }
      Ok(())
    };

    write!(f, "(")?;
    write_parameters(f, signature.parameters())?;
    write!(f, ")")?;

    match signature.results() {
      [] => Ok(()),
      [result] if result.name.is_none() => write!(f, " {}", TypeDisplay(result.type_(ast), ast)),
      results => {
        write!(f, " (")?;
        write_parameters(f, results)?;
        write!(f, ")")
      }
    }
  }
}
