//! # Bytecode
//!
//! Control flow is lowered to relative jumps when compiling, so a [`Chunk`] built for a
//! subexpression can be appended into any other chunk without being patched again.

use crate::{
  scope::Frame,
  thread::Runtime,
  types::{FunctionType, Type},
  universe::Builtin,
  value::Value,
};
use chicklet_syntax::{
  Span,
  ast::expression::{BinaryOperator, UnaryOperator},
};
use smartstring::alias::String as SmartString;
use std::{
  fmt,
  rc::{Rc, Weak},
};

/// A single instruction for the interpreter
#[derive(Clone, Debug)]
pub enum Instruction {
  /// Push a value onto the stack
  Constant(Value),
  /// Push the value of a local variable, from the frame `depth` functions out
  Load { depth: usize, slot: usize },
  /// Pop a value into a local variable, in the frame `depth` functions out
  Store { depth: usize, slot: usize },
  /// Push the value of a global variable
  LoadGlobal { frame: Weak<Frame>, slot: usize },
  /// Pop a value into a global variable
  StoreGlobal { frame: Weak<Frame>, slot: usize },
  /// Discard the top value of the stack
  Pop,
  /// Pop two values, and push the result of the operator
  Binary(BinaryOperator),
  /// Pop a value, and push the result of the operator
  Unary(UnaryOperator),
  /// Pop a value, and push it converted to the type
  Convert(Type),
  /// Skip forwards over a number of instructions
  Jump(usize),
  /// Pop a boolean, and skip forwards if it is false
  JumpIfFalse(usize),
  /// Skip forwards if the top of the stack is false, otherwise pop it
  JumpIfFalseOrPop(usize),
  /// Skip forwards if the top of the stack is true, otherwise pop it
  JumpIfTrueOrPop(usize),
  /// Go backwards a number of instructions
  Loop(usize),
  /// Call the function below the arguments on the stack
  Call { arguments: usize },
  /// Create a function value, capturing the current frame
  Closure(Rc<Prototype>),
  /// Call a builtin function with arguments from the stack
  Builtin(Builtin, usize),
  /// Return from the current function with the values in its result slots
  Return,
}

/// A sequence of instructions, with the location each came from
#[derive(Clone, Debug, Default)]
pub struct Chunk {
  instructions: Vec<Instruction>,
  spans: Vec<Span>,
}
impl Chunk {
  /// A chunk containing a single instruction
  pub fn single(instruction: Instruction, span: Span) -> Self {
    let mut chunk = Self::default();
    chunk.push(instruction, span);
    chunk
  }

  /// Adds an instruction to the end of the chunk
  pub fn push(&mut self, instruction: Instruction, span: Span) {
    self.instructions.push(instruction);
    self.spans.push(span);
  }

  /// Adds all the instructions from another chunk to the end of this one
  pub fn append(&mut self, other: Chunk) {
    self.instructions.extend(other.instructions);
    self.spans.extend(other.spans);
  }

  /// The number of instructions
  pub fn len(&self) -> usize {
    self.instructions.len()
  }

  /// Are there no instructions?
  pub fn is_empty(&self) -> bool {
    self.instructions.is_empty()
  }

  /// The instruction at an index
  pub fn get(&self, index: usize) -> Option<&Instruction> {
    self.instructions.get(index)
  }

  /// The location of the instruction at an index
  pub fn span(&self, index: usize) -> Span {
    self.spans.get(index).copied().unwrap_or_default()
  }

  /// Adds a forward jump, whose target is set later with [`Chunk::patch_jump`]
  pub fn add_jump(&mut self, jump: fn(usize) -> Instruction, span: Span) -> Jump {
    self.push(jump(0), span);
    Jump(self.len() - 1)
  }

  /// Sets a forward jump to land at the end of the chunk
  pub fn patch_jump(&mut self, jump: Jump) {
    let distance = self.len() - jump.0 - 1;

    if let Some(
      Instruction::Jump(offset)
      | Instruction::JumpIfFalse(offset)
      | Instruction::JumpIfFalseOrPop(offset)
      | Instruction::JumpIfTrueOrPop(offset),
    ) = self.instructions.get_mut(jump.0)
    {
      *offset = distance;
    }
  }

  /// Adds a backward jump to the instruction at `start`
  pub fn add_loop(&mut self, start: usize, span: Span) {
    let distance = self.len() + 1 - start;
    self.push(Instruction::Loop(distance), span);
  }
}

/// The location of a jump which has not yet been patched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Jump(usize);

/// A compiled function, which closures are created from
pub struct Prototype {
  /// The name of the function, empty for the top level of a unit
  pub name: SmartString,
  /// The signature of the function
  pub ty: Rc<FunctionType>,
  /// How deeply the function is nested within other functions
  pub level: usize,
  /// The number of slots its frame needs
  pub frame_size: usize,
  /// The values the result slots start with
  pub zero_outputs: Vec<Value>,
  /// The body of the function
  pub chunk: Chunk,
  /// Where the function was defined
  pub span: Span,
  /// Shared state of the world the function was compiled in
  pub runtime: Rc<Runtime>,
}
impl Prototype {
  /// The number of parameters
  #[must_use]
  pub fn inputs(&self) -> usize {
    self.ty.inputs.len()
  }

  /// The number of results
  #[must_use]
  pub fn outputs(&self) -> usize {
    self.ty.outputs.len()
  }

  /// Does the function read variables from an enclosing function?
  #[must_use]
  pub fn captures(&self) -> bool {
    self.level > 0
  }
}
impl fmt::Debug for Prototype {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Prototype")
      .field("name", &self.name)
      .field("ty", &self.ty)
      .field("frame_size", &self.frame_size)
      .finish_non_exhaustive()
  }
}

/// A function value created from source, with the frame it was created in
#[derive(Debug)]
pub struct Closure {
  /// The compiled function
  pub prototype: Rc<Prototype>,
  /// The frame of the enclosing function
  pub outer: Option<Rc<Frame>>,
}
