//! # Thread
//!
//! Executes compiled instructions. Each run of a [`Code`] or call of a function from the host
//! gets a fresh [`Thread`], which is dropped once it finishes.
//!
//! Calls between interpreted functions are kept on an explicit call stack instead of the
//! native stack, so deep recursion is caught as a fault instead of crashing the host.

use crate::{
  bytecode::{Closure, Instruction, Prototype},
  config::Config,
  error::{Fault, RuntimeError, TraceLocation},
  scope::Frame,
  types::Type,
  universe::Builtin,
  value::{FunctionValue, Value},
};
use std::{
  cell::RefCell,
  fmt,
  io::{self, Write as _},
  mem,
  rc::{Rc, Weak},
};

/// State shared by everything compiled in the same world
pub struct Runtime {
  pub(crate) config: Config,
  pub(crate) output: RefCell<Box<dyn io::Write>>,
}
impl Runtime {
  pub(crate) fn new(config: Config) -> Self {
    Self {
      config,
      output: RefCell::new(Box::new(io::stdout())),
    }
  }
}
impl fmt::Debug for Runtime {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Runtime")
      .field("config", &self.config)
      .finish_non_exhaustive()
  }
}

/// What a [`Code`] unit produces when it is run
#[derive(Clone, Debug, PartialEq)]
pub enum CodeKind {
  /// Declarations, which produce no values
  Declarations,
  /// Statements, which produce no values
  Statements,
  /// A single expression, producing values of the type
  Expression(Type),
  /// A constant expression, already evaluated when compiling
  Constant(Type, Value),
  /// A package, whose declarations already ran when it was loaded
  Package,
}

/// A compiled unit which can be run many times.
///
/// Every run gets a fresh frame, but global variables live in the frames of their scopes so
/// changes to them persist between runs.
#[derive(Clone, Debug)]
pub struct Code {
  kind: CodeKind,
  entry: Rc<Prototype>,
}
impl Code {
  pub(crate) fn new(kind: CodeKind, entry: Rc<Prototype>) -> Self {
    Self { kind, entry }
  }

  /// What the code produces
  #[must_use]
  pub fn kind(&self) -> &CodeKind {
    &self.kind
  }

  /// The type of the value the code produces, if it is an expression
  #[must_use]
  pub fn ty(&self) -> Option<&Type> {
    match &self.kind {
      CodeKind::Expression(ty) | CodeKind::Constant(ty, _) => Some(ty),
      CodeKind::Declarations | CodeKind::Statements | CodeKind::Package => None,
    }
  }

  /// Executes the code, returning the values it produces.
  ///
  /// # Errors
  /// If a runtime fault happens.
  pub fn run(&self) -> Result<Vec<Value>, RuntimeError> {
    match &self.kind {
      CodeKind::Constant(_, value) => Ok(vec![value.clone()]),
      CodeKind::Package => Ok(Vec::new()),
      CodeKind::Declarations | CodeKind::Statements | CodeKind::Expression(_) => {
        Thread::new(Rc::clone(&self.entry.runtime)).run(&self.entry)
      }
    }
  }
}

#[derive(Debug)]
struct CallFrame {
  prototype: Rc<Prototype>,
  pc: usize,
  frame: Rc<Frame>,
}

/// An execution cursor for a single run or call
pub struct Thread {
  runtime: Rc<Runtime>,
  stack: Vec<Value>,
  calls: Vec<CallFrame>,
}
impl Thread {
  /// A thread for running code compiled in a world
  #[must_use]
  pub fn new(runtime: Rc<Runtime>) -> Self {
    Self {
      runtime,
      stack: Vec::with_capacity(64),
      calls: Vec::with_capacity(8),
    }
  }

  /// Runs the top level of a compiled unit in a new frame.
  ///
  /// # Errors
  /// If a runtime fault happens.
  pub fn run(mut self, prototype: &Rc<Prototype>) -> Result<Vec<Value>, RuntimeError> {
    self.calls.push(CallFrame {
      prototype: Rc::clone(prototype),
      pc: 0,
      frame: Rc::new(Frame::new(prototype.frame_size, None)),
    });

    self.try_execute()
  }

  /// Calls an interpreted function, returning the values in its result slots.
  ///
  /// # Errors
  /// If a runtime fault happens.
  pub fn call(
    mut self,
    closure: &Rc<Closure>,
    arguments: Vec<Value>,
  ) -> Result<Vec<Value>, RuntimeError> {
    tracing::trace!(function = %closure.prototype.name, "calling from host");

    if let Err(fault) = self.push_call(closure, arguments) {
      return Err(self.fault(fault));
    }

    self.try_execute()
  }

  /// The fault boundary, turning a fault into an error with a traceback
  fn try_execute(mut self) -> Result<Vec<Value>, RuntimeError> {
    self.execute().map_err(|fault| {
      tracing::debug!(%fault, "runtime fault");
      self.fault(fault)
    })
  }

  fn fault(&self, fault: Fault) -> RuntimeError {
    let traceback = (self.calls.iter().rev())
      .map(|call| TraceLocation {
        name: call.prototype.name.clone(),
        span: call.prototype.chunk.span(call.pc.saturating_sub(1)),
      })
      .collect();

    RuntimeError { fault, traceback }
  }

  fn push_call(&mut self, closure: &Rc<Closure>, arguments: Vec<Value>) -> Result<(), Fault> {
    let max_call_depth = self.runtime.config.max_call_depth;
    if self.calls.len() >= max_call_depth {
      return Err(Fault::StackOverflow(max_call_depth));
    }

    let prototype = &closure.prototype;
    let frame = Frame::new(prototype.frame_size, closure.outer.clone());
    for (index, value) in arguments.into_iter().enumerate() {
      frame.store(index, value);
    }
    for (index, value) in prototype.zero_outputs.iter().enumerate() {
      frame.store(prototype.inputs() + index, value.clone());
    }

    self.calls.push(CallFrame {
      prototype: Rc::clone(prototype),
      pc: 0,
      frame: Rc::new(frame),
    });

    Ok(())
  }

  fn pop(&mut self) -> Result<Value, Fault> {
    self.stack.pop().ok_or(Fault::TypeAssertion { expected: "value" })
  }

  fn pop_bool(&mut self) -> Result<bool, Fault> {
    match self.pop()? {
      Value::Bool(value) => Ok(value),
      _ => Err(Fault::TypeAssertion { expected: "bool" }),
    }
  }

  fn peek_bool(&self) -> Result<bool, Fault> {
    match self.stack.last() {
      Some(Value::Bool(value)) => Ok(*value),
      _ => Err(Fault::TypeAssertion { expected: "bool" }),
    }
  }

  fn pop_many(&mut self, count: usize) -> Vec<Value> {
    let start = self.stack.len().saturating_sub(count);
    self.stack.split_off(start)
  }

  fn execute(&mut self) -> Result<Vec<Value>, Fault> {
    loop {
      let Some(call) = self.calls.last_mut() else {
        return Ok(mem::take(&mut self.stack));
      };
      let prototype = Rc::clone(&call.prototype);
      let frame = Rc::clone(&call.frame);
      let pc = call.pc;
      call.pc += 1;

      let Some(instruction) = prototype.chunk.get(pc) else {
        // the end of a top level unit, functions always end with a return
        self.calls.pop();
        return Ok(mem::take(&mut self.stack));
      };

      match instruction {
        Instruction::Constant(value) => self.stack.push(value.clone()),
        Instruction::Load { depth, slot } => {
          let frame = frame.ancestor(*depth).ok_or(Fault::Uninitialised)?;
          self.stack.push(frame.load(*slot)?);
        }
        Instruction::Store { depth, slot } => {
          let value = self.pop()?;
          let frame = frame.ancestor(*depth).ok_or(Fault::Uninitialised)?;
          frame.store(*slot, value);
        }
        Instruction::LoadGlobal { frame, slot } => {
          let frame = upgrade(frame)?;
          self.stack.push(frame.load(*slot)?);
        }
        Instruction::StoreGlobal { frame, slot } => {
          let value = self.pop()?;
          upgrade(frame)?.store(*slot, value);
        }
        Instruction::Pop => {
          self.pop()?;
        }
        Instruction::Binary(operator) => {
          let right = self.pop()?;
          let left = self.pop()?;
          self.stack.push(left.binary(*operator, &right)?);
        }
        Instruction::Unary(operator) => {
          let value = self.pop()?;
          self.stack.push(value.unary(*operator)?);
        }
        Instruction::Convert(ty) => {
          let value = self.pop()?;
          self.stack.push(value.convert(ty)?);
        }
        Instruction::Jump(offset) => self.jump(*offset),
        Instruction::JumpIfFalse(offset) => {
          if !self.pop_bool()? {
            self.jump(*offset);
          }
        }
        Instruction::JumpIfFalseOrPop(offset) => {
          if self.peek_bool()? {
            self.pop()?;
          } else {
            self.jump(*offset);
          }
        }
        Instruction::JumpIfTrueOrPop(offset) => {
          if self.peek_bool()? {
            self.jump(*offset);
          } else {
            self.pop()?;
          }
        }
        Instruction::Loop(offset) => {
          if let Some(call) = self.calls.last_mut() {
            call.pc -= offset;
          }
        }
        Instruction::Call { arguments } => {
          let arguments = self.pop_many(*arguments);
          match self.pop()? {
            Value::Function(Some(FunctionValue::Interpreted(closure))) => {
              tracing::trace!(function = %closure.prototype.name, "call");
              self.push_call(&closure, arguments)?;
            }
            Value::Function(Some(FunctionValue::Native(native))) => {
              let results = native.call(&arguments)?;
              self.stack.extend(results);
            }
            Value::Function(None) => return Err(Fault::NilFunctionCall),
            _ => return Err(Fault::TypeAssertion { expected: "func" }),
          }
        }
        Instruction::Closure(prototype) => {
          let outer = prototype.captures().then_some(frame);
          let closure = Closure {
            prototype: Rc::clone(prototype),
            outer,
          };
          let function = FunctionValue::Interpreted(Rc::new(closure));
          self.stack.push(Value::Function(Some(function)));
        }
        Instruction::Builtin(builtin, arguments) => {
          let arguments = self.pop_many(*arguments);
          if let Some(result) = self.builtin(*builtin, &arguments)? {
            self.stack.push(result);
          }
        }
        Instruction::Return => {
          let results = frame.slice(prototype.inputs(), prototype.outputs());
          self.calls.pop();

          if self.calls.is_empty() {
            return Ok(results);
          }
          self.stack.extend(results);
        }
      }
    }
  }

  fn jump(&mut self, offset: usize) {
    if let Some(call) = self.calls.last_mut() {
      call.pc += offset;
    }
  }

  fn builtin(&self, builtin: Builtin, arguments: &[Value]) -> Result<Option<Value>, Fault> {
    match (builtin, arguments) {
      (Builtin::Len, [Value::String(string)]) => {
        let length = i64::try_from(string.len()).unwrap_or(i64::MAX);
        Ok(Some(Value::Int(length)))
      }
      (Builtin::Len, _) => Err(Fault::TypeAssertion { expected: "string" }),
      (Builtin::Println, arguments) => {
        let line = (arguments.iter())
          .map(ToString::to_string)
          .collect::<Vec<_>>()
          .join(" ");

        let mut output = self.runtime.output.borrow_mut();
        writeln!(output, "{line}").map_err(|error| Fault::Output(error.to_string()))?;
        Ok(None)
      }
      (Builtin::Panic, arguments) => {
        let message = (arguments.first())
          .map(ToString::to_string)
          .unwrap_or_default();
        Err(Fault::Panic(message))
      }
    }
  }
}

fn upgrade(frame: &Weak<Frame>) -> Result<Rc<Frame>, Fault> {
  frame.upgrade().ok_or(Fault::WorldDropped)
}
