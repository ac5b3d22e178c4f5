//! # Chicklet Interpreter
//! Compiler and virtual machine for running Chicklet, a small statically typed language.
//!
//! Source is type checked and compiled to bytecode in a single pass, then run by a
//! [`Thread`]. Everything is compiled into a [`World`], which holds the global variables,
//! loaded packages and the functions the host has defined.
//!
//! # Examples
//! ```
//! use chicklet_interpreter::{HostValue, World};
//!
//! let mut world = World::new();
//! world.define("x", 12).unwrap();
//!
//! let code = world.compile("x * 2").unwrap();
//! assert_eq!(world.run(&code).unwrap(), vec![HostValue::Int(24)]);
//! ```

mod bridge;
mod bytecode;
mod compiler;
mod config;
mod error;
mod package;
mod scope;
mod thread;
mod types;
mod universe;
mod value;
mod world;

#[cfg(test)]
mod test;

pub use bridge::{HostFunction, HostResults, HostType, HostValue, IntoHostFunction, NativeFunction};
pub use bytecode::{Closure, Prototype};
pub use config::Config;
pub use error::{CallError, CompileError, ConvertError, Error, Fault, RuntimeError, TraceLocation};
pub use package::{MemoryResolver, Package, PackageResolver};
pub use scope::{Definition, Frame, FrameLayout, RedefinitionError, Scope, Slot};
pub use thread::{Code, CodeKind, Runtime, Thread};
pub use types::{FunctionType, NamedType, Type};
pub use universe::Builtin;
pub use value::{FunctionValue, Value};
pub use world::World;
