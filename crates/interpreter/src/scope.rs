//! # Scope
//!
//! Lexical scopes map identifiers to their definitions, and decide where variables are stored.
//!
//! Global scopes (the universe, the world and each package) own a [`Frame`] which grows as
//! variables are defined, so globals keep the same slot between separate runs. Scopes within
//! a function share a [`FrameLayout`], which counts the slots needed so a fresh frame of the
//! right size can be created for every call.

use crate::{error::Fault, package::Package, types::Type, universe::Builtin, value::Value};
use chicklet_syntax::Span;
use rustc_hash::FxHashMap;
use smartstring::alias::String as SmartString;
use std::{
  cell::{Cell, RefCell},
  rc::{Rc, Weak},
};

/// What an identifier refers to
#[derive(Clone, Debug)]
pub enum Definition {
  /// A variable, stored in a slot of a frame
  Variable {
    /// The type of the variable
    ty: Type,
    /// Where the variable is stored
    slot: Slot,
    /// Can't be assigned to, such as a declared function
    readonly: bool,
  },
  /// A constant, known at compile time
  Constant {
    /// The type of the constant, possibly untyped
    ty: Type,
    /// The value of the constant
    value: Value,
  },
  /// A type
  Type(Type),
  /// An imported package
  Package(Rc<Package>),
  /// A builtin function
  Builtin(Builtin),
}

/// Where a variable is stored
#[derive(Clone, Debug)]
pub enum Slot {
  /// A slot in the frame of a global scope
  Global {
    /// The frame of the global scope
    frame: Weak<Frame>,
    /// The index of the slot
    index: usize,
  },
  /// A slot in the frame of a function call
  Local {
    /// How deeply nested the function is
    level: usize,
    /// The index of the slot
    index: usize,
  },
}

/// Attempted to define an identifier which already exists in the same scope
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RedefinitionError {
  /// The identifier
  pub name: SmartString,
  /// Where the identifier was first defined, if it was defined in source code
  pub previous: Option<Span>,
}

#[derive(Debug)]
enum Storage {
  Global(Rc<Frame>),
  Local(Rc<FrameLayout>),
}

/// A lexical block, mapping identifiers to definitions
#[derive(Debug)]
pub struct Scope {
  parent: Option<Rc<Scope>>,
  definitions: RefCell<FxHashMap<SmartString, (Definition, Option<Span>)>>,
  storage: Storage,
}
impl Scope {
  /// A global scope, which stores its variables immediately
  #[must_use]
  pub fn global(parent: Option<Rc<Scope>>) -> Rc<Self> {
    Rc::new(Self {
      parent,
      definitions: RefCell::default(),
      storage: Storage::Global(Rc::new(Frame::new(0, None))),
    })
  }

  /// A scope within a function, storing variables in slots of its frame layout
  #[must_use]
  pub fn local(parent: Rc<Scope>, layout: Rc<FrameLayout>) -> Rc<Self> {
    Rc::new(Self {
      parent: Some(parent),
      definitions: RefCell::default(),
      storage: Storage::Local(layout),
    })
  }

  /// Defines a variable, allocating a slot for it.
  ///
  /// In a global scope the slot is created straight away, holding the zero value of the type.
  ///
  /// # Errors
  /// If the name is already defined in this scope.
  pub fn define(
    &self,
    name: &str,
    ty: Type,
    readonly: bool,
    span: Option<Span>,
  ) -> Result<Slot, RedefinitionError> {
    self.check_undefined(name)?;

    let slot = match &self.storage {
      Storage::Global(frame) => Slot::Global {
        frame: Rc::downgrade(frame),
        index: frame.push(ty.zero()),
      },
      Storage::Local(layout) => Slot::Local {
        level: layout.level,
        index: layout.allocate(),
      },
    };

    let definition = Definition::Variable {
      ty,
      slot: slot.clone(),
      readonly,
    };
    self.insert_unchecked(name, definition, span);

    Ok(slot)
  }

  /// Defines a constant.
  ///
  /// # Errors
  /// If the name is already defined in this scope.
  pub fn define_const(
    &self,
    name: &str,
    ty: Type,
    value: Value,
    span: Option<Span>,
  ) -> Result<(), RedefinitionError> {
    self.insert(name, Definition::Constant { ty, value }, span)
  }

  /// Adds a definition which doesn't need storage, such as a type or package.
  ///
  /// # Errors
  /// If the name is already defined in this scope.
  pub fn insert(
    &self,
    name: &str,
    definition: Definition,
    span: Option<Span>,
  ) -> Result<(), RedefinitionError> {
    self.check_undefined(name)?;
    self.insert_unchecked(name, definition, span);
    Ok(())
  }

  /// Removes a definition from this scope, when a compilation is rolled back
  pub fn undefine(&self, name: &str) {
    self.definitions.borrow_mut().remove(name);
  }

  /// Finds the definition of an identifier, looking through the enclosing scopes
  #[must_use]
  pub fn lookup(&self, name: &str) -> Option<Definition> {
    match self.lookup_local(name) {
      Some(definition) => Some(definition),
      None => self.parent.as_ref()?.lookup(name),
    }
  }

  /// Finds the definition of an identifier in only this scope
  #[must_use]
  pub fn lookup_local(&self, name: &str) -> Option<Definition> {
    let definitions = self.definitions.borrow();
    definitions.get(name).map(|(definition, _)| definition.clone())
  }

  /// Is this scope global, storing variables immediately?
  #[must_use]
  pub fn is_global(&self) -> bool {
    matches!(self.storage, Storage::Global(_))
  }

  /// How deeply nested the function the scope belongs to is, or `None` for a global scope
  #[must_use]
  pub fn level(&self) -> Option<usize> {
    match &self.storage {
      Storage::Global(_) => None,
      Storage::Local(layout) => Some(layout.level),
    }
  }

  /// The frame of a global scope
  #[must_use]
  pub fn frame(&self) -> Option<&Rc<Frame>> {
    match &self.storage {
      Storage::Global(frame) => Some(frame),
      Storage::Local(_) => None,
    }
  }

  /// A new scope nested within this one, sharing its storage
  #[must_use]
  pub fn child(self: &Rc<Self>) -> Rc<Self> {
    match &self.storage {
      Storage::Global(_) => Self::global(Some(Rc::clone(self))),
      Storage::Local(layout) => Self::local(Rc::clone(self), Rc::clone(layout)),
    }
  }

  /// A frame with a slot for every variable a function's scopes have defined so far
  #[must_use]
  pub fn new_frame(&self, outer: Option<Rc<Frame>>) -> Rc<Frame> {
    match &self.storage {
      Storage::Global(frame) => Rc::clone(frame),
      Storage::Local(layout) => Rc::new(Frame::new(layout.size(), outer)),
    }
  }

  fn check_undefined(&self, name: &str) -> Result<(), RedefinitionError> {
    match self.definitions.borrow().get(name) {
      Some((_, previous)) => Err(RedefinitionError {
        name: name.into(),
        previous: *previous,
      }),
      None => Ok(()),
    }
  }

  fn insert_unchecked(&self, name: &str, definition: Definition, span: Option<Span>) {
    (self.definitions.borrow_mut()).insert(name.into(), (definition, span));
  }
}

/// Counts the slots a function needs for its parameters, results and variables.
///
/// Slots are never reused within a function, so closures created in a loop all share the
/// loop's variables.
#[derive(Debug)]
pub struct FrameLayout {
  level: usize,
  size: Cell<usize>,
}
impl FrameLayout {
  /// A layout for a function nested `level` functions deep
  #[must_use]
  pub fn new(level: usize) -> Self {
    Self {
      level,
      size: Cell::new(0),
    }
  }

  /// How deeply nested the function is
  #[must_use]
  pub fn level(&self) -> usize {
    self.level
  }

  /// The number of slots allocated
  #[must_use]
  pub fn size(&self) -> usize {
    self.size.get()
  }

  /// Allocates a new slot, returning its index
  pub fn allocate(&self) -> usize {
    let index = self.size.get();
    self.size.set(index + 1);
    index
  }
}

/// The storage for one activation of a function, or of a global scope.
///
/// Frames link to the frame of the function they were lexically declared in, not the frame
/// of the caller, so closures can reach their outer variables wherever they are called from.
#[derive(Debug)]
pub struct Frame {
  slots: RefCell<Vec<Option<Value>>>,
  outer: Option<Rc<Frame>>,
}
impl Frame {
  /// A frame with a number of empty slots
  #[must_use]
  pub fn new(size: usize, outer: Option<Rc<Frame>>) -> Self {
    Self {
      slots: RefCell::new(vec![None; size]),
      outer,
    }
  }

  /// Reads the value from a slot.
  ///
  /// # Errors
  /// If the slot doesn't hold a value yet.
  pub fn load(&self, index: usize) -> Result<Value, Fault> {
    let slots = self.slots.borrow();
    slots.get(index).cloned().flatten().ok_or(Fault::Uninitialised)
  }

  /// Writes a value into a slot
  pub fn store(&self, index: usize, value: Value) {
    let mut slots = self.slots.borrow_mut();
    if index >= slots.len() {
      slots.resize(index + 1, None);
    }
    slots[index] = Some(value);
  }

  /// Adds a new slot to the end of the frame, returning its index
  pub fn push(&self, value: Option<Value>) -> usize {
    let mut slots = self.slots.borrow_mut();
    slots.push(value);
    slots.len() - 1
  }

  /// The frame of a lexically enclosing function, `depth` levels out
  #[must_use]
  pub fn ancestor(self: &Rc<Self>, depth: usize) -> Option<Rc<Frame>> {
    let mut frame = Rc::clone(self);
    for _ in 0..depth {
      frame = Rc::clone(frame.outer.as_ref()?);
    }
    Some(frame)
  }

  /// Reads a range of slots, such as the results of a function
  #[must_use]
  pub fn slice(&self, start: usize, count: usize) -> Vec<Value> {
    let slots = self.slots.borrow();
    slots
      .iter()
      .skip(start)
      .take(count)
      .filter_map(Clone::clone)
      .collect()
  }
}
