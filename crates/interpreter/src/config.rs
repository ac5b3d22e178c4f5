//! Configuration for running code

/// Configuration for a [`World`](crate::World)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
  /// The number of interpreted calls which can be active at once before a stack overflow
  pub max_call_depth: usize,
}
impl Default for Config {
  fn default() -> Self {
    Self {
      max_call_depth: 1024,
    }
  }
}
