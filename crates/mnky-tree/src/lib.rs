//! mnky document tree contract
//!
//! Defines what commands need from the live document they mutate: node
//! navigation, string-addressed property access, and the undo records a
//! mutation leaves behind.

pub mod memory;
pub mod node;
pub mod selector;
pub mod undo;

pub use memory::MemoryTree;
pub use node::{NodeId, NodeKind, Tree};
pub use selector::Selector;
pub use undo::{undo_all, UndoRecord};

/// Property holding the text of a form field or text node in the editor's
/// testing pane.
pub const DEFAULT_PROPERTY: &str = "value";
