//! mnky - demo-masking configuration compiler
//!
//! Compiles configuration documents written in an INI-like DSL into
//! commands that rewrite a live document tree (text replacement, hiding,
//! styling, image and link swaps, request interception). Every change is
//! recorded so it can be reverted.

pub mod builder;
pub mod command;
pub mod configuration;
pub mod lint;
pub mod match_rule;
pub mod options;
pub mod repository;
pub mod settings;
pub mod variable;

pub use builder::{BuildError, CommandBuilder, Registry};
pub use command::{Command, CommandKind, CommandRef, UrlAction, UrlRequest};
pub use configuration::{CompileError, Configuration, Values};
pub use lint::{lint, Annotation, LintReport, Severity};
pub use match_rule::MatchRule;
pub use repository::{Repository, RepositoryError};
pub use settings::{EffectiveSettings, Settings, SettingsError};
pub use variable::{BoundVariable, Variable};

pub use mnky_ini::{ParseWarning, TemplateOptions};
pub use mnky_tree::{undo_all, MemoryTree, NodeId, Tree, UndoRecord};
