//! CLI command implementations

pub mod context;
pub mod event;
pub mod run;
pub mod style;

pub use context::{CommandContext, ContextArgs};
pub use event::run_event;
pub use run::run_merge_pass;
