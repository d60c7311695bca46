//! engine
//!
//! The command/undo/dispatch core.
//!
//! # Architecture
//!
//! ```text
//! trigger -> Context::dispatch(event, args)
//!         -> Factory: constructor(ctx, args) -> Box<dyn Command>
//!         -> Command::execute(ctx)            (may log on the bus, prompt)
//!         -> undoable? push Reversal onto the undo stack
//! ```
//!
//! Undo pops the most recent [`Reversal`] and reverts it.
//!
//! # Modules
//!
//! - [`bus`] - Notification bus and events
//! - [`command`] - The command protocol, undo records, failure policy
//! - [`factory`] - Dispatch table, undo stack, prompt hook, arguments
//! - [`context`] - The explicit context passed to every command
//! - [`prompt`] - The blocking prompt interface
//! - [`selection`] - The read-only selection interface
//! - [`launch`] - Starting external programs
//! - [`tool`] - Decision procedure for user-configured tools
//! - [`signals`] - Event names
//!
//! # Invariants
//!
//! - Single-threaded; shared state lives in `Rc`/`RefCell`
//! - No borrow is held across a call into a command, observer or prompter

pub mod bus;
pub mod command;
pub mod context;
pub mod factory;
pub mod launch;
pub mod prompt;
pub mod selection;
pub mod signals;
pub mod tool;

pub use bus::{Event, Notifier};
pub use command::{
    AmendMark, Command, CommandError, FailurePolicy, Outcome, Reversal, StateChange,
};
pub use context::Context;
pub use factory::{Arg, Args, Constructor, Factory};
pub use prompt::{Prompter, ScriptedPrompter, ToolArguments};
pub use selection::{Selection, StaticSelection};
