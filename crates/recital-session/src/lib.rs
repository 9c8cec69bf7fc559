//! Recital session crate - sentence segmentation, cursor persistence, audio
//! bookkeeping and the interactive state machine.
//!
//! The controller runs on one thread and blocks on a single operation at a
//! time: a key read, a synthesis request or a playback. Everything it talks
//! to outside the filesystem goes through the traits in `recital-core`.

pub mod audio;
pub mod command;
pub mod console;
pub mod controller;
pub mod position;
pub mod reconcile;
pub mod segment;
pub mod source;
pub mod state;

pub use audio::AudioStore;
pub use command::{Command, KEY_LEGEND};
pub use console::Console;
pub use controller::{
    Collaborators, ExitReason, SessionContext, SessionController, SessionStores, StartupSummary,
};
pub use position::PositionStore;
pub use reconcile::reconcile;
pub use segment::segment;
pub use source::SentenceSource;
pub use state::{SessionState, StateMachine};
