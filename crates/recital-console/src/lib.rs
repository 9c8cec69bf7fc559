//! Recital console crate - platform key input and the external audio player.

pub mod key_reader;
pub mod player;

pub use key_reader::{decode_key, TerminalKeyReader};
pub use player::CommandPlayer;
