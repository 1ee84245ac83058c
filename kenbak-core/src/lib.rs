// Clippy rules to disable.
#![allow(clippy::new_without_default)]

pub mod asm;
pub mod constants;
pub mod decoder;
pub mod log;
pub mod machine;
pub mod memory;
pub mod output;
pub mod signals;
pub mod state;
pub mod state_machine;

pub use machine::Machine;
pub use signals::{Input, Output};
