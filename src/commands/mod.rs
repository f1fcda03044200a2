//! Command implementations for ratescout CLI

mod extract;
mod misc;

pub use extract::*;
pub use misc::*;
