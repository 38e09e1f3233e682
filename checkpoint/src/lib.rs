mod error;
mod patch;

pub use error::CheckpointError;
pub use patch::*;
