//! Domain models for the prophylaxis efficacy engine.

mod analysis;
mod evidence;
mod records;

pub use analysis::*;
pub use evidence::*;
pub use records::*;
