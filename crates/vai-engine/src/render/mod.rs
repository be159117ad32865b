//! The instanced rendering engine.
//!
//! Construction compiles the program, uploads the static quad and binds the
//! per-instance attributes for zero instances. Each [`Engine::render`] call
//! then rebinds if the instance count changed, packs the caller's chunks,
//! uploads them and issues a single instanced draw.

mod config;
mod engine;
mod error;

pub use config::{EngineConfig, MAX_VERTEX_BUFFERS};
pub use engine::{Engine, FrameOutcome};
pub use error::EngineError;
