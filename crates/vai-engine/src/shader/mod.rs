//! Shader program compilation.
//!
//! A program is a pair of WGSL modules: one with a `@vertex` entry point and
//! one with a `@fragment` entry point. Compilation parses and validates each
//! module with naga, then "links" them by matching the fragment inputs against
//! the vertex outputs. The resulting [`ShaderProgram`] also carries the vertex
//! inputs by name so attribute locations can be looked up like a GL program.

mod compile;
mod error;
mod program;

pub use compile::compile;
pub use error::{ShaderError, ShaderStage};
pub use program::{ShaderInput, ShaderProgram};

/// Built-in rounded-rectangle shadow vertex stage.
pub const RECT_SHADOW_VERTEX: &str = include_str!("shaders/rect_shadow.vert.wgsl");

/// Built-in rounded-rectangle shadow fragment stage.
pub const RECT_SHADOW_FRAGMENT: &str = include_str!("shaders/rect_shadow.frag.wgsl");
