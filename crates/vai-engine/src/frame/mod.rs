//! Per-frame instance data.

mod instance;
mod packer;

pub use instance::RectInstance;
pub use packer::{check_capacity, FrameDataPacker, FrameOverflow};
