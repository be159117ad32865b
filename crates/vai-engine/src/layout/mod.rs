//! Instanced vertex layout.
//!
//! Slot 0 holds the static primitive (a quad as two triangles), advancing per
//! vertex. Every instance attribute then gets its own vertex buffer slot. All
//! instance buffers share one size and one stride (the whole interleaved
//! instance record); they differ only in the byte offset their attribute
//! reads from, and all of them advance once per instance.

mod attribute;
mod bind;
mod error;

pub use attribute::{
    default_instance_attributes, default_vertex_attribute, AttributeSpec, InstancedLayout, FLOAT_BYTES,
};
pub use bind::{
    bind_instanced, bind_primitive, check_coverage, vertex_buffer_layouts, AttributeBinding, InstancedBinding,
    PrimitiveBinding,
};
pub use error::LayoutError;

/// Base quad covering `[0, 1]²`: two triangles, six vertices of two floats.
pub const QUAD_VERTICES: [f32; 12] = [1.0, 0.0, 0.0, 1.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0];
