/// Vertex layout could not be bound to the program.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    #[error("attribute `{name}` is not an input of the vertex stage")]
    UnknownAttribute { name: String },

    #[error("attribute `{name}` has {float_count} floats; 1 to 4 are supported")]
    UnsupportedFloatCount { name: String, float_count: u32 },

    #[error("attribute `{name}` is not a 32-bit float input of the vertex stage")]
    NotFloat { name: String },

    #[error("attribute `{name}` supplies {float_count} floats but the vertex stage reads {shader_components}")]
    ComponentMismatch {
        name: String,
        float_count: u32,
        shader_components: u8,
    },

    #[error("vertex input `{name}` at location {location} has no attribute bound to it")]
    UnboundInput { name: String, location: u32 },
}
