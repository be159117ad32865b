/// A vertex-stage input, reflected from the vertex entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderInput {
    pub name: String,
    pub location: u32,
    /// Component count for 32-bit float scalars/vectors, `None` for anything else.
    pub components: Option<u8>,
}

/// A compiled and linked shader program.
///
/// Only constructed by [`compile`](super::compile) once both stages validated
/// and their interfaces matched.
#[derive(Debug, Clone)]
pub struct ShaderProgram {
    pub(super) vertex_source: String,
    pub(super) fragment_source: String,
    pub(super) vertex_entry: String,
    pub(super) fragment_entry: String,
    pub(super) inputs: Vec<ShaderInput>,
}

impl ShaderProgram {
    /// Binding location of a named vertex input, or `None` when the vertex
    /// stage declares no such input.
    pub fn attribute_location(&self, name: &str) -> Option<u32> {
        self.input(name).map(|i| i.location)
    }

    pub fn input(&self, name: &str) -> Option<&ShaderInput> {
        self.inputs.iter().find(|i| i.name == name)
    }

    pub fn inputs(&self) -> &[ShaderInput] {
        &self.inputs
    }

    pub fn vertex_source(&self) -> &str {
        &self.vertex_source
    }

    pub fn fragment_source(&self) -> &str {
        &self.fragment_source
    }

    pub fn vertex_entry(&self) -> &str {
        &self.vertex_entry
    }

    pub fn fragment_entry(&self) -> &str {
        &self.fragment_entry
    }
}
