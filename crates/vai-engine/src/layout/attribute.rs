use super::LayoutError;

/// Bytes per attribute component. Every attribute is made of 32-bit floats.
pub const FLOAT_BYTES: u64 = 4;

/// One named attribute and how many floats it occupies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSpec {
    pub name: String,
    pub float_count: u32,
}

impl AttributeSpec {
    pub fn new(name: impl Into<String>, float_count: u32) -> Self {
        Self { name: name.into(), float_count }
    }

    #[inline]
    pub fn byte_len(&self) -> u64 {
        FLOAT_BYTES * self.float_count as u64
    }

    pub(crate) fn vertex_format(&self) -> Result<wgpu::VertexFormat, LayoutError> {
        match self.float_count {
            1 => Ok(wgpu::VertexFormat::Float32),
            2 => Ok(wgpu::VertexFormat::Float32x2),
            3 => Ok(wgpu::VertexFormat::Float32x3),
            4 => Ok(wgpu::VertexFormat::Float32x4),
            n => Err(LayoutError::UnsupportedFloatCount {
                name: self.name.clone(),
                float_count: n,
            }),
        }
    }
}

/// Per-instance attributes of the built-in shader: box, color, corner, window, sigma.
pub fn default_instance_attributes() -> Vec<AttributeSpec> {
    vec![
        AttributeSpec::new("v_box", 4),
        AttributeSpec::new("v_color", 4),
        AttributeSpec::new("v_corner", 4),
        AttributeSpec::new("v_window", 2),
        AttributeSpec::new("v_sigma", 1),
    ]
}

/// Static primitive attribute of the built-in shader.
pub fn default_vertex_attribute() -> AttributeSpec {
    AttributeSpec::new("a_position", 2)
}

/// Interleaved instance record derived from an ordered attribute list.
///
/// Offsets are cumulative: attribute `i` starts after the floats of every
/// attribute before it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstancedLayout {
    specs: Vec<AttributeSpec>,
    offsets: Vec<u64>,
    float_count: usize,
}

impl InstancedLayout {
    pub fn new(specs: &[AttributeSpec]) -> Self {
        let mut offsets = Vec::with_capacity(specs.len());
        let mut byte_offset = 0;
        for spec in specs {
            offsets.push(byte_offset);
            byte_offset += spec.byte_len();
        }

        Self {
            specs: specs.to_vec(),
            offsets,
            float_count: specs.iter().map(|s| s.float_count as usize).sum(),
        }
    }

    /// Floats in one instance record.
    #[inline]
    pub fn attribute_float_count(&self) -> usize {
        self.float_count
    }

    /// Bytes in one instance record; the stride of every instance buffer.
    #[inline]
    pub fn stride_bytes(&self) -> u64 {
        FLOAT_BYTES * self.float_count as u64
    }

    /// Byte offset of each attribute within the record, in attribute order.
    pub fn offsets(&self) -> &[u64] {
        &self.offsets
    }

    pub fn specs(&self) -> &[AttributeSpec] {
        &self.specs
    }

    /// Attributes paired with their byte offsets.
    pub fn iter(&self) -> impl Iterator<Item = (&AttributeSpec, u64)> + '_ {
        self.specs.iter().zip(self.offsets.iter().copied())
    }

    /// Size of each instance buffer holding `num_instances` records.
    #[inline]
    pub fn buffer_size(&self, num_instances: usize) -> u64 {
        num_instances as u64 * self.stride_bytes()
    }
}
