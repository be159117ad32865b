use crate::device::RenderBackend;
use crate::shader::ShaderProgram;

use super::{AttributeSpec, InstancedLayout, LayoutError};

/// How the GPU reads one attribute out of its vertex buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeBinding {
    pub name: String,
    pub location: u32,
    pub float_count: u32,
    pub stride_bytes: u64,
    pub offset_bytes: u64,
    pub step_mode: wgpu::VertexStepMode,
    vertex_attribute: wgpu::VertexAttribute,
}

impl AttributeBinding {
    fn resolve(
        program: &ShaderProgram,
        spec: &AttributeSpec,
        stride_bytes: u64,
        offset_bytes: u64,
        step_mode: wgpu::VertexStepMode,
    ) -> Result<Self, LayoutError> {
        let format = spec.vertex_format()?;

        let input = program
            .input(&spec.name)
            .ok_or_else(|| LayoutError::UnknownAttribute { name: spec.name.clone() })?;

        match input.components {
            None => return Err(LayoutError::NotFloat { name: spec.name.clone() }),
            Some(n) if u32::from(n) != spec.float_count => {
                return Err(LayoutError::ComponentMismatch {
                    name: spec.name.clone(),
                    float_count: spec.float_count,
                    shader_components: n,
                });
            }
            Some(_) => {}
        }

        Ok(Self {
            name: spec.name.clone(),
            location: input.location,
            float_count: spec.float_count,
            stride_bytes,
            offset_bytes,
            step_mode,
            vertex_attribute: wgpu::VertexAttribute {
                format,
                offset: offset_bytes,
                shader_location: input.location,
            },
        })
    }

    /// GL-style divisor: 0 advances per vertex, 1 per instance.
    pub fn divisor(&self) -> u32 {
        match self.step_mode {
            wgpu::VertexStepMode::Vertex => 0,
            wgpu::VertexStepMode::Instance => 1,
        }
    }

    /// Buffer layout for the slot this attribute is read from.
    pub fn buffer_layout(&self) -> wgpu::VertexBufferLayout<'_> {
        wgpu::VertexBufferLayout {
            array_stride: self.stride_bytes,
            step_mode: self.step_mode,
            attributes: std::slice::from_ref(&self.vertex_attribute),
        }
    }
}

/// The static, per-vertex primitive geometry.
#[derive(Debug)]
pub struct PrimitiveBinding<T> {
    pub buffer: T,
    pub attribute: AttributeBinding,
    pub vertex_count: u32,
}

/// Uploads `vertices` once and binds them to `spec` with a tightly packed,
/// per-vertex read.
pub fn bind_primitive<B: RenderBackend>(
    backend: &mut B,
    program: &ShaderProgram,
    spec: &AttributeSpec,
    vertices: &[f32],
) -> Result<PrimitiveBinding<B::Buffer>, LayoutError> {
    let attribute =
        AttributeBinding::resolve(program, spec, spec.byte_len(), 0, wgpu::VertexStepMode::Vertex)?;

    let buffer = backend.create_static_buffer(
        &format!("vai primitive `{}`", spec.name),
        bytemuck::cast_slice(vertices),
    );

    Ok(PrimitiveBinding {
        buffer,
        attribute,
        vertex_count: (vertices.len() / spec.float_count as usize) as u32,
    })
}

/// Per-instance attributes and their equally sized buffers.
#[derive(Debug)]
pub struct InstancedBinding<T> {
    pub attributes: Vec<AttributeBinding>,
    pub buffers: Vec<T>,
    layout: InstancedLayout,
    num_instances: usize,
}

impl<T> InstancedBinding<T> {
    #[inline]
    pub fn attribute_float_count(&self) -> usize {
        self.layout.attribute_float_count()
    }

    #[inline]
    pub fn num_instances(&self) -> usize {
        self.num_instances
    }

    pub fn layout(&self) -> &InstancedLayout {
        &self.layout
    }

    /// Replaces every buffer with one sized for `num_instances`.
    ///
    /// Buffer capacity is fixed at creation, so a new instance count always
    /// means new buffers. Locations, strides and offsets do not change.
    pub fn rebind<B>(&mut self, backend: &mut B, num_instances: usize)
    where
        B: RenderBackend<Buffer = T>,
    {
        self.buffers = create_buffers(backend, &self.layout, num_instances);
        self.num_instances = num_instances;
    }
}

/// Resolves every attribute in `layout` against `program` and creates one
/// buffer per attribute, each `num_instances × stride` bytes.
pub fn bind_instanced<B: RenderBackend>(
    backend: &mut B,
    program: &ShaderProgram,
    layout: &InstancedLayout,
    num_instances: usize,
) -> Result<InstancedBinding<B::Buffer>, LayoutError> {
    let attributes = layout
        .iter()
        .map(|(spec, offset)| {
            AttributeBinding::resolve(
                program,
                spec,
                layout.stride_bytes(),
                offset,
                wgpu::VertexStepMode::Instance,
            )
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(InstancedBinding {
        attributes,
        buffers: create_buffers(backend, layout, num_instances),
        layout: layout.clone(),
        num_instances,
    })
}

fn create_buffers<B: RenderBackend>(
    backend: &mut B,
    layout: &InstancedLayout,
    num_instances: usize,
) -> Vec<B::Buffer> {
    let size = layout.buffer_size(num_instances);
    layout
        .specs()
        .iter()
        .map(|spec| backend.create_instance_buffer(&format!("vai instance `{}`", spec.name), size))
        .collect()
}

/// Fails if the vertex stage reads a location nothing is bound to.
pub fn check_coverage<'a>(
    program: &ShaderProgram,
    bound: impl IntoIterator<Item = &'a AttributeBinding>,
) -> Result<(), LayoutError> {
    let locations: Vec<u32> = bound.into_iter().map(|b| b.location).collect();
    match program.inputs().iter().find(|i| !locations.contains(&i.location)) {
        Some(input) => Err(LayoutError::UnboundInput {
            name: input.name.clone(),
            location: input.location,
        }),
        None => Ok(()),
    }
}

/// Pipeline vertex layout: the primitive in slot 0, then the instance
/// attributes in order.
pub fn vertex_buffer_layouts<'a, T>(
    primitive: &'a PrimitiveBinding<T>,
    instanced: &'a InstancedBinding<T>,
) -> Vec<wgpu::VertexBufferLayout<'a>> {
    std::iter::once(&primitive.attribute)
        .chain(instanced.attributes.iter())
        .map(AttributeBinding::buffer_layout)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{default_instance_attributes, default_vertex_attribute, QUAD_VERTICES};
    use crate::shader::{compile, RECT_SHADOW_FRAGMENT, RECT_SHADOW_VERTEX};
    use crate::testing::{Call, RecordingBackend};

    fn program() -> ShaderProgram {
        compile(RECT_SHADOW_VERTEX, RECT_SHADOW_FRAGMENT).unwrap()
    }

    #[test]
    fn primitive_is_tightly_packed_per_vertex() {
        let (mut backend, rec) = RecordingBackend::new();
        let prim = bind_primitive(&mut backend, &program(), &default_vertex_attribute(), &QUAD_VERTICES).unwrap();

        assert_eq!(prim.vertex_count, 6);
        assert_eq!(prim.attribute.location, 0);
        assert_eq!(prim.attribute.stride_bytes, 8);
        assert_eq!(prim.attribute.offset_bytes, 0);
        assert_eq!(prim.attribute.divisor(), 0);
        assert_eq!(rec.calls(), vec![Call::CreateStaticBuffer { data: QUAD_VERTICES.to_vec() }]);
    }

    #[test]
    fn unknown_primitive_name_fails_loudly() {
        let (mut backend, rec) = RecordingBackend::new();
        let err = bind_primitive(&mut backend, &program(), &AttributeSpec::new("a_missing", 2), &QUAD_VERTICES)
            .unwrap_err();
        assert_eq!(err, LayoutError::UnknownAttribute { name: "a_missing".into() });
        assert!(rec.calls().is_empty());
    }

    #[test]
    fn instanced_offsets_strides_and_divisors() {
        let (mut backend, rec) = RecordingBackend::new();
        let layout = InstancedLayout::new(&default_instance_attributes());
        let bound = bind_instanced(&mut backend, &program(), &layout, 2).unwrap();

        assert_eq!(bound.attribute_float_count(), 15);
        let offsets: Vec<_> = bound.attributes.iter().map(|a| a.offset_bytes).collect();
        assert_eq!(offsets, vec![0, 16, 32, 48, 56]);
        let locations: Vec<_> = bound.attributes.iter().map(|a| a.location).collect();
        assert_eq!(locations, vec![1, 2, 3, 4, 5]);
        assert!(bound.attributes.iter().all(|a| a.stride_bytes == 60 && a.divisor() == 1));

        assert_eq!(bound.buffers.len(), 5);
        assert_eq!(rec.instance_buffer_sizes(), vec![120; 5]);
    }

    #[test]
    fn rebind_recreates_every_buffer() {
        let (mut backend, rec) = RecordingBackend::new();
        let layout = InstancedLayout::new(&default_instance_attributes());
        let mut bound = bind_instanced(&mut backend, &program(), &layout, 0).unwrap();
        let before = bound.buffers.clone();
        rec.clear();

        bound.rebind(&mut backend, 3);

        assert_eq!(bound.num_instances(), 3);
        assert_eq!(rec.instance_buffer_sizes(), vec![180; 5]);
        assert!(bound.buffers.iter().all(|b| !before.contains(b)));
    }

    #[test]
    fn mismatched_float_count_is_rejected() {
        let (mut backend, _rec) = RecordingBackend::new();
        let layout = InstancedLayout::new(&[AttributeSpec::new("v_box", 2)]);
        let err = bind_instanced(&mut backend, &program(), &layout, 1).unwrap_err();
        assert!(matches!(err, LayoutError::ComponentMismatch { shader_components: 4, .. }));
    }

    #[test]
    fn coverage_reports_unbound_input() {
        let (mut backend, _rec) = RecordingBackend::new();
        let program = program();
        let prim = bind_primitive(&mut backend, &program, &default_vertex_attribute(), &QUAD_VERTICES).unwrap();
        let mut specs = default_instance_attributes();
        specs.pop();
        let inst = bind_instanced(&mut backend, &program, &InstancedLayout::new(&specs), 0).unwrap();

        let err = check_coverage(&program, std::iter::once(&prim.attribute).chain(&inst.attributes)).unwrap_err();
        assert_eq!(err, LayoutError::UnboundInput { name: "v_sigma".into(), location: 5 });
    }

    #[test]
    fn buffer_layouts_put_primitive_first() {
        let (mut backend, _rec) = RecordingBackend::new();
        let program = program();
        let prim = bind_primitive(&mut backend, &program, &default_vertex_attribute(), &QUAD_VERTICES).unwrap();
        let layout = InstancedLayout::new(&default_instance_attributes());
        let inst = bind_instanced(&mut backend, &program, &layout, 0).unwrap();

        let layouts = vertex_buffer_layouts(&prim, &inst);
        assert_eq!(layouts.len(), 6);
        assert_eq!(layouts[0].step_mode, wgpu::VertexStepMode::Vertex);
        assert_eq!(layouts[0].array_stride, 8);
        for l in &layouts[1..] {
            assert_eq!(l.step_mode, wgpu::VertexStepMode::Instance);
            assert_eq!(l.array_stride, 60);
            assert_eq!(l.attributes.len(), 1);
        }
        assert_eq!(layouts[5].attributes[0].offset, 56);
        assert_eq!(layouts[5].attributes[0].format, wgpu::VertexFormat::Float32);
    }
}
