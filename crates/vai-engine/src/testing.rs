//! Call-recording backend for unit tests.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::device::{DrawFrame, DrawStatus, PipelineDesc, RenderBackend};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    PreparePipeline { slots: usize },
    CreateStaticBuffer { data: Vec<f32> },
    CreateInstanceBuffer { id: usize, size: u64 },
    WriteBuffer { id: usize, data: Vec<f32> },
    Draw {
        viewport: (u32, u32),
        clear: [f32; 4],
        vertex_count: u32,
        instance_count: u32,
        buffers: Vec<usize>,
    },
    ResizeSurface { width: u32, height: u32 },
}

/// Shared view of what a [`RecordingBackend`] did, kept after the backend
/// has been moved into an engine.
#[derive(Clone)]
pub(crate) struct Recorder {
    calls: Rc<RefCell<Vec<Call>>>,
    lost: Rc<Cell<bool>>,
    draw_status: Rc<Cell<DrawStatus>>,
    fail_pipeline: Rc<Cell<bool>>,
}

impl Recorder {
    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub(crate) fn clear(&self) {
        self.calls.borrow_mut().clear();
    }

    pub(crate) fn set_lost(&self, lost: bool) {
        self.lost.set(lost);
    }

    pub(crate) fn set_draw_status(&self, status: DrawStatus) {
        self.draw_status.set(status);
    }

    pub(crate) fn fail_pipeline(&self) {
        self.fail_pipeline.set(true);
    }

    pub(crate) fn instance_buffer_sizes(&self) -> Vec<u64> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|c| match c {
                Call::CreateInstanceBuffer { size, .. } => Some(*size),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn draws(&self) -> Vec<Call> {
        self.calls
            .borrow()
            .iter()
            .filter(|c| matches!(c, Call::Draw { .. }))
            .cloned()
            .collect()
    }

    pub(crate) fn writes(&self) -> Vec<(usize, Vec<f32>)> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|c| match c {
                Call::WriteBuffer { id, data } => Some((*id, data.clone())),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn resizes(&self) -> Vec<(u32, u32)> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|c| match c {
                Call::ResizeSurface { width, height } => Some((*width, *height)),
                _ => None,
            })
            .collect()
    }
}

/// Backend whose buffers are plain ids and whose surface is a fixed-size
/// fake with a configurable pixel ratio and client size.
pub(crate) struct RecordingBackend {
    rec: Recorder,
    next_id: usize,
    pub(crate) pixel_ratio: f64,
    pub(crate) client_size: (f64, f64),
    pub(crate) surface_size: (u32, u32),
    pub(crate) max_buffer_size: u64,
}

impl RecordingBackend {
    pub(crate) fn new() -> (Self, Recorder) {
        let rec = Recorder {
            calls: Rc::default(),
            lost: Rc::default(),
            draw_status: Rc::new(Cell::new(DrawStatus::Presented)),
            fail_pipeline: Rc::default(),
        };
        let backend = Self {
            rec: rec.clone(),
            next_id: 0,
            pixel_ratio: 1.0,
            client_size: (300.0, 150.0),
            surface_size: (300, 150),
            max_buffer_size: u64::MAX,
        };
        (backend, rec)
    }

    fn push(&self, call: Call) {
        self.rec.calls.borrow_mut().push(call);
    }

    fn id(&mut self) -> usize {
        self.next_id += 1;
        self.next_id
    }
}

fn floats(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|b| f32::from_ne_bytes([b[0], b[1], b[2], b[3]]))
        .collect()
}

impl RenderBackend for RecordingBackend {
    type Buffer = usize;

    fn is_lost(&self) -> bool {
        self.rec.lost.get()
    }

    fn pixel_ratio(&self) -> f64 {
        self.pixel_ratio
    }

    fn client_size(&self) -> (f64, f64) {
        self.client_size
    }

    fn surface_size(&self) -> (u32, u32) {
        self.surface_size
    }

    fn max_buffer_size(&self) -> u64 {
        self.max_buffer_size
    }

    fn resize_surface(&mut self, width: u32, height: u32) {
        self.surface_size = (width, height);
        self.push(Call::ResizeSurface { width, height });
    }

    fn prepare_pipeline(&mut self, desc: &PipelineDesc<'_>) -> anyhow::Result<()> {
        anyhow::ensure!(!self.rec.fail_pipeline.get(), "pipeline rejected by test backend");
        self.push(Call::PreparePipeline { slots: desc.vertex_buffers.len() });
        Ok(())
    }

    fn create_static_buffer(&mut self, _label: &str, contents: &[u8]) -> usize {
        self.push(Call::CreateStaticBuffer { data: floats(contents) });
        self.id()
    }

    fn create_instance_buffer(&mut self, _label: &str, size: u64) -> usize {
        let id = self.id();
        self.push(Call::CreateInstanceBuffer { id, size });
        id
    }

    fn write_buffer(&mut self, buffer: &usize, data: &[u8]) {
        self.push(Call::WriteBuffer { id: *buffer, data: floats(data) });
    }

    fn draw_instanced(&mut self, frame: &DrawFrame<'_, usize>) -> DrawStatus {
        self.push(Call::Draw {
            viewport: frame.viewport,
            clear: frame.clear_color.to_array(),
            vertex_count: frame.vertex_count,
            instance_count: frame.instance_count,
            buffers: frame.instance_buffers.to_vec(),
        });
        self.rec.draw_status.get()
    }
}
