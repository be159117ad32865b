/// Chunks held more floats than the frame buffer can take.
#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
#[error("frame data overflow: {required} floats supplied, capacity is {capacity}")]
pub struct FrameOverflow {
    /// Floats written before the first chunk that did not fit, plus that chunk.
    pub required: usize,
    pub capacity: usize,
}

/// Verifies that `chunks`, concatenated in order, fit in `capacity` floats.
///
/// Stops at the first chunk that would cross the capacity.
pub fn check_capacity<C: AsRef<[f32]>>(chunks: &[C], capacity: usize) -> Result<usize, FrameOverflow> {
    let mut offset = 0usize;
    for chunk in chunks {
        let len = chunk.as_ref().len();
        match offset.checked_add(len) {
            Some(end) if end <= capacity => offset = end,
            _ => {
                return Err(FrameOverflow {
                    required: offset.saturating_add(len),
                    capacity,
                });
            }
        }
    }
    Ok(offset)
}

/// CPU-side frame buffer: one contiguous run of interleaved instance records.
///
/// Chunks are independently produced layers, each a whole number of instance
/// records; their order is the draw order. A frame that does not fit is
/// rejected before anything is copied, so the previous contents survive.
///
/// A frame that fills less than the capacity is accepted; the tail keeps
/// whatever the previous frame left there.
#[derive(Debug, Default, Clone)]
pub struct FrameDataPacker {
    data: Vec<f32>,
}

impl FrameDataPacker {
    pub fn new(capacity: usize) -> Self {
        Self { data: vec![0.0; capacity] }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Reallocates to exactly `capacity` zeroed floats.
    pub fn resize(&mut self, capacity: usize) {
        self.data = vec![0.0; capacity];
    }

    /// Copies `chunks` back to back from offset 0 and returns the floats written.
    pub fn pack<C: AsRef<[f32]>>(&mut self, chunks: &[C]) -> Result<usize, FrameOverflow> {
        let total = check_capacity(chunks, self.data.len())?;

        let mut offset = 0;
        for chunk in chunks {
            let chunk = chunk.as_ref();
            self.data[offset..offset + chunk.len()].copy_from_slice(chunk);
            offset += chunk.len();
        }

        if total < self.data.len() {
            log::trace!("frame data fills {total} of {} floats", self.data.len());
        }
        Ok(total)
    }

    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }
}
