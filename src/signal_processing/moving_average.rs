/// Integer moving average over a fixed ring of rate samples
///
/// Holds exactly `window_size` slots, all zero at construction. Every
/// reported average divides the sum of the whole ring by `window_size`
/// with integer truncation, so the output ramps up from zero while the
/// ring fills. The ring is never cleared.
pub struct MovingAverageRing {
    buffer: Vec<u32>,
    index: usize,
}

impl MovingAverageRing {
    /// Create a zero-filled ring
    ///
    /// # Arguments
    /// * `window_size` - Number of slots; must be non-zero
    pub fn new(window_size: usize) -> Self {
        Self {
            buffer: vec![0; window_size],
            index: 0,
        }
    }

    /// Overwrite the oldest slot and return the updated average
    pub fn add(&mut self, value: u32) -> u32 {
        self.buffer[self.index] = value;
        self.index = (self.index + 1) % self.buffer.len();
        self.average()
    }

    /// Sum of the ring divided by its size, truncated
    pub fn average(&self) -> u32 {
        let sum: u64 = self.buffer.iter().map(|&v| u64::from(v)).sum();
        (sum / self.buffer.len() as u64) as u32
    }

    pub fn window_size(&self) -> usize {
        self.buffer.len()
    }

    /// Slot the next value will overwrite
    pub fn cursor(&self) -> usize {
        self.index
    }
}
