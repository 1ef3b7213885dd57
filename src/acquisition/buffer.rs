/// Fixed-length buffer of scaled samples for one channel
///
/// Created at the acquisition length and never resized; each cycle
/// overwrites every slot.
#[derive(Clone, Debug, PartialEq)]
pub struct SampleBuffer {
    samples: Vec<f64>,
}

impl SampleBuffer {
    /// Zero-filled buffer of `len` samples
    pub fn new(len: usize) -> Self {
        Self {
            samples: vec![0.0; len],
        }
    }

    /// Wrap already scaled samples
    pub fn from_samples(samples: Vec<f64>) -> Self {
        Self { samples }
    }

    /// Store a sample at `index`
    ///
    /// # Panics
    /// Panics if `index >= len()`.
    pub fn set(&mut self, index: usize, value: f64) {
        self.samples[index] = value;
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

impl AsRef<[f64]> for SampleBuffer {
    fn as_ref(&self) -> &[f64] {
        &self.samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_zeroed() {
        let buffer = SampleBuffer::new(4);
        assert_eq!(buffer.len(), 4);
        assert!(buffer.as_slice().iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_set_overwrites_slot() {
        let mut buffer = SampleBuffer::new(3);
        buffer.set(1, 2.5);
        assert_eq!(buffer.as_slice(), &[0.0, 2.5, 0.0]);
        assert!(!buffer.is_empty());
    }
}
