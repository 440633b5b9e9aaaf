//! Random sources for procedural generation.
//! Every generator takes its source as a parameter so tests can pin the output.

/// Source of uniform floats in [0, 1).
pub trait RandomSource {
    fn next_f32(&mut self) -> f32;

    /// Uniform in [min, max).
    fn range(&mut self, min: f32, max: f32) -> f32 {
        min + self.next_f32() * (max - min)
    }

    /// Uniform in [-width/2, width/2).
    fn spread(&mut self, width: f32) -> f32 {
        (self.next_f32() - 0.5) * width
    }

    /// Uniform index in [0, len). `len` must be non-zero.
    fn index(&mut self, len: usize) -> usize {
        ((self.next_f32() * len as f32) as usize).min(len.saturating_sub(1))
    }
}

/// Seedable pseudo-random number generator (xorshift64).
/// Deterministic, fast, no-std compatible.
#[derive(Debug, Clone)]
pub struct Rng {
    state: u64,
}

impl Rng {
    pub fn new(seed: u64) -> Self {
        Rng {
            state: if seed == 0 { 1 } else { seed },
        }
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }
}

impl RandomSource for Rng {
    fn next_f32(&mut self) -> f32 {
        // Top 24 bits fill the f32 mantissa exactly.
        (self.next_u64() >> 40) as f32 / (1u32 << 24) as f32
    }
}

/// Replays a fixed list of values, cycling when exhausted.
#[cfg(test)]
pub(crate) struct SequenceSource {
    values: Vec<f32>,
    cursor: usize,
}

#[cfg(test)]
impl SequenceSource {
    pub(crate) fn new(values: &[f32]) -> Self {
        Self { values: values.to_vec(), cursor: 0 }
    }
}

#[cfg(test)]
impl RandomSource for SequenceSource {
    fn next_f32(&mut self) -> f32 {
        let v = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        v
    }
}
