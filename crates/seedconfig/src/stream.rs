//! Seeded pseudo-random stream.
//!
//! The stream is an ARC4 keystream keyed from the seed string and turned into
//! doubles with 52 bits of significance. A given seed always produces the same
//! sequence of draws, on every platform and across runs, which is what lets a
//! seed name stand in for an entire [`Configuration`](crate::Configuration).

use rand::RngCore;

const WIDTH: u64 = 256;
const MASK: usize = 255;
const CHUNKS: usize = 6;
const SIGNIFICANCE: u64 = 1 << 52;
const OVERFLOW: u64 = SIGNIFICANCE * 2;

/// Deterministic draw sequence derived from a seed string.
///
/// Also usable as a [`rand::RngCore`] so renderers can feed it to `rand`
/// samplers once the configuration draws are done. Each `next_u32` or
/// `fill_bytes` call counts as one draw.
#[derive(Clone, PartialEq, Eq)]
pub struct SeededStream {
    seed: String,
    arc4: Arc4,
    draws: u64,
}

impl SeededStream {
    pub fn new(seed: impl Into<String>) -> Self {
        let seed = seed.into();
        let key = mix_key(&seed);
        Self {
            arc4: Arc4::new(&key),
            seed,
            draws: 0,
        }
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }

    /// Number of draws consumed so far.
    pub fn draws(&self) -> u64 {
        self.draws
    }

    /// Next draw in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        self.draws += 1;
        let mut n = self.arc4.take(CHUNKS);
        let mut d = (WIDTH as f64).powi(CHUNKS as i32);
        let mut x = 0u64;
        while n < SIGNIFICANCE {
            n = (n + x) * WIDTH;
            d *= WIDTH as f64;
            x = self.arc4.take(1);
        }
        while n >= OVERFLOW {
            n /= 2;
            d /= 2.0;
            x >>= 1;
        }
        (n + x) as f64 / d
    }

    /// One draw in `[0, 1)`.
    pub fn unit(&mut self) -> f64 {
        self.range(0.0, 1.0)
    }

    /// One draw in `[0, max)`.
    pub fn below(&mut self, max: f64) -> f64 {
        self.range(0.0, max)
    }

    /// One draw in `[min, max)`.
    pub fn range(&mut self, min: f64, max: f64) -> f64 {
        self.next_f64() * (max - min) + min
    }

    /// Index in `0..len` taken from a single draw; `len` must be non-zero.
    pub fn index(&mut self, len: usize) -> usize {
        let idx = (self.unit() * len as f64).floor() as usize;
        idx.min(len.saturating_sub(1))
    }

    /// Shuffles `items` in place, consuming exactly `items.len()` draws.
    ///
    /// Walks from the back: each draw picks a slot in the unshuffled prefix
    /// and swaps it into the last unshuffled position.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        let mut len = items.len();
        while len > 0 {
            let pick = (self.below(1.0) * len as f64).floor() as usize;
            len -= 1;
            items.swap(len, pick.min(len));
        }
    }
}

impl std::fmt::Debug for SeededStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeededStream")
            .field("seed", &self.seed)
            .field("draws", &self.draws)
            .finish()
    }
}

impl RngCore for SeededStream {
    fn next_u32(&mut self) -> u32 {
        self.draws += 1;
        self.arc4.take(4) as u32
    }

    fn next_u64(&mut self) -> u64 {
        let high = u64::from(self.next_u32());
        let low = u64::from(self.next_u32());
        (high << 32) | low
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.draws += 1;
        for byte in dest.iter_mut() {
            *byte = self.arc4.take(1) as u8;
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

/// Folds the seed's UTF-16 code units into a key of at most 256 bytes.
fn mix_key(seed: &str) -> Vec<u8> {
    let mut key: Vec<u8> = Vec::new();
    let mut smear: u32 = 0;
    for (j, unit) in seed.encode_utf16().enumerate() {
        let slot = j & MASK;
        let previous = key.get(slot).copied().unwrap_or(0);
        smear ^= u32::from(previous) * 19;
        let value = (smear.wrapping_add(u32::from(unit)) & MASK as u32) as u8;
        if slot < key.len() {
            key[slot] = value;
        } else {
            key.push(value);
        }
    }
    key
}

#[derive(Clone, PartialEq, Eq)]
struct Arc4 {
    state: [u8; 256],
    i: usize,
    j: usize,
}

impl Arc4 {
    fn new(key: &[u8]) -> Self {
        let key: &[u8] = if key.is_empty() { &[0] } else { key };
        let mut state = [0u8; 256];
        for (slot, value) in state.iter_mut().enumerate() {
            *value = slot as u8;
        }
        let mut j = 0usize;
        for i in 0..256 {
            let t = state[i];
            j = MASK & (j + key[i % key.len()] as usize + t as usize);
            state[i] = state[j];
            state[j] = t;
        }
        let mut arc4 = Self { state, i: 0, j: 0 };
        // RC4-drop[256]
        for _ in 0..256 {
            arc4.next_byte();
        }
        arc4
    }

    fn next_byte(&mut self) -> u8 {
        self.i = MASK & (self.i + 1);
        let t = self.state[self.i];
        self.j = MASK & (self.j + t as usize);
        self.state[self.i] = self.state[self.j];
        self.state[self.j] = t;
        let idx = MASK & (self.state[self.i] as usize + self.state[self.j] as usize);
        self.state[idx]
    }

    /// Big-endian concatenation of `count` keystream bytes; `count <= 8`.
    fn take(&mut self, count: usize) -> u64 {
        (0..count).fold(0u64, |acc, _| acc * WIDTH + u64::from(self.next_byte()))
    }
}
