// Deterministic, portable pseudo-random number generator for the draft host.
//
// xoshiro256++ (Blackman & Vigna, 2019) expanded from a single `u64` seed via
// SplitMix64. Only the host draws from it: slot permutation, offer sampling,
// offer shuffling, and random/timeout picks. Followers never roll dice, so a
// host seeded with the same value replays an identical draft given identical
// inputs. Tests lean on this to pin statistical behaviour to fixed seeds.
//
// Everything is integer arithmetic. No floats, no OS entropy, no stdlib
// hasher state. Output depends only on the seed and the call sequence.

use serde::{Deserialize, Serialize};

/// Xoshiro256++ PRNG, the draft host's sole source of randomness.
///
/// A `DraftCoordinator` owns exactly one of these for its lifetime; the
/// generator keeps advancing across sessions rather than being reseeded.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DraftRng {
    s: [u64; 4],
}

impl DraftRng {
    /// Seed a generator. Equal seeds give equal streams.
    pub fn new(seed: u64) -> Self {
        let mut sm = seed;
        Self {
            s: [
                splitmix64(&mut sm),
                splitmix64(&mut sm),
                splitmix64(&mut sm),
                splitmix64(&mut sm),
            ],
        }
    }

    /// Next raw 64-bit output.
    pub fn next_u64(&mut self) -> u64 {
        let result = (self.s[0].wrapping_add(self.s[3]))
            .rotate_left(23)
            .wrapping_add(self.s[0]);

        let t = self.s[1] << 17;

        self.s[2] ^= self.s[0];
        self.s[3] ^= self.s[1];
        self.s[1] ^= self.s[2];
        self.s[0] ^= self.s[3];

        self.s[2] ^= t;
        self.s[3] = self.s[3].rotate_left(45);

        result
    }

    /// Uniform integer in `[low, high)`, rejection-sampled to avoid modulo
    /// bias.
    ///
    /// Panics if `low >= high`.
    pub fn range_u64(&mut self, low: u64, high: u64) -> u64 {
        assert!(low < high, "range_u64: low must be less than high");
        let span = high - low;
        if span.is_power_of_two() {
            return low + (self.next_u64() & (span - 1));
        }
        let threshold = span.wrapping_neg() % span; // (2^64 - span) % span
        loop {
            let r = self.next_u64();
            if r >= threshold {
                return low + (r % span);
            }
        }
    }

    /// Uniform integer in `[low, high]`. Weighted selection rolls with this
    /// over `[1, total_weight]`.
    ///
    /// Panics if `low > high` or `high == u64::MAX`.
    pub fn range_u64_inclusive(&mut self, low: u64, high: u64) -> u64 {
        assert!(low <= high, "range_u64_inclusive: low must be <= high");
        self.range_u64(low, high + 1)
    }

    /// Uniform index in `[0, len)`.
    ///
    /// Panics if `len == 0`.
    pub fn index(&mut self, len: usize) -> usize {
        self.range_u64(0, len as u64) as usize
    }

    /// Uniformly chosen element, or `None` for an empty slice.
    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            None
        } else {
            let i = self.index(items.len());
            items.get(i)
        }
    }

    /// In-place Fisher–Yates shuffle: every permutation equally likely.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.index(i + 1);
            items.swap(i, j);
        }
    }
}

/// SplitMix64 step, used only to expand the seed into xoshiro state.
fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}
