use core::hash::BuildHasher;
use core::hash::Hasher;

const C1: u32 = 0xcc9e_2d51;
const C2: u32 = 0x1b87_3593;

#[inline(always)]
fn scramble(k: u32) -> u32 {
    k.wrapping_mul(C1).rotate_left(15).wrapping_mul(C2)
}

#[inline(always)]
fn mix_block(h: u32, k: u32) -> u32 {
    (h ^ scramble(k))
        .rotate_left(13)
        .wrapping_mul(5)
        .wrapping_add(0xe654_6b64)
}

#[inline(always)]
fn finalize(mut h: u32, len: usize) -> u32 {
    // Only the low 32 bits of the length take part, as in the reference
    // algorithm.
    h ^= len as u32;
    h ^= h >> 16;
    h = h.wrapping_mul(0x85eb_ca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2_ae35);
    h ^ (h >> 16)
}

/// Returns the 32-bit Murmur3 hash (seed 0) of `data`.
///
/// Blocks are read little-endian. An empty block hashes to `0`.
///
/// # Examples
///
/// ```rust
/// use slim_hash::murmur3_32;
///
/// assert_eq!(murmur3_32(b""), 0);
/// assert_eq!(murmur3_32(b"hello"), 0x248b_fa47);
/// ```
pub fn murmur3_32(data: &[u8]) -> u32 {
    if data.is_empty() {
        return 0;
    }

    let mut blocks = data.chunks_exact(4);
    let mut h = 0u32;
    for block in &mut blocks {
        h = mix_block(h, u32::from_le_bytes([block[0], block[1], block[2], block[3]]));
    }

    let tail = blocks.remainder();
    if !tail.is_empty() {
        let k = tail
            .iter()
            .enumerate()
            .fold(0u32, |k, (i, &b)| k | (u32::from(b) << (8 * i)));
        h ^= scramble(k);
    }

    finalize(h, data.len())
}

/// A streaming [`Hasher`] producing the same value as [`murmur3_32`] over the
/// concatenation of everything written to it.
///
/// `finish` returns the 32-bit hash zero-extended to `u64`.
#[derive(Clone, Debug, Default)]
pub struct Murmur3Hasher {
    h: u32,
    pending: u32,
    pending_len: usize,
    total: usize,
}

impl Murmur3Hasher {
    /// Creates a hasher with no input.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the 32-bit hash of the bytes written so far.
    pub fn finish_u32(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }

        let mut h = self.h;
        if self.pending_len > 0 {
            h ^= scramble(self.pending);
        }
        finalize(h, self.total)
    }
}

impl Hasher for Murmur3Hasher {
    fn write(&mut self, bytes: &[u8]) {
        self.total = self.total.wrapping_add(bytes.len());

        let mut bytes = bytes;
        while self.pending_len > 0 && self.pending_len < 4 {
            let Some((&b, rest)) = bytes.split_first() else {
                return;
            };
            self.pending |= u32::from(b) << (8 * self.pending_len);
            self.pending_len += 1;
            bytes = rest;
        }
        if self.pending_len == 4 {
            self.h = mix_block(self.h, self.pending);
            self.pending = 0;
            self.pending_len = 0;
        }

        let mut blocks = bytes.chunks_exact(4);
        for block in &mut blocks {
            self.h = mix_block(
                self.h,
                u32::from_le_bytes([block[0], block[1], block[2], block[3]]),
            );
        }
        for (i, &b) in blocks.remainder().iter().enumerate() {
            self.pending |= u32::from(b) << (8 * i);
        }
        self.pending_len = blocks.remainder().len();
    }

    fn finish(&self) -> u64 {
        u64::from(self.finish_u32())
    }
}

/// [`BuildHasher`] for [`Murmur3Hasher`].
#[derive(Clone, Copy, Debug, Default)]
pub struct BuildMurmur3;

impl BuildHasher for BuildMurmur3 {
    type Hasher = Murmur3Hasher;

    fn build_hasher(&self) -> Self::Hasher {
        Murmur3Hasher::new()
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use rand::Rng;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    #[test]
    fn known_vectors() {
        assert_eq!(murmur3_32(b""), 0);
        assert_eq!(murmur3_32(b"a"), 0x3c25_69b2);
        assert_eq!(murmur3_32(b"ab"), 0x9bbf_d75f);
        assert_eq!(murmur3_32(b"abc"), 0xb3dd_93fa);
        assert_eq!(murmur3_32(b"test"), 0xba6b_d213);
        assert_eq!(murmur3_32(b"hello"), 0x248b_fa47);
        assert_eq!(
            murmur3_32(b"The quick brown fox jumps over the lazy dog"),
            0x2e4f_f723
        );
    }

    #[test]
    fn integer_bytes() {
        assert_eq!(murmur3_32(&174i64.to_le_bytes()), 0x5c3a_e90a);
    }

    #[test]
    fn streaming_matches_one_shot() {
        let mut rng = SmallRng::seed_from_u64(0x5eed);
        for len in 0..64 {
            let data: Vec<u8> = (0..len).map(|_| rng.random()).collect();

            let mut hasher = Murmur3Hasher::new();
            let mut rest = &data[..];
            while !rest.is_empty() {
                let split = rng.random_range(0..=rest.len());
                let (head, tail) = rest.split_at(split);
                hasher.write(head);
                rest = tail;
            }

            assert_eq!(hasher.finish_u32(), murmur3_32(&data), "len {len}");
        }
    }

    #[test]
    fn empty_writes_hash_to_zero() {
        let mut hasher = BuildMurmur3.build_hasher();
        hasher.write(&[]);
        assert_eq!(hasher.finish(), 0);
    }
}
