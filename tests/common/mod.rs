use std::hash::{BuildHasher, Hasher};

/// Hashes an integer to itself so tests can pin bucket placement.
///
/// With 16 buckets the keys {1, 10, 14, 21, 27} all land in the same
/// chain, which the chaining and removal tests below rely on.
#[derive(Clone, Default)]
pub struct IdentityState;

#[derive(Default)]
pub struct IdentityHasher {
    hash: u64,
}

impl Hasher for IdentityHasher {
    fn finish(&self) -> u64 {
        self.hash
    }

    fn write(&mut self, bytes: &[u8]) {
        let mut buf = [0u8; 8];
        let len = bytes.len().min(8);
        buf[..len].copy_from_slice(&bytes[..len]);
        self.hash = u64::from_le_bytes(buf);
    }

    fn write_u32(&mut self, i: u32) {
        self.hash = i as u64;
    }

    fn write_u64(&mut self, i: u64) {
        self.hash = i;
    }

    fn write_usize(&mut self, i: usize) {
        self.hash = i as u64;
    }

    fn write_i32(&mut self, i: i32) {
        self.hash = i as u64;
    }

    fn write_i64(&mut self, i: i64) {
        self.hash = i as u64;
    }
}

impl BuildHasher for IdentityState {
    type Hasher = IdentityHasher;

    fn build_hasher(&self) -> IdentityHasher {
        IdentityHasher::default()
    }
}

/// Keys that share a bucket in a 16-bucket table under the identity hash.
pub const SAME_BUCKET_KEYS: [i32; 5] = [1, 10, 14, 21, 27];
