//! Hash functions for domain set lookups
//!
//! Uses Murmur3 32-bit with two different seeds composed into a single 64-bit
//! key. This gives excellent distribution with virtually no collision risk for
//! domain-length strings, without pulling in a hashing crate.
//!
//! # Sentinel Handling
//!
//! A hash of 0 is reserved as the "absent" sentinel. `hash64` ORs the low word
//! with 1 in the (astronomically unlikely) case both passes return 0.

// Seeds for the two hash passes
const SEED_LO: u32 = 0x9e3779b9; // Golden ratio
const SEED_HI: u32 = 0x85ebca6b; // Murmur3 constant

/// Murmur3 32-bit hash implementation.
/// Optimized for short strings (typical domain lengths).
#[inline]
pub fn murmur3_32(data: &[u8], seed: u32) -> u32 {
    let len = data.len();
    let mut h = seed;
    let mut i = 0;

    // Process 4-byte chunks
    let chunks = (len >> 2) << 2; // Round down to multiple of 4
    while i < chunks {
        let k = u32::from_le_bytes([
            data[i],
            data[i + 1],
            data[i + 2],
            data[i + 3],
        ]);

        let k = k.wrapping_mul(0xcc9e2d51);
        let k = k.rotate_left(15);
        let k = k.wrapping_mul(0x1b873593);

        h ^= k;
        h = h.rotate_left(13);
        h = h.wrapping_mul(5).wrapping_add(0xe6546b64);

        i += 4;
    }

    // Process remaining bytes
    let mut k: u32 = 0;
    let remainder = len & 3;
    if remainder >= 3 {
        k ^= (data[i + 2] as u32) << 16;
    }
    if remainder >= 2 {
        k ^= (data[i + 1] as u32) << 8;
    }
    if remainder >= 1 {
        k ^= data[i] as u32;
        let k = k.wrapping_mul(0xcc9e2d51);
        let k = k.rotate_left(15);
        let k = k.wrapping_mul(0x1b873593);
        h ^= k;
    }

    // Finalization
    h ^= len as u32;
    h ^= h >> 16;
    h = h.wrapping_mul(0x85ebca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2ae35);
    h ^= h >> 16;

    h
}

/// Compute a 64-bit hash using two Murmur3 passes. Never returns 0.
#[inline]
pub fn hash64(data: &[u8]) -> u64 {
    let mut lo = murmur3_32(data, SEED_LO);
    let hi = murmur3_32(data, SEED_HI);

    // Avoid the 0 sentinel
    if lo == 0 && hi == 0 {
        lo = 1;
    }

    ((hi as u64) << 32) | (lo as u64)
}

/// Hash a domain string for lookup in domain sets.
/// Lowercases the input before hashing for case-insensitive matching.
#[inline]
pub fn hash_domain(domain: &str) -> u64 {
    // Fast lowercase conversion for ASCII domains
    let mut buf = [0u8; 256];
    let len = domain.len().min(256);

    for (i, &b) in domain.as_bytes()[..len].iter().enumerate() {
        buf[i] = if b.is_ascii_uppercase() { b + 32 } else { b };
    }

    hash64(&buf[..len])
}
