//! Deterministic string hashing for stub generators.

/// 31-multiplier rolling hash over UTF-16 code units with 32-bit signed
/// wraparound, returned as its absolute value.
pub fn rolling_hash(s: &str) -> u32 {
    let mut hash: i32 = 0;
    for unit in s.encode_utf16() {
        hash = hash
            .wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(unit as i32);
    }
    hash.unsigned_abs()
}

/// Pick an item from `items` keyed by `seed`. `items` must be non-empty.
pub fn pick<'a, T>(items: &'a [T], seed: u32) -> &'a T {
    &items[seed as usize % items.len()]
}
