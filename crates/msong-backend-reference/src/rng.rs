//! Integer RNG primitives shared by both voices.

/// Advances the linear congruential generator.
///
/// ```text
/// next = (state * 1664525 + 1013904223 + seed_mod) mod 2^32
/// ```
pub fn lcg_advance(state: u32, seed_mod: u32) -> u32 {
    state
        .wrapping_mul(1_664_525)
        .wrapping_add(1_013_904_223)
        .wrapping_add(seed_mod)
}

/// Mixes a token seed with a beat position (xorshift over a golden-ratio
/// product).
///
/// The product and the first shift are taken at full width before masking,
/// so this runs in 64 bits.
pub fn mix_seeds(a: u32, b: u32) -> u32 {
    const MASK: u64 = 0xFFFF_FFFF;
    let mut s = u64::from(a) ^ (u64::from(b) * 0x9E37_79B9);
    s ^= (s << 13) & MASK;
    s ^= s >> 17;
    s ^= (s << 5) & MASK;
    (s & MASK) as u32
}
