const GOLDEN: u32 = 0x9E37_79B9;
const MIX_ROUNDS: [(u32, u32); 2] = [(16, 0x85EB_CA6B), (13, 0xC2B2_AE35)];
const UNIT_SCALE: f32 = 1.0 / (1u32 << 24) as f32;

fn mix(value: u32) -> u32 {
    let z = MIX_ROUNDS
        .iter()
        .fold(value.wrapping_add(GOLDEN), |z, (shift, mul)| {
            (z ^ (z >> shift)).wrapping_mul(*mul)
        });
    z ^ (z >> 16)
}

/// Uniform value in `[0, 1)`; only the top 24 bits are kept so the cast is exact.
pub fn rand_unit(seed: u32, salt: u32) -> f32 {
    (mix(seed ^ salt.wrapping_mul(GOLDEN)) >> 8) as f32 * UNIT_SCALE
}

pub fn rand_range(seed: u32, salt: u32, min: f32, max: f32) -> f32 {
    min + (max - min) * rand_unit(seed, salt)
}

pub fn cell_seed(base: u32, row: u32, col: u32) -> u32 {
    mix(base ^ row.wrapping_mul(MIX_ROUNDS[0].1) ^ col.wrapping_mul(MIX_ROUNDS[1].1))
}
