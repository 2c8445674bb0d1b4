/// Reinterpret a raw trigger payload word as an IEEE-754 single.
///
/// This is a bit-cast of the big-endian word, never a numeric conversion.
pub fn decode_raw_float(word: u32) -> f64 {
    f64::from(f32::from_bits(word))
}
