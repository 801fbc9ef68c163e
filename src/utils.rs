/// Index and value of the largest element. Ties go to the first occurrence.
pub fn argmax(data: &[f64]) -> Option<(usize, f64)> {
    data.iter().enumerate().fold(None, |acc, (index, &value)| {
        match acc {
            None => Some((index, value)),
            Some((_, max_val)) if value > max_val => Some((index, value)),
            _ => acc
        }
    })
}

/// Exact-equality key for a coordinate. `-0.0` and `0.0` compare equal as
/// floats, so both map to the same key.
pub fn coordinate_key(x: f64, y: f64) -> (u64, u64) {
    ((x + 0.0).to_bits(), (y + 0.0).to_bits())
}
