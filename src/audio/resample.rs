/// Resample one channel by linear interpolation.
///
/// Produces `ceil(len * to_rate / from_rate)` samples. Positions past the
/// last input sample hold the last value.
pub fn resample_linear(samples: &[f32], from_rate: u32, to_rate: u32) -> Vec<f32> {
    if from_rate == to_rate || samples.is_empty() || from_rate == 0 || to_rate == 0 {
        return samples.to_vec();
    }

    let ratio = f64::from(from_rate) / f64::from(to_rate);
    let output_len =
        (samples.len() as u64 * u64::from(to_rate)).div_ceil(u64::from(from_rate)) as usize;
    let last = samples.len() - 1;

    (0..output_len)
        .map(|i| {
            let position = i as f64 * ratio;
            let index = position.floor() as usize;
            let t = (position - position.floor()) as f32;

            let a = samples[index.min(last)];
            let b = samples[(index + 1).min(last)];
            a + (b - a) * t
        })
        .collect()
}
