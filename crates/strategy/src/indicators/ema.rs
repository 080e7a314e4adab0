/// Exponential moving average aligned with `data`.
///
/// Seeded with the SMA of the first `period` values; positions before the
/// seed are NaN, and so is every position when `period` exceeds the input.
/// A NaN input poisons every later value.
pub fn ema_series(data: &[f64], period: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; data.len()];
    if period == 0 || data.len() < period {
        return out;
    }

    let k = 2.0 / (period as f64 + 1.0);
    let mut ema_val: f64 = data[..period].iter().sum::<f64>() / period as f64;
    out[period - 1] = ema_val;

    for (i, &price) in data.iter().enumerate().skip(period) {
        ema_val = price * k + ema_val * (1.0 - k);
        out[i] = ema_val;
    }
    out
}

/// Fast and slow EMA windows for a series of `len` candles.
///
/// fast = clamp(len / 3, 10, 100), slow = clamp(len / 2, 20, 200).
pub fn adaptive_ema_windows(len: usize) -> (usize, usize) {
    ((len / 3).clamp(10, 100), (len / 2).clamp(20, 200))
}
