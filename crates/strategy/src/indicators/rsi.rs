/// RSI (Relative Strength Index) indicator.
///
/// Uses Wilder's smoothed moving average (same as TradingView / standard RSI).
/// Values are undefined until at least `period + 1` closes are available.
#[derive(Debug, Clone)]
pub struct RsiIndicator {
    pub period: usize,
}

impl Default for RsiIndicator {
    fn default() -> Self {
        Self { period: 14 }
    }
}

impl RsiIndicator {
    pub fn new(period: usize) -> Self {
        Self {
            period: period.max(2),
        }
    }

    /// RSI aligned with `closes` (oldest first). Positions before `period` are NaN.
    pub fn series(&self, closes: &[f64]) -> Vec<f64> {
        let mut out = vec![f64::NAN; closes.len()];
        if closes.len() < self.period + 1 {
            return out;
        }

        let period = self.period as f64;
        let changes: Vec<f64> = closes.windows(2).map(|w| w[1] - w[0]).collect();
        let initial = &changes[..self.period];

        // First average gain/loss over the initial `period` changes
        let mut avg_gain = initial.iter().filter(|&&c| c > 0.0).sum::<f64>() / period;
        let mut avg_loss = initial.iter().filter(|&&c| c < 0.0).map(|c| c.abs()).sum::<f64>() / period;
        out[self.period] = rsi_value(avg_gain, avg_loss);

        // Wilder smoothing over remaining changes
        for (offset, &change) in changes[self.period..].iter().enumerate() {
            let gain = if change > 0.0 { change } else { 0.0 };
            let loss = if change < 0.0 { change.abs() } else { 0.0 };
            avg_gain = (avg_gain * (period - 1.0) + gain) / period;
            avg_loss = (avg_loss * (period - 1.0) + loss) / period;
            out[self.period + offset + 1] = rsi_value(avg_gain, avg_loss);
        }
        out
    }

    /// Latest RSI, or `None` if there are fewer than `period + 1` values.
    pub fn compute(&self, closes: &[f64]) -> Option<f64> {
        self.series(closes).last().copied().filter(|v| !v.is_nan())
    }
}

fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        // No movement at all reads as neutral rather than overbought
        return if avg_gain == 0.0 { 50.0 } else { 100.0 };
    }
    let rs = avg_gain / avg_loss;
    100.0 - 100.0 / (1.0 + rs)
}
