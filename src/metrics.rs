//! Speed and accuracy formulas shared by the live ticker and the final
//! report of a completed session.

use std::time::Duration;

/// Characters counted as one word when converting to words per minute.
pub const CHARS_PER_WORD: f64 = 4.5;

const SECONDS_PER_MINUTE: f64 = 60.0;
const HUNDRED: f64 = 100.0;

/// One live reading taken on a timer tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WpmSample {
    /// Seconds since the first keystroke.
    pub t: f64,
    pub wpm: f64,
}

impl WpmSample {
    pub fn new(t: f64, wpm: f64) -> Self {
        Self { t, wpm }
    }
}

impl From<WpmSample> for (f64, f64) {
    fn from(s: WpmSample) -> Self {
        (s.t, s.wpm)
    }
}

/// Counters a metrics evaluation reads from the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Snapshot {
    pub typed_count: usize,
    pub error_count: usize,
    pub target_len: usize,
    pub elapsed_ticks: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    pub raw_wpm: f64,
    pub accuracy: f64,
    pub net_wpm: f64,
    pub elapsed_secs: f64,
    pub typed_count: usize,
    pub error_count: usize,
    /// Standard deviation of the live net-wpm samples; 0 with fewer than two.
    pub consistency: f64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self {
            raw_wpm: 0.0,
            accuracy: HUNDRED,
            net_wpm: 0.0,
            elapsed_secs: 0.0,
            typed_count: 0,
            error_count: 0,
            consistency: 0.0,
        }
    }
}

impl Metrics {
    pub fn compute(
        snapshot: Snapshot,
        tick_period: Duration,
        chars_per_word: f64,
        samples: &[WpmSample],
    ) -> Self {
        let elapsed_secs = elapsed_secs(snapshot.elapsed_ticks, tick_period);
        let raw_wpm = raw_wpm(
            snapshot.typed_count,
            chars_per_word,
            elapsed_secs / SECONDS_PER_MINUTE,
        );
        let accuracy = accuracy(snapshot.error_count, snapshot.target_len);

        Self {
            raw_wpm,
            accuracy,
            net_wpm: net_wpm(raw_wpm, accuracy),
            elapsed_secs,
            typed_count: snapshot.typed_count,
            error_count: snapshot.error_count,
            consistency: consistency(samples),
        }
    }
}

pub fn elapsed_secs(elapsed_ticks: u64, tick_period: Duration) -> f64 {
    elapsed_ticks as f64 * tick_period.as_secs_f64()
}

pub fn raw_wpm(typed_count: usize, chars_per_word: f64, minutes: f64) -> f64 {
    if minutes <= 0.0 || chars_per_word <= 0.0 {
        return 0.0;
    }
    (typed_count as f64 / chars_per_word) / minutes
}

/// Error rate against the whole target, floored at zero. An empty target has
/// nothing to get wrong and scores 100.
pub fn accuracy(error_count: usize, target_len: usize) -> f64 {
    if target_len == 0 {
        return HUNDRED;
    }
    (HUNDRED - (error_count as f64 / target_len as f64) * HUNDRED).max(0.0)
}

pub fn net_wpm(raw_wpm: f64, accuracy: f64) -> f64 {
    raw_wpm * accuracy / HUNDRED
}

/// Spread of the live wpm readings; 0 until there are two of them.
pub fn consistency(samples: &[WpmSample]) -> f64 {
    if samples.len() < 2 {
        return 0.0;
    }
    let wpms: Vec<f64> = samples.iter().map(|s| s.wpm).collect();
    std_dev(&wpms).unwrap_or_default()
}

pub fn mean(data: &[f64]) -> Option<f64> {
    match data.len() {
        0 => None,
        count => Some(data.iter().sum::<f64>() / count as f64),
    }
}

pub fn std_dev(data: &[f64]) -> Option<f64> {
    let data_mean = mean(data)?;
    let variance = data
        .iter()
        .map(|value| {
            let diff = data_mean - *value;
            diff * diff
        })
        .sum::<f64>()
        / data.len() as f64;

    Some(variance.sqrt())
}
