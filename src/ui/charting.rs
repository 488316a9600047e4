use crate::metrics::WpmSample;

/// X (seconds) and Y (wpm) upper bounds for the results chart
pub fn chart_bounds(samples: &[WpmSample]) -> (f64, f64) {
    let highest_wpm = samples.iter().map(|s| s.wpm).fold(0.0, f64::max);

    let overall_duration = samples.last().map_or(1.0, |s| s.t).max(1.0);

    (overall_duration, highest_wpm.round())
}

pub fn chart_points(samples: &[WpmSample]) -> Vec<(f64, f64)> {
    samples.iter().copied().map(Into::into).collect()
}

/// Whole numbers print bare, everything else with two decimals
pub fn format_label(val: f64) -> String {
    if (val - val.round()).abs() < f64::EPSILON {
        format!("{}", val.round())
    } else {
        format!("{val:.2}")
    }
}
