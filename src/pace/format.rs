const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// Render a number of minutes as a `HH:MM:SS` clock string.
///
/// The fractional second is dropped and hours wrap at 24, the way a
/// time-of-day set from a seconds count behaves. Non-positive input is not
/// rejected here; callers keep the goal positive.
pub fn format_pace(minutes: f64) -> String {
    let seconds = minutes * 60.0;
    if !seconds.is_finite() {
        return "--:--:--".to_string();
    }

    // Absorb float drift such as 0.1 * 3 * 60 = 17.999999999999996.
    let whole = (seconds + 1e-9).floor() as i64;
    let of_day = whole.rem_euclid(SECONDS_PER_DAY);

    format!(
        "{:02}:{:02}:{:02}",
        of_day / 3600,
        (of_day % 3600) / 60,
        of_day % 60
    )
}
