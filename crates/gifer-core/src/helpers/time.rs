// crates/gifer-core/src/helpers/time.rs
//
// Human-readable durations for the source info line and export status.

/// Format a duration in seconds as a compact string.
///
/// | Range    | Format      | Example    |
/// |----------|-------------|------------|
/// | ≥ 3600 s | `H:MM:SS`   | `1:04:35`  |
/// | ≥ 60 s   | `M:SS.s`    | `3:07.5`   |
/// | < 60 s   | `S.ss s`    | `4.20s`    |
///
/// ```
/// use gifer_core::helpers::time::format_seconds;
/// assert_eq!(format_seconds(4.2),    "4.20s");
/// assert_eq!(format_seconds(187.5),  "3:07.5");
/// assert_eq!(format_seconds(3875.0), "1:04:35");
/// ```
pub fn format_seconds(secs: f64) -> String {
    let secs = secs.max(0.0);
    if secs >= 3600.0 {
        let whole = secs as u64;
        format!("{}:{:02}:{:02}", whole / 3600, (whole % 3600) / 60, whole % 60)
    } else if secs >= 60.0 {
        let m = (secs / 60.0) as u64;
        format!("{m}:{:04.1}", secs - m as f64 * 60.0)
    } else {
        format!("{secs:.2}s")
    }
}

/// GIF frame delay in hundredths of a second for the given frame rate.
///
/// GIF stores delays in centiseconds, so anything above 100 fps collapses to
/// the 1 cs minimum.
///
/// ```
/// use gifer_core::helpers::time::gif_delay_cs;
/// assert_eq!(gif_delay_cs(10.0), 10);
/// assert_eq!(gif_delay_cs(24.0), 4);
/// ```
pub fn gif_delay_cs(fps: f64) -> u16 {
    if !fps.is_finite() || fps <= 0.0 {
        return 10;
    }
    (100.0 / fps).round().clamp(1.0, u16::MAX as f64) as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_durations_clamp_to_zero() {
        assert_eq!(format_seconds(-3.0), "0.00s");
    }

    #[test]
    fn minute_boundary() {
        assert_eq!(format_seconds(60.0), "1:00.0");
    }

    #[test]
    fn delay_handles_degenerate_rates() {
        assert_eq!(gif_delay_cs(0.0), 10);
        assert_eq!(gif_delay_cs(f64::NAN), 10);
        assert_eq!(gif_delay_cs(500.0), 1);
        assert_eq!(gif_delay_cs(29.97), 3);
    }
}
