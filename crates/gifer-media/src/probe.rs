// crates/gifer-media/src/probe.rs
//
// In-process FFmpeg probing: duration, video dimensions and frame rate.

use std::path::Path;

use anyhow::{anyhow, Context, Result};

use ffmpeg_the_third as ffmpeg;
use ffmpeg::format::input;
use ffmpeg::media::Type;

use gifer_core::params::SourceInfo;

fn rational_to_f64(num: i32, den: i32) -> f64 {
    if den == 0 { 0.0 } else { num as f64 / den as f64 }
}

/// Open `path` and read the native properties of its best video stream.
pub fn probe_source(path: &Path) -> Result<SourceInfo> {
    let ictx = input(path).with_context(|| format!("cannot open {}", path.display()))?;

    let stream = ictx.streams().best(Type::Video)
        .ok_or_else(|| anyhow!("no video stream in {}", path.display()))?;

    let decoder = ffmpeg::codec::context::Context::from_parameters(stream.parameters())
        .context("codec parameters")?
        .decoder()
        .video()
        .context("video decoder")?;
    let (width, height) = (decoder.width(), decoder.height());
    if width == 0 || height == 0 {
        return Err(anyhow!("video stream reports a {width}x{height} frame size"));
    }

    let avg = stream.avg_frame_rate();
    let mut fps = rational_to_f64(avg.numerator(), avg.denominator());
    if fps <= 0.0 {
        let r = stream.rate();
        fps = rational_to_f64(r.numerator(), r.denominator());
    }

    // Container duration first, stream duration as fallback.
    let mut duration = ictx.duration() as f64 / ffmpeg::ffi::AV_TIME_BASE as f64;
    if duration <= 0.0 {
        let tb = stream.time_base();
        duration = stream.duration() as f64 * rational_to_f64(tb.numerator(), tb.denominator());
    }
    if duration <= 0.0 {
        return Err(anyhow!("duration unknown for {}", path.display()));
    }

    log::info!(
        "[media] probed {width}x{height} @ {fps:.3} fps, {duration:.2}s ← {}",
        path.display()
    );

    Ok(SourceInfo {
        duration,
        width:  width as f64,
        height: height as f64,
        fps,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rational_with_zero_denominator_is_zero() {
        assert_eq!(rational_to_f64(30, 0), 0.0);
        assert!((rational_to_f64(30000, 1001) - 29.97).abs() < 0.01);
    }
}
