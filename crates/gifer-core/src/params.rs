// crates/gifer-core/src/params.rs
//
// ClipParameters: every number the user can type into the parameter panel,
// plus the immutable snapshot of the opened source.
//
// Pure bookkeeping - no I/O, no egui, no ffmpeg. The UI applies one setter per
// field edit; the export path reads a validated RenderPlan once
// `is_render_ready()` is true.
//
// Size precedence (scale vs explicit width/height):
//   Last edit wins. `set_scale` overwrites both dimensions from the source
//   size; any `set_target_dimension` call clears the scale. `output_size()`
//   therefore never has to guess which of the two the user meant.
//
// Every setter validates before mutating, so a rejected edit leaves the
// previous state untouched.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ParamError;

/// Slack when comparing a trim end against the probed duration; container
/// durations are rarely exact to the microsecond.
const DURATION_EPSILON: f64 = 1e-3;

/// Largest side a GIF logical screen can describe (u16 on the wire).
pub const MAX_GIF_SIDE: u32 = u16::MAX as u32;

// ── Source snapshot ───────────────────────────────────────────────────────────

/// Native properties of the opened video, captured once by the probe.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SourceInfo {
    /// Seconds.
    pub duration: f64,
    pub width:    f64,
    pub height:   f64,
    /// Average frame rate; 0.0 when the container does not report one.
    pub fps:      f64,
}

impl SourceInfo {
    fn side(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Width  => self.width,
            Axis::Height => self.height,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    Width,
    Height,
}

impl Axis {
    pub fn other(self) -> Axis {
        match self {
            Axis::Width  => Axis::Height,
            Axis::Height => Axis::Width,
        }
    }
}

// ── Render plan ───────────────────────────────────────────────────────────────

/// Fully resolved export settings. Every field is validated and concrete, so
/// the media crate never has to consult defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RenderPlan {
    pub source:   PathBuf,
    pub start:    f64,
    pub end:      f64,
    pub width:    u32,
    pub height:   u32,
    /// Output frames per second.
    pub fps:      f64,
    /// Playback speed factor; 2.0 plays twice as fast.
    pub speed:    f64,
    /// Append the clip reversed so the GIF plays forward then backward.
    pub mirrored: bool,
    /// Colour tolerance in percent for transparency optimisation.
    pub fuzz:     Option<f64>,
}

impl RenderPlan {
    /// Length of the GIF's forward pass in seconds, after the speed change.
    pub fn output_duration(&self) -> f64 {
        (self.end - self.start) / self.speed
    }

    /// Expected number of GIF frames, used for progress reporting only.
    pub fn estimated_frames(&self) -> u64 {
        let forward = (self.output_duration() * self.fps).ceil().max(1.0) as u64;
        if self.mirrored { forward * 2 } else { forward }
    }
}

// ── ClipParameters ────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ClipParameters {
    source_path:    Option<PathBuf>,
    source:         Option<SourceInfo>,
    trim_start:     Option<f64>,
    trim_end:       Option<f64>,
    target_width:   Option<f64>,
    target_height:  Option<f64>,
    target_scale:   Option<f64>,
    output_fps:     Option<f64>,
    playback_speed: f64,
    mirrored:       bool,
    color_fuzz:     Option<f64>,
}

impl Default for ClipParameters {
    fn default() -> Self {
        Self {
            source_path:    None,
            source:         None,
            trim_start:     None,
            trim_end:       None,
            target_width:   None,
            target_height:  None,
            target_scale:   None,
            output_fps:     None,
            playback_speed: 1.0,
            mirrored:       false,
            color_fuzz:     None,
        }
    }
}

fn positive(name: &str, v: f64) -> Result<f64, ParamError> {
    if v.is_finite() && v > 0.0 {
        Ok(v)
    } else {
        Err(ParamError::invalid(format!("{name} must be a positive number, got {v}")))
    }
}

fn non_negative(name: &str, v: f64) -> Result<f64, ParamError> {
    if v.is_finite() && v >= 0.0 {
        Ok(v)
    } else {
        Err(ParamError::invalid(format!("{name} must not be negative, got {v}")))
    }
}

impl ClipParameters {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Getters ──────────────────────────────────────────────────────────────

    pub fn source_path(&self)    -> Option<&Path>       { self.source_path.as_deref() }
    pub fn source(&self)         -> Option<&SourceInfo> { self.source.as_ref() }
    pub fn trim_start(&self)     -> Option<f64>         { self.trim_start }
    pub fn trim_end(&self)       -> Option<f64>         { self.trim_end }
    pub fn target_width(&self)   -> Option<f64>         { self.target_width }
    pub fn target_height(&self)  -> Option<f64>         { self.target_height }
    pub fn target_scale(&self)   -> Option<f64>         { self.target_scale }
    pub fn output_fps(&self)     -> Option<f64>         { self.output_fps }
    pub fn playback_speed(&self) -> f64                 { self.playback_speed }
    pub fn mirrored(&self)       -> bool                { self.mirrored }
    pub fn color_fuzz(&self)     -> Option<f64>         { self.color_fuzz }

    pub fn target_dimension(&self, axis: Axis) -> Option<f64> {
        match axis {
            Axis::Width  => self.target_width,
            Axis::Height => self.target_height,
        }
    }

    fn target_dimension_mut(&mut self, axis: Axis) -> &mut Option<f64> {
        match axis {
            Axis::Width  => &mut self.target_width,
            Axis::Height => &mut self.target_height,
        }
    }

    // ── Setters ──────────────────────────────────────────────────────────────

    /// Record a newly opened video. Target dimensions and scale from the
    /// previous source are dropped since their aspect ratio no longer applies,
    /// and so are the trim bounds, which may lie past the new duration.
    pub fn set_source(
        &mut self,
        path:     impl Into<PathBuf>,
        duration: f64,
        width:    f64,
        height:   f64,
        fps:      f64,
    ) -> Result<(), ParamError> {
        let path = path.into();
        if path.as_os_str().is_empty() {
            return Err(ParamError::invalid("source path is empty"));
        }
        let info = SourceInfo {
            duration: non_negative("source duration", duration)?,
            width:    positive("source width", width)?,
            height:   positive("source height", height)?,
            fps:      non_negative("source fps", fps)?,
        };

        self.source_path   = Some(path);
        self.source        = Some(info);
        self.trim_start    = None;
        self.trim_end      = None;
        self.target_width  = None;
        self.target_height = None;
        self.target_scale  = None;
        Ok(())
    }

    /// Update either or both trim bounds. A `None` bound is left as it is.
    pub fn set_trim(&mut self, start: Option<f64>, end: Option<f64>) -> Result<(), ParamError> {
        if let Some(s) = start { non_negative("start time", s)?; }
        if let Some(e) = end   { non_negative("end time", e)?; }

        let new_start = start.or(self.trim_start);
        let new_end   = end.or(self.trim_end);

        if let (Some(s), Some(e)) = (new_start, new_end) {
            if s > e {
                return Err(ParamError::invalid(format!(
                    "start time {s} is after end time {e}"
                )));
            }
        }
        if let (Some(e), Some(src)) = (new_end, self.source) {
            if e > src.duration + DURATION_EPSILON {
                return Err(ParamError::invalid(format!(
                    "end time {e} is past the end of the video ({})", src.duration
                )));
            }
        }

        self.trim_start = new_start;
        self.trim_end   = new_end;
        Ok(())
    }

    /// Set (or with `None`, clear) one output dimension.
    ///
    /// If the other dimension is still unset and a source is loaded, it is
    /// filled in to keep the source aspect ratio. A value the user already
    /// entered is never overwritten. Any dimension edit drops the scale.
    pub fn set_target_dimension(&mut self, axis: Axis, value: Option<f64>) -> Result<(), ParamError> {
        let Some(v) = value else {
            *self.target_dimension_mut(axis) = None;
            self.target_scale = None;
            return Ok(());
        };
        let v = positive("output size", v)?;

        *self.target_dimension_mut(axis) = Some(v);
        self.target_scale = None;

        let other = axis.other();
        if self.target_dimension(other).is_none() {
            if let Some(src) = self.source {
                *self.target_dimension_mut(other) = Some(v / src.side(axis) * src.side(other));
            }
        }
        Ok(())
    }

    /// Scale the source size by `ratio`. `None` or zero switches back to
    /// explicit dimensions, which keep whatever the last scale produced.
    pub fn set_scale(&mut self, ratio: Option<f64>) -> Result<(), ParamError> {
        match ratio {
            None => self.target_scale = None,
            Some(r) if r == 0.0 => self.target_scale = None,
            Some(r) => {
                let r = positive("scale", r)?;
                self.target_scale = Some(r);
                if let Some(src) = self.source {
                    self.target_width  = Some(r * src.width);
                    self.target_height = Some(r * src.height);
                }
            }
        }
        Ok(())
    }

    pub fn set_output_fps(&mut self, fps: Option<f64>) -> Result<(), ParamError> {
        self.output_fps = match fps {
            None | Some(0.0) => None,
            Some(f) => Some(positive("fps", f)?),
        };
        Ok(())
    }

    pub fn set_playback_speed(&mut self, speed: Option<f64>) -> Result<(), ParamError> {
        self.playback_speed = match speed {
            None | Some(0.0) => 1.0,
            Some(s) => positive("speed", s)?,
        };
        Ok(())
    }

    pub fn set_mirrored(&mut self, mirrored: bool) {
        self.mirrored = mirrored;
    }

    pub fn set_color_fuzz(&mut self, percent: Option<f64>) -> Result<(), ParamError> {
        self.color_fuzz = match percent {
            None | Some(0.0) => None,
            Some(p) if p.is_finite() && p > 0.0 && p <= 100.0 => Some(p),
            Some(p) => {
                return Err(ParamError::invalid(format!(
                    "fuzz must be between 0 and 100 percent, got {p}"
                )))
            }
        };
        Ok(())
    }

    /// Seed both dimensions from the source size and drop any scale.
    /// No-op without a source.
    pub fn use_source_dimensions(&mut self) {
        if let Some(src) = self.source {
            self.target_width  = Some(src.width);
            self.target_height = Some(src.height);
            self.target_scale  = None;
        }
    }

    // ── Queries ──────────────────────────────────────────────────────────────

    /// True once a video is opened and both trim bounds are known.
    pub fn is_render_ready(&self) -> bool {
        self.source_path.is_some() && self.trim_start.is_some() && self.trim_end.is_some()
    }

    /// Effective output size before rounding to pixels.
    ///
    /// Scale (with a source) first, then explicit dimensions with the missing
    /// side derived from the source aspect ratio, then the source size itself.
    pub fn output_size(&self) -> Option<(f64, f64)> {
        if let (Some(r), Some(src)) = (self.target_scale, self.source) {
            return Some((r * src.width, r * src.height));
        }
        match (self.target_width, self.target_height, self.source) {
            (Some(w), Some(h), _)        => Some((w, h)),
            (Some(w), None, Some(src))   => Some((w, w / src.width * src.height)),
            (None, Some(h), Some(src))   => Some((h / src.height * src.width, h)),
            (None, None, Some(src))      => Some((src.width, src.height)),
            _                            => None,
        }
    }

    /// Validate and resolve everything an export needs.
    pub fn render_plan(&self) -> Result<RenderPlan, ParamError> {
        let source = self.source_path.clone()
            .ok_or_else(|| ParamError::invalid("no video opened"))?;
        let start = self.trim_start
            .ok_or_else(|| ParamError::invalid("start time is not set"))?;
        let end = self.trim_end
            .ok_or_else(|| ParamError::invalid("end time is not set"))?;
        if end <= start {
            return Err(ParamError::invalid("end time must be after start time"));
        }
        if let Some(src) = self.source {
            if end > src.duration + DURATION_EPSILON {
                return Err(ParamError::invalid(format!(
                    "end time {end} is past the end of the video ({})", src.duration
                )));
            }
        }

        let (w, h) = self.output_size()
            .ok_or_else(|| ParamError::invalid("output size is not set"))?;
        let width  = (w.round() as u32).max(1);
        let height = (h.round() as u32).max(1);
        if width > MAX_GIF_SIDE || height > MAX_GIF_SIDE {
            return Err(ParamError::invalid(format!(
                "{width}x{height} exceeds the GIF limit of {MAX_GIF_SIDE} px per side"
            )));
        }

        let fps = self.output_fps
            .or_else(|| self.source.map(|s| s.fps).filter(|f| *f > 0.0))
            .ok_or_else(|| ParamError::invalid("fps is not set"))?;

        Ok(RenderPlan {
            source,
            start,
            end,
            width,
            height,
            fps,
            speed:    self.playback_speed,
            mirrored: self.mirrored,
            fuzz:     self.color_fuzz,
        })
    }

    /// Clear every user edit. With `keep_source` (and a loaded source) the
    /// fields are re-seeded from the source: full-length trim, native size,
    /// native fps.
    pub fn reset(&mut self, keep_source: bool) {
        let kept = if keep_source {
            self.source_path.take().zip(self.source)
        } else {
            None
        };

        *self = Self::default();

        if let Some((path, src)) = kept {
            self.source_path   = Some(path);
            self.source        = Some(src);
            self.trim_start    = Some(0.0);
            self.trim_end      = Some(src.duration);
            self.target_width  = Some(src.width);
            self.target_height = Some(src.height);
            self.output_fps    = Some(src.fps).filter(|f| *f > 0.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded(w: f64, h: f64, duration: f64) -> ClipParameters {
        let mut p = ClipParameters::new();
        p.set_source("clip.mp4", duration, w, h, 25.0).unwrap();
        p
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn empty_source_path_is_rejected() {
        let mut p = ClipParameters::new();
        assert!(matches!(p.set_source("", 1.0, 10.0, 10.0, 25.0), Err(ParamError::InvalidInput(_))));
        assert!(p.source().is_none());
    }

    #[test]
    fn zero_sized_source_is_rejected() {
        let mut p = ClipParameters::new();
        assert!(p.set_source("a.mp4", 1.0, 0.0, 10.0, 25.0).is_err());
        assert!(p.source_path().is_none());
    }

    #[test]
    fn new_source_clears_derived_dimensions() {
        let mut p = loaded(640.0, 480.0, 10.0);
        p.set_scale(Some(0.5)).unwrap();
        p.set_source("other.mp4", 5.0, 1920.0, 1080.0, 30.0).unwrap();
        assert_eq!(p.target_width(), None);
        assert_eq!(p.target_height(), None);
        assert_eq!(p.target_scale(), None);
    }

    #[test]
    fn new_source_drops_trim_window() {
        let mut p = loaded(640.0, 480.0, 60.0);
        p.set_trim(Some(30.0), Some(50.0)).unwrap();
        p.set_source("short.mp4", 10.0, 640.0, 480.0, 25.0).unwrap();

        assert_eq!((p.trim_start(), p.trim_end()), (None, None));
        assert!(!p.is_render_ready());
        assert!(p.render_plan().is_err());

        p.reset(true);
        assert_eq!((p.trim_start(), p.trim_end()), (Some(0.0), Some(10.0)));
        assert_eq!(p.render_plan().unwrap().end, 10.0);
    }

    #[test]
    fn render_plan_rejects_end_past_duration() {
        // Only reachable by editing the struct directly; the setters refuse it.
        let mut p = loaded(640.0, 480.0, 10.0);
        p.trim_start = Some(0.0);
        p.trim_end   = Some(12.0);
        assert!(matches!(p.render_plan(), Err(ParamError::InvalidInput(_))));
        p.trim_end   = Some(10.0005);
        assert!(p.render_plan().is_ok());
    }

    #[test]
    fn scale_sets_both_dimensions() {
        let mut p = loaded(640.0, 480.0, 10.0);
        for ratio in [0.25, 0.5, 1.0, 1.7, 3.0] {
            p.set_scale(Some(ratio)).unwrap();
            assert!(close(p.target_width().unwrap(), ratio * 640.0));
            assert!(close(p.target_height().unwrap(), ratio * 480.0));
        }
    }

    #[test]
    fn zero_or_missing_scale_clears_it() {
        let mut p = loaded(640.0, 480.0, 10.0);
        p.set_scale(Some(0.5)).unwrap();
        p.set_scale(Some(0.0)).unwrap();
        assert_eq!(p.target_scale(), None);
        // Dimensions keep what the scale produced.
        assert_eq!(p.target_width(), Some(320.0));
        p.set_scale(Some(2.0)).unwrap();
        p.set_scale(None).unwrap();
        assert_eq!(p.target_scale(), None);
    }

    #[test]
    fn negative_scale_is_rejected_and_state_kept() {
        let mut p = loaded(640.0, 480.0, 10.0);
        p.set_scale(Some(0.5)).unwrap();
        assert!(p.set_scale(Some(-1.0)).is_err());
        assert_eq!(p.target_scale(), Some(0.5));
    }

    #[test]
    fn width_fills_in_missing_height() {
        let mut p = loaded(640.0, 480.0, 10.0);
        p.set_target_dimension(Axis::Width, Some(320.0)).unwrap();
        assert!(close(p.target_height().unwrap(), 320.0 / 640.0 * 480.0));
    }

    #[test]
    fn height_fills_in_missing_width() {
        let mut p = loaded(640.0, 480.0, 10.0);
        p.set_target_dimension(Axis::Height, Some(120.0)).unwrap();
        assert!(close(p.target_width().unwrap(), 160.0));
    }

    #[test]
    fn auto_fill_never_overrides_user_value() {
        let mut p = loaded(640.0, 480.0, 10.0);
        p.set_target_dimension(Axis::Height, Some(100.0)).unwrap();
        p.set_target_dimension(Axis::Width, Some(500.0)).unwrap();
        assert_eq!(p.target_height(), Some(100.0));
        assert_eq!(p.target_width(), Some(500.0));
    }

    #[test]
    fn dimension_without_source_does_not_derive() {
        let mut p = ClipParameters::new();
        p.set_target_dimension(Axis::Width, Some(200.0)).unwrap();
        assert_eq!(p.target_height(), None);
        assert_eq!(p.output_size(), None);
    }

    #[test]
    fn dimension_edit_supersedes_scale() {
        let mut p = loaded(640.0, 480.0, 10.0);
        p.set_scale(Some(0.5)).unwrap();
        p.set_target_dimension(Axis::Width, Some(100.0)).unwrap();
        assert_eq!(p.target_scale(), None);
        assert_eq!(p.output_size(), Some((100.0, 240.0)));
    }

    #[test]
    fn non_positive_dimension_is_rejected() {
        let mut p = loaded(640.0, 480.0, 10.0);
        assert!(p.set_target_dimension(Axis::Width, Some(0.0)).is_err());
        assert!(p.set_target_dimension(Axis::Height, Some(-3.0)).is_err());
        assert_eq!(p.target_width(), None);
    }

    #[test]
    fn render_ready_needs_path_and_both_bounds() {
        let mut p = ClipParameters::new();
        assert!(!p.is_render_ready());
        p.set_trim(Some(0.0), Some(1.0)).unwrap();
        assert!(!p.is_render_ready());

        let mut p = loaded(640.0, 480.0, 10.0);
        assert!(!p.is_render_ready());
        p.set_trim(Some(1.0), None).unwrap();
        assert!(!p.is_render_ready());
        p.set_trim(None, Some(2.0)).unwrap();
        assert!(p.is_render_ready());
    }

    #[test]
    fn partial_trim_keeps_other_bound() {
        let mut p = loaded(640.0, 480.0, 10.0);
        p.set_trim(Some(2.0), Some(8.0)).unwrap();
        p.set_trim(Some(3.0), None).unwrap();
        assert_eq!((p.trim_start(), p.trim_end()), (Some(3.0), Some(8.0)));
        p.set_trim(None, Some(9.0)).unwrap();
        assert_eq!((p.trim_start(), p.trim_end()), (Some(3.0), Some(9.0)));
    }

    #[test]
    fn invalid_trim_is_rejected_and_state_kept() {
        let mut p = loaded(640.0, 480.0, 10.0);
        p.set_trim(Some(2.0), Some(8.0)).unwrap();
        assert!(p.set_trim(Some(-1.0), None).is_err());
        assert!(p.set_trim(Some(9.0), None).is_err());
        assert!(p.set_trim(None, Some(10.5)).is_err());
        assert!(p.set_trim(None, Some(f64::NAN)).is_err());
        assert_eq!((p.trim_start(), p.trim_end()), (Some(2.0), Some(8.0)));
    }

    #[test]
    fn plain_setters_fall_back_to_defaults() {
        let mut p = loaded(640.0, 480.0, 10.0);
        p.set_output_fps(Some(12.0)).unwrap();
        p.set_output_fps(None).unwrap();
        assert_eq!(p.output_fps(), None);

        p.set_playback_speed(Some(2.0)).unwrap();
        p.set_playback_speed(Some(0.0)).unwrap();
        assert_eq!(p.playback_speed(), 1.0);

        p.set_color_fuzz(Some(3.0)).unwrap();
        p.set_color_fuzz(None).unwrap();
        assert_eq!(p.color_fuzz(), None);

        assert!(p.set_color_fuzz(Some(150.0)).is_err());
        assert!(p.set_playback_speed(Some(-1.0)).is_err());
        assert!(p.set_output_fps(Some(-5.0)).is_err());
    }

    #[test]
    fn reset_keeping_source_reseeds_from_it() {
        let mut p = loaded(640.0, 480.0, 10.0);
        p.set_trim(Some(2.0), Some(3.0)).unwrap();
        p.set_scale(Some(0.5)).unwrap();
        p.set_mirrored(true);
        p.set_playback_speed(Some(2.0)).unwrap();

        p.reset(true);
        assert_eq!(p.trim_start(), Some(0.0));
        assert_eq!(p.trim_end(), Some(10.0));
        assert_eq!((p.target_width(), p.target_height()), (Some(640.0), Some(480.0)));
        assert_eq!(p.output_fps(), Some(25.0));
        assert_eq!(p.target_scale(), None);
        assert_eq!(p.playback_speed(), 1.0);
        assert!(!p.mirrored());
        assert!(p.is_render_ready());
    }

    #[test]
    fn reset_without_source_blanks_everything() {
        let mut p = loaded(640.0, 480.0, 10.0);
        p.set_trim(Some(2.0), Some(3.0)).unwrap();
        p.reset(false);
        assert_eq!(p, ClipParameters::default());
        assert!(p.source_path().is_none());
    }

    #[test]
    fn reset_keep_source_with_nothing_loaded_is_blank() {
        let mut p = ClipParameters::new();
        p.set_trim(Some(1.0), Some(2.0)).unwrap();
        p.reset(true);
        assert_eq!(p, ClipParameters::default());
    }

    #[test]
    fn render_plan_resolves_defaults() {
        let mut p = loaded(640.0, 480.0, 10.0);
        p.reset(true);
        p.set_output_fps(None).unwrap();
        p.set_target_dimension(Axis::Width, None).unwrap();
        let plan = p.render_plan().unwrap();
        assert_eq!((plan.width, plan.height), (640, 480));
        assert_eq!(plan.fps, 25.0);
        assert_eq!(plan.speed, 1.0);
        assert_eq!(plan.estimated_frames(), 250);
    }

    #[test]
    fn render_plan_rejects_empty_clip() {
        let mut p = loaded(640.0, 480.0, 10.0);
        p.set_trim(Some(4.0), Some(4.0)).unwrap();
        assert!(p.render_plan().is_err());
    }

    #[test]
    fn mirrored_plan_doubles_frame_estimate() {
        let mut p = loaded(640.0, 480.0, 10.0);
        p.set_trim(Some(0.0), Some(2.0)).unwrap();
        p.set_output_fps(Some(10.0)).unwrap();
        p.set_playback_speed(Some(2.0)).unwrap();
        p.set_mirrored(true);
        let plan = p.render_plan().unwrap();
        assert_eq!(plan.output_duration(), 1.0);
        assert_eq!(plan.estimated_frames(), 20);
    }
}
