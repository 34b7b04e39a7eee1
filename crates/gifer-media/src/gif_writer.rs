// crates/gifer-media/src/gif_writer.rs
//
// Streaming GIF encoder on top of the `gif` crate.
//
// Frames arrive as tightly packed RGBA at the output size. Each frame is
// quantised to its own 256-colour palette (NeuQuant inside the gif crate).
//
// Fuzz / transparency optimisation:
//   With a fuzz tolerance set, every frame after the first is compared with
//   what a viewer is already showing (`canvas`). Pixels whose colour lies
//   within `fuzz` percent of the RGB cube diagonal are written as transparent
//   so the previous frame shows through (dispose = Keep). Long static areas
//   then compress to runs of one index, which is where the size win comes
//   from. The canvas is only updated for pixels that are actually written,
//   so small drifts cannot accumulate past the tolerance.
//
// Replay:
//   `write_and_keep` also hands back the whole frame in indexed form, a
//   quarter of the RGBA size, so mirrored exports can hold the forward pass
//   in memory and `replay` it backwards.

use std::borrow::Cow;
use std::io::Write;

use anyhow::{ensure, Context, Result};
use gif::{DisposalMethod, Encoder, Frame, Repeat};

use gifer_core::helpers::time::gif_delay_cs;

/// NeuQuant sampling factor: 1 is best quality, 30 fastest. 10 is the gif
/// crate's recommended middle ground.
const QUANT_SPEED: i32 = 10;

/// Largest possible RGB distance, |(255, 255, 255)|.
const MAX_RGB_DISTANCE: f64 = 441.672_955_930_063_7;

pub struct GifWriter<W: Write> {
    encoder:  Encoder<W>,
    width:    u16,
    height:   u16,
    delay_cs: u16,
    fuzz:     Option<f64>,
    canvas:   Option<Vec<u8>>,
    frames:   u64,
}

impl<W: Write> GifWriter<W> {
    pub fn new(out: W, width: u32, height: u32, fps: f64, fuzz: Option<f64>) -> Result<Self> {
        let w = u16::try_from(width).context("GIF width exceeds 65535")?;
        let h = u16::try_from(height).context("GIF height exceeds 65535")?;
        ensure!(w > 0 && h > 0, "GIF size must be non-zero, got {width}x{height}");

        let mut encoder = Encoder::new(out, w, h, &[]).context("create GIF encoder")?;
        encoder.set_repeat(Repeat::Infinite).context("set GIF loop")?;

        Ok(Self {
            encoder,
            width:    w,
            height:   h,
            delay_cs: gif_delay_cs(fps),
            fuzz:     fuzz.filter(|f| *f > 0.0),
            canvas:   None,
            frames:   0,
        })
    }

    pub fn frames_written(&self) -> u64 {
        self.frames
    }

    fn check_len(&self, rgba: &[u8]) -> Result<()> {
        let expected = self.width as usize * self.height as usize * 4;
        ensure!(
            rgba.len() == expected,
            "frame is {} bytes, expected {expected}", rgba.len()
        );
        Ok(())
    }

    /// Encode one RGBA frame of exactly `width * height * 4` bytes.
    pub fn write_frame(&mut self, rgba: &[u8]) -> Result<()> {
        self.check_len(rgba)?;
        let mut frame = self.quantize_for_screen(rgba);
        self.emit(&mut frame)
    }

    /// Like `write_frame`, also returning the frame in indexed form for a
    /// later `replay`.
    pub fn write_and_keep(&mut self, rgba: &[u8]) -> Result<IndexedFrame> {
        self.check_len(rgba)?;
        if self.fuzz.is_some() {
            // The written frame only carries what changed; keep the whole one.
            let kept = IndexedFrame::quantize(self.width, self.height, rgba);
            self.write_frame(rgba)?;
            return Ok(kept);
        }
        let mut frame = self.quantize_for_screen(rgba);
        self.emit(&mut frame)?;
        Ok(IndexedFrame::from(frame))
    }

    /// Write a frame kept by `write_and_keep`. Without fuzz the stored palette
    /// is reused as is; with fuzz the frame goes through the canvas again.
    pub fn replay(&mut self, kept: &IndexedFrame) -> Result<()> {
        ensure!(
            kept.indices.len() == self.width as usize * self.height as usize,
            "kept frame does not match the GIF size"
        );
        if self.fuzz.is_some() {
            return self.write_frame(&kept.to_rgba());
        }
        let mut frame = Frame {
            width:       self.width,
            height:      self.height,
            buffer:      Cow::Borrowed(kept.indices.as_slice()),
            palette:     Some(kept.palette.clone()),
            transparent: kept.transparent,
            ..Frame::default()
        };
        self.emit(&mut frame)
    }

    fn quantize_for_screen(&mut self, rgba: &[u8]) -> Frame<'static> {
        let mut pixels = rgba.to_vec();
        if let Some(fuzz) = self.fuzz {
            match self.canvas.as_mut() {
                Some(canvas) => optimize_transparency(canvas, &mut pixels, fuzz),
                None         => self.canvas = Some(rgba.to_vec()),
            }
        }
        Frame::from_rgba_speed(self.width, self.height, &mut pixels, QUANT_SPEED)
    }

    fn emit(&mut self, frame: &mut Frame<'_>) -> Result<()> {
        frame.delay   = self.delay_cs;
        frame.dispose = DisposalMethod::Keep;
        self.encoder.write_frame(frame).context("write GIF frame")?;
        self.frames += 1;
        Ok(())
    }

    /// Write the trailer and hand back the underlying writer.
    pub fn finish(self) -> Result<W> {
        self.encoder.into_inner().context("finish GIF")
    }
}

/// A whole frame reduced to its own palette: one byte per pixel plus at most
/// 256 RGB entries.
#[derive(Clone, Debug, PartialEq)]
pub struct IndexedFrame {
    palette:     Vec<u8>,
    indices:     Vec<u8>,
    transparent: Option<u8>,
}

impl IndexedFrame {
    fn quantize(width: u16, height: u16, rgba: &[u8]) -> Self {
        let mut pixels = rgba.to_vec();
        Self::from(Frame::from_rgba_speed(width, height, &mut pixels, QUANT_SPEED))
    }

    /// Bytes held in memory.
    pub fn size(&self) -> usize {
        self.palette.len() + self.indices.len()
    }

    /// Expand back to RGBA through the palette.
    pub fn to_rgba(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.indices.len() * 4);
        for &i in &self.indices {
            let at = i as usize * 3;
            match self.palette.get(at..at + 3) {
                Some(rgb) if self.transparent != Some(i) => {
                    out.extend_from_slice(rgb);
                    out.push(255);
                }
                _ => out.extend_from_slice(&[0, 0, 0, 0]),
            }
        }
        out
    }
}

impl From<Frame<'static>> for IndexedFrame {
    fn from(frame: Frame<'static>) -> Self {
        Self {
            palette:     frame.palette.unwrap_or_default(),
            indices:     frame.buffer.into_owned(),
            transparent: frame.transparent,
        }
    }
}

/// Blank out pixels of `frame` that are within `fuzz_percent` of `canvas`,
/// and copy the remaining ones onto `canvas`.
///
/// Both slices are RGBA of equal length. Pixels already transparent in
/// `frame` are left alone.
pub fn optimize_transparency(canvas: &mut [u8], frame: &mut [u8], fuzz_percent: f64) {
    let threshold = fuzz_percent / 100.0 * MAX_RGB_DISTANCE;
    let threshold_sq = threshold * threshold;

    for (shown, px) in canvas.chunks_exact_mut(4).zip(frame.chunks_exact_mut(4)) {
        if px[3] == 0 {
            continue;
        }
        let dist_sq: f64 = (0..3)
            .map(|c| {
                let d = px[c] as f64 - shown[c] as f64;
                d * d
            })
            .sum();
        if dist_sq <= threshold_sq {
            px.copy_from_slice(&[0, 0, 0, 0]);
        } else {
            shown.copy_from_slice(px);
        }
    }
}
