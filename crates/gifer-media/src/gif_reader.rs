// crates/gifer-media/src/gif_reader.rs
//
// Decode a GIF into fully composed RGBA frames for the player.
//
// GIF frames are sub-rectangles drawn over the previous screen, with a
// per-frame disposal rule applied *after* the frame has been shown. The
// player wants whole screens, so every frame is composited here once, at load
// time; playback is then just a texture swap.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{bail, Context, Result};
use gif::{ColorOutput, DecodeOptions, DisposalMethod};

use gifer_core::media_types::{DecodedGif, GifFrame};

/// Delay for frames that declare 0 or 1 centiseconds. Browsers and most
/// viewers slow these down to 100 ms, and so do we.
const DEFAULT_DELAY_MS: u32 = 100;

/// Convert a GIF delay (centiseconds) to the milliseconds the player waits.
pub fn frame_delay_ms(delay_cs: u16) -> u32 {
    if delay_cs <= 1 { DEFAULT_DELAY_MS } else { delay_cs as u32 * 10 }
}

struct Rect {
    left:   usize,
    top:    usize,
    width:  usize,
    height: usize,
}

/// Iterate the canvas byte offsets covered by `rect`, clipped to the screen.
/// Yields `(canvas_offset, index_within_rect)` per pixel.
fn covered(rect: &Rect, screen_w: usize, screen_h: usize) -> impl Iterator<Item = (usize, usize)> + '_ {
    (0..rect.height).flat_map(move |row| {
        (0..rect.width).filter_map(move |col| {
            let (x, y) = (rect.left + col, rect.top + row);
            (x < screen_w && y < screen_h).then(|| ((y * screen_w + x) * 4, row * rect.width + col))
        })
    })
}

pub fn load_gif(path: &Path) -> Result<DecodedGif> {
    let file = File::open(path).with_context(|| format!("cannot open {}", path.display()))?;

    let mut opts = DecodeOptions::new();
    opts.set_color_output(ColorOutput::RGBA);
    let mut decoder = opts.read_info(BufReader::new(file))
        .with_context(|| format!("{} is not a readable GIF", path.display()))?;

    let (screen_w, screen_h) = (decoder.width() as usize, decoder.height() as usize);
    let mut canvas = vec![0u8; screen_w * screen_h * 4];
    let mut frames = Vec::new();

    while let Some(frame) = decoder.read_next_frame().context("decode GIF frame")? {
        let rect = Rect {
            left:   frame.left as usize,
            top:    frame.top as usize,
            width:  frame.width as usize,
            height: frame.height as usize,
        };
        let saved = (frame.dispose == DisposalMethod::Previous).then(|| canvas.clone());

        for (dst, src) in covered(&rect, screen_w, screen_h) {
            let px = &frame.buffer[src * 4..src * 4 + 4];
            if px[3] != 0 {
                canvas[dst..dst + 4].copy_from_slice(px);
            }
        }

        frames.push(GifFrame {
            data:     canvas.clone(),
            delay_ms: frame_delay_ms(frame.delay),
        });

        match frame.dispose {
            DisposalMethod::Background => {
                for (dst, _) in covered(&rect, screen_w, screen_h) {
                    canvas[dst..dst + 4].fill(0);
                }
            }
            DisposalMethod::Previous => {
                if let Some(prev) = saved {
                    canvas = prev;
                }
            }
            _ => {}
        }
    }

    if frames.is_empty() {
        bail!("{} contains no frames", path.display());
    }
    log::info!(
        "[media] GIF {}x{}, {} frames ← {}",
        screen_w, screen_h, frames.len(), path.display()
    );

    Ok(DecodedGif {
        width:  screen_w as u32,
        height: screen_h as u32,
        frames,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gif_writer::GifWriter;
    use std::io::BufWriter;

    #[test]
    fn short_delays_are_slowed_down() {
        assert_eq!(frame_delay_ms(0), 100);
        assert_eq!(frame_delay_ms(1), 100);
        assert_eq!(frame_delay_ms(4), 40);
    }

    #[test]
    fn clipped_rect_stays_on_screen() {
        let rect = Rect { left: 1, top: 1, width: 3, height: 3 };
        let offsets: Vec<usize> = covered(&rect, 2, 2).map(|(d, _)| d).collect();
        assert_eq!(offsets, vec![(1 * 2 + 1) * 4]);
    }

    #[test]
    fn reads_back_what_the_writer_produced() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.gif");

        let file = BufWriter::new(File::create(&path).unwrap());
        // Fuzz on: the second frame's unchanged pixel is written transparent
        // and must come back composited from the first frame.
        let mut w = GifWriter::new(file, 2, 1, 20.0, Some(1.0)).unwrap();
        w.write_frame(&[255, 255, 255, 255, 0, 0, 0, 255]).unwrap();
        w.write_frame(&[255, 255, 255, 255, 255, 255, 255, 255]).unwrap();
        w.finish().unwrap();

        let gif = load_gif(&path).unwrap();
        assert_eq!((gif.width, gif.height), (2, 1));
        assert_eq!(gif.frames.len(), 2);
        assert_eq!(gif.frames[0].delay_ms, 50);
        assert_eq!(&gif.frames[1].data[..4], &[255, 255, 255, 255]);
        assert_eq!(&gif.frames[1].data[4..], &[255, 255, 255, 255]);
    }

    #[test]
    fn non_gif_is_an_error() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("fake.gif");
        std::fs::write(&path, b"not a gif").unwrap();
        assert!(load_gif(&path).is_err());
    }
}
