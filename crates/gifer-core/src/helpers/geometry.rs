// crates/gifer-core/src/helpers/geometry.rs
//
// Letterbox / pillarbox fit for the GIF viewer.
//
// Lives in core rather than next to the player so it stays testable without
// an egui context, and so the export panel can preview the fitted size too.

use crate::error::ParamError;

/// Largest `(width, height)` that fits inside the container without
/// distorting the content's aspect ratio.
///
/// When the container is relatively taller than the content the width is the
/// binding constraint; otherwise the height is. Both results are truncated to
/// whole pixels.
///
/// ```
/// use gifer_core::helpers::geometry::fit;
/// assert_eq!(fit(1920.0, 1080.0, 800.0, 600.0).unwrap(), (800, 450));
/// assert_eq!(fit(1080.0, 1920.0, 800.0, 600.0).unwrap(), (337, 600));
/// assert!(fit(0.0, 100.0, 800.0, 600.0).is_err());
/// ```
pub fn fit(
    content_w:   f64,
    content_h:   f64,
    container_w: f64,
    container_h: f64,
) -> Result<(u32, u32), ParamError> {
    for (name, v) in [
        ("content width",    content_w),
        ("content height",   content_h),
        ("container width",  container_w),
        ("container height", container_h),
    ] {
        if !v.is_finite() || v <= 0.0 {
            return Err(ParamError::invalid(format!("{name} must be positive, got {v}")));
        }
    }
    for (name, v) in [("container width", container_w), ("container height", container_h)] {
        if v < 1.0 {
            return Err(ParamError::invalid(format!("{name} is under one pixel, got {v}")));
        }
    }

    let (w, h) = if container_h / container_w > content_h / content_w {
        // Width binds.
        let w = container_w.trunc();
        (w, content_h * w / content_w)
    } else {
        let h = container_h.trunc();
        (content_w * h / content_h, h)
    };
    Ok((w as u32, h as u32))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_aspect_fills_exactly() {
        assert_eq!(fit(1920.0, 1080.0, 800.0, 450.0).unwrap(), (800, 450));
    }

    #[test]
    fn taller_container_is_width_bound() {
        assert_eq!(fit(1920.0, 1080.0, 800.0, 600.0).unwrap(), (800, 450));
    }

    #[test]
    fn wider_container_is_height_bound() {
        assert_eq!(fit(1080.0, 1920.0, 800.0, 600.0).unwrap(), (337, 600));
    }

    #[test]
    fn upscales_small_content() {
        assert_eq!(fit(100.0, 50.0, 400.0, 400.0).unwrap(), (400, 200));
    }

    #[test]
    fn zero_sizes_are_rejected() {
        assert!(matches!(fit(0.0, 100.0, 800.0, 600.0), Err(ParamError::InvalidInput(_))));
        assert!(fit(100.0, 100.0, 0.0, 600.0).is_err());
        assert!(fit(100.0, 0.0, 800.0, 600.0).is_err());
        assert!(fit(100.0, 100.0, 800.0, f64::NAN).is_err());
    }

    #[test]
    fn sub_pixel_container_is_rejected() {
        assert!(matches!(fit(100.0, 100.0, 0.5, 600.0), Err(ParamError::InvalidInput(_))));
        assert!(fit(100.0, 100.0, 800.0, 0.99).is_err());
        assert_eq!(fit(100.0, 100.0, 1.0, 1.0).unwrap(), (1, 1));
    }
}
