/// Share of each viewport dimension the lightbox media may occupy.
pub const LIGHTBOX_VIEWPORT_RATIO: f64 = 0.7;

/// Aspect used when a video reports junk dimensions.
const FALLBACK_VIDEO_ASPECT: f64 = 16.0 / 9.0;

/// Display size for lightbox media.
///
/// Width stays within 70% of the viewport width and height within 70% of the
/// viewport height, aspect ratio preserved. Media smaller than that box is
/// shown at its own size. Unknown media dimensions fill the box at 16:9.
pub fn lightbox_fit(media_w: u32, media_h: u32, viewport_w: f64, viewport_h: f64) -> (i32, i32) {
    let max_w = (viewport_w.max(1.0) * LIGHTBOX_VIEWPORT_RATIO).max(1.0);
    let max_h = (viewport_h.max(1.0) * LIGHTBOX_VIEWPORT_RATIO).max(1.0);

    let (w, h) = if media_w == 0 || media_h == 0 {
        // Unknown size: largest 16:9 box that fits
        let w = max_w.min(max_h * FALLBACK_VIDEO_ASPECT);
        (w, w / FALLBACK_VIDEO_ASPECT)
    } else {
        (media_w as f64, media_h as f64)
    };

    let scale = (max_w / w).min(max_h / h).min(1.0);
    // Nudge before flooring so 699.9999... still reads as 700
    let fitted_w = (w * scale + 1e-6).floor().max(1.0);
    let fitted_h = (h * scale + 1e-6).floor().max(1.0);
    (fitted_w as i32, fitted_h as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_landscape_limited_by_width() {
        let (w, h) = lightbox_fit(4000, 2000, 1000.0, 1000.0);
        assert_eq!((w, h), (700, 350));
    }

    #[test]
    fn test_portrait_limited_by_height() {
        let (w, h) = lightbox_fit(1000, 3000, 1920.0, 1000.0);
        assert_eq!(h, 700);
        assert_eq!(w, 233);
    }

    #[test]
    fn test_small_media_not_upscaled() {
        assert_eq!(lightbox_fit(320, 240, 1920.0, 1080.0), (320, 240));
    }

    #[test]
    fn test_fit_respects_both_limits() {
        for &(mw, mh) in &[(1920u32, 1080u32), (1080, 1920), (5000, 5000), (7000, 300)] {
            let (w, h) = lightbox_fit(mw, mh, 1280.0, 720.0);
            assert!(w as f64 <= 1280.0 * LIGHTBOX_VIEWPORT_RATIO);
            assert!(h as f64 <= 720.0 * LIGHTBOX_VIEWPORT_RATIO);
        }
    }

    #[test]
    fn test_unknown_dimensions_use_video_aspect() {
        let (w, h) = lightbox_fit(0, 0, 1600.0, 900.0);
        assert_eq!((w, h), (1120, 630));
    }
}
