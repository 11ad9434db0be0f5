//! Pixel-diff comparison for the `screenshot_diff` assertion. Grounded on
//! `examples/original_source/src/executor/assertion_checker.py`'s
//! `_check_screenshot_diff`, translated from PIL pixel comparison to the
//! `image` crate (already used by this codebase's visual perception layer
//! for the same purpose).

use std::path::Path;

use image::{imageops::FilterType, GenericImageView};
use tracing::warn;

use crate::types::AssertionCheckResult;

/// Raised from 10 in an earlier iteration: 10 was too strict and flagged
/// anti-aliasing and font-rendering noise as differences.
const PIXEL_THRESHOLD: u8 = 40;

fn pixel_differs(a: image::Rgba<u8>, b: image::Rgba<u8>) -> bool {
    let threshold = PIXEL_THRESHOLD as i16;
    (a[0] as i16 - b[0] as i16).abs() > threshold
        || (a[1] as i16 - b[1] as i16).abs() > threshold
        || (a[2] as i16 - b[2] as i16).abs() > threshold
}

fn diff_ratio(current: &image::DynamicImage, baseline: &image::DynamicImage) -> f64 {
    let (bw, bh) = baseline.dimensions();
    let current = if current.dimensions() != (bw, bh) {
        current.resize_exact(bw, bh, FilterType::Lanczos3)
    } else {
        current.clone()
    };

    let mut diff_count: u64 = 0;
    for y in 0..bh {
        for x in 0..bw {
            if pixel_differs(current.get_pixel(x, y), baseline.get_pixel(x, y)) {
                diff_count += 1;
            }
        }
    }
    let total = (bw as u64 * bh as u64).max(1);
    diff_count as f64 / total as f64
}

/// `baseline_image_path` absent means there is nothing to diff against yet —
/// the first run of a visual assertion always passes and the caller is
/// expected to store the captured screenshot as the new baseline.
pub fn check_screenshot_diff(
    current_bytes: &[u8],
    baseline_image_path: Option<&Path>,
    tolerance: f64,
) -> AssertionCheckResult {
    let baseline_path = match baseline_image_path {
        Some(path) if path.exists() => path,
        _ => return AssertionCheckResult::pass("no baseline recorded yet, treating as new baseline"),
    };

    let current = match image::load_from_memory(current_bytes) {
        Ok(img) => img,
        Err(e) => return AssertionCheckResult::fail(format!("could not decode captured screenshot: {e}")),
    };
    let baseline = match image::open(baseline_path) {
        Ok(img) => img,
        Err(e) => {
            warn!("could not open baseline image {}: {e}", baseline_path.display());
            return AssertionCheckResult::fail(format!("could not decode baseline image: {e}"));
        }
    };

    let ratio = diff_ratio(&current, &baseline);
    if ratio <= tolerance {
        AssertionCheckResult::pass(format!("pixel diff ratio {ratio:.4} within tolerance {tolerance:.4}"))
    } else {
        AssertionCheckResult::fail(format!("pixel diff ratio {ratio:.4} exceeds tolerance {tolerance:.4}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgba};

    fn encode_png(width: u32, height: u32, color: Rgba<u8>) -> Vec<u8> {
        let img = ImageBuffer::from_pixel(width, height, color);
        let mut buf = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut buf), image::ImageFormat::Png).unwrap();
        buf
    }

    #[test]
    fn missing_baseline_is_treated_as_pass() {
        let bytes = encode_png(4, 4, Rgba([255, 0, 0, 255]));
        let result = check_screenshot_diff(&bytes, None, 0.05);
        assert!(result.passed);
    }

    #[test]
    fn identical_images_pass() {
        let dir = tempfile::tempdir().unwrap();
        let baseline_path = dir.path().join("baseline.png");
        std::fs::write(&baseline_path, encode_png(10, 10, Rgba([10, 20, 30, 255]))).unwrap();
        let current = encode_png(10, 10, Rgba([10, 20, 30, 255]));

        let result = check_screenshot_diff(&current, Some(baseline_path.as_path()), 0.05);
        assert!(result.passed);
    }

    #[test]
    fn wildly_different_images_fail_tight_tolerance() {
        let dir = tempfile::tempdir().unwrap();
        let baseline_path = dir.path().join("baseline.png");
        std::fs::write(&baseline_path, encode_png(10, 10, Rgba([0, 0, 0, 255]))).unwrap();
        let current = encode_png(10, 10, Rgba([255, 255, 255, 255]));

        let result = check_screenshot_diff(&current, Some(baseline_path.as_path()), 0.01);
        assert!(!result.passed);
    }

    #[test]
    fn small_pixel_variation_within_threshold_still_passes() {
        let dir = tempfile::tempdir().unwrap();
        let baseline_path = dir.path().join("baseline.png");
        // Channel diff of 10 is under the 40-unit per-channel threshold.
        std::fs::write(&baseline_path, encode_png(5, 5, Rgba([100, 100, 100, 255]))).unwrap();
        let current = encode_png(5, 5, Rgba([110, 110, 110, 255]));

        let result = check_screenshot_diff(&current, Some(baseline_path.as_path()), 0.05);
        assert!(result.passed);
    }
}
