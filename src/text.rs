//! Text fitting: truncate a string to the canvas width
//!
//! A text cell is padded by half a font height on each side, so a string
//! fits when its measured extent plus that padding stays inside the canvas.
//! Measurement is a server round trip; instead of re-measuring every
//! shrinking prefix, the fit is found with one full-string query and, only
//! when that overflows, a binary search over prefix lengths. Every probe is
//! an exact server measurement, so the chosen length is exactly the longest
//! that fits, in at most 1 + log2(n) round trips.

use crate::backend::{Backend, BackendResult};
use crate::font::FontMetrics;

/// Longest byte string one text request can carry (its length field is a
/// single byte)
pub const MAX_TEXT_LEN: usize = 255;

fn extent(backend: &mut dyn Backend, font: &FontMetrics, bytes: &[u8]) -> BackendResult<i32> {
    if bytes.is_empty() {
        return Ok(0);
    }
    backend.text_extents(font.font, bytes)
}

/// Fit `text` into a canvas `canvas_width` wide
///
/// Returns the byte string to render: the whole text if it fits, otherwise
/// the longest prefix that does, its last three bytes (or all of them, for
/// prefixes shorter than three) rewritten to dots. `None` means nothing
/// fits (or a measurement failed) and the draw should be skipped.
pub fn fit_text(
    backend: &mut dyn Backend,
    font: &FontMetrics,
    text: &str,
    canvas_width: u16,
) -> Option<Vec<u8>> {
    let bytes = text.as_bytes();
    let n = bytes.len().min(MAX_TEXT_LEN);
    let budget = canvas_width as i32 - (font.height / 2) as i32;
    if budget < 0 {
        return None;
    }

    let full = match extent(backend, font, &bytes[..n]) {
        Ok(width) => width,
        Err(err) => {
            log::warn!("cannot measure text: {}", err);
            return None;
        }
    };

    let fitted = if full <= budget {
        n
    } else {
        // Largest m with extent(m) <= budget. The empty prefix fits (its
        // extent is zero) and the full prefix doesn't, which pins the
        // invariant: extent(lo) fits, extent(hi) overflows.
        let (mut lo, mut hi) = (0usize, n);
        while hi - lo > 1 {
            let mid = lo + (hi - lo) / 2;
            match extent(backend, font, &bytes[..mid]) {
                Ok(width) if width <= budget => lo = mid,
                Ok(_) => hi = mid,
                Err(err) => {
                    log::warn!("cannot measure text: {}", err);
                    return None;
                }
            }
        }
        lo
    };

    if fitted == 0 {
        return None;
    }

    let mut buf = bytes[..fitted].to_vec();
    if fitted < bytes.len() {
        let dots = fitted.min(3);
        for b in &mut buf[fitted - dots..] {
            *b = b'.';
        }
    }
    Some(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::null::{NullBackend, Request};
    use std::sync::atomic::Ordering;

    // Null-backend glyphs are 6px wide in a 13px-tall cell, so the padding
    // is 6px and a string of k glyphs needs a canvas of 6k + 6.

    fn extents_queries(journal: &crate::backend::null::Journal) -> usize {
        journal
            .lock()
            .unwrap()
            .iter()
            .filter(|r| matches!(r, Request::TextExtents { .. }))
            .count()
    }

    #[test]
    fn test_short_text_passes_through() {
        let mut backend = NullBackend::new();
        let journal = backend.journal();
        let font = FontMetrics::open(&mut backend, "fixed").unwrap();
        let fitted = fit_text(&mut backend, &font, "hello", 100);
        assert_eq!(fitted.as_deref(), Some(&b"hello"[..]));
        assert_eq!(extents_queries(&journal), 1);
    }

    #[test]
    fn test_truncates_with_ellipsis() {
        let mut backend = NullBackend::new();
        let font = FontMetrics::open(&mut backend, "fixed").unwrap();
        // 8 glyphs fit: canvas 54 leaves a 48px budget
        let fitted = fit_text(&mut backend, &font, "HelloWorldExample", 54);
        assert_eq!(fitted.as_deref(), Some(&b"Hello..."[..]));
    }

    #[test]
    fn test_exact_budget_is_not_truncated() {
        let mut backend = NullBackend::new();
        let font = FontMetrics::open(&mut backend, "fixed").unwrap();
        // 6 glyphs = 36px, canvas 42 leaves exactly 36
        let fitted = fit_text(&mut backend, &font, "abcdef", 42);
        assert_eq!(fitted.as_deref(), Some(&b"abcdef"[..]));
    }

    #[test]
    fn test_canvas_narrower_than_padding_renders_nothing() {
        let mut backend = NullBackend::new();
        let journal = backend.journal();
        let font = FontMetrics::open(&mut backend, "fixed").unwrap();
        assert_eq!(fit_text(&mut backend, &font, "hello", 5), None);
        // Rejected before any measurement
        assert_eq!(extents_queries(&journal), 0);
    }

    #[test]
    fn test_zero_length_fit_renders_nothing() {
        let mut backend = NullBackend::new();
        let font = FontMetrics::open(&mut backend, "fixed").unwrap();
        // Budget is 0 after padding; no non-empty prefix fits
        assert_eq!(fit_text(&mut backend, &font, "abc", 6), None);
    }

    #[test]
    fn test_short_prefix_becomes_all_dots() {
        let mut backend = NullBackend::new();
        let font = FontMetrics::open(&mut backend, "fixed").unwrap();
        // Budget 12 fits two glyphs; both get rewritten
        let fitted = fit_text(&mut backend, &font, "abcdef", 18);
        assert_eq!(fitted.as_deref(), Some(&b".."[..]));
    }

    #[test]
    fn test_probe_count_stays_logarithmic() {
        let mut backend = NullBackend::new();
        let journal = backend.journal();
        let font = FontMetrics::open(&mut backend, "fixed").unwrap();
        fit_text(&mut backend, &font, "HelloWorldExample", 54);
        // Full measurement plus binary-search probes, far fewer than one
        // query per candidate length
        assert!(extents_queries(&journal) <= 6);
    }

    #[test]
    fn test_oversized_text_is_capped() {
        let mut backend = NullBackend::new();
        let font = FontMetrics::open(&mut backend, "fixed").unwrap();
        let long = "x".repeat(300);
        let fitted = fit_text(&mut backend, &font, &long, 1920).unwrap();
        assert_eq!(fitted.len(), MAX_TEXT_LEN);
        assert!(fitted.ends_with(b"..."));
    }

    #[test]
    fn test_empty_text_renders_nothing() {
        let mut backend = NullBackend::new();
        let font = FontMetrics::open(&mut backend, "fixed").unwrap();
        assert_eq!(fit_text(&mut backend, &font, "", 100), None);
    }

    #[test]
    fn test_failed_measurement_drops_the_fit() {
        let mut backend = NullBackend::new();
        let faults = backend.faults();
        let font = FontMetrics::open(&mut backend, "fixed").unwrap();
        faults.text_extents.store(true, Ordering::Relaxed);
        assert_eq!(fit_text(&mut backend, &font, "hello", 100), None);
        // The server recovering makes the same call succeed again
        faults.text_extents.store(false, Ordering::Relaxed);
        assert_eq!(
            fit_text(&mut backend, &font, "hello", 100).as_deref(),
            Some(&b"hello"[..])
        );
    }
}
