//! Core font loading and metrics
//!
//! Fonts are server-side resources: opening one yields a handle, and the
//! metrics (ascent, descent, widest glyph) come back from a follow-up
//! query. The draw context keeps at most one font loaded and positions
//! text baselines from these numbers.

use crate::backend::{Backend, BackendResult, Font};

/// Name tried when no font is given or the requested one fails to load
pub const DEFAULT_FONT: &str = "fixed";

/// Metrics of a loaded core font
#[derive(Debug, Clone, Copy)]
pub struct FontMetrics {
    /// Pixels above the baseline
    pub ascent: u16,
    /// Pixels below the baseline
    pub descent: u16,
    /// Line height: ascent + descent
    pub height: u16,
    /// Width of the widest glyph
    pub width: u16,
    /// Server-side handle, valid for the lifetime of this value
    pub font: Font,
}

impl FontMetrics {
    /// Open `name` and query its metrics
    ///
    /// If the metrics query fails the freshly opened handle is closed
    /// again before the error is returned, so no font leaks.
    pub fn open(backend: &mut dyn Backend, name: &str) -> BackendResult<FontMetrics> {
        let font = backend.open_font(name)?;
        let extents = match backend.query_font(font) {
            Ok(extents) => extents,
            Err(err) => {
                if let Err(close_err) = backend.close_font(font) {
                    log::warn!("cannot close font '{}': {}", name, close_err);
                }
                return Err(err);
            }
        };
        let ascent = extents.ascent.max(0) as u16;
        let descent = extents.descent.max(0) as u16;
        Ok(FontMetrics {
            ascent,
            descent,
            height: ascent + descent,
            width: extents.char_width.max(0) as u16,
            font,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::null::{NullBackend, Request};
    use std::sync::atomic::Ordering;

    #[test]
    fn test_open_computes_height() {
        let mut backend = NullBackend::new();
        let font = FontMetrics::open(&mut backend, "fixed").unwrap();
        assert_eq!(font.ascent, 11);
        assert_eq!(font.descent, 2);
        assert_eq!(font.height, 13);
        assert_eq!(font.width, 6);
    }

    #[test]
    fn test_open_unknown_name_fails() {
        let mut backend = NullBackend::new();
        assert!(FontMetrics::open(&mut backend, "curious-sans").is_err());
    }

    #[test]
    fn test_failed_metrics_query_closes_the_font() {
        let mut backend = NullBackend::new();
        let journal = backend.journal();
        let faults = backend.faults();
        faults.query_font.store(true, Ordering::Relaxed);
        assert!(FontMetrics::open(&mut backend, "fixed").is_err());

        let reqs = journal.lock().unwrap();
        let opened: Vec<Font> = reqs
            .iter()
            .filter_map(|r| match r {
                Request::OpenFont { font, .. } => Some(*font),
                _ => None,
            })
            .collect();
        let closed: Vec<Font> = reqs
            .iter()
            .filter_map(|r| match r {
                Request::CloseFont { font } => Some(*font),
                _ => None,
            })
            .collect();
        // The handle opened for the query is released, exactly once
        assert_eq!(opened.len(), 1);
        assert_eq!(closed, opened);
    }
}
