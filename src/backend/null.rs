//! Null backend - in-memory display for headless use and tests
//!
//! This backend accepts every request without talking to a display server.
//! Resource ids are handed out sequentially, font metrics are fixed and text
//! extents are a pure function of string length, so anything built on top of
//! it behaves deterministically. Every accepted request is appended to a
//! journal that callers can inspect afterwards.

use super::*;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Metrics every null font reports (the classic 6x13 "fixed" cell)
pub const FONT_EXTENTS: FontExtents = FontExtents {
    ascent: 11,
    descent: 2,
    char_width: 6,
};

/// Font names the null backend will open
const KNOWN_FONTS: &[&str] = &[
    "fixed",
    "6x13",
    "7x14",
    "9x15",
    "-misc-fixed-medium-r-normal--13-120-75-75-c-80-iso8859-1",
];

/// One recorded protocol request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    CreateGc {
        gc: GContext,
        style: GcStyle,
    },
    ChangeGc {
        gc: GContext,
        values: GcValues,
    },
    FreeGc {
        gc: GContext,
    },
    CreatePixmap {
        pixmap: Pixmap,
        depth: u8,
        width: u16,
        height: u16,
    },
    FreePixmap {
        pixmap: Pixmap,
    },
    OpenFont {
        font: Font,
        name: String,
    },
    CloseFont {
        font: Font,
    },
    TextExtents {
        font: Font,
        len: usize,
    },
    AllocColor {
        red: u16,
        green: u16,
        blue: u16,
        pixel: u32,
    },
    DrawRectangle {
        canvas: Pixmap,
        gc: GContext,
        x: i16,
        y: i16,
        width: u16,
        height: u16,
    },
    FillRectangle {
        canvas: Pixmap,
        gc: GContext,
        x: i16,
        y: i16,
        width: u16,
        height: u16,
    },
    DrawText {
        canvas: Pixmap,
        gc: GContext,
        x: i16,
        y: i16,
        text: Vec<u8>,
    },
    CopyArea {
        src: Pixmap,
        dst: Window,
        width: u16,
        height: u16,
    },
    Flush,
}

/// Journal of requests the backend accepted, in order
pub type Journal = Arc<Mutex<Vec<Request>>>;

/// Failure injection switches
///
/// Shared the same way the journal is, so tests can flip them while the
/// backend is already owned by a draw context.
#[derive(Debug, Default)]
pub struct Faults {
    /// Refuse every `create_pixmap`
    pub create_pixmap: AtomicBool,
    /// Refuse every rectangle and text draw
    pub draws: AtomicBool,
    /// Refuse every `alloc_color`
    pub alloc_color: AtomicBool,
    /// Refuse every `text_extents` measurement
    pub text_extents: AtomicBool,
    /// Refuse every `query_font`
    pub query_font: AtomicBool,
}

pub struct NullBackend {
    next_id: u32,
    gcs: HashSet<u32>,
    pixmaps: HashMap<u32, (u16, u16)>,
    fonts: HashSet<u32>,
    journal: Journal,
    faults: Arc<Faults>,
}

impl NullBackend {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            gcs: HashSet::new(),
            pixmaps: HashMap::new(),
            fonts: HashSet::new(),
            journal: Arc::new(Mutex::new(Vec::new())),
            faults: Arc::new(Faults::default()),
        }
    }

    /// Handle onto the request journal; clone it before moving the backend
    /// into a draw context
    pub fn journal(&self) -> Journal {
        Arc::clone(&self.journal)
    }

    /// Handle onto the failure injection switches
    pub fn faults(&self) -> Arc<Faults> {
        Arc::clone(&self.faults)
    }

    fn record(&self, request: Request) {
        self.journal.lock().unwrap().push(request);
    }

    fn next_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

impl Backend for NullBackend {
    fn init(&mut self) -> BackendResult<()> {
        Ok(())
    }

    fn screen_info(&self) -> BackendResult<ScreenInfo> {
        Ok(ScreenInfo {
            width: 1920,
            height: 1080,
            root_depth: 24,
            white_pixel: 0xFFFFFF,
            black_pixel: 0x000000,
        })
    }

    fn create_gc(&mut self, style: &GcStyle) -> BackendResult<GContext> {
        let gc = GContext::new(self.next_id());
        self.gcs.insert(gc.get());
        self.record(Request::CreateGc { gc, style: *style });
        Ok(gc)
    }

    fn change_gc(&mut self, gc: GContext, values: &GcValues) -> BackendResult<()> {
        if !self.gcs.contains(&gc.get()) {
            return Err(format!("unknown gc {}", gc).into());
        }
        self.record(Request::ChangeGc {
            gc,
            values: *values,
        });
        Ok(())
    }

    fn free_gc(&mut self, gc: GContext) -> BackendResult<()> {
        if !self.gcs.remove(&gc.get()) {
            return Err(format!("unknown gc {}", gc).into());
        }
        self.record(Request::FreeGc { gc });
        Ok(())
    }

    fn create_pixmap(&mut self, depth: u8, width: u16, height: u16) -> BackendResult<Pixmap> {
        if self.faults.create_pixmap.load(Ordering::Relaxed) {
            return Err("pixmap allocation refused".into());
        }
        if width == 0 || height == 0 {
            return Err("zero-sized pixmap".into());
        }
        let pixmap = Pixmap::new(self.next_id());
        self.pixmaps.insert(pixmap.get(), (width, height));
        self.record(Request::CreatePixmap {
            pixmap,
            depth,
            width,
            height,
        });
        Ok(pixmap)
    }

    fn free_pixmap(&mut self, pixmap: Pixmap) -> BackendResult<()> {
        if self.pixmaps.remove(&pixmap.get()).is_none() {
            return Err(format!("unknown pixmap {}", pixmap).into());
        }
        self.record(Request::FreePixmap { pixmap });
        Ok(())
    }

    fn open_font(&mut self, name: &str) -> BackendResult<Font> {
        if !KNOWN_FONTS.contains(&name) {
            return Err(format!("no font matches '{}'", name).into());
        }
        let font = Font::new(self.next_id());
        self.fonts.insert(font.get());
        self.record(Request::OpenFont {
            font,
            name: name.to_string(),
        });
        Ok(font)
    }

    fn close_font(&mut self, font: Font) -> BackendResult<()> {
        if !self.fonts.remove(&font.get()) {
            return Err(format!("unknown font {}", font).into());
        }
        self.record(Request::CloseFont { font });
        Ok(())
    }

    fn query_font(&mut self, font: Font) -> BackendResult<FontExtents> {
        if self.faults.query_font.load(Ordering::Relaxed) {
            return Err("font query refused".into());
        }
        if !self.fonts.contains(&font.get()) {
            return Err(format!("unknown font {}", font).into());
        }
        Ok(FONT_EXTENTS)
    }

    fn text_extents(&mut self, font: Font, text: &[u8]) -> BackendResult<i32> {
        if self.faults.text_extents.load(Ordering::Relaxed) {
            return Err("measurement refused".into());
        }
        if !self.fonts.contains(&font.get()) {
            return Err(format!("unknown font {}", font).into());
        }
        self.record(Request::TextExtents {
            font,
            len: text.len(),
        });
        Ok(text.len() as i32 * FONT_EXTENTS.char_width as i32)
    }

    fn alloc_color(&mut self, red: u16, green: u16, blue: u16) -> BackendResult<u32> {
        if self.faults.alloc_color.load(Ordering::Relaxed) {
            return Err("color allocation refused".into());
        }
        // TrueColor: truncate each channel back to 8 bits and pack 0xRRGGBB
        let pixel = ((red >> 8) as u32) << 16 | ((green >> 8) as u32) << 8 | (blue >> 8) as u32;
        self.record(Request::AllocColor {
            red,
            green,
            blue,
            pixel,
        });
        Ok(pixel)
    }

    fn draw_rectangle(
        &mut self,
        canvas: Pixmap,
        gc: GContext,
        x: i16,
        y: i16,
        width: u16,
        height: u16,
    ) -> BackendResult<()> {
        if self.faults.draws.load(Ordering::Relaxed) {
            return Err("draw refused".into());
        }
        if !self.pixmaps.contains_key(&canvas.get()) {
            return Err(format!("unknown pixmap {}", canvas).into());
        }
        self.record(Request::DrawRectangle {
            canvas,
            gc,
            x,
            y,
            width,
            height,
        });
        Ok(())
    }

    fn fill_rectangle(
        &mut self,
        canvas: Pixmap,
        gc: GContext,
        x: i16,
        y: i16,
        width: u16,
        height: u16,
    ) -> BackendResult<()> {
        if self.faults.draws.load(Ordering::Relaxed) {
            return Err("draw refused".into());
        }
        if !self.pixmaps.contains_key(&canvas.get()) {
            return Err(format!("unknown pixmap {}", canvas).into());
        }
        self.record(Request::FillRectangle {
            canvas,
            gc,
            x,
            y,
            width,
            height,
        });
        Ok(())
    }

    fn draw_text(
        &mut self,
        canvas: Pixmap,
        gc: GContext,
        x: i16,
        y: i16,
        text: &[u8],
    ) -> BackendResult<()> {
        if self.faults.draws.load(Ordering::Relaxed) {
            return Err("draw refused".into());
        }
        if !self.pixmaps.contains_key(&canvas.get()) {
            return Err(format!("unknown pixmap {}", canvas).into());
        }
        // Same cap as ImageText8, whose length field is a single byte
        if text.len() > 255 {
            return Err(format!("text run of {} bytes exceeds one request", text.len()).into());
        }
        self.record(Request::DrawText {
            canvas,
            gc,
            x,
            y,
            text: text.to_vec(),
        });
        Ok(())
    }

    fn copy_area(
        &mut self,
        src: Pixmap,
        dst: Window,
        gc: GContext,
        _src_x: i16,
        _src_y: i16,
        _dst_x: i16,
        _dst_y: i16,
        width: u16,
        height: u16,
    ) -> BackendResult<()> {
        if !self.pixmaps.contains_key(&src.get()) {
            return Err(format!("unknown pixmap {}", src).into());
        }
        if !self.gcs.contains(&gc.get()) {
            return Err(format!("unknown gc {}", gc).into());
        }
        self.record(Request::CopyArea {
            src,
            dst,
            width,
            height,
        });
        Ok(())
    }

    fn flush(&mut self) -> BackendResult<()> {
        self.record(Request::Flush);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_ids() {
        let mut backend = NullBackend::new();
        let gc = backend.create_gc(&GcStyle::default()).unwrap();
        let pixmap = backend.create_pixmap(24, 10, 10).unwrap();
        let font = backend.open_font("fixed").unwrap();
        assert_eq!(gc.get(), 1);
        assert_eq!(pixmap.get(), 2);
        assert_eq!(font.get(), 3);
    }

    #[test]
    fn test_unknown_handles_are_errors() {
        let mut backend = NullBackend::new();
        assert!(backend.free_pixmap(Pixmap::new(99)).is_err());
        assert!(backend.free_gc(GContext::new(99)).is_err());
        assert!(backend.close_font(Font::new(99)).is_err());
        assert!(backend.open_font("no-such-font").is_err());
    }

    #[test]
    fn test_double_free_is_an_error() {
        let mut backend = NullBackend::new();
        let pixmap = backend.create_pixmap(24, 10, 10).unwrap();
        backend.free_pixmap(pixmap).unwrap();
        assert!(backend.free_pixmap(pixmap).is_err());
    }

    #[test]
    fn test_extents_scale_with_length() {
        let mut backend = NullBackend::new();
        let font = backend.open_font("fixed").unwrap();
        let w1 = backend.text_extents(font, b"a").unwrap();
        let w5 = backend.text_extents(font, b"funky").unwrap();
        assert_eq!(w1, FONT_EXTENTS.char_width as i32);
        assert_eq!(w5, 5 * FONT_EXTENTS.char_width as i32);
    }

    #[test]
    fn test_alloc_color_packs_truecolor() {
        let mut backend = NullBackend::new();
        let pixel = backend.alloc_color(0xAAAA, 0xBBBB, 0xCCCC).unwrap();
        assert_eq!(pixel, 0xAABBCC);
    }

    #[test]
    fn test_draw_text_caps_request_length() {
        let mut backend = NullBackend::new();
        let gc = backend.create_gc(&GcStyle::default()).unwrap();
        let pixmap = backend.create_pixmap(24, 100, 100).unwrap();
        let long = vec![b'x'; 256];
        assert!(backend.draw_text(pixmap, gc, 0, 0, &long).is_err());
        assert!(backend.draw_text(pixmap, gc, 0, 0, &long[..255]).is_ok());
    }
}
