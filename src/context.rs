//! The draw context: one connection, one GC, one off-screen canvas
//!
//! A [`DrawContext`] owns everything needed to paint simple bar/menu style
//! UI: the display connection (through a [`Backend`]), a graphics context
//! created once with solid/butt/miter stroke style, an optional core font
//! and an off-screen canvas pixmap. Callers draw rectangles and text into
//! the canvas, then [`blit`](DrawContext::blit) it onto their window.
//!
//! Failure policy follows the renderer's place in the stack: setup errors
//! propagate, resource acquisition errors propagate with prior state kept
//! intact, and per-frame draw errors are logged and swallowed. A failed
//! draw is a dropped frame, not a reason to tear anything down.

use crate::backend::{
    Backend, BackendResult, GContext, GcStyle, GcValues, Pixmap, ScreenInfo, Window,
};
use crate::color::{ColorScheme, Rgb};
use crate::font::{FontMetrics, DEFAULT_FONT};
use crate::text::{self, MAX_TEXT_LEN};

/// The off-screen pixmap plus the dimensions it was created with
#[derive(Debug, Clone, Copy)]
struct Canvas {
    pixmap: Pixmap,
    width: u16,
    height: u16,
}

/// Drawing state bound to one display connection
pub struct DrawContext {
    backend: Box<dyn Backend>,
    screen: ScreenInfo,
    gc: GContext,
    canvas: Option<Canvas>,
    font: Option<FontMetrics>,
    /// Swap foreground/background roles on subsequent draws
    pub invert: bool,
    /// Pen position consumed by text draws; never validated
    pub x: i16,
    /// Pen position consumed by text draws; never validated
    pub y: i16,
}

impl DrawContext {
    /// Create a draw context on the given backend
    ///
    /// Initializes the backend (connecting if it wasn't already), snapshots
    /// the default screen and creates the graphics context. A connection
    /// failure is fatal for the context; nothing is retried.
    pub fn new(mut backend: Box<dyn Backend>) -> BackendResult<DrawContext> {
        backend.init()?;
        let screen = backend.screen_info()?;
        let gc = backend.create_gc(&GcStyle::default())?;
        log::debug!(
            "draw context ready: screen {}x{}, depth {}",
            screen.width,
            screen.height,
            screen.root_depth
        );
        Ok(DrawContext {
            backend,
            screen,
            gc,
            canvas: None,
            font: None,
            invert: false,
            x: 0,
            y: 0,
        })
    }

    /// Screen the context draws on
    pub fn screen(&self) -> &ScreenInfo {
        &self.screen
    }

    /// Canvas width, 0 before the first resize
    pub fn width(&self) -> u16 {
        self.canvas.map_or(0, |c| c.width)
    }

    /// Canvas height, 0 before the first resize
    pub fn height(&self) -> u16 {
        self.canvas.map_or(0, |c| c.height)
    }

    /// Metrics of the loaded font, if any
    pub fn font(&self) -> Option<&FontMetrics> {
        self.font.as_ref()
    }

    /// Load a font, falling back to [`DEFAULT_FONT`]
    ///
    /// On failure the fallback is tried once (unless it was the requested
    /// name already); if that fails too the context is left without a font
    /// and text operations degrade to logged no-ops.
    pub fn init_font(&mut self, name: Option<&str>) {
        let requested = name.unwrap_or(DEFAULT_FONT);
        match FontMetrics::open(self.backend.as_mut(), requested) {
            Ok(font) => self.set_font(font),
            Err(err) => {
                log::warn!("cannot load font '{}': {}", requested, err);
                if requested != DEFAULT_FONT {
                    match FontMetrics::open(self.backend.as_mut(), DEFAULT_FONT) {
                        Ok(font) => self.set_font(font),
                        Err(err) => {
                            log::warn!("cannot load font '{}': {}", DEFAULT_FONT, err)
                        }
                    }
                }
            }
        }
    }

    fn set_font(&mut self, font: FontMetrics) {
        if let Some(old) = self.font.take() {
            if let Err(err) = self.backend.close_font(old.font) {
                log::warn!("cannot close font {}: {}", old.font, err);
            }
        }
        self.font = Some(font);
    }

    /// Replace the canvas with a freshly allocated `width` x `height` pixmap
    ///
    /// The new pixmap is created first; only once that succeeded is the old
    /// one freed, so the context never sits without a canvas. On failure the
    /// previous canvas and its dimensions stay in place.
    pub fn resize_canvas(&mut self, width: u16, height: u16) -> BackendResult<()> {
        let pixmap = self
            .backend
            .create_pixmap(self.screen.root_depth, width, height)?;
        if let Some(old) = self.canvas.take() {
            if let Err(err) = self.backend.free_pixmap(old.pixmap) {
                log::warn!("cannot free previous canvas {}: {}", old.pixmap, err);
            }
        }
        self.canvas = Some(Canvas {
            pixmap,
            width,
            height,
        });
        Ok(())
    }

    /// Copy the canvas region from (0,0) onto `window` and flush
    ///
    /// A failed copy is reported, not retried; the output buffer is flushed
    /// either way.
    pub fn blit(&mut self, window: Window, width: u16, height: u16) -> BackendResult<()> {
        let canvas = self.canvas.ok_or("no canvas to blit")?;
        let copied = self
            .backend
            .copy_area(canvas.pixmap, window, self.gc, 0, 0, 0, 0, width, height);
        let flushed = self.backend.flush();
        copied.and(flushed)
    }

    /// Fill or outline a rectangle on the canvas in `color`
    ///
    /// Draw failures are logged and dropped.
    pub fn draw_rect(&mut self, x: i16, y: i16, width: u16, height: u16, fill: bool, color: u32) {
        let Some(canvas) = self.canvas else {
            log::warn!("rectangle draw with no canvas");
            return;
        };
        let result = self
            .backend
            .change_gc(self.gc, &GcValues::new().foreground(color))
            .and_then(|_| {
                if fill {
                    self.backend
                        .fill_rectangle(canvas.pixmap, self.gc, x, y, width, height)
                } else {
                    self.backend
                        .draw_rectangle(canvas.pixmap, self.gc, x, y, width, height)
                }
            });
        if let Err(err) = result {
            log::warn!("could not complete rectangle draw: {}", err);
        }
    }

    /// Fill the whole canvas with the scheme's background
    pub fn clear(&mut self, scheme: ColorScheme) {
        let Some(canvas) = self.canvas else {
            log::warn!("clear with no canvas");
            return;
        };
        let bg = scheme.bg(self.invert);
        self.draw_rect(0, 0, canvas.width, canvas.height, true, bg);
    }

    /// Draw `text` at the pen position, truncating it to the canvas width
    ///
    /// Truncated text gets a trailing ellipsis of dots. If not even a
    /// single-glyph prefix fits, nothing is drawn.
    pub fn draw_text(&mut self, text: &str, scheme: ColorScheme) {
        let Some(font) = self.font else {
            log::warn!("text draw with no font loaded");
            return;
        };
        let Some(canvas) = self.canvas else {
            log::warn!("text draw with no canvas");
            return;
        };
        let Some(buf) = text::fit_text(self.backend.as_mut(), &font, text, canvas.width) else {
            return;
        };
        self.draw_text_raw(&buf, scheme);
    }

    /// Draw `text` at the pen position without truncation
    ///
    /// The effective {foreground, background} pair is the scheme indexed by
    /// the inversion flag; the glyph origin is half a font height right of
    /// the pen and one pixel under the ascent line.
    pub fn draw_text_raw(&mut self, text: &[u8], scheme: ColorScheme) {
        let Some(font) = self.font else {
            log::warn!("text draw with no font loaded");
            return;
        };
        let Some(canvas) = self.canvas else {
            log::warn!("text draw with no canvas");
            return;
        };
        let x = self.x + (font.height / 2) as i16;
        let y = self.y + font.ascent as i16 + 1;
        let values = GcValues::new()
            .foreground(scheme.fg(self.invert))
            .background(scheme.bg(self.invert))
            .font(font.font);
        let result = self
            .backend
            .change_gc(self.gc, &values)
            .and_then(|_| self.backend.draw_text(canvas.pixmap, self.gc, x, y, text));
        if let Err(err) = result {
            log::warn!("could not complete text draw: {}", err);
        }
    }

    /// Width of `text` plus one font height of padding
    ///
    /// This is the width a text cell occupies on screen, matching the
    /// padding [`draw_text`](DrawContext::draw_text) applies on each side.
    /// Returns 0 when no font is loaded; a failed measurement counts the
    /// text itself as zero wide.
    pub fn text_width(&mut self, text: &str) -> i32 {
        let Some(font) = self.font else {
            return 0;
        };
        self.prefix_width(text, text.len().min(MAX_TEXT_LEN)) + font.height as i32
    }

    /// Width of the first `n` bytes of `text`, without padding
    pub fn text_width_n(&mut self, text: &str, n: usize) -> i32 {
        self.prefix_width(text, n.min(text.len()).min(MAX_TEXT_LEN))
    }

    fn prefix_width(&mut self, text: &str, n: usize) -> i32 {
        let Some(font) = self.font else {
            return 0;
        };
        if n == 0 {
            return 0;
        }
        match self
            .backend
            .text_extents(font.font, &text.as_bytes()[..n])
        {
            Ok(width) => width,
            Err(err) => {
                log::warn!("cannot measure text: {}", err);
                0
            }
        }
    }

    /// Resolve a `#RRGGBB` string to a pixel value
    ///
    /// Malformed strings and allocation failures are logged and yield the
    /// zero pixel.
    pub fn resolve_color(&mut self, spec: &str) -> u32 {
        let Some(rgb) = Rgb::parse(spec) else {
            log::warn!("cannot parse color '{}'", spec);
            return 0;
        };
        let (red, green, blue) = rgb.widen();
        match self.backend.alloc_color(red, green, blue) {
            Ok(pixel) => pixel,
            Err(err) => {
                log::warn!("cannot allocate color '{}': {}", spec, err);
                0
            }
        }
    }
}

impl Drop for DrawContext {
    /// Release font, canvas and GC in that order; the connection goes away
    /// with the backend. Only resources actually acquired are touched, so
    /// tearing down a partially built context is safe.
    fn drop(&mut self) {
        if let Some(font) = self.font.take() {
            if let Err(err) = self.backend.close_font(font.font) {
                log::warn!("cannot close font {}: {}", font.font, err);
            }
        }
        if let Some(canvas) = self.canvas.take() {
            if let Err(err) = self.backend.free_pixmap(canvas.pixmap) {
                log::warn!("cannot free canvas {}: {}", canvas.pixmap, err);
            }
        }
        if let Err(err) = self.backend.free_gc(self.gc) {
            log::warn!("cannot free gc {}: {}", self.gc, err);
        }
    }
}
