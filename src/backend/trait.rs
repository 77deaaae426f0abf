//! Backend trait definition
//!
//! This module defines the trait a display backend must implement. A backend
//! owns one connection to a display server and exposes the small set of
//! protocol requests a draw context needs: pixmaps, graphics contexts, core
//! fonts, color cells, rectangle/text primitives, area copies and flushing.
//!
//! Every request is checked: a method returns only after the server has
//! accepted (or rejected) it, so calls are observed in program order and an
//! error always points at the request that caused it.

use std::error::Error;
use std::fmt;

/// Result type for backend operations
pub type BackendResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

/// Window ID, owned by the surrounding application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Window(pub u32);

impl Window {
    pub fn new(id: u32) -> Self {
        Window(id)
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.0)
    }
}

/// Pixmap ID (off-screen canvas)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pixmap(pub u32);

impl Pixmap {
    pub fn new(id: u32) -> Self {
        Pixmap(id)
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for Pixmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.0)
    }
}

/// Graphics context ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GContext(pub u32);

impl GContext {
    pub fn new(id: u32) -> Self {
        GContext(id)
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for GContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.0)
    }
}

/// Core font ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Font(pub u32);

impl Font {
    pub fn new(id: u32) -> Self {
        Font(id)
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for Font {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.0)
    }
}

/// Line style for stroked primitives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Solid = 0,
    OnOffDash = 1,
    DoubleDash = 2,
}

/// Cap style for line ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapStyle {
    NotLast = 0,
    Butt = 1,
    Round = 2,
    Projecting = 3,
}

/// Join style for line corners
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinStyle {
    Miter = 0,
    Round = 1,
    Bevel = 2,
}

/// Stroke configuration applied when a graphics context is created
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GcStyle {
    pub line_style: LineStyle,
    pub cap_style: CapStyle,
    pub join_style: JoinStyle,
}

impl Default for GcStyle {
    fn default() -> Self {
        GcStyle {
            line_style: LineStyle::Solid,
            cap_style: CapStyle::Butt,
            join_style: JoinStyle::Miter,
        }
    }
}

/// Graphics context values changed before a draw
///
/// Unset fields keep their current server-side value, mirroring the
/// value-mask the protocol uses for `ChangeGC`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GcValues {
    pub foreground: Option<u32>,
    pub background: Option<u32>,
    pub font: Option<Font>,
}

impl GcValues {
    pub fn new() -> Self {
        GcValues::default()
    }

    pub fn foreground(mut self, pixel: u32) -> Self {
        self.foreground = Some(pixel);
        self
    }

    pub fn background(mut self, pixel: u32) -> Self {
        self.background = Some(pixel);
        self
    }

    pub fn font(mut self, font: Font) -> Self {
        self.font = Some(font);
        self
    }
}

/// Screen information
#[derive(Debug, Clone)]
pub struct ScreenInfo {
    pub width: u16,
    pub height: u16,
    pub root_depth: u8,
    pub white_pixel: u32,
    pub black_pixel: u32,
}

/// Metrics reported by the server for an opened font
#[derive(Debug, Clone, Copy)]
pub struct FontExtents {
    /// Pixels above the baseline
    pub ascent: i16,
    /// Pixels below the baseline
    pub descent: i16,
    /// Width of the widest glyph
    pub char_width: i16,
}

/// The main backend trait
///
/// A backend is a synchronous client of one display server. The trait is
/// deliberately close to the core protocol requests so that implementations
/// stay thin; policy (fallbacks, truncation, teardown order) lives in the
/// draw context built on top.
///
/// Backends are not internally synchronized. A draw context owns its backend
/// exclusively and callers serialize access to the context.
pub trait Backend: Send {
    /// Connect to the display and snapshot the default screen
    ///
    /// Calling `init` again on an initialized backend is a no-op, so the
    /// application can connect early (say, to create its window) and then
    /// hand the backend to a draw context.
    fn init(&mut self) -> BackendResult<()>;

    /// Get screen information (fails before `init`)
    fn screen_info(&self) -> BackendResult<ScreenInfo>;

    // Graphics context operations

    /// Create a graphics context on the root with the given stroke style
    fn create_gc(&mut self, style: &GcStyle) -> BackendResult<GContext>;

    /// Change graphics context values ahead of a draw
    fn change_gc(&mut self, gc: GContext, values: &GcValues) -> BackendResult<()>;

    /// Free a graphics context
    fn free_gc(&mut self, gc: GContext) -> BackendResult<()>;

    // Pixmap operations

    /// Create an off-screen pixmap parented under the root
    fn create_pixmap(&mut self, depth: u8, width: u16, height: u16) -> BackendResult<Pixmap>;

    /// Free a pixmap
    fn free_pixmap(&mut self, pixmap: Pixmap) -> BackendResult<()>;

    // Font operations

    /// Open a core font by name
    fn open_font(&mut self, name: &str) -> BackendResult<Font>;

    /// Close an opened font
    fn close_font(&mut self, font: Font) -> BackendResult<()>;

    /// Query ascent/descent and widest-glyph metrics for an opened font
    fn query_font(&mut self, font: Font) -> BackendResult<FontExtents>;

    /// Measure the horizontal extent of `text` in `font`
    ///
    /// Each byte is one glyph; no multi-byte decoding happens anywhere in
    /// this crate. One call is one server round trip, so callers minimize
    /// the number of measurements they take.
    fn text_extents(&mut self, font: Font, text: &[u8]) -> BackendResult<i32>;

    // Color operations

    /// Allocate a read-only color cell in the default colormap
    ///
    /// Channels are 16-bit as the protocol demands; returns the pixel value
    /// the server picked.
    fn alloc_color(&mut self, red: u16, green: u16, blue: u16) -> BackendResult<u32>;

    // Drawing operations

    /// Draw a rectangle outline
    fn draw_rectangle(
        &mut self,
        canvas: Pixmap,
        gc: GContext,
        x: i16,
        y: i16,
        width: u16,
        height: u16,
    ) -> BackendResult<()>;

    /// Draw a filled rectangle
    fn fill_rectangle(
        &mut self,
        canvas: Pixmap,
        gc: GContext,
        x: i16,
        y: i16,
        width: u16,
        height: u16,
    ) -> BackendResult<()>;

    /// Draw a string with opaque background at a baseline position
    fn draw_text(
        &mut self,
        canvas: Pixmap,
        gc: GContext,
        x: i16,
        y: i16,
        text: &[u8],
    ) -> BackendResult<()>;

    /// Copy an area from a pixmap onto a window
    #[allow(clippy::too_many_arguments)]
    fn copy_area(
        &mut self,
        src: Pixmap,
        dst: Window,
        gc: GContext,
        src_x: i16,
        src_y: i16,
        dst_x: i16,
        dst_y: i16,
        width: u16,
        height: u16,
    ) -> BackendResult<()>;

    // Output

    /// Flush any buffered requests to the display
    fn flush(&mut self) -> BackendResult<()>;
}
