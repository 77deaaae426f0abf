//! X11 backend - client of a real X server via x11rb
//!
//! One instance owns one connection. `init` connects (honoring `DISPLAY`
//! unless an explicit display string was given) and snapshots the default
//! screen; afterwards each trait method maps to exactly one core protocol
//! request. Void requests are sent checked, so an error comes back attached
//! to the call that caused it instead of surfacing later on the stream.

use super::*;
use x11rb::connection::Connection;
use x11rb::protocol::xproto::{self, ConnectionExt as _};
use x11rb::rust_connection::RustConnection;

pub struct X11Backend {
    display: Option<String>,
    conn: Option<RustConnection>,
    screen_num: usize,
    root: u32,
    colormap: u32,
    screen: Option<ScreenInfo>,
}

impl X11Backend {
    /// Target a specific display, or `None` for `$DISPLAY`
    pub fn new(display: Option<&str>) -> Self {
        Self {
            display: display.map(|d| d.to_string()),
            conn: None,
            screen_num: 0,
            root: 0,
            colormap: 0,
            screen: None,
        }
    }

    /// Borrow the underlying connection, e.g. so the surrounding
    /// application can create its window on the same session
    pub fn connection(&self) -> Option<&RustConnection> {
        self.conn.as_ref()
    }

    /// Screen number the connection defaulted to
    pub fn screen_num(&self) -> usize {
        self.screen_num
    }

    /// Root window of the default screen
    pub fn root(&self) -> Window {
        Window::new(self.root)
    }

    fn conn(&self) -> BackendResult<&RustConnection> {
        self.conn.as_ref().ok_or_else(|| "not connected".into())
    }

    fn generate_id(&self) -> BackendResult<u32> {
        Ok(self.conn()?.generate_id()?)
    }
}

fn map_line_style(style: LineStyle) -> xproto::LineStyle {
    match style {
        LineStyle::Solid => xproto::LineStyle::SOLID,
        LineStyle::OnOffDash => xproto::LineStyle::ON_OFF_DASH,
        LineStyle::DoubleDash => xproto::LineStyle::DOUBLE_DASH,
    }
}

fn map_cap_style(style: CapStyle) -> xproto::CapStyle {
    match style {
        CapStyle::NotLast => xproto::CapStyle::NOT_LAST,
        CapStyle::Butt => xproto::CapStyle::BUTT,
        CapStyle::Round => xproto::CapStyle::ROUND,
        CapStyle::Projecting => xproto::CapStyle::PROJECTING,
    }
}

fn map_join_style(style: JoinStyle) -> xproto::JoinStyle {
    match style {
        JoinStyle::Miter => xproto::JoinStyle::MITER,
        JoinStyle::Round => xproto::JoinStyle::ROUND,
        JoinStyle::Bevel => xproto::JoinStyle::BEVEL,
    }
}

impl Backend for X11Backend {
    fn init(&mut self) -> BackendResult<()> {
        if self.conn.is_some() {
            return Ok(());
        }
        let (conn, screen_num) = x11rb::connect(self.display.as_deref())?;
        let screen = &conn.setup().roots[screen_num];
        self.root = screen.root;
        self.colormap = screen.default_colormap;
        self.screen = Some(ScreenInfo {
            width: screen.width_in_pixels,
            height: screen.height_in_pixels,
            root_depth: screen.root_depth,
            white_pixel: screen.white_pixel,
            black_pixel: screen.black_pixel,
        });
        self.screen_num = screen_num;
        self.conn = Some(conn);
        log::debug!(
            "X11 backend connected, screen {} root 0x{:08x}",
            screen_num,
            self.root
        );
        Ok(())
    }

    fn screen_info(&self) -> BackendResult<ScreenInfo> {
        Ok(self.screen.clone().ok_or("not connected")?)
    }

    fn create_gc(&mut self, style: &GcStyle) -> BackendResult<GContext> {
        let gc = self.generate_id()?;
        let aux = xproto::CreateGCAux::new()
            .line_style(map_line_style(style.line_style))
            .cap_style(map_cap_style(style.cap_style))
            .join_style(map_join_style(style.join_style));
        let conn = self.conn()?;
        conn.create_gc(gc, self.root, &aux)?.check()?;
        Ok(GContext::new(gc))
    }

    fn change_gc(&mut self, gc: GContext, values: &GcValues) -> BackendResult<()> {
        let aux = xproto::ChangeGCAux::new()
            .foreground(values.foreground)
            .background(values.background)
            .font(values.font.map(|f| f.get()));
        self.conn()?.change_gc(gc.get(), &aux)?.check()?;
        Ok(())
    }

    fn free_gc(&mut self, gc: GContext) -> BackendResult<()> {
        self.conn()?.free_gc(gc.get())?.check()?;
        Ok(())
    }

    fn create_pixmap(&mut self, depth: u8, width: u16, height: u16) -> BackendResult<Pixmap> {
        let pixmap = self.generate_id()?;
        let conn = self.conn()?;
        conn.create_pixmap(depth, pixmap, self.root, width, height)?
            .check()?;
        Ok(Pixmap::new(pixmap))
    }

    fn free_pixmap(&mut self, pixmap: Pixmap) -> BackendResult<()> {
        self.conn()?.free_pixmap(pixmap.get())?.check()?;
        Ok(())
    }

    fn open_font(&mut self, name: &str) -> BackendResult<Font> {
        let font = self.generate_id()?;
        self.conn()?.open_font(font, name.as_bytes())?.check()?;
        Ok(Font::new(font))
    }

    fn close_font(&mut self, font: Font) -> BackendResult<()> {
        self.conn()?.close_font(font.get())?.check()?;
        Ok(())
    }

    fn query_font(&mut self, font: Font) -> BackendResult<FontExtents> {
        let reply = self.conn()?.query_font(font.get())?.reply()?;
        Ok(FontExtents {
            ascent: reply.font_ascent,
            descent: reply.font_descent,
            char_width: reply.max_bounds.character_width,
        })
    }

    fn text_extents(&mut self, font: Font, text: &[u8]) -> BackendResult<i32> {
        // One byte per glyph; the high byte of each Char2b stays zero
        let chars: Vec<xproto::Char2b> = text
            .iter()
            .map(|&b| xproto::Char2b { byte1: 0, byte2: b })
            .collect();
        let reply = self.conn()?.query_text_extents(font.get(), &chars)?.reply()?;
        Ok(reply.overall_width)
    }

    fn alloc_color(&mut self, red: u16, green: u16, blue: u16) -> BackendResult<u32> {
        let reply = self
            .conn()?
            .alloc_color(self.colormap, red, green, blue)?
            .reply()?;
        Ok(reply.pixel)
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
        let rect = xproto::Rectangle {
            x,
            y,
            width,
            height,
        };
        self.conn()?
            .poly_rectangle(canvas.get(), gc.get(), &[rect])?
            .check()?;
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
        let rect = xproto::Rectangle {
            x,
            y,
            width,
            height,
        };
        self.conn()?
            .poly_fill_rectangle(canvas.get(), gc.get(), &[rect])?
            .check()?;
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
        // ImageText8 carries its length in a single byte
        if text.len() > 255 {
            return Err(format!("text run of {} bytes exceeds one request", text.len()).into());
        }
        self.conn()?
            .image_text8(canvas.get(), gc.get(), x, y, text)?
            .check()?;
        Ok(())
    }

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
    ) -> BackendResult<()> {
        self.conn()?
            .copy_area(
                src.get(),
                dst.get(),
                gc.get(),
                src_x,
                src_y,
                dst_x,
                dst_y,
                width,
                height,
            )?
            .check()?;
        Ok(())
    }

    fn flush(&mut self) -> BackendResult<()> {
        self.conn()?.flush()?;
        Ok(())
    }
}
