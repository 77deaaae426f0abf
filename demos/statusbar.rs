//! Minimal status bar along the top edge of the screen
//!
//! Creates an unmanaged strip window, then once a second renders an uptime
//! counter into the off-screen canvas and blits it over. Run with:
//!
//!   cargo run --example statusbar

use std::thread;
use std::time::{Duration, Instant};

use x11rb::connection::Connection;
use x11rb::protocol::xproto::{ConnectionExt as _, CreateWindowAux, WindowClass};

use x11canvas::{Backend, ColorScheme, DrawContext, Window, X11Backend};

const BAR_HEIGHT: u16 = 18;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::debug!(
        "backends compiled in: {}",
        x11canvas::backend::available_backends().join(", ")
    );

    let mut backend = X11Backend::new(None);
    backend.init().expect("cannot reach an X server");

    // The bar window is created on the same connection the canvas will be
    // drawn over; the context's own init below is then a no-op.
    let conn = backend.connection().expect("connected above");
    let screen = &conn.setup().roots[backend.screen_num()];
    let width = screen.width_in_pixels;
    let window = conn.generate_id().expect("cannot allocate a window id");
    conn.create_window(
        x11rb::COPY_DEPTH_FROM_PARENT,
        window,
        screen.root,
        0,
        0,
        width,
        BAR_HEIGHT,
        0,
        WindowClass::INPUT_OUTPUT,
        screen.root_visual,
        &CreateWindowAux::new()
            .background_pixel(screen.black_pixel)
            .override_redirect(1),
    )
    .expect("cannot send create_window")
    .check()
    .expect("cannot create the bar window");
    conn.map_window(window)
        .expect("cannot send map_window")
        .check()
        .expect("cannot map the bar window");
    let window = Window::new(window);

    let mut ctx = DrawContext::new(Box::new(backend)).expect("cannot build a draw context");
    ctx.init_font(Some("fixed"));
    ctx.resize_canvas(width, BAR_HEIGHT)
        .expect("cannot allocate the canvas");

    let scheme = ColorScheme::new(ctx.resolve_color("#1d1f21"), ctx.resolve_color("#e0e0e0"));
    let started = Instant::now();

    log::info!("status bar up, {}x{} canvas", width, BAR_HEIGHT);
    loop {
        let text = format!("x11canvas demo | up {}s", started.elapsed().as_secs());
        ctx.clear(scheme);
        ctx.draw_text(&text, scheme);
        if let Err(err) = ctx.blit(window, width, BAR_HEIGHT) {
            log::warn!("lost a frame: {}", err);
        }
        thread::sleep(Duration::from_secs(1));
    }
}
