//! x11canvas - a minimal X11 draw context
//!
//! This library provides the drawing side of a bar/menu style UI: an
//! off-screen canvas pixmap, rectangle and text primitives with
//! width-budget truncation, `#RRGGBB` color resolution and a blit onto a
//! caller-owned window. It talks to the display through a small backend
//! trait with two implementations: a real X11 client (feature
//! `backend-x11`) and an in-memory null backend for headless use and tests.

pub mod backend;
pub mod color;
pub mod context;
pub mod font;
pub mod text;

pub use backend::{Backend, BackendResult, Font, GContext, Pixmap, ScreenInfo, Window};
pub use backend::null::NullBackend;
#[cfg(all(feature = "backend-x11", target_family = "unix"))]
pub use backend::x11::X11Backend;
pub use color::{ColorScheme, Rgb};
pub use context::DrawContext;
pub use font::{FontMetrics, DEFAULT_FONT};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
