//! Backend implementations
//!
//! This module contains the backend trait and the available implementations:
//! a real X11 client backend (feature `backend-x11`) and a null backend that
//! records requests for headless use and tests.

mod r#trait;
pub use r#trait::*;

#[cfg(all(feature = "backend-x11", target_family = "unix"))]
pub mod x11;

pub mod null;

/// Get available backend names (features enabled + platform compatible)
pub fn available_backends() -> Vec<&'static str> {
    let mut backends = Vec::new();

    // X11 backend is available on Unix systems when the feature is enabled
    #[cfg(all(feature = "backend-x11", target_family = "unix"))]
    backends.push("x11");

    // Null backend works everywhere
    backends.push("null");

    backends
}
