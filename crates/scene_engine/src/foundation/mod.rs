//! Foundation module - Core utilities and types
//!
//! Math aliases and matrix helpers in OpenGL conventions, the frame timer
//! and logging setup. Everything else in the engine builds on these.

pub mod math;
pub mod time;
pub mod logging;
