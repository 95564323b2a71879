//! Abstract wallpaper generator
//!
//! Turns a short text prompt into an AI-generated abstract wallpaper for a
//! desktop (16:9) or mobile (9:16) screen, previews it in the terminal, and
//! saves it to disk on request.

pub mod ai;
pub mod app;
pub mod classify;
pub mod download;
pub mod error;
pub mod models;
pub mod prompts;
pub mod session;
pub mod view;
pub mod wallpaper;

pub use error::{Error, Result};
