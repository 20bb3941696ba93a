//! Utilities module - small text helpers shared by handlers and clients

pub mod text_utils;

pub use text_utils::preview;
