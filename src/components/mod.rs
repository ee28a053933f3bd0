//! UI components.

pub mod warp;
