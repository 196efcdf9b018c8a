//! Data models for the application

mod aspect;
mod reference;
mod video;

pub use aspect::*;
pub use reference::*;
pub use video::*;
