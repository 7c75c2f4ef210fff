//! The components module contains all shared components for our app.

mod video_stage;
pub mod video_manager;

pub use video_stage::*;
