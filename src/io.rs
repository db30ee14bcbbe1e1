pub mod config;
pub mod image;
pub mod scene_format;
