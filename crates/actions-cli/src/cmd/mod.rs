pub mod callback;
pub mod config;
pub mod list;
pub mod render;
