pub mod confirm_overlay;
pub mod detail;
pub mod footer;
pub mod header;
pub mod prompt_overlay;
pub mod render;
pub mod spinner;
pub mod tables;
