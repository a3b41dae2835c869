pub mod clipboard;
pub mod text;
pub mod time;
