pub mod card;
pub mod content_warning;
pub mod entity;
pub mod feed;
pub mod menu;
pub mod profile;
pub mod reply;
pub mod thread;
pub mod toot;
