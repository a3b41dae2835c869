pub mod composer;
pub mod login;
pub mod menu;
pub mod profile;
pub mod statusbar;
pub mod tabs;
pub mod thread;
pub mod timeline;
pub mod toot_box;

use crossterm::event::KeyEvent;
use ratatui::Frame;

use crate::action::Action;

/// Modal components (`LoginForm`, `Composer`, `MenuPopup`) own their state
/// and take the keyboard while open.
///
/// Feeds, threads and profiles are drawn by plain `draw_*()` functions over
/// `App` state instead.
pub trait Component {
    fn handle_key_event(&mut self, key: KeyEvent) -> Option<Action>;
    fn draw(&self, frame: &mut Frame, area: ratatui::prelude::Rect);
}
