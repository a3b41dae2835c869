use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState};

use crate::action::Action;
use crate::models::menu::{build_menu, MenuItem};
use crate::ui::Component;

/// Popup listing the actions available for one toot.
pub struct MenuPopup {
    items: Vec<MenuItem>,
    selected: usize,
}

impl MenuPopup {
    pub fn new(is_mine: bool, pinned: bool) -> Self {
        MenuPopup {
            items: build_menu(is_mine, pinned),
            selected: 0,
        }
    }
}

impl Component for MenuPopup {
    fn handle_key_event(&mut self, key: KeyEvent) -> Option<Action> {
        match (key.modifiers, key.code) {
            (KeyModifiers::NONE, KeyCode::Esc) | (KeyModifiers::NONE, KeyCode::Char('m')) => {
                Some(Action::CloseMenu)
            }
            (KeyModifiers::NONE, KeyCode::Char('j')) | (KeyModifiers::NONE, KeyCode::Down) => {
                if self.selected + 1 < self.items.len() {
                    self.selected += 1;
                }
                None
            }
            (KeyModifiers::NONE, KeyCode::Char('k')) | (KeyModifiers::NONE, KeyCode::Up) => {
                self.selected = self.selected.saturating_sub(1);
                None
            }
            (KeyModifiers::NONE, KeyCode::Enter) => self
                .items
                .get(self.selected)
                .map(|item| Action::MenuSelected(item.action)),
            _ => None,
        }
    }

    fn draw(&self, frame: &mut Frame, area: Rect) {
        let width = 24.min(area.width.saturating_sub(4));
        let height = (self.items.len() as u16 + 2).min(area.height);
        let popup = Rect {
            x: (area.width.saturating_sub(width)) / 2 + area.x,
            y: (area.height.saturating_sub(height)) / 2 + area.y,
            width,
            height,
        };

        frame.render_widget(Clear, popup);

        let items: Vec<ListItem> = self
            .items
            .iter()
            .map(|item| ListItem::new(format!(" {}  {}", item.icon, item.label)))
            .collect();

        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Cyan)),
            )
            .highlight_style(
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            );

        let mut state = ListState::default().with_selected(Some(self.selected));
        frame.render_stateful_widget(list, popup, &mut state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::menu::MenuAction;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn selects_by_position() {
        let mut menu = MenuPopup::new(true, false);
        menu.handle_key_event(key(KeyCode::Char('j')));
        menu.handle_key_event(key(KeyCode::Char('j')));
        assert!(matches!(
            menu.handle_key_event(key(KeyCode::Enter)),
            Some(Action::MenuSelected(MenuAction::Delete))
        ));
    }

    #[test]
    fn selection_stays_in_bounds() {
        let mut menu = MenuPopup::new(false, false);
        menu.handle_key_event(key(KeyCode::Up));
        for _ in 0..10 {
            menu.handle_key_event(key(KeyCode::Down));
        }
        assert!(matches!(
            menu.handle_key_event(key(KeyCode::Enter)),
            Some(Action::MenuSelected(MenuAction::BlockAccount))
        ));
    }

    #[test]
    fn escape_closes() {
        let mut menu = MenuPopup::new(false, false);
        assert!(matches!(
            menu.handle_key_event(key(KeyCode::Esc)),
            Some(Action::CloseMenu)
        ));
    }
}
