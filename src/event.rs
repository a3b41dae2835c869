use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use std::time::Duration;
use tokio::sync::mpsc;

use crate::action::Action;
use crate::dispatch::IntentKind;

pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<Event>,
    _task: tokio::task::JoinHandle<()>,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();

        let task = tokio::spawn(async move {
            loop {
                if event::poll(tick_rate).unwrap_or(false) {
                    if let Ok(evt) = event::read() {
                        if tx.send(evt).is_err() {
                            break;
                        }
                    }
                }
            }
        });

        EventHandler { rx, _task: task }
    }

    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }
}

/// Global key bindings, used when no modal owns the keyboard.
pub fn key_to_action(key: KeyEvent) -> Option<Action> {
    match (key.modifiers, key.code) {
        (KeyModifiers::CONTROL, KeyCode::Char('c')) => Some(Action::Quit),
        (KeyModifiers::NONE, KeyCode::Char('q')) => Some(Action::Quit),
        (KeyModifiers::NONE, KeyCode::Char('j')) | (KeyModifiers::NONE, KeyCode::Down) => {
            Some(Action::SelectNext)
        }
        (KeyModifiers::NONE, KeyCode::Char('k')) | (KeyModifiers::NONE, KeyCode::Up) => {
            Some(Action::SelectPrev)
        }
        (KeyModifiers::NONE, KeyCode::Enter) => Some(Action::OpenDetail),
        (KeyModifiers::NONE, KeyCode::Esc) => Some(Action::GoBack),
        (KeyModifiers::NONE, KeyCode::Char('n')) => Some(Action::OpenComposer),
        (KeyModifiers::NONE, KeyCode::Char('r')) => Some(Action::ReplyToSelected),
        (KeyModifiers::NONE, KeyCode::Char('f')) => Some(Action::Interact(IntentKind::Favourite)),
        (KeyModifiers::NONE, KeyCode::Char('b')) => Some(Action::Interact(IntentKind::Reblog)),
        (KeyModifiers::NONE, KeyCode::Char('c')) => Some(Action::ToggleContentWarning),
        (KeyModifiers::NONE, KeyCode::Char('m')) => Some(Action::ShowMenu),
        (KeyModifiers::NONE, KeyCode::Char('y')) => Some(Action::CopyLink),
        (KeyModifiers::NONE, KeyCode::Char('a')) => Some(Action::OpenAvatar),
        (KeyModifiers::NONE, KeyCode::Char('o')) => Some(Action::OpenMedia),
        (KeyModifiers::NONE, KeyCode::Char('u')) => Some(Action::ViewAuthorProfile),
        (KeyModifiers::SHIFT, KeyCode::Char('R')) => Some(Action::Refresh),
        (KeyModifiers::NONE, KeyCode::Char('g')) => Some(Action::ScrollToTop),
        (KeyModifiers::SHIFT, KeyCode::Char('G')) => Some(Action::ScrollToBottom),
        (KeyModifiers::NONE, KeyCode::Char('1')) => Some(Action::SwitchTab(0)),
        (KeyModifiers::NONE, KeyCode::Char('2')) => Some(Action::SwitchTab(1)),
        (KeyModifiers::NONE, KeyCode::Char('3')) => Some(Action::SwitchTab(2)),
        (KeyModifiers::SHIFT, KeyCode::Char('L')) => Some(Action::Logout),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn toot_box_keys() {
        assert!(matches!(
            key_to_action(key(KeyCode::Char('f'))),
            Some(Action::Interact(IntentKind::Favourite))
        ));
        assert!(matches!(
            key_to_action(key(KeyCode::Char('b'))),
            Some(Action::Interact(IntentKind::Reblog))
        ));
        assert!(matches!(
            key_to_action(key(KeyCode::Char('c'))),
            Some(Action::ToggleContentWarning)
        ));
        assert!(matches!(key_to_action(key(KeyCode::Char('m'))), Some(Action::ShowMenu)));
    }

    #[test]
    fn unbound_key_is_ignored() {
        assert!(key_to_action(key(KeyCode::Char('z'))).is_none());
    }
}
