use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::action::Action;
use crate::ui::Component;

#[derive(Debug, Clone, PartialEq)]
enum LoginField {
    Instance,
    Token,
}

pub struct LoginForm {
    instance: String,
    token: String,
    focused_field: LoginField,
    error: Option<String>,
    submitting: bool,
}

impl LoginForm {
    pub fn new(default_instance: Option<String>) -> Self {
        let instance = default_instance.unwrap_or_default();
        // Skip straight to the token when the instance is already known
        let focused_field = if instance.is_empty() {
            LoginField::Instance
        } else {
            LoginField::Token
        };
        LoginForm {
            instance,
            token: String::new(),
            focused_field,
            error: None,
            submitting: false,
        }
    }

    pub fn set_error(&mut self, msg: String) {
        self.error = Some(msg);
        self.submitting = false;
    }

    fn field_mut(&mut self) -> &mut String {
        match self.focused_field {
            LoginField::Instance => &mut self.instance,
            LoginField::Token => &mut self.token,
        }
    }
}

impl Component for LoginForm {
    fn handle_key_event(&mut self, key: KeyEvent) -> Option<Action> {
        if self.submitting {
            return None;
        }

        match (key.modifiers, key.code) {
            (KeyModifiers::CONTROL, KeyCode::Char('c')) => return Some(Action::Quit),
            (KeyModifiers::NONE, KeyCode::Tab) | (KeyModifiers::SHIFT, KeyCode::BackTab) => {
                self.focused_field = match self.focused_field {
                    LoginField::Instance => LoginField::Token,
                    LoginField::Token => LoginField::Instance,
                };
            }
            (KeyModifiers::NONE, KeyCode::Enter) => {
                let instance = self.instance.trim();
                let token = self.token.trim();
                if !instance.is_empty() && !token.is_empty() {
                    self.submitting = true;
                    self.error = None;
                    return Some(Action::SubmitLogin {
                        instance_url: instance.to_string(),
                        access_token: token.to_string(),
                    });
                }
            }
            (KeyModifiers::NONE, KeyCode::Backspace) => {
                self.field_mut().pop();
            }
            (_, KeyCode::Char(c)) => self.field_mut().push(c),
            (KeyModifiers::NONE, KeyCode::Esc) => return Some(Action::Quit),
            _ => {}
        }
        None
    }

    fn draw(&self, frame: &mut Frame, area: Rect) {
        let modal_width = 56.min(area.width.saturating_sub(4));
        let modal_height = 14.min(area.height.saturating_sub(4));
        let modal_area = Rect {
            x: (area.width.saturating_sub(modal_width)) / 2 + area.x,
            y: (area.height.saturating_sub(modal_height)) / 2 + area.y,
            width: modal_width,
            height: modal_height,
        };

        frame.render_widget(Clear, modal_area);

        let block = Block::default()
            .title(" Tootbox - Login ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));

        let inner = block.inner(modal_area);
        frame.render_widget(block, modal_area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Min(0),
            ])
            .split(inner);

        let title_style = Style::default().fg(Color::White).add_modifier(Modifier::BOLD);
        frame.render_widget(
            Paragraph::new("Sign in with an access token")
                .style(title_style)
                .alignment(Alignment::Center),
            chunks[0],
        );

        let label_style = |focused: bool| {
            if focused {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            }
        };
        let value_style = |focused: bool| {
            if focused {
                Style::default().fg(Color::White)
            } else {
                Style::default().fg(Color::DarkGray)
            }
        };

        let on_instance = self.focused_field == LoginField::Instance;
        frame.render_widget(
            Paragraph::new("Instance:").style(label_style(on_instance)),
            chunks[2],
        );
        let instance_text = if on_instance {
            format!("{}█", &self.instance)
        } else {
            self.instance.clone()
        };
        frame.render_widget(
            Paragraph::new(instance_text).style(value_style(on_instance)),
            chunks[3],
        );

        let on_token = self.focused_field == LoginField::Token;
        frame.render_widget(
            Paragraph::new("Access token:").style(label_style(on_token)),
            chunks[5],
        );
        let masked = "•".repeat(self.token.chars().count());
        let token_text = if on_token { format!("{}█", masked) } else { masked };
        frame.render_widget(
            Paragraph::new(token_text).style(value_style(on_token)),
            chunks[6],
        );

        if let Some(ref error) = self.error {
            frame.render_widget(
                Paragraph::new(error.as_str())
                    .style(Style::default().fg(Color::Red))
                    .wrap(Wrap { trim: true }),
                chunks[8],
            );
        } else if self.submitting {
            frame.render_widget(
                Paragraph::new("Signing in...").style(Style::default().fg(Color::Yellow)),
                chunks[8],
            );
        } else {
            frame.render_widget(
                Paragraph::new("Tab: switch fields  Enter: submit  Esc: quit")
                    .style(Style::default().fg(Color::DarkGray)),
                chunks[8],
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn known_instance_focuses_token() {
        let mut form = LoginForm::new(Some("https://mastodon.social".into()));
        for c in "tok".chars() {
            form.handle_key_event(key(KeyCode::Char(c)));
        }
        match form.handle_key_event(key(KeyCode::Enter)) {
            Some(Action::SubmitLogin {
                instance_url,
                access_token,
            }) => {
                assert_eq!(instance_url, "https://mastodon.social");
                assert_eq!(access_token, "tok");
            }
            other => panic!("unexpected {:?}", other),
        }
        // Locked while the request is out
        assert!(form.handle_key_event(key(KeyCode::Enter)).is_none());
    }

    #[test]
    fn empty_token_does_not_submit() {
        let mut form = LoginForm::new(None);
        for c in "example.social".chars() {
            form.handle_key_event(key(KeyCode::Char(c)));
        }
        assert!(form.handle_key_event(key(KeyCode::Enter)).is_none());
    }

    #[test]
    fn failure_unlocks_form() {
        let mut form = LoginForm::new(Some("https://a.b".into()));
        form.handle_key_event(key(KeyCode::Char('x')));
        assert!(form.handle_key_event(key(KeyCode::Enter)).is_some());
        form.set_error("bad token".into());
        assert_eq!(form.error.as_deref(), Some("bad token"));
        assert!(form.handle_key_event(key(KeyCode::Enter)).is_some());
    }
}
