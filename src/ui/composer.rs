use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use tui_textarea::{CursorMove, TextArea};

use crate::action::Action;
use crate::models::reply::ReplyContext;
use crate::models::toot::Viewer;
use crate::ui::Component;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Focus {
    Body,
    Spoiler,
}

pub struct Composer {
    textarea: TextArea<'static>,
    spoiler: TextArea<'static>,
    cw: bool,
    focus: Focus,
    reply: Option<ReplyContext>,
    char_limit: usize,
}

fn body_area(title: String) -> TextArea<'static> {
    let mut textarea = TextArea::default();
    textarea.set_block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(title),
    );
    textarea.set_cursor_line_style(Style::default());
    textarea.set_placeholder_text("有什么新鲜事？");
    textarea
}

fn spoiler_area(text: &str) -> TextArea<'static> {
    let mut spoiler = TextArea::new(vec![text.to_string()]);
    spoiler.set_block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(" Content warning "),
    );
    spoiler.set_cursor_line_style(Style::default());
    spoiler.set_placeholder_text("在这里写下你的警告");
    spoiler.move_cursor(CursorMove::End);
    spoiler
}

impl Composer {
    pub fn new(char_limit: usize) -> Self {
        Composer {
            textarea: body_area(" Compose ".to_string()),
            spoiler: spoiler_area(""),
            cw: false,
            focus: Focus::Body,
            reply: None,
            char_limit,
        }
    }

    /// Starts a reply seeded from `reply`: mentions prefilled, content
    /// warning armed when the context asks for it.
    pub fn open_reply(&mut self, reply: ReplyContext, viewer: &Viewer) {
        let title = format!(" Reply to @{} ", reply.reply_to_username);
        self.textarea = body_area(title);
        let initial = reply.initial_text(viewer);
        if !initial.is_empty() {
            self.textarea.insert_str(initial);
        }
        self.cw = reply.cw;
        self.spoiler = spoiler_area(if reply.cw { &reply.spoiler_text } else { "" });
        self.focus = Focus::Body;
        self.reply = Some(reply);
    }

    pub fn in_reply_to(&self) -> Option<&str> {
        self.reply.as_ref().map(|r| r.in_reply_to_id.as_str())
    }

    fn toggle_cw(&mut self) {
        self.cw = !self.cw;
        self.focus = if self.cw { Focus::Spoiler } else { Focus::Body };
    }

    fn text(&self) -> String {
        self.textarea.lines().join("\n")
    }

    fn spoiler_text(&self) -> String {
        self.spoiler.lines().join(" ")
    }

    /// Characters counted against the instance limit. The warning text
    /// counts too, as the server does.
    fn char_count(&self) -> usize {
        let body = self.text().chars().count();
        if self.cw {
            body + self.spoiler_text().chars().count()
        } else {
            body
        }
    }

    fn submit(&self) -> Option<Action> {
        let text = self.text();
        if text.trim().is_empty() || self.char_count() > self.char_limit {
            return None;
        }
        let spoiler = self.spoiler_text();
        Some(Action::SubmitToot {
            text,
            spoiler_text: if self.cw && !spoiler.trim().is_empty() {
                Some(spoiler)
            } else {
                None
            },
            in_reply_to_id: self.in_reply_to().map(str::to_string),
        })
    }
}

impl Component for Composer {
    fn handle_key_event(&mut self, key: KeyEvent) -> Option<Action> {
        match (key.modifiers, key.code) {
            (KeyModifiers::NONE, KeyCode::Esc) => return Some(Action::CloseComposer),
            (KeyModifiers::CONTROL, KeyCode::Enter)
            | (KeyModifiers::ALT, KeyCode::Enter)
            | (KeyModifiers::CONTROL, KeyCode::Char('s')) => return self.submit(),
            (KeyModifiers::CONTROL, KeyCode::Char('w')) => self.toggle_cw(),
            (KeyModifiers::NONE, KeyCode::Tab) if self.cw => {
                self.focus = match self.focus {
                    Focus::Body => Focus::Spoiler,
                    Focus::Spoiler => Focus::Body,
                };
            }
            // The warning is a single line
            (_, KeyCode::Enter) if self.focus == Focus::Spoiler => self.focus = Focus::Body,
            _ => {
                if matches!(key.code, KeyCode::Char(_)) && self.char_count() >= self.char_limit {
                    return None;
                }
                match self.focus {
                    Focus::Body => {
                        self.textarea.input(key);
                    }
                    Focus::Spoiler => {
                        self.spoiler.input(key);
                    }
                }
            }
        }
        None
    }

    fn draw(&self, frame: &mut Frame, area: Rect) {
        let modal_width = 64.min(area.width.saturating_sub(4));
        let modal_height = 14.min(area.height.saturating_sub(4));
        let modal_area = Rect {
            x: (area.width.saturating_sub(modal_width)) / 2 + area.x,
            y: (area.height.saturating_sub(modal_height)) / 2 + area.y,
            width: modal_width,
            height: modal_height,
        };

        frame.render_widget(Clear, modal_area);

        let spoiler_height = if self.cw { 3 } else { 0 };
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(spoiler_height),
                Constraint::Min(1),
                Constraint::Length(1),
            ])
            .split(modal_area);

        if self.cw {
            frame.render_widget(&self.spoiler, chunks[0]);
        }
        frame.render_widget(&self.textarea, chunks[1]);

        let count = self.char_count();
        let counter_style = if count > self.char_limit {
            Style::default().fg(Color::Red)
        } else if count + 20 > self.char_limit {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        let cw_style = if self.cw {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        let status = Line::from(vec![
            Span::styled(format!("{}/{}", count, self.char_limit), counter_style),
            Span::raw("  "),
            Span::styled("CW", cw_style),
            Span::raw("  "),
            Span::styled(
                "Ctrl+Enter/Ctrl+S: post  Ctrl+W: CW  Esc: cancel",
                Style::default().fg(Color::DarkGray),
            ),
        ]);
        frame.render_widget(Paragraph::new(status), chunks[2]);
    }
}
