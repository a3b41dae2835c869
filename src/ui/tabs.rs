use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Tabs as RatatuiTabs};

pub fn draw_tabs(frame: &mut Frame, area: Rect, active: usize, unread: bool) {
    let notifications = if unread {
        "[2] Notifications •"
    } else {
        "[2] Notifications"
    };
    let titles = vec!["[1] Home", notifications, "[3] Profile"];
    let tabs = RatatuiTabs::new(titles)
        .block(Block::default().borders(Borders::BOTTOM).title(" Tootbox "))
        .select(active)
        .style(Style::default().fg(Color::DarkGray))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_widget(tabs, area);
}
