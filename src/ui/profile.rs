use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use crate::models::feed::FeedState;
use crate::models::profile::ProfileViewModel;
use crate::ui::timeline;
use crate::ui::toot_box::TootBoxContext;

pub fn draw_profile(
    frame: &mut Frame,
    area: Rect,
    profile: Option<&ProfileViewModel>,
    feed: &FeedState,
    ctx: &TootBoxContext,
) {
    let profile = match profile {
        Some(p) => p,
        None => {
            let loading = Paragraph::new("Loading profile...")
                .style(Style::default().fg(Color::Yellow))
                .alignment(Alignment::Center);
            frame.render_widget(loading, area);
            return;
        }
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(7), Constraint::Min(1)])
        .split(area);

    draw_profile_header(frame, chunks[0], profile);
    timeline::draw_feed(frame, chunks[1], feed, ctx, "No toots");
}

fn draw_profile_header(frame: &mut Frame, area: Rect, profile: &ProfileViewModel) {
    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(2),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(inner);

    frame.render_widget(
        Paragraph::new(profile.display_name.as_str())
            .style(Style::default().fg(Color::White).add_modifier(Modifier::BOLD)),
        chunks[0],
    );

    let mut handle = vec![Span::styled(
        format!("@{}", profile.acct),
        Style::default().fg(Color::DarkGray),
    )];
    if profile.avatar.is_some() {
        handle.push(Span::styled(
            "  [a] avatar",
            Style::default().fg(Color::DarkGray),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(handle)), chunks[1]);

    if !profile.note.is_empty() {
        frame.render_widget(
            Paragraph::new(profile.note.as_str())
                .style(Style::default().fg(Color::Gray))
                .wrap(Wrap { trim: true }),
            chunks[2],
        );
    }

    let bold = Style::default().fg(Color::White).add_modifier(Modifier::BOLD);
    let dim = Style::default().fg(Color::DarkGray);
    let stats = Line::from(vec![
        Span::styled(profile.statuses_count.to_string(), bold),
        Span::styled(" toots  ", dim),
        Span::styled(profile.following_count.to_string(), bold),
        Span::styled(" following  ", dim),
        Span::styled(profile.followers_count.to_string(), bold),
        Span::styled(" followers", dim),
    ]);
    frame.render_widget(Paragraph::new(stats), chunks[3]);
}
