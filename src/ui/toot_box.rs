use chrono::{DateTime, Utc};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use crate::dispatch::{InFlight, IntentKind};
use crate::models::card::TootCard;
use crate::models::entity::MediaKind;
use crate::models::toot::AdditionalInfo;
use crate::store::EmojiMap;
use crate::utils::text::{detect_facets, html_to_text, styled_text, wrapped_line_count};
use crate::utils::time::local_timestamp;

/// Shared inputs for drawing toot boxes.
pub struct TootBoxContext<'a> {
    pub emojis: &'a EmojiMap,
    pub now: DateTime<Utc>,
    pub in_flight: &'a InFlight,
}

/// A run of rows inside a toot box. `rows` is what the block occupies at
/// the width it was built for.
struct Section {
    lines: Vec<Line<'static>>,
    rows: u16,
}

impl Section {
    fn single(line: Line<'static>) -> Self {
        Section {
            lines: vec![line],
            rows: 1,
        }
    }
}

fn sections(card: &TootCard, width: u16, detailed: bool, ctx: &TootBoxContext) -> Vec<Section> {
    let view = card.view();
    let dim = Style::default().fg(Color::DarkGray);
    let mut out = Vec::new();

    // Why this toot is here: boosted by, pinned, notification kind
    if let (Some(label), Some(actor)) = (view.additional_info.label(), view.actor.as_ref()) {
        let (icon_style, name_style) = match view.additional_info {
            AdditionalInfo::Favourite => (Style::default().fg(Color::Yellow), dim),
            AdditionalInfo::Follow => (Style::default().fg(Color::LightGreen), dim),
            _ => (dim, dim),
        };
        let name_style = if view.is_notification_page {
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
        } else {
            name_style
        };
        out.push(Section::single(Line::from(vec![
            Span::styled(format!("{} ", view.additional_info.icon()), icon_style),
            Span::styled(actor.name().to_string(), name_style),
            Span::styled(format!(" {}", label), dim),
        ])));
    }

    // Author line
    if let Some(account) = view.display_account.as_ref() {
        let time = if detailed {
            view.created_at().map(|at| local_timestamp(&at))
        } else {
            view.relative_time(ctx.now)
        };
        let mut spans = vec![
            Span::styled(
                account.name().to_string(),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!("  @{}", account.acct), dim),
        ];
        if let Some(time) = time {
            spans.push(Span::styled(format!("  {}", time), dim));
        }
        out.push(Section::single(Line::from(spans)));
    }

    let status = match view.body() {
        Some(s) => s,
        None => return out,
    };

    // Content warning
    let gate = card.gate();
    if gate.is_active() {
        let spoiler = if status.spoiler_text.trim().is_empty() {
            "⚠".to_string()
        } else {
            format!("⚠ {}", status.spoiler_text)
        };
        out.push(Section {
            rows: wrapped_line_count(&spoiler, width),
            lines: vec![Line::from(Span::styled(
                spoiler,
                Style::default().fg(Color::Yellow),
            ))],
        });
        out.push(Section::single(Line::from(Span::styled(
            format!("[c] {}", gate.toggle_label()),
            Style::default().fg(Color::Cyan),
        ))));
    }

    if gate.body_visible() {
        let text = html_to_text(&status.content);
        if !text.is_empty() {
            let base = if view.is_notification_page {
                Style::default().fg(Color::Gray)
            } else {
                Style::default()
            };
            let facets = detect_facets(&text, ctx.emojis);
            out.push(Section {
                rows: wrapped_line_count(&text, width),
                lines: styled_text(&text, &facets, base),
            });
        }

        if let Some(summary) = media_summary(view.media().iter().map(|m| m.kind)) {
            out.push(Section::single(Line::from(Span::styled(summary, dim))));
        }
    }

    if view.show_thread_hint {
        out.push(Section::single(Line::from(Span::styled("显示前文", dim))));
    }

    if let Some(bar) = view.action_bar() {
        let pending = |kind| ctx.in_flight.is_pending(&status.id, kind);
        let reblog_style = if bar.reblogged {
            Style::default().fg(Color::Green)
        } else {
            dim
        };
        let fav_style = if bar.favourited {
            Style::default().fg(Color::Yellow)
        } else {
            dim
        };
        out.push(Section::single(Line::from(vec![
            Span::styled(format!("↩ {}", bar.replies_count), dim),
            Span::raw("  "),
            Span::styled(
                format!(
                    "⟳ {}{}",
                    bar.reblogs_count,
                    if pending(IntentKind::Reblog) { "…" } else { "" }
                ),
                reblog_style,
            ),
            Span::raw("  "),
            Span::styled(
                format!(
                    "{} {}{}",
                    if bar.favourited { "★" } else { "☆" },
                    bar.favourites_count,
                    if pending(IntentKind::Favourite) { "…" } else { "" }
                ),
                fav_style,
            ),
            Span::raw("  "),
            Span::styled("⋯", dim),
        ])));
    }

    out
}

fn media_summary(kinds: impl Iterator<Item = MediaKind>) -> Option<String> {
    let kinds: Vec<MediaKind> = kinds.collect();
    if kinds.is_empty() {
        return None;
    }
    let label = if kinds.iter().all(|k| *k == MediaKind::Image) {
        "image"
    } else if kinds.iter().all(|k| matches!(k, MediaKind::Video | MediaKind::Gifv)) {
        "video"
    } else if kinds.iter().all(|k| *k == MediaKind::Audio) {
        "audio"
    } else {
        "attachment"
    };
    Some(format!(
        "🖼 {} {}{}",
        kinds.len(),
        label,
        if kinds.len() != 1 { "s" } else { "" }
    ))
}

fn inner_width(width: u16) -> u16 {
    // left border plus one column of padding
    width.saturating_sub(2)
}

pub fn toot_height(card: &TootCard, width: u16, detailed: bool, ctx: &TootBoxContext) -> u16 {
    let rows: u16 = sections(card, inner_width(width), detailed, ctx)
        .iter()
        .map(|s| s.rows)
        .sum();
    rows + 1
}

pub fn draw_toot(
    frame: &mut Frame,
    area: Rect,
    card: &TootCard,
    selected: bool,
    detailed: bool,
    ctx: &TootBoxContext,
) {
    let border_style = if selected {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let block = Block::default()
        .borders(Borders::LEFT)
        .border_style(border_style);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.height == 0 || inner.width == 0 {
        return;
    }

    let x = inner.x + 1;
    let w = inner.width.saturating_sub(1);
    let bottom = inner.bottom();
    let mut y = inner.y;

    for section in sections(card, w, detailed, ctx) {
        if y >= bottom {
            return;
        }
        let h = section.rows.min(bottom - y);
        frame.render_widget(
            Paragraph::new(section.lines).wrap(Wrap { trim: false }),
            Rect::new(x, y, w, h),
        );
        y += h;
    }
}
