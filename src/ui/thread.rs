use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::models::card::TootCard;
use crate::models::thread::ThreadViewModel;
use crate::ui::timeline;
use crate::ui::toot_box::{self, TootBoxContext};

/// One vertical slice of the detail view.
enum Row<'a> {
    Toot {
        card: &'a TootCard,
        index: usize,
        detailed: bool,
        indent: u16,
    },
    Connector,
    Separator,
    Header(String),
}

fn rows(thread: &ThreadViewModel) -> Vec<Row<'_>> {
    let mut rows = Vec::new();
    for (i, card) in thread.ancestors.iter().enumerate() {
        rows.push(Row::Toot {
            card,
            index: i,
            detailed: false,
            indent: 0,
        });
        rows.push(Row::Connector);
    }

    let focal = thread.focal_index();
    rows.push(Row::Toot {
        card: &thread.focal,
        index: focal,
        detailed: true,
        indent: 0,
    });
    rows.push(Row::Separator);

    let header = if !thread.context_loaded {
        "Loading replies...".to_string()
    } else {
        let n = thread.descendants.len();
        format!(" {} {}", n, if n == 1 { "reply" } else { "replies" })
    };
    rows.push(Row::Header(header));

    for (i, card) in thread.descendants.iter().enumerate() {
        rows.push(Row::Toot {
            card,
            index: focal + 1 + i,
            detailed: false,
            indent: 2,
        });
    }
    rows
}

fn row_height(row: &Row, width: u16, ctx: &TootBoxContext) -> u16 {
    match row {
        Row::Toot {
            card,
            detailed,
            indent,
            ..
        } => toot_box::toot_height(card, width.saturating_sub(*indent), *detailed, ctx),
        Row::Connector | Row::Separator | Row::Header(_) => 1,
    }
}

pub fn draw_thread(
    frame: &mut Frame,
    area: Rect,
    thread: Option<&ThreadViewModel>,
    ctx: &TootBoxContext,
) {
    let thread = match thread {
        Some(t) => t,
        None => {
            let loading = Paragraph::new("Loading thread...")
                .style(Style::default().fg(Color::Yellow))
                .alignment(Alignment::Center);
            frame.render_widget(loading, area);
            return;
        }
    };

    let rows = rows(thread);
    let heights: Vec<u16> = rows.iter().map(|r| row_height(r, area.width, ctx)).collect();
    let selected_row = rows
        .iter()
        .position(|r| matches!(r, Row::Toot { index, .. } if *index == thread.selected_index))
        .unwrap_or(0);
    let offset = timeline::scroll_offset(&heights, selected_row, 0, area.height);

    let mut y = area.y;
    let max_y = area.bottom();
    let mut running: usize = 0;

    for (row, h) in rows.iter().zip(heights.iter().copied()) {
        if running + h as usize <= offset {
            running += h as usize;
            continue;
        }
        if y >= max_y {
            break;
        }
        let h = h.min(max_y - y);

        match row {
            Row::Toot {
                card,
                index,
                detailed,
                indent,
            } => {
                let rect = Rect::new(area.x + indent, y, area.width.saturating_sub(*indent), h);
                toot_box::draw_toot(
                    frame,
                    rect,
                    card,
                    *index == thread.selected_index,
                    *detailed,
                    ctx,
                );
            }
            Row::Connector => {
                let connector = Paragraph::new("│").style(Style::default().fg(Color::DarkGray));
                frame.render_widget(connector, Rect::new(area.x + 1, y, 1, 1));
            }
            Row::Separator => {
                let sep = Block::default()
                    .borders(Borders::TOP)
                    .border_style(Style::default().fg(Color::DarkGray));
                frame.render_widget(sep, Rect::new(area.x, y, area.width, 1));
            }
            Row::Header(text) => {
                frame.render_widget(
                    Paragraph::new(text.as_str()).style(Style::default().fg(Color::Gray)),
                    Rect::new(area.x, y, area.width, 1),
                );
            }
        }

        y += h;
        running += h as usize;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::entity::{Context, Status, TootPayload};
    use crate::models::toot::Viewer;

    fn status(id: &str) -> Status {
        Status {
            id: id.into(),
            ..Default::default()
        }
    }

    #[test]
    fn every_toot_gets_a_row_with_its_index() {
        let viewer = Viewer::new("1", "bob");
        let mut thread = ThreadViewModel::new(TootPayload::Status(status("s2")), &viewer);
        thread.set_context(
            Context {
                ancestors: vec![status("s1")],
                descendants: vec![status("s3"), status("s4")],
            },
            &viewer,
        );
        let indices: Vec<usize> = rows(&thread)
            .iter()
            .filter_map(|r| match r {
                Row::Toot { index, .. } => Some(*index),
                _ => None,
            })
            .collect();
        assert_eq!(indices, vec![0, 1, 2, 3]);
    }
}
