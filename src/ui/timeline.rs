use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::models::feed::FeedState;
use crate::ui::toot_box::{self, TootBoxContext};

/// Draws a scrolling list of toot boxes, keeping the selected one in view.
pub fn draw_feed(
    frame: &mut Frame,
    area: Rect,
    feed: &FeedState,
    ctx: &TootBoxContext,
    empty_message: &str,
) {
    if feed.loading && feed.cards.is_empty() {
        let loading = Paragraph::new("Loading...")
            .style(Style::default().fg(Color::Yellow))
            .alignment(Alignment::Center);
        frame.render_widget(loading, area);
        return;
    }

    if feed.cards.is_empty() {
        let empty = Paragraph::new(empty_message)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        frame.render_widget(empty, area);
        return;
    }

    let heights: Vec<u16> = feed
        .cards
        .iter()
        .map(|card| toot_box::toot_height(card, area.width, false, ctx))
        .collect();

    let offset = scroll_offset(&heights, feed.selected_index, feed.scroll_offset, area.height);

    let mut y = area.y;
    let max_y = area.bottom();
    let mut running: usize = 0;

    for (i, card) in feed.cards.iter().enumerate() {
        let h = heights[i];
        if running + h as usize <= offset {
            running += h as usize;
            continue;
        }
        if y >= max_y {
            break;
        }

        let available_h = (max_y - y).min(h);
        toot_box::draw_toot(
            frame,
            Rect::new(area.x, y, area.width, available_h),
            card,
            i == feed.selected_index,
            false,
            ctx,
        );

        y += available_h;
        running += h as usize;
    }

    if feed.loading && y < max_y {
        frame.render_widget(
            Paragraph::new("Loading more...")
                .style(Style::default().fg(Color::Yellow))
                .alignment(Alignment::Center),
            Rect::new(area.x, y, area.width, 1),
        );
    }
}

/// Row offset that keeps the selected box fully visible, moving as little
/// as possible from `current`.
pub(crate) fn scroll_offset(heights: &[u16], selected: usize, current: usize, visible: u16) -> usize {
    let start: usize = heights.iter().take(selected).map(|h| *h as usize).sum();
    let height = heights.get(selected).copied().unwrap_or(0) as usize;
    let visible = visible as usize;

    if start < current {
        start
    } else if start + height > current + visible {
        (start + height).saturating_sub(visible)
    } else {
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_follows_selection() {
        let heights = [5, 5, 5, 5];
        assert_eq!(scroll_offset(&heights, 0, 0, 10), 0);
        assert_eq!(scroll_offset(&heights, 1, 0, 10), 0);
        assert_eq!(scroll_offset(&heights, 2, 0, 10), 5);
        // Scrolling back up snaps to the top of the selection
        assert_eq!(scroll_offset(&heights, 1, 10, 10), 5);
    }
}
