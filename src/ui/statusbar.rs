use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::app::Screen;

pub fn draw_statusbar(
    frame: &mut Frame,
    area: Rect,
    screen: &Screen,
    modal_open: bool,
    error: Option<&str>,
    notice: Option<&str>,
) {
    if let Some(err) = error {
        let error_bar = Paragraph::new(format!(" Error: {}", err))
            .style(Style::default().fg(Color::White).bg(Color::Red));
        frame.render_widget(error_bar, area);
        return;
    }

    if let Some(notice) = notice {
        let bar = Paragraph::new(format!(" {}", notice))
            .style(Style::default().fg(Color::Black).bg(Color::Cyan));
        frame.render_widget(bar, area);
        return;
    }

    let hints = if modal_open {
        "Esc: close"
    } else {
        match screen {
            Screen::Login => "Tab: switch fields | Enter: login | Esc: quit",
            Screen::Home | Screen::Notifications => {
                "j/k: move | Enter: open | n: toot | r: reply | f: fav | b: boost | c: CW | m: menu | R: refresh | q: quit"
            }
            Screen::Detail => {
                "j/k: move | Enter: open | Esc: back | r: reply | f: fav | b: boost | c: CW | m: menu | y: copy link | o: media | u: profile"
            }
            Screen::Profile => "j/k: move | Enter: open | a: avatar | Esc: back | q: quit",
        }
    };

    let bar = Paragraph::new(format!(" {}", hints))
        .style(Style::default().fg(Color::DarkGray).bg(Color::Black));
    frame.render_widget(bar, area);
}
