use lazytask_core::CellTone;
use ratatui::style::{Color, Modifier, Style};

pub const HEADER_STYLE: Style = Style::new()
    .fg(Color::Rgb(104, 157, 150))
    .add_modifier(Modifier::BOLD);
pub const SELECTED_STYLE: Style = Style::new()
    .bg(Color::Rgb(131, 165, 152))
    .fg(Color::Black)
    .add_modifier(Modifier::BOLD);
pub const FOCUSED_BORDER: Style = Style::new().fg(Color::Cyan);
pub const MODAL_BORDER: Style = Style::new().fg(Color::Yellow);
pub const HINT_STYLE: Style = Style::new().fg(Color::DarkGray);

pub fn tone_style(tone: CellTone) -> Style {
    match tone {
        CellTone::Header => HEADER_STYLE,
        CellTone::Normal => Style::new().fg(Color::Rgb(235, 219, 178)),
        CellTone::Active => Style::new()
            .fg(Color::Rgb(142, 192, 124))
            .add_modifier(Modifier::BOLD),
    }
}

pub fn zebra_row_style(index: usize) -> Style {
    let bg = if index % 2 == 0 {
        Color::Rgb(18, 20, 26)
    } else {
        Color::Rgb(24, 27, 34)
    };
    Style::new().bg(bg)
}

pub fn notice_style(is_error: bool) -> Style {
    if is_error {
        Style::new()
            .fg(Color::Rgb(254, 128, 25))
            .add_modifier(Modifier::BOLD)
    } else {
        Style::new().fg(Color::Rgb(184, 187, 38))
    }
}

pub mod keys {
    pub const HINTS: &[(&str, &str)] = &[
        ("←/→", "panel"),
        ("↑/↓", "select"),
        ("⏎", "start"),
        ("s", "stop"),
        ("a", "add"),
        ("d", "done"),
        ("Del", "delete"),
        ("r", "refresh"),
        ("Esc", "quit"),
    ];
}
