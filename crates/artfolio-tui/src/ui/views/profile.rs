use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::ui::styles;

use super::field_line;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" Profile ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    let lines = match app.user() {
        None => vec![
            Line::from(""),
            Line::from(Span::styled("  Checking your session...", styles::muted_style())),
        ],
        Some(user) => vec![
            Line::from(""),
            Line::from(vec![
                Span::styled("    Username: ", styles::muted_style()),
                Span::raw(format!("@{}", user.username)),
            ]),
            Line::from(vec![
                Span::styled("     User id: ", styles::muted_style()),
                Span::raw(user.id),
            ]),
            Line::from(""),
            field_line("Name", &app.profile_name, true, false),
            Line::from(""),
            Line::from(vec![
                Span::styled("  [Enter]", styles::help_key_style()),
                Span::styled(" save name   ", styles::muted_style()),
                Span::styled("[F3]", styles::help_key_style()),
                Span::styled(" sign out", styles::muted_style()),
            ]),
        ],
    };

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
