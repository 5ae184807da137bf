use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::{App, EditField};
use crate::ui::styles;

use super::{button_line, field_line};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" Edit Artwork ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    let mut lines = vec![Line::from("")];
    if app.user().is_none() {
        lines.push(Line::from(Span::styled(
            "  Checking your session...",
            styles::muted_style(),
        )));
    } else {
        lines.push(field_line(
            "Title",
            &app.edit_title,
            app.edit_focus == EditField::Title,
            false,
        ));
        lines.push(field_line(
            "Description",
            &app.edit_content,
            app.edit_focus == EditField::Content,
            false,
        ));
        lines.push(Line::from(""));
        lines.push(button_line("Save", app.edit_focus == EditField::Button));
    }

    if let Some(ref error) = app.edit_error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(format!("  {}", error), styles::error_style())));
    }

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
