use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::{App, AuthField, AuthMode};
use crate::ui::render::centered_rect_fixed;
use crate::ui::styles;

use super::{button_line, field_line};

/// Sign-in and sign-up share one centered form
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let signing_up = app.auth_mode == AuthMode::SignUp;
    let mut height = if signing_up { 12 } else { 11 };
    if app.auth_error.is_some() {
        height += 2;
    }
    let area = centered_rect_fixed(48, height, area);
    frame.render_widget(Clear, area);

    let (title, button, switch_hint) = if signing_up {
        (" Sign Up ", "Create account", "Have an account? [F2] Sign in")
    } else {
        (" Sign In ", "Sign in", "New here? [F2] Sign up")
    };

    let mut lines = vec![Line::from("")];
    if signing_up {
        lines.push(field_line(
            "Name",
            &app.auth_name,
            app.auth_focus == AuthField::Name,
            false,
        ));
    }
    lines.push(field_line(
        "Username",
        &app.auth_username,
        app.auth_focus == AuthField::Username,
        false,
    ));
    lines.push(field_line(
        "Password",
        &app.auth_password,
        app.auth_focus == AuthField::Password,
        true,
    ));
    lines.push(Line::from(""));
    if app.auth_pending {
        lines.push(Line::from(Span::styled(
            "              Please wait...",
            styles::muted_style(),
        )));
    } else {
        lines.push(button_line(button, app.auth_focus == AuthField::Button));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        format!("  {}", switch_hint),
        styles::muted_style(),
    )));

    if let Some(ref error) = app.auth_error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(format!("  {}", error), styles::error_style())));
    }

    let block = Block::default()
        .title(title)
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
