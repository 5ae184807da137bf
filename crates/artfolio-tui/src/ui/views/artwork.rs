use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use artfolio_core::utils::format_optional_date;

use crate::app::App;
use crate::ui::styles;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    render_details(frame, app, chunks[0]);
    render_comments(frame, app, chunks[1]);
}

fn render_details(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" Artwork ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    let lines = match (&app.detail, &app.detail_error) {
        (_, Some(error)) => vec![Line::from(Span::styled(error.clone(), styles::error_style()))],
        (None, None) => vec![Line::from(Span::styled("Loading...", styles::muted_style()))],
        (Some(outcome), None) => {
            let artwork = &outcome.detail.artwork;
            let viewer = app.user();
            let liked = viewer
                .as_ref()
                .is_some_and(|u| outcome.detail.is_liked_by(&u.id));
            let owned = app.owned_detail().is_some();

            let mut lines = vec![
                Line::from(Span::styled(artwork.title.clone(), styles::highlight_style())),
                Line::from(vec![
                    Span::styled("by ", styles::muted_style()),
                    Span::raw(artwork.user.as_ref().map(|u| u.display()).unwrap_or_default()),
                ]),
                Line::from(vec![
                    Span::styled("Posted  ", styles::muted_style()),
                    Span::raw(format_optional_date(artwork.created_at.as_deref(), "-")),
                ]),
                Line::from(vec![
                    Span::styled("Likes   ", styles::muted_style()),
                    Span::raw(outcome.like_count.to_string()),
                    if liked {
                        Span::styled("  (you like this)", styles::success_style())
                    } else {
                        Span::raw("")
                    },
                ]),
                Line::from(""),
                Line::from(artwork.content.clone()),
                Line::from(""),
                Line::from(Span::styled(
                    app.api.image_url(&artwork.image),
                    styles::muted_style(),
                )),
            ];
            if owned {
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled(
                    "[e] edit  [d] delete",
                    styles::help_key_style(),
                )));
            }
            lines
        }
    };

    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        area,
    );
}

fn render_comments(frame: &mut Frame, app: &App, area: Rect) {
    let comments = app
        .detail
        .as_ref()
        .map(|d| d.detail.comments.as_slice())
        .unwrap_or_default();

    let block = Block::default()
        .title(format!(" Comments ({}) ", comments.len()))
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    let mut lines = Vec::new();
    for comment in comments.iter().skip(app.comment_scroll) {
        lines.push(Line::from(vec![
            Span::styled(comment.user.display(), styles::highlight_style()),
            Span::styled(
                format!("  {}", format_optional_date(comment.created_at.as_deref(), "")),
                styles::muted_style(),
            ),
        ]));
        lines.push(Line::from(comment.content.clone()));
        lines.push(Line::from(""));
    }

    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        area,
    );
}
