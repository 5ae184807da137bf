use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use artfolio_core::utils::{format_optional_date, truncate_string};

use crate::app::App;
use crate::ui::styles;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    render_artwork_list(frame, app, chunks[0]);
    render_preview(frame, app, chunks[1]);
}

fn render_artwork_list(frame: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .artworks
        .iter()
        .enumerate()
        .map(|(i, artwork)| {
            let line = Line::from(vec![
                Span::raw(format!("{:<28} ", truncate_string(&artwork.title, 28))),
                Span::styled(
                    truncate_string(artwork.author_name(), 16),
                    styles::muted_style(),
                ),
            ]);
            let style = if i == app.gallery_selection {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };
            ListItem::new(line).style(style)
        })
        .collect();

    let title = if app.gallery_loading {
        " Gallery (loading...) ".to_string()
    } else {
        format!(" Gallery ({}) ", app.artworks.len())
    };
    let block = Block::default()
        .title(title)
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    if items.is_empty() && !app.gallery_loading {
        let empty = Paragraph::new(Line::from(Span::styled(
            "  No artworks yet",
            styles::muted_style(),
        )))
        .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let mut state = ListState::default();
    state.select(Some(app.gallery_selection));
    frame.render_stateful_widget(List::new(items).block(block), area, &mut state);
}

fn render_preview(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" Preview ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    let Some(artwork) = app.selected_artwork() else {
        frame.render_widget(block, area);
        return;
    };

    let lines = vec![
        Line::from(Span::styled(artwork.title.clone(), styles::highlight_style())),
        Line::from(vec![
            Span::styled("by ", styles::muted_style()),
            Span::raw(artwork.user.as_ref().map(|u| u.display()).unwrap_or_default()),
        ]),
        Line::from(Span::styled(
            format_optional_date(artwork.created_at.as_deref(), "-"),
            styles::muted_style(),
        )),
        Line::from(""),
        Line::from(artwork.content.clone()),
        Line::from(""),
        Line::from(Span::styled(
            app.api.image_url(&artwork.image),
            styles::muted_style(),
        )),
    ];

    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        area,
    );
}
