use crate::app::{App, Focus, InputMode};
use newsman::api::SENTINEL_CATEGORY;
use newsman::util::{capitalize_first, strip_control_chars, truncate_to_width};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use super::helpers::SPINNER;

/// Label of the sentinel row.
const ALL_NEWS_LABEL: &str = "All News";

/// Render the category sidebar with the add-category box beneath it.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 3 || area.height < 3 {
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(3)])
        .split(area);

    render_list(f, app, chunks[0]);
    render_add_input(f, app, chunks[1]);
}

fn render_list(f: &mut Frame, app: &App, area: Rect) {
    let is_focused = app.focus == Focus::Categories;
    let view = &app.view;
    // Room for borders and the refresh marker
    let label_width = area.width.saturating_sub(6) as usize;

    let names = std::iter::once(SENTINEL_CATEGORY)
        .chain(view.categories.iter().map(|c| c.category_name.as_str()));

    let items: Vec<ListItem> = names
        .enumerate()
        .map(|(row, name)| {
            let label = if row == 0 {
                ALL_NEWS_LABEL.to_string()
            } else {
                capitalize_first(&strip_control_chars(name))
            };

            let style = if row == app.category_cursor && is_focused {
                app.style("category_cursor")
            } else if view.is_selected(name) {
                app.style("category_active")
            } else {
                app.style("category_normal")
            };

            let mut spans = vec![Span::styled(
                truncate_to_width(&label, label_width).into_owned(),
                style,
            )];
            if view.is_refreshing(name) {
                spans.push(Span::styled(
                    format!(" {}", SPINNER[app.spinner_frame % SPINNER.len()]),
                    app.style("category_refreshing"),
                ));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let title = if view.categories_loading {
        "Categories (loading)"
    } else {
        "Categories"
    };

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style(app, is_focused))
                .title(title),
        )
        .highlight_style(Style::default());

    let mut state = ListState::default().with_selected(Some(app.category_cursor));
    f.render_stateful_widget(list, area, &mut state);
}

fn render_add_input(f: &mut Frame, app: &App, area: Rect) {
    let editing = app.input_mode == InputMode::AddCategory;
    let input = &app.view.new_category_input;

    let (text, style) = if editing {
        (format!("{}_", input), app.style("input_active"))
    } else if input.is_empty() {
        ("[a] new category".to_string(), app.style("input_idle"))
    } else {
        (input.clone(), app.style("input_idle"))
    };

    let width = area.width.saturating_sub(2) as usize;
    let paragraph = Paragraph::new(truncate_to_width(&text, width).into_owned())
        .style(style)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style(app, editing))
                .title("Add"),
        );
    f.render_widget(paragraph, area);
}

fn border_style(app: &App, focused: bool) -> Style {
    if focused {
        app.style("panel_border_focused")
    } else {
        app.style("panel_border")
    }
}
