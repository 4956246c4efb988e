use crate::app::{App, Focus};
use newsman::api::{Article, SENTINEL_CATEGORY};
use newsman::util::{capitalize_first, strip_control_chars, truncate_to_width};
use ratatui::{
    layout::{Alignment, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use super::helpers::SPINNER;

pub(super) const EMPTY_TITLE: &str = "No Articles Found";
pub(super) const EMPTY_HINT: &str = "Try selecting a different category or refreshing.";

/// Render the article cards for the current page.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    let is_focused = app.focus == Focus::Articles;
    let view = &app.view;

    let title = if view.selected_category == SENTINEL_CATEGORY {
        "All News".to_string()
    } else {
        capitalize_first(&strip_control_chars(&view.selected_category))
    };
    let title = if view.total_articles > 0 {
        format!("{} ({})", title, view.total_articles)
    } else {
        title
    };

    let border_style = if is_focused {
        app.style("panel_border_focused")
    } else {
        app.style("panel_border")
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(title);

    if view.articles_loading || view.visible_articles.is_empty() {
        let lines = if view.articles_loading {
            vec![Line::from(format!(
                "{} Loading articles...",
                SPINNER[app.spinner_frame % SPINNER.len()]
            ))]
        } else {
            vec![
                Line::from(Span::styled(EMPTY_TITLE, app.style("article_headline"))),
                Line::from(""),
                Line::from(EMPTY_HINT),
            ]
        };
        let placeholder = Paragraph::new(lines)
            .style(app.style("article_placeholder"))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(block);
        f.render_widget(placeholder, area);
        return;
    }

    let width = area.width.saturating_sub(4) as usize;
    let items: Vec<ListItem> = view
        .visible_articles
        .iter()
        .enumerate()
        .map(|(i, article)| {
            let card = card_lines(app, article, width);
            let item = ListItem::new(card);
            if i == app.article_cursor && is_focused {
                item.style(app.style("article_cursor"))
            } else {
                item
            }
        })
        .collect();

    let list = List::new(items).block(block).highlight_style(Style::default());
    let mut state = ListState::default().with_selected(Some(app.article_cursor));
    f.render_stateful_widget(list, area, &mut state);
}

/// One card: `source · date`, headline, summary, link, then a spacer.
fn card_lines<'a>(app: &App, article: &'a Article, width: usize) -> Vec<Line<'a>> {
    let source = strip_control_chars(&article.source_name);
    let meta = if source.is_empty() {
        article.formatted_date()
    } else {
        format!("{} · {}", source, article.formatted_date())
    };

    let headline = strip_control_chars(&article.headline);
    let summary = strip_control_chars(&article.summary);
    let link = strip_control_chars(&article.source_url);

    let mut lines = vec![
        Line::from(Span::styled(
            truncate_to_width(&meta, width).into_owned(),
            app.style("article_meta"),
        )),
        Line::from(Span::styled(
            truncate_to_width(&headline, width).into_owned(),
            app.style("article_headline"),
        )),
    ];
    if !summary.is_empty() {
        lines.push(Line::from(Span::styled(
            truncate_to_width(&summary, width).into_owned(),
            app.style("article_summary"),
        )));
    }
    if !link.is_empty() {
        lines.push(Line::from(Span::styled(
            truncate_to_width(&link, width).into_owned(),
            app.style("article_link"),
        )));
    }
    lines.push(Line::from(""));
    lines
}
