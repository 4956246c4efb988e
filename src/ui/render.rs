//! Render functions for the TUI.
//!
//! The whole screen is a function of the current `BrowserView` snapshot plus
//! presentational state on `App`.

use crate::app::App;
use newsman::util::truncate_to_width;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use super::{articles, categories, status};

/// Minimum terminal dimensions required for normal operation.
pub(super) const MIN_WIDTH: u16 = 60;
pub(super) const MIN_HEIGHT: u16 = 10;

/// Main render function.
///
/// Handles terminal size validation before laying out the panels.
pub(super) fn render(f: &mut Frame, app: &App) {
    let area = f.area();

    if area.width < 1 || area.height < 1 {
        return;
    }

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = if area.height < 3 || area.width < 20 {
            Paragraph::new("Too small")
        } else {
            Paragraph::new(format!(
                "Terminal too small\n\nMinimum: {}x{}\nCurrent: {}x{}",
                MIN_WIDTH, MIN_HEIGHT, area.width, area.height
            ))
            .alignment(Alignment::Center)
        };
        f.render_widget(msg, area);
        return;
    }

    let banner_height = u16::from(app.view.error.is_some());
    let pager_height = u16::from(app.view.show_pager());

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(banner_height),
            Constraint::Min(0),
            Constraint::Length(pager_height),
            Constraint::Length(1),
        ])
        .split(area);

    if let Some(error) = &app.view.error {
        render_error_banner(f, app, error, rows[0]);
    }
    render_main_panels(f, app, rows[1]);
    if app.view.show_pager() {
        render_pager(f, app, rows[2]);
    }
    status::render(f, app, rows[3]);
}

/// Categories on the left, article cards on the right.
fn render_main_panels(f: &mut Frame, app: &App, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(25), Constraint::Percentage(75)])
        .split(area);

    categories::render(f, app, columns[0]);
    articles::render(f, app, columns[1]);
}

fn render_error_banner(f: &mut Frame, app: &App, error: &str, area: Rect) {
    let text = truncate_to_width(error, area.width as usize);
    let banner = Paragraph::new(text.into_owned()).style(app.style("error_banner"));
    f.render_widget(banner, area);
}

/// Page numbers with the current one highlighted, e.g. `< 1 [2] 3 >`.
fn render_pager(f: &mut Frame, app: &App, area: Rect) {
    let spans = pager_labels(app.view.page, app.view.page_count)
        .into_iter()
        .map(|(label, current)| {
            let style = if current {
                app.style("pager_current")
            } else {
                app.style("pager_other")
            };
            Span::styled(label, style)
        })
        .flat_map(|span| [span, Span::raw(" ")])
        .collect::<Vec<_>>();

    let pager = Paragraph::new(Line::from(spans)).alignment(Alignment::Center);
    f.render_widget(pager, area);
}

/// Labels for the pager row; the bool marks the current page.
///
/// Previous/next arrows only appear when that move is possible.
pub(super) fn pager_labels(page: usize, page_count: usize) -> Vec<(String, bool)> {
    let mut labels = Vec::with_capacity(page_count + 2);
    if page > 1 {
        labels.push(("<".to_string(), false));
    }
    for n in 1..=page_count {
        labels.push((format!(" {} ", n), n == page));
    }
    if page < page_count {
        labels.push((">".to_string(), false));
    }
    labels
}
