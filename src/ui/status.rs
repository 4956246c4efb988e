use crate::app::{App, InputMode};
use newsman::util::display_width;
use ratatui::{layout::Rect, widgets::Paragraph, Frame};
use std::borrow::Cow;

/// Render the status bar
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 1 || area.height < 1 {
        return;
    }

    let text: Cow<'_, str> = if let Some(category) = &app.view.refreshing {
        Cow::Owned(format!("Refreshing {}...", category))
    } else if let Some((msg, _)) = &app.status_message {
        Cow::Borrowed(msg.as_ref())
    } else {
        match app.input_mode {
            InputMode::AddCategory => Cow::Borrowed("Type a category | ENTER add | ESC cancel"),
            InputMode::Normal => Cow::Borrowed(
                "[Enter]select [r]efresh [a]dd [n/p]page [o]pen [Tab]switch [t]heme [L]ogout [q]uit",
            ),
        }
    };

    // Signed-in user on the right when there is room for it
    let text = match app.auth.session().map(|s| s.display_name()) {
        Some(user) if display_width(&text) + display_width(user) + 3 < area.width as usize => {
            let pad = area.width as usize - display_width(&text) - display_width(user);
            Cow::Owned(format!("{}{}{}", text, " ".repeat(pad), user))
        }
        _ => text,
    };

    let paragraph = Paragraph::new(text).style(app.style("status_bar"));
    f.render_widget(paragraph, area);
}
