//! Create tab - the new-user form with per-field validation messages.
//!
//! The field-drawing helper is shared with the edit overlay, which renders
//! the same form for an existing record.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::models::{Field, UserDraft, ValidationError};
use crate::ui::styles;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    // Center the form horizontally at a fixed width
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(60),
            Constraint::Fill(1),
        ])
        .split(area);

    let block = Block::default()
        .title(" Create New User ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    let lines = form_lines(
        &app.create_form,
        app.create_errors.as_ref(),
        app.create_focus,
        app.saving,
    );

    frame.render_widget(Paragraph::new(lines).block(block), chunks[1]);
}

/// Build the form body: one labelled input per field, with its validation
/// message underneath when present.
pub fn form_lines<'a>(
    draft: &'a UserDraft,
    errors: Option<&'a ValidationError>,
    focus: Field,
    saving: bool,
) -> Vec<Line<'a>> {
    let mut lines = vec![Line::from("")];

    for field in Field::ALL {
        let focused = field == focus;
        let value_style = if focused {
            styles::selected_style()
        } else {
            styles::list_item_style()
        };
        let cursor = if focused { "▌" } else { "" };
        let value = draft.field(field);

        lines.push(Line::from(vec![
            Span::raw("  "),
            Span::styled(format!("{:<10}", field.label()), styles::muted_style()),
            Span::styled("[", styles::muted_style()),
            Span::styled(format!("{:<32}", format!("{}{}", value, cursor)), value_style),
            Span::styled("]", styles::muted_style()),
        ]));

        if let Some(message) = errors.and_then(|e| e.message_for(field)) {
            lines.push(Line::from(vec![
                Span::raw("              "),
                Span::styled(message, styles::error_style()),
            ]));
        }

        lines.push(Line::from(""));
    }

    if saving {
        lines.push(Line::from(Span::styled("  Saving...", styles::highlight_style())));
    } else {
        lines.push(Line::from(vec![
            Span::styled("  Enter", styles::help_key_style()),
            Span::styled(" submit  ", styles::help_desc_style()),
            Span::styled("Tab/↑↓", styles::help_key_style()),
            Span::styled(" next field  ", styles::help_desc_style()),
            Span::styled("Esc", styles::help_key_style()),
            Span::styled(" back to list", styles::help_desc_style()),
        ]));
    }

    lines
}
