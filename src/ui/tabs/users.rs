//! Users tab - sortable, searchable table of user records with a detail pane.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::{App, AppState};
use crate::models::{User, UserSortColumn};
use crate::ui::styles;
use crate::utils::{format_optional, truncate};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    // Show the search line while searching or while a filter is active
    let searching = matches!(app.state, AppState::Searching);
    let (search_area, main_area) = if searching || !app.search_query.is_empty() {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(5)])
            .split(area);
        (Some(chunks[0]), chunks[1])
    } else {
        (None, area)
    };

    if let Some(search_area) = search_area {
        render_search_line(frame, app, search_area, searching);
    }

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(main_area);

    render_user_table(frame, app, chunks[0]);
    render_user_detail(frame, app, chunks[1]);
}

fn render_search_line(frame: &mut Frame, app: &App, area: Rect, searching: bool) {
    let cursor = if searching { "▌" } else { "" };
    let line = Line::from(vec![
        Span::styled(" Search: ", styles::muted_style()),
        Span::styled(format!("{}{}", app.search_query, cursor), styles::search_style()),
        Span::styled(
            if searching { "  (Enter to accept, Esc to clear)" } else { "  (Esc to clear)" },
            styles::muted_style(),
        ),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn render_user_table(frame: &mut Frame, app: &App, area: Rect) {
    let users = app.visible_users();

    // Build header with sort indicators
    let sort_indicator = |col: UserSortColumn| {
        if app.sort_column == col {
            if app.sort_ascending { " ▲" } else { " ▼" }
        } else {
            ""
        }
    };

    let header_cells = [
        Cell::from(format!("ID{}", sort_indicator(UserSortColumn::Id))),
        Cell::from(format!("Name{}", sort_indicator(UserSortColumn::Name))),
        Cell::from(format!("Username{}", sort_indicator(UserSortColumn::Username))),
        Cell::from(format!("Email{}", sort_indicator(UserSortColumn::Email))),
        Cell::from("Phone"),
        Cell::from("Website"),
    ];

    let header = Row::new(header_cells)
        .style(styles::title_style())
        .height(1);

    let rows: Vec<Row> = users
        .iter()
        .enumerate()
        .map(|(i, user)| {
            let style = if i == app.selection {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };

            Row::new(vec![
                Cell::from(user.id.to_string()),
                Cell::from(truncate(&user.name, 24)),
                Cell::from(truncate(&user.username, 16)),
                Cell::from(truncate(&user.email, 28)),
                Cell::from(format_optional(&user.phone, "-")),
                Cell::from(format_optional(&user.website, "-")),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(9),
        Constraint::Fill(3),
        Constraint::Fill(2),
        Constraint::Fill(3),
        Constraint::Fill(2),
        Constraint::Fill(2),
    ];

    let title = format!(
        " Users ({}) - [s]ort column [S] direction ",
        users.len()
    );

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .title_style(styles::muted_style())
                .borders(Borders::ALL)
                .border_style(styles::border_style(true)),
        )
        .row_highlight_style(styles::selected_style());

    let mut state = TableState::default();
    state.select(Some(app.selection));

    frame.render_stateful_widget(table, area, &mut state);
}

fn render_user_detail(frame: &mut Frame, app: &App, area: Rect) {
    let selected = app.selected_user();

    let content = match selected {
        Some(user) => detail_lines(user),
        None => vec![Line::from(Span::styled(
            "No user selected",
            styles::muted_style(),
        ))],
    };

    let block = Block::default()
        .title(" Details ")
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    frame.render_widget(Paragraph::new(content).block(block), area);
}

fn detail_lines(user: &User) -> Vec<Line<'_>> {
    let placeholder = "-";
    let mut lines = vec![
        Line::from(Span::styled(user.name.clone(), styles::title_style())),
        Line::from(""),
        Line::from(Span::styled("Profile", styles::highlight_style())),
        Line::from(vec![
            Span::styled("Username: ", styles::muted_style()),
            Span::raw(user.username.clone()),
        ]),
        Line::from(vec![
            Span::styled("Email:    ", styles::muted_style()),
            Span::raw(truncate(&user.email, 30)),
        ]),
        Line::from(vec![
            Span::styled("Phone:    ", styles::muted_style()),
            Span::raw(format_optional(&user.phone, placeholder)),
        ]),
        Line::from(vec![
            Span::styled("Website:  ", styles::muted_style()),
            Span::raw(format_optional(&user.website, placeholder)),
        ]),
    ];

    if let Some(ref address) = user.address {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("Address", styles::highlight_style())));
        lines.push(Line::from(Span::raw(address.display())));
        if let Some(ref geo) = address.geo {
            lines.push(Line::from(vec![
                Span::styled("Geo: ", styles::muted_style()),
                Span::raw(format!("{}, {}", geo.lat, geo.lng)),
            ]));
        }
    }

    if let Some(ref company) = user.company {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("Company", styles::highlight_style())));
        lines.push(Line::from(Span::raw(
            company.name.clone().unwrap_or_else(|| placeholder.to_string()),
        )));
        if let Some(ref phrase) = company.catch_phrase {
            lines.push(Line::from(Span::styled(
                format!("\"{}\"", phrase),
                styles::muted_style(),
            )));
        }
        if let Some(ref tagline) = company.tagline {
            lines.push(Line::from(Span::styled(
                tagline.clone(),
                styles::muted_style(),
            )));
        }
    }

    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("[e]", styles::help_key_style()),
        Span::styled("dit  ", styles::help_desc_style()),
        Span::styled("[d]", styles::help_key_style()),
        Span::styled("elete", styles::help_desc_style()),
    ]));

    lines
}
