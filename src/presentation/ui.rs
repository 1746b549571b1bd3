use crate::application::{App, AppMode, FileAction, Target};
use crate::domain::{Histogram, Table};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Cell, Clear, List, ListItem, ListState, Paragraph, Row, Table as GridTable, Wrap},
    Frame,
};

/// Width of the row-number gutter in the grid.
const GUTTER_WIDTH: usize = 5;

struct DashboardLayout {
    title: Rect,
    info: Rect,
    record_count: Rect,
    column_sum: Rect,
    grid: Rect,
    histogram: Rect,
    status: Rect,
}

fn dashboard_layout(area: Rect) -> DashboardLayout {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(3),
        ])
        .split(area);

    let summary = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[2]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(rows[3]);

    DashboardLayout {
        title: rows[0],
        info: rows[1],
        record_count: summary[0],
        column_sum: summary[1],
        grid: body[0],
        histogram: body[1],
        status: rows[4],
    }
}

/// Number of data rows and columns the grid can show for a terminal of size `area`.
pub fn grid_viewport(area: Rect, app: &App) -> (usize, usize) {
    let grid = dashboard_layout(area).grid;
    // borders plus the header row
    let rows = grid.height.saturating_sub(3) as usize;
    let cols = app
        .working_table
        .as_ref()
        .map(|table| visible_columns(table, app.scroll_col, grid.width.saturating_sub(2) as usize))
        .unwrap_or(1);
    (rows.max(1), cols.max(1))
}

fn visible_columns(table: &Table, scroll_col: usize, available_width: usize) -> usize {
    let mut total_width = GUTTER_WIDTH;
    let mut visible = 0;
    for col in scroll_col..table.column_count() {
        let width = table.column_width(col);
        if total_width + width + 1 > available_width {
            break;
        }
        total_width += width + 1;
        visible += 1;
    }
    visible
}

pub fn render_ui(f: &mut Frame, app: &App) {
    let layout = dashboard_layout(f.area());

    render_header(f, app, &layout);
    render_summary(f, app, &layout);
    render_grid(f, app, layout.grid);
    render_histogram(f, app, layout.histogram);
    render_status_bar(f, app, layout.status);

    match &app.mode {
        AppMode::Help => render_help_popup(f, app.help_scroll),
        AppMode::TableManager => render_table_manager(f, app),
        AppMode::FileInput(FileAction::Import(Target::Table(_)) | FileAction::Export(Target::Table(_))) => {
            render_table_manager(f, app)
        }
        AppMode::ConfirmImport { target, .. } => {
            if matches!(target, Target::Table(_)) {
                render_table_manager(f, app);
            }
            render_import_choice(f, app, target);
        }
        _ => {}
    }
}

fn render_header(f: &mut Frame, app: &App, layout: &DashboardLayout) {
    let table_name = app.working_table_name.as_deref().unwrap_or("-");
    let title = Paragraph::new(format!("xldash - Excel Dashboard | Table: {}", table_name))
        .style(Style::default().fg(Color::Cyan));
    f.render_widget(title, layout.title);

    let info = Paragraph::new(app.info_message.as_str()).style(Style::default().fg(Color::White));
    f.render_widget(info, layout.info);
}

fn render_summary(f: &mut Frame, app: &App, layout: &DashboardLayout) {
    let records = Paragraph::new(app.summary.record_count.as_str())
        .block(Block::default().borders(Borders::ALL).title("Records"))
        .style(Style::default().fg(Color::Yellow));
    f.render_widget(records, layout.record_count);

    let sum = Paragraph::new(app.summary.column_sum.as_str())
        .block(Block::default().borders(Borders::ALL).title("Sum"))
        .style(Style::default().fg(Color::Yellow));
    f.render_widget(sum, layout.column_sum);
}

fn render_grid(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title("Data");

    let Some(table) = app.working_table.as_ref().filter(|t| t.column_count() > 0) else {
        let empty = Paragraph::new("No data loaded. Press 'i' to import a spreadsheet.")
            .block(block)
            .style(Style::default().fg(Color::DarkGray));
        f.render_widget(empty, area);
        return;
    };

    let visible_rows = area.height.saturating_sub(3) as usize;
    let visible_cols = visible_columns(table, app.scroll_col, area.width.saturating_sub(2) as usize).max(1);
    let last_col = (app.scroll_col + visible_cols).min(table.column_count());

    let mut headers = vec![Cell::from("")];
    for col in app.scroll_col..last_col {
        let header_style = if col == app.selected_col {
            Style::default().bg(Color::LightBlue).fg(Color::Black)
        } else {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        };
        headers.push(Cell::from(table.columns()[col].as_str()).style(header_style));
    }

    let mut rows = Vec::with_capacity(visible_rows);
    for row in app.scroll_row..(app.scroll_row + visible_rows).min(table.row_count()) {
        let row_number_style = if row == app.selected_row {
            Style::default().bg(Color::LightBlue).fg(Color::Black)
        } else {
            Style::default().fg(Color::Yellow)
        };
        let mut cells = vec![Cell::from(format!("{}", row + 1)).style(row_number_style)];

        for col in app.scroll_col..last_col {
            let style = if row == app.selected_row && col == app.selected_col {
                Style::default().bg(Color::Blue).fg(Color::White)
            } else {
                Style::default()
            };
            cells.push(Cell::from(table.cell(row, col).to_string()).style(style));
        }
        rows.push(Row::new(cells).height(1));
    }

    let mut widths = vec![Constraint::Length(GUTTER_WIDTH as u16)];
    for col in app.scroll_col..last_col {
        widths.push(Constraint::Length(table.column_width(col) as u16));
    }

    let grid = GridTable::new(rows, widths)
        .header(Row::new(headers).height(1))
        .block(block)
        .column_spacing(1);
    f.render_widget(grid, area);
}

fn render_histogram(f: &mut Frame, app: &App, area: Rect) {
    let column = &app.config().target_column;
    let block = Block::default()
        .borders(Borders::ALL)
        .title(histogram_title(column, app.histogram.as_ref()));

    let Some(histogram) = app.histogram.as_ref() else {
        let reason = match app.working_table.as_ref() {
            Some(t) if !t.is_empty() => app.summary.column_sum.clone(),
            _ => "No data to plot.".to_string(),
        };
        let placeholder = Paragraph::new(reason)
            .block(block)
            .wrap(Wrap { trim: true })
            .style(Style::default().fg(Color::DarkGray));
        f.render_widget(placeholder, area);
        return;
    };

    let bars: Vec<Bar> = histogram
        .bins
        .iter()
        .map(|bin| Bar::default().value(bin.count).label(Line::from(bin.label())))
        .collect();

    let inner_width = area.width.saturating_sub(2) as usize;
    let slots = histogram.bins.len().max(1);
    let bar_width = (inner_width / slots).saturating_sub(1).max(1) as u16;

    let chart = BarChart::default()
        .block(block)
        .data(BarGroup::default().bars(&bars))
        .bar_width(bar_width)
        .bar_gap(1)
        .max(histogram.max_count().max(1))
        .bar_style(Style::default().fg(Color::Cyan))
        .value_style(Style::default().fg(Color::Black).bg(Color::Cyan));
    f.render_widget(chart, area);
}

fn histogram_title(column: &str, histogram: Option<&Histogram>) -> String {
    match histogram {
        Some(h) => format!("Histogram of '{}' ({} values)", column, h.total()),
        None => format!("Histogram of '{}'", column),
    }
}

fn render_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let (prefix, input_text) = match &app.mode {
        AppMode::Normal => (
            String::new(),
            "i: import | e: export | t: tables | r: reload | arrows: scroll | F1/?: help | q: quit"
                .to_string(),
        ),
        AppMode::Help => (
            String::new(),
            "↑↓/jk: scroll | PgUp/PgDn: fast scroll | Home: top | Esc/q: close help".to_string(),
        ),
        AppMode::FileInput(FileAction::Import(_)) => (
            "Import file: ".to_string(),
            format!("{} (Enter to continue, Esc to cancel)", app.filename_input),
        ),
        AppMode::FileInput(FileAction::Export(_)) => (
            "Export to: ".to_string(),
            format!("{} (Enter to export, Esc to cancel)", app.filename_input),
        ),
        AppMode::ConfirmImport { .. } => (
            String::new(),
            "r: replace old data | a: append to old data | Esc: cancel".to_string(),
        ),
        AppMode::TableManager => (
            String::new(),
            "↑↓/jk: select | Enter: show | i: import to selected | e: export selected | r: refresh | Esc: close"
                .to_string(),
        ),
    };

    let style = match app.mode {
        AppMode::Normal => Style::default(),
        AppMode::Help => Style::default().fg(Color::Cyan),
        AppMode::FileInput(FileAction::Import(_)) => Style::default().fg(Color::Green),
        AppMode::FileInput(FileAction::Export(_)) => Style::default().fg(Color::Magenta),
        AppMode::ConfirmImport { .. } => Style::default().fg(Color::Yellow),
        AppMode::TableManager => Style::default().fg(Color::Yellow),
    };

    let status = Paragraph::new(format!("{}{}", prefix, input_text))
        .block(Block::default().borders(Borders::ALL).title("Status"))
        .style(style);
    f.render_widget(status, area);

    if matches!(app.mode, AppMode::FileInput(_)) {
        let typed = app.filename_input[..app.cursor_position.min(app.filename_input.len())]
            .chars()
            .count();
        let x = cursor_column(area, prefix.chars().count() + typed);
        f.set_cursor_position((x, area.y + 1));
    }
}

/// Screen column of the prompt cursor, kept inside the status bar border.
fn cursor_column(area: Rect, offset: usize) -> u16 {
    let offset = u16::try_from(offset).unwrap_or(u16::MAX);
    area.x
        .saturating_add(1)
        .saturating_add(offset)
        .min(area.right().saturating_sub(2))
}

fn centered(area: Rect, width_percent: u16, height: u16) -> Rect {
    let width = area.width * width_percent / 100;
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn render_table_manager(f: &mut Frame, app: &App) {
    let area = centered(f.area(), 50, 16);
    f.render_widget(Clear, area);

    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(3)])
        .split(area);

    let items: Vec<ListItem> = app
        .manager
        .tables
        .iter()
        .map(|name| ListItem::new(name.as_str()))
        .collect();
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Tables in database")
                .style(Style::default().fg(Color::Cyan)),
        )
        .style(Style::default().fg(Color::White))
        .highlight_style(Style::default().bg(Color::Blue).fg(Color::White))
        .highlight_symbol("> ");

    let mut state = ListState::default();
    state.select(app.manager.selected);
    f.render_stateful_widget(list, sections[0], &mut state);

    let status = Paragraph::new(app.manager.status.as_str())
        .block(Block::default().borders(Borders::ALL).title("Database Manager"))
        .style(Style::default().fg(Color::Yellow));
    f.render_widget(status, sections[1]);
}

fn render_import_choice(f: &mut Frame, app: &App, target: &Target) {
    let area = centered(f.area(), 60, 7);
    f.render_widget(Clear, area);

    let table = match target {
        Target::Dashboard => app.config().default_table.as_str(),
        Target::Table(name) => name.as_str(),
    };
    let text = format!(
        "How do you want to import data to '{}'?\n\n[r] Replace Old Data   [a] Append to Old Data   [Esc] Cancel",
        table
    );
    let prompt = Paragraph::new(text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Confirm Import")
                .style(Style::default().fg(Color::Yellow)),
        )
        .wrap(Wrap { trim: false })
        .style(Style::default().fg(Color::White));
    f.render_widget(prompt, area);
}

fn render_help_popup(f: &mut Frame, scroll: usize) {
    let area = f.area();
    let popup_area = Rect {
        x: area.width / 10,
        y: area.height / 10,
        width: area.width * 4 / 5,
        height: area.height * 4 / 5,
    };

    f.render_widget(Clear, popup_area);

    let help_text = get_help_text();
    let help_lines: Vec<&str> = help_text.lines().collect();
    let visible_height = popup_area.height.saturating_sub(2) as usize;

    let start_line = scroll.min(help_lines.len().saturating_sub(visible_height));
    let end_line = (start_line + visible_height).min(help_lines.len());

    let visible_text = help_lines[start_line..end_line].join("\n");

    let help_widget = Paragraph::new(visible_text)
        .block(Block::default()
            .borders(Borders::ALL)
            .title(format!("xldash Help (Line {}/{})", start_line + 1, help_lines.len()))
            .style(Style::default().fg(Color::Cyan)))
        .style(Style::default().fg(Color::White));

    f.render_widget(help_widget, popup_area);
}

fn get_help_text() -> String {
    r#"XLDASH - EXCEL DASHBOARD

=== DASHBOARD ===
The grid shows the working table: the default table from the database, or
a table picked in the table manager. Above it, the record count and the sum
of the configured column. On the right, a histogram of that column.

=== IMPORT / EXPORT ===
i               Import a spreadsheet into the default table
                Enter a path (.xlsx, .xlsm, .xlsb, .xls, .ods or .csv), then
                r = replace old data, a = append to old data, Esc = cancel
                Append requires the same column names as the stored table
e               Export the working table (.xlsx or .csv)
r               Reload the default table from the database

=== TABLE MANAGER ===
t               Open the table manager
↑↓ or j/k       Select a table
Enter           Show the selected table on the dashboard
i               Import a spreadsheet into the selected table
e               Export the selected table
r               Refresh the table list
Esc             Close the table manager

=== NAVIGATION ===
Arrow keys      Move through the grid (hjkl also work)
PgUp/PgDn       Move ten rows at a time
Home            Jump to the first cell
F1 or ?         Show this help
q               Quit

=== HELP NAVIGATION ===
↑↓ or j/k       Scroll help text up/down one line
Page Up/Down    Scroll help text up/down 5 lines
Home            Jump to top of help text
Esc/F1/?/q      Close this help window

Settings (database file, default table, summed column, histogram bins,
log file) are read from xldash.json at startup."#.to_string()
}
