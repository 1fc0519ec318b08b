use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
    Frame,
};

use flowdeck_core::auth::Route;
use flowdeck_core::models::CreateMode;

use crate::app::{App, AppState, FormFocus};

use super::styles;

/// Width of the visible part of form text fields.
const FIELD_WIDTH: usize = 32;

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Min(10),   // Main content
            Constraint::Length(2), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, app, chunks[0]);
    if app.route == Route::Dashboard {
        render_dashboard(frame, app, chunks[1]);
    }
    render_status_bar(frame, app, chunks[2]);

    // Render overlays
    match app.state {
        AppState::ShowingHelp => render_help_overlay(frame),
        AppState::LoggingIn => render_login_overlay(frame, app),
        AppState::CreatingApp => render_create_overlay(frame, app),
        AppState::ConfirmingQuit => render_quit_overlay(frame),
        AppState::Normal | AppState::Quitting => {}
    }
}

/// Title of the application list block.
pub fn apps_title(count: usize) -> String {
    format!(" Applications ({}) ", count)
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let title = "  flowdeck";
    let right = match app.user {
        Some(ref user) => format!("{}  [?] Help", user.display_name()),
        None => "[?] Help".to_string(),
    };

    let title_line = Line::from(vec![
        Span::styled(title, styles::title_style()),
        Span::raw(" ".repeat(
            (area.width as usize).saturating_sub(title.len() + right.chars().count() + 2),
        )),
        Span::styled(right, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    let paragraph = Paragraph::new(title_line).block(block);
    frame.render_widget(paragraph, area);
}

fn render_dashboard(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    render_app_list(frame, app, chunks[0]);
    render_app_detail(frame, app, chunks[1]);
}

fn render_app_list(frame: &mut Frame, app: &App, area: Rect) {
    let apps = app.apps();

    let block = Block::default()
        .title(apps_title(apps.len()))
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    if apps.is_empty() {
        let message = if app.is_loading() {
            "Loading..."
        } else {
            "No apps yet. Press [n] to create one."
        };
        let paragraph = Paragraph::new(Line::from(Span::styled(format!(" {}", message), styles::muted_style())))
            .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let header = Row::new([Cell::from("Name"), Cell::from("Mode"), Cell::from("Created")])
        .style(styles::title_style())
        .height(1);

    let rows: Vec<Row> = apps
        .iter()
        .enumerate()
        .map(|(i, remote)| {
            let style = if i == app.selection {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };
            let name = match remote.icon {
                Some(ref icon) if !icon.is_empty() => format!("{} {}", icon, remote.name),
                _ => remote.name.clone(),
            };

            Row::new(vec![
                Cell::from(name),
                Cell::from(Span::styled(
                    remote.mode.label().to_string(),
                    styles::badge_style(remote.mode.badge()),
                )),
                Cell::from(remote.created_display()),
            ])
            .style(style)
        })
        .collect();

    let widths = [Constraint::Fill(3), Constraint::Length(14), Constraint::Length(11)];

    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .row_highlight_style(styles::selected_style());

    let mut state = TableState::default();
    state.select(Some(app.selection));

    frame.render_stateful_widget(table, area, &mut state);
}

fn detail_line(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!(" {:<12}", label), styles::muted_style()),
        Span::styled(value, styles::list_item_style()),
    ])
}

fn render_app_detail(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" Details ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    let Some(selected) = app.selected_app() else {
        frame.render_widget(block, area);
        return;
    };

    let mut lines = vec![
        Line::from(Span::styled(format!(" {}", selected.name), styles::title_style())),
        Line::from(""),
        Line::from(vec![
            Span::styled(format!(" {:<12}", "Mode"), styles::muted_style()),
            Span::styled(
                selected.mode.label().to_string(),
                styles::badge_style(selected.mode.badge()),
            ),
        ]),
        detail_line("ID", selected.short_id()),
    ];
    if let Some(ref status) = selected.status {
        lines.push(detail_line("Status", status.clone()));
    }
    lines.push(detail_line("Created", selected.created_display()));
    lines.push(detail_line("Updated", selected.updated_display()));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        format!(" {}", selected.description_display()),
        styles::list_item_style(),
    )));
    lines.push(Line::from(""));
    lines.push(detail_line("Editor", app.links().editor(&selected.id)));
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled(" [Enter]", styles::help_key_style()),
        Span::styled(" open editor  ", styles::muted_style()),
        Span::styled("[o]", styles::help_key_style()),
        Span::styled(" overview", styles::muted_style()),
    ]));

    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let shortcuts = match app.route {
        Route::Dashboard => "[n]ew | [r]efresh | [h]ome | [q]uit",
        Route::Login => "[Esc] quit",
    };

    let (left_text, left_style) = match app.status_message {
        Some(ref note) => (format!(" {} ", note.message), styles::notification_style(note.level)),
        None if app.is_loading() => (" Loading... ".to_string(), styles::muted_style()),
        None => (String::new(), styles::muted_style()),
    };

    let right_text = format!(" {} ", shortcuts);
    let padding_len = (area.width as usize)
        .saturating_sub(left_text.chars().count())
        .saturating_sub(right_text.len());

    let status_line = Line::from(vec![
        Span::styled(left_text, left_style),
        Span::raw(" ".repeat(padding_len)),
        Span::styled(right_text, styles::muted_style()),
    ]);
    let paragraph = Paragraph::new(status_line).style(styles::status_bar_style());
    frame.render_widget(paragraph, area);
}

fn help_entry(key: &str, desc: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<10}", key), styles::help_key_style()),
        Span::styled(desc.to_string(), styles::help_desc_style()),
    ])
}

fn render_help_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(48, 20, frame.area());
    frame.render_widget(Clear, area);

    let version = env!("CARGO_PKG_VERSION");

    let help_text = vec![
        Line::from(Span::styled("  flowdeck", styles::title_style())),
        Line::from(Span::styled(format!("  version {}", version), styles::muted_style())),
        Line::from(""),
        Line::from(Span::styled(" Navigation", styles::highlight_style())),
        help_entry("↑/↓ j/k", "Move selection"),
        help_entry("g/G", "First/last app"),
        Line::from(""),
        Line::from(Span::styled(" Actions", styles::highlight_style())),
        help_entry("Enter", "Open app in workflow editor"),
        help_entry("o", "Open app overview"),
        help_entry("h", "Open platform home"),
        help_entry("n", "Create a new app"),
        help_entry("r", "Refresh list"),
        help_entry("L", "Log out"),
        help_entry("q", "Quit"),
        Line::from(""),
        Line::from(vec![
            Span::styled("       Press ", styles::muted_style()),
            Span::styled("?", styles::help_key_style()),
            Span::styled(" or ", styles::muted_style()),
            Span::styled("Esc", styles::help_key_style()),
            Span::styled(" to close", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(help_text).block(block), area);
}

/// Text field with a cursor when focused; long values show their tail.
fn field_spans(label: &str, value: &str, focused: bool, masked: bool) -> Line<'static> {
    let style = if focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    let shown: String = if masked {
        "*".repeat(value.chars().count().min(FIELD_WIDTH))
    } else {
        let skip = value.chars().count().saturating_sub(FIELD_WIDTH);
        value.chars().skip(skip).collect()
    };
    let cursor = if focused { "▌" } else { "" };

    Line::from(vec![
        Span::styled(format!("  {:<13}[", label), styles::muted_style()),
        Span::styled(format!("{:<width$}{}", shown, cursor, width = FIELD_WIDTH), style),
        Span::styled("]", styles::muted_style()),
    ])
}

fn render_login_overlay(frame: &mut Frame, app: &App) {
    let height = if app.login_error.is_some() { 10 } else { 8 };
    let area = centered_rect_fixed(54, height, frame.area());
    frame.render_widget(Clear, area);

    let mut lines = vec![
        Line::from(Span::styled("  Sign in to flowdeck", styles::title_style())),
        Line::from(Span::styled(
            format!("  {}", app.settings.api_base_url),
            styles::muted_style(),
        )),
        Line::from(""),
        field_spans("Token:", &app.login_token, !app.login_pending, true),
        Line::from(""),
    ];

    if app.login_pending {
        lines.push(Line::from(Span::styled("  Signing in...", styles::highlight_style())));
    } else {
        lines.push(Line::from(vec![
            Span::styled("  [Enter]", styles::help_key_style()),
            Span::styled(" log in  ", styles::muted_style()),
            Span::styled("[Esc]", styles::help_key_style()),
            Span::styled(" quit", styles::muted_style()),
        ]));
    }

    if let Some(ref error) = app.login_error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(format!("  {}", error), styles::error_style())));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_create_overlay(frame: &mut Frame, app: &App) {
    let Some(controller) = app.controller.as_ref() else {
        return;
    };
    let form = controller.form();
    let submitting = controller.is_submitting();

    let area = centered_rect_fixed(54, 12, frame.area());
    frame.render_widget(Clear, area);

    let mode_focused = app.form_focus == FormFocus::Mode;
    let mode_style = if mode_focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    let mode_options: Vec<Span> = [CreateMode::Workflow, CreateMode::Chatbot]
        .iter()
        .map(|mode| {
            let marker = if *mode == form.mode { "(•)" } else { "( )" };
            Span::styled(format!("{} {}  ", marker, mode.label()), mode_style)
        })
        .collect();
    let mut mode_line = vec![Span::styled(format!("  {:<13}", "Mode:"), styles::muted_style())];
    mode_line.extend(mode_options);

    let button_style = if app.form_focus == FormFocus::Submit {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    let button = if submitting {
        Span::styled("  Creating...  ", styles::muted_style())
    } else {
        Span::styled("    Create     ", button_style)
    };

    let lines = vec![
        Line::from(Span::styled("  New workflow app", styles::title_style())),
        Line::from(""),
        field_spans("Name:", &form.name, app.form_focus == FormFocus::Name && !submitting, false),
        field_spans(
            "Description:",
            &form.description,
            app.form_focus == FormFocus::Description && !submitting,
            false,
        ),
        Line::from(mode_line),
        Line::from(""),
        Line::from(vec![Span::raw("                  ["), button, Span::raw("]")]),
        Line::from(""),
        Line::from(vec![
            Span::styled("  [Tab]", styles::help_key_style()),
            Span::styled(" next field  ", styles::muted_style()),
            Span::styled("[Esc]", styles::help_key_style()),
            Span::styled(" cancel", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(!submitting))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Create a centered rectangle with fixed dimensions
fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}

fn render_quit_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(46, 6, frame.area());
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "   Are you sure you want to quit?",
            styles::highlight_style(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("   Press ", styles::muted_style()),
            Span::styled("[Y]", styles::help_key_style()),
            Span::styled(" to quit, ", styles::muted_style()),
            Span::styled("[N]", styles::help_key_style()),
            Span::styled(" to cancel", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
