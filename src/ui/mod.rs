mod commit;
mod settings;
mod summary;
mod theme;
mod welcome;
pub mod widgets;

pub use theme::Theme;

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use crate::wizard::{destructive_warning, ConfirmAction, Page, WizardApp};

/// Main draw function for the installation wizard
pub fn draw(frame: &mut Frame, app: &WizardApp) {
    let area = frame.area();
    frame.render_widget(Clear, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header (no border)
            Constraint::Min(10),   // Page content
            Constraint::Length(3), // Message panel
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    draw_header(frame, chunks[0], app);

    match app.page() {
        Page::Welcome => welcome::draw_welcome_page(frame, chunks[1], app),
        Page::Settings => settings::draw_settings_page(frame, chunks[1], app),
        Page::Commit | Page::Error => commit::draw_commit_page(frame, chunks[1], app),
        Page::Summary | Page::Finish => summary::draw_summary_page(frame, chunks[1], app),
        Page::Cancelled => draw_cancelled(frame, chunks[1], app),
    }

    draw_message(frame, chunks[2], app);
    draw_status_bar(frame, chunks[3], app);

    // Overlay
    if let Some(action) = app.confirm_action {
        draw_confirm_dialog(frame, action, app);
    }
}

/// Draw header bar (1 line, no borders)
fn draw_header(frame: &mut Frame, area: Rect, app: &WizardApp) {
    frame.render_widget(Clear, area);

    let title = format!(" {} (v{}) ", app.config.general.title, env!("CARGO_PKG_VERSION"));
    frame.render_widget(
        Paragraph::new(title).style(app.theme.primary_style().add_modifier(Modifier::BOLD)),
        area,
    );

    let right = if app.is_dryrun() {
        format!("[dry run]  {} ", app.page().title())
    } else {
        format!("{} ", app.page().title())
    };
    frame.render_widget(
        Paragraph::new(right)
            .style(app.theme.muted_style())
            .alignment(Alignment::Right),
        area,
    );
}

fn draw_cancelled(frame: &mut Frame, area: Rect, app: &WizardApp) {
    let y = area.y + area.height / 2;
    frame.render_widget(
        Paragraph::new("Installation cancelled. No further actions are possible.")
            .style(app.theme.muted_style())
            .alignment(Alignment::Center),
        Rect::new(area.x, y, area.width, 1),
    );
}

fn draw_message(frame: &mut Frame, area: Rect, app: &WizardApp) {
    let Some(msg) = &app.message else { return };

    let (title, border_style, text_style) = if msg.is_error {
        (" Error ", app.theme.error_style(), app.theme.error_style())
    } else {
        (" Info ", app.theme.secondary_style(), app.theme.style())
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(title)
        .title_style(border_style.add_modifier(Modifier::BOLD));

    let content = Line::from(vec![Span::styled(msg.text.as_str(), text_style)]);

    frame.render_widget(
        Paragraph::new(content).block(block).wrap(Wrap { trim: true }),
        area,
    );
}

fn draw_status_bar(frame: &mut Frame, area: Rect, app: &WizardApp) {
    frame.render_widget(Clear, area);

    frame.render_widget(
        Paragraph::new(format!(" {}", app.status_bar.left_hint)).style(app.theme.muted_style()),
        Rect::new(area.x, area.y, area.width * 2 / 3, 1),
    );

    frame.render_widget(
        Paragraph::new(format!("{} ", app.status_bar.right_hint))
            .style(app.theme.muted_style())
            .alignment(Alignment::Right),
        Rect::new(area.x + area.width / 3, area.y, area.width * 2 / 3, 1),
    );
}

fn draw_confirm_dialog(frame: &mut Frame, action: ConfirmAction, app: &WizardApp) {
    let (title, lines): (&str, Vec<String>) = match action {
        ConfirmAction::QuitWizard => (
            "Quit",
            vec!["Are you sure you want to quit?".to_string()],
        ),
        ConfirmAction::StartInstall => (
            "Start Installation",
            vec![
                "Last chance to quit installation.".to_string(),
                destructive_warning(&app.model.snapshot()),
            ],
        ),
        ConfirmAction::CancelInstall => (
            "Cancel Installation",
            vec!["Are you sure you want to cancel the installation?".to_string()],
        ),
        ConfirmAction::Reboot => (
            "Reboot",
            vec!["Are you sure you want to reboot?".to_string()],
        ),
    };

    let width = 54.min(frame.area().width.saturating_sub(4));
    let height = 6 + lines.len() as u16;
    let area = center_rect(frame.area(), width, height);

    let border_style = if action == ConfirmAction::StartInstall {
        app.theme.warning_style()
    } else {
        app.theme.primary_style()
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(format!(" {title} "));

    let inner = block.inner(area);
    frame.render_widget(Clear, area);
    frame.render_widget(block, area);

    let mut y = inner.y + 1;
    for line in &lines {
        frame.render_widget(
            Paragraph::new(line.as_str())
                .style(app.theme.style().add_modifier(Modifier::BOLD))
                .alignment(Alignment::Center),
            Rect::new(inner.x, y, inner.width, 1),
        );
        y += 1;
    }

    let hints = Line::from(vec![
        Span::styled("[", app.theme.style()),
        Span::styled("Y", app.theme.primary_style().add_modifier(Modifier::BOLD)),
        Span::styled("]es / [", app.theme.style()),
        Span::styled("N", app.theme.primary_style().add_modifier(Modifier::BOLD)),
        Span::styled("]o", app.theme.style()),
    ]);

    frame.render_widget(
        Paragraph::new(hints).alignment(Alignment::Center),
        Rect::new(inner.x, y + 1, inner.width, 1),
    );
}

pub(crate) fn center_rect(area: Rect, width: u16, height: u16) -> Rect {
    let x = if area.width > width {
        area.x + (area.width - width) / 2
    } else {
        area.x
    };

    let y = if area.height > height {
        area.y + (area.height - height) / 2
    } else {
        area.y
    };

    Rect::new(x, y, width.min(area.width), height.min(area.height))
}
