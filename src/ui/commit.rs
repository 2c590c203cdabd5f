use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph},
};

use crate::wizard::{summarize, OutputStream, Page, WizardApp};

/// Renders both the running Commit page and the Error state it can fall
/// into: the frozen settings on top, the backend output log below.
pub fn draw_commit_page(frame: &mut Frame, area: Rect, app: &WizardApp) {
    let failed = app.page() == Page::Error;

    let title = if failed { " Installation Failed " } else { " Installing " };
    let border_style = if failed {
        app.theme.error_style()
    } else {
        app.theme.border_style()
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(title);

    let inner = block.inner(area);
    frame.render_widget(Clear, area);
    frame.render_widget(block, area);

    if inner.height < 6 {
        return;
    }

    let mut y = inner.y + 1;

    // Status line
    if app.is_executing {
        let status = if app.cancel_requested {
            format!("{} Waiting for the backend to stop...", app.spinner_char())
        } else {
            format!("{} Writing NomadBSD to the target disk...", app.spinner_char())
        };
        frame.render_widget(
            Paragraph::new(status)
                .style(app.theme.primary_style().add_modifier(Modifier::BOLD)),
            Rect::new(inner.x + 2, y, inner.width.saturating_sub(4), 1),
        );
    } else if failed {
        frame.render_widget(
            Paragraph::new("The backend did not complete the installation.")
                .style(app.theme.error_style().add_modifier(Modifier::BOLD)),
            Rect::new(inner.x + 2, y, inner.width.saturating_sub(4), 1),
        );
    }
    y += 2;

    let Some(invocation) = &app.invocation else { return };

    // Frozen settings, one compact line per field
    for item in summarize(invocation.snapshot()) {
        if y >= inner.y + inner.height.saturating_sub(2) {
            break;
        }
        frame.render_widget(
            Paragraph::new(format!("  {}", item.render())).style(app.theme.muted_style()),
            Rect::new(inner.x + 2, y, inner.width.saturating_sub(4), 1),
        );
        y += 1;
    }
    y += 1;

    // Backend output: most recent lines that fit
    let log_bottom = inner.y + inner.height.saturating_sub(1);
    if y >= log_bottom {
        return;
    }
    let visible = (log_bottom - y) as usize;
    let output = invocation.output();
    let skip = output.len().saturating_sub(visible);

    for (stream, text) in output.iter().skip(skip) {
        let style = match stream {
            OutputStream::Stdout => app.theme.style(),
            OutputStream::Stderr => app.theme.error_style(),
        };
        frame.render_widget(
            Paragraph::new(format!("  {text}")).style(style),
            Rect::new(inner.x + 2, y, inner.width.saturating_sub(4), 1),
        );
        y += 1;
    }
}
