use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph},
};

use super::center_rect;
use crate::wizard::{summarize, Page, WizardApp};

/// Renders the Summary page and the terminal Finish screen.
pub fn draw_summary_page(frame: &mut Frame, area: Rect, app: &WizardApp) {
    if app.page() == Page::Finish {
        let y = area.y + area.height / 2;
        frame.render_widget(
            Paragraph::new("Rebooting into the installed system...")
                .style(app.theme.secondary_style().add_modifier(Modifier::BOLD))
                .alignment(Alignment::Center),
            Rect::new(area.x, y, area.width, 1),
        );
        return;
    }

    let content_width = 56.min(area.width.saturating_sub(4));
    let content_height = 16.min(area.height.saturating_sub(2));
    let centered = center_rect(area, content_width, content_height);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(app.theme.secondary_style())
        .title(" Installation Complete ");

    let inner = block.inner(centered);
    frame.render_widget(Clear, centered);
    frame.render_widget(block, centered);

    let mut y = inner.y + 1;

    frame.render_widget(
        Paragraph::new("NomadBSD was installed with these settings:")
            .style(app.theme.style()),
        Rect::new(inner.x + 2, y, inner.width.saturating_sub(4), 1),
    );
    y += 2;

    if let Some(invocation) = &app.invocation {
        for item in summarize(invocation.snapshot()) {
            if y >= inner.y + inner.height.saturating_sub(3) {
                break;
            }
            frame.render_widget(
                Paragraph::new(format!("  {}", item.render())).style(app.theme.style()),
                Rect::new(inner.x + 2, y, inner.width.saturating_sub(4), 1),
            );
            y += 1;
        }
    }

    // Finish button
    let button_y = inner.y + inner.height.saturating_sub(2);
    let button_text = "[ Finish ]";
    let button_width = button_text.len() as u16;
    let button_x = inner.x + (inner.width.saturating_sub(button_width)) / 2;

    frame.render_widget(
        Paragraph::new(button_text)
            .style(app.theme.secondary_style().add_modifier(Modifier::BOLD | Modifier::REVERSED)),
        Rect::new(button_x, button_y, button_width, 1),
    );
}
