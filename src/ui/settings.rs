use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph},
};

use crate::input::InputBuffer;
use crate::wizard::{Field, FsType, SettingsField, WizardApp};

pub fn draw_settings_page(frame: &mut Frame, area: Rect, app: &WizardApp) {
    if area.height < 10 || area.width < 40 {
        return;
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(app.theme.border_style())
        .title(" Installation Settings ");

    let inner = block.inner(area);
    frame.render_widget(Clear, area);
    frame.render_widget(block, area);

    let mut y = inner.y + 1;

    frame.render_widget(
        Paragraph::new("Configure the installation target")
            .style(app.theme.primary_style().add_modifier(Modifier::BOLD)),
        Rect::new(inner.x + 2, y, inner.width.saturating_sub(4), 1),
    );
    y += 2;

    let label_width = 24u16;
    let field_x = inner.x + 2 + label_width;
    let field_width = inner.width.saturating_sub(label_width + 6);

    for field in SettingsField::ALL {
        if y >= inner.y + inner.height.saturating_sub(2) {
            break;
        }

        let is_focused = app.focused_field == field;
        let label_style = if is_focused {
            app.theme.primary_style().add_modifier(Modifier::BOLD)
        } else {
            app.theme.style()
        };

        let marker = if is_focused { "> " } else { "  " };
        frame.render_widget(
            Paragraph::new(format!("{marker}{}", field.label())).style(label_style),
            Rect::new(inner.x + 2, y, label_width, 1),
        );

        match field {
            SettingsField::SwapSize => {
                draw_text_field(frame, app, &app.swap_input, is_focused, field_x, y, field_width);
            }
            SettingsField::Username => {
                draw_text_field(frame, app, &app.username_input, is_focused, field_x, y, field_width);
            }
            _ => {
                let value = selectable_value(app, field);
                let value_style = if is_focused {
                    app.theme.primary_style()
                } else {
                    app.theme.style()
                };
                frame.render_widget(
                    Paragraph::new(value).style(value_style),
                    Rect::new(field_x, y, field_width, 1),
                );
            }
        }
        y += 1;

        // Inline validity marker under the field it belongs to
        if let Some(error) = field_error_for(app, field) {
            frame.render_widget(
                Paragraph::new(format!("  ! {error}")).style(app.theme.error_style()),
                Rect::new(field_x, y, field_width, 1),
            );
        }
        y += 1;
    }

    // Disk detail line for the selected device
    if let Some(disk) = app.disks.iter().find(|d| d.device == app.model.target_disk()) {
        if !disk.label.is_empty() && y < inner.y + inner.height.saturating_sub(2) {
            frame.render_widget(
                Paragraph::new(format!("Selected device: {} ({})", disk.device, disk.label))
                    .style(app.theme.muted_style()),
                Rect::new(inner.x + 2, y, inner.width.saturating_sub(4), 1),
            );
        }
    }

    // Contextual help for the focused field
    let hint_y = inner.y + inner.height.saturating_sub(4);
    if hint_y > y {
        frame.render_widget(
            Paragraph::new(field_hint(app.focused_field)).style(app.theme.muted_style()),
            Rect::new(inner.x + 2, hint_y, inner.width.saturating_sub(4), 1),
        );
    }

    // Next button
    let button_y = inner.y + inner.height.saturating_sub(2);
    let ready = app.model.settings_valid().is_ok();
    let button_style = if ready {
        app.theme.primary_style().add_modifier(Modifier::BOLD | Modifier::REVERSED)
    } else {
        app.theme.muted_style().add_modifier(Modifier::REVERSED)
    };
    frame.render_widget(
        Paragraph::new(" [n] Next ").style(button_style),
        Rect::new(inner.x + 2, button_y, 10, 1),
    );
}

fn field_hint(field: SettingsField) -> &'static str {
    match field {
        SettingsField::TargetDisk => "Please select the device you want to install NomadBSD on",
        SettingsField::Filesystem => "Filesystem used for the system partition",
        SettingsField::SwapSize => "Desired size of the swap partition. 0 disables swap",
        SettingsField::Username => {
            "The installation adopts the nomad account; only the username changes"
        }
        SettingsField::AutoLogin => "Log this user in automatically at boot",
        SettingsField::LenovoFix => {
            "Work around Lenovo BIOSes that refuse to boot from a GPT-partitioned disk"
        }
    }
}

fn selectable_value(app: &WizardApp, field: SettingsField) -> String {
    match field {
        SettingsField::TargetDisk => {
            let disk = app.model.target_disk();
            if disk.is_empty() {
                "(none selected)".to_string()
            } else {
                format!("< {disk} >")
            }
        }
        SettingsField::Filesystem => {
            let fs = app.model.filesystem();
            match fs {
                FsType::Ufs => "< UFS >  ZFS".to_string(),
                FsType::Zfs => "  UFS  < ZFS >".to_string(),
            }
        }
        SettingsField::AutoLogin => checkbox(app.model.auto_login()),
        SettingsField::LenovoFix => checkbox(app.model.lenovo_fix()),
        SettingsField::SwapSize | SettingsField::Username => String::new(),
    }
}

fn checkbox(value: bool) -> String {
    if value { "[x]" } else { "[ ]" }.to_string()
}

fn field_error_for(app: &WizardApp, field: SettingsField) -> Option<String> {
    let field = match field {
        SettingsField::TargetDisk => Field::TargetDisk,
        SettingsField::SwapSize => Field::SwapSize,
        SettingsField::Username => Field::Username,
        _ => return None,
    };
    app.model.field_error(field).map(|e| e.to_string())
}

fn draw_text_field(
    frame: &mut Frame,
    app: &WizardApp,
    buffer: &InputBuffer,
    is_focused: bool,
    x: u16,
    y: u16,
    width: u16,
) {
    let content = buffer.content();

    if is_focused && app.editing {
        // Editing - show cursor as |
        let cursor_pos = buffer.cursor();
        let before: String = content.chars().take(cursor_pos).collect();
        let after: String = content.chars().skip(cursor_pos).collect();

        let line = Line::from(vec![
            Span::styled(before, app.theme.style()),
            Span::styled("|", app.theme.primary_style().add_modifier(Modifier::BOLD)),
            Span::styled(after, app.theme.style()),
        ]);
        frame.render_widget(Paragraph::new(line), Rect::new(x, y, width, 1));
    } else {
        let (display, style) = if content.is_empty() {
            ("(empty)".to_string(), app.theme.muted_style())
        } else if is_focused {
            (content.to_string(), app.theme.primary_style())
        } else {
            (content.to_string(), app.theme.style())
        };
        frame.render_widget(
            Paragraph::new(display).style(style),
            Rect::new(x, y, width, 1),
        );
    }
}
