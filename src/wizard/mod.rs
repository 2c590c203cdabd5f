mod backend;
mod model;
mod page;
mod summary;
mod validation;

pub use backend::{BackendEvent, BackendInvocation, BackendResult, BackendRunner, OutputStream};
pub use model::{ConfigModel, FsType, InstallationConfig};
pub use page::{next_page, NavEvent, NavRefusal, Page, WizardSession};
pub use summary::{describe_result, destructive_warning, summarize, SummaryItem};
pub use validation::{Field, FieldError, ValidationContext};

use crossterm::event::{KeyCode, KeyEvent};
use tokio::sync::mpsc;
use tracing::{error, info};

use crate::config::InstallerConfig;
use crate::input::InputBuffer;
use crate::system::{self, Disk};
use crate::ui::widgets::StatusBarState;
use crate::ui::Theme;

/// Actions the main loop performs on behalf of the wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardAction {
    /// Start a fresh backend invocation for the committed snapshot
    LaunchBackend,
    /// Signal the reboot collaborator and end the session
    Reboot,
}

/// Pending two-step confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmAction {
    /// Discard the session from an editable page or the error state
    QuitWizard,
    /// "Last chance": start the destructive backend run
    StartInstall,
    /// Stop the running backend
    CancelInstall,
    /// Finish and reboot
    Reboot,
}

/// Message displayed to the user
pub struct Message {
    pub text: String,
    pub is_error: bool,
}

/// Form fields on the settings page, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsField {
    TargetDisk,
    Filesystem,
    SwapSize,
    Username,
    AutoLogin,
    LenovoFix,
}

impl SettingsField {
    pub const ALL: [SettingsField; 6] = [
        SettingsField::TargetDisk,
        SettingsField::Filesystem,
        SettingsField::SwapSize,
        SettingsField::Username,
        SettingsField::AutoLogin,
        SettingsField::LenovoFix,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SettingsField::TargetDisk => "Target disk",
            SettingsField::Filesystem => "Target filesystem type",
            SettingsField::SwapSize => "Swap (in MiB)",
            SettingsField::Username => "Username",
            SettingsField::AutoLogin => "Auto-login user",
            SettingsField::LenovoFix => "Enable lenovofix",
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, SettingsField::SwapSize | SettingsField::Username)
    }

    fn index(&self) -> usize {
        Self::ALL.iter().position(|f| f == self).unwrap_or(0)
    }

    fn next(&self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    fn prev(&self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Main wizard state: the configuration model, the page state machine, and
/// the backend invocation in flight, plus everything the TUI renders.
pub struct WizardApp {
    pub config: InstallerConfig,
    pub theme: Theme,

    pub model: ConfigModel,
    pub session: WizardSession,
    pub disks: Vec<Disk>,
    pub invocation: Option<BackendInvocation>,
    runner: BackendRunner,
    committed_snapshot: Option<InstallationConfig>,

    // Settings form state
    pub focused_field: SettingsField,
    pub editing: bool,
    pub disk_cursor: Option<usize>,
    pub swap_input: InputBuffer,
    pub username_input: InputBuffer,

    // UI state
    pub message: Option<Message>,
    pub confirm_action: Option<ConfirmAction>,
    pub is_executing: bool,
    pub cancel_requested: bool,
    pub should_exit: bool,
    pub status_bar: StatusBarState,
    fatal: bool,
    spinner_frame: usize,
}

impl WizardApp {
    pub fn new(config: InstallerConfig) -> Self {
        let demo = config.general.dryrun;
        let disks = system::discover_disks(demo);
        let ctx = ValidationContext {
            known_disks: disks.iter().map(|d| d.device.clone()).collect(),
            taken_usernames: system::taken_usernames(demo),
        };
        let model = ConfigModel::new(ctx, &config.defaults);
        let runner = if demo {
            BackendRunner::demo()
        } else {
            BackendRunner::new(&config.backend)
        };
        let swap_input = InputBuffer::with_content(model.swap_raw());

        Self {
            config,
            theme: Theme::default(),
            model,
            session: WizardSession::new(),
            disks,
            invocation: None,
            runner,
            committed_snapshot: None,
            focused_field: SettingsField::TargetDisk,
            editing: false,
            disk_cursor: None,
            swap_input,
            username_input: InputBuffer::new(),
            message: None,
            confirm_action: None,
            is_executing: false,
            cancel_requested: false,
            should_exit: false,
            status_bar: StatusBarState::welcome(),
            fatal: false,
            spinner_frame: 0,
        }
    }

    pub fn is_dryrun(&self) -> bool {
        self.config.general.dryrun
    }

    pub fn page(&self) -> Page {
        self.session.current()
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<WizardAction> {
        if self.message.is_some() && !self.is_executing {
            self.message = None;
        }

        if let Some(action) = self.confirm_action {
            let result = self.handle_confirm_key(key, action);
            self.update_status_bar();
            return result;
        }

        let result = match self.page() {
            Page::Welcome => self.handle_welcome_key(key),
            Page::Settings => self.handle_settings_key(key),
            Page::Commit => self.handle_commit_key(key),
            Page::Error => self.handle_error_key(key),
            Page::Summary => self.handle_summary_key(key),
            Page::Finish | Page::Cancelled => None,
        };

        self.update_status_bar();
        result
    }

    fn handle_welcome_key(&mut self, key: KeyEvent) -> Option<WizardAction> {
        match key.code {
            KeyCode::Enter => {
                if self.session.apply(NavEvent::Next, true).is_ok() {
                    self.focused_field = SettingsField::TargetDisk;
                }
            }
            KeyCode::Char('q') | KeyCode::Esc => {
                self.confirm_action = Some(ConfirmAction::QuitWizard);
            }
            _ => {}
        }
        None
    }

    fn handle_settings_key(&mut self, key: KeyEvent) -> Option<WizardAction> {
        if self.editing {
            self.handle_editing_key(key);
            return None;
        }

        match key.code {
            KeyCode::Char('j') | KeyCode::Down | KeyCode::Tab => {
                self.focused_field = self.focused_field.next();
            }
            KeyCode::Char('k') | KeyCode::Up | KeyCode::BackTab => {
                self.focused_field = self.focused_field.prev();
            }
            KeyCode::Char('l') | KeyCode::Right => self.change_field(1),
            KeyCode::Char('h') | KeyCode::Left => self.change_field(-1),
            KeyCode::Char(' ') => self.change_field(1),
            KeyCode::Enter | KeyCode::Char('i') => {
                if self.focused_field.is_text() {
                    self.editing = true;
                } else {
                    self.change_field(1);
                }
            }
            KeyCode::Char('n') => return self.attempt_next(),
            KeyCode::Char('b') => {
                if let Err(refusal) = self.session.apply(NavEvent::Back, true) {
                    error!("Back refused on settings page: {refusal:?}");
                }
            }
            KeyCode::Char('q') | KeyCode::Esc => {
                self.confirm_action = Some(ConfirmAction::QuitWizard);
            }
            _ => {}
        }
        None
    }

    fn handle_editing_key(&mut self, key: KeyEvent) {
        let numeric = self.focused_field == SettingsField::SwapSize;
        let buffer = match self.focused_field {
            SettingsField::SwapSize => &mut self.swap_input,
            SettingsField::Username => &mut self.username_input,
            _ => {
                self.editing = false;
                return;
            }
        };

        match key.code {
            KeyCode::Esc | KeyCode::Enter => {
                self.editing = false;
                return;
            }
            KeyCode::Backspace => {
                buffer.delete_back();
            }
            KeyCode::Delete => {
                buffer.delete_forward();
            }
            KeyCode::Left => buffer.move_left(),
            KeyCode::Right => buffer.move_right(),
            KeyCode::Home => buffer.move_start(),
            KeyCode::End => buffer.move_end(),
            KeyCode::Char(c) => {
                if !numeric || c.is_ascii_digit() {
                    buffer.insert(c);
                }
            }
            _ => {}
        }

        // The model is the single writer of the configuration; keep it in
        // step with the buffer on every edit.
        match self.focused_field {
            SettingsField::SwapSize => {
                let raw = self.swap_input.content().to_string();
                self.model.set_swap_raw(&raw);
            }
            SettingsField::Username => {
                let name = self.username_input.content().to_string();
                self.model.set_username(&name);
            }
            _ => {}
        }
    }

    /// Change the value of a selectable field.
    fn change_field(&mut self, step: i64) {
        match self.focused_field {
            SettingsField::TargetDisk => self.cycle_disk(step),
            SettingsField::Filesystem => {
                let fs = self.model.filesystem().toggled();
                self.model.set_filesystem(fs);
            }
            SettingsField::AutoLogin => {
                let enabled = !self.model.auto_login();
                self.model.set_auto_login(enabled);
            }
            SettingsField::LenovoFix => {
                let enabled = !self.model.lenovo_fix();
                self.model.set_lenovo_fix(enabled);
            }
            SettingsField::SwapSize | SettingsField::Username => {
                self.editing = true;
            }
        }
    }

    fn cycle_disk(&mut self, step: i64) {
        if self.disks.is_empty() {
            self.set_error("No target devices were found".to_string());
            return;
        }

        let len = self.disks.len() as i64;
        let next = match self.disk_cursor {
            Some(idx) => (idx as i64 + step).rem_euclid(len) as usize,
            None => {
                if step >= 0 {
                    0
                } else {
                    (len - 1) as usize
                }
            }
        };
        self.disk_cursor = Some(next);
        let device = self.disks[next].device.clone();
        self.model.set_target_disk(&device);
    }

    /// Next from Settings: refuse while a required field is invalid,
    /// otherwise ask for the final confirmation.
    fn attempt_next(&mut self) -> Option<WizardAction> {
        match self.model.settings_valid() {
            Ok(()) => {
                self.confirm_action = Some(ConfirmAction::StartInstall);
                None
            }
            Err((field, error)) => {
                self.focused_field = match field {
                    Field::TargetDisk => SettingsField::TargetDisk,
                    Field::SwapSize => SettingsField::SwapSize,
                    Field::Username => SettingsField::Username,
                };
                self.set_error(error.to_string());
                None
            }
        }
    }

    fn handle_commit_key(&mut self, key: KeyEvent) -> Option<WizardAction> {
        match key.code {
            KeyCode::Esc | KeyCode::Char('c') | KeyCode::Char('q') => {
                if self.is_executing && !self.cancel_requested {
                    self.confirm_action = Some(ConfirmAction::CancelInstall);
                }
            }
            _ => {}
        }
        None
    }

    fn handle_error_key(&mut self, key: KeyEvent) -> Option<WizardAction> {
        match key.code {
            KeyCode::Char('r') => {
                if self.fatal {
                    self.set_error("Fatal error: the installer cannot continue".to_string());
                    return None;
                }
                match self.session.apply(NavEvent::Retry, true) {
                    Ok(_) => return Some(WizardAction::LaunchBackend),
                    Err(refusal) => error!("Retry refused: {refusal:?}"),
                }
            }
            KeyCode::Char('q') | KeyCode::Char('c') | KeyCode::Esc => {
                self.confirm_action = Some(ConfirmAction::QuitWizard);
            }
            _ => {}
        }
        None
    }

    fn handle_summary_key(&mut self, key: KeyEvent) -> Option<WizardAction> {
        match key.code {
            KeyCode::Enter | KeyCode::Char('f') => {
                self.confirm_action = Some(ConfirmAction::Reboot);
            }
            KeyCode::Char('q') | KeyCode::Esc => {
                self.confirm_action = Some(ConfirmAction::QuitWizard);
            }
            _ => {}
        }
        None
    }

    fn handle_confirm_key(&mut self, key: KeyEvent, action: ConfirmAction) -> Option<WizardAction> {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                self.confirm_action = None;
                match action {
                    ConfirmAction::QuitWizard => {
                        self.quit_confirmed();
                        None
                    }
                    ConfirmAction::StartInstall => self.confirm_commit(),
                    ConfirmAction::CancelInstall => {
                        self.cancel_backend();
                        None
                    }
                    ConfirmAction::Reboot => self.finish_confirmed(),
                }
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.confirm_action = None;
                None
            }
            _ => None,
        }
    }

    fn quit_confirmed(&mut self) {
        match self.session.apply(NavEvent::CancelConfirmed, true) {
            Ok(_) => info!("Session cancelled by the user"),
            Err(refusal) => error!("Cancel refused: {refusal:?}"),
        }
        self.should_exit = true;
    }

    /// The point of no return. `committed` is set before the backend is
    /// launched; a failed or crashed run is still a committed run.
    fn confirm_commit(&mut self) -> Option<WizardAction> {
        if self.fatal {
            return None;
        }

        // The confirmation dialog is only reachable with valid settings;
        // if that precondition broke, the safety of the destructive action
        // is gone and no backend may ever be invoked.
        if let Err((field, error)) = self.model.settings_valid() {
            self.fatal = true;
            self.set_error(format!("Fatal error: {} is invalid: {error}", field_name(field)));
            error!("Commit attempted with an invalid snapshot: {field:?}: {error}");
            return None;
        }

        let snapshot = self.model.snapshot();
        match self.session.apply(NavEvent::Next, true) {
            Ok(_) => {
                self.committed_snapshot = Some(snapshot);
                Some(WizardAction::LaunchBackend)
            }
            Err(refusal) => {
                error!("Commit transition refused: {refusal:?}");
                None
            }
        }
    }

    fn finish_confirmed(&mut self) -> Option<WizardAction> {
        match self.session.apply(NavEvent::Finish, true) {
            Ok(_) => Some(WizardAction::Reboot),
            Err(refusal) => {
                error!("Finish refused: {refusal:?}");
                None
            }
        }
    }

    /// Create a fresh invocation for the committed snapshot. Returns the
    /// event receiver the main loop selects on.
    pub fn launch_backend(&mut self) -> Option<mpsc::UnboundedReceiver<BackendEvent>> {
        let Some(snapshot) = self.committed_snapshot.clone() else {
            self.fatal = true;
            self.set_error("Fatal error: no committed configuration to install".to_string());
            error!("launch_backend called without a committed snapshot");
            return None;
        };

        let (invocation, rx) = self.runner.launch(snapshot);
        self.invocation = Some(invocation);
        self.is_executing = true;
        self.cancel_requested = false;
        self.update_status_bar();
        Some(rx)
    }

    /// Cooperative cancellation: the backend is signalled, and the page
    /// stays blocked until the supervisor reports a terminal result.
    pub fn cancel_backend(&mut self) {
        if let Some(invocation) = &mut self.invocation {
            if invocation.request_cancel() {
                self.cancel_requested = true;
                self.set_info("Cancelling installation...".to_string());
            }
        }
    }

    pub fn handle_backend_event(&mut self, event: BackendEvent) {
        match event {
            BackendEvent::Line { stream, text } => {
                if let Some(invocation) = &mut self.invocation {
                    invocation.record_line(stream, text);
                }
            }
            BackendEvent::Finished(result) => {
                if let Some(invocation) = &mut self.invocation {
                    invocation.finish(result.clone());
                }
                self.is_executing = false;

                match &result {
                    BackendResult::Success => {
                        if let Err(refusal) = self.session.apply(NavEvent::BackendSucceeded, true) {
                            error!("Success transition refused: {refusal:?}");
                        }
                        self.set_info("Press \"Finish\" to reboot".to_string());
                    }
                    BackendResult::Failed { .. } | BackendResult::CrashedOrUnreachable { .. } => {
                        if let Err(refusal) = self.session.apply(NavEvent::BackendFailed, true) {
                            error!("Failure transition refused: {refusal:?}");
                        }
                        let mut text = describe_result(&result);
                        if let Some(diagnostic) =
                            self.invocation.as_ref().and_then(|i| i.diagnostic())
                        {
                            text = format!("{text} ({diagnostic})");
                        }
                        self.set_error(text);
                    }
                }
                self.update_status_bar();
            }
        }
    }

    pub fn set_error(&mut self, text: String) {
        self.message = Some(Message {
            text,
            is_error: true,
        });
    }

    pub fn set_info(&mut self, text: String) {
        self.message = Some(Message {
            text,
            is_error: false,
        });
    }

    pub fn tick(&mut self) {
        self.spinner_frame = (self.spinner_frame + 1) % 4;
        self.update_status_bar();
    }

    pub fn spinner_char(&self) -> char {
        const SPINNER: [char; 4] = ['|', '/', '-', '\\'];
        SPINNER[self.spinner_frame]
    }

    pub fn update_status_bar(&mut self) {
        if self.confirm_action.is_some() {
            self.status_bar = StatusBarState::confirm();
            return;
        }

        self.status_bar = match self.page() {
            Page::Welcome => StatusBarState::welcome(),
            Page::Settings => {
                if self.editing {
                    StatusBarState::settings_editing()
                } else {
                    StatusBarState::settings_normal()
                }
            }
            Page::Commit => StatusBarState::commit_running(self.cancel_requested),
            Page::Error => StatusBarState::error_state(),
            Page::Summary => StatusBarState::summary(),
            Page::Finish | Page::Cancelled => StatusBarState::finish(),
        };
    }
}

fn field_name(field: Field) -> &'static str {
    match field {
        Field::TargetDisk => "target disk",
        Field::SwapSize => "swap size",
        Field::Username => "username",
    }
}
