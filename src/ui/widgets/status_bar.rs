/// Key hints shown on the bottom line, updated as the wizard moves.
#[derive(Debug, Clone, Default)]
pub struct StatusBarState {
    pub left_hint: String,
    pub right_hint: String,
}

impl StatusBarState {
    pub fn welcome() -> Self {
        Self {
            left_hint: "Enter: next".to_string(),
            right_hint: "q: quit".to_string(),
        }
    }

    pub fn settings_normal() -> Self {
        Self {
            left_hint: "j/k: fields  h/l: change  Enter: edit".to_string(),
            right_hint: "n: next  b: back  q: quit".to_string(),
        }
    }

    pub fn settings_editing() -> Self {
        Self {
            left_hint: "Type to enter text".to_string(),
            right_hint: "Enter/Esc: done".to_string(),
        }
    }

    pub fn commit_running(cancel_requested: bool) -> Self {
        if cancel_requested {
            Self {
                left_hint: "Waiting for the backend to stop...".to_string(),
                right_hint: String::new(),
            }
        } else {
            Self {
                left_hint: "Installing, please wait...".to_string(),
                right_hint: "Esc: cancel".to_string(),
            }
        }
    }

    pub fn error_state() -> Self {
        Self {
            left_hint: "Installation failed".to_string(),
            right_hint: "r: retry  q: quit".to_string(),
        }
    }

    pub fn summary() -> Self {
        Self {
            left_hint: "Press \"Finish\" to reboot".to_string(),
            right_hint: "Enter: finish".to_string(),
        }
    }

    pub fn finish() -> Self {
        Self {
            left_hint: "Rebooting...".to_string(),
            right_hint: String::new(),
        }
    }

    pub fn confirm() -> Self {
        Self {
            left_hint: String::new(),
            right_hint: "y: confirm  n: dismiss".to_string(),
        }
    }
}
