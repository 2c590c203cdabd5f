/// Wizard pages plus the two non-page states: the absorbing Cancelled
/// state and the Error state entered only from Commit on backend failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Welcome,
    Settings,
    Commit,
    Summary,
    Finish,
    Error,
    Cancelled,
}

impl Page {
    pub fn title(&self) -> &'static str {
        match self {
            Page::Welcome => "Welcome",
            Page::Settings => "Settings",
            Page::Commit => "Commit",
            Page::Summary => "Summary",
            Page::Finish => "Finish",
            Page::Error => "Error",
            Page::Cancelled => "Cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Page::Finish | Page::Cancelled)
    }
}

/// Navigation events accepted by the state machine. Cancellation intent and
/// commit confirmation are resolved by the caller (two-step dialogs); only
/// the confirmed outcome reaches the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavEvent {
    Next,
    Back,
    Retry,
    Finish,
    CancelConfirmed,
    BackendSucceeded,
    BackendFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavRefusal {
    /// Next from Settings with an invalid required field
    SettingsIncomplete,
    /// Back after the commit point
    CommittedLocked,
    /// The event has no meaning in the current state
    NoSuchTransition,
}

/// Pure transition function: next state from (state, event, committed,
/// settings-validity). Anything not listed is refused.
pub fn next_page(
    current: Page,
    event: NavEvent,
    committed: bool,
    settings_valid: bool,
) -> Result<Page, NavRefusal> {
    use NavEvent::*;
    use NavRefusal::*;

    match (current, event) {
        (Page::Welcome, Next) => Ok(Page::Settings),
        (Page::Settings, Next) if settings_valid => Ok(Page::Commit),
        (Page::Settings, Next) => Err(SettingsIncomplete),

        (_, Back) if committed => Err(CommittedLocked),
        (Page::Settings, Back) => Ok(Page::Welcome),

        (Page::Commit, BackendSucceeded) => Ok(Page::Summary),
        (Page::Commit, BackendFailed) => Ok(Page::Error),

        (Page::Error, Retry) => Ok(Page::Commit),

        (Page::Summary, Finish) => Ok(Page::Finish),

        (current, CancelConfirmed) if !current.is_terminal() => Ok(Page::Cancelled),

        _ => Err(NoSuchTransition),
    }
}

/// Tracks the current page, the visited-page trail, and the commit flag.
/// `committed` is set when the session enters Commit and is never reset,
/// which is what makes Back unreachable after the point of no return.
#[derive(Debug, Clone)]
pub struct WizardSession {
    current: Page,
    history: Vec<Page>,
    committed: bool,
}

impl Default for WizardSession {
    fn default() -> Self {
        Self {
            current: Page::Welcome,
            history: Vec::new(),
            committed: false,
        }
    }
}

impl WizardSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Page {
        self.current
    }

    pub fn committed(&self) -> bool {
        self.committed
    }

    pub fn history(&self) -> &[Page] {
        &self.history
    }

    pub fn apply(&mut self, event: NavEvent, settings_valid: bool) -> Result<Page, NavRefusal> {
        let next = next_page(self.current, event, self.committed, settings_valid)?;

        if event == NavEvent::Back {
            self.history.pop();
        } else {
            self.history.push(self.current);
        }

        if next == Page::Commit {
            self.committed = true;
        }
        self.current = next;
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_happy_path() {
        let mut s = WizardSession::new();
        assert_eq!(s.apply(NavEvent::Next, true), Ok(Page::Settings));
        assert_eq!(s.apply(NavEvent::Next, true), Ok(Page::Commit));
        assert!(s.committed());
        assert_eq!(s.apply(NavEvent::BackendSucceeded, true), Ok(Page::Summary));
        assert_eq!(s.apply(NavEvent::Finish, true), Ok(Page::Finish));
        assert!(s.current().is_terminal());
        assert_eq!(s.history(), &[Page::Welcome, Page::Settings, Page::Commit, Page::Summary]);
    }

    #[test]
    fn next_from_settings_is_refused_while_invalid() {
        let mut s = WizardSession::new();
        s.apply(NavEvent::Next, true).unwrap();
        assert_eq!(s.apply(NavEvent::Next, false), Err(NavRefusal::SettingsIncomplete));
        assert_eq!(s.current(), Page::Settings);
        assert!(!s.committed());
    }

    #[test]
    fn back_pops_history_before_commit() {
        let mut s = WizardSession::new();
        s.apply(NavEvent::Next, true).unwrap();
        assert_eq!(s.apply(NavEvent::Back, true), Ok(Page::Welcome));
        assert!(s.history().is_empty());
        // Back from Welcome has nowhere to go
        assert_eq!(s.apply(NavEvent::Back, true), Err(NavRefusal::NoSuchTransition));
    }

    #[test]
    fn back_is_unreachable_once_committed() {
        let mut s = WizardSession::new();
        s.apply(NavEvent::Next, true).unwrap();
        s.apply(NavEvent::Next, true).unwrap();

        assert_eq!(s.apply(NavEvent::Back, true), Err(NavRefusal::CommittedLocked));

        // Regardless of backend outcome
        s.apply(NavEvent::BackendFailed, true).unwrap();
        assert_eq!(s.current(), Page::Error);
        assert!(s.committed());
        assert_eq!(s.apply(NavEvent::Back, true), Err(NavRefusal::CommittedLocked));

        s.apply(NavEvent::Retry, true).unwrap();
        assert_eq!(s.current(), Page::Commit);
        s.apply(NavEvent::BackendSucceeded, true).unwrap();
        assert_eq!(s.apply(NavEvent::Back, true), Err(NavRefusal::CommittedLocked));
    }

    #[test]
    fn error_state_only_exits_via_retry_or_cancel() {
        let mut s = WizardSession::new();
        s.apply(NavEvent::Next, true).unwrap();
        s.apply(NavEvent::Next, true).unwrap();
        s.apply(NavEvent::BackendFailed, true).unwrap();

        assert_eq!(s.apply(NavEvent::Next, true), Err(NavRefusal::NoSuchTransition));
        assert_eq!(s.apply(NavEvent::Finish, true), Err(NavRefusal::NoSuchTransition));

        let mut retried = s.clone();
        assert_eq!(retried.apply(NavEvent::Retry, true), Ok(Page::Commit));

        assert_eq!(s.apply(NavEvent::CancelConfirmed, true), Ok(Page::Cancelled));
    }

    #[test]
    fn cancelled_is_absorbing_and_finish_is_terminal() {
        for page in [Page::Welcome, Page::Settings, Page::Commit, Page::Summary, Page::Error] {
            assert_eq!(
                next_page(page, NavEvent::CancelConfirmed, true, true),
                Ok(Page::Cancelled)
            );
        }

        for terminal in [Page::Finish, Page::Cancelled] {
            for event in [
                NavEvent::Next,
                NavEvent::Back,
                NavEvent::Retry,
                NavEvent::Finish,
                NavEvent::CancelConfirmed,
                NavEvent::BackendSucceeded,
                NavEvent::BackendFailed,
            ] {
                assert!(next_page(terminal, event, true, true).is_err());
            }
        }
    }
}
