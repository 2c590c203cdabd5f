use super::backend::BackendResult;
use super::model::InstallationConfig;

/// One row of the confirmation view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryItem {
    pub label: &'static str,
    pub value: String,
}

impl SummaryItem {
    pub fn render(&self) -> String {
        format!("{}: {}", self.label, self.value)
    }
}

/// Ordered (label, value) pairs for the Commit and Summary pages. Pure
/// formatting; queried on demand by the rendering page.
pub fn summarize(config: &InstallationConfig) -> Vec<SummaryItem> {
    vec![
        item("Target disk", config.target_disk.clone()),
        item("Filesystem", config.filesystem.label().to_string()),
        item("Swap (in MiB)", config.swap_mib.to_string()),
        item("Username", config.username.clone()),
        item("Auto-login", yes_no(config.auto_login)),
        item("Lenovofix", yes_no(config.lenovo_fix)),
    ]
}

/// Restates the destructive target right before the point of no return.
pub fn destructive_warning(config: &InstallationConfig) -> String {
    format!(
        "All data on {} will be irrevocably erased.",
        config.target_disk
    )
}

/// One-line account of a terminal backend result.
pub fn describe_result(result: &BackendResult) -> String {
    match result {
        BackendResult::Success => "The installation finished successfully.".to_string(),
        BackendResult::Failed {
            exit_code: Some(code),
            ..
        } => format!("The backend failed with exit code {code}."),
        BackendResult::Failed { message, .. } => message.clone(),
        BackendResult::CrashedOrUnreachable { message } => message.clone(),
    }
}

fn item(label: &'static str, value: String) -> SummaryItem {
    SummaryItem { label, value }
}

fn yes_no(value: bool) -> String {
    if value { "Yes" } else { "No" }.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wizard::model::FsType;

    fn config() -> InstallationConfig {
        InstallationConfig {
            target_disk: "/dev/da0".to_string(),
            filesystem: FsType::Ufs,
            swap_mib: 2048,
            username: "alice".to_string(),
            auto_login: false,
            lenovo_fix: true,
        }
    }

    #[test]
    fn items_are_ordered_and_booleans_render_yes_no() {
        let rendered: Vec<String> = summarize(&config()).iter().map(|i| i.render()).collect();
        assert_eq!(
            rendered,
            vec![
                "Target disk: /dev/da0",
                "Filesystem: UFS",
                "Swap (in MiB): 2048",
                "Username: alice",
                "Auto-login: No",
                "Lenovofix: Yes",
            ]
        );
    }

    #[test]
    fn warning_names_the_target_device() {
        assert!(destructive_warning(&config()).contains("/dev/da0"));
    }

    #[test]
    fn result_descriptions() {
        assert!(describe_result(&BackendResult::Success).contains("successfully"));
        let failed = BackendResult::Failed {
            exit_code: Some(1),
            message: "backend exited with code 1".to_string(),
        };
        assert!(describe_result(&failed).contains("exit code 1"));
    }
}
