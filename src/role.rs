use std::env;

const UNKNOWN: &str = "unknown";

const SHELL_ROLE: &str = "You translate requests into {shell} commands for {os}.
Reply with exactly one valid shell command and nothing else: no description, no comments, no Markdown, no ``` fences.
If the request needs several steps, chain them into a single command with &&.
If details are missing, pick the most sensible option.";

const CODE_ROLE: &str = "You write code.
Reply with source code only: no description, no explanation, no Markdown, no ``` fences.
If details are missing, pick the most sensible option.";

const DESCRIBE_ROLE: &str = "You explain shell commands.
Give a terse description of the given command: what it does overall, then each argument and option.
Keep it under about 80 words. Markdown is allowed.";

const DEFAULT_ROLE: &str = "You are a programming and system administration assistant.
The user works on {os} with the {shell} shell.
Keep answers under about 100 words unless the user asks for more detail. Markdown is allowed.";

/// Which system prompt the model gets for this run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Shell,
    Code,
    Describe,
    Default,
}

impl Role {
    /// First set flag wins, in shell, code, describe order.
    pub fn from_flags(shell: bool, code: bool, describe: bool) -> Self {
        match (shell, code, describe) {
            (true, _, _) => Self::Shell,
            (false, true, _) => Self::Code,
            (false, false, true) => Self::Describe,
            (false, false, false) => Self::Default,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Shell => "shell",
            Self::Code => "code",
            Self::Describe => "describe",
            Self::Default => "default",
        }
    }

    pub fn system_prompt(&self, host: &HostEnvironment) -> String {
        let template = match self {
            Self::Shell => SHELL_ROLE,
            Self::Code => CODE_ROLE,
            Self::Describe => DESCRIBE_ROLE,
            Self::Default => DEFAULT_ROLE,
        };

        template
            .replace("{os}", &host.os)
            .replace("{shell}", &host.shell)
    }
}

/// OS and shell identifiers interpolated into the shell and default roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostEnvironment {
    pub os: String,
    pub shell: String,
}

impl HostEnvironment {
    pub fn new(os: impl Into<String>, shell: impl Into<String>) -> Self {
        Self {
            os: os.into(),
            shell: shell.into(),
        }
    }

    pub fn detect() -> Self {
        Self::detect_with(env::consts::OS, |key| env::var(key).ok())
    }

    fn detect_with(os: &str, mut get_var: impl FnMut(&str) -> Option<String>) -> Self {
        let shell = ["SHELL", "ComSpec"]
            .into_iter()
            .filter_map(|key| get_var(key))
            .map(|value| value.trim().to_string())
            .find(|value| !value.is_empty())
            .unwrap_or_else(|| UNKNOWN.to_string());
        let os = if os.trim().is_empty() { UNKNOWN } else { os };

        Self::new(os, shell)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::{HostEnvironment, Role};

    fn linux_bash() -> HostEnvironment {
        HostEnvironment::new("linux", "/bin/bash")
    }

    #[test]
    fn from_flags_follows_precedence() {
        assert_eq!(Role::from_flags(false, false, false), Role::Default);
        assert_eq!(Role::from_flags(true, false, false), Role::Shell);
        assert_eq!(Role::from_flags(false, true, false), Role::Code);
        assert_eq!(Role::from_flags(false, false, true), Role::Describe);
        assert_eq!(Role::from_flags(true, true, true), Role::Shell);
        assert_eq!(Role::from_flags(false, true, true), Role::Code);
    }

    #[test]
    fn every_flag_combination_yields_one_stable_prompt() {
        let host = linux_bash();
        for bits in 0..8u8 {
            let (shell, code, describe) = (bits & 1 != 0, bits & 2 != 0, bits & 4 != 0);
            let first = Role::from_flags(shell, code, describe).system_prompt(&host);
            let second = Role::from_flags(shell, code, describe).system_prompt(&host);
            assert!(!first.is_empty());
            assert_eq!(first, second);
        }
    }

    #[test]
    fn shell_role_interpolates_os_and_shell() {
        let prompt = Role::Shell.system_prompt(&linux_bash());
        assert!(prompt.contains("linux"), "unexpected prompt: {prompt}");
        assert!(prompt.contains("/bin/bash"), "unexpected prompt: {prompt}");
        assert!(prompt.contains("&&"));
        assert!(prompt.contains("no Markdown"));
        assert!(!prompt.contains("{os}") && !prompt.contains("{shell}"));
    }

    #[test]
    fn default_role_interpolates_os_and_shell() {
        let prompt = Role::Default.system_prompt(&HostEnvironment::new("macos", "/bin/zsh"));
        assert!(prompt.contains("macos"));
        assert!(prompt.contains("/bin/zsh"));
        assert!(prompt.contains("100 words"));
    }

    #[test]
    fn code_and_describe_roles_ignore_host() {
        let host = linux_bash();
        let code = Role::Code.system_prompt(&host);
        let describe = Role::Describe.system_prompt(&host);
        assert!(!code.contains("/bin/bash"));
        assert!(!describe.contains("/bin/bash"));
        assert!(describe.contains("80 words"));
    }

    #[test]
    fn detect_prefers_shell_then_comspec_then_placeholder() {
        let vars = HashMap::from([
            ("SHELL", "/usr/bin/fish"),
            ("ComSpec", "C:\\Windows\\system32\\cmd.exe"),
        ]);
        let host = HostEnvironment::detect_with("linux", |key| {
            vars.get(key).map(|value| value.to_string())
        });
        assert_eq!(host, HostEnvironment::new("linux", "/usr/bin/fish"));

        let host = HostEnvironment::detect_with("windows", |key| {
            (key == "ComSpec").then(|| "cmd.exe".to_string())
        });
        assert_eq!(host.shell, "cmd.exe");

        let host = HostEnvironment::detect_with("", |_| Some("   ".to_string()));
        assert_eq!(host, HostEnvironment::new("unknown", "unknown"));
    }
}
