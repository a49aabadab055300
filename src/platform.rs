//! Best-effort probes of the local environment, used to decorate the
//! command-oriented prompts with machine details.

use std::process::Command;

/// Observed facts about the machine the suggested command will run on.
///
/// Every field is optional: a failed probe leaves its field unset and the
/// prompt simply carries less detail. Probing never fails the run.
#[derive(Debug, Clone, Default)]
pub struct EnvFacts {
    /// Shell name and version, e.g. `zsh 5.9`.
    pub shell: Option<String>,
    /// Human-readable OS name.
    pub os: Option<String>,
    /// CPU architecture, e.g. `x86_64`.
    pub arch: Option<String>,
    /// Whether the current user is root.
    pub is_root: Option<bool>,
}

/// Runs an external probe command and captures its stdout.
pub trait CommandProbe {
    /// Returns the command's stdout on success, `None` on any failure.
    fn output(&self, program: &str, args: &[&str]) -> Option<String>;
}

/// Probe backed by real child processes.
pub struct SystemProbe;

impl CommandProbe for SystemProbe {
    fn output(&self, program: &str, args: &[&str]) -> Option<String> {
        which::which(program).ok()?;
        let output = Command::new(program).args(args).output().ok()?;
        if !output.status.success() {
            return None;
        }
        Some(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl EnvFacts {
    /// Gathers whatever can be observed cheaply on this machine.
    pub fn probe() -> Self {
        Self::probe_with(&SystemProbe)
    }

    /// Gathers facts through the given probe.
    pub fn probe_with(probe: &dyn CommandProbe) -> Self {
        Self {
            shell: detect_shell(probe),
            os: detect_os(),
            arch: Some(std::env::consts::ARCH.to_string()),
            is_root: detect_root(probe),
        }
    }

    /// No facts at all, for modes whose prompts are not decorated.
    pub fn none() -> Self {
        Self::default()
    }
}

/// First two words of `zsh --version`, e.g. `zsh 5.9`.
fn detect_shell(probe: &dyn CommandProbe) -> Option<String> {
    let version = probe.output("zsh", &["--version"])?;
    let mut words = version.split_whitespace();
    let name = words.next()?;
    let number = words.next()?;
    Some(format!("{} {}", name, number))
}

fn detect_os() -> Option<String> {
    if let Ok(release) = std::fs::read_to_string("/etc/os-release") {
        for line in release.lines() {
            if let Some(value) = line.strip_prefix("PRETTY_NAME=") {
                let name = value.trim().trim_matches('"');
                if !name.is_empty() {
                    return Some(name.to_string());
                }
            }
        }
    }
    Some(std::env::consts::OS.to_string())
}

fn detect_root(probe: &dyn CommandProbe) -> Option<bool> {
    let uid = probe.output("id", &["-u"])?;
    uid.trim().parse::<u32>().ok().map(|uid| uid == 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockProbe {
        zsh: Option<&'static str>,
        uid: Option<&'static str>,
    }

    impl CommandProbe for MockProbe {
        fn output(&self, program: &str, _args: &[&str]) -> Option<String> {
            match program {
                "zsh" => self.zsh.map(str::to_string),
                "id" => self.uid.map(str::to_string),
                _ => None,
            }
        }
    }

    #[test]
    fn test_shell_keeps_name_and_version_only() {
        let probe = MockProbe {
            zsh: Some("zsh 5.9 (x86_64-pc-linux-gnu)\n"),
            uid: Some("1000\n"),
        };

        let facts = EnvFacts::probe_with(&probe);
        assert_eq!(facts.shell.as_deref(), Some("zsh 5.9"));
    }

    #[test]
    fn test_missing_shell_leaves_field_unset() {
        let probe = MockProbe {
            zsh: None,
            uid: Some("1000\n"),
        };

        let facts = EnvFacts::probe_with(&probe);
        assert!(facts.shell.is_none());
        assert!(facts.os.is_some());
        assert!(facts.arch.is_some());
    }

    #[test]
    fn test_root_detection_from_uid() {
        let root = MockProbe {
            zsh: None,
            uid: Some("0\n"),
        };
        let user = MockProbe {
            zsh: None,
            uid: Some("1000\n"),
        };

        assert_eq!(EnvFacts::probe_with(&root).is_root, Some(true));
        assert_eq!(EnvFacts::probe_with(&user).is_root, Some(false));
    }

    #[test]
    fn test_garbled_uid_is_ignored() {
        let probe = MockProbe {
            zsh: None,
            uid: Some("not a number"),
        };

        assert_eq!(EnvFacts::probe_with(&probe).is_root, None);
    }

    #[test]
    fn test_none_carries_no_facts() {
        let facts = EnvFacts::none();
        assert!(facts.shell.is_none());
        assert!(facts.os.is_none());
        assert!(facts.arch.is_none());
        assert!(facts.is_root.is_none());
    }
}
