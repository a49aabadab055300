//! Turns a mode and the raw editor input into a prompt/system-message pair.

use crate::config::Config;
use crate::mode::Mode;
use crate::platform::EnvFacts;
use serde_json::Value;

/// What the request carries: the user prompt plus an optional out-of-band
/// system message.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltPrompt {
    pub prompt: String,
    pub system: Option<String>,
}

/// Builds the prompt pair for one invocation. Pure; all inputs come from
/// the caller.
///
/// The raw input is always forwarded verbatim as the prompt. The system
/// message depends on the mode: the command-oriented modes use a fixed
/// instruction decorated with environment facts, freestyle picks from the
/// pinned message, the configured override, or (on the very first call
/// only) the input itself.
pub fn build(
    mode: Mode,
    raw_input: &str,
    config: &Config,
    facts: &EnvFacts,
    prior_context: Option<&Value>,
    pinned: Option<&str>,
) -> BuiltPrompt {
    let system = match mode {
        Mode::Generate => Some(format!(
            "{} Please write a ZSH command that solves my query. \
             You should only output the completed command. \
             Do not include any explanation at all.",
            preamble(facts)
        )),
        Mode::Explain => Some(format!(
            "{} Please briefly explain how the given command works. \
             Be as concise as possible. Use Markdown syntax for formatting.",
            preamble(facts)
        )),
        Mode::Freestyle => {
            if config.constant_system && pinned.is_some() {
                pinned.map(str::to_string)
            } else if let Some(fixed) = config.freestyle_system.as_deref() {
                Some(fixed.to_string())
            } else if prior_context.is_none() {
                // First call of a conversation: the user's own message
                // doubles as the opening system message.
                Some(raw_input.to_string())
            } else {
                None
            }
        }
    };

    BuiltPrompt {
        prompt: raw_input.to_string(),
        system,
    }
}

/// Opening sentence shared by the command-oriented modes. Unknown facts
/// fall back to neutral wording; the missing root fact drops its sentence.
fn preamble(facts: &EnvFacts) -> String {
    let shell = facts.shell.as_deref().unwrap_or("ZSH");
    let os = facts.os.as_deref().unwrap_or("an unspecified OS");
    let arch = facts.arch.as_deref().unwrap_or("unknown");
    let mut text = format!(
        "You are a {} shell expert running on {} ({} architecture).",
        shell, os, arch
    );
    match facts.is_root {
        Some(true) => text.push_str(" The user is root."),
        Some(false) => text.push_str(" The user is not root."),
        None => {}
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SamplingOptions;
    use serde_json::json;
    use std::time::Duration;

    fn test_config() -> Config {
        Config {
            host: "localhost:11434".to_string(),
            model: "tinyllama".to_string(),
            timeout: Duration::from_secs(60),
            options: SamplingOptions::default(),
            use_context: true,
            debug: false,
            constant_system: false,
            freestyle_system: None,
        }
    }

    fn full_facts() -> EnvFacts {
        EnvFacts {
            shell: Some("zsh 5.9".to_string()),
            os: Some("Ubuntu 24.04.1 LTS".to_string()),
            arch: Some("x86_64".to_string()),
            is_root: Some(false),
        }
    }

    // =========================================================================
    // Command-oriented modes
    // =========================================================================

    #[test]
    fn test_generate_decorates_with_environment_facts() {
        let built = build(
            Mode::Generate,
            "list files by size",
            &test_config(),
            &full_facts(),
            None,
            None,
        );

        let system = built.system.unwrap();
        assert!(system.starts_with(
            "You are a zsh 5.9 shell expert running on Ubuntu 24.04.1 LTS \
             (x86_64 architecture). The user is not root."
        ));
        assert!(system.ends_with("Do not include any explanation at all."));
        assert_eq!(built.prompt, "list files by size");
    }

    #[test]
    fn test_generate_degrades_to_neutral_wording() {
        let built = build(
            Mode::Generate,
            "query",
            &test_config(),
            &EnvFacts::none(),
            None,
            None,
        );

        let system = built.system.unwrap();
        assert!(system.starts_with(
            "You are a ZSH shell expert running on an unspecified OS \
             (unknown architecture)."
        ));
        assert!(!system.contains("root"));
    }

    #[test]
    fn test_root_user_is_mentioned() {
        let facts = EnvFacts {
            is_root: Some(true),
            ..full_facts()
        };
        let built = build(Mode::Generate, "query", &test_config(), &facts, None, None);

        assert!(built.system.unwrap().contains("The user is root."));
    }

    #[test]
    fn test_explain_shares_preamble_and_asks_for_markdown() {
        let built = build(
            Mode::Explain,
            "tar -xzf archive.tar.gz",
            &test_config(),
            &full_facts(),
            None,
            None,
        );

        let system = built.system.unwrap();
        assert!(system.starts_with("You are a zsh 5.9 shell expert"));
        assert!(system.ends_with("Use Markdown syntax for formatting."));
        assert_eq!(built.prompt, "tar -xzf archive.tar.gz");
    }

    // =========================================================================
    // Freestyle system-message priority
    // =========================================================================

    #[test]
    fn test_freestyle_first_call_seeds_system_from_input() {
        let built = build(
            Mode::Freestyle,
            "You are my rubber duck.",
            &test_config(),
            &EnvFacts::none(),
            None,
            None,
        );

        assert_eq!(built.system.as_deref(), Some("You are my rubber duck."));
        assert_eq!(built.prompt, "You are my rubber duck.");
    }

    #[test]
    fn test_freestyle_later_calls_send_no_system() {
        let prior = json!([1, 2, 3]);
        let built = build(
            Mode::Freestyle,
            "and then?",
            &test_config(),
            &EnvFacts::none(),
            Some(&prior),
            None,
        );

        assert_eq!(built.system, None);
        assert_eq!(built.prompt, "and then?");
    }

    #[test]
    fn test_freestyle_configured_message_overrides_seeding() {
        let config = Config {
            freestyle_system: Some("Be terse.".to_string()),
            ..test_config()
        };
        let built = build(
            Mode::Freestyle,
            "hello",
            &config,
            &EnvFacts::none(),
            None,
            None,
        );

        assert_eq!(built.system.as_deref(), Some("Be terse."));
    }

    #[test]
    fn test_freestyle_pinned_message_wins_in_constant_mode() {
        let config = Config {
            constant_system: true,
            freestyle_system: Some("Be terse.".to_string()),
            ..test_config()
        };
        let built = build(
            Mode::Freestyle,
            "hello",
            &config,
            &EnvFacts::none(),
            Some(&json!([1])),
            Some("You are a pirate."),
        );

        assert_eq!(built.system.as_deref(), Some("You are a pirate."));
    }

    #[test]
    fn test_freestyle_pinned_message_ignored_without_constant_mode() {
        let built = build(
            Mode::Freestyle,
            "hello",
            &test_config(),
            &EnvFacts::none(),
            Some(&json!([1])),
            Some("You are a pirate."),
        );

        assert_eq!(built.system, None);
    }
}
