//! Post-processing of reply text for safe terminal display.

use crate::mode::Mode;
use std::env;
use std::io::{self, IsTerminal};
use termimad::MadSkin;

/// Drops every character outside the ASCII range. The shell integration
/// pastes this text into an editing buffer, which must never see bytes it
/// could mis-handle.
pub fn sanitize(text: &str) -> String {
    text.chars().filter(|c| c.is_ascii()).collect()
}

/// Prepares reply text for its mode. Every result, success or error,
/// passes through here before printing.
///
/// Generate mode additionally unwraps a fenced code block, since models
/// often wrap the bare command in one, and trims surrounding whitespace so
/// the output can be placed directly on the command line.
pub fn render(mode: Mode, text: &str) -> String {
    let clean = sanitize(text);
    match mode {
        // The longer fence forms must go first or they leave their
        // language tag behind.
        Mode::Generate => clean
            .replace("```bash", "")
            .replace("```zsh", "")
            .replace("```", "")
            .trim()
            .to_string(),
        Mode::Explain | Mode::Freestyle => clean,
    }
}

/// Prints rendered text to stdout.
///
/// Explanations aimed at an interactive terminal are laid out as Markdown;
/// piped output and the other modes stay byte-plain so the shell
/// integration can consume them verbatim.
pub fn emit(mode: Mode, text: &str) {
    if mode == Mode::Explain && stdout_is_rich() {
        let skin = markdown_skin();
        let rendered = sanitize(&skin.term_text(text).to_string());
        print!("{}", rendered);
        if !rendered.ends_with('\n') {
            println!();
        }
    } else {
        println!("{}", text);
    }
}

fn stdout_is_rich() -> bool {
    io::stdout().is_terminal() && env::var("TERM").map(|term| term != "dumb").unwrap_or(true)
}

/// Default skin with its decorations swapped for ASCII equivalents.
fn markdown_skin() -> MadSkin {
    let mut skin = MadSkin::default();
    skin.bullet.set_char('*');
    skin.quote_mark.set_char('>');
    skin.horizontal_rule.set_char('-');
    skin
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_strips_all_fence_forms() {
        assert_eq!(render(Mode::Generate, "```zsh\nls -la\n```"), "ls -la");
        assert_eq!(render(Mode::Generate, "```bash\nls\n```"), "ls");
        assert_eq!(render(Mode::Generate, "```\nls\n```"), "ls");
    }

    #[test]
    fn test_generate_trims_surrounding_whitespace() {
        assert_eq!(render(Mode::Generate, "  ls -la\n"), "ls -la");
    }

    #[test]
    fn test_generate_handles_unfenced_replies() {
        assert_eq!(render(Mode::Generate, "du -sh * | sort -h"), "du -sh * | sort -h");
    }

    #[test]
    fn test_non_ascii_is_removed_in_every_mode() {
        assert_eq!(render(Mode::Explain, "na\u{ef}ve \u{2192} smart"), "nave  smart");
        assert_eq!(render(Mode::Freestyle, "ok \u{2714}"), "ok ");
        assert_eq!(render(Mode::Generate, "ls \u{1f600}"), "ls");
    }

    #[test]
    fn test_freestyle_keeps_fences_and_whitespace() {
        assert_eq!(
            render(Mode::Freestyle, "```zsh\nls\n```"),
            "```zsh\nls\n```"
        );
        assert_eq!(render(Mode::Explain, " text ``` "), " text ``` ");
    }

    #[test]
    fn test_markdown_skin_uses_ascii_decorations() {
        let skin = markdown_skin();
        assert_eq!(skin.bullet.nude_char(), '*');
        assert_eq!(skin.quote_mark.nude_char(), '>');
        assert_eq!(skin.horizontal_rule.nude_char(), '-');
    }
}
