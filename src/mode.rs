//! Interaction modes and their behavior switches.

/// The three interaction styles the tool supports.
///
/// The mode selects the system-message template, decides whether conversation
/// state is carried across invocations, and controls how the reply is
/// post-processed before it reaches the terminal. One `Mode` value is picked
/// per invocation and handed to every component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Produce a single ready-to-run shell command.
    Generate,
    /// Produce a concise Markdown explanation of a command.
    Explain,
    /// Free-form chat; conversation state persists between runs.
    Freestyle,
}

impl Mode {
    /// Parses a mode keyword. Returns `None` for anything else.
    pub fn parse(word: &str) -> Option<Mode> {
        match word {
            "generate" => Some(Mode::Generate),
            "explain" => Some(Mode::Explain),
            "freestyle" => Some(Mode::Freestyle),
            _ => None,
        }
    }

    /// Splits raw CLI words into a mode and the remaining prompt words.
    ///
    /// The first word selects the mode when it matches a keyword; otherwise
    /// the whole word list is prompt text and the mode defaults to freestyle.
    pub fn split_args(words: &[String]) -> (Mode, &[String]) {
        match words.first().and_then(|w| Mode::parse(w)) {
            Some(mode) => (mode, &words[1..]),
            None => (Mode::Freestyle, words),
        }
    }

    /// Whether this mode carries conversation state across invocations.
    pub fn uses_context(self) -> bool {
        matches!(self, Mode::Freestyle)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Generate => "generate",
            Mode::Explain => "explain",
            Mode::Freestyle => "freestyle",
        }
    }
}
