use anyhow::Context as _;
use clap::{Arg, Command};
use std::io::{self, BufRead, IsTerminal, Read};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use zsh_llm_suggest::client::OllamaClient;
use zsh_llm_suggest::config::{self, Config};
use zsh_llm_suggest::context_store::ContextStore;
use zsh_llm_suggest::mode::Mode;
use zsh_llm_suggest::platform::EnvFacts;
use zsh_llm_suggest::{prompt, render};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // The debug toggle has to be read before the rest of the configuration,
    // or the subscriber would miss the resolver's own drop notes.
    init_tracing(config::debug_enabled());
    let config = Config::from_env();

    let matches = Command::new("zsh-llm-suggest")
        .about("LLM-backed suggestions for the zsh command line")
        .long_about(
            "Sends the editing buffer to a local inference server and prints \
             the reply: a ready-to-run command (generate), a Markdown \
             explanation (explain), or free-form chat with memory (freestyle).",
        )
        .arg(
            Arg::new("words")
                .help("Mode (generate, explain, freestyle) followed by the query")
                .num_args(0..)
                .trailing_var_arg(true)
                .allow_hyphen_values(true),
        )
        .get_matches();

    let words: Vec<String> = matches
        .get_many::<String>("words")
        .unwrap_or_default()
        .map(|s| s.to_string())
        .collect();
    let (mode, rest) = Mode::split_args(&words);

    let input = gather_input(rest)?;
    if input.is_empty() {
        eprintln!("Nothing to send: provide a query as arguments or on stdin.");
        return Ok(());
    }
    debug!("mode {} with {} input bytes", mode.as_str(), input.len());

    let store = ContextStore::open_default();
    let facts = match mode {
        Mode::Generate | Mode::Explain => EnvFacts::probe(),
        Mode::Freestyle => EnvFacts::none(),
    };
    let pinned = if mode == Mode::Freestyle && config.constant_system {
        store.pinned_system_message()
    } else {
        None
    };
    let prior = if mode.uses_context() && config.use_context {
        store.load()
    } else {
        None
    };

    let built = prompt::build(mode, &input, &config, &facts, prior.as_ref(), pinned.as_deref());

    if mode == Mode::Freestyle && config.constant_system && pinned.is_none() {
        if let Some(system) = built.system.as_deref() {
            if let Err(e) = store.pin_system_message(system) {
                warn!("could not pin the system message: {}", e);
            }
        }
    }

    let client = OllamaClient::new(&config);
    let text = match client
        .send(&built.prompt, built.system.as_deref(), prior.as_ref())
        .await
    {
        Ok(reply) => {
            if mode.uses_context() && config.use_context {
                if let Err(e) = store.save(reply.context.as_ref()) {
                    warn!("could not persist the conversation context: {}", e);
                }
            }
            reply.text
        }
        // Error text becomes the result; the shell widget shows it in place
        // of a suggestion and the process still exits cleanly.
        Err(error) => error.to_string(),
    };

    render::emit(mode, &render::render(mode, &text));
    Ok(())
}

fn init_tracing(debug: bool) {
    let default = if debug { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Assembles the query from the argument words, piped stdin, or an
/// interactive line, in that order of preference. Piped text is appended
/// below the argument words when both are present.
fn gather_input(words: &[String]) -> anyhow::Result<String> {
    let mut input = words.join(" ");

    let stdin = io::stdin();
    if !stdin.is_terminal() {
        let mut piped = String::new();
        stdin
            .lock()
            .read_to_string(&mut piped)
            .context("failed to read from stdin")?;
        let piped = piped.trim();
        if !piped.is_empty() {
            if input.is_empty() {
                input = piped.to_string();
            } else {
                input = format!("{}\n{}", input, piped);
            }
        }
    } else if input.trim().is_empty() {
        eprint!("> ");
        let mut line = String::new();
        stdin
            .lock()
            .read_line(&mut line)
            .context("failed to read from the terminal")?;
        input = line;
    }

    Ok(input.trim().to_string())
}
