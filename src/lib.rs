//! zsh-llm-suggest - LLM-backed suggestions for the zsh command line.
//!
//! This library implements the core of a shell-editor helper: each process
//! invocation turns the editing buffer into exactly one request against a
//! local inference server and prints the reply for the shell integration to
//! pick up. It supports:
//!
//! - **Command generation** from a natural-language query
//! - **Command explanation** rendered as Markdown
//! - **Freestyle chat** with conversation state persisted across invocations
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`mode`] - The three interaction modes and argument splitting
//! - [`config`] - Environment-driven configuration with per-parameter defaults
//! - [`platform`] - Best-effort probes of shell, OS, architecture and user
//! - [`context_store`] - Conversation state persisted under the home directory
//! - [`prompt`] - Per-mode prompt and system-message construction
//! - [`client`] - The single HTTP request and its error taxonomy
//! - [`render`] - Fence stripping, ASCII filtering and terminal output
//!
//! # Example
//!
//! ```ignore
//! use zsh_llm_suggest::client::OllamaClient;
//! use zsh_llm_suggest::config::Config;
//! use zsh_llm_suggest::mode::Mode;
//! use zsh_llm_suggest::platform::EnvFacts;
//! use zsh_llm_suggest::{prompt, render};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = Config::from_env();
//!     let built = prompt::build(
//!         Mode::Generate,
//!         "list the five largest files",
//!         &config,
//!         &EnvFacts::probe(),
//!         None,
//!         None,
//!     );
//!
//!     let client = OllamaClient::new(&config);
//!     let text = match client.send(&built.prompt, built.system.as_deref(), None).await {
//!         Ok(reply) => reply.text,
//!         Err(error) => error.to_string(),
//!     };
//!     println!("{}", render::render(Mode::Generate, &text));
//! }
//! ```
//!
//! Failures never panic and never change the exit code: error text flows
//! through the same rendering path as a normal reply, so the shell widget
//! always has something sensible to display.

pub mod client;
pub mod config;
pub mod context_store;
pub mod mode;
pub mod platform;
pub mod prompt;
pub mod render;
