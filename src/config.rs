use serde::Serialize;
use std::env;
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_HOST: &str = "localhost:11434";
pub const DEFAULT_MODEL: &str = "tinyllama";

/// Wall-clock budget for the single request. Fixed in the baseline; there is
/// deliberately no environment knob for it.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// How long the server should keep the model loaded after the call.
pub const KEEP_ALIVE: &str = "5m";

const ENV_HOST: &str = "ZSH_LLM_SUGGESTION_HOST";
const ENV_MODEL: &str = "ZSH_LLM_SUGGESTION_MODEL";
const ENV_NUM_CTX: &str = "ZSH_LLM_SUGGESTION_NUM_CTX";
const ENV_TEMPERATURE: &str = "ZSH_LLM_SUGGESTION_TEMPERATURE";
const ENV_TOP_K: &str = "ZSH_LLM_SUGGESTION_TOP_K";
const ENV_TOP_P: &str = "ZSH_LLM_SUGGESTION_TOP_P";
const ENV_REPEAT_PENALTY: &str = "ZSH_LLM_SUGGESTION_REPEAT_PENALTY";
const ENV_FREQUENCY_PENALTY: &str = "ZSH_LLM_SUGGESTION_FREQUENCY_PENALTY";
const ENV_PRESENCE_PENALTY: &str = "ZSH_LLM_SUGGESTION_PRESENCE_PENALTY";
const ENV_MIROSTAT: &str = "ZSH_LLM_SUGGESTION_MIROSTAT";
const ENV_MIROSTAT_TAU: &str = "ZSH_LLM_SUGGESTION_MIROSTAT_TAU";
const ENV_MIROSTAT_ETA: &str = "ZSH_LLM_SUGGESTION_MIROSTAT_ETA";
const ENV_STOP: &str = "ZSH_LLM_SUGGESTION_STOP";
const ENV_USE_CONTEXT: &str = "ZSH_LLM_SUGGESTION_USE_CONTEXT";
const ENV_DEBUG: &str = "ZSH_LLM_SUGGESTION_DEBUG";
const ENV_CONSTANT_SYSTEM: &str = "ZSH_LLM_SUGGESTION_CONSTANT_SYSTEM";
const ENV_FREESTYLE_SYSTEM: &str = "ZSH_LLM_SUGGESTION_FREESTYLE_SYSTEM";

/// Run parameters, resolved once per invocation from the process environment.
///
/// Every field has a default, so resolution never fails. A present but
/// malformed value is dropped (the server default applies) with a note at
/// debug level; nothing here can abort the run.
#[derive(Debug, Clone)]
pub struct Config {
    /// `host:port` of the inference server.
    pub host: String,
    /// Model identifier sent with every request.
    pub model: String,
    /// Per-call wall-clock timeout.
    pub timeout: Duration,
    /// Optional sampling parameters, forwarded only when set.
    pub options: SamplingOptions,
    /// Whether freestyle mode loads and persists conversation state.
    pub use_context: bool,
    /// Verbose diagnostics on stderr.
    pub debug: bool,
    /// Reuse the first freestyle system message on every later invocation.
    pub constant_system: bool,
    /// Fixed system message for freestyle mode, when non-empty.
    pub freestyle_system: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            host: env_string(ENV_HOST).unwrap_or_else(|| DEFAULT_HOST.to_string()),
            model: env_string(ENV_MODEL).unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            timeout: REQUEST_TIMEOUT,
            options: SamplingOptions::from_env(),
            use_context: env_flag(ENV_USE_CONTEXT, true),
            debug: debug_enabled(),
            constant_system: env_flag(ENV_CONSTANT_SYSTEM, false),
            freestyle_system: env_string(ENV_FREESTYLE_SYSTEM),
        }
    }
}

/// Sampling knobs forwarded to the server under the request's `options`
/// object. Each field is independently optional; absent fields are omitted
/// from the payload so the server default applies.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SamplingOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_ctx: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repeat_penalty: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mirostat: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mirostat_tau: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mirostat_eta: Option<f32>,
    /// The options schema takes an array of stop sequences; the single
    /// environment value is wrapped into one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<Vec<String>>,
}

impl SamplingOptions {
    fn from_env() -> Self {
        Self {
            num_ctx: env_parse(ENV_NUM_CTX),
            temperature: env_parse_f32(ENV_TEMPERATURE),
            top_k: env_parse(ENV_TOP_K),
            top_p: env_parse_f32(ENV_TOP_P),
            repeat_penalty: env_parse_f32(ENV_REPEAT_PENALTY),
            frequency_penalty: env_parse_f32(ENV_FREQUENCY_PENALTY),
            presence_penalty: env_parse_f32(ENV_PRESENCE_PENALTY),
            mirostat: env_parse(ENV_MIROSTAT),
            mirostat_tau: env_parse_f32(ENV_MIROSTAT_TAU),
            mirostat_eta: env_parse_f32(ENV_MIROSTAT_ETA),
            stop: env_string(ENV_STOP).map(|s| vec![s]),
        }
    }

    /// True when no knob is set, so the whole `options` object can be
    /// left out of the payload.
    pub fn is_empty(&self) -> bool {
        *self == SamplingOptions::default()
    }
}

/// Whether verbose diagnostics were requested. Readable standalone so the
/// logging subscriber can be initialized before the full configuration is
/// resolved (and its drop notes become visible).
pub fn debug_enabled() -> bool {
    env_flag(ENV_DEBUG, false)
}

fn env_string(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        if value.trim().is_empty() {
            None
        } else {
            Some(value)
        }
    })
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    let raw = env::var(key).ok()?;
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            debug!("dropping {}: {:?} cannot be parsed, server default applies", key, raw);
            None
        }
    }
}

// `f32::from_str` accepts "NaN" and "inf", which JSON cannot carry.
fn env_parse_f32(key: &str) -> Option<f32> {
    let value: f32 = env_parse(key)?;
    if value.is_finite() {
        Some(value)
    } else {
        debug!("dropping {}: non-finite values cannot be sent, server default applies", key);
        None
    }
}

fn env_flag(key: &str, default: bool) -> bool {
    let Ok(raw) = env::var(key) else {
        return default;
    };
    match raw.trim() {
        "1" | "true" | "yes" => true,
        "0" | "false" | "no" => false,
        "" => default,
        other => {
            debug!("dropping {}: {:?} is not a boolean toggle, keeping default", key, other);
            default
        }
    }
}
