use serde::Deserialize;
use std::error::Error as StdError;
use std::fmt;
use std::io::ErrorKind;

use crate::model::Message;

pub(crate) const TIMEOUT_REPLY: &str =
    "Sorry, the model did not answer in time. Try again, or raise `timeout` in your config.";
pub(crate) const UNEXPECTED_REPLY: &str =
    "Sorry, something went wrong while reading the model's reply.";

/// Why a chat call produced no model answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ChatFailure {
    Timeout {
        api_url: String,
        timeout_secs: u64,
    },
    ConnectionRefused {
        api_url: String,
    },
    Connect {
        api_url: String,
    },
    Status {
        api_url: String,
        status: u16,
        detail: String,
    },
    Transport {
        api_url: String,
        detail: String,
    },
    Unexpected {
        detail: String,
    },
}

impl fmt::Display for ChatFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout {
                api_url,
                timeout_secs,
            } => write!(f, "request to '{api_url}' timed out after {timeout_secs}s"),
            Self::ConnectionRefused { api_url } => {
                write!(f, "connection refused by '{api_url}'")
            }
            Self::Connect { api_url } => write!(f, "failed to connect to '{api_url}'"),
            Self::Status {
                api_url,
                status,
                detail,
            } => write!(f, "'{api_url}' returned status {status}: {detail}"),
            Self::Transport { api_url, detail } => {
                write!(f, "request to '{api_url}' failed: {detail}")
            }
            Self::Unexpected { detail } => write!(f, "unexpected chat response: {detail}"),
        }
    }
}

impl StdError for ChatFailure {}

impl ChatFailure {
    /// The assistant turn shown to the user in place of a model answer.
    pub(crate) fn to_reply(&self) -> Message {
        let content = match self {
            Self::Timeout { .. } => TIMEOUT_REPLY.to_string(),
            Self::ConnectionRefused { api_url } => format!(
                "Sorry, the model server at '{api_url}' refused the connection. \
                 Make sure Ollama is running and `base_url` is correct."
            ),
            Self::Connect { api_url } => format!(
                "Sorry, I could not connect to the model server at '{api_url}'. \
                 Check `base_url` and your network connection."
            ),
            Self::Status { status, detail, .. } => {
                format!("Sorry, the model server answered with status {status}: {detail}")
            }
            Self::Transport { api_url, detail } => {
                format!("Sorry, the request to '{api_url}' failed: {detail}")
            }
            Self::Unexpected { .. } => UNEXPECTED_REPLY.to_string(),
        };
        Message::assistant(content)
    }
}

#[derive(Debug, Deserialize)]
struct ServerError {
    error: String,
}

/// Ollama reports failures as `{"error": "..."}`; fall back to the raw body.
pub(crate) fn status_failure(api_url: &str, status: u16, body: &str) -> ChatFailure {
    let detail = serde_json::from_str::<ServerError>(body)
        .map(|parsed| parsed.error)
        .unwrap_or_else(|_| body.trim().to_string());
    let detail = if detail.is_empty() {
        "<empty response body>".to_string()
    } else {
        detail
    };

    ChatFailure::Status {
        api_url: api_url.to_string(),
        status,
        detail,
    }
}

pub(crate) fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut parts = Vec::new();
    let mut current: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(source) = current {
        let text = source.to_string();
        if !parts.contains(&text) {
            parts.push(text);
        }
        current = source.source();
    }
    parts.join(": ")
}

fn error_chain_has_connection_refused(err: &(dyn StdError + 'static)) -> bool {
    let mut current: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(source) = current {
        if let Some(io_err) = source.downcast_ref::<std::io::Error>()
            && io_err.kind() == ErrorKind::ConnectionRefused
        {
            return true;
        }

        if source
            .to_string()
            .to_ascii_lowercase()
            .contains("connection refused")
        {
            return true;
        }

        current = source.source();
    }

    false
}

fn error_chain_has_timeout(err: &(dyn StdError + 'static)) -> bool {
    let mut current: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(source) = current {
        if let Some(io_err) = source.downcast_ref::<std::io::Error>()
            && io_err.kind() == ErrorKind::TimedOut
        {
            return true;
        }

        if source
            .to_string()
            .to_ascii_lowercase()
            .contains("timed out")
        {
            return true;
        }

        current = source.source();
    }

    false
}

pub(crate) fn classify_request_error(
    err: &reqwest::Error,
    api_url: &str,
    timeout_secs: u64,
) -> ChatFailure {
    if err.is_timeout() || error_chain_has_timeout(err) {
        return ChatFailure::Timeout {
            api_url: api_url.to_string(),
            timeout_secs,
        };
    }

    if err.is_connect() {
        if error_chain_has_connection_refused(err) {
            return ChatFailure::ConnectionRefused {
                api_url: api_url.to_string(),
            };
        }

        return ChatFailure::Connect {
            api_url: api_url.to_string(),
        };
    }

    if err.is_decode() {
        return ChatFailure::Unexpected {
            detail: error_chain(err),
        };
    }

    ChatFailure::Transport {
        api_url: api_url.to_string(),
        detail: error_chain(err),
    }
}
