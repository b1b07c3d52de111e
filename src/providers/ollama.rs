use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use crate::model::Message;
use crate::providers::http_errors::{
    ChatFailure, classify_request_error, error_chain, status_failure,
};
use crate::request::ChatRequest;

/// Only `message` is read; Ollama's timing and token counters are ignored.
#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    message: Message,
}

pub fn chat_url(base_url: &str) -> String {
    let base = base_url.strip_suffix('/').unwrap_or(base_url);
    format!("{base}/api/chat")
}

/// Sends one chat request and always comes back with an assistant turn.
///
/// Failures are folded into the returned message. With `verbose` set, the
/// underlying error chain is also printed to stderr.
pub async fn chat_completion(
    client: &Client,
    base_url: &str,
    request: &ChatRequest,
    timeout: Duration,
    verbose: bool,
) -> Message {
    match try_chat(client, base_url, request, timeout).await {
        Ok(message) => message,
        Err(failure) => {
            warn!(
                model = %request.model,
                error = %failure,
                "ollama chat request failed"
            );
            if verbose {
                eprintln!("shellama: {failure}");
            }
            failure.to_reply()
        }
    }
}

async fn try_chat(
    client: &Client,
    base_url: &str,
    request: &ChatRequest,
    timeout: Duration,
) -> Result<Message, ChatFailure> {
    let api_url = chat_url(base_url);
    let timeout_secs = timeout.as_secs();
    debug!(
        api_url = %api_url,
        model = %request.model,
        message_count = request.messages.len(),
        timeout_secs,
        "sending ollama chat request"
    );

    let response = client
        .post(&api_url)
        .timeout(timeout)
        .json(request)
        .send()
        .await
        .map_err(|err| classify_request_error(&err, &api_url, timeout_secs))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|err| classify_request_error(&err, &api_url, timeout_secs))?;

    if !status.is_success() {
        debug!(
            api_url = %api_url,
            status = %status,
            response_body_len = body.len(),
            "ollama returned non-success status"
        );
        return Err(status_failure(&api_url, status.as_u16(), &body));
    }

    let parsed: OllamaChatResponse =
        serde_json::from_str(&body).map_err(|err| ChatFailure::Unexpected {
            detail: error_chain(&err),
        })?;
    debug!(
        model = %request.model,
        role = parsed.message.role.as_str(),
        response_len = parsed.message.content.len(),
        "received ollama chat response"
    );
    Ok(parsed.message)
}
