use anyhow::{Result, bail};
use serde::Serialize;

use crate::model::Message;

/// Body of a `POST /api/chat` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub stream: bool,
}

impl ChatRequest {
    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Result<Self> {
        let model = model.into();
        if model.trim().is_empty() {
            bail!("Model name must not be empty. Set `model` in the config file or MODEL.");
        }
        if messages.is_empty() {
            bail!("Chat request needs at least one message");
        }

        Ok(Self {
            model,
            messages,
            stream: false,
        })
    }
}
