use anyhow::{Context, Result};
use std::io::Write;
use tracing::debug;

use crate::buffer::MessageBuffer;
use crate::config::Config;
use crate::gateway::ChatBackend;
use crate::model::Message;
use crate::request::ChatRequest;
use crate::role::{HostEnvironment, Role};

/// One prompt/answer exchange with the model.
pub struct Session<'a, B> {
    cfg: &'a Config,
    backend: B,
    buffer: MessageBuffer,
    verbose: bool,
}

impl<'a, B> Session<'a, B>
where
    B: ChatBackend,
{
    pub fn new(
        cfg: &'a Config,
        backend: B,
        role: Role,
        host: &HostEnvironment,
        verbose: bool,
    ) -> Self {
        let system_message = Message::system(role.system_prompt(host));
        debug!(
            role = role.as_str(),
            os = %host.os,
            shell = %host.shell,
            buffer_size = cfg.buffer_size,
            "starting chat session"
        );

        Self {
            cfg,
            backend,
            buffer: MessageBuffer::new(cfg.buffer_size, system_message),
            verbose,
        }
    }

    pub fn history(&self) -> Vec<Message> {
        self.buffer.get_buffered_history()
    }

    /// Sends `user_input`, prints the answer to `out` and records it.
    ///
    /// Chat failures arrive as ordinary assistant turns, so the only errors
    /// here are a bad model name and a failing writer.
    pub async fn run_turn(&mut self, user_input: &str, out: &mut impl Write) -> Result<Message> {
        self.buffer.add_message(Message::user(user_input));
        let history = self.buffer.get_buffered_history();
        if self.verbose {
            print_history(out, &history)?;
        }

        let request = ChatRequest::new(self.cfg.model.clone(), history)?;
        let reply = self.backend.chat_completion(&request).await;

        writeln!(out, "{}", reply.content.trim()).context("Failed to write reply")?;
        out.flush().context("Failed to flush output")?;
        self.buffer.add_message(reply.clone());
        Ok(reply)
    }
}

/// Trimmed piped text followed by the prompt arguments, separated by one space.
pub fn compose_user_input(stdin: Option<&str>, args: &[String]) -> String {
    let piped = stdin.map(str::trim).unwrap_or_default();
    let typed = args.join(" ");
    [piped, typed.as_str()]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn print_history(out: &mut impl Write, history: &[Message]) -> Result<()> {
    for (idx, msg) in history.iter().enumerate() {
        writeln!(out, "[{}] {}: {}", idx, msg.role.as_str(), msg.content)
            .context("Failed to write history")?;
    }
    writeln!(out).context("Failed to write history")?;
    Ok(())
}
