use reqwest::Client;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use crate::config::Config;
use crate::model::Message;
use crate::providers::ollama;
use crate::request::ChatRequest;

pub type ChatFuture<'a> = Pin<Box<dyn Future<Output = Message> + 'a>>;

/// Something that turns a chat request into an assistant turn.
///
/// Implementations never fail: transport problems come back as an assistant
/// message describing them.
pub trait ChatBackend {
    fn chat_completion<'a>(&'a self, request: &'a ChatRequest) -> ChatFuture<'a>;
}

impl<T> ChatBackend for &T
where
    T: ChatBackend + ?Sized,
{
    fn chat_completion<'a>(&'a self, request: &'a ChatRequest) -> ChatFuture<'a> {
        (**self).chat_completion(request)
    }
}

pub struct OllamaBackend<'a> {
    client: &'a Client,
    base_url: &'a str,
    timeout: Duration,
    verbose: bool,
}

impl<'a> OllamaBackend<'a> {
    pub fn new(client: &'a Client, cfg: &'a Config, verbose: bool) -> Self {
        Self {
            client,
            base_url: &cfg.base_url,
            timeout: cfg.timeout(),
            verbose,
        }
    }
}

impl ChatBackend for OllamaBackend<'_> {
    fn chat_completion<'a>(&'a self, request: &'a ChatRequest) -> ChatFuture<'a> {
        Box::pin(ollama::chat_completion(
            self.client,
            self.base_url,
            request,
            self.timeout,
            self.verbose,
        ))
    }
}

#[cfg(test)]
mod tests {
    use reqwest::Client;
    use std::net::TcpListener;
    use std::time::Duration;

    use super::{ChatBackend, OllamaBackend};
    use crate::config::Config;
    use crate::model::{Message, MessageRole};
    use crate::request::ChatRequest;

    #[test]
    fn backend_takes_url_and_timeout_from_config() {
        let client = Client::new();
        let cfg = Config {
            timeout_secs: 7,
            ..Config::default()
        };
        let backend = OllamaBackend::new(&client, &cfg, true);

        assert_eq!(backend.base_url, "http://localhost:11434");
        assert_eq!(backend.timeout, Duration::from_secs(7));
        assert!(backend.verbose);
    }

    #[tokio::test]
    async fn backend_resolves_unreachable_server_to_assistant_reply() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind should succeed");
        let addr = listener.local_addr().expect("address should be available");
        drop(listener);

        let client = Client::new();
        let cfg = Config {
            base_url: format!("http://{addr}"),
            timeout_secs: 2,
            ..Config::default()
        };
        let backend = OllamaBackend::new(&client, &cfg, false);
        let request = ChatRequest::new(cfg.model.clone(), vec![Message::system("sys")])
            .expect("request should build");

        let reply = backend.chat_completion(&request).await;
        assert_eq!(reply.role, MessageRole::Assistant);
        assert!(!reply.content.is_empty());
    }
}
