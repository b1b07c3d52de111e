use crate::model::Message;

/// Conversation log for a single run.
///
/// Everything appended is kept; the window of `buffer_size` trailing turns is
/// applied only when the history is read back for a request. The system
/// message is always first.
#[derive(Debug, Clone)]
pub struct MessageBuffer {
    system_message: Message,
    messages: Vec<Message>,
    buffer_size: usize,
}

impl MessageBuffer {
    pub fn new(buffer_size: usize, system_message: Message) -> Self {
        Self {
            system_message,
            messages: Vec::new(),
            buffer_size,
        }
    }

    pub fn add_message(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn get_buffered_history(&self) -> Vec<Message> {
        let tail_start = self.messages.len().saturating_sub(self.buffer_size);
        let mut history = Vec::with_capacity(1 + self.messages.len() - tail_start);
        history.push(self.system_message.clone());
        history.extend_from_slice(&self.messages[tail_start..]);
        history
    }

    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    /// Number of stored non-system messages, including ones outside the window.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
