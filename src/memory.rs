use tracing::info;

use crate::message::Message;

/// Conversation buffer: every human query and final answer, in call order.
///
/// Append-only apart from [`ConversationMemory::clear`]. There is no capacity
/// bound or eviction; long sessions grow without limit.
#[derive(Debug, Default, Clone)]
pub struct ConversationMemory {
    turns: Vec<Message>,
}

impl ConversationMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, turn: Message) {
        self.turns.push(turn);
    }

    /// Read-only view in insertion order.
    pub fn history(&self) -> &[Message] {
        &self.turns
    }

    pub fn clear(&mut self) {
        let dropped = self.turns.len();
        self.turns.clear();
        info!(dropped, "Memory cleared");
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::MessageRole;

    #[test]
    fn history_keeps_insertion_order() {
        let mut memory = ConversationMemory::new();
        memory.append(Message::human("first"));
        memory.append(Message::assistant("second"));
        memory.append(Message::human("third"));

        let contents: Vec<_> = memory.history().iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, ["first", "second", "third"]);
        assert_eq!(memory.history()[1].role, MessageRole::Assistant);
    }

    #[test]
    fn clear_empties_regardless_of_length() {
        let mut memory = ConversationMemory::new();
        for i in 0..50 {
            memory.append(Message::human(format!("turn {i}")));
        }
        memory.clear();
        assert!(memory.is_empty());
        assert!(memory.history().is_empty());

        // clearing an empty buffer is fine too
        memory.clear();
        assert_eq!(memory.len(), 0);
    }
}
