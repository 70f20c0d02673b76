//! 记忆层：编排器会话历史

pub mod conversation;

pub use conversation::{ConversationMemory, Message, Role};
