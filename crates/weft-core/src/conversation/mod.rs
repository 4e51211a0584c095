//! Source data model: messages, compare-group metadata, and the derived
//! lookup tables one flatten pass reads.

mod group;
mod index;
mod message;

pub use group::{GroupMode, MessageGroupMeta};
pub use index::ConversationIndex;
pub use message::{Message, MessageMetadata, Role, TokenUsage, ToolCall, UnknownRoleError};
