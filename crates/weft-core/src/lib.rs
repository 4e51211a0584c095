// Conversation timeline shaping, free of UI and persistence dependencies.

pub mod conversation;
pub mod timeline;

pub use conversation::{
    ConversationIndex, GroupMode, Message, MessageGroupMeta, MessageMetadata, Role, TokenUsage,
    ToolCall, UnknownRoleError,
};
pub use timeline::{
    AssistantGroupItem, BranchInfo, CompareColumn, CompareItem, GroupTurn, MessageItem,
    TimelineItem, flatten,
};
