//! Render-ready items produced by the flatten pass.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::conversation::{Role, TokenUsage, ToolCall};

/// How many siblings exist at a branch point and which one is shown.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct BranchInfo {
    pub count: usize,
    pub active_index: usize,
}

/// A plain conversation message, shaped for rendering.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MessageItem {
    pub id: String,
    pub role: Role,
    pub content: Value,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    #[serde(default)]
    pub collapsed: bool,
    pub created_at: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<BranchInfo>,
}

/// One assistant turn absorbed into an assistant group.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GroupTurn {
    pub message_id: String,
    pub content: Value,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolCall>,
}

/// An assistant message folded together with its tool results and any
/// single-child assistant/tool continuation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssistantGroupItem {
    /// Id of the first message in the chain.
    pub id: String,
    pub turns: Vec<GroupTurn>,
    /// Every absorbed message id, assistant and tool alike, in chain order.
    pub member_ids: Vec<String>,
    pub usage: TokenUsage,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<BranchInfo>,
}

impl AssistantGroupItem {
    /// Underlying message ids belonging to this group, tool results
    /// included. Hosts cascade bulk operations (deletes) over these.
    pub fn message_ids(&self) -> &[String] {
        &self.member_ids
    }
}

/// One fully flattened alternative inside a compare item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompareColumn {
    /// Id of the column's head message.
    pub id: String,
    pub items: Vec<TimelineItem>,
}

/// Sibling alternatives shown side by side, one column visible.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompareItem {
    /// Group id, or the compare-flagged parent's message id.
    pub id: String,
    pub columns: Vec<CompareColumn>,
    pub active_column_id: String,
}

/// A single entry in the flattened conversation timeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TimelineItem {
    Message(MessageItem),
    AssistantGroup(AssistantGroupItem),
    Compare(CompareItem),
}

impl TimelineItem {
    /// Get the identifier for this item
    pub fn id(&self) -> &str {
        match self {
            TimelineItem::Message(item) => &item.id,
            TimelineItem::AssistantGroup(item) => &item.id,
            TimelineItem::Compare(item) => &item.id,
        }
    }

    /// Role label the renderer dispatches on.
    pub fn role_name(&self) -> &'static str {
        match self {
            TimelineItem::Message(item) => match item.role.canonical() {
                Role::User => "user",
                Role::Assistant | Role::Agent => "assistant",
                Role::Tool => "tool",
            },
            TimelineItem::AssistantGroup(_) => "assistant_group",
            TimelineItem::Compare(_) => "compare",
        }
    }

    /// Branch annotation, if this item sits at a branch point.
    pub fn branch(&self) -> Option<BranchInfo> {
        match self {
            TimelineItem::Message(item) => item.branch,
            TimelineItem::AssistantGroup(item) => item.branch,
            TimelineItem::Compare(_) => None,
        }
    }
}
