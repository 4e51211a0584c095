//! Message types for conversation representation.
//!
//! A conversation is handed to this crate as a flat array of `Message`
//! records linked into a tree by `parent_id`. Nothing here is interpreted
//! beyond what the flattener needs: roles, tool-call linkage, branch and
//! compare metadata, and creation order.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};
use strum_macros::Display;

/// Role in the conversation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    /// Emitted by some backends in place of `assistant`; treated identically
    /// for branching and grouping.
    Agent,
    Tool,
}

impl Role {
    /// Collapse synonyms onto the role the renderer dispatches on.
    pub fn canonical(self) -> Role {
        match self {
            Role::Agent => Role::Assistant,
            other => other,
        }
    }

    /// Roles that participate in branch selection.
    pub(crate) fn is_branchable(self) -> bool {
        matches!(self.canonical(), Role::User | Role::Assistant)
    }

    /// Roles a tool-use chain may absorb.
    pub(crate) fn is_chainable(self) -> bool {
        matches!(self.canonical(), Role::Assistant | Role::Tool)
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRoleError(String);

impl FromStr for Role {
    type Err = UnknownRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            "agent" => Ok(Role::Agent),
            "tool" => Ok(Role::Tool),
            other => Err(UnknownRoleError(other.to_string())),
        }
    }
}

/// A single tool invocation attached to an assistant message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: Value,
    /// Id of the tool-result message this invocation expects, once known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_id: Option<String>,
}

/// Input/output token counters carried on assistant turns.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl TokenUsage {
    pub fn new(input_tokens: u64, output_tokens: u64) -> Self {
        Self {
            input_tokens,
            output_tokens,
        }
    }

    pub fn add(&mut self, other: TokenUsage) {
        self.input_tokens = self.input_tokens.saturating_add(other.input_tokens);
        self.output_tokens = self.output_tokens.saturating_add(other.output_tokens);
    }
}

/// Free-form per-message bag. Only the typed fields are interpreted by the
/// flattener; everything else rides along in `extra`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MessageMetadata {
    /// Which child continues the conversation at a branch point. An index
    /// one past the last child marks a branch being created but not yet
    /// materialized.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_branch_index: Option<usize>,
    /// Marks the visible column of a compare group.
    #[serde(default)]
    pub active_column: bool,
    /// On a user message: show its children side by side.
    #[serde(default)]
    pub compare: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
    #[serde(default)]
    pub collapsed: bool,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// A node in the conversation tree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub role: Role,
    /// Opaque payload; rendered downstream, never interpreted here.
    #[serde(default)]
    pub content: Value,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolCall>,
    /// Present on tool-role messages, correlating the result back to an
    /// invocation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    /// Membership in a message group (compare columns).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    #[serde(default)]
    pub metadata: MessageMetadata,
    pub created_at: u64,
    #[serde(default)]
    pub updated_at: u64,
}

impl Message {
    /// Create a message with a fresh id and current timestamps.
    pub fn new(role: Role, content: Value) -> Self {
        let now = Self::current_timestamp();
        Self {
            id: Self::generate_id(&role.to_string()),
            parent_id: None,
            role,
            content,
            tools: Vec::new(),
            tool_call_id: None,
            group_id: None,
            metadata: MessageMetadata::default(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn user(content: Value) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: Value) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// A tool-result message correlated back to the invocation that
    /// produced it.
    pub fn tool(content: Value, tool_call_id: impl Into<String>) -> Self {
        let mut message = Self::new(Role::Tool, content);
        message.tool_call_id = Some(tool_call_id.into());
        message
    }

    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    pub fn with_tools(mut self, tools: Vec<ToolCall>) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_group(mut self, group_id: impl Into<String>) -> Self {
        self.group_id = Some(group_id.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn parent_id(&self) -> Option<&str> {
        self.parent_id.as_deref()
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Helper to get current timestamp (unix milliseconds)
    pub fn current_timestamp() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }

    /// Helper to generate unique IDs
    pub fn generate_id(prefix: &str) -> String {
        format!("{}_{}", prefix, uuid::Uuid::now_v7())
    }
}
