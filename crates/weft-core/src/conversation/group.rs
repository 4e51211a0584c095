use serde::{Deserialize, Serialize};

/// How the members of a message group are meant to be displayed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GroupMode {
    /// Members are shown side by side as columns.
    Compare,
    /// Modes this subsystem does not interpret.
    #[serde(other)]
    Unknown,
}

/// Metadata describing a message group, keyed by the `group_id` messages
/// carry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MessageGroupMeta {
    pub id: String,
    pub mode: GroupMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_message_id: Option<String>,
}

impl MessageGroupMeta {
    pub fn compare(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            mode: GroupMode::Compare,
            parent_message_id: None,
        }
    }
}
