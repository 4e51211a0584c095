//! Shaping of raw messages into render-ready items.

use crate::conversation::Message;

use super::item::{BranchInfo, MessageItem};

/// Shape `message` into a plain timeline item.
///
/// Pure mapping: role synonyms are canonicalized, payloads and tool
/// references pass through unchanged, and no child or sibling is ever
/// consulted. Positional decisions belong to the builder.
pub fn plain_item(message: &Message, branch: Option<BranchInfo>) -> MessageItem {
    MessageItem {
        id: message.id().to_string(),
        role: message.role().canonical(),
        content: message.content.clone(),
        tools: message.tools.clone(),
        tool_call_id: message.tool_call_id.clone(),
        collapsed: message.metadata.collapsed,
        created_at: message.created_at,
        branch,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::Role;
    use serde_json::json;

    #[test]
    fn test_plain_item_canonicalizes_role() {
        let message = Message::new(Role::Agent, json!("hello"));
        let item = plain_item(&message, None);

        assert_eq!(item.role, Role::Assistant);
        assert_eq!(item.content, json!("hello"));
        assert_eq!(item.branch, None);
    }

    #[test]
    fn test_plain_item_carries_branch_annotation() {
        let message = Message::new(Role::User, json!("hi"));
        let item = plain_item(
            &message,
            Some(BranchInfo {
                count: 3,
                active_index: 1,
            }),
        );

        assert_eq!(
            item.branch,
            Some(BranchInfo {
                count: 3,
                active_index: 1
            })
        );
    }
}
