//! Timeline tests: worked conversation scenarios and flattening invariants.


use serde_json::json;

use crate::conversation::{Message, MessageGroupMeta, Role, ToolCall};
use crate::timeline::TimelineItem;
use std::collections::HashMap;

fn message(id: &str, parent: Option<&str>, role: Role, created_at: u64) -> Message {
    let mut message = Message::new(role, json!({ "text": id }));
    message.id = id.to_string();
    message.parent_id = parent.map(String::from);
    message.created_at = created_at;
    message.updated_at = created_at;
    message
}

fn user(id: &str, parent: Option<&str>, created_at: u64) -> Message {
    message(id, parent, Role::User, created_at)
}

fn assistant(id: &str, parent: Option<&str>, created_at: u64) -> Message {
    message(id, parent, Role::Assistant, created_at)
}

fn assistant_with_tools(
    id: &str,
    parent: Option<&str>,
    tool_ids: &[&str],
    created_at: u64,
) -> Message {
    message(id, parent, Role::Assistant, created_at).with_tools(
        tool_ids
            .iter()
            .map(|tool_id| ToolCall {
                id: (*tool_id).to_string(),
                name: "search".to_string(),
                arguments: json!({}),
                result_id: None,
            })
            .collect(),
    )
}

fn tool_result(id: &str, parent: Option<&str>, call_id: &str, created_at: u64) -> Message {
    let mut message = message(id, parent, Role::Tool, created_at);
    message.tool_call_id = Some(call_id.to_string());
    message
}

fn compare_groups(ids: &[&str]) -> HashMap<String, MessageGroupMeta> {
    ids.iter()
        .map(|id| ((*id).to_string(), MessageGroupMeta::compare(*id)))
        .collect()
}

fn no_groups() -> HashMap<String, MessageGroupMeta> {
    HashMap::new()
}

/// Every underlying message id surfaced by `items`: plain ids, absorbed
/// chain members, and compare-column contents. Synthetic compare ids are
/// not message emissions and are excluded.
fn surfaced_ids(items: &[TimelineItem], out: &mut Vec<String>) {
    for item in items {
        match item {
            TimelineItem::Message(message) => out.push(message.id.clone()),
            TimelineItem::AssistantGroup(group) => out.extend(group.member_ids.iter().cloned()),
            TimelineItem::Compare(compare) => {
                for column in &compare.columns {
                    surfaced_ids(&column.items, out);
                }
            }
        }
    }
}

fn ids_of(items: &[TimelineItem]) -> Vec<String> {
    let mut out = Vec::new();
    surfaced_ids(items, &mut out);
    out
}
