//! Detection of composite timeline constructs: compare groups and assistant
//! tool-use chains.

use std::collections::{HashMap, HashSet};

use crate::conversation::{
    ConversationIndex, GroupMode, Message, MessageGroupMeta, Role, TokenUsage,
};

use super::item::{AssistantGroupItem, BranchInfo, GroupTurn};

/// A detected compare construct, before its columns are flattened.
#[derive(Debug)]
pub struct CompareSpec<'a> {
    /// Group id, or the compare-flagged parent's message id.
    pub id: &'a str,
    /// Set when the construct comes from group metadata rather than a
    /// parent's compare flag.
    pub group: Option<&'a str>,
    /// Column head messages, creation order.
    pub column_heads: Vec<&'a Message>,
}

/// Compare trigger at a popped position: the message itself names a
/// compare-mode group. Columns are all present members of that group,
/// wherever they sit in the tree.
///
/// Groups in `open` are already being materialized further up; their
/// members flatten as ordinary messages inside their column. Members in
/// `consumed` were already shown elsewhere; a trigger with no remaining
/// members does not fire.
pub fn detect_compare_at<'a>(
    message: &'a Message,
    index: &ConversationIndex<'a>,
    groups: &HashMap<String, MessageGroupMeta>,
    open: &HashSet<&'a str>,
    consumed: &HashSet<&'a str>,
) -> Option<CompareSpec<'a>> {
    let group_id = message.group_id.as_deref()?;
    if open.contains(group_id) {
        return None;
    }
    let meta = groups.get(group_id)?;
    if meta.mode != GroupMode::Compare {
        return None;
    }

    let members: Vec<&'a Message> = index
        .members_of_group(group_id)
        .into_iter()
        .filter(|member| !consumed.contains(member.id()))
        .collect();
    if members.is_empty() {
        return None;
    }
    Some(CompareSpec {
        id: group_id,
        group: Some(group_id),
        column_heads: members,
    })
}

/// Compare triggers among the children about to be expanded: any child
/// naming a compare-mode group, or the parent being a user message flagged
/// for comparison.
pub fn detect_compare_among<'a>(
    parent: &'a Message,
    children: &[&'a Message],
    index: &ConversationIndex<'a>,
    groups: &HashMap<String, MessageGroupMeta>,
    open: &HashSet<&'a str>,
    consumed: &HashSet<&'a str>,
) -> Option<CompareSpec<'a>> {
    if let Some(spec) = children
        .iter()
        .copied()
        .find_map(|child| detect_compare_at(child, index, groups, open, consumed))
    {
        return Some(spec);
    }

    if parent.role().canonical() == Role::User && parent.metadata.compare {
        let heads: Vec<&'a Message> = children
            .iter()
            .copied()
            .filter(|child| !consumed.contains(child.id()))
            .collect();
        if !heads.is_empty() {
            return Some(CompareSpec {
                id: parent.id(),
                group: None,
                column_heads: heads,
            });
        }
    }

    None
}

/// A maximal assistant/tool run rooted at an assistant message with tool
/// calls.
#[derive(Debug)]
pub struct AssistantChain<'a> {
    /// Absorbed messages in chain order; the first is the root assistant
    /// turn.
    pub members: Vec<&'a Message>,
    /// Final member; traversal resumes from its children.
    pub last: &'a Message,
}

impl<'a> AssistantChain<'a> {
    /// Shape the chain into its timeline item. Usage counters are summed
    /// over the assistant turns; tool results contribute their ids only.
    pub fn to_item(&self, branch: Option<BranchInfo>) -> AssistantGroupItem {
        let mut usage = TokenUsage::default();
        let mut turns = Vec::new();
        let mut member_ids = Vec::with_capacity(self.members.len());

        for message in &self.members {
            member_ids.push(message.id().to_string());
            if message.role().canonical() == Role::Assistant {
                if let Some(turn_usage) = message.metadata.usage {
                    usage.add(turn_usage);
                }
                turns.push(GroupTurn {
                    message_id: message.id().to_string(),
                    content: message.content.clone(),
                    tools: message.tools.clone(),
                });
            }
        }

        AssistantGroupItem {
            id: self
                .members
                .first()
                .copied()
                .unwrap_or(self.last)
                .id()
                .to_string(),
            turns,
            member_ids,
            usage,
            branch,
        }
    }
}

/// Absorb the maximal single-child assistant/tool run starting at
/// `message`.
///
/// The chain ends at a member with zero or multiple children (normal
/// resolution resumes there), and stops before a single child whose role
/// leaves the assistant/tool set or that was already shown elsewhere. An
/// assistant turn whose results never arrived still collapses into a chain
/// of length one.
pub fn collect_assistant_chain<'a>(
    message: &'a Message,
    index: &ConversationIndex<'a>,
    consumed: &HashSet<&'a str>,
) -> Option<AssistantChain<'a>> {
    if message.role().canonical() != Role::Assistant || message.tools.is_empty() {
        return None;
    }

    let mut members = vec![message];
    let mut last = message;
    loop {
        let children = index.child_messages(last.id());
        if children.len() != 1 {
            break;
        }
        let next = children[0];
        if !next.role().is_chainable() || consumed.contains(next.id()) {
            break;
        }
        members.push(next);
        last = next;
    }

    Some(AssistantChain { members, last })
}
