//! Derived lookup tables for one flatten pass.

use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};
use tracing::debug;

use super::message::Message;

/// Read-only indices over a flat message array: id lookup, parent-ordered
/// children, and group membership.
///
/// Built once per pass and dropped with it; the source slice is never
/// mutated. Dangling references are tolerated here and skipped by callers.
#[derive(Debug)]
pub struct ConversationIndex<'a> {
    messages: HashMap<&'a str, &'a Message>,
    children: IndexMap<Option<&'a str>, Vec<&'a str>>,
    group_members: HashMap<&'a str, Vec<&'a str>>,
}

impl<'a> ConversationIndex<'a> {
    pub fn build(source: &'a [Message]) -> Self {
        let mut messages: HashMap<&str, &Message> = HashMap::with_capacity(source.len());
        let mut ordered: Vec<&Message> = Vec::with_capacity(source.len());
        let mut seen: HashSet<&str> = HashSet::with_capacity(source.len());

        for message in source {
            if seen.insert(message.id()) {
                messages.insert(message.id(), message);
                ordered.push(message);
            } else {
                debug!(
                    target: "conversation::index",
                    "duplicate message id {}, keeping the first occurrence",
                    message.id()
                );
            }
        }

        // Stable sort: input order breaks creation-time ties.
        ordered.sort_by_key(|message| message.created_at);

        let mut children: IndexMap<Option<&str>, Vec<&str>> = IndexMap::new();
        let mut group_members: HashMap<&str, Vec<&str>> = HashMap::new();
        for message in &ordered {
            children
                .entry(message.parent_id())
                .or_insert_with(Vec::new)
                .push(message.id());
            if let Some(group_id) = message.group_id.as_deref() {
                group_members
                    .entry(group_id)
                    .or_insert_with(Vec::new)
                    .push(message.id());
            }
        }

        Self {
            messages,
            children,
            group_members,
        }
    }

    pub fn message(&self, id: &str) -> Option<&'a Message> {
        self.messages.get(id).copied()
    }

    /// Root ids (no parent), in creation order.
    pub fn roots(&self) -> &[&'a str] {
        self.children.get(&None).map_or(&[][..], Vec::as_slice)
    }

    /// Child ids of `parent`, in creation order.
    pub fn children_of(&self, parent: &'a str) -> &[&'a str] {
        self.children
            .get(&Some(parent))
            .map_or(&[][..], Vec::as_slice)
    }

    /// Existing child messages of `parent`, in creation order.
    pub fn child_messages(&self, parent: &'a str) -> Vec<&'a Message> {
        self.children_of(parent)
            .iter()
            .filter_map(|id| self.message(id))
            .collect()
    }

    /// All present members of `group_id`, in creation order, regardless of
    /// where they sit in the tree.
    pub fn members_of_group(&self, group_id: &str) -> Vec<&'a Message> {
        self.group_members
            .get(group_id)
            .map_or(&[][..], Vec::as_slice)
            .iter()
            .filter_map(|id| self.message(id))
            .collect()
    }
}
