//! The flatten pass: one ordered list out of a branching conversation tree.

use std::collections::{HashMap, HashSet, VecDeque};
use tracing::debug;

use crate::conversation::{ConversationIndex, Message, MessageGroupMeta};

use super::branch::{self, BranchOutcome};
use super::collect::{self, CompareSpec};
use super::item::{BranchInfo, CompareColumn, CompareItem, TimelineItem};
use super::transform;

/// Flatten `messages` into the ordered list of timeline items a renderer
/// walks top to bottom.
///
/// Pure and total: inputs are never mutated, malformed input degrades
/// locally (dangling references are skipped, stale branch indices clamped),
/// and identical input always yields an identical list. All working state
/// lives for this one call, so concurrent invocations are safe.
pub fn flatten(
    messages: &[Message],
    groups: &HashMap<String, MessageGroupMeta>,
) -> Vec<TimelineItem> {
    let index = ConversationIndex::build(messages);
    let seeds: Vec<&str> = index.roots().to_vec();
    debug!(
        target: "timeline::flatten",
        "flattening {} messages from {} roots",
        messages.len(),
        seeds.len()
    );

    let mut builder = FlatListBuilder {
        index: &index,
        groups,
        consumed: HashSet::new(),
        open_compares: HashSet::new(),
    };
    builder.run(&seeds).items
}

/// One position to continue from.
enum Work<'a> {
    /// Emit the message at this id, or the composite it starts.
    Visit {
        id: &'a str,
        branch: Option<BranchInfo>,
    },
    /// Materialize a compare construct detected while expanding a parent.
    Compare(CompareSpec<'a>),
}

struct RunOutput<'a> {
    items: Vec<TimelineItem>,
    /// The last message reached: where this run's traversal stopped.
    last_reached: Option<&'a str>,
}

struct FlatListBuilder<'a> {
    index: &'a ConversationIndex<'a>,
    groups: &'a HashMap<String, MessageGroupMeta>,
    /// Every message id already emitted somewhere, absorbed chain members
    /// and compare-column contents included. Nothing is emitted twice.
    consumed: HashSet<&'a str>,
    /// Compare groups currently being materialized. Their members flatten
    /// as ordinary messages inside their own columns.
    open_compares: HashSet<&'a str>,
}

impl<'a> FlatListBuilder<'a> {
    /// Process `seeds` and everything reachable from them, depth-first:
    /// a chosen child's whole subtree is appended before the next queued
    /// position.
    fn run(&mut self, seeds: &[&'a str]) -> RunOutput<'a> {
        let mut queue: VecDeque<Work<'a>> = seeds
            .iter()
            .copied()
            .map(|id| Work::Visit { id, branch: None })
            .collect();
        let mut items = Vec::new();
        let mut last_reached = None;

        while let Some(work) = queue.pop_front() {
            match work {
                Work::Visit { id, branch } => {
                    self.visit(id, branch, &mut items, &mut queue, &mut last_reached);
                }
                Work::Compare(spec) => {
                    self.materialize_compare(spec, &mut items, &mut queue, &mut last_reached);
                }
            }
        }

        RunOutput {
            items,
            last_reached,
        }
    }

    fn visit(
        &mut self,
        id: &'a str,
        branch: Option<BranchInfo>,
        items: &mut Vec<TimelineItem>,
        queue: &mut VecDeque<Work<'a>>,
        last_reached: &mut Option<&'a str>,
    ) {
        if self.consumed.contains(id) {
            return;
        }
        let Some(message) = self.index.message(id) else {
            debug!(target: "timeline::flatten", "skipping dangling reference {id}");
            return;
        };

        // Priority 1: the message itself names a compare group. The branch
        // annotation is dropped; compare absorbs its own branch semantics.
        if let Some(spec) = collect::detect_compare_at(
            message,
            self.index,
            self.groups,
            &self.open_compares,
            &self.consumed,
        ) {
            self.materialize_compare(spec, items, queue, last_reached);
            return;
        }

        // Priority 2: an assistant turn with tool calls starts a chain.
        if let Some(chain) = collect::collect_assistant_chain(message, self.index, &self.consumed)
        {
            for member in &chain.members {
                self.consumed.insert(member.id());
            }
            debug!(
                target: "timeline::flatten",
                "folded {} messages into assistant group {}",
                chain.members.len(),
                message.id()
            );
            items.push(TimelineItem::AssistantGroup(chain.to_item(branch)));
            *last_reached = Some(chain.last.id());
            self.descend(chain.last, queue);
            return;
        }

        // Priority 3: a plain message, then ordinary child resolution.
        self.consumed.insert(message.id());
        items.push(TimelineItem::Message(transform::plain_item(message, branch)));
        *last_reached = Some(message.id());
        self.descend(message, queue);
    }

    /// Queue whatever continues the conversation below `parent`.
    fn descend(&mut self, parent: &'a Message, queue: &mut VecDeque<Work<'a>>) {
        let children = self.index.child_messages(parent.id());
        if children.is_empty() {
            return;
        }

        // Compare constructs win over branch selection.
        if let Some(spec) = collect::detect_compare_among(
            parent,
            &children,
            self.index,
            self.groups,
            &self.open_compares,
            &self.consumed,
        ) {
            queue.push_front(Work::Compare(spec));
            return;
        }

        match branch::resolve(parent, &children) {
            BranchOutcome::Follow { index, annotate } => {
                let branch = annotate.then(|| BranchInfo {
                    count: children.len(),
                    active_index: index,
                });
                queue.push_front(Work::Visit {
                    id: children[index].id(),
                    branch,
                });
            }
            BranchOutcome::FanOut => {
                for child in children.iter().rev() {
                    queue.push_front(Work::Visit {
                        id: child.id(),
                        branch: None,
                    });
                }
            }
            BranchOutcome::Halt => {
                debug!(
                    target: "timeline::flatten",
                    "halting below {}: active branch not yet materialized",
                    parent.id()
                );
            }
        }
    }

    /// Build a compare item from `spec` and queue its continuation.
    ///
    /// Columns already shown elsewhere are dropped; when none remain the
    /// construct vanishes and traversal simply moves on.
    fn materialize_compare(
        &mut self,
        spec: CompareSpec<'a>,
        items: &mut Vec<TimelineItem>,
        queue: &mut VecDeque<Work<'a>>,
        last_reached: &mut Option<&'a str>,
    ) {
        let heads: Vec<&'a Message> = spec
            .column_heads
            .iter()
            .copied()
            .filter(|head| !self.consumed.contains(head.id()))
            .collect();
        let Some(first) = heads.first() else {
            return;
        };

        let active_id = heads
            .iter()
            .find(|head| head.metadata.active_column)
            .unwrap_or(first)
            .id();

        if let Some(group) = spec.group {
            self.open_compares.insert(group);
        }

        // Each column is an independent sub-run sharing the consumed set,
        // so a column may itself contain groups or nested compares.
        let mut columns = Vec::with_capacity(heads.len());
        let mut active_tail = None;
        for head in &heads {
            let column = self.run(&[head.id()]);
            if head.id() == active_id {
                active_tail = column.last_reached;
            }
            columns.push(CompareColumn {
                id: head.id().to_string(),
                items: column.items,
            });
        }

        if let Some(group) = spec.group {
            self.open_compares.remove(group);
        }

        debug!(
            target: "timeline::flatten",
            "compare {} with {} columns, active {}",
            spec.id,
            columns.len(),
            active_id
        );
        items.push(TimelineItem::Compare(CompareItem {
            id: spec.id.to_string(),
            columns,
            active_column_id: active_id.to_string(),
        }));

        // Traversal resumes wherever the active column stopped.
        if let Some(tail_id) = active_tail {
            *last_reached = Some(tail_id);
            if let Some(tail) = self.index.message(tail_id) {
                self.descend(tail, queue);
            }
        }
    }
}
