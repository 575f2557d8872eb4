//! Mutation Observers
//!
//! Registry of `MutationObserver`s owned by the tree. Tree operations queue
//! [`MutationRecord`]s for every observer interested in the mutated node;
//! observers pull them with [`DomTree::take_records`](crate::DomTree::take_records),
//! the equivalent of the callback running at the next microtask checkpoint.

use crate::NodeId;

/// Handle to a registered observer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(pub(crate) u32);

/// Mutation type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationType {
    Attributes,
    ChildList,
}

/// Mutation observer options
#[derive(Debug, Clone, Default)]
pub struct MutationObserverInit {
    pub child_list: bool,
    pub attributes: bool,
    pub subtree: bool,
    pub attribute_filter: Option<Vec<String>>,
}

impl MutationObserverInit {
    /// `{ childList: true, subtree: true }`
    pub fn child_list_subtree() -> Self {
        Self {
            child_list: true,
            subtree: true,
            ..Default::default()
        }
    }

    fn wants(&self, record: &MutationRecord) -> bool {
        match record.mutation_type {
            MutationType::ChildList => self.child_list,
            MutationType::Attributes => {
                self.attributes
                    && match (&self.attribute_filter, &record.attribute_name) {
                        (Some(filter), Some(name)) => filter.iter().any(|f| f == name),
                        _ => true,
                    }
            }
        }
    }
}

/// Mutation record
#[derive(Debug, Clone, PartialEq)]
pub struct MutationRecord {
    pub mutation_type: MutationType,
    pub target: NodeId,
    pub added_nodes: Vec<NodeId>,
    pub removed_nodes: Vec<NodeId>,
    pub previous_sibling: Option<NodeId>,
    pub next_sibling: Option<NodeId>,
    pub attribute_name: Option<String>,
    pub old_value: Option<String>,
}

impl MutationRecord {
    pub fn child_list(
        target: NodeId,
        added: Vec<NodeId>,
        removed: Vec<NodeId>,
        previous_sibling: Option<NodeId>,
        next_sibling: Option<NodeId>,
    ) -> Self {
        Self {
            mutation_type: MutationType::ChildList,
            target,
            added_nodes: added,
            removed_nodes: removed,
            previous_sibling,
            next_sibling,
            attribute_name: None,
            old_value: None,
        }
    }

    pub fn attribute(target: NodeId, name: &str, old_value: Option<String>) -> Self {
        Self {
            mutation_type: MutationType::Attributes,
            target,
            added_nodes: Vec::new(),
            removed_nodes: Vec::new(),
            previous_sibling: None,
            next_sibling: None,
            attribute_name: Some(name.to_string()),
            old_value,
        }
    }
}

#[derive(Debug)]
struct MutationObserver {
    id: ObserverId,
    observations: Vec<(NodeId, MutationObserverInit)>,
    records: Vec<MutationRecord>,
}

/// All observers registered on a tree
#[derive(Debug, Default)]
pub(crate) struct ObserverRegistry {
    observers: Vec<MutationObserver>,
    next_id: u32,
}

impl ObserverRegistry {
    pub(crate) fn observe(&mut self, target: NodeId, options: MutationObserverInit) -> ObserverId {
        let id = ObserverId(self.next_id);
        self.next_id += 1;
        self.observers.push(MutationObserver {
            id,
            observations: vec![(target, options)],
            records: Vec::new(),
        });
        id
    }

    pub(crate) fn disconnect(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|o| o.id != id);
        before != self.observers.len()
    }

    pub(crate) fn take_records(&mut self, id: ObserverId) -> Vec<MutationRecord> {
        self.observers
            .iter_mut()
            .find(|o| o.id == id)
            .map(|o| std::mem::take(&mut o.records))
            .unwrap_or_default()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    pub(crate) fn len(&self) -> usize {
        self.observers.len()
    }

    /// Queue `record` on every observer with a matching observation.
    /// `is_inclusive_ancestor(a, b)` answers whether `a` is `b` or contains it.
    pub(crate) fn queue(
        &mut self,
        record: MutationRecord,
        is_inclusive_ancestor: impl Fn(NodeId, NodeId) -> bool,
    ) {
        for observer in &mut self.observers {
            let interested = observer.observations.iter().any(|(target, options)| {
                options.wants(&record)
                    && (*target == record.target
                        || (options.subtree && is_inclusive_ancestor(*target, record.target)))
            });
            if interested {
                observer.records.push(record.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_respects_target_and_type() {
        let mut registry = ObserverRegistry::default();
        let id = registry.observe(NodeId(1), MutationObserverInit {
            child_list: true,
            ..Default::default()
        });

        // Not subtree: a mutation on a descendant is ignored
        registry.queue(MutationRecord::child_list(NodeId(2), vec![NodeId(3)], vec![], None, None), |_, _| true);
        // Attribute records are not wanted
        registry.queue(MutationRecord::attribute(NodeId(1), "class", None), |_, _| true);
        registry.queue(MutationRecord::child_list(NodeId(1), vec![NodeId(4)], vec![], None, None), |_, _| true);

        let records = registry.take_records(id);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].added_nodes, vec![NodeId(4)]);
        assert!(registry.take_records(id).is_empty());
    }

    #[test]
    fn test_attribute_filter() {
        let mut registry = ObserverRegistry::default();
        let id = registry.observe(NodeId(1), MutationObserverInit {
            attributes: true,
            attribute_filter: Some(vec!["style".to_string()]),
            ..Default::default()
        });

        registry.queue(MutationRecord::attribute(NodeId(1), "class", None), |_, _| false);
        registry.queue(MutationRecord::attribute(NodeId(1), "style", None), |_, _| false);

        let records = registry.take_records(id);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].attribute_name.as_deref(), Some("style"));
    }

    #[test]
    fn test_disconnect_is_idempotent() {
        let mut registry = ObserverRegistry::default();
        let id = registry.observe(NodeId(0), MutationObserverInit::child_list_subtree());
        assert!(registry.disconnect(id));
        assert!(!registry.disconnect(id));
        assert!(registry.is_empty());
        assert!(registry.take_records(id).is_empty());
    }
}
