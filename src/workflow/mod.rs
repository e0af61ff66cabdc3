//! Bid-type status workflows.
//!
//! Every bid type carries its own set of statuses and a directed transition
//! graph between them, persisted as two JSON columns on the `bid_types` table.
//! This module owns parsing, validation and mutation of those blobs. All
//! writes go through [`Workflow`]; the entity never stores a graph this module
//! has not validated.

use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use strum::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

/// Actions the UI may offer while a bid sits in a given status.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    ToSchema,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum StatusAction {
    Edit,
    Assign,
    AttachEquipment,
    Comment,
    Close,
}

/// One status in a bid type's workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StatusDef {
    /// Unique snake_case identifier within the bid type
    pub key: String,
    /// Human-readable label
    pub label: String,
    /// Ordinal position; the lowest position is the initial status
    pub position: u32,
    /// Display color as `#rrggbb`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Actions allowed while a bid sits in this status
    #[serde(default)]
    pub actions: Vec<StatusAction>,
    /// Terminal statuses close the bid and allow no outgoing transitions
    #[serde(default)]
    pub is_terminal: bool,
}

/// A directed edge between two status keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TransitionDef {
    pub from: String,
    pub to: String,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("workflow must define at least one status")]
    Empty,

    #[error("status key '{0}' is blank")]
    BlankKey(String),

    #[error("duplicate status key '{0}'")]
    DuplicateKey(String),

    #[error("status '{0}' has a blank label")]
    BlankLabel(String),

    #[error("duplicate status position {0}")]
    DuplicatePosition(u32),

    #[error("transition references unknown status '{0}'")]
    UnknownStatus(String),

    #[error("self-transition on status '{0}'")]
    SelfTransition(String),

    #[error("duplicate transition '{0}' -> '{1}'")]
    DuplicateTransition(String, String),

    #[error("terminal status '{0}' cannot have outgoing transitions")]
    TerminalOutgoing(String),

    #[error("cannot remove the last remaining status")]
    LastStatus,

    #[error("reorder list is not a permutation of the existing status keys")]
    NotAPermutation,

    #[error("no transition '{0}' -> '{1}'")]
    NoSuchTransition(String, String),

    #[error("malformed workflow JSON: {0}")]
    Malformed(String),
}

impl From<WorkflowError> for crate::errors::ServiceError {
    fn from(err: WorkflowError) -> Self {
        match err {
            WorkflowError::Malformed(msg) => {
                crate::errors::ServiceError::InternalError(format!("stored workflow: {}", msg))
            }
            other => crate::errors::ServiceError::ValidationError(other.to_string()),
        }
    }
}

/// Normalize a status key: trimmed, lowercased, spaces collapsed to `_`.
pub fn normalize_key(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

/// Resolved per-status view returned by the workflow endpoint.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StatusView {
    pub key: String,
    pub label: String,
    pub position: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub actions: Vec<StatusAction>,
    pub is_terminal: bool,
    /// Status keys reachable from this one
    pub next: Vec<String>,
}

/// Resolved workflow returned by the workflow endpoint.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WorkflowView {
    pub initial: String,
    pub statuses: Vec<StatusView>,
}

/// An in-memory, validated bid-type workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workflow {
    statuses: Vec<StatusDef>,
    transitions: Vec<TransitionDef>,
}

impl Workflow {
    /// Build a workflow from already-validated parts, re-validating.
    pub fn new(
        statuses: Vec<StatusDef>,
        transitions: Vec<TransitionDef>,
    ) -> Result<Self, WorkflowError> {
        let wf = Self {
            statuses,
            transitions,
        };
        wf.validate()?;
        Ok(wf)
    }

    /// The workflow seeded for a newly created bid type.
    pub fn default_workflow() -> Self {
        let all = vec![
            StatusAction::Edit,
            StatusAction::Assign,
            StatusAction::AttachEquipment,
            StatusAction::Comment,
        ];
        Self {
            statuses: vec![
                StatusDef {
                    key: "new".into(),
                    label: "New".into(),
                    position: 0,
                    color: Some("#6b7280".into()),
                    actions: all.clone(),
                    is_terminal: false,
                },
                StatusDef {
                    key: "in_progress".into(),
                    label: "In progress".into(),
                    position: 1,
                    color: Some("#2563eb".into()),
                    actions: all,
                    is_terminal: false,
                },
                StatusDef {
                    key: "done".into(),
                    label: "Done".into(),
                    position: 2,
                    color: Some("#16a34a".into()),
                    actions: vec![StatusAction::Comment, StatusAction::Close],
                    is_terminal: true,
                },
            ],
            transitions: vec![
                TransitionDef {
                    from: "new".into(),
                    to: "in_progress".into(),
                },
                TransitionDef {
                    from: "in_progress".into(),
                    to: "done".into(),
                },
                TransitionDef {
                    from: "new".into(),
                    to: "done".into(),
                },
            ],
        }
    }

    /// Parse the two JSON columns of a bid type row.
    pub fn from_json(statuses: &Json, transitions: &Json) -> Result<Self, WorkflowError> {
        let statuses: Vec<StatusDef> = serde_json::from_value(statuses.clone())
            .map_err(|e| WorkflowError::Malformed(e.to_string()))?;
        let transitions: Vec<TransitionDef> = serde_json::from_value(transitions.clone())
            .map_err(|e| WorkflowError::Malformed(e.to_string()))?;
        Self::new(statuses, transitions)
    }

    /// Serialize back into the two JSON column values.
    pub fn to_json(&self) -> (Json, Json) {
        (
            serde_json::to_value(&self.statuses).expect("status defs serialize"),
            serde_json::to_value(&self.transitions).expect("transition defs serialize"),
        )
    }

    pub fn statuses(&self) -> &[StatusDef] {
        &self.statuses
    }

    pub fn transitions(&self) -> &[TransitionDef] {
        &self.transitions
    }

    /// Full structural validation of the status set and transition graph.
    pub fn validate(&self) -> Result<(), WorkflowError> {
        if self.statuses.is_empty() {
            return Err(WorkflowError::Empty);
        }

        let mut seen_keys: Vec<&str> = Vec::with_capacity(self.statuses.len());
        let mut seen_positions: Vec<u32> = Vec::with_capacity(self.statuses.len());
        for status in &self.statuses {
            if status.key.trim().is_empty() {
                return Err(WorkflowError::BlankKey(status.key.clone()));
            }
            if status.label.trim().is_empty() {
                return Err(WorkflowError::BlankLabel(status.key.clone()));
            }
            if seen_keys.contains(&status.key.as_str()) {
                return Err(WorkflowError::DuplicateKey(status.key.clone()));
            }
            seen_keys.push(&status.key);
            if seen_positions.contains(&status.position) {
                return Err(WorkflowError::DuplicatePosition(status.position));
            }
            seen_positions.push(status.position);
        }

        let mut seen_edges: Vec<(&str, &str)> = Vec::with_capacity(self.transitions.len());
        for t in &self.transitions {
            if !seen_keys.contains(&t.from.as_str()) {
                return Err(WorkflowError::UnknownStatus(t.from.clone()));
            }
            if !seen_keys.contains(&t.to.as_str()) {
                return Err(WorkflowError::UnknownStatus(t.to.clone()));
            }
            if t.from == t.to {
                return Err(WorkflowError::SelfTransition(t.from.clone()));
            }
            if seen_edges.contains(&(t.from.as_str(), t.to.as_str())) {
                return Err(WorkflowError::DuplicateTransition(
                    t.from.clone(),
                    t.to.clone(),
                ));
            }
            seen_edges.push((&t.from, &t.to));

            let from_def = self
                .statuses
                .iter()
                .find(|s| s.key == t.from)
                .expect("checked above");
            if from_def.is_terminal {
                return Err(WorkflowError::TerminalOutgoing(t.from.clone()));
            }
        }

        Ok(())
    }

    /// The initial status: lowest ordinal position.
    pub fn initial_status(&self) -> &StatusDef {
        self.statuses
            .iter()
            .min_by_key(|s| s.position)
            .expect("validated workflows are non-empty")
    }

    pub fn status(&self, key: &str) -> Option<&StatusDef> {
        self.statuses.iter().find(|s| s.key == key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.status(key).is_some()
    }

    /// Whether the graph has a `from -> to` edge.
    pub fn can_transition(&self, from: &str, to: &str) -> bool {
        self.transitions
            .iter()
            .any(|t| t.from == from && t.to == to)
    }

    /// Whether `action` is allowed while a bid sits in `status_key`.
    pub fn allows_action(&self, status_key: &str, action: StatusAction) -> bool {
        self.status(status_key)
            .map(|s| s.actions.contains(&action))
            .unwrap_or(false)
    }

    /// Status keys reachable from `key`, in transition insertion order.
    pub fn outgoing(&self, key: &str) -> Vec<&str> {
        self.transitions
            .iter()
            .filter(|t| t.from == key)
            .map(|t| t.to.as_str())
            .collect()
    }

    /// Append a status. Position defaults to max+1 when not given.
    pub fn add_status(&mut self, mut def: StatusDef) -> Result<(), WorkflowError> {
        def.key = normalize_key(&def.key);
        if def.position == u32::MAX {
            def.position = self
                .statuses
                .iter()
                .map(|s| s.position)
                .max()
                .map(|p| p + 1)
                .unwrap_or(0);
        }
        let mut next = self.clone();
        next.statuses.push(def);
        next.validate()?;
        *self = next;
        Ok(())
    }

    /// Update label/color/actions/terminal flag of an existing status.
    pub fn update_status(
        &mut self,
        key: &str,
        label: Option<String>,
        color: Option<Option<String>>,
        actions: Option<Vec<StatusAction>>,
        is_terminal: Option<bool>,
    ) -> Result<(), WorkflowError> {
        let mut next = self.clone();
        let status = next
            .statuses
            .iter_mut()
            .find(|s| s.key == key)
            .ok_or_else(|| WorkflowError::UnknownStatus(key.to_string()))?;
        if let Some(label) = label {
            status.label = label;
        }
        if let Some(color) = color {
            status.color = color;
        }
        if let Some(actions) = actions {
            status.actions = actions;
        }
        if let Some(terminal) = is_terminal {
            status.is_terminal = terminal;
        }
        next.validate()?;
        *self = next;
        Ok(())
    }

    /// Remove a status together with its incident transitions.
    pub fn remove_status(&mut self, key: &str) -> Result<(), WorkflowError> {
        if !self.contains(key) {
            return Err(WorkflowError::UnknownStatus(key.to_string()));
        }
        if self.statuses.len() == 1 {
            return Err(WorkflowError::LastStatus);
        }
        let mut next = self.clone();
        next.statuses.retain(|s| s.key != key);
        next.transitions.retain(|t| t.from != key && t.to != key);
        next.validate()?;
        *self = next;
        Ok(())
    }

    /// Reorder statuses to the given key sequence; positions become 0..n.
    pub fn reorder(&mut self, keys: &[String]) -> Result<(), WorkflowError> {
        if keys.len() != self.statuses.len() {
            return Err(WorkflowError::NotAPermutation);
        }
        let mut next = self.clone();
        for (idx, key) in keys.iter().enumerate() {
            let status = next
                .statuses
                .iter_mut()
                .find(|s| &s.key == key)
                .ok_or(WorkflowError::NotAPermutation)?;
            // A repeated key in the input would leave some status untouched;
            // the duplicate-position check below catches it.
            status.position = idx as u32;
        }
        next.validate().map_err(|e| match e {
            WorkflowError::DuplicatePosition(_) => WorkflowError::NotAPermutation,
            other => other,
        })?;
        *self = next;
        Ok(())
    }

    pub fn add_transition(&mut self, from: &str, to: &str) -> Result<(), WorkflowError> {
        let mut next = self.clone();
        next.transitions.push(TransitionDef {
            from: normalize_key(from),
            to: normalize_key(to),
        });
        next.validate()?;
        *self = next;
        Ok(())
    }

    pub fn remove_transition(&mut self, from: &str, to: &str) -> Result<(), WorkflowError> {
        let before = self.transitions.len();
        let mut next = self.clone();
        next.transitions.retain(|t| !(t.from == from && t.to == to));
        if next.transitions.len() == before {
            return Err(WorkflowError::NoSuchTransition(
                from.to_string(),
                to.to_string(),
            ));
        }
        *self = next;
        Ok(())
    }

    /// Resolve the workflow for API consumers: statuses in position order with
    /// their outgoing edges.
    pub fn view(&self) -> WorkflowView {
        let mut ordered: Vec<&StatusDef> = self.statuses.iter().collect();
        ordered.sort_by_key(|s| s.position);
        WorkflowView {
            initial: self.initial_status().key.clone(),
            statuses: ordered
                .into_iter()
                .map(|s| StatusView {
                    key: s.key.clone(),
                    label: s.label.clone(),
                    position: s.position,
                    color: s.color.clone(),
                    actions: s.actions.clone(),
                    is_terminal: s.is_terminal,
                    next: self.outgoing(&s.key).into_iter().map(String::from).collect(),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use test_case::test_case;

    fn status(key: &str, position: u32) -> StatusDef {
        StatusDef {
            key: key.into(),
            label: key.to_uppercase(),
            position,
            color: None,
            actions: vec![StatusAction::Edit, StatusAction::Comment],
            is_terminal: false,
        }
    }

    fn edge(from: &str, to: &str) -> TransitionDef {
        TransitionDef {
            from: from.into(),
            to: to.into(),
        }
    }

    #[test]
    fn default_workflow_is_valid() {
        let wf = Workflow::default_workflow();
        assert!(wf.validate().is_ok());
        assert_eq!(wf.initial_status().key, "new");
        assert!(wf.can_transition("new", "in_progress"));
        assert!(!wf.can_transition("done", "new"));
    }

    #[test]
    fn json_round_trip() {
        let wf = Workflow::default_workflow();
        let (statuses, transitions) = wf.to_json();
        let parsed = Workflow::from_json(&statuses, &transitions).unwrap();
        assert_eq!(parsed, wf);
    }

    #[test]
    fn empty_status_set_rejected() {
        assert_matches!(
            Workflow::new(vec![], vec![]),
            Err(WorkflowError::Empty)
        );
    }

    #[test]
    fn duplicate_keys_rejected() {
        let result = Workflow::new(vec![status("new", 0), status("new", 1)], vec![]);
        assert_matches!(result, Err(WorkflowError::DuplicateKey(_)));
    }

    #[test]
    fn duplicate_positions_rejected() {
        let result = Workflow::new(vec![status("a", 0), status("b", 0)], vec![]);
        assert_matches!(result, Err(WorkflowError::DuplicatePosition(0)));
    }

    #[test]
    fn transition_to_unknown_status_rejected() {
        let result = Workflow::new(vec![status("a", 0)], vec![edge("a", "ghost")]);
        assert_matches!(result, Err(WorkflowError::UnknownStatus(k)) if k == "ghost");
    }

    #[test]
    fn self_transition_rejected() {
        let result = Workflow::new(vec![status("a", 0)], vec![edge("a", "a")]);
        assert_matches!(result, Err(WorkflowError::SelfTransition(_)));
    }

    #[test]
    fn duplicate_edge_rejected() {
        let result = Workflow::new(
            vec![status("a", 0), status("b", 1)],
            vec![edge("a", "b"), edge("a", "b")],
        );
        assert_matches!(result, Err(WorkflowError::DuplicateTransition(_, _)));
    }

    #[test]
    fn terminal_status_cannot_have_outgoing_edges() {
        let mut terminal = status("done", 1);
        terminal.is_terminal = true;
        let result = Workflow::new(
            vec![status("a", 0), terminal],
            vec![edge("done", "a")],
        );
        assert_matches!(result, Err(WorkflowError::TerminalOutgoing(_)));
    }

    #[test]
    fn initial_status_is_lowest_position() {
        let wf = Workflow::new(vec![status("later", 5), status("first", 2)], vec![]).unwrap();
        assert_eq!(wf.initial_status().key, "first");
    }

    #[test]
    fn add_status_defaults_position_to_end() {
        let mut wf = Workflow::default_workflow();
        let mut def = status("on_hold", u32::MAX);
        def.key = "On Hold".into(); // gets normalized
        wf.add_status(def).unwrap();
        let added = wf.status("on_hold").expect("normalized key present");
        assert_eq!(added.position, 3);
    }

    #[test]
    fn remove_status_drops_incident_transitions() {
        let mut wf = Workflow::default_workflow();
        wf.remove_status("in_progress").unwrap();
        assert!(!wf.contains("in_progress"));
        assert!(wf
            .transitions()
            .iter()
            .all(|t| t.from != "in_progress" && t.to != "in_progress"));
        // new -> done survives
        assert!(wf.can_transition("new", "done"));
    }

    #[test]
    fn cannot_remove_last_status() {
        let mut wf = Workflow::new(vec![status("only", 0)], vec![]).unwrap();
        assert_matches!(wf.remove_status("only"), Err(WorkflowError::LastStatus));
    }

    #[test]
    fn reorder_assigns_contiguous_positions() {
        let mut wf = Workflow::default_workflow();
        wf.reorder(&["done".into(), "new".into(), "in_progress".into()])
            .unwrap();
        assert_eq!(wf.status("done").unwrap().position, 0);
        assert_eq!(wf.status("new").unwrap().position, 1);
        assert_eq!(wf.status("in_progress").unwrap().position, 2);
        assert_eq!(wf.initial_status().key, "done");
    }

    #[test_case(&["new", "done"]; "too short")]
    #[test_case(&["new", "new", "done"]; "repeated key")]
    #[test_case(&["new", "in_progress", "ghost"]; "unknown key")]
    fn reorder_rejects_non_permutations(keys: &[&str]) {
        let mut wf = Workflow::default_workflow();
        let keys: Vec<String> = keys.iter().map(|s| s.to_string()).collect();
        assert_matches!(wf.reorder(&keys), Err(WorkflowError::NotAPermutation));
    }

    #[test]
    fn add_and_remove_transition() {
        let mut wf = Workflow::default_workflow();
        wf.add_transition("in_progress", "new").unwrap();
        assert!(wf.can_transition("in_progress", "new"));
        wf.remove_transition("in_progress", "new").unwrap();
        assert!(!wf.can_transition("in_progress", "new"));
        assert_matches!(
            wf.remove_transition("in_progress", "new"),
            Err(WorkflowError::NoSuchTransition(_, _))
        );
    }

    #[test]
    fn view_orders_by_position_and_resolves_edges() {
        let view = Workflow::default_workflow().view();
        assert_eq!(view.initial, "new");
        let keys: Vec<_> = view.statuses.iter().map(|s| s.key.as_str()).collect();
        assert_eq!(keys, vec!["new", "in_progress", "done"]);
        let new = &view.statuses[0];
        assert_eq!(new.next, vec!["in_progress", "done"]);
        assert!(view.statuses[2].next.is_empty());
    }

    #[test]
    fn normalize_key_collapses_whitespace() {
        assert_eq!(normalize_key("  On  Hold "), "on_hold");
        assert_eq!(normalize_key("DONE"), "done");
    }
}
