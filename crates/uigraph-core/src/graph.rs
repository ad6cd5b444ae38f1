//! The exploration graph: every distinct state seen so far and the actions
//! they offer.
//!
//! States are keyed by hash code. Admitting a state that is already known
//! returns the registered instance, so callers always continue with the node
//! that carries the accumulated visit counts.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::action::{ActionType, ModelAction};
use crate::error::ModelError;
use crate::hash::{HashCode, HashNode};
use crate::node::Node;
use crate::state::State;

/// Observer of graph admissions.
pub trait GraphListener: Send + Sync {
    /// Called for every admitted state, new or already known.
    fn on_add_node(&self, state: &Arc<State>);
}

/// Tally of distinct actions per type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionCounter {
    counts: [u64; ActionType::COUNT],
    total: u64,
}

impl ActionCounter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count_action(&mut self, action: &ModelAction) {
        if let Some(slot) = self.counts.get_mut(action.action_type() as usize) {
            *slot += 1;
        }
        self.total += 1;
    }

    #[must_use]
    pub fn count(&self, action_type: ActionType) -> u64 {
        self.counts
            .get(action_type as usize)
            .copied()
            .unwrap_or(0)
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        self.total
    }
}

/// Registry of admitted states and indexed actions.
#[derive(Default)]
pub struct Graph {
    states: HashMap<HashCode, Arc<State>>,
    visited_actions: HashMap<HashCode, Arc<ModelAction>>,
    unvisited_actions: HashMap<HashCode, Arc<ModelAction>>,
    action_counter: ActionCounter,
    listeners: Vec<Arc<dyn GraphListener>>,
    visited_activities: BTreeSet<String>,
    activity_state_count: HashMap<String, usize>,
    activity_visits: HashMap<String, u64>,
    total_visits: u64,
    timestamp: i64,
}

impl Graph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Admit a state, returning the registered instance.
    ///
    /// A new state receives the next state id before it is inserted. A state
    /// equal (by hash) to a known one is dropped in favour of the known
    /// instance. Either way listeners are notified and activity statistics
    /// and the action index are updated.
    ///
    /// Every id is checked before the graph changes: a state or action that
    /// already carries an id from another graph is rejected and leaves this
    /// graph untouched.
    pub fn add_state(&mut self, state: Arc<State>) -> Result<Arc<State>, ModelError> {
        let hash = state.hash_code();
        let (state, new_id) = match self.states.get(&hash) {
            Some(existing) => (Arc::clone(existing), None),
            None => (state, Some(self.states.len() as u32)),
        };

        if let Some(id) = new_id {
            if state.core().is_assigned() {
                warn!(
                    "Refusing to admit state {}: it already belongs to another graph",
                    state.id()
                );
                return Err(ModelError::id_already_assigned(
                    state.id_prefix(),
                    state.idi(),
                    id,
                ));
            }
        }
        let action_ids = self.plan_action_ids(&state)?;

        if let Some(id) = new_id {
            state.set_id(id)?;
        }
        for (action, id) in state.actions().iter().zip(action_ids) {
            action.set_id(id)?;
        }

        if new_id.is_some() {
            self.states.insert(hash, Arc::clone(&state));
            *self
                .activity_state_count
                .entry(state.activity().to_string())
                .or_insert(0) += 1;
            debug!("add new state {} ({:016x})", state.id(), hash);
        }

        for listener in &self.listeners {
            listener.on_add_node(&state);
        }

        if !state.activity().is_empty() {
            self.visited_activities.insert(state.activity().to_string());
        }
        self.total_visits += 1;
        *self
            .activity_visits
            .entry(state.activity().to_string())
            .or_insert(0) += 1;

        self.index_actions(&state);
        Ok(state)
    }

    fn known_action_id(&self, hash: HashCode) -> Option<u32> {
        self.visited_actions
            .get(&hash)
            .or_else(|| self.unvisited_actions.get(&hash))
            .map(|action| action.idi())
    }

    /// Ids the state's actions will carry once indexed, without touching the
    /// index. Fails if an action already holds a different id.
    fn plan_action_ids(&self, state: &State) -> Result<Vec<u32>, ModelError> {
        let mut next = self.action_counter.total();
        let mut fresh: HashMap<HashCode, u32> = HashMap::new();
        let mut ids = Vec::with_capacity(state.actions().len());
        for action in state.actions() {
            let hash = action.hash_code();
            let id = match self
                .known_action_id(hash)
                .or_else(|| fresh.get(&hash).copied())
            {
                Some(id) => id,
                None => {
                    let id = next as u32;
                    next += 1;
                    fresh.insert(hash, id);
                    id
                }
            };
            if action.core().is_assigned() && action.idi() != id {
                warn!("Refusing to renumber action {} to {}", action.id(), id);
                return Err(ModelError::id_already_assigned(
                    action.id_prefix(),
                    action.idi(),
                    id,
                ));
            }
            ids.push(id);
        }
        Ok(ids)
    }

    fn index_actions(&mut self, state: &State) {
        for action in state.actions() {
            let hash = action.hash_code();
            if self.visited_actions.contains_key(&hash) {
                continue;
            }
            if !self.unvisited_actions.contains_key(&hash) {
                self.action_counter.count_action(action);
            }
            if action.is_visited() {
                self.unvisited_actions.remove(&hash);
                self.visited_actions.insert(hash, Arc::clone(action));
            } else {
                self.unvisited_actions
                    .entry(hash)
                    .or_insert_with(|| Arc::clone(action));
            }
        }
        debug!(
            "unvisited action: {}, visited action {}",
            self.unvisited_actions.len(),
            self.visited_actions.len()
        );
    }

    /// Move an action that has since been visited into the visited index.
    ///
    /// Returns `true` when the action moved.
    pub fn refresh_action(&mut self, action: &ModelAction) -> bool {
        if !action.is_visited() {
            return false;
        }
        let hash = action.hash_code();
        match self.unvisited_actions.remove(&hash) {
            Some(known) => {
                self.visited_actions.insert(hash, known);
                true
            }
            None => false,
        }
    }

    pub fn add_listener(&mut self, listener: Arc<dyn GraphListener>) {
        self.listeners.push(listener);
    }

    #[must_use]
    pub fn state(&self, hash: HashCode) -> Option<&Arc<State>> {
        self.states.get(&hash)
    }

    /// Admitted states in id order.
    #[must_use]
    pub fn states(&self) -> Vec<Arc<State>> {
        let mut states: Vec<Arc<State>> = self.states.values().cloned().collect();
        states.sort_by_key(|state| state.idi());
        states
    }

    #[must_use]
    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    /// Number of distinct actions indexed so far.
    #[must_use]
    pub fn action_count(&self) -> u64 {
        self.action_counter.total()
    }

    #[must_use]
    pub fn action_counter(&self) -> &ActionCounter {
        &self.action_counter
    }

    #[must_use]
    pub fn visited_action_count(&self) -> usize {
        self.visited_actions.len()
    }

    #[must_use]
    pub fn unvisited_action_count(&self) -> usize {
        self.unvisited_actions.len()
    }

    #[must_use]
    pub fn state_count_by_activity(&self, activity: &str) -> usize {
        self.activity_state_count.get(activity).copied().unwrap_or(0)
    }

    /// Admissions of `activity` and their share of all admissions.
    #[must_use]
    pub fn activity_distribution(&self, activity: &str) -> (u64, f64) {
        match self.activity_visits.get(activity) {
            Some(&count) if self.total_visits > 0 => {
                (count, count as f64 / self.total_visits as f64)
            }
            _ => (0, 0.0),
        }
    }

    #[must_use]
    pub fn visited_activities(&self) -> &BTreeSet<String> {
        &self.visited_activities
    }

    #[must_use]
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn set_timestamp(&mut self, timestamp: i64) {
        self.timestamp = timestamp;
    }
}

impl std::fmt::Debug for Graph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Graph")
            .field("states", &self.states.len())
            .field("visited_actions", &self.visited_actions.len())
            .field("unvisited_actions", &self.unvisited_actions.len())
            .field("listeners", &self.listeners.len())
            .field("timestamp", &self.timestamp)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HashConfig;
    use crate::geometry::Rect;
    use crate::widget::WidgetSpec;
    use std::sync::Mutex;

    fn button(id: &str) -> WidgetSpec {
        WidgetSpec {
            class: "android.widget.Button".to_string(),
            resource_id: id.to_string(),
            clickable: true,
            enabled: true,
            bounds: Some(Rect::new(0, 0, 10, 10)),
            ..WidgetSpec::default()
        }
    }

    fn screen(activity: &str, ids: &[&str]) -> Arc<State> {
        let specs: Vec<WidgetSpec> = ids.iter().map(|id| button(id)).collect();
        State::create(activity, &specs, &HashConfig::default())
    }

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<u32>>,
    }

    impl GraphListener for Recorder {
        fn on_add_node(&self, state: &Arc<State>) {
            self.seen.lock().unwrap().push(state.idi());
        }
    }

    #[test]
    fn new_states_get_sequential_ids() {
        let mut graph = Graph::new();
        let a = graph.add_state(screen("Main", &["ok"])).unwrap();
        let b = graph.add_state(screen("Main", &["cancel"])).unwrap();
        assert_eq!(a.id(), "g0s0");
        assert_eq!(b.id(), "g0s1");
        assert_eq!(graph.state_count(), 2);
    }

    #[test]
    fn known_state_returns_registered_instance() {
        let mut graph = Graph::new();
        let first = graph.add_state(screen("Main", &["ok"])).unwrap();
        first.visit(0);

        let again = graph.add_state(screen("Main", &["ok"])).unwrap();
        assert!(Arc::ptr_eq(&first, &again));
        assert_eq!(again.visited_count(), 1);
        assert_eq!(graph.state_count(), 1);
        assert_eq!(graph.state_count_by_activity("Main"), 1);
        assert!(graph.state(first.hash_code()).is_some());
    }

    #[test]
    fn actions_are_indexed_once() {
        let mut graph = Graph::new();
        let state = graph.add_state(screen("Main", &["ok", "cancel"])).unwrap();
        // two clicks and back
        assert_eq!(graph.action_count(), 3);
        assert_eq!(graph.unvisited_action_count(), 3);
        assert_eq!(graph.action_counter().count(ActionType::Click), 2);
        assert_eq!(graph.action_counter().count(ActionType::Back), 1);

        let ids: Vec<u32> = state.actions().iter().map(|a| a.idi()).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert_eq!(state.actions()[2].id(), "g0a2");

        graph.add_state(screen("Main", &["ok", "cancel"])).unwrap();
        assert_eq!(graph.action_count(), 3);
    }

    #[test]
    fn visited_actions_move_between_indexes() {
        let mut graph = Graph::new();
        let state = graph.add_state(screen("Main", &["ok"])).unwrap();
        let click = Arc::clone(&state.actions()[0]);

        assert!(!graph.refresh_action(&click));
        click.visit(0);
        assert!(graph.refresh_action(&click));
        assert!(!graph.refresh_action(&click));
        assert_eq!(graph.visited_action_count(), 1);
        assert_eq!(graph.unvisited_action_count(), 1);

        // Re-admission keeps the split
        graph.add_state(screen("Main", &["ok"])).unwrap();
        assert_eq!(graph.visited_action_count(), 1);
        assert_eq!(graph.unvisited_action_count(), 1);
    }

    #[test]
    fn re_admission_moves_visited_actions() {
        let mut graph = Graph::new();
        let state = graph.add_state(screen("Main", &["ok"])).unwrap();
        state.back_action().visit(0);
        graph.add_state(screen("Main", &["ok"])).unwrap();
        assert_eq!(graph.visited_action_count(), 1);
        assert_eq!(graph.unvisited_action_count(), 1);
        assert_eq!(graph.action_count(), 2);
    }

    #[test]
    fn activity_statistics() {
        let mut graph = Graph::new();
        graph.add_state(screen("Main", &["ok"])).unwrap();
        graph.add_state(screen("Main", &["ok"])).unwrap();
        graph.add_state(screen("Main", &["other"])).unwrap();
        graph.add_state(screen("Settings", &["ok"])).unwrap();
        graph.add_state(screen("", &[])).unwrap();

        assert_eq!(graph.state_count_by_activity("Main"), 2);
        assert_eq!(graph.state_count_by_activity("Settings"), 1);
        assert_eq!(graph.state_count_by_activity("Missing"), 0);

        let (count, share) = graph.activity_distribution("Main");
        assert_eq!(count, 3);
        assert!((share - 0.6).abs() < 1e-9);
        assert_eq!(graph.activity_distribution("Missing"), (0, 0.0));

        let activities: Vec<&str> = graph.visited_activities().iter().map(String::as_str).collect();
        assert_eq!(activities, vec!["Main", "Settings"]);
    }

    #[test]
    fn listeners_see_every_admission() {
        let recorder = Arc::new(Recorder::default());
        let mut graph = Graph::new();
        graph.add_listener(recorder.clone());

        graph.add_state(screen("Main", &["ok"])).unwrap();
        graph.add_state(screen("Main", &["cancel"])).unwrap();
        graph.add_state(screen("Main", &["ok"])).unwrap();

        assert_eq!(*recorder.seen.lock().unwrap(), vec![0, 1, 0]);
    }

    #[test]
    fn state_from_another_graph_is_rejected() {
        let shared = screen("Main", &["ok"]);
        let mut first = Graph::new();
        first.add_state(screen("Main", &["x"])).unwrap();
        first.add_state(Arc::clone(&shared)).unwrap();
        assert_eq!(shared.idi(), 1);

        let recorder = Arc::new(Recorder::default());
        let mut second = Graph::new();
        second.add_listener(recorder.clone());
        // Next state id in `second` matches the one `shared` already holds
        second.add_state(screen("Blank", &[])).unwrap();

        let err = second.add_state(Arc::clone(&shared)).unwrap_err();
        assert!(matches!(
            err,
            ModelError::IdAlreadyAssigned {
                current: 1,
                requested: 1,
                ..
            }
        ));

        assert_eq!(second.state_count(), 1);
        assert!(second.state(shared.hash_code()).is_none());
        assert_eq!(second.state_count_by_activity("Main"), 0);
        assert_eq!(second.activity_distribution("Main"), (0, 0.0));
        assert!(!second.visited_activities().contains("Main"));
        assert_eq!(second.action_count(), 1);
        assert_eq!(second.unvisited_action_count(), 1);
        assert_eq!(*recorder.seen.lock().unwrap(), vec![0]);
    }

    #[test]
    fn preassigned_action_rejects_whole_state() {
        let state = screen("Main", &["ok", "cancel"]);
        state.actions()[1].set_id(99).unwrap();

        let mut graph = Graph::new();
        let err = graph.add_state(Arc::clone(&state)).unwrap_err();
        assert!(matches!(
            err,
            ModelError::IdAlreadyAssigned {
                current: 99,
                requested: 1,
                ..
            }
        ));

        assert_eq!(graph.state_count(), 0);
        assert_eq!(graph.action_count(), 0);
        assert_eq!(graph.unvisited_action_count(), 0);
        assert_eq!(graph.activity_distribution("Main"), (0, 0.0));
        assert!(!state.core().is_assigned());
        assert!(!state.actions()[0].core().is_assigned());
    }

    #[test]
    fn states_listed_in_id_order() {
        let mut graph = Graph::new();
        for name in ["a", "b", "c", "d"] {
            graph.add_state(screen("Main", &[name])).unwrap();
        }
        let ids: Vec<u32> = graph.states().iter().map(|s| s.idi()).collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);
    }

    #[test]
    fn timestamp_round_trip() {
        let mut graph = Graph::new();
        assert_eq!(graph.timestamp(), 0);
        graph.set_timestamp(1_700_000_000);
        assert_eq!(graph.timestamp(), 1_700_000_000);
    }
}
