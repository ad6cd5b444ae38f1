//! States: one abstracted screen of the application under test.
//!
//! A [`State`] is identified by its activity name and the multiset (or
//! sequence, see [`HashConfig::widget_order`]) of its widget identities.
//! Widgets with identical hashes are merged into one; the number of merged
//! duplicates is remembered so an action on such a widget is only considered
//! saturated after it has had a chance to hit each copy.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::action::{ActionType, ModelAction};
use crate::config::HashConfig;
use crate::hash::{combine_hash, hash_str, mix64, ContentHasher, HashCode, HashNode};
use crate::node::{Node, NodeCore, Serializable};
use crate::priority::PriorityQueue;
use crate::widget::{Widget, WidgetSpec};

/// An abstract UI state and the actions available in it.
#[derive(Debug)]
pub struct State {
    core: NodeCore,
    activity: String,
    widgets: Vec<Arc<Widget>>,
    /// Widget hash -> number of duplicates merged into the kept widget.
    merged: HashMap<HashCode, usize>,
    actions: Vec<Arc<ModelAction>>,
    back_action: Arc<ModelAction>,
    hash: HashCode,
}

impl State {
    /// Build a state from the widgets of one screen.
    ///
    /// Actions are created for every (widget, action type) pair, followed by
    /// a `BACK` action without a target.
    pub fn create(
        activity: impl Into<String>,
        specs: &[WidgetSpec],
        config: &HashConfig,
    ) -> Arc<State> {
        let activity = activity.into();

        let mut widgets: Vec<Arc<Widget>> = Vec::with_capacity(specs.len());
        let mut duplicates: HashMap<HashCode, usize> = HashMap::new();
        for spec in specs {
            let widget = Widget::new(spec, config);
            let hash = widget.hash_code();
            match duplicates.get_mut(&hash) {
                Some(count) => *count += 1,
                None => {
                    duplicates.insert(hash, 0);
                    widgets.push(Arc::new(widget));
                }
            }
        }
        duplicates.retain(|_, count| *count > 0);
        let merged_total: usize = duplicates.values().sum();
        if merged_total != 0 {
            debug!("build state merged {} widget", merged_total);
        }

        let hash = mix64(
            ContentHasher::new()
                .write_u64(hash_str(&activity))
                .write_u64(combine_hash(&widgets, config.widget_order))
                .finish(),
        );

        Arc::new_cyclic(|weak| {
            let mut actions = Vec::new();
            for widget in &widgets {
                for action_type in widget.actions() {
                    actions.push(Arc::new(ModelAction::new(
                        weak.clone(),
                        hash,
                        Some(Arc::clone(widget)),
                        *action_type,
                    )));
                }
            }
            let back_action = Arc::new(ModelAction::new(
                weak.clone(),
                hash,
                None,
                ActionType::Back,
            ));
            actions.push(Arc::clone(&back_action));

            State {
                core: NodeCore::new(),
                activity,
                widgets,
                merged: duplicates,
                actions,
                back_action,
                hash,
            }
        })
    }

    #[must_use]
    pub fn activity(&self) -> &str {
        &self.activity
    }

    /// Distinct widgets, in first-seen order.
    #[must_use]
    pub fn widgets(&self) -> &[Arc<Widget>] {
        &self.widgets
    }

    #[must_use]
    pub fn actions(&self) -> &[Arc<ModelAction>] {
        &self.actions
    }

    #[must_use]
    pub fn back_action(&self) -> &Arc<ModelAction> {
        &self.back_action
    }

    /// How many duplicates were merged into the widget with this hash.
    #[must_use]
    pub fn merged_count(&self, widget_hash: HashCode) -> usize {
        self.merged.get(&widget_hash).copied().unwrap_or(0)
    }

    /// Whether exploring `action` again is unlikely to reveal anything new.
    ///
    /// Target-less actions saturate after one visit. An action on a merged
    /// widget saturates once it has been visited more often than there were
    /// duplicates.
    #[must_use]
    pub fn is_saturated(&self, action: &ModelAction) -> bool {
        if !action.requires_target() {
            return action.is_visited();
        }
        if let Some(target) = action.target() {
            if let Some(count) = self.merged.get(&target.hash_code()) {
                return action.visited_count() as usize > *count;
            }
        }
        action.visited_count() >= 1
    }

    pub fn unvisited_actions(&self) -> impl Iterator<Item = &Arc<ModelAction>> {
        self.actions.iter().filter(|action| !action.is_visited())
    }

    /// Enabled, valid, unsaturated actions queued by their current priority.
    #[must_use]
    pub fn prioritized_actions(&self) -> PriorityQueue<Arc<ModelAction>> {
        self.actions
            .iter()
            .filter(|action| {
                action.is_enabled() && action.is_valid() && !self.is_saturated(action)
            })
            .cloned()
            .collect()
    }
}

impl Node for State {
    fn core(&self) -> &NodeCore {
        &self.core
    }

    fn id_prefix(&self) -> &'static str {
        "g0s"
    }
}

impl HashNode for State {
    fn hash_code(&self) -> HashCode {
        self.hash
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{id: {}, activity: {}, widgets: {}, actions: {}, visited: {}}}",
            self.id(),
            self.activity,
            self.widgets.len(),
            self.actions.len(),
            self.visited_count()
        )
    }
}

impl Serializable for State {
    fn serialize(&self) -> String {
        self.to_string()
    }
}
