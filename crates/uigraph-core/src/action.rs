//! Action types and model actions.
//!
//! A [`ModelAction`] is one thing the explorer can do in a state: an
//! [`ActionType`] applied to an optional target widget. Actions are graph
//! nodes in their own right (prefix `g0a`), content-addressed from their
//! type, their state and their target.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Arc, LazyLock, Weak};

use serde::{Deserialize, Serialize};

use crate::hash::{mix64, ContentHasher, HashCode, HashNode};
use crate::node::{Node, NodeCore, Serializable};
use crate::priority::PriorityNode;
use crate::state::State;
use crate::widget::Widget;

/// Hash stand-in for a missing state or target.
const ABSENT_HASH: HashCode = 0x1;

/// Kind of action.
///
/// The declaration order is significant: range checks such as
/// [`ActionType::requires_target`] rely on it. `ActTypeSize` is the sentinel
/// for "not a valid action".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionType {
    Crash,
    Fuzz,
    Start,
    Restart,
    CleanRestart,
    Nop,
    Activate,
    Back,
    Feed,
    Click,
    LongClick,
    ScrollTopDown,
    ScrollBottomUp,
    ScrollLeftRight,
    ScrollRightLeft,
    ScrollBottomUpN,
    ShellEvent,
    Hover,
    ActTypeSize,
}

impl ActionType {
    /// Every valid action type, in declaration order.
    pub const ALL: [ActionType; 18] = [
        ActionType::Crash,
        ActionType::Fuzz,
        ActionType::Start,
        ActionType::Restart,
        ActionType::CleanRestart,
        ActionType::Nop,
        ActionType::Activate,
        ActionType::Back,
        ActionType::Feed,
        ActionType::Click,
        ActionType::LongClick,
        ActionType::ScrollTopDown,
        ActionType::ScrollBottomUp,
        ActionType::ScrollLeftRight,
        ActionType::ScrollRightLeft,
        ActionType::ScrollBottomUpN,
        ActionType::ShellEvent,
        ActionType::Hover,
    ];

    /// Number of valid action types.
    pub const COUNT: usize = ActionType::ActTypeSize as usize;

    /// Wire name, e.g. `"CLICK"`.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            ActionType::Crash => "CRASH",
            ActionType::Fuzz => "FUZZ",
            ActionType::Start => "START",
            ActionType::Restart => "RESTART",
            ActionType::CleanRestart => "CLEAN_RESTART",
            ActionType::Nop => "NOP",
            ActionType::Activate => "ACTIVATE",
            ActionType::Back => "BACK",
            ActionType::Feed => "FEED",
            ActionType::Click => "CLICK",
            ActionType::LongClick => "LONG_CLICK",
            ActionType::ScrollTopDown => "SCROLL_TOP_DOWN",
            ActionType::ScrollBottomUp => "SCROLL_BOTTOM_UP",
            ActionType::ScrollLeftRight => "SCROLL_LEFT_RIGHT",
            ActionType::ScrollRightLeft => "SCROLL_RIGHT_LEFT",
            ActionType::ScrollBottomUpN => "SCROLL_BOTTOM_UP_N",
            ActionType::ShellEvent => "SHELL_EVENT",
            ActionType::Hover => "HOVER",
            ActionType::ActTypeSize => "ACT_TYPE_SIZE",
        }
    }

    /// Parse a wire name. Unknown names map to [`ActionType::ActTypeSize`].
    #[must_use]
    pub fn from_name(name: &str) -> ActionType {
        static BY_NAME: LazyLock<HashMap<&'static str, ActionType>> = LazyLock::new(|| {
            ActionType::ALL
                .iter()
                .map(|action| (action.name(), *action))
                .collect()
        });
        BY_NAME
            .get(name)
            .copied()
            .unwrap_or(ActionType::ActTypeSize)
    }

    #[must_use]
    pub fn is_valid(self) -> bool {
        self != ActionType::ActTypeSize
    }

    /// Static scheduling weight: clicks first, then long clicks and scrolls.
    #[must_use]
    pub fn priority(self) -> i32 {
        match self {
            ActionType::Click => 4,
            ActionType::LongClick
            | ActionType::ScrollTopDown
            | ActionType::ScrollBottomUp
            | ActionType::ScrollLeftRight
            | ActionType::ScrollRightLeft => 2,
            _ => 1,
        }
    }

    /// Actions that belong to the state model (`BACK` through the scrolls).
    #[must_use]
    pub fn is_model_act(self) -> bool {
        (ActionType::Back..=ActionType::ScrollBottomUpN).contains(&self)
    }

    /// Actions that operate on a widget.
    #[must_use]
    pub fn requires_target(self) -> bool {
        (ActionType::Click..=ActionType::ScrollBottomUpN).contains(&self)
    }

    #[must_use]
    pub fn can_start_test_app(self) -> bool {
        matches!(
            self,
            ActionType::Start | ActionType::Restart | ActionType::CleanRestart
        )
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Scroll capability of a widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollType {
    All,
    Horizontal,
    Vertical,
    #[default]
    None,
}

impl ScrollType {
    /// Parse `"all"`, `"horizontal"`, `"vertical"` or `"none"`. Anything else
    /// maps to [`ScrollType::None`].
    #[must_use]
    pub fn from_name(name: &str) -> ScrollType {
        match name {
            "all" => ScrollType::All,
            "horizontal" => ScrollType::Horizontal,
            "vertical" => ScrollType::Vertical,
            _ => ScrollType::None,
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            ScrollType::All => "all",
            ScrollType::Horizontal => "horizontal",
            ScrollType::Vertical => "vertical",
            ScrollType::None => "none",
        }
    }

    /// Scroll actions a widget with this capability offers.
    #[must_use]
    pub fn actions(self) -> &'static [ActionType] {
        match self {
            ScrollType::All => &[
                ActionType::ScrollBottomUp,
                ActionType::ScrollTopDown,
                ActionType::ScrollLeftRight,
                ActionType::ScrollRightLeft,
            ],
            ScrollType::Horizontal => &[ActionType::ScrollLeftRight, ActionType::ScrollRightLeft],
            ScrollType::Vertical => &[ActionType::ScrollBottomUp, ActionType::ScrollTopDown],
            ScrollType::None => &[],
        }
    }
}

/// An action available in a state.
///
/// Holds a non-owning link back to its state; the state owns its actions.
#[derive(Debug)]
pub struct ModelAction {
    core: NodeCore,
    action_type: ActionType,
    state: Weak<State>,
    target: Option<Arc<Widget>>,
    priority: AtomicI32,
    hash: HashCode,
}

impl ModelAction {
    /// Create an action inside a state.
    ///
    /// `state_hash` is passed separately because actions are built while the
    /// owning state is still being constructed.
    #[must_use]
    pub fn new(
        state: Weak<State>,
        state_hash: HashCode,
        target: Option<Arc<Widget>>,
        action_type: ActionType,
    ) -> Self {
        let target_hash = target.as_ref().map_or(ABSENT_HASH, |w| w.hash_code());
        let hash = mix64(
            ContentHasher::new()
                .write_u32(action_type as u32)
                .write_u64(state_hash)
                .write_u64(target_hash)
                .finish(),
        );
        Self {
            core: NodeCore::new(),
            action_type,
            state,
            target,
            priority: AtomicI32::new(0),
            hash,
        }
    }

    /// An action not bound to any state, such as `NOP` or `RESTART`.
    #[must_use]
    pub fn standalone(action_type: ActionType) -> Self {
        Self::new(Weak::new(), ABSENT_HASH, None, action_type)
    }

    #[must_use]
    pub fn action_type(&self) -> ActionType {
        self.action_type
    }

    #[must_use]
    pub fn target(&self) -> Option<&Arc<Widget>> {
        self.target.as_ref()
    }

    /// The owning state, if it is still alive.
    #[must_use]
    pub fn state(&self) -> Option<Arc<State>> {
        self.state.upgrade()
    }

    pub fn set_priority(&self, priority: i32) {
        self.priority.store(priority, Ordering::Relaxed);
    }

    /// Static weight of the action type.
    #[must_use]
    pub fn base_priority(&self) -> i32 {
        self.action_type.priority()
    }

    #[must_use]
    pub fn requires_target(&self) -> bool {
        self.action_type.requires_target()
    }

    /// False when the target has lost its bounds.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.target
            .as_ref()
            .map_or(true, |widget| !widget.bounds().is_empty())
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.target.as_ref().map_or(true, |widget| widget.is_enabled())
    }
}

impl Node for ModelAction {
    fn core(&self) -> &NodeCore {
        &self.core
    }

    fn id_prefix(&self) -> &'static str {
        "g0a"
    }
}

impl HashNode for ModelAction {
    fn hash_code(&self) -> HashCode {
        self.hash
    }
}

impl PriorityNode for ModelAction {
    fn priority(&self) -> i32 {
        self.priority.load(Ordering::Relaxed)
    }
}

impl fmt::Display for ModelAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state().map(|s| s.id()).unwrap_or_default();
        write!(f, "{{id: {}, act: {}, state: {}", self.id(), self.action_type, state)?;
        if let Some(target) = &self.target {
            write!(f, ", target: {}", target)?;
        }
        write!(f, ", visited: {}}}", self.visited_count())
    }
}

impl Serializable for ModelAction {
    fn serialize(&self) -> String {
        self.to_string()
    }
}
