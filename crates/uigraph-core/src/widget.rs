//! Widgets: the interactive leaves of a state.
//!
//! A [`Widget`] is built from a flat [`WidgetSpec`] (one UI-tree node as
//! reported by the device layer). Construction derives the action set and
//! computes the widget identity once; widgets are immutable afterwards.
//!
//! # Identity
//!
//! The hash covers class, resource id, operate mask and scroll type. Text and
//! sibling index are folded in only when [`HashConfig`] asks for it. Class and
//! resource id are only kept for widgets that offer at least one action, so
//! all inert widgets of the same shape share one identity.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use unicode_width::UnicodeWidthStr;

use crate::action::{ActionType, ScrollType};
use crate::config::HashConfig;
use crate::geometry::{get_rect, Rect};
use crate::hash::{mix64, ContentHasher, HashCode, HashNode};

const EDIT_TEXT_CLASSES: [&str; 4] = [
    "android.widget.EditText",
    "android.inputmethodservice.ExtractEditText",
    "android.widget.AutoCompleteTextView",
    "android.widget.MultiAutoCompleteTextView",
];

const LIST_CLASSES: [&str; 3] = [
    "android.widget.ListView",
    "android.support.v7.widget.RecyclerView",
    "androidx.recyclerview.widget.RecyclerView",
];

const VERTICAL_SCROLL_CLASSES: [&str; 6] = [
    "android.widget.ScrollView",
    "android.widget.ListView",
    "android.widget.ExpandableListView",
    "android.support.v17.leanback.widget.VerticalGridView",
    "android.support.v7.widget.RecyclerView",
    "androidx.recyclerview.widget.RecyclerView",
];

const HORIZONTAL_SCROLL_CLASSES: [&str; 3] = [
    "android.widget.HorizontalScrollView",
    "android.support.v17.leanback.widget.HorizontalGridView",
    "android.support.v4.view.ViewPager",
];

/// Operate-mask bits.
pub mod operate {
    pub const CHECKABLE: u8 = 1 << 0;
    pub const ENABLED: u8 = 1 << 1;
    pub const CLICKABLE: u8 = 1 << 2;
    pub const SCROLLABLE: u8 = 1 << 3;
    pub const LONG_CLICKABLE: u8 = 1 << 4;
}

/// One UI-tree node as delivered by the device layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetSpec {
    pub class: String,
    pub resource_id: String,
    pub text: String,
    pub content_desc: String,
    pub bounds: Option<Rect>,
    pub index: i32,
    pub clickable: bool,
    pub long_clickable: bool,
    pub checkable: bool,
    pub scrollable: bool,
    pub enabled: bool,
    /// Explicit scroll capability (`all`, `horizontal`, `vertical`, `none`).
    /// Inferred from the class when absent.
    pub scroll_type: Option<String>,
}

impl WidgetSpec {
    /// Scroll capability: the explicit value, or one inferred from the class.
    #[must_use]
    pub fn resolved_scroll_type(&self) -> ScrollType {
        if let Some(name) = &self.scroll_type {
            return ScrollType::from_name(name);
        }
        if !self.scrollable {
            return ScrollType::None;
        }
        let class = self.class.as_str();
        if VERTICAL_SCROLL_CLASSES.contains(&class) {
            ScrollType::Vertical
        } else if HORIZONTAL_SCROLL_CLASSES.contains(&class) {
            ScrollType::Horizontal
        } else {
            ScrollType::All
        }
    }
}

/// An interactive element of a state.
#[derive(Debug, Clone)]
pub struct Widget {
    class: String,
    resource_id: String,
    text: String,
    content_desc: String,
    bounds: Arc<Rect>,
    index: i32,
    enabled: bool,
    editable: bool,
    operate_mask: u8,
    scroll_type: ScrollType,
    actions: BTreeSet<ActionType>,
    hash: HashCode,
}

impl Widget {
    #[must_use]
    pub fn new(spec: &WidgetSpec, config: &HashConfig) -> Self {
        let mut operate_mask = 0;
        for (flag, bit) in [
            (spec.checkable, operate::CHECKABLE),
            (spec.enabled, operate::ENABLED),
            (spec.clickable, operate::CLICKABLE),
            (spec.scrollable, operate::SCROLLABLE),
            (spec.long_clickable, operate::LONG_CLICKABLE),
        ] {
            if flag {
                operate_mask |= bit;
            }
        }

        let mut actions = BTreeSet::new();
        if spec.long_clickable {
            actions.insert(ActionType::LongClick);
        }
        if spec.checkable || spec.clickable {
            actions.insert(ActionType::Click);
        }
        let scroll_type = spec.resolved_scroll_type();
        actions.extend(scroll_type.actions().iter().copied());

        let (class, resource_id, editable) = if actions.is_empty() {
            (String::new(), String::new(), false)
        } else {
            if config.scroll_bottom_up_n && LIST_CLASSES.contains(&spec.class.as_str()) {
                actions.insert(ActionType::ScrollBottomUpN);
            }
            let editable = EDIT_TEXT_CLASSES.contains(&spec.class.as_str());
            (spec.class.clone(), spec.resource_id.clone(), editable)
        };

        let bounds = get_rect(spec.bounds.map(Arc::new).as_ref());
        let text = normalize_text(&spec.text);

        let mut hasher = ContentHasher::new();
        hasher
            .write_str(&class)
            .write_str(&resource_id)
            .write_u32(u32::from(operate_mask))
            .write_str(scroll_type.name());
        if config.with_text && text.width() <= config.text_max_width {
            hasher.write_str(&text);
        }
        if config.with_index {
            hasher.write_i32(spec.index);
        }

        Self {
            class,
            resource_id,
            text,
            content_desc: spec.content_desc.clone(),
            bounds,
            index: spec.index,
            enabled: spec.enabled,
            editable,
            operate_mask,
            scroll_type,
            actions,
            hash: mix64(hasher.finish()),
        }
    }

    #[must_use]
    pub fn class(&self) -> &str {
        &self.class
    }

    #[must_use]
    pub fn resource_id(&self) -> &str {
        &self.resource_id
    }

    /// Text with digits and blanks removed.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn content_desc(&self) -> &str {
        &self.content_desc
    }

    /// Bounds, or the shared zero sentinel when the node had none.
    #[must_use]
    pub fn bounds(&self) -> &Arc<Rect> {
        &self.bounds
    }

    #[must_use]
    pub fn index(&self) -> i32 {
        self.index
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    #[must_use]
    pub fn is_editable(&self) -> bool {
        self.editable
    }

    #[must_use]
    pub fn has_operate(&self, bit: u8) -> bool {
        self.operate_mask & bit != 0
    }

    #[must_use]
    pub fn scroll_type(&self) -> ScrollType {
        self.scroll_type
    }

    /// Action types this widget offers, in declaration order.
    #[must_use]
    pub fn actions(&self) -> &BTreeSet<ActionType> {
        &self.actions
    }

    #[must_use]
    pub fn has_action(&self) -> bool {
        !self.actions.is_empty()
    }
}

impl HashNode for Widget {
    fn hash_code(&self) -> HashCode {
        self.hash
    }
}

impl fmt::Display for Widget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut predicates = Vec::new();
        if !self.class.is_empty() {
            predicates.push(format!("@class='{}'", self.class));
        }
        if !self.resource_id.is_empty() {
            predicates.push(format!("@resource-id='{}'", self.resource_id));
        }
        if !self.text.is_empty() {
            predicates.push(format!("@text='{}'", self.text));
        }
        if !self.content_desc.is_empty() {
            predicates.push(format!("@content-desc='{}'", self.content_desc));
        }
        if predicates.is_empty() {
            write!(f, "//*{}", self.bounds)
        } else {
            write!(f, "//*[{}]{}", predicates.join(" and "), self.bounds)
        }
    }
}

/// Drop digits and blanks so counters and timestamps don't split states.
fn normalize_text(text: &str) -> String {
    text.chars()
        .filter(|c| *c != ' ' && !c.is_ascii_digit())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(class: &str) -> WidgetSpec {
        WidgetSpec {
            class: class.to_string(),
            resource_id: format!("{}:id/main", class),
            bounds: Some(Rect::new(0, 0, 100, 50)),
            enabled: true,
            ..WidgetSpec::default()
        }
    }

    #[test]
    fn clickable_widget_offers_click() {
        let widget = Widget::new(
            &WidgetSpec {
                clickable: true,
                ..spec("android.widget.Button")
            },
            &HashConfig::default(),
        );
        assert!(widget.actions().contains(&ActionType::Click));
        assert_eq!(widget.actions().len(), 1);
        assert!(widget.has_operate(operate::CLICKABLE));
        assert_eq!(widget.class(), "android.widget.Button");
    }

    #[test]
    fn checkable_and_long_clickable_actions() {
        let widget = Widget::new(
            &WidgetSpec {
                checkable: true,
                long_clickable: true,
                ..spec("android.widget.CheckBox")
            },
            &HashConfig::default(),
        );
        let actions: Vec<_> = widget.actions().iter().copied().collect();
        assert_eq!(actions, vec![ActionType::Click, ActionType::LongClick]);
    }

    #[test]
    fn scroll_type_inferred_from_class() {
        let scrollable = |class: &str| WidgetSpec {
            scrollable: true,
            ..spec(class)
        };
        assert_eq!(
            scrollable("android.widget.ListView").resolved_scroll_type(),
            ScrollType::Vertical
        );
        assert_eq!(
            scrollable("android.support.v4.view.ViewPager").resolved_scroll_type(),
            ScrollType::Horizontal
        );
        assert_eq!(
            scrollable("com.example.Canvas").resolved_scroll_type(),
            ScrollType::All
        );
        assert_eq!(
            spec("android.widget.ListView").resolved_scroll_type(),
            ScrollType::None
        );
    }

    #[test]
    fn explicit_scroll_type_wins() {
        let widget = Widget::new(
            &WidgetSpec {
                scrollable: true,
                scroll_type: Some("horizontal".to_string()),
                ..spec("android.widget.ListView")
            },
            &HashConfig::default(),
        );
        assert_eq!(widget.scroll_type(), ScrollType::Horizontal);
        assert!(widget.actions().contains(&ActionType::ScrollLeftRight));
        assert!(widget.actions().contains(&ActionType::ScrollRightLeft));
        assert!(!widget.actions().contains(&ActionType::ScrollTopDown));
    }

    #[test]
    fn scroll_bottom_up_n_only_when_configured() {
        let list = WidgetSpec {
            scrollable: true,
            ..spec("androidx.recyclerview.widget.RecyclerView")
        };
        let plain = Widget::new(&list, &HashConfig::default());
        assert!(!plain.actions().contains(&ActionType::ScrollBottomUpN));

        let config = HashConfig {
            scroll_bottom_up_n: true,
            ..HashConfig::default()
        };
        let extended = Widget::new(&list, &config);
        assert!(extended.actions().contains(&ActionType::ScrollBottomUpN));
    }

    #[test]
    fn inert_widgets_share_identity() {
        let a = Widget::new(&spec("android.widget.TextView"), &HashConfig::default());
        let b = Widget::new(&spec("android.widget.ImageView"), &HashConfig::default());
        assert!(!a.has_action());
        assert_eq!(a.class(), "");
        assert_eq!(a.hash_code(), b.hash_code());
    }

    #[test]
    fn editable_detection() {
        let widget = Widget::new(
            &WidgetSpec {
                clickable: true,
                ..spec("android.widget.EditText")
            },
            &HashConfig::default(),
        );
        assert!(widget.is_editable());
    }

    #[test]
    fn missing_or_empty_bounds_use_zero_sentinel() {
        let missing = Widget::new(
            &WidgetSpec {
                bounds: None,
                ..spec("a")
            },
            &HashConfig::default(),
        );
        assert!(Arc::ptr_eq(missing.bounds(), &crate::geometry::rect_zero()));

        let empty = Widget::new(
            &WidgetSpec {
                bounds: Some(Rect::new(5, 5, 5, 9)),
                ..spec("a")
            },
            &HashConfig::default(),
        );
        assert!(Arc::ptr_eq(empty.bounds(), &crate::geometry::rect_zero()));
    }

    #[test]
    fn text_is_normalized() {
        let widget = Widget::new(
            &WidgetSpec {
                text: "Inbox 12 new".to_string(),
                ..spec("a")
            },
            &HashConfig::default(),
        );
        assert_eq!(widget.text(), "Inboxnew");
    }

    #[test]
    fn text_only_hashed_when_enabled_and_short() {
        let ok = WidgetSpec {
            clickable: true,
            text: "OK".to_string(),
            ..spec("android.widget.Button")
        };
        let cancel = WidgetSpec {
            text: "Cancel".to_string(),
            ..ok.clone()
        };
        let long_a = WidgetSpec {
            text: "Subscribe now".to_string(),
            ..ok.clone()
        };
        let long_b = WidgetSpec {
            text: "Unsubscribe later".to_string(),
            ..ok.clone()
        };

        let default = HashConfig::default();
        assert_eq!(
            Widget::new(&ok, &default).hash_code(),
            Widget::new(&cancel, &default).hash_code()
        );

        let with_text = HashConfig {
            with_text: true,
            ..HashConfig::default()
        };
        assert_ne!(
            Widget::new(&ok, &with_text).hash_code(),
            Widget::new(&cancel, &with_text).hash_code()
        );
        // Both wider than the limit, so text stays out of the hash
        assert_eq!(
            Widget::new(&long_a, &with_text).hash_code(),
            Widget::new(&long_b, &with_text).hash_code()
        );
    }

    #[test]
    fn wide_characters_count_double() {
        let config = HashConfig {
            with_text: true,
            text_max_width: 4,
            ..HashConfig::default()
        };
        let base = WidgetSpec {
            clickable: true,
            ..spec("android.widget.Button")
        };
        let two = |text: &str| {
            Widget::new(
                &WidgetSpec {
                    text: text.to_string(),
                    ..base.clone()
                },
                &config,
            )
            .hash_code()
        };
        // Two CJK characters fill the width limit exactly
        assert_ne!(two("确定"), two("取消"));
        // Three exceed it
        assert_eq!(two("确定吗"), two("取消吗"));
    }

    #[test]
    fn index_only_hashed_when_enabled() {
        let first = WidgetSpec {
            clickable: true,
            index: 0,
            ..spec("android.widget.Button")
        };
        let second = WidgetSpec {
            index: 1,
            ..first.clone()
        };
        let default = HashConfig::default();
        assert_eq!(
            Widget::new(&first, &default).hash_code(),
            Widget::new(&second, &default).hash_code()
        );
        let with_index = HashConfig {
            with_index: true,
            ..HashConfig::default()
        };
        assert_ne!(
            Widget::new(&first, &with_index).hash_code(),
            Widget::new(&second, &with_index).hash_code()
        );
    }

    #[test]
    fn display_is_xpath_like() {
        let widget = Widget::new(
            &WidgetSpec {
                clickable: true,
                text: "OK".to_string(),
                ..spec("android.widget.Button")
            },
            &HashConfig::default(),
        );
        let text = widget.to_string();
        assert!(text.starts_with("//*["));
        assert!(text.contains("@class='android.widget.Button'"));
        assert!(text.contains("@text='OK'"));
        assert!(text.contains("[0,0][100,50]"));
    }

    #[test]
    fn spec_deserializes_with_defaults() {
        let json = r#"{"class":"android.widget.Button","clickable":true,
            "bounds":{"left":0,"top":0,"right":10,"bottom":10}}"#;
        let spec: WidgetSpec = serde_json::from_str(json).unwrap();
        assert!(spec.clickable);
        assert!(!spec.enabled);
        assert_eq!(spec.bounds, Some(Rect::new(0, 0, 10, 10)));
        assert!(spec.scroll_type.is_none());
    }
}
