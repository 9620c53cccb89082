//! Declarative parameter layouts for interactive editors.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiIcon {
    None,
    Info,
    Error,
}

/// One element of a parameter panel. Presentation only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiItem {
    Toggle {
        field: &'static str,
        label: &'static str,
        value: bool,
        enabled: bool,
    },
    Text {
        field: &'static str,
        label: &'static str,
        value: String,
        enabled: bool,
    },
    Dropdown {
        field: &'static str,
        label: &'static str,
        value: String,
        options: Vec<String>,
        enabled: bool,
    },
    Label {
        text: String,
        icon: UiIcon,
    },
}

impl UiItem {
    pub fn field(&self) -> Option<&'static str> {
        match self {
            UiItem::Toggle { field, .. }
            | UiItem::Text { field, .. }
            | UiItem::Dropdown { field, .. } => Some(*field),
            UiItem::Label { .. } => None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        match self {
            UiItem::Toggle { enabled, .. }
            | UiItem::Text { enabled, .. }
            | UiItem::Dropdown { enabled, .. } => *enabled,
            UiItem::Label { .. } => true,
        }
    }
}

impl fmt::Display for UiItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UiItem::Toggle { label, value, .. } => {
                write!(f, "[{}] {}", if *value { "x" } else { " " }, label)
            }
            UiItem::Text { label, value, .. } => write!(f, "{}: {:?}", label, value),
            UiItem::Dropdown {
                label,
                value,
                options,
                ..
            } => write!(f, "{}: {} ({})", label, value, options.join("|")),
            UiItem::Label { text, icon } => match icon {
                UiIcon::None => write!(f, "{}", text),
                UiIcon::Info => write!(f, "i {}", text),
                UiIcon::Error => write!(f, "! {}", text),
            },
        }
    }
}
