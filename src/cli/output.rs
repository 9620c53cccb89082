//! Terminal output formatting with colors
//!
//! Respects NO_COLOR, CLICOLOR, CLICOLOR_FORCE automatically.

use colored::Colorize;
use itertools::Itertools;

use crate::application::ui::{UiIcon, UiItem};
use crate::domain::naming::BoneKind;
use crate::domain::Bone;

/// Print error (red bold "error:" prefix) to stderr
pub fn error(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "error".red().bold(), msg);
}

/// Print success status (green checkmark)
pub fn success(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{} {}", "✓".green(), msg);
}

/// Print completed action (green label)
pub fn action(label: &str, msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}: {}", label.green(), msg);
}

/// Print section header (cyan bold)
pub fn header(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg.to_string().cyan().bold());
}

/// Print indented detail (no color)
pub fn detail(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("  {}", msg);
}

/// Print plain output (no color, for data such as JSON)
pub fn info(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg);
}

/// Tree label for a bone: name colored by role, then constraints and widget.
pub fn bone_label(bone: &Bone) -> String {
    let name = match BoneKind::of_name(&bone.name) {
        BoneKind::Org => bone.name.dimmed(),
        BoneKind::Ctrl => bone.name.green().bold(),
        BoneKind::Mch => bone.name.blue(),
        BoneKind::Def => bone.name.yellow(),
    };

    let mut label = name.to_string();
    if !bone.constraints.is_empty() {
        let stack = bone
            .constraints
            .iter()
            .map(|c| match c.targets.as_slice() {
                [] => c.name.clone(),
                targets => format!("{} -> {}", c.name, targets.join(",")),
            })
            .join("; ");
        label.push_str(&format!(" [{}]", stack));
    }
    if let Some(widget) = &bone.widget {
        label.push_str(&format!(" ({} {})", widget.shape, widget.object_name).cyan().to_string());
    }
    label
}

/// Render one parameter panel row; disabled rows are dimmed.
pub fn ui_item(item: &UiItem) -> String {
    let text = item.to_string();
    match item {
        UiItem::Label {
            icon: UiIcon::Error,
            ..
        } => text.red().to_string(),
        UiItem::Label {
            icon: UiIcon::Info, ..
        } => text.cyan().to_string(),
        _ if !item.is_enabled() => text.dimmed().to_string(),
        _ => text,
    }
}
