//! Color and styling helpers for CLI output.
//!
//! Semantic Color Theme:
//!   - Success/Done:   green   (completed status, successful mutations)
//!   - Warning/Active: yellow  (in_progress and review, blocking flag)
//!   - Error/Blocked:  red     (blocked status, critical flag, cycles)
//!   - Info/Reference: cyan    (task and edge IDs)
//!   - Muted:          dimmed  (field labels, arrows)
//!   - Emphasis:       bold    (section headers)

use crate::domain::TaskStatus;
use colored::Colorize;

use super::OutputConfig;

/// Apply semantic "success" color (green) to text.
pub fn success(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.green().to_string()
}

/// Apply semantic "error" color (red) to text.
pub fn error(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.red().to_string()
}

/// Apply semantic "warning" color (yellow) to text.
pub fn warning(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.yellow().to_string()
}

/// Colorize an ID (cyan).
pub(crate) fn colorize_id(id: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return id.to_string();
    }
    id.cyan().to_string()
}

/// Apply color to status text based on task status.
pub(crate) fn colorize_status(status: TaskStatus, config: &OutputConfig) -> String {
    let text = status.to_string();
    if !config.use_colors {
        return text;
    }
    match status {
        TaskStatus::Todo => text.white().to_string(),
        TaskStatus::InProgress | TaskStatus::Review => text.yellow().to_string(),
        TaskStatus::Blocked => text.red().to_string(),
        TaskStatus::Completed => text.green().to_string(),
    }
}

/// Get a colored status icon, with ASCII fallback support.
pub(crate) fn colored_status_icon(status: TaskStatus, config: &OutputConfig) -> String {
    let icon = if config.use_ascii {
        match status {
            TaskStatus::Todo => "o",
            TaskStatus::InProgress => ">",
            TaskStatus::Review => "?",
            TaskStatus::Blocked => "x",
            TaskStatus::Completed => "+",
        }
    } else {
        match status {
            TaskStatus::Todo => "○",
            TaskStatus::InProgress => "▶",
            TaskStatus::Review => "◎",
            TaskStatus::Blocked => "✗",
            TaskStatus::Completed => "✓",
        }
    };

    if !config.use_colors {
        return icon.to_string();
    }

    match status {
        TaskStatus::Todo => icon.white().to_string(),
        TaskStatus::InProgress | TaskStatus::Review => icon.yellow().to_string(),
        TaskStatus::Blocked => icon.red().to_string(),
        TaskStatus::Completed => icon.green().to_string(),
    }
}

/// Badges for the blocking and critical flags, empty when neither is set.
pub(crate) fn flag_badges(is_blocking: bool, is_critical: bool, config: &OutputConfig) -> String {
    let mut badges = Vec::new();
    if is_critical {
        badges.push(if config.use_colors {
            "[critical]".red().bold().to_string()
        } else {
            "[critical]".to_string()
        });
    }
    if is_blocking {
        badges.push(warning("[blocking]", config));
    }
    badges.join(" ")
}

/// Dependency arrow, with ASCII fallback support.
pub(crate) fn arrow(config: &OutputConfig) -> String {
    let arrow = if config.use_ascii { "->" } else { "→" };
    dimmed(arrow, config)
}

/// Apply dimmed style to text (for labels/field names).
pub(crate) fn dimmed(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.dimmed().to_string()
}

/// Apply bold style to text (for section headers).
pub(crate) fn bold(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.bold().to_string()
}
