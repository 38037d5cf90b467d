//! Shared helper functions for CLI commands

use console::{style, StyledObject};

use crate::core::settings::{BadgeVariant, StatusStyles};
use crate::entities::repair::RepairStatus;

/// Truncate a string to max_len characters, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Money with two decimals
pub fn format_money(amount: f64) -> String {
    format!("${:.2}", amount)
}

/// Status text styled after its badge variant
pub fn styled_status(status: RepairStatus, styles: &StatusStyles) -> StyledObject<String> {
    let text = status.to_string();
    match styles.variant(status) {
        BadgeVariant::Default => style(text).bold(),
        BadgeVariant::Secondary => style(text).cyan(),
        BadgeVariant::Destructive => style(text).red().bold(),
        BadgeVariant::Outline => style(text).dim(),
    }
}
