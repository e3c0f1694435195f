//! BDD step definitions for the notification relay

pub mod action_steps;
pub mod common_steps;
pub mod polling_steps;
pub mod status_steps;

/// Split a feature-file list like "A, B, C"
pub fn parse_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}
