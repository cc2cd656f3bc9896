//! Conversation log between the user and the design agent.

use crate::time::now_millis;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who produced an activity entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionRole {
    User,
    #[serde(rename = "ai")]
    Agent,
}

/// One entry of the activity log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiAction {
    pub id: String,
    #[serde(rename = "type")]
    pub role: ActionRole,
    pub message: String,
    pub timestamp: u64,
    #[serde(default, rename = "targetElementName", skip_serializing_if = "Option::is_none")]
    pub target_name: Option<String>,
}

/// A canned refinement instruction offered next to the prompt box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuickPrompt {
    pub label: &'static str,
    pub icon: &'static str,
    pub prompt: &'static str,
}

/// Built-in refinement shortcuts.
pub const QUICK_PROMPTS: &[QuickPrompt] = &[
    QuickPrompt {
        label: "Modernize",
        icon: "sparkles",
        prompt: "Make this look hyper-modern and sleek",
    },
    QuickPrompt {
        label: "Glassmorphism",
        icon: "filter",
        prompt: "Apply a sophisticated glassmorphism style",
    },
    QuickPrompt {
        label: "Highlight",
        icon: "maximize",
        prompt: "Make this element stand out with more contrast",
    },
    QuickPrompt {
        label: "Dark Mode",
        icon: "layout",
        prompt: "Switch this component to a dark theme palette",
    },
];

/// Append-only log of prompts and agent replies, oldest first.
#[derive(Debug, Clone, Default)]
pub struct ActivityLog {
    entries: Vec<AiAction>,
}

impl ActivityLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a user prompt.
    pub fn user(&mut self, message: impl Into<String>, target_name: Option<String>) {
        self.push(ActionRole::User, message.into(), target_name);
    }

    /// Record an agent reply.
    pub fn agent(&mut self, message: impl Into<String>, target_name: Option<String>) {
        self.push(ActionRole::Agent, message.into(), target_name);
    }

    fn push(&mut self, role: ActionRole, message: String, target_name: Option<String>) {
        self.entries.push(AiAction {
            id: Uuid::new_v4().to_string(),
            role,
            message,
            timestamp: now_millis(),
            target_name,
        });
    }

    pub fn entries(&self) -> &[AiAction] {
        &self.entries
    }

    pub fn last(&self) -> Option<&AiAction> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_in_order() {
        let mut log = ActivityLog::new();
        log.user("make it blue", Some("Hero".into()));
        log.agent("Refined Hero", Some("Hero".into()));

        assert_eq!(log.len(), 2);
        assert_eq!(log.entries()[0].role, ActionRole::User);
        assert_eq!(log.last().unwrap().role, ActionRole::Agent);
        assert_ne!(log.entries()[0].id, log.entries()[1].id);
    }

    #[test]
    fn test_serialized_shape() {
        let mut log = ActivityLog::new();
        log.agent("done", None);

        let json = serde_json::to_value(log.last().unwrap()).unwrap();
        assert_eq!(json["type"], "ai");
        assert!(json.get("targetElementName").is_none());
    }

    #[test]
    fn test_quick_prompts() {
        assert_eq!(QUICK_PROMPTS.len(), 4);
        assert!(QUICK_PROMPTS.iter().all(|q| !q.prompt.is_empty()));
    }
}
