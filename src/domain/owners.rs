use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::error::AppResult;
use crate::services::IssueTrackerService;

pub const PRODUCT_OWNERS: [&str; 5] = [
    "Damien Charlemagne",
    "Guillaume Rager",
    "Anshu Sharma",
    "Arnaud Garnier",
    "Samy Bouachour",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectShortcut {
    pub name: &'static str,
    pub key: &'static str,
    pub default_owner: &'static str,
}

pub const PROJECT_SHORTCUTS: [ProjectShortcut; 2] = [
    ProjectShortcut {
        name: "Imaging on Cloud",
        key: "IMAGLITE",
        default_owner: "Damien Charlemagne",
    },
    ProjectShortcut {
        name: "Profiler",
        key: "PROFILER",
        default_owner: "Guillaume Rager",
    },
];

pub fn find_shortcut(name: &str) -> Option<&'static ProjectShortcut> {
    PROJECT_SHORTCUTS.iter().find(|shortcut| shortcut.name == name)
}

/// Product owner names mapped to their Jira account ids. Built once per run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OwnerRegistry {
    names: Vec<String>,
    account_ids: BTreeMap<String, String>,
}

impl OwnerRegistry {
    pub async fn resolve(tracker: &dyn IssueTrackerService, names: &[&str]) -> AppResult<Self> {
        let mut registry = Self::default();
        for name in names {
            let users = tracker.search_users(name, 1).await?;
            let account_id = users
                .into_iter()
                .next()
                .filter(|user| user.display_name.to_lowercase() == name.to_lowercase())
                .map(|user| user.account_id);

            match &account_id {
                Some(id) => debug!(owner = name, account_id = %id, "resolved product owner"),
                None => warn!(owner = name, "product owner has no matching Jira account"),
            }
            registry.insert(name, account_id);
        }
        Ok(registry)
    }

    fn insert(&mut self, name: &str, account_id: Option<String>) {
        self.names.push(name.to_string());
        if let Some(id) = account_id {
            self.account_ids.insert(name.to_string(), id);
        }
    }

    pub fn account_id(&self, name: &str) -> Option<&str> {
        self.account_ids.get(name).map(String::as_str)
    }

    /// Owners that can be assigned, in registry order.
    pub fn selectable(&self) -> Vec<&str> {
        self.names
            .iter()
            .filter(|name| self.account_ids.contains_key(name.as_str()))
            .map(String::as_str)
            .collect()
    }
}
