use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;

pub const OWNER_FIELD: &str = "customfield_10101";
pub const BUG_MARKER_FIELD: &str = "customfield_10175";
pub const BUG_MARKER_VALUE: &str = "-";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueType {
    Story,
    TechnicalStory,
    Bug,
}

impl IssueType {
    pub const ALL: [IssueType; 3] = [IssueType::Story, IssueType::TechnicalStory, IssueType::Bug];

    /// Title-cased name as Jira expects it.
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueType::Story => "Story",
            IssueType::TechnicalStory => "Technical Story",
            IssueType::Bug => "Bug",
        }
    }

    /// Sentence-cased name for messages, e.g. "Technical story".
    pub fn capitalized(&self) -> &'static str {
        match self {
            IssueType::Story => "Story",
            IssueType::TechnicalStory => "Technical story",
            IssueType::Bug => "Bug",
        }
    }
}

impl fmt::Display for IssueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    Minor,
    Major,
    Critical,
    Blocker,
}

impl Priority {
    pub const ALL: [Priority; 4] = [
        Priority::Minor,
        Priority::Major,
        Priority::Critical,
        Priority::Blocker,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Minor => "Minor",
            Priority::Major => "Major",
            Priority::Critical => "Critical",
            Priority::Blocker => "Blocker",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything gathered from the user for one ticket.
#[derive(Debug, Clone, PartialEq)]
pub struct TicketDraft {
    pub project_key: String,
    pub issue_type: IssueType,
    pub owner_account_id: Option<String>,
    pub priority: Option<Priority>,
    pub summary: String,
    pub description: String,
    pub extra_fields: BTreeMap<String, Value>,
}

impl TicketDraft {
    pub fn new(project_key: impl Into<String>, issue_type: IssueType) -> Self {
        Self {
            project_key: project_key.into(),
            issue_type,
            owner_account_id: None,
            priority: None,
            summary: String::new(),
            description: String::new(),
            extra_fields: BTreeMap::new(),
        }
    }

    /// Bugs carry a priority and the fixed marker field; other types carry neither.
    pub fn set_priority(&mut self, priority: Priority) {
        if self.issue_type != IssueType::Bug {
            return;
        }
        self.priority = Some(priority);
        self.extra_fields.insert(
            BUG_MARKER_FIELD.to_string(),
            Value::String(BUG_MARKER_VALUE.to_string()),
        );
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub key: String,
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issue_type_names_are_title_cased() {
        let names: Vec<_> = IssueType::ALL.iter().map(IssueType::as_str).collect();
        assert_eq!(names, vec!["Story", "Technical Story", "Bug"]);
    }

    #[test]
    fn messages_use_sentence_case() {
        assert_eq!(IssueType::TechnicalStory.capitalized(), "Technical story");
        assert_eq!(IssueType::Bug.capitalized(), "Bug");
    }

    #[test]
    fn priority_only_applies_to_bugs() {
        let mut story = TicketDraft::new("XYZ", IssueType::Story);
        story.set_priority(Priority::Major);
        assert_eq!(story.priority, None);
        assert!(story.extra_fields.is_empty());

        let mut bug = TicketDraft::new("XYZ", IssueType::Bug);
        bug.set_priority(Priority::Critical);
        assert_eq!(bug.priority, Some(Priority::Critical));
        assert_eq!(
            bug.extra_fields.get(BUG_MARKER_FIELD),
            Some(&Value::String("-".to_string()))
        );
    }
}
