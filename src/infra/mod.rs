pub mod jira;
pub mod speech;
pub mod terminal;
