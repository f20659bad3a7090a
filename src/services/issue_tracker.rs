use async_trait::async_trait;

use crate::domain::project::ProjectSummary;
use crate::domain::ticket::{Ticket, TicketDraft};
use crate::domain::user::RemoteUser;
use crate::error::AppResult;

#[async_trait]
pub trait IssueTrackerService: Send + Sync {
    async fn search_users(&self, query: &str, max_results: u32) -> AppResult<Vec<RemoteUser>>;
    async fn list_projects(&self) -> AppResult<Vec<ProjectSummary>>;
    async fn create_ticket(&self, draft: &TicketDraft) -> AppResult<Ticket>;
    async fn assign_ticket(&self, ticket_key: &str, assignee: &RemoteUser) -> AppResult<()>;
}
