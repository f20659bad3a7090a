use tracing::{debug, info, warn};

use crate::context::AppContext;
use crate::domain::owners::{OwnerRegistry, PRODUCT_OWNERS, PROJECT_SHORTCUTS, find_shortcut};
use crate::domain::project::{clickable_path, write_project_listing};
use crate::domain::ticket::{IssueType, Priority, Ticket, TicketDraft};
use crate::error::{AppError, AppResult, TrackerError};
use crate::services::{Console, IssueTrackerService};
use crate::workflow::input::{capture_text, choose};

const OTHER_PROJECT: &str = "Other";
const LIST_COMMAND: &str = "ls";

pub struct TicketWorkflowOutcome {
    pub ticket: Ticket,
    pub issue_type: IssueType,
    pub assigned_to_self: bool,
}

impl TicketWorkflowOutcome {
    pub fn confirmation(&self) -> String {
        let issue_type = self.issue_type.capitalized();
        if self.assigned_to_self {
            format!(
                "{issue_type} successfully created and assigned to you!: {}",
                self.ticket.url
            )
        } else {
            format!("{issue_type} created successfully!: {}", self.ticket.url)
        }
    }
}

struct ProjectTarget {
    key: String,
    owner_account_id: Option<String>,
}

pub async fn create_ticket_interactively(
    ctx: &AppContext,
    console: &mut dyn Console,
) -> AppResult<TicketWorkflowOutcome> {
    let tracker = ctx.issue_tracker.as_ref();
    let owners = OwnerRegistry::resolve(tracker, &PRODUCT_OWNERS).await?;

    let target = choose_project(ctx, console, &owners).await?;
    let issue_type = *choose(console, "\nChoose Issue Type:", &IssueType::ALL)?;

    let mut draft = TicketDraft::new(target.key, issue_type);
    draft.owner_account_id = target.owner_account_id;
    if issue_type == IssueType::Bug {
        let priority = *choose(console, "\nChoose Priority of Bug:", &Priority::ALL)?;
        draft.set_priority(priority);
    }

    draft.summary = capture_text(console, ctx.speech.as_ref(), "\nWhat is the summary?").await?;
    draft.description =
        capture_text(console, ctx.speech.as_ref(), "\nWhat is the description?").await?;

    let ticket = tracker.create_ticket(&draft).await?;
    info!(key = %ticket.key, "ticket created");

    let assigned_to_self =
        match assign_to_current_user(tracker, &ctx.settings.username, &ticket.key).await {
            Ok(()) => true,
            Err(err) => {
                warn!(key = %ticket.key, error = %err, "could not assign the ticket to the current user");
                false
            }
        };

    Ok(TicketWorkflowOutcome {
        ticket,
        issue_type,
        assigned_to_self,
    })
}

async fn choose_project(
    ctx: &AppContext,
    console: &mut dyn Console,
    owners: &OwnerRegistry,
) -> AppResult<ProjectTarget> {
    let mut options: Vec<&str> = PROJECT_SHORTCUTS.iter().map(|shortcut| shortcut.name).collect();
    options.push(OTHER_PROJECT);
    let picked = *choose(console, "\nChoose Project:", &options)?;

    if let Some(shortcut) = find_shortcut(picked) {
        let owner_account_id = match owners.account_id(shortcut.default_owner) {
            Some(id) => Some(id.to_string()),
            None => {
                warn!(owner = shortcut.default_owner, project = shortcut.key, "default owner unresolved");
                choose_owner(console, owners)?
            }
        };
        return Ok(ProjectTarget {
            key: shortcut.key.to_string(),
            owner_account_id,
        });
    }

    if !ctx.settings.known_project_keys.is_empty() {
        console.say(&format!(
            "Known project keys: {}",
            ctx.settings.known_project_keys.join(", ")
        ));
    }

    loop {
        let answer = console.ask("\nEnter the project key (type 'ls' to see list): ")?;
        let answer = answer.trim();

        if answer.eq_ignore_ascii_case(LIST_COMMAND) {
            show_project_listing(ctx, console).await?;
            continue;
        }
        if answer.is_empty() {
            console.say("Project key cannot be empty.");
            continue;
        }

        let owner_account_id = choose_owner(console, owners)?;
        return Ok(ProjectTarget {
            key: answer.to_uppercase(),
            owner_account_id,
        });
    }
}

fn choose_owner(console: &mut dyn Console, owners: &OwnerRegistry) -> AppResult<Option<String>> {
    let names = owners.selectable();
    if names.is_empty() {
        warn!("no product owner resolved to a Jira account");
        console.say("No product owner was found in Jira; the ticket will have none.");
        return Ok(None);
    }

    let name = *choose(console, "\nSelect Product Owner:", &names)?;
    Ok(owners.account_id(name).map(str::to_string))
}

async fn show_project_listing(ctx: &AppContext, console: &mut dyn Console) -> AppResult<()> {
    let projects = match ctx.issue_tracker.list_projects().await {
        Ok(projects) if !projects.is_empty() => projects,
        Ok(_) => {
            warn!("Jira returned no projects");
            return Err(AppError::StaleCredentials);
        }
        Err(err) => {
            warn!(error = %err, "project listing failed");
            return Err(AppError::StaleCredentials);
        }
    };

    let path = write_project_listing(&ctx.scratch_dir, projects)?;
    debug!(path = %path.display(), "project listing written");
    console.say(&format!(
        "List of Project Keys saved to: {}",
        clickable_path(&path)
    ));
    Ok(())
}

async fn assign_to_current_user(
    tracker: &dyn IssueTrackerService,
    username: &str,
    ticket_key: &str,
) -> AppResult<()> {
    let current_user = tracker
        .search_users(username, 1)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| TrackerError::other(format!("no Jira user matches {username}")))?;

    tracker.assign_ticket(ticket_key, &current_user).await
}
