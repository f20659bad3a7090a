use colored::Colorize;

use crate::context::AppContext;
use crate::error::AppResult;
use crate::services::Console;
use crate::workflow::ticket::create_ticket_interactively;

pub async fn run(ctx: &AppContext, console: &mut dyn Console) -> AppResult<()> {
    let outcome = create_ticket_interactively(ctx, console).await?;
    console.say(&format!("\n{} {}", "✔".bright_green(), outcome.confirmation()));
    Ok(())
}
