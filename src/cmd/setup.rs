use crate::config::{Settings, SettingsStore, SpeechSettings};
use crate::error::AppResult;
use crate::services::Console;

/// Interactive wizard; existing values are offered as defaults.
pub fn run_setup(store: &mut SettingsStore, console: &mut dyn Console) -> AppResult<()> {
    let current = store.read()?;
    let speech = current
        .as_ref()
        .map(|settings| settings.speech.clone())
        .unwrap_or_default();

    let mut username = current.as_ref().map(|s| s.username.clone());
    let mut access_token = current.as_ref().map(|s| s.access_token.clone());
    let mut server_url = current.as_ref().map(|s| s.server_url.clone());
    let mut project_keys = current
        .as_ref()
        .map(|s| s.known_project_keys.join(", "))
        .filter(|keys| !keys.is_empty());
    let mut endpoint = Some(speech.endpoint.clone());
    let mut api_key = speech.api_key.clone();
    let mut model = Some(speech.model.clone());
    let mut language = speech.language.clone();

    console.say("Configuring voxticket.");
    console.say("Press Enter to keep the current value, '-' to clear it.");
    console.say("Secrets are stored in the local settings file; protect your filesystem accordingly.");
    console.say("");

    apply_prompt(console, "Jira username (email)", &mut username, false)?;
    apply_prompt(console, "Jira API token", &mut access_token, true)?;
    apply_prompt(
        console,
        "Jira server URL (e.g., https://company.atlassian.net)",
        &mut server_url,
        false,
    )?;
    apply_prompt(
        console,
        "Known project keys (comma separated)",
        &mut project_keys,
        false,
    )?;
    apply_prompt(console, "Transcription endpoint", &mut endpoint, false)?;
    apply_prompt(console, "Transcription API key", &mut api_key, true)?;
    apply_prompt(console, "Transcription model", &mut model, false)?;
    apply_prompt(console, "Spoken language (ISO-639-1)", &mut language, false)?;

    let defaults = SpeechSettings::default();
    let settings = Settings {
        username: username.unwrap_or_default(),
        access_token: access_token.unwrap_or_default(),
        server_url: server_url.unwrap_or_default(),
        known_project_keys: project_keys
            .map(|keys| keys.split(',').map(str::to_string).collect())
            .unwrap_or_default(),
        speech: SpeechSettings {
            endpoint: endpoint.unwrap_or(defaults.endpoint),
            api_key,
            model: model.unwrap_or(defaults.model),
            language,
            ..speech
        },
    }
    .normalized();
    settings.validate()?;

    store.save(settings)?;
    console.say(&format!("\nSettings saved to {}", store.path().display()));
    Ok(())
}

fn apply_prompt(
    console: &mut dyn Console,
    field: &str,
    target: &mut Option<String>,
    secret: bool,
) -> AppResult<()> {
    match prompt(console, field, target.as_deref(), secret)? {
        PromptAction::Keep => {}
        PromptAction::Clear => *target = None,
        PromptAction::Set(value) => *target = Some(value),
    }
    Ok(())
}

fn prompt(
    console: &mut dyn Console,
    field: &str,
    current: Option<&str>,
    secret: bool,
) -> AppResult<PromptAction> {
    let question = match (current.filter(|value| !value.is_empty()), secret) {
        (Some(_), true) => format!("{field} [****] (Enter to keep, '-' to clear): "),
        (Some(value), false) => format!("{field} [{value}] (Enter to keep, '-' to clear): "),
        (None, _) => format!("{field} (Enter to skip): "),
    };

    let input = console.ask(&question)?;
    let trimmed = input.trim();

    if trimmed.is_empty() {
        Ok(PromptAction::Keep)
    } else if trimmed == "-" {
        Ok(PromptAction::Clear)
    } else {
        Ok(PromptAction::Set(trimmed.to_string()))
    }
}

enum PromptAction {
    Keep,
    Clear,
    Set(String),
}
