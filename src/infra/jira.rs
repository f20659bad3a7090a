use std::collections::BTreeMap;

use async_trait::async_trait;
use base64::prelude::{BASE64_STANDARD, Engine as _};
use reqwest::{
    Client, RequestBuilder, Response,
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use tracing::debug;

use crate::config::Settings;
use crate::domain::project::ProjectSummary;
use crate::domain::ticket::{OWNER_FIELD, Ticket, TicketDraft};
use crate::domain::user::RemoteUser;
use crate::error::{AppResult, TrackerError};
use crate::services::IssueTrackerService;

pub struct JiraClient {
    http: Client,
    base_url: String,
    auth_header: String,
}

impl JiraClient {
    /// Binds a client to the configured server. Credentials are checked by
    /// the first request, not here.
    pub fn connect(settings: &Settings) -> Self {
        Self {
            http: Client::new(),
            base_url: settings.server_url.trim_end_matches('/').to_string(),
            auth_header: Self::auth_header(&settings.username, &settings.access_token),
        }
    }

    fn auth_header(username: &str, token: &str) -> String {
        let credentials = format!("{username}:{token}");
        let encoded = BASE64_STANDARD.encode(credentials);
        format!("Basic {encoded}")
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/rest/api/3/{}", self.base_url, path)
    }

    fn browse_url(&self, key: &str) -> String {
        format!("{}/browse/{}", self.base_url, key)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header(AUTHORIZATION, &self.auth_header)
            .header(ACCEPT, "application/json")
    }

    async fn send(&self, request: RequestBuilder) -> AppResult<Response> {
        let response = self
            .authorized(request)
            .send()
            .await
            .map_err(|err| TrackerError::transport(format!("failed to call Jira: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unable to read response>".to_string());
            return Err(TrackerError::from_response(status.as_u16(), error_message(&body)).into());
        }
        Ok(response)
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> AppResult<T> {
        response.json::<T>().await.map_err(|err| {
            TrackerError::other(format!("failed to parse Jira response: {err}")).into()
        })
    }
}

#[async_trait]
impl IssueTrackerService for JiraClient {
    async fn search_users(&self, query: &str, max_results: u32) -> AppResult<Vec<RemoteUser>> {
        debug!(query, max_results, "searching Jira users");
        let request = self.http.get(self.endpoint("user/search")).query(&[
            ("query", query.to_string()),
            ("maxResults", max_results.to_string()),
        ]);
        let users: Vec<JiraUser> = Self::read_json(self.send(request).await?).await?;

        Ok(users
            .into_iter()
            .filter_map(|user| {
                Some(RemoteUser::new(user.account_id?, user.display_name.unwrap_or_default()))
            })
            .collect())
    }

    async fn list_projects(&self) -> AppResult<Vec<ProjectSummary>> {
        debug!("listing Jira projects");
        let request = self.http.get(self.endpoint("project"));
        let projects: Vec<JiraProjectSummary> = Self::read_json(self.send(request).await?).await?;

        Ok(projects
            .into_iter()
            .map(|project| ProjectSummary::new(project.name, project.key))
            .collect())
    }

    async fn create_ticket(&self, draft: &TicketDraft) -> AppResult<Ticket> {
        debug!(project = %draft.project_key, issue_type = %draft.issue_type, "creating Jira issue");
        let request = self
            .http
            .post(self.endpoint("issue"))
            .header(CONTENT_TYPE, "application/json")
            .json(&JiraCreateIssueRequest::from_draft(draft));
        let payload: JiraCreateIssueResponse = Self::read_json(self.send(request).await?).await?;

        Ok(Ticket {
            url: self.browse_url(&payload.key),
            key: payload.key,
        })
    }

    async fn assign_ticket(&self, ticket_key: &str, assignee: &RemoteUser) -> AppResult<()> {
        debug!(ticket_key, assignee = %assignee.display_name, "assigning Jira issue");
        let request = self
            .http
            .put(self.endpoint(&format!("issue/{ticket_key}/assignee")))
            .header(CONTENT_TYPE, "application/json")
            .json(&JiraAssignee {
                account_id: assignee.account_id.clone(),
            });
        self.send(request).await?;
        Ok(())
    }
}

/// Pulls the readable part out of a Jira error body, falling back to the raw text.
fn error_message(body: &str) -> String {
    let Ok(parsed) = serde_json::from_str::<JiraErrorBody>(body) else {
        return body.trim().to_string();
    };

    let mut messages = parsed.error_messages;
    messages.extend(
        parsed
            .errors
            .into_iter()
            .map(|(field, message)| format!("{field}: {message}")),
    );
    if messages.is_empty() {
        body.trim().to_string()
    } else {
        messages.join("; ")
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct JiraErrorBody {
    #[serde(default)]
    error_messages: Vec<String>,
    #[serde(default)]
    errors: BTreeMap<String, String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct JiraUser {
    account_id: Option<String>,
    display_name: Option<String>,
}

#[derive(Deserialize)]
struct JiraProjectSummary {
    key: String,
    name: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JiraAssignee {
    account_id: String,
}

#[derive(Serialize)]
struct JiraCreateIssueRequest {
    fields: JiraCreateIssueFields,
}

impl JiraCreateIssueRequest {
    fn from_draft(draft: &TicketDraft) -> Self {
        let mut custom = draft.extra_fields.clone();
        if let Some(account_id) = &draft.owner_account_id {
            custom.insert(
                OWNER_FIELD.to_string(),
                serde_json::json!({ "accountId": account_id }),
            );
        }

        Self {
            fields: JiraCreateIssueFields {
                project: JiraProject {
                    key: draft.project_key.clone(),
                },
                issuetype: JiraNamed {
                    name: draft.issue_type.as_str().to_string(),
                },
                priority: draft.priority.map(|priority| JiraNamed {
                    name: priority.as_str().to_string(),
                }),
                summary: draft.summary.trim().to_string(),
                description: JiraDescription::from_text(&draft.description),
                custom,
            },
        }
    }
}

#[derive(Serialize)]
struct JiraCreateIssueFields {
    project: JiraProject,
    issuetype: JiraNamed,
    #[serde(skip_serializing_if = "Option::is_none")]
    priority: Option<JiraNamed>,
    summary: String,
    description: JiraDescription,
    #[serde(flatten)]
    custom: BTreeMap<String, Value>,
}

#[derive(Serialize)]
struct JiraProject {
    key: String,
}

#[derive(Serialize)]
struct JiraNamed {
    name: String,
}

/// Atlassian document format; one paragraph per blank-line separated block.
#[derive(Serialize)]
struct JiraDescription {
    #[serde(rename = "type")]
    doc_type: &'static str,
    version: u8,
    content: Vec<JiraDocNode>,
}

impl JiraDescription {
    fn from_text(description: &str) -> Self {
        let cleaned = description.replace('\r', "");
        let content = cleaned
            .split("\n\n")
            .map(|section| section.trim())
            .filter(|section| !section.is_empty())
            .map(|section| JiraDocNode::paragraph(section.replace('\n', " ")))
            .collect();

        Self {
            doc_type: "doc",
            version: 1,
            content,
        }
    }
}

#[derive(Serialize)]
struct JiraDocNode {
    #[serde(rename = "type")]
    node_type: &'static str,
    content: Vec<JiraDocText>,
}

impl JiraDocNode {
    fn paragraph(text: String) -> Self {
        Self {
            node_type: "paragraph",
            content: vec![JiraDocText {
                text_type: "text",
                text,
            }],
        }
    }
}

#[derive(Serialize)]
struct JiraDocText {
    #[serde(rename = "type")]
    text_type: &'static str,
    text: String,
}

#[derive(Deserialize)]
struct JiraCreateIssueResponse {
    key: String,
}
