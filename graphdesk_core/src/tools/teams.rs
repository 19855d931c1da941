use std::borrow::Cow;
use std::sync::Arc;

use futures::FutureExt;
use rmcp::model::Tool;
use serde_json::{json, Map, Value};

use super::render::{items, plain_text, str_at, truncate};
use crate::context::AppContext;
use crate::error::GraphError;
use crate::registry::{ToolDescriptor, ToolRegistry};

pub fn register(registry: &mut ToolRegistry) {
    registry.register(ToolDescriptor {
        tool: Tool {
            name: Cow::Borrowed("get-teams"),
            title: None,
            description: Some(Cow::Borrowed("List the teams the signed-in user has joined.")),
            input_schema: Arc::new(
                json!({
                    "type": "object",
                    "properties": {},
                    "required": []
                })
                .as_object()
                .expect("Schema object")
                .clone(),
            ),
            output_schema: None,
            annotations: None,
            icons: None,
        },
        error_label: "retrieve teams",
        requires_graph: true,
        handler: |ctx, args| get_teams(ctx, args).boxed(),
    });

    registry.register(ToolDescriptor {
        tool: Tool {
            name: Cow::Borrowed("get-team-channels"),
            title: None,
            description: Some(Cow::Borrowed("List the channels of a team.")),
            input_schema: Arc::new(
                json!({
                    "type": "object",
                    "properties": {
                        "team_id": { "type": "string", "description": "Team ID, as returned by get-teams." }
                    },
                    "required": ["team_id"]
                })
                .as_object()
                .expect("Schema object")
                .clone(),
            ),
            output_schema: None,
            annotations: None,
            icons: None,
        },
        error_label: "retrieve team channels",
        requires_graph: true,
        handler: |ctx, args| get_team_channels(ctx, args).boxed(),
    });

    registry.register(ToolDescriptor {
        tool: Tool {
            name: Cow::Borrowed("get-channel-messages"),
            title: None,
            description: Some(Cow::Borrowed(
                "List recent messages from a team channel, newest first.",
            )),
            input_schema: Arc::new(
                json!({
                    "type": "object",
                    "properties": {
                        "team_id": { "type": "string" },
                        "channel_id": { "type": "string" },
                        "count": { "type": "integer", "description": "Number of messages to return (1-50).", "minimum": 1, "maximum": 50, "default": 20 }
                    },
                    "required": ["team_id", "channel_id"]
                })
                .as_object()
                .expect("Schema object")
                .clone(),
            ),
            output_schema: None,
            annotations: None,
            icons: None,
        },
        error_label: "retrieve channel messages",
        requires_graph: true,
        handler: |ctx, args| get_channel_messages(ctx, args).boxed(),
    });
}

async fn get_teams(ctx: Arc<AppContext>, _args: Map<String, Value>) -> Result<String, GraphError> {
    let response = ctx.v1().get("/me/joinedTeams", &[]).await?;
    Ok(render_team_list(&response))
}

async fn get_team_channels(
    ctx: Arc<AppContext>,
    args: Map<String, Value>,
) -> Result<String, GraphError> {
    let team_id = args
        .get("team_id")
        .and_then(|v| v.as_str())
        .unwrap_or_default();
    let response = ctx
        .v1()
        .get(
            &format!("/teams/{}/channels", urlencoding::encode(team_id)),
            &[("$select", "id,displayName,description".to_string())],
        )
        .await?;
    Ok(render_channel_list(&response))
}

async fn get_channel_messages(
    ctx: Arc<AppContext>,
    args: Map<String, Value>,
) -> Result<String, GraphError> {
    let team_id = args
        .get("team_id")
        .and_then(|v| v.as_str())
        .unwrap_or_default();
    let channel_id = args
        .get("channel_id")
        .and_then(|v| v.as_str())
        .unwrap_or_default();
    let count = args.get("count").and_then(|v| v.as_i64()).unwrap_or(20);

    // Channel messages ride the beta surface.
    let response = ctx
        .beta()
        .get(
            &format!(
                "/teams/{}/channels/{}/messages",
                urlencoding::encode(team_id),
                urlencoding::encode(channel_id)
            ),
            &[("$top", count.to_string())],
        )
        .await?;
    Ok(render_channel_messages(&response))
}

fn render_team_list(response: &Value) -> String {
    let teams = items(response);
    if teams.is_empty() {
        return "No joined teams found.".to_string();
    }

    let mut out = format!("Member of {} team(s):\n", teams.len());
    for (i, team) in teams.iter().enumerate() {
        let name = str_at(team, &["displayName"]).unwrap_or("(unnamed team)");
        out.push_str(&format!("{}. {}\n", i + 1, name));
        if let Some(description) = str_at(team, &["description"]) {
            if !description.is_empty() {
                out.push_str(&format!("   {}\n", truncate(description, 120)));
            }
        }
        if let Some(id) = str_at(team, &["id"]) {
            out.push_str(&format!("   Id: {id}\n"));
        }
    }
    out
}

fn render_channel_list(response: &Value) -> String {
    let channels = items(response);
    if channels.is_empty() {
        return "No channels found.".to_string();
    }

    let mut out = format!("Found {} channel(s):\n", channels.len());
    for (i, channel) in channels.iter().enumerate() {
        let name = str_at(channel, &["displayName"]).unwrap_or("(unnamed channel)");
        out.push_str(&format!("{}. {}\n", i + 1, name));
        if let Some(id) = str_at(channel, &["id"]) {
            out.push_str(&format!("   Id: {id}\n"));
        }
    }
    out
}

fn render_channel_messages(response: &Value) -> String {
    let messages = items(response);
    if messages.is_empty() {
        return "No messages in this channel.".to_string();
    }

    let mut out = format!("Last {} message(s):\n", messages.len());
    for (i, message) in messages.iter().enumerate() {
        let author = str_at(message, &["from", "user", "displayName"]).unwrap_or("unknown");
        let created = str_at(message, &["createdDateTime"]).unwrap_or("unknown time");
        let body = str_at(message, &["body", "content"]).unwrap_or("");
        let body = if str_at(message, &["body", "contentType"]) == Some("html") {
            plain_text(body)
        } else {
            body.trim().to_string()
        };
        out.push_str(&format!("{}. {} at {}\n", i + 1, author, created));
        if !body.is_empty() {
            out.push_str(&format!("   {}\n", truncate(&body, 200)));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_teams_with_ids() {
        let response = json!({
            "value": [
                {"id": "t-1", "displayName": "Platform", "description": "Infra and tooling"},
                {"id": "t-2", "displayName": "Design"}
            ]
        });
        let text = render_team_list(&response);
        assert!(text.contains("Member of 2 team(s)"));
        assert!(text.contains("1. Platform"));
        assert!(text.contains("Infra and tooling"));
        assert!(text.contains("Id: t-2"));
    }

    #[test]
    fn renders_channel_messages_with_flattened_html() {
        let response = json!({
            "value": [
                {
                    "from": {"user": {"displayName": "Grace"}},
                    "createdDateTime": "2026-08-05T10:00:00Z",
                    "body": {"contentType": "html", "content": "<div>Ship it &#128640;</div>"}
                }
            ]
        });
        let text = render_channel_messages(&response);
        assert!(text.contains("1. Grace at 2026-08-05T10:00:00Z"));
        assert!(text.contains("Ship it"));
        assert!(!text.contains("<div>"));
    }
}
