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
            name: Cow::Borrowed("get-emails"),
            title: None,
            description: Some(Cow::Borrowed(
                "List recent messages from the signed-in mailbox, newest first.",
            )),
            input_schema: Arc::new(
                json!({
                    "type": "object",
                    "properties": {
                        "count": { "type": "integer", "description": "Number of messages to return (1-50).", "minimum": 1, "maximum": 50, "default": 10 }
                    },
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
        error_label: "retrieve emails",
        requires_graph: true,
        handler: |ctx, args| get_emails(ctx, args).boxed(),
    });

    registry.register(ToolDescriptor {
        tool: Tool {
            name: Cow::Borrowed("get-email"),
            title: None,
            description: Some(Cow::Borrowed("Read a single message by its ID.")),
            input_schema: Arc::new(
                json!({
                    "type": "object",
                    "properties": {
                        "message_id": { "type": "string", "description": "Graph message ID, as returned by get-emails." }
                    },
                    "required": ["message_id"]
                })
                .as_object()
                .expect("Schema object")
                .clone(),
            ),
            output_schema: None,
            annotations: None,
            icons: None,
        },
        error_label: "retrieve email",
        requires_graph: true,
        handler: |ctx, args| get_email(ctx, args).boxed(),
    });

    registry.register(ToolDescriptor {
        tool: Tool {
            name: Cow::Borrowed("send-email"),
            title: None,
            description: Some(Cow::Borrowed(
                "Send a plain-text email from the signed-in mailbox.",
            )),
            input_schema: Arc::new(
                json!({
                    "type": "object",
                    "properties": {
                        "to": { "type": "array", "items": { "type": "string" }, "minItems": 1, "description": "Recipient email addresses." },
                        "subject": { "type": "string" },
                        "body": { "type": "string", "description": "Plain-text message body." }
                    },
                    "required": ["to", "subject", "body"]
                })
                .as_object()
                .expect("Schema object")
                .clone(),
            ),
            output_schema: None,
            annotations: None,
            icons: None,
        },
        error_label: "send email",
        requires_graph: true,
        handler: |ctx, args| send_email(ctx, args).boxed(),
    });
}

async fn get_emails(ctx: Arc<AppContext>, args: Map<String, Value>) -> Result<String, GraphError> {
    let count = args.get("count").and_then(|v| v.as_i64()).unwrap_or(10);
    let response = ctx
        .v1()
        .get(
            "/me/messages",
            &[
                ("$top", count.to_string()),
                ("$orderby", "receivedDateTime desc".to_string()),
                (
                    "$select",
                    "id,subject,from,receivedDateTime,isRead,bodyPreview".to_string(),
                ),
            ],
        )
        .await?;
    Ok(render_message_list(&response))
}

async fn get_email(ctx: Arc<AppContext>, args: Map<String, Value>) -> Result<String, GraphError> {
    let message_id = args
        .get("message_id")
        .and_then(|v| v.as_str())
        .unwrap_or_default();
    let message = ctx
        .v1()
        .get(
            &format!("/me/messages/{}", urlencoding::encode(message_id)),
            &[(
                "$select",
                "id,subject,from,toRecipients,receivedDateTime,body".to_string(),
            )],
        )
        .await?;
    Ok(render_message(&message))
}

async fn send_email(ctx: Arc<AppContext>, args: Map<String, Value>) -> Result<String, GraphError> {
    let to: Vec<&str> = args
        .get("to")
        .and_then(|v| v.as_array())
        .map(|a| a.iter().filter_map(|v| v.as_str()).collect())
        .unwrap_or_default();
    let subject = args.get("subject").and_then(|v| v.as_str()).unwrap_or("");
    let body = args.get("body").and_then(|v| v.as_str()).unwrap_or("");

    let to_recipients: Vec<Value> = to
        .iter()
        .map(|address| json!({"emailAddress": {"address": address}}))
        .collect();
    let payload = json!({
        "message": {
            "subject": subject,
            "body": { "contentType": "Text", "content": body },
            "toRecipients": to_recipients
        },
        "saveToSentItems": true
    });

    ctx.v1().post("/me/sendMail", &payload).await?;
    Ok(format!(
        "Email \"{}\" sent to {}.",
        subject,
        to.join(", ")
    ))
}

fn render_message_list(response: &Value) -> String {
    let messages = items(response);
    if messages.is_empty() {
        return "No messages found.".to_string();
    }

    let mut out = format!("Found {} message(s):\n", messages.len());
    for (i, message) in messages.iter().enumerate() {
        let subject = str_at(message, &["subject"]).unwrap_or("(no subject)");
        let from = sender_line(message);
        let received = str_at(message, &["receivedDateTime"]).unwrap_or("unknown time");
        let unread = if message
            .get("isRead")
            .and_then(|v| v.as_bool())
            .unwrap_or(true)
        {
            ""
        } else {
            " [unread]"
        };
        out.push_str(&format!("{}. {}{}\n", i + 1, subject, unread));
        out.push_str(&format!("   From: {from} | Received: {received}\n"));
        if let Some(preview) = str_at(message, &["bodyPreview"]) {
            if !preview.trim().is_empty() {
                out.push_str(&format!("   {}\n", truncate(preview.trim(), 120)));
            }
        }
        if let Some(id) = str_at(message, &["id"]) {
            out.push_str(&format!("   Id: {id}\n"));
        }
    }
    out
}

fn render_message(message: &Value) -> String {
    let subject = str_at(message, &["subject"]).unwrap_or("(no subject)");
    let mut out = format!("Subject: {subject}\n");
    out.push_str(&format!("From: {}\n", sender_line(message)));
    if let Some(received) = str_at(message, &["receivedDateTime"]) {
        out.push_str(&format!("Received: {received}\n"));
    }
    let recipients: Vec<&str> = message
        .get("toRecipients")
        .and_then(|v| v.as_array())
        .map(|a| {
            a.iter()
                .filter_map(|r| str_at(r, &["emailAddress", "address"]))
                .collect()
        })
        .unwrap_or_default();
    if !recipients.is_empty() {
        out.push_str(&format!("To: {}\n", recipients.join(", ")));
    }
    let body = str_at(message, &["body", "content"]).unwrap_or("");
    let body = if str_at(message, &["body", "contentType"]) == Some("html") {
        plain_text(body)
    } else {
        body.trim().to_string()
    };
    out.push('\n');
    out.push_str(&body);
    out
}

fn sender_line(message: &Value) -> String {
    let name = str_at(message, &["from", "emailAddress", "name"]).unwrap_or("");
    let address = str_at(message, &["from", "emailAddress", "address"]).unwrap_or("");
    if name.is_empty() {
        if address.is_empty() {
            "unknown sender".to_string()
        } else {
            address.to_string()
        }
    } else if address.is_empty() {
        name.to_string()
    } else {
        format!("{name} <{address}>")
    }
}
