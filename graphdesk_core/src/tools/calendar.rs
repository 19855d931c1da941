use std::borrow::Cow;
use std::sync::Arc;

use chrono::{Duration, Utc};
use futures::FutureExt;
use rmcp::model::Tool;
use serde_json::{json, Map, Value};

use super::render::{items, str_at};
use crate::context::AppContext;
use crate::error::GraphError;
use crate::registry::{ToolDescriptor, ToolRegistry};

pub fn register(registry: &mut ToolRegistry) {
    registry.register(ToolDescriptor {
        tool: Tool {
            name: Cow::Borrowed("get-calendar-events"),
            title: None,
            description: Some(Cow::Borrowed(
                "List upcoming calendar events for the signed-in user within a day window.",
            )),
            input_schema: Arc::new(
                json!({
                    "type": "object",
                    "properties": {
                        "days_ahead": { "type": "integer", "description": "Window in days from now (1-90).", "minimum": 1, "maximum": 90, "default": 7 },
                        "count": { "type": "integer", "description": "Number of events to return (1-50).", "minimum": 1, "maximum": 50, "default": 10 }
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
        error_label: "retrieve calendar events",
        requires_graph: true,
        handler: |ctx, args| get_calendar_events(ctx, args).boxed(),
    });

    registry.register(ToolDescriptor {
        tool: Tool {
            name: Cow::Borrowed("create-calendar-event"),
            title: None,
            description: Some(Cow::Borrowed(
                "Create a calendar event. Times are ISO 8601 and interpreted as UTC.",
            )),
            input_schema: Arc::new(
                json!({
                    "type": "object",
                    "properties": {
                        "subject": { "type": "string" },
                        "start": { "type": "string", "description": "Start time, e.g. 2026-08-10T14:00:00" },
                        "end": { "type": "string", "description": "End time, e.g. 2026-08-10T15:00:00" },
                        "attendees": { "type": "array", "items": { "type": "string" }, "description": "Attendee email addresses." }
                    },
                    "required": ["subject", "start", "end"]
                })
                .as_object()
                .expect("Schema object")
                .clone(),
            ),
            output_schema: None,
            annotations: None,
            icons: None,
        },
        error_label: "create calendar event",
        requires_graph: true,
        handler: |ctx, args| create_calendar_event(ctx, args).boxed(),
    });
}

async fn get_calendar_events(
    ctx: Arc<AppContext>,
    args: Map<String, Value>,
) -> Result<String, GraphError> {
    let days_ahead = args.get("days_ahead").and_then(|v| v.as_i64()).unwrap_or(7);
    let count = args.get("count").and_then(|v| v.as_i64()).unwrap_or(10);

    let start = Utc::now();
    let end = start + Duration::days(days_ahead);
    let response = ctx
        .v1()
        .get(
            "/me/calendarView",
            &[
                ("startDateTime", start.format("%Y-%m-%dT%H:%M:%SZ").to_string()),
                ("endDateTime", end.format("%Y-%m-%dT%H:%M:%SZ").to_string()),
                ("$top", count.to_string()),
                ("$orderby", "start/dateTime".to_string()),
                (
                    "$select",
                    "id,subject,start,end,location,organizer,isOnlineMeeting".to_string(),
                ),
            ],
        )
        .await?;
    Ok(render_event_list(&response, days_ahead))
}

async fn create_calendar_event(
    ctx: Arc<AppContext>,
    args: Map<String, Value>,
) -> Result<String, GraphError> {
    let subject = args.get("subject").and_then(|v| v.as_str()).unwrap_or("");
    let start = args.get("start").and_then(|v| v.as_str()).unwrap_or("");
    let end = args.get("end").and_then(|v| v.as_str()).unwrap_or("");
    let attendees: Vec<Value> = args
        .get("attendees")
        .and_then(|v| v.as_array())
        .map(|a| {
            a.iter()
                .filter_map(|v| v.as_str())
                .map(|address| {
                    json!({"emailAddress": {"address": address}, "type": "required"})
                })
                .collect()
        })
        .unwrap_or_default();

    let payload = json!({
        "subject": subject,
        "start": { "dateTime": start, "timeZone": "UTC" },
        "end": { "dateTime": end, "timeZone": "UTC" },
        "attendees": attendees
    });

    let event = ctx.v1().post("/me/events", &payload).await?;
    let id = str_at(&event, &["id"]).unwrap_or("unknown");
    Ok(format!(
        "Created event \"{subject}\" from {start} to {end} (UTC). Id: {id}"
    ))
}

fn render_event_list(response: &Value, days_ahead: i64) -> String {
    let events = items(response);
    if events.is_empty() {
        return format!("No events in the next {days_ahead} day(s).");
    }

    let mut out = format!(
        "Found {} event(s) in the next {} day(s):\n",
        events.len(),
        days_ahead
    );
    for (i, event) in events.iter().enumerate() {
        let subject = str_at(event, &["subject"]).unwrap_or("(no subject)");
        let start = str_at(event, &["start", "dateTime"]).unwrap_or("?");
        let end = str_at(event, &["end", "dateTime"]).unwrap_or("?");
        out.push_str(&format!("{}. {}\n", i + 1, subject));
        out.push_str(&format!("   {start} to {end}\n"));
        if let Some(location) = str_at(event, &["location", "displayName"]) {
            if !location.is_empty() {
                out.push_str(&format!("   Location: {location}\n"));
            }
        }
        if let Some(organizer) = str_at(event, &["organizer", "emailAddress", "name"]) {
            out.push_str(&format!("   Organizer: {organizer}\n"));
        }
        if event
            .get("isOnlineMeeting")
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
        {
            out.push_str("   Online meeting\n");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_window_and_entries() {
        let response = json!({
            "value": [
                {
                    "subject": "Standup",
                    "start": {"dateTime": "2026-08-07T09:00:00.0000000"},
                    "end": {"dateTime": "2026-08-07T09:15:00.0000000"},
                    "location": {"displayName": "Room 4"},
                    "organizer": {"emailAddress": {"name": "Grace"}},
                    "isOnlineMeeting": true
                }
            ]
        });
        let text = render_event_list(&response, 7);
        assert!(text.contains("1. Standup"));
        assert!(text.contains("Location: Room 4"));
        assert!(text.contains("Online meeting"));
    }

    #[test]
    fn empty_window_renders_notice() {
        assert_eq!(
            render_event_list(&json!({"value": []}), 3),
            "No events in the next 3 day(s)."
        );
    }
}
