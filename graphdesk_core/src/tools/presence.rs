use std::borrow::Cow;
use std::sync::Arc;

use futures::FutureExt;
use rmcp::model::Tool;
use serde_json::{json, Map, Value};

use super::render::str_at;
use crate::context::AppContext;
use crate::error::GraphError;
use crate::registry::{ToolDescriptor, ToolRegistry};

pub fn register(registry: &mut ToolRegistry) {
    registry.register(ToolDescriptor {
        tool: Tool {
            name: Cow::Borrowed("get-presence"),
            title: None,
            description: Some(Cow::Borrowed(
                "Get Teams presence (availability and activity) for the signed-in user or a given user.",
            )),
            input_schema: Arc::new(
                json!({
                    "type": "object",
                    "properties": {
                        "user_id": { "type": "string", "description": "Directory user ID. Omit for the signed-in user." }
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
        error_label: "retrieve presence",
        requires_graph: true,
        handler: |ctx, args| get_presence(ctx, args).boxed(),
    });
}

async fn get_presence(ctx: Arc<AppContext>, args: Map<String, Value>) -> Result<String, GraphError> {
    let path = match args.get("user_id").and_then(|v| v.as_str()) {
        Some(user_id) if !user_id.is_empty() => {
            format!("/users/{}/presence", urlencoding::encode(user_id))
        }
        _ => "/me/presence".to_string(),
    };
    // Presence rides the beta surface.
    let presence = ctx.beta().get(&path, &[]).await?;
    Ok(render_presence(&presence))
}

fn render_presence(presence: &Value) -> String {
    let availability = str_at(presence, &["availability"]).unwrap_or("Unknown");
    let activity = str_at(presence, &["activity"]).unwrap_or("Unknown");
    format!("Availability: {availability}\nActivity: {activity}\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_availability_and_activity() {
        let presence = json!({"availability": "Busy", "activity": "InACall"});
        let text = render_presence(&presence);
        assert!(text.contains("Availability: Busy"));
        assert!(text.contains("Activity: InACall"));
    }

    #[test]
    fn missing_fields_degrade_to_unknown() {
        assert!(render_presence(&json!({})).contains("Availability: Unknown"));
    }
}
