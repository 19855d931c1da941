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
            name: Cow::Borrowed("get-current-user"),
            title: None,
            description: Some(Cow::Borrowed(
                "Get the profile of the signed-in user (name, mail, job title, office).",
            )),
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
        error_label: "retrieve user profile",
        requires_graph: true,
        handler: |ctx, args| get_current_user(ctx, args).boxed(),
    });
}

async fn get_current_user(
    ctx: Arc<AppContext>,
    _args: Map<String, Value>,
) -> Result<String, GraphError> {
    let user = ctx
        .v1()
        .get(
            "/me",
            &[(
                "$select",
                "id,displayName,mail,userPrincipalName,jobTitle,officeLocation,mobilePhone"
                    .to_string(),
            )],
        )
        .await?;
    Ok(render_profile(&user))
}

fn render_profile(user: &Value) -> String {
    let name = str_at(user, &["displayName"]).unwrap_or("(unknown)");
    let mut out = format!("User profile for {name}:\n");

    let fields: [(&str, &[&str]); 6] = [
        ("Mail", &["mail"]),
        ("Principal name", &["userPrincipalName"]),
        ("Job title", &["jobTitle"]),
        ("Office", &["officeLocation"]),
        ("Mobile", &["mobilePhone"]),
        ("Id", &["id"]),
    ];
    for (label, path) in fields {
        if let Some(value) = str_at(user, path) {
            out.push_str(&format!("  {label}: {value}\n"));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_available_fields_only() {
        let user = json!({
            "displayName": "Ada Lovelace",
            "userPrincipalName": "ada@contoso.com",
            "jobTitle": null,
            "id": "u-1"
        });
        let text = render_profile(&user);
        assert!(text.contains("User profile for Ada Lovelace"));
        assert!(text.contains("Principal name: ada@contoso.com"));
        assert!(!text.contains("Job title"));
    }
}
