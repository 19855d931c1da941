use std::borrow::Cow;
use std::sync::Arc;

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
            name: Cow::Borrowed("search-users"),
            title: None,
            description: Some(Cow::Borrowed(
                "Search the directory by name, mail or principal name prefix.",
            )),
            input_schema: Arc::new(
                json!({
                    "type": "object",
                    "properties": {
                        "query": { "type": "string", "description": "Prefix to search for (at least 3 characters).", "minLength": 3 },
                        "count": { "type": "integer", "description": "Number of users to return (1-50).", "minimum": 1, "maximum": 50, "default": 10 }
                    },
                    "required": ["query"]
                })
                .as_object()
                .expect("Schema object")
                .clone(),
            ),
            output_schema: None,
            annotations: None,
            icons: None,
        },
        error_label: "search users",
        requires_graph: true,
        handler: |ctx, args| search_users(ctx, args).boxed(),
    });
}

async fn search_users(ctx: Arc<AppContext>, args: Map<String, Value>) -> Result<String, GraphError> {
    let query = args.get("query").and_then(|v| v.as_str()).unwrap_or("");
    let count = args.get("count").and_then(|v| v.as_i64()).unwrap_or(10);

    // OData string literals escape single quotes by doubling them.
    let escaped = query.replace('\'', "''");
    let filter = format!(
        "startswith(displayName,'{escaped}') or startswith(mail,'{escaped}') or startswith(userPrincipalName,'{escaped}')"
    );

    let response = ctx
        .v1()
        .get(
            "/users",
            &[
                ("$filter", filter),
                ("$top", count.to_string()),
                (
                    "$select",
                    "id,displayName,mail,userPrincipalName,jobTitle".to_string(),
                ),
            ],
        )
        .await?;
    Ok(render_user_list(&response, query))
}

fn render_user_list(response: &Value, query: &str) -> String {
    let users = items(response);
    if users.is_empty() {
        return format!("No users found matching \"{query}\".");
    }

    let mut out = format!("Found {} user(s) matching \"{}\":\n", users.len(), query);
    for (i, user) in users.iter().enumerate() {
        let name = str_at(user, &["displayName"]).unwrap_or("(no name)");
        let mail = str_at(user, &["mail"])
            .or_else(|| str_at(user, &["userPrincipalName"]))
            .unwrap_or("no mail");
        out.push_str(&format!("{}. {} <{}>\n", i + 1, name, mail));
        if let Some(title) = str_at(user, &["jobTitle"]) {
            out.push_str(&format!("   {title}\n"));
        }
        if let Some(id) = str_at(user, &["id"]) {
            out.push_str(&format!("   Id: {id}\n"));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_matches_with_mail_fallback() {
        let response = json!({
            "value": [
                {"displayName": "Ada Lovelace", "mail": "ada@contoso.com", "jobTitle": "Engineer", "id": "u-1"},
                {"displayName": "Adam West", "mail": null, "userPrincipalName": "adam@contoso.com", "id": "u-2"}
            ]
        });
        let text = render_user_list(&response, "ada");
        assert!(text.contains("Found 2 user(s) matching \"ada\""));
        assert!(text.contains("Ada Lovelace <ada@contoso.com>"));
        assert!(text.contains("Adam West <adam@contoso.com>"));
        assert!(text.contains("Engineer"));
    }

    #[test]
    fn no_matches_names_the_query() {
        let text = render_user_list(&json!({"value": []}), "zzz");
        assert_eq!(text, "No users found matching \"zzz\".");
    }
}
