//! Todos command implementations

use anyhow::{Context, Result, anyhow};
use dialoguer::Input;

use super::{CommandContext, print_value, show_list};
use crate::cli::args::TodoCommands;
use crate::models::parse_id_list;

pub async fn execute_todos_command(ctx: &CommandContext, command: TodoCommands) -> Result<()> {
    match command {
        TodoCommands::List {
            project_id,
            todo_set_id,
            list,
        } => {
            let (client, account) = ctx.client(list.output.account_id)?;
            let request = client.account(account).todos(project_id, todo_set_id);
            show_list(&client, request, &list).await
        }
        TodoCommands::Create {
            project_id,
            todo_set_id,
            content,
            assignee_ids,
            output,
        } => {
            let assignees = match assignee_ids.as_deref() {
                Some(raw) => parse_id_list(raw).map_err(|e| anyhow!("Invalid --assignee-ids: {}", e))?,
                None => Vec::new(),
            };
            let (client, account) = ctx.client(output.account_id)?;
            let content = match content {
                Some(content) => content,
                None => Input::<String>::new()
                    .with_prompt("Todo content")
                    .interact_text()
                    .context("Failed to read todo content")?,
            };
            let todo = client
                .account(account)
                .create_todo(project_id, todo_set_id, &content, &assignees)
                .await?;
            print_value(&todo, output.format)
        }
    }
}
