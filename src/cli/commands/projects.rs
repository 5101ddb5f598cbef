//! Projects command implementations

use anyhow::{Context, Result};
use dialoguer::{Confirm, Input};
use serde_json::json;

use super::{CommandContext, print_value, show_list};
use crate::cli::args::ProjectCommands;

pub async fn execute_projects_command(ctx: &CommandContext, command: ProjectCommands) -> Result<()> {
    match command {
        ProjectCommands::List(list) => {
            let (client, account) = ctx.client(list.output.account_id)?;
            show_list(&client, client.account(account).projects(), &list).await
        }
        ProjectCommands::Get { project_id, output } => {
            let (client, account) = ctx.client(output.account_id)?;
            let project = client.account(account).project(project_id).await?;
            print_value(&project, output.format)
        }
        ProjectCommands::Create {
            name,
            description,
            output,
        } => {
            let (client, account) = ctx.client(output.account_id)?;
            let name = match name {
                Some(name) => name,
                None => Input::<String>::new()
                    .with_prompt("Project name")
                    .interact_text()
                    .context("Failed to read project name")?,
            };
            let project = client
                .account(account)
                .create_project(&name, description.as_deref())
                .await?;
            print_value(&project, output.format)
        }
        ProjectCommands::Update {
            project_id,
            name,
            description,
            output,
        } => {
            let (client, account) = ctx.client(output.account_id)?;
            let project = client
                .account(account)
                .update_project(project_id, name.as_deref(), description.as_deref())
                .await?;
            print_value(&project, output.format)
        }
        ProjectCommands::Delete {
            project_id,
            yes,
            output,
        } => {
            let (client, account) = ctx.client(output.account_id)?;
            if !yes {
                let confirmed = Confirm::new()
                    .with_prompt(format!("Delete project {}?", project_id))
                    .default(false)
                    .interact()
                    .context("Failed to read confirmation (use --yes to skip it)")?;
                if !confirmed {
                    println!("Aborted.");
                    return Ok(());
                }
            }
            client.account(account).delete_project(project_id).await?;
            let result = json!({
                "status": "deleted",
                "project_id": project_id,
                "message": format!("Project {} deleted successfully", project_id),
            });
            print_value(&result, output.format)
        }
    }
}
