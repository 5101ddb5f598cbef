//! People command implementations

use anyhow::{Context, Result, anyhow};
use serde_json::Value;

use super::{CommandContext, print_value, show_list};
use crate::cli::args::PeopleCommands;
use crate::models::{AccessChange, parse_id_list};

pub async fn execute_people_command(ctx: &CommandContext, command: PeopleCommands) -> Result<()> {
    match command {
        PeopleCommands::List { project_id, list } => {
            let (client, account) = ctx.client(list.output.account_id)?;
            show_list(&client, client.account(account).people(project_id), &list).await
        }
        PeopleCommands::Get { person_id, output } => {
            let (client, account) = ctx.client(output.account_id)?;
            let person = client.account(account).person(person_id).await?;
            print_value(&person, output.format)
        }
        PeopleCommands::Profile { output } => {
            let (client, account) = ctx.client(output.account_id)?;
            let profile = client.account(account).my_profile().await?;
            print_value(&profile, output.format)
        }
        PeopleCommands::Pingable { output } => {
            let (client, account) = ctx.client(output.account_id)?;
            let people = client.account(account).pingable_people().await?;
            print_value(&people, output.format)
        }
        PeopleCommands::GrantAccess {
            project_id,
            grant_ids,
            revoke_ids,
            create,
            output,
        } => {
            let change = access_change(
                grant_ids.as_deref(),
                revoke_ids.as_deref(),
                create.as_deref(),
            )?;
            let (client, account) = ctx.client(output.account_id)?;
            let result = client
                .account(account)
                .update_project_access(project_id, &change)
                .await?;
            print_value(&result, output.format)
        }
    }
}

/// Build the access update from the raw flag values
fn access_change(
    grant_ids: Option<&str>,
    revoke_ids: Option<&str>,
    create: Option<&str>,
) -> Result<AccessChange> {
    let ids = |raw: Option<&str>, flag: &str| -> Result<Vec<u64>> {
        match raw {
            Some(raw) => parse_id_list(raw).map_err(|e| anyhow!("Invalid {}: {}", flag, e)),
            None => Ok(Vec::new()),
        }
    };

    let create = match create {
        Some(raw) => match serde_json::from_str::<Value>(raw).context("--create must be JSON")? {
            Value::Array(people) => people,
            _ => anyhow::bail!("--create must be a JSON array of people"),
        },
        None => Vec::new(),
    };

    let change = AccessChange {
        grant: ids(grant_ids, "--grant-ids")?,
        revoke: ids(revoke_ids, "--revoke-ids")?,
        create,
    };
    if change.is_empty() {
        anyhow::bail!("At least one of --grant-ids, --revoke-ids, or --create must be provided");
    }
    Ok(change)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_change_from_flags() {
        let change = access_change(
            Some("1,2"),
            None,
            Some(r#"[{"name":"Ann","email_address":"ann@example.com"}]"#),
        )
        .unwrap();
        assert_eq!(change.grant, vec![1, 2]);
        assert!(change.revoke.is_empty());
        assert_eq!(change.create.len(), 1);
    }

    #[test]
    fn test_access_change_rejects_bad_input() {
        assert!(access_change(None, None, None).is_err());
        assert!(access_change(Some("x"), None, None).is_err());
        assert!(access_change(None, None, Some(r#"{"name":"Ann"}"#)).is_err());
    }
}
