//! Recordings command implementations

use anyhow::Result;
use serde_json::{Value, json};

use super::{CommandContext, print_value, show_list};
use crate::cli::args::{RecordingCommands, RecordingTarget};
use crate::models::{RecordingQuery, RecordingStatus};

pub async fn execute_recordings_command(
    ctx: &CommandContext,
    command: RecordingCommands,
) -> Result<()> {
    match command {
        RecordingCommands::List {
            recording_type,
            bucket,
            status,
            sort,
            direction,
            list,
        } => {
            let query = RecordingQuery {
                recording_type,
                bucket,
                status,
                sort,
                direction,
            };
            let (client, account) = ctx.client(list.output.account_id)?;
            show_list(&client, client.account(account).recordings(&query), &list).await
        }
        RecordingCommands::Trash(target) => change_status(ctx, target, RecordingStatus::Trashed).await,
        RecordingCommands::Archive(target) => {
            change_status(ctx, target, RecordingStatus::Archived).await
        }
        RecordingCommands::Unarchive(target) => {
            change_status(ctx, target, RecordingStatus::Active).await
        }
    }
}

async fn change_status(
    ctx: &CommandContext,
    target: RecordingTarget,
    status: RecordingStatus,
) -> Result<()> {
    let (client, account) = ctx.client(target.output.account_id)?;
    client
        .account(account)
        .set_recording_status(target.project_id, target.recording_id, status)
        .await?;
    print_value(
        &status_summary(target.project_id, target.recording_id, status),
        target.output.format,
    )
}

fn status_summary(project_id: u64, recording_id: u64, status: RecordingStatus) -> Value {
    let verb = match status {
        RecordingStatus::Trashed => "trashed",
        RecordingStatus::Archived => "archived",
        RecordingStatus::Active => "unarchived",
    };
    json!({
        "status": status.as_str(),
        "project_id": project_id,
        "recording_id": recording_id,
        "message": format!("Recording {} {} successfully", recording_id, verb),
    })
}
