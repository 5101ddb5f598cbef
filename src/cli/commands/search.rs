//! Search and search-metadata command implementations

use anyhow::Result;

use super::{CommandContext, print_value, show_list};
use crate::cli::args::{OutputArgs, SearchArgs};

pub async fn execute_search_command(ctx: &CommandContext, args: &SearchArgs) -> Result<()> {
    if args.per_page == 0 {
        anyhow::bail!("--per-page must be at least 1");
    }
    let (client, account) = ctx.client(args.list.output.account_id)?;
    let request = client.account(account).search(&args.to_query());
    show_list(&client, request, &args.list).await
}

pub async fn execute_search_metadata_command(ctx: &CommandContext, output: &OutputArgs) -> Result<()> {
    let (client, account) = ctx.client(output.account_id)?;
    let metadata = client.account(account).search_metadata().await?;
    print_value(&metadata, output.format)
}
