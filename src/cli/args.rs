//! Command line argument parsing

use clap::{Args, Parser, Subcommand};

use crate::auth::callback::DEFAULT_WAIT;
use crate::{APP_NAME, VERSION};
use crate::models::{RecordingStatus, RecordingType, SearchQuery, SortDirection, SortField};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(author, about, long_about = None)]
#[command(name = APP_NAME, version = VERSION)]
#[command(about = "🏕️  Command-line client for the Basecamp 3 API")]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Decrease logging verbosity (only errors)
    #[arg(short = 'q', long = "quiet", global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Account and format flags shared by every API command
#[derive(Args, Debug, Clone)]
pub struct OutputArgs {
    /// Basecamp account ID (uses the configured default if not provided)
    #[arg(long)]
    pub account_id: Option<u64>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Plain)]
    pub format: OutputFormat,
}

/// Flags for commands that list paginated collections
#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    #[command(flatten)]
    pub output: OutputArgs,

    /// Load every page without prompting
    #[arg(long)]
    pub all_pages: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Store OAuth2 client credentials
    Configure {
        /// OAuth2 client ID (prompted when omitted)
        #[arg(long)]
        client_id: Option<String>,
        /// OAuth2 client secret (prompted when omitted)
        #[arg(long)]
        client_secret: Option<String>,
        /// Redirect URI registered for the integration (keeps the configured one,
        /// else http://localhost:8080/callback)
        #[arg(long)]
        redirect_uri: Option<String>,
    },
    /// Print the configuration file location
    ConfigPath,
    /// Sign in through the browser and store the access token
    Auth {
        /// Account to authorize; also saved as the default
        #[arg(long)]
        account_id: Option<u64>,
        /// Paste the authorization code instead of running a local listener
        #[arg(long)]
        manual: bool,
        /// Print the authorization URL without opening a browser
        #[arg(long)]
        no_browser: bool,
        /// Seconds to wait for the browser redirect
        #[arg(long, default_value_t = DEFAULT_WAIT.as_secs())]
        timeout: u64,
    },
    /// Exchange the stored refresh token for a new access token
    Refresh {
        #[arg(long)]
        account_id: Option<u64>,
    },
    /// Remove the stored token
    Logout {
        #[arg(long)]
        account_id: Option<u64>,
    },
    /// Show the stored token (masked unless --show-full)
    Tokens {
        #[command(flatten)]
        output: OutputArgs,
        /// Print full token values
        #[arg(long)]
        show_full: bool,
    },
    /// Manage projects
    Projects {
        #[command(subcommand)]
        command: ProjectCommands,
    },
    /// Manage to-dos
    Todos {
        #[command(subcommand)]
        command: TodoCommands,
    },
    /// List recordings and change their status
    Recordings {
        #[command(subcommand)]
        command: RecordingCommands,
    },
    /// Search across projects
    Search(SearchArgs),
    /// Show the filters search accepts
    SearchMetadata {
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Browse people and project access
    People {
        #[command(subcommand)]
        command: PeopleCommands,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum ProjectCommands {
    /// List projects
    List(ListArgs),
    /// Show one project
    Get {
        project_id: u64,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Create a project
    Create {
        /// Project name (prompted when omitted)
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Rename or describe a project
    Update {
        project_id: u64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Trash a project
    Delete {
        project_id: u64,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum TodoCommands {
    /// List to-dos in a to-do set
    List {
        #[arg(long)]
        project_id: u64,
        #[arg(long)]
        todo_set_id: u64,
        #[command(flatten)]
        list: ListArgs,
    },
    /// Add a to-do
    Create {
        #[arg(long)]
        project_id: u64,
        #[arg(long)]
        todo_set_id: u64,
        /// To-do text (prompted when omitted)
        #[arg(long)]
        content: Option<String>,
        /// Comma-separated person IDs
        #[arg(long)]
        assignee_ids: Option<String>,
        #[command(flatten)]
        output: OutputArgs,
    },
}

/// Project and recording addressed by a status change
#[derive(Args, Debug, Clone)]
pub struct RecordingTarget {
    pub project_id: u64,
    pub recording_id: u64,
    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Subcommand, Debug, Clone)]
pub enum RecordingCommands {
    /// List recordings of one type
    List {
        #[arg(long = "type", value_enum)]
        recording_type: RecordingType,
        /// Project ID or comma-separated list of project IDs
        #[arg(long)]
        bucket: Option<String>,
        #[arg(long, value_enum, default_value_t = RecordingStatus::Active)]
        status: RecordingStatus,
        #[arg(long, value_enum, default_value_t = SortField::CreatedAt)]
        sort: SortField,
        #[arg(long, value_enum, default_value_t = SortDirection::Desc)]
        direction: SortDirection,
        #[command(flatten)]
        list: ListArgs,
    },
    /// Move a recording to the trash
    Trash(RecordingTarget),
    /// Archive a recording
    Archive(RecordingTarget),
    /// Restore an archived or trashed recording
    Unarchive(RecordingTarget),
}

#[derive(Args, Debug, Clone)]
pub struct SearchArgs {
    pub query: String,
    /// Recording type (see `basecamp search-metadata`)
    #[arg(long = "type")]
    pub recording_type: Option<String>,
    /// Limit to one project
    #[arg(long)]
    pub bucket_id: Option<u64>,
    #[arg(long)]
    pub creator_id: Option<u64>,
    /// Attachment type (see `basecamp search-metadata`)
    #[arg(long)]
    pub file_type: Option<String>,
    #[arg(long)]
    pub exclude_chat: bool,
    #[arg(long, default_value_t = 1)]
    pub page: u32,
    #[arg(long, default_value_t = SearchQuery::DEFAULT_PER_PAGE)]
    pub per_page: u32,
    #[command(flatten)]
    pub list: ListArgs,
}

impl SearchArgs {
    pub fn to_query(&self) -> SearchQuery {
        SearchQuery {
            query: self.query.clone(),
            recording_type: self.recording_type.clone(),
            bucket_id: self.bucket_id,
            creator_id: self.creator_id,
            file_type: self.file_type.clone(),
            exclude_chat: self.exclude_chat,
            page: self.page,
            per_page: self.per_page,
        }
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum PeopleCommands {
    /// List people, optionally only those on a project
    List {
        #[arg(long)]
        project_id: Option<u64>,
        #[command(flatten)]
        list: ListArgs,
    },
    /// Show one person
    Get {
        person_id: u64,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Show your own profile
    Profile {
        #[command(flatten)]
        output: OutputArgs,
    },
    /// List people who can be pinged
    Pingable {
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Grant or revoke project access, or invite new people
    GrantAccess {
        project_id: u64,
        /// Comma-separated person IDs to add
        #[arg(long)]
        grant_ids: Option<String>,
        /// Comma-separated person IDs to remove
        #[arg(long)]
        revoke_ids: Option<String>,
        /// JSON array of people to invite (`name`, `email_address`, optional `title`, `company_name`)
        #[arg(long)]
        create: Option<String>,
        #[command(flatten)]
        output: OutputArgs,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_projects_list_flags() {
        let cli = Cli::try_parse_from([
            "basecamp",
            "projects",
            "list",
            "--account-id",
            "42",
            "--format",
            "table",
            "--all-pages",
        ])
        .unwrap();
        match cli.command {
            Commands::Projects {
                command: ProjectCommands::List(list),
            } => {
                assert_eq!(list.output.account_id, Some(42));
                assert_eq!(list.output.format, OutputFormat::Table);
                assert!(list.all_pages);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_format_defaults_to_plain() {
        let cli = Cli::try_parse_from(["basecamp", "search-metadata"]).unwrap();
        match cli.command {
            Commands::SearchMetadata { output } => {
                assert_eq!(output.format, OutputFormat::Plain);
                assert_eq!(output.account_id, None);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_recordings_list_accepts_api_type_names() {
        let cli = Cli::try_parse_from([
            "basecamp",
            "recordings",
            "list",
            "--type",
            "Kanban::Card",
            "--status",
            "archived",
        ])
        .unwrap();
        match cli.command {
            Commands::Recordings {
                command:
                    RecordingCommands::List {
                        recording_type,
                        status,
                        direction,
                        ..
                    },
            } => {
                assert_eq!(recording_type, RecordingType::KanbanCard);
                assert_eq!(status, RecordingStatus::Archived);
                assert_eq!(direction, SortDirection::Desc);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_search_defaults() {
        let cli = Cli::try_parse_from(["basecamp", "-v", "search", "roadmap"]).unwrap();
        assert_eq!(cli.verbose, 1);
        match cli.command {
            Commands::Search(args) => {
                let query = args.to_query();
                assert_eq!(query.query, "roadmap");
                assert_eq!(query.page, 1);
                assert_eq!(query.per_page, 50);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_recordings_list_requires_type() {
        assert!(Cli::try_parse_from(["basecamp", "recordings", "list"]).is_err());
    }
}
