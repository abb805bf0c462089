//! CLI argument definitions using clap derive

use crate::store::Direction;
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

/// Quire - flat-file blog post store
///
/// Keeps an ordered JSON index of posts next to one HTML file per post,
/// with a time-boxed read cache in front of the index.
#[derive(Parser, Debug)]
#[command(name = "quire")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "QUIRE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Site root directory (overrides site.root)
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Skip local quire.toml discovery
    #[arg(long, global = true)]
    pub no_local: bool,

    /// Log output format
    #[arg(
        long,
        global = true,
        env = "QUIRE_LOG_FORMAT",
        default_value = "text"
    )]
    pub log_format: LogFormat,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List posts in index order
    List(ListArgs),

    /// Show one post
    Show(ShowArgs),

    /// Find a post, tag or search results for a path segment
    Search(SearchArgs),

    /// Create a post
    New(NewArgs),

    /// Edit a post; omitted fields keep their current values
    Edit(EditArgs),

    /// Delete a post and its content file
    Delete(DeleteArgs),

    /// Move a post one place up or down
    Move(MoveArgs),

    /// Shuffle the order of all posts
    Shuffle(ShuffleArgs),

    /// Inspect or clear the read cache
    Cache(CacheArgs),

    /// Open an admin session
    Login(LoginArgs),

    /// Close the admin session and clear the read cache
    Logout,

    /// Set the admin password
    Passwd(PasswdArgs),

    /// Import an image into the media directory
    Upload(UploadArgs),

    /// List imported images
    Images(ImagesArgs),

    /// Show dashboard statistics
    Stats,

    /// Show or edit configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Only posts carrying this tag
    #[arg(short, long)]
    pub tag: Option<String>,

    /// Page number (page size from site.posts_per_page)
    #[arg(short, long)]
    pub page: Option<usize>,

    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the show command
#[derive(Parser, Debug)]
pub struct ShowArgs {
    /// Post slug
    pub slug: String,

    /// Print the HTML content as well
    #[arg(long)]
    pub content: bool,

    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the search command
#[derive(Parser, Debug)]
pub struct SearchArgs {
    /// Slug, tag or search term
    pub segment: String,

    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Post fields shared by `new` and `edit`
#[derive(Args, Debug, Default)]
pub struct PostFields {
    /// Short description
    #[arg(short, long)]
    pub description: Option<String>,

    /// Comma-separated tags
    #[arg(long)]
    pub tags: Option<String>,

    /// Featured image URL
    #[arg(long)]
    pub image: Option<String>,

    /// Read the HTML content from a file
    #[arg(long, conflicts_with = "content")]
    pub content_file: Option<PathBuf>,

    /// HTML content
    #[arg(long)]
    pub content: Option<String>,
}

/// Arguments for the new command
#[derive(Parser, Debug)]
pub struct NewArgs {
    /// Post title
    #[arg(long)]
    pub title: String,

    #[command(flatten)]
    pub fields: PostFields,
}

/// Arguments for the edit command
#[derive(Parser, Debug)]
pub struct EditArgs {
    /// Slug of the post to edit
    pub slug: String,

    /// New title (changes the slug)
    #[arg(long)]
    pub title: Option<String>,

    #[command(flatten)]
    pub fields: PostFields,
}

/// Arguments for the delete command
#[derive(Parser, Debug)]
pub struct DeleteArgs {
    /// Post slug
    pub slug: String,

    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

/// Arguments for the move command
#[derive(Parser, Debug)]
pub struct MoveArgs {
    /// Post slug
    pub slug: String,

    /// Direction to move in
    pub direction: MoveDirection,
}

/// Arguments for the shuffle command
#[derive(Parser, Debug)]
pub struct ShuffleArgs {
    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

/// Arguments for the cache command
#[derive(Parser, Debug)]
pub struct CacheArgs {
    /// Subcommand for cache
    #[command(subcommand)]
    pub action: CacheAction,
}

/// Cache subcommands
#[derive(Subcommand, Debug)]
pub enum CacheAction {
    /// Show snapshot state and age
    Status,

    /// Delete the snapshot
    Clear,
}

/// Arguments for the login command
#[derive(Parser, Debug)]
pub struct LoginArgs {
    /// Admin password (prompted for when omitted)
    #[arg(long, env = "QUIRE_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

/// Arguments for the passwd command
#[derive(Parser, Debug)]
pub struct PasswdArgs {
    /// New password (prompted for when omitted)
    #[arg(long)]
    pub password: Option<String>,

    /// Write the hash to the project-local quire.toml instead of global config
    #[arg(long)]
    pub local: bool,
}

/// Arguments for the upload command
#[derive(Parser, Debug)]
pub struct UploadArgs {
    /// Image file to import
    pub file: PathBuf,
}

/// Arguments for the images command
#[derive(Parser, Debug)]
pub struct ImagesArgs {
    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., site.title)
        key: String,
        /// Value to set
        value: String,
        /// Write to the project-local quire.toml instead of global config
        #[arg(long)]
        local: bool,
    },
}

/// Arguments for the completions command
#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Target shell
    pub shell: Shell,
}

/// Output format for listing commands
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
    /// Simple text (one per line)
    Plain,
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines
    Text,
    /// One JSON object per event
    Json,
}

/// Direction argument for the move command
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MoveDirection {
    Up,
    Down,
}

impl From<MoveDirection> for Direction {
    fn from(direction: MoveDirection) -> Self {
        match direction {
            MoveDirection::Up => Direction::Up,
            MoveDirection::Down => Direction::Down,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn cli_parses_list() {
        let cli = Cli::parse_from(["quire", "list", "--page", "2", "--format", "json"]);
        match cli.command {
            Commands::List(args) => {
                assert_eq!(args.page, Some(2));
                assert!(matches!(args.format, OutputFormat::Json));
                assert!(args.tag.is_none());
            }
            _ => panic!("expected List command"),
        }
    }

    #[test]
    fn cli_parses_new() {
        let cli = Cli::parse_from([
            "quire",
            "new",
            "--title",
            "Hello World",
            "--tags",
            "rust,web",
            "--content",
            "<p>Hi</p>",
        ]);
        match cli.command {
            Commands::New(args) => {
                assert_eq!(args.title, "Hello World");
                assert_eq!(args.fields.tags.as_deref(), Some("rust,web"));
                assert_eq!(args.fields.content.as_deref(), Some("<p>Hi</p>"));
                assert!(args.fields.description.is_none());
            }
            _ => panic!("expected New command"),
        }
    }

    #[test]
    fn cli_new_requires_title() {
        assert!(Cli::try_parse_from(["quire", "new"]).is_err());
    }

    #[test]
    fn cli_content_sources_conflict() {
        let result = Cli::try_parse_from([
            "quire",
            "new",
            "--title",
            "T",
            "--content",
            "x",
            "--content-file",
            "post.html",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn cli_parses_edit_without_title() {
        let cli = Cli::parse_from(["quire", "edit", "hello-world", "--description", "New"]);
        match cli.command {
            Commands::Edit(args) => {
                assert_eq!(args.slug, "hello-world");
                assert!(args.title.is_none());
                assert_eq!(args.fields.description.as_deref(), Some("New"));
            }
            _ => panic!("expected Edit command"),
        }
    }

    #[test]
    fn cli_parses_move() {
        let cli = Cli::parse_from(["quire", "move", "hello", "down"]);
        match cli.command {
            Commands::Move(args) => {
                assert_eq!(args.slug, "hello");
                assert_eq!(Direction::from(args.direction), Direction::Down);
            }
            _ => panic!("expected Move command"),
        }
        assert!(Cli::try_parse_from(["quire", "move", "hello", "sideways"]).is_err());
    }

    #[test]
    fn cli_parses_cache_actions() {
        let cli = Cli::parse_from(["quire", "cache", "status"]);
        assert!(matches!(
            cli.command,
            Commands::Cache(CacheArgs {
                action: CacheAction::Status
            })
        ));
        let cli = Cli::parse_from(["quire", "cache", "clear"]);
        assert!(matches!(
            cli.command,
            Commands::Cache(CacheArgs {
                action: CacheAction::Clear
            })
        ));
    }

    #[test]
    fn cli_global_flags() {
        let cli = Cli::parse_from([
            "quire",
            "--no-local",
            "--root",
            "/srv/blog",
            "--log-format",
            "json",
            "stats",
        ]);
        assert!(cli.no_local);
        assert_eq!(cli.root, Some(PathBuf::from("/srv/blog")));
        assert_eq!(cli.log_format, LogFormat::Json);
        assert!(matches!(cli.command, Commands::Stats));
    }

    #[test]
    fn cli_verbose_levels() {
        let cli = Cli::parse_from(["quire", "stats"]);
        assert_eq!(cli.verbose, 0);

        let cli = Cli::parse_from(["quire", "-v", "stats"]);
        assert_eq!(cli.verbose, 1);

        let cli = Cli::parse_from(["quire", "-vv", "stats"]);
        assert_eq!(cli.verbose, 2);
    }
}
