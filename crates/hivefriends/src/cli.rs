//! Clap derive structures for the `hivefriends` CLI.
//!
//! Defines the command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// hivefriends -- photo albums for friends, from the terminal
#[derive(Debug, Parser)]
#[command(
    name = "hivefriends",
    version,
    about = "Browse and manage hivefriends photo albums from the command line",
    long_about = "A command-line client for a hivefriends photo-album server.\n\n\
        Sign in once with `hivefriends login`; the session is kept on disk\n\
        until you log out or the server rejects it.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Configuration profile to use
    #[arg(long, short = 'p', env = "HIVEFRIENDS_PROFILE", global = true)]
    pub profile: Option<String>,

    /// API URL (overrides profile)
    #[arg(long, short = 'u', env = "HIVEFRIENDS_URL", global = true)]
    pub url: Option<String>,

    /// Session file (defaults to the platform data directory)
    #[arg(long, env = "HIVEFRIENDS_SESSION_FILE", global = true)]
    pub session_file: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "HIVEFRIENDS_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "HIVEFRIENDS_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds
    #[arg(long, env = "HIVEFRIENDS_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in and keep the session on disk
    Login(LoginArgs),

    /// Forget the stored session
    Logout,

    /// Show the signed-in user
    Whoami,

    /// Show recent activity grouped by day
    #[command(alias = "feed")]
    Activity(ActivityArgs),

    /// Browse and manage albums
    #[command(alias = "a")]
    Albums(AlbumsArgs),

    /// Read and write image comments
    #[command(alias = "c")]
    Comments(CommentsArgs),

    /// Browse users
    Users(UsersArgs),

    /// Upload images
    Upload(UploadArgs),

    /// View and change account settings
    Settings(SettingsArgs),

    /// Resolve an app path through the route guard
    Open(OpenArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Auth ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Username (defaults to the profile's username)
    #[arg(long, env = "HIVEFRIENDS_USERNAME")]
    pub username: Option<String>,

    /// Store the password in the system keyring after a successful sign-in
    #[arg(long)]
    pub save_password: bool,
}

// ── Activity ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ActivityArgs {
    /// Only show the most recent N days
    #[arg(long, short = 'd')]
    pub days: Option<usize>,
}

// ── Albums ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct AlbumsArgs {
    #[command(subcommand)]
    pub command: AlbumsCommand,
}

#[derive(Debug, Subcommand)]
pub enum AlbumsCommand {
    /// List albums
    #[command(alias = "ls")]
    List {
        /// Only albums by these users (repeatable)
        #[arg(long)]
        user: Vec<String>,

        /// Extra filters as key=value (repeatable)
        #[arg(long, short = 'f', value_name = "KEY=VALUE")]
        filter: Vec<String>,
    },

    /// Show one album and its images
    Show {
        /// Album key
        key: String,

        /// Share token, for albums shared publicly
        #[arg(long)]
        token: Option<String>,
    },

    /// Create an album from uploaded image keys
    Create {
        #[arg(long)]
        title: String,

        #[arg(long)]
        description: Option<String>,

        /// Image keys to include (repeatable)
        #[arg(long = "image", required = true)]
        images: Vec<String>,

        /// Cover image key (defaults to the first image)
        #[arg(long)]
        cover: Option<String>,

        /// Usernames to tag (repeatable)
        #[arg(long = "tag")]
        tagged: Vec<String>,

        /// Save as a draft
        #[arg(long)]
        draft: bool,
    },

    /// Create a public share link
    Share {
        /// Album key
        key: String,
    },

    /// Delete an album
    #[command(alias = "rm")]
    Delete {
        /// Album key
        key: String,
    },
}

// ── Comments ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CommentsArgs {
    #[command(subcommand)]
    pub command: CommentsCommand,
}

#[derive(Debug, Subcommand)]
pub enum CommentsCommand {
    /// List comments on an image
    #[command(alias = "ls")]
    List {
        album: String,
        image: String,

        /// Share token, for albums shared publicly
        #[arg(long)]
        token: Option<String>,
    },

    /// Comment on an image
    Add {
        album: String,
        image: String,
        /// Comment text; `@username` mentions are kept as written
        text: String,
    },

    /// Delete a comment
    #[command(alias = "rm")]
    Delete { album: String, id: i64 },
}

// ── Users ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct UsersArgs {
    #[command(subcommand)]
    pub command: UsersCommand,
}

#[derive(Debug, Subcommand)]
pub enum UsersCommand {
    /// List users
    #[command(alias = "ls")]
    List,

    /// Show a user's profile
    Show {
        /// Username or display name
        name: String,
    },
}

// ── Upload ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct UploadArgs {
    /// Image files to upload
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

// ── Settings ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SettingsArgs {
    #[command(subcommand)]
    pub command: SettingsCommand,
}

#[derive(Debug, Subcommand)]
pub enum SettingsCommand {
    /// Show account settings
    Show,

    /// Change one setting
    Set {
        /// Setting name, e.g. displayName
        key: String,
        /// New value; parsed as JSON when possible, otherwise a string
        value: String,
    },

    /// Change the account password
    Password,
}

// ── Open ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct OpenArgs {
    /// App path, e.g. /album/abc or /public/album/abc/token
    pub path: String,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Interactive configuration wizard
    Init,

    /// Show the current configuration
    Show,

    /// Print the configuration file path
    Path,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
