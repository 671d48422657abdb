use clap::{ArgAction, Parser, Subcommand, ValueHint};

#[derive(Parser)]
#[command(
    author,
    version,
    about,
    help_template = "{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}",
    arg_required_else_help = true
)]
pub struct Args {
    /// Set output verbosity
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress outputs
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output as json
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Disable colors in output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Provide custom config file
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<String>,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the configuration file to stdout
    Config,

    /// Generate a default, documented configuration file
    #[clap(name = "defconfig")]
    DefConfig,

    /// Print the paths in use
    Env,

    /// Manage release signing services
    #[command(subcommand)]
    SigningService(SigningServiceCommand),

    /// Manage APT repositories
    #[command(subcommand)]
    Repo(RepoCommand),

    /// Inspect repository versions
    #[command(subcommand)]
    Version(VersionCommand),

    /// Add or remove repository content
    #[command(subcommand)]
    Content(ContentCommand),

    /// Copy content between repositories
    #[command(arg_required_else_help = true)]
    Copy {
        /// JSON file with the copy configuration, or '-' for stdin
        #[arg(required = true, value_hint = ValueHint::FilePath)]
        file: String,

        /// Only copy the listed content, without its release structure
        #[arg(required = false, long)]
        unstructured: bool,

        /// Copy dependencies of packages as well
        #[arg(required = false, long)]
        dependency_solving: bool,
    },

    /// Check the parameters of a sync request
    #[command(arg_required_else_help = true)]
    Sync {
        /// Repository name or href
        repo: String,

        /// Href of the remote to sync from
        #[arg(required = false, long)]
        remote: Option<String>,

        /// Make the repository mirror the remote
        #[arg(required = false, long)]
        mirror: bool,

        /// Reprocess metadata even if its checksum did not change
        #[arg(required = false, long)]
        no_optimize: bool,
    },
}

#[derive(Subcommand)]
pub enum SigningServiceCommand {
    /// Register a signing service
    #[command(arg_required_else_help = true)]
    Add {
        /// Unique name of the service
        name: String,

        /// File with the ASCII-armored public key
        #[arg(required = true, long, value_hint = ValueHint::FilePath)]
        public_key: String,

        /// Fingerprint of the public key
        #[arg(required = true, long)]
        fingerprint: String,

        /// Script that produces the detached signatures
        #[arg(required = true, long, value_hint = ValueHint::FilePath)]
        script: String,
    },

    /// List signing services
    List,
}

#[derive(Subcommand)]
pub enum RepoCommand {
    /// Create a repository
    #[command(arg_required_else_help = true)]
    Create {
        /// Unique repository name
        name: String,

        /// Repository description
        #[arg(required = false, short, long)]
        description: Option<String>,

        /// Href of the default signing service
        #[arg(required = false, short, long)]
        signing_service: Option<String>,

        /// Signing service override, as DISTRIBUTION=HREF (repeatable)
        #[arg(required = false, short, long = "override", value_name = "DISTRIBUTION=HREF")]
        overrides: Vec<String>,
    },

    /// Update a repository
    #[command(arg_required_else_help = true)]
    Update {
        /// Repository name or href
        repo: String,

        /// New name
        #[arg(required = false, long)]
        name: Option<String>,

        /// New description
        #[arg(required = false, short, long, conflicts_with = "clear_description")]
        description: Option<String>,

        /// Remove the description
        #[arg(required = false, long)]
        clear_description: bool,

        /// Href of the new default signing service
        #[arg(required = false, short, long, conflicts_with = "unsigned")]
        signing_service: Option<String>,

        /// Remove the default signing service
        #[arg(required = false, long)]
        unsigned: bool,

        /// Replace the overrides, as DISTRIBUTION=HREF (repeatable)
        #[arg(
            required = false,
            short,
            long = "override",
            value_name = "DISTRIBUTION=HREF",
            conflicts_with = "clear_overrides"
        )]
        overrides: Vec<String>,

        /// Remove all overrides
        #[arg(required = false, long)]
        clear_overrides: bool,
    },

    /// Show a repository
    #[command(arg_required_else_help = true)]
    Show {
        /// Repository name or href
        repo: String,
    },

    /// List repositories
    List,

    /// Show which signing service signs a distribution
    #[command(arg_required_else_help = true)]
    ResolveSigning {
        /// Repository name or href
        repo: String,

        /// Distribution of the release
        distribution: String,
    },
}

#[derive(Subcommand)]
pub enum VersionCommand {
    /// List the versions of a repository
    #[command(arg_required_else_help = true)]
    List {
        /// Repository name or href
        repo: String,
    },

    /// Show one version and its content
    #[command(arg_required_else_help = true)]
    Show {
        /// Repository name or href
        repo: String,

        /// Version number, latest when omitted
        number: Option<i32>,

        /// List every content unit
        #[arg(required = false, short = 'l', long)]
        content: bool,
    },
}

#[derive(Subcommand)]
pub enum ContentCommand {
    /// Create a new version with the given content units added
    #[command(arg_required_else_help = true)]
    Add {
        /// Repository name or href
        repo: String,

        /// JSON file with a list of content units, or '-' for stdin
        #[arg(required = true, value_hint = ValueHint::FilePath)]
        units: String,
    },

    /// Create a new version with a file added as generic content
    #[command(arg_required_else_help = true)]
    AddFile {
        /// Repository name or href
        repo: String,

        /// File to add
        #[arg(required = true, value_hint = ValueHint::FilePath)]
        file: String,

        /// Path of the file inside the published repository
        #[arg(required = true, long)]
        relative_path: String,
    },

    /// Create a new version without the given content
    #[command(arg_required_else_help = true)]
    Remove {
        /// Repository name or href
        repo: String,

        /// Content hrefs
        #[arg(required = true)]
        content: Vec<String>,
    },
}
