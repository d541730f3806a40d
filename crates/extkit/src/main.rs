//! `extkit` — author, sign, pack and verify extensions.

mod config;
#[cfg(feature = "fetch")]
mod fetch;
mod init;
mod inspect;
mod keygen;
mod keysource;
mod list;
mod pack;
mod sign;
mod unpack;
mod unsign;
mod verify;

use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// Extension authoring and signing tools.
#[derive(Parser)]
#[command(name = "extkit", version)]
struct Cli {
    /// Path to the config file (defaults to ~/.config/extkit/config.json).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create an unsigned information file.
    Init {
        /// Extension name; also names the output file.
        #[arg(long)]
        name: String,
        #[arg(long)]
        author: String,
        #[arg(long, default_value = "")]
        description: String,
        /// The extension's own version.
        #[arg(long, default_value = "0.1.0")]
        version: String,
        /// Record schema version tag.
        #[arg(long, default_value = init::DEFAULT_FORMAT_VERSION)]
        format_version: String,
        /// Output directory (defaults to <root>/<name>).
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Generate an RSA-2048 key pair.
    Keygen {
        /// Identity written into both key files.
        #[arg(long)]
        author: String,
        /// Output directory (defaults to the configured key directory).
        #[arg(long)]
        output: Option<PathBuf>,
        /// Overwrite existing key files.
        #[arg(long)]
        force: bool,
    },

    /// Sign an unsigned information file against a binary payload.
    Sign {
        /// Unsigned information file (.ainf).
        info: PathBuf,
        /// Payload the signature covers.
        #[arg(long)]
        binary: PathBuf,
        /// Private key file (.akyx). Defaults to <key_dir>/<author>.akyx.
        #[arg(long, conflicts_with = "author")]
        key: Option<PathBuf>,
        /// Identity whose private key is loaded from the key directory.
        #[arg(long)]
        author: Option<String>,
    },

    /// Remove the signature from a signed information file.
    Unsign {
        /// Signed information file (.anfx).
        info: PathBuf,
    },

    /// Verify a package, or a signed information file plus its payload.
    Verify {
        /// Package (.aext) or signed information file (.anfx).
        file: PathBuf,
        /// Payload for a signed information file.
        #[arg(long)]
        binary: Option<PathBuf>,
        /// Public key file (.akey). Defaults to the signer's key in the key directory.
        #[arg(long, conflicts_with = "fetch")]
        key: Option<PathBuf>,
        /// Fetch the signer's public key from the configured key server.
        #[arg(long)]
        fetch: bool,
    },

    /// Concatenate an information file and a payload into a package.
    Pack {
        /// Information file (.ainf or .anfx).
        info: PathBuf,
        #[arg(long)]
        binary: PathBuf,
        /// Output path (defaults to <dir>/<name>.aext).
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Split a package back into an information file and a payload.
    Unpack {
        /// Package (.aext).
        package: PathBuf,
        /// Output directory (defaults to the package's directory).
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },

    /// Show the record of an information file or package.
    Inspect {
        file: PathBuf,
        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// List project directories under the configured root.
    List,

    /// Download public keys from the configured key server into the key directory.
    #[cfg(feature = "fetch")]
    FetchKeys {
        /// Identity to fetch. Fetches every key in the server's index when omitted.
        #[arg(long)]
        author: Option<String>,
    },

    /// Show or change the configuration.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration.
    Show,
    /// Set the projects root directory.
    SetRoot { path: PathBuf },
    /// Move the projects root directory, with its projects, to a new location.
    MoveRoot { path: PathBuf },
    /// Set the key directory.
    SetKeyDir { path: PathBuf },
    /// Set (or clear, when omitted) the remote key directory URL.
    SetKeyServer { url: Option<String> },
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config_path = cli.config.unwrap_or_else(Config::default_path);
    let config = Config::load(&config_path)?;
    tracing::debug!(path = %config_path.display(), ?config, "loaded config");

    match cli.command {
        Command::Init {
            name,
            author,
            description,
            version,
            format_version,
            output,
        } => init::run(
            &config,
            &init::Fields {
                name,
                author,
                description,
                version,
                format_version,
            },
            output.as_deref(),
        ),
        Command::Keygen { author, output, force } => keygen::run(&config, &author, output.as_deref(), force),
        Command::Sign {
            info,
            binary,
            key,
            author,
        } => sign::run(&config, &info, &binary, key.as_deref(), author.as_deref()),
        Command::Unsign { info } => unsign::run(&info),
        Command::Verify {
            file,
            binary,
            key,
            fetch,
        } => verify::run(&config, &file, binary.as_deref(), key.as_deref(), fetch),
        Command::Pack { info, binary, output } => pack::run(&info, &binary, output.as_deref()),
        Command::Unpack { package, output_dir } => unpack::run(&package, output_dir.as_deref()),
        Command::Inspect { file, json } => inspect::run(&file, json),
        Command::List => list::run(&config),
        #[cfg(feature = "fetch")]
        Command::FetchKeys { author } => fetch::run(&config, author.as_deref()),
        Command::Config { action } => match action {
            ConfigAction::Show => config::show(&config_path, &config),
            ConfigAction::SetRoot { path } => config::update(&config_path, config, |c| c.root = path),
            ConfigAction::MoveRoot { path } => config::move_root(&config_path, config, path),
            ConfigAction::SetKeyDir { path } => config::update(&config_path, config, |c| c.key_dir = path),
            ConfigAction::SetKeyServer { url } => config::update(&config_path, config, |c| c.key_server = url),
        },
    }
}
