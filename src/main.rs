use std::{
    error::Error,
    io,
    process,
    time::{Duration, UNIX_EPOCH},
};

use clap::{command, Args as ClapArgs, Parser, Subcommand, ValueHint};
use log::{debug, error, info, LevelFilter};
use uuid::Uuid;

use scrobbler::{
    config::Config,
    credentials::Credentials,
    session::Session,
    track::{Rating, Scrobble, Source, Track},
};

/// Profile to display when not built in release mode.
#[cfg(debug_assertions)]
const BUILD_PROFILE: &str = "debug";
/// Profile to display when not built release mode.
#[cfg(not(debug_assertions))]
const BUILD_PROFILE: &str = "release";

/// Group name for mutually exclusive logging options.
const ARGS_GROUP_LOGGING: &str = "logging";

/// Command line arguments as parsed by `clap`.
#[derive(Clone, Debug, PartialEq, Eq, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Secrets file
    ///
    /// Ensure that the this file is kept secure and not shared publicly, as it
    /// contains the API secret and session key of your account.
    #[arg(short, long, value_name = "FILE", value_hint = ValueHint::FilePath, default_value_t = String::from("secrets.toml"))]
    secrets_file: String,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECONDS", default_value_t = Config::DEFAULT_TIMEOUT.as_secs())]
    timeout: u64,

    /// Text to append to the `User-Agent` header
    #[arg(long, value_name = "TEXT", default_value_t = String::new())]
    user_agent: String,

    /// Suppresses all output except warnings and errors.
    #[arg(short, long, default_value_t = false, group = ARGS_GROUP_LOGGING)]
    quiet: bool,

    /// Enable verbose logging
    ///
    /// Specify twice for trace logging.
    #[arg(short, long, action = clap::ArgAction::Count, group = ARGS_GROUP_LOGGING)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Debug, PartialEq, Eq, Subcommand)]
enum Command {
    /// Announce a track that has started playing
    NowPlaying {
        #[command(flatten)]
        track: TrackArgs,
    },

    /// Submit a track that has finished playing
    Scrobble {
        #[command(flatten)]
        track: TrackArgs,

        /// When the track started playing, in seconds since the epoch (UTC)
        #[arg(long, value_name = "TIMESTAMP")]
        started_at: u64,

        /// How the track was selected: P, R, E or L (optionally followed by
        /// the Last.fm recommendation key)
        #[arg(long, default_value_t = String::from("P"))]
        source: String,

        /// Rating: L (love), B (ban) or S (skip)
        #[arg(long)]
        rating: Option<String>,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, ClapArgs)]
struct TrackArgs {
    /// Artist name
    #[arg(short, long)]
    artist: String,

    /// Track title
    #[arg(short, long)]
    track: String,

    /// Album title
    #[arg(short = 'b', long)]
    album: Option<String>,

    /// Track length in seconds
    #[arg(short, long, value_name = "SECONDS")]
    length: Option<u64>,

    /// Position of the track on the album
    #[arg(short = 'n', long)]
    track_number: Option<u32>,

    /// MusicBrainz track ID
    #[arg(short, long)]
    mbid: Option<Uuid>,
}

impl From<TrackArgs> for Track {
    fn from(args: TrackArgs) -> Self {
        Self {
            artist: args.artist,
            title: args.track,
            album: args.album,
            length: args.length.map(Duration::from_secs),
            track_number: args.track_number,
            mbid: args.mbid,
        }
    }
}

/// Initializes the logger facade.
///
/// The logging level is determined as follows, in order of precedence from
/// highest to lowest:
/// 1. Command line arguments
/// 2. `RUST_LOG` environment variable
/// 3. Hard coded default
///
/// # Panics
///
/// Panics when a logger facade is already initialized.
fn init_logger(config: &Args) {
    let mut logger = env_logger::Builder::from_env(
        // Note: if you change the default logging level here, then you should
        // probably also change the verbosity levels below.
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, "info"),
    );

    if config.quiet || config.verbose > 0 {
        let level = match config.verbose {
            0 => {
                // Quiet and verbose are mutually exclusive, and `verbose` is 0
                // by default. So this arm means: quiet mode.
                LevelFilter::Warn
            }
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        };

        // Filter log messages of external crates.
        logger.filter_module(module_path!(), level);
    }

    logger.init();
}

/// Loads the credentials from a file.
///
/// # Errors
///
/// This function returns an error if the file could not be read or is not a
/// valid secrets file.
fn load_credentials(secrets_file: &str) -> io::Result<Credentials> {
    let credentials = Credentials::from_file(secrets_file);

    if let Err(ref e) = credentials {
        if e.kind() == io::ErrorKind::NotFound {
            info!("see secrets.toml.example on how to set your credentials in {secrets_file}");
        }
    }

    credentials
}

/// Performs the handshake and the requested command.
///
/// # Errors
///
/// This function returns an error when the secrets file cannot be loaded,
/// the arguments are not a valid play event, or the server refuses the
/// handshake or the request.
async fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let credentials = load_credentials(&args.secrets_file)?;

    let mut config = Config::with_user_agent(&args.user_agent);
    config.timeout = Duration::from_secs(args.timeout);

    let session = Session::new(credentials, &config).await?;

    match args.command {
        Command::NowPlaying { track } => {
            let track = Track::from(track);
            session.now_playing(&track).await?;
            info!("now playing: {} - {}", track.artist, track.title);
        }

        Command::Scrobble {
            track,
            started_at,
            source,
            rating,
        } => {
            let mut scrobble = Scrobble::new(
                Track::from(track),
                UNIX_EPOCH + Duration::from_secs(started_at),
            )
            .with_source(source.parse::<Source>()?);
            if let Some(rating) = rating {
                scrobble = scrobble.with_rating(rating.parse::<Rating>()?);
            }

            session.submit(&scrobble).await?;
            info!(
                "scrobbled: {} - {}",
                scrobble.track.artist, scrobble.track.title
            );
        }
    }

    Ok(())
}

/// Main entry point of the application.
///
/// This function initializes the logger facade, parses the command line
/// arguments, and runs the requested command.
#[tokio::main]
async fn main() {
    // `clap` handles our command line arguments and help text.
    let args = Args::parse();
    init_logger(&args);

    // Dump command line arguments before we do anything more.
    // This aids in debugging of whatever comes next.
    debug!("Command {:#?}", args);

    let cmd = command!();
    let name = cmd.get_name().to_string();
    let version = cmd.get_version().unwrap_or("UNKNOWN").to_string();

    info!("starting {name}/{version}; {BUILD_PROFILE}");

    if let Err(e) = run(args).await {
        error!("{e}");
        process::exit(1);
    }
}
