pub mod date_format;

use std::path::PathBuf;

use chrono::Locale;
use clap::{Args, Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use dotenv::dotenv;

use crate::{
    api::{mastodon::DEFAULT_LIMIT, ClientOptions},
    embed::{Marker, MarkerKind},
    error::Result,
};
use date_format::{parse_locale, DateFormat};

#[derive(Debug, Clone, Parser)]
#[command(version, about)]
pub struct Config {
    #[command(subcommand)]
    pub command: Command,
    /// Limit request concurrency
    #[arg(long, default_value = "5", env = "TOOT_CONCURRENCY")]
    concurrency: usize,
    /// Retry transient upstream failures this many times
    #[arg(long, default_value = "0", env = "TOOT_RETRIES")]
    retries: u32,
    /// Locale for dates, e.g. `en_US` [default: host locale]
    #[arg(long, env = "TOOT_LOCALE")]
    locale: Option<String>,
    /// Date format options as JSON, e.g. `{"month":"long","day":"numeric"}`
    #[arg(long, env = "TOOT_DATE_FORMAT")]
    date_format: Option<String>,
    #[command(flatten)]
    pub verbose: Verbosity<InfoLevel>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Render the recent toots of an account
    Feed(FeedArgs),
    /// Render a toot and its replies
    Thread(ThreadArgs),
    /// Render every marker in a JSON file
    Batch {
        /// JSON array of markers
        file: PathBuf,
    },
}

#[derive(Debug, Clone, Args)]
pub struct FeedArgs {
    /// Profile URL, e.g. `https://mastodon.social/@alice`
    url: String,
    /// Account id, skips the handle lookup
    #[arg(long)]
    account_id: Option<String>,
    /// Number of toots
    #[arg(short, long, default_value_t = DEFAULT_LIMIT)]
    limit: u32,
    /// Exclude replies
    #[arg(long)]
    exclude_replies: bool,
    /// Exclude boosts
    #[arg(long)]
    exclude_reblogs: bool,
    /// Drop every toot that replies to someone, self replies included
    #[arg(long)]
    self_replies_only: bool,
}

#[derive(Debug, Clone, Args)]
pub struct ThreadArgs {
    /// Any URL on the toot's server
    url: String,
    /// Id of the toot
    id: String,
    /// Leave out the replies
    #[arg(long)]
    exclude_replies: bool,
    /// Leave out the toot itself
    #[arg(long)]
    exclude_post: bool,
}

impl Config {
    /// Parse the configuration from the environment and command line arguments
    pub fn parse() -> Self {
        dotenv().ok();
        <Self as Parser>::parse()
    }
    /// Create a logger with the configured verbosity level
    pub fn init_logger(&self) {
        env_logger::Builder::new()
            .filter_level(self.verbose.log_level_filter())
            .format_target(false)
            .init();
    }
    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            concurrency: self.concurrency,
            retries: self.retries,
        }
    }
    pub fn locale(&self) -> Result<Option<Locale>> {
        self.locale.as_deref().map(parse_locale).transpose()
    }
    pub fn date_format(&self) -> Result<Option<DateFormat>> {
        self.date_format
            .as_deref()
            .map(DateFormat::from_json)
            .transpose()
    }
}

impl From<FeedArgs> for Marker {
    fn from(args: FeedArgs) -> Self {
        Marker {
            kind: MarkerKind::Feed,
            href: args.url,
            toot_account_id: args.account_id,
            toot_limit: Some(args.limit),
            exclude_replies: args.exclude_replies,
            exclude_reblogs: args.exclude_reblogs,
            self_replies_only: args.self_replies_only,
            ..Default::default()
        }
    }
}

impl From<ThreadArgs> for Marker {
    fn from(args: ThreadArgs) -> Self {
        Marker {
            kind: MarkerKind::Thread,
            href: args.url,
            toot_id: Some(args.id),
            exclude_replies: args.exclude_replies,
            exclude_post: args.exclude_post,
            ..Default::default()
        }
    }
}
