use clap::{Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use dotenv::dotenv;
use kudos::{
    limits::{Limits, CHUNK_SIZE, MAX_POSTS},
    post::{SortDirection, SortField},
};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "kudos", version, about)]
pub struct Config {
    /// Key-value storage file
    #[arg(long, global = true, default_value = "./kudos.json", env = "KUDOS_DATA")]
    data: PathBuf,
    /// SQLite database (a `file:` prefix is accepted)
    #[arg(long, global = true, default_value = "./kudos.db", env = "DATABASE_URL")]
    database: String,
    /// Posts kept in storage
    #[arg(long, global = true, default_value_t = MAX_POSTS)]
    max_posts: usize,
    /// Posts per storage chunk
    #[arg(long, global = true, default_value_t = CHUNK_SIZE)]
    chunk_size: usize,
    #[command(flatten)]
    pub verbose: Verbosity<InfoLevel>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Create an account
    SignUp {
        name: String,
        email: String,
        password: String,
        /// Image URL or path to a local image file
        #[arg(long)]
        image: String,
    },
    /// Log in with email and password
    LogIn { email: String, password: String },
    /// Log out
    LogOut,
    /// Show the logged-in user
    Whoami,
    /// List known users
    Users,
    /// Publish a post
    Post {
        content: String,
        /// Email of a mentioned user
        #[arg(short, long = "mention")]
        mentions: Vec<String>,
    },
    /// Like or unlike a post
    Like { post_id: String },
    /// Comment on a post
    Comment { post_id: String, content: String },
    /// Show the timeline
    List {
        /// Match content or author name
        #[arg(short, long, default_value = "")]
        search: String,
        #[arg(long, default_value_t)]
        sort: SortField,
        #[arg(long, default_value_t)]
        direction: SortDirection,
    },
    /// Edit the logged-in profile
    Profile {
        #[arg(long)]
        name: Option<String>,
        /// Image URL or path to a local image file
        #[arg(long)]
        image: Option<String>,
    },
    /// Create the relational tables and seed the test account
    SetupDb,
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
    pub const fn data(&self) -> &PathBuf {
        &self.data
    }
    /// Database path without the `file:` scheme
    pub fn database(&self) -> PathBuf {
        PathBuf::from(
            self.database
                .strip_prefix("file:")
                .unwrap_or(&self.database),
        )
    }
    pub fn limits(&self) -> Limits {
        Limits {
            max_posts: self.max_posts,
            chunk_size: self.chunk_size.max(1),
            ..Limits::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_list_options() {
        let config = Config::try_parse_from([
            "kudos", "--data", "/tmp/k.json", "list", "--sort", "likes", "--direction", "asc",
        ])
        .unwrap();

        assert_eq!(config.data(), &PathBuf::from("/tmp/k.json"));
        match config.command {
            Command::List { search, sort, direction } => {
                assert_eq!(search, "");
                assert_eq!(sort, SortField::Likes);
                assert_eq!(direction, SortDirection::Asc);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn database_accepts_file_scheme() {
        let config =
            Config::try_parse_from(["kudos", "--database", "file:local.db", "setup-db"]).unwrap();
        assert_eq!(config.database(), PathBuf::from("local.db"));
    }

    #[test]
    fn limits_follow_flags() {
        let config =
            Config::try_parse_from(["kudos", "whoami", "--max-posts", "7", "--chunk-size", "0"])
                .unwrap();
        let limits = config.limits();
        assert_eq!(limits.max_posts, 7);
        assert_eq!(limits.chunk_size, 1);
        assert_eq!(limits.max_saved_comments, Limits::default().max_saved_comments);
    }
}
