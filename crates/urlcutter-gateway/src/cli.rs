use clap::{Parser, ValueEnum};
use std::fmt::{Display, Formatter};
use std::net::SocketAddr;
use std::path::PathBuf;
use urlcutter_storage::DEFAULT_COLLECTION;

pub const LISTEN_ADDR_ENV: &str = "URLCUTTER_LISTEN";
pub const DB_PATH_ENV: &str = "URLCUTTER_DB_PATH";
pub const COLLECTION_ENV: &str = "URLCUTTER_COLLECTION";
pub const LOG_FORMAT_ENV: &str = "URLCUTTER_LOG_FORMAT";

pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_DB_PATH: &str = "urlcutter.db";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[value(name = "text")]
    Text,
    #[value(name = "json")]
    Json,
}

impl Display for LogFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Text => write!(f, "text"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "urlcutter", about = "Minimal URL shortener backed by an embedded database")]
pub struct Cli {
    /// TCP socket to listen on, e.g. 0.0.0.0:8080.
    #[arg(long, env = LISTEN_ADDR_ENV, default_value = DEFAULT_LISTEN_ADDR)]
    pub listen: SocketAddr,

    /// Database file, created if it does not exist.
    #[arg(long, env = DB_PATH_ENV, default_value = DEFAULT_DB_PATH)]
    pub db_path: PathBuf,

    #[arg(long, env = COLLECTION_ENV, default_value = DEFAULT_COLLECTION)]
    pub collection: String,

    #[arg(
        long,
        env = LOG_FORMAT_ENV,
        value_enum,
        default_value_t = LogFormat::Text
    )]
    pub log_format: LogFormat,
}
