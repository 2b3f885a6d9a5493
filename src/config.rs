use clap::Parser;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 6379;
pub const DEFAULT_MAX_FRAME_SIZE: usize = 512 * 1024 * 1024;

/// An in-memory key-value store speaking a subset of the Redis protocol.
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(version, about)]
pub struct Config {
    /// The address to listen on
    #[arg(long, env = "KVSTORE_HOST", default_value = DEFAULT_HOST)]
    pub host: String,

    /// The port to listen on
    #[arg(
        short,
        long,
        env = "KVSTORE_PORT",
        default_value_t = DEFAULT_PORT,
        value_parser = clap::value_parser!(u16).range(1024..=49151)
    )]
    pub port: u16,

    /// Connections buffering more bytes than this without completing a request are closed
    #[arg(long, env = "MAX_FRAME_SIZE", default_value_t = DEFAULT_MAX_FRAME_SIZE)]
    pub max_frame_size: usize,
}

impl Config {
    /// The default configuration listening on `port`.
    pub fn with_port(port: u16) -> Config {
        Config {
            port,
            ..Config::default()
        }
    }

    pub fn address(&self) -> (&str, u16) {
        (self.host.as_str(), self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
        }
    }
}
