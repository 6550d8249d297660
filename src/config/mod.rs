use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub postgres: PostgresConfig,
    pub redis: RedisConfig,
    pub ranking: RankingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: usize,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostgresConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    pub url: String,
    pub ttl_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingConfig {
    /// How many providers a ranking query returns when the caller does not
    /// ask for a specific count.
    pub default_top_n: usize,
    pub max_top_n: usize,
    /// Bounds of the rating scale; 0 is reserved for "no rating".
    pub min_rating: f32,
    pub max_rating: f32,
    /// How long a computed category leaderboard stays valid.
    pub leaderboard_ttl_seconds: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
                workers: num_cpus::get(),
            },
            postgres: PostgresConfig {
                url: "postgresql://localhost:5432/handyrec".to_string(),
                max_connections: 10,
            },
            redis: RedisConfig {
                url: "redis://localhost:6379".to_string(),
                ttl_seconds: 300,
            },
            ranking: RankingConfig {
                default_top_n: 5,
                max_top_n: 100,
                min_rating: 1.0,
                max_rating: 5.0,
                leaderboard_ttl_seconds: 300,
            },
        }
    }
}

impl Config {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(config::Environment::with_prefix("HANDYREC"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
