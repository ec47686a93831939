use config::Config;
use lazy_static::lazy_static;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct YoutubeConfig {
    pub batch_size: usize,
    pub requests_per_second: u32,
    pub quota_units_per_day: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CircuitBreakerConfig {
    pub failure_threshold: u32,
    pub reset_timeout_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FeatureWeights {
    pub sender: f64,
    pub thread: f64,
    pub freshness: f64,
    pub topic: f64,
    pub noise_penalty: f64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RankingConfig {
    pub freshness_half_life_days: i64,
    pub watch_now_threshold: f64,
    pub save_threshold: f64,
    pub feature_weights: FeatureWeights,
}

#[derive(Debug, Deserialize, Clone)]
pub struct QueueConfig {
    pub default_max_attempts: i32,
    pub backoff_base_secs: i64,
    pub drain_deadline_ms: u64,
    pub email_process_concurrency: usize,
    pub enrich_concurrency: usize,
    pub rank_compute_concurrency: usize,
}

#[derive(Debug, Deserialize, Clone)]
struct ConfigFile {
    youtube: YoutubeConfig,
    circuit_breaker: CircuitBreakerConfig,
    ranking: RankingConfig,
    queue: QueueConfig,
}

pub struct ServerConfig {
    pub youtube: YoutubeConfig,
    pub circuit_breaker: CircuitBreakerConfig,
    pub ranking: RankingConfig,
    pub queue: QueueConfig,
}

impl std::fmt::Display for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "youtube: {:?}, circuit_breaker: {:?}, ranking: {:?}, queue: {:?}",
            self.youtube, self.circuit_breaker, self.ranking, self.queue
        )
    }
}

lazy_static! {
    #[allow(non_upper_case_globals)]
    pub static ref cfg: ServerConfig = {
        let root = env!("CARGO_MANIFEST_DIR");
        let path = format!("{root}/config.toml");
        let config_file: ConfigFile = Config::builder()
            .add_source(config::File::with_name(&path))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()
            .expect("config.toml is required")
            .try_deserialize()
            .expect("config.toml is invalid");

        ServerConfig {
            youtube: config_file.youtube,
            circuit_breaker: config_file.circuit_breaker,
            ranking: config_file.ranking,
            queue: config_file.queue,
        }
    };
}

/// Small curated vocabulary the ranker matches title tokens against to build topic tags
/// (`Ranker::topic_tags`, SPEC_FULL §4.5). Kept in code, not config, since it changes with
/// the ranker's behavior rather than per-deployment tuning.
pub const TOPIC_VOCABULARY: &[&str] = &[
    "rust", "python", "javascript", "typescript", "golang", "java", "kotlin", "swift",
    "database", "postgres", "mysql", "sqlite", "redis", "kafka", "docker", "kubernetes",
    "algorithm", "datastructure", "system", "design", "network", "security", "crypto",
    "machine", "learning", "neural", "model", "training", "inference", "tensor", "gradient",
    "compiler", "parser", "runtime", "async", "concurrency", "thread", "memory", "performance",
    "frontend", "backend", "api", "http", "tcp", "protocol", "cloud", "infrastructure",
    "testing", "debugging", "architecture", "microservice", "distributed", "consensus",
];
