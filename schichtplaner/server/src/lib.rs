pub mod config {
    use serde::Deserialize;

    /// Process configuration, read from environment variables (and `.env` when present).
    #[derive(Deserialize, Debug, Clone)]
    pub struct Config {
        #[serde(default = "default_sqlite_db_path")]
        pub sqlite_db_path: String,
        #[serde(default = "default_port")]
        pub port: u16,
    }

    impl Config {
        /// Loads configuration from environment variables.
        pub fn from_env() -> anyhow::Result<Self> {
            if let Ok(path) = dotenvy::dotenv() {
                tracing::debug!("Loaded environment from {}", path.display());
            }
            Self::from_environment(config::Environment::default())
        }

        /// Loads configuration from the given environment source.
        pub fn from_environment(environment: config::Environment) -> anyhow::Result<Self> {
            let settings = config::Config::builder().add_source(environment).build()?;

            let config: Config = settings.try_deserialize()?;
            Ok(config)
        }

        /// Connection URL for the SQLite file, created on first use.
        pub fn database_url(&self) -> String {
            format!("sqlite://{}?mode=rwc", self.sqlite_db_path)
        }
    }

    fn default_sqlite_db_path() -> String {
        "schichtplaner.db".to_string()
    }

    fn default_port() -> u16 {
        8080
    }

}

pub mod department;
pub mod entities;
pub mod shift;
pub mod todo;
pub mod user;
pub mod web;
