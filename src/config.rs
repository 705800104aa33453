#[derive(Clone)]
pub struct Config {
    // HTTP server
    pub host: String,
    pub port: u16,

    // SQLite
    pub database_url: String,
    pub db_pool_size: u32,

    /// Modem identifiers registered in the device table at startup.
    pub devices: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenv::dotenv().ok();

        Ok(Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()?,

            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://api_server.db?mode=rwc".to_string()),
            db_pool_size: std::env::var("DB_POOL_SIZE")
                .unwrap_or_else(|_| "5".to_string())
                .parse()?,

            devices: std::env::var("DEVICES")
                .unwrap_or_else(|_| "12FED,12FEE,12FEF,12FF0".to_string())
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        })
    }
}
