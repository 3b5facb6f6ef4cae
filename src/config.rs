use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub app_name: String,
    pub database_url: String,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    pub jwt_ttl_seconds: i64,
    pub host: String,
    pub port: u16,
    // Azure OpenAI (optional)
    pub azure_openai_api_key: Option<String>,
    pub azure_openai_endpoint: Option<String>,
    pub azure_openai_deployment_name: Option<String>,
    pub azure_openai_api_version: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            app_name: env::var("APP_NAME").unwrap_or_else(|_| "Mini Pagilla API".into()),
            database_url: required("DATABASE_URL")?,
            database_max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "10".into())
                .parse()?,
            jwt_secret: required("JWT_SECRET")?,
            jwt_ttl_seconds: env::var("JWT_TTL_SECONDS")
                .unwrap_or_else(|_| "600".into())
                .parse()?,
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".into()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8000".into())
                .parse()?,
            azure_openai_api_key: env::var("AZURE_OPENAI_API_KEY").ok().filter(|s| !s.is_empty()),
            azure_openai_endpoint: env::var("AZURE_OPENAI_ENDPOINT").ok().filter(|s| !s.is_empty()),
            azure_openai_deployment_name: env::var("AZURE_OPENAI_DEPLOYMENT_NAME")
                .ok()
                .filter(|s| !s.is_empty()),
            azure_openai_api_version: env::var("AZURE_OPENAI_API_VERSION")
                .unwrap_or_else(|_| "2024-02-01".into()),
        })
    }
}

fn required(key: &str) -> anyhow::Result<String> {
    env::var(key).map_err(|_| anyhow::anyhow!("Missing required env var: {}", key))
}
