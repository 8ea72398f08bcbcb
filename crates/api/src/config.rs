/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// External service endpoints and credentials.
    pub services: ExternalServices,
}

/// One external HTTP API endpoint.
#[derive(Debug, Clone)]
pub struct ApiEndpoint {
    pub base_url: String,
    pub api_token: String,
    /// Model identifier sent to the service, where it takes one.
    pub model: String,
}

/// Endpoints and credentials for every external collaborator.
#[derive(Debug, Clone)]
pub struct ExternalServices {
    /// S3 bucket holding uploads, processed images, and archives.
    pub storage_bucket: String,
    /// Public base URL under which stored objects are readable.
    pub storage_public_url: String,
    pub training: ApiEndpoint,
    pub textgen: ApiEndpoint,
    pub imagegen: ApiEndpoint,
    pub rembg: ApiEndpoint,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    ///
    /// Service endpoints (`*_API_URL`, `*_API_TOKEN`, `*_MODEL`) have no
    /// useful defaults; unset values resolve to empty strings and fail
    /// at the first call, which keeps local test runs (stub services)
    /// working without a full environment.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            services: ExternalServices::from_env(),
        }
    }
}

impl ExternalServices {
    fn from_env() -> Self {
        Self {
            storage_bucket: env_or("STORAGE_BUCKET", "atelier-images"),
            storage_public_url: env_or("STORAGE_PUBLIC_URL", "http://localhost:9000/atelier-images"),
            training: ApiEndpoint {
                base_url: env_or("TRAINING_API_URL", ""),
                api_token: env_or("TRAINING_API_TOKEN", ""),
                model: env_or("TRAINING_MODEL", "flux-dev-lora-trainer"),
            },
            textgen: ApiEndpoint {
                base_url: env_or("TEXTGEN_API_URL", ""),
                api_token: env_or("TEXTGEN_API_TOKEN", ""),
                model: env_or("TEXTGEN_MODEL", "gpt-4o"),
            },
            imagegen: ApiEndpoint {
                base_url: env_or("IMAGEGEN_API_URL", ""),
                api_token: env_or("IMAGEGEN_API_TOKEN", ""),
                model: env_or("IMAGEGEN_MODEL", "flux-dev-multi-lora"),
            },
            rembg: ApiEndpoint {
                base_url: env_or("REMBG_API_URL", ""),
                api_token: env_or("REMBG_API_TOKEN", ""),
                model: env_or("REMBG_MODEL", "rembg-enhance"),
            },
        }
    }
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}
