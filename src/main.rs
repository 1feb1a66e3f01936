use log::{error, info};
use study_assistant::config::ServerConfig;
use study_assistant::{logging, server};

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    if let Err(e) = logging::init(logging::DEFAULT_LOG_LEVEL) {
        eprintln!("{}", e);
    }

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Refusing to start: {}", e);
            std::process::exit(1);
        }
    };

    info!("Starting study assistant backend with {:?}", config);

    if let Err(e) = server::serve(config).await {
        error!("Server error: {}", e);
        std::process::exit(1);
    }
}
