use std::net::TcpListener;

use authgate::configuration::get_configuration;
use authgate::startup::run;
use authgate::store::UserStore;
use authgate::telemetry::init_telemetry;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    init_telemetry();

    tracing::info!("Starting application");

    let configuration = match get_configuration() {
        Ok(config) => {
            tracing::info!("Configuration loaded successfully");
            config
        }
        Err(e) => {
            tracing::error!("Failed to read configuration: {}", e);
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Configuration error",
            ));
        }
    };

    // A missing or malformed user store file is fatal at startup.
    let store = match UserStore::load(&configuration.store.users_file).await {
        Ok(store) => store,
        Err(e) => {
            tracing::error!("Failed to load user store: {}", e);
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "User store error",
            ));
        }
    };

    let address = format!(
        "{}:{}",
        configuration.application.host, configuration.application.port
    );
    let listener = TcpListener::bind(&address)?;
    tracing::info!("Server listening on: {}", address);

    let server = run(listener, store, configuration.jwt.clone())?;

    // actix drains in-flight requests on shutdown, and every mutation
    // awaits its durable write before its handler completes, so no
    // replace-all can be lost to the exit path.
    server.await
}
