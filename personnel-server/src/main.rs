use personnel_server::{Config, Server, ServerState, init_logger_with_file, print_banner};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load environment and print banner
    dotenv::dotenv().ok();
    print_banner();

    // 2. Load configuration
    let config = Config::from_env();

    // 3. Initialize logging (console + daily rolling file)
    init_logger_with_file(Some(&config.log_level), config.log_dir.as_deref());
    tracing::info!("Starting personnel server ({})...", config.environment);

    // 4. Initialize server state (store, repositories, bootstrap admin)
    let state = ServerState::initialize(&config).await;

    // 5. Run the HTTP server until shutdown
    let server = Server::with_state(config, state);
    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
