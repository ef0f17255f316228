//! `mindgate serve` — Start the HTTP API server.

use mindgate_config::AppConfig;

pub async fn run(port_override: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if let Some(port) = port_override {
        config.gateway.port = port;
    }

    println!("🧠 Mindgate Gateway");
    println!("   Listening: {}:{}", config.gateway.host, config.gateway.port);
    println!("   Model:     {}", config.default_model);
    println!(
        "   Telegram:  {}",
        if config.telegram.is_configured() {
            "enabled"
        } else {
            "disabled"
        }
    );

    mindgate_gateway::start(config).await?;

    Ok(())
}
