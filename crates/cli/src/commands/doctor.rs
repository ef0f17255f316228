//! `mindgate doctor` — Diagnose backend connectivity.

use mindgate_config::AppConfig;
use mindgate_core::generate::Generator;
use mindgate_core::memory::MemoryStore;
use mindgate_inference::OllamaClient;
use mindgate_memory::ChromaStore;
use mindgate_tools::load_manifest;
use std::time::Duration;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 Mindgate Doctor — System Diagnostics");
    println!("=======================================\n");

    let mut issues = 0;

    let config = match AppConfig::load() {
        Ok(config) => {
            println!("  ✅ Config valid");
            config
        }
        Err(e) => {
            println!("  ❌ Config invalid: {e}");
            return Err(e.into());
        }
    };

    let timeout = Duration::from_secs(config.request_timeout_secs);

    match load_manifest(&config.tools_manifest) {
        Ok(registry) if registry.is_empty() => {
            println!(
                "  ⚠️  No tools loaded from {} — chat works, tool calls won't",
                config.tools_manifest.display()
            );
        }
        Ok(registry) => println!("  ✅ Tool manifest loaded ({} tools)", registry.len()),
        Err(e) => {
            println!("  ❌ Tool manifest unreadable: {e}");
            issues += 1;
        }
    }

    let ollama = OllamaClient::new(&config.ollama_host, timeout);
    match ollama.health_check().await {
        Ok(true) => println!("  ✅ Ollama reachable at {}", config.ollama_host),
        _ => {
            println!("  ❌ Ollama unreachable at {}", config.ollama_host);
            issues += 1;
        }
    }

    let chroma = ChromaStore::new(&config.chroma_host, timeout);
    match chroma.health_check().await {
        Ok(true) => println!("  ✅ ChromaDB reachable at {}", config.chroma_host),
        _ => {
            println!("  ❌ ChromaDB unreachable at {}", config.chroma_host);
            issues += 1;
        }
    }

    if config.telegram.is_configured() {
        println!("  ✅ Telegram bot token configured");
    } else {
        println!("  ⚠️  No Telegram bot token — webhook channel disabled");
    }

    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
