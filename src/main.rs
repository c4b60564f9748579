use clap::Parser;
use fundme::app::replay::{run_script, ReplayScript};
use fundme::config::{network, CliConfig, Command};
use fundme::domain::model::{format_units, parse_units};
use fundme::utils::error::{ErrorSeverity, FundMeError};
use fundme::utils::logger;
use fundme::{InMemoryTransfer, TomlConfig};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliConfig::parse();

    // 載入 TOML 配置
    let mut config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // 初始化日誌
    let verbose = args.verbose || config.verbose_logging();
    if args.json_logs || config.json_logging() {
        logger::init_json_logger(verbose);
    } else {
        logger::init_cli_logger(verbose);
    }

    tracing::info!("🚀 Starting fundme");
    tracing::debug!("CLI args: {:?}", args);

    if let Some(name) = &args.network {
        config.network.name = name.clone();
        tracing::info!("🔧 Network overridden to: {}", name);
    }

    let transfer = Arc::new(InMemoryTransfer::new());
    let service = match network::deploy(&config, transfer.clone()) {
        Ok(service) => service,
        Err(e) => exit_with(e),
    };

    let outcome = async {
        match &args.command {
            Command::Version => {
                let version = service.version().await?;
                println!("Price feed version: {}", version);
            }
            Command::Quote { amount } => {
                let wei = parse_units(amount).ok_or_else(|| FundMeError::InvalidAmount {
                    message: format!("'{}' is not a valid amount", amount),
                })?;
                let quote = service.quote(wei).await?;
                println!(
                    "{} units = {} USD at {} USD/unit (minimum {} USD): {}",
                    format_units(quote.amount),
                    format_units(quote.usd_value),
                    format_units(quote.unit_price_usd),
                    format_units(quote.minimum_usd),
                    if quote.accepted { "accepted" } else { "too small" }
                );
            }
            Command::Replay { script } => {
                tracing::info!("📁 Loading replay script from: {}", script);
                let script = ReplayScript::from_file(script)?;
                let report = run_script(&service, &script).await?;
                println!("{}", serde_json::to_string_pretty(&report)?);
                println!(
                    "Owner received: {} units",
                    format_units(transfer.received(service.owner()).await)
                );
            }
        }
        Ok::<(), FundMeError>(())
    }
    .await;

    if let Err(e) = outcome {
        exit_with(e);
    }

    Ok(())
}

fn exit_with(e: FundMeError) -> ! {
    tracing::error!(
        "❌ fundme failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    // 根據錯誤嚴重程度決定退出碼
    let exit_code = match e.severity() {
        ErrorSeverity::Low => 4,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}
