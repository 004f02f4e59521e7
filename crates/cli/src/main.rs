use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use salon_agents::{DispatchOutcome, SalonResponder};
use salon_core::{Catalog, Platform};
use salon_observability::{init_tracing, AppMetrics};
use serde_json::{json, Value};

#[derive(Debug, Parser)]
#[command(name = "salonbot")]
#[command(about = "SalonBot keyword responder CLI")]
struct Cli {
    #[arg(long, env = "SALON_CATALOG_PATH", default_value = "catalog/salon_catalog.json")]
    catalog: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Talk to the bot through the web adapter.
    Chat {
        #[arg(long, default_value = "cli_user")]
        user_id: String,
    },
    /// Print the intent a text resolves to.
    Classify { text: String },
    /// Run a raw webhook payload through the dispatcher.
    Handle {
        #[arg(long)]
        platform: String,
        payload: PathBuf,
    },
    /// Load and validate the catalog, then print a summary of it.
    CheckCatalog,
    /// Print the classification rules in priority order.
    Rules,
}

fn main() -> Result<()> {
    init_tracing("salon_cli");
    let cli = Cli::parse();

    let responder = build_responder(&cli.catalog)?;

    match cli.command {
        Command::Chat { user_id } => run_chat(&responder, &user_id)?,
        Command::Classify { text } => {
            let intent = responder.classifier().classify(&text);
            println!("{}", intent.unwrap_or("fallback"));
        }
        Command::Handle { platform, payload } => {
            let Some(platform) = Platform::parse(&platform) else {
                bail!("unknown platform `{platform}` (expected whatsapp, instagram or web)");
            };
            let raw = fs::read_to_string(&payload)
                .with_context(|| format!("failed reading {}", payload.display()))?;
            let payload: Value = serde_json::from_str(&raw).context("payload is not JSON")?;

            match responder.handle(platform, &payload)? {
                DispatchOutcome::Reply(reply) => {
                    println!("{}", serde_json::to_string_pretty(&reply)?)
                }
                DispatchOutcome::NoOp => println!("no-op"),
            }
        }
        Command::CheckCatalog => {
            let catalog = responder.catalog();
            let summary = json!({
                "bot_name": catalog.bot_name(),
                "intents": catalog.intent_keys().collect::<Vec<_>>(),
                "rules": responder.classifier().rules().len(),
                "fallback_responses": catalog.fallback_responses().len(),
                "main_menu": catalog.main_menu_quick_replies(),
            });
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Command::Rules => {
            for (idx, rule) in responder.classifier().rules().iter().enumerate() {
                println!("{:>2}. {:<16} {}", idx + 1, rule.intent, rule.keywords.join(", "));
            }
        }
    }

    Ok(())
}

fn run_chat(responder: &SalonResponder, user_id: &str) -> Result<()> {
    println!("SalonBot chat mode. type 'exit' to quit.\n");
    print_reply(&serde_json::to_value(responder.greeting())?);

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if io::stdin().read_line(&mut line)? == 0 {
            break;
        }

        let message = line.trim();
        if message.eq_ignore_ascii_case("exit") || message.eq_ignore_ascii_case("quit") {
            break;
        }

        if message.is_empty() {
            continue;
        }

        let payload = json!({ "user_id": user_id, "message": message });
        match responder.handle(Platform::Web, &payload)? {
            DispatchOutcome::Reply(reply) => print_reply(&reply),
            DispatchOutcome::NoOp => println!("(no reply)\n"),
        }
    }

    Ok(())
}

fn print_reply(reply: &Value) {
    println!("\n{}\n", reply["text"].as_str().unwrap_or_default());

    let quick_replies = reply["quick_replies"]
        .as_array()
        .map(|items| items.iter().filter_map(Value::as_str).collect::<Vec<_>>())
        .unwrap_or_default();
    if !quick_replies.is_empty() {
        println!("Quick replies: {}\n", quick_replies.join(" | "));
    }
}

fn build_responder(catalog_path: &Path) -> Result<SalonResponder> {
    let catalog = Catalog::load(catalog_path)
        .with_context(|| format!("failed loading catalog from {}", catalog_path.display()))?;

    SalonResponder::new(Arc::new(catalog), AppMetrics::shared())
        .context("catalog does not cover the classification rules")
}
