//! chat-conduit CLI - talk to interchangeable AI chat providers

use anyhow::Result;
use chat_conduit::{
    api::{create_provider, ChatProvider, ChatRequest, ProviderKind, StreamEvent},
    config::{redact_key, Config},
    tui::ChatShell,
};
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "chat-conduit")]
#[command(about = "Chat with OpenAI-compatible providers and decode their streaming replies")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbosity level
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive chat session
    Chat {
        /// Provider to use (openai, openrouter); defaults to the configured one
        #[arg(short, long)]
        provider: Option<String>,

        /// Model to use; defaults to the configured/provider default
        #[arg(short, long)]
        model: Option<String>,

        /// System prompt applied to every turn
        #[arg(short, long)]
        system: Option<String>,

        /// Show reasoning tokens as they stream
        #[arg(long)]
        show_thinking: bool,
    },

    /// Send a single prompt and print the reply
    Ask {
        /// The prompt text
        prompt: String,

        /// Provider to use (openai, openrouter)
        #[arg(short, long)]
        provider: Option<String>,

        /// Model to use
        #[arg(short, long)]
        model: Option<String>,

        /// System prompt
        #[arg(short, long)]
        system: Option<String>,

        /// Wait for the full reply instead of streaming
        #[arg(long)]
        no_stream: bool,

        /// Stream reasoning tokens to stderr as they arrive
        #[arg(long)]
        show_thinking: bool,
    },

    /// List models offered by a provider
    Models {
        /// Provider to query (openai, openrouter)
        #[arg(short, long)]
        provider: Option<String>,
    },

    /// List registered providers and their defaults
    Providers,

    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Initialize configuration file with defaults
    Init {
        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },

    /// Show current configuration (keys redacted)
    Show,

    /// Set a configuration value (e.g. openai.api_key, current_provider)
    Set {
        /// Configuration key
        key: String,

        /// Value to set; empty clears the field
        value: String,
    },

    /// Show configuration file path
    Path,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Chat {
            provider,
            model,
            system,
            show_thinking,
        } => {
            run_chat(provider, model, system, show_thinking).await?;
        }
        Commands::Ask {
            prompt,
            provider,
            model,
            system,
            no_stream,
            show_thinking,
        } => {
            run_ask(prompt, provider, model, system, no_stream, show_thinking).await?;
        }
        Commands::Models { provider } => {
            run_models(provider).await?;
        }
        Commands::Providers => {
            run_providers()?;
        }
        Commands::Config(cmd) => {
            run_config_command(cmd)?;
        }
    }

    Ok(())
}

/// Resolve a provider by CLI flag or configured default
fn resolve_provider(
    config: &Config,
    name: Option<&str>,
    model: Option<String>,
) -> Result<Box<dyn ChatProvider>> {
    let kind = match name {
        Some(name) => ProviderKind::from_name(name)?,
        None => config.current_provider,
    };

    let mut provider_config = config.provider_config(kind);
    if model.is_some() {
        provider_config.model = model;
    }

    Ok(create_provider(kind, provider_config)?)
}

async fn run_chat(
    provider: Option<String>,
    model: Option<String>,
    system: Option<String>,
    show_thinking: bool,
) -> Result<()> {
    let config = Config::load()?;
    let kind = match provider.as_deref() {
        Some(name) => ProviderKind::from_name(name)?,
        None => config.current_provider,
    };

    let mut shell = ChatShell::new(config, kind, model, system, show_thinking)?;
    shell.run().await
}

async fn run_ask(
    prompt: String,
    provider: Option<String>,
    model: Option<String>,
    system: Option<String>,
    no_stream: bool,
    show_thinking: bool,
) -> Result<()> {
    let config = Config::load()?;
    let provider = resolve_provider(&config, provider.as_deref(), model)?;
    info!(
        "asking {} (model {})",
        provider.kind().display_name(),
        provider.model()
    );

    let mut request = ChatRequest::new(prompt);
    if let Some(system) = system {
        request = request.with_system(system);
    }

    if no_stream {
        let reply = provider.send(request).await?;
        println!("{}", reply);
        return Ok(());
    }

    let mut rx = provider.send_streaming(request).await?;
    let mut printed_any = false;

    while let Some(event) = rx.recv().await {
        match &event {
            StreamEvent::Content(_) => {
                use std::io::Write;
                let text = event.unescaped_text().unwrap_or_default();
                print!("{}", text);
                std::io::stdout().flush()?;
                printed_any = true;
            }
            StreamEvent::Thinking(_) => {
                // Reasoning goes to stderr so piped stdout stays clean
                if show_thinking {
                    let text = event.unescaped_text().unwrap_or_default();
                    eprint!("{}", text);
                }
            }
            StreamEvent::Done => break,
            StreamEvent::Error(msg) => {
                if printed_any {
                    println!();
                }
                anyhow::bail!("stream error: {}", msg);
            }
        }
    }

    if printed_any {
        println!();
    }

    Ok(())
}

async fn run_models(provider: Option<String>) -> Result<()> {
    let config = Config::load()?;
    let provider = resolve_provider(&config, provider.as_deref(), None)?;

    let models = provider.list_models().await?;
    if models.is_empty() {
        println!(
            "No models reported by {}.",
            provider.kind().display_name()
        );
    } else {
        for model in models {
            println!("{}", model);
        }
    }

    Ok(())
}

fn run_providers() -> Result<()> {
    let config = Config::load()?;

    for kind in ProviderKind::ALL {
        let marker = if kind == config.current_provider {
            "*"
        } else {
            " "
        };
        println!("{} {} ({})", marker, kind.display_name(), kind.name());
        println!("    default model: {}", kind.default_model());
        println!("    api base:      {}", kind.default_api_base());
        println!("    create a key:  {}", kind.create_key_url());
    }
    println!();
    println!("* = current provider (change with: chat-conduit config set current_provider <name>)");

    Ok(())
}

fn run_config_command(cmd: ConfigCommands) -> Result<()> {
    match cmd {
        ConfigCommands::Init { force } => {
            let path = Config::default_path();
            if path.exists() && !force {
                println!("Config already exists at: {}", path.display());
                println!("Use --force to overwrite.");
                return Ok(());
            }

            Config::default().save()?;
            println!("Config written to: {}", path.display());
        }
        ConfigCommands::Show => {
            let mut config = Config::load()?;

            // Mask API keys in display
            for kind in ProviderKind::ALL {
                let settings = config.settings_mut(kind);
                if let Some(key) = &settings.api_key {
                    settings.api_key = Some(redact_key(key));
                }
            }

            println!("{}", toml::to_string_pretty(&config)?);

            println!("--- Environment Variables ---");
            for var in ["OPENAI_API_KEY", "OPENROUTER_API_KEY"] {
                println!(
                    "{}: {}",
                    var,
                    if std::env::var(var).is_ok() {
                        "set"
                    } else {
                        "not set"
                    }
                );
            }
        }
        ConfigCommands::Set { key, value } => {
            // Edit the file as stored, so env-provided keys are not persisted
            let mut config = Config::load_file()?;
            config.set(&key, &value)?;
            config.save()?;

            println!(
                "Set {} = {}",
                key,
                if key.ends_with("api_key") {
                    redact_key(&value)
                } else {
                    value
                }
            );
        }
        ConfigCommands::Path => {
            let path = Config::default_path();
            println!("{}", path.display());

            if path.exists() {
                println!("(file exists)");
            } else {
                println!("(file does not exist - run 'config init' to create)");
            }
        }
    }

    Ok(())
}
