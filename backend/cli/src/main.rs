mod bot;
mod terminal_output;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::io::BufReader;
use tokio::sync::Notify;
use tracing::info;

use chatgate_commands::{builtin_handlers, CommandCatalog, Dispatcher, Registry};
use chatgate_config::{config_file_path, load_and_prepare, ChatGateConfig};

use bot::{Bot, StdoutSink};
use terminal_output::{note_error, render_table};

#[derive(Parser)]
#[command(name = "chatgate")]
#[command(about = "ChatGate: chat-bot command dispatcher")]
#[command(version)]
#[command(disable_help_subcommand = true)]
struct Cli {
    /// Config file (defaults to $CHATGATE_CONFIG or ./chatgate.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read `<user>: <message>` lines from stdin and dispatch commands
    Run,
    /// Show the help text of one command
    Help {
        /// Command name, without the prefix
        name: String,
    },
    /// List registered commands
    List,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            note_error(&format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let path = config_file_path(cli.config.as_deref());
    let config = load_and_prepare(&path)
        .await
        .with_context(|| format!("Cannot load config from {}", path.display()))?;

    match cli.command {
        Commands::Run => {
            chatgate_logging::init_logger(&config.log_dir, &config.log_level);
            serve(config).await
        }
        Commands::Help { name } => {
            chatgate_logging::init_console_logger(&config.log_level);
            let (registry, _) = load_registry(&config).await?;
            println!("{}", registry.help_for(&name));
            Ok(())
        }
        Commands::List => {
            chatgate_logging::init_console_logger(&config.log_level);
            let (registry, _) = load_registry(&config).await?;
            print!("{}", list_commands(&registry, &config.prefix));
            Ok(())
        }
    }
}

/// Build the registry from the command catalog. Any failure aborts startup.
async fn load_registry(config: &ChatGateConfig) -> Result<(Registry, Arc<Notify>)> {
    let shutdown = Arc::new(Notify::new());
    let handlers = builtin_handlers(shutdown.clone());
    let registry = CommandCatalog::load_registry(&config.commands_dir, &handlers)
        .await
        .context("Cannot load bot commands")?;
    Ok((registry, shutdown))
}

async fn serve(config: ChatGateConfig) -> Result<()> {
    info!(prefix = %config.prefix, bot_id = %config.bot_id, "Starting ChatGate");

    let (registry, shutdown) = load_registry(&config).await?;
    let dispatcher = Dispatcher::new(Arc::new(registry), config.prefix.clone());
    let bot = Arc::new(Bot::new(
        Arc::new(dispatcher),
        Arc::new(config),
        Arc::new(StdoutSink::new()),
    ));

    info!("Bot ready");
    bot.run(BufReader::new(tokio::io::stdin()), shutdown).await?;
    info!("Bot stopped");
    Ok(())
}

fn list_commands(registry: &Registry, prefix: &str) -> String {
    let rows: Vec<Vec<String>> = registry
        .all()
        .into_iter()
        .map(|cmd| {
            let args: Vec<String> = cmd
                .args
                .iter()
                .map(|(flag, spec)| {
                    let types: Vec<String> = spec.types.iter().map(ToString::to_string).collect();
                    let arg = format!("-{flag} <{}>", types.join("|"));
                    if spec.optional { format!("[{arg}]") } else { arg }
                })
                .collect();
            vec![
                format!("{prefix}{}", cmd.name),
                cmd.permission.to_string(),
                args.join(" "),
            ]
        })
        .collect();
    render_table(&["command", "permission", "args"], &rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatgate_commands::{ArgSpec, ArgType, CommandDescriptor, PingHandler};
    use chatgate_core::PermissionLevel;
    use terminal_output::strip_ansi;

    #[test]
    fn lists_commands_with_arg_synopsis() {
        let registry = Registry::from_descriptors([
            CommandDescriptor::new("ping", Arc::new(PingHandler)),
            CommandDescriptor::new("ban", Arc::new(PingHandler))
                .permission(PermissionLevel::Moderator)
                .arg("user", ArgSpec::required([ArgType::STR]))
                .arg("days", ArgSpec::optional([ArgType::INT, ArgType::FLOAT])),
        ])
        .unwrap();
        let out = strip_ansi(&list_commands(&registry, ">>"));
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines[0], "command  permission  args");
        assert_eq!(lines[2], ">>ban    moderator   -user <str> [-days <int|float>]");
        assert_eq!(lines[3], ">>ping   user");
    }

    #[test]
    fn cli_parses_subcommands() {
        let cli = Cli::try_parse_from(["chatgate", "--config", "bot.yaml", "help", "ban"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("bot.yaml")));
        assert!(matches!(cli.command, Commands::Help { ref name } if name == "ban"));
    }
}
