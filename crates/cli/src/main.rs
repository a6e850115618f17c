use clap::Parser;
use tracing_subscriber::EnvFilter;

use wio_cli::cli::{self, Cli, Command, ConfigCommand, LogLevel, NodesCommand, UserCommand};
use wio_domain::ConfigStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    init_cli_tracing(args.log_level);

    let mut store = cli::load_store(args.config)?;

    match args.command {
        Command::User(UserCommand::Create { email }) => cli::user::create(&store, email).await,
        Command::User(UserCommand::Login { email }) => {
            cli::user::login(&mut store, email).await?;
            eprintln!("Config written to {}", store.path().display());
            Ok(())
        }
        Command::User(UserCommand::Configure) => {
            cli::user::configure(&mut store).await?;
            eprintln!("Config written to {}", store.path().display());
            Ok(())
        }
        Command::Nodes(NodesCommand::Create { name, board }) => {
            cli::nodes::create(&mut store, &name, board.into()).await
        }
        Command::Nodes(NodesCommand::List) => cli::nodes::list(&store).await,
        Command::Nodes(NodesCommand::Delete { serial }) => {
            cli::nodes::delete(&store, &serial).await
        }
        Command::Nodes(NodesCommand::Register(register)) => {
            cli::nodes::register(&mut store, register).await
        }
        Command::Config(ConfigCommand::Show) => cli::config::show(store.config()),
        Command::Config(ConfigCommand::Validate) => {
            if !cli::config::validate(store.config(), store.path()) {
                std::process::exit(1);
            }
            Ok(())
        }
    }
}

/// Initialize compact stderr-only tracing.
///
/// `RUST_LOG` wins when set; otherwise `--log-level` (default `warn`) so
/// diagnostic output does not pollute stdout.
fn init_cli_tracing(level: LogLevel) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(level.as_directive())),
        )
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
