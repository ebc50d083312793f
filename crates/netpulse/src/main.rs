mod cli;
mod error;
mod http;
mod server;
mod ws;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command, ConfigAction, LogFormat, ServeArgs};
use crate::error::ServerError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.log_format);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8, format: LogFormat) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match format {
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
    }
}

async fn run(cli: Cli) -> Result<(), ServerError> {
    let mut config = netpulse_config::load_config(cli.config.as_deref())?;

    match cli.command.unwrap_or_else(|| Command::Serve(ServeArgs::default())) {
        Command::Serve(args) => {
            args.apply(&mut config);
            config.validate()?;
            server::serve(&config).await
        }
        Command::Config(args) => {
            match args.action {
                ConfigAction::Show => print!("{}", config.to_toml()?),
                ConfigAction::Path => println!("{}", netpulse_config::config_path().display()),
            }
            Ok(())
        }
    }
}
