use clap::Parser;
use hotelflow::args::{
    Args, Command, ProfileSubcommand, ProjectSubcommand, ThemeSubcommand, TransactionSubcommand,
    UserSubcommand,
};
use hotelflow::{commands, Config, Result};
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e}");
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().hotelflow_home().path();

    // Route to appropriate command handler
    let _: () = match args.command() {
        Command::Init => commands::init(home).await?.print(),

        Command::Login(login_args) => {
            let config = Config::load(home).await?;
            commands::login(config, login_args.username(), login_args.password())
                .await?
                .print()
        }

        Command::Logout => commands::logout(Config::load(home).await?).await?.print(),

        Command::Whoami => commands::whoami(Config::load(home).await?).await?.print(),

        Command::Theme(theme_args) => {
            let config = Config::load(home).await?;
            match theme_args.action() {
                ThemeSubcommand::Get => commands::get_theme(config).await?.print(),
                ThemeSubcommand::Set { theme } => {
                    commands::set_theme(config, *theme).await?.print()
                }
            }
        }

        Command::Project(project_args) => {
            let config = Config::load(home).await?;
            match project_args.action() {
                ProjectSubcommand::List => commands::list_projects(config).await?.print(),
                ProjectSubcommand::Add(args) => {
                    commands::add_project(config, args.clone()).await?.print()
                }
                ProjectSubcommand::Update(args) => commands::update_project(config, args.clone())
                    .await?
                    .print(),
                ProjectSubcommand::Delete(args) => {
                    commands::delete_project(config, args.id()).await?.print()
                }
            }
        }

        Command::Transaction(transaction_args) => {
            let config = Config::load(home).await?;
            match transaction_args.action() {
                TransactionSubcommand::List(args) => {
                    commands::list_transactions(config, args.clone())
                        .await?
                        .print()
                }
                TransactionSubcommand::Add(args) => {
                    commands::add_transaction(config, args.clone())
                        .await?
                        .print()
                }
                TransactionSubcommand::Update(args) => {
                    commands::update_transaction(config, args.clone())
                        .await?
                        .print()
                }
                TransactionSubcommand::Delete(args) => {
                    commands::delete_transaction(config, args.id())
                        .await?
                        .print()
                }
            }
        }

        Command::User(user_args) => {
            let config = Config::load(home).await?;
            match user_args.action() {
                UserSubcommand::List => commands::list_users(config).await?.print(),
                UserSubcommand::Add(args) => commands::add_user(config, args.clone()).await?.print(),
                UserSubcommand::Update(args) => {
                    commands::update_user(config, args.clone()).await?.print()
                }
                UserSubcommand::Delete(args) => {
                    commands::delete_user(config, args.id()).await?.print()
                }
            }
        }

        Command::Profile(profile_args) => {
            let config = Config::load(home).await?;
            match profile_args.action() {
                ProfileSubcommand::Update(args) => {
                    commands::update_profile(config, args.clone())
                        .await?
                        .print()
                }
                ProfileSubcommand::Password(args) => {
                    commands::change_password(config, args.clone())
                        .await?
                        .print()
                }
            }
        }

        Command::Export(export_args) => {
            let config = Config::load(home).await?;
            commands::export(config, export_args.clone()).await?.print()
        }

        Command::Dashboard => commands::dashboard(Config::load(home).await?)
            .await?
            .print(),
    };
    Ok(())
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use default log level for this crate only.
            EnvFilter::new(format!(
                "{}={},{}={}",
                env!("CARGO_CRATE_NAME"),
                level,
                env!("CARGO_BIN_NAME"),
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
