use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{Level, debug};
use tracing_subscriber::{EnvFilter, fmt};

use nexmo_sms::config::default_data_dir;
use nexmo_sms::{App, Outcome, SendForm, Settings, Store};

/// Send SMS through Nexmo and keep a small contact book
#[derive(Parser, Debug)]
#[command(name = "nexmo-sms")]
#[command(version)]
struct Cli {
    /// Set log level (error, warn, info, debug, trace)
    #[arg(short, long, value_name = "LEVEL", default_value = "warn", global = true)]
    log_level: String,

    /// Enable JSON structured logging
    #[arg(long, global = true)]
    json_logs: bool,

    /// Directory holding credentials.db and contacts.db
    #[arg(long, value_name = "DIR", global = true)]
    data_dir: Option<PathBuf>,

    /// Gateway endpoint URL
    #[arg(long, value_name = "URL", global = true)]
    endpoint: Option<String>,

    /// Gateway timeout in seconds; 0 waits forever
    #[arg(long, value_name = "SECS", global = true)]
    timeout_secs: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Save the Nexmo API key and secret
    Configure {
        #[arg(long)]
        key: String,

        #[arg(long)]
        secret: String,
    },

    /// Delete the saved key and secret
    ClearCredentials,

    /// Send one SMS
    Send {
        /// Sender; defaults to this machine's hostname
        #[arg(long)]
        from: Option<String>,

        /// Recipient phone number
        #[arg(long, conflicts_with = "contact")]
        to: Option<String>,

        /// Recipient taken from the contact book
        #[arg(long)]
        contact: Option<String>,

        /// Message text
        #[arg(long)]
        text: String,
    },

    /// Manage the contact book
    #[command(subcommand)]
    Contacts(ContactsCommand),
}

#[derive(Subcommand, Debug)]
enum ContactsCommand {
    /// List contacts in name order
    List,

    /// Print the number stored for a contact
    Show { name: String },

    /// Rename and/or renumber a contact
    Edit {
        old_name: String,

        #[arg(long)]
        name: String,

        #[arg(long)]
        number: String,
    },

    /// Delete a contact
    Delete { name: String },
}

fn init_logging(cli: &Cli) -> Result<()> {
    let log_level = cli.log_level.parse::<Level>().with_context(|| {
        format!(
            "Invalid log level '{}'. Valid levels: error, warn, info, debug, trace",
            cli.log_level
        )
    })?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level.as_str()))
        .context("Failed to create log filter")?;

    let subscriber = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    if cli.json_logs {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    debug!(level = %log_level, json = cli.json_logs, "logging initialized");
    Ok(())
}

fn settings(cli: &Cli) -> Result<Settings> {
    let data_dir = match &cli.data_dir {
        Some(data_dir) => data_dir.clone(),
        None => default_data_dir()?,
    };
    let mut settings = Settings::new(data_dir);
    if let Some(endpoint) = &cli.endpoint {
        settings.endpoint = endpoint.clone();
    }
    match cli.timeout_secs {
        Some(0) => settings.timeout = None,
        Some(secs) => settings.timeout = Some(Duration::from_secs(secs)),
        None => {}
    }
    Ok(settings)
}

fn report(outcome: &Outcome) -> ExitCode {
    if outcome.is_success() {
        println!("{}", outcome.message());
        ExitCode::SUCCESS
    } else {
        eprintln!("{}: {}", outcome.title(), outcome.message());
        ExitCode::FAILURE
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let settings = settings(&cli)?;
    let client = settings
        .client()
        .context("Failed to set up the gateway client")?;
    let mut app = App::new(Store::new(&settings.data_dir), client);

    let code = match cli.command {
        Command::Configure { key, secret } => report(&app.save_credentials(&key, &secret)),
        Command::ClearCredentials => report(&app.clear_credentials()),
        Command::Send {
            from,
            to,
            contact,
            text,
        } => {
            let to = match contact {
                Some(name) => match app.select_contact(&name) {
                    Some(number) => number.to_owned(),
                    None => {
                        eprintln!("Error: No contact named '{name}'");
                        return Ok(ExitCode::FAILURE);
                    }
                },
                None => to.unwrap_or_default(),
            };
            let from = from.unwrap_or_else(|| settings.default_sender.clone());
            report(&app.submit_send(&SendForm::new(from, to, text)).await)
        }
        Command::Contacts(ContactsCommand::List) => {
            for (name, number) in app.contacts().iter() {
                println!("{name}\t{number}");
            }
            ExitCode::SUCCESS
        }
        Command::Contacts(ContactsCommand::Show { name }) => match app.select_contact(&name) {
            Some(number) => {
                println!("{number}");
                ExitCode::SUCCESS
            }
            None => {
                eprintln!("Error: No contact named '{name}'");
                ExitCode::FAILURE
            }
        },
        Command::Contacts(ContactsCommand::Edit {
            old_name,
            name,
            number,
        }) => report(&app.edit_contact(&old_name, &name, &number)),
        Command::Contacts(ContactsCommand::Delete { name }) => report(&app.delete_contact(&name)),
    };
    Ok(code)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(err) = init_logging(&cli) {
        eprintln!("{err:#}");
        return ExitCode::FAILURE;
    }

    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
