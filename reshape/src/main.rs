//! # Reshape CLI Entry Point
//!
//! The main executable for the reshape tool. This file drives the application lifecycle:
//!
//! 1. **Initialization**: Parses command-line arguments using [`cli::Cli`], loads the
//!    [`config::Config`] and installs the `tracing` subscriber.
//! 2. **Execution**: Serves the user registry, calls it through the generated stub or the
//!    dynamic JSON client, or runs the offline demo.
//! 3. **Presentation**: Formats and prints the resulting data or error status to standard output/error.

mod cli;
mod config;
mod demo;
mod formatter;
mod server;

use clap::Parser;
use cli::{Cli, Commands, UserArgs};
use colored::*;
use config::{Config, LogConfig};
use formatter::{Described, FormattedString, GenericError, UserView};
use reshape_core::client::{DynamicClient, DynamicRequest, connect_channel};
use reshape_core::reflect;
use std::process;
use std::time::Duration;
use tonic::transport::Channel;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use user_service::UserRegistryClient;
use user_service::pb::{AddUserRequest, GetUserRequest};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    let config = Config::load(args.config.as_deref())?;
    init_tracing(&config.log);

    let timeout = config.client.timeout();
    let url = |flag: Option<String>| flag.unwrap_or_else(|| config.client.url.clone());

    match args.command {
        Commands::Serve { addr } => {
            let mut server_config = config.server.clone();
            if let Some(addr) = addr {
                server_config.addr = addr;
            }
            server::serve(&server_config).await?;
        }
        Commands::AddUser { url: flag, user } => add_user(&url(flag), timeout, user).await,
        Commands::GetUser {
            url: flag,
            name,
            shout,
        } => get_user(&url(flag), timeout, name, shout).await,
        Commands::Call {
            url: flag,
            endpoint,
            body,
            headers,
            shout,
        } => {
            let (service, method) = endpoint;
            let request = DynamicRequest {
                body,
                headers,
                service,
                method,
                shout,
            };
            run_call(&url(flag), timeout, request).await;
        }
        Commands::Describe { symbol } => describe(&symbol),
        Commands::Demo => demo::run()?,
    }

    Ok(())
}

fn init_tracing(config: &LogConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.filter));

    // Logs go to stderr so that stdout only carries results.
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn connect_or_exit(url: &str, timeout: Duration) -> UserRegistryClient<Channel> {
    match connect_channel(url, timeout).await {
        Ok(channel) => UserRegistryClient::new(channel),
        Err(err) => {
            eprintln!("{}", FormattedString::from(err));
            process::exit(1);
        }
    }
}

async fn add_user(url: &str, timeout: Duration, user: UserArgs) {
    let mut client = connect_or_exit(url, timeout).await;
    let user = user.into_user();
    tracing::debug!(name = %user.name, "Sending AddUser");

    let request = AddUserRequest { user: Some(user) };

    match client.add_user(request).await {
        Ok(response) => {
            let total = response.into_inner().total_users;
            println!(
                "{}",
                FormattedString(format!("{} total_users={}", "Registered.".green().bold(), total))
            );
        }
        Err(status) => println!("{}", FormattedString::from(status)),
    }
}

async fn get_user(url: &str, timeout: Duration, name: String, shout: bool) {
    let mut client = connect_or_exit(url, timeout).await;

    let user = match client.get_user(GetUserRequest { name }).await {
        Ok(response) => response.into_inner().user,
        Err(status) => {
            println!("{}", FormattedString::from(status));
            return;
        }
    };

    let Some(user) = user else {
        eprintln!(
            "{}",
            FormattedString::from(GenericError("Empty Response", "the server sent no user"))
        );
        process::exit(1);
    };

    let user = if shout {
        match reflect::transform_typed(&user, &user_service::user_descriptor()) {
            Ok(shouted) => shouted,
            Err(err) => {
                eprintln!("{}", FormattedString::from(err));
                process::exit(1);
            }
        }
    } else {
        user
    };

    println!("{}", FormattedString::from(UserView(user)));
}

async fn run_call(url: &str, timeout: Duration, request: DynamicRequest) {
    let pool = user_service::descriptor_pool().clone();

    let mut client = match DynamicClient::connect(url, pool, timeout).await {
        Ok(client) => client,
        Err(err) => {
            eprintln!("{}", FormattedString::from(err));
            process::exit(1);
        }
    };

    match client.dynamic(request).await {
        Ok(Ok(value)) => println!("{}", FormattedString::from(value)),
        Ok(Err(status)) => println!("{}", FormattedString::from(status)),
        Err(err) => {
            eprintln!("{}", FormattedString::from(err));
            process::exit(1);
        }
    }
}

fn describe(symbol: &str) {
    let Some(message) = user_service::descriptor_pool().get_message_by_name(symbol) else {
        eprintln!(
            "{}",
            FormattedString::from(GenericError(
                "Symbol Lookup Failed",
                format!("Message '{symbol}' not found")
            ))
        );
        process::exit(1);
    };

    match reflect::describe_message(&message) {
        Ok(descriptor) => println!(
            "{}",
            FormattedString::from(Described(message.full_name().to_string(), descriptor))
        ),
        Err(err) => {
            eprintln!("{}", FormattedString::from(err));
            process::exit(1);
        }
    }
}
