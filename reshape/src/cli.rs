//! # CLI
//!
//! This module defines the command-line interface of `reshape` using `clap`.
//!
//! It is responsible for parsing user input and performing validation (e.g., ensuring headers are `key:value`).
use clap::{Args, Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::SystemTime;
use user_service::pb::{Hobby, Pet, User, user::Contact};

#[derive(Parser)]
#[command(name = "reshape", version, about = "Shout at protobuf values through reflection")]
pub struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the in-memory user registry
    Serve {
        /// Address to listen on (defaults to the configured one)
        #[arg(long)]
        addr: Option<SocketAddr>,
    },

    /// Register a user through the generated client stub
    AddUser {
        /// The server URL to connect to (e.g. http://127.0.0.1:50051)
        #[arg(long)]
        url: Option<String>,

        #[command(flatten)]
        user: UserArgs,
    },

    /// Fetch a user by name through the generated client stub
    GetUser {
        /// The server URL to connect to (e.g. http://127.0.0.1:50051)
        #[arg(long)]
        url: Option<String>,

        /// Name the user was registered with
        name: String,

        /// Upper-case every string of the returned user
        #[arg(long)]
        shout: bool,
    },

    /// Perform a unary gRPC call with a JSON body
    ///
    /// Messages are resolved against the registry schema compiled into this binary.
    ///
    /// ## Examples:
    ///
    /// ```bash
    /// reshape call users.UserRegistry/GetUser --body '{"name": "Tarzan"}' --shout
    /// ```
    Call {
        /// The server URL to connect to (e.g. http://127.0.0.1:50051)
        #[arg(long)]
        url: Option<String>,

        /// Endpoint (package.Service/Method)
        #[arg(value_parser = parse_endpoint)]
        endpoint: (String, String),

        /// JSON body of the request
        #[arg(long, value_parser = parse_body)]
        body: serde_json::Value,

        #[arg(short = 'H', long = "header", value_parser = parse_header)]
        headers: Vec<(String, String)>,

        /// Upper-case every string of the response
        #[arg(long)]
        shout: bool,
    },

    /// Print the shape the transformer sees for a message
    Describe {
        /// Fully qualified message name (e.g. users.User)
        #[arg(default_value = user_service::USER_MESSAGE)]
        symbol: String,
    },

    /// Walk through the generated types, serializers and the transformer offline
    Demo,
}

#[derive(Args, Debug, Clone)]
pub struct UserArgs {
    #[arg(long)]
    pub name: String,

    /// Something the user likes to say
    #[arg(long)]
    pub quote: Option<String>,

    #[arg(long, default_value_t = 0.0)]
    pub height: f64,

    /// A pet, given as NAME=PICTURE (repeatable)
    #[arg(long = "pet", value_parser = parse_pet)]
    pub pets: Vec<(String, String)>,

    /// One of climbing, swimming, yodeling
    #[arg(long, value_parser = parse_hobby)]
    pub hobby: Option<Hobby>,

    #[arg(long)]
    pub email: Option<String>,

    #[arg(long)]
    pub age: Option<u32>,
}

impl UserArgs {
    /// Builds the message sent to `AddUser`, stamped with the current time.
    pub fn into_user(self) -> User {
        User {
            name: self.name,
            quote: self.quote,
            height_in_meters: self.height,
            pets: self
                .pets
                .into_iter()
                .map(|(name, picture)| Pet {
                    name,
                    picture,
                    age_in_years: None,
                })
                .collect(),
            favorite_hobby: self.hobby.unwrap_or(Hobby::Unspecified) as i32,
            contact: self.email.map(Contact::Email),
            created_at: Some(SystemTime::now().into()),
            age: self.age.unwrap_or_default(),
            ..Default::default()
        }
    }
}

fn parse_endpoint(value: &str) -> Result<(String, String), String> {
    let (service, method) = value.split_once('/').ok_or_else(|| {
        format!("Invalid endpoint format: '{value}'. Expected 'package.Service/Method'",)
    })?;

    if service.trim().is_empty() || method.trim().is_empty() {
        return Err("Service and Method names cannot be empty".to_string());
    }

    Ok((service.to_string(), method.to_string()))
}

fn parse_header(s: &str) -> Result<(String, String), String> {
    s.split_once(':')
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .ok_or_else(|| "Format must be 'key:value'".to_string())
}

fn parse_body(value: &str) -> Result<serde_json::Value, String> {
    serde_json::from_str(value).map_err(|e| format!("Invalid JSON: {e}"))
}

fn parse_pet(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((name, picture)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), picture.trim().to_string()))
        }
        _ => Err("Format must be 'NAME=PICTURE'".to_string()),
    }
}

fn parse_hobby(s: &str) -> Result<Hobby, String> {
    let name = format!("HOBBY_{}", s.trim().to_uppercase());
    Hobby::from_str_name(&name).ok_or_else(|| format!("Unknown hobby '{s}'"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_endpoint() {
        assert_eq!(
            parse_endpoint("users.UserRegistry/GetUser").unwrap(),
            ("users.UserRegistry".to_string(), "GetUser".to_string())
        );
        assert!(parse_endpoint("users.UserRegistry").is_err());
        assert!(parse_endpoint("/GetUser").is_err());
    }

    #[test]
    fn test_parse_pet_and_hobby() {
        assert_eq!(
            parse_pet("Cheeta=🐒").unwrap(),
            ("Cheeta".to_string(), "🐒".to_string())
        );
        assert!(parse_pet("=🐒").is_err());
        assert!(parse_pet("Cheeta").is_err());

        assert_eq!(parse_hobby("yodeling").unwrap(), Hobby::Yodeling);
        assert!(parse_hobby("napping").is_err());
    }

    #[test]
    fn test_add_user_arguments_build_a_user() {
        let cli = Cli::try_parse_from([
            "reshape",
            "add-user",
            "--name",
            "Tarzan",
            "--quote",
            "aAaA",
            "--height",
            "1.91",
            "--pet",
            "Cheeta=🐒",
            "--hobby",
            "yodeling",
            "--email",
            "tarzan@jungle.org",
        ])
        .unwrap();

        let Commands::AddUser { url, user } = cli.command else {
            panic!("expected add-user");
        };
        let user = user.into_user();

        assert!(url.is_none());
        assert_eq!(user.name, "Tarzan");
        assert_eq!(user.quote.as_deref(), Some("aAaA"));
        assert_eq!(user.height_in_meters, 1.91);
        assert_eq!(user.pets.len(), 1);
        assert_eq!(user.pets[0].picture, "🐒");
        assert_eq!(user.favorite_hobby(), Hobby::Yodeling);
        assert_eq!(
            user.contact,
            Some(Contact::Email("tarzan@jungle.org".to_string()))
        );
        assert!(user.created_at.is_some());
    }
}
