use anyhow::{bail, Context};
use clap::Subcommand;
use serde_json::json;

use crate::auth::hash_password;
use crate::cli::OutputFormat;
use crate::config::{DatabaseConfig, StoreBackend};
use crate::database::models::User;
use crate::database::Stores;
use crate::services::{register_user, NewUser};

#[derive(Subcommand)]
pub enum UserCommands {
    #[command(about = "Create a user with a bcrypt-hashed password")]
    Create {
        #[arg(help = "Username (unique)")]
        username: String,
        #[arg(long, help = "Email address")]
        email: String,
        #[arg(long, help = "Full name")]
        full_name: Option<String>,
        #[arg(long, help = "Plain-text password; stored hashed")]
        password: String,
        #[arg(long, default_value_t = bcrypt::DEFAULT_COST, help = "bcrypt cost")]
        cost: u32,
    },

    #[command(about = "Show a user")]
    Show {
        #[arg(help = "Username")]
        username: String,
    },

    #[command(about = "Disable a user; their tokens stop working")]
    Disable {
        #[arg(help = "Username")]
        username: String,
    },

    #[command(about = "Re-enable a disabled user")]
    Enable {
        #[arg(help = "Username")]
        username: String,
    },

    #[command(about = "Print the bcrypt hash of a password without touching the database")]
    Hash {
        #[arg(help = "Plain-text password")]
        password: String,
        #[arg(long, default_value_t = bcrypt::DEFAULT_COST, help = "bcrypt cost")]
        cost: u32,
    },
}

async fn connect() -> anyhow::Result<Stores> {
    let config = DatabaseConfig::from_env().context("invalid database configuration")?;
    if config.backend == StoreBackend::Memory {
        bail!("user commands need STORE_BACKEND=mongo; the memory store lives inside the server process");
    }
    Stores::mongo(&config).await.context("failed to connect to MongoDB")
}

fn print_user(user: &User, output_format: OutputFormat) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(user)?),
        OutputFormat::Text => {
            println!("username:  {}", user.username);
            println!("email:     {}", user.email);
            println!("full name: {}", user.full_name.as_deref().unwrap_or("-"));
            println!("disabled:  {}", user.disabled.unwrap_or(false));
        }
    }
    Ok(())
}

async fn set_disabled(username: &str, disabled: bool, output_format: OutputFormat) -> anyhow::Result<()> {
    let stores = connect().await?;
    if !stores.users.set_disabled(username, disabled).await? {
        bail!("user '{}' not found", username);
    }
    match output_format {
        OutputFormat::Json => println!("{}", json!({ "username": username, "disabled": disabled })),
        OutputFormat::Text => println!(
            "User '{}' {}",
            username,
            if disabled { "disabled" } else { "enabled" }
        ),
    }
    Ok(())
}

pub async fn handle(cmd: UserCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        UserCommands::Create {
            username,
            email,
            full_name,
            password,
            cost,
        } => {
            let stores = connect().await?;
            let new_user = NewUser {
                username,
                email,
                full_name,
                password,
            };
            let user = register_user(stores.users.as_ref(), new_user, cost).await?;
            print_user(&user, output_format)
        }
        UserCommands::Show { username } => {
            let stores = connect().await?;
            match stores.users.find_user(&username).await? {
                Some(user) => print_user(&User::from(user), output_format),
                None => bail!("user '{}' not found", username),
            }
        }
        UserCommands::Disable { username } => set_disabled(&username, true, output_format).await,
        UserCommands::Enable { username } => set_disabled(&username, false, output_format).await,
        UserCommands::Hash { password, cost } => {
            let hashed = hash_password(&password, cost)?;
            match output_format {
                OutputFormat::Json => println!("{}", json!({ "hashed_password": hashed })),
                OutputFormat::Text => println!("{}", hashed),
            }
            Ok(())
        }
    }
}
