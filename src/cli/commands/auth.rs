use anyhow::{bail, Context};
use clap::Subcommand;
use reqwest::StatusCode;
use serde_json::Value;

use crate::auth::AccessToken;
use crate::cli::OutputFormat;

const DEFAULT_SERVER: &str = "http://127.0.0.1:8000";

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Log in and print a bearer token")]
    Login {
        #[arg(long, default_value = DEFAULT_SERVER, help = "Server base URL")]
        server: String,
        #[arg(help = "Username")]
        username: String,
        #[arg(help = "Password")]
        password: String,
    },

    #[command(about = "Show the user a token belongs to (GET /users/me)")]
    Whoami {
        #[arg(long, default_value = DEFAULT_SERVER, help = "Server base URL")]
        server: String,
        #[arg(long, help = "Bearer token")]
        token: String,
    },
}

fn endpoint(server: &str, path: &str) -> String {
    format!("{}{}", server.trim_end_matches('/'), path)
}

async fn error_message(response: reqwest::Response) -> String {
    let status = response.status();
    match response.json::<Value>().await {
        Ok(body) => body
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| body.to_string()),
        Err(_) => status.to_string(),
    }
}

pub async fn handle(cmd: AuthCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let client = reqwest::Client::new();

    match cmd {
        AuthCommands::Login {
            server,
            username,
            password,
        } => {
            let response = client
                .post(endpoint(&server, "/token"))
                .form(&[("username", username.as_str()), ("password", password.as_str())])
                .send()
                .await
                .with_context(|| format!("failed to reach {}", server))?;

            if response.status() != StatusCode::OK {
                let status = response.status();
                bail!("login failed ({}): {}", status, error_message(response).await);
            }

            let token: AccessToken = response.json().await.context("unexpected token response")?;
            match output_format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&token)?),
                OutputFormat::Text => println!("{}", token.access_token),
            }
            Ok(())
        }
        AuthCommands::Whoami { server, token } => {
            let response = client
                .get(endpoint(&server, "/users/me"))
                .bearer_auth(&token)
                .send()
                .await
                .with_context(|| format!("failed to reach {}", server))?;

            if !response.status().is_success() {
                let status = response.status();
                bail!("request failed ({}): {}", status, error_message(response).await);
            }

            let user: Value = response.json().await?;
            match output_format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&user)?),
                OutputFormat::Text => {
                    println!("username: {}", user["username"].as_str().unwrap_or("-"));
                    println!("email:    {}", user["email"].as_str().unwrap_or("-"));
                }
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_paths() {
        assert_eq!(endpoint("http://localhost:8000/", "/token"), "http://localhost:8000/token");
        assert_eq!(endpoint("http://localhost:8000", "/users/me"), "http://localhost:8000/users/me");
    }
}
