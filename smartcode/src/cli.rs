//! Command-line surface.
//!
//! Without a subcommand smartcode starts the TUI. The account subcommands run
//! once against the service and print their result to stdout.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{bail, eyre, WrapErr};
use smartcode_core::api::ApiClient;
use smartcode_core::auth::TokenStore;
use smartcode_core::types::ProfileUpdate;

#[derive(Debug, Parser)]
#[command(name = "smartcode", version, about = "Terminal client for the AI code review service")]
pub struct Cli {
    /// Base URL of the review service (overrides SMARTCODE_API_URL and the config file)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in and store the access token
    Signin {
        #[arg(long)]
        email: String,
        /// Read from stdin when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Create an account and store the access token
    Signup {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: Option<String>,
    },
    /// Forget the stored access token
    Logout,
    /// Show the profile, or update it when any option is given
    Profile {
        #[arg(long)]
        full_name: Option<String>,
        #[arg(long)]
        username: Option<String>,
        /// Image to upload as the new avatar
        #[arg(long)]
        avatar: Option<PathBuf>,
    },
}

/// Runs one account subcommand to completion.
pub async fn run(cmd: Command, client: &mut ApiClient, tokens: &TokenStore) -> color_eyre::Result<()> {
    match cmd {
        Command::Signin { email, password } => {
            let password = password_or_prompt(password)?;
            tokens
                .sign_in(client, &email, &password)
                .await
                .map_err(|e| eyre!(e.user_message("Invalid credentials")))?;
            println!("Signed in as {email}");
        }
        Command::Signup { username, email, password } => {
            let password = password_or_prompt(password)?;
            tokens
                .sign_up(client, &username, &email, &password)
                .await
                .map_err(|e| eyre!(e.user_message("Signup failed")))?;
            println!("Account {username} created and signed in");
        }
        Command::Logout => {
            tokens.logout(client).await.wrap_err("failed to remove the stored token")?;
            println!("Signed out");
        }
        Command::Profile { full_name, username, avatar } => {
            if !client.is_authenticated() {
                bail!("Not signed in. Run `smartcode signin` first.");
            }
            let mut update = ProfileUpdate { full_name, username, avatar_url: None };
            if let Some(path) = avatar {
                let url = client
                    .upload_avatar(&path)
                    .await
                    .map_err(|e| eyre!(e.user_message("Failed to upload avatar")))?;
                update.avatar_url = Some(url);
            }

            let profile = if update.is_empty() {
                client.profile().await.map_err(|e| eyre!(e.user_message("Failed to fetch profile")))?
            } else {
                client
                    .update_profile(&update)
                    .await
                    .map_err(|e| eyre!(e.user_message("Failed to update profile")))?
            };
            println!("email:     {}", profile.email);
            println!("username:  {}", profile.username);
            println!("full name: {}", profile.full_name.as_deref().unwrap_or("-"));
            println!("avatar:    {}", profile.avatar_url.as_deref().unwrap_or("-"));
        }
    }
    Ok(())
}

/// Returns the flag value, else reads one line from stdin.
fn password_or_prompt(flag: Option<String>) -> color_eyre::Result<String> {
    if let Some(password) = flag {
        return Ok(password);
    }
    eprint!("Password: ");
    std::io::stderr().flush()?;
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    let password = line.trim_end_matches(['\r', '\n']).to_owned();
    if password.is_empty() {
        bail!("A password is required");
    }
    Ok(password)
}
