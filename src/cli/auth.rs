//! Authentication CLI command handlers

use std::process::Command;

use crate::cli::commands::AuthCommand;
use crate::core::config::Config;
use crate::error::Result;
use crate::github::device_auth::{
    AccessToken, DeviceAuthConfig, DeviceAuthorization, DeviceFlowAuth,
};

/// Handle authentication commands
pub async fn handle_auth(command: AuthCommand) -> Result<()> {
    match command {
        AuthCommand::Login { client_id } => handle_login(client_id).await,
    }
}

/// Run the device flow once and report the granted scope
async fn handle_login(client_id: Option<String>) -> Result<()> {
    let config = Config::load()?;
    let token = authorize_device(resolve_client_id(client_id, &config)).await?;

    println!();
    println!("✓ Successfully authenticated with GitHub!");
    println!("  Token type: {}", token.token_type());
    println!("  Granted scope: {}", token.scope());
    println!();
    println!("  The token was not stored; release runs authenticate on their own.");
    Ok(())
}

/// Pick the effective client id: flag, then config file, then built-in
pub(crate) fn resolve_client_id(flag: Option<String>, config: &Config) -> DeviceAuthConfig {
    match flag.or_else(|| config.client_id.clone()) {
        Some(client_id) => DeviceAuthConfig::with_client_id(client_id),
        None => DeviceAuthConfig::default(),
    }
}

/// Run the full device flow: request codes, surface them, poll for a token
pub(crate) async fn authorize_device(config: DeviceAuthConfig) -> Result<AccessToken> {
    let auth = DeviceFlowAuth::new(config)?;
    let codes = auth.request_device_code().await?;
    announce_device_codes(&codes);
    auth.poll_for_token(&codes).await
}

/// Show the user code and verification URL, opening a browser when possible
pub(crate) fn announce_device_codes(codes: &DeviceAuthorization) {
    println!();
    println!("┌──────────────────────────────┐");
    println!("│  One-time code: {:<12} │", codes.user_code);
    println!("└──────────────────────────────┘");
    println!();
    println!("Enter the code at:");
    println!("  {}", codes.verification_uri);
    println!();

    if open_browser(&codes.verification_uri) {
        println!("✓ Browser opened automatically.");
    } else {
        println!("Please open the URL manually in a browser window.");
    }

    println!();
    println!("Waiting for authorization...");
}

/// Try to open a URL in the default browser
///
/// Never fatal; a failure just leaves the printed instructions in place.
#[allow(unused_variables)]
fn open_browser(url: &str) -> bool {
    #[cfg(target_os = "macos")]
    {
        Command::new("open").arg(url).spawn().is_ok()
    }
    #[cfg(target_os = "linux")]
    {
        Command::new("xdg-open").arg(url).spawn().is_ok()
    }
    #[cfg(target_os = "windows")]
    {
        Command::new("cmd").args(["/C", "start", url]).spawn().is_ok()
    }
    #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
    {
        false
    }
}
