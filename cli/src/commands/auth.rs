//! Session commands: login, register, logout, status.

use anyhow::{Context as _, Result};
use erate_client::DefaultClient;
use erate_client::v1::{RegisterRequest, UserProfile};
use inquire::{Password, Text};
use tracing::{info, instrument, warn};

use crate::cli::RegisterArgs;
use crate::output::Output;

fn prompt_email(email: Option<String>) -> Result<String> {
    match email {
        Some(email) => Ok(email),
        None => Text::new("Email:")
            .prompt()
            .context("Failed to read email"),
    }
}

fn prompt_password(password: Option<String>, confirm: bool) -> Result<String> {
    if let Some(password) = password {
        return Ok(password);
    }
    let prompt = Password::new("Password:");
    let prompt = if confirm {
        prompt.with_custom_confirmation_message("Confirm password:")
    } else {
        prompt.without_confirmation()
    };
    prompt.prompt().context("Failed to read password")
}

fn print_user(out: &Output, user: &UserProfile) {
    if let Some(name) = &user.full_name {
        out.labeled_indent("Name", name, 2);
    }
    if let Some(role) = &user.role {
        out.labeled_indent("Role", role, 2);
    }
}

#[instrument(skip_all, name = "login")]
pub async fn run_login(
    client: &DefaultClient,
    email: Option<String>,
    password: Option<String>,
) -> Result<()> {
    let out = Output::new();
    let email = prompt_email(email)?;
    let password = prompt_password(password, false)?;

    info!(email = %email, "Attempting login");
    let response = client
        .login(&email, &password)
        .await
        .context("Login failed")?;

    let shown = response
        .user
        .as_ref()
        .map_or(email.trim(), |user| user.email.as_str());
    out.success(format!("Signed in as {shown}"));
    if let Some(user) = &response.user {
        print_user(&out, user);
    }
    Ok(())
}

#[instrument(skip_all, name = "register")]
pub async fn run_register(client: &DefaultClient, args: RegisterArgs) -> Result<()> {
    let out = Output::new();
    let request = RegisterRequest {
        email: prompt_email(args.email)?.trim().to_owned(),
        password: prompt_password(args.password, true)?,
        full_name: args.full_name,
        company_name: args.company_name,
        role: args.role,
    };

    let response = client
        .register(&request)
        .await
        .context("Registration failed")?;

    out.success(format!("Account created for {}", request.email));
    if let Some(user) = &response.user {
        print_user(&out, user);
    }
    Ok(())
}

pub fn run_logout(client: &DefaultClient) -> Result<()> {
    let out = Output::new();
    if !client.has_session() {
        out.dim("Not currently signed in.");
        return Ok(());
    }
    client.logout().context("Failed to sign out")?;
    out.success("Signed out");
    Ok(())
}

#[instrument(skip_all, name = "status")]
pub async fn run_status(client: &DefaultClient) -> Result<()> {
    let out = Output::new();
    if !client.has_session() {
        out.dim("Not signed in.");
        out.dim("Use 'erate login' to sign in.");
        return Ok(());
    }

    match client.me().await {
        Ok(user) => {
            out.success(format!("Signed in as {}", user.email));
            print_user(&out, &user);
            out.labeled_indent("API", client.config().api_base_url.as_str(), 2);
            Ok(())
        }
        Err(e) if e.is_network() => {
            warn!("Could not reach the API: {e}");
            out.warning(format!("Could not verify session: {e}"));
            Ok(())
        }
        Err(e) if e.is_unauthorized() => {
            out.error("Session expired");
            out.dim("Use 'erate login' to sign in again.");
            Err(e).context("Not signed in")
        }
        Err(e) => Err(e).context("Failed to load profile"),
    }
}
