//! # Account Subcommands
//!
//! - `login` — log in as admin or faculty. The id decides which.
//! - `logout` — drop the stored session.
//! - `whoami` — show the logged-in user and when the session expires.
//! - `forgot-password` — ask the backend to reset a password.

use std::io::BufRead;

use anyhow::{Context, Result};
use clap::Args;

use kithab_core::{Account, Role};
use kithab_session::SessionState;

use crate::context::AppContext;

/// Arguments for `kithab login`.
#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Admin id or faculty employee id.
    #[arg(long)]
    pub id: String,

    /// Password. Read from the first line of stdin when omitted.
    #[arg(long)]
    pub password: Option<String>,
}

/// Arguments for `kithab forgot-password`.
#[derive(Args, Debug)]
pub struct ForgotPasswordArgs {
    /// Account role.
    #[arg(long)]
    pub role: Role,

    /// Admin id or employee id.
    #[arg(long)]
    pub id: String,
}

/// Log in and persist the session.
pub async fn run_login(args: &LoginArgs, ctx: &AppContext) -> Result<u8> {
    if ctx.session().is_authenticated() {
        // A new login replaces whatever was stored.
        ctx.session().logout();
    }
    let password = match &args.password {
        Some(p) => p.clone(),
        None => read_password_line()?,
    };
    let account = ctx
        .session()
        .login(ctx.client(), &args.id, &password)
        .await?;
    if ctx.json() {
        ctx.print_json(&account)?;
    } else {
        let name = display_name(&account, &args.id);
        println!("OK: logged in as {name} ({})", account.role);
    }
    Ok(0)
}

/// End the session.
pub fn run_logout(ctx: &AppContext) -> Result<u8> {
    if !ctx.session().is_authenticated() {
        println!("Not logged in.");
        return Ok(0);
    }
    ctx.session().logout();
    println!("OK: logged out");
    Ok(0)
}

/// Show the current user.
pub fn run_whoami(ctx: &AppContext) -> Result<u8> {
    let SessionState::Authenticated(active) = ctx.session().state() else {
        println!("Not logged in.");
        return Ok(1);
    };
    if ctx.json() {
        return ctx.print_json(&active.account).map(|()| 0);
    }
    let account = &active.account;
    println!("User: {}", display_name(account, "-"));
    println!("  Role: {}", account.role);
    if let Some(email) = &account.email {
        println!("  Email: {email}");
    }
    if let Some(employee_id) = &account.employee_id {
        println!("  Employee ID: {employee_id}");
    }
    if let Some(designation) = &account.designation {
        println!("  Designation: {designation}");
    }
    println!("  Session expires: {}", active.expires_at.to_rfc3339());
    Ok(0)
}

/// Request a password reset.
pub async fn run_forgot_password(args: &ForgotPasswordArgs, ctx: &AppContext) -> Result<u8> {
    let message = ctx.client().auth().forgot_password(args.role, &args.id).await?;
    println!("{message}");
    Ok(0)
}

/// The account's name, or `fallback` when the backend sent none.
fn display_name<'a>(account: &'a Account, fallback: &'a str) -> &'a str {
    if account.name.is_empty() {
        fallback
    } else {
        &account.name
    }
}

fn read_password_line() -> Result<String> {
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("failed to read password from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(name: &str) -> Account {
        Account {
            id: None,
            name: name.into(),
            role: Role::Faculty,
            email: None,
            employee_id: Some("E100".into()),
            designation: None,
        }
    }

    #[test]
    fn display_name_prefers_backend_name() {
        assert_eq!(display_name(&account("Dr. Rao"), "E100"), "Dr. Rao");
    }

    #[test]
    fn display_name_falls_back_when_name_missing() {
        assert_eq!(display_name(&account(""), "E100"), "E100");
    }
}
