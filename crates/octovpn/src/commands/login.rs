//! Login / logout handlers.

use std::time::Duration;

use octovpn_config::Settings;
use octovpn_core::{CoreError, Credentials};

use crate::cli::{GlobalOpts, LoginArgs};
use crate::config;
use crate::error::CliError;
use crate::output;

use super::util;

pub async fn login(settings: &Settings, args: LoginArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let username = util::username(args.username)?;
    let password = util::password(args.password_stdin)?;
    let credentials = Credentials::new(username, password);
    let settle = Duration::from_secs(settings.timeout_secs.saturating_mul(2));

    let (session, _backend) = config::build_session(settings)?;
    session.start().await?;
    // A saved login may already be in flight; let it finish first.
    let outcome = async {
        session.wait_until_settled(settle).await?;
        session.login(credentials, !args.no_remember).await?;
        session.wait_until_settled(settle).await?;
        session.stores().account.get().ok_or(CoreError::ConnectionFailed {
            reason: "logged in, but the account could not be fetched".into(),
        })
    }
    .await;
    session.shutdown().await;

    let account = outcome?;
    if !global.quiet {
        let name = account.display_name();
        let who = if name.is_empty() { account.id.clone() } else { name };
        eprintln!("Logged in as {who}");
        if !args.no_remember {
            eprintln!("Credentials saved for automatic login");
        }
    }
    Ok(())
}

pub async fn logout(settings: &Settings, global: &GlobalOpts) -> Result<(), CliError> {
    let message = super::with_login(settings, |session| async move { session.logout().await }).await?;
    let out = output::render_single(
        &global.output,
        &serde_json::json!({ "message": message }),
        |_| message.clone(),
        |_| message.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
