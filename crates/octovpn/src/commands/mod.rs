//! Command dispatch: bridges CLI args -> session intents -> output formatting.

pub mod account;
pub mod config_cmd;
pub mod locations;
pub mod login;
pub mod run;
pub mod tunnel;
pub mod util;

use std::future::Future;

use octovpn_config::Settings;
use octovpn_core::{CoreError, Session};

use crate::cli::{Command, GlobalOpts};
use crate::config;
use crate::error::CliError;

/// Dispatch a session-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, settings: &Settings, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Login(args) => login::login(settings, args, global).await,
        Command::Logout => login::logout(settings, global).await,
        Command::Account => account::handle(settings, global).await,
        Command::Locations(args) => locations::handle(settings, args, global).await,
        Command::TunnelConfig(args) => tunnel::handle(settings, args, global).await,
        Command::Run => run::handle(settings, global).await,
        Command::Config(args) => config_cmd::handle(settings, args, global).await,
        Command::Completions(_) => Err(CliError::Internal(
            "completions are generated before settings load".into(),
        )),
    }
}

/// Start a session, let the saved credentials log in, run `f`, shut down.
///
/// Fails with a login error instead of running `f` when the startup
/// login did not end in the logged-in state.
pub async fn with_login<F, Fut, T>(settings: &Settings, f: F) -> Result<T, CliError>
where
    F: FnOnce(Session) -> Fut,
    Fut: Future<Output = Result<T, CoreError>>,
{
    let (session, _backend) = config::build_session(settings)?;
    let result = session
        .oneshot(move |s| async move {
            ensure_logged_in(&s)?;
            f(s).await
        })
        .await?;
    Ok(result)
}

fn ensure_logged_in(session: &Session) -> Result<(), CoreError> {
    let stores = session.stores();
    if stores.logged_in.get() {
        return Ok(());
    }
    if let Some(message) = stores.login_error.get() {
        return Err(CoreError::AuthenticationFailed { message });
    }
    if stores.token.get().is_none() {
        return Err(CoreError::NotLoggedIn);
    }
    Err(CoreError::ConnectionFailed {
        reason: "account or locations could not be fetched".into(),
    })
}
