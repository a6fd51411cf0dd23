//! Account command handler.

use octovpn_config::Settings;
use octovpn_core::{Account, CoreError};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

fn detail(a: &Account) -> String {
    [
        format!("ID:        {}", a.id),
        format!("Name:      {}", a.display_name()),
        format!("Username:  {}", a.username.as_deref().unwrap_or("-")),
        format!("Email:     {}", a.email.as_deref().unwrap_or("-")),
        format!("Plan:      {}", a.user_type.as_deref().unwrap_or("-")),
    ]
    .join("\n")
}

pub async fn handle(settings: &Settings, global: &GlobalOpts) -> Result<(), CliError> {
    let account = super::with_login(settings, |session| async move {
        session.stores().account.get().ok_or(CoreError::NotLoggedIn)
    })
    .await?;

    let out = output::render_single(&global.output, &account, detail, |a| a.id.clone())?;
    output::print_output(&out, global.quiet);
    Ok(())
}
