//! Tunnel profile retrieval.

use octovpn_config::Settings;

use crate::cli::{GlobalOpts, TunnelConfigArgs};
use crate::error::CliError;
use crate::output;

pub async fn handle(
    settings: &Settings,
    args: TunnelConfigArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let needle = args.location.clone();
    let fetched = super::with_login(settings, |session| async move {
        let Some(location) = session.stores().find_location(&needle) else {
            return Ok(None);
        };
        session.stores().selected_location.set(Some(location.clone()));
        let profile = session.tunnel_config(&location).await?;
        Ok(Some((location, profile)))
    })
    .await?;

    let Some((location, profile)) = fetched else {
        return Err(CliError::NotFound {
            resource_type: "location".into(),
            identifier: args.location,
            list_command: "locations".into(),
        });
    };

    match args.out {
        Some(path) => {
            std::fs::write(&path, &profile)?;
            if !global.quiet {
                eprintln!("Profile for {} written to {}", location.label(), path.display());
            }
        }
        None => output::print_output(&profile, global.quiet),
    }
    Ok(())
}
