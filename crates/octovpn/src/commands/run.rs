//! Headless session: every rule active until Ctrl-C.

use tracing::{debug, info, warn};

use octovpn_config::Settings;

use crate::cli::GlobalOpts;
use crate::config;
use crate::error::CliError;
use crate::output;

pub async fn handle(settings: &Settings, global: &GlobalOpts) -> Result<(), CliError> {
    let (session, backend) = config::build_session(settings)?;
    let stores = session.stores();
    let color = output::should_color(&global.color);
    let quiet = global.quiet;

    stores.status.subscribe(move |status| {
        info!(%status, "connection status");
        if !quiet {
            println!("status: {}", output::status_label(*status, color));
        }
    });
    stores.logged_in.subscribe(|logged_in| info!(logged_in, "login state"));
    stores
        .locations
        .subscribe(|locations| info!(count = locations.len(), "locations updated"));
    stores.account.subscribe(|account| {
        if let Some(a) = account {
            info!(account = %a.display_name(), "account updated");
        }
    });
    stores.login_error.subscribe(|error| {
        if let Some(e) = error {
            warn!(error = %e, "login failed");
        }
    });
    stores.openvpn_status.subscribe(|status| match status {
        Some(s) => info!(
            state = %s.state,
            remote = %s.remote_ip,
            port = s.port,
            since = ?s.started_at(),
            "openvpn state"
        ),
        None => debug!("openvpn management interface unreachable"),
    });

    session.start().await?;
    info!(data_dir = %backend.data_dir().display(), "session running");
    if !quiet {
        eprintln!("Session running. Press Ctrl-C to stop.");
    }

    tokio::signal::ctrl_c().await?;
    info!("interrupt received; shutting down");
    session.shutdown().await;
    Ok(())
}
