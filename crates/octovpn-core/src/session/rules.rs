// ── Synchronization rules ──
//
// Each rule reacts to one trigger and writes a fixed set of stores.
// `RULES` lists them in registration order; `Session::start` follows it.

use std::sync::Arc;
use std::sync::atomic::Ordering;

use tracing::{debug, info, warn};

use super::SessionInner;
use crate::model::{Config, ConnectionStatus, Credentials, OpenVpnStatus, Protocol};

/// What makes a rule run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Every `set` on the named store.
    StoreChange(&'static str),
    /// The named backend push event.
    BackendEvent(&'static str),
    /// Once, when the session starts.
    Startup,
}

/// One entry of the reaction table.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub number: u8,
    pub name: &'static str,
    pub trigger: Trigger,
    pub effect: &'static str,
    /// Stores the rule may write.
    pub writes: &'static [&'static str],
}

pub const RULES: &[Rule] = &[
    Rule {
        number: 1,
        name: "window-size",
        trigger: Trigger::StoreChange("logged_in"),
        effect: "resize the host window for the logged-in or logged-out layout",
        writes: &[],
    },
    Rule {
        number: 2,
        name: "token-refresh",
        trigger: Trigger::StoreChange("token"),
        effect: "fetch locations and account concurrently, then settle the login flags",
        writes: &["locations", "account", "logged_in", "logging_in"],
    },
    Rule {
        number: 3,
        name: "status-passthrough",
        trigger: Trigger::BackendEvent("status"),
        effect: "write the status, delayed for settled WireGuard states",
        writes: &["status"],
    },
    Rule {
        number: 4,
        name: "openvpn-status-passthrough",
        trigger: Trigger::BackendEvent("openvpn_status"),
        effect: "replace the OpenVPN management snapshot",
        writes: &["openvpn_status"],
    },
    Rule {
        number: 5,
        name: "startup-load",
        trigger: Trigger::Startup,
        effect: "load the saved config and log in with stored credentials",
        writes: &["config", "logging_in", "token", "login_error"],
    },
    Rule {
        number: 6,
        name: "config-persistence",
        trigger: Trigger::StoreChange("config"),
        effect: "save the config and re-fetch locations when logged in",
        writes: &["locations"],
    },
    Rule {
        number: 7,
        name: "preflight",
        trigger: Trigger::Startup,
        effect: "ask the backend to verify the host",
        writes: &[],
    },
    Rule {
        number: 8,
        name: "connection-probe",
        trigger: Trigger::Startup,
        effect: "mark the session connected if a tunnel is already up",
        writes: &["status"],
    },
];

impl SessionInner {
    // ── Rule 1 ───────────────────────────────────────────────────────

    pub(super) fn apply_window_size(&self, logged_in: bool) {
        let size = if logged_in {
            self.config.logged_in_size
        } else {
            self.config.logged_out_size
        };
        debug!(logged_in, width = size.width, height = size.height, "resizing window");
        self.window.set_size(size);
    }

    // ── Rule 2 ───────────────────────────────────────────────────────

    pub(super) fn refresh_for_token(self: &Arc<Self>, token: Option<&String>) {
        let Some(token) = token.cloned() else {
            debug!("token cleared; nothing to fetch");
            return;
        };

        let locations_ticket = self.locations_seq.issue();
        let account_ticket = self.account_seq.issue();
        let refresh_ticket = self.refresh_seq.issue();
        let inner = Arc::clone(self);

        self.spawn(async move {
            let (locations, account) = tokio::join!(
                inner.api.locations(&token),
                inner.api.account(&token),
            );

            let locations_ok = match locations {
                Ok(list) => {
                    debug!(count = list.len(), "locations refreshed");
                    inner.stores.locations.set_if_newer(
                        &inner.locations_seq,
                        locations_ticket,
                        Arc::new(list),
                    );
                    true
                }
                Err(e) => {
                    warn!(error = %e, "failed to fetch locations");
                    false
                }
            };

            let account_ok = match account {
                Ok(account) => {
                    inner
                        .stores
                        .account
                        .set_if_newer(&inner.account_seq, account_ticket, Some(account));
                    true
                }
                Err(e) => {
                    warn!(error = %e, "failed to fetch account");
                    false
                }
            };

            if inner.refresh_seq.is_latest(refresh_ticket) {
                let logged_in = account_ok && locations_ok;
                info!(logged_in, "token refresh settled");
                inner.stores.logged_in.set(logged_in);
                inner.stores.logging_in.set(false);
            } else {
                debug!("superseded token refresh; flags left to the newer request");
            }
        });
    }

    // ── Rules 3 and 4 ────────────────────────────────────────────────

    pub(super) fn apply_status(self: &Arc<Self>, status: ConnectionStatus) {
        let protocol = self
            .stores
            .config
            .with(|config| config.as_ref().and_then(|c| c.protocol));

        if protocol == Some(Protocol::WireGuard) && status.is_settled() {
            debug!(%status, delay = ?self.config.wireguard_debounce, "deferring WireGuard status");
            let inner = Arc::clone(self);
            let timer = self
                .status_debounce
                .schedule(self.config.wireguard_debounce, move || {
                    inner.stores.status.set(status);
                });
            self.spawn(timer);
        } else {
            debug!(%status, "status update");
            self.status_debounce
                .fire_now(|| self.stores.status.set(status));
        }
    }

    pub(super) fn apply_openvpn_status(&self, status: Option<OpenVpnStatus>) {
        self.stores.openvpn_status.set(status);
    }

    // ── Rule 5 ───────────────────────────────────────────────────────

    pub(super) async fn load_and_autologin(self: &Arc<Self>) {
        let config = match self.backend.load_config().await {
            Ok(config) => config,
            Err(e) => {
                warn!(error = %e, "failed to load configuration; continuing without one");
                return;
            }
        };
        info!(
            protocol = ?config.protocol,
            has_credentials = config.credentials.is_some(),
            "configuration loaded"
        );

        let credentials = config.credentials.clone();
        self.skip_next_persist.store(true, Ordering::SeqCst);
        self.stores.config.set(Some(config));

        if let Some(credentials) = credentials {
            self.stores.login_error.set(None);
            self.stores.logging_in.set(true);
            let inner = Arc::clone(self);
            self.spawn(async move {
                inner.autologin(&credentials).await;
            });
        }
    }

    async fn autologin(&self, credentials: &Credentials) {
        match self.api.login(credentials).await {
            Ok(token) => {
                info!(username = %credentials.username, "automatic login succeeded");
                self.stores.token.set(Some(token));
            }
            Err(e) => {
                warn!(error = %e, "automatic login failed");
                self.stores.logging_in.set(false);
                self.stores.login_error.set(Some(e.to_string()));
            }
        }
    }

    // ── Rule 6 ───────────────────────────────────────────────────────

    pub(super) fn persist_config(self: &Arc<Self>, config: Option<&Config>) {
        if self.skip_next_persist.swap(false, Ordering::SeqCst) {
            debug!("startup configuration observed; not persisting");
            return;
        }
        let Some(config) = config.cloned() else {
            return;
        };

        let token = self.stores.token.get();
        let ticket = token.as_ref().map(|_| self.locations_seq.issue());
        let inner = Arc::clone(self);

        self.spawn(async move {
            if config.protocol.is_some() {
                match inner.backend.save_config(&config).await {
                    Ok(()) => debug!("configuration saved"),
                    Err(e) => warn!(error = %e, "failed to save configuration"),
                }
            } else {
                debug!("configuration has no protocol; not saving");
            }

            if let (Some(token), Some(ticket)) = (token, ticket) {
                match inner.api.locations(&token).await {
                    Ok(list) => {
                        inner
                            .stores
                            .locations
                            .set_if_newer(&inner.locations_seq, ticket, Arc::new(list));
                    }
                    Err(e) => debug!(error = %e, "location re-fetch after config change failed"),
                }
            }
        });
    }

    // ── Rules 7 and 8 ────────────────────────────────────────────────

    pub(super) fn run_preflight(self: &Arc<Self>) {
        let inner = Arc::clone(self);
        self.spawn(async move {
            match inner.backend.preflight_check().await {
                Ok(()) => debug!("preflight check passed"),
                Err(e) => warn!(error = %e, "preflight check failed"),
            }
        });
    }

    pub(super) fn probe_connection(self: &Arc<Self>) {
        let inner = Arc::clone(self);
        self.spawn(async move {
            match inner.backend.is_connected().await {
                Ok(Some(protocol)) => {
                    info!(%protocol, "tunnel already up");
                    inner
                        .status_debounce
                        .fire_now(|| inner.stores.status.set(ConnectionStatus::Connected));
                }
                Ok(None) => debug!("no tunnel up at startup"),
                Err(e) => warn!(error = %e, "connection probe failed"),
            }
        });
    }
}
