#![allow(clippy::unwrap_used)]
// Intent methods on `Session`: login, connect, config updates.

mod common;

use std::sync::atomic::Ordering;
use std::time::Duration;

use pretty_assertions::assert_eq;

use common::{Harness, config_with, default_locations, idle, location, wait_for};
use octovpn_core::{
    Config, CoreError, Credentials, OpenVpnTransport, Protocol, SessionConfig,
};

fn bob() -> Credentials {
    Credentials::new("bob", "correct horse")
}

// ── Login / logout ──────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn login_sets_token_and_logs_in() {
    let h = Harness::new(Config::default());
    tokio_test::assert_ok!(h.session.start().await);

    tokio_test::assert_ok!(h.session.login(bob(), false).await);
    let stores = h.session.stores();
    wait_for(&stores.logged_in, |v| *v).await;

    assert_eq!(stores.token.get().as_deref(), Some("T1"));
    assert!(!stores.logging_in.get());
    assert!(h.backend.saved().is_empty());
}

#[tokio::test(start_paused = true)]
async fn login_with_remember_persists_credentials() {
    let h = Harness::new(Config::default());
    h.session.start().await.unwrap();

    h.session.login(bob(), true).await.unwrap();
    idle().await;

    let saved = h.backend.saved();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].credentials, Some(bob()));
    assert_eq!(
        h.session.stores().config.get().unwrap().credentials,
        Some(bob())
    );
}

#[tokio::test(start_paused = true)]
async fn login_failure_records_error() {
    let h = Harness::new(Config::default());
    h.api.login.set(Err("invalid username or password".into()));
    h.session.start().await.unwrap();

    let err = tokio_test::assert_err!(h.session.login(bob(), true).await);
    let stores = h.session.stores();

    assert!(matches!(err, CoreError::Api { .. }));
    assert!(!stores.logging_in.get());
    assert_eq!(
        stores.login_error.get().as_deref(),
        Some("API error: invalid username or password")
    );
    assert_eq!(stores.token.get(), None);
    assert!(h.backend.saved().is_empty());
}

#[tokio::test(start_paused = true)]
async fn logout_requires_token() {
    let h = Harness::new(Config::default());
    h.session.start().await.unwrap();

    assert!(matches!(
        h.session.logout().await,
        Err(CoreError::NotLoggedIn)
    ));
}

#[tokio::test(start_paused = true)]
async fn logout_keeps_session_state() {
    let h = Harness::new(Config::default());
    h.session.start().await.unwrap();
    let stores = h.session.stores();
    stores.token.set(Some("T9".into()));
    wait_for(&stores.logged_in, |v| *v).await;

    let message = h.session.logout().await.unwrap();

    assert_eq!(message, "bye");
    assert_eq!(h.api.tokens.lock().unwrap().last().unwrap(), "T9");
    assert_eq!(stores.token.get().as_deref(), Some("T9"));
    assert!(stores.logged_in.get());
}

// ── Config ──────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn update_config_before_load_fails() {
    let h = Harness::new(Config::default());

    let err = h.session.update_config(|c| c.theme = "light".into()).unwrap_err();
    assert!(matches!(err, CoreError::ConfigNotLoaded));
}

#[tokio::test(start_paused = true)]
async fn update_config_returns_new_value() {
    let h = Harness::new(Config::default());
    h.session.start().await.unwrap();

    let updated = h
        .session
        .update_config(|c| c.protocol = Some(Protocol::WireGuard))
        .unwrap();
    idle().await;

    assert_eq!(updated.protocol, Some(Protocol::WireGuard));
    assert_eq!(h.backend.saved(), [updated]);
}

#[tokio::test(start_paused = true)]
async fn discord_toggle_reaches_backend_and_config() {
    let h = Harness::new(Config::default());
    h.session.start().await.unwrap();

    let config = h.session.set_discord_rpc(true).await.unwrap();
    idle().await;

    assert!(config.discord_rpc);
    assert_eq!(*h.backend.discord.lock().unwrap(), [true]);
    assert!(h.backend.saved()[0].discord_rpc);
}

// ── Tunnel profiles ─────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn tunnel_config_requires_token() {
    let h = Harness::new(Config::default());
    h.session.start().await.unwrap();

    let err = h
        .session
        .tunnel_config(&location("1", "DE", true))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::NotLoggedIn));
}

#[tokio::test(start_paused = true)]
async fn openvpn_profile_uses_configured_transport() {
    let session_config = SessionConfig {
        openvpn_transport: OpenVpnTransport::Tcp,
        ..SessionConfig::default()
    };
    let h = Harness::with_session_config(config_with(Some(Protocol::OpenVpn), None), session_config);
    h.session.start().await.unwrap();
    h.session.stores().token.set(Some("T1".into()));

    let profile = h
        .session
        .tunnel_config(&location("2", "JP", false))
        .await
        .unwrap();

    assert_eq!(profile, "client\ndev tun\n");
    assert_eq!(*h.api.transports.lock().unwrap(), [OpenVpnTransport::Tcp]);
    assert_eq!(h.api.wireguard.calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn wireguard_profile_needs_wireguard_location() {
    let h = Harness::new(config_with(Some(Protocol::WireGuard), None));
    h.session.start().await.unwrap();
    h.session.stores().token.set(Some("T1".into()));

    let err = h
        .session
        .tunnel_config(&location("2", "JP", false))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::ValidationFailed { .. }));
    assert_eq!(h.api.wireguard.calls(), 0);

    let profile = h
        .session
        .tunnel_config(&location("1", "DE", true))
        .await
        .unwrap();
    assert_eq!(profile, "[Interface]\n");
}

#[tokio::test(start_paused = true)]
async fn unset_protocol_falls_back_to_openvpn() {
    let h = Harness::new(config_with(None, None));
    h.session.start().await.unwrap();
    h.session.stores().token.set(Some("T1".into()));

    h.session
        .tunnel_config(&location("1", "DE", true))
        .await
        .unwrap();

    assert_eq!(h.api.openvpn.calls(), 1);
    assert_eq!(*h.api.transports.lock().unwrap(), [OpenVpnTransport::Udp]);
}

// ── Connect / disconnect ────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn connect_hands_profile_and_credentials_to_backend() {
    let creds = Credentials::new("alice", "hunter2");
    let h = Harness::new(config_with(Some(Protocol::OpenVpn), Some(creds.clone())));
    h.session.start().await.unwrap();
    h.session
        .wait_until_settled(Duration::from_secs(5))
        .await
        .unwrap();

    let target = default_locations().remove(0);
    h.session.connect(&target).await.unwrap();

    let toggles = h.backend.toggles.lock().unwrap();
    assert_eq!(toggles.len(), 1);
    assert!(toggles[0].connect);
    assert_eq!(toggles[0].protocol, Protocol::OpenVpn);
    assert_eq!(toggles[0].config.as_deref(), Some("client\ndev tun\n"));
    assert_eq!(toggles[0].credentials, Some(creds));
    assert_eq!(h.session.stores().selected_location.get(), Some(target));
}

#[tokio::test(start_paused = true)]
async fn refused_connect_is_an_error() {
    let h = Harness::new(Config::default());
    h.backend.toggle_accepts.store(false, Ordering::SeqCst);
    h.session.start().await.unwrap();
    h.session.stores().token.set(Some("T1".into()));

    let err = h
        .session
        .connect(&location("1", "DE", true))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Backend { .. }));
}

#[tokio::test(start_paused = true)]
async fn failed_profile_fetch_skips_backend() {
    let h = Harness::new(Config::default());
    h.api.openvpn.set(Err("no such location".into()));
    h.session.start().await.unwrap();
    h.session.stores().token.set(Some("T1".into()));

    assert!(h.session.connect(&location("1", "DE", true)).await.is_err());
    assert!(h.backend.toggles.lock().unwrap().is_empty());
    assert_eq!(h.session.stores().selected_location.get(), None);
}

#[tokio::test(start_paused = true)]
async fn disconnect_sends_bare_request() {
    let h = Harness::new(config_with(Some(Protocol::WireGuard), None));
    h.session.start().await.unwrap();

    h.session.disconnect().await.unwrap();

    let toggles = h.backend.toggles.lock().unwrap();
    assert!(!toggles[0].connect);
    assert_eq!(toggles[0].protocol, Protocol::WireGuard);
    assert_eq!(toggles[0].config, None);
}

// ── One-shot ────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn oneshot_runs_after_autologin_and_shuts_down() {
    let h = Harness::new(config_with(
        Some(Protocol::OpenVpn),
        Some(Credentials::new("alice", "hunter2")),
    ));
    let stores = std::sync::Arc::clone(h.session.stores());

    let count = h
        .session
        .clone()
        .oneshot(|session| async move {
            Ok(session.stores().locations.get().len())
        })
        .await
        .unwrap();

    assert_eq!(count, 2);
    assert!(stores.logged_in.get());
    assert_eq!(stores.token.listener_count(), 0);
}
