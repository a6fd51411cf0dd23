// ── Session ──
//
// Owns the store set and wires the synchronization rules between the
// control plane, the native backend and the stores. Consumers drive it
// with intents (login, connect, config updates) and observe the stores.

mod debounce;
mod rules;

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError, Weak};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

use crate::backend::{BackendEvent, ConnectionRequest, NativeBackend, WindowHandle};
use crate::config::SessionConfig;
use crate::control_plane::ControlPlane;
use crate::error::CoreError;
use crate::model::{Config, Credentials, Location, Protocol};
use crate::store::{ListenerId, RequestSequencer, Stores};

pub use debounce::DebounceSlot;
pub use rules::{RULES, Rule, Trigger};

/// Listener ids registered by `start`, removed again by `shutdown`.
struct RuleListeners {
    window: ListenerId,
    token: ListenerId,
    config: ListenerId,
}

/// The synchronization core.
///
/// Cheaply cloneable via `Arc<SessionInner>`. Nothing happens until
/// [`start()`](Self::start) registers the rules and loads the config.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

pub(crate) struct SessionInner {
    config: SessionConfig,
    stores: Arc<Stores>,
    api: Arc<dyn ControlPlane>,
    backend: Arc<dyn NativeBackend>,
    window: Arc<dyn WindowHandle>,
    locations_seq: RequestSequencer,
    account_seq: RequestSequencer,
    refresh_seq: RequestSequencer,
    status_debounce: Arc<DebounceSlot>,
    /// Set by the startup load so rule 6 skips exactly that value.
    skip_next_persist: AtomicBool,
    started: AtomicBool,
    runtime: OnceLock<Handle>,
    cancel: CancellationToken,
    /// Stops the backend event pump; a child of `cancel`.
    pump_stop: CancellationToken,
    tasks: TaskTracker,
    listeners: Mutex<Option<RuleListeners>>,
}

impl Session {
    pub fn new(
        config: SessionConfig,
        api: Arc<dyn ControlPlane>,
        backend: Arc<dyn NativeBackend>,
        window: Arc<dyn WindowHandle>,
    ) -> Self {
        let cancel = CancellationToken::new();
        let pump_stop = cancel.child_token();
        Self {
            inner: Arc::new(SessionInner {
                config,
                stores: Arc::new(Stores::new()),
                api,
                backend,
                window,
                locations_seq: RequestSequencer::new(),
                account_seq: RequestSequencer::new(),
                refresh_seq: RequestSequencer::new(),
                status_debounce: Arc::new(DebounceSlot::new()),
                skip_next_persist: AtomicBool::new(false),
                started: AtomicBool::new(false),
                runtime: OnceLock::new(),
                cancel,
                pump_stop,
                tasks: TaskTracker::new(),
                listeners: Mutex::new(None),
            }),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    pub fn stores(&self) -> &Arc<Stores> {
        &self.inner.stores
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Register every rule in table order and run the startup actions.
    ///
    /// Returns once the saved config has been loaded (or failed to load).
    /// Autologin, preflight and the connection probe continue in the
    /// background; use [`wait_until_settled`](Self::wait_until_settled)
    /// to wait for the login to finish.
    pub async fn start(&self) -> Result<(), CoreError> {
        if self.inner.started.swap(true, Ordering::SeqCst) {
            return Err(CoreError::Internal("session already started".into()));
        }
        let _ = self.inner.runtime.set(Handle::current());
        let inner = &self.inner;
        let stores = &inner.stores;
        let weak = Arc::downgrade(inner);

        // Rule 1
        let window = stores.logged_in.subscribe_immediate(with_inner(&weak, |inner, v: &bool| {
            inner.apply_window_size(*v);
        }));

        // Rule 2
        let token = stores
            .token
            .subscribe(with_inner(&weak, |inner, v: &Option<String>| {
                inner.refresh_for_token(v.as_ref());
            }));

        // Rules 3 and 4
        self.spawn_event_pump(inner.backend.events());

        // Rule 6 is registered before rule 5 runs so it observes the load.
        let config = stores
            .config
            .subscribe(with_inner(&weak, |inner, v: &Option<Config>| {
                inner.persist_config(v.as_ref());
            }));

        *inner.listeners.lock().unwrap_or_else(PoisonError::into_inner) = Some(RuleListeners {
            window,
            token,
            config,
        });

        // Rule 5
        inner.load_and_autologin().await;
        // Rule 7
        inner.run_preflight();
        // Rule 8
        inner.probe_connection();

        info!("session started");
        Ok(())
    }

    /// Wait until no login is in flight, or `timeout` elapses.
    pub async fn wait_until_settled(&self, timeout: Duration) -> Result<(), CoreError> {
        let mut logging_in = self.inner.stores.logging_in.watch();
        tokio::time::timeout(timeout, logging_in.wait_for(|v| !*v))
            .await
            .map_err(|_| CoreError::Timeout {
                what: "login to settle".into(),
                timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            })?
            .map_err(|_| CoreError::Internal("logging_in store dropped".into()))?;
        Ok(())
    }

    /// Detach the rules, stop the event pump and any pending status write,
    /// then wait for in-flight fetches and saves to finish.
    pub async fn shutdown(&self) {
        let inner = &self.inner;
        let listeners = inner
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(l) = listeners {
            inner.stores.logged_in.unsubscribe(l.window);
            inner.stores.token.unsubscribe(l.token);
            inner.stores.config.unsubscribe(l.config);
        }

        inner.pump_stop.cancel();
        inner.status_debounce.cancel();
        inner.tasks.close();
        inner.tasks.wait().await;
        inner.cancel.cancel();
        debug!("session shut down");
    }

    /// Stop everything now, dropping in-flight work.
    pub fn abort(&self) {
        self.inner.cancel.cancel();
        self.inner.status_debounce.cancel();
        self.inner.tasks.close();
    }

    /// Start, wait for autologin, run `f`, shut down.
    ///
    /// Tailored to single CLI invocations.
    pub async fn oneshot<F, Fut, T>(self, f: F) -> Result<T, CoreError>
    where
        F: FnOnce(Session) -> Fut,
        Fut: Future<Output = Result<T, CoreError>>,
    {
        self.start().await?;
        let settle = self.config().settle_timeout;
        let result = match self.wait_until_settled(settle).await {
            Ok(()) => f(self.clone()).await,
            Err(e) => Err(e),
        };
        self.shutdown().await;
        result
    }

    // ── Backend events ───────────────────────────────────────────────

    /// Feed one backend push event through rules 3 and 4.
    pub fn handle_backend_event(&self, event: BackendEvent) {
        match event {
            BackendEvent::Status(status) => self.inner.apply_status(status),
            BackendEvent::OpenVpnStatus(status) => self.inner.apply_openvpn_status(status),
        }
    }

    fn spawn_event_pump(&self, mut rx: broadcast::Receiver<BackendEvent>) {
        let session = self.clone();
        let stop = self.inner.pump_stop.clone();
        self.inner.spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    () = stop.cancelled() => break,
                    event = rx.recv() => match event {
                        Ok(event) => session.handle_backend_event(event),
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            warn!(skipped, "backend event stream lagged");
                        }
                        Err(broadcast::error::RecvError::Closed) => {
                            debug!("backend event stream closed");
                            break;
                        }
                    },
                }
            }
        });
    }

    // ── Intents ──────────────────────────────────────────────────────

    /// Interactive login. On success the token store is set, which kicks
    /// off the account/locations refresh; with `remember` the credentials
    /// are also written into the config.
    pub async fn login(&self, credentials: Credentials, remember: bool) -> Result<(), CoreError> {
        let stores = &self.inner.stores;
        stores.login_error.set(None);
        stores.logging_in.set(true);

        match self.inner.api.login(&credentials).await {
            Ok(token) => {
                info!(username = %credentials.username, "login succeeded");
                if remember && stores.config.with(Option::is_some) {
                    self.update_config(|c| c.credentials = Some(credentials))?;
                }
                stores.token.set(Some(token));
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "login failed");
                stores.logging_in.set(false);
                stores.login_error.set(Some(e.to_string()));
                Err(e)
            }
        }
    }

    /// Invalidate the current token on the server.
    ///
    /// Session state is left as is; see DESIGN.md.
    pub async fn logout(&self) -> Result<String, CoreError> {
        let token = self.require_token()?;
        let message = self.inner.api.logout(&token).await?;
        info!("logged out");
        Ok(message)
    }

    /// Mutate the config through its store, which persists it (rule 6).
    pub fn update_config(&self, f: impl FnOnce(&mut Config)) -> Result<Config, CoreError> {
        let mut config = self
            .inner
            .stores
            .config
            .get()
            .ok_or(CoreError::ConfigNotLoaded)?;
        f(&mut config);
        self.inner.stores.config.set(Some(config.clone()));
        Ok(config)
    }

    /// Tell the backend to toggle Discord presence and remember the choice.
    pub async fn set_discord_rpc(&self, enable: bool) -> Result<Config, CoreError> {
        self.inner.backend.toggle_discord_rpc(enable).await?;
        self.update_config(|c| c.discord_rpc = enable)
    }

    /// Fetch the tunnel profile for `location` using the configured protocol.
    pub async fn tunnel_config(&self, location: &Location) -> Result<String, CoreError> {
        let token = self.require_token()?;
        match self.current_protocol()? {
            Protocol::OpenVpn => {
                self.inner
                    .api
                    .openvpn_config(&token, location, self.inner.config.openvpn_transport)
                    .await
            }
            Protocol::WireGuard => {
                if !location.has_wireguard() {
                    return Err(CoreError::ValidationFailed {
                        message: format!("location '{}' has no WireGuard config", location.name),
                    });
                }
                self.inner.api.wireguard_config(&token, location).await
            }
        }
    }

    /// Fetch a profile for `location` and ask the backend to bring it up.
    pub async fn connect(&self, location: &Location) -> Result<(), CoreError> {
        let protocol = self.current_protocol()?;
        let profile = self.tunnel_config(location).await?;
        let credentials = self
            .inner
            .stores
            .config
            .with(|c| c.as_ref().and_then(|c| c.credentials.clone()));
        self.inner.stores.selected_location.set(Some(location.clone()));

        info!(location = %location.name, %protocol, "connecting");
        let accepted = self
            .inner
            .backend
            .toggle_connection(ConnectionRequest {
                connect: true,
                protocol,
                config: Some(profile),
                credentials,
            })
            .await?;
        if accepted {
            Ok(())
        } else {
            Err(CoreError::backend("toggle_connection", "tunnel did not come up"))
        }
    }

    /// Ask the backend to tear the tunnel down.
    pub async fn disconnect(&self) -> Result<(), CoreError> {
        let protocol = self.current_protocol()?;
        info!(%protocol, "disconnecting");
        let accepted = self
            .inner
            .backend
            .toggle_connection(ConnectionRequest {
                connect: false,
                protocol,
                config: None,
                credentials: None,
            })
            .await?;
        if accepted {
            Ok(())
        } else {
            Err(CoreError::backend("toggle_connection", "no tunnel to tear down"))
        }
    }

    fn require_token(&self) -> Result<String, CoreError> {
        self.inner.stores.token.get().ok_or(CoreError::NotLoggedIn)
    }

    fn current_protocol(&self) -> Result<Protocol, CoreError> {
        self.inner
            .stores
            .config
            .with(|c| c.as_ref().map(Config::effective_protocol))
            .ok_or(CoreError::ConfigNotLoaded)
    }
}

impl SessionInner {
    /// Spawn onto the session's runtime, tracked by `shutdown` and dropped by `abort`.
    fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let Some(handle) = self.runtime.get() else {
            warn!("session not started; dropping background task");
            return;
        };
        let cancel = self.cancel.clone();
        self.tasks.spawn_on(
            async move {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => {}
                    () = task => {}
                }
            },
            handle,
        );
    }
}

/// Adapt a rule method into a store listener that holds only a weak
/// reference, so the stores inside `SessionInner` never keep it alive.
fn with_inner<T, F>(weak: &Weak<SessionInner>, f: F) -> impl Fn(&T) + Send + Sync + 'static
where
    T: 'static,
    F: Fn(&Arc<SessionInner>, &T) + Send + Sync + 'static,
{
    let weak = weak.clone();
    move |value: &T| {
        if let Some(inner) = weak.upgrade() {
            f(&inner, value);
        }
    }
}
