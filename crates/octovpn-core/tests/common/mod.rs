// Shared fakes for session tests: a scripted control plane, a recording
// native backend and a recording window.

#![allow(dead_code, clippy::unwrap_used)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::future::BoxFuture;
use tokio::sync::broadcast;

use octovpn_core::{
    Account, BackendEvent, Config, ConnectionRequest, ControlPlane, CoreError, Credentials,
    Location, LogicalSize, NativeBackend, OpenVpnTransport, Protocol, Session, SessionConfig,
    Store, WindowHandle,
};

// ── Scripted responses ──────────────────────────────────────────────

/// One endpoint's behaviour: queued `(delay, reply)` pairs, then a fallback.
pub struct Scripted<T> {
    queue: Mutex<VecDeque<(Duration, Result<T, String>)>>,
    fallback: Mutex<Result<T, String>>,
    calls: AtomicUsize,
}

impl<T: Clone + Send> Scripted<T> {
    pub fn new(fallback: Result<T, String>) -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            fallback: Mutex::new(fallback),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn set(&self, reply: Result<T, String>) {
        *self.fallback.lock().unwrap() = reply;
    }

    pub fn push(&self, delay: Duration, reply: Result<T, String>) {
        self.queue.lock().unwrap().push_back((delay, reply));
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn next(&self) -> Result<T, CoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let (delay, reply) = {
            let queued = self.queue.lock().unwrap().pop_front();
            queued.unwrap_or_else(|| (Duration::ZERO, self.fallback.lock().unwrap().clone()))
        };
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        reply.map_err(|message| CoreError::Api {
            message,
            code: None,
            status: None,
        })
    }
}

// ── Fixtures ────────────────────────────────────────────────────────

pub fn location(id: &str, code: &str, wireguard: bool) -> Location {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "ip": "192.0.2.10",
        "country": format!("Country {code}"),
        "city": "Capital",
        "name": format!("{}-{id}", code.to_lowercase()),
        "status": "1",
        "hasWireGuardConfig": wireguard,
        "country_code": code,
    }))
    .unwrap()
}

pub fn account() -> Account {
    serde_json::from_value(serde_json::json!({
        "id": "u-1",
        "email": "alice@example.com",
        "username": "alice",
        "firstName": "Alice",
        "lastName": "Liddell",
        "userType": "premium"
    }))
    .unwrap()
}

pub fn default_locations() -> Vec<Location> {
    vec![location("1", "DE", true), location("2", "JP", false)]
}

pub fn config_with(protocol: Option<Protocol>, credentials: Option<Credentials>) -> Config {
    Config {
        credentials,
        protocol,
        ..Config::default()
    }
}

// ── Control plane ───────────────────────────────────────────────────

pub struct MockApi {
    pub login: Scripted<String>,
    pub logout: Scripted<String>,
    pub account: Scripted<Account>,
    pub locations: Scripted<Vec<Location>>,
    pub openvpn: Scripted<String>,
    pub wireguard: Scripted<String>,
    pub transports: Mutex<Vec<OpenVpnTransport>>,
    pub tokens: Mutex<Vec<String>>,
}

impl Default for MockApi {
    fn default() -> Self {
        Self {
            login: Scripted::new(Ok("T1".into())),
            logout: Scripted::new(Ok("bye".into())),
            account: Scripted::new(Ok(account())),
            locations: Scripted::new(Ok(default_locations())),
            openvpn: Scripted::new(Ok("client\ndev tun\n".into())),
            wireguard: Scripted::new(Ok("[Interface]\n".into())),
            transports: Mutex::new(Vec::new()),
            tokens: Mutex::new(Vec::new()),
        }
    }
}

impl MockApi {
    fn saw(&self, token: &str) {
        self.tokens.lock().unwrap().push(token.to_owned());
    }
}

impl ControlPlane for MockApi {
    fn login<'a>(&'a self, _credentials: &'a Credentials) -> BoxFuture<'a, Result<String, CoreError>> {
        Box::pin(self.login.next())
    }

    fn logout<'a>(&'a self, token: &'a str) -> BoxFuture<'a, Result<String, CoreError>> {
        self.saw(token);
        Box::pin(self.logout.next())
    }

    fn account<'a>(&'a self, token: &'a str) -> BoxFuture<'a, Result<Account, CoreError>> {
        self.saw(token);
        Box::pin(self.account.next())
    }

    fn locations<'a>(&'a self, token: &'a str) -> BoxFuture<'a, Result<Vec<Location>, CoreError>> {
        self.saw(token);
        Box::pin(self.locations.next())
    }

    fn openvpn_config<'a>(
        &'a self,
        token: &'a str,
        _location: &'a Location,
        transport: OpenVpnTransport,
    ) -> BoxFuture<'a, Result<String, CoreError>> {
        self.saw(token);
        self.transports.lock().unwrap().push(transport);
        Box::pin(self.openvpn.next())
    }

    fn wireguard_config<'a>(
        &'a self,
        token: &'a str,
        _location: &'a Location,
    ) -> BoxFuture<'a, Result<String, CoreError>> {
        self.saw(token);
        Box::pin(self.wireguard.next())
    }
}

// ── Native backend ──────────────────────────────────────────────────

pub struct MockBackend {
    pub config: Mutex<Result<Config, String>>,
    pub saved: Mutex<Vec<Config>>,
    pub preflights: AtomicUsize,
    pub connected: Mutex<Option<Protocol>>,
    pub toggle_accepts: AtomicBool,
    pub toggles: Mutex<Vec<ConnectionRequest>>,
    pub discord: Mutex<Vec<bool>>,
    pub events: broadcast::Sender<BackendEvent>,
}

impl MockBackend {
    pub fn with_config(config: Config) -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            config: Mutex::new(Ok(config)),
            saved: Mutex::new(Vec::new()),
            preflights: AtomicUsize::new(0),
            connected: Mutex::new(None),
            toggle_accepts: AtomicBool::new(true),
            toggles: Mutex::new(Vec::new()),
            discord: Mutex::new(Vec::new()),
            events,
        }
    }

    pub fn saved(&self) -> Vec<Config> {
        self.saved.lock().unwrap().clone()
    }

    pub fn emit(&self, event: BackendEvent) {
        self.events.send(event).unwrap();
    }
}

impl NativeBackend for MockBackend {
    fn load_config(&self) -> BoxFuture<'_, Result<Config, CoreError>> {
        let result = self.config.lock().unwrap().clone();
        Box::pin(async move {
            result.map_err(|message| CoreError::Backend {
                command: "load_config".into(),
                message,
            })
        })
    }

    fn save_config<'a>(&'a self, config: &'a Config) -> BoxFuture<'a, Result<(), CoreError>> {
        self.saved.lock().unwrap().push(config.clone());
        Box::pin(async { Ok(()) })
    }

    fn preflight_check(&self) -> BoxFuture<'_, Result<(), CoreError>> {
        self.preflights.fetch_add(1, Ordering::SeqCst);
        Box::pin(async { Ok(()) })
    }

    fn is_connected(&self) -> BoxFuture<'_, Result<Option<Protocol>, CoreError>> {
        let connected = *self.connected.lock().unwrap();
        Box::pin(async move { Ok(connected) })
    }

    fn toggle_connection(
        &self,
        request: ConnectionRequest,
    ) -> BoxFuture<'_, Result<bool, CoreError>> {
        self.toggles.lock().unwrap().push(request);
        let accepted = self.toggle_accepts.load(Ordering::SeqCst);
        Box::pin(async move { Ok(accepted) })
    }

    fn toggle_discord_rpc(&self, enable: bool) -> BoxFuture<'_, Result<(), CoreError>> {
        self.discord.lock().unwrap().push(enable);
        Box::pin(async { Ok(()) })
    }

    fn events(&self) -> broadcast::Receiver<BackendEvent> {
        self.events.subscribe()
    }
}

// ── Window ──────────────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingWindow {
    pub sizes: Mutex<Vec<LogicalSize>>,
}

impl WindowHandle for RecordingWindow {
    fn set_size(&self, size: LogicalSize) {
        self.sizes.lock().unwrap().push(size);
    }
}

// ── Harness ─────────────────────────────────────────────────────────

pub struct Harness {
    pub session: Session,
    pub api: Arc<MockApi>,
    pub backend: Arc<MockBackend>,
    pub window: Arc<RecordingWindow>,
}

impl Harness {
    pub fn new(config: Config) -> Self {
        Self::with_session_config(config, SessionConfig::default())
    }

    pub fn with_session_config(config: Config, session_config: SessionConfig) -> Self {
        let api = Arc::new(MockApi::default());
        let backend = Arc::new(MockBackend::with_config(config));
        let window = Arc::new(RecordingWindow::default());
        let session = Session::new(
            session_config,
            Arc::clone(&api) as Arc<dyn ControlPlane>,
            Arc::clone(&backend) as Arc<dyn NativeBackend>,
            Arc::clone(&window) as Arc<dyn WindowHandle>,
        );
        Self {
            session,
            api,
            backend,
            window,
        }
    }
}

/// Wait (bounded) until `store` satisfies `pred`.
pub async fn wait_for<T>(store: &Store<T>, pred: impl FnMut(&T) -> bool)
where
    T: Clone + Send + Sync + 'static,
{
    let mut rx = store.watch();
    tokio::time::timeout(Duration::from_secs(10), rx.wait_for(pred))
        .await
        .unwrap_or_else(|_| panic!("timed out waiting on store '{}'", store.name()))
        .unwrap();
}

/// Let every ready task run. Under a paused clock this returns only once
/// the runtime is otherwise idle.
pub async fn idle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}
