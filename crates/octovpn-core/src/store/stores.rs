// ── The session's store set ──
//
// Every observable slot the synchronization rules read or write.
// Owned by `Session` and shared with consumers through `Arc<Stores>`.

use std::sync::Arc;

use super::cell::Store;
use crate::model::{
    Account, Config, ConnectionStatus, Location, LocationFilter, OpenVpnStatus,
};

/// All session state. Fields are public so consumers can subscribe to
/// exactly the slots they render.
#[derive(Debug)]
pub struct Stores {
    /// Session token; `Some` after a successful login.
    pub token: Store<Option<String>>,
    /// `None` until the startup load completes.
    pub config: Store<Option<Config>>,
    pub locations: Store<Arc<Vec<Location>>>,
    pub account: Store<Option<Account>>,
    /// Written through the session's debounce slot. Listeners may feed
    /// backend events straight back into the session.
    pub status: Store<ConnectionStatus>,
    pub openvpn_status: Store<Option<OpenVpnStatus>>,
    pub logging_in: Store<bool>,
    pub logged_in: Store<bool>,
    /// Message from the most recent failed login, cleared on the next attempt.
    pub login_error: Store<Option<String>>,
    pub selected_location: Store<Option<Location>>,
    /// Free-text location search.
    pub search: Store<String>,
}

impl Stores {
    pub fn new() -> Self {
        Self {
            token: Store::new("token", None),
            config: Store::new("config", None),
            locations: Store::new("locations", Arc::new(Vec::new())),
            account: Store::new("account", None),
            status: Store::new("status", ConnectionStatus::Disconnected),
            openvpn_status: Store::new("openvpn_status", None),
            logging_in: Store::new("logging_in", false),
            logged_in: Store::new("logged_in", false),
            login_error: Store::new("login_error", None),
            selected_location: Store::new("selected_location", None),
            search: Store::new("search", String::new()),
        }
    }

    /// Locations matching the current `search` text.
    pub fn filtered_locations(&self) -> Vec<Location> {
        let filter = LocationFilter::Search(self.search.get());
        self.locations.with(|locations| {
            locations
                .iter()
                .filter(|loc| filter.matches(loc))
                .cloned()
                .collect()
        })
    }

    /// Resolve a location by id, name or country code among the fetched list.
    pub fn find_location(&self, needle: &str) -> Option<Location> {
        self.locations.with(|locations| {
            locations
                .iter()
                .find(|l| l.id == needle || l.name.eq_ignore_ascii_case(needle))
                .or_else(|| {
                    locations
                        .iter()
                        .find(|l| l.country_code.eq_ignore_ascii_case(needle) && l.is_online())
                })
                .cloned()
        })
    }
}

impl Default for Stores {
    fn default() -> Self {
        Self::new()
    }
}
