// Tunnel config issuance
//
// Both endpoints return an opaque profile string that is handed to the
// native backend untouched.

use tracing::debug;

use crate::client::{ApiClient, Authorization};
use crate::error::Error;
use crate::models::{ConfigResponse, Location, OpenVpnTransport};

impl ApiClient {
    /// Fetch an OpenVPN profile for a location.
    ///
    /// `GET /configs/openvpn/{id}/{udp|tcp}` with `Authorization: <token>`
    pub async fn openvpn_config(
        &self,
        token: &str,
        location: &Location,
        transport: OpenVpnTransport,
    ) -> Result<ConfigResponse, Error> {
        let url = self.endpoint(&["configs", "openvpn", &location.id, transport.as_str()])?;
        debug!(location = %location.id, %transport, "requesting OpenVPN config");
        self.get(url, Authorization::Raw(token)).await
    }

    /// Fetch a WireGuard config for a location.
    ///
    /// `GET /configs/wireguard/{id}` with `Authorization: <token>`
    pub async fn wireguard_config(
        &self,
        token: &str,
        location: &Location,
    ) -> Result<ConfigResponse, Error> {
        let url = self.endpoint(&["configs", "wireguard", &location.id])?;
        debug!(location = %location.id, "requesting WireGuard config");
        self.get(url, Authorization::Raw(token)).await
    }
}
