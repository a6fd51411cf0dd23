// ── Control-plane seam ──
//
// The session talks to the REST API through this trait so tests can
// script responses. `ApiClient` is the production implementation.

use futures_util::future::BoxFuture;
use octovpn_api::{ApiClient, OpenVpnTransport};

use crate::error::CoreError;
use crate::model::{Account, Credentials, Location};

/// Remote API operations the session depends on.
pub trait ControlPlane: Send + Sync {
    /// Exchange credentials for a session token.
    fn login<'a>(&'a self, credentials: &'a Credentials) -> BoxFuture<'a, Result<String, CoreError>>;

    /// Invalidate a token; returns the server's message.
    fn logout<'a>(&'a self, token: &'a str) -> BoxFuture<'a, Result<String, CoreError>>;

    fn account<'a>(&'a self, token: &'a str) -> BoxFuture<'a, Result<Account, CoreError>>;

    fn locations<'a>(&'a self, token: &'a str) -> BoxFuture<'a, Result<Vec<Location>, CoreError>>;

    fn openvpn_config<'a>(
        &'a self,
        token: &'a str,
        location: &'a Location,
        transport: OpenVpnTransport,
    ) -> BoxFuture<'a, Result<String, CoreError>>;

    fn wireguard_config<'a>(
        &'a self,
        token: &'a str,
        location: &'a Location,
    ) -> BoxFuture<'a, Result<String, CoreError>>;
}

impl ControlPlane for ApiClient {
    fn login<'a>(&'a self, credentials: &'a Credentials) -> BoxFuture<'a, Result<String, CoreError>> {
        Box::pin(async move {
            let resp = ApiClient::login(self, &credentials.username, &credentials.password).await?;
            Ok(resp.token)
        })
    }

    fn logout<'a>(&'a self, token: &'a str) -> BoxFuture<'a, Result<String, CoreError>> {
        Box::pin(async move { Ok(ApiClient::logout(self, token).await?.message) })
    }

    fn account<'a>(&'a self, token: &'a str) -> BoxFuture<'a, Result<Account, CoreError>> {
        Box::pin(async move { Ok(ApiClient::account(self, token).await?) })
    }

    fn locations<'a>(&'a self, token: &'a str) -> BoxFuture<'a, Result<Vec<Location>, CoreError>> {
        Box::pin(async move { Ok(ApiClient::locations(self, token).await?) })
    }

    fn openvpn_config<'a>(
        &'a self,
        token: &'a str,
        location: &'a Location,
        transport: OpenVpnTransport,
    ) -> BoxFuture<'a, Result<String, CoreError>> {
        Box::pin(async move {
            Ok(ApiClient::openvpn_config(self, token, location, transport)
                .await?
                .config)
        })
    }

    fn wireguard_config<'a>(
        &'a self,
        token: &'a str,
        location: &'a Location,
    ) -> BoxFuture<'a, Result<String, CoreError>> {
        Box::pin(async move {
            Ok(ApiClient::wireguard_config(self, token, location)
                .await?
                .config)
        })
    }
}
