// Location listing

use tracing::debug;

use crate::client::{ApiClient, Authorization};
use crate::error::Error;
use crate::models::Location;

impl ApiClient {
    /// List every server location available to the token.
    ///
    /// `GET /locations` with `Authorization: <token>`
    pub async fn locations(&self, token: &str) -> Result<Vec<Location>, Error> {
        let url = self.endpoint(&["locations"])?;
        let locations: Vec<Location> = self.get(url, Authorization::Raw(token)).await?;
        debug!(count = locations.len(), "locations fetched");
        Ok(locations)
    }
}
