// ── Location browsing ──
//
// Filter predicates and country grouping over the fetched location list.
// Used by consumers to build the region/country/city picker without
// re-querying the API.

use indexmap::IndexMap;

pub use octovpn_api::{Account, Location};

/// Filter predicate for location lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocationFilter {
    All,
    /// Case-insensitive ISO country code match.
    ByCountry(String),
    Online,
    WireGuard,
    /// Case-insensitive substring over name, city and country.
    Search(String),
}

impl LocationFilter {
    pub fn matches(&self, location: &Location) -> bool {
        match self {
            Self::All => true,
            Self::ByCountry(code) => location.country_code.eq_ignore_ascii_case(code),
            Self::Online => location.is_online(),
            Self::WireGuard => location.has_wireguard(),
            Self::Search(needle) => {
                let needle = needle.trim().to_lowercase();
                needle.is_empty()
                    || [
                        Some(location.name.as_str()),
                        location.city.as_deref(),
                        Some(location.country.as_str()),
                    ]
                    .into_iter()
                    .flatten()
                    .any(|field| field.to_lowercase().contains(&needle))
            }
        }
    }

    /// Apply every filter in `filters` (logical AND).
    pub fn apply<'a>(filters: &[LocationFilter], locations: &'a [Location]) -> Vec<&'a Location> {
        locations
            .iter()
            .filter(|loc| filters.iter().all(|f| f.matches(loc)))
            .collect()
    }
}

/// Group locations by country, keeping countries in first-appearance order.
pub fn group_by_country(locations: &[Location]) -> IndexMap<String, Vec<&Location>> {
    let mut groups: IndexMap<String, Vec<&Location>> = IndexMap::new();
    for location in locations {
        groups
            .entry(location.country.clone())
            .or_default()
            .push(location);
    }
    groups
}
