//! Location listing.

use tabled::Tabled;

use octovpn_config::Settings;
use octovpn_core::{Location, LocationFilter, group_by_country};

use crate::cli::{GlobalOpts, LocationsArgs, OutputFormat};
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct LocationRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Location")]
    label: String,
    #[tabled(rename = "CC")]
    country_code: String,
    #[tabled(rename = "IP")]
    ip: String,
    #[tabled(rename = "Online")]
    online: String,
    #[tabled(rename = "WireGuard")]
    wireguard: String,
}

impl From<&Location> for LocationRow {
    fn from(l: &Location) -> Self {
        Self {
            id: l.id.clone(),
            name: l.name.clone(),
            label: l.label(),
            country_code: l.country_code.clone(),
            ip: l.ip.clone(),
            online: yes_no(l.is_online()),
            wireguard: yes_no(l.has_wireguard()),
        }
    }
}

fn yes_no(v: bool) -> String {
    if v { "yes" } else { "no" }.into()
}

fn filters(args: &LocationsArgs) -> Vec<LocationFilter> {
    let mut filters = Vec::new();
    if let Some(ref cc) = args.country {
        filters.push(LocationFilter::ByCountry(cc.clone()));
    }
    if let Some(ref text) = args.search {
        filters.push(LocationFilter::Search(text.clone()));
    }
    if args.wireguard {
        filters.push(LocationFilter::WireGuard);
    }
    if args.online {
        filters.push(LocationFilter::Online);
    }
    if filters.is_empty() {
        filters.push(LocationFilter::All);
    }
    filters
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    settings: &Settings,
    args: LocationsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let all = super::with_login(settings, |session| async move {
        Ok(session.stores().locations.get())
    })
    .await?;

    let matched: Vec<Location> = LocationFilter::apply(&filters(&args), &all)
        .into_iter()
        .cloned()
        .collect();
    tracing::debug!(total = all.len(), matched = matched.len(), "locations filtered");

    let out = if args.group && matches!(global.output, OutputFormat::Table) {
        group_by_country(&matched)
            .into_iter()
            .map(|(country, locations)| {
                let rows: Vec<LocationRow> =
                    locations.into_iter().map(LocationRow::from).collect();
                let table = tabled::Table::new(rows)
                    .with(tabled::settings::Style::rounded())
                    .to_string();
                format!("{country}\n{table}")
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    } else {
        output::render_list(
            &global.output,
            &matched,
            |l| LocationRow::from(l),
            |l| l.id.clone(),
        )?
    };
    output::print_output(&out, global.quiet);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> LocationsArgs {
        LocationsArgs {
            country: None,
            search: None,
            wireguard: false,
            online: false,
            group: false,
        }
    }

    #[test]
    fn no_flags_means_everything() {
        assert!(matches!(filters(&args()).as_slice(), [LocationFilter::All]));
    }

    #[test]
    fn flags_stack() {
        let a = LocationsArgs {
            country: Some("de".into()),
            wireguard: true,
            ..args()
        };
        assert_eq!(filters(&a).len(), 2);
    }
}
