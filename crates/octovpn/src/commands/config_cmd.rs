//! Config command handlers.
//!
//! These edit `config.json` through the file backend directly; no
//! session or network access is involved.

use serde::Serialize;

use octovpn_config::{FileBackend, Settings};
use octovpn_core::{Config, NativeBackend};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output;

use super::util;

/// `config.json` as shown to the user; the password never leaves the file.
#[derive(Serialize)]
struct ConfigView {
    username: Option<String>,
    password_saved: bool,
    theme: String,
    discord_rpc: bool,
    protocol: Option<String>,
}

impl From<&Config> for ConfigView {
    fn from(c: &Config) -> Self {
        Self {
            username: c.credentials.as_ref().map(|cr| cr.username.clone()),
            password_saved: c.credentials.is_some(),
            theme: c.theme.clone(),
            discord_rpc: c.discord_rpc,
            protocol: c.protocol.map(|p| p.to_string()),
        }
    }
}

fn detail(v: &ConfigView) -> String {
    [
        format!("Username:     {}", v.username.as_deref().unwrap_or("-")),
        format!("Password:     {}", if v.password_saved { "saved" } else { "-" }),
        format!("Protocol:     {}", v.protocol.as_deref().unwrap_or("-")),
        format!("Theme:        {}", v.theme),
        format!("Discord RPC:  {}", v.discord_rpc),
    ]
    .join("\n")
}

pub async fn handle(settings: &Settings, args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let backend = FileBackend::from_settings(settings);

    match args.command {
        ConfigCommand::Show => {
            let cfg = backend.load_config().await?;
            let view = ConfigView::from(&cfg);
            let out = output::render_single(&global.output, &view, detail, |v| {
                v.username.clone().unwrap_or_default()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(
                &format!(
                    "config:   {}\nsettings: {}",
                    backend.config_path().display(),
                    config::settings_path(global).display()
                ),
                global.quiet,
            );
            Ok(())
        }

        ConfigCommand::SetProtocol { protocol } => {
            let mut cfg = backend.load_config().await?;
            cfg.protocol = Some(protocol);
            backend.save_config(&cfg).await?;
            if !global.quiet {
                eprintln!("Protocol set to {protocol}");
            }
            Ok(())
        }

        ConfigCommand::SetTheme { theme } => {
            if theme.trim().is_empty() {
                return Err(CliError::Validation {
                    field: "theme".into(),
                    reason: "must not be empty".into(),
                });
            }
            let mut cfg = backend.load_config().await?;
            cfg.theme = theme;
            backend.save_config(&cfg).await?;
            if !global.quiet {
                eprintln!("Theme set to {}", cfg.theme);
            }
            Ok(())
        }

        ConfigCommand::Forget => {
            let mut cfg = backend.load_config().await?;
            let Some(credentials) = cfg.credentials.take() else {
                if !global.quiet {
                    eprintln!("No saved credentials");
                }
                return Ok(());
            };
            if !util::confirm(
                &format!("Forget saved login for {}?", credentials.username),
                global.yes,
                "config forget",
            )? {
                return Ok(());
            }
            backend.forget_password(&credentials)?;
            backend.save_config(&cfg).await?;
            if !global.quiet {
                eprintln!("Saved credentials removed");
            }
            Ok(())
        }
    }
}
