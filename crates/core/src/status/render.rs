//! Rendering of the status display.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex_lite::Regex;

use crate::config::default_probe_port;
use crate::platform::{Color, Embed};
use crate::prober::ServerStatus;
use crate::store::StatusTarget;

pub const DISPLAY_TITLE: &str = "Server status";

/// Formatting escapes: the section sign followed by any one character.
static FORMATTING_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)§.").unwrap());

/// Remove formatting escapes from a description.
pub fn strip_formatting(text: &str) -> String {
    FORMATTING_CODE.replace_all(text, "").into_owned()
}

/// Render the display for a probe result. `None` means the probe failed.
pub fn render_status(
    target: &StatusTarget,
    status: Option<&ServerStatus>,
    interval_secs: u64,
    now: DateTime<Utc>,
) -> Embed {
    let online = status.map(|s| s.online).unwrap_or(false);
    let address = if target.port == default_probe_port() {
        target.address.clone()
    } else {
        format!("{}:{}", target.address, target.port)
    };

    let mut embed = Embed::new(
        DISPLAY_TITLE,
        if online { Color::GREEN } else { Color::RED },
    )
    .with_field("Address", address)
    .with_field("Status", if online { "Online" } else { "Offline" });

    if let Some(status) = status.filter(|s| s.online) {
        embed = embed.with_field("Players", players_line(status));

        if !status.sample_names.is_empty() {
            embed = embed.with_wide_field("Online now", status.sample_names.join(", "));
        }

        let motd = status
            .description
            .as_deref()
            .map(strip_formatting)
            .unwrap_or_default();
        let motd = motd.trim();
        if !motd.is_empty() {
            embed = embed.with_wide_field("Message of the day", motd);
        }
    }

    embed
        .with_footer(format!("Updated every {} seconds", interval_secs))
        .with_timestamp(now)
}

fn players_line(status: &ServerStatus) -> String {
    let count = |n: Option<u32>| n.map(|n| n.to_string()).unwrap_or_else(|| "?".to_string());
    format!("{} / {}", count(status.players_online), count(status.players_max))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(port: u16) -> StatusTarget {
        StatusTarget {
            address: "play.example.net".to_string(),
            port,
            channel_id: None,
        }
    }

    #[test]
    fn test_strip_formatting() {
        assert_eq!(strip_formatting("§aHello §l§nworld§r!"), "Hello world!");
        assert_eq!(strip_formatting("no codes"), "no codes");
        // A trailing marker without a code character is left alone.
        assert_eq!(strip_formatting("end§"), "end§");
    }

    #[test]
    fn test_render_online() {
        let status = ServerStatus {
            online: true,
            players_online: Some(3),
            players_max: Some(20),
            version: Some("1.20.4".to_string()),
            description: Some("§6Survival §7server".to_string()),
            sample_names: vec!["alice".to_string(), "bob".to_string()],
        };
        let embed = render_status(&target(25565), Some(&status), 30, Utc::now());

        assert_eq!(embed.title, DISPLAY_TITLE);
        assert_eq!(embed.color, Color::GREEN);
        assert_eq!(embed.field("Address"), Some("play.example.net"));
        assert_eq!(embed.field("Status"), Some("Online"));
        assert_eq!(embed.field("Players"), Some("3 / 20"));
        assert_eq!(embed.field("Online now"), Some("alice, bob"));
        assert_eq!(embed.field("Message of the day"), Some("Survival server"));
        assert_eq!(embed.footer.as_deref(), Some("Updated every 30 seconds"));
    }

    #[test]
    fn test_render_offline_keeps_address_and_port() {
        let embed = render_status(&target(25570), None, 30, Utc::now());

        assert_eq!(embed.color, Color::RED);
        assert_eq!(embed.field("Address"), Some("play.example.net:25570"));
        assert_eq!(embed.field("Status"), Some("Offline"));
        assert!(embed.field("Players").is_none());
        assert!(embed.field("Message of the day").is_none());
    }

    #[test]
    fn test_render_unknown_counts() {
        let status = ServerStatus {
            online: true,
            ..Default::default()
        };
        let embed = render_status(&target(25565), Some(&status), 30, Utc::now());
        assert_eq!(embed.field("Players"), Some("? / ?"));
        assert!(embed.field("Online now").is_none());
    }
}
