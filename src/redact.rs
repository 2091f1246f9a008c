// Redaction helpers for log output
// Emails, client addresses and bearer tokens are masked before they reach a log line.

use regex::Regex;
use sha2::{Digest, Sha256};
use std::net::IpAddr;
use std::sync::OnceLock;

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?s)^(?P<head>[^@]{0,2})(?P<rest>[^@]*)(?P<domain>@.*)?$")
            .expect("email mask pattern is a valid regex")
    })
}

/// Mask an email address, keeping the first two characters of the local
/// part and the domain: `alice@example.com` becomes `al***@example.com`
pub fn mask_email(email: &str) -> String {
    match email_pattern().captures(email) {
        Some(caps) => {
            let head = caps.name("head").map_or("", |m| m.as_str());
            let hidden = caps.name("rest").map_or(0, |m| m.as_str().chars().count());
            let domain = caps.name("domain").map_or("", |m| m.as_str());
            format!("{}{}{}", head, "*".repeat(hidden), domain)
        }
        None => "***".to_string(),
    }
}

/// Mask the host part of a client address
///
/// IPv4 loses its last octet (`10.0.0.xxx`), IPv6 its last segment.
/// IPv4-mapped IPv6 addresses are treated as IPv4.
pub fn mask_client_addr(addr: Option<IpAddr>) -> String {
    match addr {
        None => "unknown".to_string(),
        Some(IpAddr::V4(v4)) => {
            let [a, b, c, _] = v4.octets();
            format!("{}.{}.{}.xxx", a, b, c)
        }
        Some(IpAddr::V6(v6)) => match v6.to_ipv4_mapped() {
            Some(v4) => mask_client_addr(Some(IpAddr::V4(v4))),
            None => {
                let segments = v6.segments();
                let kept: Vec<String> = segments[..7].iter().map(|s| format!("{:x}", s)).collect();
                format!("{}:xxxx", kept.join(":"))
            }
        },
    }
}

/// Short SHA-256 fingerprint of a bearer token, for correlating log lines
/// without writing the token itself
pub fn token_fingerprint(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    let hex = format!("{:x}", digest);
    hex[..12].to_string()
}
