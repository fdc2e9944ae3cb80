//! Emulator host normalization and validation

use std::net::IpAddr;

use tokio::net::lookup_host;

use crate::error::{Error, Result};

/// Host used when the configuration leaves it empty
pub const DEFAULT_HOST: &str = "localhost:8085";

/// Trim, default an empty host and give a bare `:port` the `localhost` hostname
pub fn normalize_host(host: &str) -> String {
    let host = host.trim();

    if host.is_empty() {
        return DEFAULT_HOST.to_string();
    }
    if host.starts_with(':') {
        return format!("localhost{}", host);
    }
    host.to_string()
}

/// Check that `host` is an IP literal or a resolvable hostname, with an
/// optional port in `1..=65535`
///
/// IPv6 literals are only accepted in brackets, as in `[::1]:8085`.
pub async fn validate_host(host: &str) -> Result<()> {
    let (hostname, port) = split_host_port(host)?;

    if let Some(port) = port {
        match port.parse::<u16>() {
            Ok(p) if p >= 1 => {}
            _ => {
                return Err(Error::InvalidHost(format!(
                    "'{}': port '{}' is not in 1..=65535",
                    host, port
                )))
            }
        }
    }

    let hostname = if hostname.is_empty() { "localhost" } else { hostname };
    if hostname.parse::<IpAddr>().is_ok() {
        return Ok(());
    }

    let mut addrs = lookup_host((hostname, 0))
        .await
        .map_err(|e| Error::InvalidHost(format!("'{}': {}", host, e)))?;
    if addrs.next().is_none() {
        return Err(Error::InvalidHost(format!(
            "'{}': hostname resolves to no address",
            host
        )));
    }

    Ok(())
}

/// Split `host[:port]`; IPv6 literals must be bracketed
fn split_host_port(host: &str) -> Result<(&str, Option<&str>)> {
    if let Some(rest) = host.strip_prefix('[') {
        let (ip, after) = rest
            .split_once(']')
            .ok_or_else(|| Error::InvalidHost(format!("'{}': missing ']'", host)))?;
        if ip.parse::<std::net::Ipv6Addr>().is_err() {
            return Err(Error::InvalidHost(format!(
                "'{}': '{}' is not an IPv6 address",
                host, ip
            )));
        }
        return match after {
            "" => Ok((ip, None)),
            _ => match after.strip_prefix(':') {
                Some(port) => Ok((ip, Some(port))),
                None => Err(Error::InvalidHost(format!(
                    "'{}': unexpected '{}' after address",
                    host, after
                ))),
            },
        };
    }

    if host.matches(':').count() > 1 {
        return Err(Error::InvalidHost(format!(
            "'{}': IPv6 addresses must be written as [addr] or [addr]:port",
            host
        )));
    }

    match host.rsplit_once(':') {
        Some((hostname, port)) => Ok((hostname, Some(port))),
        None => Ok((host, None)),
    }
}
