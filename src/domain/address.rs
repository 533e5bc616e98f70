//! Address value helpers: CIDR parsing, containment and MAC canonicalisation.
//!
//! Addresses are persisted as their canonical text form so that equality in the
//! database matches equality of the parsed value.

use ipnet::IpNet;
use std::net::IpAddr;

use super::{DomainError, DomainResult};

/// Parse a single IPv4 or IPv6 address and return it in canonical form.
pub fn parse_address(raw: &str) -> DomainResult<IpAddr> {
    raw.trim()
        .parse::<IpAddr>()
        .map_err(|_| DomainError::validation(format!("'{}' is not a valid IP address", raw)))
}

/// Build a network prefix from an address and a mask/prefix length.
///
/// The address must be the network address of the prefix: `10.0.0.0/24` is
/// accepted, `10.0.0.5/24` is not.
pub fn parse_network(ip_address: &str, mask: i32) -> DomainResult<IpNet> {
    let addr = parse_address(ip_address)?;
    let max = max_prefix_len(&addr);

    if mask < 0 || mask > i32::from(max) {
        return Err(DomainError::validation(format!(
            "mask /{} is out of range for {} (0-{})",
            mask, addr, max
        )));
    }

    let net = IpNet::new(addr, mask as u8)
        .map_err(|_| DomainError::validation(format!("invalid prefix {}/{}", addr, mask)))?;

    if net.network() != addr {
        return Err(DomainError::validation(format!(
            "{}/{} has host bits set; the network address is {}",
            addr,
            mask,
            net.trunc()
        )));
    }

    Ok(net)
}

/// 4 or 6, matching the `ip_version` column.
pub fn ip_version(addr: &IpAddr) -> i32 {
    match addr {
        IpAddr::V4(_) => 4,
        IpAddr::V6(_) => 6,
    }
}

fn max_prefix_len(addr: &IpAddr) -> u8 {
    match addr {
        IpAddr::V4(_) => 32,
        IpAddr::V6(_) => 128,
    }
}

/// True when `inner` is strictly more specific than `outer` and lies inside it.
pub fn is_strict_supernet(outer: &IpNet, inner: &IpNet) -> bool {
    outer.prefix_len() < inner.prefix_len() && outer.contains(inner)
}

/// True when either prefix contains the other.
pub fn overlaps(a: &IpNet, b: &IpNet) -> bool {
    a.contains(b) || b.contains(a)
}

/// Number of assignable host addresses in a prefix.
///
/// IPv4 prefixes shorter than /31 lose the network and broadcast addresses.
/// IPv6 sizes saturate at `u128::MAX`.
pub fn usable_hosts(net: &IpNet) -> u128 {
    let host_bits = u32::from(net.max_prefix_len() - net.prefix_len());
    let size = 1u128.checked_shl(host_bits).unwrap_or(u128::MAX);

    match net {
        IpNet::V4(_) if net.prefix_len() < 31 => size - 2,
        _ => size,
    }
}

/// Percentage of usable hosts occupied, clamped to 0..=100.
pub fn utilization_percent(used: u64, net: &IpNet) -> i16 {
    let capacity = usable_hosts(net);
    if capacity == 0 {
        return 0;
    }
    let pct = (u128::from(used) * 100) / capacity;
    pct.min(100) as i16
}

/// Canonicalise a MAC address to lowercase colon-separated octets.
///
/// Accepts `00:11:22:33:44:55`, `00-11-22-33-44-55`, `0011.2233.4455` and
/// `001122334455`.
pub fn normalize_mac(raw: &str) -> DomainResult<String> {
    let invalid = || DomainError::validation(format!("'{}' is not a valid MAC address", raw));

    let hex: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, ':' | '-' | '.'))
        .collect();

    if hex.len() != 12 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }

    let octets: Vec<String> = hex
        .to_ascii_lowercase()
        .as_bytes()
        .chunks(2)
        .map(|pair| String::from_utf8_lossy(pair).into_owned())
        .collect();

    Ok(octets.join(":"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_canonical_networks() {
        let net = parse_network("10.0.0.0", 24).unwrap();
        assert_eq!(net.to_string(), "10.0.0.0/24");

        let v6 = parse_network("2001:db8::", 32).unwrap();
        assert_eq!(v6.prefix_len(), 32);
    }

    #[test]
    fn rejects_host_bits_and_bad_masks() {
        assert!(parse_network("10.0.0.5", 24).is_err());
        assert!(parse_network("10.0.0.0", 33).is_err());
        assert!(parse_network("10.0.0.0", -1).is_err());
        assert!(parse_network("not-an-ip", 24).is_err());
        assert!(parse_network("2001:db8::", 129).is_err());
    }

    #[test]
    fn supernet_checks_are_strict() {
        let a = parse_network("10.0.0.0", 8).unwrap();
        let b = parse_network("10.1.0.0", 16).unwrap();
        assert!(is_strict_supernet(&a, &b));
        assert!(!is_strict_supernet(&b, &a));
        assert!(!is_strict_supernet(&a, &a));
        assert!(overlaps(&a, &b));

        let c = parse_network("192.168.0.0", 16).unwrap();
        assert!(!overlaps(&a, &c));
    }

    #[test]
    fn host_counts() {
        assert_eq!(usable_hosts(&parse_network("10.0.0.0", 24).unwrap()), 254);
        assert_eq!(usable_hosts(&parse_network("10.0.0.0", 31).unwrap()), 2);
        assert_eq!(usable_hosts(&parse_network("10.0.0.1", 32).unwrap()), 1);
        assert_eq!(usable_hosts(&parse_network("::", 0).unwrap()), u128::MAX);

        let net = parse_network("10.0.0.0", 30).unwrap();
        assert_eq!(utilization_percent(1, &net), 50);
        assert_eq!(utilization_percent(5, &net), 100);
    }

    #[test]
    fn mac_forms() {
        assert_eq!(
            normalize_mac("00-1A-2b-3C-4d-5E").unwrap(),
            "00:1a:2b:3c:4d:5e"
        );
        assert_eq!(normalize_mac("001a.2b3c.4d5e").unwrap(), "00:1a:2b:3c:4d:5e");
        assert!(normalize_mac("00:11:22:33:44").is_err());
        assert!(normalize_mac("zz:11:22:33:44:55").is_err());
    }
}
