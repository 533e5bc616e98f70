//! Field-level validation rules shared by the services.

use once_cell::sync::Lazy;
use regex::Regex;
use std::net::Ipv4Addr;

use super::{DomainError, DomainResult};

static PHONE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\+?1?\d{9,15}$").unwrap());

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap());

pub const VLAN_MIN: i32 = 1;
pub const VLAN_MAX: i32 = 4094;

/// Trim and reject blank values for a mandatory text field.
pub fn required(field: &str, value: &str) -> DomainResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(format!("{} must not be empty", field)));
    }
    Ok(trimmed.to_string())
}

/// Normalise an optional text field: blank becomes `None`.
pub fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn phone_number(field: &str, value: Option<String>) -> DomainResult<Option<String>> {
    match optional(value) {
        Some(phone) if !PHONE_RE.is_match(&phone) => Err(DomainError::validation(format!(
            "{}: phone number must be entered in the format '+999999999', up to 15 digits",
            field
        ))),
        other => Ok(other),
    }
}

pub fn email(value: Option<String>) -> DomainResult<Option<String>> {
    match optional(value) {
        Some(email) if !EMAIL_RE.is_match(&email) => Err(DomainError::validation(format!(
            "'{}' is not a valid email address",
            email
        ))),
        other => Ok(other),
    }
}

pub fn vlan_number(number: i32) -> DomainResult<i32> {
    if !(VLAN_MIN..=VLAN_MAX).contains(&number) {
        return Err(DomainError::validation(format!(
            "VLAN number {} is out of range ({}-{})",
            number, VLAN_MIN, VLAN_MAX
        )));
    }
    Ok(number)
}

/// Route distinguisher in `ASN:nn` or `IPv4:nn` form.
pub fn route_distinguisher(value: &str) -> DomainResult<String> {
    let rd = required("RD", value)?;
    let invalid = || {
        DomainError::validation(format!(
            "route distinguisher '{}' must look like 65000:100 or 192.0.2.1:100",
            rd
        ))
    };

    let (admin, assigned) = rd.rsplit_once(':').ok_or_else(invalid)?;
    if assigned.parse::<u32>().is_err() {
        return Err(invalid());
    }
    if admin.parse::<u32>().is_err() && admin.parse::<Ipv4Addr>().is_err() {
        return Err(invalid());
    }
    Ok(rd)
}

/// SNMP credential fields as entered, before persistence.
#[derive(Debug, Clone, Default)]
pub struct SnmpCredentials {
    pub version: i16,
    pub community: Option<String>,
    pub security_level: Option<String>,
    pub auth_algorithm: Option<String>,
    pub auth_password: Option<String>,
    pub priv_algorithm: Option<String>,
    pub priv_password: Option<String>,
}

const SECURITY_LEVELS: [&str; 3] = ["noAuthNoPriv", "authNoPriv", "authPriv"];
const AUTH_ALGORITHMS: [&str; 6] = ["MD5", "SHA", "SHA224", "SHA256", "SHA384", "SHA512"];
const PRIV_ALGORITHMS: [&str; 5] = ["DES", "3DES", "AES", "AES192", "AES256"];

/// Version 1/2 groups need a community; version 3 groups need the auth and
/// privacy fields their security level implies.
pub fn snmp_credentials(mut creds: SnmpCredentials) -> DomainResult<SnmpCredentials> {
    creds.community = optional(creds.community);
    creds.security_level = optional(creds.security_level);
    creds.auth_algorithm = optional(creds.auth_algorithm).map(|a| a.to_ascii_uppercase());
    creds.auth_password = optional(creds.auth_password);
    creds.priv_algorithm = optional(creds.priv_algorithm).map(|a| a.to_ascii_uppercase());
    creds.priv_password = optional(creds.priv_password);

    match creds.version {
        1 | 2 => {
            if creds.community.is_none() {
                return Err(DomainError::validation(format!(
                    "SNMPv{} groups require a community string",
                    creds.version
                )));
            }
        }
        3 => {
            let level = creds.security_level.clone().ok_or_else(|| {
                DomainError::validation("SNMPv3 groups require a security level")
            })?;
            if !SECURITY_LEVELS.contains(&level.as_str()) {
                return Err(DomainError::validation(format!(
                    "unknown SNMPv3 security level '{}'",
                    level
                )));
            }
            if level != "noAuthNoPriv" {
                check_algorithm("auth", &creds.auth_algorithm, &AUTH_ALGORITHMS)?;
                if creds.auth_password.is_none() {
                    return Err(DomainError::validation(format!(
                        "security level {} requires an authentication password",
                        level
                    )));
                }
            }
            if level == "authPriv" {
                check_algorithm("privacy", &creds.priv_algorithm, &PRIV_ALGORITHMS)?;
                if creds.priv_password.is_none() {
                    return Err(DomainError::validation(
                        "security level authPriv requires a privacy password",
                    ));
                }
            }
        }
        other => {
            return Err(DomainError::validation(format!(
                "unsupported SNMP version {}",
                other
            )));
        }
    }

    Ok(creds)
}

fn check_algorithm(kind: &str, value: &Option<String>, allowed: &[&str]) -> DomainResult<()> {
    match value {
        Some(alg) if allowed.contains(&alg.as_str()) => Ok(()),
        Some(alg) => Err(DomainError::validation(format!(
            "unknown SNMPv3 {} algorithm '{}'",
            kind, alg
        ))),
        None => Err(DomainError::validation(format!(
            "SNMPv3 {} algorithm is required",
            kind
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_numbers() {
        assert!(phone_number("phone", Some("+41791234567".into())).is_ok());
        assert_eq!(phone_number("phone", Some("  ".into())).unwrap(), None);
        assert!(phone_number("phone", Some("12-34".into())).is_err());
    }

    #[test]
    fn emails() {
        assert!(email(Some("ops@example.com".into())).is_ok());
        assert!(email(Some("ops.example.com".into())).is_err());
        assert_eq!(email(None).unwrap(), None);
    }

    #[test]
    fn route_distinguishers() {
        assert!(route_distinguisher("65000:100").is_ok());
        assert!(route_distinguisher("192.0.2.1:7").is_ok());
        assert!(route_distinguisher("65000").is_err());
        assert!(route_distinguisher("abc:1").is_err());
        assert!(route_distinguisher("").is_err());
    }

    #[test]
    fn vlan_range() {
        assert!(vlan_number(1).is_ok());
        assert!(vlan_number(4094).is_ok());
        assert!(vlan_number(0).is_err());
        assert!(vlan_number(4095).is_err());
    }

    #[test]
    fn snmp_v2_needs_community() {
        let creds = SnmpCredentials {
            version: 2,
            ..Default::default()
        };
        assert!(snmp_credentials(creds).is_err());

        let creds = SnmpCredentials {
            version: 2,
            community: Some("public".into()),
            ..Default::default()
        };
        assert!(snmp_credentials(creds).is_ok());
    }

    #[test]
    fn snmp_v3_levels() {
        let auth_only = SnmpCredentials {
            version: 3,
            security_level: Some("authNoPriv".into()),
            auth_algorithm: Some("sha".into()),
            auth_password: Some("secret123".into()),
            ..Default::default()
        };
        let ok = snmp_credentials(auth_only.clone()).unwrap();
        assert_eq!(ok.auth_algorithm.as_deref(), Some("SHA"));

        let missing_priv = SnmpCredentials {
            security_level: Some("authPriv".into()),
            ..auth_only
        };
        assert!(snmp_credentials(missing_priv).is_err());

        let bad_version = SnmpCredentials {
            version: 4,
            ..Default::default()
        };
        assert!(snmp_credentials(bad_version).is_err());
    }
}
