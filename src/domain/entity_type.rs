//! Discriminators for the polymorphic side tables (tags and custom fields).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{DomainError, DomainResult};

/// Entity kinds that can carry tags or custom attributes.
///
/// Stored as text in `tagged_items.entity_type` and `eav_values.entity_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Network,
    Ip,
    Vlan,
    Vrf,
    Asset,
    Line,
    Site,
    DnsServerGroup,
}

impl EntityType {
    pub const ALL: [EntityType; 8] = [
        EntityType::Network,
        EntityType::Ip,
        EntityType::Vlan,
        EntityType::Vrf,
        EntityType::Asset,
        EntityType::Line,
        EntityType::Site,
        EntityType::DnsServerGroup,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Network => "network",
            EntityType::Ip => "ip",
            EntityType::Vlan => "vlan",
            EntityType::Vrf => "vrf",
            EntityType::Asset => "asset",
            EntityType::Line => "line",
            EntityType::Site => "site",
            EntityType::DnsServerGroup => "dns_server_group",
        }
    }

    /// Only networks and IP records are registered for custom attributes.
    pub fn supports_custom_fields(&self) -> bool {
        matches!(self, EntityType::Network | EntityType::Ip)
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        EntityType::ALL
            .into_iter()
            .find(|t| t.as_str() == wanted)
            .ok_or_else(|| DomainError::validation(format!("unknown entity type '{}'", s)))
    }
}

/// Datatype of a custom attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AttributeType {
    Text,
    Float,
    Int,
    Date,
    Boolean,
}

impl AttributeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttributeType::Text => "TEXT",
            AttributeType::Float => "FLOAT",
            AttributeType::Int => "INT",
            AttributeType::Date => "DATE",
            AttributeType::Boolean => "BOOLEAN",
        }
    }
}

impl FromStr for AttributeType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "TEXT" => Ok(AttributeType::Text),
            "FLOAT" => Ok(AttributeType::Float),
            "INT" => Ok(AttributeType::Int),
            "DATE" => Ok(AttributeType::Date),
            "BOOLEAN" => Ok(AttributeType::Boolean),
            _ => Err(DomainError::InvalidFieldType(s.to_string())),
        }
    }
}

/// A typed custom attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Boolean(bool),
    Int(i64),
    Float(f64),
    /// TEXT and DATE values; dates are `YYYY-MM-DD`
    Text(String),
}

impl AttributeValue {
    /// Coerce a value into the representation required by `datatype`.
    ///
    /// Integers are accepted for FLOAT attributes; everything else must match.
    pub fn coerce(self, datatype: AttributeType) -> DomainResult<AttributeValue> {
        let mismatch = |v: &AttributeValue| {
            DomainError::validation(format!(
                "value {:?} does not match attribute type {}",
                v,
                datatype.as_str()
            ))
        };

        match (datatype, self) {
            (AttributeType::Text, AttributeValue::Text(s)) => Ok(AttributeValue::Text(s)),
            (AttributeType::Int, AttributeValue::Int(i)) => Ok(AttributeValue::Int(i)),
            (AttributeType::Float, AttributeValue::Float(f)) => Ok(AttributeValue::Float(f)),
            (AttributeType::Float, AttributeValue::Int(i)) => Ok(AttributeValue::Float(i as f64)),
            (AttributeType::Boolean, AttributeValue::Boolean(b)) => Ok(AttributeValue::Boolean(b)),
            (AttributeType::Date, AttributeValue::Text(s)) => {
                chrono::NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
                    .map(|d| AttributeValue::Text(d.format("%Y-%m-%d").to_string()))
                    .map_err(|_| {
                        DomainError::validation(format!("'{}' is not a YYYY-MM-DD date", s))
                    })
            }
            (_, other) => Err(mismatch(&other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_types_round_trip_through_text() {
        for t in EntityType::ALL {
            assert_eq!(t.as_str().parse::<EntityType>().unwrap(), t);
        }
        assert!("router".parse::<EntityType>().is_err());
    }

    #[test]
    fn unknown_type_token_is_invalid_field_type() {
        assert_eq!("text".parse::<AttributeType>().unwrap(), AttributeType::Text);
        assert!(matches!(
            "BOGUS".parse::<AttributeType>(),
            Err(DomainError::InvalidFieldType(t)) if t == "BOGUS"
        ));
    }

    #[test]
    fn coercion() {
        assert_eq!(
            AttributeValue::Int(3).coerce(AttributeType::Float).unwrap(),
            AttributeValue::Float(3.0)
        );
        assert!(AttributeValue::Text("x".into())
            .coerce(AttributeType::Boolean)
            .is_err());
        assert!(AttributeValue::Text("2024-02-30".into())
            .coerce(AttributeType::Date)
            .is_err());
        assert_eq!(
            AttributeValue::Text("2024-02-29".into())
                .coerce(AttributeType::Date)
                .unwrap(),
            AttributeValue::Text("2024-02-29".into())
        );
    }
}
