//! Wire representations of admin API resources.
//!
//! Field names follow the server's JSON (camelCase). Only the fields the
//! console displays or acts on are modeled; unknown fields are ignored.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RealmRepresentation {
    pub id: Option<String>,
    pub realm: String,
    pub display_name: Option<String>,
    pub enabled: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientRepresentation {
    pub id: Option<String>,
    pub client_id: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub protocol: Option<String>,
    pub enabled: Option<bool>,
    pub public_client: Option<bool>,
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientScopeRepresentation {
    pub id: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub protocol: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GroupRepresentation {
    pub id: Option<String>,
    pub name: String,
    pub path: Option<String>,
    pub sub_group_count: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserRepresentation {
    pub id: Option<String>,
    pub username: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub enabled: Option<bool>,
    /// Milliseconds since the epoch.
    pub created_timestamp: Option<i64>,
}

/// An initial access token for dynamic client registration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientInitialAccessRepresentation {
    pub id: Option<String>,
    /// Seconds since the epoch.
    pub timestamp: Option<i64>,
    /// Lifetime in seconds, counted from `timestamp`.
    pub expiration: Option<i64>,
    pub count: Option<u64>,
    pub remaining_count: Option<u64>,
}

/// A generic server component (storage providers, their mappers, ...).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ComponentRepresentation {
    pub id: Option<String>,
    pub name: Option<String>,
    pub provider_id: Option<String>,
    pub provider_type: Option<String>,
    pub parent_id: Option<String>,
    pub config: HashMap<String, Vec<String>>,
}

/// The kind of an LDAP attribute mapper, decoded once from the component's
/// provider id so pages never re-parse provider strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapperKind {
    Role,
    Group,
    UserAttribute {
        ldap_attribute: String,
        user_model_attribute: String,
    },
    FullName,
    /// A provider this console has no dedicated handling for.
    Other(String),
}

impl MapperKind {
    pub fn label(&self) -> String {
        match self {
            Self::Role => "role".to_string(),
            Self::Group => "group".to_string(),
            Self::UserAttribute {
                ldap_attribute,
                user_model_attribute,
            } => format!("attribute ({ldap_attribute} → {user_model_attribute})"),
            Self::FullName => "full name".to_string(),
            Self::Other(provider) => provider.clone(),
        }
    }
}

/// An LDAP federation mapper with its provider decoded into [`MapperKind`].
#[derive(Debug, Clone)]
pub struct LdapMapper {
    pub id: String,
    pub name: String,
    pub kind: MapperKind,
}

impl LdapMapper {
    /// Decode a raw component into a typed mapper.
    ///
    /// Returns `None` when the component has no id (the server always
    /// assigns one, so this only guards against partial responses).
    pub fn from_component(component: &ComponentRepresentation) -> Option<Self> {
        let id = component.id.clone()?;
        let name = component.name.clone().unwrap_or_else(|| id.clone());
        let provider = component.provider_id.as_deref().unwrap_or_default();

        let first_config = |key: &str| -> String {
            component
                .config
                .get(key)
                .and_then(|values| values.first())
                .cloned()
                .unwrap_or_default()
        };

        let kind = match provider {
            "role-ldap-mapper" => MapperKind::Role,
            "group-ldap-mapper" => MapperKind::Group,
            "user-attribute-ldap-mapper" => MapperKind::UserAttribute {
                ldap_attribute: first_config("ldap.attribute"),
                user_model_attribute: first_config("user.model.attribute"),
            },
            "full-name-ldap-mapper" => MapperKind::FullName,
            other => MapperKind::Other(other.to_string()),
        };

        Some(Self { id, name, kind })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn component(provider: &str, config: &[(&str, &str)]) -> ComponentRepresentation {
        ComponentRepresentation {
            id: Some("c1".to_string()),
            name: Some("mapper".to_string()),
            provider_id: Some(provider.to_string()),
            config: config
                .iter()
                .map(|(k, v)| ((*k).to_string(), vec![(*v).to_string()]))
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_decode_role_mapper() {
        let mapper = LdapMapper::from_component(&component("role-ldap-mapper", &[])).unwrap();
        assert_eq!(mapper.kind, MapperKind::Role);
    }

    #[test]
    fn test_decode_user_attribute_mapper() {
        let mapper = LdapMapper::from_component(&component(
            "user-attribute-ldap-mapper",
            &[("ldap.attribute", "mail"), ("user.model.attribute", "email")],
        ))
        .unwrap();
        assert_eq!(
            mapper.kind,
            MapperKind::UserAttribute {
                ldap_attribute: "mail".to_string(),
                user_model_attribute: "email".to_string(),
            }
        );
    }

    #[test]
    fn test_unknown_provider_is_preserved() {
        let mapper =
            LdapMapper::from_component(&component("hardcoded-ldap-attribute-mapper", &[])).unwrap();
        assert_eq!(
            mapper.kind,
            MapperKind::Other("hardcoded-ldap-attribute-mapper".to_string())
        );
    }

    #[test]
    fn test_component_without_id_is_skipped() {
        let mut c = component("role-ldap-mapper", &[]);
        c.id = None;
        assert!(LdapMapper::from_component(&c).is_none());
    }

    #[test]
    fn test_initial_access_deserialization() {
        let token: ClientInitialAccessRepresentation = serde_json::from_str(
            r#"{"id":"t1","timestamp":1724400000,"expiration":86400,"count":5,"remainingCount":3}"#,
        )
        .unwrap();
        assert_eq!(token.id.as_deref(), Some("t1"));
        assert_eq!(token.remaining_count, Some(3));
    }

    #[test]
    fn test_realm_deserialization_ignores_unknown_fields() {
        let realm: RealmRepresentation = serde_json::from_str(
            r#"{"id":"r1","realm":"master","displayName":"Master","enabled":true,"sslRequired":"external"}"#,
        )
        .unwrap();
        assert_eq!(realm.realm, "master");
        assert_eq!(realm.display_name.as_deref(), Some("Master"));
        assert_eq!(realm.enabled, Some(true));
    }
}
