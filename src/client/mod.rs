//! Client for the identity server's admin REST API.
//!
//! All calls require a bearer token obtained via [`AdminClient::login`]
//! (resource owner password grant against the master realm).

pub mod error;
pub mod types;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;
use url::Url;

pub use error::ApiError;
pub use types::{
    ClientInitialAccessRepresentation, ClientRepresentation, ClientScopeRepresentation,
    ComponentRepresentation, GroupRepresentation, LdapMapper, MapperKind, RealmRepresentation,
    UserRepresentation,
};

const USER_STORAGE_PROVIDER: &str = "org.keycloak.storage.UserStorageProvider";
const LDAP_MAPPER_PROVIDER: &str = "org.keycloak.storage.ldap.mappers.LDAPStorageMapper";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorResponse {
    error_message: Option<String>,
    error: Option<String>,
}

/// Client for the admin REST API.
///
/// Holds the access token behind an async lock so the client can be shared
/// across pages via `Arc<AdminClient>`.
pub struct AdminClient {
    http: reqwest::Client,
    base: Url,
    token: RwLock<Option<String>>,
}

impl AdminClient {
    /// Create a client against the given server base URL.
    pub fn new(server: &str) -> Result<Self, ApiError> {
        // A trailing slash keeps Url::join from eating the last path segment.
        let normalized = if server.ends_with('/') {
            server.to_string()
        } else {
            format!("{server}/")
        };
        Ok(Self {
            http: reqwest::Client::new(),
            base: Url::parse(&normalized)?,
            token: RwLock::new(None),
        })
    }

    pub fn server_url(&self) -> &str {
        self.base.as_str().trim_end_matches('/')
    }

    /// Obtain an access token via the password grant on the master realm.
    pub async fn login(&self, username: &str, password: &str) -> Result<(), ApiError> {
        let url = self
            .base
            .join("realms/master/protocol/openid-connect/token")?;

        let params = [
            ("grant_type", "password"),
            ("client_id", "admin-cli"),
            ("username", username),
            ("password", password),
        ];

        let response = self.http.post(url).form(&params).send().await?;
        let response = Self::check_status(response).await?;
        let token: TokenResponse = response.json().await?;

        *self.token.write().await = Some(token.access_token);
        tracing::info!("Authenticated as {}", username);
        Ok(())
    }

    // === Realms ===

    pub async fn list_realms(&self) -> Result<Vec<RealmRepresentation>, ApiError> {
        self.get("admin/realms", &[]).await
    }

    pub async fn create_realm(&self, name: &str) -> Result<(), ApiError> {
        let body = serde_json::json!({ "realm": name, "enabled": true });
        self.post("admin/realms".to_string(), &body).await
    }

    pub async fn delete_realm(&self, name: &str) -> Result<(), ApiError> {
        self.delete(format!("admin/realms/{}", encode(name))).await
    }

    // === Clients ===

    pub async fn list_clients(
        &self,
        realm: &str,
        first: Option<usize>,
        max: Option<usize>,
    ) -> Result<Vec<ClientRepresentation>, ApiError> {
        let path = format!("admin/realms/{}/clients", encode(realm));
        self.get(&path, &page_query(first, max)).await
    }

    pub async fn delete_client(&self, realm: &str, id: &str) -> Result<(), ApiError> {
        self.delete(format!(
            "admin/realms/{}/clients/{}",
            encode(realm),
            encode(id)
        ))
        .await
    }

    pub async fn list_client_initial_access(
        &self,
        realm: &str,
    ) -> Result<Vec<ClientInitialAccessRepresentation>, ApiError> {
        let path = format!("admin/realms/{}/clients-initial-access", encode(realm));
        self.get(&path, &[]).await
    }

    pub async fn delete_client_initial_access(&self, realm: &str, id: &str) -> Result<(), ApiError> {
        self.delete(format!(
            "admin/realms/{}/clients-initial-access/{}",
            encode(realm),
            encode(id)
        ))
        .await
    }

    // === Client scopes ===

    pub async fn list_client_scopes(
        &self,
        realm: &str,
    ) -> Result<Vec<ClientScopeRepresentation>, ApiError> {
        let path = format!("admin/realms/{}/client-scopes", encode(realm));
        self.get(&path, &[]).await
    }

    pub async fn delete_client_scope(&self, realm: &str, id: &str) -> Result<(), ApiError> {
        self.delete(format!(
            "admin/realms/{}/client-scopes/{}",
            encode(realm),
            encode(id)
        ))
        .await
    }

    // === Groups ===

    pub async fn list_groups(
        &self,
        realm: &str,
        first: Option<usize>,
        max: Option<usize>,
    ) -> Result<Vec<GroupRepresentation>, ApiError> {
        let path = format!("admin/realms/{}/groups", encode(realm));
        self.get(&path, &page_query(first, max)).await
    }

    pub async fn create_group(&self, realm: &str, name: &str) -> Result<(), ApiError> {
        let body = serde_json::json!({ "name": name });
        self.post(format!("admin/realms/{}/groups", encode(realm)), &body)
            .await
    }

    pub async fn delete_group(&self, realm: &str, id: &str) -> Result<(), ApiError> {
        self.delete(format!(
            "admin/realms/{}/groups/{}",
            encode(realm),
            encode(id)
        ))
        .await
    }

    pub async fn list_group_members(
        &self,
        realm: &str,
        group_id: &str,
        first: Option<usize>,
        max: Option<usize>,
    ) -> Result<Vec<UserRepresentation>, ApiError> {
        let path = format!(
            "admin/realms/{}/groups/{}/members",
            encode(realm),
            encode(group_id)
        );
        self.get(&path, &page_query(first, max)).await
    }

    /// Remove a user's membership in a group. The user itself is untouched.
    pub async fn remove_user_from_group(
        &self,
        realm: &str,
        user_id: &str,
        group_id: &str,
    ) -> Result<(), ApiError> {
        self.delete(format!(
            "admin/realms/{}/users/{}/groups/{}",
            encode(realm),
            encode(user_id),
            encode(group_id)
        ))
        .await
    }

    // === Users ===

    pub async fn list_users(
        &self,
        realm: &str,
        first: Option<usize>,
        max: Option<usize>,
    ) -> Result<Vec<UserRepresentation>, ApiError> {
        let path = format!("admin/realms/{}/users", encode(realm));
        self.get(&path, &page_query(first, max)).await
    }

    pub async fn delete_user(&self, realm: &str, id: &str) -> Result<(), ApiError> {
        self.delete(format!(
            "admin/realms/{}/users/{}",
            encode(realm),
            encode(id)
        ))
        .await
    }

    // === User federation ===

    pub async fn list_user_federation(
        &self,
        realm: &str,
    ) -> Result<Vec<ComponentRepresentation>, ApiError> {
        let path = format!("admin/realms/{}/components", encode(realm));
        self.get(&path, &[("type", USER_STORAGE_PROVIDER.to_string())])
            .await
    }

    pub async fn list_ldap_mappers(
        &self,
        realm: &str,
        provider_id: &str,
    ) -> Result<Vec<LdapMapper>, ApiError> {
        let path = format!("admin/realms/{}/components", encode(realm));
        let components: Vec<ComponentRepresentation> = self
            .get(
                &path,
                &[
                    ("parent", provider_id.to_string()),
                    ("type", LDAP_MAPPER_PROVIDER.to_string()),
                ],
            )
            .await?;
        Ok(components
            .iter()
            .filter_map(LdapMapper::from_component)
            .collect())
    }

    pub async fn delete_component(&self, realm: &str, id: &str) -> Result<(), ApiError> {
        self.delete(format!(
            "admin/realms/{}/components/{}",
            encode(realm),
            encode(id)
        ))
        .await
    }

    // === Plumbing ===

    async fn bearer(&self) -> Result<String, ApiError> {
        self.token
            .read()
            .await
            .clone()
            .ok_or(ApiError::NotAuthenticated)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let mut url = self.base.join(path)?;
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        }
        tracing::debug!("GET {}", url);

        let response = self
            .http
            .get(url)
            .bearer_auth(self.bearer().await?)
            .send()
            .await?;
        let response = Self::check_status(response).await?;
        Ok(response.json().await?)
    }

    async fn post<B: serde::Serialize>(&self, path: String, body: &B) -> Result<(), ApiError> {
        let url = self.base.join(&path)?;
        tracing::debug!("POST {}", url);

        let response = self
            .http
            .post(url)
            .bearer_auth(self.bearer().await?)
            .json(body)
            .send()
            .await?;
        Self::check_status(response).await?;
        Ok(())
    }

    async fn delete(&self, path: String) -> Result<(), ApiError> {
        let url = self.base.join(&path)?;
        tracing::debug!("DELETE {}", url);

        let response = self
            .http
            .delete(url)
            .bearer_auth(self.bearer().await?)
            .send()
            .await?;
        Self::check_status(response).await?;
        Ok(())
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&body)
            .ok()
            .and_then(|e| e.error_message.or(e.error))
            .unwrap_or(body);
        Err(ApiError::Http {
            status: status.as_u16(),
            message,
        })
    }
}

fn encode(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}

/// Build pagination query parameters in the form the server expects.
fn page_query(first: Option<usize>, max: Option<usize>) -> Vec<(&'static str, String)> {
    let mut query = Vec::new();
    if let Some(first) = first {
        query.push(("first", first.to_string()));
    }
    if let Some(max) = max {
        query.push(("max", max.to_string()));
    }
    query
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_query() {
        assert!(page_query(None, None).is_empty());
        assert_eq!(
            page_query(Some(0), Some(10)),
            vec![("first", "0".to_string()), ("max", "10".to_string())]
        );
        assert_eq!(page_query(Some(20), None), vec![("first", "20".to_string())]);
    }

    #[test]
    fn test_path_segments_are_encoded() {
        assert_eq!(encode("my realm"), "my%20realm");
        assert_eq!(encode("a/b"), "a%2Fb");
    }

    #[test]
    fn test_base_url_normalization() {
        let client = AdminClient::new("http://localhost:8080").unwrap();
        assert_eq!(client.server_url(), "http://localhost:8080");

        let client = AdminClient::new("http://localhost:8080/").unwrap();
        assert_eq!(client.server_url(), "http://localhost:8080");
    }

    #[test]
    fn test_error_message_extraction() {
        let parsed: ErrorResponse =
            serde_json::from_str(r#"{"errorMessage":"Realm not found"}"#).unwrap();
        assert_eq!(parsed.error_message.as_deref(), Some("Realm not found"));
    }
}
