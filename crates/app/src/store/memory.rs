//! Process-local settings store.

use std::collections::HashMap;

use async_trait::async_trait;
use hfd_shipping_core::Credentials;
use tokio::sync::RwLock;

use super::{PlatformSession, SettingsStore, StoreError};

/// [`SettingsStore`] backed by two maps behind `RwLock`s.
#[derive(Debug, Default)]
pub struct InMemorySettingsStore {
    credentials: RwLock<HashMap<String, Credentials>>,
    sessions: RwLock<HashMap<String, PlatformSession>>,
}

impl InMemorySettingsStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SettingsStore for InMemorySettingsStore {
    async fn put(&self, shop: &str, credentials: Credentials) -> Result<(), StoreError> {
        self.credentials
            .write()
            .await
            .insert(shop.to_string(), credentials);
        Ok(())
    }

    async fn get(&self, shop: &str) -> Result<Option<Credentials>, StoreError> {
        Ok(self.credentials.read().await.get(shop).cloned())
    }

    async fn put_session(&self, shop: &str, session: PlatformSession) -> Result<(), StoreError> {
        self.sessions.write().await.insert(shop.to_string(), session);
        Ok(())
    }

    async fn get_session(&self, shop: &str) -> Result<Option<PlatformSession>, StoreError> {
        Ok(self.sessions.read().await.get(shop).cloned())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use hfd_shipping_core::ClientNumber;
    use secrecy::{ExposeSecret, SecretString};

    use super::*;

    fn credentials(token: &str, client: i64) -> Credentials {
        Credentials {
            courier_token: SecretString::from(token),
            client_number: Some(ClientNumber::new(client).unwrap()),
            sender_name: Some("Levant Goods".to_string()),
            sender_phone: None,
        }
    }

    #[tokio::test]
    async fn test_put_then_get_returns_stored_credentials() {
        let store = InMemorySettingsStore::new();
        store
            .put("shop-a.myshopify.com", credentials("token-a", 9841))
            .await
            .unwrap();

        let stored = store.get("shop-a.myshopify.com").await.unwrap().unwrap();
        assert_eq!(stored.courier_token.expose_secret(), "token-a");
        assert_eq!(stored.client_number, Some(ClientNumber::new(9841).unwrap()));
        assert_eq!(stored.sender_name.as_deref(), Some("Levant Goods"));
        assert_eq!(stored.sender_phone, None);
    }

    #[tokio::test]
    async fn test_get_unknown_shop_is_absent() {
        let store = InMemorySettingsStore::new();
        store
            .put("shop-a.myshopify.com", credentials("token-a", 9841))
            .await
            .unwrap();

        assert!(store.get("shop-b.myshopify.com").await.unwrap().is_none());
        assert!(store.get_session("shop-a.myshopify.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_put_overwrites_wholesale() {
        let store = InMemorySettingsStore::new();
        store
            .put("shop-a.myshopify.com", credentials("token-a", 9841))
            .await
            .unwrap();

        let mut replacement = credentials("token-b", 1234);
        replacement.sender_name = None;
        store.put("shop-a.myshopify.com", replacement).await.unwrap();

        let stored = store.get("shop-a.myshopify.com").await.unwrap().unwrap();
        assert_eq!(stored.courier_token.expose_secret(), "token-b");
        assert_eq!(stored.client_number, Some(ClientNumber::new(1234).unwrap()));
        assert_eq!(stored.sender_name, None);
    }

    #[tokio::test]
    async fn test_session_round_trip() {
        let store = InMemorySettingsStore::new();
        store
            .put_session(
                "shop-a.myshopify.com",
                PlatformSession {
                    shop: "shop-a.myshopify.com".to_string(),
                    access_token: SecretString::from("shpat_abc"),
                    scope: "read_orders".to_string(),
                    obtained_at: 1_700_000_000,
                },
            )
            .await
            .unwrap();

        let session = store
            .get_session("shop-a.myshopify.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(session.access_token.expose_secret(), "shpat_abc");
        assert_eq!(session.scope, "read_orders");
    }
}
