//! Push notification registration.

use serde::{Deserialize, Serialize};

use crate::client::ApiClient;
use crate::error::ApiResult;
use crate::http::Transport;
use crate::tokens::TokenStorage;

/// Serialized Web Push subscription, in the browser's JSON shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushSubscription {
    pub endpoint: String,
    #[serde(rename = "expirationTime", default)]
    pub expiration_time: Option<u64>,
    pub keys: PushKeys,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushKeys {
    pub p256dh: String,
    pub auth: String,
}

#[derive(Debug, Serialize)]
struct SubscriptionEnvelope<'a> {
    subscription: &'a PushSubscription,
}

#[derive(Debug, Deserialize)]
struct VapidKeyResponse {
    public_key: String,
}

impl<T: Transport, S: TokenStorage> ApiClient<T, S> {
    /// Application server key the push service needs to create a subscription.
    pub async fn vapid_public_key(&self) -> ApiResult<String> {
        let response: VapidKeyResponse = self.get("/notifications/push/vapid-public-key").await?;
        Ok(response.public_key)
    }

    pub async fn push_subscribe(&self, subscription: &PushSubscription) -> ApiResult<serde_json::Value> {
        self.post(
            "/notifications/push/subscribe",
            &SubscriptionEnvelope { subscription },
        )
        .await
    }

    pub async fn push_unsubscribe(&self, subscription: &PushSubscription) -> ApiResult<serde_json::Value> {
        self.post(
            "/notifications/push/unsubscribe",
            &SubscriptionEnvelope { subscription },
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscription_uses_browser_field_names() {
        let subscription = PushSubscription {
            endpoint: "https://push.example/abc".to_owned(),
            expiration_time: None,
            keys: PushKeys {
                p256dh: "key".to_owned(),
                auth: "secret".to_owned(),
            },
        };
        let json = serde_json::to_value(SubscriptionEnvelope {
            subscription: &subscription,
        })
        .expect("serialize");

        assert_eq!(
            json,
            serde_json::json!({
                "subscription": {
                    "endpoint": "https://push.example/abc",
                    "expirationTime": null,
                    "keys": {"p256dh": "key", "auth": "secret"}
                }
            })
        );
    }
}
