use anyhow::{Context as _, Result};
use erate_client::DefaultClient;
use erate_client::v1::{PushKeys, PushSubscription};
use tracing::instrument;

use crate::cli::{PushAction, PushArgs};
use crate::output::Output;

fn subscription(args: PushArgs) -> PushSubscription {
    PushSubscription {
        endpoint: args.endpoint,
        expiration_time: None,
        keys: PushKeys {
            p256dh: args.p256dh,
            auth: args.auth,
        },
    }
}

#[instrument(skip_all, name = "push")]
pub async fn run_push(client: &DefaultClient, action: PushAction) -> Result<()> {
    let out = Output::new();
    match action {
        PushAction::Key => {
            let key = client
                .vapid_public_key()
                .await
                .context("Failed to fetch VAPID public key")?;
            out.print(key);
        }
        PushAction::Subscribe(args) => {
            client
                .push_subscribe(&subscription(args))
                .await
                .context("Failed to subscribe")?;
            out.success("Push notifications enabled");
        }
        PushAction::Unsubscribe(args) => {
            client
                .push_unsubscribe(&subscription(args))
                .await
                .context("Failed to unsubscribe")?;
            out.success("Push notifications disabled");
        }
    }
    Ok(())
}
