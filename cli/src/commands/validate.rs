use anyhow::{Context as _, Result, bail};
use erate_client::DefaultClient;
use erate_client::v1::EntityKind;
use tracing::instrument;

use crate::output::Output;

#[instrument(skip_all, name = "validate", fields(kind = %kind))]
pub async fn run_validate(client: &DefaultClient, kind: EntityKind, number: &str) -> Result<()> {
    let out = Output::new();
    let result = client
        .validate_entity(kind, number)
        .await
        .with_context(|| format!("Failed to look up {kind} {number}"))?;

    if !result.valid {
        let reason = result.error.as_deref().unwrap_or("not found");
        bail!("{kind} {} is not valid: {reason}", number.trim());
    }

    out.success(format!("{kind} {} is valid", number.trim()));
    if let Some(name) = &result.name {
        out.labeled_indent("Name", name, 2);
    }
    Ok(())
}
