//! CSV import.

use std::path::Path;

use anyhow::{Context as _, Result};
use erate_client::DefaultClient;
use tracing::{info, instrument};

use crate::output::Output;

#[instrument(skip_all, name = "upload", fields(endpoint = %endpoint))]
pub async fn run_upload(client: &DefaultClient, endpoint: &str, file: &Path) -> Result<()> {
    let out = Output::new();
    let data = std::fs::read(file)
        .with_context(|| format!("Failed to read file: {}", file.display()))?;
    let filename = file
        .file_name()
        .and_then(|name| name.to_str())
        .context("File name is not valid UTF-8")?;

    info!(bytes = data.len(), "Uploading {filename}");
    let summary = client
        .upload_csv(endpoint, filename, data)
        .await
        .with_context(|| format!("Failed to upload {filename}"))?;

    out.success(format!("Uploaded {filename}"));
    out.labeled_indent("Imported", summary.imported, 2);
    out.labeled_indent("Skipped", summary.skipped, 2);
    for error in &summary.errors {
        out.warning(error);
    }
    Ok(())
}
