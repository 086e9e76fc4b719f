//! `erate table`: fetch a list endpoint and page through it locally.

use std::sync::Arc;

use anyhow::{Context as _, Result, bail};
use erate_client::DefaultClient;
use erate_client::v1::JsonRecord;
use erate_store::KeyValueStore;
use erate_table::{
    AddPayload, AddedSet, DataTable, IdentityField, RenderedRow, SortDirection, SortState,
    TablePrefs, TableView,
};
use serde_json::Value;
use tabled::builder::Builder;
use tabled::settings::Style;
use tracing::{info, instrument};
use ustr::Ustr;

use crate::cli::TableArgs;
use crate::output::Output;

#[instrument(skip_all, name = "table", fields(path = %args.path))]
pub async fn run_table(
    client: &DefaultClient,
    store: Arc<dyn KeyValueStore>,
    args: &TableArgs,
) -> Result<()> {
    let out = Output::new();
    let records = client
        .fetch_records(&args.path)
        .await
        .with_context(|| format!("Failed to fetch {}", args.path))?;
    info!(rows = records.len(), "Fetched records");

    let added: AddedSet = args.added.iter().map(|id| Ustr::from(id.as_str())).collect();
    let mut table = build_table(records, args, store);
    select_rows(&mut table, args, &added, &out);

    let view = table.render(&added);
    if view.total_rows == 0 {
        out.dim("No rows.");
    } else {
        out.print(render_view(&view, table.view_state().sort()));
        out.page_footer(view.page, view.total_pages, view.total_rows);
    }

    let Some(add_to) = args.add_to.as_deref() else {
        if !table.selection().is_empty() {
            out.info(format!("{} row(s) selected", table.selection().len()));
        }
        return Ok(());
    };

    if table.selection().is_empty() {
        out.dim("Nothing selected; nothing to add.");
        return Ok(());
    }
    add_selected(client, &mut table, &added, add_to, &out).await
}

fn build_table(
    records: Vec<JsonRecord>,
    args: &TableArgs,
    store: Arc<dyn KeyValueStore>,
) -> DataTable<JsonRecord> {
    let mut table = DataTable::new(records)
        .with_identity(IdentityField::new(&args.identity))
        .with_prefs(TablePrefs::new(store));
    if !args.columns.is_empty() {
        table = table.with_columns(&args.columns);
    }
    if let Some(rows) = args.rows {
        table.set_rows_per_page(rows);
    }
    if let Some(filter) = &args.filter {
        table.set_filter(filter.as_str());
    }
    if let Some(column) = &args.sort {
        let direction = if args.desc {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        };
        table.set_sort(column, direction);
    }
    table.go_to_page(args.page);
    table
}

fn select_rows(table: &mut DataTable<JsonRecord>, args: &TableArgs, added: &AddedSet, out: &Output) {
    for id in &args.select {
        let id = Ustr::from(id.as_str());
        if table.selection().contains(id) {
            continue;
        }
        if let Err(e) = table.toggle_row(id, added) {
            out.warning(e);
        }
    }

    if !args.select_all {
        return;
    }
    // The checkbox toggles; only click it if it is not already checked.
    let visible = table.selectable_visible(added);
    if table.selection().all_selected(&visible) {
        return;
    }
    if let Err(e) = table.toggle_select_all(added) {
        out.warning(e);
    }
}

async fn add_selected(
    client: &DefaultClient,
    table: &mut DataTable<JsonRecord>,
    added: &AddedSet,
    path: &str,
    out: &Output,
) -> Result<()> {
    let action = |payload: AddPayload| async move {
        client.post::<_, Value>(path, &payload).await.map(drop)
    };

    let report = table.add_selected(added, &action).await;
    for id in &report.added {
        out.success(format!("Added {id}"));
    }
    for id in &report.skipped {
        out.dim(format!("Skipped {id}"));
    }
    for (id, message) in &report.failed {
        out.error(format!("{id}: {message}"));
    }

    if !report.is_clean() {
        bail!(
            "{} of {} row(s) could not be added",
            report.failed.len(),
            report.attempted()
        );
    }
    Ok(())
}

fn row_marker(row: &RenderedRow) -> &'static str {
    if row.added {
        "✓"
    } else if row.busy {
        "…"
    } else if row.identity.is_none() {
        ""
    } else if row.selected {
        "[x]"
    } else {
        "[ ]"
    }
}

/// The page as a rounded table. Selectable tables get a leading checkbox column.
pub fn render_view(view: &TableView, sort: Option<SortState>) -> String {
    let mut builder = Builder::default();

    let mut header: Vec<String> = Vec::with_capacity(view.columns.len() + 1);
    if view.selectable {
        header.push(if view.all_visible_selected { "[x]" } else { "[ ]" }.to_owned());
    }
    header.extend(view.columns.iter().map(|column| {
        match sort.filter(|s| s.column == column.key) {
            Some(SortState {
                direction: SortDirection::Asc,
                ..
            }) => format!("{} ▲", column.label),
            Some(SortState {
                direction: SortDirection::Desc,
                ..
            }) => format!("{} ▼", column.label),
            None => column.label.clone(),
        }
    }));
    builder.push_record(header);

    for row in &view.rows {
        let mut record: Vec<String> = Vec::with_capacity(row.cells.len() + 1);
        if view.selectable {
            record.push(row_marker(row).to_owned());
        }
        record.extend(row.cells.iter().cloned());
        builder.push_record(record);
    }

    let mut table = builder.build();
    table.with(Style::rounded());
    table.to_string()
}
