//! CSV export of a table.

use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};

use adminkit_app::ports::database::ListQuery;
use adminkit_domain::action::Action;
use adminkit_domain::descriptor::TableDescriptor;
use adminkit_domain::field::{Field, Widget};
use adminkit_domain::record::{Record, display_value};

use super::authorize;
use super::records::ListParams;
use crate::error::HttpError;
use crate::principal::Actor;
use crate::state::TableState;

/// `GET <base>/export` — every matching record as CSV.
pub(crate) async fn export(
    State(state): State<TableState>,
    Actor(principal): Actor,
    Query(params): Query<ListParams>,
) -> Result<Response, HttpError> {
    authorize(&state, Action::Export, &principal)?;
    let query = ListQuery {
        search: params.search(),
        sort: params.sort(),
        ..ListQuery::all()
    };
    let page = state.shared.connection.list(&state.table, &query).await?;
    tracing::debug!(table = %state.table.name, rows = page.records.len(), "csv export");

    let headers = [
        (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}.csv\"", state.table.name),
        ),
    ];
    Ok((headers, to_csv(&state.table, &page.records)).into_response())
}

/// Password fields never leave the database through an export.
fn exported_fields(table: &TableDescriptor) -> impl Iterator<Item = &Field> {
    table
        .fields
        .iter()
        .filter(|field| field.widget != Widget::Password)
}

fn to_csv(table: &TableDescriptor, records: &[Record]) -> String {
    let mut out = String::new();
    let header: Vec<String> = exported_fields(table)
        .map(|field| csv_cell(&field.name))
        .collect();
    out.push_str(&header.join(","));
    out.push_str("\r\n");

    for record in records {
        let row: Vec<String> = exported_fields(table)
            .map(|field| {
                let value = record.get(&field.name).map(display_value).unwrap_or_default();
                csv_cell(&value)
            })
            .collect();
        out.push_str(&row.join(","));
        out.push_str("\r\n");
    }
    out
}

fn csv_cell(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
