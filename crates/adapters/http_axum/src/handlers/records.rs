//! CRUD pages of one table.

use std::collections::HashMap;

use axum::extract::{Form, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use serde::Deserialize;
use serde_json::Value;

use adminkit_app::ports::database::{ListQuery, SortOrder};
use adminkit_app::ports::theme::{DetailView, FormView, ListView};
use adminkit_domain::action::Action;
use adminkit_domain::descriptor::{FormErrors, FormMode};
use adminkit_domain::field::FieldType;
use adminkit_domain::record::Record;

use super::authorize;
use crate::error::HttpError;
use crate::principal::Actor;
use crate::state::TableState;

/// Query string of the list and export pages.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ListParams {
    pub q: Option<String>,
    pub page: Option<u32>,
    pub sort: Option<String>,
    pub order: Option<String>,
}

impl ListParams {
    pub fn search(&self) -> Option<String> {
        self.q
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(ToString::to_string)
    }

    pub fn sort(&self) -> Option<(String, SortOrder)> {
        let field = self.sort.as_deref().filter(|s| !s.is_empty())?;
        let order = match self.order.as_deref() {
            Some(order) if order.eq_ignore_ascii_case("desc") => SortOrder::Desc,
            _ => SortOrder::Asc,
        };
        Some((field.to_string(), order))
    }
}

/// `GET <base>` — one page of records.
pub(crate) async fn list(
    State(state): State<TableState>,
    Actor(principal): Actor,
    Query(params): Query<ListParams>,
) -> Result<Html<String>, HttpError> {
    authorize(&state, Action::List, &principal)?;
    let table = &state.table;
    let query = ListQuery {
        search: params.search(),
        sort: params.sort(),
        page: params.page.unwrap_or(1).max(1),
        per_page: Some(table.page_size),
    };
    let page = state.shared.connection.list(table, &query).await?;

    let html = state.shared.theme.render_list(&ListView {
        chrome: state.shared.chrome(),
        table,
        page: &page,
        search: query.search.as_deref().unwrap_or_default(),
        base: &state.base,
        can_create: table.allows(Action::Create, &principal),
        can_edit: table.allows(Action::Edit, &principal),
        can_delete: table.allows(Action::Delete, &principal),
        can_export: table.allows(Action::Export, &principal),
        can_view: table.allows(Action::Detail, &principal),
    })?;
    Ok(Html(html))
}

/// `GET <base>/{id}` — one record.
pub(crate) async fn detail(
    State(state): State<TableState>,
    Actor(principal): Actor,
    Path(id): Path<String>,
) -> Result<Html<String>, HttpError> {
    authorize(&state, Action::Detail, &principal)?;
    let table = &state.table;
    let record = state
        .shared
        .connection
        .fetch(table, &id)
        .await?
        .ok_or(HttpError::NotFound)?;

    let html = state.shared.theme.render_detail(&DetailView {
        chrome: state.shared.chrome(),
        table,
        record: &record,
        id: &id,
        base: &state.base,
        can_edit: table.allows(Action::Edit, &principal),
        can_delete: table.allows(Action::Delete, &principal),
    })?;
    Ok(Html(html))
}

/// `GET <base>/new` — empty create form.
pub(crate) async fn new_form(
    State(state): State<TableState>,
    Actor(principal): Actor,
) -> Result<Response, HttpError> {
    authorize(&state, Action::Create, &principal)?;
    let action = format!("{}/new", state.base);
    render_form(
        &state,
        FormMode::Create,
        &Record::new(),
        &FormErrors::new(),
        &action,
        StatusCode::OK,
    )
}

/// `POST <base>/new` — insert, then redirect to the new record.
pub(crate) async fn create(
    State(state): State<TableState>,
    Actor(principal): Actor,
    Form(input): Form<HashMap<String, String>>,
) -> Result<Response, HttpError> {
    authorize(&state, Action::Create, &principal)?;
    let record = match state.table.record_from_form(&input, FormMode::Create) {
        Ok(record) => record,
        Err(errors) => {
            let action = format!("{}/new", state.base);
            return render_form(
                &state,
                FormMode::Create,
                &submitted(&state, &input),
                &errors,
                &action,
                StatusCode::UNPROCESSABLE_ENTITY,
            );
        }
    };

    let id = state.shared.connection.insert(&state.table, &record).await?;
    tracing::info!(table = %state.table.name, %id, user = ?principal.user, "record created");
    Ok(Redirect::to(&state.after_write(&id)).into_response())
}

/// `GET <base>/{id}/edit` — form pre-filled with the stored record.
pub(crate) async fn edit_form(
    State(state): State<TableState>,
    Actor(principal): Actor,
    Path(id): Path<String>,
) -> Result<Response, HttpError> {
    authorize(&state, Action::Edit, &principal)?;
    let record = state
        .shared
        .connection
        .fetch(&state.table, &id)
        .await?
        .ok_or(HttpError::NotFound)?;
    let action = format!("{}/edit", state.record_path(&id));
    render_form(
        &state,
        FormMode::Edit,
        &record,
        &FormErrors::new(),
        &action,
        StatusCode::OK,
    )
}

/// `POST <base>/{id}/edit` — update, then redirect to the record.
pub(crate) async fn update(
    State(state): State<TableState>,
    Actor(principal): Actor,
    Path(id): Path<String>,
    Form(input): Form<HashMap<String, String>>,
) -> Result<Response, HttpError> {
    authorize(&state, Action::Edit, &principal)?;
    let record = match state.table.record_from_form(&input, FormMode::Edit) {
        Ok(record) => record,
        Err(errors) => {
            let action = format!("{}/edit", state.record_path(&id));
            return render_form(
                &state,
                FormMode::Edit,
                &submitted(&state, &input),
                &errors,
                &action,
                StatusCode::UNPROCESSABLE_ENTITY,
            );
        }
    };

    state
        .shared
        .connection
        .update(&state.table, &id, &record)
        .await?;
    tracing::info!(table = %state.table.name, %id, user = ?principal.user, "record updated");
    Ok(Redirect::to(&state.after_write(&id)).into_response())
}

/// `POST <base>/{id}/delete` — delete, then redirect to the list.
pub(crate) async fn delete(
    State(state): State<TableState>,
    Actor(principal): Actor,
    Path(id): Path<String>,
) -> Result<Redirect, HttpError> {
    authorize(&state, Action::Delete, &principal)?;
    state.shared.connection.delete(&state.table, &id).await?;
    tracing::info!(table = %state.table.name, %id, user = ?principal.user, "record deleted");
    Ok(Redirect::to(&state.base))
}

fn render_form(
    state: &TableState,
    mode: FormMode,
    values: &Record,
    errors: &FormErrors,
    action: &str,
    status: StatusCode,
) -> Result<Response, HttpError> {
    let html = state.shared.theme.render_form(&FormView {
        chrome: state.shared.chrome(),
        table: &state.table,
        mode,
        values,
        errors,
        action,
        base: &state.base,
    })?;
    Ok((status, Html(html)).into_response())
}

/// Raw submission echoed back into a rejected form.
fn submitted(state: &TableState, input: &HashMap<String, String>) -> Record {
    let mut record = Record::new();
    for field in &state.table.fields {
        let raw = input.get(&field.name);
        let value = if field.field_type == FieldType::Boolean {
            Value::Bool(matches!(
                field.parse_input(raw.map(String::as_str)),
                Ok(Value::Bool(true))
            ))
        } else {
            match raw {
                Some(raw) => Value::String(raw.clone()),
                None => continue,
            }
        };
        record.insert(field.name.clone(), value);
    }
    record
}
