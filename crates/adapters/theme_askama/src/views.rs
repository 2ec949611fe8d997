//! Owned view models handed to the askama templates.
//!
//! Every value is pre-rendered to a string so the templates only loop and
//! print; escaping happens in askama.

use askama::Template;

use adminkit_app::ports::theme::{Chrome, DetailView, FormView, ListView, PageView};
use adminkit_app::routes::{encode_component, record_path};
use adminkit_domain::descriptor::FormMode;
use adminkit_domain::field::{Field, Widget};
use adminkit_domain::record::{display_value, record_id};

/// Sidebar link.
pub struct NavLink {
    pub label: String,
    pub href: String,
    pub active: bool,
}

fn nav_links(chrome: &Chrome<'_>, current: &str) -> Vec<NavLink> {
    chrome
        .nav
        .iter()
        .map(|item| NavLink {
            label: item.label.clone(),
            href: item.href.clone(),
            active: is_active(chrome.prefix, &item.href, current),
        })
        .collect()
}

/// The dashboard link only lights up on its exact path, table links also on
/// their sub-pages.
fn is_active(prefix: &str, href: &str, current: &str) -> bool {
    if href == current {
        return true;
    }
    href != prefix
        && current
            .strip_prefix(href)
            .is_some_and(|rest| rest.starts_with('/'))
}

fn page_href(base: &str, page: u32, search: &str) -> String {
    if search.is_empty() {
        format!("{base}?page={page}")
    } else {
        format!("{base}?page={page}&q={}", encode_component(search))
    }
}

pub struct ListRow {
    pub cells: Vec<String>,
    pub detail_href: String,
    pub edit_href: String,
    pub delete_href: String,
}

#[derive(Template)]
#[template(path = "list.html")]
pub struct ListTemplate {
    pub title: String,
    pub home: String,
    pub nav: Vec<NavLink>,
    pub base: String,
    pub search: String,
    pub columns: Vec<String>,
    pub rows: Vec<ListRow>,
    pub total: u64,
    pub page: u32,
    pub page_count: u32,
    pub prev_href: String,
    pub next_href: String,
    pub new_href: String,
    pub export_href: String,
}

impl ListTemplate {
    pub fn from_view(view: &ListView<'_>) -> Self {
        let table = view.table;
        let base = view.base;
        let fields: Vec<&Field> = table.list_fields().collect();

        let rows = view
            .page
            .records
            .iter()
            .map(|record| {
                let id = record_id(record, &table.primary_key).unwrap_or_default();
                let link = |allowed: bool, suffix: &str| {
                    if allowed && !id.is_empty() {
                        format!("{}{suffix}", record_path(base, &id))
                    } else {
                        String::new()
                    }
                };
                ListRow {
                    cells: fields
                        .iter()
                        .map(|field| {
                            record
                                .get(&field.name)
                                .map(display_value)
                                .unwrap_or_default()
                        })
                        .collect(),
                    detail_href: link(view.can_view, ""),
                    edit_href: link(view.can_edit, "/edit"),
                    delete_href: link(view.can_delete, "/delete"),
                }
            })
            .collect();

        let page = view.page.page.max(1);
        let page_count = view.page.page_count();
        let export_href = match (view.can_export, view.search.is_empty()) {
            (false, _) => String::new(),
            (true, true) => format!("{base}/export"),
            (true, false) => format!("{base}/export?q={}", encode_component(view.search)),
        };

        Self {
            title: table.title.clone(),
            home: view.chrome.prefix.to_string(),
            nav: nav_links(&view.chrome, base),
            base: base.to_string(),
            search: view.search.to_string(),
            columns: fields.iter().map(|field| field.label.clone()).collect(),
            rows,
            total: view.page.total,
            page,
            page_count,
            prev_href: if page > 1 {
                page_href(base, page - 1, view.search)
            } else {
                String::new()
            },
            next_href: if page < page_count {
                page_href(base, page + 1, view.search)
            } else {
                String::new()
            },
            new_href: if view.can_create {
                format!("{base}/new")
            } else {
                String::new()
            },
            export_href,
        }
    }
}

pub struct DetailRow {
    pub label: String,
    pub value: String,
}

#[derive(Template)]
#[template(path = "detail.html")]
pub struct DetailTemplate {
    pub title: String,
    pub home: String,
    pub nav: Vec<NavLink>,
    pub base: String,
    pub heading: String,
    pub rows: Vec<DetailRow>,
    pub edit_href: String,
    pub delete_href: String,
}

impl DetailTemplate {
    pub fn from_view(view: &DetailView<'_>) -> Self {
        let table = view.table;
        let record_href = record_path(view.base, view.id);
        let rows = table
            .fields
            .iter()
            .filter(|field| field.widget != Widget::Password)
            .map(|field| DetailRow {
                label: field.label.clone(),
                value: view
                    .record
                    .get(&field.name)
                    .map(display_value)
                    .unwrap_or_default(),
            })
            .collect();

        Self {
            title: table.title.clone(),
            home: view.chrome.prefix.to_string(),
            nav: nav_links(&view.chrome, view.base),
            base: view.base.to_string(),
            heading: format!("{} #{}", table.title, view.id),
            rows,
            edit_href: if view.can_edit {
                format!("{record_href}/edit")
            } else {
                String::new()
            },
            delete_href: if view.can_delete {
                format!("{record_href}/delete")
            } else {
                String::new()
            },
        }
    }
}

pub struct SelectOption {
    pub value: String,
    pub selected: bool,
}

pub struct FormInput {
    pub name: String,
    pub label: String,
    /// Widget name, also the `type` of plain `<input>` elements.
    pub kind: &'static str,
    pub value: String,
    pub checked: bool,
    pub required: bool,
    pub options: Vec<SelectOption>,
    pub error: String,
}

#[derive(Template)]
#[template(path = "form.html")]
pub struct FormTemplate {
    pub title: String,
    pub home: String,
    pub nav: Vec<NavLink>,
    pub base: String,
    pub heading: String,
    pub action: String,
    pub submit: String,
    pub inputs: Vec<FormInput>,
    pub has_errors: bool,
}

impl FormTemplate {
    pub fn from_view(view: &FormView<'_>) -> Self {
        let table = view.table;
        let inputs = table
            .form_fields(view.mode)
            .map(|field| {
                let raw = view.values.get(&field.name);
                let mut value = raw.map(display_value).unwrap_or_default();
                match field.widget {
                    Widget::Password => value.clear(),
                    Widget::DateTime => value = value.replacen(' ', "T", 1),
                    _ => {}
                }
                FormInput {
                    name: field.name.clone(),
                    label: field.label.clone(),
                    kind: field.widget.as_str(),
                    checked: matches!(raw, Some(serde_json::Value::Bool(true))),
                    required: field.validation.required,
                    options: field
                        .validation
                        .allowed
                        .iter()
                        .map(|option| SelectOption {
                            selected: *option == value,
                            value: option.clone(),
                        })
                        .collect(),
                    error: view
                        .errors
                        .get(&field.name)
                        .map(ToString::to_string)
                        .unwrap_or_default(),
                    value,
                }
            })
            .collect();

        let (heading, submit) = match view.mode {
            FormMode::Create => (format!("New {}", table.title), "Create"),
            FormMode::Edit => (format!("Edit {}", table.title), "Save"),
        };

        Self {
            title: table.title.clone(),
            home: view.chrome.prefix.to_string(),
            nav: nav_links(&view.chrome, view.base),
            base: view.base.to_string(),
            heading,
            action: view.action.to_string(),
            submit: submit.to_string(),
            inputs,
            has_errors: !view.errors.is_empty(),
        }
    }
}

#[derive(Template)]
#[template(path = "page.html")]
pub struct PageTemplate {
    pub title: String,
    pub home: String,
    pub nav: Vec<NavLink>,
    pub body_html: String,
}

impl PageTemplate {
    /// Highlights the nav entry carrying the page title, if any.
    pub fn from_view(view: &PageView<'_>) -> Self {
        let current = view
            .chrome
            .nav
            .iter()
            .find(|item| item.label == view.title)
            .map_or(view.chrome.prefix, |item| item.href.as_str());
        Self {
            title: view.title.to_string(),
            home: view.chrome.prefix.to_string(),
            nav: nav_links(&view.chrome, current),
            body_html: view.body_html.to_string(),
        }
    }
}
