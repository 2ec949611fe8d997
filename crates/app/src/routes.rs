//! Route planning — computes every path the admin surface will serve and
//! rejects collisions before anything is handed to the router adapter.
//!
//! A table with route prefix `p` under admin prefix `/admin` owns the whole
//! subtree `/admin/p`:
//!
//! | Endpoint | Method | Path |
//! |----------|--------|------|
//! | list     | GET    | `/admin/p` |
//! | export   | GET    | `/admin/p/export` |
//! | new form | GET    | `/admin/p/new` |
//! | create   | POST   | `/admin/p/new` |
//! | detail   | GET    | `/admin/p/{id}` |
//! | edit form| GET    | `/admin/p/{id}/edit` |
//! | update   | POST   | `/admin/p/{id}/edit` |
//! | delete   | POST   | `/admin/p/{id}/delete` |

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use adminkit_domain::action::Action;
use adminkit_domain::descriptor::TableDescriptor;

use crate::ports::page::PageHandler;
use crate::ports::theme::NavItem;

/// HTTP method of a planned route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Method {
    Get,
    Post,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Get => "GET",
            Self::Post => "POST",
        })
    }
}

/// One endpoint of a table's route group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableEndpoint {
    List,
    Export,
    NewForm,
    Create,
    Detail,
    EditForm,
    Update,
    Delete,
}

impl TableEndpoint {
    pub const ALL: [Self; 8] = [
        Self::List,
        Self::Export,
        Self::NewForm,
        Self::Create,
        Self::Detail,
        Self::EditForm,
        Self::Update,
        Self::Delete,
    ];

    /// Action that must be permitted for the endpoint to exist.
    #[must_use]
    pub fn action(self) -> Action {
        match self {
            Self::List => Action::List,
            Self::Export => Action::Export,
            Self::NewForm | Self::Create => Action::Create,
            Self::Detail => Action::Detail,
            Self::EditForm | Self::Update => Action::Edit,
            Self::Delete => Action::Delete,
        }
    }

    #[must_use]
    pub fn method(self) -> Method {
        match self {
            Self::List | Self::Export | Self::NewForm | Self::Detail | Self::EditForm => {
                Method::Get
            }
            Self::Create | Self::Update | Self::Delete => Method::Post,
        }
    }

    /// Path below the table base; `{id}` is the primary key placeholder.
    #[must_use]
    pub fn suffix(self) -> &'static str {
        match self {
            Self::List => "",
            Self::Export => "/export",
            Self::NewForm | Self::Create => "/new",
            Self::Detail => "/{id}",
            Self::EditForm | Self::Update => "/{id}/edit",
            Self::Delete => "/{id}/delete",
        }
    }
}

/// What a planned route dispatches to.
#[derive(Clone)]
pub enum RouteTarget {
    Table {
        table: Arc<TableDescriptor>,
        endpoint: TableEndpoint,
    },
    Page(Arc<dyn PageHandler>),
}

impl fmt::Debug for RouteTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Table { table, endpoint } => f
                .debug_struct("Table")
                .field("table", &table.name)
                .field("endpoint", endpoint)
                .finish(),
            Self::Page(_) => f.write_str("Page"),
        }
    }
}

/// A fully resolved route.
#[derive(Debug, Clone)]
pub struct RouteSpec {
    pub method: Method,
    pub path: String,
    pub target: RouteTarget,
}

/// An operator-supplied route, e.g. a dashboard page.
#[derive(Clone)]
pub struct CustomRoute {
    pub method: Method,
    pub path: String,
    pub handler: Arc<dyn PageHandler>,
    /// Adds a navigation entry when set (GET routes only).
    pub nav_label: Option<String>,
}

impl CustomRoute {
    /// A GET page listed in the navigation under `label`.
    #[must_use]
    pub fn page(
        path: impl Into<String>,
        label: impl Into<String>,
        handler: Arc<dyn PageHandler>,
    ) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            handler,
            nav_label: Some(label.into()),
        }
    }
}

/// Static file directory served under a URL mount point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticMount {
    pub mount: String,
    pub dir: PathBuf,
}

/// Two claims on the same URL space.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{path} requested by {claimant} is already claimed by {existing}")]
pub struct RouteConflict {
    pub path: String,
    pub existing: String,
    pub claimant: String,
}

#[derive(Debug)]
struct Claim {
    root: String,
    owner: String,
}

/// Every route the engine will install, checked for collisions.
#[derive(Debug)]
pub struct RoutePlan {
    prefix: String,
    routes: Vec<RouteSpec>,
    subtrees: Vec<Claim>,
    statics: Vec<StaticMount>,
    tables: Vec<Arc<TableDescriptor>>,
    nav: Vec<NavItem>,
}

impl RoutePlan {
    /// Start an empty plan under the admin `prefix` (e.g. `/admin`).
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        let prefix = match prefix.trim_end_matches('/') {
            "" => "/".to_string(),
            trimmed => trimmed.to_string(),
        };
        Self {
            prefix,
            routes: Vec::new(),
            subtrees: Vec::new(),
            statics: Vec::new(),
            tables: Vec::new(),
            nav: Vec::new(),
        }
    }

    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Base path of a table: `<prefix>/<route_prefix>`.
    #[must_use]
    pub fn table_base(&self, table: &TableDescriptor) -> String {
        join(&self.prefix, &table.route_prefix)
    }

    #[must_use]
    pub fn routes(&self) -> &[RouteSpec] {
        &self.routes
    }

    #[must_use]
    pub fn statics(&self) -> &[StaticMount] {
        &self.statics
    }

    /// Tables in installation order; one route group each.
    #[must_use]
    pub fn tables(&self) -> &[Arc<TableDescriptor>] {
        &self.tables
    }

    #[must_use]
    pub fn nav(&self) -> &[NavItem] {
        &self.nav
    }

    /// Claim the subtree of `table` and add one route per permitted endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`RouteConflict`] if the subtree overlaps anything already planned.
    pub fn add_table(&mut self, table: Arc<TableDescriptor>) -> Result<(), RouteConflict> {
        let base = self.table_base(&table);
        let owner = format!("table {}", table.name);

        self.check_subtree(&base, &owner)?;
        if let Some(route) = self.routes.iter().find(|r| within(&r.path, &base)) {
            return Err(RouteConflict {
                path: base,
                existing: format!("custom route {} {}", route.method, route.path),
                claimant: owner,
            });
        }

        for endpoint in TableEndpoint::ALL {
            if !table.permits(endpoint.action()) {
                continue;
            }
            self.routes.push(RouteSpec {
                method: endpoint.method(),
                path: format!("{base}{}", endpoint.suffix()),
                target: RouteTarget::Table {
                    table: Arc::clone(&table),
                    endpoint,
                },
            });
        }
        if table.permits(Action::List) {
            self.nav.push(NavItem {
                label: table.title.clone(),
                href: base.clone(),
            });
        }
        self.subtrees.push(Claim { root: base, owner });
        self.tables.push(table);
        Ok(())
    }

    /// Add an operator-supplied route.
    ///
    /// # Errors
    ///
    /// Returns [`RouteConflict`] if the path falls inside a table or static
    /// subtree, repeats an existing method and path, or has a capture or
    /// wildcard segment that the router would match against other routes.
    pub fn add_custom(&mut self, route: CustomRoute) -> Result<(), RouteConflict> {
        let owner = format!("custom route {} {}", route.method, route.path);
        if !route.path.starts_with('/') {
            return Err(RouteConflict {
                path: route.path,
                existing: "the URL root (paths must start with '/')".to_string(),
                claimant: owner,
            });
        }
        if has_capture(&route.path) {
            return Err(RouteConflict {
                path: route.path,
                existing: "table routes (custom paths must be literal)".to_string(),
                claimant: owner,
            });
        }
        if let Some(claim) = self.subtrees.iter().find(|c| within(&route.path, &c.root)) {
            return Err(RouteConflict {
                path: route.path,
                existing: claim.owner.clone(),
                claimant: owner,
            });
        }
        if let Some(existing) = self
            .routes
            .iter()
            .find(|r| r.method == route.method && r.path == route.path)
        {
            return Err(RouteConflict {
                path: route.path,
                existing: format!("custom route {} {}", existing.method, existing.path),
                claimant: owner,
            });
        }

        if route.method == Method::Get
            && let Some(label) = route.nav_label
        {
            self.nav.push(NavItem {
                label,
                href: route.path.clone(),
            });
        }
        self.routes.push(RouteSpec {
            method: route.method,
            path: route.path,
            target: RouteTarget::Page(route.handler),
        });
        Ok(())
    }

    /// Add a static file mount.
    ///
    /// # Errors
    ///
    /// Returns [`RouteConflict`] if the mount is the URL root or overlaps
    /// anything already planned.
    pub fn add_static(&mut self, mount: StaticMount) -> Result<(), RouteConflict> {
        let root = mount.mount.trim_end_matches('/').to_string();
        let owner = format!("static mount {root}");
        if root.is_empty() || !root.starts_with('/') {
            return Err(RouteConflict {
                path: mount.mount,
                existing: "the URL root".to_string(),
                claimant: owner,
            });
        }

        if has_capture(&root) {
            return Err(RouteConflict {
                path: root,
                existing: "table routes (static mounts must be literal)".to_string(),
                claimant: owner,
            });
        }

        self.check_subtree(&root, &owner)?;
        if let Some(route) = self.routes.iter().find(|r| within(&r.path, &root)) {
            return Err(RouteConflict {
                path: root,
                existing: format!("custom route {} {}", route.method, route.path),
                claimant: owner,
            });
        }

        self.subtrees.push(Claim {
            root: root.clone(),
            owner,
        });
        self.statics.push(StaticMount {
            mount: root,
            dir: mount.dir,
        });
        Ok(())
    }

    fn check_subtree(&self, root: &str, owner: &str) -> Result<(), RouteConflict> {
        match self
            .subtrees
            .iter()
            .find(|c| within(root, &c.root) || within(&c.root, root))
        {
            Some(claim) => Err(RouteConflict {
                path: root.to_string(),
                existing: claim.owner.clone(),
                claimant: owner.to_string(),
            }),
            None => Ok(()),
        }
    }
}

/// Percent-encode `value` for use as a single path segment or query value.
#[must_use]
pub fn encode_component(value: &str) -> String {
    let mut encoded = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                encoded.push(char::from(byte));
            }
            _ => encoded.push_str(&format!("%{byte:02X}")),
        }
    }
    encoded
}

/// Path of the record `id` below a table `base`.
#[must_use]
pub fn record_path(base: &str, id: &str) -> String {
    format!("{base}/{}", encode_component(id))
}

/// Whether any segment of `path` is a router capture (`{id}`, `:id`) or a
/// wildcard (`*rest`).
#[must_use]
pub fn has_capture(path: &str) -> bool {
    path.split('/')
        .any(|segment| segment.contains(['{', '}']) || segment.starts_with([':', '*']))
}

fn join(prefix: &str, segment: &str) -> String {
    format!("{}/{segment}", prefix.trim_end_matches('/'))
}

/// Whether `path` equals `root` or lies below it.
fn within(path: &str, root: &str) -> bool {
    path == root
        || path
            .strip_prefix(root)
            .is_some_and(|rest| rest.starts_with('/') || root.ends_with('/'))
}
