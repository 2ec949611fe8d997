//! Axum router assembly.

use std::sync::Arc;

use axum::Router;
use axum::routing::{MethodRouter, get, post};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use adminkit_app::ports::{HttpApp, InstallContext, RouterAdapter, RouterError};
use adminkit_app::routes::{Method, RoutePlan, RouteTarget, TableEndpoint};

use crate::app::AxumApp;
use crate::handlers::{export, pages, records};
use crate::state::{PageState, Shared, TableState};

/// Name under which the daemon registers [`AxumRouter`].
pub const ROUTER_NAME: &str = "axum";

/// Router adapter backed by axum.
#[derive(Debug, Clone, Copy, Default)]
pub struct AxumRouter;

impl AxumRouter {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl RouterAdapter for AxumRouter {
    fn install(
        &self,
        plan: RoutePlan,
        ctx: InstallContext,
    ) -> Result<Box<dyn HttpApp>, RouterError> {
        Ok(Box::new(build_router(&plan, ctx)?))
    }
}

/// Build the axum application for `plan`.
///
/// Every table endpoint and custom page gets its own handler state. Static
/// mounts are served by [`ServeDir`]. Includes a [`TraceLayer`] that logs
/// each HTTP request/response at the `DEBUG` level when request tracing is
/// enabled.
///
/// # Errors
///
/// Returns [`RouterError`] when a static mount points at a missing directory.
pub fn build_router(plan: &RoutePlan, ctx: InstallContext) -> Result<AxumApp, RouterError> {
    if let Some(mount) = plan.statics().iter().find(|mount| !mount.dir.is_dir()) {
        return Err(RouterError(
            format!(
                "directory {} for static mount {} does not exist",
                mount.dir.display(),
                mount.mount
            )
            .into(),
        ));
    }

    let shared = Arc::new(Shared {
        connection: ctx.connection,
        theme: ctx.theme,
        prefix: plan.prefix().to_string(),
        nav: plan.nav().to_vec(),
        tables: plan.tables().to_vec(),
    });

    let mut router = Router::new();
    let mut installed = Vec::with_capacity(plan.routes().len() + plan.statics().len());
    for route in plan.routes() {
        let method_router = match &route.target {
            RouteTarget::Table { table, endpoint } => table_route(
                *endpoint,
                TableState {
                    shared: Arc::clone(&shared),
                    table: Arc::clone(table),
                    base: plan.table_base(table).into(),
                },
            ),
            RouteTarget::Page(handler) => page_route(
                route.method,
                PageState {
                    shared: Arc::clone(&shared),
                    handler: Arc::clone(handler),
                },
            ),
        };
        router = router.route(&route.path, method_router);
        installed.push((route.method, route.path.clone()));
    }

    for mount in plan.statics() {
        router = router.nest_service(&mount.mount, ServeDir::new(&mount.dir));
        installed.push((Method::Get, mount.mount.clone()));
    }

    if ctx.request_tracing {
        router = router.layer(TraceLayer::new_for_http());
    }

    tracing::debug!(routes = installed.len(), "axum router built");
    Ok(AxumApp::new(router, installed))
}

fn table_route(endpoint: TableEndpoint, state: TableState) -> MethodRouter {
    let route = match endpoint {
        TableEndpoint::List => get(records::list),
        TableEndpoint::Export => get(export::export),
        TableEndpoint::NewForm => get(records::new_form),
        TableEndpoint::Create => post(records::create),
        TableEndpoint::Detail => get(records::detail),
        TableEndpoint::EditForm => get(records::edit_form),
        TableEndpoint::Update => post(records::update),
        TableEndpoint::Delete => post(records::delete),
    };
    route.with_state(state)
}

fn page_route(method: Method, state: PageState) -> MethodRouter {
    let route = match method {
        Method::Get => get(pages::page),
        Method::Post => post(pages::page),
    };
    route.with_state(state)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::atomic::Ordering;

    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use http_body_util::BodyExt;
    use serde_json::json;
    use tower::ServiceExt;

    use adminkit_app::lifecycle::shutdown_channel;
    use adminkit_app::ports::{Page, StaticPage};
    use adminkit_app::routes::{CustomRoute, StaticMount};
    use adminkit_domain::access::AccessRule;
    use adminkit_domain::action::Action;
    use adminkit_domain::descriptor::TableDescriptor;
    use adminkit_domain::field::{Field, FieldType};

    use super::*;
    use crate::principal::ROLES_HEADER;
    use crate::testing::{EchoTheme, MemoryConnection};

    fn users() -> TableDescriptor {
        TableDescriptor::builder("users")
            .title("Users")
            .page_size(2)
            .field(Field::new("id", FieldType::Integer).read_only())
            .field(Field::new("name", FieldType::Text).required())
            .field(Field::new("email", FieldType::Text))
            .field(Field::new("active", FieldType::Boolean))
            .build()
            .unwrap()
    }

    fn seeded() -> Arc<MemoryConnection> {
        let conn = Arc::new(MemoryConnection::default());
        conn.seed(
            "users",
            [
                json!({ "id": 1, "name": "Ada", "email": "ada@example.com", "active": true }),
                json!({ "id": 2, "name": "Grace", "email": "grace@example.com", "active": false }),
                json!({ "id": 3, "name": "Linus", "email": "linus@example.com", "active": true }),
            ],
        );
        conn
    }

    fn ctx(conn: &Arc<MemoryConnection>) -> InstallContext {
        InstallContext {
            connection: Arc::clone(conn) as Arc<dyn adminkit_app::ports::Connection>,
            theme: Arc::new(EchoTheme),
            request_tracing: true,
        }
    }

    fn plan_for(table: TableDescriptor) -> RoutePlan {
        let mut plan = RoutePlan::new("/admin");
        plan.add_table(Arc::new(table)).unwrap();
        plan
    }

    fn app(plan: &RoutePlan, conn: &Arc<MemoryConnection>) -> Router {
        build_router(plan, ctx(conn)).unwrap().into_router()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn form_request(uri: &str, body: &'static str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap()
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn location(response: &axum::response::Response) -> &str {
        response
            .headers()
            .get(header::LOCATION)
            .unwrap()
            .to_str()
            .unwrap()
    }

    #[tokio::test]
    async fn should_list_first_page_of_records() {
        let conn = seeded();
        let response = app(&plan_for(users()), &conn)
            .oneshot(get_request("/admin/users"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_text(response).await;
        assert!(body.starts_with("list users total=3 ids=[1,2]"), "{body}");
    }

    #[tokio::test]
    async fn should_search_and_page_list() {
        let conn = seeded();
        let router = app(&plan_for(users()), &conn);

        let body = body_text(
            router
                .clone()
                .oneshot(get_request("/admin/users?q=example&page=2"))
                .await
                .unwrap(),
        )
        .await;
        assert!(body.contains("total=3 ids=[3] search=example"), "{body}");

        let body = body_text(
            router
                .oneshot(get_request("/admin/users?q=grace"))
                .await
                .unwrap(),
        )
        .await;
        assert!(body.contains("total=1 ids=[2]"), "{body}");
    }

    #[tokio::test]
    async fn should_forbid_list_when_role_missing() {
        let conn = seeded();
        let table = TableDescriptor {
            access: [(Action::List, AccessRule::roles(["admin"]))].into(),
            ..users()
        };
        let router = app(&plan_for(table), &conn);

        let response = router
            .clone()
            .oneshot(get_request("/admin/users"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/admin/users")
                    .header(ROLES_HEADER, "staff, admin")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn should_create_record_and_redirect_to_detail() {
        let conn = seeded();
        let response = app(&plan_for(users()), &conn)
            .oneshot(form_request(
                "/admin/users/new",
                "name=Margaret&email=margaret%40example.com&active=on",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/admin/users/4");
        let rows = conn.rows("users");
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[3]["name"], json!("Margaret"));
        assert_eq!(rows[3]["active"], json!(true));
    }

    #[tokio::test]
    async fn should_rerender_form_with_errors_when_submission_invalid() {
        let conn = seeded();
        let response = app(&plan_for(users()), &conn)
            .oneshot(form_request("/admin/users/new", "name=&email=x"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_text(response).await;
        assert!(body.starts_with("form Create action=/admin/users/new errors=[name]"), "{body}");
        assert!(body.contains(r#""email":"x""#), "{body}");
        assert_eq!(conn.rows("users").len(), 3);
    }

    #[tokio::test]
    async fn should_answer_conflict_when_database_rejects_write() {
        let conn = seeded();
        conn.reject_writes.store(true, Ordering::SeqCst);
        let response = app(&plan_for(users()), &conn)
            .oneshot(form_request("/admin/users/new", "name=Ada"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn should_show_detail_and_404_for_unknown_id() {
        let conn = seeded();
        let router = app(&plan_for(users()), &conn);

        let response = router
            .clone()
            .oneshot(get_request("/admin/users/2"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains(r#""name":"Grace""#));

        let response = router
            .oneshot(get_request("/admin/users/42"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn should_prefill_edit_form_and_apply_update() {
        let conn = seeded();
        let router = app(&plan_for(users()), &conn);

        let body = body_text(
            router
                .clone()
                .oneshot(get_request("/admin/users/1/edit"))
                .await
                .unwrap(),
        )
        .await;
        assert!(body.starts_with("form Edit action=/admin/users/1/edit"), "{body}");
        assert!(body.contains(r#""name":"Ada""#), "{body}");

        let response = router
            .oneshot(form_request(
                "/admin/users/1/edit",
                "name=Ada+Lovelace&email=ada%40example.com",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/admin/users/1");

        let rows = conn.rows("users");
        assert_eq!(rows[0]["name"], json!("Ada Lovelace"));
        assert_eq!(rows[0]["active"], json!(false));
    }

    #[tokio::test]
    async fn should_return_404_when_updating_unknown_id() {
        let conn = seeded();
        let response = app(&plan_for(users()), &conn)
            .oneshot(form_request("/admin/users/9/edit", "name=Nobody"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn should_delete_record_and_redirect_to_list() {
        let conn = seeded();
        let response = app(&plan_for(users()), &conn)
            .oneshot(form_request("/admin/users/2/delete", ""))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/admin/users");
        assert_eq!(conn.rows("users").len(), 2);
    }

    #[tokio::test]
    async fn should_export_matching_rows_as_csv() {
        let conn = seeded();
        let response = app(&plan_for(users()), &conn)
            .oneshot(get_request("/admin/users/export?q=a"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/csv; charset=utf-8"
        );
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"users.csv\""
        );
        let body = body_text(response).await;
        let lines: Vec<&str> = body.lines().collect();
        assert_eq!(lines[0], "id,name,email,active");
        assert_eq!(lines[1], "1,Ada,ada@example.com,true");
        assert_eq!(lines.len(), 4);
    }

    #[tokio::test]
    async fn should_not_route_actions_the_table_does_not_permit() {
        let conn = seeded();
        let table = TableDescriptor::builder("users")
            .field(Field::new("id", FieldType::Integer))
            .field(Field::new("name", FieldType::Text))
            .actions([Action::List, Action::Detail])
            .build()
            .unwrap();
        let router = app(&plan_for(table), &conn);

        let response = router
            .clone()
            .oneshot(form_request("/admin/users/1/delete", ""))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = router
            .oneshot(get_request("/admin/users/new"))
            .await
            .unwrap();
        // `/new` falls through to the detail route of a record named "new"
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(conn.rows("users").len(), 3);
    }

    #[tokio::test]
    async fn should_render_custom_page_in_theme() {
        let conn = seeded();
        let mut plan = plan_for(users());
        plan.add_custom(CustomRoute::page(
            "/admin",
            "Dashboard",
            Arc::new(StaticPage(Page::new("Dashboard", "<p>hello</p>"))),
        ))
        .unwrap();

        let response = app(&plan, &conn)
            .oneshot(get_request("/admin"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "page Dashboard <p>hello</p>");
    }

    #[tokio::test]
    async fn should_serve_static_files_from_mount() {
        let dir = std::env::temp_dir().join(format!("adminkit-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("logo.txt"), "adminkit").unwrap();

        let conn = seeded();
        let mut plan = plan_for(users());
        plan.add_static(StaticMount {
            mount: "/uploads".to_string(),
            dir: dir.clone(),
        })
        .unwrap();

        let response = app(&plan, &conn)
            .oneshot(get_request("/uploads/logo.txt"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "adminkit");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn should_fail_install_when_static_dir_missing() {
        let conn = seeded();
        let mut plan = plan_for(users());
        plan.add_static(StaticMount {
            mount: "/uploads".to_string(),
            dir: PathBuf::from("/definitely/not/here"),
        })
        .unwrap();

        let result = AxumRouter::new().install(plan, ctx(&conn));
        assert!(result.is_err());
    }

    #[test]
    fn should_report_installed_routes_in_plan_order() {
        let conn = seeded();
        let app = AxumRouter::new()
            .install(plan_for(users()), ctx(&conn))
            .unwrap();

        let routes = app.routes();
        assert_eq!(routes.len(), 8);
        assert_eq!(routes[0], (Method::Get, "/admin/users".to_string()));
        assert!(routes.contains(&(Method::Post, "/admin/users/{id}/delete".to_string())));
    }

    #[tokio::test]
    async fn should_stop_serving_when_shutdown_triggered() {
        let conn = seeded();
        let app = AxumRouter::new()
            .install(plan_for(users()), ctx(&conn))
            .unwrap();
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let (trigger, signal) = shutdown_channel();

        let server = tokio::spawn(app.serve(listener, signal));
        trigger.trigger();

        server.await.unwrap().unwrap();
    }
}
