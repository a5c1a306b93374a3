// jewel-server/tests/api_flow.rs
// 端到端测试: 真实路由 + jewel-client

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use jewel_client::{ClientConfig, ClientError, HttpClient, ProductListView};
use jewel_server::{Config, ErrorCode, Server, ServerState};
use shared::filter::{FilterCriteria, SortKey, SortOrder};
use shared::models::{CategoryCreate, ProductCreate, ProductStatus, ProductUpdate};
use shared::request::AdminProductQuery;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

const ADMIN: &str = "curator";
const PASSWORD: &str = "velvet-box-42";

struct TestServer {
    base_url: String,
    _work_dir: TempDir,
    _shutdown: oneshot::Sender<()>,
}

impl TestServer {
    async fn start() -> Self {
        let work_dir = TempDir::new().unwrap();
        let mut config = Config::with_overrides(work_dir.path().to_string_lossy(), 0);
        config.environment = "development".into();
        config.admin_username = Some(ADMIN.into());
        config.admin_password = Some(PASSWORD.into());

        let state = ServerState::initialize(&config).await.unwrap();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel::<()>();

        let server = Server::with_state(config, state);
        tokio::spawn(async move {
            server
                .serve(listener, async move {
                    let _ = rx.await;
                })
                .await
                .unwrap();
        });

        Self {
            base_url: format!("http://{addr}"),
            _work_dir: work_dir,
            _shutdown: tx,
        }
    }

    fn client(&self) -> HttpClient {
        HttpClient::new(&ClientConfig::new(&self.base_url).with_timeout(10)).unwrap()
    }

    async fn admin(&self) -> HttpClient {
        let client = self.client();
        client.login(ADMIN, PASSWORD).await.unwrap();
        client
    }
}

fn product(name: &str, code: &str, price: f64) -> ProductCreate {
    ProductCreate {
        name: name.into(),
        code: code.into(),
        description: None,
        category_id: None,
        price,
        stock: 1,
        status: None,
        is_featured: None,
        is_digital: None,
        show_in_store: None,
        show_in_catalog: None,
    }
}

#[tokio::test]
async fn test_login_and_me() {
    let server = TestServer::start().await;
    let client = server.client();

    let login = client.login(ADMIN, PASSWORD).await.unwrap();
    assert_eq!(login.user.username, ADMIN);
    assert!(login.user.is_admin());
    assert!(client.session().is_authenticated());

    let me = client.me().await.unwrap();
    assert_eq!(me, login.user);
}

#[tokio::test]
async fn test_wrong_password_rejected() {
    let server = TestServer::start().await;
    let client = server.client();

    let err = client.login(ADMIN, "nope").await.unwrap_err();

    assert!(matches!(err, ClientError::Unauthorized(_)));
    assert!(!client.session().is_authenticated());
}

#[tokio::test]
async fn test_product_crud() {
    let server = TestServer::start().await;
    let client = server.admin().await;

    let rings = client
        .create_category(&CategoryCreate {
            name: "Rings".into(),
            description: None,
            sort_order: None,
        })
        .await
        .unwrap();

    let mut payload = product("Ruby ring", "R-001", 120.0);
    payload.category_id = Some(rings.id);
    let created = client.create_product(&payload).await.unwrap();
    assert_eq!(created.category_id, Some(rings.id));
    assert_eq!(created.status, ProductStatus::Active);

    let updated = client
        .update_product(
            created.id,
            &ProductUpdate {
                price: Some(99.5),
                is_featured: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.price, 99.5);
    assert!(updated.is_featured);
    assert_eq!(updated.name, "Ruby ring");

    // Storefront listing is public
    let anonymous = server.client();
    assert_eq!(anonymous.list_products().await.unwrap().len(), 1);

    client.delete_product(created.id).await.unwrap();
    let err = client.get_product(created.id).await.unwrap_err();
    assert_eq!(err.status(), Some(404));
}

#[tokio::test]
async fn test_stale_csrf_token_refreshed() {
    let server = TestServer::start().await;
    let client = server.admin().await;
    client.session().set_csrf_token("1700000000000.deadbeef.cafe");

    let category = client
        .create_category(&CategoryCreate {
            name: "Necklaces".into(),
            description: None,
            sort_order: Some(2),
        })
        .await
        .unwrap();

    assert_eq!(category.name, "Necklaces");
    assert_ne!(
        client.session().csrf_token().as_deref(),
        Some("1700000000000.deadbeef.cafe")
    );
}

#[tokio::test]
async fn test_conflicts() {
    let server = TestServer::start().await;
    let client = server.admin().await;

    client.create_product(&product("Ruby ring", "R-001", 120.0)).await.unwrap();
    let err = client
        .create_product(&product("Other ring", "R-001", 80.0))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ClientError::Http {
            status: 409,
            code: Some(ErrorCode::ProductCodeExists),
            ..
        }
    ));
    assert!(!err.is_auth_failure());

    let category = client
        .create_category(&CategoryCreate {
            name: "Bracelets".into(),
            description: None,
            sort_order: None,
        })
        .await
        .unwrap();
    let mut payload = product("Silver bangle", "B-001", 45.0);
    payload.category_id = Some(category.id);
    client.create_product(&payload).await.unwrap();

    let err = client.delete_category(category.id).await.unwrap_err();
    assert!(matches!(
        err,
        ClientError::Http {
            status: 409,
            code: Some(ErrorCode::CategoryHasProducts),
            ..
        }
    ));
}

#[tokio::test]
async fn test_validation_errors_carry_fields() {
    let server = TestServer::start().await;
    let client = server.admin().await;

    let err = client
        .create_product(&product("Cursed ring", "X-1", -5.0))
        .await
        .unwrap_err();

    match err {
        ClientError::Validation { fields, .. } => assert!(fields.contains_key("price")),
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test]
async fn test_admin_list_pagination_and_search() {
    let server = TestServer::start().await;
    let client = server.admin().await;
    for i in 1..=5 {
        client
            .create_product(&product(&format!("Pearl {i}"), &format!("P-{i}"), 10.0 * i as f64))
            .await
            .unwrap();
    }
    client.create_product(&product("Gold chain", "G-1", 300.0)).await.unwrap();

    let page = client
        .admin_products(&AdminProductQuery {
            search: Some("pearl".into()),
            page: 2,
            limit: 2,
            ..AdminProductQuery::new()
        })
        .await
        .unwrap();

    assert_eq!(page.items.len(), 2);
    assert_eq!(page.pagination.total, 5);
    assert_eq!(page.pagination.pages, 3);
    assert!(page.items.iter().all(|p| p.name.starts_with("Pearl")));
}

#[tokio::test]
async fn test_product_list_view() {
    let server = TestServer::start().await;
    let client = server.admin().await;
    for (name, code, price) in [("Ruby ring", "R-1", 120.0), ("Pearl stud", "P-1", 40.0), ("Gold chain", "G-1", 15.0)] {
        client.create_product(&product(name, code, price)).await.unwrap();
    }

    let mut view = ProductListView::new(client);
    assert!(view.set_criteria(FilterCriteria::new()).await.unwrap());
    assert_eq!(view.visible().len(), 3);

    let local = FilterCriteria::new()
        .with_price_range(Some(20.0), None)
        .with_sort(SortKey::Price, SortOrder::Asc);
    assert!(!view.set_criteria(local).await.unwrap());
    let names: Vec<_> = view.visible().iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["Pearl stud", "Ruby ring"]);

    assert!(view.set_criteria(FilterCriteria::new().with_search("gold")).await.unwrap());
    assert_eq!(view.visible().len(), 1);
    assert_eq!(view.pagination().map(|p| p.total), Some(1));
}

#[tokio::test]
async fn test_logout_expires_session() {
    let server = TestServer::start().await;
    let expired = Arc::new(AtomicUsize::new(0));
    let counter = expired.clone();
    let config = ClientConfig::new(&server.base_url)
        .on_session_expired(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
    let client = HttpClient::new(&config).unwrap();
    client.login(ADMIN, PASSWORD).await.unwrap();

    client.logout().await.unwrap();
    assert!(!client.session().is_authenticated());

    let err = client
        .admin_products(&AdminProductQuery::new())
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Unauthorized(_)));
    assert_eq!(expired.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_newsletter_signup_is_public() {
    let server = TestServer::start().await;
    let visitor = server.client();

    let subscriber = visitor.subscribe("Buyer@Example.com").await.unwrap();
    assert_eq!(subscriber.email, "buyer@example.com");

    let err = visitor.subscribe("buyer@example.com").await.unwrap_err();
    assert_eq!(err.status(), Some(409));

    let err = visitor.subscribers().await.unwrap_err();
    assert!(matches!(err, ClientError::Unauthorized(_)));

    let admin = server.admin().await;
    assert_eq!(admin.subscribers().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_server_search_matches_local_case_folding() {
    let server = TestServer::start().await;
    let client = server.admin().await;
    client.create_product(&product("Émeraude solitaire", "EM-1", 900.0)).await.unwrap();
    client.create_product(&product("Ruby ring", "R-1", 120.0)).await.unwrap();

    let mut view = ProductListView::new(client);
    assert!(view.set_criteria(FilterCriteria::new().with_search("émeraude")).await.unwrap());
    assert_eq!(view.pagination().map(|p| p.total), Some(1));
    assert_eq!(view.visible().len(), 1);
    assert_eq!(view.visible()[0].code, "EM-1");
}
