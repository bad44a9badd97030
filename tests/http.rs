use once_cell::sync::Lazy;
use reqwest::Client;
use serde::Deserialize;
use std::net::TcpListener;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

const FIXTURE_CSV: &str = "\
Data,Região,Produto,Valor Venda
2024-01-01,North,Apples,10
2024-01-02,South,Bananas,20
2024-01-03,North,Bananas,30
2024-01-03,East,Cereal,40
";

#[derive(Debug, Deserialize)]
struct MetaResponse {
    regions: Vec<String>,
    products: Vec<String>,
    max_date: Option<String>,
    row_count: usize,
}

#[derive(Debug, Deserialize)]
struct ValueBounds {
    min: f64,
    max: f64,
}

#[derive(Debug, Deserialize)]
struct MetricsResponse {
    total_sales: f64,
    average_ticket: f64,
    order_count: usize,
}

#[derive(Debug, Deserialize)]
struct GroupPoint {
    key: String,
    total: f64,
}

#[derive(Debug, Deserialize)]
struct DatePoint {
    date: String,
    total: f64,
}

#[derive(Debug, Deserialize)]
struct AppliedFilters {
    regions: Vec<String>,
    date_ceiling: String,
    row_count: usize,
}

#[derive(Debug, Deserialize)]
struct DashboardResponse {
    applied: AppliedFilters,
    value_bounds: ValueBounds,
    metrics: MetricsResponse,
    by_region: Vec<GroupPoint>,
    by_product: Vec<GroupPoint>,
    by_date: Vec<DatePoint>,
}

struct TestServer {
    base_url: String,
    child: Child,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

static SERVER: Lazy<Mutex<Option<Arc<TestServer>>>> = Lazy::new(|| Mutex::new(None));

#[cfg(unix)]
mod cleanup {
    use std::sync::Once;
    use std::sync::atomic::{AtomicI32, Ordering};

    static REGISTER: Once = Once::new();
    static PID: AtomicI32 = AtomicI32::new(0);

    pub fn register(pid: u32) {
        REGISTER.call_once(|| {
            PID.store(pid as i32, Ordering::SeqCst);
            unsafe {
                libc::atexit(on_exit);
            }
        });
    }

    extern "C" fn on_exit() {
        let pid = PID.load(Ordering::SeqCst);
        if pid > 0 {
            unsafe {
                libc::kill(pid, libc::SIGTERM);
            }
        }
    }
}

fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

fn unique_data_path(tag: &str) -> PathBuf {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!(
        "sales_dashboard_http_{tag}_{}_{nanos}.csv",
        std::process::id()
    ));
    path
}

fn spawn_with_data_path(data_path: &PathBuf, port: u16) -> Child {
    Command::new(env!("CARGO_BIN_EXE_sales_dashboard"))
        .env("PORT", port.to_string())
        .env("DASHBOARD_DATA_PATH", data_path)
        .env("RUST_LOG", "info")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn server")
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/api/meta")).send().await {
            if resp.status().is_success() {
                return;
            }
        }
        if Instant::now() > deadline {
            panic!("server did not become ready");
        }
        sleep(Duration::from_millis(100)).await;
    }
}

async fn spawn_server() -> TestServer {
    let port = pick_free_port();
    let data_path = unique_data_path("fixture");
    std::fs::write(&data_path, FIXTURE_CSV).expect("write fixture");

    let child = spawn_with_data_path(&data_path, port);

    #[cfg(unix)]
    cleanup::register(child.id());

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer { base_url, child }
}

async fn shared_server() -> Arc<TestServer> {
    let mut guard = SERVER.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let server = Arc::new(spawn_server().await);
    *guard = Some(Arc::clone(&server));
    server
}

async fn fetch_dashboard(base_url: &str, query: &str) -> DashboardResponse {
    let url = if query.is_empty() {
        format!("{base_url}/api/dashboard")
    } else {
        format!("{base_url}/api/dashboard?{query}")
    };
    Client::new()
        .get(url)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

#[tokio::test]
async fn http_meta_lists_sorted_labels() {
    let server = shared_server().await;

    let meta: MetaResponse = Client::new()
        .get(format!("{}/api/meta", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(meta.regions, vec!["East", "North", "South"]);
    assert_eq!(meta.products, vec!["Apples", "Bananas", "Cereal"]);
    assert_eq!(meta.max_date.as_deref(), Some("2024-01-03"));
    assert_eq!(meta.row_count, 4);
}

#[tokio::test]
async fn http_dashboard_without_filters_covers_the_table() {
    let server = shared_server().await;
    let dashboard = fetch_dashboard(&server.base_url, "").await;

    assert_eq!(dashboard.metrics.total_sales, 100.0);
    assert_eq!(dashboard.metrics.average_ticket, 25.0);
    assert_eq!(dashboard.metrics.order_count, 4);
    assert_eq!(dashboard.applied.row_count, 4);
    assert_eq!(dashboard.applied.date_ceiling, "2024-01-03");
    assert!(dashboard.applied.regions.is_empty());

    assert_eq!(dashboard.value_bounds.min, 10.0);
    assert_eq!(dashboard.value_bounds.max, 40.0);

    let dates: Vec<&str> = dashboard
        .by_date
        .iter()
        .map(|point| point.date.as_str())
        .collect();
    assert_eq!(dates, vec!["2024-01-01", "2024-01-02", "2024-01-03"]);
    assert_eq!(dashboard.by_date[2].total, 70.0);
}

#[tokio::test]
async fn http_region_filter_recomputes_bounds_and_metrics() {
    let server = shared_server().await;
    let dashboard = fetch_dashboard(&server.base_url, "regions=North").await;

    // Bounds come from the region view, not the full table.
    assert_eq!(dashboard.value_bounds.min, 10.0);
    assert_eq!(dashboard.value_bounds.max, 30.0);

    assert_eq!(dashboard.metrics.total_sales, 40.0);
    assert_eq!(dashboard.metrics.average_ticket, 20.0);
    assert_eq!(dashboard.metrics.order_count, 2);

    assert_eq!(dashboard.by_region.len(), 1);
    assert_eq!(dashboard.by_region[0].key, "North");
    assert_eq!(dashboard.by_region[0].total, 40.0);

    let products: Vec<(&str, f64)> = dashboard
        .by_product
        .iter()
        .map(|point| (point.key.as_str(), point.total))
        .collect();
    assert_eq!(products, vec![("Apples", 10.0), ("Bananas", 30.0)]);
}

#[tokio::test]
async fn http_value_range_and_date_ceiling_combine() {
    let server = shared_server().await;
    let dashboard =
        fetch_dashboard(&server.base_url, "min_value=15&date_ceiling=2024-01-02").await;

    assert_eq!(dashboard.metrics.order_count, 1);
    assert_eq!(dashboard.metrics.total_sales, 20.0);
    assert_eq!(dashboard.by_region.len(), 1);
    assert_eq!(dashboard.by_region[0].key, "South");
}

#[tokio::test]
async fn http_empty_result_is_valid_and_zeroed() {
    let server = shared_server().await;
    let dashboard =
        fetch_dashboard(&server.base_url, "regions=North&products=Cereal").await;

    assert_eq!(dashboard.metrics.order_count, 0);
    assert_eq!(dashboard.metrics.total_sales, 0.0);
    assert_eq!(dashboard.metrics.average_ticket, 0.0);
    assert!(dashboard.by_region.is_empty());
    assert!(dashboard.by_product.is_empty());
    assert!(dashboard.by_date.is_empty());
}

#[tokio::test]
async fn http_missing_dataset_halts_startup() {
    let port = pick_free_port();
    let data_path = unique_data_path("absent");
    let mut child = spawn_with_data_path(&data_path, port);

    let deadline = Instant::now() + Duration::from_secs(3);
    let status = loop {
        if let Some(status) = child.try_wait().expect("poll child") {
            break status;
        }
        if Instant::now() > deadline {
            let _ = child.kill();
            let _ = child.wait();
            panic!("server kept running despite a missing dataset");
        }
        sleep(Duration::from_millis(50)).await;
    };

    assert!(!status.success());
}
