use futures::future::join_all;
use serde_json::{json, Value};
use std::net::{SocketAddr, TcpListener};
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio_test::assert_ok;
use trivia_api::models::{load_seed_file, seed_gateway};
use trivia_api::{logger, serve, QuestionFlow, SqliteGateway, StorageGateway};

/// 启动一个绑定到随机端口的服务，返回地址和关闭句柄
async fn spawn_server(gateway: Arc<dyn StorageGateway>) -> (SocketAddr, oneshot::Sender<()>) {
    logger::init(false);

    let listener = TcpListener::bind("127.0.0.1:0").expect("绑定随机端口失败");
    let addr = listener.local_addr().unwrap();
    let flow = Arc::new(QuestionFlow::new(gateway));
    let (tx, rx) = oneshot::channel::<()>();

    tokio::spawn(async move {
        let shutdown = async {
            let _ = rx.await;
        };
        if let Err(e) = serve(flow, listener, shutdown).await {
            panic!("服务异常退出: {e}");
        }
    });

    (addr, tx)
}

async fn seeded_sqlite(dir: &tempfile::TempDir) -> Arc<dyn StorageGateway> {
    let gateway = SqliteGateway::open(&dir.path().join("trivia.db")).unwrap();
    let seed_path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("data/trivia.toml");
    let seed = load_seed_file(&seed_path).await.unwrap();
    seed_gateway(&gateway, seed).unwrap();
    Arc::new(gateway)
}

#[tokio::test]
async fn test_live_server_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let gateway = seeded_sqlite(&dir).await;
    let total = gateway.list_questions().unwrap().len();
    let (addr, shutdown) = spawn_server(gateway).await;
    let base = format!("http://{addr}");
    let client = reqwest::Client::new();

    // 分类
    let res = assert_ok!(client.get(format!("{base}/categories")).send().await);
    assert_eq!(res.status(), 200);
    assert_eq!(res.headers()["access-control-allow-origin"], "*");
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["categories"].as_object().unwrap().len(), 6);

    // 分页
    let body: Value = client
        .get(format!("{base}/questions?page=1"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["total_questions"], total);
    assert_eq!(body["questions"].as_array().unwrap().len(), 10);

    // 新建
    let res = client
        .post(format!("{base}/questions"))
        .json(&json!({
            "question": "What is the largest lake in Africa?",
            "answer": "Lake Victoria",
            "category": 3,
            "difficulty": 2
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let created = res.json::<Value>().await.unwrap()["created"].as_i64().unwrap();

    // 搜索刚刚新建的题目
    let body: Value = client
        .post(format!("{base}/questions"))
        .json(&json!({"searchTerm": "LARGEST LAKE"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["total_questions"], 1);
    assert_eq!(body["questions"][0]["id"], created);

    // 删除
    let res = client
        .delete(format!("{base}/questions/{created}"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let res = client
        .delete(format!("{base}/questions/{created}"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 404);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "question not found");

    // 预检
    let res = client
        .request(reqwest::Method::OPTIONS, format!("{base}/quizzes"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 204);
    assert_eq!(
        res.headers()["access-control-allow-methods"],
        "GET,PATCH,POST,DELETE,OPTIONS"
    );

    let _ = shutdown.send(());
}

#[tokio::test]
async fn test_concurrent_quizzes_respect_exclusions() {
    let dir = tempfile::tempdir().unwrap();
    let gateway = seeded_sqlite(&dir).await;
    let science: Vec<i64> = gateway
        .list_questions_by_category(1)
        .unwrap()
        .iter()
        .map(|q| q.id)
        .collect();
    assert!(science.len() >= 2);
    let (previous, allowed) = science.split_at(1);
    let allowed = allowed.to_vec();

    let (addr, shutdown) = spawn_server(gateway).await;
    let client = reqwest::Client::new();
    let url = format!("http://{addr}/quizzes");
    let payload = json!({
        "previous_questions": previous,
        "quiz_category": {"type": "Science", "id": 1}
    });

    let requests = (0..20).map(|_| {
        let client = client.clone();
        let url = url.clone();
        let payload = payload.clone();
        async move {
            let res = client.post(url).json(&payload).send().await.unwrap();
            assert_eq!(res.status(), 200);
            res.json::<Value>().await.unwrap()
        }
    });

    for body in join_all(requests).await {
        let id = body["question"]["id"].as_i64().unwrap();
        assert!(allowed.contains(&id), "got excluded or foreign id {id}");
        assert_eq!(body["question"]["category"], 1);
    }

    // 全部出过之后返回 null
    let res = client
        .post(&url)
        .json(&json!({"previous_questions": science, "quiz_category": {"id": 1}}))
        .send()
        .await
        .unwrap();
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({"success": true, "question": null}));

    let _ = shutdown.send(());
}
