use axum_server::Handle;
use serde_json::json;
use spore_client::records::parse_records;
use spore_client::{ClientError, SporeClient};
use spore_domain::config::{ApiConfig, TrainingConfig};
use spore_domain::mushroom::MushroomRecord;
use spore_server::Server;
use std::net::SocketAddr;

fn dataset() -> String {
    let mut rows = vec![
        "id;class;cap-diameter;cap-shape;cap-surface;cap-color;does-bruise-or-bleed;gill-attachment;gill-color;stem-height;stem-width;stem-color;has-ring;ring-type;habitat;season".to_owned(),
    ];
    for i in 0..40 {
        let jitter = f64::from(i % 5) * 0.2;
        rows.push(if i % 2 == 0 {
            format!("{i};p;{:.1};x;g;o;f;e;w;{:.1};{:.1};w;t;g;d;w", 15.0 + jitter, 16.0 + jitter, 17.0 + jitter)
        } else {
            format!("{i};e;{:.1};f;s;n;t;a;n;{:.1};{:.1};n;f;f;g;s", 3.0 + jitter, 4.0 + jitter, 5.0 + jitter)
        });
    }
    rows.join("\n")
}

fn mushrooms() -> Vec<MushroomRecord> {
    let body = json!([
        {
            "cap_shape": "x", "cap_surface": "g", "cap_color": "o",
            "does_bruise_or_bleed": "f", "gill_attachment": "e", "gill_color": "w",
            "stem_color": "w", "has_ring": "t", "ring_type": "g", "habitat": "d",
            "season": "w", "cap_diameter": 15.2, "stem_height": 16.1, "stem_width": 17.3
        },
        {
            "cap_shape": "f", "cap_surface": "s", "cap_color": "n",
            "does_bruise_or_bleed": "t", "gill_attachment": "a", "gill_color": "n",
            "stem_color": "n", "has_ring": "f", "ring_type": "f", "habitat": "g",
            "season": "s", "cap_diameter": 3.1, "stem_height": 4.2, "stem_width": 5.3
        }
    ]);
    parse_records(&body.to_string()).unwrap()
}

async fn spawn(dir: &tempfile::TempDir) -> SporeClient {
    let mut cfg = ApiConfig::default();
    cfg.model.path = dir.path().join("model.bin");
    cfg.training = TrainingConfig { n_trees: 10, min_samples_split: 2, ..TrainingConfig::default() };
    let app = Server::builder().config(cfg).build().await.unwrap().router();

    let handle = Handle::<SocketAddr>::new();
    let server = axum_server::bind(SocketAddr::from(([127, 0, 0, 1], 0))).handle(handle.clone());
    tokio::spawn(async move { server.serve(app.into_make_service()).await });

    let address = handle.listening().await.unwrap();
    SporeClient::new(&format!("http://{address}")).unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn untrained_server_answers_null_and_status_fails() {
    let dir = tempfile::tempdir().unwrap();
    let client = spawn(&dir).await;
    let records = mushrooms();

    assert_eq!(client.predict(&records[0]).await.unwrap().poisonous, None);
    assert!(client.predict_batch(records).await.unwrap().iter().all(|r| r.poisonous.is_none()));

    match client.status().await {
        Err(ClientError::Api { status, .. }) => assert_eq!(status, 500),
        other => panic!("expected a 500, got {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn fit_then_query_every_endpoint() {
    let dir = tempfile::tempdir().unwrap();
    let client = spawn(&dir).await;
    let csv = dir.path().join("train.csv");
    std::fs::write(&csv, dataset()).unwrap();

    assert!(client.fit(&csv).await.unwrap().success);
    assert!(!client.status().await.unwrap().model_trained_at.is_empty());

    let records = mushrooms();
    assert_eq!(client.predict(&records[0]).await.unwrap().poisonous, Some(true));
    assert_eq!(client.predict(&records[1]).await.unwrap().poisonous, Some(false));

    let batch = client.predict_batch(records.clone()).await.unwrap();
    assert_eq!(batch.iter().map(|r| r.poisonous).collect::<Vec<_>>(), [Some(true), Some(false)]);

    let single = client.predict_proba(&records[0]).await.unwrap().probability_of_poisonous.unwrap();
    let probabilities = client.predict_proba_batch(&records).await.unwrap();
    assert_eq!(probabilities.len(), 2);
    assert!((probabilities[0].probability_of_poisonous.unwrap() - single).abs() < 1e-12);
    assert!(probabilities[1].probability_of_poisonous.unwrap() < 0.5);
}

#[tokio::test(flavor = "multi_thread")]
async fn server_errors_carry_the_detail() {
    let dir = tempfile::tempdir().unwrap();
    let client = spawn(&dir).await;
    let notes = dir.path().join("notes.txt");
    std::fs::write(&notes, "not a dataset").unwrap();

    match client.fit(&notes).await {
        Err(ClientError::Api { status, detail, .. }) => {
            assert_eq!(status, 400);
            assert!(!detail.is_empty());
        },
        other => panic!("expected a 400, got {other:?}"),
    }
}
