use std::net::SocketAddr;

use axum::Router;
use configs::{AppConfig, DatabaseConfig};
use reqwest::StatusCode as HttpStatusCode;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use server::{routes, startup};

fn cors() -> CorsLayer { CorsLayer::very_permissive() }

struct TestApp {
    base_url: String,
    db_config: DatabaseConfig,
}

impl TestApp {
    async fn drop_database(&self) -> anyhow::Result<()> {
        let db = models::db::connect(&self.db_config).await?;
        db.drop().await?;
        Ok(())
    }
}

/// Serve the real MongoDB-backed app on an ephemeral port against a
/// throwaway database. `None` when no MongoDB is configured.
async fn start_server() -> anyhow::Result<Option<TestApp>> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(None);
    }
    let Ok(url) = std::env::var("MONGO_URI") else {
        eprintln!("MONGO_URI missing; skip e2e tests.");
        return Ok(None);
    };

    let mut cfg = AppConfig::default();
    cfg.database = DatabaseConfig {
        url,
        name: Some(format!("recipe_api_test_{}", Uuid::new_v4().simple())),
        ..DatabaseConfig::default()
    };
    let state = startup::build_state(&cfg).await?;

    let app: Router = routes::build_router(state, cors());
    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    let base_url = format!("http://{}:{}", addr.ip(), addr.port());

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await { eprintln!("server error: {}", e); }
    });

    Ok(Some(TestApp { base_url, db_config: cfg.database }))
}

fn negroni(slug: &str) -> Value {
    json!({
        "slug": slug,
        "name": "Negroni",
        "ingredients": [
            {"name": "Gin", "quantity": {"quantity": "30", "unit": "ml"}},
            {"name": "Campari", "quantity": {"quantity": "30", "unit": "ml"}},
            {"name": "Sweet vermouth", "quantity": {"quantity": "30", "unit": "ml"}}
        ],
        "instructions": ["Stir with ice", "Garnish with orange peel"]
    })
}

#[tokio::test]
async fn e2e_cocktail_lifecycle() -> anyhow::Result<()> {
    let Some(app) = start_server().await? else { return Ok(()) };
    let c = reqwest::Client::new();
    let base = &app.base_url;

    let res = c.post(format!("{base}/cocktails/")).json(&negroni("negroni")).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let created: Value = res.json().await?;
    assert!(created["_id"].is_string());
    assert!(created["date_added"].is_string());

    let res = c.get(format!("{base}/cocktails/negroni")).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    assert_eq!(res.json::<Value>().await?, created);

    let res = c.post(format!("{base}/cocktails/")).json(&negroni("negroni")).send().await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);
    assert_eq!(res.json::<Value>().await?["error"], "Duplicate key error.");

    let mut replacement = negroni("negroni");
    replacement["name"] = json!("Negroni Sbagliato");
    let res = c.put(format!("{base}/cocktails/negroni")).json(&replacement).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let updated: Value = res.json().await?;
    assert_eq!(updated["_id"], created["_id"]);
    assert_eq!(updated["date_added"], created["date_added"]);
    assert_eq!(updated["name"], "Negroni Sbagliato");
    assert!(updated["date_updated"].is_string());

    let res = c.put(format!("{base}/cocktails/missing")).json(&negroni("missing")).send().await?;
    assert_eq!(res.status(), HttpStatusCode::NOT_FOUND);

    let res = c.delete(format!("{base}/cocktails/negroni")).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    assert_eq!(res.json::<Value>().await?, updated);

    let res = c.get(format!("{base}/cocktails/negroni")).send().await?;
    assert_eq!(res.status(), HttpStatusCode::NOT_FOUND);

    app.drop_database().await
}

#[tokio::test]
async fn e2e_listing_pages() -> anyhow::Result<()> {
    let Some(app) = start_server().await? else { return Ok(()) };
    let c = reqwest::Client::new();
    let base = &app.base_url;

    for i in 0..12 {
        let mut body = negroni(&format!("negroni-{i:02}"));
        body["name"] = json!(format!("Negroni {i:02}"));
        let res = c.post(format!("{base}/cocktails/")).json(&body).send().await?;
        assert_eq!(res.status(), HttpStatusCode::OK);
    }

    let first: Value = c.get(format!("{base}/cocktails/")).send().await?.json().await?;
    assert_eq!(first["cocktails"].as_array().map(Vec::len), Some(10));
    assert_eq!(first["cocktails"][0]["name"], "Negroni 00");
    assert_eq!(first["_links"]["next"]["href"], format!("{base}/cocktails/?page=2"));
    assert_eq!(first["_links"]["last"]["href"], format!("{base}/cocktails/?page=2"));

    let second: Value = c.get(format!("{base}/cocktails/?page=2")).send().await?.json().await?;
    assert_eq!(second["cocktails"].as_array().map(Vec::len), Some(2));
    assert_eq!(second["_links"]["prev"]["href"], format!("{base}/cocktails/?page=1"));
    assert!(second["_links"].get("next").is_none());

    let recipes: Value = c.get(format!("{base}/recipes/")).send().await?.json().await?;
    assert_eq!(recipes["recipes"], json!([]));

    app.drop_database().await
}

#[tokio::test]
async fn e2e_recipe_replacement_clears_omitted_optional_fields() -> anyhow::Result<()> {
    let Some(app) = start_server().await? else { return Ok(()) };
    let c = reqwest::Client::new();
    let base = &app.base_url;

    let recipe = json!({
        "slug": "pancakes",
        "name": "Pancakes",
        "description": "Fluffy",
        "servings": 4,
        "ingredients": [{"name": "Flour", "quantity": {"quantity": "200", "unit": "g"}}],
        "steps": ["Mix", "Fry"]
    });
    let res = c.post(format!("{base}/recipes/")).json(&recipe).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let created: Value = res.json().await?;
    assert_eq!(created["servings"], 4);

    // a second create on a taken slug leaves the first recipe untouched
    let mut impostor = recipe.clone();
    impostor["name"] = json!("Crepes");
    let res = c.post(format!("{base}/recipes/")).json(&impostor).send().await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);
    let stored: Value = c.get(format!("{base}/recipes/pancakes")).send().await?.json().await?;
    assert_eq!(stored, created);

    let replacement = json!({
        "slug": "pancakes",
        "name": "Pancakes",
        "ingredients": [{"name": "Flour"}],
        "steps": ["Mix", "Fry"]
    });
    let res = c.put(format!("{base}/recipes/pancakes")).json(&replacement).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let updated: Value = res.json().await?;
    assert!(updated.get("description").is_none());
    assert!(updated.get("servings").is_none());
    assert_eq!(updated["_id"], created["_id"]);

    let fetched: Value = c.get(format!("{base}/recipes/pancakes")).send().await?.json().await?;
    assert_eq!(fetched, updated);

    app.drop_database().await
}
