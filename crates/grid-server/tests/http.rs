//! HTTP endpoint tests against the fixture catalog.

use std::path::PathBuf;

use axum::http::StatusCode;
use axum_test::TestServer;
use grid_model::{FieldKind, LayoutVariant, RowIndex, SurveyKey};
use grid_runtime::{parse_grid, parse_row_fragment};
use grid_schema::{CsvCatalog, FileStore, MemoryStore, StoreError, StoredSurvey, SurveyStore};
use grid_server::{AppState, router};
use serde_json::{Value, json};

const T01: &str = "/app/2025/bdgr/lista-ankiet/F1/A/T01/";
const T02: &str = "/app/2025/bdgr/lista-ankiet/F1/A/T02/";

fn fixtures() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../grid-schema/tests/fixtures/metadata")
}

fn catalog() -> CsvCatalog {
    CsvCatalog::load(&fixtures()).unwrap()
}

fn server_with(store: impl SurveyStore + 'static) -> TestServer {
    TestServer::new(router(AppState::new(catalog(), store))).unwrap()
}

fn server() -> TestServer {
    server_with(MemoryStore::new())
}

struct BrokenStore;

impl SurveyStore for BrokenStore {
    fn load(&self, _key: &SurveyKey) -> Result<Option<StoredSurvey>, StoreError> {
        Ok(None)
    }

    fn replace(&self, _key: &SurveyKey, _payload: &str) -> Result<StoredSurvey, StoreError> {
        Err(StoreError::Poisoned)
    }
}

#[tokio::test]
async fn health_is_ok() {
    let response = server().get("/health").await;
    response.assert_status_ok();
    assert_eq!(response.text(), "ok");
}

#[tokio::test]
async fn static_page_lists_one_row_per_code() {
    let response = server().get(T01).await;
    response.assert_status_ok();

    let grid = parse_grid(&response.text()).unwrap();
    assert_eq!(grid.variant, LayoutVariant::HorizontalStaticUnique);
    assert_eq!(grid.endpoint, T01);
    assert_eq!(grid.title, "1. Uprawy");
    let codes: Vec<_> = grid.rows.iter().filter_map(|row| row.code.clone()).collect();
    assert_eq!(codes, ["01", "02", "03"]);

    let blocked: Vec<bool> = grid
        .rows
        .iter()
        .map(|row| {
            row.fields
                .iter()
                .find(|field| field.spec.name == "Wartosc_Liczba")
                .unwrap()
                .spec
                .blocked
        })
        .collect();
    assert_eq!(blocked, [false, false, true]);
}

#[tokio::test]
async fn saved_answers_come_back_formatted() {
    let server = server();
    let response = server
        .post(T01)
        .text(r#"[{"Wartosc_Kod":"01","Wartosc_Liczba":12.5}]"#)
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>(), json!({"success": true}));

    let grid = parse_grid(&server.get(T01).await.text()).unwrap();
    let first = &grid.rows[0];
    let value = first
        .fields
        .iter()
        .find(|field| field.spec.name == "Wartosc_Liczba")
        .unwrap();
    assert_eq!(value.value, "12,50");
    assert!(value.spec.required);
}

#[tokio::test]
async fn saves_land_in_the_file_store() {
    let dir = tempfile::tempdir().unwrap();
    let server = server_with(FileStore::new(dir.path()));

    server
        .post(T02)
        .text(r#"[{"Zwierzeta_Kod":"10","Zwierzeta_Sztuki":3}]"#)
        .await
        .assert_status_ok();

    let saved = std::fs::read_to_string(dir.path().join("2025/F1/T02.json")).unwrap();
    assert!(saved.contains("Zwierzeta_Sztuki"));

    let grid = parse_grid(&server.get(T02).await.text()).unwrap();
    assert_eq!(
        grid.initial.as_deref(),
        Some(r#"[{"Zwierzeta_Kod":"10","Zwierzeta_Sztuki":3}]"#)
    );
    assert!(grid.rows.is_empty());
    assert_eq!(grid.catalogue.len(), 2);
}

#[tokio::test]
async fn invalid_json_is_rejected() {
    let response = server().post(T01).text("[{").await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body = response.json::<Value>();
    assert_eq!(body["success"], json!(false));
    assert!(body["message"].as_str().unwrap().contains("invalid JSON"));
}

#[tokio::test]
async fn store_failure_is_a_server_error() {
    let response = server_with(BrokenStore).post(T01).text("[]").await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.json::<Value>()["success"], json!(false));
}

#[tokio::test]
async fn unknown_tables_are_not_found() {
    let server = server();
    for path in [
        "/app/2025/bdgr/lista-ankiet/F1/A/T99/",
        "/app/1999/bdgr/lista-ankiet/F1/A/T01/",
        "/app/rok/bdgr/lista-ankiet/F1/A/T01/",
    ] {
        server.get(path).await.assert_status(StatusCode::NOT_FOUND);
    }
    server
        .post("/app/2025/bdgr/lista-ankiet/F1/A/T99/")
        .text("[]")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn system_tables_are_not_implemented() {
    server()
        .get("/app/2025/bdgr/lista-ankiet/F1/B/T05/")
        .await
        .assert_status(StatusCode::NOT_IMPLEMENTED);
}

#[tokio::test]
async fn row_fragment_for_a_dynamic_code() {
    let response = server().get(&format!("{T02}11/4")).await;
    response.assert_status_ok();

    let row = parse_row_fragment(&response.text()).unwrap();
    assert_eq!(row.index, Some(RowIndex(4)));
    assert_eq!(row.code.as_deref(), Some("11"));
    assert_eq!(row.title.as_deref(), Some("Trzoda chlewna"));
    let names: Vec<_> = row.fields.iter().map(|field| field.spec.name.as_str()).collect();
    assert_eq!(
        names,
        [
            "Zwierzeta_Kod",
            "Zwierzeta_Wyszczegolnienie",
            "Zwierzeta_Sztuki",
            "Zwierzeta_Rasa"
        ]
    );
    let code = &row.fields[0];
    assert!(code.spec.read_only);
    assert_eq!(code.value, "11");
    let breed = &row.fields[3];
    assert_eq!(breed.spec.kind, FieldKind::Choice);
    assert!(breed.spec.blocked);
    assert_eq!(breed.spec.options.len(), 2);
}

#[tokio::test]
async fn row_fragment_failures() {
    let server = server();
    server
        .get(&format!("{T02}10/first"))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    server
        .get(&format!("{T02}99/0"))
        .await
        .assert_status(StatusCode::NOT_FOUND);
    server
        .get(&format!("{T01}01/0"))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn description_is_served_as_json() {
    let response = server().get("/api/2025/F1/T04/description").await;
    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["variant"], json!("VERTICAL_STATIC_UNIQUE"));
    assert_eq!(body["endpoint"], json!("/app/2025/bdgr/lista-ankiet/F1/B/T04/"));
    assert_eq!(body["rows"].as_array().unwrap().len(), 4);
    assert_eq!(body["rows"][0]["title"], json!("1. Powierzchnia gospodarstwa"));
}

#[tokio::test]
async fn runtime_round_trip_through_the_server() {
    use grid_runtime::{
        FieldId, Grid, GridEvent, ManualClock, Response, RuntimeOptions, ScriptedTransport,
    };

    let server = server();
    let page = server.get(T02).await.text();
    let fragment = server.get(&format!("{T02}10/0")).await.text();

    let mut transport = ScriptedTransport::new().reply(200, fragment);
    let mut grid = Grid::attach(
        &page,
        RuntimeOptions::default(),
        Box::new(ManualClock::default()),
        &mut transport,
    )
    .unwrap();
    let index = grid.add_row("10", &mut transport).unwrap();
    assert_eq!(transport.requests[0].path, format!("{T02}10/0"));
    grid.handle(
        GridEvent::Input {
            field: FieldId::new(index, "Zwierzeta_Sztuki"),
            text: "1250".into(),
        },
        &mut transport,
    )
    .unwrap();

    let ticket = grid.begin_save(None).unwrap();
    let response = server.post(&ticket.path).text(ticket.body.clone()).await;
    let status = response.status_code().as_u16();
    let outcome = grid.finish_save(ticket, Ok(Response::new(status, response.text())));
    assert!(outcome.is_saved());

    let reloaded = parse_grid(&server.get(T02).await.text()).unwrap();
    let initial: Value = serde_json::from_str(reloaded.initial.as_deref().unwrap()).unwrap();
    assert_eq!(
        initial,
        json!([{
            "Zwierzeta_Kod": "10",
            "Zwierzeta_Wyszczegolnienie": "Bydło",
            "Zwierzeta_Sztuki": 1250,
        }])
    );
}
