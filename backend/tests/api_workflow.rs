use avalanche_backend::backend::storage::{MemoryConnection, Table};
use avalanche_backend::backend::{create_router, initialize_backend};
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use shared::{
    DeleteConfirmationResponse, ErrorResponse, EvolutionKind, EvolutionListResponse,
    ExportToPathResponse, StudentListResponse, StudentResponse, StudentStatistics,
    TransactionListResponse, TransactionStatistics, TransactionWithItems,
};
use tempfile::TempDir;
use tower::util::ServiceExt; // for `oneshot`

struct TestApp {
    router: Router,
    connection: MemoryConnection,
    export_dir: TempDir,
}

fn setup_test_app() -> TestApp {
    let connection = MemoryConnection::new();
    let export_dir = TempDir::new().expect("Failed to create export dir");
    let state = initialize_backend(connection.clone(), export_dir.path().join("pdfs"));

    TestApp {
        router: create_router(state),
        connection,
        export_dir,
    }
}

async fn send(app: &TestApp, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Vec<u8>) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, bytes.to_vec())
}

fn student_body(name: &str, gender: &str, status: &str) -> Value {
    json!({
        "nome_completo": name,
        "genero": gender,
        "data_nascimento": "2012-03-09",
        "cpf": "123.456.789-00",
        "status": status,
        "doencas": ["Asma"],
        "aulas_matriculadas": ["Jiu-jitsu", "Inglês"]
    })
}

async fn create_student(app: &TestApp, name: &str) -> StudentResponse {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/students",
        Some(student_body(name, "Feminino", "Ativo")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    serde_json::from_slice(&body).unwrap()
}

fn transaction_body() -> Value {
    json!({
        "issue_date": "2025-01-10",
        "entry_date": "2025-01-12",
        "company_name": "Loja do Esporte",
        "invoice_number": "NF-991",
        "items": [
            { "item_name": "Kimono", "quantity": 2, "unit_value": 150.0 },
            { "item_name": "Faixa", "quantity": 4, "unit_value": 12.5 }
        ]
    })
}

#[tokio::test]
async fn test_health_check() {
    let app = setup_test_app();

    let (status, body) = send(&app, Method::GET, "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_create_student_assigns_matricula_and_age() {
    let app = setup_test_app();

    let first = create_student(&app, "Ana Souza").await;
    let second = create_student(&app, "Bruno Lima").await;

    assert_eq!(first.student.record.matricula, "0001");
    assert_eq!(second.student.record.matricula, "0002");
    assert!(first.student.record.age.is_some());
    assert!(first.student.record.profile.enrollment_date.is_some());
    assert_eq!(first.success_message, "Aluno cadastrado com sucesso");
}

#[tokio::test]
async fn test_create_student_without_name_is_rejected() {
    let app = setup_test_app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/students",
        Some(student_body("   ", "Masculino", "Ativo")),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error: ErrorResponse = serde_json::from_slice(&body).unwrap();
    assert!(!error.error.is_empty());

    let (_, body) = send(&app, Method::GET, "/api/students", None).await;
    let list: StudentListResponse = serde_json::from_slice(&body).unwrap();
    assert!(list.students.is_empty());
}

#[tokio::test]
async fn test_list_and_search_students() {
    let app = setup_test_app();
    create_student(&app, "Ana Souza").await;
    create_student(&app, "Bruno Lima").await;

    let (status, body) = send(&app, Method::GET, "/api/students", None).await;
    assert_eq!(status, StatusCode::OK);
    let list: StudentListResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(list.students.len(), 2);
    assert_eq!(list.students[0].full_name(), "Bruno Lima");

    let (status, body) = send(&app, Method::GET, "/api/students?search=SOUZA", None).await;
    assert_eq!(status, StatusCode::OK);
    let found: StudentListResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(found.students.len(), 1);
    assert_eq!(found.students[0].full_name(), "Ana Souza");

    let (_, body) = send(&app, Method::GET, "/api/students?search=0002", None).await;
    let by_matricula: StudentListResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(by_matricula.students.len(), 1);
    assert_eq!(by_matricula.students[0].full_name(), "Bruno Lima");
}

#[tokio::test]
async fn test_get_missing_student_returns_not_found() {
    let app = setup_test_app();

    let (status, body) = send(&app, Method::GET, "/api/students/does-not-exist", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    let error: ErrorResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(error.error, "Aluno não encontrado.");
}

#[tokio::test]
async fn test_student_statistics() {
    let app = setup_test_app();
    create_student(&app, "Ana Souza").await;
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/students",
        Some(student_body("Carlos Dias", "Masculino", "Inativo")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, Method::GET, "/api/students/stats", None).await;

    assert_eq!(status, StatusCode::OK);
    let stats: StudentStatistics = serde_json::from_slice(&body).unwrap();
    assert_eq!(stats.total_students, 2);
    assert_eq!(stats.total_active, 1);
    assert_eq!(stats.total_inactive, 1);
    assert_eq!(stats.total_male, 1);
    assert_eq!(stats.total_female, 1);
}

#[tokio::test]
async fn test_inactivating_a_student_logs_a_status_change() {
    let app = setup_test_app();
    let created = create_student(&app, "Ana Souza").await;
    let id = created.student.id;

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/students/{id}"),
        Some(student_body("Ana Souza", "Feminino", "Inativo")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let updated: StudentResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(updated.success_message, "Aluno atualizado com sucesso");
    assert_eq!(updated.student.record.matricula, created.student.record.matricula);

    let (_, body) = send(&app, Method::GET, &format!("/api/students/{id}/evolution"), None).await;
    let evolution: EvolutionListResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(evolution.records.len(), 1);
    assert_eq!(evolution.records[0].entry.kind, EvolutionKind::StatusChange);
}

#[tokio::test]
async fn test_student_delete_requires_confirmation() {
    let app = setup_test_app();
    let created = create_student(&app, "Ana Souza").await;
    let uri = format!("/api/students/{}", created.student.id);

    let (status, body) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    let pending: DeleteConfirmationResponse = serde_json::from_slice(&body).unwrap();
    assert!(pending.confirmation_required);
    assert_eq!(pending.expires_in_ms, 3000);
    assert_eq!(pending.message, "Clique novamente para confirmar");

    let (status, _) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_arming_another_target_resets_the_confirmation() {
    let app = setup_test_app();
    let first = create_student(&app, "Ana Souza").await;
    let second = create_student(&app, "Bruno Lima").await;
    let first_uri = format!("/api/students/{}", first.student.id);
    let second_uri = format!("/api/students/{}", second.student.id);

    let (status, _) = send(&app, Method::DELETE, &first_uri, None).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    let (status, _) = send(&app, Method::DELETE, &second_uri, None).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    let (status, _) = send(&app, Method::DELETE, &first_uri, None).await;
    assert_eq!(status, StatusCode::ACCEPTED);

    let (_, body) = send(&app, Method::GET, "/api/students", None).await;
    let list: StudentListResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(list.students.len(), 2);
}

#[tokio::test]
async fn test_deleting_a_student_removes_its_evolution_records() {
    let app = setup_test_app();
    let created = create_student(&app, "Ana Souza").await;
    let id = created.student.id;

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/students/{id}/evolution"),
        Some(json!({ "data": "2025-03-01", "descricao": "Primeira graduação", "status": "Ativo" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let record: Value = serde_json::from_slice(&body).unwrap();
    let record_id = record["id"].as_str().unwrap().to_string();

    let uri = format!("/api/students/{id}");
    send(&app, Method::DELETE, &uri, None).await;
    let (status, _) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, Method::GET, &format!("/api/evolution/{record_id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_evolution_record_lifecycle() {
    let app = setup_test_app();
    let created = create_student(&app, "Ana Souza").await;
    let id = created.student.id;

    for (date, text) in [("2025-01-05", "Janeiro"), ("2025-03-05", "Março")] {
        let (status, _) = send(
            &app,
            Method::POST,
            &format!("/api/students/{id}/evolution"),
            Some(json!({ "data": date, "descricao": text, "status": "Ativo" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send(&app, Method::GET, &format!("/api/students/{id}/evolution"), None).await;
    assert_eq!(status, StatusCode::OK);
    let list: EvolutionListResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(list.records.len(), 2);
    assert_eq!(list.records[0].entry.description, "Março");
    assert_eq!(list.records[0].entry.kind, EvolutionKind::Note);

    let record_uri = format!("/api/evolution/{}", list.records[1].id);
    let (status, body) = send(
        &app,
        Method::PUT,
        &record_uri,
        Some(json!({ "data": "2025-01-06", "descricao": "Janeiro revisado", "status": "Ativo" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let updated: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(updated["descricao"], "Janeiro revisado");
    assert_eq!(updated["student_id"], id.as_str());

    let (status, _) = send(&app, Method::DELETE, &record_uri, None).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    let (status, _) = send(&app, Method::DELETE, &record_uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = send(&app, Method::GET, &format!("/api/students/{id}/evolution"), None).await;
    let list: EvolutionListResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(list.records.len(), 1);
}

#[tokio::test]
async fn test_evolution_for_unknown_student_returns_not_found() {
    let app = setup_test_app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/students/no-such-student/evolution",
        Some(json!({ "descricao": "x", "status": "Ativo" })),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    let error: ErrorResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(error.error, "Aluno não encontrado.");

    let (_, body) = send(&app, Method::GET, "/api/students/no-such-student/evolution", None).await;
    let list: EvolutionListResponse = serde_json::from_slice(&body).unwrap();
    assert!(list.records.is_empty());
}

#[tokio::test]
async fn test_evolution_without_description_is_rejected() {
    let app = setup_test_app();
    let created = create_student(&app, "Ana Souza").await;

    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/api/students/{}/evolution", created.student.id),
        Some(json!({ "descricao": "  ", "status": "Ativo" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_transaction_lifecycle() {
    let app = setup_test_app();

    let (status, body) = send(&app, Method::POST, "/api/transactions", Some(transaction_body())).await;
    assert_eq!(status, StatusCode::CREATED);
    let created: TransactionWithItems = serde_json::from_slice(&body).unwrap();
    assert_eq!(created.transaction.record.transaction_number, "000001");
    assert_eq!(created.transaction.record.total_value, 350.0);
    assert_eq!(created.items.len(), 2);
    assert_eq!(created.items[0].line.item_name, "Kimono");
    assert_eq!(created.items[0].line.final_value(), 300.0);

    let uri = format!("/api/transactions/{}", created.transaction.id);
    let (status, body) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    let fetched: TransactionWithItems = serde_json::from_slice(&body).unwrap();
    assert_eq!(fetched.items.len(), 2);

    let (status, body) = send(
        &app,
        Method::PUT,
        &uri,
        Some(json!({
            "issue_date": "2025-01-10",
            "entry_date": "2025-01-12",
            "company_name": "Loja do Esporte Ltda",
            "invoice_number": "NF-991",
            "items": [{ "item_name": "Luva", "quantity": 1, "unit_value": 80.0 }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let updated: TransactionWithItems = serde_json::from_slice(&body).unwrap();
    assert_eq!(updated.transaction.record.header.company_name, "Loja do Esporte Ltda");
    assert_eq!(updated.transaction.record.transaction_number, "000001");
    assert_eq!(updated.transaction.record.total_value, 80.0);
    assert_eq!(updated.items.len(), 1);

    let (status, _) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_transaction_item_without_name_is_rejected() {
    let app = setup_test_app();
    let mut body = transaction_body();
    body["items"][1]["item_name"] = json!("");

    let (status, response) = send(&app, Method::POST, "/api/transactions", Some(body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error: ErrorResponse = serde_json::from_slice(&response).unwrap();
    assert_eq!(error.error, "Nome do item 2 é obrigatório.");

    let (_, body) = send(&app, Method::GET, "/api/transactions", None).await;
    let list: TransactionListResponse = serde_json::from_slice(&body).unwrap();
    assert!(list.transactions.is_empty());
}

#[tokio::test]
async fn test_failed_item_insert_leaves_no_transaction_behind() {
    let app = setup_test_app();
    app.connection
        .set_offline(Table::TransactionItems, true)
        .unwrap();

    let (status, body) = send(&app, Method::POST, "/api/transactions", Some(transaction_body())).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let error: ErrorResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(error.error, "Erro ao salvar movimentação. Tente novamente.");

    let (_, body) = send(&app, Method::GET, "/api/transactions", None).await;
    let list: TransactionListResponse = serde_json::from_slice(&body).unwrap();
    assert!(list.transactions.is_empty());
}

#[tokio::test]
async fn test_search_and_statistics_for_transactions() {
    let app = setup_test_app();
    send(&app, Method::POST, "/api/transactions", Some(transaction_body())).await;
    let mut other = transaction_body();
    other["company_name"] = json!("Papelaria Central");
    other["invoice_number"] = json!("NF-100");
    other["items"] = json!([{ "item_name": "Caderno", "quantity": 10, "unit_value": 7.5 }]);
    send(&app, Method::POST, "/api/transactions", Some(other)).await;

    let (status, body) = send(&app, Method::GET, "/api/transactions?search=papelaria", None).await;
    assert_eq!(status, StatusCode::OK);
    let found: TransactionListResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(found.transactions.len(), 1);
    assert_eq!(found.transactions[0].record.transaction_number, "000002");

    let (status, body) = send(&app, Method::GET, "/api/transactions/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    let stats: TransactionStatistics = serde_json::from_slice(&body).unwrap();
    assert_eq!(stats.total_transactions, 2);
    assert_eq!(stats.total_value, 425.0);
}

#[tokio::test]
async fn test_download_pdf() {
    let app = setup_test_app();
    let (_, body) = send(&app, Method::POST, "/api/transactions", Some(transaction_body())).await;
    let created: TransactionWithItems = serde_json::from_slice(&body).unwrap();

    let request = Request::builder()
        .method(Method::GET)
        .uri(format!("/api/transactions/{}/pdf", created.transaction.id))
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"movimentacao-000001.pdf\""
    );
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert!(bytes.starts_with(b"%PDF"));
}

#[tokio::test]
async fn test_download_pdf_for_missing_transaction() {
    let app = setup_test_app();

    let (status, _) = send(&app, Method::GET, "/api/transactions/missing/pdf", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_export_writes_into_export_directory() {
    let app = setup_test_app();
    let (_, body) = send(&app, Method::POST, "/api/transactions", Some(transaction_body())).await;
    let created: TransactionWithItems = serde_json::from_slice(&body).unwrap();

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/transactions/{}/export", created.transaction.id),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    let exported: ExportToPathResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(exported.file_name, "movimentacao-000001.pdf");
    let expected = app.export_dir.path().join("pdfs").join("movimentacao-000001.pdf");
    assert_eq!(exported.file_path, expected.to_string_lossy());
    assert!(expected.exists());
}

#[tokio::test]
async fn test_store_outage_returns_generic_message() {
    let app = setup_test_app();
    app.connection.set_offline(Table::Students, true).unwrap();

    let (status, body) = send(&app, Method::GET, "/api/students", None).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let error: ErrorResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(error.error, "Erro ao carregar alunos.");
}
