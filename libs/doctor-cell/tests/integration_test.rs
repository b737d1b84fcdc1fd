use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use doctor_cell::{DoctorRegistry, SupabaseDoctorRegistry};
use shared_utils::test_utils::{MockSupabaseResponses, TestConfig};

async fn registry_for(mock_server: &MockServer) -> SupabaseDoctorRegistry {
    let mut config = TestConfig::default().to_app_config();
    config.supabase_url = mock_server.uri();
    SupabaseDoctorRegistry::new(&config)
}

#[tokio::test]
async fn test_get_doctor_reads_consultation_fee() {
    let mock_server = MockServer::start().await;
    let doctor_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .and(query_param("id", format!("eq.{}", doctor_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::doctor_profile_row(doctor_id, Uuid::new_v4(), "Grace Hopper", 80.0, false)
        ])))
        .mount(&mock_server)
        .await;

    let registry = registry_for(&mock_server).await;
    let doctor = registry.get(doctor_id).await.unwrap().expect("doctor");

    assert_eq!(doctor.consultation_fee, Some(80.0));
    assert!(!doctor.verified);
    assert_eq!(doctor.specialization.as_deref(), Some("General Practice"));
}

#[tokio::test]
async fn test_mark_verified_patches_unverified_row() {
    let mock_server = MockServer::start().await;
    let doctor_id = Uuid::new_v4();
    let mut row = MockSupabaseResponses::doctor_profile_row(doctor_id, Uuid::new_v4(), "Grace Hopper", 80.0, true);
    row["verified_at"] = json!("2024-06-01T12:00:00Z");

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/doctors"))
        .and(query_param("id", format!("eq.{}", doctor_id)))
        .and(query_param("verified", "eq.false"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([row])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let registry = registry_for(&mock_server).await;
    let doctor = registry.mark_verified(doctor_id, chrono::Utc::now()).await.unwrap();

    assert!(doctor.verified);
    assert!(doctor.verified_at.is_some());
}

#[tokio::test]
async fn test_mark_verified_missing_doctor_is_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/doctors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let registry = registry_for(&mock_server).await;
    let result = registry.mark_verified(Uuid::new_v4(), chrono::Utc::now()).await;

    let err = tokio_test::assert_err!(result);
    assert!(matches!(err, doctor_cell::DoctorError::NotFound));
}

#[tokio::test]
async fn test_specialization_filter_is_url_encoded() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .and(query_param("specialization", "eq.General Practice"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::doctor_profile_row(Uuid::new_v4(), Uuid::new_v4(), "Grace Hopper", 80.0, true)
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let registry = registry_for(&mock_server).await;
    let doctors = registry.list_by_specialization("General Practice").await.unwrap();

    assert_eq!(doctors.len(), 1);
    assert_eq!(doctors[0].specialization.as_deref(), Some("General Practice"));
}

#[tokio::test]
async fn test_list_all_reads_every_row() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .and(query_param("order", "created_at.asc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::doctor_profile_row(Uuid::new_v4(), Uuid::new_v4(), "Grace Hopper", 80.0, true),
            MockSupabaseResponses::doctor_profile_row(Uuid::new_v4(), Uuid::new_v4(), "Alan Turing", 60.0, false)
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let registry = registry_for(&mock_server).await;
    assert_eq!(registry.list_all().await.unwrap().len(), 2);
}
