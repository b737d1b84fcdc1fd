mod common;

use serde_json::json;
use uuid::Uuid;

use appointment_cell::*;
use patient_cell::PatientProfile;

use common::fixture;

#[tokio::test]
async fn test_patient_view_shows_doctor_only() {
    let fx = fixture().await;
    let booked = AppointmentBookingService::new(&fx.state)
        .book(fx.request(Some("2024-05-01"), Some("10:00")))
        .await
        .unwrap();

    let views = VisibilityGateway::new(&fx.state)
        .for_patient_account(fx.patient.user_id)
        .await
        .unwrap();

    assert_eq!(views.len(), 1);
    let value = serde_json::to_value(&views[0]).unwrap();

    assert_eq!(value["id"], booked.id.to_string());
    assert_eq!(value["appointmentDate"], "2024-05-01");
    assert_eq!(value["appointmentTime"], "10:00:00");
    assert_eq!(value["status"], "PENDING");
    assert_eq!(value["fee"], 75.0);
    assert_eq!(value["prescription"], serde_json::Value::Null);
    assert_eq!(
        value["doctor"],
        json!({
            "id": fx.doctor.id,
            "specialization": "Cardiology",
            "user": { "name": "Grace Hopper", "email": "grace@example.com" }
        })
    );
    assert!(value.get("patient").is_none());
}

#[tokio::test]
async fn test_doctor_view_shows_patient_only() {
    let fx = fixture().await;
    AppointmentBookingService::new(&fx.state)
        .book(fx.request(Some("2024-05-01"), Some("10:00")))
        .await
        .unwrap();

    let gateway = VisibilityGateway::new(&fx.state);
    let by_id = gateway.for_doctor(fx.doctor.id).await.unwrap();
    let by_account = gateway.for_doctor_account(fx.doctor.user_id).await.unwrap();

    assert_eq!(by_id, by_account);
    let value = serde_json::to_value(&by_id[0]).unwrap();

    assert_eq!(
        value["patient"],
        json!({
            "id": fx.patient.id,
            "user": { "name": "Ada Byrne", "email": "ada@example.com", "phone": "+353 1 555 0100" }
        })
    );
    assert!(value.get("doctor").is_none());
}

#[tokio::test]
async fn test_unlinked_accounts_see_empty_lists() {
    let fx = fixture().await;
    AppointmentBookingService::new(&fx.state).book(fx.request(None, None)).await.unwrap();

    let gateway = VisibilityGateway::new(&fx.state);
    assert!(gateway.for_patient_account(Uuid::new_v4()).await.unwrap().is_empty());
    assert!(gateway.for_doctor_account(Uuid::new_v4()).await.unwrap().is_empty());
    assert!(gateway.for_doctor(Uuid::new_v4()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_missing_counterpart_projects_empty_summary() {
    let fx = fixture().await;
    let orphan = NewAppointment {
        patient_id: Uuid::new_v4(),
        doctor_id: fx.doctor.id,
        appointment_date: None,
        appointment_time: None,
        status: AppointmentStatus::Pending,
        reason: String::new(),
        notes: String::new(),
        fee: None,
    };
    fx.state.ledger.create(orphan).await.unwrap();

    let views = VisibilityGateway::new(&fx.state).for_doctor(fx.doctor.id).await.unwrap();

    assert_eq!(views.len(), 1);
    assert_eq!(views[0].patient, Some(CounterpartSummary::default()));
    assert_eq!(serde_json::to_value(&views[0]).unwrap()["patient"], json!({}));
}

#[tokio::test]
async fn test_views_only_include_own_appointments() {
    let fx = fixture().await;
    let other_patient = fx.patients
        .insert(PatientProfile::new(Uuid::new_v4(), "Alan Kay", "alan@example.com"))
        .await
        .unwrap();

    let service = AppointmentBookingService::new(&fx.state);
    service.book(fx.request(None, None)).await.unwrap();

    let mut request = fx.request(None, None);
    request.patient_id = other_patient.user_id;
    service.book(request).await.unwrap();

    let gateway = VisibilityGateway::new(&fx.state);
    assert_eq!(gateway.for_patient_account(fx.patient.user_id).await.unwrap().len(), 1);
    assert_eq!(gateway.for_patient_account(other_patient.user_id).await.unwrap().len(), 1);
    assert_eq!(gateway.for_doctor(fx.doctor.id).await.unwrap().len(), 2);
    assert_eq!(gateway.all().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_stats_count_each_status() {
    let fx = fixture().await;
    let booking = AppointmentBookingService::new(&fx.state);
    let lifecycle = AppointmentLifecycleService::new(&fx.state);

    let a = booking.book(fx.request(None, None)).await.unwrap();
    let b = booking.book(fx.request(None, None)).await.unwrap();
    booking.book(fx.request(None, None)).await.unwrap();

    lifecycle.confirm(a.id).await.unwrap();
    lifecycle.cancel(b.id).await.unwrap();

    let stats = VisibilityGateway::new(&fx.state).stats().await.unwrap();
    assert_eq!(
        stats,
        AppointmentStats {
            total_appointments: 3,
            pending_appointments: 1,
            confirmed_appointments: 1,
            cancelled_appointments: 1,
            completed_appointments: 0,
        }
    );
}
