mod common;

use aidmatch_core::service::request_service::STATUS_COMPLETED;
use aidmatch_core::service::volunteer_service::LONELINESS_SAMPLE_SIZE;
use aidmatch_core::{
    fields, CloneOutcome, Coordinates, Locatable, OutreachError, RecordFilter, RecordStore,
    RequestService, SelectQuery, SqliteRecordStore, StaticGeocoder, StoreAuditSink, TaskCatalog,
    VolunteerSampler, VolunteerService,
};
use common::{config, full_address, seed, shared_db, RecordingAuditSink};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::json;
use std::collections::BTreeSet;
use std::sync::Arc;

const EMOTIONAL: &str =
    "Emotional support (talking on the phone with someone who is worried, scared, or lonely)";
const CHILDCARE: &str = "Childcare";

fn catalog() -> Arc<TaskCatalog> {
    Arc::new(TaskCatalog::builtin().expect("builtin catalog"))
}

fn grid_store(conn: &aidmatch_core::db::SharedConnection, table: &str) -> SqliteRecordStore {
    common::sqlite_store(conn, table).with_view("Grid view", RecordFilter::All)
}

fn volunteer_service(
    store: SqliteRecordStore,
    seed_value: u64,
) -> VolunteerService<SqliteRecordStore, StaticGeocoder, Arc<RecordingAuditSink>, StdRng> {
    VolunteerService::new(
        store,
        StaticGeocoder::new(),
        RecordingAuditSink::new(),
        VolunteerSampler::new(StdRng::seed_from_u64(seed_value)),
        catalog(),
        config(),
    )
}

#[tokio::test]
async fn volunteer_task_counts_skip_completed_and_unassigned_requests() {
    let conn = shared_db();
    let store = grid_store(&conn, "Requests");
    for value in [
        json!({ "Status": "Open", (fields::CONNECTED_VOLUNTEER): ["vol-a"] }),
        json!({ "Status": "In progress", (fields::CONNECTED_VOLUNTEER): ["vol-a", "vol-b"] }),
        json!({ "Status": "Open", (fields::CONNECTED_VOLUNTEER): ["vol-b"] }),
        json!({ "Status": STATUS_COMPLETED, (fields::CONNECTED_VOLUNTEER): ["vol-a"] }),
        json!({ "Status": "Open", (fields::CONNECTED_VOLUNTEER): [] }),
        json!({ (fields::CONNECTED_VOLUNTEER): ["vol-c"] }),
        json!({ "Status": "Open" }),
    ] {
        seed(&store, value).await;
    }
    let service = RequestService::new(
        store,
        StaticGeocoder::new(),
        RecordingAuditSink::new(),
        catalog(),
        config(),
    );

    let counts = service.volunteer_task_counts().await.expect("counts");

    assert_eq!(counts.get("vol-a"), Some(&2));
    assert_eq!(counts.get("vol-b"), Some(&1));
    assert_eq!(counts.get("vol-c"), Some(&1));
    assert_eq!(counts.len(), 3);
}

#[tokio::test]
async fn request_service_wraps_resolves_and_splits() {
    let conn = shared_db();
    let store = grid_store(&conn, "Requests");
    let errors = common::sqlite_store(&conn, "Errors");
    let row = seed(
        &store,
        json!({
            "Name": "Lin",
            "Address": "9 Pine Rd",
            "Tasks": ["Loneliness", "Grocery shopping"],
        }),
    )
    .await;
    let geocoder = StaticGeocoder::new().with_entry(
        &full_address("9 Pine Rd"),
        Coordinates::new(42.39, -71.1),
    );
    let service = RequestService::new(
        store.clone(),
        geocoder,
        StoreAuditSink::new(errors.clone()),
        catalog(),
        config(),
    );

    let request = service.wrap(row).expect("wrap");
    let request = service.resolve_coordinates(request).await.expect("resolve");
    let cache = request.coordinate_cache().expect("cache");
    assert_eq!(cache.coordinates, Coordinates::new(42.39, -71.1));

    let report = service
        .split_multi_task_request(&request)
        .await
        .expect("split");
    assert!(report.is_complete());
    match &report.clones {
        CloneOutcome::Created(created) => {
            assert_eq!(created.len(), 1);
            assert_eq!(
                created[0].1.get(fields::TASKS),
                Some(&json!(["Grocery shopping"]))
            );
            assert!(created[0].1.get(fields::COORDINATES).is_some());
        }
        CloneOutcome::Failed { error, .. } => panic!("unexpected failure: {error}"),
    }

    let audit_rows = errors
        .select_page(&SelectQuery::all(), None)
        .await
        .expect("errors");
    assert!(audit_rows.records.is_empty());
}

#[tokio::test]
async fn loneliness_outreach_draws_ten_active_eligible_volunteers() {
    let conn = shared_db();
    let store = grid_store(&conn, "Volunteers");
    for n in 0..14 {
        seed(
            &store,
            json!({ "Full Name": format!("listener-{n}"), (fields::CAPABILITIES): [EMOTIONAL] }),
        )
        .await;
    }
    for n in 0..4 {
        seed(
            &store,
            json!({
                "Full Name": format!("disabled-{n}"),
                (fields::CAPABILITIES): [EMOTIONAL],
                (fields::ACCOUNT_DISABLED): true,
            }),
        )
        .await;
    }
    for n in 0..6 {
        seed(
            &store,
            json!({ "Full Name": format!("sitter-{n}"), (fields::CAPABILITIES): [CHILDCARE] }),
        )
        .await;
    }
    let service = volunteer_service(store, 11);

    let drawn = service
        .find_volunteers_for_loneliness()
        .await
        .expect("outreach");

    assert_eq!(drawn.len(), LONELINESS_SAMPLE_SIZE);
    let names = drawn
        .iter()
        .filter_map(|volunteer| volunteer.display_name().map(str::to_string))
        .collect::<BTreeSet<_>>();
    assert_eq!(names.len(), LONELINESS_SAMPLE_SIZE);
    assert!(names.iter().all(|name| name.starts_with("listener-")));
}

#[tokio::test]
async fn small_pools_are_returned_whole() {
    let conn = shared_db();
    let store = grid_store(&conn, "Volunteers");
    for n in 0..3 {
        seed(
            &store,
            json!({ "Full Name": format!("listener-{n}"), (fields::CAPABILITIES): [EMOTIONAL] }),
        )
        .await;
    }
    let service = volunteer_service(store, 5);
    let catalog = catalog();
    let task = catalog.lookup_by_label("Loneliness").expect("task");

    let eligible = service.eligible_volunteers(task).await.expect("eligible");
    let drawn = service
        .find_outreach_candidates(task, 10)
        .await
        .expect("draw");

    assert_eq!(eligible.len(), 3);
    assert_eq!(drawn.len(), 3);
}

#[tokio::test]
async fn outreach_needs_the_loneliness_task_in_the_catalog() {
    let conn = shared_db();
    let store = grid_store(&conn, "Volunteers");
    let registry = aidmatch_core::PredicateRegistry::builtin();
    let catalog = TaskCatalog::from_json(r#"{"tasks":[{"id":"Other"}]}"#, &registry)
        .expect("catalog");
    let service = VolunteerService::new(
        store,
        StaticGeocoder::new(),
        RecordingAuditSink::new(),
        VolunteerSampler::new(StdRng::seed_from_u64(1)),
        Arc::new(catalog),
        config(),
    );

    let err = service
        .find_volunteers_for_loneliness()
        .await
        .expect_err("missing task");

    assert!(matches!(err, OutreachError::TaskNotInCatalog(ref id) if id == "Loneliness"));
}

#[tokio::test]
async fn volunteer_geocoding_failures_are_audited_against_the_volunteers_table() {
    let conn = shared_db();
    let store = grid_store(&conn, "Volunteers");
    let row = seed(&store, json!({ "Full Name": "Sam", "Address": "77 Nowhere Ln" })).await;
    let audit = RecordingAuditSink::new();
    let service = VolunteerService::new(
        store.clone(),
        StaticGeocoder::new(),
        Arc::clone(&audit),
        VolunteerSampler::new(StdRng::seed_from_u64(2)),
        catalog(),
        config(),
    );

    let err = service
        .resolve_coordinates(aidmatch_core::Volunteer::new(row.clone()))
        .await
        .expect_err("no geocode result");

    assert!(matches!(err, aidmatch_core::ResolveError::Geocode(_)));
    let rows = audit.rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].table, "Volunteers");
    assert_eq!(rows[0].record_id, row.id());
    let stored = store.find(row.id()).await.expect("find").expect("row");
    assert_eq!(stored, row);
}
