//! Integration tests for the search service.
//!
//! These tests load a small fixture through the store loader, wire every
//! bundled filter and run searches through the async entry point.

use filter_chain::filters::{GroupAccessFilter, NoiseLevelFilter, ReservableFilter};
use filter_chain::{FilterServices, FilterType, SearchParams, SearchRequest, StaticDirectory};
use search_service::{SearchConfig, SearchOrchestrator, SpotView};
use spot_store::parse_spots;
use std::sync::Arc;

const FIXTURE: &str = r#"[
  {"id": 1, "name": "Odegaard 220", "latitude": 47.6565, "longitude": -122.3104,
   "building_name": "Odegaard Undergraduate Library", "floor": "2",
   "type": ["study_room", "lounge"], "capacity": 6,
   "available_hours": [{"day": "monday", "start": "08:00", "end": "20:00"}],
   "extended_info": {"noise_level": "quiet", "reservable": "true"}},
  {"id": 2, "name": "Suzzallo Reading Room", "latitude": 47.6558, "longitude": -122.3080,
   "type": ["study_room"],
   "available_hours": [{"day": "monday", "start": "07:00", "end": "12:00"}],
   "extended_info": {"noise_level": "silent", "reservable": "false"}},
  {"id": 3, "name": "Staff Lounge", "latitude": 47.6540, "longitude": -122.3060,
   "type": ["lounge"], "capacity": 12,
   "extended_info": {"noise_level": "moderate", "reservable": "reservations",
                     "access_group": "staff"}},
  {"id": 4, "name": "Engineering Lab", "latitude": 47.6533, "longitude": -122.3045,
   "type": ["computer_lab"], "capacity": 30,
   "extended_info": {"noise_level": "variable", "access_group": "staff, engineering"}}
]"#;

fn create_orchestrator() -> SearchOrchestrator {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("debug")
        .with_test_writer()
        .try_init();

    let index = parse_spots(FIXTURE, "fixture.json").unwrap();
    let directory = StaticDirectory::new()
        .with_member("staff", "dana")
        .with_member("engineering", "lee");
    let config = SearchConfig::default().with_filters([
        NoiseLevelFilter::ID,
        ReservableFilter::ID,
        GroupAccessFilter::ID,
    ]);

    SearchOrchestrator::from_config(
        Arc::new(index),
        config,
        FilterServices::new(Arc::new(directory)),
    )
    .unwrap()
}

async fn search(
    orchestrator: &SearchOrchestrator,
    pairs: &[(&str, &str)],
    caller: Option<&str>,
) -> Vec<SpotView> {
    let mut request = SearchRequest::new(SearchParams::from_pairs(pairs.iter().copied()));
    if let Some(caller) = caller {
        request = request.with_caller(caller);
    }
    orchestrator.search(request).await.unwrap()
}

fn ids(spots: &[SpotView]) -> Vec<u32> {
    spots.iter().map(|s| s.id).collect()
}

#[tokio::test]
async fn test_type_search_respects_group_access() {
    let orchestrator = create_orchestrator();
    let params = [("type", "study_room"), ("type", "lounge")];

    let anonymous = search(&orchestrator, &params, None).await;
    let staff = search(&orchestrator, &params, Some("dana")).await;

    // spot 1 carries both types and still appears once
    assert_eq!(ids(&anonymous), vec![1, 2]);
    assert_eq!(ids(&staff), vec![1, 2, 3]);
}

#[tokio::test]
async fn test_reservable_filter_through_orchestrator() {
    let orchestrator = create_orchestrator();

    let spots = search(&orchestrator, &[("extended_info:reservable", "true")], Some("dana")).await;
    assert_eq!(ids(&spots), vec![1, 3]);
}

#[tokio::test]
async fn test_noise_level_with_group_member() {
    let orchestrator = create_orchestrator();

    let spots = search(&orchestrator, &[("extended_info:noise_level", "quiet")], Some("lee")).await;
    assert_eq!(ids(&spots), vec![1, 4]);
}

#[tokio::test]
async fn test_open_window_search() {
    let orchestrator = create_orchestrator();

    let morning = search(
        &orchestrator,
        &[("open_at", "monday,10:00"), ("open_until", "monday,11:30")],
        None,
    )
    .await;
    assert_eq!(ids(&morning), vec![1, 2]);

    let past_noon = search(
        &orchestrator,
        &[("open_at", "monday,10:00"), ("open_until", "monday,12:30")],
        None,
    )
    .await;
    assert_eq!(ids(&past_noon), vec![1]);
}

#[tokio::test]
async fn test_bad_open_window_is_client_error() {
    let orchestrator = create_orchestrator();

    let request = SearchRequest::new(SearchParams::from_pairs([("open_until", "monday,12:00")]));
    let err = orchestrator.search(request).await.unwrap_err();
    assert_eq!(err.status_code(), 400);
}

#[tokio::test]
async fn test_substring_search_and_projection() {
    let orchestrator = create_orchestrator();

    let spots = search(&orchestrator, &[("name", "reading")], None).await;
    assert_eq!(ids(&spots), vec![2]);

    let json = serde_json::to_value(&spots[0]).unwrap();
    assert_eq!(json["uri"], "/api/v1/spot/2");
    assert_eq!(json["name"], "Suzzallo Reading Room");
    assert!(json["capacity"].is_null());
    assert_eq!(json["available_hours"]["monday"][0][1], "12:00");
    assert_eq!(json["extended_info"]["noise_level"], "silent");
}

#[tokio::test]
async fn test_distance_search_within_campus() {
    let orchestrator = create_orchestrator();

    let spots = search(
        &orchestrator,
        &[
            ("center_latitude", "47.6560"),
            ("center_longitude", "-122.3090"),
            ("distance", "150"),
        ],
        Some("dana"),
    )
    .await;
    assert_eq!(ids(&spots), vec![1, 2]);
}
