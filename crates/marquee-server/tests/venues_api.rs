mod common;

use axum::http::StatusCode;
use axum_test::TestServer;
use chrono::{Duration, Utc};
use marquee_db::entities::{artist, genre, show, venue, venue_genre};
use marquee_server::app;
use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value as DbValue};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use uuid::Uuid;

fn venue_named(name: &str) -> venue::Model {
    venue::Model {
        id: Uuid::new_v4(),
        name: name.into(),
        address: "1015 Folsom Street".into(),
        city: "San Francisco".into(),
        state: "CA".into(),
        phone: "123-123-1234".into(),
        website_link: Some("https://www.themusicalhop.com".into()),
        facebook_link: None,
        seeking_talent: false,
        seeking_description: None,
        image_link: None,
        created_at: Utc::now().fixed_offset(),
    }
}

fn artist_named(name: &str) -> artist::Model {
    artist::Model {
        id: Uuid::new_v4(),
        name: name.into(),
        city: "San Francisco".into(),
        state: "CA".into(),
        phone: "326-123-5000".into(),
        website_link: None,
        facebook_link: None,
        seeking_venue: false,
        seeking_description: None,
        image_link: Some("https://img.example.com/gnp.jpg".into()),
        created_at: Utc::now().fixed_offset(),
    }
}

fn count_row(n: i64) -> BTreeMap<&'static str, DbValue> {
    let mut row = BTreeMap::new();
    row.insert("num_items", DbValue::BigInt(Some(n)));
    row
}

#[tokio::test]
async fn venues_listing_groups_by_city_and_state() {
    let hop = venue_named("The Musical Hop");
    let mut pianos = venue_named("The Dueling Pianos Bar");
    pianos.city = "New York".into();
    pianos.state = "NY".into();
    let mut square = venue_named("Park Square Live Music & Coffee");
    square.city = "New York".into();
    square.state = "NY".into();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![hop, pianos, square]])
        // one upcoming-show count per venue
        .append_query_results([vec![count_row(1)]])
        .append_query_results([vec![count_row(0)]])
        .append_query_results([vec![count_row(2)]])
        .into_connection();
    let server = TestServer::new(app(common::test_app_state(db))).unwrap();

    let res = server.get("/venues").await;
    res.assert_status_ok();

    let areas: Value = res.json();
    let areas = areas.as_array().unwrap();
    assert_eq!(areas.len(), 2);
    assert_eq!(areas[0]["city"], "San Francisco");
    assert_eq!(areas[0]["venues"][0]["num_upcoming_shows"], 1);
    assert_eq!(areas[1]["city"], "New York");
    assert_eq!(areas[1]["venues"].as_array().unwrap().len(), 2);
    assert_eq!(areas[1]["venues"][1]["num_upcoming_shows"], 2);
}

#[tokio::test]
async fn get_unknown_venue_returns_404() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<venue::Model>::new()])
        .into_connection();
    let server = TestServer::new(app(common::test_app_state(db))).unwrap();

    let res = server.get(&format!("/venues/{}", Uuid::new_v4())).await;
    res.assert_status(StatusCode::NOT_FOUND);
    assert!(res.text().contains("Venue not found"));
}

#[tokio::test]
async fn venue_detail_partitions_past_and_upcoming_shows() {
    let now = Utc::now().fixed_offset();
    let venue = venue_named("The Musical Hop");
    let performer = artist_named("Guns N Petals");
    let jazz = genre::Model {
        id: Uuid::new_v4(),
        name: "Jazz".into(),
    };
    let past_show = show::Model {
        id: Uuid::new_v4(),
        venue_id: Some(venue.id),
        artist_id: Some(performer.id),
        start_time: now - Duration::days(10),
        created_at: now,
    };
    let future_show = show::Model {
        id: Uuid::new_v4(),
        venue_id: Some(venue.id),
        artist_id: Some(performer.id),
        start_time: now + Duration::days(10),
        created_at: now,
    };

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![venue.clone()]])
        .append_query_results([vec![jazz]])
        .append_query_results([vec![past_show, future_show]])
        .append_query_results([vec![performer.clone()]])
        .into_connection();
    let server = TestServer::new(app(common::test_app_state(db))).unwrap();

    let res = server.get(&format!("/venues/{}", venue.id)).await;
    res.assert_status_ok();

    let detail: Value = res.json();
    assert_eq!(detail["name"], "The Musical Hop");
    assert_eq!(detail["genres"], json!(["Jazz"]));
    assert_eq!(detail["past_shows_count"], 1);
    assert_eq!(detail["upcoming_shows_count"], 1);
    assert_eq!(detail["past_shows"][0]["artist_name"], "Guns N Petals");
    assert_eq!(
        detail["upcoming_shows"][0]["artist_id"],
        json!(performer.id)
    );
}

#[tokio::test]
async fn search_with_no_matches_returns_empty_result() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<venue::Model>::new()])
        .into_connection();
    let server = TestServer::new(app(common::test_app_state(db))).unwrap();

    let res = server
        .post("/venues/search")
        .json(&json!({ "search_term": "no such venue" }))
        .await;
    res.assert_status_ok();

    let results: Value = res.json();
    assert_eq!(results["count"], 0);
    assert_eq!(results["data"], json!([]));
}

#[tokio::test]
async fn create_venue_form_serves_the_choice_lists() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let server = TestServer::new(app(common::test_app_state(db))).unwrap();

    let res = server.get("/venues/create").await;
    res.assert_status_ok();

    let choices: Value = res.json();
    assert_eq!(choices["states"].as_array().unwrap().len(), 51);
    assert_eq!(choices["genres"].as_array().unwrap().len(), 19);
}

#[tokio::test]
async fn create_venue_with_dashless_phone_fails_validation() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let server = TestServer::new(app(common::test_app_state(db))).unwrap();

    let res = server
        .post("/venues/create")
        .json(&json!({
            "name": "The Dueling Pianos Bar",
            "city": "New York",
            "state": "NY",
            "address": "335 Delancey Street",
            "phone": "1234567890",
            "genres": ["Classical", "R&B", "Hip-Hop"]
        }))
        .await;
    res.assert_status(StatusCode::BAD_REQUEST);
    assert!(res
        .text()
        .contains("Venue The Dueling Pianos Bar could not be listed."));
}

#[tokio::test]
async fn create_venue_with_dashed_phone_succeeds() {
    let created = venue_named("The Dueling Pianos Bar");
    let jazz = genre::Model {
        id: Uuid::new_v4(),
        name: "Jazz".into(),
    };
    let link = venue_genre::Model {
        venue_id: created.id,
        genre_id: jazz.id,
    };

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        // venue insert, genre lookup, join-row insert
        .append_query_results([vec![created]])
        .append_query_results([vec![jazz]])
        .append_query_results([vec![link]])
        // clearing the (empty) previous genre set, plus the inserts
        .append_exec_results([
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            },
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            },
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            },
        ])
        .into_connection();
    let server = TestServer::new(app(common::test_app_state(db))).unwrap();

    let res = server
        .post("/venues/create")
        .json(&json!({
            "name": "The Dueling Pianos Bar",
            "city": "New York",
            "state": "NY",
            "address": "335 Delancey Street",
            "phone": "123-456-7890",
            "genres": ["Jazz"]
        }))
        .await;
    res.assert_status(StatusCode::CREATED);

    let flash: Value = res.json();
    assert_eq!(
        flash["message"],
        "Venue The Dueling Pianos Bar was successfully listed!"
    );
}

#[tokio::test]
async fn edit_venue_replaces_scalars_and_genres() {
    let existing = venue_named("The Musical Hop");
    let mut updated = existing.clone();
    updated.name = "The Musical Hop Annex".into();
    let funk = genre::Model {
        id: Uuid::new_v4(),
        name: "Funk".into(),
    };
    let link = venue_genre::Model {
        venue_id: existing.id,
        genre_id: funk.id,
    };

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        // lookup, update, genre lookup, join-row insert
        .append_query_results([vec![existing.clone()]])
        .append_query_results([vec![updated]])
        .append_query_results([vec![funk]])
        .append_query_results([vec![link]])
        // clearing the previous genre set, plus the update and insert
        .append_exec_results([
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 2,
            },
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            },
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            },
        ])
        .into_connection();
    let server = TestServer::new(app(common::test_app_state(db))).unwrap();

    let res = server
        .post(&format!("/venues/{}/edit", existing.id))
        .json(&json!({
            "name": "The Musical Hop Annex",
            "city": "San Francisco",
            "state": "CA",
            "address": "1015 Folsom Street",
            "phone": "123-123-1234",
            "genres": ["Funk"]
        }))
        .await;
    res.assert_status_ok();

    let flash: Value = res.json();
    assert_eq!(
        flash["message"],
        "Venue The Musical Hop Annex was successfully updated!"
    );
}

#[tokio::test]
async fn delete_venue_returns_the_deleted_name() {
    let venue = venue_named("Park Square Live Music & Coffee");
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![venue.clone()]])
        .append_exec_results([
            // venue delete, then the two orphan sweeps
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            },
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 2,
            },
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            },
        ])
        .into_connection();
    let server = TestServer::new(app(common::test_app_state(db))).unwrap();

    let res = server.delete(&format!("/venues/{}", venue.id)).await;
    res.assert_status_ok();

    let deleted: Value = res.json();
    assert_eq!(deleted["name"], "Park Square Live Music & Coffee");
}

#[tokio::test]
async fn delete_unknown_venue_returns_404() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<venue::Model>::new()])
        .into_connection();
    let server = TestServer::new(app(common::test_app_state(db))).unwrap();

    let res = server.delete(&format!("/venues/{}", Uuid::new_v4())).await;
    res.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_path_returns_the_404_page() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let server = TestServer::new(app(common::test_app_state(db))).unwrap();

    let res = server.get("/concerts").await;
    res.assert_status(StatusCode::NOT_FOUND);
    assert!(res.text().contains("Page not found"));
}
