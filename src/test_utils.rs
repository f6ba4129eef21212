use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use sea_orm::ConnectOptions;

use crate::database::Database;
use crate::services::artist::{ArtistInput, ArtistService};
use crate::services::venue::{VenueInput, VenueService};

pub async fn test_db() -> Arc<Database> {
    // A single long-lived connection keeps the in-memory database alive for
    // the whole test.
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1).min_connections(1).sqlx_logging(false);

    let database = Database::connect(opt).await.unwrap();
    Arc::new(database)
}

pub fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, min, 0)
        .unwrap()
}

pub fn time(h: u32, min: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, min, 0).unwrap()
}

pub fn venue_input(name: &str, city: &str, state: &str, genres: &[&str]) -> VenueInput {
    VenueInput {
        name: name.to_string(),
        city: city.to_string(),
        state: state.to_string(),
        address: "1015 Folsom Street".to_string(),
        phone: "123-123-1234".to_string(),
        image_link: None,
        facebook_link: None,
        website_link: None,
        seeking_talent: false,
        seeking_description: None,
        genres: genres.iter().map(|g| g.to_string()).collect(),
    }
}

pub fn artist_input(name: &str, from: NaiveTime, to: NaiveTime, genres: &[&str]) -> ArtistInput {
    ArtistInput {
        name: name.to_string(),
        city: Some("San Francisco".to_string()),
        state: Some("CA".to_string()),
        phone: None,
        image_link: None,
        facebook_link: None,
        website_link: None,
        seeking_venue: false,
        seeking_description: None,
        time_available_from: from,
        time_available_to: to,
        genres: genres.iter().map(|g| g.to_string()).collect(),
    }
}

pub async fn insert_venue(db: &Arc<Database>, name: &str) -> i64 {
    VenueService::new(db.clone())
        .create(venue_input(name, "San Francisco", "CA", &[]))
        .await
        .unwrap()
        .id
}

pub async fn insert_artist(db: &Arc<Database>, name: &str) -> i64 {
    ArtistService::new(db.clone())
        .create(artist_input(name, time(0, 0), time(23, 59), &[]))
        .await
        .unwrap()
        .id
}
