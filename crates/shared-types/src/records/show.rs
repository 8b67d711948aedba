//! Live shows, served by the shows listing API.

use chrono::{Duration, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::body::Body;
use crate::category::SHOW_GENRES;
use crate::dates::parse_source_date;
use crate::item::{CalendarItem, TimeWindow};
use crate::record::{present, require_date, RecordFacets, SkipReason, SourceRecord};

/// Shows start at 21:00 local and run until midnight.
pub const SHOW_START_HOUR: u32 = 21;
pub const SHOW_DURATION_HOURS: i64 = 3;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShowArtist {
    pub name: Option<String>,
    pub genre: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShowVenue {
    pub name: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShowTicketing {
    pub name: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Show {
    pub show_date: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub status: Option<String>,
    pub artist: Option<ShowArtist>,
    pub venue: Option<ShowVenue>,
    pub ticketera: Option<ShowTicketing>,
}

impl Show {
    fn artist_name(&self) -> Option<&str> {
        self.artist.as_ref().and_then(|a| present(&a.name))
    }

    fn genre(&self) -> Option<&str> {
        self.artist.as_ref().and_then(|a| present(&a.genre))
    }

    fn venue_name(&self) -> Option<&str> {
        self.venue.as_ref().and_then(|v| present(&v.name))
    }

    fn venue_address(&self) -> Option<&str> {
        self.venue.as_ref().and_then(|v| present(&v.address))
    }

    fn title(&self) -> String {
        format!(
            "{} - {}",
            self.artist_name().unwrap_or_default(),
            self.venue_name().unwrap_or_default()
        )
    }

    fn city_country(&self) -> String {
        format!(
            "{}, {}",
            present(&self.city).unwrap_or_default(),
            present(&self.country).unwrap_or_default()
        )
    }

    fn body(&self) -> String {
        let ticketing = self.ticketera.as_ref();

        let mut body = Body::new();
        body.line("🎤 Artista", self.artist_name().unwrap_or_default())
            .line("🏟️ Venue", self.venue_name().unwrap_or_default())
            .line("📍 Ciudad", self.city_country())
            .line("📊 Status", present(&self.status).unwrap_or("N/A"))
            .optional("🎫 Ticketera", ticketing.and_then(|t| present(&t.name)))
            .optional("🔗 URL", ticketing.and_then(|t| present(&t.url)))
            .optional("⭐ Género", self.genre());
        body.finish()
    }
}

impl SourceRecord for Show {
    fn label(&self) -> String {
        format!(
            "{} ({})",
            self.title(),
            present(&self.show_date).unwrap_or("sin fecha")
        )
    }

    fn validate(&self) -> Result<NaiveDate, SkipReason> {
        self.artist_name()
            .ok_or(SkipReason::MissingField("artist.name"))?;
        self.venue_name()
            .ok_or(SkipReason::MissingField("venue.name"))?;
        let date = require_date("show_date", present(&self.show_date))?;
        present(&self.city).ok_or(SkipReason::MissingField("city"))?;
        present(&self.country).ok_or(SkipReason::MissingField("country"))?;
        Ok(date)
    }

    fn to_calendar_item(&self, timezone: &str) -> Result<CalendarItem, SkipReason> {
        let date = self.validate()?;
        let start = date.and_time(NaiveTime::from_hms_opt(SHOW_START_HOUR, 0, 0).unwrap_or_default());

        let location = match self.venue_address() {
            Some(address) => address.to_string(),
            None => format!(
                "{}, {}",
                self.venue_name().unwrap_or_default(),
                self.city_country()
            ),
        };

        Ok(CalendarItem::published(
            self.title(),
            self.body(),
            TimeWindow::timed(start, Duration::hours(SHOW_DURATION_HOURS), timezone),
            Some(location),
            SHOW_GENRES.lookup(self.genre()),
        ))
    }

    fn facets(&self) -> RecordFacets {
        RecordFacets {
            artist: self.artist_name().map(str::to_string),
            venue: self.venue_name().map(str::to_string),
            city: present(&self.city).map(str::to_string),
            country: present(&self.country).map(str::to_string),
            category: None,
            genre: self.genre().map(str::to_string),
            date: present(&self.show_date).and_then(parse_source_date),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::CategoryTag;

    fn show() -> Show {
        serde_json::from_value(serde_json::json!({
            "show_date": "2024-08-03T00:00:00.000Z",
            "city": "Córdoba",
            "country": "Argentina",
            "status": "confirmed",
            "artist": { "name": "Wos", "genre": "Hip Hop" },
            "venue": { "name": "Quality Espacio", "address": null },
            "ticketera": { "name": "Ticketek", "url": "https://ticketek.com.ar/wos" },
            "capacity": 3000
        }))
        .expect("show json")
    }

    #[test]
    fn test_show_runs_until_midnight() {
        let item = show().to_calendar_item("America/Argentina/Buenos_Aires").unwrap();
        match item.window {
            TimeWindow::Timed { start, end, .. } => {
                assert_eq!(start.to_string(), "2024-08-03 21:00:00");
                assert_eq!(end.to_string(), "2024-08-04 00:00:00");
            }
            other => panic!("expected timed window, got {:?}", other),
        }
        assert_eq!(item.title, "Wos - Quality Espacio");
        assert_eq!(item.category, CategoryTag(3));
        assert_eq!(
            item.location.as_deref(),
            Some("Quality Espacio, Córdoba, Argentina")
        );
    }

    #[test]
    fn test_body() {
        let item = show().to_calendar_item("UTC").unwrap();
        assert_eq!(
            item.body,
            "🎤 Artista: Wos\n\
             🏟️ Venue: Quality Espacio\n\
             📍 Ciudad: Córdoba, Argentina\n\
             📊 Status: confirmed\n\
             🎫 Ticketera: Ticketek\n\
             🔗 URL: https://ticketek.com.ar/wos\n\
             ⭐ Género: Hip Hop"
        );
    }

    #[test]
    fn test_missing_nested_names_are_skipped() {
        let mut s = show();
        s.venue = None;
        assert_eq!(s.validate(), Err(SkipReason::MissingField("venue.name")));

        let mut s = show();
        s.artist = Some(ShowArtist::default());
        assert_eq!(s.validate(), Err(SkipReason::MissingField("artist.name")));
    }

    #[test]
    fn test_unknown_genre_uses_default_tag() {
        let mut s = show();
        s.artist = Some(ShowArtist {
            name: Some("Wos".to_string()),
            genre: Some("Trap".to_string()),
        });
        assert_eq!(
            s.to_calendar_item("UTC").unwrap().category,
            SHOW_GENRES.default_tag()
        );
    }
}
