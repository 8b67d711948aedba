//! Management events, read from `mgm_events` joined with artists and venues.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[cfg(feature = "diesel")]
use diesel::sql_types::{BigInt, Nullable, Text};

use crate::body::Body;
use crate::category::ManagementClass;
use crate::dates::{format_short_date, group_thousands};
use crate::item::{CalendarItem, TimeWindow};
use crate::record::{present, require_date, RecordFacets, SkipReason, SourceRecord};

const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "diesel", derive(diesel::QueryableByName))]
pub struct ManagementEvent {
    #[cfg_attr(feature = "diesel", diesel(sql_type = Nullable<Text>))]
    pub show_date: Option<String>,
    #[cfg_attr(feature = "diesel", diesel(sql_type = Nullable<Text>))]
    pub country: Option<String>,
    #[cfg_attr(feature = "diesel", diesel(sql_type = Nullable<Text>))]
    pub city: Option<String>,
    #[cfg_attr(feature = "diesel", diesel(sql_type = Nullable<Text>))]
    pub nombre_festi: Option<String>,
    #[cfg_attr(feature = "diesel", diesel(sql_type = Nullable<Text>))]
    pub status: Option<String>,
    #[cfg_attr(feature = "diesel", diesel(sql_type = Nullable<BigInt>))]
    pub aforo: Option<i64>,
    #[cfg_attr(feature = "diesel", diesel(sql_type = Nullable<Text>))]
    pub formato: Option<String>,
    #[cfg_attr(feature = "diesel", diesel(sql_type = Nullable<Text>))]
    pub acuerdo: Option<String>,
    #[cfg_attr(feature = "diesel", diesel(sql_type = Nullable<Text>))]
    pub garantia: Option<String>,
    #[cfg_attr(feature = "diesel", diesel(sql_type = Nullable<Text>))]
    pub overage: Option<String>,
    #[cfg_attr(feature = "diesel", diesel(sql_type = Nullable<Text>))]
    pub wht: Option<String>,
    #[cfg_attr(feature = "diesel", diesel(sql_type = Nullable<Text>))]
    pub com_promotor: Option<String>,
    #[cfg_attr(feature = "diesel", diesel(sql_type = Nullable<Text>))]
    pub spliteo: Option<String>,
    #[cfg_attr(feature = "diesel", diesel(sql_type = Nullable<Text>))]
    pub artist_name: Option<String>,
    #[cfg_attr(feature = "diesel", diesel(sql_type = Nullable<Text>))]
    pub artist_genre: Option<String>,
    #[cfg_attr(feature = "diesel", diesel(sql_type = Nullable<Text>))]
    pub venue_name: Option<String>,
    #[cfg_attr(feature = "diesel", diesel(sql_type = Nullable<Text>))]
    pub venue_address: Option<String>,
}

impl ManagementEvent {
    fn title(&self) -> String {
        let artist = present(&self.artist_name).unwrap_or(NOT_AVAILABLE);
        match present(&self.nombre_festi).or(present(&self.venue_name)) {
            Some(place) => format!("{} - {}", artist, place),
            None => artist.to_string(),
        }
    }

    fn location(&self) -> String {
        if let Some(address) = present(&self.venue_address) {
            return address.to_string();
        }

        [
            present(&self.venue_name),
            present(&self.city),
            present(&self.country),
        ]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(", ")
    }

    fn class(&self) -> ManagementClass {
        ManagementClass::classify(
            present(&self.nombre_festi),
            present(&self.formato),
            self.aforo,
            present(&self.status),
        )
    }

    fn body(&self, date: NaiveDate) -> String {
        let mut body = Body::new();
        body.line(
            "🎤 Artista",
            present(&self.artist_name).unwrap_or(NOT_AVAILABLE),
        )
        .line("🏟️ Venue", present(&self.venue_name).unwrap_or(NOT_AVAILABLE))
        .line(
            "📍 Ciudad",
            format!(
                "{}, {}",
                present(&self.city).unwrap_or_default(),
                present(&self.country).unwrap_or_default()
            ),
        )
        .line("📅 Fecha", format_short_date(date))
        .line("📊 Status", present(&self.status).unwrap_or(NOT_AVAILABLE))
        .optional("🎵 Género", present(&self.artist_genre))
        .optional(
            "👥 Aforo",
            self.aforo.filter(|a| *a != 0).map(group_thousands),
        )
        .optional("🎭 Formato", present(&self.formato))
        .optional("🎪 Festival", present(&self.nombre_festi))
        .optional("💰 Garantía", present(&self.garantia))
        .optional("📋 Acuerdo", present(&self.acuerdo))
        .optional("📈 Overage", present(&self.overage))
        .optional("🤝 Com. Promotor", present(&self.com_promotor))
        .optional("⚖️ Spliteo", present(&self.spliteo));
        body.finish()
    }
}

impl SourceRecord for ManagementEvent {
    fn label(&self) -> String {
        format!(
            "{} ({})",
            self.title(),
            present(&self.show_date).unwrap_or("sin fecha")
        )
    }

    fn validate(&self) -> Result<NaiveDate, SkipReason> {
        present(&self.artist_name).ok_or(SkipReason::MissingField("artist_name"))?;
        let date = require_date("show_date", present(&self.show_date))?;
        present(&self.city).ok_or(SkipReason::MissingField("city"))?;
        present(&self.country).ok_or(SkipReason::MissingField("country"))?;
        Ok(date)
    }

    fn to_calendar_item(&self, _timezone: &str) -> Result<CalendarItem, SkipReason> {
        let date = self.validate()?;

        Ok(CalendarItem::published(
            self.title(),
            self.body(date),
            TimeWindow::all_day(date),
            Some(self.location()),
            self.class().tag(),
        ))
    }

    fn facets(&self) -> RecordFacets {
        RecordFacets {
            artist: present(&self.artist_name).map(str::to_string),
            venue: present(&self.venue_name).map(str::to_string),
            city: present(&self.city).map(str::to_string),
            country: present(&self.country).map(str::to_string),
            category: present(&self.nombre_festi).map(str::to_string),
            genre: present(&self.artist_genre).map(str::to_string),
            date: self.validate().ok(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::CategoryTag;

    fn event() -> ManagementEvent {
        ManagementEvent {
            artist_name: Some("Dillom".to_string()),
            venue_name: Some("Movistar Arena".to_string()),
            show_date: Some("2024-11-15".to_string()),
            city: Some("Buenos Aires".to_string()),
            country: Some("Argentina".to_string()),
            status: Some("confirmed".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_all_day_window_ends_next_day() {
        let item = event().to_calendar_item("UTC").unwrap();
        assert_eq!(
            item.window,
            TimeWindow::AllDay {
                start: NaiveDate::from_ymd_opt(2024, 11, 15).unwrap(),
                end: NaiveDate::from_ymd_opt(2024, 11, 16).unwrap(),
            }
        );
        assert_eq!(item.title, "Dillom - Movistar Arena");
        assert_eq!(item.category, CategoryTag(10));
    }

    #[test]
    fn test_festival_takes_over_title_and_tag() {
        let mut e = event();
        e.nombre_festi = Some("Cosquín Rock".to_string());
        let item = e.to_calendar_item("UTC").unwrap();
        assert_eq!(item.title, "Dillom - Cosquín Rock");
        assert_eq!(item.category, CategoryTag(2));
    }

    #[test]
    fn test_location_prefers_address() {
        let mut e = event();
        assert_eq!(
            e.to_calendar_item("UTC").unwrap().location.as_deref(),
            Some("Movistar Arena, Buenos Aires, Argentina")
        );
        e.venue_address = Some("Humboldt 450".to_string());
        assert_eq!(
            e.to_calendar_item("UTC").unwrap().location.as_deref(),
            Some("Humboldt 450")
        );
    }

    #[test]
    fn test_body_lines() {
        let mut e = event();
        e.aforo = Some(15000);
        e.formato = Some("Banda completa".to_string());
        e.garantia = Some("USD 20000".to_string());
        let item = e.to_calendar_item("UTC").unwrap();
        assert_eq!(
            item.body,
            "🎤 Artista: Dillom\n\
             🏟️ Venue: Movistar Arena\n\
             📍 Ciudad: Buenos Aires, Argentina\n\
             📅 Fecha: 15/11/2024\n\
             📊 Status: confirmed\n\
             👥 Aforo: 15,000\n\
             🎭 Formato: Banda completa\n\
             💰 Garantía: USD 20000"
        );
        assert_eq!(item.category, CategoryTag(1));
    }

    #[test]
    fn test_requires_identity_fields() {
        let mut e = event();
        e.artist_name = None;
        assert_eq!(e.validate(), Err(SkipReason::MissingField("artist_name")));

        let mut e = event();
        e.city = Some(" ".to_string());
        assert_eq!(e.validate(), Err(SkipReason::MissingField("city")));

        let mut e = event();
        e.country = None;
        assert_eq!(e.validate(), Err(SkipReason::MissingField("country")));
    }
}
