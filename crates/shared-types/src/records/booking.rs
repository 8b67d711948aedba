//! Booking events, read from `booking_events` joined with artists, venues
//! and ticketing providers.

use chrono::{Duration, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

#[cfg(feature = "diesel")]
use diesel::sql_types::{BigInt, Nullable, Text};

use crate::body::Body;
use crate::category::BOOKING_CATEGORIES;
use crate::dates::{format_short_date, parse_source_date, parse_time_of_day};
use crate::item::{CalendarItem, TimeWindow};
use crate::record::{present, require_date, RecordFacets, SkipReason, SourceRecord};

/// Default start of a booking event without an explicit time.
pub const BOOKING_DEFAULT_START: (u32, u32) = (21, 0);
pub const BOOKING_DURATION_HOURS: i64 = 2;
pub const BOOKING_FALLBACK_TITLE: &str = "Evento de Booking";

/// One row of the booking query. Every column is nullable; the query
/// renders dates, times and prices as text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "diesel", derive(diesel::QueryableByName))]
pub struct BookingEvent {
    #[cfg_attr(feature = "diesel", diesel(sql_type = Nullable<Text>))]
    pub start_date: Option<String>,
    #[cfg_attr(feature = "diesel", diesel(sql_type = Nullable<Text>))]
    pub hora_salida: Option<String>,
    #[cfg_attr(feature = "diesel", diesel(sql_type = Nullable<Text>))]
    pub category: Option<String>,
    #[cfg_attr(feature = "diesel", diesel(sql_type = Nullable<Text>))]
    pub status: Option<String>,
    #[cfg_attr(feature = "diesel", diesel(sql_type = Nullable<Text>))]
    pub show_type: Option<String>,
    #[cfg_attr(feature = "diesel", diesel(sql_type = Nullable<Text>))]
    pub festival_name: Option<String>,
    #[cfg_attr(feature = "diesel", diesel(sql_type = Nullable<Text>))]
    pub city: Option<String>,
    #[cfg_attr(feature = "diesel", diesel(sql_type = Nullable<Text>))]
    pub country: Option<String>,
    #[cfg_attr(feature = "diesel", diesel(sql_type = Nullable<BigInt>))]
    pub capacity: Option<i64>,
    #[cfg_attr(feature = "diesel", diesel(sql_type = Nullable<BigInt>))]
    pub tickets_sold: Option<i64>,
    #[cfg_attr(feature = "diesel", diesel(sql_type = Nullable<Text>))]
    pub price: Option<String>,
    #[cfg_attr(feature = "diesel", diesel(sql_type = Nullable<Text>))]
    pub currency: Option<String>,
    #[cfg_attr(feature = "diesel", diesel(sql_type = Nullable<Text>))]
    pub sale_date: Option<String>,
    #[cfg_attr(feature = "diesel", diesel(sql_type = Nullable<Text>))]
    pub fecha_preventa: Option<String>,
    #[cfg_attr(feature = "diesel", diesel(sql_type = Nullable<Text>))]
    pub comments: Option<String>,
    #[cfg_attr(feature = "diesel", diesel(sql_type = Nullable<Text>))]
    pub artist_name: Option<String>,
    #[cfg_attr(feature = "diesel", diesel(sql_type = Nullable<Text>))]
    pub artist_genre: Option<String>,
    #[cfg_attr(feature = "diesel", diesel(sql_type = Nullable<Text>))]
    pub venue_name: Option<String>,
    #[cfg_attr(feature = "diesel", diesel(sql_type = Nullable<Text>))]
    pub venue_address: Option<String>,
    #[cfg_attr(feature = "diesel", diesel(sql_type = Nullable<Text>))]
    pub ticketera_name: Option<String>,
    #[cfg_attr(feature = "diesel", diesel(sql_type = Nullable<Text>))]
    pub ticketera_url: Option<String>,
}

impl BookingEvent {
    fn title(&self) -> String {
        match (present(&self.artist_name), present(&self.venue_name)) {
            (Some(artist), Some(venue)) => format!("{} - {}", artist, venue),
            (Some(artist), None) => artist.to_string(),
            (None, _) => BOOKING_FALLBACK_TITLE.to_string(),
        }
    }

    fn start_time(&self) -> Result<NaiveTime, SkipReason> {
        match present(&self.hora_salida) {
            Some(raw) => parse_time_of_day(raw).ok_or_else(|| SkipReason::InvalidTime {
                field: "hora_salida",
                value: raw.to_string(),
            }),
            None => {
                let (h, m) = BOOKING_DEFAULT_START;
                Ok(NaiveTime::from_hms_opt(h, m, 0).unwrap_or_default())
            }
        }
    }

    fn location(&self) -> String {
        let mut location = present(&self.venue_address)
            .or(present(&self.venue_name))
            .unwrap_or_default()
            .to_string();

        if let (Some(city), Some(country)) = (present(&self.city), present(&self.country)) {
            if !location.is_empty() {
                location.push_str(", ");
            }
            location.push_str(&format!("{}, {}", city, country));
        }

        location
    }

    fn body(&self) -> String {
        let city_country = match (present(&self.city), present(&self.country)) {
            (Some(city), Some(country)) => Some(format!("{}, {}", city, country)),
            _ => None,
        };
        let price = match (present(&self.price), present(&self.currency)) {
            (Some(price), Some(currency)) => Some(format!("{} {}", currency, price)),
            _ => None,
        };

        let mut body = Body::new();
        body.optional("🎤 Artista", present(&self.artist_name))
            .optional("🏟️ Venue", present(&self.venue_name))
            .optional("📍 Ubicación", city_country)
            .optional("🎭 Tipo", present(&self.show_type))
            .optional("🎪 Festival", present(&self.festival_name))
            .optional("📂 Categoría", present(&self.category))
            .optional("📊 Status", present(&self.status))
            .optional("👥 Capacidad", self.capacity.filter(|c| *c != 0))
            .optional("🎫 Tickets vendidos", self.tickets_sold.filter(|t| *t != 0))
            .optional("💰 Precio", price)
            .optional("🎟️ Ticketera", present(&self.ticketera_name))
            .optional("🔗 URL", present(&self.ticketera_url))
            .optional("📅 Fecha de venta", present(&self.sale_date).map(short_date_or_raw))
            .optional("🎫 Preventa", present(&self.fecha_preventa).map(short_date_or_raw))
            .optional("💬 Comentarios", present(&self.comments));
        body.finish()
    }
}

fn short_date_or_raw(raw: &str) -> String {
    parse_source_date(raw)
        .map(format_short_date)
        .unwrap_or_else(|| raw.to_string())
}

impl SourceRecord for BookingEvent {
    fn label(&self) -> String {
        match present(&self.start_date) {
            Some(date) => format!("{} ({})", self.title(), date),
            None => self.title(),
        }
    }

    fn validate(&self) -> Result<NaiveDate, SkipReason> {
        require_date("start_date", present(&self.start_date))
    }

    fn to_calendar_item(&self, timezone: &str) -> Result<CalendarItem, SkipReason> {
        let date = self.validate()?;
        let start = date.and_time(self.start_time()?);

        Ok(CalendarItem::published(
            self.title(),
            self.body(),
            TimeWindow::timed(start, Duration::hours(BOOKING_DURATION_HOURS), timezone),
            Some(self.location()),
            BOOKING_CATEGORIES.lookup(present(&self.category)),
        ))
    }

    fn facets(&self) -> RecordFacets {
        RecordFacets {
            artist: present(&self.artist_name).map(str::to_string),
            venue: present(&self.venue_name).map(str::to_string),
            city: present(&self.city).map(str::to_string),
            country: present(&self.country).map(str::to_string),
            category: present(&self.category).map(str::to_string),
            genre: present(&self.artist_genre).map(str::to_string),
            date: present(&self.start_date).and_then(parse_source_date),
        }
    }
}
