//! Music releases, served by the releases listing API.
//!
//! The API is not consistent about field names, so most attributes have
//! one or more alternative spellings. The first present one wins.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::body::Body;
use crate::category::RELEASE_TYPES;
use crate::item::{CalendarItem, TimeWindow};
use crate::record::{first_present, present, require_date, RecordFacets, SkipReason, SourceRecord};

pub const UNKNOWN_ARTIST: &str = "Artista Desconocido";
pub const UNKNOWN_TITLE: &str = "Título Desconocido";
pub const DEFAULT_RELEASE_TYPE: &str = "Release";
const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReleaseArtist {
    pub name: Option<String>,
    pub genre: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExternalUrls {
    pub spotify: Option<String>,
    pub apple: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Release {
    pub title: Option<String>,
    pub name: Option<String>,
    pub artist: Option<ReleaseArtist>,
    pub artist_name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub release_type: Option<String>,
    pub release_date: Option<String>,
    pub date: Option<String>,
    pub created_at: Option<String>,
    pub genre: Option<String>,
    pub label: Option<String>,
    pub label_name: Option<String>,
    pub description: Option<String>,
    pub overview: Option<String>,
    pub cover: Option<String>,
    pub cover_url: Option<String>,
    pub artwork_url: Option<String>,
    pub spotify_url: Option<String>,
    pub apple_url: Option<String>,
    pub external_urls: Option<ExternalUrls>,
}

impl Release {
    fn nested_artist(&self) -> Option<&ReleaseArtist> {
        self.artist.as_ref()
    }

    pub fn artist_name(&self) -> &str {
        self.nested_artist()
            .and_then(|a| present(&a.name))
            .or_else(|| present(&self.artist_name))
            .unwrap_or(UNKNOWN_ARTIST)
    }

    pub fn release_title(&self) -> &str {
        first_present(&[&self.title, &self.name]).unwrap_or(UNKNOWN_TITLE)
    }

    pub fn release_kind(&self) -> &str {
        first_present(&[&self.kind, &self.release_type]).unwrap_or(DEFAULT_RELEASE_TYPE)
    }

    fn raw_date(&self) -> Option<&str> {
        first_present(&[&self.release_date, &self.date, &self.created_at])
    }

    fn genre(&self) -> Option<&str> {
        present(&self.genre).or_else(|| self.nested_artist().and_then(|a| present(&a.genre)))
    }

    fn label_name(&self) -> Option<&str> {
        first_present(&[&self.label, &self.label_name])
    }

    fn spotify(&self) -> Option<&str> {
        present(&self.spotify_url)
            .or_else(|| self.external_urls.as_ref().and_then(|u| present(&u.spotify)))
    }

    fn apple(&self) -> Option<&str> {
        present(&self.apple_url)
            .or_else(|| self.external_urls.as_ref().and_then(|u| present(&u.apple)))
    }

    fn body(&self) -> String {
        let mut body = Body::new();
        body.line("🎵 Artista", self.artist_name())
            .line("📀 Título", self.release_title())
            .line("📋 Tipo", self.release_kind())
            .line("🎭 Género", self.genre().unwrap_or(NOT_AVAILABLE))
            .line("🏷️  Sello", self.label_name().unwrap_or(NOT_AVAILABLE));

        if let Some(description) = first_present(&[&self.description, &self.overview]) {
            body.blank().raw("📝 Descripción:").raw(description);
        }
        if let Some(url) = self.spotify() {
            body.blank().line("🎧 Spotify", url);
        }
        body.optional("🍎 Apple Music", self.apple());
        if let Some(url) = first_present(&[&self.cover, &self.cover_url, &self.artwork_url]) {
            body.blank().line("🖼️  Portada", url);
        }
        body.finish()
    }
}

impl SourceRecord for Release {
    fn label(&self) -> String {
        format!("{} - {}", self.artist_name(), self.release_title())
    }

    fn validate(&self) -> Result<NaiveDate, SkipReason> {
        require_date("release_date", self.raw_date())
    }

    fn to_calendar_item(&self, _timezone: &str) -> Result<CalendarItem, SkipReason> {
        let date = self.validate()?;

        Ok(CalendarItem::published(
            self.label(),
            self.body(),
            TimeWindow::all_day(date),
            None,
            RELEASE_TYPES.lookup(Some(self.release_kind())),
        ))
    }

    fn facets(&self) -> RecordFacets {
        RecordFacets {
            artist: Some(self.artist_name().to_string()),
            category: Some(self.release_kind().to_string()),
            genre: self.genre().map(str::to_string),
            date: self.validate().ok(),
            ..Default::default()
        }
    }
}
