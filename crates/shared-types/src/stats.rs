//! Run results and the aggregate statistics derived from a job's source.

use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use crate::dates::format_short_date;
use crate::record::RecordFacets;

pub fn calendar_link(calendar_id: &str) -> String {
    format!("https://calendar.google.com/calendar/u/0/r?cid={}", calendar_id)
}

/// Distinct-value counts and date range over the valid records of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SourceStats {
    pub records: usize,
    pub artists: usize,
    pub venues: usize,
    pub cities: usize,
    pub countries: usize,
    pub categories: usize,
    pub genres: usize,
    pub earliest: Option<NaiveDate>,
    pub latest: Option<NaiveDate>,
    /// Records dated before `today`.
    pub past: usize,
    /// Records dated `today` or later.
    pub upcoming: usize,
}

impl SourceStats {
    pub fn collect<I>(facets: I, today: NaiveDate) -> Self
    where
        I: IntoIterator<Item = RecordFacets>,
    {
        let mut artists = BTreeSet::new();
        let mut venues = BTreeSet::new();
        let mut cities = BTreeSet::new();
        let mut countries = BTreeSet::new();
        let mut categories = BTreeSet::new();
        let mut genres = BTreeSet::new();
        let mut stats = SourceStats::default();

        for facet in facets {
            stats.records += 1;
            artists.extend(facet.artist);
            venues.extend(facet.venue);
            cities.extend(facet.city);
            countries.extend(facet.country);
            categories.extend(facet.category);
            genres.extend(facet.genre);

            if let Some(date) = facet.date {
                stats.earliest = Some(stats.earliest.map_or(date, |d| d.min(date)));
                stats.latest = Some(stats.latest.map_or(date, |d| d.max(date)));
                if date < today {
                    stats.past += 1;
                } else {
                    stats.upcoming += 1;
                }
            }
        }

        stats.artists = artists.len();
        stats.venues = venues.len();
        stats.cities = cities.len();
        stats.countries = countries.len();
        stats.categories = categories.len();
        stats.genres = genres.len();
        stats
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ResetOutcome {
    pub listed: usize,
    pub deleted: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadOutcome {
    pub inserted: usize,
    pub failed: usize,
}

/// What the target collection looked like after loading.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CollectionSnapshot {
    pub summary: String,
    pub timezone: Option<String>,
    pub items: usize,
    pub past: usize,
    pub upcoming: usize,
}

/// Typed outcome of one job run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunResult {
    pub job: String,
    pub calendar_id: String,
    /// Label of the job's grouping dimension in the report.
    pub category_label: String,
    pub source_records: usize,
    pub skipped: usize,
    pub reset: ResetOutcome,
    pub load: LoadOutcome,
    pub stats: SourceStats,
    pub snapshot: Option<CollectionSnapshot>,
    /// Set when the job stopped before touching the calendar.
    pub note: Option<String>,
}

impl RunResult {
    pub fn inserted(&self) -> usize {
        self.load.inserted
    }

    pub fn failed(&self) -> usize {
        self.load.failed
    }

    pub fn link(&self) -> String {
        calendar_link(&self.calendar_id)
    }
}

fn date_or_dash(date: Option<NaiveDate>) -> String {
    date.map(format_short_date).unwrap_or_else(|| "-".to_string())
}

impl fmt::Display for RunResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "📊 {}", self.job)?;
        writeln!(f, "   Calendario:  {}", self.calendar_id)?;
        if let Some(note) = &self.note {
            writeln!(f, "   ⚠️  {}", note)?;
        }
        writeln!(
            f,
            "   Origen:      {} registros, {} válidos, {} omitidos",
            self.source_records, self.stats.records, self.skipped
        )?;
        writeln!(
            f,
            "   Limpieza:    {} de {} eliminados ({} errores)",
            self.reset.deleted, self.reset.listed, self.reset.failed
        )?;
        writeln!(
            f,
            "   Carga:       {} creados, {} errores",
            self.load.inserted, self.load.failed
        )?;

        let dimensions = [
            ("Artistas", self.stats.artists),
            ("Venues", self.stats.venues),
            ("Ciudades", self.stats.cities),
            ("Países", self.stats.countries),
            (self.category_label.as_str(), self.stats.categories),
            ("Géneros", self.stats.genres),
        ];
        let shown: Vec<String> = dimensions
            .iter()
            .filter(|(_, count)| *count > 0)
            .map(|(label, count)| format!("{}: {}", label, count))
            .collect();
        if !shown.is_empty() {
            writeln!(f, "   {}", shown.join(" | "))?;
        }

        if self.stats.earliest.is_some() {
            writeln!(
                f,
                "   Fechas:      {} → {} ({} pasados, {} próximos)",
                date_or_dash(self.stats.earliest),
                date_or_dash(self.stats.latest),
                self.stats.past,
                self.stats.upcoming
            )?;
        }

        if let Some(snapshot) = &self.snapshot {
            writeln!(
                f,
                "   Verificado:  \"{}\" ({}), {} eventos ({} pasados, {} próximos)",
                snapshot.summary,
                snapshot.timezone.as_deref().unwrap_or("sin zona horaria"),
                snapshot.items,
                snapshot.past,
                snapshot.upcoming
            )?;
        }
        write!(f, "   🔗 {}", self.link())
    }
}
