//! Fixed lookup tables mapping a categorical source field to a color tag.

use crate::item::CategoryTag;

/// A small key -> tag table with an explicit default entry.
#[derive(Debug, Clone, Copy)]
pub struct CategoryTable {
    entries: &'static [(&'static str, u8)],
    default: u8,
    case_insensitive: bool,
}

impl CategoryTable {
    pub const fn new(entries: &'static [(&'static str, u8)], default: u8) -> Self {
        Self {
            entries,
            default,
            case_insensitive: false,
        }
    }

    pub const fn case_insensitive(self) -> Self {
        Self {
            case_insensitive: true,
            ..self
        }
    }

    /// Tag for `key`, or the table default for a missing or unmapped key.
    pub fn lookup(&self, key: Option<&str>) -> CategoryTag {
        let Some(key) = key else {
            return self.default_tag();
        };

        let found = if self.case_insensitive {
            let key = key.to_lowercase();
            self.entries.iter().find(|(k, _)| k.to_lowercase() == key)
        } else {
            self.entries.iter().find(|(k, _)| *k == key)
        };

        found
            .map(|(_, tag)| CategoryTag(*tag))
            .unwrap_or_else(|| self.default_tag())
    }

    pub fn default_tag(&self) -> CategoryTag {
        CategoryTag(self.default)
    }
}

/// Booking events, keyed by event category.
pub const BOOKING_CATEGORIES: CategoryTable = CategoryTable::new(
    &[
        ("Concierto", 1),
        ("Festival", 2),
        ("Teatro", 3),
        ("Deporte", 4),
        ("Cultural", 5),
        ("Comedia", 6),
        ("Danza", 7),
        ("Otro", 8),
    ],
    1,
);

/// Live shows, keyed by the artist's genre.
pub const SHOW_GENRES: CategoryTable = CategoryTable::new(
    &[
        ("Pop", 1),
        ("Rock", 2),
        ("Hip Hop", 3),
        ("Electronic", 4),
        ("Jazz", 5),
        ("Classical", 6),
        ("Country", 7),
        ("R&B", 8),
        ("Reggae", 9),
        ("Folk", 10),
    ],
    1,
);

/// Releases, keyed by release type.
pub const RELEASE_TYPES: CategoryTable = CategoryTable::new(
    &[
        ("album", 1),
        ("single", 2),
        ("ep", 3),
        ("mixtape", 4),
        ("compilation", 5),
    ],
    6,
)
.case_insensitive();

/// Management events, keyed by [`ManagementClass::key`].
pub const MANAGEMENT_CLASSES: CategoryTable = CategoryTable::new(
    &[
        ("festival", 2),
        ("acoustic", 5),
        ("large", 1),
        ("confirmed", 10),
        ("other", 6),
    ],
    6,
);

/// Management events have no single category column; they are classified
/// by the first rule that applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManagementClass {
    Festival,
    Acoustic,
    Large,
    Confirmed,
    Other,
}

/// Capacity above which a show counts as large.
pub const LARGE_CAPACITY: i64 = 10_000;

impl ManagementClass {
    pub fn classify(
        festival: Option<&str>,
        format: Option<&str>,
        capacity: Option<i64>,
        status: Option<&str>,
    ) -> Self {
        if festival.is_some_and(|f| !f.is_empty()) {
            ManagementClass::Festival
        } else if format.is_some_and(|f| f.to_lowercase().contains("acústico")) {
            ManagementClass::Acoustic
        } else if capacity.is_some_and(|c| c > LARGE_CAPACITY) {
            ManagementClass::Large
        } else if status == Some("confirmed") {
            ManagementClass::Confirmed
        } else {
            ManagementClass::Other
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            ManagementClass::Festival => "festival",
            ManagementClass::Acoustic => "acoustic",
            ManagementClass::Large => "large",
            ManagementClass::Confirmed => "confirmed",
            ManagementClass::Other => "other",
        }
    }

    pub fn tag(&self) -> CategoryTag {
        MANAGEMENT_CLASSES.lookup(Some(self.key()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unmapped_key_falls_back_to_default() {
        assert_eq!(BOOKING_CATEGORIES.lookup(Some("Circo")), CategoryTag(1));
        assert_eq!(SHOW_GENRES.lookup(Some("Cumbia")), CategoryTag(1));
        assert_eq!(RELEASE_TYPES.lookup(Some("boxset")), CategoryTag(6));
    }

    #[test]
    fn test_missing_key_falls_back_to_default() {
        assert_eq!(BOOKING_CATEGORIES.lookup(None), BOOKING_CATEGORIES.default_tag());
        assert_eq!(RELEASE_TYPES.lookup(None), CategoryTag(6));
    }

    #[test]
    fn test_booking_lookup_is_case_sensitive() {
        assert_eq!(BOOKING_CATEGORIES.lookup(Some("Teatro")), CategoryTag(3));
        assert_eq!(BOOKING_CATEGORIES.lookup(Some("teatro")), CategoryTag(1));
    }

    #[test]
    fn test_release_lookup_ignores_case() {
        assert_eq!(RELEASE_TYPES.lookup(Some("EP")), CategoryTag(3));
        assert_eq!(RELEASE_TYPES.lookup(Some("Single")), CategoryTag(2));
    }

    #[test]
    fn test_management_rules_apply_in_order() {
        let class = ManagementClass::classify(
            Some("Lollapalooza"),
            Some("Acústico"),
            Some(50_000),
            Some("confirmed"),
        );
        assert_eq!(class, ManagementClass::Festival);
        assert_eq!(class.tag(), CategoryTag(2));

        let class = ManagementClass::classify(None, Some("Set Acústico"), Some(50_000), None);
        assert_eq!(class, ManagementClass::Acoustic);

        let class = ManagementClass::classify(None, Some("Banda"), Some(10_001), None);
        assert_eq!(class.tag(), CategoryTag(1));

        let class = ManagementClass::classify(None, None, Some(10_000), Some("confirmed"));
        assert_eq!(class.tag(), CategoryTag(10));

        let class = ManagementClass::classify(Some(""), None, None, Some("pending"));
        assert_eq!(class, ManagementClass::Other);
        assert_eq!(class.tag(), CategoryTag(6));
    }
}
