mod booking;
mod management;
mod release;
mod show;

pub use booking::{
    BookingEvent, BOOKING_DEFAULT_START, BOOKING_DURATION_HOURS, BOOKING_FALLBACK_TITLE,
};
pub use management::ManagementEvent;
pub use release::{
    ExternalUrls, Release, ReleaseArtist, DEFAULT_RELEASE_TYPE, UNKNOWN_ARTIST, UNKNOWN_TITLE,
};
pub use show::{Show, ShowArtist, ShowTicketing, ShowVenue, SHOW_DURATION_HOURS, SHOW_START_HOUR};
