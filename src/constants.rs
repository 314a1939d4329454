/// Cached plans are served for one hour before the feed is asked again.
pub const CACHE_TTL_SECS: i64 = 3600;

/// Days whose timestamp is older than this are dropped during parsing.
pub const MAX_DAY_AGE_HOURS: i64 = 24;

pub const FETCH_TIMEOUT_SECS: u64 = 10;

pub const MENSA_XML_URL_DE: &str =
    "https://www.max-manager.de/daten-extern/sw-erlangen-nuernberg/xml/mensa-ingolstadt.xml";
pub const MENSA_XML_URL_EN: &str =
    "https://www.max-manager.de/daten-extern/sw-erlangen-nuernberg/xml/en/mensa-ingolstadt.xml";
