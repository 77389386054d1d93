pub const NBTS_URL: &str = "https://nbts.health.gov.lk/mobile/";
pub const NOMINATIM_SEARCH_URL: &str = "https://nominatim.openstreetmap.org/search";

/// Tag carried on every record and on the response envelope.
pub const SOURCE_TAG: &str = "NBTS";

/// The NBTS site rejects non-browser clients.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                                      (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
pub const BROWSER_ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";

/// Nominatim usage policy requires an identifying User-Agent.
pub const GEOCODER_USER_AGENT: &str = "FYP-BloodDonation-App";

pub const DEFAULT_RADIUS_KM: f64 = 25.0;
pub const EARTH_RADIUS_KM: f64 = 6371.0;
