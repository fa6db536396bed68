/// Maximum length of a location name, address or slug
pub const MAX_LOCATION_FIELD_LEN: usize = 255;

/// Slug used when a name contains nothing that survives slugification
pub const FALLBACK_SLUG: &str = "location";

/// How many times a slug write may lose a uniqueness race before the save fails
pub const MAX_SLUG_WRITE_CONFLICTS: u32 = 5;

/// Upper bound on suffix probes for a single slug, guards against pathological tables
pub const MAX_SLUG_PROBES: u32 = 10_000;

/// Number of decimal places kept on a computed distance
pub const DISTANCE_DECIMALS: i32 = 2;

/// Default page size for paginated lists
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Maximum page size allowed
pub const MAX_PAGE_SIZE: i64 = 100;
