use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Regex for validating slugs
    /// Must be lowercase alphanumeric with single hyphens between words
    /// - Valid: "downtown-office", "hq2", "downtown-office-1"
    /// - Invalid: "-office", "office-", "office--2", "Office", "office_2"
    pub static ref SLUG_REGEX: Regex = Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap();

    static ref HYPHEN_RUN_REGEX: Regex = Regex::new(r"-{2,}").unwrap();
}

/// Derive a URL-safe slug from a human readable name.
///
/// The result is ASCII lowercase. Whitespace, underscores and hyphens become a
/// single hyphen, common accented Latin letters are transliterated and every
/// other character is dropped. May return an empty string.
pub fn slugify(input: &str) -> String {
    let mut out = String::with_capacity(input.len());

    for c in input.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if c.is_whitespace() || c == '-' || c == '_' {
            out.push('-');
        } else if let Some(s) = c.to_lowercase().next().and_then(transliterate) {
            out.push_str(s);
        }
    }

    HYPHEN_RUN_REGEX
        .replace_all(&out, "-")
        .trim_matches('-')
        .to_string()
}

fn transliterate(c: char) -> Option<&'static str> {
    let s = match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => "a",
        'æ' => "ae",
        'ç' | 'ć' | 'č' => "c",
        'ď' | 'đ' => "d",
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ė' | 'ę' | 'ě' => "e",
        'ğ' => "g",
        'ì' | 'í' | 'î' | 'ï' | 'ī' | 'ı' => "i",
        'ł' => "l",
        'ñ' | 'ń' | 'ň' => "n",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ő' => "o",
        'œ' => "oe",
        'ř' => "r",
        'ś' | 'š' | 'ş' => "s",
        'ß' => "ss",
        'ť' | 'ţ' => "t",
        'ù' | 'ú' | 'û' | 'ü' | 'ū' | 'ů' | 'ű' => "u",
        'ý' | 'ÿ' => "y",
        'ź' | 'ż' | 'ž' => "z",
        _ => return None,
    };
    Some(s)
}

/// Latitude/longitude pair validation shared by the DTOs.
///
/// Both values must be present or both absent, finite and within range.
pub fn validate_coordinate_pair(
    latitude: Option<f64>,
    longitude: Option<f64>,
) -> Result<(), String> {
    match (latitude, longitude) {
        (None, None) => Ok(()),
        (Some(lat), Some(lon)) => {
            if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
                return Err(format!("latitude {} is out of range [-90, 90]", lat));
            }
            if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
                return Err(format!("longitude {} is out of range [-180, 180]", lon));
            }
            Ok(())
        }
        _ => Err("latitude and longitude must be provided together".to_string()),
    }
}

/// Reject values that are empty once surrounding whitespace is trimmed
pub fn validate_not_blank(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{} must not be blank", field));
    }
    Ok(())
}
