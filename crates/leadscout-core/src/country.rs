//! Country-to-geo-targeting lookup.
//!
//! A small static table mapping ISO-2 codes (and full display names) to the
//! geo string, locale tag, and Google TLD used when building provider
//! requests. Unknown or absent countries fall back to bare-city geo,
//! `en-US`, and `com`.

/// Geo-targeting settings for one supported country.
#[derive(Debug, Clone, Copy)]
pub struct CountrySettings {
    pub code: &'static str,
    pub name: &'static str,
    pub locale: &'static str,
    pub domain: &'static str,
}

const COUNTRY_SETTINGS: &[CountrySettings] = &[
    CountrySettings {
        code: "US",
        name: "United States",
        locale: "en-US",
        domain: "com",
    },
    CountrySettings {
        code: "CA",
        name: "Canada",
        locale: "en-CA",
        domain: "ca",
    },
    CountrySettings {
        code: "GB",
        name: "United Kingdom",
        locale: "en-GB",
        domain: "co.uk",
    },
    CountrySettings {
        code: "UK",
        name: "United Kingdom",
        locale: "en-GB",
        domain: "co.uk",
    },
    CountrySettings {
        code: "AU",
        name: "Australia",
        locale: "en-AU",
        domain: "com.au",
    },
    CountrySettings {
        code: "NZ",
        name: "New Zealand",
        locale: "en-NZ",
        domain: "co.nz",
    },
    CountrySettings {
        code: "IE",
        name: "Ireland",
        locale: "en-IE",
        domain: "ie",
    },
];

/// Resolves a user-supplied country to its settings entry.
///
/// Accepts an ISO-2 code in any case (`"ca"`, `"CA"`) or the full display
/// name (`"canada"`). Returns `None` for empty, whitespace-only, or
/// unrecognized input.
#[must_use]
pub fn match_country_code(country: Option<&str>) -> Option<&'static CountrySettings> {
    let candidate = country?.trim();
    if candidate.is_empty() {
        return None;
    }

    let upper = candidate.to_uppercase();
    if let Some(settings) = COUNTRY_SETTINGS.iter().find(|s| s.code == upper) {
        return Some(settings);
    }

    let lower = candidate.to_lowercase();
    COUNTRY_SETTINGS
        .iter()
        .find(|s| s.name.to_lowercase() == lower)
}

/// Builds the geo string for a search: `"{city}, {country name}"` when the
/// country is recognized, otherwise the bare city.
#[must_use]
pub fn geo_string(city: &str, country: Option<&str>) -> String {
    match match_country_code(country) {
        Some(settings) => format!("{city}, {}", settings.name),
        None => city.to_string(),
    }
}

/// Locale tag for a country, defaulting to `en-US`.
#[must_use]
pub fn locale_for(country: Option<&str>) -> &'static str {
    match_country_code(country).map_or("en-US", |s| s.locale)
}

/// Google TLD for a country, defaulting to `com`.
#[must_use]
pub fn domain_for(country: Option<&str>) -> &'static str {
    match_country_code(country).map_or("com", |s| s.domain)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_iso_code_case_insensitively() {
        assert_eq!(match_country_code(Some("ca")).unwrap().code, "CA");
        assert_eq!(match_country_code(Some("CA")).unwrap().code, "CA");
    }

    #[test]
    fn matches_full_country_name() {
        let settings = match_country_code(Some("united kingdom")).unwrap();
        assert_eq!(settings.domain, "co.uk");
    }

    #[test]
    fn uk_alias_maps_to_united_kingdom() {
        let settings = match_country_code(Some("UK")).unwrap();
        assert_eq!(settings.name, "United Kingdom");
        assert_eq!(settings.locale, "en-GB");
    }

    #[test]
    fn rejects_unknown_and_blank_input() {
        assert!(match_country_code(Some("XX")).is_none());
        assert!(match_country_code(Some("  ")).is_none());
        assert!(match_country_code(None).is_none());
    }

    #[test]
    fn geo_string_appends_country_name() {
        assert_eq!(geo_string("Toronto", Some("CA")), "Toronto, Canada");
    }

    #[test]
    fn geo_string_falls_back_to_bare_city() {
        assert_eq!(geo_string("Toronto", None), "Toronto");
        assert_eq!(geo_string("Toronto", Some("XX")), "Toronto");
    }

    #[test]
    fn locale_and_domain_defaults() {
        assert_eq!(locale_for(None), "en-US");
        assert_eq!(domain_for(None), "com");
        assert_eq!(locale_for(Some("NZ")), "en-NZ");
        assert_eq!(domain_for(Some("NZ")), "co.nz");
    }
}
