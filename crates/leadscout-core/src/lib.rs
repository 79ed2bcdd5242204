pub mod business;
pub mod country;

pub use business::{Business, CSV_COLUMNS, CSV_COLUMNS_EXTENDED};
pub use country::{domain_for, geo_string, locale_for, match_country_code, CountrySettings};
