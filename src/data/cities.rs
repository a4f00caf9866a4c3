//! Static city table
//!
//! This module contains the built-in list of cities that are ranked when no
//! cities file is supplied, together with the URL of each city's forecast.

use super::Location;

/// A built-in city entry
#[derive(Debug, Clone, Copy)]
pub struct City {
    /// Configuration key of the city
    pub key: &'static str,
    /// Forecast URL for the city
    pub url: &'static str,
}

/// Static array of all built-in cities
pub static CITIES: [City; 15] = [
    City {
        key: "MOSCOW",
        url: "https://code.s3.yandex.net/async-module/moscow-response.json",
    },
    City {
        key: "PARIS",
        url: "https://code.s3.yandex.net/async-module/paris-response.json",
    },
    City {
        key: "LONDON",
        url: "https://code.s3.yandex.net/async-module/london-response.json",
    },
    City {
        key: "BERLIN",
        url: "https://code.s3.yandex.net/async-module/berlin-response.json",
    },
    City {
        key: "BEIJING",
        url: "https://code.s3.yandex.net/async-module/beijing-response.json",
    },
    City {
        key: "KAZAN",
        url: "https://code.s3.yandex.net/async-module/kazan-response.json",
    },
    City {
        key: "SPETERSBURG",
        url: "https://code.s3.yandex.net/async-module/spetersburg-response.json",
    },
    City {
        key: "VOLGOGRAD",
        url: "https://code.s3.yandex.net/async-module/volgograd-response.json",
    },
    City {
        key: "NOVOSIBIRSK",
        url: "https://code.s3.yandex.net/async-module/novosibirsk-response.json",
    },
    City {
        key: "KALININGRAD",
        url: "https://code.s3.yandex.net/async-module/kaliningrad-response.json",
    },
    City {
        key: "ABUDHABI",
        url: "https://code.s3.yandex.net/async-module/abudhabi-response.json",
    },
    City {
        key: "WARSZAWA",
        url: "https://code.s3.yandex.net/async-module/warszawa-response.json",
    },
    City {
        key: "BUCHAREST",
        url: "https://code.s3.yandex.net/async-module/bucharest-response.json",
    },
    City {
        key: "ROMA",
        url: "https://code.s3.yandex.net/async-module/roma-response.json",
    },
    City {
        key: "CAIRO",
        url: "https://code.s3.yandex.net/async-module/cairo-response.json",
    },
];

/// Get a built-in city by its key
///
/// # Example
///
/// ```
/// use sunrank::data::cities::get_city_by_key;
///
/// if let Some(city) = get_city_by_key("MOSCOW") {
///     println!("Forecast at: {}", city.url);
/// }
/// ```
pub fn get_city_by_key(key: &str) -> Option<&'static City> {
    CITIES.iter().find(|city| city.key == key)
}

/// All built-in cities as owned locations, in table order
pub fn all_locations() -> Vec<Location> {
    CITIES
        .iter()
        .map(|city| Location::new(city.key, city.url))
        .collect()
}
