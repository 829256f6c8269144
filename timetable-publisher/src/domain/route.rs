//! Route identifiers and the timetable file key.
//!
//! A route is one physical timetable stream: a bus line calling at one stop
//! in one direction. Stored timetables are keyed by route and day type, and
//! that composite key doubles as the file name, so all formatting and parsing
//! of the `timetable_{bus}_{stop}_{direction}_{daytype}.json` scheme lives
//! here.

use std::fmt;

use reqwest::Url;

use super::day_type::DayType;

/// Separator between key fields in file names and topic object ids.
const KEY_DELIMITER: char = '_';

const FILE_PREFIX: &str = "timetable_";
const FILE_SUFFIX: &str = ".json";

/// Error returned when a route key cannot be built or parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid route key: {reason}")]
pub struct InvalidRouteKey {
    reason: &'static str,
}

impl InvalidRouteKey {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// Identifies one timetable stream: (bus number, stop id, direction).
///
/// Fields are guaranteed non-empty and free of the key delimiter and path
/// separators, so a `RouteKey` can always be written into a file name and
/// parsed back unchanged.
///
/// # Examples
///
/// ```
/// use timetable_publisher::domain::RouteKey;
///
/// let route = RouteKey::new("4g", "0705", "a-b").unwrap();
/// assert_eq!(route.to_string(), "4g_0705_a-b");
///
/// // The delimiter is rejected
/// assert!(RouteKey::new("4_g", "0705", "a-b").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RouteKey {
    bus_number: String,
    stop_id: String,
    direction: String,
}

impl RouteKey {
    /// Create a route key, validating every field.
    pub fn new(
        bus_number: impl Into<String>,
        stop_id: impl Into<String>,
        direction: impl Into<String>,
    ) -> Result<Self, InvalidRouteKey> {
        let key = Self {
            bus_number: bus_number.into(),
            stop_id: stop_id.into(),
            direction: direction.into(),
        };

        for field in [&key.bus_number, &key.stop_id, &key.direction] {
            validate_field(field)?;
        }

        Ok(key)
    }

    /// Extract the route key from a schedule page URL.
    ///
    /// The URL fragment has the shape `<mode>/<bus>/<direction>/<stop>`, as
    /// in `https://www.stops.lt/vilnius/#bus/4g/a-b/0705`.
    pub fn from_url(url: &str) -> Result<Self, InvalidRouteKey> {
        let parsed = Url::parse(url).map_err(|_| InvalidRouteKey::new("not a valid URL"))?;
        let fragment = parsed
            .fragment()
            .ok_or_else(|| InvalidRouteKey::new("URL has no fragment"))?;

        let parts: Vec<&str> = fragment.split('/').collect();
        if parts.len() < 4 {
            return Err(InvalidRouteKey::new(
                "fragment must be <mode>/<bus>/<direction>/<stop>",
            ));
        }

        Self::new(parts[1], parts[3], parts[2])
    }

    pub fn bus_number(&self) -> &str {
        &self.bus_number
    }

    pub fn stop_id(&self) -> &str {
        &self.stop_id
    }

    pub fn direction(&self) -> &str {
        &self.direction
    }
}

impl fmt::Display for RouteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{KEY_DELIMITER}{}{KEY_DELIMITER}{}",
            self.bus_number, self.stop_id, self.direction
        )
    }
}

fn validate_field(field: &str) -> Result<(), InvalidRouteKey> {
    if field.is_empty() {
        return Err(InvalidRouteKey::new("fields must not be empty"));
    }
    if field
        .chars()
        .any(|c| c == KEY_DELIMITER || c == '/' || c == '\\' || c.is_whitespace() || c.is_control())
    {
        return Err(InvalidRouteKey::new(
            "fields must not contain '_', path separators or whitespace",
        ));
    }
    Ok(())
}

/// Key of one stored timetable: a route plus a day type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimetableKey {
    pub route: RouteKey,
    pub day_type: DayType,
}

impl TimetableKey {
    pub fn new(route: RouteKey, day_type: DayType) -> Self {
        Self { route, day_type }
    }

    /// File name for this key.
    ///
    /// # Examples
    ///
    /// ```
    /// use timetable_publisher::domain::{DayType, RouteKey, TimetableKey};
    ///
    /// let route = RouteKey::new("4g", "0705", "a-b").unwrap();
    /// let key = TimetableKey::new(route, DayType::Saturday);
    /// assert_eq!(key.file_name(), "timetable_4g_0705_a-b_saturday.json");
    /// ```
    pub fn file_name(&self) -> String {
        format!(
            "{FILE_PREFIX}{}{KEY_DELIMITER}{}{FILE_SUFFIX}",
            self.route, self.day_type
        )
    }

    /// Whether a file name looks like a timetable file at all.
    pub fn is_candidate(file_name: &str) -> bool {
        file_name.starts_with(FILE_PREFIX) && file_name.ends_with(FILE_SUFFIX)
    }

    /// Parse a key back out of a file name produced by [`Self::file_name`].
    pub fn parse_file_name(file_name: &str) -> Result<Self, InvalidRouteKey> {
        let stem = file_name
            .strip_prefix(FILE_PREFIX)
            .and_then(|rest| rest.strip_suffix(FILE_SUFFIX))
            .ok_or_else(|| InvalidRouteKey::new("not a timetable file name"))?;

        let parts: Vec<&str> = stem.split(KEY_DELIMITER).collect();
        let [bus_number, stop_id, direction, day_type] = parts.as_slice() else {
            return Err(InvalidRouteKey::new("expected four '_'-separated fields"));
        };

        let day_type = day_type
            .parse::<DayType>()
            .map_err(|_| InvalidRouteKey::new("unknown day type in file name"))?;
        let route = RouteKey::new(*bus_number, *stop_id, *direction)?;

        Ok(Self { route, day_type })
    }
}

/// A configured schedule page together with the route it describes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteSource {
    url: String,
    route: RouteKey,
}

impl RouteSource {
    /// Parse a schedule page URL, extracting its route key.
    pub fn parse(url: &str) -> Result<Self, InvalidRouteKey> {
        let url = url.trim();
        let route = RouteKey::from_url(url)?;
        Ok(Self {
            url: url.to_string(),
            route,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn route(&self) -> &RouteKey {
        &self.route
    }
}
