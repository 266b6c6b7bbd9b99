use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String")]
pub enum TemperatureUnit {
    #[default]
    #[serde(rename = "celsius")]
    Celsius,
    #[serde(rename = "fahrenheit")]
    Fahrenheit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String")]
pub enum SpeedUnit {
    #[default]
    #[serde(rename = "kmh")]
    KmPerHour,
    #[serde(rename = "mph")]
    MilesPerHour,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String")]
pub enum PrecipUnit {
    #[default]
    #[serde(rename = "mm")]
    Millimeter,
    #[serde(rename = "inch")]
    Inch,
}

impl TemperatureUnit {
    /// Lenient parse: anything but `fahrenheit` is Celsius.
    pub fn from_token(token: &str) -> Self {
        match token.trim().to_lowercase().as_str() {
            "fahrenheit" => Self::Fahrenheit,
            _ => Self::Celsius,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Celsius => "celsius",
            Self::Fahrenheit => "fahrenheit",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Celsius => "°C",
            Self::Fahrenheit => "°F",
        }
    }
}

impl SpeedUnit {
    /// Lenient parse: anything but `mph` is km/h.
    pub fn from_token(token: &str) -> Self {
        match token.trim().to_lowercase().as_str() {
            "mph" => Self::MilesPerHour,
            _ => Self::KmPerHour,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::KmPerHour => "kmh",
            Self::MilesPerHour => "mph",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::KmPerHour => "km/h",
            Self::MilesPerHour => "mph",
        }
    }
}

impl PrecipUnit {
    /// Lenient parse: anything but `inch` is millimeters.
    pub fn from_token(token: &str) -> Self {
        match token.trim().to_lowercase().as_str() {
            "inch" => Self::Inch,
            _ => Self::Millimeter,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Millimeter => "mm",
            Self::Inch => "inch",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Millimeter => "mm",
            Self::Inch => "in",
        }
    }
}

impl From<String> for TemperatureUnit {
    fn from(value: String) -> Self {
        Self::from_token(&value)
    }
}

impl From<String> for SpeedUnit {
    fn from(value: String) -> Self {
        Self::from_token(&value)
    }
}

impl From<String> for PrecipUnit {
    fn from(value: String) -> Self {
        Self::from_token(&value)
    }
}

/// User-facing unit choice, one value per axis.
///
/// The axes are independent: a "metric" or "imperial" mode is only ever
/// derived (see [`is_imperial`]), never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitPreference {
    pub temp: TemperatureUnit,
    pub speed: SpeedUnit,
    pub precip: PrecipUnit,
}

impl UnitPreference {
    pub const METRIC: Self = Self {
        temp: TemperatureUnit::Celsius,
        speed: SpeedUnit::KmPerHour,
        precip: PrecipUnit::Millimeter,
    };

    pub const IMPERIAL: Self = Self {
        temp: TemperatureUnit::Fahrenheit,
        speed: SpeedUnit::MilesPerHour,
        precip: PrecipUnit::Inch,
    };
}

/// Unit parameters as the forecast API expects them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryUnits {
    pub temperature_unit: &'static str,
    pub wind_speed_unit: &'static str,
    pub precipitation_unit: &'static str,
}

impl QueryUnits {
    pub fn as_query(&self) -> [(&'static str, &'static str); 3] {
        [
            ("temperature_unit", self.temperature_unit),
            ("wind_speed_unit", self.wind_speed_unit),
            ("precipitation_unit", self.precipitation_unit),
        ]
    }
}

pub fn build_query_units(pref: &UnitPreference) -> QueryUnits {
    QueryUnits {
        temperature_unit: pref.temp.as_str(),
        wind_speed_unit: pref.speed.as_str(),
        precipitation_unit: pref.precip.as_str(),
    }
}

/// True only when every axis is imperial; mixed preferences are not.
pub fn is_imperial(pref: &UnitPreference) -> bool {
    *pref == UnitPreference::IMPERIAL
}

/// The preset the mode switch moves to from `pref`.
pub fn toggled_preset(pref: &UnitPreference) -> UnitPreference {
    if is_imperial(pref) {
        UnitPreference::METRIC
    } else {
        UnitPreference::IMPERIAL
    }
}

pub fn toggle_label(pref: &UnitPreference) -> &'static str {
    if is_imperial(pref) {
        "Switch to Metric"
    } else {
        "Switch to Imperial"
    }
}
