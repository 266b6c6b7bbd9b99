//! WMO weather code lookup.
//!
//! See: https://open-meteo.com/en/docs#weathervariables

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IconId {
    ClearDay,
    ClearNight,
    MainlyClearDay,
    PartlyCloudy,
    Overcast,
    Fog,
    Drizzle,
    Rain,
    Showers,
    Thunderstorm,
    Unknown,
}

impl IconId {
    /// Terminal glyph for the icon.
    pub fn glyph(&self) -> &'static str {
        match self {
            Self::ClearDay => "☀️",
            Self::ClearNight => "🌙",
            Self::MainlyClearDay => "🌤️",
            Self::PartlyCloudy => "⛅",
            Self::Overcast => "☁️",
            Self::Fog => "🌫️",
            Self::Drizzle | Self::Rain => "🌧️",
            Self::Showers => "🌦️",
            Self::Thunderstorm => "⛈️",
            Self::Unknown => "❓",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WeatherInfo {
    pub label: &'static str,
    pub icon: IconId,
}

pub const UNKNOWN: WeatherInfo = WeatherInfo {
    label: "Unknown",
    icon: IconId::Unknown,
};

/// Resolve a WMO code to a label and icon. Only codes 0 and 1 look different
/// at night; codes outside the table resolve to [`UNKNOWN`].
pub fn resolve(code: i32, is_day: bool) -> WeatherInfo {
    let (label, icon) = match code {
        0 if is_day => ("Clear Sky", IconId::ClearDay),
        0 => ("Clear Sky", IconId::ClearNight),
        1 if is_day => ("Mainly Clear", IconId::MainlyClearDay),
        1 => ("Mainly Clear", IconId::ClearNight),
        2 => ("Partly Sunny", IconId::PartlyCloudy),
        3 => ("Overcast", IconId::Overcast),
        45 | 48 => ("Fog", IconId::Fog),
        51 | 53 | 55 => ("Drizzle", IconId::Drizzle),
        61 | 63 | 65 => ("Rain", IconId::Rain),
        80..=82 => ("Showers", IconId::Showers),
        95 | 96 | 99 => ("Thunderstorm", IconId::Thunderstorm),
        _ => return UNKNOWN,
    };

    WeatherInfo { label, icon }
}
