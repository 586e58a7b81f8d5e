//! Weather forecast types
//!
//! The icon field is a closed contract: exactly seven values. The prompt
//! enumerates them and the schema constrains the field to a string; this
//! enum is where any other string becomes a hard deserialization failure.

use serde::{Deserialize, Serialize};

/// The seven weather icons the UI knows how to draw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeatherIcon {
    Sunny,
    PartlyCloudy,
    Cloudy,
    Rain,
    Thunderstorm,
    Snow,
    Windy,
}

impl WeatherIcon {
    /// All valid icon names, in prompt-enumeration order
    pub fn all_names() -> &'static [&'static str] {
        &[
            "Sunny",
            "PartlyCloudy",
            "Cloudy",
            "Rain",
            "Thunderstorm",
            "Snow",
            "Windy",
        ]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentConditions {
    /// Degrees Celsius
    pub temperature: f64,
    pub condition: String,
    pub icon: WeatherIcon,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyForecast {
    /// Short day label, e.g. "Mon"
    pub day: String,
    pub high_temp: f64,
    pub low_temp: f64,
    pub condition: String,
    pub icon: WeatherIcon,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherForecast {
    pub current: CurrentConditions,
    pub daily: Vec<DailyForecast>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn icon_names_round_trip() {
        for name in WeatherIcon::all_names() {
            let json = format!("\"{name}\"");
            let icon: WeatherIcon = serde_json::from_str(&json).unwrap();
            assert_eq!(serde_json::to_string(&icon).unwrap(), json);
        }
    }

    #[test]
    fn unknown_icon_is_rejected() {
        assert!(serde_json::from_str::<WeatherIcon>("\"Hail\"").is_err());
        assert!(serde_json::from_str::<WeatherIcon>("\"sunny\"").is_err());
    }

    #[test]
    fn forecast_deserializes() {
        let json = r#"{
            "current": {"temperature": 31.0, "condition": "Clear sky", "icon": "Sunny"},
            "daily": [
                {"day": "Mon", "high_temp": 33.0, "low_temp": 21.5,
                 "condition": "Light rain", "icon": "Rain"}
            ]
        }"#;
        let forecast: WeatherForecast = serde_json::from_str(json).unwrap();
        assert_eq!(forecast.current.icon, WeatherIcon::Sunny);
        assert_eq!(forecast.daily.len(), 1);
        assert_eq!(forecast.daily[0].icon, WeatherIcon::Rain);
    }
}
