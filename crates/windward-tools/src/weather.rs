//! get_weather_information tool — historical weather aggregates by location.

use async_trait::async_trait;
use chrono::Datelike;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::{Tool, ToolContext};

const AGGREGATED_DAY_URL: &str = "https://history.openweathermap.org/data/2.5/aggregated/day";

const APOLOGY: &str = "Sorry, I couldn't find the weather information for the given location.";

pub struct WeatherTool;

#[derive(Deserialize)]
struct Params {
    latitude: f64,
    longitude: f64,
}

/// Format the `result` object of an aggregated-day response. `None` when any
/// expected field is missing, which callers translate to the apology text.
fn format_report(result: &Value) -> Option<String> {
    let mean = |field: &str| result.get(field)?.get("mean")?.as_f64();
    Some(format!(
        "For given Location:\n\
         Mean temperature: {} Kelvin\n\
         Mean humidity: {} %\n\
         Mean wind_speed: {} m/s\n\
         Mean pressure: {} hPa\n\
         Mean precipitation: {} mm",
        mean("temp")?,
        mean("humidity")?,
        mean("wind")?,
        mean("pressure")?,
        mean("precipitation")?,
    ))
}

#[async_trait]
impl Tool for WeatherTool {
    fn name(&self) -> &str {
        "get_weather_information"
    }

    fn description(&self) -> &str {
        "Gets the weather information for a given latitude and longitude"
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "latitude": {
                    "type": "number",
                    "description": "The latitude of the location"
                },
                "longitude": {
                    "type": "number",
                    "description": "The longitude of the location"
                }
            },
            "required": ["latitude", "longitude"]
        })
    }

    async fn invoke(
        &self,
        args: Map<String, Value>,
        context: &ToolContext,
    ) -> anyhow::Result<String> {
        let p: Params = serde_json::from_value(Value::Object(args))?;

        let Some(api_key) = context.config.openweather_api_key.clone() else {
            warn!("OPENWEATHER_API_KEY not configured");
            return Ok(APOLOGY.to_string());
        };

        let today = chrono::Utc::now();
        debug!(latitude = p.latitude, longitude = p.longitude, "Weather lookup");

        let response = reqwest::Client::new()
            .get(AGGREGATED_DAY_URL)
            .query(&[
                ("lat", p.latitude.to_string()),
                ("lon", p.longitude.to_string()),
                ("appid", api_key),
                ("month", today.month().to_string()),
                ("day", today.day().to_string()),
            ])
            .send()
            .await;

        // The assistant handles the apology conversationally; upstream
        // trouble of any kind must not abort the run.
        let response = match response {
            Ok(r) if r.status().is_success() => r,
            Ok(r) => {
                warn!(status = %r.status(), "Weather provider returned an error");
                return Ok(APOLOGY.to_string());
            }
            Err(e) => {
                warn!(%e, "Weather provider unreachable");
                return Ok(APOLOGY.to_string());
            }
        };

        let body: Value = match response.json().await {
            Ok(v) => v,
            Err(e) => {
                warn!(%e, "Weather provider sent an unreadable body");
                return Ok(APOLOGY.to_string());
            }
        };

        let report = body.get("result").and_then(format_report);
        Ok(report.unwrap_or_else(|| APOLOGY.to_string()))
    }
}
