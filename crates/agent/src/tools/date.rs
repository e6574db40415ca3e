use std::sync::Arc;

use async_trait::async_trait;
use retail_core::clock::{read_date, Clock, DEFAULT_TIMEZONE};
use retail_core::errors::ToolError;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use super::{parse_input, to_payload, Tool};

#[derive(Debug, Default, Deserialize)]
struct DateInput {
    #[serde(default)]
    timezone: Option<String>,
    #[serde(default)]
    format: Option<String>,
}

pub struct GetDateTool {
    clock: Arc<dyn Clock>,
    default_timezone: String,
}

impl GetDateTool {
    pub fn new(clock: Arc<dyn Clock>, default_timezone: impl Into<String>) -> Self {
        Self { clock, default_timezone: default_timezone.into() }
    }
}

#[async_trait]
impl Tool for GetDateTool {
    fn name(&self) -> &'static str {
        "get_date"
    }

    fn description(&self) -> &'static str {
        "Current date and time in an IANA timezone. Unknown zones fall back to UTC and \
         unknown formats to `full`; the fallback is named in the result."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "timezone": {
                    "type": "string",
                    "description": format!("IANA timezone name, e.g. `America/New_York` (default `{DEFAULT_TIMEZONE}`)")
                },
                "format": {
                    "type": "string",
                    "enum": ["full", "date", "time", "datetime"],
                    "description": "Rendering of the reading (default `full`)"
                }
            },
            "required": []
        })
    }

    async fn execute(&self, input: Value) -> Result<Value, ToolError> {
        let input: DateInput = parse_input(self.name(), input)?;
        let zone = input
            .timezone
            .filter(|zone| !zone.trim().is_empty())
            .unwrap_or_else(|| self.default_timezone.clone());
        let selector = input.format.unwrap_or_else(|| "full".to_string());

        let reading = read_date(self.clock.as_ref(), &zone, &selector);
        info!(
            event_name = "tool.get_date.read",
            timezone = %reading.timezone,
            fallbacks = reading.fallbacks.len(),
            "date reading produced"
        );
        to_payload(&reading)
    }
}
