//! Demo command groups.

use conapp_core::{
    CommandBuilder, CommandOutput, Converters, Invocation, ParameterDeclaration, RegistryBuilder,
    ValueType,
};
use conapp_types::error::{ConappError, Result};

/// Custom value type: `hh:mm:ss`, `mm:ss` or plain seconds.
pub const DURATION: &str = "duration";

const PACKAGES: &[(&str, &str, &str)] = &[
    ("timer", "1.2.0", "Countdown and stopwatch"),
    ("timezone", "0.4.1", "Time zone conversions"),
    ("weather", "2.0.3", "Weather data provider"),
    ("units", "1.0.0", "Unit conversions"),
];

const FORECAST: &[&str] = &["sunny", "cloudy", "rain", "sunny", "windy", "snow", "sunny"];
const WEEKDAYS: &[&str] = &["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Register every demo group.
pub fn register(builder: &mut RegistryBuilder) {
    register_math(builder);
    register_weather(builder);
    register_package(builder);
    register_list(builder);
    register_version(builder);
}

/// Default converters plus the `duration` type.
pub fn converters() -> Converters {
    let mut converters = Converters::new();
    converters.register_custom(DURATION, |raw| parse_duration(raw).map(serde_json::Value::from));
    converters
}

fn integer(name: &str, description: &str) -> ParameterDeclaration {
    ParameterDeclaration::option(name, ValueType::Integer).describe(description)
}

fn pretty() -> ParameterDeclaration {
    ParameterDeclaration::argument("pretty", ValueType::Boolean)
        .with_default("false")
        .describe("Decorate the output")
}

fn required_integer(call: &Invocation<'_>, name: &str) -> Result<i64> {
    call.integer(name)
        .ok_or_else(|| ConappError::Command(format!("`{name}` has no value")))
}

fn register_math(builder: &mut RegistryBuilder) {
    builder
        .group("math", "Simple arithmetic")
        .command(
            CommandBuilder::new("add", "Add two numbers", |call| {
                let sum = required_integer(call, "value1")?
                    .checked_add(required_integer(call, "value2")?)
                    .ok_or_else(|| ConappError::Command("sum overflows".into()))?;
                Ok(CommandOutput::Text(sum.to_string()))
            })
            .example("math add value1:2 value2:3")
            .parameter(integer("value1", "First operand"))
            .parameter(integer("value2", "Second operand")),
        )
        .command(
            CommandBuilder::new("add", "Add three numbers", |call| {
                let sum = ["value1", "value2", "value3"]
                    .iter()
                    .map(|name| call.integer(name).unwrap_or(0))
                    .try_fold(0i64, i64::checked_add)
                    .ok_or_else(|| ConappError::Command("sum overflows".into()))?;
                Ok(CommandOutput::Text(sum.to_string()))
            })
            .example("math add value1:2 value2:3 value3:4")
            .parameter(integer("value1", "First operand"))
            .parameter(integer("value2", "Second operand"))
            .parameter(integer("value3", "Third operand").with_default("0")),
        )
        .command(
            CommandBuilder::new("subtract", "Subtract value2 from value1", |call| {
                let difference = required_integer(call, "value1")?
                    .checked_sub(required_integer(call, "value2")?)
                    .ok_or_else(|| ConappError::Command("difference overflows".into()))?;
                Ok(CommandOutput::Text(difference.to_string()))
            })
            .example("math subtract value1:5 value2:3")
            .parameter(integer("value1", "Minuend"))
            .parameter(integer("value2", "Subtrahend")),
        );
}

fn forecast_line(call: &Invocation<'_>, day: &str, weather: &str) -> String {
    let location = call.string("location").unwrap_or_default();
    if call.boolean("pretty").unwrap_or(false) {
        format!("~~ {day} in {location}: {weather} ~~")
    } else {
        format!("{day} in {location}: {weather}")
    }
}

fn register_weather(builder: &mut RegistryBuilder) {
    let location = || {
        ParameterDeclaration::option("location", ValueType::String).describe("City to report on")
    };
    builder
        .group("weather", "Weather forecasts")
        .command(
            CommandBuilder::new("today", "Forecast for today", |call| {
                Ok(CommandOutput::Text(forecast_line(call, "Today", FORECAST[0])))
            })
            .example("weather today location:Oslo --pretty")
            .parameter(location())
            .parameter(pretty()),
        )
        .command(
            CommandBuilder::new("tomorrow", "Forecast for tomorrow", |call| {
                Ok(CommandOutput::Text(forecast_line(call, "Tomorrow", FORECAST[1])))
            })
            .parameter(location())
            .parameter(pretty()),
        )
        .command(
            CommandBuilder::new("weekly", "Forecast for the coming week", |call| {
                let location = call.string("location").unwrap_or_default();
                let rows = WEEKDAYS
                    .iter()
                    .zip(FORECAST)
                    .map(|(day, weather)| {
                        vec![day.to_string(), location.clone(), weather.to_string()]
                    })
                    .collect();
                Ok(CommandOutput::Table {
                    headers: vec!["Day".into(), "Location".into(), "Forecast".into()],
                    rows,
                })
            })
            .parameter(location())
            .parameter(pretty()),
        );
}

fn register_package(builder: &mut RegistryBuilder) {
    let name = || ParameterDeclaration::option("name", ValueType::String).describe("Package name");
    builder
        .group("package", "Package management")
        .command(
            CommandBuilder::new("install", "Install a package", |call| {
                let name = call.string("name").unwrap_or_default();
                let version = call.string("version").unwrap_or_default();
                if !PACKAGES.iter().any(|(n, _, _)| *n == name) {
                    return Err(ConappError::Command(format!("unknown package `{name}`")));
                }
                Ok(CommandOutput::Text(format!("Installed {name} {version}")))
            })
            .example("package install name:timer --version:1.0.0")
            .parameter(name())
            .parameter(
                ParameterDeclaration::argument("version", ValueType::String)
                    .with_default("latest")
                    .describe("Version to install"),
            ),
        )
        .command(
            CommandBuilder::new("update", "Update a package", |call| {
                let name = call.string("name").unwrap_or_default();
                let timeout = call
                    .value("timeout")
                    .and_then(|v| v.as_custom().and_then(serde_json::Value::as_u64));
                let text = match timeout {
                    Some(seconds) => format!("Updated {name} (timeout {seconds}s)"),
                    None => format!("Updated {name}"),
                };
                Ok(CommandOutput::Text(text))
            })
            .example("package update name:timer --timeout:\"00:01:30\"")
            .parameter(name())
            .parameter(
                ParameterDeclaration::argument("timeout", ValueType::custom(DURATION))
                    .optional()
                    .describe("Give up after hh:mm:ss"),
            ),
        );
}

fn register_list(builder: &mut RegistryBuilder) {
    builder.group("list", "Listings").command(
        CommandBuilder::new("packages", "List available packages", |call| {
            let filter = call.string("filter").unwrap_or_default();
            let rows = PACKAGES
                .iter()
                .filter(|(name, _, _)| name.contains(filter.as_str()))
                .map(|(name, version, description)| {
                    vec![name.to_string(), version.to_string(), description.to_string()]
                })
                .collect();
            Ok(CommandOutput::Table {
                headers: vec!["Name".into(), "Version".into(), "Description".into()],
                rows,
            })
        })
        .example("list packages --filter:time")
        .parameter(
            ParameterDeclaration::argument("filter", ValueType::String)
                .optional()
                .describe("Only names containing this text"),
        ),
    );
}

fn register_version(builder: &mut RegistryBuilder) {
    builder
        .group("version", "Print the version")
        .command(CommandBuilder::default_command("Print the version", |_| {
            Ok(CommandOutput::Text(env!("CARGO_PKG_VERSION").to_string()))
        }));
}

/// Seconds in `hh:mm:ss`, `mm:ss` or `ss`.
fn parse_duration(raw: &str) -> std::result::Result<u64, String> {
    let parts: Vec<&str> = raw.trim().split(':').collect();
    if parts.len() > 3 {
        return Err(format!("`{raw}` is not a duration"));
    }
    let mut seconds = 0u64;
    for (i, part) in parts.iter().enumerate() {
        let n: u64 = part
            .parse()
            .map_err(|_| format!("`{raw}` is not a duration"))?;
        if i > 0 && n >= 60 {
            return Err(format!("`{raw}`: minutes and seconds must be below 60"));
        }
        seconds = seconds * 60 + n;
    }
    Ok(seconds)
}
