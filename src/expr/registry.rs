//! Version registry
//!
//! Static lookup tables recording in which format revisions each expression
//! function and data source exists. Functions are keyed by `name{arity}` so
//! that overloads with different argument counts can carry different
//! ranges. Source names with a numeric index segment are normalized to a
//! `#` placeholder before lookup (`WEATHER.FORECAST.2.TEMPERATURE` and
//! `WEATHER.FORECAST.7.TEMPERATURE` share one entry).
//!
//! Pure lookup, initialized once, never mutated.

use crate::version::{Version, VersionRange};
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// The shared registry instance.
static REGISTRY: Lazy<VersionRegistry> = Lazy::new(VersionRegistry::new);

pub struct VersionRegistry {
    functions: HashMap<&'static str, VersionRange>,
    sources: HashMap<&'static str, VersionRange>,
}

impl VersionRegistry {
    fn new() -> Self {
        let v1 = VersionRange::all();
        let v2 = VersionRange::since(Version(2));
        let v3 = VersionRange::since(Version(3));
        let v4 = VersionRange::since(Version(4));

        let mut functions = HashMap::new();
        // Arithmetic, present from the first revision.
        for key in [
            "round{1}", "floor{1}", "ceil{1}", "fract{1}", "abs{1}", "sign{1}", "sqrt{1}",
            "cbrt{1}", "exp{1}", "expm1{1}", "log{1}", "log2{1}", "log10{1}", "sin{1}",
            "cos{1}", "tan{1}", "asin{1}", "acos{1}", "atan{1}", "deg{1}", "rad{1}",
            "pow{2}", "rand{2}", "clamp{3}",
        ] {
            functions.insert(key, v1);
        }
        // Text formatting.
        functions.insert("numberFormat{2}", v1);
        functions.insert("icuText{1}", v1);
        functions.insert("icuText{2}", v1);
        functions.insert("icuBestText{1}", v1);
        functions.insert("icuBestText{2}", v1);
        functions.insert("subText{3}", v1);
        functions.insert("textLength{1}", v1);
        // Color manipulation arrived with revision 2. The weighted variant
        // takes (colors, weights, interpolate, value): exactly four
        // arguments, with colors and weights as juxtaposed lists.
        functions.insert("colorArgb{4}", v2);
        functions.insert("colorRgb{3}", v2);
        functions.insert("extractColorFromColors{3}", v2);
        functions.insert("extractColorFromWeightedColors{4}", v2);
        // Deprecated after revision 2.
        functions.insert("unreadNotificationCount{1}", VersionRange::new(Version(1), Version(2)));
        // Revision 4 additions.
        functions.insert("interpolate{3}", v4);
        functions.insert("animationFrame{2}", v4);

        let mut sources = HashMap::new();
        // Time and date, first revision.
        for key in [
            "UTC_TIMESTAMP", "MILLISECOND", "SECOND", "SECOND_Z", "SECOND_MILLISECOND",
            "SECONDS_IN_DAY", "MINUTE", "MINUTE_Z", "MINUTE_SECOND", "HOUR_0_11",
            "HOUR_0_11_Z", "HOUR_0_11_MINUTE", "HOUR_0_23", "HOUR_0_23_Z",
            "HOUR_0_23_MINUTE", "HOUR_1_12", "HOUR_1_24", "DAY", "DAY_Z", "DAY_OF_YEAR",
            "DAY_OF_WEEK", "DAY_OF_WEEK_F", "DAY_OF_WEEK_S", "MONTH", "MONTH_Z",
            "MONTH_F", "MONTH_S", "YEAR", "YEAR_S", "AMPM_STATE", "AMPM_POSITION",
            "IS_24_HOUR_MODE", "TIMEZONE", "TIMEZONE_ABB", "TIMEZONE_ID",
            "TIMEZONE_OFFSET", "LANGUAGE_LOCALE_NAME",
        ] {
            sources.insert(key, v1);
        }
        // Sensor and state, first revision.
        for key in [
            "STEP_COUNT", "STEP_GOAL", "STEP_PERCENT", "HEART_RATE", "HEART_RATE_Z",
            "BATTERY_PERCENT", "BATTERY_IS_CHARGING", "BATTERY_IS_LOW",
            "BATTERY_TEMPERATURE_CELSIUS", "BATTERY_TEMPERATURE_FAHRENHEIT",
            "ACCELEROMETER_IS_SUPPORTED", "ACCELEROMETER_X", "ACCELEROMETER_Y",
            "ACCELEROMETER_Z", "ACCELEROMETER_ANGLE_X", "ACCELEROMETER_ANGLE_Y",
            "ACCELEROMETER_ANGLE_Z",
        ] {
            sources.insert(key, v1);
        }
        // Complication scope, revision 2.
        for key in [
            "COMPLICATION.RANGED_VALUE", "COMPLICATION.RANGED_VALUE_MIN",
            "COMPLICATION.RANGED_VALUE_MAX", "COMPLICATION.TEXT", "COMPLICATION.TITLE",
            "COMPLICATION.MONOCHROMATIC_IMAGE", "COMPLICATION.SMALL_IMAGE",
            "COMPLICATION.GOAL_PROGRESS_VALUE", "COMPLICATION.GOAL_PROGRESS_TARGET_VALUE",
        ] {
            sources.insert(key, v2);
        }
        // Weather scope, revision 3; forecast entries carry an index.
        for key in [
            "WEATHER.IS_AVAILABLE", "WEATHER.CONDITION", "WEATHER.CONDITION_NAME",
            "WEATHER.IS_DAY", "WEATHER.TEMPERATURE", "WEATHER.TEMPERATURE_UNIT",
            "WEATHER.CHANCE_OF_PRECIPITATION", "WEATHER.UV_INDEX",
            "WEATHER.DAYS.#.CONDITION", "WEATHER.DAYS.#.TEMPERATURE_LOW",
            "WEATHER.DAYS.#.TEMPERATURE_HIGH", "WEATHER.DAYS.#.CHANCE_OF_PRECIPITATION",
            "WEATHER.HOURS.#.CONDITION", "WEATHER.HOURS.#.TEMPERATURE",
        ] {
            sources.insert(key, v3);
        }
        // Revision 4 additions.
        for key in ["MOON_PHASE_POSITION", "MOON_PHASE_TYPE", "MOON_PHASE_TYPE_STRING"] {
            sources.insert(key, v4);
        }

        Self { functions, sources }
    }

    /// Supported range for a function call, keyed by name and argument
    /// count. `None` means no revision ever defined this signature.
    pub fn function_range(&self, name: &str, arity: usize) -> Option<VersionRange> {
        let key = format!("{}{{{}}}", name, arity);
        self.functions.get(key.as_str()).copied()
    }

    /// Supported range for a data source reference. Unknown names default
    /// to all-versions: new sources appear frequently and must not make
    /// older documents unparseable.
    pub fn source_range(&self, name: &str) -> VersionRange {
        let normalized = normalize_source(name);
        self.sources
            .get(normalized.as_str())
            .copied()
            .unwrap_or_else(VersionRange::all)
    }
}

/// Access the static registry.
pub fn registry() -> &'static VersionRegistry {
    &REGISTRY
}

/// Replace purely numeric dot-segments with the `#` placeholder.
fn normalize_source(name: &str) -> String {
    name.split('.')
        .map(|segment| {
            if !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit()) {
                "#"
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join(".")
}
