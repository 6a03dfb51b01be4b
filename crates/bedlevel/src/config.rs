//! Leveling configuration and the parameter resolver.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{BedLevelError, Result};
use crate::source::{Parameter, ParameterSource};

/// Lowest allowed safe Z height (mm).
pub const MIN_SAFE_Z: i64 = 5;
/// Safe Z height used when none is given (mm).
pub const DEFAULT_SAFE_Z: i64 = 10;
/// Highest allowed travel speed (mm/min).
pub const MAX_TRAVEL_SPEED: i64 = 5000;
/// Travel speed used when none is given (mm/min).
pub const DEFAULT_TRAVEL_SPEED: i64 = 1500;
/// Cycle count used when none is given.
pub const DEFAULT_CYCLES: i64 = 1;

/// Probing pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pattern {
    /// Four corners, traced as a loop.
    #[serde(rename = "4")]
    FourCorners,
    /// Four corners, traced as a Z.
    #[serde(rename = "z")]
    ZPattern,
    /// 3x3 grid ("tic tac toe").
    #[serde(rename = "#")]
    Grid3x3,
}

impl Pattern {
    /// All patterns, in menu order.
    pub const ALL: [Pattern; 3] = [Pattern::FourCorners, Pattern::ZPattern, Pattern::Grid3x3];

    /// Single-character code typed by the operator and used in file names.
    pub fn code(&self) -> &'static str {
        match self {
            Pattern::FourCorners => "4",
            Pattern::ZPattern => "z",
            Pattern::Grid3x3 => "#",
        }
    }

    /// Menu label.
    pub fn description(&self) -> &'static str {
        match self {
            Pattern::FourCorners => "Four corners",
            Pattern::ZPattern => "Z pattern",
            Pattern::Grid3x3 => "Tic tac toe",
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Error returned when a pattern code is not recognized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPattern(
    /// The rejected input, as typed.
    pub String,
);

impl fmt::Display for UnknownPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown pattern: {}", self.0)
    }
}

impl std::error::Error for UnknownPattern {}

impl FromStr for Pattern {
    type Err = UnknownPattern;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let code = s.trim().to_lowercase();
        Pattern::ALL
            .into_iter()
            .find(|p| p.code() == code)
            .ok_or_else(|| UnknownPattern(s.to_string()))
    }
}

/// Resolved leveling configuration.
///
/// Built once by [`resolve`] and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BedConfig {
    /// Maximum X coordinate of the bed (mm).
    pub max_x: i64,
    /// Maximum Y coordinate of the bed (mm).
    pub max_y: i64,
    /// Height for travel moves (mm).
    pub safe_z: i64,
    /// Feedrate for every move (mm/min).
    pub travel_speed: i64,
    /// Probing pattern.
    pub pattern: Pattern,
    /// How many times the pattern is repeated.
    pub cycles: i64,
}

impl BedConfig {
    /// Config for a bed with every optional parameter at its default.
    pub fn new(max_x: i64, max_y: i64, pattern: Pattern) -> Self {
        Self {
            max_x,
            max_y,
            safe_z: DEFAULT_SAFE_Z,
            travel_speed: DEFAULT_TRAVEL_SPEED,
            pattern,
            cycles: DEFAULT_CYCLES,
        }
    }
}

/// Ask `source` for every parameter and build a [`BedConfig`].
///
/// Bad bed dimensions and unknown pattern codes are asked again. Other
/// parameters fall back to a default or are clamped, with a notice. Fails
/// only if the source runs out of input while a bed dimension or the
/// pattern is still missing.
pub fn resolve<S: ParameterSource + ?Sized>(source: &mut S) -> Result<BedConfig> {
    let (max_x, max_y) = resolve_bed_size(source)?;
    let safe_z = resolve_safe_z(source)?;
    let travel_speed = resolve_travel_speed(source)?;
    let pattern = resolve_pattern(source)?;
    let cycles = resolve_cycles(source)?;

    let config = BedConfig {
        max_x,
        max_y,
        safe_z,
        travel_speed,
        pattern,
        cycles,
    };
    debug!(?config, "resolved configuration");
    Ok(config)
}

fn resolve_bed_size<S: ParameterSource + ?Sized>(source: &mut S) -> Result<(i64, i64)> {
    loop {
        let max_x = required(source, Parameter::MaxX)?;
        let max_y = required(source, Parameter::MaxY)?;

        match (parse_int(&max_x), parse_int(&max_y)) {
            (Some(x), Some(y)) if x > 0 && y > 0 => return Ok((x, y)),
            (Some(_), Some(_)) => notice(
                source,
                "Bed dimensions must be greater than zero. Please enter them again.",
            ),
            _ => notice(
                source,
                "Please enter numbers for bed dimensions, not letters!",
            ),
        }
    }
}

fn resolve_safe_z<S: ParameterSource + ?Sized>(source: &mut S) -> Result<i64> {
    let answer = optional(source, Parameter::SafeZ)?;
    Ok(match parse_int(&answer) {
        Some(z) if z < MIN_SAFE_Z => {
            notice(
                source,
                &format!(
                    "Safe Z of {z}mm is not a safe travel height, using {MIN_SAFE_Z}mm instead."
                ),
            );
            MIN_SAFE_Z
        }
        Some(z) => z,
        None => {
            notice(
                source,
                &format!("Safe Z was not a number, using default of {DEFAULT_SAFE_Z}mm."),
            );
            DEFAULT_SAFE_Z
        }
    })
}

fn resolve_travel_speed<S: ParameterSource + ?Sized>(source: &mut S) -> Result<i64> {
    let answer = optional(source, Parameter::TravelSpeed)?;
    Ok(match parse_int(&answer) {
        Some(speed) if speed > MAX_TRAVEL_SPEED => {
            notice(
                source,
                &format!(
                    "A travel speed of {speed}mm/min is not safe, reducing to {MAX_TRAVEL_SPEED}mm/min."
                ),
            );
            MAX_TRAVEL_SPEED
        }
        Some(speed) => speed,
        None => {
            notice(
                source,
                &format!(
                    "Travel speed was not a number, using default of {DEFAULT_TRAVEL_SPEED}mm/min."
                ),
            );
            DEFAULT_TRAVEL_SPEED
        }
    })
}

fn resolve_pattern<S: ParameterSource + ?Sized>(source: &mut S) -> Result<Pattern> {
    loop {
        let answer = required(source, Parameter::Pattern)?;
        match answer.parse::<Pattern>() {
            Ok(pattern) => return Ok(pattern),
            Err(_) => notice(
                source,
                &format!(
                    "Invalid pattern: {}. Please enter an option from the list!",
                    answer.trim()
                ),
            ),
        }
    }
}

fn resolve_cycles<S: ParameterSource + ?Sized>(source: &mut S) -> Result<i64> {
    let answer = optional(source, Parameter::Cycles)?;
    Ok(match parse_int(&answer) {
        Some(cycles) => cycles,
        None => {
            notice(
                source,
                "Number of cycles was not a number, defaulting to one cycle.",
            );
            DEFAULT_CYCLES
        }
    })
}

fn required<S: ParameterSource + ?Sized>(source: &mut S, parameter: Parameter) -> Result<String> {
    source
        .answer(parameter)?
        .ok_or(BedLevelError::InputClosed(parameter.name()))
}

// End of input counts as a blank answer.
fn optional<S: ParameterSource + ?Sized>(source: &mut S, parameter: Parameter) -> Result<String> {
    Ok(source.answer(parameter)?.unwrap_or_default())
}

fn parse_int(answer: &str) -> Option<i64> {
    answer.trim().parse().ok()
}

fn notice<S: ParameterSource + ?Sized>(source: &mut S, message: &str) {
    warn!("{message}");
    source.notify(message);
}
