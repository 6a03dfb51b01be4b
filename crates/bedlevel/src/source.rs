//! Answer sources for the parameter resolver.
//!
//! The resolver never talks to a terminal directly. It asks a
//! [`ParameterSource`] for raw answers, which lets the same validation run
//! against a console, a scripted list of answers in tests, or a preset
//! loaded from the command line and a TOML file.

use std::collections::{HashMap, VecDeque};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Pattern;
use crate::error::{BedLevelError, Result};
use crate::printer::PrinterProfile;

/// A parameter the resolver asks for, in prompt order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Parameter {
    /// Maximum X coordinate of the bed.
    MaxX,
    /// Maximum Y coordinate of the bed.
    MaxY,
    /// Safe travel height.
    SafeZ,
    /// Travel feedrate.
    TravelSpeed,
    /// Probing pattern code.
    Pattern,
    /// Number of leveling cycles.
    Cycles,
}

impl Parameter {
    /// All parameters in the order they are asked.
    pub const ALL: [Parameter; 6] = [
        Parameter::MaxX,
        Parameter::MaxY,
        Parameter::SafeZ,
        Parameter::TravelSpeed,
        Parameter::Pattern,
        Parameter::Cycles,
    ];

    /// Short human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            Parameter::MaxX => "max X",
            Parameter::MaxY => "max Y",
            Parameter::SafeZ => "safe Z",
            Parameter::TravelSpeed => "travel speed",
            Parameter::Pattern => "pattern",
            Parameter::Cycles => "cycles",
        }
    }

    /// Prompt text shown to an interactive operator.
    pub fn prompt(&self) -> String {
        match self {
            Parameter::MaxX => "Please enter the max X coordinate of your print bed in mm: ".into(),
            Parameter::MaxY => "Please enter the max Y coordinate of your print bed in mm: ".into(),
            Parameter::SafeZ => {
                "Please enter a safe Z height in mm (def: 10mm) for travel moves or leave blank: "
                    .into()
            }
            Parameter::TravelSpeed => {
                "Please enter a travel speed in mm/min (def: 1500) or leave blank: ".into()
            }
            Parameter::Pattern => {
                let mut prompt = String::from("Please choose a pattern from the following options:\n");
                for pattern in Pattern::ALL {
                    prompt.push_str(&format!("{} --- {}\n", pattern.description(), pattern.code()));
                }
                prompt.push_str("Enter your choice: ");
                prompt
            }
            Parameter::Cycles => {
                "Please enter how many times to go over the leveling cycle: ".into()
            }
        }
    }
}

/// Supplies raw answers to the resolver and receives operator notices.
pub trait ParameterSource {
    /// Get the next answer for `parameter`.
    ///
    /// Returns `Ok(None)` when no more input is available.
    fn answer(&mut self, parameter: Parameter) -> Result<Option<String>>;

    /// Show a notice (warning, retry hint) to the operator.
    fn notify(&mut self, message: &str);
}

impl<S: ParameterSource + ?Sized> ParameterSource for &mut S {
    fn answer(&mut self, parameter: Parameter) -> Result<Option<String>> {
        (**self).answer(parameter)
    }

    fn notify(&mut self, message: &str) {
        (**self).notify(message)
    }
}

/// A source that replays a fixed list of answers, in order.
///
/// Records which parameters were asked and every notice it received.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSource {
    answers: VecDeque<String>,
    asked: Vec<Parameter>,
    notices: Vec<String>,
}

impl ScriptedSource {
    /// Create a source from answers given in prompt order.
    pub fn new<I, T>(answers: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            asked: Vec::new(),
            notices: Vec::new(),
        }
    }

    /// Parameters asked so far, in order.
    pub fn asked(&self) -> &[Parameter] {
        &self.asked
    }

    /// Notices received so far.
    pub fn notices(&self) -> &[String] {
        &self.notices
    }

    /// Number of answers not consumed yet.
    pub fn remaining(&self) -> usize {
        self.answers.len()
    }
}

impl ParameterSource for ScriptedSource {
    fn answer(&mut self, parameter: Parameter) -> Result<Option<String>> {
        self.asked.push(parameter);
        Ok(self.answers.pop_front())
    }

    fn notify(&mut self, message: &str) {
        self.notices.push(message.to_string());
    }
}

/// Answers supplied ahead of time, from flags or a TOML file.
///
/// Every field is optional; missing answers are asked interactively.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Preset {
    /// Built-in printer profile key used to fill the bed size.
    pub printer: Option<String>,
    /// Maximum X coordinate (mm).
    pub max_x: Option<i64>,
    /// Maximum Y coordinate (mm).
    pub max_y: Option<i64>,
    /// Safe travel height (mm).
    pub safe_z: Option<i64>,
    /// Travel feedrate (mm/min).
    pub travel_speed: Option<i64>,
    /// Pattern code (`4`, `z` or `#`).
    pub pattern: Option<String>,
    /// Number of leveling cycles.
    pub cycles: Option<i64>,
}

impl Preset {
    /// Parse a preset from TOML text.
    pub fn from_toml_str(text: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Load a preset from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| BedLevelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text).map_err(|source| BedLevelError::Preset {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Combine two presets; values set in `overrides` win.
    pub fn merge(self, overrides: Preset) -> Self {
        Self {
            printer: overrides.printer.or(self.printer),
            max_x: overrides.max_x.or(self.max_x),
            max_y: overrides.max_y.or(self.max_y),
            safe_z: overrides.safe_z.or(self.safe_z),
            travel_speed: overrides.travel_speed.or(self.travel_speed),
            pattern: overrides.pattern.or(self.pattern),
            cycles: overrides.cycles.or(self.cycles),
        }
    }

    /// Fill bed dimensions that are still unset from the named printer.
    pub fn apply_printer(mut self) -> Result<Self> {
        if let Some(key) = &self.printer {
            let profile = PrinterProfile::find(key)
                .ok_or_else(|| BedLevelError::UnknownPrinter(key.clone()))?;
            debug!(printer = %profile.name, "using printer bed size");
            self.max_x.get_or_insert(profile.bed_x);
            self.max_y.get_or_insert(profile.bed_y);
        }
        Ok(self)
    }

    /// The preset answer for `parameter`, formatted like typed input.
    pub fn answer(&self, parameter: Parameter) -> Option<String> {
        match parameter {
            Parameter::MaxX => self.max_x.map(|v| v.to_string()),
            Parameter::MaxY => self.max_y.map(|v| v.to_string()),
            Parameter::SafeZ => self.safe_z.map(|v| v.to_string()),
            Parameter::TravelSpeed => self.travel_speed.map(|v| v.to_string()),
            Parameter::Pattern => self.pattern.clone(),
            Parameter::Cycles => self.cycles.map(|v| v.to_string()),
        }
    }
}

/// Serves preset answers first, then falls back to another source.
///
/// Each preset answer is used once, so a rejected value is asked again
/// through the inner source instead of looping.
#[derive(Debug)]
pub struct PresetSource<S> {
    answers: HashMap<Parameter, String>,
    inner: S,
}

impl<S: ParameterSource> PresetSource<S> {
    /// Wrap `inner` with the answers from `preset`.
    pub fn new(preset: &Preset, inner: S) -> Self {
        let answers = Parameter::ALL
            .iter()
            .filter_map(|&p| preset.answer(p).map(|a| (p, a)))
            .collect();
        Self { answers, inner }
    }

    /// Unwrap the inner source.
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: ParameterSource> ParameterSource for PresetSource<S> {
    fn answer(&mut self, parameter: Parameter) -> Result<Option<String>> {
        if let Some(answer) = self.answers.remove(&parameter) {
            debug!(parameter = parameter.name(), %answer, "answered from preset");
            return Ok(Some(answer));
        }
        self.inner.answer(parameter)
    }

    fn notify(&mut self, message: &str) {
        self.inner.notify(message)
    }
}
