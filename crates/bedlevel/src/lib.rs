#![warn(missing_docs)]

//! Manual bed-leveling G-code generation.
//!
//! This crate turns a handful of answers (bed size, safe Z height, travel
//! speed, probing pattern, number of cycles) into a G-code program that walks
//! the nozzle over the bed and pauses at every point so the operator can
//! adjust the leveling screws with a sheet of paper.
//!
//! # Example
//!
//! ```no_run
//! use bedlevel::{generate_points, resolve, write_program, ScriptedSource};
//!
//! let mut answers = ScriptedSource::new(["220", "220", "", "3000", "#", "2"]);
//! let config = resolve(&mut answers)?;
//! let points = generate_points(&config)?;
//! let path = write_program("generated", &config, &points)?;
//! println!("wrote {}", path.display());
//! # Ok::<(), bedlevel::BedLevelError>(())
//! ```

pub mod config;
pub mod error;
pub mod gcode;
pub mod pattern;
pub mod printer;
pub mod source;

pub use config::{resolve, BedConfig, Pattern};
pub use error::{BedLevelError, Result};
pub use gcode::{output_file_name, render, write_program, DEFAULT_OUTPUT_DIR};
pub use pattern::{generate_points, linspace, Point, Site};
pub use printer::PrinterProfile;
pub use source::{Parameter, ParameterSource, Preset, PresetSource, ScriptedSource};
