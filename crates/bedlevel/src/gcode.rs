//! G-code rendering and output.

use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{error, info};

use crate::config::BedConfig;
use crate::error::{BedLevelError, Result};
use crate::pattern::Point;

/// Directory the program is written to, relative to the working directory.
pub const DEFAULT_OUTPUT_DIR: &str = "generated";

/// Where the nozzle parks once the procedure is done.
pub const PARK_POSITION: (i64, i64) = (25, 25);

/// Render the leveling program for `config` visiting `points` in order.
///
/// An empty point list still yields the header and footer; the problem is
/// logged as an error rather than failing the run.
pub fn render(config: &BedConfig, points: &[Point]) -> String {
    let mut gcode = GcodeWriter::new(config);
    gcode.header();

    if points.is_empty() {
        error!(
            pattern = %config.pattern,
            cycles = config.cycles,
            "no probe points were generated for the provided inputs"
        );
    }
    for point in points {
        gcode.probe(point);
    }

    gcode.footer();
    gcode.finish()
}

/// File name for the program: `_bed_level-{pattern}@{travel_speed}mm.gcode`.
pub fn output_file_name(config: &BedConfig) -> String {
    format!(
        "_bed_level-{}@{}mm.gcode",
        config.pattern.code(),
        config.travel_speed
    )
}

/// Render the program and write it into `dir`, returning the file path.
///
/// `dir` is created if missing. An existing file with the same name is
/// replaced.
pub fn write_program(
    dir: impl AsRef<Path>,
    config: &BedConfig,
    points: &[Point],
) -> Result<PathBuf> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir).map_err(|source| BedLevelError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let path = dir.join(output_file_name(config));
    let text = render(config, points);

    let io_err = |source: std::io::Error| BedLevelError::Io {
        path: path.clone(),
        source,
    };
    let mut out = BufWriter::new(File::create(&path).map_err(io_err)?);
    out.write_all(text.as_bytes()).map_err(io_err)?;
    out.flush().map_err(io_err)?;

    info!(path = %path.display(), points = points.len(), "wrote leveling program");
    Ok(path)
}

/// Line-by-line builder for the leveling program.
struct GcodeWriter<'a> {
    config: &'a BedConfig,
    out: String,
}

impl<'a> GcodeWriter<'a> {
    fn new(config: &'a BedConfig) -> Self {
        Self {
            config,
            out: String::new(),
        }
    }

    fn line(&mut self, command: &str, comment: &str) {
        // Writing into a String cannot fail.
        let _ = writeln!(self.out, "{command} ; {comment}");
    }

    fn blank(&mut self) {
        self.out.push('\n');
    }

    fn header(&mut self) {
        let c = self.config;
        self.line("G28", "Home axes");
        self.line("G21", "Set units to mm");
        self.line("G90", "Set positioning to absolute mode");
        self.blank();
        self.out.push_str("; DEBUG INFORMATION:\n");
        let _ = writeln!(self.out, "; max_x: {}, max_y: {}", c.max_x, c.max_y);
        let _ = writeln!(
            self.out,
            "; safe_z: {}, travel_speed: {}, pattern: {}",
            c.safe_z, c.travel_speed, c.pattern
        );
        self.blank();
    }

    fn safe_z(&mut self) {
        let cmd = format!("G0 Z{} F{}", self.config.safe_z, self.config.travel_speed);
        self.line(&cmd, "Move Z to safe height");
    }

    fn probe(&mut self, point: &Point) {
        let speed = self.config.travel_speed;
        self.safe_z();
        let cmd = format!("G0 X{} Y{} F{}", point.x, point.y, speed);
        self.line(&cmd, &format!("Move to {}", point.site.comment()));
        self.line(
            "M0 Place paper below nozzle",
            "Wait for the user to place the paper below the nozzle",
        );
        self.line(&format!("G0 Z0 F{speed}"), "Move Z down to bed");
        self.line("M0 Adjust level", "Wait for the user to adjust the level");
        self.blank();
    }

    fn footer(&mut self) {
        let (x, y) = PARK_POSITION;
        self.safe_z();
        let cmd = format!("G0 X{x} Y{y} F{}", self.config.travel_speed);
        self.line(&cmd, &format!("Move to {x}, {y} and stop"));
    }

    fn finish(self) -> String {
        self.out
    }
}
