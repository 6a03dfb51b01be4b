//! bedlevel CLI - manual bed-leveling G-code generator
//!
//! Asks for the bed size, travel settings and probing pattern, then writes a
//! G-code program that stops at every probe point for a paper test.

use anyhow::{Context, Result};
use bedlevel::{
    generate_points, resolve, write_program, ParameterSource, Preset, PresetSource,
    PrinterProfile, DEFAULT_OUTPUT_DIR,
};
use clap::Parser;
use std::io;
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;

mod input;

use input::ConsoleSource;

#[derive(Parser, Debug)]
#[command(name = "bedlevel")]
#[command(about = "Generate G-code for manual bed leveling", long_about = None)]
#[command(allow_negative_numbers = true)]
struct Cli {
    /// Max X coordinate of the bed in mm
    #[arg(long)]
    max_x: Option<i64>,
    /// Max Y coordinate of the bed in mm
    #[arg(long)]
    max_y: Option<i64>,
    /// Safe Z height for travel moves in mm
    #[arg(long)]
    safe_z: Option<i64>,
    /// Travel speed in mm/min
    #[arg(long)]
    travel_speed: Option<i64>,
    /// Probing pattern: 4 (four corners), z (Z pattern) or # (3x3 grid)
    #[arg(long)]
    pattern: Option<String>,
    /// Number of times to run the leveling cycle
    #[arg(long)]
    cycles: Option<i64>,
    /// Built-in printer whose bed size to use (see --list-printers)
    #[arg(long)]
    printer: Option<String>,
    /// TOML file with answers; flags take precedence
    #[arg(long)]
    preset: Option<PathBuf>,
    /// Directory the G-code file is written to
    #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
    output_dir: PathBuf,
    /// List the built-in printers and exit
    #[arg(long)]
    list_printers: bool,
    /// More log output (repeatable)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
    /// No log output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    fn preset_overrides(&self) -> Preset {
        Preset {
            printer: self.printer.clone(),
            max_x: self.max_x,
            max_y: self.max_y,
            safe_z: self.safe_z,
            travel_speed: self.travel_speed,
            pattern: self.pattern.clone(),
            cycles: self.cycles,
        }
    }

    fn log_level(&self) -> LevelFilter {
        if self.quiet {
            return LevelFilter::OFF;
        }
        match self.verbose {
            0 => LevelFilter::ERROR,
            1 => LevelFilter::WARN,
            2 => LevelFilter::INFO,
            3 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.log_level())
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    if cli.list_printers {
        list_printers();
        return Ok(());
    }

    println!("Bed level G-code generator. Answer the prompts to build a leveling program.\n");

    let stdin = io::stdin();
    let mut console = ConsoleSource::new(stdin.lock(), io::stdout());
    let path = run(&cli, &mut console)?;

    println!("Generated gcode and saved it to {}", path.display());
    Ok(())
}

fn run<S: ParameterSource>(cli: &Cli, answers: &mut S) -> Result<PathBuf> {
    let preset = load_preset(cli)?;
    let mut source = PresetSource::new(&preset, answers);
    let config = resolve(&mut source).context("failed to read leveling parameters")?;

    println!("Generating gcode...");
    let points = generate_points(&config)?;
    if points.is_empty() {
        source.notify(&format!(
            "There was an error generating gcode for {} cycle(s): no probe points, \
             the program only homes and parks the nozzle.",
            config.cycles
        ));
    }
    let path = write_program(&cli.output_dir, &config, &points)
        .with_context(|| format!("failed to write program to {}", cli.output_dir.display()))?;
    Ok(path)
}

fn load_preset(cli: &Cli) -> Result<Preset> {
    let file = match &cli.preset {
        Some(path) => Preset::load(path)?,
        None => Preset::default(),
    };
    Ok(file.merge(cli.preset_overrides()).apply_printer()?)
}

fn list_printers() {
    println!("Built-in printers:");
    for profile in PrinterProfile::all_profiles() {
        println!(
            "  {:<10} {} ({} x {} mm)",
            profile.key, profile.name, profile.bed_x, profile.bed_y
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bedlevel::ScriptedSource;
    use std::fs;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("bedlevel").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_flags_become_preset() {
        let cli = cli(&["--max-x", "220", "--travel-speed", "-50", "--pattern", "#"]);
        let preset = cli.preset_overrides();
        assert_eq!(preset.max_x, Some(220));
        assert_eq!(preset.travel_speed, Some(-50));
        assert_eq!(preset.pattern.as_deref(), Some("#"));
        assert_eq!(preset.max_y, None);
        assert_eq!(cli.output_dir, PathBuf::from(DEFAULT_OUTPUT_DIR));
    }

    #[test]
    fn test_log_level() {
        assert_eq!(cli(&[]).log_level(), LevelFilter::ERROR);
        assert_eq!(cli(&["-vv"]).log_level(), LevelFilter::INFO);
        assert_eq!(cli(&["-q"]).log_level(), LevelFilter::OFF);
        assert!(Cli::try_parse_from(["bedlevel", "-q", "-v"]).is_err());
    }

    #[test]
    fn test_run_with_printer_and_prompts() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().join("out");
        let cli = cli(&[
            "--printer",
            "ender3",
            "--pattern",
            "Z",
            "--output-dir",
            out.to_str().unwrap(),
        ]);

        // Bed size and pattern come from flags; the rest is typed.
        let path = run(&cli, &mut ScriptedSource::new(["", "2500", "1"])).unwrap();
        assert_eq!(path, out.join("_bed_level-z@2500mm.gcode"));

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("; max_x: 220, max_y: 220"));
        assert!(text.contains("G0 X205 Y205 F2500 ; Move to front right corner"));
    }

    #[test]
    fn test_run_with_preset_file() {
        let tmp = tempfile::tempdir().unwrap();
        let preset = tmp.path().join("bed.toml");
        fs::write(
            &preset,
            "max_x = 300\nmax_y = 200\nsafe_z = 2\ntravel_speed = 9000\npattern = \"#\"\ncycles = 2\n",
        )
        .unwrap();
        let out = tmp.path().join("generated");
        let cli = cli(&[
            "--preset",
            preset.to_str().unwrap(),
            "--max-y",
            "250",
            "--output-dir",
            out.to_str().unwrap(),
        ]);

        let path = run(&cli, &mut ScriptedSource::default()).unwrap();
        assert_eq!(path, out.join("_bed_level-#@5000mm.gcode"));

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("; max_x: 300, max_y: 250"));
        assert!(text.contains("; safe_z: 5, travel_speed: 5000, pattern: #"));
        assert_eq!(text.matches("; Move to point in grid.").count(), 18);
    }

    #[test]
    fn test_run_rejects_small_bed() {
        let tmp = tempfile::tempdir().unwrap();
        let cli = cli(&[
            "--max-x",
            "20",
            "--max-y",
            "200",
            "--output-dir",
            tmp.path().to_str().unwrap(),
        ]);
        assert!(run(&cli, &mut ScriptedSource::new(["", "", "4", "1"])).is_err());
    }

    #[test]
    fn test_run_reports_empty_program_to_operator() {
        let tmp = tempfile::tempdir().unwrap();
        let cli = cli(&[
            "--max-x",
            "200",
            "--max-y",
            "200",
            "--output-dir",
            tmp.path().to_str().unwrap(),
            "-q",
        ]);

        let mut answers = ScriptedSource::new(["10", "1500", "4", "0"]);
        let path = run(&cli, &mut answers).unwrap();

        let notices = answers.notices();
        assert_eq!(notices.len(), 1);
        assert!(notices[0].contains("There was an error generating gcode"));

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("G28 ; Home axes\n"));
        assert!(!text.contains("M0"));
        assert!(text.ends_with("G0 X25 Y25 F1500 ; Move to 25, 25 and stop\n"));
    }

    #[test]
    fn test_unknown_printer() {
        let cli = cli(&["--printer", "nope"]);
        assert!(load_preset(&cli).is_err());
    }
}
