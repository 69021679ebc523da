use std::env;
use std::fs;
use std::process;

use seq9::{
    config::{format_speed, parse_speed},
    grid_lines, tick_to_screen_offset, tick_to_time, ChartError, Document, EditorConfig,
    GridLineKind,
};

const USAGE: &[&str] = &[
    "Usage: seq9 [--no-validate] <input.xml> [output.xml]",
    "       seq9 --dump <input.xml>",
    "       seq9 --tree <input.xml>",
    "       seq9 [--config <editor.yaml>] [--speed <value>] [--no-validate] --grid <input.xml>",
];

#[derive(Debug, Clone, Copy, PartialEq)]
enum Mode {
    Normalize,
    Dump,
    Tree,
    Grid,
}

#[derive(Debug)]
struct Options {
    mode: Mode,
    no_validate: bool,
    config_path: Option<String>,
    speed: Option<String>,
    input_path: String,
    output_path: Option<String>,
}

fn usage() -> ! {
    for line in USAGE {
        eprintln!("{}", line);
    }
    process::exit(1);
}

fn parse_args(args: &[String]) -> Result<Options, String> {
    let mut mode = Mode::Normalize;
    let mut no_validate = false;
    let mut config_path = None;
    let mut speed = None;
    let mut positional = Vec::new();

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--no-validate" => no_validate = true,
            "--dump" => mode = Mode::Dump,
            "--tree" => mode = Mode::Tree,
            "--grid" => mode = Mode::Grid,
            "--config" => config_path = Some(iter.next().ok_or("--config needs a path")?.clone()),
            "--speed" => speed = Some(iter.next().ok_or("--speed needs a value")?.clone()),
            flag if flag.starts_with("--") => return Err(format!("Unknown option '{}'", flag)),
            _ => positional.push(arg.clone()),
        }
    }

    if mode != Mode::Grid {
        if config_path.is_some() {
            return Err("--config only applies to --grid".to_string());
        }
        if speed.is_some() {
            return Err("--speed only applies to --grid".to_string());
        }
    }

    let max_positional = if mode == Mode::Normalize { 2 } else { 1 };
    if positional.is_empty() {
        return Err("Missing input file".to_string());
    }
    if positional.len() > max_positional {
        return Err(format!("Unexpected argument '{}'", positional[max_positional]));
    }
    let mut positional = positional.into_iter();

    Ok(Options {
        mode,
        no_validate,
        config_path,
        speed,
        input_path: positional.next().unwrap_or_default(),
        output_path: positional.next(),
    })
}

fn load_config(path: Option<&str>) -> EditorConfig {
    let Some(path) = path else {
        return EditorConfig::default();
    };
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("Error reading config '{}': {}", path, e);
            process::exit(1);
        }
    };
    match EditorConfig::from_yaml(&content) {
        Ok(config) => {
            log::info!("loaded editor config from {}", path);
            config
        }
        Err(e) => {
            eprintln!("Error in config '{}': {}", path, e);
            process::exit(1);
        }
    }
}

fn to_yaml<T: serde::Serialize>(value: &T) -> String {
    match serde_yaml::to_string(value) {
        Ok(yaml) => yaml,
        Err(e) => {
            eprintln!("Error writing YAML: {}", e);
            process::exit(1);
        }
    }
}

fn grid_report(doc: &Document, speed: f64) -> Result<String, ChartError> {
    let info = &doc.info;
    let mut out = format!("# speed {}\n# tick\tms\toffset\tline\n", format_speed(speed));
    for line in grid_lines(info)? {
        let kind = match line.kind {
            GridLineKind::Beat => "beat",
            GridLineKind::Numerator => "numerator",
        };
        out.push_str(&format!(
            "{}\t{:.3}\t{:.4}\t{}\n",
            line.tick,
            tick_to_time(line.tick, info),
            tick_to_screen_offset(line.tick, info, speed),
            kind
        ));
    }
    Ok(out)
}

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        usage();
    }
    let options = parse_args(&args).unwrap_or_else(|e| {
        eprintln!("{}", e);
        usage()
    });

    // Read input file
    let source = match fs::read_to_string(&options.input_path) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("Error reading file '{}': {}", options.input_path, e);
            process::exit(1);
        }
    };

    let output = match options.mode {
        Mode::Tree => match seq9::decode_tree(&source) {
            Ok(tree) => to_yaml(&tree),
            Err(e) => {
                eprintln!("Decode error: {}", e);
                process::exit(1);
            }
        },
        _ => {
            let result = if options.no_validate {
                seq9::decode_unchecked(&source)
            } else {
                seq9::decode(&source)
            };
            let doc = match result {
                Ok(doc) => doc,
                Err(e) => {
                    eprintln!("Decode error: {}", e);
                    process::exit(1);
                }
            };
            if options.no_validate {
                if let Err(e) = seq9::validate(&doc) {
                    log::warn!("continuing with invalid chart: {}", e);
                }
            }
            match options.mode {
                Mode::Dump => to_yaml(&doc),
                Mode::Grid => {
                    let config = load_config(options.config_path.as_deref());
                    let speed = options.speed.as_deref().map_or(config.speed, parse_speed);
                    match grid_report(&doc, speed) {
                        Ok(report) => report,
                        Err(e) => {
                            eprintln!("Decode error: {}", e);
                            process::exit(1);
                        }
                    }
                }
                _ => seq9::encode(&doc),
            }
        }
    };

    // Output
    match options.output_path {
        Some(path) => {
            if let Err(e) = fs::write(&path, &output) {
                eprintln!("Error writing to '{}': {}", path, e);
                process::exit(1);
            }
            eprintln!("Wrote chart to {}", path);
        }
        None => {
            print!("{}", output);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(rest: &[&str]) -> Vec<String> {
        std::iter::once("seq9").chain(rest.iter().copied()).map(String::from).collect()
    }

    #[test]
    fn test_normalize_takes_optional_output() {
        let options = parse_args(&args(&["in.xml", "out.xml"])).unwrap();
        assert_eq!(options.mode, Mode::Normalize);
        assert_eq!(options.input_path, "in.xml");
        assert_eq!(options.output_path.as_deref(), Some("out.xml"));
    }

    #[test]
    fn test_config_only_applies_to_grid() {
        let err = parse_args(&args(&["--config", "editor.yaml", "in.xml"])).unwrap_err();
        assert_eq!(err, "--config only applies to --grid");
        assert!(parse_args(&args(&["--dump", "--config", "editor.yaml", "in.xml"])).is_err());

        let options = parse_args(&args(&["--config", "editor.yaml", "--grid", "in.xml"])).unwrap();
        assert_eq!(options.mode, Mode::Grid);
        assert_eq!(options.config_path.as_deref(), Some("editor.yaml"));
    }

    #[test]
    fn test_speed_only_applies_to_grid() {
        assert!(parse_args(&args(&["--speed", "2", "in.xml"])).is_err());
        let options = parse_args(&args(&["--grid", "--speed", "2x", "in.xml"])).unwrap();
        assert_eq!(options.speed.as_deref(), Some("2x"));
    }

    #[test]
    fn test_bad_arguments() {
        assert!(parse_args(&args(&["--grid"])).is_err());
        assert!(parse_args(&args(&["--grid", "a.xml", "b.xml"])).is_err());
        assert!(parse_args(&args(&["--config"])).is_err());
        assert_eq!(
            parse_args(&args(&["--fast", "in.xml"])).unwrap_err(),
            "Unknown option '--fast'"
        );
    }

    #[test]
    fn test_grid_report_rejects_unvalidated_timing() {
        let mut doc = Document {
            version: 9,
            info: seq9::Info {
                time_unit: 480,
                end_tick: 1920,
                tempo_map: vec![seq9::TempoPoint { tick: 0, bpm: 120.0 }],
                measure_map: vec![seq9::MeasurePoint { tick: 0, numerator: 4, denominator: 4 }],
            },
            notes: vec![],
            effects: vec![],
            clip: seq9::ClipInfo { start_time: 0, end_time: 2000 },
            recorded_effects: vec![],
        };
        let report = grid_report(&doc, 4.0).unwrap();
        assert!(report.contains("480\t500.000\t2.0000\tnumerator"));

        doc.info.measure_map.clear();
        assert!(grid_report(&doc, 4.0).is_err());
        doc.info.measure_map.push(seq9::MeasurePoint { tick: 0, numerator: 4, denominator: 4 });
        doc.info.tempo_map.clear();
        assert!(grid_report(&doc, 4.0).is_err());
    }
}
