//! Command-line arguments

use std::io::{self, Write};
use std::path::PathBuf;

use crate::config::GameConfig;

/// Usage text printed for `--help` and for any unrecognized argument
pub const USAGE: &str = "\
Usage: fitch <arguments>

\t--no-log\t\tDo not write log info to a file.
\t--config <path>\t\tRead settings from <path> (default: fitch.ron).
\t--help, -h\t\tShow this message.
";

/// Parsed command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Args {
    /// Write the session log to disk on exit
    pub write_log: bool,
    /// Config file to load
    pub config_path: PathBuf,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            write_log: true,
            config_path: PathBuf::from(GameConfig::DEFAULT_PATH),
        }
    }
}

impl Args {
    /// Scan arguments (without the program name).
    ///
    /// Unknown arguments print the usage text to `out` and the scan
    /// continues with the next one.
    pub fn parse<I, S>(args: I, out: &mut dyn Write) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut parsed = Self::default();
        let mut args = args.into_iter().map(Into::into);

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--no-log" => parsed.write_log = false,
                "--config" => match args.next() {
                    Some(path) => parsed.config_path = PathBuf::from(path),
                    None => print_usage(out),
                },
                _ => print_usage(out),
            }
        }

        parsed
    }

    /// Scan the process arguments, printing usage to stdout
    pub fn from_env() -> Self {
        Self::parse(std::env::args().skip(1), &mut io::stdout())
    }
}

fn print_usage(out: &mut dyn Write) {
    writeln!(out, "{USAGE}").ok();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> (Args, String) {
        let mut out = Vec::new();
        let parsed = Args::parse(args.iter().copied(), &mut out);
        (parsed, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_defaults() {
        let (args, out) = parse(&[]);
        assert_eq!(args, Args::default());
        assert!(args.write_log);
        assert!(out.is_empty());
    }

    #[test]
    fn test_no_log_and_config() {
        let (args, out) = parse(&["--config", "custom.ron", "--no-log"]);
        assert!(!args.write_log);
        assert_eq!(args.config_path, PathBuf::from("custom.ron"));
        assert!(out.is_empty());
    }

    #[test]
    fn test_unknown_argument_does_not_stop_scan() {
        let (args, out) = parse(&["--fullscreen", "-h", "--no-log"]);
        assert!(!args.write_log);
        assert_eq!(out.matches("Usage: fitch").count(), 2);
    }

    #[test]
    fn test_config_without_path() {
        let (args, out) = parse(&["--config"]);
        assert_eq!(args.config_path, PathBuf::from("fitch.ron"));
        assert!(out.contains("--no-log"));
    }
}
