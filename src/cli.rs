use std::path::PathBuf;

use crate::config::config_path_hint;
use crate::theme::ThemeArg;

/// CLI arguments parsed from command line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliArgs {
    pub patch_path: PathBuf,
    pub threads_path: PathBuf,
    pub theme: Option<ThemeArg>,
    /// Files to start collapsed
    pub collapsed: Vec<PathBuf>,
    pub large_diff_threshold: Option<usize>,
    /// Print placements and threads instead of opening the viewer
    pub print: bool,
}

fn help_text(name: &str) -> String {
    let valid_values = ThemeArg::valid_values_display();
    let config_path = config_path_hint();
    format!(
        "threadmark - Anchor pull request review threads onto a local patch

Usage: {name} [OPTIONS] <PATCH> <THREADS>

Arguments:
  <PATCH>    Unified diff of the pull request (`git diff` output)
  <THREADS>  Review threads as JSON

Options:
  --theme <THEME>                 Color theme to use [default: dark]
                                  Valid values: {valid_values}
                                  Precedence: --theme > {config_path} > dark
  --collapse <PATH>               Start with PATH collapsed (repeatable)
  --large-diff-threshold <LINES>  Defer rendering of files with more lines
  --print                         Print placements to stdout and exit
  -h, --help                      Print this help message

Press ? in the viewer for keybinding help."
    )
}

/// Parse CLI arguments from command line, exiting on `--help` or bad input.
pub fn parse_cli_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let name = args
        .first()
        .and_then(|p| {
            std::path::Path::new(p)
                .file_name()
                .map(|s| s.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| "threadmark".to_string());

    match parse_cli_args_from(&args) {
        Ok(Some(cli_args)) => cli_args,
        Ok(None) => {
            println!("{}", help_text(&name));
            std::process::exit(0);
        }
        Err(err) => {
            eprintln!("Error: {err}\n\nRun '{name} --help' for usage.");
            std::process::exit(2);
        }
    }
}

/// Returns `Ok(None)` when help was requested.
fn parse_cli_args_from(args: &[String]) -> Result<Option<CliArgs>, String> {
    let mut cli_args = CliArgs::default();
    let mut positional: Vec<PathBuf> = Vec::new();
    let mut iter = args.iter().skip(1);

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(None),
            "--print" => cli_args.print = true,
            "--theme" => {
                let value = required_value(&mut iter, "--theme")?;
                cli_args.theme = Some(parse_theme(value)?);
            }
            "--collapse" => {
                let value = required_value(&mut iter, "--collapse")?;
                cli_args.collapsed.push(PathBuf::from(value));
            }
            "--large-diff-threshold" => {
                let value = required_value(&mut iter, "--large-diff-threshold")?;
                cli_args.large_diff_threshold = Some(parse_threshold(value)?);
            }
            other => {
                if let Some(value) = other.strip_prefix("--theme=") {
                    cli_args.theme = Some(parse_theme(value)?);
                } else if let Some(value) = other.strip_prefix("--collapse=") {
                    cli_args.collapsed.push(PathBuf::from(value));
                } else if let Some(value) = other.strip_prefix("--large-diff-threshold=") {
                    cli_args.large_diff_threshold = Some(parse_threshold(value)?);
                } else if other.starts_with('-') && other != "-" {
                    return Err(format!("Unknown option '{other}'"));
                } else {
                    positional.push(PathBuf::from(other));
                }
            }
        }
    }

    let mut positional = positional.into_iter();
    cli_args.patch_path = positional
        .next()
        .ok_or_else(|| "missing <PATCH> argument".to_string())?;
    cli_args.threads_path = positional
        .next()
        .ok_or_else(|| "missing <THREADS> argument".to_string())?;
    if let Some(extra) = positional.next() {
        return Err(format!("unexpected argument '{}'", extra.display()));
    }

    Ok(Some(cli_args))
}

fn required_value<'a, I>(iter: &mut I, flag: &str) -> Result<&'a str, String>
where
    I: Iterator<Item = &'a String>,
{
    match iter.next() {
        Some(value) if !value.starts_with('-') => Ok(value.as_str()),
        _ => Err(format!("{flag} requires a value")),
    }
}

fn parse_theme(value: &str) -> Result<ThemeArg, String> {
    let valid_values = ThemeArg::valid_values_display();
    if value.is_empty() {
        return Err(format!("--theme requires a value ({valid_values})"));
    }
    ThemeArg::from_str(value)
        .ok_or_else(|| format!("Unknown theme '{value}'. Valid options: {valid_values}"))
}

fn parse_threshold(value: &str) -> Result<usize, String> {
    value
        .parse()
        .map_err(|_| format!("--large-diff-threshold expects a line count, got '{value}'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_for_test(args: &[&str]) -> Result<Option<CliArgs>, String> {
        let args = args.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        parse_cli_args_from(&args)
    }

    fn parse_ok(args: &[&str]) -> CliArgs {
        parse_for_test(args)
            .expect("parse should succeed")
            .expect("help should not be requested")
    }

    #[test]
    fn should_parse_positional_paths() {
        let parsed = parse_ok(&["threadmark", "pr.diff", "threads.json"]);
        assert_eq!(parsed.patch_path, PathBuf::from("pr.diff"));
        assert_eq!(parsed.threads_path, PathBuf::from("threads.json"));
        assert!(!parsed.print);
        assert_eq!(parsed.theme, None);
    }

    #[test]
    fn should_parse_all_options() {
        let parsed = parse_ok(&[
            "threadmark",
            "--theme",
            "light",
            "--collapse",
            "a.rs",
            "--collapse=b.rs",
            "--large-diff-threshold=20",
            "--print",
            "pr.diff",
            "threads.json",
        ]);
        assert_eq!(parsed.theme, Some(ThemeArg::Light));
        assert_eq!(
            parsed.collapsed,
            vec![PathBuf::from("a.rs"), PathBuf::from("b.rs")]
        );
        assert_eq!(parsed.large_diff_threshold, Some(20));
        assert!(parsed.print);
    }

    #[test]
    fn should_report_help_request() {
        assert_eq!(parse_for_test(&["threadmark", "--help"]), Ok(None));
        assert_eq!(parse_for_test(&["threadmark", "pr.diff", "-h"]), Ok(None));
    }

    #[test]
    fn should_error_for_invalid_theme() {
        let err = parse_for_test(&["threadmark", "--theme=nope", "a", "b"]).unwrap_err();
        assert!(err.contains("Unknown theme 'nope'"));
    }

    #[test]
    fn should_error_when_option_value_missing() {
        let err = parse_for_test(&["threadmark", "a", "b", "--theme"]).unwrap_err();
        assert!(err.contains("--theme requires a value"));

        let err = parse_for_test(&["threadmark", "--collapse", "--print", "a", "b"]).unwrap_err();
        assert!(err.contains("--collapse requires a value"));
    }

    #[test]
    fn should_error_for_missing_or_extra_positionals() {
        let err = parse_for_test(&["threadmark", "pr.diff"]).unwrap_err();
        assert!(err.contains("<THREADS>"));

        let err = parse_for_test(&["threadmark", "a", "b", "c"]).unwrap_err();
        assert!(err.contains("unexpected argument 'c'"));
    }

    #[test]
    fn should_error_for_bad_threshold_and_unknown_flag() {
        assert!(parse_for_test(&["threadmark", "--large-diff-threshold", "lots", "a", "b"]).is_err());
        let err = parse_for_test(&["threadmark", "--verbose", "a", "b"]).unwrap_err();
        assert!(err.contains("Unknown option '--verbose'"));
    }

    #[test]
    fn help_text_lists_theme_values_and_config_path() {
        let text = help_text("threadmark");
        assert!(text.contains("dark, light"));
        assert!(text.contains("threadmark/config.toml"));
    }
}
