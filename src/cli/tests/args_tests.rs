use clap::Parser;

use super::args::{CliArgs, Command, OutputFormat};

fn check_args(argv: &[&str]) -> super::args::CheckArgs {
    let args = CliArgs::try_parse_from(argv.iter().copied()).expect("args should parse");
    match args.command {
        Command::Check(check) => check,
    }
}

#[test]
fn parses_defaults() {
    let args = check_args(&["templar", "check", "project.json"]);

    assert_eq!(args.file, std::path::PathBuf::from("project.json"));
    assert_eq!(args.format, OutputFormat::Text);
    assert!(!args.no_parallel);
    assert_eq!(args.max_diagnostics, None);
    assert_eq!(args.pretty, None);
}

#[test]
fn parses_common_flags() {
    let args = check_args(&[
        "templar",
        "check",
        "--format",
        "json",
        "--no-parallel",
        "--max-diagnostics",
        "5",
        "--pretty",
        "false",
        "sites/project.json",
    ]);

    assert_eq!(args.format, OutputFormat::Json);
    assert!(args.no_parallel);
    assert_eq!(args.max_diagnostics, Some(5));
    assert_eq!(args.pretty, Some(false));
    assert_eq!(
        args.file.as_path(),
        std::path::Path::new("sites/project.json")
    );
}

#[test]
fn rejects_missing_file() {
    assert!(CliArgs::try_parse_from(["templar", "check"]).is_err());
}

#[test]
fn rejects_unknown_format() {
    assert!(CliArgs::try_parse_from(["templar", "check", "--format", "xml", "p.json"]).is_err());
}
