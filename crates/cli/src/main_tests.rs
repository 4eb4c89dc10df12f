// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use clap::error::ErrorKind;
use clap::FromArgMatches;

use super::{cli_command, format_error, Cli, Commands};
use crate::output::OutputFormat;

fn parse(args: &[&str]) -> Cli {
    let matches = cli_command().try_get_matches_from(args).unwrap();
    Cli::from_arg_matches(&matches).unwrap()
}

#[test]
fn version_long() {
    let err = cli_command()
        .try_get_matches_from(["prov", "--version"])
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DisplayVersion);
}

#[test]
fn create_requires_a_file() {
    let err = cli_command()
        .try_get_matches_from(["prov", "create"])
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
}

#[test]
fn output_flag_is_global() {
    let cli = parse(&["prov", "list", "-o", "json"]);
    assert_eq!(cli.output, OutputFormat::Json);
    assert!(matches!(cli.command, Some(Commands::List)));
}

#[test]
fn follow_and_credentials_parse() {
    let cli = parse(&[
        "prov",
        "create",
        "edge.yaml",
        "--follow",
        "--user",
        "oneadmin",
        "--password",
        "secret",
    ]);
    let Some(Commands::Create(args)) = cli.command else {
        panic!("expected create");
    };
    assert!(args.follow);
    assert_eq!(args.file.to_str(), Some("edge.yaml"));
    assert_eq!(cli.user.as_deref(), Some("oneadmin"));
    assert_eq!(cli.password.as_deref(), Some("secret"));
}

#[yare::parameterized(
    create = { &["prov", "create", "f.yaml"], true },
    delete = { &["prov", "delete", "7"], true },
    configure = { &["prov", "configure", "7"], true },
    list = { &["prov", "list"], true },
    show = { &["prov", "show", "7"], true },
    log = { &["prov", "log", "7"], false },
    status = { &["prov", "status", "7"], false },
    defaults = { &["prov", "defaults"], false },
)]
fn credentials_only_for_tool_commands(args: &[&str], expected: bool) {
    let cli = parse(args);
    let command = cli.command.unwrap();
    assert_eq!(command.needs_credentials(), expected);
}

#[test]
fn unknown_output_format_is_rejected() {
    let err = cli_command()
        .try_get_matches_from(["prov", "list", "-o", "xml"])
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidValue);
}

#[test]
fn format_error_skips_redundant_chain() {
    let inner = std::io::Error::other("disk full");
    let err = anyhow::Error::new(inner).context("failed to write: disk full");
    assert_eq!(format_error(&err), "failed to write: disk full");
}

#[test]
fn format_error_renders_new_causes() {
    let inner = std::io::Error::other("disk full");
    let err = anyhow::Error::new(inner).context("failed to write log");
    let msg = format_error(&err);
    assert!(msg.starts_with("failed to write log"));
    assert!(msg.contains("Caused by:\n    0: disk full"));
}
