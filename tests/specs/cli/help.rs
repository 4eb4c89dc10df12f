//! CLI help specs

use crate::prelude::*;

#[test]
fn no_subcommand_prints_help() {
    cli()
        .passes()
        .stdout_has("Usage: prov")
        .stdout_has("create")
        .stdout_has("defaults");
}

#[test]
fn create_help_documents_follow() {
    cli()
        .args(&["create", "--help"])
        .passes()
        .stdout_has("--follow")
        .stdout_has("<FILE>");
}
