// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[yare::parameterized(
    committed     = { "7",                                    JobState::Succeeded },
    failed_id     = { "7.ERROR",                              JobState::Failed },
    failed_temp   = { "3f1c2a9e-aaaa-bbbb-cccc-000000000000.ERROR", JobState::Failed },
    staging_uuid  = { "3f1c2a9e-aaaa-bbbb-cccc-000000000000", JobState::Pending },
    staging_seq   = { "tmp-1",                                JobState::Pending },
    empty         = { "",                                     JobState::Pending },
)]
fn state_from_dir_name(name: &str, expected: JobState) {
    assert_eq!(JobState::from_dir_name(name), expected);
}

#[yare::parameterized(
    create    = { ProvisionCommand::Create,    "create",    true },
    delete    = { ProvisionCommand::Delete,    "delete",    true },
    configure = { ProvisionCommand::Configure, "configure", true },
    list      = { ProvisionCommand::List,      "list",      false },
    show      = { ProvisionCommand::Show,      "show",      false },
)]
fn command_names(cmd: ProvisionCommand, name: &str, streaming: bool) {
    assert_eq!(cmd.as_str(), name);
    assert_eq!(cmd.to_string(), name);
    assert_eq!(cmd.is_streaming(), streaming);
}

#[test]
fn create_requests_cleanup_on_failure() {
    assert!(ProvisionCommand::Create
        .trailing_flags()
        .contains(&"--fail_cleanup"));
    assert!(ProvisionCommand::Show.trailing_flags().contains(&"--json"));
}
