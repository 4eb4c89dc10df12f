// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn args_without_endpoint() {
    let creds = Credentials::new("oneadmin", "secret");
    assert_eq!(
        creds.to_args(),
        vec!["--user", "oneadmin", "--password", "secret"]
    );
}

#[test]
fn args_with_endpoint() {
    let creds = Credentials::new("oneadmin", "secret").with_endpoint("http://one:2633/RPC2");
    let args = creds.to_args();
    assert_eq!(args[4], "--endpoint");
    assert_eq!(args[5], "http://one:2633/RPC2");
}

#[test]
fn debug_hides_password() {
    let creds = Credentials::new("oneadmin", "secret");
    let rendered = format!("{:?}", creds);
    assert!(rendered.contains("oneadmin"));
    assert!(!rendered.contains("secret"));
}
