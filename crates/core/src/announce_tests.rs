// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use proptest::prelude::*;

#[yare::parameterized(
    plain          = { "ID: 7",                  Some("7") },
    multi_digit    = { "ID: 1042",               Some("1042") },
    trailing_text  = { "ID: 12 created",         Some("12") },
    mid_line       = { "host ID: 12",            None },
    no_space       = { "ID:12",                  None },
    lowercase      = { "id: 12",                 None },
    not_a_number   = { "ID: abc",                None },
    empty          = { "",                       None },
)]
fn parses_announcement(line: &str, expected: Option<&str>) {
    assert_eq!(parse_announced_id(line), expected.map(JobId::new));
}

proptest! {
    #[test]
    fn any_number_round_trips(n in 0u64..u64::MAX) {
        let line = format!("ID: {}", n);
        prop_assert_eq!(parse_announced_id(&line), Some(JobId::new(n.to_string())));
    }

    #[test]
    fn lines_without_prefix_never_match(s in "[a-zA-Z ]{0,20}") {
        prop_assume!(!s.starts_with("ID: "));
        prop_assert_eq!(parse_announced_id(&s), None);
    }
}
