// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::collections::{HashMap, HashSet};

#[test]
fn job_id_display_and_as_str() {
    let id = JobId::new("42");
    assert_eq!(id.as_str(), "42");
    assert_eq!(id.to_string(), "42");
    assert_eq!(id, "42");
}

#[test]
fn job_id_error_dir_name() {
    assert_eq!(JobId::new("7").error_dir_name(), "7.ERROR");
}

#[test]
fn ids_serialize_as_plain_strings() {
    let id = TempName::new("b2c4");
    let json = serde_json::to_string(&id).unwrap();
    assert_eq!(json, "\"b2c4\"");
    let back: TempName = serde_json::from_str(&json).unwrap();
    assert_eq!(back, id);
}

#[test]
fn ids_borrow_as_str_for_map_lookup() {
    let mut map = HashMap::new();
    map.insert(JobId::new("9"), "tmp-1");
    assert_eq!(map.get("9"), Some(&"tmp-1"));
}

#[test]
fn uuid_gen_produces_distinct_ids() {
    let gen = UuidIdGen;
    let ids: HashSet<String> = (0..256).map(|_| gen.next()).collect();
    assert_eq!(ids.len(), 256);
}

#[test]
fn sequential_gen_counts_from_one() {
    let gen = SequentialIdGen::new("job");
    assert_eq!(gen.next(), "job-1");
    assert_eq!(gen.next(), "job-2");
}

#[test]
fn sequential_gen_clones_share_counter() {
    let gen = SequentialIdGen::default();
    let other = gen.clone();
    assert_eq!(gen.next(), "tmp-1");
    assert_eq!(other.next(), "tmp-2");
}
