//! Version arithmetic scenarios against the public API

use nextver::{Change, SemanticVersion};

#[test]
fn parse_scenarios() {
    let v: SemanticVersion = "v1.20.103".parse().unwrap();
    assert_eq!((v.major, v.minor, v.patch), (1, 20, 103));

    let v: SemanticVersion = "v0.12.4 beta".parse().unwrap();
    assert_eq!((v.major, v.minor, v.patch), (0, 12, 4));

    let v: SemanticVersion = "v0.0.5".parse().unwrap();
    assert_eq!((v.major, v.minor, v.patch), (0, 0, 5));
}

#[test]
fn next_scenarios() {
    let pre = SemanticVersion { major: 0, minor: 0, patch: 5 };
    assert_eq!(pre.next(Change::Breaking).to_string(), "v0.1.0");

    let v = SemanticVersion { major: 1, minor: 2, patch: 3 };
    assert_eq!(v.next(Change::Breaking).to_string(), "v2.0.0");
    assert_eq!(v.next(Change::Addition).to_string(), "v1.3.0");
    assert_eq!(v.next(Change::Patch).to_string(), "v1.2.4");
    assert_eq!(v.next(Change::None), v);
}

#[test]
fn verdict_fold_is_order_insensitive() {
    let verdicts = [Change::Patch, Change::Breaking, Change::Addition, Change::None];

    let forward = verdicts.iter().copied().fold(Change::None, Change::max);
    let backward = verdicts.iter().rev().copied().fold(Change::None, Change::max);

    assert_eq!(forward, Change::Breaking);
    assert_eq!(forward, backward);
}
