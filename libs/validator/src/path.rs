//! Dotted-path predicates over dynamic JSON documents.
//!
//! Paths look like `Patient.address.postalCode`. The first segment names the
//! root resource type and is ignored by traversal; descent starts from the
//! document root at the second segment. Two traversal disciplines coexist:
//!
//! - [`exists`] and [`matches`] branch across arrays: when a segment lands
//!   on an array, the remainder of the path is tried against every object
//!   element and any hit satisfies the predicate.
//! - [`has_fixed`] and [`has_allowed`] descend through objects only. A rule
//!   like `Patient.name.family: fixedValue` therefore does NOT match
//!   `{"name": [{"family": …}]}` — fixed-value checks are scalar-oriented.
//!
//! All predicates treat type mismatches in the document as "condition not
//! met" rather than an error, and an unparsable regex yields `false`.

use regex::Regex;
use serde_json::Value;

/// True when the path resolves to a present value: a non-empty array, an
/// object, or a non-null scalar. Empty arrays and `null` do not count.
pub fn exists(root: &Value, path: &str) -> bool {
    let segments: Vec<&str> = path.split('.').collect();
    if segments.len() < 2 {
        return false;
    }
    exists_at(root, &segments[1..])
}

fn exists_at(value: &Value, segments: &[&str]) -> bool {
    let Some((head, rest)) = segments.split_first() else {
        return false;
    };
    let Some(next) = value.as_object().and_then(|obj| obj.get(*head)) else {
        return false;
    };

    if rest.is_empty() {
        return match next {
            Value::Array(items) => !items.is_empty(),
            Value::Null => false,
            _ => true,
        };
    }

    match next {
        Value::Object(_) => exists_at(next, rest),
        Value::Array(items) => items
            .iter()
            .filter(|item| item.is_object())
            .any(|item| exists_at(item, rest)),
        _ => false,
    }
}

/// Cardinality at the path: the length of the first array encountered along
/// the descent, 1 for a terminal object or scalar, 0 when the path does not
/// resolve or ends in `null`.
pub fn count(root: &Value, path: &str) -> usize {
    let segments: Vec<&str> = path.split('.').collect();
    if segments.len() < 2 {
        return 0;
    }
    count_at(root, &segments[1..])
}

fn count_at(value: &Value, segments: &[&str]) -> usize {
    let Some((head, rest)) = segments.split_first() else {
        return 0;
    };
    let Some(next) = value.as_object().and_then(|obj| obj.get(*head)) else {
        return 0;
    };

    match next {
        Value::Array(items) => items.len(),
        Value::Object(_) => {
            if rest.is_empty() {
                1
            } else {
                count_at(next, rest)
            }
        }
        Value::Null => 0,
        _ => {
            if rest.is_empty() {
                1
            } else {
                0
            }
        }
    }
}

/// True when the terminal value equals `expected`. Object-only descent: an
/// array or scalar at a non-terminal segment fails the check.
pub fn has_fixed(root: &Value, path: &str, expected: &Value) -> bool {
    terminal_through_objects(root, path)
        .map(|found| values_equal(found, expected))
        .unwrap_or(false)
}

/// True when the terminal value equals any member of `allowed`. Same
/// object-only descent as [`has_fixed`]; an empty list never matches.
pub fn has_allowed(root: &Value, path: &str, allowed: &[Value]) -> bool {
    terminal_through_objects(root, path)
        .map(|found| allowed.iter().any(|candidate| values_equal(found, candidate)))
        .unwrap_or(false)
}

fn terminal_through_objects<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    let segments: Vec<&str> = path.split('.').collect();
    if segments.len() < 2 {
        return None;
    }

    let mut current = root;
    for (idx, segment) in segments[1..].iter().enumerate() {
        let next = current.as_object()?.get(*segment)?;
        if idx == segments.len() - 2 {
            return Some(next);
        }
        if !next.is_object() {
            return None;
        }
        current = next;
    }
    None
}

/// True when the terminal value is a string in which `pattern` finds a
/// match. Traverses like [`exists`]; an invalid pattern yields `false`.
pub fn matches(root: &Value, path: &str, pattern: &str) -> bool {
    let Ok(re) = Regex::new(pattern) else {
        return false;
    };
    let segments: Vec<&str> = path.split('.').collect();
    if segments.len() < 2 {
        return false;
    }
    matches_at(root, &segments[1..], &re)
}

fn matches_at(value: &Value, segments: &[&str], re: &Regex) -> bool {
    let Some((head, rest)) = segments.split_first() else {
        return false;
    };
    let Some(next) = value.as_object().and_then(|obj| obj.get(*head)) else {
        return false;
    };

    if rest.is_empty() {
        return next.as_str().map(|s| re.is_match(s)).unwrap_or(false);
    }

    match next {
        Value::Object(_) => matches_at(next, rest, re),
        Value::Array(items) => items
            .iter()
            .filter(|item| item.is_object())
            .any(|item| matches_at(item, rest, re)),
        _ => false,
    }
}

/// Value equality for rule targets: numbers by numeric value (so an integer
/// in YAML equals a float in the document), everything else structurally.
pub(crate) fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => a == b,
        },
        _ => left == right,
    }
}
