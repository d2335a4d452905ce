//! Runtime configuration for step-expressions.
//!
//! The module currently exposes the size limit applied to every regular
//! expression the crate compiles.

use std::sync::atomic::{AtomicUsize, Ordering};

use regex::{Regex, RegexBuilder};

/// Default compiled-regex size limit, matching the `regex` crate.
pub const DEFAULT_REGEX_SIZE_LIMIT: usize = 10 * (1 << 20);

const OVERRIDE_UNSET: usize = 0;
const SIZE_LIMIT_ENV: &str = "STEP_EXPRESSIONS_REGEX_SIZE_LIMIT";

static REGEX_SIZE_LIMIT_OVERRIDE: AtomicUsize = AtomicUsize::new(OVERRIDE_UNSET);

fn parse_env_size(value: &str) -> Option<usize> {
    value.trim().parse().ok().filter(|limit| *limit > 0)
}

fn env_regex_size_limit() -> Option<usize> {
    std::env::var(SIZE_LIMIT_ENV)
        .ok()
        .as_deref()
        .and_then(parse_env_size)
}

fn override_state() -> Option<usize> {
    match REGEX_SIZE_LIMIT_OVERRIDE.load(Ordering::Relaxed) {
        OVERRIDE_UNSET => None,
        limit => Some(limit),
    }
}

/// Size limit, in bytes, for compiled regular expressions.
///
/// Resolution order: the in-process override, then
/// `STEP_EXPRESSIONS_REGEX_SIZE_LIMIT`, then [`DEFAULT_REGEX_SIZE_LIMIT`].
#[must_use]
pub fn regex_size_limit() -> usize {
    override_state()
        .or_else(env_regex_size_limit)
        .unwrap_or(DEFAULT_REGEX_SIZE_LIMIT)
}

/// Override the regex size limit for the current process.
///
/// A limit of zero clears the override. Tests may call
/// [`clear_regex_size_limit_override`] to restore environment driven
/// behaviour.
pub fn set_regex_size_limit(limit: usize) {
    REGEX_SIZE_LIMIT_OVERRIDE.store(limit, Ordering::Relaxed);
}

/// Remove any in-process override for the regex size limit.
pub fn clear_regex_size_limit_override() {
    REGEX_SIZE_LIMIT_OVERRIDE.store(OVERRIDE_UNSET, Ordering::Relaxed);
}

pub(crate) fn compile_regex(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern)
        .size_limit(regex_size_limit())
        .build()
}
