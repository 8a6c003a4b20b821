//! Instant/interval arithmetic on the monotonic timeline.
//!
//! An [`Instant`] is a signed 64-bit nanosecond count; an [`Interval`] is a
//! signed 64-bit nanosecond delta. Both saturate at [`NEVER`]/[`FOREVER`]
//! rather than wrapping — silent wraparound would turn a scheduling overrun
//! into a time-travelling tag.

/// A point on the monotonic timeline, in nanoseconds.
pub type Instant = i64;

/// A signed duration, in nanoseconds.
pub type Interval = i64;

/// The minimum representable instant. Saturating arithmetic never produces
/// a value less than this.
pub const NEVER: Instant = i64::MIN;

/// The maximum representable instant. Saturating arithmetic never produces
/// a value greater than this.
pub const FOREVER: Instant = i64::MAX;

/// One second, in nanoseconds. Used as the default `DU` spin-wait threshold.
pub const SECOND: Interval = 1_000_000_000;

const USEC: Interval = 1_000;
const MSEC: Interval = 1_000_000;
const SEC: Interval = SECOND;
const MINUTE: Interval = 60 * SEC;
const HOUR: Interval = 60 * MINUTE;
const DAY: Interval = 24 * HOUR;
const WEEK: Interval = 7 * DAY;

/// Saturating instant + interval addition.
///
/// - If either operand is [`NEVER`], the result is `NEVER`.
/// - Else if either operand is [`FOREVER`], the result is `FOREVER`.
/// - Else the sum saturates to `FOREVER` on overflow and `NEVER` on
///   underflow rather than wrapping.
pub fn add(a: Instant, b: Interval) -> Instant {
    if a == NEVER || b == NEVER {
        return NEVER;
    }
    if a == FOREVER || b == FOREVER {
        return FOREVER;
    }
    match a.checked_add(b) {
        Some(res) => res,
        None => {
            if b > 0 {
                FOREVER
            } else {
                NEVER
            }
        }
    }
}

/// Render `time` as a human-readable, comma-grouped duration string, e.g.
/// `"1 week, 2 d, 3 h"` or `"500 ms"`. Zero renders as `"0"`; negative
/// values are prefixed with `-`. The sentinels [`NEVER`] and [`FOREVER`]
/// render as the literal strings `"NEVER"`/`"FOREVER"` rather than as
/// durations — `NEVER` in particular has no representable positive
/// counterpart (`-i64::MIN` overflows), so it must be special-cased rather
/// than negated like an ordinary value.
pub fn readable_time(time: Instant) -> String {
    if time == NEVER {
        return "NEVER".to_string();
    }
    if time == FOREVER {
        return "FOREVER".to_string();
    }
    if time == 0 {
        return "0".to_string();
    }
    if time < 0 {
        return format!("-{}", readable_time(-time));
    }

    let mut clauses: Vec<String> = Vec::new();
    let mut remaining = time;

    if remaining > WEEK {
        clauses.push(format!("{} weeks", comma_separated(remaining / WEEK)));
        remaining %= WEEK;
    }
    if remaining > DAY {
        clauses.push(format!("{} d", comma_separated(remaining / DAY)));
        remaining %= DAY;
    }
    if remaining > HOUR {
        clauses.push(format!("{} h", comma_separated(remaining / HOUR)));
        remaining %= HOUR;
    }
    if remaining > MINUTE {
        clauses.push(format!("{} min", comma_separated(remaining / MINUTE)));
        remaining %= MINUTE;
    }
    if remaining > SEC {
        clauses.push(format!("{} s", comma_separated(remaining / SEC)));
        remaining %= SEC;
    }
    if remaining > 0 {
        let (unit, value) = if remaining % MSEC == 0 {
            ("ms", remaining / MSEC)
        } else if remaining % USEC == 0 {
            ("us", remaining / USEC)
        } else {
            ("ns", remaining)
        };
        clauses.push(format!("{} {}", comma_separated(value), unit));
    }

    clauses.join(", ")
}

/// Parse a string produced by [`readable_time`] back into an [`Instant`].
///
/// This is the inverse of `readable_time`, not a general-purpose duration
/// parser: it only accepts the exact clause shapes `readable_time` emits
/// (comma-grouped integer, single space, one of the unit suffixes `weeks`,
/// `d`, `h`, `min`, `s`, `ms`, `us`, `ns`, clauses joined by `", "`), plus
/// the `"0"`, `-`-prefixed, and `"NEVER"`/`"FOREVER"` sentinel forms.
/// Returns `None` on anything else.
pub fn parse_readable_time(s: &str) -> Option<Instant> {
    if s == "NEVER" {
        return Some(NEVER);
    }
    if s == "FOREVER" {
        return Some(FOREVER);
    }
    if s == "0" {
        return Some(0);
    }
    if let Some(rest) = s.strip_prefix('-') {
        return parse_readable_time(rest).map(|v| -v);
    }

    let mut total: Instant = 0;
    for clause in s.split(", ") {
        let (number, unit) = clause.rsplit_once(' ')?;
        let multiplier = match unit {
            "weeks" => WEEK,
            "d" => DAY,
            "h" => HOUR,
            "min" => MINUTE,
            "s" => SEC,
            "ms" => MSEC,
            "us" => USEC,
            "ns" => 1,
            _ => return None,
        };
        let digits: String = number.chars().filter(|&c| c != ',').collect();
        let value: i64 = digits.parse().ok()?;
        total += value * multiplier;
    }
    Some(total)
}

/// Format a non-negative `value` with commas grouping every three digits,
/// e.g. `1234567` becomes `"1,234,567"`.
fn comma_separated(value: i64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
