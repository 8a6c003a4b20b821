//! Tags: `(logical-time, microstep)` pairs giving a total order over
//! reactor events that occur at the same physical instant.

use crate::time::{self, Instant, Interval, FOREVER, NEVER};
use std::cmp::Ordering;

/// A position in the total order of reactor events.
///
/// Ordering is lexicographic on `(time, microstep)`: two tags at the same
/// `time` are ordered by `microstep`, which exists purely to distinguish
/// simultaneous events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Tag {
    pub time: Instant,
    pub microstep: u32,
}

impl Tag {
    pub const fn new(time: Instant, microstep: u32) -> Self {
        Self { time, microstep }
    }
}

/// The tag at [`NEVER`], microstep 0. The saturating lower bound of the tag
/// order.
pub const NEVER_TAG: Tag = Tag {
    time: NEVER,
    microstep: 0,
};

/// The tag at [`FOREVER`], microstep `u32::MAX`. Any saturating tag
/// computation that overflows lands here.
pub const FOREVER_TAG: Tag = Tag {
    time: FOREVER,
    microstep: u32::MAX,
};

impl PartialOrd for Tag {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Tag {
    fn cmp(&self, other: &Self) -> Ordering {
        self.time.cmp(&other.time).then(self.microstep.cmp(&other.microstep))
    }
}

/// Compare two tags, returning `-1`, `0`, or `1` per the C convention this
/// VM's schedule compiler expects from a comparator.
pub fn tag_cmp(t1: Tag, t2: Tag) -> i32 {
    match t1.cmp(&t2) {
        Ordering::Less => -1,
        Ordering::Equal => 0,
        Ordering::Greater => 1,
    }
}

/// Saturating tag addition.
///
/// The time component saturates via [`time::add`]. If `b.time` is nonzero,
/// `a`'s microstep is first discarded (reset to 0) — any nonzero logical
/// delay restarts the microstep counter. Microstep overflow saturates the
/// whole tag to [`FOREVER_TAG`] (the corpus's original C source documents
/// this choice as safer than silent wraparound; see DESIGN.md).
pub fn tag_add(a: Tag, b: Tag) -> Tag {
    let time = time::add(a.time, b.time);
    if time == FOREVER {
        return FOREVER_TAG;
    }
    if time == NEVER {
        return NEVER_TAG;
    }

    let base_microstep = if b.time > 0 { 0 } else { a.microstep };
    match base_microstep.checked_add(b.microstep) {
        Some(microstep) => Tag { time, microstep },
        None => FOREVER_TAG,
    }
}

/// Delay `tag` by `interval` nanoseconds of logical time.
///
/// - If `tag.time == NEVER` or `interval < 0`, `tag` is returned unchanged.
/// - If the delayed time would overflow, returns [`FOREVER_TAG`].
/// - If `interval == 0`, the microstep is incremented (wrapping on
///   overflow — the only reasonable behavior for an all-but-unreachable
///   case, per the original implementation).
/// - Otherwise the time advances by `interval` and the microstep resets to
///   0.
pub fn delay_tag(tag: Tag, interval: Interval) -> Tag {
    if tag.time == NEVER || interval < 0 {
        return tag;
    }
    if tag.time >= FOREVER - interval {
        return FOREVER_TAG;
    }
    if interval == 0 {
        Tag {
            time: tag.time,
            microstep: tag.microstep.wrapping_add(1),
        }
    } else {
        Tag {
            time: tag.time + interval,
            microstep: 0,
        }
    }
}

/// Delay `tag` by a non-sentinel, nonzero `interval`, landing immediately
/// *before* the nominal [`delay_tag`] result in the total order: one
/// nanosecond earlier, maximum microstep.
///
/// Used by schedule compilers that need "strictly before the next delayed
/// tag" semantics (e.g. ordering a shutdown event ahead of a periodic
/// timer firing at the same nominal delay).
pub fn delay_strict(tag: Tag, interval: Interval) -> Tag {
    let result = delay_tag(tag, interval);
    if interval != 0 && interval != NEVER && interval != FOREVER && result.time != NEVER && result.time != FOREVER {
        Tag {
            time: result.time - 1,
            microstep: u32::MAX,
        }
    } else {
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_cmp_is_lexicographic() {
        let a = Tag::new(10, 0);
        let b = Tag::new(10, 1);
        let c = Tag::new(11, 0);
        assert_eq!(tag_cmp(a, b), -1);
        assert_eq!(tag_cmp(b, a), 1);
        assert_eq!(tag_cmp(a, c), -1);
        assert_eq!(tag_cmp(a, a), 0);
    }

    #[test]
    fn delay_tag_zero_increments_microstep() {
        let t = Tag::new(100, 5);
        let next = delay_tag(t, 0);
        assert_eq!(next.time, 100);
        assert_eq!(next.microstep, 6);
    }

    #[test]
    fn delay_tag_nonzero_resets_microstep() {
        let t = Tag::new(100, 5);
        let next = delay_tag(t, 50);
        assert_eq!(next.time, 150);
        assert_eq!(next.microstep, 0);
    }

    #[test]
    fn delay_tag_never_time_is_identity() {
        let t = Tag::new(NEVER, 3);
        assert_eq!(delay_tag(t, 50), t);
    }

    #[test]
    fn delay_tag_negative_interval_is_identity() {
        let t = Tag::new(100, 3);
        assert_eq!(delay_tag(t, -1), t);
    }

    #[test]
    fn delay_tag_overflow_saturates() {
        let t = Tag::new(FOREVER - 1, 0);
        assert_eq!(delay_tag(t, 2), FOREVER_TAG);
    }

    #[test]
    fn delay_strict_lands_before_nominal_delay() {
        let t = Tag::new(100, 5);
        let strict = delay_strict(t, 50);
        let nominal = delay_tag(t, 50);
        assert!(tag_cmp(strict, nominal) < 0);
        assert_eq!(strict.time, 149);
        assert_eq!(strict.microstep, u32::MAX);
    }

    #[test]
    fn delay_strict_zero_interval_is_plain_delay() {
        let t = Tag::new(100, 5);
        assert_eq!(delay_strict(t, 0), delay_tag(t, 0));
    }

    #[test]
    fn tag_add_saturates_on_time_saturation() {
        let result = tag_add(Tag::new(FOREVER - 1, 0), Tag::new(2, 0));
        assert_eq!(result, FOREVER_TAG);
    }

    #[test]
    fn tag_add_resets_microstep_on_nonzero_delay() {
        let a = Tag::new(10, 7);
        let b = Tag::new(5, 2);
        let result = tag_add(a, b);
        assert_eq!(result.time, 15);
        assert_eq!(result.microstep, 2);
    }

    #[test]
    fn tag_add_keeps_microstep_on_zero_time_delay() {
        let a = Tag::new(10, 7);
        let b = Tag::new(0, 2);
        let result = tag_add(a, b);
        assert_eq!(result.time, 10);
        assert_eq!(result.microstep, 9);
    }

    #[test]
    fn tag_total_order_is_reflexive_antisymmetric_transitive() {
        let tags = [
            Tag::new(0, 0),
            Tag::new(0, 1),
            Tag::new(5, 0),
            Tag::new(5, 3),
            Tag::new(10, 0),
        ];
        for &a in &tags {
            assert_eq!(a.cmp(&a), Ordering::Equal);
        }
        for &a in &tags {
            for &b in &tags {
                if a < b {
                    assert!(b > a);
                }
            }
        }
        for &a in &tags {
            for &b in &tags {
                for &c in &tags {
                    if a <= b && b <= c {
                        assert!(a <= c);
                    }
                }
            }
        }
    }
}
