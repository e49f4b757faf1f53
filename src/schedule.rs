use chrono::NaiveTime;

/// Two wall-clock windows `[a_start, a_end)` and `[b_start, b_end)` overlap
/// iff each one starts before the other ends.
pub fn overlaps(a_start: NaiveTime, a_end: NaiveTime, b_start: NaiveTime, b_end: NaiveTime) -> bool {
    a_start < b_end && a_end > b_start
}
