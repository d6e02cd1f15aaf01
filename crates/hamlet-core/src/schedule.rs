//! Work-hours policy.

use hamlet_types::WorkHours;

/// Whether `hour` falls inside the work window.
///
/// - `start < end`: working for `start <= hour < end`.
/// - `start > end`: the window wraps past midnight, so working for
///   `hour >= start` or `hour < end`.
/// - `start == end`: always working.
pub const fn is_within_work_hours(window: WorkHours, hour: u8) -> bool {
    let WorkHours {
        start_hour: start,
        end_hour: end,
    } = window;
    if start < end {
        start <= hour && hour < end
    } else if start > end {
        hour >= start || hour < end
    } else {
        true
    }
}
