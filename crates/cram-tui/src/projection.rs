//! Index projection — which positions of a collection are visible under the
//! active week window, and cursor repair against that visible set.
//!
//! Every filterable view (exams, todos) goes through these four functions.
//! They are pure: absent or unparseable dates yield smaller sets, never
//! errors, and nothing here touches the backing collection.

use chrono::NaiveDate;
use cram_core::dates::FilterWindow;

/// Positions `0..len` whose date passes the window.  Under an unbounded
/// window every position is visible; under a bounded one, items without a
/// parseable date are excluded.  Backing order is preserved.
pub fn visible_positions<F>(len: usize, date_of: F, window: &FilterWindow) -> Vec<usize>
where
    F: Fn(usize) -> Option<NaiveDate>,
{
    let bounds = window.bounds();
    (0..len)
        .filter(|&i| match bounds {
            None => true,
            Some((start, end)) => match date_of(i) {
                Some(date) => date >= start && date < end,
                None => false,
            },
        })
        .collect()
}

/// Repair a cursor after the collection or its visible set changed: `None`
/// when nothing is visible, the first visible position when the cursor no
/// longer points at a visible element, otherwise unchanged.
pub fn repair_cursor(visible: &[usize], cursor: Option<usize>) -> Option<usize> {
    let first = *visible.first()?;
    match cursor {
        Some(idx) if visible.contains(&idx) => Some(idx),
        _ => Some(first),
    }
}

/// Logical rank of backing position `idx` within the visible set.
pub fn rank_of(visible: &[usize], idx: usize) -> Option<usize> {
    visible.iter().position(|&v| v == idx)
}

/// Move the cursor by `delta` steps through the visible set, clamped to its
/// ends.  A cursor that is not currently visible starts from rank 0.
pub fn step(visible: &[usize], cursor: Option<usize>, delta: isize) -> Option<usize> {
    if visible.is_empty() {
        return None;
    }
    let rank = cursor.and_then(|c| rank_of(visible, c)).unwrap_or(0) as isize;
    let max = visible.len() as isize - 1;
    let next = (rank + delta).clamp(0, max) as usize;
    Some(visible[next])
}

#[cfg(test)]
mod tests {
    use super::*;
    use cram_core::dates::WeekSpan;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, day).unwrap()
    }

    fn week_of_aug_3() -> FilterWindow {
        FilterWindow {
            start: d(3),
            span: WeekSpan::Weeks(1),
        }
    }

    #[test]
    fn dateless_items_hidden_under_bounded_window() {
        // A(Mon), B(Wed), C(no date) — the spec's example collection.
        let dates = [Some(d(3)), Some(d(5)), None];
        let visible = visible_positions(3, |i| dates[i], &week_of_aug_3());
        assert_eq!(visible, vec![0, 1]);
    }

    #[test]
    fn unbounded_window_shows_everything() {
        let dates = [Some(d(3)), None, Some(d(28))];
        let window = FilterWindow {
            start: d(3),
            span: WeekSpan::All,
        };
        assert_eq!(visible_positions(3, |i| dates[i], &window), vec![0, 1, 2]);
    }

    #[test]
    fn projection_is_idempotent() {
        let dates = [Some(d(3)), Some(d(20)), Some(d(5))];
        let window = week_of_aug_3();
        let a = visible_positions(3, |i| dates[i], &window);
        let b = visible_positions(3, |i| dates[i], &window);
        assert_eq!(a, b);
        assert_eq!(a, vec![0, 2]);
    }

    #[test]
    fn positions_strictly_increase() {
        let dates = [Some(d(9)), Some(d(3)), Some(d(4)), Some(d(8))];
        let visible = visible_positions(4, |i| dates[i], &week_of_aug_3());
        assert!(visible.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn repair_empty_set_clears_cursor() {
        assert_eq!(repair_cursor(&[], Some(2)), None);
        assert_eq!(repair_cursor(&[], None), None);
    }

    #[test]
    fn repair_keeps_member_resets_stranger() {
        let visible = vec![1, 4, 7];
        assert_eq!(repair_cursor(&visible, Some(4)), Some(4));
        assert_eq!(repair_cursor(&visible, Some(3)), Some(1));
        assert_eq!(repair_cursor(&visible, None), Some(1));
    }

    #[test]
    fn deleting_the_cursor_target_falls_back_to_first() {
        // Spec scenario: [A(Mon), B(Wed), C(no date)], cursor on B, delete B.
        let dates = [Some(d(3)), Some(d(5)), None];
        let window = week_of_aug_3();
        let visible = visible_positions(3, |i| dates[i], &window);
        let cursor = repair_cursor(&visible, Some(1));
        assert_eq!(cursor, Some(1)); // on B

        let after_delete = [Some(d(3)), None];
        let visible = visible_positions(2, |i| after_delete[i], &window);
        assert_eq!(visible, vec![0]);
        assert_eq!(repair_cursor(&visible, cursor), Some(0)); // moved to A
    }

    #[test]
    fn step_clamps_at_both_ends() {
        let visible = vec![2, 5, 9];
        assert_eq!(step(&visible, Some(5), 1), Some(9));
        assert_eq!(step(&visible, Some(9), 1), Some(9));
        assert_eq!(step(&visible, Some(2), -1), Some(2));
        assert_eq!(step(&visible, Some(5), 1000), Some(9));
        assert_eq!(step(&visible, Some(5), -1000), Some(2));
    }

    #[test]
    fn step_from_nowhere_starts_at_first_rank() {
        let visible = vec![2, 5, 9];
        assert_eq!(step(&visible, None, 1), Some(5));
        assert_eq!(step(&visible, Some(4), 0), Some(2));
        assert_eq!(step(&[], None, 3), None);
    }

    #[test]
    fn rank_lookup() {
        let visible = vec![2, 5, 9];
        assert_eq!(rank_of(&visible, 5), Some(1));
        assert_eq!(rank_of(&visible, 3), None);
    }
}
