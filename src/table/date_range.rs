//! Date-range stage.

use chrono::NaiveDate;

use super::criteria::DateWindow;

/// Keep rows whose date falls in `[start, end]`, by day.
///
/// With neither bound set the input is returned unchanged.
pub fn apply_date_range<R, F>(
    rows: Vec<R>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    date_of: F,
) -> Vec<R>
where
    F: Fn(&R) -> NaiveDate,
{
    let window = DateWindow::new(start, end);
    if window.is_unbounded() {
        return rows;
    }
    rows.into_iter()
        .filter(|row| window.contains(date_of(row)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn test_unbounded_returns_input() {
        let rows = vec![day(3), day(1), day(2)];
        assert_eq!(apply_date_range(rows.clone(), None, None, |d| *d), rows);
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let rows: Vec<NaiveDate> = (1..=10).map(day).collect();
        let kept = apply_date_range(rows, Some(day(3)), Some(day(5)), |d| *d);
        assert_eq!(kept, vec![day(3), day(4), day(5)]);
    }

    #[test]
    fn test_single_bound() {
        let rows: Vec<NaiveDate> = (1..=5).map(day).collect();
        assert_eq!(
            apply_date_range(rows.clone(), Some(day(4)), None, |d| *d),
            vec![day(4), day(5)]
        );
        assert_eq!(
            apply_date_range(rows, None, Some(day(2)), |d| *d),
            vec![day(1), day(2)]
        );
    }
}
