use chrono::{NaiveDateTime, NaiveTime};

use crate::entities;

/// Daily window `[from, to)` during which an artist can be booked.
///
/// The window carries no date and does not wrap: when `from >= to` it admits
/// nothing, so an artist declaring `22:00-02:00` cannot be booked at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AvailabilityWindow {
    pub from: NaiveTime,
    pub to: NaiveTime,
}

impl AvailabilityWindow {
    pub fn new(from: NaiveTime, to: NaiveTime) -> Self {
        Self { from, to }
    }

    pub fn for_artist(artist: &entities::artist::Model) -> Self {
        Self::new(artist.time_available_from, artist.time_available_to)
    }

    /// Whether a show starting at `start_time` falls inside the window, judged
    /// on its time-of-day only.
    pub fn admits(&self, start_time: NaiveDateTime) -> bool {
        let time_of_day = start_time.time();
        self.from <= time_of_day && time_of_day < self.to
    }

    pub fn is_empty(&self) -> bool {
        self.from >= self.to
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{at, time};

    #[test]
    fn test_admits_inside_window() {
        let window = AvailabilityWindow::new(time(9, 0), time(17, 0));
        assert!(window.admits(at(2024, 1, 1, 10, 0)));
    }

    #[test]
    fn test_rejects_after_window() {
        let window = AvailabilityWindow::new(time(9, 0), time(17, 0));
        assert!(!window.admits(at(2024, 1, 1, 18, 0)));
    }

    #[test]
    fn test_window_is_half_open() {
        let window = AvailabilityWindow::new(time(9, 0), time(17, 0));
        assert!(window.admits(at(2024, 1, 1, 9, 0)));
        assert!(!window.admits(at(2024, 1, 1, 17, 0)));
        assert!(!window.admits(at(2024, 1, 1, 8, 59)));
    }

    #[test]
    fn test_date_is_ignored() {
        let window = AvailabilityWindow::new(time(9, 0), time(17, 0));
        assert!(window.admits(at(1999, 12, 31, 16, 59)));
        assert!(window.admits(at(2031, 6, 15, 12, 0)));
    }

    #[test]
    fn test_window_spanning_midnight_admits_nothing() {
        let window = AvailabilityWindow::new(time(22, 0), time(2, 0));
        assert!(window.is_empty());
        assert!(!window.admits(at(2024, 1, 1, 23, 0)));
        assert!(!window.admits(at(2024, 1, 1, 1, 0)));
        assert!(!window.admits(at(2024, 1, 1, 12, 0)));
    }

    #[test]
    fn test_zero_length_window_admits_nothing() {
        let window = AvailabilityWindow::new(time(12, 0), time(12, 0));
        assert!(window.is_empty());
        assert!(!window.admits(at(2024, 1, 1, 12, 0)));
    }
}
