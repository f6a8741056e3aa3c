//! In-game time as a single integer minute count. Every player turn advances
//! it by a fixed amount; everything else (day, hour, period) is derived.

use serde::{Deserialize, Serialize};

pub const MINUTES_PER_TURN: i32 = 10;
pub const MINUTES_PER_DAY: i32 = 1440;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    Dawn,
    Morning,
    Midday,
    Afternoon,
    Evening,
    Night,
    LateNight,
}

impl Period {
    pub fn label(self) -> &'static str {
        match self {
            Period::Dawn => "Dawn",
            Period::Morning => "Morning",
            Period::Midday => "Midday",
            Period::Afternoon => "Afternoon",
            Period::Evening => "Evening",
            Period::Night => "Night",
            Period::LateNight => "Late Night",
        }
    }
}

pub fn advance(current_minutes: i32, turns: i32) -> i32 {
    current_minutes + turns * MINUTES_PER_TURN
}

pub fn day(total_minutes: i32) -> i32 {
    total_minutes.div_euclid(MINUTES_PER_DAY) + 1
}

pub fn hour(total_minutes: i32) -> i32 {
    total_minutes.rem_euclid(MINUTES_PER_DAY) / 60
}

pub fn minute(total_minutes: i32) -> i32 {
    total_minutes.rem_euclid(60)
}

/// Period boundaries: `[5,8)` dawn, `[8,12)` morning, `[12,14)` midday,
/// `[14,17)` afternoon, `[17,20)` evening, `[20,23)` night, everything else
/// (23-4) late night.
pub fn period(total_minutes: i32) -> Period {
    match hour(total_minutes) {
        5..=7 => Period::Dawn,
        8..=11 => Period::Morning,
        12..=13 => Period::Midday,
        14..=16 => Period::Afternoon,
        17..=19 => Period::Evening,
        20..=22 => Period::Night,
        _ => Period::LateNight,
    }
}

/// True between 6:00 and 20:00.
pub fn is_daytime(total_minutes: i32) -> bool {
    let h = hour(total_minutes);
    (6..20).contains(&h)
}

pub fn format_time(total_minutes: i32) -> String {
    format!(
        "{}, Day {} ({:02}:{:02})",
        period(total_minutes).label(),
        day(total_minutes),
        hour(total_minutes),
        minute(total_minutes)
    )
}

pub fn format_short(total_minutes: i32) -> String {
    format!("{}, Day {}", period(total_minutes).label(), day(total_minutes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_moves_by_ten_minutes_per_turn() {
        assert_eq!(advance(0, 3), 30);
    }

    #[test]
    fn day_is_one_based() {
        assert_eq!(day(0), 1);
        assert_eq!(day(MINUTES_PER_DAY), 2);
    }

    #[test]
    fn period_boundaries() {
        assert_eq!(period(5 * 60), Period::Dawn);
        assert_eq!(period(7 * 60 + 59), Period::Dawn);
        assert_eq!(period(8 * 60), Period::Morning);
        assert_eq!(period(23 * 60), Period::LateNight);
        assert_eq!(period(2 * 60), Period::LateNight);
    }

    #[test]
    fn daytime_window() {
        assert!(is_daytime(6 * 60));
        assert!(!is_daytime(20 * 60));
        assert!(!is_daytime(5 * 60));
    }

    #[test]
    fn format_time_matches_expected_shape() {
        let total = MINUTES_PER_DAY + 8 * 60 + 30;
        assert_eq!(format_time(total), "Morning, Day 2 (08:30)");
    }

    #[test]
    fn format_short_omits_clock() {
        assert_eq!(format_short(8 * 60), "Morning, Day 1");
    }
}
