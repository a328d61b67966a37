//! Monthly intake calendar

use chrono::{Datelike, Month, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::db::FoodLogEntry;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub calories: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarMonth {
    pub year: i32,
    pub month: u32,
    pub month_name: String,
    /// 1일의 요일 (월요일 = 0)
    pub first_weekday: u32,
    pub days: Vec<CalendarDay>,
    pub previous_year: i32,
    pub previous_month: u32,
    pub next_year: i32,
    pub next_month: u32,
}

pub fn first_day(year: i32, month: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)
}

/// 다음 달 1일 - 1일
pub fn last_day(year: i32, month: u32) -> Option<NaiveDate> {
    let (next_year, next_month) = next(year, month);
    first_day(next_year, next_month)?.pred_opt()
}

pub fn previous(year: i32, month: u32) -> (i32, u32) {
    if month > 1 {
        (year, month - 1)
    } else {
        (year - 1, 12)
    }
}

pub fn next(year: i32, month: u32) -> (i32, u32) {
    if month < 12 {
        (year, month + 1)
    } else {
        (year + 1, 1)
    }
}

/// 해당 월의 모든 날짜에 칼로리 합계를 채움 (기록 없는 날은 0)
///
/// `entries`는 같은 달의 기록이어야 하며 범위 밖 날짜는 무시된다.
pub fn build_month(year: i32, month: u32, entries: &[FoodLogEntry]) -> Option<CalendarMonth> {
    let first = first_day(year, month)?;
    let last = last_day(year, month)?;

    let days = first
        .iter_days()
        .take_while(|d| *d <= last)
        .map(|date| CalendarDay {
            date,
            calories: entries
                .iter()
                .filter(|e| e.date == date)
                .map(FoodLogEntry::total_calories)
                .sum(),
        })
        .collect();

    let (previous_year, previous_month) = previous(year, month);
    let (next_year, next_month) = next(year, month);
    let month_name = Month::try_from(u8::try_from(month).ok()?).ok()?.name().to_string();

    Some(CalendarMonth {
        year,
        month,
        month_name,
        first_weekday: first.weekday().num_days_from_monday(),
        days,
        previous_year,
        previous_month,
        next_year,
        next_month,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::FoodItem;

    fn entry(date: NaiveDate, grams: f64) -> FoodLogEntry {
        FoodLogEntry {
            id: 1,
            user_id: 1,
            date,
            quantity_in_grams: grams,
            food_item: FoodItem {
                id: 1,
                name: "Rice".into(),
                manufacturer: "Farm".into(),
                category: "grains".into(),
                calories_per_100g: 130.0,
                proteins_per_100g: 2.7,
                carbohydrates_per_100g: 28.0,
                fats_per_100g: 0.3,
            },
        }
    }

    #[test]
    fn test_navigation_wraps_years() {
        assert_eq!(previous(2024, 1), (2023, 12));
        assert_eq!(previous(2024, 6), (2024, 5));
        assert_eq!(next(2024, 12), (2025, 1));
        assert_eq!(next(2024, 6), (2024, 7));
    }

    #[test]
    fn test_month_lengths() {
        assert_eq!(last_day(2024, 2).unwrap().day(), 29);
        assert_eq!(last_day(2023, 2).unwrap().day(), 28);
        assert_eq!(last_day(2024, 12).unwrap().day(), 31);
        assert!(first_day(2024, 13).is_none());
    }

    #[test]
    fn test_build_month_sums_per_day() {
        let d = |day| NaiveDate::from_ymd_opt(2024, 2, day).unwrap();
        let entries = vec![entry(d(1), 100.0), entry(d(1), 50.0), entry(d(29), 200.0)];

        let month = build_month(2024, 2, &entries).unwrap();
        assert_eq!(month.month_name, "February");
        assert_eq!(month.days.len(), 29);
        assert!((month.days[0].calories - 195.0).abs() < 1e-9);
        assert_eq!(month.days[1].calories, 0.0);
        assert!((month.days[28].calories - 260.0).abs() < 1e-9);
        // 2024-02-01 is a Thursday
        assert_eq!(month.first_weekday, 3);
        assert_eq!((month.previous_year, month.previous_month), (2024, 1));
        assert_eq!((month.next_year, month.next_month), (2024, 3));
    }

    #[test]
    fn test_build_month_rejects_bad_month() {
        assert!(build_month(2024, 0, &[]).is_none());
        assert!(build_month(2024, 13, &[]).is_none());
    }
}
