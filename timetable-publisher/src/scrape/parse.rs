//! Schedule page parsing.
//!
//! The schedule container holds one table. A row whose whole text is a
//! day-type heading ("darbo diena", "šeštadienis", "sekmadienis") opens that
//! day type's section. Every other row in a section has the hour in its `th`
//! cell and the minutes in its `td` cells, written as runs of two-digit
//! groups ("0515" is :05 and :15).

use std::collections::BTreeMap;

use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::domain::{DayType, TimeOfDay, Timetable};

use super::error::ScrapeError;

/// Timetables found on one page, by day type.
pub type DayTimetables = BTreeMap<DayType, Timetable>;

/// Element holding the schedule table.
pub const SCHEDULE_CONTAINER: &str = "#divScheduleContentInner";

/// Extract every day type's timetable from a schedule page.
///
/// Day types without a section on the page are absent from the result.
/// Times keep page order.
pub fn parse_schedule(html: &str) -> Result<DayTimetables, ScrapeError> {
    let container_selector = selector(SCHEDULE_CONTAINER)?;
    let row_selector = selector("tr")?;
    let hour_selector = selector("th")?;
    let minute_selector = selector("td")?;

    let document = Html::parse_document(html);
    let container = document
        .select(&container_selector)
        .next()
        .ok_or(ScrapeError::MissingSchedule)?;

    let mut sections: BTreeMap<DayType, Vec<TimeOfDay>> = BTreeMap::new();
    let mut current: Option<DayType> = None;

    for row in container.select(&row_selector) {
        if let Some(day_type) = DayType::from_heading(&element_text(row)) {
            current = Some(day_type);
            sections.entry(day_type).or_default();
            continue;
        }

        let Some(day_type) = current else {
            continue;
        };
        let Some(hour) = row
            .select(&hour_selector)
            .next()
            .and_then(|cell| element_text(cell).parse::<u32>().ok())
        else {
            continue;
        };

        let times = sections.entry(day_type).or_default();
        for cell in row.select(&minute_selector) {
            for minute in minute_groups(&element_text(cell)) {
                match TimeOfDay::from_hm(hour, minute) {
                    Ok(time) => times.push(time),
                    Err(e) => debug!(hour, minute, error = %e, "skipping invalid departure"),
                }
            }
        }
    }

    if sections.is_empty() {
        return Err(ScrapeError::NoDayTypes);
    }

    Ok(sections
        .into_iter()
        .map(|(day_type, times)| (day_type, Timetable::new(times)))
        .collect())
}

fn selector(css: &'static str) -> Result<Selector, ScrapeError> {
    Selector::parse(css).map_err(|e| ScrapeError::Selector {
        selector: css,
        message: format!("{e:?}"),
    })
}

/// Visible text of an element with whitespace runs collapsed.
fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Split a minutes cell into two-digit groups; a trailing single digit is a
/// minute on its own. Annotation marks are ignored.
fn minute_groups(text: &str) -> Vec<u32> {
    let digits: Vec<u32> = text.chars().filter_map(|c| c.to_digit(10)).collect();
    digits
        .chunks(2)
        .map(|group| group.iter().fold(0, |acc, d| acc * 10 + d))
        .collect()
}
