use chrono::{DateTime, Datelike, Days, Months, NaiveDate, Utc, Weekday};
use regex::Regex;
use tracing::debug;

use crate::models::{Diagnostic, Sentence, Task, context_text};
use crate::rules::DeadlineRules;
use crate::text::{contains_phrase, normalize};

const STAGE: &str = "deadline";

/// Result of deadline resolution over a batch
#[derive(Debug)]
pub struct DeadlineResult {
    pub tasks: Vec<Task>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Resolve detected time expressions into absolute deadlines
///
/// Two-phase and conservative: a task only becomes deadline-bearing when a
/// cue keyword ("by", "due", ...) appears in its context window. With a cue,
/// the nearest time expression is parsed against the processing anchor. An
/// unparsable expression leaves the deadline null and records a diagnostic;
/// the task is always emitted.
pub fn resolve_deadlines(
    tasks: &[Task],
    sentences: &[Sentence],
    anchor: DateTime<Utc>,
    rules: &DeadlineRules,
) -> DeadlineResult {
    let mut diagnostics = Vec::new();

    let tasks = tasks
        .iter()
        .map(|task| {
            let mut enriched = task.clone();
            let window = context_text(sentences, task.origin_sentence_index);

            let has_cue = rules
                .cue_keywords
                .iter()
                .any(|cue| contains_phrase(&window, cue));
            if !has_cue {
                return enriched;
            }

            // nearest first: the entity stage records origin-sentence
            // expressions before neighbor ones
            for expression in &task.time_expressions {
                match parse_time_expression(expression, anchor) {
                    Some(deadline) => {
                        debug!("Task {}: {:?} -> {}", task.id, expression, deadline);
                        enriched.deadline = Some(deadline);
                        return enriched;
                    }
                    None => {
                        diagnostics.push(Diagnostic::for_task(
                            task.id,
                            STAGE,
                            format!("unparsable time expression: {:?}", expression),
                        ));
                    }
                }
            }
            enriched
        })
        .collect();

    DeadlineResult { tasks, diagnostics }
}

/// Parse one time expression, relative forms first, then absolute dates
pub fn parse_time_expression(expression: &str, anchor: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let norm = normalize(expression);
    parse_relative(&norm, anchor).or_else(|| parse_absolute(&norm, anchor))
}

fn parse_relative(expr: &str, anchor: DateTime<Utc>) -> Option<DateTime<Utc>> {
    match expr {
        "today" | "tonight" | "eod" | "end of day" | "end of the day" => {
            return Some(end_of_day(anchor.date_naive()));
        }
        "tomorrow" | "tomorrow night" => {
            return Some(end_of_day(anchor.date_naive().checked_add_days(Days::new(1))?));
        }
        "day after tomorrow" => {
            return Some(end_of_day(anchor.date_naive().checked_add_days(Days::new(2))?));
        }
        "this week" | "end of week" | "end of the week" | "eow" => {
            return Some(end_of_day(upcoming_or_today(anchor, Weekday::Fri)));
        }
        "next week" => {
            let date = next_weekday(anchor, Weekday::Mon, false)?;
            return Some(end_of_day(date));
        }
        "this month" | "end of month" | "end of the month" | "eom" => {
            return Some(end_of_day(last_day_of_month(anchor.date_naive())?));
        }
        "next month" => {
            let next = anchor
                .date_naive()
                .with_day(1)?
                .checked_add_months(Months::new(1))?;
            return Some(end_of_day(last_day_of_month(next)?));
        }
        _ => {}
    }

    // "in N days" / "in N weeks"
    if let Some(caps) = Regex::new(r"^in (\d+) (days?|weeks?)$")
        .ok()
        .and_then(|re| re.captures(expr))
    {
        let n: u64 = caps[1].parse().ok()?;
        let days = if caps[2].starts_with("week") { n * 7 } else { n };
        return Some(end_of_day(
            anchor.date_naive().checked_add_days(Days::new(days))?,
        ));
    }

    // Weekday names, bare or "this/next" qualified. A bare weekday means the
    // next future occurrence, never the same day.
    let wants_next_week = expr.starts_with("next ");
    let weekday_word = expr.strip_prefix("next ").or_else(|| expr.strip_prefix("this ")).unwrap_or(expr);
    if let Some(weekday) = parse_weekday(weekday_word) {
        let date = next_weekday(anchor, weekday, wants_next_week)?;
        return Some(end_of_day(date));
    }

    None
}

fn parse_absolute(expr: &str, anchor: DateTime<Utc>) -> Option<DateTime<Utc>> {
    // MM/DD/YYYY first (US convention), then DD/MM/YYYY
    if let Some(caps) = Regex::new(r"^(\d{1,2})[/-](\d{1,2})[/-](\d{2,4})$")
        .ok()
        .and_then(|re| re.captures(expr))
    {
        let a: u32 = caps[1].parse().ok()?;
        let b: u32 = caps[2].parse().ok()?;
        let mut year: i32 = caps[3].parse().ok()?;
        if year < 100 {
            year += if year < 50 { 2000 } else { 1900 };
        }
        let date = NaiveDate::from_ymd_opt(year, a, b).or_else(|| NaiveDate::from_ymd_opt(year, b, a))?;
        return Some(end_of_day(date));
    }

    // "january 15, 2024" / "january 15" / "15 january 2024"
    let month_re = Regex::new(
        r"(january|february|march|april|may|june|july|august|september|october|november|december)",
    )
    .ok()?;
    let month_name = month_re.find(expr)?.as_str();
    let month = parse_month(month_name)?;
    let day: u32 = Regex::new(r"\b(\d{1,2})(?:st|nd|rd|th)?\b")
        .ok()?
        .captures(expr)?[1]
        .parse()
        .ok()?;
    let year: i32 = Regex::new(r"\b(\d{4})\b")
        .ok()
        .and_then(|re| re.captures(expr))
        .and_then(|caps| caps[1].parse().ok())
        .unwrap_or_else(|| anchor.year());

    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    Some(end_of_day(date))
}

/// Deadlines resolve to the end of their calendar day
fn end_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_hms_opt(23, 59, 59)
        .map(|dt| dt.and_utc())
        .unwrap_or_else(|| DateTime::<Utc>::MIN_UTC)
}

/// The next future occurrence of a weekday. `skip_a_week` pushes a match in
/// the coming six days out by one more week ("next friday" said on a
/// wednesday).
fn next_weekday(anchor: DateTime<Utc>, weekday: Weekday, skip_a_week: bool) -> Option<NaiveDate> {
    let today = anchor.date_naive();
    let current = today.weekday().num_days_from_monday() as i64;
    let target = weekday.num_days_from_monday() as i64;
    let mut ahead = (target - current).rem_euclid(7);
    if ahead == 0 {
        ahead = 7;
    } else if skip_a_week {
        ahead += 7;
    }
    today.checked_add_days(Days::new(ahead as u64))
}

/// The coming occurrence of a weekday, allowing same-day ("end of week" on a
/// friday means today)
fn upcoming_or_today(anchor: DateTime<Utc>, weekday: Weekday) -> NaiveDate {
    let today = anchor.date_naive();
    let current = today.weekday().num_days_from_monday() as i64;
    let target = weekday.num_days_from_monday() as i64;
    let ahead = (target - current).rem_euclid(7);
    today
        .checked_add_days(Days::new(ahead as u64))
        .unwrap_or(today)
}

fn last_day_of_month(date: NaiveDate) -> Option<NaiveDate> {
    date.with_day(1)?
        .checked_add_months(Months::new(1))?
        .checked_sub_days(Days::new(1))
}

fn parse_weekday(word: &str) -> Option<Weekday> {
    match word {
        "monday" => Some(Weekday::Mon),
        "tuesday" => Some(Weekday::Tue),
        "wednesday" => Some(Weekday::Wed),
        "thursday" => Some(Weekday::Thu),
        "friday" => Some(Weekday::Fri),
        "saturday" => Some(Weekday::Sat),
        "sunday" => Some(Weekday::Sun),
        _ => None,
    }
}

fn parse_month(word: &str) -> Option<u32> {
    let months = [
        "january", "february", "march", "april", "may", "june", "july", "august", "september",
        "october", "november", "december",
    ];
    months.iter().position(|m| *m == word).map(|i| i as u32 + 1)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn anchor() -> DateTime<Utc> {
        // Monday, January 1st 2024
        Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap()
    }

    fn sentences(texts: &[&str]) -> Vec<Sentence> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| Sentence {
                index: i,
                text: t.to_string(),
                speaker: None,
            })
            .collect()
    }

    fn task_with_times(description: &str, origin: usize, times: &[&str]) -> Task {
        let mut task = Task::new(1, description, origin);
        task.time_expressions = times.iter().map(|t| t.to_string()).collect();
        task
    }

    #[test]
    fn test_tomorrow_resolves_to_next_day() {
        let resolved = parse_time_expression("tomorrow", anchor()).unwrap();
        assert_eq!(resolved.date_naive(), NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
    }

    #[test]
    fn test_in_n_days_and_weeks() {
        let days = parse_time_expression("in 3 days", anchor()).unwrap();
        assert_eq!(days.date_naive(), NaiveDate::from_ymd_opt(2024, 1, 4).unwrap());
        let weeks = parse_time_expression("in 2 weeks", anchor()).unwrap();
        assert_eq!(weeks.date_naive(), NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
    }

    #[test]
    fn test_bare_weekday_is_never_same_day() {
        // anchor is a Monday; "monday" must mean next Monday
        let resolved = parse_time_expression("monday", anchor()).unwrap();
        assert_eq!(resolved.date_naive(), NaiveDate::from_ymd_opt(2024, 1, 8).unwrap());
        let friday = parse_time_expression("friday", anchor()).unwrap();
        assert_eq!(friday.date_naive(), NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
    }

    #[test]
    fn test_next_weekday_skips_a_week() {
        let resolved = parse_time_expression("next friday", anchor()).unwrap();
        assert_eq!(resolved.date_naive(), NaiveDate::from_ymd_opt(2024, 1, 12).unwrap());
    }

    #[test]
    fn test_end_of_week_and_month() {
        let eow = parse_time_expression("end of week", anchor()).unwrap();
        assert_eq!(eow.date_naive(), NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
        let eom = parse_time_expression("end of month", anchor()).unwrap();
        assert_eq!(eom.date_naive(), NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());
    }

    #[test]
    fn test_absolute_dates() {
        let slash = parse_time_expression("01/15/2024", anchor()).unwrap();
        assert_eq!(slash.date_naive(), NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        let written = parse_time_expression("january 15, 2024", anchor()).unwrap();
        assert_eq!(written.date_naive(), NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        let yearless = parse_time_expression("march 3", anchor()).unwrap();
        assert_eq!(yearless.date_naive(), NaiveDate::from_ymd_opt(2024, 3, 3).unwrap());
    }

    #[test]
    fn test_cue_gate_blocks_resolution() {
        let s = sentences(&["Let's sync about the release tomorrow"]);
        let task = task_with_times("sync about the release", 0, &["tomorrow"]);
        let result = resolve_deadlines(&[task], &s, anchor(), &DeadlineRules::default());
        assert!(result.tasks[0].deadline.is_none());
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn test_cue_enables_resolution() {
        let s = sentences(&["John needs to fix the login bug by tomorrow"]);
        let task = task_with_times("John needs to fix the login bug by tomorrow", 0, &["tomorrow"]);
        let result = resolve_deadlines(&[task], &s, anchor(), &DeadlineRules::default());
        let deadline = result.tasks[0].deadline.unwrap();
        assert_eq!(deadline.date_naive(), NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
    }

    #[test]
    fn test_unparsable_expression_records_diagnostic() {
        let s = sentences(&["The report is due by the big launch"]);
        let task = task_with_times("The report is due by the big launch", 0, &["the big launch"]);
        let result = resolve_deadlines(&[task], &s, anchor(), &DeadlineRules::default());
        assert!(result.tasks[0].deadline.is_none());
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].task_id, Some(1));
    }
}
