//! Availability resolution: which calendar dates in a forward horizon are
//! bookable for a provider.
//!
//! Combines three inputs — weekly recurring rules, date-keyed exceptions, and
//! the provider's existing appointments — into one [`ResolvedDate`] row per
//! horizon day. The function is pure: identical inputs always produce
//! identical, order-stable output, and nothing here reads the wall clock.
//!
//! Precedence per date:
//!
//! 1. Weekend gate (when weekends are disallowed) — short-circuits everything.
//! 2. Exception for that exact date — fully replaces the recurring rules,
//!    whichever way it decides.
//! 3. Recurring-rule match for that weekday.
//!
//! A provider with no rules and no exceptions resolves every date to
//! non-bookable. Fail closed, never open.

use chrono::{Datelike, Days, NaiveDate, Weekday};
use chrono_tz::Tz;

use crate::model::{
    Appointment, ExceptionRule, RecurringRule, ResolvedDate, ServiceWindow,
};
use crate::timeutil::{local_date, parse_hms};

/// How a recurring rule is tested against the service window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RuleMatch {
    /// Exact string equality against the window's `HH:MM:SS` literals — the
    /// historical behavior: only the canonical business window opens a date.
    #[default]
    ExactCanonical,
    /// Interval containment: the rule's parsed window must contain the
    /// service window. Rules with unparseable times never match.
    Containment,
}

/// Resolver configuration. Defaults to the client-facing view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Number of consecutive calendar days to resolve, starting today.
    pub horizon_days: u32,
    /// Saturdays and Sundays are only offered in provider self-service mode.
    pub allow_weekends: bool,
    pub rule_match: RuleMatch,
    pub window: ServiceWindow,
}

impl ResolverConfig {
    /// Standard client-facing view: 30 days, weekdays only.
    pub fn client() -> Self {
        Self {
            horizon_days: 30,
            allow_weekends: false,
            rule_match: RuleMatch::default(),
            window: ServiceWindow::canonical(),
        }
    }

    /// Provider self-service view: 90 days, weekends included.
    pub fn self_service() -> Self {
        Self {
            horizon_days: 90,
            allow_weekends: true,
            ..Self::client()
        }
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self::client()
    }
}

/// Resolve the bookable-date horizon for a single provider.
///
/// `start` is "today" in the provider's timezone; the output covers
/// `config.horizon_days` consecutive days from it, ascending, one row per
/// day. `appointments` are the provider's reservations overlapping the
/// horizon; their UTC starts are projected into `tz` before the calendar-day
/// comparison.
///
/// Exceptions are expected to be pre-filtered to dates >= `start` by the
/// caller (the store query does this); stale entries for earlier dates are
/// harmless since lookup is by exact date.
pub fn resolve_dates(
    start: NaiveDate,
    config: &ResolverConfig,
    rules: &[RecurringRule],
    exceptions: &[ExceptionRule],
    appointments: &[Appointment],
    tz: Tz,
) -> Vec<ResolvedDate> {
    let mut resolved = Vec::with_capacity(config.horizon_days as usize);

    for offset in 0..config.horizon_days {
        let Some(date) = start.checked_add_days(Days::new(offset as u64)) else {
            break;
        };

        // Weekend gate: skips exception and rule lookup entirely.
        if !config.allow_weekends && is_weekend(date) {
            resolved.push(ResolvedDate {
                date,
                is_bookable: false,
                has_existing_appointment: false,
            });
            continue;
        }

        // An exception for this exact date replaces the recurring rules,
        // regardless of which way it decides.
        let is_bookable = match exceptions.iter().find(|e| e.date == date) {
            Some(exception) => exception.is_available,
            None => {
                let dow = date.weekday().num_days_from_sunday() as u8;
                rules
                    .iter()
                    .any(|rule| rule_matches(rule, dow, config))
            }
        };

        let has_existing_appointment = appointments
            .iter()
            .any(|a| local_date(a.start_time, tz) == date);

        resolved.push(ResolvedDate {
            date,
            is_bookable,
            has_existing_appointment,
        });
    }

    resolved
}

fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Does this recurring rule open the service window on the given weekday?
fn rule_matches(rule: &RecurringRule, day_of_week: u8, config: &ResolverConfig) -> bool {
    if rule.day_of_week != day_of_week {
        return false;
    }
    match config.rule_match {
        RuleMatch::ExactCanonical => {
            rule.start_time == format_hms(config.window.start)
                && rule.end_time == format_hms(config.window.end)
        }
        RuleMatch::Containment => {
            // Malformed stored times simply don't match.
            let (Some(rule_start), Some(rule_end)) =
                (parse_hms(&rule.start_time), parse_hms(&rule.end_time))
            else {
                return false;
            };
            rule_start <= config.window.start && rule_end >= config.window.end
        }
    }
}

fn format_hms(t: chrono::NaiveTime) -> String {
    t.format("%H:%M:%S").to_string()
}
