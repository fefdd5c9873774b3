use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Deserializer};

use crate::{Error, Result, ServiceID, Table, TableName};

/// The weekly patterns from calendar.txt
#[derive(Clone)]
pub struct Calendar {
    pub services: Vec<Service>,
}

#[derive(Clone)]
pub struct Service {
    pub service_id: ServiceID,
    pub days_of_week: DaysOfWeek,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Clone)]
pub struct DaysOfWeek {
    pub monday: bool,
    pub tuesday: bool,
    pub wednesday: bool,
    pub thursday: bool,
    pub friday: bool,
    pub saturday: bool,
    pub sunday: bool,
}

/// One row of calendar_dates.txt
#[derive(Clone, Debug)]
pub struct CalendarException {
    pub service_id: ServiceID,
    pub date: NaiveDate,
    pub exception_type: ExceptionType,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExceptionType {
    Added,
    Removed,
}

/// Which services run on some day.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActiveServices {
    /// There's no calendar information at all, so every trip should be considered.
    Unconstrained,
    /// Exactly these services run. May be empty.
    Active(BTreeSet<ServiceID>),
}

impl ActiveServices {
    pub fn allows(&self, service_id: &ServiceID) -> bool {
        match self {
            ActiveServices::Unconstrained => true,
            ActiveServices::Active(services) => services.contains(service_id),
        }
    }
}

/// Combines the weekly patterns with the dated exceptions. Either table may be absent.
pub fn active_services(
    calendar: Option<&Calendar>,
    exceptions: Option<&[CalendarException]>,
    day: NaiveDate,
) -> ActiveServices {
    let base = calendar.map(|calendar| {
        calendar
            .services
            .iter()
            .filter(|service| service.runs_on(day))
            .map(|service| service.service_id.clone())
            .collect::<BTreeSet<_>>()
    });

    let todays_exceptions: Vec<&CalendarException> = exceptions
        .unwrap_or(&[])
        .iter()
        .filter(|exception| exception.date == day)
        .collect();
    let mut added = BTreeSet::new();
    let mut removed = BTreeSet::new();
    for exception in &todays_exceptions {
        match exception.exception_type {
            ExceptionType::Added => added.insert(exception.service_id.clone()),
            ExceptionType::Removed => removed.insert(exception.service_id.clone()),
        };
    }

    match base {
        Some(mut services) => {
            services.retain(|id| !removed.contains(id));
            services.extend(added);
            ActiveServices::Active(services)
        }
        // Without weekly patterns, the exceptions alone say what runs
        None if !todays_exceptions.is_empty() => ActiveServices::Active(added),
        None => ActiveServices::Unconstrained,
    }
}

impl Service {
    /// Only the weekly pattern and validity window; exceptions are applied separately.
    pub fn runs_on(&self, day: NaiveDate) -> bool {
        day >= self.start_date && day <= self.end_date && self.days_of_week.includes(&day)
    }
}

impl DaysOfWeek {
    pub fn includes(&self, day: &NaiveDate) -> bool {
        // chrono's weekdays start on Monday, like calendar.txt's columns
        match day.weekday() {
            Weekday::Mon => self.monday,
            Weekday::Tue => self.tuesday,
            Weekday::Wed => self.wednesday,
            Weekday::Thu => self.thursday,
            Weekday::Fri => self.friday,
            Weekday::Sat => self.saturday,
            Weekday::Sun => self.sunday,
        }
    }
}

pub fn load(table: &Table) -> Result<Calendar> {
    let mut calendar = Calendar {
        services: Vec::new(),
    };
    for rec in table.deserialize::<Record>()? {
        calendar.services.push(Service {
            service_id: rec.service_id,
            days_of_week: DaysOfWeek {
                monday: rec.monday,
                tuesday: rec.tuesday,
                wednesday: rec.wednesday,
                thursday: rec.thursday,
                friday: rec.friday,
                saturday: rec.saturday,
                sunday: rec.sunday,
            },
            start_date: parse_date(TableName::Calendar, &rec.start_date)?,
            end_date: parse_date(TableName::Calendar, &rec.end_date)?,
        });
    }
    Ok(calendar)
}

pub fn load_exceptions(table: &Table) -> Result<Vec<CalendarException>> {
    let mut exceptions = Vec::new();
    for rec in table.deserialize::<DateRecord>()? {
        let exception_type = match rec.exception_type {
            1 => ExceptionType::Added,
            2 => ExceptionType::Removed,
            x => {
                warn!(
                    "Skipping unknown exception_type {x} for {} on {}",
                    rec.service_id, rec.date
                );
                continue;
            }
        };
        exceptions.push(CalendarException {
            service_id: rec.service_id,
            date: parse_date(TableName::CalendarDates, &rec.date)?,
            exception_type,
        });
    }
    Ok(exceptions)
}

fn parse_date(table: TableName, x: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(x, "%Y%m%d").map_err(|err| Error::InvalidTable {
        table,
        reason: format!("bad date {x:?}: {err}"),
    })
}

// A missing weekday column doesn't restrict that day
#[derive(Deserialize)]
struct Record {
    service_id: ServiceID,
    #[serde(default = "every_week", deserialize_with = "parse_bool")]
    monday: bool,
    #[serde(default = "every_week", deserialize_with = "parse_bool")]
    tuesday: bool,
    #[serde(default = "every_week", deserialize_with = "parse_bool")]
    wednesday: bool,
    #[serde(default = "every_week", deserialize_with = "parse_bool")]
    thursday: bool,
    #[serde(default = "every_week", deserialize_with = "parse_bool")]
    friday: bool,
    #[serde(default = "every_week", deserialize_with = "parse_bool")]
    saturday: bool,
    #[serde(default = "every_week", deserialize_with = "parse_bool")]
    sunday: bool,
    start_date: String,
    end_date: String,
}

fn every_week() -> bool {
    true
}

fn parse_bool<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    let n = <u8>::deserialize(d)?;
    if n == 1 {
        return Ok(true);
    }
    if n == 0 {
        return Ok(false);
    }
    Err(serde::de::Error::custom(format!("Unknown bool value {n}")))
}

#[derive(Deserialize)]
struct DateRecord {
    service_id: ServiceID,
    date: String,
    exception_type: u8,
}
