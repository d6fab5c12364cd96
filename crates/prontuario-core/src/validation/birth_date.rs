use super::{Field, ValidationError, ValidationReason};
use chrono::{Datelike, NaiveDate};

pub const MIN_AGE_YEARS: i32 = 1;
pub const MAX_AGE_YEARS: i32 = 150;

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%d/%m/%Y"];

/// Parses a raw birth date. Blank input is `Ok(None)` so the caller can
/// report it as a missing value.
pub fn parse_birth_date(raw: &str) -> Result<Option<NaiveDate>, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, fmt) {
            return Ok(Some(date));
        }
    }
    Err(invalid(ValidationReason::InvalidFormat))
}

pub fn validate_birth_date(
    value: Option<NaiveDate>,
    today: NaiveDate,
) -> Result<NaiveDate, ValidationError> {
    let birth = value.ok_or_else(|| invalid(ValidationReason::MissingValue))?;
    if birth > today {
        return Err(invalid(ValidationReason::FutureDate));
    }

    let age = age_in_years(birth, today);
    if age < MIN_AGE_YEARS {
        return Err(invalid(ValidationReason::TooYoung));
    }
    if age > MAX_AGE_YEARS {
        return Err(invalid(ValidationReason::ImplausibleAge));
    }

    Ok(birth)
}

/// Whole years elapsed, counting a birthday only once its month/day is reached.
pub fn age_in_years(birth: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        age -= 1;
    }
    age
}

fn invalid(reason: ValidationReason) -> ValidationError {
    ValidationError::new(Field::BirthDate, reason)
}

#[cfg(test)]
mod tests {
    use super::{age_in_years, parse_birth_date, validate_birth_date};
    use crate::validation::ValidationReason;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn missing_value() {
        let err = validate_birth_date(None, date(2024, 6, 10)).unwrap_err();
        assert_eq!(err.reason, ValidationReason::MissingValue);
    }

    #[test]
    fn future_date() {
        let err = validate_birth_date(Some(date(2024, 6, 11)), date(2024, 6, 10)).unwrap_err();
        assert_eq!(err.reason, ValidationReason::FutureDate);
    }

    #[test]
    fn too_young_until_first_birthday() {
        let today = date(2024, 6, 10);
        let err = validate_birth_date(Some(today), today).unwrap_err();
        assert_eq!(err.reason, ValidationReason::TooYoung);
        let err = validate_birth_date(Some(date(2023, 6, 11)), today).unwrap_err();
        assert_eq!(err.reason, ValidationReason::TooYoung);
        assert!(validate_birth_date(Some(date(2023, 6, 10)), today).is_ok());
    }

    #[test]
    fn implausible_age() {
        let today = date(2024, 6, 10);
        assert!(validate_birth_date(Some(date(1873, 6, 11)), today).is_ok());
        let err = validate_birth_date(Some(date(1873, 6, 10)), today).unwrap_err();
        assert_eq!(err.reason, ValidationReason::ImplausibleAge);
    }

    #[test]
    fn age_counts_birthday_month_and_day() {
        let birth = date(1990, 3, 15);
        assert_eq!(age_in_years(birth, date(2024, 3, 14)), 33);
        assert_eq!(age_in_years(birth, date(2024, 3, 15)), 34);
        assert_eq!(age_in_years(date(2000, 2, 29), date(2023, 2, 28)), 22);
        assert_eq!(age_in_years(date(2000, 2, 29), date(2023, 3, 1)), 23);
    }

    #[test]
    fn parse_accepts_iso_and_brazilian_formats() {
        assert_eq!(parse_birth_date("1990-03-15").unwrap(), Some(date(1990, 3, 15)));
        assert_eq!(parse_birth_date("15/03/1990").unwrap(), Some(date(1990, 3, 15)));
        assert_eq!(parse_birth_date("  ").unwrap(), None);
        let err = parse_birth_date("1990-02-30").unwrap_err();
        assert_eq!(err.reason, ValidationReason::InvalidFormat);
    }
}
