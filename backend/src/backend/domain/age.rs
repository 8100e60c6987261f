use chrono::{Datelike, NaiveDate};

/// Whole years between `birth_date` and `today`.
///
/// One year is taken off when this year's birthday has not happened yet.
/// A 29 February birthday counts as reached on 1 March in non-leap years.
pub fn calculate_age(birth_date: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - birth_date.year();
    if (today.month(), today.day()) < (birth_date.month(), birth_date.day()) {
        age -= 1;
    }
    age
}
