use chrono::{Datelike, Days, NaiveDate, Weekday};

/// True for Monday through Friday. Exchange holidays are not modelled.
#[must_use]
pub fn is_business_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// The `n` business days strictly after `date`, in order.
#[must_use]
pub fn business_days_after(date: NaiveDate, n: usize) -> Vec<NaiveDate> {
    let mut out = Vec::with_capacity(n);
    let mut cur = date;
    while out.len() < n {
        match cur.checked_add_days(Days::new(1)) {
            Some(next) => cur = next,
            None => break,
        }
        if is_business_day(cur) {
            out.push(cur);
        }
    }
    out
}
