// Date-like cell parsing for time axes

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use nom::{
    bytes::complete::take_while_m_n,
    character::complete::{char, digit1, one_of},
    combinator::{all_consuming, map_res, opt},
    sequence::{preceded, tuple},
    IResult,
};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// A parsed date-like cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timestamp(pub NaiveDateTime);

impl Timestamp {
    /// Days since 1970-01-01, with the time of day as a fraction.
    pub fn ordinal(&self) -> f64 {
        self.0.and_utc().timestamp() as f64 / SECONDS_PER_DAY
    }
}

fn fixed_digits(n: usize) -> impl FnMut(&str) -> IResult<&str, u32> {
    move |input| map_res(take_while_m_n(n, n, |c: char| c.is_ascii_digit()), |s: &str| s.parse::<u32>())(input)
}

fn time_of_day(input: &str) -> IResult<&str, (u32, u32, u32)> {
    let (input, (h, _, m, s, _, _)) = tuple((
        fixed_digits(2),
        char(':'),
        fixed_digits(2),
        opt(preceded(char(':'), fixed_digits(2))),
        opt(preceded(char('.'), digit1)),
        opt(char('Z')),
    ))(input)?;
    Ok((input, (h, m, s.unwrap_or(0))))
}

fn timestamp(input: &str) -> IResult<&str, (u32, u32, u32, Option<(u32, u32, u32)>)> {
    let (input, (year, _, month, _, day)) = tuple((
        fixed_digits(4),
        one_of("-/"),
        fixed_digits(2),
        one_of("-/"),
        fixed_digits(2),
    ))(input)?;
    let (input, time) = opt(preceded(one_of(" T"), time_of_day))(input)?;
    Ok((input, (year, month, day, time)))
}

/// Parse `YYYY-MM-DD`, optionally followed by ` HH:MM[:SS]` or `THH:MM[:SS]`.
/// Returns None for anything else, including impossible calendar dates.
pub fn parse_timestamp(cell: &str) -> Option<Timestamp> {
    let (_, (year, month, day, time)) = all_consuming(timestamp)(cell.trim()).ok()?;
    let (hour, minute, second) = time.unwrap_or((0, 0, 0));

    NaiveDate::from_ymd_opt(year as i32, month, day)
        .and_then(|date| date.and_hms_opt(hour, minute, second))
        .map(Timestamp)
}

/// Format a day ordinal back to `YYYY-MM-DD`.
pub fn format_ordinal(ordinal: f64) -> String {
    let seconds = ordinal.floor() as i64 * SECONDS_PER_DAY as i64;
    DateTime::from_timestamp(seconds, 0)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}
