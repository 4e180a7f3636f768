use time::{
	Date, Month, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset,
	format_description::well_known::Rfc2822,
};

use crate::error::{Error, Result};

/// Parse an item `<pubDate>`.
///
/// Tries the RFC 1123 layout with a numeric zone first
/// (`Mon, 02 Jan 2006 15:04:05 -0700`), then the short RFC 822 one
/// (`02 Jan 06 15:04 MST`).
pub fn parse_pub_date(raw: &str) -> Result<OffsetDateTime> {
	let trimmed = raw.trim();

	OffsetDateTime::parse(trimmed, &Rfc2822)
		.ok()
		.or_else(|| parse_rfc822(trimmed))
		.ok_or_else(|| Error::DateParse(raw.to_owned()))
}

/// `02 Jan 06 15:04 MST`
fn parse_rfc822(input: &str) -> Option<OffsetDateTime> {
	let mut parts = input.split_ascii_whitespace();
	let day = parts.next()?;
	let month = parts.next()?;
	let year = parts.next()?;
	let clock = parts.next()?;
	let zone = parts.next()?;
	if parts.next().is_some() {
		return None;
	}

	let day = digits(day, 1..=2)?;
	let month = month_from_abbrev(month)?;
	let year = two_digit_year(digits(year, 2..=2)?);

	let (hour, minute) = clock.split_once(':')?;
	let hour = digits(hour, 2..=2)?;
	let minute = digits(minute, 2..=2)?;

	let date = Date::from_calendar_date(year, month, u8::try_from(day).ok()?).ok()?;
	let time = Time::from_hms(u8::try_from(hour).ok()?, u8::try_from(minute).ok()?, 0).ok()?;

	Some(PrimitiveDateTime::new(date, time).assume_offset(zone_offset(zone)?))
}

fn digits(input: &str, len: std::ops::RangeInclusive<usize>) -> Option<u16> {
	if !len.contains(&input.len()) || !input.bytes().all(|b| b.is_ascii_digit()) {
		return None;
	}
	input.parse().ok()
}

/// `69..=99` are in the twentieth century, everything below in the twenty-first
fn two_digit_year(year: u16) -> i32 {
	let year = i32::from(year);
	if year >= 69 { 1900 + year } else { 2000 + year }
}

fn month_from_abbrev(month: &str) -> Option<Month> {
	Some(match month {
		"Jan" => Month::January,
		"Feb" => Month::February,
		"Mar" => Month::March,
		"Apr" => Month::April,
		"May" => Month::May,
		"Jun" => Month::June,
		"Jul" => Month::July,
		"Aug" => Month::August,
		"Sep" => Month::September,
		"Oct" => Month::October,
		"Nov" => Month::November,
		"Dec" => Month::December,
		_ => return None,
	})
}

/// Named zones from RFC 822 section 5, or a `+hhmm` / `-hhmm` offset
fn zone_offset(zone: &str) -> Option<UtcOffset> {
	let hours = match zone {
		"UT" | "UTC" | "GMT" | "Z" => 0,
		"EST" => -5,
		"EDT" => -4,
		"CST" => -6,
		"CDT" => -5,
		"MST" => -7,
		"MDT" => -6,
		"PST" => -8,
		"PDT" => -7,
		numeric => return numeric_offset(numeric),
	};

	UtcOffset::from_hms(hours, 0, 0).ok()
}

fn numeric_offset(zone: &str) -> Option<UtcOffset> {
	let (sign, rest) = match zone.as_bytes().first()? {
		b'+' => (1, &zone[1..]),
		b'-' => (-1, &zone[1..]),
		_ => return None,
	};

	let hours = i8::try_from(digits(rest.get(..2)?, 2..=2)?).ok()?;
	let minutes = i8::try_from(digits(rest.get(2..)?, 2..=2)?).ok()?;

	UtcOffset::from_hms(sign * hours, sign * minutes, 0).ok()
}

#[cfg(test)]
mod tests {
	use time::macros::datetime;

	use super::*;

	#[test]
	fn rfc1123_with_numeric_zone() {
		let parsed = parse_pub_date("Mon, 02 Jan 2006 15:04:05 -0700").unwrap();
		assert_eq!(parsed, datetime!(2006-01-02 15:04:05 -07:00));
	}

	#[test]
	fn rfc822_short_form() {
		let parsed = parse_pub_date("02 Jan 06 15:04 MST").unwrap();
		assert_eq!(parsed, datetime!(2006-01-02 15:04 -07:00));

		let parsed = parse_pub_date("17 Mar 24 08:30 +0100").unwrap();
		assert_eq!(parsed, datetime!(2024-03-17 08:30 +01:00));
	}

	#[test]
	fn surrounding_whitespace_is_ignored() {
		let parsed = parse_pub_date("\n  Mon, 02 Jan 2006 15:04:05 +0000  \n").unwrap();
		assert_eq!(parsed, datetime!(2006-01-02 15:04:05 UTC));
	}

	#[test]
	fn garbage_keeps_raw_value() {
		match parse_pub_date("not-a-date") {
			Err(Error::DateParse(raw)) => assert_eq!(raw, "not-a-date"),
			other => panic!("expected a date error, got {other:?}"),
		}

		assert!(matches!(parse_pub_date(""), Err(Error::DateParse(_))));
		assert!(matches!(
			parse_pub_date("2006-01-02T15:04:05Z"),
			Err(Error::DateParse(_))
		));
	}

	#[test]
	fn short_form_century_pivot() {
		assert_eq!(
			parse_rfc822("01 Jan 69 00:00 UT"),
			Some(datetime!(1969-01-01 00:00 UTC))
		);
		assert_eq!(
			parse_rfc822("01 Jan 68 00:00 UT"),
			Some(datetime!(2068-01-01 00:00 UTC))
		);
	}

	#[test]
	fn short_form_rejects_malformed_input() {
		assert_eq!(parse_rfc822("02 Jan 2006 15:04 MST"), None);
		assert_eq!(parse_rfc822("32 Jan 06 15:04 MST"), None);
		assert_eq!(parse_rfc822("02 Foo 06 15:04 MST"), None);
		assert_eq!(parse_rfc822("02 Jan 06 25:04 MST"), None);
		assert_eq!(parse_rfc822("02 Jan 06 15:04 XYZ"), None);
		assert_eq!(parse_rfc822("02 Jan 06 15:04"), None);
		assert_eq!(parse_rfc822("02 Jan 06 15:04 MST extra"), None);
	}

	#[test]
	fn numeric_zones() {
		assert_eq!(numeric_offset("+0530"), UtcOffset::from_hms(5, 30, 0).ok());
		assert_eq!(numeric_offset("-0800"), UtcOffset::from_hms(-8, 0, 0).ok());
		assert_eq!(numeric_offset("0800"), None);
		assert_eq!(numeric_offset("+08"), None);
	}
}
