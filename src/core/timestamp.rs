//! Purpose: Parse textual timestamps for weakly-typed timestamp fields.
//! Exports: `parse_timestamp`.
//! Invariants: Layouts are tried in a fixed order; the first successful parse wins.
//! Invariants: Layouts without an offset are interpreted as UTC.
use time::format_description::BorrowedFormatItem;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime};

pub(crate) fn parse_timestamp(text: &str) -> Option<OffsetDateTime> {
    // Rfc3339 also accepts fractional seconds.
    if let Ok(stamp) = OffsetDateTime::parse(text, &Rfc3339) {
        return Some(stamp);
    }

    let local_layouts: [&[BorrowedFormatItem<'_>]; 2] = [
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
    ];
    for layout in local_layouts {
        if let Ok(stamp) = PrimitiveDateTime::parse(text, layout) {
            return Some(stamp.assume_utc());
        }
    }

    Date::parse(text, format_description!("[year]-[month]-[day]"))
        .ok()
        .map(|date| date.midnight().assume_utc())
}

#[cfg(test)]
mod tests {
    use super::parse_timestamp;
    use time::macros::datetime;

    #[test]
    fn accepts_each_layout() {
        let cases = [
            ("2024-03-05T10:20:30Z", datetime!(2024-03-05 10:20:30 UTC)),
            ("2024-03-05T10:20:30.25+02:00", datetime!(2024-03-05 10:20:30.25 +2)),
            ("2024-03-05T10:20:30", datetime!(2024-03-05 10:20:30 UTC)),
            ("2024-03-05 10:20:30", datetime!(2024-03-05 10:20:30 UTC)),
            ("2024-03-05", datetime!(2024-03-05 0:00 UTC)),
        ];
        for (text, expected) in cases {
            assert_eq!(parse_timestamp(text), Some(expected), "{text}");
        }
    }

    #[test]
    fn rejects_other_text() {
        assert_eq!(parse_timestamp("05/03/2024"), None);
        assert_eq!(parse_timestamp("2024-13-01"), None);
        assert_eq!(parse_timestamp(""), None);
    }
}
