//! Wire formatting of request parameters.
//!
//! The service expects calendar dates as `YYYY-MM-DD` and booleans as the
//! strings `"1"` / `"0"`, at any depth of the payload.

use chrono::{DateTime, Utc};

use crate::params::Param;

/// Return a copy of `param` with every date and boolean rewritten into its
/// wire form. Sequences and mappings are walked depth-first; keys and element
/// order are preserved and all other values pass through unchanged.
pub fn format(param: &Param) -> Param {
    match param {
        Param::Date(date) => Param::Str(format_date(date)),
        Param::Bool(flag) => Param::Str(format_bool(*flag).to_string()),
        Param::Seq(items) => Param::Seq(items.iter().map(format).collect()),
        Param::Map(fields) => Param::Map(
            fields
                .iter()
                .map(|(key, value)| (key.clone(), format(value)))
                .collect(),
        ),
        Param::Null | Param::Int(_) | Param::Float(_) | Param::Str(_) => param.clone(),
    }
}

/// UTC calendar date of `date`; the time of day is dropped.
pub fn format_date(date: &DateTime<Utc>) -> String {
    date.date_naive().format("%Y-%m-%d").to_string()
}

pub fn format_bool(flag: bool) -> &'static str {
    if flag {
        "1"
    } else {
        "0"
    }
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, NaiveDate, TimeZone};

    use super::*;

    fn str(s: &str) -> Param {
        Param::Str(s.to_string())
    }

    #[test]
    fn booleans_become_flags() {
        assert_eq!(format(&Param::map([("flag", true)])), Param::map([("flag", "1")]));
        assert_eq!(format(&Param::map([("flag", false)])), Param::map([("flag", "0")]));
    }

    #[test]
    fn dates_become_calendar_strings() {
        let due = NaiveDate::from_ymd_opt(2023, 1, 15).unwrap();
        assert_eq!(format(&Param::map([("due", due)])), Param::map([("due", "2023-01-15")]));
    }

    #[test]
    fn date_uses_utc_day_not_local_day() {
        // 01:30 on the 16th in UTC+02:00 is still the 15th in UTC.
        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        let local = offset.with_ymd_and_hms(2023, 1, 16, 1, 30, 0).unwrap();
        assert_eq!(format(&Param::from(local)), str("2023-01-15"));
    }

    #[test]
    fn time_of_day_is_ignored() {
        let late = Utc.with_ymd_and_hms(2023, 1, 15, 23, 59, 59).unwrap();
        assert_eq!(format(&Param::Date(late)), str("2023-01-15"));
    }

    #[test]
    fn sequences_are_formatted_elementwise() {
        let tree = Param::map([(
            "items",
            Param::Seq(vec![Param::map([("price", true)]), Param::map([("price", false)])]),
        )]);
        let expected = Param::map([(
            "items",
            Param::Seq(vec![Param::map([("price", "1")]), Param::map([("price", "0")])]),
        )]);
        assert_eq!(format(&tree), expected);
    }

    #[test]
    fn sequence_of_scalars_keeps_length_and_order() {
        let tree = Param::Seq(vec![Param::Bool(true), Param::Int(3), Param::Null, Param::Bool(false)]);
        assert_eq!(
            format(&tree),
            Param::Seq(vec![str("1"), Param::Int(3), Param::Null, str("0")])
        );
    }

    #[test]
    fn tree_without_special_values_is_unchanged() {
        let tree = Param::map([
            ("name", Param::from("Acme")),
            ("count", Param::Int(2)),
            ("ratio", Param::Float(0.5)),
            ("note", Param::Null),
            (
                "nested",
                Param::map([("list", Param::from(vec![Param::Int(1), Param::from("x")]))]),
            ),
        ]);
        assert_eq!(format(&tree), tree);
    }

    #[test]
    fn deep_nesting_is_reached() {
        let tree = Param::map([("a", Param::map([("b", Param::Seq(vec![Param::map([("c", true)])]))]))]);
        let formatted = format(&tree);
        let leaf = formatted
            .get("a")
            .and_then(|a| a.get("b"))
            .and_then(|b| match b {
                Param::Seq(items) => items.first(),
                _ => None,
            })
            .and_then(|first| first.get("c"));
        assert_eq!(leaf, Some(&str("1")));
    }

    #[test]
    fn input_is_not_mutated() {
        let tree = Param::map([("flag", true)]);
        let _ = format(&tree);
        assert_eq!(tree.get("flag"), Some(&Param::Bool(true)));
    }
}
