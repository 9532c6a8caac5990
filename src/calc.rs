use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    #[default]
    Present,
    Absent,
    Leave,
}

impl AttendanceStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AttendanceStatus::Present => "present",
            AttendanceStatus::Absent => "absent",
            AttendanceStatus::Leave => "leave",
        }
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttendanceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "present" => Ok(AttendanceStatus::Present),
            "absent" => Ok(AttendanceStatus::Absent),
            "leave" => Ok(AttendanceStatus::Leave),
            other => Err(format!("unknown attendance status: {}", other)),
        }
    }
}

impl ToSql for AttendanceStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for AttendanceStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e: String| FromSqlError::Other(e.into()))
    }
}

/// Two-decimal rounding used for attendance percentages.
/// Exact ties go to the even neighbour: 3.125 -> 3.12, 15.625 -> 15.62.
pub fn round_off_2_decimal(x: f64) -> f64 {
    (x * 100.0).round_ties_even() / 100.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct AttendanceTally {
    pub total: usize,
    pub present: usize,
    pub absent: usize,
    pub leave: usize,
}

impl AttendanceTally {
    pub fn add(&mut self, status: AttendanceStatus, n: usize) {
        self.total += n;
        match status {
            AttendanceStatus::Present => self.present += n,
            AttendanceStatus::Absent => self.absent += n,
            AttendanceStatus::Leave => self.leave += n,
        }
    }

    /// Present share of all records, 0 when there are none.
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        round_off_2_decimal(self.present as f64 / self.total as f64 * 100.0)
    }
}

pub fn tally<I>(statuses: I) -> AttendanceTally
where
    I: IntoIterator<Item = AttendanceStatus>,
{
    let mut t = AttendanceTally::default();
    for s in statuses {
        t.add(s, 1);
    }
    t
}

#[cfg(test)]
mod tests {
    use super::*;
    use AttendanceStatus::*;

    #[test]
    fn round_off_keeps_two_decimals() {
        assert_eq!(round_off_2_decimal(0.0), 0.0);
        assert_eq!(round_off_2_decimal(66.666_666), 66.67);
        assert_eq!(round_off_2_decimal(33.333_333), 33.33);
        assert_eq!(round_off_2_decimal(75.0), 75.0);
    }

    #[test]
    fn exact_ties_round_to_even() {
        let one_of_32 = tally(
            std::iter::once(Present).chain(std::iter::repeat(Absent).take(31)),
        );
        assert_eq!(one_of_32.total, 32);
        assert_eq!(one_of_32.percentage(), 3.12);

        let five_of_32 = tally(
            std::iter::repeat(Present)
                .take(5)
                .chain(std::iter::repeat(Leave).take(27)),
        );
        assert_eq!(five_of_32.percentage(), 15.62);

        assert_eq!(round_off_2_decimal(0.125), 0.12);
        assert_eq!(round_off_2_decimal(0.375), 0.38);
    }

    #[test]
    fn empty_tally_has_zero_percentage() {
        let t = tally(std::iter::empty());
        assert_eq!(t.total, 0);
        assert_eq!(t.percentage(), 0.0);
    }

    #[test]
    fn tally_counts_partition_total() {
        let t = tally([Present, Absent, Present, Leave, Present, Leave, Absent]);
        assert_eq!(t.present + t.absent + t.leave, t.total);
        assert_eq!(t.total, 7);
        assert_eq!(t.present, 3);
        assert_eq!(t.absent, 2);
        assert_eq!(t.leave, 2);
        assert_eq!(t.percentage(), 42.86);
    }

    #[test]
    fn three_present_one_absent_is_seventy_five() {
        let t = tally([Present, Present, Absent, Present]);
        assert_eq!(t.percentage(), 75.0);
    }

    #[test]
    fn status_parses_lowercase_only() {
        assert_eq!("leave".parse::<AttendanceStatus>(), Ok(Leave));
        assert!("Late".parse::<AttendanceStatus>().is_err());
        assert_eq!(AttendanceStatus::default(), Present);
    }
}
