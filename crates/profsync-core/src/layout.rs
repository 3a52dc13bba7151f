//! Column schemas for the profile sheet.
//!
//! Two layouts exist in the wild. Layout A keeps the observation time in a
//! single `DATETIME` column and carries the latest-post columns; layout B
//! splits the observation time into `DATE` and `TIME` and drops the post
//! columns. Column order is fixed and the header row is required.

use crate::record::ProfileRecord;
use crate::text::{blank_placeholder, clean_text};

/// One column of the profile sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    DateTime,
    Date,
    Time,
    Nickname,
    Tags,
    City,
    Gender,
    Married,
    Age,
    Joined,
    Followers,
    Posts,
    LastPost,
    LastPostAt,
    ProfileLink,
    ProfileImage,
    Intro,
}

impl Column {
    #[must_use]
    pub fn header(self) -> &'static str {
        match self {
            Column::DateTime => "DATETIME",
            Column::Date => "DATE",
            Column::Time => "TIME",
            Column::Nickname => "NICKNAME",
            Column::Tags => "TAGS",
            Column::City => "CITY",
            Column::Gender => "GENDER",
            Column::Married => "MARRIED",
            Column::Age => "AGE",
            Column::Joined => "JOINED",
            Column::Followers => "FOLLOWERS",
            Column::Posts => "POSTS",
            Column::LastPost => "LPOST",
            Column::LastPostAt => "LDATE-TIME",
            Column::ProfileLink => "PLINK",
            Column::ProfileImage => "PIMAGE",
            Column::Intro => "INTRO",
        }
    }

    /// Whether a change in this column alone makes a stored row stale.
    ///
    /// Observation timestamps, the identifier, tags, and the link/image
    /// columns are excluded. Tags are compared separately by the reconciler.
    #[must_use]
    pub fn is_significant(self) -> bool {
        matches!(
            self,
            Column::City
                | Column::Gender
                | Column::Married
                | Column::Age
                | Column::Joined
                | Column::Followers
                | Column::Posts
                | Column::LastPost
                | Column::LastPostAt
                | Column::Intro
        )
    }

    /// Columns rewritten on every update regardless of their content.
    #[must_use]
    pub fn is_timestamp(self) -> bool {
        matches!(self, Column::DateTime | Column::Date | Column::Time)
    }

    /// The sheet value for this column, cleaned for storage.
    #[must_use]
    pub fn value_of(self, record: &ProfileRecord) -> String {
        match self {
            Column::DateTime => record.datetime.trim().to_owned(),
            Column::Date => record.date_part().to_owned(),
            Column::Time => record.time_part().to_owned(),
            Column::Nickname => record.key().to_owned(),
            Column::Tags => record.tags.trim().to_owned(),
            Column::City => blank_placeholder(&record.city),
            Column::Gender => blank_placeholder(&record.gender),
            Column::Married => blank_placeholder(&record.married),
            Column::Age => blank_placeholder(&record.age),
            Column::Joined => record.joined.trim().to_owned(),
            Column::Followers => record.followers.trim().to_owned(),
            Column::Posts => record.posts.trim().to_owned(),
            Column::LastPost => record.last_post.trim().to_owned(),
            Column::LastPostAt => record.last_post_at.trim().to_owned(),
            Column::ProfileLink => record.profile_link.trim().to_owned(),
            Column::ProfileImage => record.profile_image.trim().to_owned(),
            Column::Intro => clean_text(&record.intro),
        }
    }
}

const LAYOUT_A: &[Column] = &[
    Column::DateTime,
    Column::Nickname,
    Column::Tags,
    Column::City,
    Column::Gender,
    Column::Married,
    Column::Age,
    Column::Joined,
    Column::Followers,
    Column::Posts,
    Column::LastPost,
    Column::LastPostAt,
    Column::ProfileLink,
    Column::ProfileImage,
    Column::Intro,
];

const LAYOUT_B: &[Column] = &[
    Column::Date,
    Column::Time,
    Column::Nickname,
    Column::Tags,
    Column::City,
    Column::Gender,
    Column::Married,
    Column::Age,
    Column::Joined,
    Column::Followers,
    Column::Posts,
    Column::ProfileLink,
    Column::ProfileImage,
    Column::Intro,
];

/// Which of the two profile-sheet schemas is in use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SheetLayout {
    /// 15 columns, single `DATETIME`, latest-post columns present.
    #[default]
    A,
    /// 14 columns, `DATE` and `TIME` split, no latest-post columns.
    B,
}

impl SheetLayout {
    #[must_use]
    pub fn columns(self) -> &'static [Column] {
        match self {
            SheetLayout::A => LAYOUT_A,
            SheetLayout::B => LAYOUT_B,
        }
    }

    #[must_use]
    pub fn width(self) -> usize {
        self.columns().len()
    }

    #[must_use]
    pub fn header(self) -> Vec<String> {
        self.columns().iter().map(|c| c.header().to_owned()).collect()
    }

    #[must_use]
    pub fn identifier_index(self) -> usize {
        match self {
            SheetLayout::A => 1,
            SheetLayout::B => 2,
        }
    }

    #[must_use]
    pub fn tags_index(self) -> usize {
        self.identifier_index() + 1
    }

    /// Zero-based indices of the significance set.
    #[must_use]
    pub fn significant_indices(self) -> Vec<usize> {
        self.indices_where(Column::is_significant)
    }

    /// Zero-based indices of the observation timestamp column(s).
    #[must_use]
    pub fn timestamp_indices(self) -> Vec<usize> {
        self.indices_where(Column::is_timestamp)
    }

    /// Projects `record` into this layout's column order.
    #[must_use]
    pub fn project(self, record: &ProfileRecord) -> Vec<String> {
        self.columns().iter().map(|c| c.value_of(record)).collect()
    }

    /// Whether `row` is this layout's header (case-insensitive, trimmed).
    #[must_use]
    pub fn is_header(self, row: &[String]) -> bool {
        row.len() >= self.width()
            && self
                .columns()
                .iter()
                .zip(row)
                .all(|(c, cell)| cell.trim().eq_ignore_ascii_case(c.header()))
    }

    fn indices_where(self, pred: impl Fn(Column) -> bool) -> Vec<usize> {
        self.columns()
            .iter()
            .enumerate()
            .filter(|(_, c)| pred(**c))
            .map(|(i, _)| i)
            .collect()
    }
}

impl std::str::FromStr for SheetLayout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a" => Ok(SheetLayout::A),
            "b" => Ok(SheetLayout::B),
            other => Err(format!("unknown layout '{other}' (expected 'a' or 'b')")),
        }
    }
}

#[cfg(test)]
#[path = "layout_test.rs"]
mod tests;
