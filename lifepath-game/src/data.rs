//! Question table parsing and the validated question pool.
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::{BTreeMap, HashMap};
use std::ops::AddAssign;
use thiserror::Error;

use crate::philosopher::{PathFlag, Philosopher};
use crate::progression::{SetupError, SetupStage, setup_question};

pub(crate) const BUNDLED_TABLE: &str = include_str!("../assets/data/game_data.csv");

/// Point deltas across the five life-satisfaction axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Points {
    #[serde(default)]
    pub career: i32,
    #[serde(default)]
    pub parents: i32,
    #[serde(default)]
    pub children: i32,
    #[serde(default)]
    pub health: i32,
    #[serde(default)]
    pub friends: i32,
}

/// Accumulated points for a whole journey. Only ever grows by summation.
pub type PointTotals = Points;

impl Points {
    #[must_use]
    pub const fn new(career: i32, parents: i32, children: i32, health: i32, friends: i32) -> Self {
        Self {
            career,
            parents,
            children,
            health,
            friends,
        }
    }

    #[must_use]
    pub const fn total(&self) -> i32 {
        self.career
            .saturating_add(self.parents)
            .saturating_add(self.children)
            .saturating_add(self.health)
            .saturating_add(self.friends)
    }
}

impl AddAssign for Points {
    fn add_assign(&mut self, rhs: Self) {
        self.career = self.career.saturating_add(rhs.career);
        self.parents = self.parents.saturating_add(rhs.parents);
        self.children = self.children.saturating_add(rhs.children);
        self.health = self.health.saturating_add(rhs.health);
        self.friends = self.friends.saturating_add(rhs.friends);
    }
}

/// One answer a player can give to a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceOption {
    pub philosopher: Philosopher,
    pub text: String,
    #[serde(default)]
    pub points: Points,
}

/// A single decision point. Identity for "already asked" is the description text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub age: u32,
    pub description: String,
    pub education: PathFlag,
    pub family: PathFlag,
    /// Exactly one option per philosopher, in `Philosopher::ALL` order.
    pub options: SmallVec<[ChoiceOption; 4]>,
}

impl Question {
    #[must_use]
    pub const fn age(&self) -> u32 {
        self.age
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Setup rows assign a path flag instead of matching one.
    #[must_use]
    pub const fn is_setup(&self) -> bool {
        !self.education.is_set() || !self.family.is_set()
    }

    #[must_use]
    pub fn option(&self, philosopher: Philosopher) -> Option<&ChoiceOption> {
        self.options.iter().find(|o| o.philosopher == philosopher)
    }

    #[must_use]
    pub fn option_by_text(&self, text: &str) -> Option<&ChoiceOption> {
        self.options.iter().find(|o| o.text == text)
    }

    pub fn options(&self) -> impl Iterator<Item = &ChoiceOption> {
        self.options.iter()
    }
}

/// A raw table row keyed by column header.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRow {
    cells: BTreeMap<String, String>,
}

impl RawRow {
    #[must_use]
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            cells: pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[must_use]
    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells.get(column).map(String::as_str)
    }

    pub fn set(&mut self, column: &str, value: &str) {
        self.cells.insert(column.to_string(), value.to_string());
    }
}

/// Row-level validation failures. `row` is the 1-based data row (header excluded).
#[derive(Debug, Error)]
pub enum DataError {
    #[error("row {row}: age {value:?} is not a whole number")]
    MalformedAge { row: usize, value: String },
    #[error("row {row}: description is empty")]
    MissingDescription { row: usize },
    #[error("row {row}: {column} has unrecognised value {value:?} (expected null, yes or no)")]
    UnknownFlag {
        row: usize,
        column: &'static str,
        value: String,
    },
    #[error("row {row}: option text for {philosopher} is empty")]
    MissingOption { row: usize, philosopher: Philosopher },
    #[error("row {row}: description duplicates row {first_row}: {description:?}")]
    DuplicateDescription {
        row: usize,
        first_row: usize,
        description: String,
    },
    #[error("table could not be read: {0}")]
    Csv(#[from] csv::Error),
}

/// Parse a point cell the lenient way: optional sign plus leading digits, else 0.
/// Values outside `i32` clamp to its bounds.
#[must_use]
pub fn parse_points_cell(raw: Option<&str>) -> i32 {
    let Some(raw) = raw else {
        return 0;
    };
    let trimmed = raw.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    let digits = &digits[..end];
    if digits.is_empty() {
        return 0;
    }
    // Only overflow can fail here: the slice is non-empty ASCII digits.
    let magnitude = i64::try_from(digits.parse::<u64>().unwrap_or(u64::MAX))
        .unwrap_or(i64::MAX);
    let value = if negative { -magnitude } else { magnitude };
    i32::try_from(value.clamp(i64::from(i32::MIN), i64::from(i32::MAX))).unwrap_or_default()
}

fn parse_flag(row: usize, raw: &RawRow, column: &'static str) -> Result<PathFlag, DataError> {
    let value = raw.get(column).unwrap_or_default();
    PathFlag::parse(value).ok_or_else(|| DataError::UnknownFlag {
        row,
        column,
        value: value.to_string(),
    })
}

fn parse_option(
    row: usize,
    raw: &RawRow,
    philosopher: Philosopher,
) -> Result<ChoiceOption, DataError> {
    let prefix = philosopher.column_prefix();
    let cell = |suffix: &str| raw.get(&format!("{prefix}_{suffix}"));
    let text = cell("option").unwrap_or_default().trim();
    if text.is_empty() {
        return Err(DataError::MissingOption { row, philosopher });
    }
    Ok(ChoiceOption {
        philosopher,
        text: text.to_string(),
        points: Points {
            career: parse_points_cell(cell("career_points")),
            parents: parse_points_cell(cell("parents_points")),
            children: parse_points_cell(cell("children_points")),
            health: parse_points_cell(cell("health_points")),
            friends: parse_points_cell(cell("friends_points")),
        },
    })
}

fn parse_row(row: usize, raw: &RawRow) -> Result<Question, DataError> {
    let age_cell = raw.get("age").unwrap_or_default();
    let age = age_cell
        .trim()
        .parse::<u32>()
        .map_err(|_| DataError::MalformedAge {
            row,
            value: age_cell.to_string(),
        })?;

    let description = raw.get("description").unwrap_or_default().trim();
    if description.is_empty() {
        return Err(DataError::MissingDescription { row });
    }

    let education = parse_flag(row, raw, "has_education")?;
    let family = parse_flag(row, raw, "has_family")?;

    let mut options = SmallVec::new();
    for philosopher in Philosopher::ALL {
        options.push(parse_option(row, raw, philosopher)?);
    }

    Ok(Question {
        age,
        description: description.to_string(),
        education,
        family,
        options,
    })
}

/// Convert raw rows into questions, preserving row order.
///
/// # Errors
///
/// Returns the first row that fails validation; no partial output is produced.
pub fn parse_rows<'a>(
    rows: impl IntoIterator<Item = &'a RawRow>,
) -> Result<Vec<Question>, DataError> {
    let mut questions = Vec::new();
    let mut seen: HashMap<String, usize> = HashMap::new();
    for (idx, raw) in rows.into_iter().enumerate() {
        let row = idx + 1;
        let question = parse_row(row, raw)?;
        if let Some(&first_row) = seen.get(&question.description) {
            return Err(DataError::DuplicateDescription {
                row,
                first_row,
                description: question.description,
            });
        }
        seen.insert(question.description.clone(), row);
        questions.push(question);
    }
    Ok(questions)
}

/// Read a headered CSV table and parse it into questions.
///
/// # Errors
///
/// Returns an error if the text is not valid CSV or any row fails validation.
pub fn parse_csv(text: &str) -> Result<Vec<Question>, DataError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());
    let mut rows = Vec::new();
    for record in reader.deserialize::<RawRow>() {
        let row = record?;
        if row.cells.values().all(|v| v.trim().is_empty()) {
            continue;
        }
        rows.push(row);
    }
    parse_rows(&rows)
}

/// Immutable, validated question content shared by every session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionPool {
    questions: Vec<Question>,
}

impl QuestionPool {
    /// Build a pool after checking that each setup stage has exactly one question.
    ///
    /// # Errors
    ///
    /// Returns an error if a setup stage has no question or more than one.
    pub fn new(questions: Vec<Question>) -> Result<Self, SetupError> {
        for stage in SetupStage::ALL {
            setup_question(&questions, stage)?;
        }
        log::info!("question pool loaded with {} questions", questions.len());
        Ok(Self { questions })
    }

    /// Parse and validate the table compiled into the crate.
    ///
    /// # Errors
    ///
    /// Returns an error if the bundled table is malformed.
    pub fn bundled() -> Result<Self, crate::LoadError<std::convert::Infallible>> {
        let questions = parse_csv(BUNDLED_TABLE)?;
        Ok(Self::new(questions)?)
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Question> {
        self.questions.iter()
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    #[must_use]
    pub fn find_by_description(&self, description: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.description == description)
    }
}

impl<'a> IntoIterator for &'a QuestionPool {
    type Item = &'a Question;
    type IntoIter = std::slice::Iter<'a, Question>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
