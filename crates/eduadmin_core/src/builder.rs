//! Answer-option builder for question editing.
//!
//! Options are an ordered list; their letter labels (A, B, C, ...) are always
//! derived from position and never stored, so reordering or removing an
//! option relabels everything after it.

use crate::constants::{DEFAULT_MAX_ANSWER_OPTIONS, DEFAULT_MIN_ANSWER_OPTIONS};
use crate::error::AppError;
use serde::{Deserialize, Serialize};

/// Question type discriminator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    #[default]
    SingleChoice,
    MultipleChoice,
    TrueFalse,
}

impl QuestionKind {
    /// Whether marking one option correct clears the others.
    pub fn single_correct(self) -> bool {
        matches!(self, Self::SingleChoice | Self::TrueFalse)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::SingleChoice => "Single choice",
            Self::MultipleChoice => "Multiple choice",
            Self::TrueFalse => "True / False",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOption {
    pub text: String,
    pub is_correct: bool,
}

impl AnswerOption {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_correct: false,
        }
    }
}

/// Move the item at `from` to `to`, shifting the items in between.
///
/// Out-of-range indices leave the list unchanged.
pub fn reorder<T>(mut list: Vec<T>, from: usize, to: usize) -> Vec<T> {
    if from >= list.len() || to >= list.len() || from == to {
        return list;
    }
    let item = list.remove(from);
    list.insert(to, item);
    list
}

/// Positional label: `A`..`Z`, then `AA`, `AB`, ...
pub fn label_for(index: usize) -> String {
    let mut n = index + 1;
    let mut out = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        out.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

/// Ordered, labelled answer options with min/max bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionBuilder {
    kind: QuestionKind,
    options: Vec<AnswerOption>,
    min_options: usize,
    max_options: usize,
}

impl OptionBuilder {
    /// Start with `min_options` blank options, or True/False for that kind.
    pub fn new(kind: QuestionKind) -> Self {
        let mut builder = Self {
            kind,
            options: Vec::new(),
            min_options: DEFAULT_MIN_ANSWER_OPTIONS,
            max_options: DEFAULT_MAX_ANSWER_OPTIONS,
        };
        builder.seed_options();
        builder
    }

    /// Rebuild from stored options, e.g. when editing an existing question.
    pub fn from_options(kind: QuestionKind, options: Vec<AnswerOption>) -> Self {
        let mut builder = Self {
            kind,
            options,
            min_options: DEFAULT_MIN_ANSWER_OPTIONS,
            max_options: DEFAULT_MAX_ANSWER_OPTIONS,
        };
        builder.normalize_correct_flags();
        builder
    }

    /// Override the removal floor and add ceiling.
    ///
    /// # Errors
    /// Returns [`AppError::BadRequest`] when `min > max` or `max` is zero.
    pub fn with_bounds(mut self, min: usize, max: usize) -> Result<Self, AppError> {
        if max == 0 || min > max {
            return Err(AppError::BadRequest(format!(
                "invalid option bounds: min {min}, max {max}"
            )));
        }
        self.min_options = min;
        self.max_options = max;
        Ok(self)
    }

    pub fn kind(&self) -> QuestionKind {
        self.kind
    }

    pub fn options(&self) -> &[AnswerOption] {
        &self.options
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    pub fn can_add(&self) -> bool {
        self.kind != QuestionKind::TrueFalse && self.options.len() < self.max_options
    }

    pub fn can_remove(&self) -> bool {
        self.kind != QuestionKind::TrueFalse && self.options.len() > self.min_options
    }

    /// # Returns
    /// `false` when refused (at the ceiling, or a true/false question).
    pub fn add(&mut self, text: impl Into<String>) -> bool {
        if !self.can_add() {
            return false;
        }
        self.options.push(AnswerOption::new(text));
        true
    }

    /// # Returns
    /// `false` when refused (at the floor, out of range, or true/false).
    pub fn remove(&mut self, index: usize) -> bool {
        if !self.can_remove() || index >= self.options.len() {
            return false;
        }
        self.options.remove(index);
        true
    }

    /// Drag-and-drop move.
    ///
    /// # Returns
    /// `false` when either index is out of range or they are equal.
    pub fn move_option(&mut self, from: usize, to: usize) -> bool {
        let len = self.options.len();
        if from >= len || to >= len || from == to {
            return false;
        }
        let options = std::mem::take(&mut self.options);
        self.options = reorder(options, from, to);
        true
    }

    pub fn set_text(&mut self, index: usize, text: impl Into<String>) -> bool {
        match self.options.get_mut(index) {
            Some(option) => {
                option.text = text.into();
                true
            }
            None => false,
        }
    }

    /// Mark or unmark an option as correct.
    ///
    /// For single-correct kinds marking one option clears every other flag
    /// in the same call.
    pub fn set_correct(&mut self, index: usize, correct: bool) -> bool {
        if index >= self.options.len() {
            return false;
        }
        if correct && self.kind.single_correct() {
            for (idx, option) in self.options.iter_mut().enumerate() {
                option.is_correct = idx == index;
            }
        } else {
            self.options[index].is_correct = correct;
        }
        true
    }

    /// Switch question type, reshaping options as the new kind requires.
    pub fn set_kind(&mut self, kind: QuestionKind) {
        if kind == self.kind {
            return;
        }
        let was_true_false = self.kind == QuestionKind::TrueFalse;
        self.kind = kind;
        if kind == QuestionKind::TrueFalse || was_true_false {
            self.options.clear();
            self.seed_options();
        } else {
            self.normalize_correct_flags();
        }
    }

    /// Options paired with their positional labels.
    pub fn labeled(&self) -> Vec<(String, &AnswerOption)> {
        self.options
            .iter()
            .enumerate()
            .map(|(idx, option)| (label_for(idx), option))
            .collect()
    }

    /// Check the question can be saved.
    ///
    /// # Errors
    /// Returns [`AppError::BadRequest`] naming the first problem found.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.options.len() < self.min_options {
            return Err(AppError::BadRequest(format!(
                "at least {} options are required",
                self.min_options
            )));
        }
        if let Some(idx) = self
            .options
            .iter()
            .position(|option| option.text.trim().is_empty())
        {
            return Err(AppError::BadRequest(format!(
                "option {} has no text",
                label_for(idx)
            )));
        }
        let correct = self.options.iter().filter(|o| o.is_correct).count();
        if correct == 0 {
            return Err(AppError::BadRequest(
                "mark at least one correct option".to_string(),
            ));
        }
        if self.kind.single_correct() && correct > 1 {
            return Err(AppError::BadRequest(
                "only one option may be correct".to_string(),
            ));
        }
        Ok(())
    }

    fn seed_options(&mut self) {
        if self.kind == QuestionKind::TrueFalse {
            self.options = vec![AnswerOption::new("True"), AnswerOption::new("False")];
            return;
        }
        while self.options.len() < self.min_options {
            self.options.push(AnswerOption::default());
        }
    }

    fn normalize_correct_flags(&mut self) {
        if !self.kind.single_correct() {
            return;
        }
        let mut seen = false;
        for option in &mut self.options {
            if option.is_correct {
                option.is_correct = !seen;
                seen = true;
            }
        }
    }
}
