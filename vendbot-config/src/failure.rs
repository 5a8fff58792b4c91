//! Collected validation failures and the selector outcome that carries them.

use std::fmt;

use serde::Serialize;

/// One policy mismatch or incomplete credential set. `reason` never contains a secret value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationFailure {
    /// Settings key the operator has to fix.
    pub field: &'static str,
    pub reason: String,
}

impl ValidationFailure {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

/// Ordered batch of failures, reported together so one restart can fix all of them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FailureList(Vec<ValidationFailure>);

impl FailureList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, failure: ValidationFailure) {
        self.0.push(failure);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ValidationFailure> {
        self.0.iter()
    }

    /// True if any failure names `field`.
    pub fn mentions(&self, field: &str) -> bool {
        self.0.iter().any(|f| f.field == field)
    }

    pub fn into_vec(self) -> Vec<ValidationFailure> {
        self.0
    }
}

impl Extend<ValidationFailure> for FailureList {
    fn extend<I: IntoIterator<Item = ValidationFailure>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl From<Vec<ValidationFailure>> for FailureList {
    fn from(failures: Vec<ValidationFailure>) -> Self {
        Self(failures)
    }
}

impl<'a> IntoIterator for &'a FailureList {
    type Item = &'a ValidationFailure;
    type IntoIter = std::slice::Iter<'a, ValidationFailure>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for FailureList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, failure) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "  {}", failure)?;
        }
        Ok(())
    }
}

/// Outcome of a selector that parsed its input: either a usable backend or the reasons it is
/// incomplete. Malformed input is a [`crate::SelectionError`] instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection<T> {
    Chosen(T),
    Incomplete(Vec<ValidationFailure>),
}

impl<T> Selection<T> {
    pub fn chosen(&self) -> Option<&T> {
        match self {
            Self::Chosen(value) => Some(value),
            Self::Incomplete(_) => None,
        }
    }

    pub fn is_chosen(&self) -> bool {
        matches!(self, Self::Chosen(_))
    }

    pub fn into_parts(self) -> (Option<T>, Vec<ValidationFailure>) {
        match self {
            Self::Chosen(value) => (Some(value), Vec::new()),
            Self::Incomplete(failures) => (None, failures),
        }
    }
}
