//! Resume record store: the single authoritative record of an editing session.
//!
//! Every operation leaves the record satisfying the invariants checked by
//! [`validate_record`]. Only `replace` can fail, and only when handed a record
//! that already violates them.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::resume::{ListEntry, ListKind, ResumeRecord};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("record violates invariants: {0}")]
    InvariantViolation(String),
}

/// Checks the id invariants: every entry in the three id-bearing lists has a
/// non-empty id, unique within its own list.
pub fn validate_record(record: &ResumeRecord) -> Result<(), StoreError> {
    check_ids(ListKind::Experience, &record.experience)?;
    check_ids(ListKind::Education, &record.education)?;
    check_ids(ListKind::References, &record.references)?;
    Ok(())
}

fn check_ids<T: ListEntry>(kind: ListKind, entries: &[T]) -> Result<(), StoreError> {
    let mut seen = HashSet::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        let id = entry.id();
        if id.trim().is_empty() {
            return Err(StoreError::InvariantViolation(format!(
                "{kind}[{index}] has an empty id"
            )));
        }
        if !seen.insert(id) {
            return Err(StoreError::InvariantViolation(format!(
                "{kind}[{index}] repeats id '{id}'"
            )));
        }
    }
    Ok(())
}

/// Monotonic token identifying one extraction request. Only the most recently
/// issued token may replace the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct RequestToken(u64);

impl RequestToken {
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplaceOutcome {
    Applied,
    /// A newer request was issued after this one; the result was discarded.
    Stale,
}

/// Scalar fields editable one at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarField {
    Name,
    Email,
    Phone,
    Address,
    Objective,
}

impl FromStr for ScalarField {
    type Err = String;

    /// Accepts bare names (`email`) and dotted paths (`personalInfo.email`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let field = s.strip_prefix("personalInfo.").unwrap_or(s);
        match field {
            "name" => Ok(ScalarField::Name),
            "email" => Ok(ScalarField::Email),
            "phone" => Ok(ScalarField::Phone),
            "address" => Ok(ScalarField::Address),
            "objective" if s == field => Ok(ScalarField::Objective),
            _ => Err(format!("Unknown field '{s}'")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResumeStore {
    record: ResumeRecord,
    /// Last locally uploaded photo, merged into every record the store holds.
    photo: Option<String>,
    /// Session-scoped counter for ids of user-added entries.
    entry_seq: u64,
    latest_token: u64,
}

impl Default for ResumeStore {
    fn default() -> Self {
        Self::with_record(ResumeRecord::placeholder())
    }
}

impl ResumeStore {
    fn with_record(record: ResumeRecord) -> Self {
        let photo = record.personal_info.photo.clone();
        Self {
            record,
            photo,
            entry_seq: 0,
            latest_token: 0,
        }
    }

    pub fn record(&self) -> &ResumeRecord {
        &self.record
    }

    /// Wholesale substitution. The store's photo is kept; any photo on the
    /// incoming record is ignored. On error the current record is untouched.
    pub fn replace(&mut self, mut record: ResumeRecord) -> Result<(), StoreError> {
        validate_record(&record)?;
        record.personal_info.photo = self.photo.clone();
        self.record = record;
        Ok(())
    }

    /// Issues the next request token, making every earlier token stale.
    pub fn issue_token(&mut self) -> RequestToken {
        self.latest_token += 1;
        debug!("issued extraction token #{}", self.latest_token);
        RequestToken(self.latest_token)
    }

    /// Makes all outstanding tokens stale without issuing a usable one.
    pub fn invalidate_tokens(&mut self) {
        self.latest_token += 1;
    }

    /// Back to the placeholder record with no photo. Outstanding extraction
    /// tokens become stale; the id and token counters keep counting.
    pub fn reset(&mut self) {
        self.record = ResumeRecord::placeholder();
        self.photo = None;
        self.invalidate_tokens();
    }

    pub fn is_current(&self, token: RequestToken) -> bool {
        token.0 == self.latest_token
    }

    /// Replaces the record only if `token` is the most recently issued one.
    pub fn replace_if_current(
        &mut self,
        token: RequestToken,
        record: ResumeRecord,
    ) -> Result<ReplaceOutcome, StoreError> {
        if !self.is_current(token) {
            info!(
                "discarding stale extraction result {token} (latest is #{})",
                self.latest_token
            );
            return Ok(ReplaceOutcome::Stale);
        }
        self.replace(record)?;
        Ok(ReplaceOutcome::Applied)
    }

    pub fn set_scalar_field(&mut self, field: ScalarField, value: String) {
        let info = &mut self.record.personal_info;
        match field {
            ScalarField::Name => info.name = value,
            ScalarField::Email => info.email = value,
            ScalarField::Phone => info.phone = value,
            ScalarField::Address => info.address = value,
            ScalarField::Objective => self.record.objective = value,
        }
    }

    pub fn set_objective(&mut self, text: String) {
        self.record.objective = text;
    }

    /// Sets or clears the uploaded photo.
    pub fn set_photo(&mut self, photo: Option<String>) {
        self.photo = photo;
        self.record.personal_info.photo = self.photo.clone();
    }

    /// Appends an entry and returns its id (`<list>-<n>`, unique in the list).
    /// Fields start empty unless named in `defaults`; unknown names and `id`
    /// are ignored.
    pub fn add_entry<I>(&mut self, kind: ListKind, defaults: I) -> String
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let id = self.next_entry_id(kind);
        match kind {
            ListKind::Experience => push_entry(&mut self.record.experience, id.clone(), defaults),
            ListKind::Education => push_entry(&mut self.record.education, id.clone(), defaults),
            ListKind::References => push_entry(&mut self.record.references, id.clone(), defaults),
        }
        debug!("added {kind} entry {id}");
        id
    }

    /// Updates one field of the entry with `id`. Returns false (and changes
    /// nothing) when the id is absent or the field does not exist.
    pub fn update_entry(&mut self, kind: ListKind, id: &str, field: &str, value: String) -> bool {
        let updated = match kind {
            ListKind::Experience => update_in(&mut self.record.experience, id, field, value),
            ListKind::Education => update_in(&mut self.record.education, id, field, value),
            ListKind::References => update_in(&mut self.record.references, id, field, value),
        };
        if !updated {
            debug!("update of {kind}/{id}.{field} ignored");
        }
        updated
    }

    /// Removes the entry with `id`. Returns false when it was not present.
    pub fn remove_entry(&mut self, kind: ListKind, id: &str) -> bool {
        match kind {
            ListKind::Experience => remove_from(&mut self.record.experience, id),
            ListKind::Education => remove_from(&mut self.record.education, id),
            ListKind::References => remove_from(&mut self.record.references, id),
        }
    }

    /// Replaces the skills with one skill per non-blank, trimmed line.
    pub fn set_skills_from_block(&mut self, text: &str) {
        self.record.skills = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect();
    }

    fn next_entry_id(&mut self, kind: ListKind) -> String {
        loop {
            self.entry_seq += 1;
            let candidate = format!("{}-{}", kind.key(), self.entry_seq);
            if !self.contains_id(kind, &candidate) {
                return candidate;
            }
            warn!("generated id {candidate} already present; skipping");
        }
    }

    fn contains_id(&self, kind: ListKind, id: &str) -> bool {
        match kind {
            ListKind::Experience => self.record.experience.iter().any(|e| e.id() == id),
            ListKind::Education => self.record.education.iter().any(|e| e.id() == id),
            ListKind::References => self.record.references.iter().any(|e| e.id() == id),
        }
    }
}

fn push_entry<T, I>(entries: &mut Vec<T>, id: String, defaults: I)
where
    T: ListEntry,
    I: IntoIterator<Item = (String, String)>,
{
    let mut entry = T::blank(id);
    for (field, value) in defaults {
        if !entry.set_field(&field, value) {
            debug!("ignoring default for unknown {} field '{field}'", T::KIND);
        }
    }
    entries.push(entry);
}

fn update_in<T: ListEntry>(entries: &mut [T], id: &str, field: &str, value: String) -> bool {
    entries
        .iter_mut()
        .find(|e| e.id() == id)
        .is_some_and(|entry| entry.set_field(field, value))
}

fn remove_from<T: ListEntry>(entries: &mut Vec<T>, id: &str) -> bool {
    let before = entries.len();
    entries.retain(|e| e.id() != id);
    entries.len() != before
}
