//! [`Session`], the explicit unit of work.
//!
//! Reads never register anything here. Callers stage inserts, updates and
//! deletes on a session and hand it to
//! [`UnitOfWork::commit`](crate::store::UnitOfWork::commit), which applies
//! every staged change in one transaction or none of them.

use std::fmt;

use uuid::Uuid;

use crate::{
  car::Car,
  entity::{Entity, EntityKind},
  person::Person,
};

// ─── Record ──────────────────────────────────────────────────────────────────

/// A full entity value staged for insert or update.
///
/// A person record covers the person row only; its cars are staged as
/// separate car records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
  Person(Person),
  Car(Car),
}

impl Record {
  pub fn kind(&self) -> EntityKind {
    match self {
      Self::Person(_) => EntityKind::Person,
      Self::Car(_) => EntityKind::Car,
    }
  }

  pub fn id(&self) -> Uuid {
    match self {
      Self::Person(p) => p.id(),
      Self::Car(c) => c.id(),
    }
  }
}

impl From<Person> for Record {
  fn from(p: Person) -> Self { Self::Person(p) }
}

impl From<Car> for Record {
  fn from(c: Car) -> Self { Self::Car(c) }
}

// ─── Change ──────────────────────────────────────────────────────────────────

/// One staged mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
  /// Must not overwrite an existing row.
  Insert(Record),
  /// Must target an existing row; the whole entity is written.
  Update(Record),
  /// Must target an existing row.
  Delete { kind: EntityKind, id: Uuid },
}

impl Change {
  pub fn kind(&self) -> EntityKind {
    match self {
      Self::Insert(r) | Self::Update(r) => r.kind(),
      Self::Delete { kind, .. } => *kind,
    }
  }

  pub fn id(&self) -> Uuid {
    match self {
      Self::Insert(r) | Self::Update(r) => r.id(),
      Self::Delete { id, .. } => *id,
    }
  }

  fn verb(&self) -> &'static str {
    match self {
      Self::Insert(_) => "insert",
      Self::Update(_) => "update",
      Self::Delete { .. } => "delete",
    }
  }
}

// ─── Session ─────────────────────────────────────────────────────────────────

/// Staged changes, applied in the order they were staged.
///
/// A session is scoped to one request or operation and is not shared.
#[derive(Debug, Clone, Default)]
pub struct Session {
  changes: Vec<Change>,
}

impl Session {
  pub fn new() -> Self { Self::default() }

  /// Stage an insert. Staging is unconditional; a duplicate id is reported
  /// when the session is committed.
  pub fn add(&mut self, entity: impl Into<Record>) -> &mut Self {
    self.changes.push(Change::Insert(entity.into()));
    self
  }

  /// Stage a full-entity write of an existing row.
  pub fn update(&mut self, entity: impl Into<Record>) -> &mut Self {
    self.changes.push(Change::Update(entity.into()));
    self
  }

  /// Stage the deletion of `entity`.
  pub fn remove<E: Entity>(&mut self, entity: &E) -> &mut Self {
    self.changes.push(Change::Delete { kind: E::KIND, id: entity.id() });
    self
  }

  /// Drop every staged change. Committed data is not affected.
  pub fn clear_tracking(&mut self) { self.changes.clear(); }

  pub fn changes(&self) -> &[Change] { &self.changes }

  pub fn is_empty(&self) -> bool { self.changes.is_empty() }

  pub fn len(&self) -> usize { self.changes.len() }

  pub fn into_changes(self) -> Vec<Change> { self.changes }
}

/// Diagnostic dump of the pending changes, one per line.
impl fmt::Display for Session {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if self.changes.is_empty() {
      return f.write_str("(no pending changes)");
    }
    for (i, change) in self.changes.iter().enumerate() {
      if i > 0 {
        writeln!(f)?;
      }
      write!(f, "{} {} {}", change.verb(), change.kind(), change.id())?;
    }
    Ok(())
  }
}
