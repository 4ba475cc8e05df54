//! [`SqliteStore`]: the SQLite implementation of the carshop repositories
//! and unit of work.

use std::path::Path;

use carshop_core::{
  Car, EntityKind, Person,
  session::{Change, Record, Session},
  store::{CarQuery, CarsRepository, PeopleRepository, Repository, Store, UnitOfWork},
};
use rusqlite::{ffi, types::Value};
use tracing::Instrument as _;
use uuid::Uuid;

use crate::{
  Error, Result,
  encode::{RawCar, RawPerson, SqlEntity, encode_uuid, table_of},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A carshop store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// `SELECT` every column of `E`'s table with an optional `WHERE` clause,
  /// ordered by id.
  async fn select_where<E: SqlEntity>(
    &self,
    clause: String,
    params: Vec<Value>,
  ) -> Result<Vec<E>> {
    let sql = format!(
      "SELECT {} FROM {} {clause} ORDER BY {}",
      E::COLUMNS,
      E::TABLE,
      E::ID_COLUMN,
    );

    let raws: Vec<E::Raw> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params), E::read_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    tracing::trace!(table = E::TABLE, rows = raws.len(), "select");
    raws.into_iter().map(E::from_raw).collect()
  }
}

impl Store for SqliteStore {
  type Error = Error;
}

// ─── Repositories ────────────────────────────────────────────────────────────

impl<E: SqlEntity> Repository<E> for SqliteStore {
  async fn find_by_id(&self, id: Uuid) -> Result<Option<E>> {
    let mut rows = self
      .select_where::<E>(
        format!("WHERE {} = ?1", E::ID_COLUMN),
        vec![Value::Text(encode_uuid(id))],
      )
      .await?;
    tracing::debug!(kind = %E::KIND, %id, found = !rows.is_empty(), "find_by_id");
    Ok(rows.pop())
  }

  async fn select_all(&self) -> Result<Vec<E>> {
    let rows = self.select_where::<E>(String::new(), Vec::new()).await?;
    tracing::debug!(kind = %E::KIND, rows = rows.len(), "select_all");
    Ok(rows)
  }
}

impl PeopleRepository for SqliteStore {
  async fn select_by_name(&self, pattern: &str) -> Result<Vec<Person>> {
    let pattern = pattern.trim();
    if pattern.is_empty() {
      return Repository::<Person>::select_all(self).await;
    }

    let like = format!("%{}%", escape_like(pattern));
    let people = self
      .select_where::<Person>(
        "WHERE last_name LIKE ?1 ESCAPE '\\'".to_owned(),
        vec![Value::Text(like)],
      )
      .await?;
    tracing::debug!(pattern, rows = people.len(), "select_by_name");
    Ok(people)
  }

  async fn find_by_id_with_cars(&self, id: Uuid) -> Result<Option<Person>> {
    let Some(mut person) = Repository::<Person>::find_by_id(self, id).await? else {
      return Ok(None);
    };
    for car in self.select_by_person_id(id).await? {
      person.add_car(car);
    }
    Ok(Some(person))
  }
}

impl CarsRepository for SqliteStore {
  async fn select_by_attributes(&self, query: &CarQuery) -> Result<Vec<Car>> {
    let query = query.clone().normalized();

    let mut conds: Vec<String> = Vec::new();
    let mut params: Vec<Value> = Vec::new();
    let mut push = |cond: &str, value: Value| {
      params.push(value);
      conds.push(format!("{cond} ?{}", params.len()));
    };

    if let Some(maker) = &query.maker {
      push("maker =", Value::Text(maker.clone()));
    }
    if let Some(model) = &query.model {
      push("model =", Value::Text(model.clone()));
    }
    if let Some(year) = query.year_min {
      push("year >=", Value::Integer(year.into()));
    }
    if let Some(year) = query.year_max {
      push("year <=", Value::Integer(year.into()));
    }

    let clause = if conds.is_empty() {
      String::new()
    } else {
      format!("WHERE {}", conds.join(" AND "))
    };

    // Price bounds are compared as exact decimals, not in SQL.
    let mut cars = self.select_where::<Car>(clause, params).await?;
    cars.retain(|car| query.matches(car));
    tracing::debug!(rows = cars.len(), "select_by_attributes");
    Ok(cars)
  }

  async fn select_by_person_id(&self, person_id: Uuid) -> Result<Vec<Car>> {
    let cars = self
      .select_where::<Car>(
        "WHERE person_id = ?1".to_owned(),
        vec![Value::Text(encode_uuid(person_id))],
      )
      .await?;
    tracing::debug!(%person_id, rows = cars.len(), "select_by_person_id");
    Ok(cars)
  }
}

/// Escape `LIKE` wildcards so user input only matches literally.
fn escape_like(s: &str) -> String {
  let mut out = String::with_capacity(s.len());
  for c in s.chars() {
    if matches!(c, '\\' | '%' | '_') {
      out.push('\\');
    }
    out.push(c);
  }
  out
}

// ─── Unit of work ────────────────────────────────────────────────────────────

/// A staged change encoded for the database thread.
struct Write {
  kind:  EntityKind,
  id:    Uuid,
  /// Owner of a written car; reported when the foreign key rejects it.
  owner: Option<Uuid>,
  op:    Op,
}

enum Op {
  InsertPerson(RawPerson),
  UpdatePerson(RawPerson),
  InsertCar(RawCar),
  UpdateCar(RawCar),
  Delete,
}

impl From<Change> for Write {
  fn from(change: Change) -> Self {
    let (kind, id) = (change.kind(), change.id());
    let owner = match &change {
      Change::Insert(Record::Car(c)) | Change::Update(Record::Car(c)) => {
        c.owner().person_id()
      }
      _ => None,
    };
    let op = match change {
      Change::Insert(Record::Person(p)) => Op::InsertPerson(RawPerson::from(&p)),
      Change::Update(Record::Person(p)) => Op::UpdatePerson(RawPerson::from(&p)),
      Change::Insert(Record::Car(c)) => Op::InsertCar(RawCar::from(&c)),
      Change::Update(Record::Car(c)) => Op::UpdateCar(RawCar::from(&c)),
      Change::Delete { .. } => Op::Delete,
    };
    Self { kind, id, owner, op }
  }
}

impl Write {
  fn execute(&self, tx: &rusqlite::Transaction<'_>) -> rusqlite::Result<usize> {
    match &self.op {
      Op::InsertPerson(p) => tx.execute(
        "INSERT INTO people (person_id, first_name, last_name, email, phone)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![p.person_id, p.first_name, p.last_name, p.email, p.phone],
      ),
      Op::UpdatePerson(p) => tx.execute(
        "UPDATE people
         SET first_name = ?2, last_name = ?3, email = ?4, phone = ?5
         WHERE person_id = ?1",
        rusqlite::params![p.person_id, p.first_name, p.last_name, p.email, p.phone],
      ),
      Op::InsertCar(c) => tx.execute(
        "INSERT INTO cars (car_id, maker, model, year, price, image_url, person_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        rusqlite::params![
          c.car_id, c.maker, c.model, c.year, c.price, c.image_url, c.person_id,
        ],
      ),
      Op::UpdateCar(c) => tx.execute(
        "UPDATE cars
         SET maker = ?2, model = ?3, year = ?4, price = ?5,
             image_url = ?6, person_id = ?7
         WHERE car_id = ?1",
        rusqlite::params![
          c.car_id, c.maker, c.model, c.year, c.price, c.image_url, c.person_id,
        ],
      ),
      Op::Delete => {
        let (table, id_column) = table_of(self.kind);
        tx.execute(
          &format!("DELETE FROM {table} WHERE {id_column} = ?1"),
          rusqlite::params![encode_uuid(self.id)],
        )
      }
    }
  }

  /// Run the write, turning constraint violations and zero-row updates or
  /// deletes into domain errors. Database failures stay in the outer result.
  fn apply(
    &self,
    tx: &rusqlite::Transaction<'_>,
  ) -> rusqlite::Result<Result<usize>> {
    match self.execute(tx) {
      Ok(0) if !self.is_insert() => Ok(Err(Error::TargetMissing {
        kind: self.kind,
        id:   self.id,
      })),
      Ok(n) => Ok(Ok(n)),
      Err(e) => match constraint_code(&e) {
        Some(ffi::SQLITE_CONSTRAINT_PRIMARYKEY | ffi::SQLITE_CONSTRAINT_UNIQUE) => {
          Ok(Err(Error::Conflict { kind: self.kind, id: self.id }))
        }
        Some(ffi::SQLITE_CONSTRAINT_FOREIGNKEY) => match self.owner {
          Some(owner) => Ok(Err(Error::OwnerMissing(owner))),
          None => Err(e),
        },
        _ => Err(e),
      },
    }
  }

  fn is_insert(&self) -> bool {
    matches!(self.op, Op::InsertPerson(_) | Op::InsertCar(_))
  }
}

/// Extended result code of a constraint violation, if `e` is one.
fn constraint_code(e: &rusqlite::Error) -> Option<i32> {
  match e {
    rusqlite::Error::SqliteFailure(err, _)
      if err.code == rusqlite::ErrorCode::ConstraintViolation =>
    {
      Some(err.extended_code)
    }
    _ => None,
  }
}

impl UnitOfWork for SqliteStore {
  async fn commit(&self, session: Session, label: Option<&str>) -> Result<bool> {
    let span = tracing::info_span!(
      "commit",
      label = label.unwrap_or("-"),
      changes = session.len(),
    );

    async move {
      tracing::debug!("pending changes:\n{session}");
      if session.is_empty() {
        return Ok(false);
      }

      let writes: Vec<Write> =
        session.into_changes().into_iter().map(Write::from).collect();

      let outcome = self
        .conn
        .call(move |conn| {
          let tx = conn.transaction()?;
          let mut affected = 0;
          for write in &writes {
            match write.apply(&tx)? {
              Ok(n) => affected += n,
              // Dropping `tx` rolls back everything staged so far.
              Err(rejected) => return Ok(Err(rejected)),
            }
          }
          tx.commit()?;
          Ok(Ok(affected))
        })
        .await?;

      match outcome {
        Ok(affected) => {
          tracing::info!(rows = affected, "changes saved");
          Ok(affected > 0)
        }
        Err(rejected) => {
          tracing::warn!(error = %rejected, "commit rejected, rolled back");
          Err(rejected)
        }
      }
    }
    .instrument(span)
    .await
  }
}
