//! SQL schema for the carshop SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS people (
    person_id   TEXT PRIMARY KEY,
    first_name  TEXT NOT NULL,
    last_name   TEXT NOT NULL,
    email       TEXT,
    phone       TEXT
);

-- Deleting a person leaves its cars in place, unowned.
CREATE TABLE IF NOT EXISTS cars (
    car_id      TEXT PRIMARY KEY,
    maker       TEXT NOT NULL,
    model       TEXT NOT NULL,
    year        INTEGER NOT NULL,
    price       TEXT NOT NULL,     -- exact decimal string
    image_url   TEXT,
    person_id   TEXT REFERENCES people(person_id) ON DELETE SET NULL
);

CREATE INDEX IF NOT EXISTS cars_person_idx      ON cars(person_id);
CREATE INDEX IF NOT EXISTS cars_maker_model_idx ON cars(maker, model);
CREATE INDEX IF NOT EXISTS people_last_name_idx ON people(last_name);

PRAGMA user_version = 1;
";
