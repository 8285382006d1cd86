//! SQL schema for the Cartera SQLite store.
//!
//! Executed once at connection startup. `PRAGMA user_version` records the
//! layout so later migrations can be gated on it.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- Append-only. The current balance is the newest as_of.
CREATE TABLE IF NOT EXISTS bank_balances (
    balance_id    TEXT PRIMARY KEY,
    user_id       TEXT NOT NULL,
    thread_id     TEXT NOT NULL,
    amount_cents  INTEGER NOT NULL CHECK (amount_cents >= 0),
    as_of         TEXT NOT NULL,   -- RFC 3339 UTC, fixed width
    created_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS budgets (
    budget_id           TEXT PRIMARY KEY,
    user_id             TEXT NOT NULL,
    thread_id           TEXT NOT NULL,
    effective_month     TEXT NOT NULL,   -- YYYY-MM
    variable_cap_cents  INTEGER NOT NULL CHECK (variable_cap_cents >= 0),
    created_at          TEXT NOT NULL,
    updated_at          TEXT NOT NULL,
    UNIQUE (user_id, thread_id, effective_month)
);

-- Names are unique per thread ignoring ASCII case.
CREATE TABLE IF NOT EXISTS debts (
    debt_id            TEXT PRIMARY KEY,
    user_id            TEXT NOT NULL,
    thread_id          TEXT NOT NULL,
    name               TEXT NOT NULL COLLATE NOCASE,
    balance_cents      INTEGER CHECK (balance_cents >= 0),
    min_payment_cents  INTEGER CHECK (min_payment_cents >= 0),
    due_day            INTEGER CHECK (due_day BETWEEN 1 AND 31),
    priority           TEXT NOT NULL,
    do_not_accelerate  INTEGER NOT NULL DEFAULT 0,
    created_at         TEXT NOT NULL,
    updated_at         TEXT NOT NULL,
    UNIQUE (user_id, thread_id, name)
);

CREATE TABLE IF NOT EXISTS transactions (
    transaction_id  TEXT PRIMARY KEY,
    user_id         TEXT NOT NULL,
    thread_id       TEXT NOT NULL,
    kind            TEXT NOT NULL,   -- 'EXPENSE' | 'INCOME'
    amount_cents    INTEGER NOT NULL CHECK (amount_cents >= 0),
    category_type   TEXT NOT NULL,
    category        TEXT NOT NULL,
    description     TEXT,
    date            TEXT NOT NULL,   -- YYYY-MM-DD
    created_at      TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS bank_balances_scope_idx ON bank_balances(user_id, thread_id, as_of);
CREATE INDEX IF NOT EXISTS debts_scope_idx         ON debts(user_id, thread_id, created_at);
CREATE INDEX IF NOT EXISTS transactions_date_idx   ON transactions(user_id, thread_id, date);
CREATE INDEX IF NOT EXISTS transactions_recent_idx ON transactions(user_id, thread_id, created_at);

PRAGMA user_version = 1;
";
