//! DDL of the four relations.

/// Creates the sequences and relations that are missing; dimensions first.
pub(super) const CREATE_SCHEMA: &str = r#"
CREATE SEQUENCE IF NOT EXISTS affordable_housing_id START 1;
CREATE SEQUENCE IF NOT EXISTS waiting_list_id START 1;

CREATE TABLE IF NOT EXISTS "AREA" (
    "code" VARCHAR PRIMARY KEY,
    "name" VARCHAR
);

CREATE TABLE IF NOT EXISTS "YEAR" (
    "year" INTEGER PRIMARY KEY
);

CREATE TABLE IF NOT EXISTS "WAITING_LIST" (
    "id" INTEGER PRIMARY KEY DEFAULT nextval('waiting_list_id'),
    "year" INTEGER REFERENCES "YEAR"("year"),
    "areaCode" VARCHAR REFERENCES "AREA"("code"),
    "householdsCount" INTEGER
);

CREATE TABLE IF NOT EXISTS "AFFORDABLE_HOUSING" (
    "id" INTEGER PRIMARY KEY DEFAULT nextval('affordable_housing_id'),
    "year" INTEGER REFERENCES "YEAR"("year"),
    "areaCode" VARCHAR REFERENCES "AREA"("code"),
    "housingUnits" INTEGER
);
"#;

/// Drops everything [`CREATE_SCHEMA`] creates; fact tables go before the dimensions they reference.
pub(super) const DROP_SCHEMA: &str = r#"
DROP TABLE IF EXISTS "AFFORDABLE_HOUSING";
DROP TABLE IF EXISTS "WAITING_LIST";
DROP TABLE IF EXISTS "YEAR";
DROP TABLE IF EXISTS "AREA";
DROP SEQUENCE IF EXISTS affordable_housing_id;
DROP SEQUENCE IF EXISTS waiting_list_id;
"#;
