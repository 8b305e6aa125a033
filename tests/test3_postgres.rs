#![cfg(feature = "postgres")]

use sql_fluent::prelude::*;

/// Runs only when `DB=postgres`; connection details come from the environment.
fn postgres_builder() -> Result<Option<QueryBuilder>, SqlFluentError> {
    if std::env::var("DB").as_deref() != Ok("postgres") {
        return Ok(None);
    }
    let host = std::env::var("TESTING_PG_HOST").unwrap_or_else(|_| "localhost".to_string());
    let db = std::env::var("TESTING_PG_DB").unwrap_or_else(|_| "testing".to_string());
    let user = std::env::var("TESTING_PG_USER").unwrap_or_else(|_| "testuser".to_string());
    let password = std::env::var("TESTING_PG_PASSWORD").unwrap_or_default();

    let mut desc = ConnectionDescriptor::postgres(host, db).with_credentials(user, password);
    if let Ok(port) = std::env::var("TESTING_PG_PORT") {
        desc = desc.with_port(port.parse().unwrap_or(5432));
    }
    let conn = Connection::open(&desc)?;
    conn.execute_batch(
        "DROP TABLE IF EXISTS fluent_pets;
         CREATE TABLE fluent_pets (
             id BIGSERIAL PRIMARY KEY,
             name TEXT NOT NULL UNIQUE,
             age INT,
             weight REAL,
             seen TIMESTAMP
         );",
    )?;
    let mut builder = conn.builder();
    builder.table("fluent_pets");
    Ok(Some(builder))
}

#[test]
fn postgres_round_trip() -> Result<(), SqlFluentError> {
    let Some(mut pets) = postgres_builder()? else {
        return Ok(());
    };

    let seen = chrono::NaiveDate::from_ymd_opt(2024, 5, 1)
        .and_then(|d| d.and_hms_opt(12, 0, 0))
        .unwrap();
    let id = pets
        .insert(
            Fields::new()
                .with("name", "rex")
                .with("age", 3)
                .with("weight", 4.5)
                .with("seen", seen),
        )?
        .expect("LASTVAL after insert");
    pets.insert([("name", RowValues::from("tom")), ("age", RowValues::Int(7))])?;

    let rex = pets.find(&id)?.expect("row");
    assert_eq!(rex.get("name"), Some(&RowValues::from("rex")));
    assert_eq!(rex.get("age"), Some(&RowValues::Int(3)));
    assert_eq!(rex.get("seen"), Some(&RowValues::Timestamp(seen)));

    assert!(pets.update([("age", 8)], [("name", "tom")])?);
    pets.select(["age"])
        .where_([("age >=", RowValues::Int(3)), ("name LIKE", "%o%".into())])?;
    assert_eq!(pets.all_column()?, vec![RowValues::Int(8)]);

    let handle = pets
        .execute(
            "SELECT name FROM fluent_pets WHERE age = :age OR age = :age + 5 ORDER BY id",
            [("age", RowValues::Int(3))],
        )?
        .expect("valid statement");
    assert_eq!(handle.fetch_column(), vec![RowValues::from("rex"), RowValues::from("tom")]);

    assert_eq!(pets.insert([("name", "rex")])?, None);
    assert_eq!(pets.errors().sqlstate, "23505");

    assert!(pets.delete("age > 5")?);
    assert_eq!(pets.affected_rows(), 1);
    Ok(())
}
