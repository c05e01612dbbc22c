use super::*;
use crate::types::ColumnType;

fn parse_one(ddl: &str) -> SchemaMap {
    parse_ddl_statements(&[ddl.to_string()])
}

#[test]
fn test_basic_create_table() {
    let schema = parse_one(
        r#"CREATE TABLE Users (
            UserID STRING(36) NOT NULL,
            Name STRING(MAX),
            Age INT64,
            CreatedAt TIMESTAMP OPTIONS (allow_commit_timestamp = true)
        ) PRIMARY KEY (UserID)"#,
    );

    assert_eq!(schema.len(), 1);
    let users = &schema["Users"];
    assert_eq!(users.len(), 4);
    assert_eq!(users["UserID"], ColumnType::String);
    assert_eq!(users["Name"], ColumnType::String);
    assert_eq!(users["Age"], ColumnType::Int64);
    assert_eq!(users["CreatedAt"], ColumnType::Timestamp);
}

#[test]
fn test_multiple_tables() {
    let statements = vec![
        "CREATE TABLE A (X INT64) PRIMARY KEY (X)".to_string(),
        "CREATE TABLE B (Y STRING(10), Z BOOL) PRIMARY KEY (Y)".to_string(),
        "CREATE TABLE C (W FLOAT64) PRIMARY KEY (W)".to_string(),
    ];
    let schema = parse_ddl_statements(&statements);
    assert_eq!(schema.len(), 3);
    assert_eq!(schema["B"]["Z"], ColumnType::Bool);
    assert_eq!(schema["C"]["W"], ColumnType::Float64);
}

#[test]
fn test_if_not_exists() {
    let schema = parse_one("CREATE TABLE IF NOT EXISTS Events (EventID STRING(36)) PRIMARY KEY (EventID)");
    assert_eq!(schema.len(), 1);
    assert!(schema.contains_key("Events"));
}

#[test]
fn test_array_and_json_columns() {
    let schema = parse_one(
        "CREATE TABLE Posts (PostID STRING(36), Tags ARRAY<STRING(MAX)>, Scores ARRAY<INT64>, Meta JSON) PRIMARY KEY (PostID)",
    );
    let posts = &schema["Posts"];
    assert_eq!(posts["Tags"], ColumnType::Array(Box::new(ColumnType::String)));
    assert_eq!(posts["Scores"], ColumnType::Array(Box::new(ColumnType::Int64)));
    assert_eq!(posts["Meta"], ColumnType::Json);
}

#[test]
fn test_ignores_non_create_table() {
    let statements = vec![
        "ALTER TABLE Users ADD COLUMN Email STRING(MAX)".to_string(),
        "CREATE INDEX UsersByName ON Users (Name)".to_string(),
        "CREATE TABLE Users (UserID STRING(36)) PRIMARY KEY (UserID)".to_string(),
    ];
    let schema = parse_ddl_statements(&statements);
    assert_eq!(schema.len(), 1);
    // ALTER does not add columns to the extracted schema
    assert!(!schema["Users"].contains_key("Email"));
}

#[test]
fn test_constraint_lines_skipped() {
    let schema = parse_one(
        r#"CREATE TABLE Orders (
            OrderID STRING(36) NOT NULL,
            UserID STRING(36),
            CONSTRAINT FK_User FOREIGN KEY (UserID) REFERENCES Users (UserID)
        ) PRIMARY KEY (OrderID)"#,
    );
    let orders = &schema["Orders"];
    assert_eq!(orders.len(), 2);
    assert!(!orders.contains_key("CONSTRAINT"));
}

#[test]
fn test_interleaved_table() {
    let schema = parse_one(
        r#"CREATE TABLE Albums (
            SingerId INT64 NOT NULL,
            AlbumId INT64 NOT NULL,
            Title STRING(MAX)
        ) PRIMARY KEY (SingerId, AlbumId),
        INTERLEAVE IN PARENT Singers ON DELETE CASCADE"#,
    );
    assert_eq!(schema["Albums"].len(), 3);
}

#[test]
fn test_unparseable_statement_is_skipped() {
    let schema = parse_one("GRANT SELECT ON TABLE_GROUP foo TO ROLE bar");
    assert!(schema.is_empty());
}

#[test]
fn test_split_statements_drops_comments() {
    let statements = split_statements(
        "-- migration 001\nCREATE TABLE A (X INT64) PRIMARY KEY (X);\n\n-- second\nCREATE TABLE B (Y INT64) PRIMARY KEY (Y);\n",
    );
    assert_eq!(statements.len(), 2);
    assert!(statements[0].starts_with("CREATE TABLE A"));
}

#[test]
fn test_read_ddl_dir_lexical_order() {
    let dir = tempfile::TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("002_orders.sql"),
        "CREATE TABLE Orders (OrderID STRING(36)) PRIMARY KEY (OrderID);",
    )
    .unwrap();
    std::fs::write(
        dir.path().join("001_users.sql"),
        "CREATE TABLE Users (UserID STRING(36)) PRIMARY KEY (UserID);",
    )
    .unwrap();
    std::fs::write(dir.path().join("notes.txt"), "not sql").unwrap();

    let statements = read_ddl_dir(dir.path()).unwrap();
    assert_eq!(statements.len(), 2);
    assert!(statements[0].contains("Users"));
    assert!(statements[1].contains("Orders"));

    let schema = load_schema_from_dir(dir.path()).unwrap();
    assert_eq!(schema.len(), 2);
}

#[test]
fn test_empty_dir_is_no_migration_files() {
    let dir = tempfile::TempDir::new().unwrap();
    let err = read_ddl_dir(dir.path()).unwrap_err();
    assert!(matches!(err, SchemaError::NoMigrationFiles { .. }));
}

#[test]
fn test_missing_dir_is_schema_read_error() {
    let dir = tempfile::TempDir::new().unwrap();
    let err = read_ddl_dir(&dir.path().join("missing")).unwrap_err();
    assert!(matches!(err, SchemaError::SchemaRead { .. }));
}

#[test]
fn test_sql_only_comments_is_no_migration_files() {
    let dir = tempfile::TempDir::new().unwrap();
    std::fs::write(dir.path().join("001_empty.sql"), "-- nothing here\n").unwrap();
    let err = read_ddl_dir(dir.path()).unwrap_err();
    assert!(matches!(err, SchemaError::NoMigrationFiles { .. }));
}
