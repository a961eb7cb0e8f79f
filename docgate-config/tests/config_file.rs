//! Loading `docgate.toml` from disk.

use std::io::Write;

use docgate_config::{ConfigError, GatewayConfig, HttpVerb, MapEnvSource};
use docgate_query::{ComparisonOperator, DialectKind};
use pretty_assertions::assert_eq;

const CONFIG: &str = r#"
[database]
url = "${DATABASE_URL}"

[storage]
identity_field = "key"
identity_column = "pk"
data_column = "doc"

[query]
default_limit = 20
max_limit = 100

[[endpoints]]
path = "/orders/"
verb = "get"
table = "orders"
sortable = ["created", "total"]
sub_entities = ["lines"]

[endpoints.filterable]
status = ["$eq", "$in"]
total = ["*"]

[[endpoints]]
path = "/orders"
verb = "DELETE"
table = "orders"
"#;

fn write_config(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_from_file() {
    let file = write_config(CONFIG);
    let env = MapEnvSource::new().set("DATABASE_URL", "mysql://gateway@db/orders");
    let config = GatewayConfig::from_file_with_env(file.path(), &env).unwrap();

    assert_eq!(config.database.dialect().unwrap(), DialectKind::MySql);
    assert_eq!(config.storage.layout().identity_column, "pk");

    let registry = config.registry().unwrap();
    assert_eq!(registry.len(), 2);

    let orders = registry.get(HttpVerb::Get, "/orders").unwrap();
    assert_eq!(orders.sub_entities, vec!["lines".to_string()]);
    assert!(orders.allows_operator("total", ComparisonOperator::Lt));
    assert!(!orders.allows_operator("status", ComparisonOperator::Ne));
    assert!(orders.allows_sort("created"));
    assert!(!orders.allows_sort("status"));

    assert!(registry.get(HttpVerb::Delete, "/orders").is_ok());
}

#[test]
fn test_translator_from_config() {
    let file = write_config(CONFIG);
    let env = MapEnvSource::new().set("DATABASE_URL", "postgres://db/orders");
    let config = GatewayConfig::from_file_with_env(file.path(), &env).unwrap();
    let translator = config.translator().unwrap();

    let result = translator
        .translate_query_params([("key", "9"), ("limit", "500")])
        .unwrap();
    let (sql, _) = result.to_positional(translator.dialect());
    assert_eq!(sql, "pk = $1");
    assert_eq!(result.limit, Some(100));
}

#[test]
fn test_missing_env_var() {
    let file = write_config(CONFIG);
    let err = GatewayConfig::from_file_with_env(file.path(), &MapEnvSource::new()).unwrap_err();
    assert!(matches!(err, ConfigError::MissingEnvVar(name) if name == "DATABASE_URL"));
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = GatewayConfig::from_file(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
}

#[test]
fn test_duplicate_endpoint() {
    let config = GatewayConfig::parse(
        r#"
        [[endpoints]]
        path = "/a"
        table = "a"

        [[endpoints]]
        path = "/a/"
        table = "b"
        "#,
    )
    .unwrap();
    assert!(matches!(
        config.registry(),
        Err(ConfigError::DuplicateEndpoint { .. })
    ));
}
