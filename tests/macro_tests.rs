use serde_tomlet::{to_string, tomlet, Map, Value};

#[test]
fn test_tomlet_macro_booleans() {
    assert_eq!(tomlet!(true), Value::Boolean(true));
    assert_eq!(tomlet!(false), Value::Boolean(false));
}

#[test]
fn test_tomlet_macro_numbers() {
    assert_eq!(tomlet!(42), Value::Integer(42));
    assert_eq!(tomlet!(3.5), Value::Float(3.5));
    assert_eq!(tomlet!(-123), Value::Integer(-123));
}

#[test]
fn test_tomlet_macro_strings() {
    assert_eq!(tomlet!("hello world"), Value::String("hello world".to_string()));
    assert_eq!(tomlet!(""), Value::String(String::new()));
}

#[test]
fn test_tomlet_macro_arrays() {
    assert_eq!(tomlet!([]), Value::Array(vec![]));

    assert_eq!(
        tomlet!([1, "two", true]),
        Value::Array(vec![
            Value::Integer(1),
            Value::String("two".to_string()),
            Value::Boolean(true),
        ])
    );
}

#[test]
fn test_tomlet_macro_tables() {
    assert_eq!(tomlet!({}), Value::Table(Map::new()));

    let course = tomlet!({
        "title": "Intro to Rust",
        "credits": 5,
        "staff": { "lead": "Ferris" },
        "tags": ["systems", "beginner"],
    });

    assert_eq!(course.get("credits"), Some(&Value::Integer(5)));
    let staff = course.get("staff").unwrap();
    assert!(matches!(staff, Value::Table(_)));
    assert_eq!(staff.get("lead").and_then(Value::as_str), Some("Ferris"));
    assert_eq!(course.get("tags").and_then(Value::as_array).map(Vec::len), Some(2));
}

#[test]
fn test_tomlet_macro_variables() {
    let port: u16 = 8080;
    let name = String::from("api");
    let value = tomlet!({ "port": port, "name": name });
    assert_eq!(value.get("port"), Some(&Value::Integer(8080)));
    assert_eq!(value.get("name"), Some(&Value::from("api")));
}

#[test]
fn test_tomlet_macro_value_encodes_as_document() {
    let doc = tomlet!({
        "name": "svc",
        "db": { "port": 5432 }
    });
    assert_eq!(to_string(&doc).unwrap(), "name = \"svc\"\n\n[db]\nport = 5432\n");
}

#[test]
fn test_value_accessors() {
    let value = tomlet!([1, 2, 3]);
    assert!(value.is_array());
    assert!(!value.is_table());
    assert_eq!(value.as_array().map(Vec::len), Some(3));
    assert_eq!(value.type_name(), "array");

    let text = tomlet!("x");
    assert!(text.is_string());
    assert_eq!(text.as_integer(), None);
    assert_eq!(tomlet!(2).as_float(), Some(2.0));
}
