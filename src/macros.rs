/// Builds a [`Value`](crate::Value) from a JSON-like literal.
///
/// Objects become section tables, arrays become arrays, and any other
/// expression is converted with `Value::from`.
///
/// ```rust
/// use serde_tomlet::{tomlet, Value};
///
/// let doc = tomlet!({
///     "name": "svc",
///     "ports": [80, 443],
///     "limits": { "burst": 10 }
/// });
///
/// assert_eq!(doc.get("name"), Some(&Value::from("svc")));
/// assert!(matches!(doc.get("limits"), Some(Value::Table(_))));
/// ```
#[macro_export]
macro_rules! tomlet {
    (true) => {
        $crate::Value::Boolean(true)
    };

    (false) => {
        $crate::Value::Boolean(false)
    };

    ([]) => {
        $crate::Value::Array(vec![])
    };

    ([ $($elem:tt),* $(,)? ]) => {
        $crate::Value::Array(vec![$($crate::tomlet!($elem)),*])
    };

    ({}) => {
        $crate::Value::Table($crate::Map::new())
    };

    ({ $($key:literal : $value:tt),* $(,)? }) => {{
        let mut table = $crate::Map::new();
        $(
            table.insert($key.to_string(), $crate::tomlet!($value));
        )*
        $crate::Value::Table(table)
    }};

    ($other:expr) => {
        $crate::Value::from($other)
    };
}
