/// Builds a [`Value`](crate::Value) from a JSON-like literal.
///
/// ```rust
/// use schema_token::{value, Value};
///
/// let data = value!({
///     "enabled": true,
///     "offset": { "start": (-256), "end": 255 },
///     "tags": ["a", "b"],
///     "age": null
/// });
/// assert!(data.is_object());
/// ```
///
/// Negative numbers nested inside arrays or objects must be parenthesized.
#[macro_export]
macro_rules! value {
    // Handle null
    (null) => {
        $crate::Value::Null
    };

    (true) => {
        $crate::Value::Bool(true)
    };

    (false) => {
        $crate::Value::Bool(false)
    };

    ([]) => {
        $crate::Value::Array(vec![])
    };

    ([ $($elem:tt),* $(,)? ]) => {
        $crate::Value::Array(vec![$($crate::value!($elem)),*])
    };

    ({}) => {
        $crate::Value::Object($crate::ValueMap::new())
    };

    ({ $($key:literal : $value:tt),* $(,)? }) => {{
        let mut object = $crate::ValueMap::new();
        $(
            object.insert($key.to_string(), $crate::value!($value));
        )*
        $crate::Value::Object(object)
    }};

    // Negative numbers arrive as two tokens
    (- $n:literal) => {
        $crate::Value::from(-$n)
    };

    ($s:expr) => {
        $crate::Value::from($s)
    };
}
