/// Typed param coercion
///
/// Matching always yields strings. Routes may declare some params numeric;
/// the typed view converts those to JSON numbers (splats to arrays of
/// numbers) while the raw map stays untouched.
use std::collections::BTreeMap;

use serde_json::{Number, Value};

use crate::error::{Result, RouterError};
use crate::matcher::RawParams;
use crate::token::PathParam;

/// Params with numeric coercion applied
pub type TypedParams = BTreeMap<String, Value>;

/// Builds the typed param map for a match.
///
/// - numeric param: `"0"` → `0`
/// - numeric splat: `"1/2/3"` → `[1, 2, 3]`
/// - other splat: `"a/b"` → `["a", "b"]`
/// - anything else stays a string
///
/// # Examples
///
/// ```
/// use std::collections::BTreeMap;
/// use serde_json::json;
/// use waymark_router::{coerce_params, tokenize};
///
/// let tokens = tokenize("files/:id/{...path}").unwrap();
/// let raw = BTreeMap::from([
///     ("id".to_string(), "0".to_string()),
///     ("path".to_string(), "1/2/3".to_string()),
/// ]);
///
/// let typed = coerce_params(&raw, &tokens.params(), &["id", "path"]).unwrap();
/// assert_eq!(typed["id"], json!(0));
/// assert_eq!(typed["path"], json!([1, 2, 3]));
/// assert_eq!(raw["id"], "0");
/// ```
pub fn coerce_params<S: AsRef<str>>(
    raw: &RawParams,
    params: &[PathParam],
    numeric: &[S],
) -> Result<TypedParams> {
    raw.iter()
        .map(|(name, value)| {
            let is_numeric = numeric.iter().any(|n| n.as_ref() == name.as_str());
            let is_rest = params.iter().any(|p| &p.name == name && p.is_rest);

            let typed = match (is_rest, is_numeric) {
                (true, true) => Value::Array(
                    split_rest(value)
                        .map(|segment| parse_number(name, segment))
                        .collect::<Result<Vec<_>>>()?,
                ),
                (true, false) => Value::Array(
                    split_rest(value)
                        .map(|segment| Value::String(segment.to_string()))
                        .collect(),
                ),
                (false, true) => parse_number(name, value)?,
                (false, false) => Value::String(value.clone()),
            };

            Ok((name.clone(), typed))
        })
        .collect()
}

fn split_rest(value: &str) -> impl Iterator<Item = &str> {
    value.split('/').filter(|segment| !segment.is_empty())
}

fn parse_number(name: &str, value: &str) -> Result<Value> {
    let not_numeric = || RouterError::NotNumeric {
        name: name.to_string(),
        value: value.to_string(),
    };

    if let Ok(int) = value.parse::<i64>() {
        return Ok(Value::Number(int.into()));
    }

    value
        .parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .ok_or_else(not_numeric)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(pairs: &[(&str, &str)]) -> RawParams {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn param(name: &str, is_rest: bool) -> PathParam {
        PathParam {
            name: name.to_string(),
            is_optional: is_rest,
            is_rest,
        }
    }

    #[test]
    fn test_zero_is_preserved_raw_and_coerced_typed() {
        let raw = raw(&[("id", "0")]);
        let typed = coerce_params(&raw, &[param("id", false)], &["id"]).unwrap();
        assert_eq!(raw["id"], "0");
        assert_eq!(typed["id"], json!(0));
    }

    #[test]
    fn test_numeric_rest() {
        let typed =
            coerce_params(&raw(&[("path", "1/2/3")]), &[param("path", true)], &["path"]).unwrap();
        assert_eq!(typed["path"], json!([1, 2, 3]));
    }

    #[test]
    fn test_plain_rest_splits_into_strings() {
        let none: &[&str] = &[];
        let typed = coerce_params(&raw(&[("path", "a/b")]), &[param("path", true)], none).unwrap();
        assert_eq!(typed["path"], json!(["a", "b"]));
    }

    #[test]
    fn test_float_and_negative() {
        let typed = coerce_params(
            &raw(&[("lat", "-12.5"), ("page", "-3")]),
            &[param("lat", false), param("page", false)],
            &["lat", "page"],
        )
        .unwrap();
        assert_eq!(typed["lat"], json!(-12.5));
        assert_eq!(typed["page"], json!(-3));
    }

    #[test]
    fn test_non_numeric_is_error() {
        let err = coerce_params(&raw(&[("id", "abc")]), &[param("id", false)], &["id"]).unwrap_err();
        assert!(matches!(err, RouterError::NotNumeric { ref name, .. } if name == "id"));
    }

    #[test]
    fn test_non_numeric_params_stay_strings() {
        let typed = coerce_params(&raw(&[("slug", "42")]), &[param("slug", false)], &["id"]).unwrap();
        assert_eq!(typed["slug"], json!("42"));
    }
}
