//! Type coercion from untyped JSON and form values.
//!
//! Every property value type implements [`Coerce`], which names the
//! declared [`FieldType`], converts an external value into the Rust type,
//! and renders the Rust value back to JSON. The parsing rules:
//! - integers: JSON integers, integral floats, or trimmed base-10 strings,
//!   range-checked against the target width
//! - floats: JSON numbers or trimmed strings; non-finite values travel as
//!   the strings `NaN`, `inf` and `-inf`
//! - bools: JSON bools, `true`/`false` (any ASCII case), `1`/`0`
//! - text: strings as-is, numbers and bools by their JSON text
//! - dates: [`DATE_FORMAT`] and [`DATETIME_FORMAT`] only, the latter with
//!   optional fractional seconds
//! - lists: JSON arrays, strings holding a JSON array, or comma-separated
//!   strings
//! - nested models: JSON objects, or strings holding one
//! - optional values: `null` is `None`; a blank string is `None` only when
//!   the inner type cannot take it, so `Option<String>` keeps `Some("")`

use crate::schema::FieldType;
use crate::{marshal, Model};
use chrono::{NaiveDate, NaiveDateTime};
use serde_json::{Map, Number, Value};
use std::borrow::Cow;
use thiserror::Error;

/// The one accepted date format.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// The one accepted date-time format. `%.f` prints nothing for whole
/// seconds and makes the fraction optional on input.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

const MAX_REPORTED_VALUE: usize = 64;

/// A value that could not be converted to the requested type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("expected {expected}, found {found}")]
pub struct CoercionFailure {
    pub expected: String,
    pub found: String,
}

impl CoercionFailure {
    pub fn new(expected: &FieldType, raw: &Value) -> Self {
        Self {
            expected: expected.to_string(),
            found: render(raw),
        }
    }

    /// Prefixes the reported value with its position inside a list.
    fn at(self, index: usize) -> Self {
        Self {
            expected: self.expected,
            found: format!("[{index}] {}", self.found),
        }
    }
}

fn render(raw: &Value) -> String {
    let text = raw.to_string();
    if text.chars().count() <= MAX_REPORTED_VALUE {
        return text;
    }
    let mut short: String = text.chars().take(MAX_REPORTED_VALUE).collect();
    short.push('…');
    short
}

/// A Rust type that can hold a model property.
pub trait Coerce: Sized + Clone + Send + Sync + 'static {
    /// The declared type reported in descriptors and schemas.
    fn field_type() -> FieldType;

    /// Converts an external JSON or string value.
    fn coerce(raw: &Value) -> Result<Self, CoercionFailure>;

    /// Renders the value as JSON.
    fn to_json(&self) -> Value;
}

fn parse_bool(raw: &Value) -> Option<bool> {
    match raw {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_i64() {
            Some(1) => Some(true),
            Some(0) => Some(false),
            _ => None,
        },
        Value::String(s) => {
            let s = s.trim();
            if s == "1" || s.eq_ignore_ascii_case("true") {
                Some(true)
            } else if s == "0" || s.eq_ignore_ascii_case("false") {
                Some(false)
            } else {
                None
            }
        }
        _ => None,
    }
}

fn parse_integer(raw: &Value) -> Option<i128> {
    match raw {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(i.into())
            } else if let Some(u) = n.as_u64() {
                Some(u.into())
            } else {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0 && f.abs() < 1e38)
                    .map(|f| f as i128)
            }
        }
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn parse_float(raw: &Value) -> Option<f64> {
    match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn parse_text(raw: &Value) -> Option<String> {
    match raw {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn is_blank(raw: &Value) -> bool {
    raw.as_str().is_some_and(|s| s.trim().is_empty())
}

fn list_items(raw: &Value) -> Option<Cow<'_, [Value]>> {
    match raw {
        Value::Array(items) => Some(Cow::Borrowed(items.as_slice())),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                Some(Cow::Owned(Vec::new()))
            } else if s.starts_with('[') {
                match serde_json::from_str(s).ok()? {
                    Value::Array(items) => Some(Cow::Owned(items)),
                    _ => None,
                }
            } else {
                Some(Cow::Owned(
                    s.split(',')
                        .map(|part| Value::String(part.trim().to_owned()))
                        .collect(),
                ))
            }
        }
        _ => None,
    }
}

fn object_of(raw: &Value) -> Option<Cow<'_, Map<String, Value>>> {
    match raw {
        Value::Object(map) => Some(Cow::Borrowed(map)),
        Value::String(s) => match serde_json::from_str(s.trim()).ok()? {
            Value::Object(map) => Some(Cow::Owned(map)),
            _ => None,
        },
        _ => None,
    }
}

fn integer_value(n: i128) -> Option<Value> {
    i64::try_from(n)
        .map(Value::from)
        .ok()
        .or_else(|| u64::try_from(n).ok().map(Value::from))
}

/// JSON numbers cannot hold NaN or infinities; those render as `NaN`,
/// `inf` and `-inf`, which [`parse_float`] reads back.
fn float_value(f: f64) -> Value {
    Number::from_f64(f).map_or_else(|| Value::String(f.to_string()), Value::Number)
}

impl Coerce for bool {
    fn field_type() -> FieldType {
        FieldType::Bool
    }

    fn coerce(raw: &Value) -> Result<Self, CoercionFailure> {
        parse_bool(raw).ok_or_else(|| CoercionFailure::new(&FieldType::Bool, raw))
    }

    fn to_json(&self) -> Value {
        Value::Bool(*self)
    }
}

macro_rules! coerce_integer {
    ($($ty:ty),* $(,)?) => {$(
        impl Coerce for $ty {
            fn field_type() -> FieldType {
                FieldType::Integer
            }

            fn coerce(raw: &Value) -> Result<Self, CoercionFailure> {
                parse_integer(raw)
                    .and_then(|n| <$ty>::try_from(n).ok())
                    .ok_or_else(|| CoercionFailure::new(&FieldType::Integer, raw))
            }

            fn to_json(&self) -> Value {
                Value::from(*self)
            }
        }
    )*};
}

coerce_integer!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl Coerce for f64 {
    fn field_type() -> FieldType {
        FieldType::Float
    }

    fn coerce(raw: &Value) -> Result<Self, CoercionFailure> {
        parse_float(raw).ok_or_else(|| CoercionFailure::new(&FieldType::Float, raw))
    }

    fn to_json(&self) -> Value {
        float_value(*self)
    }
}

impl Coerce for f32 {
    fn field_type() -> FieldType {
        FieldType::Float
    }

    fn coerce(raw: &Value) -> Result<Self, CoercionFailure> {
        parse_float(raw)
            .filter(|f| !f.is_finite() || f.abs() <= f64::from(f32::MAX))
            .map(|f| f as f32)
            .ok_or_else(|| CoercionFailure::new(&FieldType::Float, raw))
    }

    fn to_json(&self) -> Value {
        float_value(f64::from(*self))
    }
}

impl Coerce for String {
    fn field_type() -> FieldType {
        FieldType::Text
    }

    fn coerce(raw: &Value) -> Result<Self, CoercionFailure> {
        parse_text(raw).ok_or_else(|| CoercionFailure::new(&FieldType::Text, raw))
    }

    fn to_json(&self) -> Value {
        Value::String(self.clone())
    }
}

impl Coerce for NaiveDate {
    fn field_type() -> FieldType {
        FieldType::Date
    }

    fn coerce(raw: &Value) -> Result<Self, CoercionFailure> {
        raw.as_str()
            .and_then(|s| NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).ok())
            .ok_or_else(|| CoercionFailure::new(&FieldType::Date, raw))
    }

    fn to_json(&self) -> Value {
        Value::String(self.format(DATE_FORMAT).to_string())
    }
}

impl Coerce for NaiveDateTime {
    fn field_type() -> FieldType {
        FieldType::DateTime
    }

    fn coerce(raw: &Value) -> Result<Self, CoercionFailure> {
        raw.as_str()
            .and_then(|s| NaiveDateTime::parse_from_str(s.trim(), DATETIME_FORMAT).ok())
            .ok_or_else(|| CoercionFailure::new(&FieldType::DateTime, raw))
    }

    fn to_json(&self) -> Value {
        Value::String(self.format(DATETIME_FORMAT).to_string())
    }
}

impl Coerce for Value {
    fn field_type() -> FieldType {
        FieldType::Json
    }

    fn coerce(raw: &Value) -> Result<Self, CoercionFailure> {
        Ok(raw.clone())
    }

    fn to_json(&self) -> Value {
        self.clone()
    }
}

impl<T: Coerce> Coerce for Option<T> {
    fn field_type() -> FieldType {
        FieldType::optional(T::field_type())
    }

    fn coerce(raw: &Value) -> Result<Self, CoercionFailure> {
        if raw.is_null() {
            return Ok(None);
        }
        match T::coerce(raw) {
            Ok(value) => Ok(Some(value)),
            Err(_) if is_blank(raw) => Ok(None),
            Err(failure) => Err(failure),
        }
    }

    fn to_json(&self) -> Value {
        self.as_ref().map_or(Value::Null, T::to_json)
    }
}

impl<T: Coerce> Coerce for Vec<T> {
    fn field_type() -> FieldType {
        FieldType::list(T::field_type())
    }

    fn coerce(raw: &Value) -> Result<Self, CoercionFailure> {
        let items =
            list_items(raw).ok_or_else(|| CoercionFailure::new(&Self::field_type(), raw))?;
        items
            .iter()
            .enumerate()
            .map(|(index, item)| T::coerce(item).map_err(|failure| failure.at(index)))
            .collect()
    }

    fn to_json(&self) -> Value {
        Value::Array(self.iter().map(T::to_json).collect())
    }
}

impl<M: Model> Coerce for M {
    fn field_type() -> FieldType {
        FieldType::model(M::model_name())
    }

    fn coerce(raw: &Value) -> Result<Self, CoercionFailure> {
        let object =
            object_of(raw).ok_or_else(|| CoercionFailure::new(&Self::field_type(), raw))?;
        marshal::try_from_json(&object).map_err(|err| CoercionFailure {
            expected: Self::field_type().to_string(),
            found: err.to_string(),
        })
    }

    fn to_json(&self) -> Value {
        Value::Object(marshal::to_json(self, None))
    }
}

/// An enumeration addressed by variant name.
///
/// Enums get [`Coerce`] through [`coerce_enum`], [`enum_to_json`] and
/// [`enum_type`]:
///
/// ```
/// use serde_json::{json, Value};
/// use tessera_model::coerce::{coerce_enum, enum_to_json, enum_type};
/// use tessera_model::{Coerce, CoercionFailure, FieldType, NamedEnum};
///
/// #[derive(Debug, Clone, Copy, PartialEq)]
/// enum Level {
///     Low,
///     High,
/// }
///
/// impl NamedEnum for Level {
///     const VARIANTS: &'static [(&'static str, Self)] =
///         &[("low", Level::Low), ("high", Level::High)];
/// }
///
/// impl Coerce for Level {
///     fn field_type() -> FieldType { enum_type::<Self>() }
///     fn coerce(raw: &Value) -> Result<Self, CoercionFailure> { coerce_enum(raw) }
///     fn to_json(&self) -> Value { enum_to_json(self) }
/// }
///
/// assert_eq!(Level::coerce(&json!("HIGH")), Ok(Level::High));
/// ```
pub trait NamedEnum: Copy + PartialEq + Send + Sync + 'static {
    const VARIANTS: &'static [(&'static str, Self)];

    fn variant_name(&self) -> &'static str {
        Self::VARIANTS
            .iter()
            .find(|(_, variant)| variant == self)
            .map_or("", |(name, _)| *name)
    }
}

/// Declared type of a [`NamedEnum`].
pub fn enum_type<E: NamedEnum>() -> FieldType {
    FieldType::Enum {
        variants: E::VARIANTS
            .iter()
            .map(|(name, _)| (*name).to_owned())
            .collect(),
    }
}

/// Looks a variant up by name: exact match first, then ASCII case-insensitive.
pub fn coerce_enum<E: NamedEnum>(raw: &Value) -> Result<E, CoercionFailure> {
    raw.as_str()
        .map(str::trim)
        .and_then(|name| {
            E::VARIANTS
                .iter()
                .find(|(variant, _)| *variant == name)
                .or_else(|| {
                    E::VARIANTS
                        .iter()
                        .find(|(variant, _)| variant.eq_ignore_ascii_case(name))
                })
        })
        .map(|(_, value)| *value)
        .ok_or_else(|| CoercionFailure::new(&enum_type::<E>(), raw))
}

/// Renders a [`NamedEnum`] as its variant name.
pub fn enum_to_json<E: NamedEnum>(value: &E) -> Value {
    Value::String(value.variant_name().to_owned())
}

/// Coerces `raw` to the canonical JSON form of `target` without a Rust type.
///
/// Nested models are only checked to be objects; they are materialized by
/// the typed path.
pub fn coerce_value(raw: &Value, target: &FieldType) -> Result<Value, CoercionFailure> {
    let fail = || CoercionFailure::new(target, raw);
    match target {
        FieldType::Bool => parse_bool(raw).map(Value::Bool).ok_or_else(fail),
        FieldType::Integer => parse_integer(raw).and_then(integer_value).ok_or_else(fail),
        FieldType::Float => parse_float(raw).map(float_value).ok_or_else(fail),
        FieldType::Text => parse_text(raw).map(Value::String).ok_or_else(fail),
        FieldType::Date => NaiveDate::coerce(raw).map(|date| date.to_json()),
        FieldType::DateTime => NaiveDateTime::coerce(raw).map(|at| at.to_json()),
        FieldType::Enum { variants } => raw
            .as_str()
            .map(str::trim)
            .and_then(|name| {
                variants
                    .iter()
                    .find(|variant| variant.as_str() == name)
                    .or_else(|| variants.iter().find(|v| v.eq_ignore_ascii_case(name)))
            })
            .map(|variant| Value::String(variant.clone()))
            .ok_or_else(fail),
        FieldType::Json => Ok(raw.clone()),
        FieldType::Model { .. } => object_of(raw)
            .map(|object| Value::Object(object.into_owned()))
            .ok_or_else(fail),
        FieldType::List { item } => {
            let items = list_items(raw).ok_or_else(fail)?;
            items
                .iter()
                .enumerate()
                .map(|(index, value)| coerce_value(value, item).map_err(|f| f.at(index)))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array)
        }
        FieldType::Optional { .. } if raw.is_null() => Ok(Value::Null),
        FieldType::Optional { inner } => match coerce_value(raw, inner) {
            Err(_) if is_blank(raw) => Ok(Value::Null),
            result => result,
        },
    }
}
