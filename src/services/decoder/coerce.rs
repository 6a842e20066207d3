//! Text-to-typed-value coercion rules.
//!
//! Scalars are parsed from the text as-is. Non-scalar fields are decoded from JSON:
//! lists require text starting with `[`, maps require text starting with `{` and are
//! decoded entry by entry, nested objects accept either. Any other text for a
//! non-scalar field has no conversion rule.

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::{
	collections::{BTreeMap, HashMap},
	hash::Hash,
};
use thiserror::Error as ThisError;

/// Failure of a single coercion, without knowledge of the record or field
#[derive(ThisError, Debug)]
pub enum CoerceError {
	/// The text has a shape no rule of the target type accepts
	#[error("no conversion rule for {target}")]
	NoRule { target: &'static str },

	/// A rule applied but the text is not a valid value
	#[error("invalid {target}: {reason}")]
	Invalid { target: &'static str, reason: String },
}

impl CoerceError {
	fn invalid<T: ?Sized, R: ToString>(reason: R) -> Self {
		Self::Invalid {
			target: std::any::type_name::<T>(),
			reason: reason.to_string(),
		}
	}

	fn no_rule<T>() -> Self {
		Self::NoRule {
			target: std::any::type_name::<T>(),
		}
	}
}

/// A field value that can be produced from raw cell text
pub trait Coerce: Sized {
	fn coerce(raw: &str) -> Result<Self, CoerceError>;
}

impl Coerce for String {
	fn coerce(raw: &str) -> Result<Self, CoerceError> {
		Ok(raw.to_string())
	}
}

macro_rules! impl_parse_coerce {
	($($ty:ty),*) => {
		$(
			impl Coerce for $ty {
				fn coerce(raw: &str) -> Result<Self, CoerceError> {
					raw.parse::<$ty>().map_err(CoerceError::invalid::<$ty, _>)
				}
			}
		)*
	}
}

impl_parse_coerce!(i8, i16, i32, i64, u8, u16, u32, u64, f32, f64);

impl Coerce for bool {
	fn coerce(raw: &str) -> Result<Self, CoerceError> {
		if raw.eq_ignore_ascii_case("true") {
			Ok(true)
		} else if raw.eq_ignore_ascii_case("false") {
			Ok(false)
		} else {
			Err(CoerceError::invalid::<bool, _>(format!(
				"expected true or false, found {:?}",
				raw
			)))
		}
	}
}

impl<V: Coerce> Coerce for Option<V> {
	fn coerce(raw: &str) -> Result<Self, CoerceError> {
		V::coerce(raw).map(Some)
	}
}

impl<V: DeserializeOwned> Coerce for Vec<V> {
	fn coerce(raw: &str) -> Result<Self, CoerceError> {
		if raw.starts_with('[') {
			serde_json::from_str(raw).map_err(CoerceError::invalid::<Self, _>)
		} else if raw.starts_with('{') {
			Err(CoerceError::invalid::<Self, _>("expected a JSON array"))
		} else {
			Err(CoerceError::no_rule::<Self>())
		}
	}
}

/// Key types accepted by map fields
pub trait MapKey: Sized {
	fn from_key(raw: &str) -> Result<Self, CoerceError>;
}

impl MapKey for String {
	fn from_key(raw: &str) -> Result<Self, CoerceError> {
		Ok(raw.to_string())
	}
}

macro_rules! impl_integer_key {
	($($ty:ty),*) => {
		$(
			impl MapKey for $ty {
				fn from_key(raw: &str) -> Result<Self, CoerceError> {
					raw.parse::<$ty>().map_err(CoerceError::invalid::<$ty, _>)
				}
			}
		)*
	}
}

impl_integer_key!(i32, i64, u32, u64);

fn map_entries<K, V, M>(raw: &str) -> Result<M, CoerceError>
where
	K: MapKey,
	V: DeserializeOwned,
	M: FromIterator<(K, V)>,
{
	if raw.starts_with('[') {
		return Err(CoerceError::invalid::<M, _>("expected a JSON object"));
	}
	if !raw.starts_with('{') {
		return Err(CoerceError::no_rule::<M>());
	}

	let entries: serde_json::Map<String, Value> =
		serde_json::from_str(raw).map_err(CoerceError::invalid::<M, _>)?;
	entries
		.into_iter()
		.map(|(key, value)| Ok((K::from_key(&key)?, entry_value::<V>(value)?)))
		.collect()
}

/// Decodes one map value.
///
/// A string value holding a JSON document is parsed once more, so a cell may
/// carry either `{"1":{"id":1}}` or `{"1":"{\"id\":1}"}`.
fn entry_value<V: DeserializeOwned>(value: Value) -> Result<V, CoerceError> {
	let nested = match &value {
		Value::String(text) if text.starts_with('{') || text.starts_with('[') => {
			Some(text.clone())
		}
		_ => None,
	};

	match serde_json::from_value::<V>(value) {
		Ok(decoded) => Ok(decoded),
		Err(err) => match nested {
			Some(text) => serde_json::from_str(&text).map_err(CoerceError::invalid::<V, _>),
			None => Err(CoerceError::invalid::<V, _>(err)),
		},
	}
}

impl<K, V> Coerce for HashMap<K, V>
where
	K: MapKey + Eq + Hash,
	V: DeserializeOwned,
{
	fn coerce(raw: &str) -> Result<Self, CoerceError> {
		map_entries(raw)
	}
}

impl<K, V> Coerce for BTreeMap<K, V>
where
	K: MapKey + Ord,
	V: DeserializeOwned,
{
	fn coerce(raw: &str) -> Result<Self, CoerceError> {
		map_entries(raw)
	}
}

/// Decodes a nested object field from JSON text
pub fn coerce_object<V: DeserializeOwned>(raw: &str) -> Result<V, CoerceError> {
	if raw.starts_with('{') || raw.starts_with('[') {
		serde_json::from_str(raw).map_err(CoerceError::invalid::<V, _>)
	} else {
		Err(CoerceError::no_rule::<V>())
	}
}
