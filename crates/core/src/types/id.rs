//! Newtype IDs for type-safe entity references.
//!
//! Two flavours exist:
//! - `define_id!` wraps a database serial (`i32`), used for append-only rows
//!   such as stock log entries.
//! - `define_code!` wraps a human-readable string code (`OBT0001`, `RSP-0001`,
//!   `P-001`) for entities whose identifier is shown to staff.

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around `i32` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`
/// - Conversion methods: `new()`, `as_i32()`
/// - `From<i32>` and `Into<i32>` implementations
/// - `sqlx` `Type`, `Encode`, and `Decode` implementations (with `postgres` feature)
///
/// # Example
///
/// ```rust
/// # use dokterbubung_core::define_id;
/// define_id!(EntryId);
/// define_id!(BatchId);
///
/// let entry_id = EntryId::new(1);
/// let batch_id = BatchId::new(1);
///
/// // These are different types, so this won't compile:
/// // let _: EntryId = batch_id;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(i32);

        impl $name {
            /// Create a new ID from an i32 value.
            #[must_use]
            pub const fn new(id: i32) -> Self {
                Self(id)
            }

            /// Get the underlying i32 value.
            #[must_use]
            pub const fn as_i32(&self) -> i32 {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i32> for $name {
            fn from(id: i32) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        #[cfg(feature = "postgres")]
        impl ::sqlx::Type<::sqlx::Postgres> for $name {
            fn type_info() -> ::sqlx::postgres::PgTypeInfo {
                <i32 as ::sqlx::Type<::sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &::sqlx::postgres::PgTypeInfo) -> bool {
                <i32 as ::sqlx::Type<::sqlx::Postgres>>::compatible(ty)
            }
        }

        #[cfg(feature = "postgres")]
        impl<'r> ::sqlx::Decode<'r, ::sqlx::Postgres> for $name {
            fn decode(
                value: ::sqlx::postgres::PgValueRef<'r>,
            ) -> ::core::result::Result<Self, ::sqlx::error::BoxDynError> {
                let id = <i32 as ::sqlx::Decode<::sqlx::Postgres>>::decode(value)?;
                Ok(Self(id))
            }
        }

        #[cfg(feature = "postgres")]
        impl ::sqlx::Encode<'_, ::sqlx::Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut ::sqlx::postgres::PgArgumentBuffer,
            ) -> ::std::result::Result<::sqlx::encode::IsNull, ::sqlx::error::BoxDynError> {
                <i32 as ::sqlx::Encode<::sqlx::Postgres>>::encode_by_ref(&self.0, buf)
            }
        }
    };
}

/// Macro to define a type-safe string code wrapper.
///
/// Same shape as [`define_id!`] but wraps a `String`, for identifiers that are
/// printed on labels and typed in by staff.
#[macro_export]
macro_rules! define_code {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new code from any string-like value.
            #[must_use]
            pub fn new(code: impl Into<String>) -> Self {
                Self(code.into())
            }

            /// Get the code as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the wrapper and return the inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(code: String) -> Self {
                Self(code)
            }
        }

        impl From<&str> for $name {
            fn from(code: &str) -> Self {
                Self(code.to_owned())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        #[cfg(feature = "postgres")]
        impl ::sqlx::Type<::sqlx::Postgres> for $name {
            fn type_info() -> ::sqlx::postgres::PgTypeInfo {
                <String as ::sqlx::Type<::sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &::sqlx::postgres::PgTypeInfo) -> bool {
                <String as ::sqlx::Type<::sqlx::Postgres>>::compatible(ty)
            }
        }

        #[cfg(feature = "postgres")]
        impl<'r> ::sqlx::Decode<'r, ::sqlx::Postgres> for $name {
            fn decode(
                value: ::sqlx::postgres::PgValueRef<'r>,
            ) -> ::core::result::Result<Self, ::sqlx::error::BoxDynError> {
                let code = <String as ::sqlx::Decode<::sqlx::Postgres>>::decode(value)?;
                Ok(Self(code))
            }
        }

        #[cfg(feature = "postgres")]
        impl ::sqlx::Encode<'_, ::sqlx::Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut ::sqlx::postgres::PgArgumentBuffer,
            ) -> ::std::result::Result<::sqlx::encode::IsNull, ::sqlx::error::BoxDynError> {
                <String as ::sqlx::Encode<::sqlx::Postgres>>::encode_by_ref(&self.0, buf)
            }
        }
    };
}

define_id!(LogId);

define_code!(MedicineId);
define_code!(PrescriptionId);
define_code!(PatientId);

/// The kinds of entity that receive generated codes.
///
/// Each kind owns its own prefix and sequence, so codes never collide across
/// entity types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodeKind {
    Medicine,
    Prescription,
    Patient,
}

impl CodeKind {
    /// Code prefix (`OBT`, `RSP-`, `P-`).
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Medicine => "OBT",
            Self::Prescription => "RSP-",
            Self::Patient => "P-",
        }
    }

    /// Minimum number of digits after the prefix.
    #[must_use]
    pub const fn width(self) -> usize {
        match self {
            Self::Medicine | Self::Prescription => 4,
            Self::Patient => 3,
        }
    }

    /// Name of the backing `PostgreSQL` sequence.
    #[must_use]
    pub const fn sequence_name(self) -> &'static str {
        match self {
            Self::Medicine => "hospital.medicine_code_seq",
            Self::Prescription => "hospital.prescription_code_seq",
            Self::Patient => "hospital.patient_code_seq",
        }
    }

    /// Format a sequence value as a code, e.g. `7` -> `OBT0007`.
    #[must_use]
    pub fn format(self, value: i64) -> String {
        format!("{}{:0width$}", self.prefix(), value, width = self.width())
    }

    /// Timestamp-derived code used when every sequence draw collided.
    #[must_use]
    pub fn fallback(self, unix_millis: i64) -> String {
        format!("{}{unix_millis}", self.prefix())
    }
}

impl std::fmt::Display for CodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Medicine => write!(f, "medicine"),
            Self::Prescription => write!(f, "prescription"),
            Self::Patient => write!(f, "patient"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_format_pads_to_width() {
        assert_eq!(CodeKind::Medicine.format(7), "OBT0007");
        assert_eq!(CodeKind::Prescription.format(12), "RSP-0012");
        assert_eq!(CodeKind::Patient.format(4), "P-004");
    }

    #[test]
    fn test_code_format_grows_past_width() {
        assert_eq!(CodeKind::Patient.format(1234), "P-1234");
    }

    #[test]
    fn test_code_fallback_uses_prefix() {
        assert_eq!(
            CodeKind::Prescription.fallback(1_700_000_000_000),
            "RSP-1700000000000"
        );
    }

    #[test]
    fn test_code_serializes_transparently() {
        let id = MedicineId::new("OBT0001");
        let json = serde_json::to_string(&id).unwrap_or_default();
        assert_eq!(json, "\"OBT0001\"");
    }

    #[test]
    fn test_log_id_display() {
        assert_eq!(LogId::new(42).to_string(), "42");
    }
}
