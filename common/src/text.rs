//! Macros for defining validated text types.

/// Macro for defining a non-empty, trimmed text type with a maximum length.
///
/// # Example
///
/// ```rust,ignore
/// use common::define_text;
///
/// define_text! {
///     #[doc = "Manufacturer of a vehicle."]
///     struct Make(max_len = 64);
/// }
/// ```
#[macro_export]
macro_rules! define_text {
    (
        #[doc = $doc:literal]
        struct $name:ident(max_len = $max_len:literal);
    ) => {
        #[derive(
            Clone,
            Debug,
            Eq,
            Hash,
            Ord,
            PartialEq,
            PartialOrd,
            $crate::private::serde::Deserialize,
            $crate::private::serde::Serialize,
        )]
        #[cfg_attr(
            feature = "postgres",
            derive(
                $crate::private::postgres_types::FromSql,
                $crate::private::postgres_types::ToSql,
            ),
            postgres(transparent),
        )]
        #[doc = $doc]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Maximum length of this text in bytes.
            pub const MAX_LEN: usize = $max_len;

            #[doc = ::core::concat!(
                "Creates a new [`", ::core::stringify!($name),
                "`] if the given `value` is valid.",
            )]
            #[must_use]
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let value = value.into();
                Self::check(&value).then_some(Self(value))
            }

            /// Checks whether the given `value` is non-empty, has no
            /// surrounding whitespace and fits into [`Self::MAX_LEN`].
            fn check(value: &str) -> bool {
                value.trim() == value
                    && !value.is_empty()
                    && value.len() <= Self::MAX_LEN
            }
        }

        impl ::core::convert::AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(
                &self,
                f: &mut ::core::fmt::Formatter<'_>,
            ) -> ::core::fmt::Result {
                ::core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = &'static str;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s).ok_or(::core::concat!(
                    "invalid `", ::core::stringify!($name), "`",
                ))
            }
        }

        impl ::core::convert::TryFrom<String> for $name {
            type Error = &'static str;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value).ok_or(::core::concat!(
                    "invalid `", ::core::stringify!($name), "`",
                ))
            }
        }

        impl ::core::convert::From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}
