//! Label conversions for fieldless enums
//!
//! Several SDK enums travel as short lowercase labels: the environment mode in
//! config files and env vars, error kinds in log fields. This macro keeps the
//! `Display`/`FromStr` pair for those enums in one place.
//!
//! # Example
//!
//! ```rust
//! use tourist_esim_domain::impl_label_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Region {
//!     Europe,
//!     Asia,
//! }
//!
//! impl_label_conversions!(Region {
//!     Europe => "europe",
//!     Asia => "asia",
//! });
//!
//! assert_eq!(Region::Asia.to_string(), "asia");
//! assert_eq!("EUROPE".parse::<Region>(), Ok(Region::Europe));
//! ```

/// Implements `Display` and case-insensitive `FromStr` for a fieldless enum
///
/// Parsing trims surrounding whitespace and ignores case. Unknown labels are
/// rejected with a message naming the enum and the offending input.
#[macro_export]
macro_rules! impl_label_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl $enum_name {
            /// Stable lowercase label for this variant.
            #[must_use]
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $str,)+
                }
            }
        }

        impl ::std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}
