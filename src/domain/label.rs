use std::{fmt, ops::Deref, str::FromStr};

use non_empty_string::NonEmptyString;

/// Error returned when a classification label is constructed from an empty
/// string.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Invalid {axis} label: must be non-empty")]
pub struct InvalidLabelError {
    axis: &'static str,
}

impl InvalidLabelError {
    /// The classification axis the label was meant for (e.g. `"status"`).
    #[must_use]
    pub const fn axis(&self) -> &'static str {
        self.axis
    }
}

/// Declares an opaque, non-empty classification token.
///
/// The legal value set of each axis is owned by whoever operates the registry,
/// so the tokens carry whatever label they were given. Each axis still gets
/// its own type so that a stage can never be stored where a status belongs.
macro_rules! label {
    ($(#[$meta:meta])* $name:ident, $axis:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
        #[derive(serde::Serialize, serde::Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(NonEmptyString);

        impl $name {
            /// Creates a new label.
            ///
            /// # Errors
            ///
            /// Returns [`InvalidLabelError`] if the string is empty.
            pub fn new(label: String) -> Result<Self, InvalidLabelError> {
                NonEmptyString::new(label)
                    .map(Self)
                    .map_err(|_| InvalidLabelError { axis: $axis })
            }

            /// Returns the string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                self.0.as_str()
            }
        }

        impl TryFrom<String> for $name {
            type Error = InvalidLabelError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = InvalidLabelError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                Self::new(value.to_string())
            }
        }

        impl FromStr for $name {
            type Err = InvalidLabelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s.to_string())
            }
        }

        impl From<$name> for String {
            fn from(label: $name) -> Self {
                label.as_str().to_owned()
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.0.as_str()
            }
        }

        impl Deref for $name {
            type Target = str;

            fn deref(&self) -> &Self::Target {
                self.0.as_str()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str(self.0.as_str())
            }
        }
    };
}

label!(
    /// The overall state of a case ("Estado").
    Status,
    "status"
);

label!(
    /// The hypothesis under which a case is classified ("Hipotese").
    Hypothesis,
    "hypothesis"
);

label!(
    /// The service group handling the requester ("GrupoAtendimento").
    ServiceGroup,
    "service group"
);

label!(
    /// The workflow stage a case is in ("Etapa").
    Stage,
    "stage"
);

label!(
    /// The status of the administrative process ("StatusProcesso").
    ///
    /// Tracked independently of [`Status`].
    ProcessStatus,
    "process status"
);
