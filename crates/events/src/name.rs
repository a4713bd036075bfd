//! Event names.

use std::borrow::{Borrow, Cow};
use std::hash::{Hash, Hasher};

use crate::error::EventNameError;

/// Name of a category of occurrence, e.g. `"user.updated"`.
///
/// Names are case-sensitive and compared for exact equality. The convention is
/// `"<domain>.<verb>"` but nothing here enforces it; an empty name is the only
/// value rejected.
#[derive(Debug, Clone)]
pub struct EventName(Cow<'static, str>);

impl EventName {
    /// Build a name from owned or borrowed text, rejecting the empty string.
    pub fn new(name: impl Into<Cow<'static, str>>) -> Result<Self, EventNameError> {
        let name = name.into();
        if name.is_empty() {
            return Err(EventNameError::Empty);
        }
        Ok(Self(name))
    }

    /// Build a name from a string literal.
    ///
    /// # Panics
    ///
    /// Panics if `name` is empty. In a `const` item this is a compile error.
    pub const fn from_static(name: &'static str) -> Self {
        assert!(!name.is_empty(), "event name must not be empty");
        Self(Cow::Borrowed(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl PartialEq for EventName {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for EventName {}

// Must hash exactly like `str` so map lookups through `Borrow<str>` agree.
impl Hash for EventName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_str().hash(state);
    }
}

impl Borrow<str> for EventName {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl AsRef<str> for EventName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl core::fmt::Display for EventName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for EventName {
    type Error = EventNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&'static str> for EventName {
    type Error = EventNameError;

    fn try_from(value: &'static str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}
