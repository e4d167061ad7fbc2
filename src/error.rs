/// Returned by lookups and removals of a key the map does not contain.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct KeyNotFound {
    /// The key that was asked for.
    pub key: i64,
}

impl std::fmt::Display for KeyNotFound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "key {} was not found in the map", self.key)
    }
}

impl std::error::Error for KeyNotFound {}

/// Map result
pub type Result<T> = std::result::Result<T, KeyNotFound>;
