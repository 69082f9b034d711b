use crate::error::Result;
use serde::Serialize;

/// Ordered list of free-form strings, such as firmware paths.
///
/// Entries keep their insertion order and duplicates are preserved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct StringValues {
    values: Vec<String>,
}

impl StringValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends each value in order.
    ///
    /// Fails with [`Error::Allocation`](crate::Error::Allocation) if a copy
    /// cannot be allocated. Values appended before the failure stay in the
    /// list.
    pub fn append<I, S>(&mut self, values: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for value in values {
            let value = value.as_ref();
            self.values.try_reserve(1)?;
            let mut owned = String::new();
            owned.try_reserve_exact(value.len())?;
            owned.push_str(value);
            self.values.push(owned);
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.values
    }
}
