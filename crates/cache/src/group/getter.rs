//! Loader capability invoked on cache misses

use crate::errors::BoxError;
use std::fmt;

/// Produces the value for a key when no cache holds it
pub trait Getter: Send + Sync {
    fn get(&self, key: &str) -> Result<Vec<u8>, BoxError>;
}

/// Adapts a function value into a [`Getter`]
pub struct GetterFunc<F> {
    f: F,
}

impl<F> GetterFunc<F>
where
    F: Fn(&str) -> Result<Vec<u8>, BoxError> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> Getter for GetterFunc<F>
where
    F: Fn(&str) -> Result<Vec<u8>, BoxError> + Send + Sync,
{
    fn get(&self, key: &str) -> Result<Vec<u8>, BoxError> {
        (self.f)(key)
    }
}

impl<F> fmt::Debug for GetterFunc<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("GetterFunc")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_getter_func() {
        let getter = GetterFunc::new(|key| Ok(key.as_bytes().to_vec()));
        assert_eq!(getter.get("key").unwrap(), b"key".to_vec());
    }

    #[test]
    fn test_getter_func_error() {
        let getter = GetterFunc::new(|key| Err(format!("{key} not exist").into()));
        let err = getter.get("Unknown").unwrap_err();
        assert_eq!(err.to_string(), "Unknown not exist");
    }
}
