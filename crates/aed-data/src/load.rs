use std::fmt;

/// A failed external load.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("failed to load {origin}: {message}")]
pub struct LoadError {
    /// What was being loaded, usually a file path.
    pub origin: String,
    pub message: String,
}

impl LoadError {
    #[must_use]
    pub fn new(origin: impl Into<String>, message: impl fmt::Display) -> Self {
        Self {
            origin: origin.into(),
            message: message.to_string(),
        }
    }
}

/// Progress of an external load.
///
/// A failed load is distinct from a successful load of empty data.
#[derive(Debug, Clone, PartialEq, derive_more::IsVariant)]
pub enum LoadState<T> {
    Pending,
    Loaded(T),
    Failed(LoadError),
}

impl<T> Default for LoadState<T> {
    fn default() -> Self {
        Self::Pending
    }
}

impl<T> LoadState<T> {
    /// Resolves a load from its result.
    ///
    /// # Examples
    ///
    /// ```
    /// use aed_data::load::LoadState;
    ///
    /// let state = LoadState::from_result("counties.json", "x".parse::<u32>());
    /// assert!(state.is_failed());
    /// assert!(state.error().unwrap().to_string().starts_with("failed to load counties.json"));
    /// ```
    pub fn from_result<E>(origin: impl Into<String>, result: Result<T, E>) -> Self
    where
        E: fmt::Display,
    {
        match result {
            Ok(value) => Self::Loaded(value),
            Err(e) => {
                let error = LoadError::new(origin, e);
                log::warn!("{error}");
                Self::Failed(error)
            }
        }
    }

    #[must_use]
    pub fn loaded(&self) -> Option<&T> {
        match self {
            Self::Loaded(value) => Some(value),
            _ => None,
        }
    }

    #[must_use]
    pub fn error(&self) -> Option<&LoadError> {
        match self {
            Self::Failed(error) => Some(error),
            _ => None,
        }
    }
}
