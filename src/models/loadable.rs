/// Held copy of a server resource.
///
/// `Loaded(vec![])` means the server answered with nothing; `NotLoaded` means
/// no fetch has succeeded yet.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Loadable<T> {
    #[default]
    NotLoaded,
    Loaded(T),
}

impl<T> Loadable<T> {
    pub fn is_loaded(&self) -> bool {
        matches!(self, Loadable::Loaded(_))
    }

    pub fn as_ref(&self) -> Option<&T> {
        match self {
            Loadable::Loaded(value) => Some(value),
            Loadable::NotLoaded => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loadable_defaults_to_not_loaded() {
        let value: Loadable<Vec<u32>> = Loadable::default();
        assert!(!value.is_loaded());
        assert!(value.as_ref().is_none());
    }

    #[test]
    fn empty_load_is_distinct_from_not_loaded() {
        let empty: Loadable<Vec<u32>> = Loadable::Loaded(Vec::new());
        assert!(empty.is_loaded());
        assert_ne!(empty, Loadable::NotLoaded);
        assert_eq!(empty.as_ref().map(Vec::len), Some(0));
    }
}
