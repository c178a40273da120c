pub mod date_utils;

pub use date_utils::{DayOfWeek, VeraDate, VeraDateUtilsError, VeraWeek, VeraWeekIterator};

/// Derives `From<&T>` for a type built purely from `T`'s fields, mirroring the
/// boilerplate `TryFrom<&XDb>` conversions used across the DAO layer.
#[macro_export]
macro_rules! derive_from_reference {
    ($target:ty, $source:ty, $body:expr) => {
        impl From<&$source> for $target {
            fn from(value: &$source) -> Self {
                #[allow(clippy::redundant_closure_call)]
                $body(value)
            }
        }
    };
}

#[cfg(test)]
mod tests {
    #[derive(Debug, Clone)]
    struct Source {
        value: u32,
    }

    #[derive(Debug, PartialEq, Eq)]
    struct Target {
        value: u32,
    }

    derive_from_reference!(Target, Source, |s: &Source| Target { value: s.value });

    #[test]
    fn test_derive_from_reference() {
        let source = Source { value: 42 };
        let target: Target = (&source).into();
        assert_eq!(target, Target { value: 42 });
    }
}
