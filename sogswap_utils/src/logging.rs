/// Panics in debug builds, logs an error in release builds.
///
/// Used for conditions that can only be reached through a programming error.
#[macro_export]
macro_rules! debug_panic {
    ($($arg:tt)*) => {
        if cfg!(debug_assertions) {
            panic!($($arg)*);
        } else {
            ::sogswap_utils::tracing::error!($($arg)*);
        }
    };
}
