//! Logging shims.
//!
//! With the `defmt` feature enabled the macros forward to the matching `defmt`
//! macro. Without it they only type-check their arguments and emit nothing, so
//! format strings must stick to the `{}` / `{:?}` subset both sides accept.
#![allow(unused_macros)]

macro_rules! log_trace {
    ($($arg:tt)*) => {{
        #[cfg(feature = "defmt")]
        defmt::trace!($($arg)*);
        #[cfg(not(feature = "defmt"))]
        let _ = format_args!($($arg)*);
    }};
}

macro_rules! log_debug {
    ($($arg:tt)*) => {{
        #[cfg(feature = "defmt")]
        defmt::debug!($($arg)*);
        #[cfg(not(feature = "defmt"))]
        let _ = format_args!($($arg)*);
    }};
}

macro_rules! log_info {
    ($($arg:tt)*) => {{
        #[cfg(feature = "defmt")]
        defmt::info!($($arg)*);
        #[cfg(not(feature = "defmt"))]
        let _ = format_args!($($arg)*);
    }};
}

macro_rules! log_warn {
    ($($arg:tt)*) => {{
        #[cfg(feature = "defmt")]
        defmt::warn!($($arg)*);
        #[cfg(not(feature = "defmt"))]
        let _ = format_args!($($arg)*);
    }};
}

macro_rules! log_error {
    ($($arg:tt)*) => {{
        #[cfg(feature = "defmt")]
        defmt::error!($($arg)*);
        #[cfg(not(feature = "defmt"))]
        let _ = format_args!($($arg)*);
    }};
}
