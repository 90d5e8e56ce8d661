//! printf-style entry points.
//!
//! `errorf!(logger, "bad value: {}", 42)` expands to
//! `logger.error(format_args!("bad value: {}", 42))`, so the recorded call
//! site is the line of the macro invocation.

/// Log at `Default` severity with `format!` syntax.
#[macro_export]
macro_rules! defaultf {
    ($logger:expr, $($arg:tt)+) => {
        $logger.default(::core::format_args!($($arg)+))
    };
}

/// Log at `Debug` severity with `format!` syntax.
#[macro_export]
macro_rules! debugf {
    ($logger:expr, $($arg:tt)+) => {
        $logger.debug(::core::format_args!($($arg)+))
    };
}

/// Log at `Info` severity with `format!` syntax.
#[macro_export]
macro_rules! infof {
    ($logger:expr, $($arg:tt)+) => {
        $logger.info(::core::format_args!($($arg)+))
    };
}

/// Log at `Notice` severity with `format!` syntax.
#[macro_export]
macro_rules! noticef {
    ($logger:expr, $($arg:tt)+) => {
        $logger.notice(::core::format_args!($($arg)+))
    };
}

/// Log at `Warning` severity with `format!` syntax.
#[macro_export]
macro_rules! warningf {
    ($logger:expr, $($arg:tt)+) => {
        $logger.warning(::core::format_args!($($arg)+))
    };
}

/// Log at `Error` severity with `format!` syntax.
#[macro_export]
macro_rules! errorf {
    ($logger:expr, $($arg:tt)+) => {
        $logger.error(::core::format_args!($($arg)+))
    };
}

/// Log at `Critical` severity with `format!` syntax.
#[macro_export]
macro_rules! criticalf {
    ($logger:expr, $($arg:tt)+) => {
        $logger.critical(::core::format_args!($($arg)+))
    };
}

/// Log at `Alert` severity with `format!` syntax.
#[macro_export]
macro_rules! alertf {
    ($logger:expr, $($arg:tt)+) => {
        $logger.alert(::core::format_args!($($arg)+))
    };
}

/// Log at `Emergency` severity with `format!` syntax.
#[macro_export]
macro_rules! emergencyf {
    ($logger:expr, $($arg:tt)+) => {
        $logger.emergency(::core::format_args!($($arg)+))
    };
}
