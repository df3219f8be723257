//! Structured logging helpers.
//!
//! Every line carries consistent fields so log aggregation can filter on them:
//! - `subsystem`: pipeline component (renderer, transport, status-tracker, ...)
//! - `declaration_id`: the declaration being processed, when there is one
//! - Additional context fields

/// Log with the `subsystem` field attached.
#[macro_export]
macro_rules! log_event {
    (info, $subsystem:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::info!(
            subsystem = $subsystem,
            $($($field)*,)?
            $msg
        )
    };

    (warn, $subsystem:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::warn!(
            subsystem = $subsystem,
            $($($field)*,)?
            $msg
        )
    };

    (error, $subsystem:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::error!(
            subsystem = $subsystem,
            $($($field)*,)?
            $msg
        )
    };

    (debug, $subsystem:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::debug!(
            subsystem = $subsystem,
            $($($field)*,)?
            $msg
        )
    };
}

/// Log a declaration-related event with standard fields.
#[macro_export]
macro_rules! log_declaration_event {
    ($level:ident, $subsystem:expr, $msg:expr, $declaration_id:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            subsystem = $subsystem,
            declaration_id = %$declaration_id,
            $($($field)*,)?
            $msg
        )
    };
}
