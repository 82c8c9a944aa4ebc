//! Structured log macros.
//!
//! Every line carries a `component` field (`fetch`, `messaging`, `social`,
//! `purchase`, `moderator`, `api`) so JSON logs can be filtered per protocol area.

/// Log an event with a component field.
#[macro_export]
macro_rules! log_event {
    (info, $component:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::info!(
            component = $component,
            $($($field)*,)?
            $msg
        )
    };

    (warn, $component:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::warn!(
            component = $component,
            $($($field)*,)?
            $msg
        )
    };

    (error, $component:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::error!(
            component = $component,
            $($($field)*,)?
            $msg
        )
    };

    (debug, $component:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::debug!(
            component = $component,
            $($($field)*,)?
            $msg
        )
    };
}

/// Log a peer-related event with standard fields.
#[macro_export]
macro_rules! log_peer_event {
    ($level:ident, $component:expr, $msg:expr, $peer:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            component = $component,
            peer = %$peer,
            $($($field)*,)?
            $msg
        )
    };
}

/// Log a content-addressed resource event with standard fields.
#[macro_export]
macro_rules! log_resource_event {
    ($level:ident, $component:expr, $msg:expr, $hash:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            component = $component,
            hash = %$hash,
            $($($field)*,)?
            $msg
        )
    };
}
