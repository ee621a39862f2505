//! Canonical logging macros
//!
//! Every check entry point brackets its work with a start event and either an
//! end or an end_error event carrying the same `op` value.

/// Log the start of an operation
///
/// # Example
///
/// ```
/// # use apicompat_core::log_op_start;
/// log_op_start!("check_compatibility");
/// log_op_start!("check_compatibility", mode = "current");
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = apicompat_core_types::schema::EVENT_START,
        );
    };
    ($op:expr, $($field:tt)*) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = apicompat_core_types::schema::EVENT_START,
            $($field)*
        );
    };
}

/// Log the successful end of an operation
///
/// # Example
///
/// ```
/// # use apicompat_core::log_op_end;
/// log_op_end!("check_compatibility", duration_ms = 3, diff_count = 2);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = apicompat_core_types::schema::EVENT_END,
            duration_ms = $duration,
        );
    };
    ($op:expr, duration_ms = $duration:expr, $($field:tt)*) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = apicompat_core_types::schema::EVENT_END,
            duration_ms = $duration,
            $($field)*
        );
    };
}

/// Log an operation error
///
/// The error is converted into [`ApiError`](crate::errors::ApiError) so the
/// stable code is always present on the event.
///
/// # Example
///
/// ```
/// # use apicompat_core::{log_op_error, errors::{ApiError, ApiErrorKind}};
/// let err = ApiError::new(ApiErrorKind::UnknownIssue).with_message("Unknown issue id: --hide Foo");
/// log_op_error!("build_config", err, duration_ms = 0);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr) => {{
        use $crate::errors::ApiError;
        let api_err: ApiError = $err.into();
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = apicompat_core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err_kind = ?api_err.kind(),
            err_code = api_err.code(),
        );
    }};
    ($op:expr, $err:expr, duration_ms = $duration:expr, $($field:tt)*) => {{
        use $crate::errors::ApiError;
        let api_err: ApiError = $err.into();
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = apicompat_core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err_kind = ?api_err.kind(),
            err_code = api_err.code(),
            $($field)*
        );
    }};
}
