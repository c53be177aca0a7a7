//! Call-site macros capturing file and line information.

/// Emit a record through a [`FemtoScribeHandler`](crate::FemtoScribeHandler),
/// capturing `file!()` and `line!()` at the call site.
///
/// Evaluates to the handler's `Result<(), HandlerError>`.
///
/// ```ignore
/// scribe_emit!(handler, FemtoLevel::Info, "loaded {} objects", count)?;
/// ```
#[macro_export]
macro_rules! scribe_emit {
    ($handler:expr, $level:expr, $($arg:tt)+) => {
        $handler.emit($level, file!(), line!(), format_args!($($arg)+))
    };
}
