//! Global logging module for the filter validator
//!
//! Provides thread-safe global logging with per-thread filter context and a
//! macro interface. Nothing is printed until `init_global_logging` is called,
//! so library users opt in.

pub mod codes;
pub mod config;
pub mod events;
pub mod macros;
pub mod service;

use std::cell::RefCell;
use std::sync::{Arc, OnceLock};

pub use codes::Code;
pub use events::{LogEvent, LogLevel};
pub use service::{ConsoleLogger, Logger, LoggingService, MemoryLogger, StructuredLogger};

// ============================================================================
// GLOBAL STATE
// ============================================================================

static GLOBAL_LOGGER: OnceLock<Arc<LoggingService>> = OnceLock::new();

/// Filter currently being processed on this thread
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterContext {
    pub expression: String,
    pub entity: Option<String>,
}

thread_local! {
    static FILTER_CONTEXT: RefCell<Option<FilterContext>> = const { RefCell::new(None) };
}

// ============================================================================
// INITIALIZATION
// ============================================================================

/// Initialize global logging system from runtime preferences
pub fn init_global_logging() -> Result<(), String> {
    config::validate_config().map_err(|e| format!("Configuration validation failed: {}", e))?;

    let logging_service = Arc::new(service::create_configured_service());

    GLOBAL_LOGGER
        .set(logging_service.clone())
        .map_err(|_| "Global logger already initialized".to_string())?;

    logging_service.log_event(LogEvent::success(
        codes::success::SYSTEM_INITIALIZATION_COMPLETED,
        "Global logging system initialized",
    ));

    Ok(())
}

/// Initialize with custom service (primarily for testing)
pub fn init_global_logging_with_service(service: Arc<LoggingService>) -> Result<(), String> {
    GLOBAL_LOGGER
        .set(service)
        .map_err(|_| "Global logger already initialized".to_string())
}

pub fn is_initialized() -> bool {
    GLOBAL_LOGGER.get().is_some()
}

/// Safe access to global logger
pub fn try_get_global_logger() -> Option<&'static LoggingService> {
    GLOBAL_LOGGER.get().map(|service| service.as_ref())
}

// ============================================================================
// FILTER CONTEXT MANAGEMENT
// ============================================================================

pub fn set_filter_context(expression: &str, entity: Option<&str>) {
    FILTER_CONTEXT.with(|ctx| {
        *ctx.borrow_mut() = Some(FilterContext {
            expression: expression.to_string(),
            entity: entity.map(str::to_string),
        });
    });
}

pub fn clear_filter_context() {
    FILTER_CONTEXT.with(|ctx| {
        *ctx.borrow_mut() = None;
    });
}

/// Run `f` with the filter context set, restoring the previous context after
pub fn with_filter_context<F, R>(expression: &str, entity: Option<&str>, f: F) -> R
where
    F: FnOnce() -> R,
{
    let previous = get_current_filter_context();
    set_filter_context(expression, entity);
    let result = f();
    FILTER_CONTEXT.with(|ctx| {
        *ctx.borrow_mut() = previous;
    });
    result
}

pub fn get_current_filter_context() -> Option<FilterContext> {
    FILTER_CONTEXT.with(|ctx| ctx.borrow().clone())
}

fn attach_filter_context(event: LogEvent) -> LogEvent {
    if !config::include_filter_context() {
        return event;
    }
    match get_current_filter_context() {
        Some(ctx) => {
            let event = event.with_filter(&ctx.expression);
            match ctx.entity {
                Some(entity) => event.with_context("entity", &entity),
                None => event,
            }
        }
        None => event,
    }
}

// ============================================================================
// MACRO SUPPORT FUNCTIONS
// ============================================================================

/// Send an event to the global logger with the thread's filter context
pub fn log_event_with_filter_context(event: LogEvent) {
    if let Some(logger) = try_get_global_logger() {
        logger.log_event(attach_filter_context(event));
    }
}

/// Used by log_error!
pub fn log_error_with_context(
    code: Code,
    message: &str,
    span: Option<crate::utils::Span>,
    context: Vec<(&str, &str)>,
) {
    let mut event = LogEvent::error(code, message);
    if let Some(s) = span {
        event = event.with_span(s);
    }
    for (key, value) in context {
        event = event.with_context(key, value);
    }
    log_event_with_filter_context(event);
}

/// Used by log_success!
pub fn log_success_with_context(code: Code, message: &str, context: Vec<(&str, &str)>) {
    let mut event = LogEvent::success(code, message);
    for (key, value) in context {
        event = event.with_context(key, value);
    }
    log_event_with_filter_context(event);
}

/// Used by log_info!
pub fn log_info_with_context(message: &str, context: Vec<(&str, &str)>) {
    let mut event = LogEvent::info(message);
    for (key, value) in context {
        event = event.with_context(key, value);
    }
    log_event_with_filter_context(event);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_context_management() {
        assert!(get_current_filter_context().is_none());

        set_filter_context("id eq 1", Some("User"));
        let context = get_current_filter_context().unwrap();
        assert_eq!(context.expression, "id eq 1");
        assert_eq!(context.entity.as_deref(), Some("User"));

        clear_filter_context();
        assert!(get_current_filter_context().is_none());
    }

    #[test]
    fn test_with_filter_context_restores_previous() {
        set_filter_context("outer", None);

        let result = with_filter_context("inner", None, || {
            assert_eq!(get_current_filter_context().unwrap().expression, "inner");
            42
        });

        assert_eq!(result, 42);
        assert_eq!(get_current_filter_context().unwrap().expression, "outer");
        clear_filter_context();
    }

    #[test]
    fn test_attach_filter_context() {
        let event = with_filter_context("email eq 'a'", Some("User"), || {
            attach_filter_context(LogEvent::warning("check"))
        });
        if config::include_filter_context() {
            assert_eq!(event.context.get("filter").map(String::as_str), Some("email eq 'a'"));
            assert_eq!(event.context.get("entity").map(String::as_str), Some("User"));
        } else {
            assert!(event.context.is_empty());
        }
    }
}
