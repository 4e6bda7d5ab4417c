use odata_filter::config::runtime::{LexicalPreferences, LogLevel as PreferredLevel, LoggingPreferences};
use odata_filter::lexical::tokenize_with_preferences;
use odata_filter::logging::{self, codes, service::create_test_service, LogLevel};
use odata_filter::{EntityModel, FilterValidator};

// Global logger state is per process, so everything runs in one test.
#[test]
fn validation_events_reach_the_installed_logger() {
    logging::config::init_runtime_preferences(LoggingPreferences {
        use_structured_logging: false,
        min_log_level: PreferredLevel::Debug,
        include_filter_context: true,
    })
    .unwrap();

    let (service, memory) = create_test_service(LogLevel::Debug);
    logging::init_global_logging_with_service(std::sync::Arc::new(service)).unwrap();
    assert!(logging::is_initialized());

    let model = EntityModel::builder("User")
        .structured("User", |t| t.property("email", "Edm.String").property("type", "Edm.String"))
        .build()
        .unwrap();

    let failed = FilterValidator::new("email eq 'a' and type eq 'b'", "and:2", &model).unwrap();
    assert!(!failed.passed());
    assert_eq!(
        memory
            .get_events_with_code(codes::validation::VALIDATION_FAILED)
            .len(),
        1
    );

    let built = memory.get_events_with_code(codes::success::TREE_BUILT);
    assert_eq!(built.len(), 1);
    assert_eq!(
        built[0].context.get("filter").map(String::as_str),
        Some("email eq 'a' and type eq 'b'")
    );
    assert_eq!(built[0].context.get("entity").map(String::as_str), Some("User"));

    memory.clear();
    let passed = FilterValidator::new("email eq 'a'", "eq:1", &model).unwrap();
    assert!(passed.passed());
    assert!(memory.has_success_with_code(codes::success::VALIDATION_PASSED));
    assert!(memory.get_events_with_code(codes::validation::VALIDATION_FAILED).is_empty());

    memory.clear();
    assert!(FilterValidator::new("email eq", "eq", &model).is_err());
    assert!(!memory.get_errors().is_empty());

    let stream = tokenize_with_preferences(
        "email eq 'a'",
        LexicalPreferences {
            track_operator_patterns: true,
            log_tokens: true,
        },
    )
    .unwrap();
    assert_eq!(stream.len(), 3);
}
