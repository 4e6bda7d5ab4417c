// build.rs - TOML-driven compile-time limit generation
use std::env;
use std::fs;
use std::path::Path;

#[derive(serde::Deserialize)]
struct CompileTimeConfig {
    lexical: LexicalLimits,
    syntax: SyntaxLimits,
    rules: RuleLimits,
    logging: LoggingLimits,
}

#[derive(serde::Deserialize)]
struct LexicalLimits {
    max_expression_length: usize,
    max_identifier_length: usize,
    max_string_size: usize,
    max_token_count: usize,
}

#[derive(serde::Deserialize)]
struct SyntaxLimits {
    max_parse_depth: usize,
    max_lambda_depth: usize,
    max_function_arguments: usize,
}

#[derive(serde::Deserialize)]
struct RuleLimits {
    max_rule_count: usize,
    max_rule_text_length: usize,
    max_name_length: usize,
}

#[derive(serde::Deserialize)]
struct LoggingLimits {
    max_log_message_length: usize,
    security_min_log_level: u8,
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=ODATA_BUILD_PROFILE");
    println!("cargo:rerun-if-env-changed=ODATA_CONFIG_DIR");

    let profile = env::var("ODATA_BUILD_PROFILE").unwrap_or_else(|_| "development".to_string());
    let config_dir = env::var("ODATA_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

    // Find workspace root (parent of odata_filter directory)
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap();
    let workspace_root = Path::new(&manifest_dir)
        .parent()
        .expect("Could not find workspace root (parent directory)");

    let config_path = workspace_root
        .join(&config_dir)
        .join(format!("{}.toml", profile));

    println!("cargo:rerun-if-changed={}", config_path.display());

    if !config_path.exists() {
        panic!(
            "Configuration file not found: {}\nWorkspace root: {}\nLooking for: {}/{}/{}.toml",
            config_path.display(),
            workspace_root.display(),
            workspace_root.display(),
            config_dir,
            profile
        );
    }

    let config_content = fs::read_to_string(&config_path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", config_path.display(), e));

    let config: CompileTimeConfig = toml::from_str(&config_content)
        .unwrap_or_else(|e| panic!("Invalid TOML in {}: {}", config_path.display(), e));

    validate_security_constraints(&config, &profile);
    generate_constants(&config, &profile);
}

fn validate_security_constraints(config: &CompileTimeConfig, profile: &str) {
    const ABSOLUTE_MAX_EXPRESSION_LENGTH: usize = 1_048_576;
    const ABSOLUTE_MAX_PARSE_DEPTH: usize = 1_000;
    const ABSOLUTE_MAX_RULE_COUNT: usize = 100_000;

    if config.lexical.max_expression_length > ABSOLUTE_MAX_EXPRESSION_LENGTH {
        panic!("SECURITY: max_expression_length exceeds absolute maximum");
    }

    if config.syntax.max_parse_depth > ABSOLUTE_MAX_PARSE_DEPTH {
        panic!("SECURITY: max_parse_depth exceeds absolute maximum");
    }

    if config.syntax.max_lambda_depth > config.syntax.max_parse_depth {
        panic!("SECURITY: max_lambda_depth cannot exceed max_parse_depth");
    }

    if config.rules.max_rule_count > ABSOLUTE_MAX_RULE_COUNT {
        panic!("SECURITY: max_rule_count exceeds absolute maximum");
    }

    if config.logging.security_min_log_level > 2 {
        panic!("SECURITY: security_min_log_level too high (max: 2)");
    }

    if profile == "production" {
        if config.lexical.max_expression_length > 65_536 {
            panic!("PRODUCTION: max_expression_length too high for production");
        }
        if config.syntax.max_parse_depth > 200 {
            panic!("PRODUCTION: max_parse_depth too high for production");
        }
    }
}

fn generate_constants(config: &CompileTimeConfig, profile: &str) {
    let out_dir = env::var("OUT_DIR").unwrap();
    let output_path = Path::new(&out_dir).join("constants.rs");

    let constants_code = format!(
        r#"
// Generated compile-time constants from TOML configuration
// Profile: {}
// DO NOT EDIT - Generated by build.rs

pub mod compile_time {{
    pub mod lexical {{
        pub const MAX_EXPRESSION_LENGTH: usize = {};
        pub const MAX_IDENTIFIER_LENGTH: usize = {};
        pub const MAX_STRING_SIZE: usize = {};
        pub const MAX_TOKEN_COUNT: usize = {};
    }}

    pub mod syntax {{
        pub const MAX_PARSE_DEPTH: usize = {};
        pub const MAX_LAMBDA_DEPTH: usize = {};
        pub const MAX_FUNCTION_ARGUMENTS: usize = {};
    }}

    pub mod rules {{
        pub const MAX_RULE_COUNT: usize = {};
        pub const MAX_RULE_TEXT_LENGTH: usize = {};
        pub const MAX_NAME_LENGTH: usize = {};
    }}

    pub mod logging {{
        pub const MAX_LOG_MESSAGE_LENGTH: usize = {};
        pub const SECURITY_MIN_LOG_LEVEL: u8 = {};
    }}
}}
"#,
        profile,
        config.lexical.max_expression_length,
        config.lexical.max_identifier_length,
        config.lexical.max_string_size,
        config.lexical.max_token_count,
        config.syntax.max_parse_depth,
        config.syntax.max_lambda_depth,
        config.syntax.max_function_arguments,
        config.rules.max_rule_count,
        config.rules.max_rule_text_length,
        config.rules.max_name_length,
        config.logging.max_log_message_length,
        config.logging.security_min_log_level,
    );

    fs::write(output_path, constants_code).unwrap();
}
