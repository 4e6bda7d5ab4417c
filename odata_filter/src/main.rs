use odata_filter::config::build_info;
use odata_filter::logging;
use odata_filter::{
    EntityModel, FilterExpressionTree, FilterValidator, RuleSet, TreePrintOptions,
    ValidationMode, ValidatorError,
};
use std::env;
use std::path::PathBuf;
use std::process;

const EXIT_PASSED: i32 = 0;
const EXIT_FAILED: i32 = 1;
const EXIT_USAGE: i32 = 2;

#[derive(Debug, Default, PartialEq)]
struct CliOptions {
    filter: String,
    rules: Option<String>,
    rules_file: Option<PathBuf>,
    model: Option<PathBuf>,
    tree: bool,
    labels: bool,
    kinds: bool,
    details: bool,
    schema: bool,
    strict: bool,
    json: bool,
}

fn main() {
    if let Err(error) = logging::init_global_logging() {
        eprintln!("Error: {}", error);
        process::exit(EXIT_USAGE);
    }

    let args: Vec<String> = env::args().collect();
    let program_name = args.first().map(String::as_str).unwrap_or("odata-filter");

    if args.len() < 2 {
        eprintln!("Usage: {} <filter> [options]", program_name);
        eprintln!("       {} --help", program_name);
        process::exit(EXIT_USAGE);
    }

    if args[1] == "--help" || args[1] == "-h" {
        print_help(program_name);
        return;
    }

    let options = match parse_options(&args[1..]) {
        Ok(options) => options,
        Err(message) => {
            eprintln!("Error: {}", message);
            process::exit(EXIT_USAGE);
        }
    };

    process::exit(run(&options));
}

fn print_help(program_name: &str) {
    println!("OData Filter Validator v{}", env!("CARGO_PKG_VERSION"));
    println!("Validates OData $filter expressions against operator and property rules");
    println!();
    println!("USAGE:");
    println!("    {} <filter> [options]", program_name);
    println!();
    println!("OPTIONS:");
    println!("    --rules R           Rules as JSON or pipe-delimited text");
    println!("    --rules-file FILE   Read rules from a file");
    println!("    --model FILE        Entity model (.json or .toml); untyped if omitted");
    println!("    --tree              Print the expression tree");
    println!("    --labels            Label tree nodes");
    println!("    --kinds             Show node kinds in the tree");
    println!("    --details           Print distinct operators and properties");
    println!("    --schema            Print the model schema elements");
    println!("    --strict            Reject names without a rule entry");
    println!("    --json              Print the result as JSON");
    println!("    --help              Show this help message");
    println!();
    println!("RULE GRAMMAR:");
    println!("    rule1|rule2|...     each rule is {{o:|p:}}name{{:min,max}}");
    println!("    eq|and:2|o:ne:1,2|startsWith:1|type:,5|p:name/givenName:2,");
    println!();
    println!("EXIT CODES:");
    println!("    0  validation passed");
    println!("    1  validation failed");
    println!("    2  usage, model, rule or filter error");
    println!();
    println!("EXAMPLES:");
    println!(
        "    {} \"type eq 'Employee'\" --rules \"eq|p:type:1\"",
        program_name
    );
    println!(
        "    {} \"phoneNumbers/any(p: p eq '123')\" --model user.json --tree --labels",
        program_name
    );
    println!();
    println!("CONFIGURATION:");
    println!("    {}", build_info::source_info());
    for line in logging::config::get_config_summary().lines() {
        println!("    {}", line);
    }
}

fn parse_options(args: &[String]) -> Result<CliOptions, String> {
    let mut options = CliOptions::default();
    let mut filter = None;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--rules" => {
                options.rules = Some(option_value(args, i, "--rules")?.to_string());
                i += 1;
            }
            "--rules-file" => {
                options.rules_file = Some(PathBuf::from(option_value(args, i, "--rules-file")?));
                i += 1;
            }
            "--model" => {
                options.model = Some(PathBuf::from(option_value(args, i, "--model")?));
                i += 1;
            }
            "--tree" => options.tree = true,
            "--labels" => options.labels = true,
            "--kinds" => options.kinds = true,
            "--details" => options.details = true,
            "--schema" => options.schema = true,
            "--strict" => options.strict = true,
            "--json" => options.json = true,
            flag if flag.starts_with("--") => {
                return Err(format!("Unknown option '{}'", flag));
            }
            value => {
                if filter.is_some() {
                    return Err(format!("Unexpected argument '{}'", value));
                }
                filter = Some(value.to_string());
            }
        }
        i += 1;
    }

    if options.rules.is_some() && options.rules_file.is_some() {
        return Err("--rules and --rules-file cannot be combined".to_string());
    }

    options.filter = filter.ok_or_else(|| "Missing filter expression".to_string())?;
    Ok(options)
}

fn option_value<'a>(args: &'a [String], i: usize, name: &str) -> Result<&'a str, String> {
    args.get(i + 1)
        .map(String::as_str)
        .ok_or_else(|| format!("{} requires a value", name))
}

fn run(options: &CliOptions) -> i32 {
    let model = match &options.model {
        Some(path) => match EntityModel::from_file(path) {
            Ok(model) => model,
            Err(error) => {
                eprintln!("Error: cannot load model '{}': {}", path.display(), error);
                return EXIT_USAGE;
            }
        },
        None => EntityModel::untyped(),
    };

    let rules_text = match &options.rules_file {
        Some(path) => match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(error) => {
                eprintln!("Error: cannot read rules '{}': {}", path.display(), error);
                return EXIT_USAGE;
            }
        },
        None => options.rules.clone().unwrap_or_default(),
    };

    let mode = if options.strict {
        ValidationMode::Strict
    } else {
        ValidationMode::default()
    };

    let validator = match FilterValidator::with_mode(&options.filter, &rules_text, &model, mode) {
        Ok(validator) => validator,
        Err(error) => {
            print_error(&error);
            return EXIT_USAGE;
        }
    };

    if options.json {
        println!("{}", json_report(&validator));
    } else {
        print_report(options, validator.tree());
        if validator.passed() {
            println!("PASSED.");
        } else {
            println!("FAILED: {}", validator.details());
        }
    }

    if validator.passed() {
        EXIT_PASSED
    } else {
        EXIT_FAILED
    }
}

fn print_report(options: &CliOptions, tree: &FilterExpressionTree) {
    if options.schema {
        println!("{}", tree.format_schema());
        println!();
    }

    if options.tree {
        let print_options = TreePrintOptions {
            with_labels: options.labels,
            with_node_kind: options.kinds,
            with_details: options.details,
            ..TreePrintOptions::default()
        };
        print!("{}", tree.format_tree(print_options));
        println!();
    } else if options.details {
        println!("{}", tree.format_details());
        println!();
    }
}

fn json_report(validator: &FilterValidator) -> serde_json::Value {
    let rules: &RuleSet = validator.rules();
    serde_json::json!({
        "expression": validator.tree().expression(),
        "passed": validator.passed(),
        "details": validator.details(),
        "violations": validator.violations(),
        "operators": validator.tree().operators(),
        "properties": validator.tree().properties(),
        "rules": rules,
    })
}

/// Print the error with its chain of causes
fn print_error(error: &ValidatorError) {
    eprintln!("Error [{}]: {}", error.error_code(), error);
    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        eprintln!("  caused by: {}", cause);
        source = cause.source();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_parse_options() {
        let options = parse_options(&args(&[
            "email eq null",
            "--rules",
            "eq:1",
            "--tree",
            "--labels",
            "--strict",
        ]))
        .unwrap();

        assert_eq!(options.filter, "email eq null");
        assert_eq!(options.rules.as_deref(), Some("eq:1"));
        assert!(options.tree && options.labels && options.strict);
        assert!(!options.json);
    }

    #[test]
    fn test_parse_options_errors() {
        assert!(parse_options(&args(&["--tree"])).is_err());
        assert!(parse_options(&args(&["a eq 1", "--rules"])).is_err());
        assert!(parse_options(&args(&["a eq 1", "--bogus"])).is_err());
        assert!(parse_options(&args(&["a eq 1", "b eq 2"])).is_err());
        assert!(parse_options(&args(&["a eq 1", "--rules", "eq", "--rules-file", "r.txt"])).is_err());
    }

    #[test]
    fn test_run_exit_codes() {
        let mut options = parse_options(&args(&["a eq 1", "--rules", "eq:1"])).unwrap();
        assert_eq!(run(&options), EXIT_PASSED);

        options.rules = Some("eq:2".to_string());
        assert_eq!(run(&options), EXIT_FAILED);

        options.filter = "a eq".to_string();
        assert_eq!(run(&options), EXIT_USAGE);
    }
}
