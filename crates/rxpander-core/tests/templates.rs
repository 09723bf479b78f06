//! End-to-end template fixtures exercising the full processing pass.

use pretty_assertions::assert_eq;
use rxpander_core::{Config, Delimiters, ProcessResult, TemplateError, TemplateProcessor};

fn process(source: &str) -> Result<ProcessResult, TemplateError> {
    TemplateProcessor::new(Config::default()).process(source)
}

#[test]
fn reaction_model_round_trip() {
    let template = "\
# Michaelis-Menten template
{{ SetVersion 1.0 }}
{{ DefineVariables Begin }}
add_definitions({'s': ['A', 'B']})
{{ DefineVariables End }}
J{s}: E + {s} -> E{s}; k1*E*{s}
J{s}r: E{s} -> E + {s}; k2*E{s}";
    let result = process(template).unwrap();
    let lines: Vec<&str> = result.text.split('\n').collect();
    assert_eq!(
        lines,
        vec![
            "# Michaelis-Menten template",
            "#{{ SetVersion 1.0 }}",
            "#{{ DefineVariables Begin }}",
            "#add_definitions({'s': ['A', 'B']})",
            "#{{ DefineVariables End }}",
            "#J{s}: E + {s} -> E{s}; k1*E*{s}",
            "JA: E + A -> EA; k1*E*A",
            "JB: E + B -> EB; k1*E*B",
            "#J{s}r: E{s} -> E + {s}; k2*E{s}",
            "JAr: EA -> E + A; k2*EA",
            "JBr: EB -> E + B; k2*EB",
        ]
    );
    assert!(result.warnings.is_empty());
}

#[test]
fn continuation_joins_before_classification() {
    let template = "\
{{ DefineVariables Begin }}
add_definitions({'a': ['1']})
{{ DefineVariables End }}
J{a}: S{a} -> T\\
{a}";
    let result = process(template).unwrap();
    assert!(result.text.contains("J1: S1 -> T1"));
}

#[test]
fn two_variable_product_expands_fully() {
    let template = "\
{{ DefineVariables Begin }}
add_definitions({'m': ['X', 'Y'], 'n': [1, 2]})
{{ DefineVariables End }}
R{m}{n}: {m}{n} -> {m}{n + 1}";
    let result = process(template).unwrap();
    let expanded: Vec<&str> = result
        .text
        .split('\n')
        .filter(|l| l.starts_with('R'))
        .collect();
    assert_eq!(expanded.len(), 4);
    assert!(expanded.contains(&"RX1: X1 -> X2"));
    assert!(expanded.contains(&"RX2: X2 -> X3"));
    assert!(expanded.contains(&"RY1: Y1 -> Y2"));
    assert!(expanded.contains(&"RY2: Y2 -> Y3"));
}

#[test]
fn later_block_extends_definitions() {
    let template = "\
{{ DefineVariables Begin }}
add_definitions({'a': ['1']})
{{ DefineVariables End }}
J{a}: -> S
{{ DefineVariables Begin }}
add_definitions({'b': ['x', 'y']})
{{ DefineVariables End }}
K{a}{b}: -> T";
    let result = process(template).unwrap();
    assert!(result.text.contains("J1: -> S"));
    assert!(result.text.contains("K1x: -> T"));
    assert!(result.text.contains("K1y: -> T"));
}

#[test]
fn remove_definitions_narrows_later_lines() {
    let template = "\
{{ DefineVariables Begin }}
add_definitions({'a': ['1'], 'b': ['x']})
{{ DefineVariables End }}
{{ DefineVariables Begin }}
remove_definitions(['b'])
{{ DefineVariables End }}
J{a}: -> S";
    let result = process(template).unwrap();
    assert!(result.text.contains("J1: -> S"));
}

#[test]
fn failing_block_aborts_with_script_context() {
    let template = "\
{{ DefineVariables Begin }}
add_definitions({'a': ['1']})
x = 1 // 0
{{ DefineVariables End }}
J{a}: -> S";
    let err = process(template).unwrap_err();
    assert_eq!(err.code(), "T005");
    let message = err.to_string();
    assert!(message.contains("x = 1 // 0"));
}

#[test]
fn deterministic_output_across_runs() {
    let template = "\
{{ DefineVariables Begin }}
add_definitions({'a': ['1', '2'], 'b': ['x', 'y', 'z']})
{{ DefineVariables End }}
J{a}{b}: -> S";
    let first = process(template).unwrap();
    let second = process(template).unwrap();
    assert_eq!(first.text, second.text);
}

#[test]
fn custom_delimiters() {
    let mut config = Config::default();
    config.delimiters = Delimiters {
        expression_start: "<".to_string(),
        expression_end: ">".to_string(),
        command_start: "<<".to_string(),
        command_end: ">>".to_string(),
        comment: "%".to_string(),
        continuation: "\\".to_string(),
        line_separator: "\n".to_string(),
    };
    let template = "\
<< DefineVariables Begin >>
add_definitions({'a': ['1', '2']})
<< DefineVariables End >>
J<a>: -> S";
    let result = TemplateProcessor::new(config).process(template).unwrap();
    assert!(result.text.contains("%<< DefineVariables Begin >>"));
    assert!(result.text.contains("J1: -> S"));
    assert!(result.text.contains("J2: -> S"));
}

#[test]
fn assignment_count_warning_is_advisory() {
    let mut config = Config::default();
    config.warning_assignments = 3;
    let template = "\
{{ DefineVariables Begin }}
add_definitions({'a': ['1', '2'], 'b': ['x', 'y']})
{{ DefineVariables End }}
J{a}{b}: -> S";
    let result = TemplateProcessor::new(config).process(template).unwrap();
    assert_eq!(result.warnings.len(), 1);
    assert!(result.warnings[0].message.contains("4"));
    // The warning did not suppress the expansion.
    assert!(result.text.contains("J1x: -> S"));
    assert!(result.text.contains("J2y: -> S"));
}

#[test]
fn whole_document_atomicity() {
    // The error appears after expandable lines; no partial output escapes.
    let template = "\
{{ DefineVariables Begin }}
add_definitions({'a': ['1']})
{{ DefineVariables End }}
J{a}: -> S
K{undefined_name}: -> T";
    let err = process(template).unwrap_err();
    assert_eq!(err.code(), "T005");
}

#[test]
fn script_variables_shared_between_blocks() {
    let template = "\
{{ DefineVariables Begin }}
species = ['S1', 'S2']
{{ DefineVariables End }}
{{ DefineVariables Begin }}
add_definitions({'s': species})
{{ DefineVariables End }}
J{s}: {s} -> {s}_p";
    let result = process(template).unwrap();
    assert!(result.text.contains("JS1: S1 -> S1_p"));
    assert!(result.text.contains("JS2: S2 -> S2_p"));
}
