use crate::analysis::{Analysis, CallRecord, FunctionRecord};
use std::fmt::Write;

const RULE_WIDTH: usize = 70;

/// Human-readable listing of classes, methods, free functions and their calls.
#[must_use]
pub fn render_summary(analysis: &Analysis) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let mut out = String::new();
    let _ = writeln!(out, "{rule}\nANALYSIS RESULTS\n{rule}");
    if analysis.best_effort {
        let _ = writeln!(out, "\n(best-effort: the front-end reported parse errors)");
    }

    let _ = writeln!(out, "\nClasses and their associated functions:\n");
    if analysis.classes.is_empty() {
        let _ = writeln!(out, "No classes found.");
    }
    for class in &analysis.classes {
        let _ = writeln!(out, "Class: {}", class.name);
        if class.methods.is_empty() {
            let _ = writeln!(out, "  (no methods found)");
        }
        for method in &class.methods {
            let _ = writeln!(out, "  - {}", method.name);
            write_details(&mut out, method, "    ");
        }
        out.push('\n');
    }

    if !analysis.free_functions.is_empty() {
        let _ = writeln!(out, "Standalone functions:\n");
        for function in &analysis.free_functions {
            let _ = writeln!(out, "Function: {}", function.qualified_name());
            write_details(&mut out, function, "  ");
            out.push('\n');
        }
    }
    out
}

fn write_details(out: &mut String, function: &FunctionRecord, indent: &str) {
    if let Some(description) = &function.description {
        let _ = writeln!(out, "{indent}description: {description}");
    }
    if function.calls.is_empty() {
        let _ = writeln!(out, "{indent}calls: (none)");
        return;
    }
    let _ = writeln!(out, "{indent}calls:");
    for call in &function.calls {
        let _ = writeln!(out, "{indent}  - {} [{}]", call.name, call_target(call));
    }
}

fn call_target(call: &CallRecord) -> String {
    match (&call.location, call.external) {
        (Some(location), false) => location.to_string(),
        _ => "external".to_string(),
    }
}
