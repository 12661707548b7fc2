//! Program source rendering from classified buffer lines.

use anyhow::{Context, Result};
use minijinja::{Environment, context};

const PROGRAM_TEMPLATE: &str = include_str!("templates/program.tmpl");

/// Render a complete program: package clause, imports, then a `main` body.
///
/// Lines are emitted verbatim; syntax errors surface only when the toolchain
/// runs the result.
pub fn render_program(
    package_name: &str,
    imports: &[String],
    statements: &[String],
) -> Result<String> {
    let mut env = Environment::new();
    env.set_keep_trailing_newline(true);
    env.add_template("program", PROGRAM_TEMPLATE)
        .context("parse program template")?;

    let template = env.get_template("program")?;
    let rendered = template
        .render(context! {
            package_name => package_name,
            imports => imports,
            statements => statements,
        })
        .context("render program template")?;
    Ok(rendered)
}

/// Build an import declaration for a package path, e.g. `import "fmt"`.
pub fn import_declaration(path: &str) -> String {
    format!("import \"{path}\"")
}
