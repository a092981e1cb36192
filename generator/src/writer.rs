use std::io::Write;

use ego::Package;
use ego::parser::is_identifier;
use tracing::debug;

use crate::error::Error;
use crate::imports::merge_imports;
use crate::literals::LiteralTable;
use crate::options::RenderOptions;
use crate::render::write_template;

/// Generate the source file for `package` into `w`.
///
/// Stages run in order: package clause and merged imports, the literal
/// table, then one function per template. Nothing is written unless the
/// package name is a single identifier and the headers merge cleanly.
/// Each template is flushed only once it has rendered completely, so a
/// failing template leaves the output of the templates before it and
/// nothing of its own.
///
/// The package is not modified, so writing the same package twice yields
/// the same output apart from the banner timestamp.
pub fn write_package<W: Write>(
    package: &Package,
    w: &mut W,
    options: &RenderOptions,
) -> Result<(), Error> {
    if package.name.is_empty() {
        return Err(Error::PackageNameRequired);
    }
    // The name is pasted into the merged header source.
    if !is_identifier(&package.name) {
        return Err(Error::InvalidPackageName {
            name: package.name.clone(),
        });
    }
    debug!(
        package = %package.name,
        templates = package.templates.len(),
        "writing package"
    );

    let header = merge_imports(package)?;
    let literals = LiteralTable::build(package);
    debug!(literals = literals.len(), "assigned text literals");

    let mut buf = Vec::new();
    header.write_to(&mut buf, options)?;
    literals.write_declarations(&mut buf)?;
    w.write_all(&buf)?;

    for (index, template) in package.templates.iter().enumerate() {
        write_template(template, index, &literals, options, w)?;
        debug!(template = %template.path, "wrote template");
    }
    Ok(())
}
