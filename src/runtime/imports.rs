//! Module resolution for `import ... from ...;`.
//!
//! Every requested name is resolved before any is bound, so a failed import
//! leaves the importing environment unchanged.

use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

use crate::{
    ast::{ast::Identifier, statements::ImportStmt},
    errors::errors::{Error, ErrorImpl},
};

use super::{objects::Value, runner::Runner};

/// Extension of Violet source files.
pub const SOURCE_EXTENSION: &str = "vi";

#[instrument(level = "debug", skip_all, fields(module = %stmt.module_name()))]
pub fn exec_import(runner: &mut Runner, stmt: &ImportStmt) -> Result<(), Error> {
    let resolved = if stmt.is_std() {
        resolve_std_import(runner, stmt)?
    } else {
        resolve_local_import(runner, stmt)?
    };

    let scope = runner.active;
    for (identifier, value) in resolved {
        runner.environments.declare(scope, identifier, value, false)?;
    }
    Ok(())
}

fn resolve_std_import(runner: &Runner, stmt: &ImportStmt) -> Result<Vec<(Identifier, Value)>, Error> {
    let module_name = stmt.module_name();
    let module = runner
        .stdlib
        .module(&module_name)
        .ok_or_else(|| ErrorImpl::ModuleNotFound { module: module_name.clone() })?;

    stmt.names
        .iter()
        .map(|name| match module.get(name.name.as_str()) {
            Some(value) => Ok((name.clone(), value.clone())),
            None => Err(Error::from(ErrorImpl::ImportNotFound {
                name: name.name.clone(),
                module: module_name.clone(),
            })),
        })
        .collect()
}

/// `a.b` maps to `a/b.vi` next to the importing file.
pub fn module_path(importer: &str, module: &[String]) -> PathBuf {
    let base = Path::new(importer)
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();

    base.join(module.iter().collect::<PathBuf>())
        .with_extension(SOURCE_EXTENSION)
}

fn resolve_local_import(runner: &Runner, stmt: &ImportStmt) -> Result<Vec<(Identifier, Value)>, Error> {
    let module_name = stmt.module_name();
    let path = module_path(runner.file(), &stmt.module);

    let canonical = path
        .canonicalize()
        .map_err(|_| ErrorImpl::ModuleNotFound { module: module_name.clone() })?;

    if runner.loading.borrow().contains(&canonical) {
        return Err(ErrorImpl::CircularImport { module: module_name }.into());
    }

    debug!(path = %path.display(), "loading local module");

    let mut nested = runner.nested(path.to_string_lossy());
    runner.loading.borrow_mut().push(canonical);
    let result = nested.run_module_file(&path);
    runner.loading.borrow_mut().pop();

    if let Err(error) = result {
        if error.is_fatal() {
            return Err(error);
        }
        return Err(ErrorImpl::ModuleFailed {
            module: module_name,
            message: format!("line {}: {}", error.get_line(), error),
        }
        .into());
    }

    stmt.names
        .iter()
        .map(|name| match nested.environments.lookup_local(nested.global, name)? {
            Some(value) => Ok((name.clone(), value)),
            None => Err(Error::from(ErrorImpl::ImportNotFound {
                name: name.name.clone(),
                module: module_name.clone(),
            })),
        })
        .collect()
}
