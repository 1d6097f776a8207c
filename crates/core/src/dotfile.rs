//! `.cellar` dotfile codec
//!
//! A dotfile is a list of `KEY=VALUE` assignments. Everything after a `#` is a
//! comment, blank lines are skipped, and only the first `=` separates the key
//! from the value so values may themselves contain `=`.

use crate::config::Settings;
use crate::{Error, Result};
use indexmap::IndexMap;
use std::path::Path;
use tracing::debug;

/// File name of the dotfile inside an app directory
pub const DOTFILE_NAME: &str = ".cellar";

/// Dotfile variable naming the app of a directory
pub const APP_NAME_VAR: &str = "CELLAR_APP_NAME";

/// Dotfile variable naming the environment of a directory
pub const ENV_NAME_VAR: &str = "CELLAR_ENV_NAME";

/// Parse dotfile contents into ordered assignments.
///
/// Later assignments to the same key override earlier ones.
///
/// # Errors
///
/// Returns [`Error::Validation`] with the 1-based line number for any
/// non-blank line that has no `=`.
pub fn parse(contents: &str) -> Result<IndexMap<String, String>> {
    let mut assignments = IndexMap::new();

    for (index, raw_line) in contents.lines().enumerate() {
        let line = raw_line
            .split_once('#')
            .map_or(raw_line, |(before, _)| before);

        if line.trim().is_empty() {
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            return Err(Error::validation(
                index + 1,
                format!("`{}` does not contain an `=`", line.trim()),
            ));
        };

        assignments.insert(key.to_string(), value.to_string());
    }

    Ok(assignments)
}

/// Render assignments as dotfile contents, one `KEY=VALUE` per line.
#[must_use]
pub fn render<'a, I>(assignments: I) -> String
where
    I: IntoIterator<Item = (&'a String, &'a String)>,
{
    let mut out = String::new();
    for (key, value) in assignments {
        out.push_str(key);
        out.push('=');
        out.push_str(value);
        out.push('\n');
    }
    out
}

/// Read `<dir>/.cellar`; a missing dotfile is an empty set of assignments.
pub async fn read(dir: &Path) -> Result<IndexMap<String, String>> {
    let path = dir.join(DOTFILE_NAME);
    match crate::fs::read_optional(&path).await? {
        Some(contents) => parse(&contents),
        None => {
            debug!(dir = %dir.display(), "No dotfile present");
            Ok(IndexMap::new())
        }
    }
}

/// Write assignments to `<dir>/.cellar`.
pub async fn write<'a, I>(dir: &Path, assignments: I) -> Result<()>
where
    I: IntoIterator<Item = (&'a String, &'a String)>,
{
    crate::fs::write_atomic(&dir.join(DOTFILE_NAME), &render(assignments)).await
}

/// Resolve which app and environment a directory refers to.
///
/// Each name comes from the first non-empty source of:
/// 1. the explicit argument
/// 2. the dotfile's [`APP_NAME_VAR`] / [`ENV_NAME_VAR`]
/// 3. the directory's final component (app) or `settings.default_env` (env)
///
/// The dotfile is not read when both names are given.
pub async fn app_and_env(
    dir: &Path,
    app: Option<&str>,
    env: Option<&str>,
    settings: &Settings,
) -> Result<(String, String)> {
    let app = app.filter(|name| !name.is_empty());
    let env = env.filter(|name| !name.is_empty());
    if let (Some(app), Some(env)) = (app, env) {
        return Ok((app.to_string(), env.to_string()));
    }

    let assignments = read(dir).await?;
    let from_dotfile = |var: &str| {
        assignments
            .get(var)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    };

    let app = match app.map(str::to_string).or_else(|| from_dotfile(APP_NAME_VAR)) {
        Some(app) => app,
        None => dir
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| {
                Error::configuration(format!("Cannot derive an app name from {}", dir.display()))
            })?,
    };
    let env = env
        .map(str::to_string)
        .or_else(|| from_dotfile(ENV_NAME_VAR))
        .unwrap_or_else(|| settings.default_env.clone());

    debug!(dir = %dir.display(), %app, %env, "Resolved app and environment");
    Ok((app, env))
}
