use std::path::Path;

use anyhow::anyhow;

use crate::context::{AppContext, CliError, CliResult};
use crate::output::render_json;

pub(crate) fn handle_config_create(ctx: &AppContext) -> CliResult<()> {
    let path = ctx.store.path().display();
    if ctx.store.create()? {
        println!("Created default configuration at {path}.");
    } else {
        println!("Configuration already exists at {path}.");
    }
    Ok(())
}

pub(crate) fn handle_config_load(ctx: &AppContext) -> CliResult<()> {
    render_json(&ctx.store.load())
}

pub(crate) fn handle_config_reset(ctx: &AppContext) -> CliResult<()> {
    if ctx.store.reset() {
        println!("Configuration reset to defaults.");
        Ok(())
    } else {
        Err(CliError::failure(anyhow!(
            "failed to reset configuration at {}",
            ctx.store.path().display()
        )))
    }
}

pub(crate) fn handle_config_export(ctx: &AppContext, destination: &Path) -> CliResult<()> {
    if ctx.store.export_to(destination) {
        println!("Configuration exported to {}.", destination.display());
        Ok(())
    } else {
        Err(CliError::failure(anyhow!(
            "failed to export configuration to {}",
            destination.display()
        )))
    }
}

pub(crate) fn handle_config_import(ctx: &AppContext, source: &Path) -> CliResult<()> {
    ctx.store.import_from(source)?;
    println!("Configuration imported from {}.", source.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::test_support;
    use serde_json::{Value, json};
    use std::fs;
    use veil_config::default_config;
    use veil_test_support::fixtures::TempProject;

    type TestResult<T> = Result<T, Box<dyn std::error::Error>>;

    fn ok(result: CliResult<()>) -> TestResult<()> {
        result.map_err(|err| err.display_message().into())
    }

    #[test]
    fn create_then_reset_leaves_default_document() -> TestResult<()> {
        let project = TempProject::new()?;
        let ctx = test_support::context(project.root());

        ok(handle_config_create(&ctx))?;
        ok(handle_config_create(&ctx))?;
        ok(handle_config_reset(&ctx))?;

        assert_eq!(ctx.store.load(), default_config());
        Ok(())
    }

    #[test]
    fn import_without_region_mapping_is_a_validation_error() -> TestResult<()> {
        let project = TempProject::new()?;
        let ctx = test_support::context(project.root());
        let before = ctx.store.load();
        let external = project.write(
            "incoming.json",
            &json!({ "authToken": "t", "fallbackAddress": ["a.example"] }).to_string(),
        )?;

        let err = handle_config_import(&ctx, &external).err();

        assert!(matches!(err, Some(CliError::Validation(_))));
        assert_eq!(err.map(|err| err.exit_code()), Some(2));
        assert_eq!(ctx.store.load(), before);
        Ok(())
    }

    #[test]
    fn export_then_import_round_trips() -> TestResult<()> {
        let project = TempProject::new()?;
        let ctx = test_support::context(project.root());
        let mut doc = default_config();
        doc.auth_token = "secret".to_string();
        assert!(ctx.store.save(&doc));

        let exported = project.path("backup/config.json");
        ok(handle_config_export(&ctx, &exported))?;
        ok(handle_config_reset(&ctx))?;
        ok(handle_config_import(&ctx, &exported))?;

        assert_eq!(ctx.store.load(), doc);
        let raw: Value = serde_json::from_str(&fs::read_to_string(&exported)?)?;
        assert_eq!(raw["authToken"], "secret");
        Ok(())
    }
}
