use std::{
    fs::{self, canonicalize},
    path::PathBuf,
};

use anyhow::Result;
use model_config::ModelConfig;
use schemars::schema_for;

const VSCODE_DIR: &str = "../../../.vscode";

fn main() -> Result<()> {
    let vscode_dir = PathBuf::from(file!()).join(VSCODE_DIR);
    fs::create_dir_all(&vscode_dir)?;
    let vscode_dir = canonicalize(vscode_dir)?;

    let model_config_schema = serde_json::to_string_pretty(&schema_for!(ModelConfig))?;
    fs::write(
        vscode_dir.join("model_config.schema.json"),
        model_config_schema,
    )?;
    Ok(())
}
