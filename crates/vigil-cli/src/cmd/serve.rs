use anyhow::Result;
use std::path::Path;

/// Start the HTTP trigger surface.
pub fn run(root: &Path, port: u16) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(vigil_server::serve(root.to_path_buf(), port))
}
