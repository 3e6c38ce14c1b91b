use anyhow::Context;
use copyloom_core::config::Config;
use std::path::Path;

pub fn run(root: &Path, port: u16, open_browser: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let rt = tokio::runtime::Runtime::new()?;
    let root_buf = root.to_path_buf();

    rt.block_on(async move {
        let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;
        let actual_port = listener.local_addr()?.port();
        println!(
            "copyloom API for '{}' on http://localhost:{actual_port}",
            config.workspace.name
        );

        tokio::select! {
            res = copyloom_server::serve_on(root_buf, listener, open_browser) => res,
            _ = tokio::signal::ctrl_c() => Ok(()),
        }
    })
}
