mod app;

use anyhow::{Context, Result, bail};
use resources::ResourceConfig;

use crate::app::App;

const USAGE: &str = "usage: app [--config <resources.json>] <logical path>...";

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let mut config = ResourceConfig::default();
    let mut paths = Vec::new();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let file = args.next().context(USAGE)?;
                config = ResourceConfig::load(&file)
                    .with_context(|| format!("failed to load configuration {file}"))?;
            }
            "-h" | "--help" => {
                println!("{USAGE}");
                return Ok(());
            }
            _ => paths.push(arg),
        }
    }
    if paths.is_empty() {
        bail!(USAGE);
    }

    let mut app = App::new(config);
    app.init()?;
    app.run(&paths)
}
