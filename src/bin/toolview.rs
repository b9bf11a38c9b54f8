use anyhow::{Context, Result};
use std::io::IsTerminal;
use tokio::io::AsyncRead;
use toolview::config::RendererConfig;
use toolview::logging;
use toolview::ui::{run_transcript, MAX_EVENT_LINE_BYTES};
use toolview::ToolOutputRenderer;

const FALLBACK_WIDTH: u16 = 80;

async fn open_input(path: Option<&str>) -> Result<Box<dyn AsyncRead + Unpin + Send>> {
    match path {
        Some(path) if path != "-" => {
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("failed to open event log '{path}'"))?;
            Ok(Box::new(file))
        }
        _ => Ok(Box::new(tokio::io::stdin())),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init()?;

    let config = RendererConfig::load()?;
    config.validate()?;
    let mut renderer = ToolOutputRenderer::from_config(&config)?;

    let path = std::env::args().nth(1);
    let input = open_input(path.as_deref()).await?;

    let mut stdout = std::io::stdout();
    let colored = stdout.is_terminal();
    let width = crossterm::terminal::size()
        .map(|(cols, _)| cols)
        .unwrap_or(FALLBACK_WIDTH);

    tracing::info!(source = path.as_deref().unwrap_or("<stdin>"), colored, "rendering transcript events");

    run_transcript(&mut renderer, input, &mut stdout, width, colored, MAX_EVENT_LINE_BYTES).await?;
    Ok(())
}
