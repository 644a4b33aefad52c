use bus::PageEvent;
use clap::Parser;
use core_types::Viewport;
use enhance::error::EnhanceError;
use enhance::{EnhanceConfig, HostInfo, Page};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

/// Milliseconds between simulated scroll steps.
const SCROLL_STEP_MS: u64 = 100;

#[derive(Parser, Debug)]
#[command(version, about = "Apply load-time enhancements to a generated documentation page")]
struct Args {
    /// Rendered HTML page
    input: PathBuf,

    /// TOML settings; defaults match MkDocs Material markup
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write the enhanced page here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Host name the page is served from
    #[arg(long)]
    host: Option<String>,

    #[arg(long, default_value_t = 800.0)]
    viewport_height: f32,

    /// Scroll offsets to simulate, in order
    #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
    scroll: Vec<f32>,
}

fn run(args: Args) -> enhance::Result<()> {
    let html = std::fs::read_to_string(&args.input).map_err(|source| EnhanceError::Read {
        path: args.input.clone(),
        source,
    })?;
    let config = match &args.config {
        Some(path) => EnhanceConfig::load(path)?,
        None => EnhanceConfig::default(),
    };
    let host = HostInfo {
        page_host: args.host.clone(),
        viewport: Viewport::new(0.0, args.viewport_height),
        ..HostInfo::default()
    };

    let mut page = Page::parse(&html, config, host)?;
    let report = page.ready();
    log::debug!("ready: {report:?}");

    for (step, &scroll_y) in args.scroll.iter().enumerate() {
        let at = (step as u64 + 1) * SCROLL_STEP_MS;
        page.post(PageEvent::Scroll { scroll_y, at });
        page.run_until_idle();
        // Follow any scrolling the page asked for, as a browser would.
        for command in page.take_commands() {
            if let Some(top) = page.scroll_target(&command) {
                page.post(PageEvent::Scroll { scroll_y: top, at });
                page.run_until_idle();
            }
        }
        match page.active_section() {
            Some(id) => log::info!("scroll {scroll_y}px: active section #{id}"),
            None => log::info!("scroll {scroll_y}px: no active section"),
        }
    }

    let out = page.to_html();
    match &args.output {
        Some(path) => std::fs::write(path, out).map_err(|source| EnhanceError::Write {
            path: path.clone(),
            source,
        })?,
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(out.as_bytes())
                .and_then(|()| stdout.write_all(b"\n"))
                .map_err(|source| EnhanceError::Write {
                    path: PathBuf::from("<stdout>"),
                    source,
                })?;
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}
