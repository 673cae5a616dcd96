//! locus - resolve locators against an XHTML resource

use std::fs;
use std::process::ExitCode;

use clap::Parser;

use locus::dom::parse_document_str;
use locus::ops::handle_request;
use locus::{FlowLayout, FlowOptions, Locations, Locator, PageEngine, PageOptions};

#[derive(Parser)]
#[command(name = "locus")]
#[command(version, about = "EPUB locator resolution engine", long_about = None)]
#[command(after_help = "EXAMPLES:
    locus ch1.xhtml --locator '{\"href\":\"ch1.xhtml\",\"locations\":{\"cssSelector\":\"#p4\"}}'
    locus ch1.xhtml --request '{\"op\":\"isReaderReady\"}'
    locus ch1.xhtml                 Print the first visible element's selector")]
struct Cli {
    /// Resource document (XHTML)
    #[arg(value_name = "INPUT")]
    input: String,

    /// Locator JSON; prints it back enriched with fragments
    #[arg(short, long, value_name = "JSON")]
    locator: Option<String>,

    /// Raw request JSON for the ops boundary
    #[arg(short, long, value_name = "JSON", conflicts_with = "locator")]
    request: Option<String>,

    /// Treat the document as continuously scrolled instead of paginated
    #[arg(long)]
    vertical: bool,

    /// Treat the document as fixed-layout (pre-paginated)
    #[arg(long)]
    fixed_layout: bool,

    /// Viewport width in pixels
    #[arg(long, default_value_t = 400.0)]
    width: f64,

    /// Viewport height in pixels
    #[arg(long, default_value_t = 600.0)]
    height: f64,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<String, String> {
    let html = fs::read_to_string(&cli.input).map_err(|e| format!("{}: {e}", cli.input))?;
    let doc = parse_document_str(&html);

    let options = FlowOptions {
        viewport_width: cli.width,
        viewport_height: cli.height,
        vertical: cli.vertical,
        ..FlowOptions::default()
    };
    let layout = FlowLayout::new(&doc, options);
    let mut engine = PageEngine::new(
        doc,
        Box::new(layout),
        PageOptions {
            fixed_layout: cli.fixed_layout,
            ..Default::default()
        },
    );

    if let Some(request) = &cli.request {
        return Ok(handle_request(&mut engine, request));
    }

    if let Some(locator_json) = &cli.locator {
        let locator: Locator = serde_json::from_str(locator_json).map_err(|e| e.to_string())?;
        let enriched = engine.get_locator_fragments(&locator, cli.vertical);
        return serde_json::to_string_pretty(&enriched).map_err(|e| e.to_string());
    }

    let selector = engine.first_visible_css_selector();
    let locator = Locator::new(cli.input.clone()).with_locations(Locations::from_selector(selector));
    let enriched = engine.get_locator_fragments(&locator, cli.vertical);
    serde_json::to_string_pretty(&enriched).map_err(|e| e.to_string())
}
