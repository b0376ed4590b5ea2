//! Render command - Render one template file to stdout

use std::fs;
use std::path::PathBuf;

use clap::Args;
use gesso::{load_config, read_config, read_params, Error, Params, Template};

#[derive(Args)]
pub struct RenderArgs {
    /// Template file to render
    pub template: PathBuf,

    /// JSON file holding the render parameters as one object
    #[arg(short, long)]
    pub params: Option<PathBuf>,

    /// Config file path (default: ./gesso.config.json when present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

pub fn run(args: RenderArgs) -> Result<(), Error> {
    let config = match &args.config {
        Some(path) => read_config(path)?,
        None => load_config(None)?,
    };

    let source = fs::read_to_string(&args.template)?;
    let template = Template::parse_with_options(&source, &config.parser_options())?;

    let params = match &args.params {
        Some(path) => read_params(path)?,
        None => Params::new(),
    };

    tracing::debug!(template = %args.template.display(), params = params.len(), "rendering");
    template.render_to(&params, std::io::stdout().lock())
}
