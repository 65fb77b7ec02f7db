use std::{fs, process};

use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod cli;

use cli::Cli;
use pipegraph::{
    GraphError, GraphModel, Result,
    client::ApiClient,
    config::{Config, load_config},
    graph::{build_graph, build_graph_verbose},
    output::OutputFormat,
    render::{self, MemorySurface, RankDir, Size, dot::to_dot},
    task::{PipelineSpec, RunStatus, merge},
};

fn main() {
    let args = Cli::parse();
    init_logging(args.verbose);

    if let Err(e) = run_pipegraph(args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_pipegraph(args: Cli) -> Result<()> {
    let config = load_config(&args.config)?;
    let model = load_model(&args, &config)?;
    info!(
        "Built graph with {} nodes and {} edges",
        model.nodes.len(),
        model.edges.len()
    );

    let format = args.format.or(config.format).unwrap_or(OutputFormat::Svg);

    if let Some(task) = &args.highlight {
        if format != OutputFormat::Svg {
            return Err(GraphError::Task(
                "--highlight only applies to SVG output".to_string(),
            ));
        }
        if model.node(task).is_none() {
            return Err(GraphError::Task(format!("Task '{}' not found", task)));
        }
    }

    let mut options = config.render.clone();
    if args.rankdir.is_some() {
        options.rankdir = args.rankdir;
    }

    let rendered = match format {
        OutputFormat::Json => serde_json::to_string_pretty(&model)?,
        OutputFormat::Dot => {
            let rankdir = options
                .rankdir
                .unwrap_or_else(|| RankDir::for_variant(model.variant));
            to_dot(&model, rankdir)
        }
        OutputFormat::Svg => {
            let size = args
                .width
                .zip(args.height)
                .map(|(width, height)| Size::new(width, height));
            render_svg(model, options, size, args.highlight.as_deref())?
        }
    };

    match &args.output {
        Some(path) => {
            fs::write(path, rendered)?;
            debug!("Wrote {}", path);
        }
        None => print!("{}", rendered),
    }

    Ok(())
}

fn load_model(args: &Cli, config: &Config) -> Result<GraphModel> {
    let needs_api = args.spec.is_none() || args.run_id.is_some();
    let api = match (&args.workflow, &args.pipeline) {
        (Some(workflow), Some(pipeline)) if needs_api => {
            Some((ApiClient::new(&config.api)?, workflow, pipeline))
        }
        _ => None,
    };

    let spec = match (&args.spec, &api) {
        (Some(path), _) => PipelineSpec::from_file(path)?,
        (None, Some((client, workflow, pipeline))) => client.pipeline_spec(workflow, pipeline)?,
        (None, None) => {
            return Err(GraphError::Task(
                "No pipeline given, use --spec or --workflow with --pipeline".to_string(),
            ));
        }
    };

    let run = match (&args.run, &api, &args.run_id) {
        (Some(path), _, _) => Some(RunStatus::from_file(path)?),
        (None, Some((client, workflow, pipeline)), Some(run_id)) => {
            Some(client.pipeline_run(workflow, pipeline, run_id)?)
        }
        _ => None,
    };

    Ok(match run {
        Some(run) => build_graph_verbose(&merge(&spec, &run)),
        None => build_graph(&spec.tasks),
    })
}

fn render_svg(
    model: GraphModel,
    options: render::RenderOptions,
    size: Option<Size>,
    highlight: Option<&str>,
) -> Result<String> {
    let mut surface = match size {
        Some(size) => MemorySurface::with_size("pipegraph", size),
        None => MemorySurface::new("pipegraph"),
    };

    let mut handle = render::open(&mut surface, model, options)?;
    if let Some(task) = highlight {
        handle.pointer_enter(task)?;
    }
    render::close(handle);

    surface
        .into_svg()
        .ok_or_else(|| GraphError::Task("Nothing was rendered".to_string()))
}
