use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use overmark::{
    BlankPages, ExportJob, ExportMode, ExportOptions, FontBook, GradingSession, ImagePages,
    LayerToggles, PageSource, PngDirSink, Project, RenderContext, Role, SvgCoordinates, ViewMode,
};

#[derive(Parser, Debug)]
#[command(name = "overmark", version)]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Export annotated pages as PNG documents.
    Export(ExportArgs),
    /// Write the live-view SVG overlay of one task.
    View(ViewArgs),
}

#[derive(Parser, Debug)]
struct ExportArgs {
    /// Project JSON.
    #[arg(long)]
    project: PathBuf,

    /// Directory of page images, one file per page in name order.
    #[arg(long, conflicts_with = "blank_pages", required_unless_present = "blank_pages")]
    pages: Option<PathBuf>,

    /// Use this many blank A4 pages instead of page images.
    #[arg(long)]
    blank_pages: Option<u32>,

    /// Output directory; each document becomes a subdirectory.
    #[arg(long)]
    out: PathBuf,

    /// One document per student.
    #[arg(long, default_value_t = false)]
    individual: bool,

    /// Whose corrections to export.
    #[arg(long, default_value = "first")]
    role: Role,

    /// Draw the model solution beneath the corrections.
    #[arg(long, default_value_t = false)]
    solution: bool,

    /// Append model-solution-only pages.
    #[arg(long, default_value_t = false)]
    append_solution: bool,

    /// Page raster scale.
    #[arg(long, default_value_t = 2.0)]
    scale: f64,
}

#[derive(Parser, Debug)]
struct ViewArgs {
    /// Project JSON.
    #[arg(long)]
    project: PathBuf,

    /// Student index, starting at 0.
    #[arg(long, default_value_t = 0)]
    student: usize,

    /// Task id.
    #[arg(long)]
    task: String,

    /// Viewer role.
    #[arg(long, default_value = "first")]
    role: Role,

    /// Show the whole page instead of the cropped region.
    #[arg(long, default_value_t = false)]
    full_page: bool,

    /// Show the other grader's layer when allowed.
    #[arg(long, default_value_t = false)]
    show_other: bool,

    /// Show the model solution underlay.
    #[arg(long, default_value_t = false)]
    show_solution: bool,

    /// Surface width in pixels.
    #[arg(long, default_value_t = 800.0)]
    width: f64,

    /// Surface height in pixels.
    #[arg(long, default_value_t = 600.0)]
    height: f64,

    /// Output SVG path.
    #[arg(long)]
    out: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Export(args) => cmd_export(args),
        Command::View(args) => cmd_view(args),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_export(args: ExportArgs) -> anyhow::Result<()> {
    let project = Project::from_path(&args.project)?;

    let mut pages: Box<dyn PageSource> = match (&args.pages, args.blank_pages) {
        (Some(dir), _) => Box::new(ImagePages::from_dir(dir)?),
        (None, Some(n)) => Box::new(BlankPages::new(n)),
        (None, None) => anyhow::bail!("either --pages or --blank-pages is required"),
    };

    let opts = ExportOptions::for_viewer(args.role)
        .with_scale(args.scale)
        .with_mode(if args.individual {
            ExportMode::Individual
        } else {
            ExportMode::Collective
        })
        .with_solution(args.solution)
        .with_solution_pages(args.append_solution)
        .with_solution_opacity(project.solution_opacity_or(ExportOptions::default().solution_opacity));

    let mut fonts = FontBook::system();
    let mut sink = PngDirSink::new(&args.out);
    let mut job = ExportJob::new(&project, opts);
    let mut last = 0u32;
    let report = job.run(pages.as_mut(), &mut fonts, &mut sink, &mut |pct| {
        let step = (pct / 10.0).floor() as u32;
        if step > last {
            last = step;
            tracing::info!(percent = pct.round(), "exporting");
        }
    })?;

    for skipped in &report.skipped {
        eprintln!("skipped page {}: {}", skipped.source_page, skipped.reason);
    }
    eprintln!(
        "wrote {} pages in {} documents to {}",
        report.pages_written,
        report.documents,
        args.out.display()
    );
    Ok(())
}

fn cmd_view(args: ViewArgs) -> anyhow::Result<()> {
    let project = Project::from_path(&args.project)?;
    let mut session = GradingSession::new(project, args.role)?;
    session.select_student(args.student)?;
    session.select_task(&args.task)?;
    session.set_view_mode(if args.full_page {
        ViewMode::FullPage
    } else {
        ViewMode::Cropped
    });
    session.set_toggles(LayerToggles {
        show_other_role: args.show_other,
        show_solution: args.show_solution,
    });
    session.set_render_context(RenderContext::new(args.width, args.height));

    let mut fonts = FontBook::system();
    let svg = session.render_svg(&mut fonts, SvgCoordinates::Normalized)?;

    if let Some(parent) = args.out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(&args.out, svg).with_context(|| format!("write svg '{}'", args.out.display()))?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}
