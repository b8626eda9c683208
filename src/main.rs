use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use paperexport::dom::Document;
use paperexport::{theme, DirectorySink, ExportConfig, PaperExporter};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "paperexport", version, about = "Export papers as PNG captures or standalone HTML")]
struct Cli {
    /// JSON export configuration
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory downloads are written to
    #[arg(long, global = true, default_value = ".")]
    out_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Wrap HTML content in a standalone document
    Html {
        input: PathBuf,
        #[arg(long, default_value = "inter")]
        font: String,
        #[arg(long, default_value = "light")]
        theme: String,
        #[arg(long)]
        no_watermark: bool,
        #[arg(long, default_value = "paper.html")]
        filename: String,
    },
    /// Rasterize one element of an HTML page to PNG
    Png {
        input: PathBuf,
        #[arg(long, default_value = "paper")]
        element: String,
        /// Defaults to the theme background
        #[arg(long)]
        background: Option<String>,
        #[arg(long, default_value = "light")]
        theme: String,
        #[arg(long)]
        no_watermark: bool,
    },
    /// List built-in themes
    Themes,
}

fn find_theme(id: &str) -> anyhow::Result<paperexport::ThemeConfig> {
    theme::find_theme(id).ok_or_else(|| anyhow!("unknown theme {:?} (see `paperexport themes`)", id))
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => ExportConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ExportConfig::default(),
    };
    let mut exporter = PaperExporter::new(DirectorySink::new(cli.out_dir.clone())).with_config(config);

    match cli.command {
        Command::Html { input, font, theme, no_watermark, filename } => {
            let content = std::fs::read_to_string(&input)
                .with_context(|| format!("reading {}", input.display()))?;
            let theme = find_theme(&theme)?;
            let html = exporter.create_html_export(&content, &font, &theme, !no_watermark);
            exporter.download_file(&html, "text/html", &filename)?;
            println!("{}", cli.out_dir.join(&filename).display());
        }
        Command::Png { input, element, background, theme, no_watermark } => {
            let page = std::fs::read_to_string(&input)
                .with_context(|| format!("reading {}", input.display()))?;
            let theme = find_theme(&theme)?;
            let background = background.unwrap_or_else(|| theme.background_color.clone());
            let mut doc = Document::parse(&page);
            match exporter
                .capture(&mut doc, &element, &background, !no_watermark, Some(&theme))
                .await?
            {
                Some(filename) => println!("{}", cli.out_dir.join(filename).display()),
                None => eprintln!("no element with id {:?}; nothing exported", element),
            }
        }
        Command::Themes => {
            for t in theme::builtin_themes() {
                let tone = if t.is_dark() { "dark" } else { "light" };
                println!("{:<10} {:<8} {}", t.id, tone, t.background_color);
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("paperexport: {:#}", e);
        std::process::exit(1);
    }
}
