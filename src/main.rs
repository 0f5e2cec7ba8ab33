use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use toolshed::{
    card::CardOptions,
    export::{self, ExportOptions},
    qr::{self, QrOptions},
    rename::{self, RenameOp, RenameOptions},
};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(
    name = "toolshed",
    version,
    author,
    about = "Small file utilities: social cards, bulk renames, QR codes, PLCopen exports",
    long_about = "A collection of independent file utilities behind one binary.\n\n\
    USAGE EXAMPLES:\n  \
      # Compose a GitHub social-preview card\n  \
      toolshed card --title my-repo --image ./logo.png --subtext \"An awesome project!\"\n\n  \
      # Strip an IMG_ prefix from every photo in a directory\n  \
      toolshed rename ./photos remove-prefix IMG_ --pattern '*.jpg'\n\n  \
      # Encode a URL as a QR PNG with a caption\n  \
      toolshed qr \"https://example.com\" --name homepage --label \"scan me\"\n\n  \
      # Export cross-reference and call graph from a PLCopen XML export\n  \
      toolshed export --dir ./my-plc-project"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compose a GitHub social-preview card PNG
    Card {
        /// Repository name used as the heading
        #[arg(long, default_value = "My Awesome Repo")]
        title: String,

        /// Path to the center image
        #[arg(long, value_name = "FILE")]
        image: PathBuf,

        /// Description text below the image
        #[arg(long, default_value = "An awesome project!")]
        subtext: String,

        /// Output PNG path
        #[arg(short, long, default_value = "social_preview.png", value_name = "FILE")]
        out: PathBuf,

        /// Font family for the text
        #[arg(long, default_value = "Sans")]
        font: String,
    },

    /// Bulk-rename the files of a directory
    Rename {
        /// Directory whose files are renamed (non-recursive)
        directory: PathBuf,

        /// Renaming operation
        #[arg(value_enum)]
        op: CliRenameOp,

        /// Text to add or remove
        text: String,

        /// Only touch files matching this glob (e.g. '*.jpg')
        #[arg(long, value_name = "GLOB")]
        pattern: Option<String>,

        /// Plan the renames without applying them
        #[arg(long)]
        dry_run: bool,
    },

    /// Generate a QR code PNG
    Qr {
        /// Text or URL to encode
        data: String,

        /// Output name without extension
        #[arg(long, default_value = "qrcode")]
        name: String,

        /// Pixels per module
        #[arg(long, default_value_t = 10)]
        module_size: u32,

        /// Quiet zone width in modules
        #[arg(long, default_value_t = 4)]
        quiet_zone: u32,

        /// Error-correction level
        #[arg(long, value_enum, default_value = "l")]
        ec_level: CliEcLevel,

        /// Caption rendered below the symbol
        #[arg(long)]
        label: Option<String>,
    },

    /// Export cross-reference and call graph from a PLCopen XML project
    Export {
        /// Directory searched for the newest .xml export
        #[arg(short, long, default_value = ".", value_name = "PATH")]
        dir: PathBuf,

        /// Explicit PLCopen XML file (skips discovery)
        #[arg(long, value_name = "FILE")]
        xml: Option<PathBuf>,

        /// Output directory (default: Exports beside the XML)
        #[arg(short, long, value_name = "PATH")]
        out: Option<PathBuf>,

        /// Overwrite outputs without keeping backups
        #[arg(long)]
        no_backup: bool,
    },
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliRenameOp {
    /// Prepend text to each file name
    AddPrefix,
    /// Insert text before the extension
    AddSuffix,
    /// Strip text from the start of matching names
    RemovePrefix,
    /// Strip text from the end of matching stems
    RemoveSuffix,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliEcLevel {
    /// ~7% recovery
    L,
    /// ~15% recovery
    M,
    /// ~25% recovery
    Q,
    /// ~30% recovery
    H,
}

impl From<CliEcLevel> for qrcode::EcLevel {
    fn from(level: CliEcLevel) -> Self {
        match level {
            CliEcLevel::L => Self::L,
            CliEcLevel::M => Self::M,
            CliEcLevel::Q => Self::Q,
            CliEcLevel::H => Self::H,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_tracing(cli.verbose)?;

    match cli.command {
        Command::Card {
            title,
            image,
            subtext,
            out,
            font,
        } => {
            let options = CardOptions::builder()
                .title(title)
                .image_path(image)
                .subtext(subtext)
                .output(out)
                .font_family(font)
                .build()
                .context("Failed to build card options")?;
            toolshed::card::render(&options).context("Failed to create card")?;
        }

        Command::Rename {
            directory,
            op,
            text,
            pattern,
            dry_run,
        } => {
            let op = match op {
                CliRenameOp::AddPrefix => RenameOp::AddPrefix(text),
                CliRenameOp::AddSuffix => RenameOp::AddSuffix(text),
                CliRenameOp::RemovePrefix => RenameOp::RemovePrefix(text),
                CliRenameOp::RemoveSuffix => RenameOp::RemoveSuffix(text),
            };
            let renamed = rename::run(&RenameOptions {
                directory,
                op,
                pattern,
                dry_run,
            })
            .context("Rename failed")?;
            println!("{} file(s) renamed", renamed.len());
        }

        Command::Qr {
            data,
            name,
            module_size,
            quiet_zone,
            ec_level,
            label,
        } => {
            let options = QrOptions {
                data,
                module_size,
                quiet_zone,
                ec_level: ec_level.into(),
                label,
            };
            let path = PathBuf::from(format!("{name}.png"));
            qr::save(&options, &path).context("Failed to generate QR code")?;
        }

        Command::Export {
            dir,
            xml,
            out,
            no_backup,
        } => {
            let stats = export::run(&ExportOptions {
                input: xml,
                search_dir: dir,
                output_dir: out,
                backup_existing: !no_backup,
            })
            .context("Export failed")?;
            println!(
                "Exported {} POUs: {} cross-reference rows, {} call edges -> {}",
                stats.pou_count, stats.crossref_rows, stats.call_edges, stats.output_directory
            );
        }
    }

    Ok(())
}

fn setup_tracing(verbosity: u8) -> anyhow::Result<()> {
    let filter = match verbosity {
        0 => EnvFilter::new("toolshed=info"),
        1 => EnvFilter::new("toolshed=debug"),
        _ => EnvFilter::new("toolshed=trace"),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_thread_ids(false))
        .init();

    Ok(())
}
