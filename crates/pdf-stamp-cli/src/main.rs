use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use pdf_stamp::{
    BatchSummary, CancelFlag, PagePosition, PageScope, SeamScope, SeamSide, SignatureMode,
    StampingOptions,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pdfstamp", about = "Seam stamps, page stamps and signatures for PDF batches", version)]
struct Cli {
    /// Log debug output (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Stamp a batch of PDF documents
    Stamp(StampArgs),

    /// Write a configuration file with default options
    InitConfig {
        /// Destination for the JSON configuration
        #[arg(default_value = "pdfstamp.json")]
        output: PathBuf,
    },
}

#[derive(Args)]
struct StampArgs {
    /// Input PDF files or directories
    inputs: Vec<PathBuf>,

    /// Base options from a JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Save the effective options to this file before stamping
    #[arg(long)]
    save_config: Option<PathBuf>,

    /// Scan directories recursively
    #[arg(short, long)]
    recursive: bool,

    /// Directory for stamped copies (omit to replace the inputs)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Replace the inputs even if the config names an output directory
    #[arg(long, conflicts_with = "output_dir")]
    in_place: bool,

    /// Overwrite existing files in the output directory
    #[arg(long)]
    overwrite: bool,

    /// Suffix appended to output file names
    #[arg(long)]
    suffix: Option<String>,

    /// Stamp image (PNG, JPEG, BMP, ...)
    #[arg(short, long)]
    image: Option<PathBuf>,

    /// Treat near-white pixels as transparent
    #[arg(long)]
    transparent: bool,

    /// Stamp opacity, 0-100
    #[arg(long)]
    opacity: Option<u8>,

    /// Rotate the stamp image clockwise, in degrees
    #[arg(long, allow_negative_numbers = true)]
    rotation: Option<f32>,

    /// Keep the original stamp width after rotation
    #[arg(long)]
    keep_bounds: bool,

    /// Printed stamp width in millimetres
    #[arg(long)]
    width_mm: Option<f32>,

    /// Password for encrypted inputs
    #[arg(long)]
    password: Option<String>,

    /// Encrypt the outputs with this password
    #[arg(long)]
    encrypt: Option<String>,

    /// Pages that receive a seam slice
    #[arg(long, value_enum)]
    seam: Option<SeamScopeArg>,

    /// Custom seam pages, comma separated
    #[arg(long, value_delimiter = ',')]
    seam_pages: Vec<u32>,

    /// Page edge the seam stamp runs along
    #[arg(long, value_enum)]
    seam_side: Option<SideArg>,

    /// Seam position along the edge, 0-100
    #[arg(long)]
    seam_offset: Option<f32>,

    /// Maximum seam slices held in memory at once
    #[arg(long)]
    seam_batch: Option<usize>,

    /// Pages that receive a full stamp
    #[arg(long, value_enum)]
    pages: Option<PageScopeArg>,

    /// Custom stamp pages, comma separated
    #[arg(long, value_delimiter = ',')]
    page_list: Vec<u32>,

    /// Horizontal position of the page stamp, 0-1
    #[arg(long)]
    x: Option<f32>,

    /// Vertical position of the page stamp, 0-1 from the bottom
    #[arg(long)]
    y: Option<f32>,

    /// Per-page position, PAGE:X:Y (repeatable)
    #[arg(long = "at", value_parser = parse_override)]
    overrides: Vec<(u32, PagePosition)>,

    /// Nudge each page stamp slightly
    #[arg(long)]
    randomize: bool,

    /// Seed for the page stamp nudges
    #[arg(long)]
    jitter_seed: Option<u64>,

    /// Sign the outputs
    #[arg(long, value_enum)]
    sign: Option<SignatureArg>,

    /// PEM file holding the certificate chain and private key
    #[arg(long)]
    cert: Option<PathBuf>,

    /// Password for an encrypted private key
    #[arg(long)]
    cert_password: Option<String>,

    /// Signature reason
    #[arg(long)]
    reason: Option<String>,

    /// Signature location
    #[arg(long)]
    location: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum SeamScopeArg {
    None,
    All,
    Odd,
    Even,
    Custom,
}

#[derive(Clone, Copy, ValueEnum)]
enum PageScopeArg {
    None,
    All,
    SkipFirst,
    SkipLast,
    Custom,
}

#[derive(Clone, Copy, ValueEnum)]
enum SideArg {
    Left,
    Right,
    Top,
    Bottom,
}

#[derive(Clone, Copy, ValueEnum)]
enum SignatureArg {
    None,
    SelfSigned,
    Certificate,
}

impl From<SeamScopeArg> for SeamScope {
    fn from(arg: SeamScopeArg) -> Self {
        match arg {
            SeamScopeArg::None => Self::None,
            SeamScopeArg::All => Self::All,
            SeamScopeArg::Odd => Self::Odd,
            SeamScopeArg::Even => Self::Even,
            SeamScopeArg::Custom => Self::Custom,
        }
    }
}

impl From<PageScopeArg> for PageScope {
    fn from(arg: PageScopeArg) -> Self {
        match arg {
            PageScopeArg::None => Self::None,
            PageScopeArg::All => Self::All,
            PageScopeArg::SkipFirst => Self::SkipFirst,
            PageScopeArg::SkipLast => Self::SkipLast,
            PageScopeArg::Custom => Self::Custom,
        }
    }
}

impl From<SideArg> for SeamSide {
    fn from(arg: SideArg) -> Self {
        match arg {
            SideArg::Left => Self::Left,
            SideArg::Right => Self::Right,
            SideArg::Top => Self::Top,
            SideArg::Bottom => Self::Bottom,
        }
    }
}

impl From<SignatureArg> for SignatureMode {
    fn from(arg: SignatureArg) -> Self {
        match arg {
            SignatureArg::None => Self::None,
            SignatureArg::SelfSigned => Self::SelfSigned,
            SignatureArg::Certificate => Self::CustomCertificate,
        }
    }
}

fn parse_override(value: &str) -> Result<(u32, PagePosition), String> {
    let parts: Vec<&str> = value.split(':').collect();
    let [page, x, y] = parts.as_slice() else {
        return Err(format!("expected PAGE:X:Y, got '{}'", value));
    };
    let page = page
        .parse::<u32>()
        .map_err(|e| format!("invalid page '{}': {}", page, e))?;
    let x = x.parse::<f32>().map_err(|e| format!("invalid x '{}': {}", x, e))?;
    let y = y.parse::<f32>().map_err(|e| format!("invalid y '{}': {}", y, e))?;
    Ok((page, PagePosition::new(x, y)))
}

impl StampArgs {
    /// Layer the command line over the base options
    fn apply(self, options: &mut StampingOptions) {
        options.input_paths.extend(self.inputs);
        options.recursive |= self.recursive;
        if self.output_dir.is_some() {
            options.output_dir = self.output_dir;
        }
        if self.in_place {
            options.output_dir = None;
        }
        options.overwrite |= self.overwrite;
        if let Some(suffix) = self.suffix {
            options.output_suffix = suffix;
        }

        if self.image.is_some() {
            options.stamp_image = self.image;
        }
        options.transparent |= self.transparent;
        options.keep_bounds |= self.keep_bounds;
        if let Some(opacity) = self.opacity {
            options.opacity_percent = opacity;
        }
        if let Some(rotation) = self.rotation {
            options.rotation_degrees = rotation;
        }
        if let Some(width) = self.width_mm {
            options.stamp_width_mm = width;
        }
        if self.password.is_some() {
            options.input_password = self.password;
        }
        if self.encrypt.is_some() {
            options.output_password = self.encrypt;
        }

        let seam = &mut options.seam;
        if let Some(scope) = self.seam {
            seam.scope = scope.into();
        }
        if !self.seam_pages.is_empty() {
            seam.custom_pages = self.seam_pages;
        }
        if let Some(side) = self.seam_side {
            seam.side = side.into();
        }
        if let Some(offset) = self.seam_offset {
            seam.offset_percent = offset;
        }
        if let Some(batch) = self.seam_batch {
            seam.max_batch_size = batch;
        }

        let page = &mut options.page;
        if let Some(scope) = self.pages {
            page.scope = scope.into();
        }
        if !self.page_list.is_empty() {
            page.custom_pages = self.page_list;
        }
        if let Some(x) = self.x {
            page.position.x = x;
        }
        if let Some(y) = self.y {
            page.position.y = y;
        }
        page.overrides.extend(self.overrides);
        page.randomize |= self.randomize;
        if self.jitter_seed.is_some() {
            page.jitter_seed = self.jitter_seed;
        }

        let signature = &mut options.signature;
        if let Some(mode) = self.sign {
            signature.mode = mode.into();
        }
        if self.cert.is_some() {
            signature.certificate_path = self.cert;
        }
        if self.cert_password.is_some() {
            signature.certificate_password = self.cert_password;
        }
        if self.reason.is_some() {
            signature.reason = self.reason;
        }
        if self.location.is_some() {
            signature.location = self.location;
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

fn print_summary(summary: &BatchSummary) {
    println!("Stamping Summary:");
    println!("  Documents written: {}", summary.processed());
    println!("  Documents skipped: {}", summary.skipped.len());
    println!("  Seam pages stamped: {}", summary.seam_pages_stamped);
    println!("  Page stamps applied: {}", summary.page_stamps_applied);
    if summary.documents_signed > 0 {
        println!("  Documents signed: {}", summary.documents_signed);
    }
    for (path, reason) in &summary.skipped {
        println!("  skipped {}: {}", path.display(), reason);
    }
}

async fn run_stamp(args: StampArgs) -> Result<()> {
    let mut options = match &args.config {
        Some(path) => StampingOptions::load(path)
            .await
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => StampingOptions::default(),
    };
    let save_config = args.save_config.clone();
    args.apply(&mut options);

    if let Some(path) = save_config {
        options.save(&path).await?;
        println!("Saved options → {}", path.display());
    }

    if options.input_paths.is_empty() {
        bail!("No input files or directories given");
    }

    let cancel = CancelFlag::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("Interrupted, stopping after the current step");
            on_interrupt.cancel();
        }
    });

    let summary = pdf_stamp::stamp_batch(options, cancel).await?;
    print_summary(&summary);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Stamp(args) => run_stamp(args).await?,

        Commands::InitConfig { output } => {
            StampingOptions::default().save(&output).await?;
            println!("Wrote default options → {}", output.display());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_override() {
        let (page, position) = parse_override("3:0.25:0.75").unwrap();
        assert_eq!(page, 3);
        assert_eq!(position, PagePosition::new(0.25, 0.75));

        assert!(parse_override("3:0.25").is_err());
        assert!(parse_override("x:0.1:0.2").is_err());
    }

    #[test]
    fn test_args_layer_over_config() {
        let cli = Cli::parse_from([
            "pdfstamp", "stamp", "in.pdf", "--in-place", "--seam", "custom", "--seam-pages",
            "1,3", "--seam-side", "top", "--pages", "skip-first", "--at", "2:0.1:0.9",
        ]);
        let Commands::Stamp(args) = cli.command else {
            panic!("expected stamp command");
        };

        let mut options = StampingOptions {
            output_dir: Some(PathBuf::from("out")),
            ..Default::default()
        };
        args.apply(&mut options);

        assert!(options.is_in_place());
        assert!(options.output_dir.is_none());
        assert_eq!(options.input_paths, vec![PathBuf::from("in.pdf")]);
        assert_eq!(options.seam.scope, SeamScope::Custom);
        assert_eq!(options.seam.custom_pages, vec![1, 3]);
        assert_eq!(options.seam.side, SeamSide::Top);
        assert_eq!(options.page.scope, PageScope::SkipFirst);
        assert_eq!(options.page.position_for(2), PagePosition::new(0.1, 0.9));
    }
}
