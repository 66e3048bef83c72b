//! PDF Converter
//!
//! Command-line front end: document info, previews, batch conversion,
//! language settings and the translation tool-chain.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pdf_converter::catalog::{self, Extractor};
use pdf_converter::cli::{
    Cli, Commands, ConvertArgs, DoctorArgs, I18nCommand, InfoArgs, LangCommand, PreviewArgs,
};
use pdf_converter::config::{Config, ConfigStore};
use pdf_converter::convert::{ConversionEvent, ConversionJob};
use pdf_converter::diagnostics;
use pdf_converter::document::{DocumentResult, PageSource};
use pdf_converter::i18n::{self, Locales};
use pdf_converter::mupdf::SafeDocument;
use pdf_converter::preview::{self, PreviewOptions};
use pdf_converter::{tr, tr_fmt};

/// Settings resolved once per run
struct App {
    store: ConfigStore,
    config: Config,
    locales: Locales,
    language: String,
}

impl App {
    fn load(cli: &Cli) -> Result<Self> {
        let store = ConfigStore::open_default().context("Failed to locate the settings directory")?;

        let config = store
            .load()
            .unwrap_or_else(|e| {
                tracing::warn!("{}, using defaults", e);
                Config::default()
            })
            .with_env_overrides();

        let language = cli
            .lang
            .clone()
            .unwrap_or_else(|| config.general.language.clone());
        let locales = Locales::resolve(
            cli.locales
                .as_deref()
                .or(config.general.locales_dir.as_deref()),
        );

        i18n::init(&locales, &language);
        tracing::debug!(
            "Language '{}' with catalogs from {}",
            language,
            locales.dir().display()
        );

        Ok(Self {
            store,
            config,
            locales,
            language,
        })
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            let message = format!("{:#}", e);
            eprintln!("{}", tr_fmt("Error: {message}", &[("message", &message)]));
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "pdf_converter=debug"
    } else {
        "pdf_converter=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let app = App::load(&cli)?;

    match cli.command {
        Commands::Info(args) => info(args).await,
        Commands::Preview(args) => preview_pages(&app, args).await,
        Commands::Convert(args) => convert(args).await,
        Commands::Lang(cmd) => lang(&app, cmd),
        Commands::I18n(cmd) => i18n_tools(&app, cmd),
        Commands::Doctor(args) => doctor(&app, args),
    }
}

async fn open(path: &Path) -> Result<Arc<SafeDocument>> {
    let owned = path.to_path_buf();
    let doc = tokio::task::spawn_blocking(move || SafeDocument::open(owned))
        .await
        .context("Document worker failed")?
        .with_context(|| tr_fmt("Could not open {path}", &[("path", &path.display())]))?;
    Ok(Arc::new(doc))
}

async fn info(args: InfoArgs) -> Result<ExitCode> {
    let doc = open(&args.file).await?;

    let (info, has_text) =
        tokio::task::spawn_blocking(move || -> DocumentResult<_> {
            Ok((doc.info()?, doc.has_text_layer()?))
        })
        .await
        .context("Document worker failed")??;

    if args.json {
        let mut value = serde_json::to_value(&info)?;
        value["textLayer"] = has_text.into();
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(ExitCode::SUCCESS);
    }

    println!("{}", tr_fmt("File: {path}", &[("path", &info.path.display())]));
    println!("{}", tr_fmt("Title: {title}", &[("title", &info.title)]));
    if let Some(author) = &info.author {
        println!("{}", tr_fmt("Author: {author}", &[("author", author)]));
    }
    println!("{}", tr_fmt("Pages: {count}", &[("count", &info.page_count)]));

    let layer = if has_text { tr("yes") } else { tr("no") };
    println!("{}", tr_fmt("Text layer: {value}", &[("value", &layer)]));
    if !has_text {
        println!(
            "{}",
            tr("The first page has no text layer. Scanned pages convert to empty text.")
        );
    }

    for (i, size) in info.pages.iter().enumerate() {
        println!("  {:>4}  {:.1} x {:.1} pt", i + 1, size.width, size.height);
    }
    Ok(ExitCode::SUCCESS)
}

async fn preview_pages(app: &App, args: PreviewArgs) -> Result<ExitCode> {
    let doc = open(&args.file).await?;
    let max_pages = args.pages_or(app.config.general.preview_pages);

    if doc.page_count() == 0 {
        println!("{}", tr("The document has no pages."));
        return Ok(ExitCode::SUCCESS);
    }

    if args.text {
        let worker = doc.clone();
        let preview =
            tokio::task::spawn_blocking(move || preview::text_preview(worker.as_ref(), max_pages))
                .await
                .context("Document worker failed")??;

        println!("{}", preview.text);
        print_remaining(preview.remaining());
        return Ok(ExitCode::SUCCESS);
    }

    let opts = PreviewOptions::new(max_pages, args.width_or(app.config.general.preview_width));
    let preview = preview::render_preview_async(doc, opts).await?;

    let dir = args
        .out
        .clone()
        .unwrap_or_else(|| default_preview_dir(&args.file));
    let written = preview::write_preview(&preview, &dir)
        .with_context(|| tr_fmt("Could not write to {path}", &[("path", &dir.display())]))?;

    for path in &written {
        println!("{}", tr_fmt("Saved preview to {path}", &[("path", &path.display())]));
    }
    print_remaining(preview.remaining());
    Ok(ExitCode::SUCCESS)
}

/// `report.pdf` -> `report-preview/`
fn default_preview_dir(file: &Path) -> PathBuf {
    let stem = file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    file.with_file_name(format!("{}-preview", stem))
}

fn print_remaining(remaining: usize) {
    if remaining > 0 {
        println!("{}", tr_fmt("... {n} more pages ...", &[("n", &remaining)]));
    }
}

async fn convert(args: ConvertArgs) -> Result<ExitCode> {
    if args.output.is_some() && args.files.len() > 1 {
        bail!(tr("--output can only be used with a single input file"));
    }

    let total = args.files.len();
    let mut failed = 0usize;

    for file in &args.files {
        let mut job = ConversionJob::new(file, args.format);
        if let Some(output) = &args.output {
            job = job.with_output(output);
        }

        let (handle, mut events) = job.spawn_file();
        while let Some(event) = events.recv().await {
            if args.json {
                println!("{}", serde_json::to_string(&event)?);
            } else {
                print_event(&event);
            }
        }

        if handle.join().await.is_err() {
            failed += 1;
        }
    }

    if failed > 0 {
        eprintln!(
            "{}",
            tr_fmt(
                "{failed} of {total} conversions failed",
                &[("failed", &failed), ("total", &total)]
            )
        );
        return Ok(ExitCode::FAILURE);
    }

    if !args.json {
        println!("{}", tr("Conversion complete"));
    }
    Ok(ExitCode::SUCCESS)
}

fn print_event(event: &ConversionEvent) {
    match event {
        ConversionEvent::Started { file, format } => {
            println!("{}: {} -> {}", tr("Convert"), file.display(), format);
        }
        ConversionEvent::Processing => println!("{}", tr("Processing...")),
        ConversionEvent::Page { index, total } => {
            print!(
                "\r{}",
                tr_fmt("Page {index}/{total}", &[("index", index), ("total", total)])
            );
            if index == total {
                println!();
            }
            let _ = io::stdout().flush();
        }
        ConversionEvent::Finished { output } => {
            println!("{}", tr_fmt("Saved to {path}", &[("path", &output.display())]));
        }
        ConversionEvent::Failed { message } => {
            eprintln!("{}", tr_fmt("Error: {message}", &[("message", message)]));
        }
    }
}

fn lang(app: &App, cmd: LangCommand) -> Result<ExitCode> {
    match cmd {
        LangCommand::List => {
            for code in app.locales.available() {
                let marker = if code == app.language { "*" } else { " " };
                println!("{} {}", marker, code);
            }
        }
        LangCommand::Get => {
            println!("{}", app.store.language()?);
        }
        LangCommand::Set { code, force } => {
            let known =
                i18n::is_source_language(&code) || app.locales.find_catalog(&code).is_some();
            if !force && !known {
                let list = app.locales.available().join(", ");
                bail!(tr_fmt(
                    "No catalog for '{lang}'. Available: {available}",
                    &[("lang", &code), ("available", &list)]
                ));
            }

            app.store.set_language(&code).with_context(|| {
                tr_fmt(
                    "Could not save settings to {path}",
                    &[("path", &app.store.path().display())],
                )
            })?;

            println!("{}", tr_fmt("Language set to {lang}", &[("lang", &code)]));
            println!("{}", tr("The new language applies from the next run."));
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn i18n_tools(app: &App, cmd: I18nCommand) -> Result<ExitCode> {
    let locales_dir = app.locales.dir();

    match cmd {
        I18nCommand::Extract { src, out } => {
            let messages = Extractor::new()
                .extract_dir(&src)
                .with_context(|| tr_fmt("Could not scan {path}", &[("path", &src.display())]))?;
            let out = out.unwrap_or_else(|| locales_dir.join(format!("{}.pot", catalog::DOMAIN)));
            catalog::pot::write_pot(&messages, &out)?;

            println!(
                "{}",
                tr_fmt(
                    "Extracted {count} messages to {path}",
                    &[("count", &messages.len()), ("path", &out.display())]
                )
            );
        }
        I18nCommand::Compile { files } => {
            let files = if files.is_empty() {
                discover_catalogs(locales_dir)?
            } else {
                files
            };
            if files.is_empty() {
                println!("{}", tr("No catalogs found."));
            }

            for po in files {
                let mo = po.with_extension("mo");
                let count = catalog::compile_po_file(&po, &mo)?;
                println!(
                    "{}",
                    tr_fmt(
                        "Compiled {path}: {count} entries",
                        &[("path", &mo.display()), ("count", &count)]
                    )
                );
            }
        }
        I18nCommand::Build { src } => {
            fs::create_dir_all(locales_dir)?;
            let report = catalog::build_locales(locales_dir, &src)?;

            println!(
                "{}",
                tr_fmt(
                    "Extracted {count} messages to {path}",
                    &[("count", &report.extracted), ("path", &report.template.display())]
                )
            );
            for (code, count) in &report.compiled {
                println!(
                    "{}",
                    tr_fmt(
                        "Compiled {lang}: {count} entries",
                        &[("lang", code), ("count", count)]
                    )
                );
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Every `<lang>/LC_MESSAGES/messages.po` under the locales directory
fn discover_catalogs(locales_dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(locales_dir)
        .with_context(|| tr_fmt("Could not scan {path}", &[("path", &locales_dir.display())]))?;

    let mut found: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_dir())
        .map(|entry| {
            let lang = entry.file_name().to_string_lossy().into_owned();
            catalog::catalog_path(locales_dir, &lang, "po")
        })
        .filter(|path| path.is_file())
        .collect();
    found.sort();
    Ok(found)
}

fn doctor(app: &App, args: DoctorArgs) -> Result<ExitCode> {
    let report = diagnostics::run(&app.store, &app.locales, Some(app.language.as_str()));

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report);
    }

    Ok(if report.is_healthy() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
