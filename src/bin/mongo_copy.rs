use clap::Parser;
use mongo_copy::{
    open_or_abort, ConfFile, CopyConf, EndpointConf, ErrorPolicy, MigrateConf, MigrationReport,
    Migrator, EXIT_CONFIG,
};
use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Replace every collection of target mongodb database with the one from source.
#[derive(Parser, Debug)]
#[command(version, author, about)]
struct Opts {
    /// configuration file path, values given by flags or environment variables win over it.
    #[arg(short, long, env = "MONGO_COPY_CONF")]
    conf: Option<PathBuf>,
    /// source database uri, begins with 'mongodb://'.
    #[arg(long, env = "MONGO_COPY_SRC_URI", hide_env_values = true)]
    src_uri: Option<String>,
    /// source database name.
    #[arg(long, env = "MONGO_COPY_SRC_DB")]
    src_db: Option<String>,
    /// target database uri, begins with 'mongodb://'.
    #[arg(long, env = "MONGO_COPY_DST_URI", hide_env_values = true)]
    dst_uri: Option<String>,
    /// target database name.
    #[arg(long, env = "MONGO_COPY_DST_DB")]
    dst_db: Option<String>,
    /// how many documents are read and inserted at once.
    #[arg(long, env = "MONGO_COPY_BATCH_SIZE")]
    batch_size: Option<usize>,
    /// what to do when one collection fails to copy.
    #[arg(long, env = "MONGO_COPY_ON_ERROR", value_enum)]
    on_error: Option<ErrorPolicy>,
    /// clear target collection even when source collection is empty, `--clear-empty=false`
    /// turns off a `clear_empty = true` from configuration file.
    #[arg(
        long,
        env = "MONGO_COPY_CLEAR_EMPTY",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    clear_empty: Option<bool>,
    /// only list source collections and their document counts, change nothing.
    #[arg(long)]
    dry_run: bool,
    /// compare source and target document counts after copying.
    #[arg(long)]
    verify: bool,
    /// log file path, if not specified, all log information will be output to stdout.
    #[arg(long)]
    log_path: Option<PathBuf>,
    /// output logs as json lines.
    #[arg(long)]
    json_logs: bool,
}

impl Opts {
    fn to_conf_file(&self) -> ConfFile {
        ConfFile {
            src: EndpointConf {
                uri: self.src_uri.clone(),
                db: self.src_db.clone(),
            },
            dst: EndpointConf {
                uri: self.dst_uri.clone(),
                db: self.dst_db.clone(),
            },
            copy: CopyConf {
                batch_size: self.batch_size,
                on_error: self.on_error,
                clear_empty: self.clear_empty,
            },
        }
    }

    fn load_conf(&self) -> mongo_copy::Result<MigrateConf> {
        let file = match &self.conf {
            Some(path) => ConfFile::from_path(path)?,
            None => ConfFile::default(),
        };
        file.merge(self.to_conf_file()).build()
    }
}

fn init_logging(opts: &Opts) -> Result<WorkerGuard, Box<dyn Error>> {
    let (non_blocking, guard) = match &opts.log_path {
        Some(path) => {
            let dir_name = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let file_name = path.file_name().ok_or("log path should contain a file name")?;
            let file_appender = tracing_appender::rolling::daily(dir_name, file_name);
            tracing_appender::non_blocking(file_appender)
        }
        None => tracing_appender::non_blocking(std::io::stdout()),
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let collector = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(non_blocking);
    if opts.json_logs {
        collector.json().init();
    } else {
        collector.init();
    }
    Ok(guard)
}

fn log_summary(report: &MigrationReport) {
    for coll in report.collections.iter() {
        info!(
            coll = %coll.name,
            deleted = coll.deleted,
            inserted = coll.inserted,
            skipped = coll.skipped,
            "Migrated collection."
        );
    }
    for failure in report.failures.iter() {
        error!(coll = %failure.name, error = %failure.error, "Failed collection.");
    }
    info!(
        collections = report.collections_processed(),
        failed = report.failures.len(),
        total = report.total_migrated(),
        elapsed_ms = report.elapsed().map_or(0, |d| d.num_milliseconds()),
        "Migration summary."
    );
}

fn main() -> ExitCode {
    let opts: Opts = Opts::parse();
    let _guard = match init_logging(&opts) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Setting up logging failed: {}", e);
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    let conf = match opts.load_conf() {
        Ok(conf) => conf,
        Err(e) => {
            error!(error = %e, "Load configuration failed.");
            return ExitCode::from(e.exit_code());
        }
    };
    info!("Use the following config to migrate database: {:?}", conf);

    let conn = match open_or_abort(&conf) {
        Ok(conn) => conn,
        Err(aborted) => {
            error!(error = %aborted.cause, "Connect failed, nothing was migrated.");
            return ExitCode::from(aborted.cause.exit_code());
        }
    };
    let migrator = Migrator::new(conn.source(), conn.target(), &conf);

    if opts.dry_run {
        return match migrator.plan() {
            Ok(plans) => {
                let documents: u64 = plans.iter().map(|p| p.documents).sum();
                info!(
                    collections = plans.len(),
                    documents, "Dry run complete, nothing was changed."
                );
                ExitCode::SUCCESS
            }
            Err(e) => {
                error!(error = %e, "Dry run failed.");
                ExitCode::from(e.exit_code())
            }
        };
    }

    info!("Begin to migrate database.");
    let report = match migrator.run() {
        Ok(report) => report,
        Err(aborted) => {
            error!(
                coll = aborted.cause.collection().unwrap_or("-"),
                error = %aborted.cause,
                "Migration failed, collections below were migrated before the failure."
            );
            log_summary(&aborted.report);
            return ExitCode::from(aborted.cause.exit_code());
        }
    };
    log_summary(&report);

    if !opts.verify {
        return ExitCode::from(report.exit_code(None));
    }
    match migrator.verify(&report) {
        Ok(checks) => ExitCode::from(report.exit_code(Some(checks.as_slice()))),
        Err(e) => {
            error!(error = %e, "Verify migration failed.");
            ExitCode::from(e.exit_code())
        }
    }
}
