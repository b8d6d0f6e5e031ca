//! End-to-end report run: query, export, render, mail.

use crate::config::{Config, TemplateConfig};
use crate::db::{QueryExecutor, QuerySource};
use crate::error::{ReportError, Result};
use crate::html::HtmlBuilder;
use crate::mail::{MailRequest, MailTransport, Mailer, MailingReport, SmtpEndpoint, SmtpSession};
use crate::storage::{DataExporter, FileType};
use std::future::Future;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// A format that could not be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedExport {
    pub file_type: FileType,
    pub error: String,
}

/// Summary of one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineReport {
    pub rows: usize,
    pub written: Vec<(FileType, PathBuf)>,
    pub failed: Vec<FailedExport>,
    /// `None` when mailing is disabled.
    pub mailing: Option<MailingReport>,
}

impl PipelineReport {
    /// Path the given format was written to, if it succeeded.
    pub fn path_of(&self, file_type: FileType) -> Option<&Path> {
        self.written
            .iter()
            .find(|(written, _)| *written == file_type)
            .map(|(_, path)| path.as_path())
    }
}

/// Runs the report against PostgreSQL and the configured SMTP relay.
pub async fn run(config: &Config) -> Result<PipelineReport> {
    let executor = QueryExecutor::connect(&config.database).await?;
    run_with(config, executor, |endpoint| async move {
        SmtpSession::open(&endpoint).await
    })
    .await
}

/// Runs the report with an already-connected executor; `open_transport` is
/// only called when mailing is enabled.
pub async fn run_with<T, F, Fut>(
    config: &Config,
    executor: QueryExecutor,
    open_transport: F,
) -> Result<PipelineReport>
where
    T: MailTransport,
    F: FnOnce(SmtpEndpoint) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let source = QuerySource::parse(&config.query.query, &config.query.sql_dir);
    let result = executor
        .enquiry(&config.query.schema, &config.query.table, &source)
        .await?;

    let mut report = PipelineReport {
        rows: result.row_count(),
        ..PipelineReport::default()
    };

    let exporter = DataExporter::new(&result, &config.export.output_dir, &config.export.filename);
    for file_type in export_formats(config) {
        match exporter.create_file(file_type, config.export.hdf_key.as_deref()) {
            Ok(path) => report.written.push((file_type, path)),
            Err(e) => {
                warn!("{} export failed: {}", file_type, e);
                report.failed.push(FailedExport {
                    file_type,
                    error: e.to_string(),
                });
            }
        }
    }

    if !config.mail.enabled {
        info!("Mailing disabled, {} file(s) written", report.written.len());
        return Ok(report);
    }

    let html = render(&config.template)?;

    let attachment = match config.export.attach {
        Some(file_type) => Some(
            report
                .path_of(file_type)
                .map(Path::to_path_buf)
                .ok_or_else(|| {
                    ReportError::export(format!(
                        "{file_type} attachment was not written, mailing skipped"
                    ))
                })?,
        ),
        None => None,
    };

    let mailer = Mailer::establish(&config.mail, open_transport).await?;
    let request = MailRequest {
        subject: config.mail.subject.clone(),
        body: config.mail.body.clone(),
        recipients: config.mail.recipients.clone(),
        attachment,
        html: Some(html),
    };
    let mailing = mailer.run_mailing(&request).await?;

    info!(
        "Mailing finished: {} sent, {} rejected, {} failed",
        mailing.sent.len(),
        mailing.rejected.len(),
        mailing.failed.len()
    );
    report.mailing = Some(mailing);

    Ok(report)
}

/// Configured formats in order, plus the attachment format if missing.
fn export_formats(config: &Config) -> Vec<FileType> {
    let mut formats = Vec::new();
    for file_type in config.export.formats.iter().copied().chain(config.export.attach) {
        if !formats.contains(&file_type) {
            formats.push(file_type);
        }
    }
    formats
}

fn render(template: &TemplateConfig) -> Result<String> {
    let mut builder = HtmlBuilder::from_file(&template.path())?;

    if let Some(title) = &template.title {
        builder = builder.with_title(title);
    }
    if let Some(text) = &template.body_head_title {
        builder = builder.with_body_head_title(text);
    }
    if let Some(text) = &template.body_middle_text {
        builder = builder.with_body_middle_text(text);
    }
    if let Some(text) = &template.body_bottom_text {
        builder = builder.with_body_bottom_text(text);
    }

    builder.build()
}
