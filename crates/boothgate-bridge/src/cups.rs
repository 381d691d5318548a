// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// CUPS backend speaking IPP to the local scheduler.
//
// Uses the `ipp` crate's async client on a private current-thread runtime:
//   - CUPS-Get-Printers   queues and their `printer-state-reasons`
//   - Print-Job           job submission to `<server>/printers/<queue>`
//
// Every request is bounded by the configured request timeout, so a hung
// scheduler turns into an error instead of a stalled booth.

use std::fmt::Display;
use std::io::Cursor;
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use boothgate_core::PrinterConfig;
use boothgate_core::error::{BoothError, Result};
use boothgate_core::types::DeviceStatus;
use ipp::model::StatusCode;
use ipp::prelude::*;
use tokio::runtime::Runtime;
use tracing::{debug, error, info, instrument};

use crate::layout;
use crate::traits::{DeviceStatusSource, PrinterDevice};

/// Printer backed by a CUPS scheduler reached over IPP.
pub struct CupsIppPrinter {
    /// Scheduler base URI without trailing slash, e.g. `ipp://localhost:631`.
    server: String,
    /// Explicit queue name; otherwise the first queue matching `marker`.
    queue: Option<String>,
    marker: String,
    max_pages: u32,
    timeout: Duration,
    /// Pages submitted by this process.
    pages_sent: AtomicU32,
    /// Queue found by marker on the first successful lookup.
    resolved_queue: Mutex<Option<String>>,
    runtime: Runtime,
}

impl CupsIppPrinter {
    pub fn new(config: &PrinterConfig) -> Result<Self> {
        let server = config.cups_server.trim_end_matches('/').to_string();
        parse_uri(&format!("{server}/"))?;

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        Ok(Self {
            server,
            queue: config.cups_queue.clone(),
            marker: config.device_marker.to_ascii_uppercase(),
            max_pages: config.max_pages,
            timeout: config.request_timeout(),
            pages_sent: AtomicU32::new(0),
            resolved_queue: Mutex::new(None),
            runtime,
        })
    }

    pub fn pages_sent(&self) -> u32 {
        self.pages_sent.load(Ordering::SeqCst)
    }

    /// URI of a print queue on this scheduler.
    pub fn queue_uri(&self, queue: &str) -> Result<Uri> {
        parse_uri(&format!("{}/printers/{queue}", self.server))
    }

    fn matches(&self, name: &str) -> bool {
        match &self.queue {
            Some(queue) => name == queue,
            None => name.to_ascii_uppercase().contains(&self.marker),
        }
    }

    /// Queue jobs are sent to.
    fn target_queue(&self) -> Result<String> {
        if let Some(queue) = &self.queue {
            return Ok(queue.clone());
        }

        let mut resolved = self
            .resolved_queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(queue) = resolved.as_ref() {
            return Ok(queue.clone());
        }

        let queue = self
            .devices()?
            .into_iter()
            .map(|d| d.name)
            .find(|name| self.matches(name))
            .ok_or_else(|| BoothError::Device(format!("no CUPS queue matches '{}'", self.marker)))?;
        debug!(queue = %queue, "print queue resolved");
        *resolved = Some(queue.clone());
        Ok(queue)
    }

    /// Run one IPP request to completion, giving up after the request timeout.
    fn block_on<F, T, E>(&self, operation: &str, request: F) -> std::result::Result<T, String>
    where
        F: Future<Output = std::result::Result<T, E>>,
        E: Display,
    {
        self.runtime
            .block_on(async { tokio::time::timeout(self.timeout, request).await })
            .map_err(|_| format!("{operation} timed out after {:?}", self.timeout))?
            .map_err(|e| format!("{operation}: {e}"))
    }
}

impl PrinterDevice for CupsIppPrinter {
    fn is_installed(&self) -> bool {
        match self.devices() {
            Ok(devices) => devices.iter().any(|d| self.matches(&d.name)),
            Err(e) => {
                debug!(error = %e, "printer not installed: status query failed");
                false
            }
        }
    }

    fn is_ready(&self) -> bool {
        self.pages_sent() < self.max_pages
    }

    #[instrument(skip(self), fields(path = %path.display()))]
    fn print_file(&self, path: &Path, copies: u32) -> Result<()> {
        let queue = self.target_queue()?;
        let uri = self.queue_uri(&queue)?;
        let (document, format) = print_document(path, copies)?;
        let title = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "boothgate".into());

        let payload = IppPayload::new(Cursor::new(document));
        let operation = IppOperationBuilder::print_job(uri.clone(), payload)
            .job_title(&title)
            .document_format(format)
            .build();
        let client = AsyncIppClient::new(uri);

        debug!(queue = %queue, format, "sending Print-Job");
        let response = self
            .block_on("Print-Job", client.send(operation))
            .map_err(BoothError::Device)?;

        if !response.header().status_code().is_success() {
            let code = response.header().status_code();
            error!(status = ?code, queue = %queue, "Print-Job failed");
            return Err(BoothError::Device(format!("Print-Job returned status {code:?}")));
        }

        let pages = self.pages_sent.fetch_add(1, Ordering::SeqCst) + 1;
        info!(
            queue = %queue,
            copies,
            pages,
            job_id = ?job_id(response.attributes()),
            "job accepted by CUPS"
        );
        Ok(())
    }

    fn quit(&self) {
        info!(pages = self.pages_sent(), "CUPS printer released");
    }
}

impl DeviceStatusSource for CupsIppPrinter {
    fn devices(&self) -> Result<Vec<DeviceStatus>> {
        let uri = parse_uri(&format!("{}/", self.server))?;
        let client = AsyncIppClient::new(uri);
        let operation = IppOperationBuilder::cups().get_printers();

        let response = self
            .block_on("CUPS-Get-Printers", client.send(operation))
            .map_err(BoothError::StatusQuery)?;

        let code = response.header().status_code();
        // The scheduler answers not-found when no queue exists at all.
        if matches!(code, StatusCode::ClientErrorNotFound) {
            return Ok(Vec::new());
        }
        if !code.is_success() {
            error!(status = ?code, "CUPS-Get-Printers failed");
            return Err(BoothError::StatusQuery(format!(
                "CUPS-Get-Printers returned status {code:?}"
            )));
        }

        let devices = parse_printers(response.attributes());
        debug!(count = devices.len(), "received printer list");
        Ok(devices)
    }
}

fn parse_uri(uri: &str) -> Result<Uri> {
    uri.parse()
        .map_err(|e| BoothError::Config(format!("invalid CUPS URI '{uri}': {e}")))
}

/// Document bytes and MIME type for one print.
///
/// Several pictures per page are composed into a single page image so CUPS
/// receives exactly one document per sheet.
pub fn print_document(path: &Path, copies: u32) -> Result<(Vec<u8>, &'static str)> {
    if copies > 1 {
        Ok((layout::compose_page(path, copies)?, "image/jpeg"))
    } else {
        Ok((std::fs::read(path)?, layout::document_format(path)))
    }
}

/// One [`DeviceStatus`] per Printer Attributes group of a CUPS-Get-Printers
/// response. Groups without a `printer-name` are skipped.
pub fn parse_printers(attrs: &IppAttributes) -> Vec<DeviceStatus> {
    let mut devices = Vec::new();

    for group in attrs.groups_of(DelimiterTag::PrinterAttributes) {
        let attributes = group.attributes();
        let Some(name) = attributes.get("printer-name") else {
            continue;
        };

        let state_reasons = attributes
            .get("printer-state-reasons")
            .map(|a| state_reason_keywords(a.value()))
            .unwrap_or_default();

        devices.push(DeviceStatus {
            name: format!("{}", name.value()),
            state_reasons,
        });
    }

    devices
}

/// Keywords of a `printer-state-reasons` value, without the `none` keyword.
pub fn state_reason_keywords(value: &IppValue) -> Vec<String> {
    let keywords: Vec<String> = match value {
        IppValue::Array(values) => values.iter().map(|v| format!("{v}")).collect(),
        other => vec![format!("{other}")],
    };

    keywords
        .into_iter()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty() && k != "none")
        .collect()
}

fn job_id(attrs: &IppAttributes) -> Option<i32> {
    for group in attrs.groups_of(DelimiterTag::JobAttributes) {
        if let Some(attr) = group.attributes().get("job-id")
            && let IppValue::Integer(id) = attr.value()
        {
            return Some(*id);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keyword(k: &str) -> IppValue {
        IppValue::Keyword(k.into())
    }

    fn printer_group(name: &str, reasons: IppValue) -> IppAttributes {
        let mut attrs = IppAttributes::new();
        attrs.add(
            DelimiterTag::PrinterAttributes,
            IppAttribute::new("printer-name", IppValue::NameWithoutLanguage(name.into())),
        );
        attrs.add(
            DelimiterTag::PrinterAttributes,
            IppAttribute::new("printer-state-reasons", reasons),
        );
        attrs
    }

    #[test]
    fn state_reasons_are_read_as_keywords() {
        let reasons = IppValue::Array(vec![
            keyword("media-empty-error"),
            keyword("marker-supply-empty-warning"),
        ]);
        assert_eq!(
            state_reason_keywords(&reasons),
            vec!["media-empty-error", "marker-supply-empty-warning"]
        );
        assert!(state_reason_keywords(&keyword("none")).is_empty());
    }

    #[test]
    fn printer_group_maps_to_device() {
        let attrs = printer_group("Canon_SELPHY_CP1500", keyword("offline-report"));
        assert_eq!(
            parse_printers(&attrs),
            vec![DeviceStatus::new("Canon_SELPHY_CP1500", &["offline-report"])]
        );
    }

    #[test]
    fn idle_printer_has_no_reasons() {
        let attrs = printer_group("Canon_SELPHY_CP1500", keyword("none"));
        assert_eq!(
            parse_printers(&attrs),
            vec![DeviceStatus::new("Canon_SELPHY_CP1500", &[])]
        );
    }

    #[test]
    fn empty_response_has_no_devices() {
        assert!(parse_printers(&IppAttributes::new()).is_empty());
    }

    #[test]
    fn queue_uri_targets_printers_path() {
        let printer = CupsIppPrinter::new(&PrinterConfig {
            cups_server: "ipp://localhost:631/".into(),
            ..Default::default()
        })
        .expect("printer");
        let uri = printer.queue_uri("Canon_SELPHY_CP1500").expect("uri");
        assert_eq!(uri.to_string(), "ipp://localhost:631/printers/Canon_SELPHY_CP1500");
    }

    #[test]
    fn invalid_server_is_a_config_error() {
        let result = CupsIppPrinter::new(&PrinterConfig {
            cups_server: "not a valid uri %%%".into(),
            ..Default::default()
        });
        assert!(matches!(result, Err(BoothError::Config(_))));
    }

    #[test]
    fn multiple_pictures_go_out_as_one_document() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("shot.png");
        image::RgbImage::from_pixel(6, 4, image::Rgb([200, 10, 10]))
            .save(&path)
            .expect("save");

        let (single, format) = print_document(&path, 1).expect("single");
        assert_eq!(format, "image/png");
        assert_eq!(single, std::fs::read(&path).expect("read"));

        let (page, format) = print_document(&path, 4).expect("page");
        assert_eq!(format, "image/jpeg");
        let decoded = image::load_from_memory(&page).expect("decode");
        assert_eq!((decoded.width(), decoded.height()), (12, 8));
    }

    #[test]
    fn page_budget_counts_submissions() {
        let printer = CupsIppPrinter::new(&PrinterConfig {
            max_pages: 1,
            ..Default::default()
        })
        .expect("printer");
        assert!(printer.is_ready());
        printer.pages_sent.store(1, Ordering::SeqCst);
        assert!(!printer.is_ready());
    }
}
