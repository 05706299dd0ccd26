//! REST façade over the select controller.
//!
//! Each endpoint validates its already-decoded request fields, issues one
//! [`SwitchCommand`], and maps the outcome to an HTTP status:
//!
//! | Outcome                                  | Status |
//! |------------------------------------------|--------|
//! | success                                  | 200    |
//! | bad line / connector (connector 0..=3)   | 400    |
//! | controller not initialised / not ready   | 503    |
//! | write, readback or rollback failure      | 500    |
//!
//! `health` and `info` never touch the controller.
//!
//! Body encoding and route registration belong to the HTTP server; this
//! module only decides what goes in a response.

use core::time::Duration;

use log::warn;
use serde::Serialize;

use crate::app::commands::{SwitchCommand, SwitchReply, dispatch};
use crate::app::controller::{SelectController, SwitchStatus};
use crate::app::ports::LinePort;
use crate::error::{LineId, SwitchError};

pub const HTTP_OK: u16 = 200;
pub const HTTP_BAD_REQUEST: u16 = 400;
pub const HTTP_INTERNAL_SERVER_ERROR: u16 = 500;
pub const HTTP_SERVICE_UNAVAILABLE: u16 = 503;

pub const DEVICE_NAME: &str = "JTAG Switch";
/// Board name reported by `GET /api/info`, fixed at build time.
pub const BOARD: &str = match option_env!("JTAG_SWITCH_BOARD") {
    Some(board) => board,
    None => "esp32",
};

/// `GET /api/info` payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeviceInfo {
    pub device: &'static str,
    pub version: &'static str,
    pub board: &'static str,
}

impl DeviceInfo {
    pub const fn current() -> Self {
        Self {
            device: DEVICE_NAME,
            version: env!("CARGO_PKG_VERSION"),
            board: BOARD,
        }
    }
}

/// `POST /api/select` fields.  Odd connectors (1, 3) drive the line HIGH.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectRequest {
    pub line: i64,
    pub connector: i64,
}

/// `POST /api/toggle` fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleRequest {
    pub line: i64,
}

/// Response payload, before encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiBody {
    Health(&'static str),
    Info(DeviceInfo),
    Select(SwitchStatus),
    Toggle { line: u8, state: bool },
    Status { lines: SwitchStatus, uptime_secs: u64 },
    Error(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: ApiBody,
}

impl ApiResponse {
    fn ok(body: ApiBody) -> Self {
        Self {
            status: HTTP_OK,
            body,
        }
    }

    fn error(status: u16, message: &'static str) -> Self {
        Self {
            status,
            body: ApiBody::Error(message),
        }
    }
}

/// HTTP status for a controller failure.
pub fn status_code(err: &SwitchError) -> u16 {
    match err {
        SwitchError::InvalidLine(_) => HTTP_BAD_REQUEST,
        SwitchError::NotInitialized | SwitchError::HardwareNotReady(_) => {
            HTTP_SERVICE_UNAVAILABLE
        }
        SwitchError::HardwareWriteFailed(_)
        | SwitchError::VerificationFailed(_)
        | SwitchError::RollbackFailed(_) => HTTP_INTERNAL_SERVER_ERROR,
    }
}

fn parse_line(raw: i64) -> Option<LineId> {
    u8::try_from(raw).ok().and_then(|l| LineId::from_index(l).ok())
}

pub fn select<L: LinePort>(controller: &SelectController<L>, req: SelectRequest) -> ApiResponse {
    let (Some(line), 0..=3) = (parse_line(req.line), req.connector) else {
        warn!("api: rejected select line={} connector={}", req.line, req.connector);
        return ApiResponse::error(HTTP_BAD_REQUEST, "Invalid request parameters");
    };

    let command = SwitchCommand::Select {
        line,
        high: req.connector % 2 == 1,
    };
    match dispatch(controller, command) {
        Ok(SwitchReply::Selected(status)) => ApiResponse::ok(ApiBody::Select(status)),
        Ok(_) => ApiResponse::error(HTTP_INTERNAL_SERVER_ERROR, "Internal error"),
        Err(e) => ApiResponse::error(status_code(&e), "Failed to set GPIO"),
    }
}

pub fn toggle<L: LinePort>(controller: &SelectController<L>, req: ToggleRequest) -> ApiResponse {
    let Some(line) = parse_line(req.line) else {
        warn!("api: rejected toggle line={}", req.line);
        return ApiResponse::error(HTTP_BAD_REQUEST, "Invalid line parameter");
    };

    match dispatch(controller, SwitchCommand::Toggle { line }) {
        Ok(SwitchReply::Toggled { line, high }) => ApiResponse::ok(ApiBody::Toggle {
            line: line as u8,
            state: high,
        }),
        Ok(_) => ApiResponse::error(HTTP_INTERNAL_SERVER_ERROR, "Internal error"),
        Err(e) => ApiResponse::error(status_code(&e), "Failed to toggle GPIO"),
    }
}

/// `GET /api/health`
pub fn health() -> ApiResponse {
    ApiResponse::ok(ApiBody::Health("ok"))
}

/// `GET /api/info`
pub fn info() -> ApiResponse {
    ApiResponse::ok(ApiBody::Info(DeviceInfo::current()))
}

/// `GET /api/status`; `uptime` is time since boot as the server measures it.
pub fn status<L: LinePort>(controller: &SelectController<L>, uptime: Duration) -> ApiResponse {
    match dispatch(controller, SwitchCommand::Status) {
        Ok(SwitchReply::Status(lines)) => ApiResponse::ok(ApiBody::Status {
            lines,
            uptime_secs: uptime.as_secs(),
        }),
        Ok(_) => ApiResponse::error(HTTP_INTERNAL_SERVER_ERROR, "Internal error"),
        Err(e) => ApiResponse::error(status_code(&e), "Failed to read GPIO state"),
    }
}
