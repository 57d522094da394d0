use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use log::{error, info, warn};
use rocket::{
    fairing::{Fairing, Info, Kind},
    http::StatusClass,
    Data, Orbit, Request, Response, Rocket,
};

/// Per-request correlation data, cached on the request so the response hook
/// can match its log line to the request's.
struct RequestTicket {
    id: u64,
    started: Instant,
}

impl RequestTicket {
    fn issue() -> Self {
        static NEXT_REQUEST_ID: AtomicU64 = AtomicU64::new(1);
        Self {
            id: NEXT_REQUEST_ID.fetch_add(1, Ordering::Relaxed),
            started: Instant::now(),
        }
    }
}

/// A rocket fairing that logs every request and response, with a shared id
/// to correlate the two lines and the time taken in between.
#[derive(Debug, Copy, Clone)]
pub struct LoggerFairing;

#[rocket::async_trait]
impl Fairing for LoggerFairing {
    fn info(&self) -> Info {
        Info {
            name: "Logger",
            kind: Kind::Liftoff | Kind::Request | Kind::Response | Kind::Shutdown,
        }
    }

    async fn on_liftoff(&self, rocket: &Rocket<Orbit>) {
        let config = rocket.config();
        let protocol = if config.tls_enabled() { "https" } else { "http" };
        info!("Serving on {protocol}://{}:{}", config.address, config.port);
    }

    async fn on_request(&self, req: &mut Request<'_>, _data: &mut Data<'_>) {
        let ticket = req.local_cache(RequestTicket::issue);
        info!("#{} {} {}", ticket.id, req.method(), req.uri());
    }

    async fn on_response<'r>(&self, req: &'r Request<'_>, res: &mut Response<'r>) {
        let ticket = req.local_cache(RequestTicket::issue);
        let status = res.status();
        let elapsed = ticket.started.elapsed();
        let handler = req
            .route()
            .map(|route| route.uri.to_string())
            .unwrap_or_else(|| "unrouted".to_string());
        let line = format!("#{} {} {} ({:.1?})", ticket.id, status, handler, elapsed);
        match status.class() {
            StatusClass::ServerError => error!("{line}"),
            StatusClass::ClientError => warn!("{line}"),
            _ => info!("{line}"),
        }
    }

    async fn on_shutdown(&self, _rocket: &Rocket<Orbit>) {
        warn!("Shutdown requested, stopping gracefully...");
    }
}
