use crate::common::config::ServiceConfig;
use crate::common::errors::AppError;
use crate::http::dispatcher::Dispatcher;
use crate::http::protocol::HttpResponse;
use crate::report::ratings::RatingStore;
use crate::report::ratings_sqlite::SqliteRatingStore;
use std::io::Read;
use tiny_http::{Header, Request, Response, Server};
use tracing::{error, info};

pub struct HttpServer;

impl HttpServer {
    pub fn run(config: &ServiceConfig) -> Result<(), AppError> {
        let address = config.address();
        let server = Server::http(&address)
            .map_err(|e| AppError::IoError(format!("cannot bind {address}: {e}")))?;
        info!(%address, "listening");
        Self::serve(&server, config)
    }

    // Requests are handled one at a time, in arrival order.
    pub fn serve(server: &Server, config: &ServiceConfig) -> Result<(), AppError> {
        let store = SqliteRatingStore::from_config(&config.ratings);
        let dispatcher = Dispatcher::new(
            config,
            store.as_ref().map(|s| s as &dyn RatingStore),
        );

        for mut request in server.incoming_requests() {
            let mut body = Vec::new();
            let response = match request.as_reader().read_to_end(&mut body) {
                Ok(_) => dispatcher.handle(request.method().as_str(), request.url(), &body),
                Err(e) => HttpResponse::error(400, format!("failed to read request body: {e}")),
            };
            info!(
                method = %request.method(),
                url = %request.url(),
                status = response.status,
                "handled request"
            );
            if let Err(e) = Self::respond(request, &response) {
                error!("failed to write response: {e}");
            }
        }
        Ok(())
    }

    fn respond(request: Request, response: &HttpResponse) -> Result<(), AppError> {
        let mut reply =
            Response::from_string(response.body.to_string()).with_status_code(response.status);
        if let Ok(header) = Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]) {
            reply = reply.with_header(header);
        }
        request.respond(reply)?;
        Ok(())
    }
}
