pub mod classic;
pub mod reactive;

use crate::cli::Args;
use crate::session::{ ChatSession, LazyPipeline };
use axum::Router;
use log::{ info, error };
use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::{ Any, CorsLayer };

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<LazyPipeline>,
    /// Transcript of the classic shell, which has no per-client sessions.
    pub session: Arc<Mutex<ChatSession>>,
}

impl AppState {
    pub fn new(pipeline: Arc<LazyPipeline>) -> Self {
        Self {
            pipeline,
            session: Arc::new(Mutex::new(ChatSession::new())),
        }
    }
}

pub(crate) fn cors() -> CorsLayer {
    CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
}

pub async fn serve(args: &Args, app: Router) -> Result<(), Box<dyn Error + Send + Sync>> {
    let addr = format!("{}:{}", args.host, args.port()).parse::<SocketAddr>()?;

    if args.enable_tls {
        let (cert_path, key_path) = match (&args.tls_cert_path, &args.tls_key_path) {
            (Some(cert_path), Some(key_path)) => (cert_path, key_path),
            _ => {
                error!("Both --tls-cert-path and --tls-key-path must be provided to enable TLS.");
                return Err("TLS enabled without cert/key".into());
            }
        };
        info!("TLS enabled. Loading certificate from '{}' and key from '{}'", cert_path, key_path);
        let tls_config = axum_server::tls_rustls::RustlsConfig
            ::from_pem_file(cert_path, key_path).await?;

        info!("{} shell listening on: https://{}", args.shell, addr);
        axum_server::bind_rustls(addr, tls_config).serve(app.into_make_service()).await?;
    } else {
        let listener = tokio::net::TcpListener
            ::bind(addr).await
            .map_err(|e| format!("Failed to bind {}: {}. Try a different PORT.", addr, e))?;

        info!("{} shell listening on: http://{}", args.shell, addr);
        axum::serve(listener, app.into_make_service()).await?;
    }

    Ok(())
}
