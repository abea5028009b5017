use std::sync::Arc;

use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use tokio::sync::Semaphore;

use crate::config::Config;
use crate::datos::ConexionDatos;
use crate::error::ErrorDatos;
use crate::server_handlers::{docs, gestion, instituciones, lanzamientos, manejar_error_json, manejar_error_query};

/// Estado compartido por los handlers.
pub struct EstadoApp {
    pub config: Config,
    /// Limita las operaciones de base de datos simultáneas
    pub semaforo: Arc<Semaphore>,
}

impl EstadoApp {
    pub fn nuevo(config: Config) -> Self {
        EstadoApp { config, semaforo: Arc::new(Semaphore::new(std::cmp::max(1, num_cpus::get()))) }
    }

    /// Abre una conexión y ejecuta `operacion` en el pool bloqueante de tokio.
    pub async fn con_puerto<T, F>(&self, operacion: F) -> Result<T, ErrorDatos>
    where
        T: Send + 'static,
        F: FnOnce(&ConexionDatos) -> Result<T, ErrorDatos> + Send + 'static,
    {
        let permiso = self
            .semaforo
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| ErrorDatos::Hilo("failed to acquire semaphore".to_string()))?;
        let config = self.config.clone();
        let tarea = tokio::task::spawn_blocking(move || {
            let _permiso = permiso;
            let conexion = ConexionDatos::desde_config(&config)?;
            operacion(&conexion)
        });
        match tarea.await {
            Ok(r) => r,
            Err(e) => Err(ErrorDatos::Hilo(format!("task join error: {}", e))),
        }
    }
}

/// Registra todas las rutas; se usa tanto en `run_server` como en los tests.
pub fn configurar_rutas(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(manejar_error_json))
        .app_data(web::QueryConfig::default().error_handler(manejar_error_query))
        .route("/gestion", web::get().to(gestion::gestion_handler))
        .route("/gestion/resumen", web::get().to(gestion::resumen_handler))
        .route("/lanzamientos", web::get().to(lanzamientos::listar_handler))
        .route("/lanzamientos", web::post().to(lanzamientos::crear_handler))
        .route("/lanzamientos", web::patch().to(lanzamientos::actualizar_varios_handler))
        .route("/lanzamientos/{id}", web::patch().to(lanzamientos::actualizar_handler))
        .route("/lanzamientos/{id}", web::delete().to(lanzamientos::eliminar_handler))
        .route("/instituciones", web::get().to(instituciones::listar_handler))
        .route("/instituciones/{id}/telefono", web::patch().to(instituciones::telefono_handler))
        .route("/help", web::get().to(docs::help_handler));
}

pub async fn run_server(config: Config) -> std::io::Result<()> {
    let bind = config.bind.clone();
    let estado = web::Data::new(EstadoApp::nuevo(config));
    log::info!("Iniciando servidor en http://{}", bind);
    HttpServer::new(move || {
        App::new()
            .app_data(estado.clone())
            .wrap(Cors::permissive())
            .wrap(Logger::default())
            .configure(configurar_rutas)
    })
    .bind(bind)?
    .run()
    .await
}
