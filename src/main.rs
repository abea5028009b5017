// --- Gestión de lanzamientos PPS - Archivo principal ---

use gestionpps::datos::ConexionDatos;
use gestionpps::{run_server, Config};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("=== Gestión de lanzamientos PPS (API) ===");

    let config = match Config::desde_entorno() {
        Ok(c) => c,
        Err(e) => {
            log::error!("configuración inválida: {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()));
        }
    };

    let config_esquema = config.clone();
    let esquema = tokio::task::spawn_blocking(move || {
        ConexionDatos::desde_config(&config_esquema).and_then(|c| c.inicializar_esquema())
    })
    .await;
    match esquema {
        Ok(Ok(())) => log::info!("esquema de base de datos listo"),
        Ok(Err(e)) => {
            log::error!("no se pudo inicializar la base de datos: {}", e);
            return Err(std::io::Error::other(e.to_string()));
        }
        Err(e) => return Err(std::io::Error::other(format!("task join error: {}", e))),
    }

    run_server(config).await
}
