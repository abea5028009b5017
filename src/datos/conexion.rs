// conexion.rs - SQLite local o Postgres remoto según la URL

use std::fmt;
use std::fs;
use std::path::Path;

use rusqlite::Connection;

use crate::config::Config;
use crate::datos::consulta::Consulta;
use crate::datos::esquema::Recurso;
use crate::datos::{postgresql, sqlite, AjustesConsulta, PuertoDatos, Registro};
use crate::error::ErrorDatos;

pub enum Motor {
    Sqlite(Connection),
    // sólo la URL: cada operación conecta en su propio hilo
    Postgres(String),
}

pub struct ConexionDatos {
    motor: Motor,
    ajustes: AjustesConsulta,
}

impl fmt::Debug for ConexionDatos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // la URL de postgres puede llevar credenciales
        match self.motor {
            Motor::Sqlite(_) => write!(f, "ConexionDatos::Sqlite(..)"),
            Motor::Postgres(_) => write!(f, "ConexionDatos::Postgres(..)"),
        }
    }
}

fn abrir_sqlite(ruta: &str) -> Result<Connection, ErrorDatos> {
    if ruta != ":memory:" {
        if let Some(dir) = Path::new(ruta).parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                fs::create_dir_all(dir)?;
            }
        }
    }
    let conn = Connection::open(ruta)?;
    sqlite::registrar_funciones(&conn)?;
    Ok(conn)
}

impl ConexionDatos {
    /// Acepta `sqlite://ruta`, `file://ruta`, `postgres://...`,
    /// `postgresql://...` o una ruta simple a un archivo SQLite.
    pub fn abrir(url: &str, ajustes: AjustesConsulta) -> Result<ConexionDatos, ErrorDatos> {
        let url = url.trim();
        let motor = if let Some(ruta) = url.strip_prefix("sqlite://") {
            Motor::Sqlite(abrir_sqlite(ruta)?)
        } else if let Some(ruta) = url.strip_prefix("file://") {
            Motor::Sqlite(abrir_sqlite(ruta)?)
        } else if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            Motor::Postgres(url.to_string())
        } else if url.contains("://") {
            return Err(ErrorDatos::EsquemaNoSoportado(url.to_string()));
        } else {
            Motor::Sqlite(abrir_sqlite(url)?)
        };
        Ok(ConexionDatos { motor, ajustes })
    }

    pub fn desde_config(config: &Config) -> Result<ConexionDatos, ErrorDatos> {
        ConexionDatos::abrir(&config.db_url, config.ajustes_consulta())
    }

    pub fn abrir_en_memoria(ajustes: AjustesConsulta) -> Result<ConexionDatos, ErrorDatos> {
        let conn = Connection::open_in_memory()?;
        sqlite::registrar_funciones(&conn)?;
        let conexion = ConexionDatos { motor: Motor::Sqlite(conn), ajustes };
        conexion.inicializar_esquema()?;
        Ok(conexion)
    }

    pub fn inicializar_esquema(&self) -> Result<(), ErrorDatos> {
        match &self.motor {
            Motor::Sqlite(conn) => sqlite::inicializar(conn),
            Motor::Postgres(url) => postgresql::inicializar(url),
        }
    }

    pub fn motor(&self) -> &Motor {
        &self.motor
    }
}

impl PuertoDatos for ConexionDatos {
    fn ajustes(&self) -> AjustesConsulta {
        self.ajustes
    }

    fn consultar(&self, consulta: &Consulta) -> Result<Vec<Registro>, ErrorDatos> {
        match &self.motor {
            Motor::Sqlite(conn) => sqlite::consultar(conn, consulta),
            Motor::Postgres(url) => postgresql::consultar(url, consulta),
        }
    }

    fn contar(&self, consulta: &Consulta) -> Result<usize, ErrorDatos> {
        match &self.motor {
            Motor::Sqlite(conn) => sqlite::contar(conn, consulta),
            Motor::Postgres(url) => postgresql::contar(url, consulta),
        }
    }

    fn actualizar(&self, recurso: Recurso, id: &str, cambios: &Registro) -> Result<Registro, ErrorDatos> {
        match &self.motor {
            Motor::Sqlite(conn) => sqlite::actualizar(conn, recurso, id, cambios),
            Motor::Postgres(url) => postgresql::actualizar(url, recurso, id, cambios),
        }
    }

    fn crear(&self, recurso: Recurso, campos: &Registro) -> Result<Registro, ErrorDatos> {
        match &self.motor {
            Motor::Sqlite(conn) => sqlite::crear(conn, recurso, campos),
            Motor::Postgres(url) => postgresql::crear(url, recurso, campos),
        }
    }

    fn eliminar(&self, recurso: Recurso, id: &str) -> Result<(), ErrorDatos> {
        match &self.motor {
            Motor::Sqlite(conn) => sqlite::eliminar(conn, recurso, id),
            Motor::Postgres(url) => postgresql::eliminar(url, recurso, id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_esquema_no_soportado() {
        let r = ConexionDatos::abrir("mysql://localhost/db", AjustesConsulta::default());
        assert!(matches!(r, Err(ErrorDatos::EsquemaNoSoportado(_))));
    }

    #[test]
    fn test_postgres_no_conecta_al_abrir() {
        let c = ConexionDatos::abrir("postgres://u:p@localhost:1/db", AjustesConsulta::default()).unwrap();
        assert!(matches!(c.motor(), Motor::Postgres(_)));
        assert_eq!(format!("{:?}", c), "ConexionDatos::Postgres(..)");
    }

    #[test]
    fn test_sqlite_memoria() {
        let c = ConexionDatos::abrir("sqlite://:memory:", AjustesConsulta::default()).unwrap();
        c.inicializar_esquema().unwrap();
        assert!(matches!(c.motor(), Motor::Sqlite(_)));
    }
}
