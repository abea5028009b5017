//! Errores tipados de la capa de datos y de la configuración.

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ErrorDatos {
    #[error("recurso desconocido: {0}")]
    RecursoDesconocido(String),

    #[error("campo '{campo}' no válido para {recurso}")]
    CampoInvalido { recurso: String, campo: String },

    #[error("URL de base de datos con esquema no soportado: {0}")]
    EsquemaNoSoportado(String),

    #[error("error al obtener {recurso} tras {intentos} intentos: {mensaje}")]
    Obtencion { recurso: String, intentos: u32, mensaje: String },

    #[error("la actualización de {recurso} '{id}' no afectó ningún registro")]
    ActualizacionParcial { recurso: String, id: String },

    #[error("fallaron {fallidos} de {total} actualizaciones")]
    ActualizacionMasiva { fallidos: usize, total: usize },

    #[error("la base de datos no devolvió el registro creado en {recurso}")]
    Creacion { recurso: String },

    #[error(
        "No se pudo eliminar el registro '{id}' de {recurso}. Puede que no tengas permisos o que el registro ya no exista."
    )]
    Eliminacion { recurso: String, id: String },

    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("postgres: {0}")]
    Postgres(#[from] postgres::Error),

    #[error("json: {0}")]
    Serializacion(#[from] serde_json::Error),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("error en hilo de base de datos: {0}")]
    Hilo(String),
}

/// Cuerpo de error que recibe el cliente: `{"type": ..., "message": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RespuestaError {
    #[serde(rename = "type")]
    pub tipo: String,
    #[serde(rename = "message")]
    pub mensaje: String,
}

impl ErrorDatos {
    /// Código estable del error, pensado para el cliente.
    pub fn tipo(&self) -> &'static str {
        match self {
            ErrorDatos::RecursoDesconocido(_) | ErrorDatos::CampoInvalido { .. } => "VALIDATION_ERROR",
            ErrorDatos::EsquemaNoSoportado(_) => "CONFIG_ERROR",
            ErrorDatos::Obtencion { .. } => "FETCH_ERROR",
            ErrorDatos::ActualizacionParcial { .. } => "PARTIAL_UPDATE",
            ErrorDatos::ActualizacionMasiva { .. } => "BULK_UPDATE_PARTIAL_ERROR",
            ErrorDatos::Creacion { .. } => "CREATE_ERROR",
            ErrorDatos::Eliminacion { .. } => "DELETE_ERROR",
            ErrorDatos::Serializacion(_) => "SERIALIZATION_ERROR",
            ErrorDatos::Sqlite(_) | ErrorDatos::Postgres(_) | ErrorDatos::Io(_) | ErrorDatos::Hilo(_) => {
                "DATABASE_ERROR"
            }
        }
    }

    pub fn respuesta(&self) -> RespuestaError {
        RespuestaError { tipo: self.tipo().to_string(), mensaje: self.to_string() }
    }

    /// Los errores de validación no mejoran reintentando.
    pub fn es_transitorio(&self) -> bool {
        !matches!(
            self,
            ErrorDatos::RecursoDesconocido(_)
                | ErrorDatos::CampoInvalido { .. }
                | ErrorDatos::EsquemaNoSoportado(_)
                | ErrorDatos::Serializacion(_)
        )
    }
}

#[derive(Debug, Error)]
pub enum ErrorConfig {
    #[error("valor no válido para {variable}: {valor:?}")]
    ValorInvalido { variable: String, valor: String },
}
