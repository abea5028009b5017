pub mod docs;
pub mod gestion;
pub mod instituciones;
pub mod lanzamientos;

use actix_web::error::{InternalError, JsonPayloadError, QueryPayloadError};
use actix_web::{HttpRequest, HttpResponse};
use serde_json::json;

use crate::error::{ErrorDatos, RespuestaError};

fn cuerpo_error(respuesta: RespuestaError) -> serde_json::Value {
    json!({"error": respuesta})
}

/// Traduce un `ErrorDatos` a la respuesta HTTP correspondiente.
pub fn respuesta_error(e: &ErrorDatos) -> HttpResponse {
    let cuerpo = cuerpo_error(e.respuesta());
    match e {
        ErrorDatos::RecursoDesconocido(_) | ErrorDatos::CampoInvalido { .. } | ErrorDatos::Serializacion(_) => {
            HttpResponse::BadRequest().json(cuerpo)
        }
        ErrorDatos::ActualizacionParcial { .. } | ErrorDatos::Eliminacion { .. } => HttpResponse::NotFound().json(cuerpo),
        ErrorDatos::ActualizacionMasiva { .. } => HttpResponse::Conflict().json(cuerpo),
        ErrorDatos::Obtencion { .. } => HttpResponse::ServiceUnavailable().json(cuerpo),
        _ => {
            log::error!("error de datos: {}", e);
            HttpResponse::InternalServerError().json(cuerpo)
        }
    }
}

/// 400 con el mismo formato de error que el resto de la API.
pub fn solicitud_invalida(mensaje: impl Into<String>) -> HttpResponse {
    HttpResponse::BadRequest().json(cuerpo_error(RespuestaError {
        tipo: "VALIDATION_ERROR".to_string(),
        mensaje: mensaje.into(),
    }))
}

pub fn manejar_error_json(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let respuesta = solicitud_invalida(format!("invalid JSON body: {}", err));
    InternalError::from_response(err, respuesta).into()
}

pub fn manejar_error_query(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let respuesta = solicitud_invalida(format!("invalid query: {}", err));
    InternalError::from_response(err, respuesta).into()
}
