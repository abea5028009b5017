use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::datos::lanzamientos::cargar_instituciones;
use crate::datos::{PuertoDatos, Recurso, Registro};
use crate::server::EstadoApp;
use crate::server_handlers::{respuesta_error, solicitud_invalida};

#[derive(Debug, Deserialize)]
pub struct CuerpoTelefono {
    /// `null` borra el teléfono
    pub telefono: Option<String>,
}

/// GET /instituciones
pub async fn listar_handler(estado: web::Data<EstadoApp>) -> impl Responder {
    match estado.con_puerto(|puerto| cargar_instituciones(puerto)).await {
        Ok(instituciones) => HttpResponse::Ok().json(json!({"instituciones": instituciones})),
        Err(e) => respuesta_error(&e),
    }
}

/// PATCH /instituciones/{id}/telefono con `{"telefono": "..."}`
pub async fn telefono_handler(
    estado: web::Data<EstadoApp>,
    path: web::Path<String>,
    body: web::Json<CuerpoTelefono>,
) -> impl Responder {
    let id = path.into_inner();
    let telefono = body.into_inner().telefono.map(|t| t.trim().to_string()).filter(|t| !t.is_empty());
    if id.trim().is_empty() {
        return solicitud_invalida("id is required");
    }

    let mut cambios = Registro::new();
    cambios.insert("telefono".to_string(), telefono.map(Value::String).unwrap_or(Value::Null));
    match estado
        .con_puerto(move |puerto| puerto.actualizar(Recurso::Instituciones, &id, &cambios))
        .await
    {
        Ok(registro) => HttpResponse::Ok().json(registro),
        Err(e) => respuesta_error(&e),
    }
}
