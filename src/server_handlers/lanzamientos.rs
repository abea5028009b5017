use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::datos::lanzamientos::CAMPOS_BUSQUEDA_LANZAMIENTO;
use crate::datos::{Direccion, Filtros, Orden, PeticionPagina, PuertoDatos, Recurso, Registro};
use crate::server::EstadoApp;
use crate::server_handlers::{respuesta_error, solicitud_invalida};

const TAMANO_TABLA_POR_DEFECTO: usize = 20;

#[derive(Debug, Deserialize)]
pub struct ParametrosTabla {
    pub pagina: Option<usize>,
    pub tamano: Option<usize>,
    pub busqueda: Option<String>,
    pub orden: Option<String>,
    pub direccion: Option<String>,
    /// Objeto JSON con filtros por campo (ver `Filtros::desde_json`)
    pub filtros: Option<String>,
}

fn cuerpo_objeto(body: Value) -> Result<Registro, HttpResponse> {
    match body {
        Value::Object(obj) => Ok(obj),
        _ => Err(solicitud_invalida("body must be a JSON object")),
    }
}

/// GET /lanzamientos?pagina=1&tamano=20&busqueda=norte&orden=fecha_inicio&direccion=desc
pub async fn listar_handler(estado: web::Data<EstadoApp>, query: web::Query<ParametrosTabla>) -> impl Responder {
    let q = query.into_inner();

    let filtros = match q.filtros.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        None => Filtros::default(),
        Some(texto) => match serde_json::from_str::<Value>(texto) {
            Ok(Value::Object(obj)) => Filtros::desde_json(&obj),
            Ok(_) => return solicitud_invalida("filtros must be a JSON object"),
            Err(e) => return solicitud_invalida(format!("invalid filtros: {}", e)),
        },
    };

    let tamano = q
        .tamano
        .unwrap_or(TAMANO_TABLA_POR_DEFECTO)
        .min(estado.config.tamano_pagina)
        .max(1);
    let orden = q.orden.filter(|c| !c.trim().is_empty()).map(|campo| Orden {
        campo: campo.trim().to_string(),
        direccion: q.direccion.as_deref().map(Direccion::desde_texto).unwrap_or_default(),
    });
    let peticion = PeticionPagina {
        pagina: q.pagina.unwrap_or(1),
        tamano,
        campos: Vec::new(),
        busqueda: q.busqueda,
        campos_busqueda: CAMPOS_BUSQUEDA_LANZAMIENTO.iter().map(|c| c.to_string()).collect(),
        orden,
        filtros,
    };
    let pagina = peticion.pagina.max(1);

    match estado
        .con_puerto(move |puerto| puerto.obtener_pagina(Recurso::LanzamientosPps, &peticion))
        .await
    {
        Ok(p) => HttpResponse::Ok().json(json!({
            "pagina": pagina,
            "tamano": tamano,
            "total": p.total,
            "registros": p.registros,
        })),
        Err(e) => respuesta_error(&e),
    }
}

/// POST /lanzamientos
pub async fn crear_handler(estado: web::Data<EstadoApp>, body: web::Json<Value>) -> impl Responder {
    let campos = match cuerpo_objeto(body.into_inner()) {
        Ok(c) => c,
        Err(r) => return r,
    };
    match estado
        .con_puerto(move |puerto| puerto.crear(Recurso::LanzamientosPps, &campos))
        .await
    {
        Ok(registro) => HttpResponse::Created().json(registro),
        Err(e) => respuesta_error(&e),
    }
}

/// PATCH /lanzamientos/{id}
/// Sólo se modifican los campos presentes en el cuerpo.
pub async fn actualizar_handler(
    estado: web::Data<EstadoApp>,
    path: web::Path<String>,
    body: web::Json<Value>,
) -> impl Responder {
    let id = path.into_inner();
    let cambios = match cuerpo_objeto(body.into_inner()) {
        Ok(c) => c,
        Err(r) => return r,
    };
    match estado
        .con_puerto(move |puerto| puerto.actualizar(Recurso::LanzamientosPps, &id, &cambios))
        .await
    {
        Ok(registro) => HttpResponse::Ok().json(registro),
        Err(e) => respuesta_error(&e),
    }
}

#[derive(Debug, Deserialize)]
pub struct CambioLanzamiento {
    pub id: String,
    pub campos: Registro,
}

/// PATCH /lanzamientos con `[{"id": "...", "campos": {...}}, ...]`
pub async fn actualizar_varios_handler(
    estado: web::Data<EstadoApp>,
    body: web::Json<Vec<CambioLanzamiento>>,
) -> impl Responder {
    let cambios: Vec<(String, Registro)> = body.into_inner().into_iter().map(|c| (c.id, c.campos)).collect();
    if cambios.is_empty() {
        return solicitud_invalida("no changes given");
    }
    match estado
        .con_puerto(move |puerto| puerto.actualizar_varios(Recurso::LanzamientosPps, &cambios))
        .await
    {
        Ok(registros) => HttpResponse::Ok().json(json!({"status": "ok", "actualizados": registros.len()})),
        Err(e) => respuesta_error(&e),
    }
}

/// DELETE /lanzamientos/{id}
pub async fn eliminar_handler(estado: web::Data<EstadoApp>, path: web::Path<String>) -> impl Responder {
    let id = path.into_inner();
    let id_respuesta = id.clone();
    match estado
        .con_puerto(move |puerto| puerto.eliminar(Recurso::LanzamientosPps, &id))
        .await
    {
        Ok(()) => HttpResponse::Ok().json(json!({"status": "ok", "id": id_respuesta})),
        Err(e) => respuesta_error(&e),
    }
}
