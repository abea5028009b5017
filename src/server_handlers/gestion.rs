use actix_web::{web, HttpResponse, Responder};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use crate::datos::lanzamientos::{cargar_instituciones, cargar_lanzamientos};
use crate::gestion::{clasificar_con_opciones, FiltroVencimiento, MapaInstituciones, OpcionesClasificacion};
use crate::server::EstadoApp;
use crate::server_handlers::respuesta_error;

#[derive(Debug, Deserialize)]
pub struct ParametrosGestion {
    pub busqueda: Option<String>,
    /// Lista separada por comas
    pub orientaciones: Option<String>,
    /// `todas`, `vencidas` o `proximas`
    #[serde(default)]
    pub filtro: FiltroVencimiento,
}

impl ParametrosGestion {
    fn opciones(self) -> OpcionesClasificacion {
        let orientaciones = match self.orientaciones {
            Some(s) if !s.trim().is_empty() => s
                .split(',')
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty())
                .collect(),
            _ => Vec::new(),
        };
        OpcionesClasificacion { busqueda: self.busqueda, orientaciones, filtro: self.filtro }
    }
}

/// GET /gestion?busqueda=norte&orientaciones=Clínica,Laboral&filtro=vencidas
/// Bandejas completas con el contacto de cada institución y el resumen.
pub async fn gestion_handler(estado: web::Data<EstadoApp>, query: web::Query<ParametrosGestion>) -> impl Responder {
    let opciones = query.into_inner().opciones();
    let ahora = Utc::now();
    let resultado = estado
        .con_puerto(move |puerto| {
            let lanzamientos = cargar_lanzamientos(puerto)?;
            let instituciones = cargar_instituciones(puerto)?;
            let mut resultado = clasificar_con_opciones(&lanzamientos, ahora, &opciones);
            MapaInstituciones::desde(instituciones).adjuntar(&mut resultado);
            Ok(resultado)
        })
        .await;

    match resultado {
        Ok(r) => HttpResponse::Ok().json(json!({
            "generado": ahora,
            "resumen": r.resumen(),
            "bandejas": r,
        })),
        Err(e) => respuesta_error(&e),
    }
}

/// GET /gestion/resumen
pub async fn resumen_handler(estado: web::Data<EstadoApp>, query: web::Query<ParametrosGestion>) -> impl Responder {
    let opciones = query.into_inner().opciones();
    let ahora = Utc::now();
    let resultado = estado
        .con_puerto(move |puerto| {
            let lanzamientos = cargar_lanzamientos(puerto)?;
            Ok(clasificar_con_opciones(&lanzamientos, ahora, &opciones).resumen())
        })
        .await;

    match resultado {
        Ok(resumen) => HttpResponse::Ok().json(json!({"generado": ahora, "resumen": resumen})),
        Err(e) => respuesta_error(&e),
    }
}
