// Filas crudas -> Lanzamiento/Institucion; lo que no se interpreta queda ausente

use serde_json::Value;

use crate::datos::consulta::Orden;
use crate::datos::esquema::Recurso;
use crate::datos::filtros::Filtros;
use crate::datos::{PuertoDatos, Registro};
use crate::error::ErrorDatos;
use crate::models::fechas::{parsear_fecha, parsear_marca_tiempo};
use crate::models::{EstadoGestion, Institucion, Lanzamiento};

pub const CAMPOS_LANZAMIENTO: [&str; 8] = [
    "nombre_pps",
    "estado_gestion",
    "fecha_inicio",
    "fecha_finalizacion",
    "fecha_relanzamiento",
    "orientacion",
    "notas_gestion",
    "updated_at",
];

pub const CAMPOS_INSTITUCION: [&str; 2] = ["nombre", "telefono"];

pub const CAMPOS_BUSQUEDA_LANZAMIENTO: [&str; 2] = ["nombre_pps", "orientacion"];

fn texto(registro: &Registro, campo: &str) -> Option<String> {
    match registro.get(campo)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn id(registro: &Registro) -> Option<String> {
    texto(registro, "id")
}

pub fn lanzamiento_desde_registro(registro: &Registro) -> Option<Lanzamiento> {
    let Some(id) = id(registro) else {
        log::warn!("registro de lanzamiento sin id ignorado");
        return None;
    };
    let fecha = |campo: &str| texto(registro, campo).and_then(|s| parsear_fecha(&s));
    let marca = |campo: &str| texto(registro, campo).and_then(|s| parsear_marca_tiempo(&s));
    Some(Lanzamiento {
        id,
        nombre: texto(registro, "nombre_pps"),
        estado_gestion: EstadoGestion::desde_texto(texto(registro, "estado_gestion").as_deref()),
        fecha_inicio: fecha("fecha_inicio"),
        fecha_fin: fecha("fecha_finalizacion"),
        fecha_relanzamiento: fecha("fecha_relanzamiento"),
        orientacion: texto(registro, "orientacion"),
        notas_gestion: texto(registro, "notas_gestion"),
        actualizado: marca("updated_at"),
        creado: marca("created_at"),
    })
}

pub fn institucion_desde_registro(registro: &Registro) -> Option<Institucion> {
    let id = id(registro)?;
    let nombre = texto(registro, "nombre")?;
    Some(Institucion { id, nombre, telefono: texto(registro, "telefono") })
}

fn campos(lista: &[&str]) -> Vec<String> {
    lista.iter().map(|c| c.to_string()).collect()
}

/// Todos los lanzamientos, de la finalización más reciente a la más antigua.
pub fn cargar_lanzamientos<P: PuertoDatos + ?Sized>(puerto: &P) -> Result<Vec<Lanzamiento>, ErrorDatos> {
    let filas = puerto.obtener_todos(
        Recurso::LanzamientosPps,
        &campos(&CAMPOS_LANZAMIENTO),
        &Filtros::default(),
        Some(Orden::desc("fecha_finalizacion")),
    )?;
    Ok(filas.iter().filter_map(lanzamiento_desde_registro).collect())
}

pub fn cargar_instituciones<P: PuertoDatos + ?Sized>(puerto: &P) -> Result<Vec<Institucion>, ErrorDatos> {
    let filas = puerto.obtener_todos(Recurso::Instituciones, &campos(&CAMPOS_INSTITUCION), &Filtros::default(), None)?;
    Ok(filas.iter().filter_map(institucion_desde_registro).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    #[test]
    fn test_lanzamiento_desde_registro() {
        let r = json!({
            "id": 7,
            "created_at": "2025-01-01T00:00:00Z",
            "nombre_pps": "Hospital X - 2025",
            "estado_gestion": "esperando respuesta",
            "fecha_inicio": "2025-03-01",
            "fecha_finalizacion": "no es fecha",
            "updated_at": null
        });
        let l = lanzamiento_desde_registro(r.as_object().unwrap()).unwrap();
        assert_eq!(l.id, "7");
        assert_eq!(l.estado_gestion, EstadoGestion::EsperandoRespuesta);
        assert_eq!(l.fecha_inicio, NaiveDate::from_ymd_opt(2025, 3, 1));
        assert_eq!(l.fecha_fin, None);
        assert!(l.actualizado.is_none());
        assert!(l.creado.is_some());
    }

    #[test]
    fn test_registro_sin_id_se_ignora() {
        let r = json!({"nombre_pps": "X"});
        assert!(lanzamiento_desde_registro(r.as_object().unwrap()).is_none());
    }

    #[test]
    fn test_institucion_sin_nombre_se_ignora() {
        let r = json!({"id": "i1", "nombre": "  "});
        assert!(institucion_desde_registro(r.as_object().unwrap()).is_none());
    }
}
