// agrupacion.rs - agrupa por institución y elige el representante de cada grupo

use std::collections::HashMap;

use chrono::{DateTime, Datelike, NaiveDate, Utc};

use crate::models::fechas::fecha_minima;
use crate::models::texto::normalizar;
use crate::models::Lanzamiento;

pub const SIN_NOMBRE: &str = "Sin Nombre";

const SEPARADORES: [&str; 2] = [" - ", " – "];

/// Prefijo del nombre antes del primer separador (" - " o " – "), recortado.
///
/// "Hospital X - Turno Mañana" -> "Hospital X". Sin separador se usa el
/// nombre completo; un nombre vacío (o un prefijo vacío) cae en `SIN_NOMBRE`.
pub fn clave_grupo(nombre: Option<&str>) -> String {
    let nombre = nombre.unwrap_or("");
    let corte = SEPARADORES.iter().filter_map(|sep| nombre.find(sep)).min();
    let prefijo = match corte {
        Some(i) => &nombre[..i],
        None => nombre,
    }
    .trim();
    if prefijo.is_empty() {
        SIN_NOMBRE.to_string()
    } else {
        prefijo.to_string()
    }
}

#[derive(Debug, Clone)]
pub struct GrupoInstitucion<'a> {
    pub clave: String,
    pub lanzamientos: Vec<&'a Lanzamiento>,
}

pub fn agrupar<'a, I>(lanzamientos: I) -> Vec<GrupoInstitucion<'a>>
where
    I: IntoIterator<Item = &'a Lanzamiento>,
{
    let mut indices: HashMap<String, usize> = HashMap::new();
    let mut grupos: Vec<GrupoInstitucion<'a>> = Vec::new();
    for l in lanzamientos {
        let clave = clave_grupo(l.nombre.as_deref());
        let idx = *indices.entry(normalizar(&clave)).or_insert_with(|| {
            grupos.push(GrupoInstitucion { clave, lanzamientos: Vec::new() });
            grupos.len() - 1
        });
        grupos[idx].lanzamientos.push(l);
    }
    grupos
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Seleccion<'a> {
    Relanzamiento(&'a Lanzamiento),
    Relevante(&'a Lanzamiento),
    Descartado,
}

fn fecha_orden(l: &Lanzamiento) -> NaiveDate {
    l.fecha_inicio.unwrap_or_else(fecha_minima)
}

pub fn ordenar_recientes<'a>(grupo: &GrupoInstitucion<'a>) -> Vec<&'a Lanzamiento> {
    let mut ordenados = grupo.lanzamientos.clone();
    ordenados.sort_by(|a, b| fecha_orden(b).cmp(&fecha_orden(a)));
    ordenados
}

fn confirma_relanzamiento(l: &Lanzamiento, anio_actual: i32) -> bool {
    l.estado_gestion.es_relanzamiento()
        || l.fecha_relanzamiento.is_some_and(|f| f.year() >= anio_actual)
}

/// Elige qué lanzamiento representa al grupo.
///
/// Si cualquier lanzamiento confirma un relanzamiento (por estado o por una
/// fecha de relanzamiento de este año o posterior) gana el primero de ellos en
/// orden de recientes. Si no, el primero no archivado/descartado; si todos lo
/// están, el grupo se descarta.
pub fn seleccionar<'a>(grupo: &GrupoInstitucion<'a>, ahora: DateTime<Utc>) -> Seleccion<'a> {
    let ordenados = ordenar_recientes(grupo);
    let anio_actual = ahora.year();

    if let Some(l) = ordenados
        .iter()
        .copied()
        .find(|l| confirma_relanzamiento(l, anio_actual))
    {
        return Seleccion::Relanzamiento(l);
    }

    let relevante = ordenados
        .iter()
        .copied()
        .find(|l| !l.estado_gestion.es_excluido())
        .or_else(|| ordenados.first().copied());

    match relevante {
        Some(l) if !l.estado_gestion.es_excluido() => Seleccion::Relevante(l),
        _ => Seleccion::Descartado,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EstadoGestion;
    use chrono::TimeZone;

    fn lanz(id: &str, nombre: &str, estado: EstadoGestion, inicio: Option<(i32, u32, u32)>) -> Lanzamiento {
        let mut l = Lanzamiento::nuevo(id, nombre);
        l.estado_gestion = estado;
        l.fecha_inicio = inicio.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d));
        l
    }

    #[test]
    fn test_clave_grupo() {
        assert_eq!(clave_grupo(Some("Hospital X - Turno Mañana")), "Hospital X");
        assert_eq!(clave_grupo(Some("Colegio Norte – A")), "Colegio Norte");
        assert_eq!(clave_grupo(Some("  Escuela 5 - B - C")), "Escuela 5");
        assert_eq!(clave_grupo(Some("Fundación Sol ")), "Fundación Sol");
        assert_eq!(clave_grupo(Some("A – x - y")), "A");
        assert_eq!(clave_grupo(Some("")), SIN_NOMBRE);
        assert_eq!(clave_grupo(Some("   ")), SIN_NOMBRE);
        assert_eq!(clave_grupo(None), SIN_NOMBRE);
        // sin espacios alrededor del guion no hay separador
        assert_eq!(clave_grupo(Some("Centro-Día")), "Centro-Día");
    }

    #[test]
    fn test_agrupar_normaliza_y_conserva_orden() {
        let a = lanz("1", "Clínica Sur - A", EstadoGestion::SinEstado, None);
        let b = lanz("2", "Escuela - B", EstadoGestion::SinEstado, None);
        let c = lanz("3", "CLINICA SUR - C", EstadoGestion::SinEstado, None);
        let datos = vec![a, b, c];
        let grupos = agrupar(datos.iter());
        assert_eq!(grupos.len(), 2);
        assert_eq!(grupos[0].clave, "Clínica Sur");
        assert_eq!(grupos[0].lanzamientos.len(), 2);
        assert_eq!(grupos[1].clave, "Escuela");
    }

    #[test]
    fn test_seleccionar_prefiere_no_archivado_mas_reciente() {
        let ahora = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let viejo = lanz("1", "X - 2023", EstadoGestion::PendienteDeGestion, Some((2023, 3, 1)));
        let archivado = lanz("2", "X - 2024", EstadoGestion::Archivado, Some((2024, 3, 1)));
        let datos = vec![viejo, archivado];
        let grupos = agrupar(datos.iter());
        assert_eq!(seleccionar(&grupos[0], ahora), Seleccion::Relevante(&datos[0]));
    }

    #[test]
    fn test_seleccionar_todo_archivado_descarta() {
        let ahora = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let a = lanz("1", "X - a", EstadoGestion::Archivado, Some((2023, 3, 1)));
        let b = lanz("2", "X - b", EstadoGestion::NoSeRelanza, None);
        let datos = vec![a, b];
        let grupos = agrupar(datos.iter());
        assert_eq!(seleccionar(&grupos[0], ahora), Seleccion::Descartado);
    }

    #[test]
    fn test_sin_fecha_de_inicio_ordena_como_la_mas_antigua() {
        let sin_fecha = lanz("1", "X - a", EstadoGestion::EsperandoRespuesta, None);
        let con_fecha = lanz("2", "X - b", EstadoGestion::PendienteDeGestion, Some((1999, 1, 1)));
        let datos = vec![sin_fecha, con_fecha];
        let grupos = agrupar(datos.iter());
        let orden: Vec<&str> = ordenar_recientes(&grupos[0]).iter().map(|l| l.id.as_str()).collect();
        assert_eq!(orden, vec!["2", "1"]);
    }

    #[test]
    fn test_fecha_relanzamiento_anterior_no_confirma() {
        let ahora = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let mut l = lanz("1", "X - a", EstadoGestion::PendienteDeGestion, Some((2024, 3, 1)));
        l.fecha_relanzamiento = NaiveDate::from_ymd_opt(2024, 12, 31);
        let datos = vec![l];
        let grupos = agrupar(datos.iter());
        assert_eq!(seleccionar(&grupos[0], ahora), Seleccion::Relevante(&datos[0]));
    }
}
