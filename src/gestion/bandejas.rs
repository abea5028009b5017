use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::models::fechas::inicio_del_dia;
use crate::models::{EntradaClasificada, EstadoGestion, Lanzamiento, ResultadoClasificacion, Urgencia};

const MS_POR_DIA: i64 = 86_400_000;

/// Días restantes hasta los cuales una práctica activa se marca urgente.
pub const UMBRAL_URGENCIA_ACTIVA: i64 = 5;
/// Días desde el fin hasta los cuales un contacto pendiente se marca urgente.
pub const UMBRAL_URGENCIA_CONTACTO: i64 = 30;

const DIAS_RESTANTES_DESCONOCIDOS: i64 = 999;

pub const VENTANA_PROXIMAS: i64 = 30;

/// Recorte de las bandejas pendientes por vencimiento. Los relanzamientos
/// confirmados nunca se filtran.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FiltroVencimiento {
    #[default]
    #[serde(alias = "all")]
    Todas,
    Vencidas,
    Proximas,
}

impl FiltroVencimiento {
    fn admite(&self, entrada: &EntradaClasificada) -> bool {
        // sin fecha de fin no hay vencimiento que filtrar
        let dias = entrada.dias_restantes.or(entrada.dias_desde_fin.map(|d| -d));
        match (self, dias) {
            (FiltroVencimiento::Todas, _) => true,
            (FiltroVencimiento::Vencidas, Some(d)) => d < 0,
            (FiltroVencimiento::Proximas, Some(d)) => (0..=VENTANA_PROXIMAS).contains(&d),
            (_, None) => false,
        }
    }
}

/// `ceil((fin - ahora) / 1 día)`, con el fin tomado a las 00:00 UTC.
pub fn dias_restantes(fin: chrono::NaiveDate, ahora: DateTime<Utc>) -> i64 {
    let diferencia = (inicio_del_dia(fin) - ahora).num_milliseconds();
    // la división entera trunca hacia cero, que para negativos ya es el techo
    let cociente = diferencia / MS_POR_DIA;
    if diferencia % MS_POR_DIA > 0 { cociente + 1 } else { cociente }
}

pub fn dias_transcurridos(desde: DateTime<Utc>, ahora: DateTime<Utc>) -> i64 {
    (ahora - desde).num_milliseconds().div_euclid(MS_POR_DIA).max(0)
}

fn urgencia(dias: i64, umbral: i64) -> Urgencia {
    if dias <= umbral { Urgencia::Alta } else { Urgencia::Normal }
}

pub fn ubicar(resultado: &mut ResultadoClasificacion, lanzamiento: &Lanzamiento, grupo: &str, ahora: DateTime<Utc>) {
    let mut entrada = EntradaClasificada::nueva(lanzamiento.clone(), grupo);

    let fin = match (lanzamiento.fecha_inicio, lanzamiento.fecha_fin) {
        (Some(_), Some(fin)) => fin,
        _ => {
            resultado.activas_indefinidas.push(entrada);
            return;
        }
    };

    let restantes = dias_restantes(fin, ahora);
    if restantes >= 0 {
        entrada.dias_restantes = Some(restantes);
        entrada.urgencia = Some(urgencia(restantes, UMBRAL_URGENCIA_ACTIVA));
        resultado.activas_y_por_finalizar.push(entrada);
        return;
    }

    let desde_fin = restantes.abs();
    entrada.dias_desde_fin = Some(desde_fin);
    match lanzamiento.estado_gestion {
        EstadoGestion::PendienteDeGestion => {
            entrada.urgencia = Some(urgencia(desde_fin, UMBRAL_URGENCIA_CONTACTO));
            resultado.por_contactar.push(entrada);
        }
        EstadoGestion::EsperandoRespuesta => {
            entrada.dias_esperando = Some(dias_transcurridos(lanzamiento.ultima_actividad(ahora), ahora));
            resultado.contactadas_esperando_respuesta.push(entrada);
        }
        EstadoGestion::EnConversacion | EstadoGestion::SeguimientoExhaustivo => {
            entrada.dias_desde_respuesta = Some(dias_transcurridos(lanzamiento.ultima_actividad(ahora), ahora));
            resultado.respondidas_pendiente_decision.push(entrada);
        }
        _ => {
            // estado desconocido o vacío: queda para revisión manual
            entrada.urgencia = Some(Urgencia::Normal);
            resultado.por_contactar.push(entrada);
        }
    }
}

fn prioridad_urgencia(e: &EntradaClasificada) -> u8 {
    match e.urgencia {
        Some(Urgencia::Alta) => 0,
        _ => 1,
    }
}

// relanzamientos e indefinidas conservan el orden de inserción
pub fn ordenar(resultado: &mut ResultadoClasificacion) {
    resultado.por_contactar.sort_by(|a, b| {
        prioridad_urgencia(a)
            .cmp(&prioridad_urgencia(b))
            .then(a.dias_desde_fin.cmp(&b.dias_desde_fin))
    });
    resultado
        .contactadas_esperando_respuesta
        .sort_by(|a, b| b.dias_esperando.unwrap_or(0).cmp(&a.dias_esperando.unwrap_or(0)));
    resultado
        .respondidas_pendiente_decision
        .sort_by_key(|e| e.dias_desde_respuesta.unwrap_or(0));
    resultado
        .activas_y_por_finalizar
        .sort_by_key(|e| e.dias_restantes.unwrap_or(DIAS_RESTANTES_DESCONOCIDOS));
}

pub fn filtrar_por_vencimiento(resultado: &mut ResultadoClasificacion, filtro: FiltroVencimiento) {
    if filtro == FiltroVencimiento::Todas {
        return;
    }
    let pendientes = [
        &mut resultado.por_contactar,
        &mut resultado.contactadas_esperando_respuesta,
        &mut resultado.respondidas_pendiente_decision,
        &mut resultado.activas_y_por_finalizar,
        &mut resultado.activas_indefinidas,
    ];
    for bandeja in pendientes {
        bandeja.retain(|e| filtro.admite(e));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    #[test]
    fn test_dias_restantes_redondea_hacia_arriba() {
        let fin = NaiveDate::from_ymd_opt(2025, 6, 10).unwrap();
        let medianoche = Utc.with_ymd_and_hms(2025, 6, 10, 0, 0, 0).unwrap();
        let mediodia = Utc.with_ymd_and_hms(2025, 6, 10, 12, 0, 0).unwrap();
        let dia_siguiente = Utc.with_ymd_and_hms(2025, 6, 11, 12, 0, 0).unwrap();
        let antes = Utc.with_ymd_and_hms(2025, 6, 8, 12, 0, 0).unwrap();
        assert_eq!(dias_restantes(fin, medianoche), 0);
        assert_eq!(dias_restantes(fin, mediodia), 0);
        assert_eq!(dias_restantes(fin, dia_siguiente), -1);
        assert_eq!(dias_restantes(fin, antes), 2);
    }

    #[test]
    fn test_dias_transcurridos_nunca_negativo() {
        let ahora = Utc.with_ymd_and_hms(2025, 6, 10, 12, 0, 0).unwrap();
        let hace_tres = Utc.with_ymd_and_hms(2025, 6, 7, 18, 0, 0).unwrap();
        let futuro = Utc.with_ymd_and_hms(2025, 6, 12, 0, 0, 0).unwrap();
        assert_eq!(dias_transcurridos(hace_tres, ahora), 2);
        assert_eq!(dias_transcurridos(futuro, ahora), 0);
    }

    fn entrada(id: &str, restantes: Option<i64>, desde_fin: Option<i64>) -> EntradaClasificada {
        let mut e = EntradaClasificada::nueva(Lanzamiento::nuevo(id, id), id);
        e.dias_restantes = restantes;
        e.dias_desde_fin = desde_fin;
        e
    }

    fn muestra() -> ResultadoClasificacion {
        let mut r = ResultadoClasificacion::default();
        r.por_contactar.push(entrada("vencida", None, Some(4)));
        r.activas_y_por_finalizar.push(entrada("hoy", Some(0), None));
        r.activas_y_por_finalizar.push(entrada("mes", Some(30), None));
        r.activas_y_por_finalizar.push(entrada("lejana", Some(31), None));
        r.activas_indefinidas.push(entrada("sin_fin", None, None));
        r.relanzamientos_confirmados.push(entrada("relanzada", None, None));
        r
    }

    fn ids(r: &ResultadoClasificacion) -> Vec<&str> {
        r.entradas().map(|e| e.lanzamiento.id.as_str()).collect()
    }

    #[test]
    fn test_filtro_vencidas() {
        let mut r = muestra();
        filtrar_por_vencimiento(&mut r, FiltroVencimiento::Vencidas);
        assert_eq!(r.resumen().total, 2);
        assert_eq!(r.por_contactar.len(), 1);
        assert_eq!(r.relanzamientos_confirmados.len(), 1);
        assert!(r.activas_y_por_finalizar.is_empty());
        assert!(r.activas_indefinidas.is_empty());
    }

    #[test]
    fn test_filtro_proximas_incluye_los_bordes() {
        let mut r = muestra();
        filtrar_por_vencimiento(&mut r, FiltroVencimiento::Proximas);
        let restantes: Vec<&str> = r.activas_y_por_finalizar.iter().map(|e| e.lanzamiento.id.as_str()).collect();
        assert_eq!(restantes, vec!["hoy", "mes"]);
        assert!(r.por_contactar.is_empty());
        assert_eq!(r.relanzamientos_confirmados.len(), 1);
    }

    #[test]
    fn test_filtro_todas_no_toca_nada() {
        let mut r = muestra();
        filtrar_por_vencimiento(&mut r, FiltroVencimiento::Todas);
        assert_eq!(ids(&r).len(), 6);
    }

    #[test]
    fn test_filtro_desde_texto() {
        let f: FiltroVencimiento = serde_json::from_str("\"proximas\"").unwrap();
        assert_eq!(f, FiltroVencimiento::Proximas);
        let f: FiltroVencimiento = serde_json::from_str("\"all\"").unwrap();
        assert_eq!(f, FiltroVencimiento::Todas);
    }

    #[test]
    fn test_urgencia_activa() {
        assert_eq!(urgencia(5, UMBRAL_URGENCIA_ACTIVA), Urgencia::Alta);
        assert_eq!(urgencia(6, UMBRAL_URGENCIA_ACTIVA), Urgencia::Normal);
    }
}
