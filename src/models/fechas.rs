// fechas.rs - una fecha que no se puede interpretar queda como ausente, nunca es error

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

const FORMATOS_FECHA_HORA: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

// postgres serializa timestamptz como "2025-03-01 10:00:00+00"
const FORMATO_POSTGRES: &str = "%Y-%m-%d %H:%M:%S%.f%#z";

/// Interpreta una fecha de calendario (UTC).
///
/// Formatos aceptados:
/// - `2025-03-01`
/// - RFC 3339 (`2025-03-01T10:00:00-03:00`), se toma el día en UTC
/// - timestamps SQL (`2025-03-01 10:00:00`)
/// - `01/03/2025` (día/mes/año)
pub fn parsear_fecha(valor: &str) -> Option<NaiveDate> {
    let s = valor.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_str(s, FORMATO_POSTGRES) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }
    for formato in FORMATOS_FECHA_HORA {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, formato) {
            return Some(ndt.date());
        }
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%d/%m/%Y") {
        return Some(d);
    }
    log::debug!("fecha mal formada ignorada: {:?}", valor);
    None
}

/// Interpreta una marca de tiempo. Las fechas sin hora se toman a las 00:00 UTC.
pub fn parsear_marca_tiempo(valor: &str) -> Option<DateTime<Utc>> {
    let s = valor.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for formato in FORMATOS_FECHA_HORA {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, formato) {
            return Some(Utc.from_utc_datetime(&ndt));
        }
    }
    if let Ok(dt) = DateTime::parse_from_str(s, FORMATO_POSTGRES) {
        return Some(dt.with_timezone(&Utc));
    }
    parsear_fecha(s).map(inicio_del_dia)
}

/// Instante 00:00:00 UTC del día indicado.
pub fn inicio_del_dia(fecha: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&fecha.and_time(NaiveTime::MIN))
}

/// Fecha usada para ordenar registros sin fecha de inicio (año 1900).
pub fn fecha_minima() -> NaiveDate {
    NaiveDate::from_ymd_opt(1900, 1, 1).unwrap_or(NaiveDate::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, dia: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, dia).unwrap()
    }

    #[test]
    fn test_parsear_fecha_formatos() {
        assert_eq!(parsear_fecha("2025-03-01"), Some(d(2025, 3, 1)));
        assert_eq!(parsear_fecha("2025-03-01T10:00:00Z"), Some(d(2025, 3, 1)));
        assert_eq!(parsear_fecha("2025-03-01T23:30:00-03:00"), Some(d(2025, 3, 2)));
        assert_eq!(parsear_fecha("2025-03-01 10:00:00"), Some(d(2025, 3, 1)));
        assert_eq!(parsear_fecha("01/03/2025"), Some(d(2025, 3, 1)));
    }

    #[test]
    fn test_parsear_fecha_mal_formada_es_ausente() {
        assert_eq!(parsear_fecha(""), None);
        assert_eq!(parsear_fecha("   "), None);
        assert_eq!(parsear_fecha("mañana"), None);
        assert_eq!(parsear_fecha("2025-13-45"), None);
    }

    #[test]
    fn test_parsear_marca_tiempo() {
        let esperado = Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap();
        assert_eq!(parsear_marca_tiempo("2025-03-01T10:00:00Z"), Some(esperado));
        assert_eq!(parsear_marca_tiempo("2025-03-01 10:00:00"), Some(esperado));
        assert_eq!(parsear_marca_tiempo("2025-03-01 10:00:00+00"), Some(esperado));
        assert_eq!(
            parsear_marca_tiempo("2025-03-01"),
            Some(Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(parsear_marca_tiempo("ayer"), None);
    }
}
