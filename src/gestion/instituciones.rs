use std::collections::HashMap;

use crate::models::texto::normalizar;
use crate::models::{ContactoInstitucion, Institucion, ResultadoClasificacion};

/// Similitud mínima (Jaro-Winkler) para aceptar una coincidencia aproximada.
pub const UMBRAL_SIMILITUD: f64 = 0.92;

#[derive(Debug, Clone, Default)]
pub struct MapaInstituciones {
    por_nombre: HashMap<String, Institucion>,
    // claves ordenadas para que la búsqueda aproximada sea determinista
    claves: Vec<String>,
}

impl MapaInstituciones {
    pub fn desde<I>(instituciones: I) -> Self
    where
        I: IntoIterator<Item = Institucion>,
    {
        let mut por_nombre = HashMap::new();
        for inst in instituciones {
            let clave = normalizar(&inst.nombre);
            if clave.is_empty() {
                continue;
            }
            // ante nombres repetidos se queda el primero
            por_nombre.entry(clave).or_insert(inst);
        }
        let mut claves: Vec<String> = por_nombre.keys().cloned().collect();
        claves.sort();
        MapaInstituciones { por_nombre, claves }
    }

    pub fn len(&self) -> usize {
        self.por_nombre.len()
    }

    pub fn is_empty(&self) -> bool {
        self.por_nombre.is_empty()
    }

    /// Coincidencia exacta (normalizada) o, si no hay, la más parecida por
    /// encima de `UMBRAL_SIMILITUD`.
    pub fn buscar(&self, clave_grupo: &str) -> Option<&Institucion> {
        let buscada = normalizar(clave_grupo);
        if buscada.is_empty() {
            return None;
        }
        if let Some(inst) = self.por_nombre.get(&buscada) {
            return Some(inst);
        }

        let mut mejor: Option<(&String, f64)> = None;
        for clave in &self.claves {
            let sim = strsim::jaro_winkler(&buscada, clave);
            if sim < UMBRAL_SIMILITUD {
                continue;
            }
            // ante empates gana la primera clave en orden alfabético
            if mejor.is_none_or(|(_, s)| sim > s) {
                mejor = Some((clave, sim));
            }
        }
        mejor.and_then(|(clave, _)| self.por_nombre.get(clave))
    }

    pub fn adjuntar(&self, resultado: &mut ResultadoClasificacion) {
        for entrada in resultado.entradas_mut() {
            entrada.institucion = self.buscar(&entrada.grupo).map(|inst| ContactoInstitucion {
                id: inst.id.clone(),
                nombre: inst.nombre.clone(),
                telefono: inst.telefono.clone(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inst(id: &str, nombre: &str, tel: Option<&str>) -> Institucion {
        Institucion { id: id.to_string(), nombre: nombre.to_string(), telefono: tel.map(String::from) }
    }

    #[test]
    fn test_buscar_exacto_normalizado() {
        let mapa = MapaInstituciones::desde(vec![inst("i1", "Hospital Central", Some("123"))]);
        assert_eq!(mapa.buscar("HOSPITAL central").map(|i| i.id.as_str()), Some("i1"));
    }

    #[test]
    fn test_buscar_aproximado() {
        let mapa = MapaInstituciones::desde(vec![
            inst("i1", "Clínica San José", None),
            inst("i2", "Escuela Norte", None),
        ]);
        assert_eq!(mapa.buscar("Clinica San Jose.").map(|i| i.id.as_str()), Some("i1"));
        assert!(mapa.buscar("Fundación Horizonte").is_none());
    }

    #[test]
    fn test_nombre_repetido_conserva_el_primero() {
        let mapa = MapaInstituciones::desde(vec![inst("i1", "Escuela", None), inst("i2", "ESCUELA", None)]);
        assert_eq!(mapa.len(), 1);
        assert_eq!(mapa.buscar("escuela").map(|i| i.id.as_str()), Some("i1"));
    }
}
