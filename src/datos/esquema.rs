// Todo nombre de tabla o columna pasa por `Recurso::validar_campo` antes de
// llegar al SQL; los valores siempre van como parámetros.

use std::fmt;
use std::str::FromStr;

use crate::error::ErrorDatos;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Recurso {
    LanzamientosPps,
    Instituciones,
}

const COLUMNAS_LANZAMIENTOS: &[&str] = &[
    "id",
    "created_at",
    "updated_at",
    "nombre_pps",
    "fecha_inicio",
    "fecha_finalizacion",
    "fecha_relanzamiento",
    "orientacion",
    "estado_gestion",
    "notas_gestion",
    "estado_convocatoria",
    "cupos_disponibles",
    "horas_acreditadas",
    "direccion",
    "horario_seleccionado",
];

const COLUMNAS_INSTITUCIONES: &[&str] = &["id", "created_at", "updated_at", "nombre", "telefono"];

impl Recurso {
    pub const TODOS: [Recurso; 2] = [Recurso::LanzamientosPps, Recurso::Instituciones];

    pub fn tabla(&self) -> &'static str {
        match self {
            Recurso::LanzamientosPps => "lanzamientos_pps",
            Recurso::Instituciones => "instituciones",
        }
    }

    pub fn columnas(&self) -> &'static [&'static str] {
        match self {
            Recurso::LanzamientosPps => COLUMNAS_LANZAMIENTOS,
            Recurso::Instituciones => COLUMNAS_INSTITUCIONES,
        }
    }

    pub fn validar_campo<'a>(&self, campo: &'a str) -> Result<&'a str, ErrorDatos> {
        if self.columnas().contains(&campo) {
            Ok(campo)
        } else {
            Err(ErrorDatos::CampoInvalido { recurso: self.tabla().to_string(), campo: campo.to_string() })
        }
    }

    pub fn ddl_sqlite(&self) -> String {
        let extra = match self {
            Recurso::LanzamientosPps => {
                "nombre_pps TEXT,
                fecha_inicio TEXT,
                fecha_finalizacion TEXT,
                fecha_relanzamiento TEXT,
                orientacion TEXT,
                estado_gestion TEXT,
                notas_gestion TEXT,
                estado_convocatoria TEXT,
                cupos_disponibles INTEGER,
                horas_acreditadas INTEGER,
                direccion TEXT,
                horario_seleccionado TEXT"
            }
            Recurso::Instituciones => {
                "nombre TEXT NOT NULL,
                telefono TEXT"
            }
        };
        format!(
            "CREATE TABLE IF NOT EXISTS {} (
                id TEXT PRIMARY KEY NOT NULL DEFAULT (lower(hex(randomblob(16)))),
                created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
                updated_at TEXT,
                {}
            )",
            self.tabla(),
            extra
        )
    }

    pub fn ddl_postgres(&self) -> String {
        let extra = match self {
            Recurso::LanzamientosPps => {
                "nombre_pps TEXT,
                fecha_inicio DATE,
                fecha_finalizacion DATE,
                fecha_relanzamiento DATE,
                orientacion TEXT,
                estado_gestion TEXT,
                notas_gestion TEXT,
                estado_convocatoria TEXT,
                cupos_disponibles BIGINT,
                horas_acreditadas BIGINT,
                direccion TEXT,
                horario_seleccionado TEXT"
            }
            Recurso::Instituciones => {
                "nombre TEXT NOT NULL,
                telefono TEXT"
            }
        };
        format!(
            "CREATE TABLE IF NOT EXISTS {} (
                id TEXT PRIMARY KEY DEFAULT gen_random_uuid()::text,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                updated_at TIMESTAMPTZ,
                {}
            );",
            self.tabla(),
            extra
        )
    }
}

impl fmt::Display for Recurso {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tabla())
    }
}

impl FromStr for Recurso {
    type Err = ErrorDatos;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Recurso::TODOS
            .into_iter()
            .find(|r| r.tabla() == s.trim())
            .ok_or_else(|| ErrorDatos::RecursoDesconocido(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recurso_desde_nombre() {
        assert_eq!("lanzamientos_pps".parse::<Recurso>().unwrap(), Recurso::LanzamientosPps);
        assert!(matches!("usuarios".parse::<Recurso>(), Err(ErrorDatos::RecursoDesconocido(_))));
    }

    #[test]
    fn test_validar_campo_rechaza_inyeccion() {
        let r = Recurso::Instituciones;
        assert!(r.validar_campo("telefono").is_ok());
        assert!(r.validar_campo("telefono; DROP TABLE instituciones").is_err());
        assert!(r.validar_campo("nombre_pps").is_err());
    }
}
