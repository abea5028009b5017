// Configuración leída del entorno (y de `.env` si existe) al arrancar

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::datos::reintentos::PoliticaReintentos;
use crate::datos::AjustesConsulta;
use crate::error::ErrorConfig;

pub const BIND_POR_DEFECTO: &str = "127.0.0.1:8080";
pub const DB_PATH_POR_DEFECTO: &str = "data/gestion.db";
pub const TAMANO_PAGINA_POR_DEFECTO: usize = 1000;
pub const MAX_REINTENTOS_POR_DEFECTO: u32 = 3;
pub const RETARDO_REINTENTO_MS_POR_DEFECTO: u64 = 1000;
pub const DEBOUNCE_MS_POR_DEFECTO: u64 = 300;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub bind: String,
    /// `sqlite://`, `file://`, `postgres://` o una ruta a un archivo SQLite
    pub db_url: String,
    pub tamano_pagina: usize,
    pub max_reintentos: u32,
    pub retardo_reintento: Duration,
    pub debounce: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bind: BIND_POR_DEFECTO.to_string(),
            db_url: DB_PATH_POR_DEFECTO.to_string(),
            tamano_pagina: TAMANO_PAGINA_POR_DEFECTO,
            max_reintentos: MAX_REINTENTOS_POR_DEFECTO,
            retardo_reintento: Duration::from_millis(RETARDO_REINTENTO_MS_POR_DEFECTO),
            debounce: Duration::from_millis(DEBOUNCE_MS_POR_DEFECTO),
        }
    }
}

fn numero<T, F>(fuente: &F, variable: &str, por_defecto: T) -> Result<T, ErrorConfig>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match fuente(variable) {
        Some(v) if !v.trim().is_empty() => v.trim().parse::<T>().map_err(|_| ErrorConfig::ValorInvalido {
            variable: variable.to_string(),
            valor: v,
        }),
        _ => Ok(por_defecto),
    }
}

impl Config {
    /// Lee `.env` (si existe) y las variables `GESTION_*`.
    pub fn desde_entorno() -> Result<Config, ErrorConfig> {
        let _ = dotenv::dotenv();
        Config::desde_fuente(|k| env::var(k).ok())
    }

    /// Igual que `desde_entorno` pero con una fuente de variables arbitraria.
    pub fn desde_fuente<F>(fuente: F) -> Result<Config, ErrorConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let no_vacia = |k: &str| fuente(k).filter(|v| !v.trim().is_empty());

        let bind = no_vacia("GESTION_BIND").unwrap_or_else(|| BIND_POR_DEFECTO.to_string());
        let db_url = no_vacia("GESTION_DB_URL")
            .or_else(|| no_vacia("GESTION_DB_PATH"))
            .unwrap_or_else(|| DB_PATH_POR_DEFECTO.to_string());

        let tamano_pagina = numero(&fuente, "GESTION_TAMANO_PAGINA", TAMANO_PAGINA_POR_DEFECTO)?;
        if tamano_pagina == 0 {
            return Err(ErrorConfig::ValorInvalido {
                variable: "GESTION_TAMANO_PAGINA".to_string(),
                valor: "0".to_string(),
            });
        }
        let max_reintentos = numero(&fuente, "GESTION_MAX_REINTENTOS", MAX_REINTENTOS_POR_DEFECTO)?.max(1);
        let retardo_ms = numero(&fuente, "GESTION_RETARDO_REINTENTO_MS", RETARDO_REINTENTO_MS_POR_DEFECTO)?;
        let debounce_ms = numero(&fuente, "GESTION_DEBOUNCE_MS", DEBOUNCE_MS_POR_DEFECTO)?;

        Ok(Config {
            bind,
            db_url,
            tamano_pagina,
            max_reintentos,
            retardo_reintento: Duration::from_millis(retardo_ms),
            debounce: Duration::from_millis(debounce_ms),
        })
    }

    pub fn ajustes_consulta(&self) -> AjustesConsulta {
        AjustesConsulta {
            tamano_pagina: self.tamano_pagina,
            reintentos: PoliticaReintentos {
                max_intentos: self.max_reintentos,
                retardo_base: self.retardo_reintento,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn fuente(pares: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let mapa: HashMap<String, String> = pares.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |k| mapa.get(k).cloned()
    }

    #[test]
    fn test_valores_por_defecto() {
        let c = Config::desde_fuente(fuente(&[])).unwrap();
        assert_eq!(c, Config::default());
        assert_eq!(c.tamano_pagina, 1000);
        assert_eq!(c.retardo_reintento, Duration::from_millis(1000));
    }

    #[test]
    fn test_url_tiene_prioridad_sobre_path() {
        let c = Config::desde_fuente(fuente(&[
            ("GESTION_DB_PATH", "otra.db"),
            ("GESTION_DB_URL", "postgres://u@h/db"),
            ("GESTION_TAMANO_PAGINA", "50"),
        ]))
        .unwrap();
        assert_eq!(c.db_url, "postgres://u@h/db");
        assert_eq!(c.tamano_pagina, 50);
    }

    #[test]
    fn test_numero_invalido() {
        let r = Config::desde_fuente(fuente(&[("GESTION_MAX_REINTENTOS", "tres")]));
        match r {
            Err(ErrorConfig::ValorInvalido { variable, valor }) => {
                assert_eq!(variable, "GESTION_MAX_REINTENTOS");
                assert_eq!(valor, "tres");
            }
            otro => panic!("se esperaba ValorInvalido, llegó {:?}", otro),
        }
    }
}
