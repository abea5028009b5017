use std::thread;
use std::time::Duration;

use crate::error::ErrorDatos;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoliticaReintentos {
    pub max_intentos: u32,
    /// Espera antes del intento n+1: `retardo_base * n`
    pub retardo_base: Duration,
}

impl Default for PoliticaReintentos {
    fn default() -> Self {
        PoliticaReintentos { max_intentos: 3, retardo_base: Duration::from_millis(1000) }
    }
}

impl PoliticaReintentos {
    pub fn sin_espera(max_intentos: u32) -> Self {
        PoliticaReintentos { max_intentos, retardo_base: Duration::ZERO }
    }

    /// Ejecuta `operacion` hasta que tenga éxito o se agoten los intentos.
    ///
    /// Los errores no transitorios (validación) se devuelven sin reintentar.
    /// Agotados los intentos se devuelve el último error.
    pub fn ejecutar<T, F>(&self, descripcion: &str, mut operacion: F) -> Result<T, ErrorDatos>
    where
        F: FnMut(u32) -> Result<T, ErrorDatos>,
    {
        let max = self.max_intentos.max(1);
        let mut intento = 1;
        loop {
            match operacion(intento) {
                Ok(v) => return Ok(v),
                Err(e) if !e.es_transitorio() => return Err(e),
                Err(e) if intento >= max => {
                    log::error!("{}: agotados {} intentos: {}", descripcion, max, e);
                    return Err(e);
                }
                Err(e) => {
                    let espera = self.retardo_base * intento;
                    log::warn!(
                        "{}: intento {}/{} falló ({}), reintentando en {:?}",
                        descripcion,
                        intento,
                        max,
                        e,
                        espera
                    );
                    if !espera.is_zero() {
                        thread::sleep(espera);
                    }
                    intento += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exito_tras_fallos() {
        let p = PoliticaReintentos::sin_espera(3);
        let r = p.ejecutar("prueba", |n| if n < 3 { Err(ErrorDatos::Hilo("caído".into())) } else { Ok(n) });
        assert_eq!(r.unwrap(), 3);
    }

    #[test]
    fn test_agota_intentos() {
        let p = PoliticaReintentos::sin_espera(2);
        let mut llamadas = 0;
        let r: Result<(), _> = p.ejecutar("prueba", |_| {
            llamadas += 1;
            Err(ErrorDatos::Hilo("caído".into()))
        });
        assert!(r.is_err());
        assert_eq!(llamadas, 2);
    }

    #[test]
    fn test_validacion_no_se_reintenta() {
        let p = PoliticaReintentos::sin_espera(5);
        let mut llamadas = 0;
        let r: Result<(), _> = p.ejecutar("prueba", |_| {
            llamadas += 1;
            Err(ErrorDatos::RecursoDesconocido("x".into()))
        });
        assert!(matches!(r, Err(ErrorDatos::RecursoDesconocido(_))));
        assert_eq!(llamadas, 1);
    }
}
