//! Acceso a datos: CRUD y consultas paginadas sobre el almacén relacional.
//! `PuertoDatos` es el contrato que consume el resto del crate; las operaciones
//! compuestas se apoyan en cinco primitivas que aporta cada motor.

pub mod conexion;
pub mod consulta;
pub mod esquema;
pub mod filtros;
pub mod lanzamientos;
pub mod postgresql;
pub mod reintentos;
pub mod sqlite;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ErrorDatos;

pub use conexion::ConexionDatos;
pub use consulta::{Busqueda, Consulta, Direccion, Orden, Rango};
pub use esquema::Recurso;
pub use filtros::{CondicionFiltro, Filtros};
pub use reintentos::PoliticaReintentos;

pub type Registro = Map<String, Value>;

pub const TAMANO_PAGINA: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AjustesConsulta {
    pub tamano_pagina: usize,
    pub reintentos: PoliticaReintentos,
}

impl Default for AjustesConsulta {
    fn default() -> Self {
        AjustesConsulta { tamano_pagina: TAMANO_PAGINA, reintentos: PoliticaReintentos::default() }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PeticionPagina {
    pub pagina: usize,
    pub tamano: usize,
    pub campos: Vec<String>,
    pub busqueda: Option<String>,
    pub campos_busqueda: Vec<String>,
    pub orden: Option<Orden>,
    pub filtros: Filtros,
}

impl Default for PeticionPagina {
    fn default() -> Self {
        PeticionPagina {
            pagina: 1,
            tamano: 20,
            campos: Vec::new(),
            busqueda: None,
            campos_busqueda: Vec::new(),
            orden: None,
            filtros: Filtros::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pagina {
    pub registros: Vec<Registro>,
    /// Total de filas que cumplen los filtros, no sólo las de esta página
    pub total: usize,
}

fn envolver_obtencion(recurso: Recurso, intentos: u32, e: ErrorDatos) -> ErrorDatos {
    if e.es_transitorio() {
        ErrorDatos::Obtencion { recurso: recurso.tabla().to_string(), intentos, mensaje: e.to_string() }
    } else {
        e
    }
}

// `id` desempata para que las páginas no se solapen
fn orden_estable(orden: Orden) -> Vec<Orden> {
    if orden.campo == "id" {
        vec![orden]
    } else {
        vec![orden, Orden::asc("id")]
    }
}

pub trait PuertoDatos {
    fn ajustes(&self) -> AjustesConsulta {
        AjustesConsulta::default()
    }

    fn consultar(&self, consulta: &Consulta) -> Result<Vec<Registro>, ErrorDatos>;

    fn contar(&self, consulta: &Consulta) -> Result<usize, ErrorDatos>;

    /// Actualiza los campos indicados y devuelve el registro resultante.
    /// Si ninguna fila coincide con `id` devuelve `ActualizacionParcial`.
    fn actualizar(&self, recurso: Recurso, id: &str, cambios: &Registro) -> Result<Registro, ErrorDatos>;

    fn crear(&self, recurso: Recurso, campos: &Registro) -> Result<Registro, ErrorDatos>;

    /// Si ninguna fila coincide con `id` devuelve `Eliminacion`.
    fn eliminar(&self, recurso: Recurso, id: &str) -> Result<(), ErrorDatos>;

    /// Trae todas las filas paginando de a `tamano_pagina` hasta recibir una
    /// página incompleta. Cada página se reintenta por separado.
    fn obtener_todos(
        &self,
        recurso: Recurso,
        campos: &[String],
        filtros: &Filtros,
        orden: Option<Orden>,
    ) -> Result<Vec<Registro>, ErrorDatos> {
        let ajustes = self.ajustes();
        let tamano = ajustes.tamano_pagina.max(1);

        let mut consulta = Consulta::nueva(recurso);
        consulta.campos = campos.to_vec();
        consulta.filtros = filtros.clone();
        consulta.orden = orden_estable(orden.unwrap_or_else(|| Orden::asc("id")));

        let mut todos = Vec::new();
        let mut desde = 0;
        loop {
            consulta.rango = Some(Rango { desde, limite: tamano });
            let descripcion = format!("obtener {} (desde {})", recurso, desde);
            let pagina = ajustes
                .reintentos
                .ejecutar(&descripcion, |_| self.consultar(&consulta))
                .map_err(|e| envolver_obtencion(recurso, ajustes.reintentos.max_intentos, e))?;
            let recibidos = pagina.len();
            todos.extend(pagina);
            if recibidos < tamano {
                break;
            }
            desde += tamano;
        }
        log::debug!("obtenidos {} registros de {}", todos.len(), recurso);
        Ok(todos)
    }

    fn obtener_limitado(
        &self,
        recurso: Recurso,
        campos: &[String],
        filtros: &Filtros,
        maximo: usize,
        orden: Option<Orden>,
    ) -> Result<Vec<Registro>, ErrorDatos> {
        if maximo == 0 {
            return self.obtener_todos(recurso, campos, filtros, orden);
        }
        let ajustes = self.ajustes();
        let mut consulta = Consulta::nueva(recurso);
        consulta.campos = campos.to_vec();
        consulta.filtros = filtros.clone();
        consulta.orden = orden.into_iter().collect();
        consulta.rango = Some(Rango { desde: 0, limite: maximo });
        ajustes
            .reintentos
            .ejecutar(&format!("obtener {} (max {})", recurso, maximo), |_| self.consultar(&consulta))
            .map_err(|e| envolver_obtencion(recurso, ajustes.reintentos.max_intentos, e))
    }

    /// Página `peticion.pagina` (desde 1) y el total exacto de filas.
    /// Sin orden explícito se ordena por `created_at` descendente.
    fn obtener_pagina(&self, recurso: Recurso, peticion: &PeticionPagina) -> Result<Pagina, ErrorDatos> {
        let ajustes = self.ajustes();
        let pagina = peticion.pagina.max(1);
        let tamano = peticion.tamano.max(1);

        let mut consulta = Consulta::nueva(recurso);
        consulta.campos = peticion.campos.clone();
        consulta.filtros = peticion.filtros.clone();
        consulta.busqueda = peticion
            .busqueda
            .as_ref()
            .map(|t| Busqueda { termino: t.clone(), campos: peticion.campos_busqueda.clone() });
        consulta.orden = orden_estable(peticion.orden.clone().unwrap_or_else(|| Orden::desc("created_at")));
        consulta.rango = Some(Rango { desde: (pagina - 1) * tamano, limite: tamano });

        let descripcion = format!("página {} de {}", pagina, recurso);
        let registros = ajustes
            .reintentos
            .ejecutar(&descripcion, |_| self.consultar(&consulta))
            .map_err(|e| envolver_obtencion(recurso, ajustes.reintentos.max_intentos, e))?;
        let total = ajustes
            .reintentos
            .ejecutar(&descripcion, |_| self.contar(&consulta))
            .map_err(|e| envolver_obtencion(recurso, ajustes.reintentos.max_intentos, e))?;
        Ok(Pagina { registros, total })
    }

    /// Aplica cada actualización por separado. Las que tienen éxito quedan
    /// aplicadas; si alguna falla se devuelve `ActualizacionMasiva`.
    fn actualizar_varios(&self, recurso: Recurso, cambios: &[(String, Registro)]) -> Result<Vec<Registro>, ErrorDatos> {
        let mut actualizados = Vec::with_capacity(cambios.len());
        let mut fallidos = 0;
        for (id, campos) in cambios {
            match self.actualizar(recurso, id, campos) {
                Ok(r) => actualizados.push(r),
                Err(e) => {
                    log::warn!("actualización de {} '{}' falló: {}", recurso, id, e);
                    fallidos += 1;
                }
            }
        }
        if fallidos > 0 {
            return Err(ErrorDatos::ActualizacionMasiva { fallidos, total: cambios.len() });
        }
        Ok(actualizados)
    }
}
