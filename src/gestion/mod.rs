// Clasificación de lanzamientos en bandejas:
// filtro -> agrupación -> representante -> ubicación por fechas -> orden.
// `ahora` llega como parámetro y la entrada no se modifica.

pub mod agrupacion;
pub mod bandejas;
pub mod busqueda;
pub mod instituciones;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::models::{EntradaClasificada, Lanzamiento, ResultadoClasificacion};

pub use agrupacion::{clave_grupo, SIN_NOMBRE};
pub use bandejas::FiltroVencimiento;
pub use busqueda::Debouncer;
pub use instituciones::MapaInstituciones;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct OpcionesClasificacion {
    pub busqueda: Option<String>,
    // vacía = todas
    #[serde(default)]
    pub orientaciones: Vec<String>,
    #[serde(default)]
    pub filtro: FiltroVencimiento,
}

pub fn clasificar(registros: &[Lanzamiento], ahora: DateTime<Utc>, busqueda: Option<&str>) -> ResultadoClasificacion {
    let opciones = OpcionesClasificacion {
        busqueda: busqueda.map(str::to_string),
        ..Default::default()
    };
    clasificar_con_opciones(registros, ahora, &opciones)
}

pub fn clasificar_con_opciones(
    registros: &[Lanzamiento],
    ahora: DateTime<Utc>,
    opciones: &OpcionesClasificacion,
) -> ResultadoClasificacion {
    let filtrados = busqueda::filtrar(registros, opciones);
    let grupos = agrupacion::agrupar(filtrados);

    let mut resultado = ResultadoClasificacion::default();
    for grupo in &grupos {
        match agrupacion::seleccionar(grupo, ahora) {
            agrupacion::Seleccion::Relanzamiento(l) => {
                resultado
                    .relanzamientos_confirmados
                    .push(EntradaClasificada::nueva(l.clone(), grupo.clave.clone()));
            }
            agrupacion::Seleccion::Relevante(l) => bandejas::ubicar(&mut resultado, l, &grupo.clave, ahora),
            agrupacion::Seleccion::Descartado => {}
        }
    }
    bandejas::filtrar_por_vencimiento(&mut resultado, opciones.filtro);
    bandejas::ordenar(&mut resultado);

    log::debug!(
        "clasificados {} registros en {} grupos ({} entradas)",
        registros.len(),
        grupos.len(),
        resultado.resumen().total
    );
    resultado
}
